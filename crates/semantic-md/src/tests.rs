use std::io;

use crate::ast::CustomNode;
use crate::dom;
use crate::*;

fn convert(html: &str, opts: &ConversionOptions) -> String {
    convert_str(html, opts).unwrap().markdown
}

fn convert_default(html: &str) -> String {
    convert(html, &ConversionOptions::default())
}

#[test]
fn test_table_without_header_has_no_separator() {
    let md = convert_default("<table><tr><td>A</td><td>B</td></tr></table>");
    assert_eq!(md, "| A | B |");
}

#[test]
fn test_table_with_header() {
    let md = convert_default("<table><tr><th>X</th></tr><tr><td>Y</td></tr></table>");
    assert_eq!(md, "| X |\n| --- |\n| Y |");
}

#[test]
fn test_table_column_tracking() {
    let opts = ConversionOptions::builder()
        .enable_table_column_tracking(true)
        .build();
    let md = convert(
        "<table><tr><th>Name</th><th>Age</th></tr><tr><td>Ann</td><td>30</td></tr></table>",
        &opts,
    );
    insta::assert_snapshot!(md, @r"
    | Name <!-- A --> | Age <!-- B --> |
    | --- | --- |
    | Ann <!-- A --> | 30 <!-- B --> |
    ");
}

#[test]
fn test_metadata_keys_are_sorted() {
    let html = r#"<html><head>
        <meta name="zebra" content="last">
        <meta name="alpha" content="first">
        <meta name="beta" content="second">
    </head><body><p>Body</p></body></html>"#;
    let opts = ConversionOptions::builder()
        .include_meta_data(MetaDataMode::Basic)
        .build();
    assert_eq!(
        convert(html, &opts),
        "---\nalpha: first\nbeta: second\nzebra: last\n---\n\nBody"
    );

    // Without a metadata mode the head contributes nothing.
    assert_eq!(convert_default(html), "Body");
}

#[test]
fn test_extended_metadata() {
    let html = r#"<html><head>
        <meta property="og:title" content="OG">
        <meta name="twitter:card" content="summary">
        <script type="application/ld+json">{"@context": "https://schema.org", "@type": "Article", "headline": "Hi", "image": ["https://x/a.png"], "author": {"name": "Ann"}}</script>
    </head><body><h1>Body</h1></body></html>"#;
    let opts = ConversionOptions::builder()
        .include_meta_data(MetaDataMode::Extended)
        .build();
    insta::assert_snapshot!(convert(html, &opts), @r"
    ---
    openGraph:
      title: OG
    twitter:
      card: summary
    schema:
      Article:
        author:
          name: Ann
        headline: Hi
        image:
          - https://x/a.png
    ---

    # Body
    ");
}

#[test]
fn test_refify_urls() {
    let html = r#"<p><img src="https://cdn.example.com/images/a.jpg" alt="A"><img src="https://cdn.example.com/images/b.jpg" alt="B"><img src="../images/c.jpg" alt="C"></p>"#;

    let opts = ConversionOptions::builder().refify_urls(true).build();
    let converted = convert_str(html, &opts).unwrap();
    assert_eq!(
        converted.markdown,
        "![A](ref0://a.jpg)\n![B](ref0://b.jpg)\n![C](../images/c.jpg)"
    );
    assert_eq!(converted.url_map.len(), 1);
    assert_eq!(converted.url_map["ref0"], "https://cdn.example.com/images");

    let opts = ConversionOptions::builder()
        .refify_urls(true)
        .include_meta_data(MetaDataMode::Basic)
        .build();
    insta::assert_snapshot!(convert(html, &opts), @r"
    ---
    urlReferences:
      ref0: https://cdn.example.com/images
    ---

    ![A](ref0://a.jpg)
    ![B](ref0://b.jpg)
    ![C](../images/c.jpg)
    ");

    let plain = convert_str(html, &ConversionOptions::default()).unwrap();
    assert!(plain.url_map.is_empty());
    assert!(plain.markdown.contains("https://cdn.example.com/images/a.jpg"));
}

#[test]
fn test_literal_markdown_is_escaped() {
    assert_eq!(convert_default("<p># Not a heading</p>"), r"\# Not a heading");
    assert_eq!(convert_default("<p>1. not a list</p>"), r"1\. not a list");
    assert_eq!(convert_default("<h2>1. Intro</h2>"), "## 1. Intro");
    assert_eq!(convert_default("<p>~~~ rust</p>"), r"\~~~ rust");
    assert_eq!(
        convert_default("<p>![alt](x.png)</p>"),
        r"\!\[alt\]\(x.png)"
    );

    let opts = ConversionOptions::builder()
        .escape_mode(EscapeMode::Disabled)
        .build();
    assert_eq!(convert("<p># Not a heading</p>", &opts), "# Not a heading");
}

#[test]
fn test_code_blocks_are_verbatim() {
    let md = convert_default(r#"<pre><code class="language-go">x := *p</code></pre>"#);
    assert_eq!(md, "```go\nx := *p\n```");
}

#[test]
fn test_links() {
    assert_eq!(
        convert_default(r#"<a href="/docs">Read the docs</a>"#),
        "[Read the docs](/docs)"
    );
    assert_eq!(
        convert_default(r#"<a href="/x"><b>Bold</b> link</a>"#),
        r#"<a href="/x">**Bold** link</a>"#
    );
}

#[test]
fn test_blockquote_with_line_break() {
    let md = convert_default("<blockquote>Line one<br>Line two</blockquote>");
    assert_eq!(md, "> Line one\n> Line two");
}

#[test]
fn test_pretty_printed_blocks() {
    assert_eq!(
        convert_default("<h1>T</h1>\n<p>\n  Hello\n</p>"),
        "# T\n\nHello"
    );
    assert_eq!(
        convert_default("<p>\n One\n</p><p>\n Two\n</p>"),
        "One Two"
    );
    assert_eq!(
        convert_default("<ul>\n  <li>\n    Item\n  </li>\n</ul>"),
        "- Item"
    );
}

#[test]
fn test_semantic_structure() {
    let md = convert_default(
        "<article><h2>Title</h2><section><p>Part</p></section><aside>Note</aside></article>",
    );
    insta::assert_snapshot!(md, @r"
    ## Title

    ---

    Part

    ---

    <!-- <aside> -->
    Note
    <!-- </aside> -->
    ");
}

#[test]
fn test_extract_main_content() {
    let html = r#"<body><nav><a href="/a">Home</a></nav><main><h1>Article</h1><p>Text</p></main><footer>Footer</footer></body>"#;

    let opts = ConversionOptions::builder()
        .extract_main_content(true)
        .build();
    assert_eq!(convert(html, &opts), "# Article\n\nText");

    let full = convert_default(html);
    assert!(full.starts_with("<!-- <nav> -->\n[Home](/a)\n<!-- </nav> -->"));
    assert!(full.ends_with("<!-- <footer> -->\nFooter\n<!-- </footer> -->"));
}

#[test]
fn test_output_is_deterministic() {
    let html = r#"<html><head>
        <meta name="b" content="two"><meta name="a" content="one">
        <meta property="og:url" content="https://example.com/x">
        <meta property="og:type" content="website">
    </head><body>
        <a href="https://example.com/a/b/c">deep</a>
        <img src="https://example.com/img/p.png" alt="P">
    </body></html>"#;
    let opts = ConversionOptions::builder()
        .include_meta_data(MetaDataMode::Extended)
        .refify_urls(true)
        .build();

    let first = convert_str(html, &opts).unwrap();
    for _ in 0..5 {
        assert_eq!(convert_str(html, &opts).unwrap(), first);
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Callout(String);

struct CalloutHooks;

impl ConversionHooks for CalloutHooks {
    fn override_element(
        &self,
        element: &markup5ever_rcdom::Handle,
        _: &ConversionOptions,
        _: usize,
    ) -> Option<Vec<Node>> {
        dom::is_element(element, "x-callout")
            .then(|| vec![Node::custom(Callout(dom::text_content(element)))])
    }

    fn unhandled_element(
        &self,
        element: &markup5ever_rcdom::Handle,
        _: &ConversionOptions,
        _: usize,
    ) -> Option<Vec<Node>> {
        dom::is_element(element, "u").then(|| vec![Node::text("UNDERLINED")])
    }

    fn render_custom(
        &self,
        node: &dyn CustomNode,
        _: &ConversionOptions,
        _: usize,
    ) -> Option<String> {
        let callout = node.as_any().downcast_ref::<Callout>()?;
        Some(format!("**Note:** {}\n\n", callout.0))
    }
}

#[test]
fn test_hooks() {
    let html = "<h1>Hooks</h1><x-callout>Mind the gap</x-callout><p><u>under</u> text</p>";

    assert_eq!(convert_default(html), "# Hooks\n\nMind the gapunder text");

    let opts = ConversionOptions::builder().hooks(CalloutHooks).build();
    assert_eq!(
        convert(html, &opts),
        "# Hooks\n\n**Note:** Mind the gap\n\nUNDERLINED text"
    );
}

#[test]
fn test_errors() {
    let err = convert_str("", &ConversionOptions::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EmptyInput);
    assert_eq!(err.to_string(), "empty HTML input");

    struct Broken;
    impl io::Read for Broken {
        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::other("connection reset"))
        }
    }
    let err = convert_reader(&mut Broken, &ConversionOptions::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse);

    let err = ConversionOptions::builder()
        .include_meta_data_str("everything")
        .err()
        .unwrap();
    assert_eq!(err.kind(), ErrorKind::InvalidConfiguration);
}
