//! Per-node rendering rules.

use std::borrow::Cow;
use std::fmt::Write;

use crate::ast::{ListItem, Node, SemanticKind, Table};
use crate::escape::{PLACEHOLDER_CHAR, escape_cell_pipes, strip_marks};
use crate::options::EscapeMode;

use super::MarkdownWriter;

impl MarkdownWriter<'_> {
    /// Render a sequence of nodes at the given depth.
    pub fn render_nodes(&self, nodes: &[Node], depth: usize) -> String {
        nodes.iter().map(|node| self.render_node(node, depth)).collect()
    }

    /// Render a single node. A non-empty result of the `render_node` hook
    /// replaces the built-in rule.
    pub fn render_node(&self, node: &Node, depth: usize) -> String {
        let hooks = self.opts.hooks();
        if let Some(rendered) = hooks
            .and_then(|hooks| hooks.render_node(node, self.opts, depth))
            .filter(|rendered| !rendered.is_empty())
        {
            return rendered;
        }

        match node {
            Node::Text(text) => self.escaper.mark(text),
            Node::Heading { level, content } => {
                let content = self.render_nodes(content, depth);
                format!("{} {}\n\n", "#".repeat(*level as usize), content.trim())
            }
            Node::Bold(content) => self.wrap("**", content, depth),
            Node::Italic(content) => self.wrap("*", content, depth),
            Node::Strikethrough(content) => self.wrap("~~", content, depth),
            Node::Link { href, content } => self.render_link(href, content, depth),
            Node::Image { src, alt } => format!("![{}]({})\n", alt.trim(), encode_url(src)),
            Node::Video {
                src,
                poster,
                controls,
            } => {
                let mut out = format!("![Video]({})\n", encode_url(src));
                if let Some(poster) = poster.as_deref().filter(|poster| !poster.is_empty()) {
                    let _ = writeln!(out, "![Poster]({})", encode_url(poster));
                }
                if *controls {
                    out.push_str("Controls: true\n");
                }
                out
            }
            Node::List { ordered, items } => self.render_list(*ordered, items, depth),
            Node::Code {
                content,
                language,
                inline,
            } => {
                let content = self.verbatim(content);
                if *inline {
                    format!("`{content}`")
                } else {
                    let language = language.as_deref().unwrap_or_default();
                    format!("```{language}\n{content}\n```\n\n")
                }
            }
            Node::Blockquote(content) => {
                let content = self.render_nodes(content, depth);
                let quoted = content
                    .trim()
                    .split('\n')
                    .map(|line| format!("> {}", line.trim()))
                    .collect::<Vec<_>>()
                    .join("\n");
                quoted + "\n\n"
            }
            Node::Table(table) => self.render_table(table, depth),
            Node::Semantic { kind, content } => {
                let content = self.render_nodes(content, depth);
                let content = content.trim();
                match kind {
                    SemanticKind::Article => format!("{content}\n\n"),
                    SemanticKind::Section => format!("---\n\n{content}\n\n---\n\n"),
                    kind => format!("<!-- <{kind}> -->\n{content}\n<!-- </{kind}> -->\n\n"),
                }
            }
            // Rendered as frontmatter.
            Node::MetaData(_) => String::new(),
            Node::Custom(payload) => hooks
                .and_then(|hooks| hooks.render_custom(&**payload, self.opts, depth))
                .unwrap_or_default(),
        }
    }

    /// Code is never marked, so placeholder bytes in it are not marks and
    /// must not reach the resolve pass.
    fn verbatim<'s>(&self, content: &'s str) -> Cow<'s, str> {
        if self.escaper.mode() == EscapeMode::Smart && content.contains(PLACEHOLDER_CHAR) {
            Cow::Owned(strip_marks(content))
        } else {
            Cow::Borrowed(content)
        }
    }

    fn wrap(&self, marker: &str, content: &[Node], depth: usize) -> String {
        let content = self.render_nodes(content, depth);
        format!("{marker}{}{marker}", content.trim())
    }

    /// Links with text-only content use the bracket form. Anything richer is
    /// kept as an HTML anchor, since brackets cannot hold block content.
    fn render_link(&self, href: &str, content: &[Node], depth: usize) -> String {
        let rendered = self.render_nodes(content, depth);
        let rendered = rendered.trim();
        let href = encode_url(href);

        if content.iter().all(Node::is_text) {
            format!("[{rendered}]({href})")
        } else {
            format!(
                r#"<a href="{}">{rendered}</a>"#,
                html_escape::encode_double_quoted_attribute(&href)
            )
        }
    }

    fn render_list(&self, ordered: bool, items: &[ListItem], depth: usize) -> String {
        let indent = "  ".repeat(depth);
        let mut out = String::new();

        for (idx, item) in items.iter().enumerate() {
            let content = self.render_list_item(item, depth);
            if ordered {
                let _ = writeln!(out, "{indent}{}. {}", idx + 1, content.trim());
            } else {
                let _ = writeln!(out, "{indent}- {}", content.trim());
            }
        }

        if depth == 0 {
            out.push('\n');
        }
        out
    }

    /// Item content is one level deeper; nested lists start on their own
    /// line.
    fn render_list_item(&self, item: &ListItem, depth: usize) -> String {
        let mut out = String::new();
        for node in &item.content {
            let rendered = self.render_node(node, depth + 1);
            if matches!(node, Node::List { .. }) && !out.is_empty() && !out.ends_with('\n') {
                out.push('\n');
            }
            out.push_str(&rendered);
        }
        out
    }

    fn render_table(&self, table: &Table, depth: usize) -> String {
        if table.rows.is_empty() {
            return String::new();
        }

        let max_cols = table
            .rows
            .iter()
            .map(|row| row.cells.len())
            .max()
            .unwrap_or_default();

        let mut out = String::new();
        for (row_idx, row) in table.rows.iter().enumerate() {
            for cell in &row.cells {
                let content = self.render_nodes(&cell.content, depth + 1);
                let mut content = escape_cell_pipes(content.trim());

                if let Some(col_id) = &cell.col_id {
                    let _ = write!(content, " <!-- {col_id} -->");
                }
                if cell.colspan > 1 {
                    let _ = write!(content, " <!-- colspan: {} -->", cell.colspan);
                }
                if cell.rowspan > 1 {
                    let _ = write!(content, " <!-- rowspan: {} -->", cell.rowspan);
                }

                let _ = write!(out, "| {content} ");
            }
            for _ in row.cells.len()..max_cols {
                out.push_str("|  ");
            }
            out.push_str("|\n");

            if row_idx == 0 && table.has_header {
                out.push_str(&"| --- ".repeat(max_cols));
                out.push_str("|\n");
            }
        }

        out.push('\n');
        out
    }
}

/// Percent-encodes the spaces of a URL, which would otherwise end the link
/// destination.
fn encode_url(url: &str) -> Cow<'_, str> {
    if url.contains(' ') {
        Cow::Owned(url.replace(' ', "%20"))
    } else {
        Cow::Borrowed(url)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::ast::{CustomNode, TableCell, TableRow};
    use crate::options::{ConversionHooks, ConversionOptions, EscapeMode};

    fn render_with(nodes: Vec<Node>, opts: &ConversionOptions) -> String {
        MarkdownWriter::new(opts).render(&nodes, &BTreeMap::new())
    }

    fn render(nodes: Vec<Node>) -> String {
        render_with(nodes, &ConversionOptions::default())
    }

    fn cell(text: &str) -> TableCell {
        TableCell {
            content: vec![Node::text(text)],
            ..TableCell::default()
        }
    }

    #[test]
    fn test_heading_and_inline_formatting() {
        let nodes = vec![
            Node::Heading {
                level: 2,
                content: vec![Node::text(" Title ")],
            },
            Node::text("some "),
            Node::Bold(vec![Node::text(" bold ")]),
            Node::text(" and "),
            Node::Italic(vec![Node::text("italic")]),
            Node::text(" and "),
            Node::Strikethrough(vec![Node::text("gone")]),
        ];
        assert_eq!(
            render(nodes),
            "## Title\n\nsome **bold** and *italic* and ~~gone~~"
        );
    }

    #[test]
    fn test_link_forms() {
        let simple = Node::Link {
            href: "https://example.com/a b".into(),
            content: vec![Node::text("Example")],
        };
        assert_eq!(render(vec![simple]), "[Example](https://example.com/a%20b)");

        let rich = Node::Link {
            href: r#"/search?q="x"&y"#.into(),
            content: vec![Node::Bold(vec![Node::text("strong")])],
        };
        assert_eq!(
            render(vec![rich]),
            r#"<a href="/search?q=&quot;x&quot;&amp;y">**strong**</a>"#
        );
    }

    #[test]
    fn test_media() {
        let nodes = vec![
            Node::Image {
                src: "logo.png".into(),
                alt: " Logo ".into(),
            },
            Node::Video {
                src: "clip.mp4".into(),
                poster: Some("poster.jpg".into()),
                controls: true,
            },
            Node::Video {
                src: "bare.mp4".into(),
                poster: None,
                controls: false,
            },
        ];
        insta::assert_snapshot!(render(nodes), @r"
        ![Logo](logo.png)
        ![Video](clip.mp4)
        ![Poster](poster.jpg)
        Controls: true
        ![Video](bare.mp4)
        ");
    }

    #[test]
    fn test_lists() {
        let nodes = vec![
            Node::List {
                ordered: false,
                items: vec![
                    ListItem {
                        content: vec![Node::text("one")],
                    },
                    ListItem {
                        content: vec![
                            Node::text("two"),
                            Node::List {
                                ordered: true,
                                items: vec![
                                    ListItem {
                                        content: vec![Node::text("first")],
                                    },
                                    ListItem {
                                        content: vec![Node::text("second")],
                                    },
                                ],
                            },
                        ],
                    },
                ],
            },
            Node::text("after"),
        ];
        insta::assert_snapshot!(render(nodes), @r"
        - one
        - two
          1. first
          2. second

        after
        ");
    }

    #[test]
    fn test_code_is_never_escaped() {
        let nodes = vec![
            Node::Code {
                content: "*ptr".into(),
                language: None,
                inline: true,
            },
            Node::text(" then"),
            Node::Code {
                content: "# not a heading\nlet x = [1];".into(),
                language: Some("rust".into()),
                inline: false,
            },
        ];
        assert_eq!(
            render(nodes),
            "`*ptr` then```rust\n# not a heading\nlet x = [1];\n```"
        );
    }

    #[test]
    fn test_code_drops_placeholder_bytes() {
        let nodes = vec![Node::Code {
            content: "\u{1A}*x".into(),
            language: None,
            inline: true,
        }];
        assert_eq!(render(nodes), "`*x`");
    }

    #[test]
    fn test_blockquote() {
        let nodes = vec![Node::Blockquote(vec![
            Node::Heading {
                level: 3,
                content: vec![Node::text("Quoted")],
            },
            Node::text("body"),
        ])];
        assert_eq!(render(nodes), "> ### Quoted\n> \n> body");
    }

    #[test]
    fn test_table_with_header_and_padding() {
        let table = Table {
            rows: vec![
                TableRow {
                    cells: vec![
                        TableCell {
                            is_header: true,
                            ..cell("A")
                        },
                        TableCell {
                            is_header: true,
                            ..cell("B")
                        },
                    ],
                },
                TableRow {
                    cells: vec![cell("a|b")],
                },
            ],
            col_ids: Vec::new(),
            has_header: true,
        };
        insta::assert_snapshot!(render(vec![Node::Table(table)]), @r"
        | A | B |
        | --- | --- |
        | a\|b |  |
        ");
    }

    #[test]
    fn test_table_annotations() {
        let table = Table {
            rows: vec![TableRow {
                cells: vec![
                    TableCell {
                        col_id: Some("A".into()),
                        colspan: 2,
                        ..cell("wide")
                    },
                    TableCell {
                        col_id: Some("B".into()),
                        rowspan: 3,
                        ..cell("tall")
                    },
                ],
            }],
            col_ids: vec!["A".into(), "B".into()],
            has_header: false,
        };
        assert_eq!(
            render(vec![Node::Table(table)]),
            "| wide <!-- A --> <!-- colspan: 2 --> | tall <!-- B --> <!-- rowspan: 3 --> |"
        );
        assert_eq!(render(vec![Node::Table(Table::default())]), "");
    }

    #[test]
    fn test_semantic_wrappers() {
        let semantic = |kind, text: &str| Node::Semantic {
            kind,
            content: vec![Node::text(text)],
        };
        let nodes = vec![
            semantic(SemanticKind::Article, "story"),
            semantic(SemanticKind::Section, "part"),
            semantic(SemanticKind::Aside, "note"),
        ];
        insta::assert_snapshot!(render(nodes), @r"
        story

        ---

        part

        ---

        <!-- <aside> -->
        note
        <!-- </aside> -->
        ");
    }

    #[test]
    fn test_escaping_is_resolved_in_context() {
        assert_eq!(render(vec![Node::text("# not a heading")]), r"\# not a heading");

        let opts = ConversionOptions::builder()
            .escape_mode(EscapeMode::Disabled)
            .build();
        assert_eq!(
            render_with(vec![Node::text("# not a heading")], &opts),
            "# not a heading"
        );
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Badge(&'static str);

    struct Hooks;

    impl ConversionHooks for Hooks {
        fn render_node(&self, node: &Node, _: &ConversionOptions, _: usize) -> Option<String> {
            match node {
                Node::Image { alt, .. } => Some(format!("[image: {alt}]")),
                Node::Code { .. } => Some(String::new()),
                _ => None,
            }
        }

        fn render_custom(
            &self,
            node: &dyn CustomNode,
            _: &ConversionOptions,
            depth: usize,
        ) -> Option<String> {
            let badge = node.as_any().downcast_ref::<Badge>()?;
            Some(format!("({} at {depth})", badge.0))
        }
    }

    #[test]
    fn test_render_hooks() {
        let nodes = vec![
            Node::Image {
                src: "x.png".into(),
                alt: "cat".into(),
            },
            Node::Code {
                content: "code".into(),
                language: None,
                inline: true,
            },
            Node::custom(Badge("new")),
        ];

        assert_eq!(render(nodes.clone()), "![cat](x.png)\n`code`");

        let opts = ConversionOptions::builder().hooks(Hooks).build();
        assert_eq!(render_with(nodes, &opts), "[image: cat]`code`(new at 0)");
    }
}
