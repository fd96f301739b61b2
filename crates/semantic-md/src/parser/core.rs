//! HTML parser core, containing the element dispatch and general parsing logic.

use std::sync::LazyLock;

use ecow::EcoString;
use markup5ever_rcdom::{Handle, NodeData};
use regex::Regex;

use crate::ast::{ListItem, Node, SemanticKind};
use crate::dom;
use crate::options::ConversionOptions;

use super::table::TableParser;

static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// HTML to document tree parser.
pub struct HtmlToAstParser<'a> {
    /// The options of the running conversion.
    pub opts: &'a ConversionOptions,
}

impl<'a> HtmlToAstParser<'a> {
    /// Creates a parser for one conversion.
    pub fn new(opts: &'a ConversionOptions) -> Self {
        Self { opts }
    }

    /// Converts the children of `root`. The root itself is not converted.
    pub fn parse(&self, root: &Handle) -> Vec<Node> {
        self.convert_block(root, 0)
    }

    /// Converts the children of a block container.
    fn convert_block(&self, node: &Handle, depth: usize) -> Vec<Node> {
        let mut nodes = self.convert_children(node, depth);
        trim_block_edges(&mut nodes);
        nodes
    }

    /// Converts every child of `node` at the given nesting depth.
    pub fn convert_children(&self, node: &Handle, depth: usize) -> Vec<Node> {
        let mut result = Vec::new();

        for child in node.children.borrow().iter() {
            if let Some(nodes) = self
                .opts
                .hooks()
                .and_then(|hooks| hooks.override_element(child, self.opts, depth))
            {
                result.extend(nodes);
                continue;
            }

            match &child.data {
                NodeData::Text { contents } => {
                    if let Some(text) = normalize_text(&contents.borrow()) {
                        result.push(Node::Text(text));
                    }
                }
                NodeData::Element { .. } => result.extend(self.convert_element(child, depth)),
                _ => {}
            }
        }

        result
    }

    /// Converts a single element.
    pub fn convert_element(&self, element: &Handle, depth: usize) -> Vec<Node> {
        let Some(tag) = dom::tag_name(element).map(str::to_ascii_lowercase) else {
            return Vec::new();
        };

        match tag.as_str() {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let level = tag.as_bytes()[1] - b'0';
                vec![Node::Heading {
                    level,
                    content: self.convert_children(element, depth),
                }]
            }
            "p" => self.convert_children(element, depth),
            "a" => vec![Node::Link {
                href: dom::attr_or_empty(element, "href").into(),
                content: self.convert_children(element, depth),
            }],
            "img" => vec![Node::Image {
                src: dom::attr_or_empty(element, "src").into(),
                alt: dom::attr_or_empty(element, "alt").into(),
            }],
            "video" => vec![Node::Video {
                src: dom::attr_or_empty(element, "src").into(),
                poster: dom::attr(element, "poster")
                    .filter(|poster| !poster.is_empty())
                    .map(EcoString::from),
                controls: dom::has_attr(element, "controls"),
            }],
            "ul" | "ol" => vec![self.convert_list(element, tag == "ol", depth)],
            "strong" | "b" => vec![Node::Bold(self.convert_children(element, depth))],
            "em" | "i" => vec![Node::Italic(self.convert_children(element, depth))],
            "s" | "strike" | "del" => {
                vec![Node::Strikethrough(self.convert_children(element, depth))]
            }
            "code" => self.convert_inline_code(element),
            "pre" => vec![convert_preformatted(element)],
            "blockquote" => vec![Node::Blockquote(self.convert_block(element, depth))],
            "table" => vec![Node::Table(TableParser::convert_table(self, element, depth))],
            "br" => vec![Node::text("\n")],
            "div" | "span" => self.convert_children(element, depth),
            "script" | "style" | "noscript" => Vec::new(),
            other => {
                if let Some(kind) = SemanticKind::from_tag(other) {
                    return vec![Node::Semantic {
                        kind,
                        content: self.convert_block(element, depth),
                    }];
                }

                if let Some(nodes) = self
                    .opts
                    .hooks()
                    .and_then(|hooks| hooks.unhandled_element(element, self.opts, depth))
                {
                    return nodes;
                }
                self.convert_children(element, depth)
            }
        }
    }

    /// Converts a list. Only direct `li` children become items.
    fn convert_list(&self, element: &Handle, ordered: bool, depth: usize) -> Node {
        let items = dom::element_children(element)
            .iter()
            .filter(|child| dom::is_element(child, "li"))
            .map(|li| ListItem {
                content: self.convert_block(li, depth + 1),
            })
            .collect();

        Node::List { ordered, items }
    }

    /// Inline code. Code directly inside `pre` is handled by the `pre` rule.
    fn convert_inline_code(&self, element: &Handle) -> Vec<Node> {
        if dom::parent(element).is_some_and(|parent| dom::is_element(&parent, "pre")) {
            return Vec::new();
        }

        vec![Node::Code {
            content: dom::text_content(element).into(),
            language: None,
            inline: true,
        }]
    }
}

/// A code block. The text comes from the first `code` child when it has any,
/// otherwise from the `pre` element itself.
fn convert_preformatted(element: &Handle) -> Node {
    let code = dom::element_children(element)
        .into_iter()
        .find(|child| dom::is_element(child, "code"));

    let mut content = String::new();
    let mut language = None;
    if let Some(code) = &code {
        content = dom::text_content(code);
        language = dom::attr(code, "class").and_then(|class| code_language(&class));
    }
    if content.is_empty() {
        content = dom::text_content(element);
    }

    Node::Code {
        content: content.into(),
        language,
        inline: false,
    }
}

/// The language named by a `language-*` or `lang-*` class.
fn code_language(class: &str) -> Option<EcoString> {
    class.split_whitespace().find_map(|token| {
        token
            .strip_prefix("language-")
            .or_else(|| token.strip_prefix("lang-"))
            .filter(|lang| !lang.is_empty())
            .map(EcoString::from)
    })
}

/// Drops the boundary spaces of text that starts or ends a block: text at
/// either end of the container, next to a block node, or after a line break
/// or another space.
fn trim_block_edges(nodes: &mut Vec<Node>) {
    for i in 0..nodes.len() {
        let at_start = i == 0
            || match &nodes[i - 1] {
                Node::Text(prev) => prev.ends_with([' ', '\n']),
                prev => is_block(prev),
            };
        let at_end = nodes.get(i + 1).is_none_or(is_block);

        if let Node::Text(text) = &mut nodes[i] {
            let mut trimmed = text.as_str();
            if at_start {
                trimmed = trimmed.trim_start_matches(' ');
            }
            if at_end {
                trimmed = trimmed.trim_end_matches(' ');
            }
            if trimmed.len() != text.len() {
                let trimmed = EcoString::from(trimmed);
                *text = trimmed;
            }
        }
    }

    nodes.retain(|node| !matches!(node, Node::Text(text) if text.is_empty()));
}

/// Nodes whose rendering ends a line.
fn is_block(node: &Node) -> bool {
    match node {
        Node::Code { inline, .. } => !inline,
        Node::Heading { .. }
        | Node::Image { .. }
        | Node::Video { .. }
        | Node::List { .. }
        | Node::Blockquote(_)
        | Node::Table(_)
        | Node::Semantic { .. }
        | Node::MetaData(_) => true,
        _ => false,
    }
}

/// Collapses whitespace runs of a text node.
///
/// Returns `None` for whitespace-only text. A single space is kept on each
/// side that had whitespace in the source, so that inline siblings stay
/// separated.
fn normalize_text(raw: &str) -> Option<EcoString> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let mut text = EcoString::new();
    if raw.starts_with(char::is_whitespace) {
        text.push(' ');
    }
    text.push_str(&WHITESPACE_RUN.replace_all(trimmed, " "));
    if raw.ends_with(char::is_whitespace) {
        text.push(' ');
    }
    Some(text)
}
