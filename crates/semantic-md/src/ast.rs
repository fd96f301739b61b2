//! The document tree produced by the parser and consumed by the renderer.
//!
//! The tree is a closed sum type. Hosts that need content the built-in
//! variants cannot express use [`Node::Custom`] together with the
//! [`ConversionHooks`](crate::ConversionHooks) render callbacks.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Deref;

use ecow::EcoString;

/// Main node type, representing an element of the converted document.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Plain text, escaped when rendered.
    Text(EcoString),
    /// Strong emphasis.
    Bold(Vec<Node>),
    /// Emphasis.
    Italic(Vec<Node>),
    /// Struck-through text.
    Strikethrough(Vec<Node>),
    /// ATX heading.
    Heading {
        /// Heading level, always in `1..=6`.
        level: u8,
        /// Heading content.
        content: Vec<Node>,
    },
    /// Hyperlink.
    Link {
        /// Link target.
        href: EcoString,
        /// Link content.
        content: Vec<Node>,
    },
    /// Image.
    Image {
        /// Image source.
        src: EcoString,
        /// Alternative text.
        alt: EcoString,
    },
    /// Video.
    Video {
        /// Video source.
        src: EcoString,
        /// Poster image, if any.
        poster: Option<EcoString>,
        /// Whether the `controls` attribute was present.
        controls: bool,
    },
    /// Ordered or unordered list.
    List {
        /// Whether the list is numbered.
        ordered: bool,
        /// List items.
        items: Vec<ListItem>,
    },
    /// Table.
    Table(Table),
    /// Block quote.
    Blockquote(Vec<Node>),
    /// A semantic HTML5 container.
    Semantic {
        /// The kind of container.
        kind: SemanticKind,
        /// Container content.
        content: Vec<Node>,
    },
    /// Inline code span or fenced code block. Never escaped.
    Code {
        /// Verbatim code.
        content: EcoString,
        /// Language of a code block.
        language: Option<EcoString>,
        /// Whether this is an inline code span.
        inline: bool,
    },
    /// Document metadata, rendered as frontmatter.
    MetaData(MetaData),
    /// Host-supplied extension node.
    Custom(CustomBox),
}

impl Node {
    /// Creates a text node.
    pub fn text(content: impl Into<EcoString>) -> Self {
        Node::Text(content.into())
    }

    /// Creates a custom node.
    pub fn custom<T: CustomNode + 'static>(node: T) -> Self {
        Node::Custom(CustomBox::new(node))
    }

    /// Whether this is a [`Node::Text`].
    pub fn is_text(&self) -> bool {
        matches!(self, Node::Text(_))
    }
}

/// An item of a [`Node::List`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListItem {
    /// Item content.
    pub content: Vec<Node>,
}

/// The contents of a [`Node::Table`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    /// Table rows in document order.
    pub rows: Vec<TableRow>,
    /// Column IDs recorded from the first row, when column tracking is on.
    pub col_ids: Vec<EcoString>,
    /// Whether the first row consists of header cells only.
    pub has_header: bool,
}

/// A row of a [`Table`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableRow {
    /// Cells of the row.
    pub cells: Vec<TableCell>,
}

/// A cell of a [`TableRow`].
#[derive(Debug, Clone, PartialEq)]
pub struct TableCell {
    /// Cell content.
    pub content: Vec<Node>,
    /// Positional column ID, when column tracking is on.
    pub col_id: Option<EcoString>,
    /// Number of spanned columns, at least 1.
    pub colspan: u32,
    /// Number of spanned rows, at least 1.
    pub rowspan: u32,
    /// Whether the cell came from a `th` element.
    pub is_header: bool,
}

impl Default for TableCell {
    fn default() -> Self {
        Self {
            content: Vec::new(),
            col_id: None,
            colspan: 1,
            rowspan: 1,
            is_header: false,
        }
    }
}

macro_rules! semantic_kinds {
    ($($variant:ident => $tag:literal,)*) => {
        /// The semantic HTML5 elements preserved by the converter.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum SemanticKind {
            $(
                #[doc = concat!("`<", $tag, ">`")]
                $variant,
            )*
        }

        impl SemanticKind {
            /// Looks up the kind for a lowercase tag name.
            pub fn from_tag(tag: &str) -> Option<Self> {
                match tag {
                    $($tag => Some(Self::$variant),)*
                    _ => None,
                }
            }

            /// The tag name of this kind.
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $tag,)*
                }
            }
        }
    };
}

semantic_kinds! {
    Article => "article",
    Section => "section",
    Aside => "aside",
    Nav => "nav",
    Header => "header",
    Footer => "footer",
    Main => "main",
    Figure => "figure",
    Figcaption => "figcaption",
    Details => "details",
    Summary => "summary",
    Mark => "mark",
    Time => "time",
}

impl fmt::Display for SemanticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata extracted from the document head.
///
/// Maps are ordered, so rendering is deterministic regardless of the order of
/// the source elements.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MetaData {
    /// Title and plain `<meta name>` entries.
    pub standard: BTreeMap<String, String>,
    /// `og:*` properties, prefix stripped.
    pub open_graph: BTreeMap<String, String>,
    /// `twitter:*` names, prefix stripped.
    pub twitter: BTreeMap<String, String>,
    /// JSON-LD objects in document order.
    pub json_ld: Vec<serde_json::Map<String, serde_json::Value>>,
}

impl MetaData {
    /// Whether nothing was extracted.
    pub fn is_empty(&self) -> bool {
        self.standard.is_empty()
            && self.open_graph.is_empty()
            && self.twitter.is_empty()
            && self.json_ld.is_empty()
    }
}

/// Trait for host-supplied node payloads carried by [`Node::Custom`].
///
/// Every `Debug + Clone + PartialEq + Send + Sync` type implements it, so a
/// host only needs to derive those traits:
///
/// ```rust
/// use semantic_md::ast::Node;
///
/// #[derive(Debug, Clone, PartialEq)]
/// struct Badge(&'static str);
///
/// let node = Node::custom(Badge("new"));
/// assert!(matches!(node, Node::Custom(_)));
/// ```
pub trait CustomNode: fmt::Debug + Send + Sync {
    /// Clone the custom node.
    fn clone_box(&self) -> Box<dyn CustomNode>;

    /// Check if two custom nodes are equal.
    fn eq_box(&self, other: &dyn CustomNode) -> bool;

    /// Convert to Any for type casting.
    fn as_any(&self) -> &dyn Any;

    /// Get the type name of the custom node for pattern matching.
    fn type_name(&self) -> &'static str;
}

impl<T> CustomNode for T
where
    T: fmt::Debug + Clone + PartialEq + Send + Sync + 'static,
{
    fn clone_box(&self) -> Box<dyn CustomNode> {
        Box::new(self.clone())
    }

    fn eq_box(&self, other: &dyn CustomNode) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| self == other)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// An owned [`CustomNode`] that can live inside a [`Node`].
#[derive(Debug)]
pub struct CustomBox(Box<dyn CustomNode>);

impl CustomBox {
    /// Boxes a custom node.
    pub fn new<T: CustomNode + 'static>(node: T) -> Self {
        Self(Box::new(node))
    }

    /// Returns the payload if it is of type `T`.
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }

    /// The type name of the payload.
    pub fn type_name(&self) -> &'static str {
        self.0.type_name()
    }
}

impl Deref for CustomBox {
    type Target = dyn CustomNode;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

impl Clone for CustomBox {
    fn clone(&self) -> Self {
        Self(self.0.clone_box())
    }
}

impl PartialEq for CustomBox {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_box(other.0.as_ref())
    }
}
