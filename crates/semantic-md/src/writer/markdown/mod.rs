//! Markdown writer.
//!
//! Rendering happens in two passes. All nodes are first written into one
//! buffer with their text marked by the [`Escaper`]; the marks are resolved
//! only once the whole body exists, because whether a character needs a
//! backslash depends on what ends up around it.

mod emit;
mod frontmatter;

use std::collections::BTreeMap;

use crate::ast::{MetaData, Node};
use crate::escape::Escaper;
use crate::options::{ConversionOptions, MetaDataMode};

pub use self::frontmatter::render_frontmatter;

/// Markdown writer
///
/// Serializes a document tree to CommonMark text.
#[derive(Debug)]
pub struct MarkdownWriter<'a> {
    /// Conversion options
    pub opts: &'a ConversionOptions,
    escaper: Escaper,
}

impl<'a> MarkdownWriter<'a> {
    /// Create a writer for the given options.
    pub fn new(opts: &'a ConversionOptions) -> Self {
        Self {
            opts,
            escaper: Escaper::new(opts.escape_mode),
        }
    }

    /// Render a document.
    ///
    /// The frontmatter is emitted when the tree holds a [`Node::MetaData`]
    /// and metadata is enabled; `url_map` feeds its `urlReferences` block.
    /// Trailing whitespace is removed from the result.
    pub fn render(&self, nodes: &[Node], url_map: &BTreeMap<String, String>) -> String {
        let mut output = String::new();

        if self.opts.include_meta_data != MetaDataMode::None
            && let Some(meta) = find_metadata(nodes)
        {
            output.push_str(&render_frontmatter(meta, self.opts, url_map));
        }

        let body = self.render_nodes(nodes, 0);
        output.push_str(&self.escaper.resolve(&body));

        let len = output.trim_end_matches(['\n', '\r', '\t', ' ']).len();
        output.truncate(len);
        output
    }
}

fn find_metadata(nodes: &[Node]) -> Option<&MetaData> {
    nodes.iter().find_map(|node| match node {
        Node::MetaData(meta) => Some(meta),
        _ => None,
    })
}
