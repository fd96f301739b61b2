#![doc = include_str!("../README.md")]

pub mod ast;
pub mod content;
pub mod dom;
mod error;
pub mod escape;
pub mod metadata;
pub mod options;
pub mod parser;
pub mod url;
pub mod writer;

#[cfg(test)]
mod tests;

use std::collections::BTreeMap;
use std::io::Read;

use markup5ever_rcdom::Handle;

pub use error::*;

pub use crate::ast::Node;
pub use crate::options::{
    ConversionHooks, ConversionOptions, ConversionOptionsBuilder, EscapeMode, MetaDataMode,
};
use crate::writer::MarkdownWriter;

/// The result type for semantic-md.
pub type Result<T, Err = Error> = std::result::Result<T, Err>;

/// The outcome of a conversion.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Converted {
    /// The rendered Markdown.
    pub markdown: String,
    /// Reference tokens created by URL refification, mapped to the URL
    /// prefixes they stand for. Empty unless refification is enabled.
    pub url_map: BTreeMap<String, String>,
}

/// Converts an HTML string to Markdown.
///
/// ```rust
/// use semantic_md::{ConversionOptions, convert_str};
///
/// let html = "<h1>Hello</h1><p>It's <b>bold</b>.</p>";
/// let converted = convert_str(html, &ConversionOptions::default()).unwrap();
/// assert_eq!(converted.markdown, "# Hello\n\nIt's **bold**.");
/// ```
pub fn convert_str(html: &str, opts: &ConversionOptions) -> Result<Converted> {
    if html.is_empty() {
        return Err(Error::new(ErrorKind::EmptyInput, "empty HTML input"));
    }
    convert_reader(&mut html.as_bytes(), opts)
}

/// Converts an HTML document read from `reader` to Markdown.
pub fn convert_reader<R: Read>(reader: &mut R, opts: &ConversionOptions) -> Result<Converted> {
    let dom = dom::parse_html(reader)?;
    Ok(convert_dom(&dom.document, opts))
}

/// Converts an already parsed document to Markdown.
pub fn convert_dom(root: &Handle, opts: &ConversionOptions) -> Converted {
    log::debug!("starting HTML to Markdown conversion");

    let meta = if opts.include_meta_data != MetaDataMode::None {
        log::debug!("extracting metadata (mode: {})", opts.include_meta_data);
        dom::find_element(root, "head")
            .and_then(|head| metadata::extract_metadata(&head, opts.include_meta_data))
    } else {
        None
    };

    let root = if opts.extract_main_content {
        log::debug!("extracting main content");
        content::find_main_content(root)
    } else {
        root.clone()
    };

    let mut nodes = parser::parse(&root, opts);
    log::debug!("parsed {} top-level nodes", nodes.len());

    if let Some(meta) = meta {
        nodes.insert(0, Node::MetaData(meta));
    }

    let url_map = if opts.refify_urls {
        let url_map = url::refify_urls(&mut nodes);
        log::debug!("created {} URL references", url_map.len());
        url_map
    } else {
        BTreeMap::new()
    };

    let markdown = MarkdownWriter::new(opts).render(&nodes, &url_map);
    log::debug!("conversion complete, generated {} bytes", markdown.len());

    Converted { markdown, url_map }
}
