//! URL refification.
//!
//! Long absolute URLs are replaced by short reference tokens to save tokens.
//! Media URLs keep their file name and share a token per directory
//! (`ref0://a.jpg`); other URLs with a deep path are replaced as a whole.
//! Relative URLs and data URIs are never rewritten.

use std::collections::{BTreeMap, HashMap};

use ecow::{EcoString, eco_format};

use crate::ast::Node;

/// File extensions treated as media.
const MEDIA_SUFFIXES: [&str; 39] = [
    "jpeg", "jpg", "png", "gif", "bmp", "tiff", "tif", "svg", "webp", "ico", "avi", "mov", "mp4",
    "mkv", "flv", "wmv", "webm", "mpeg", "mpg", "mp3", "wav", "aac", "ogg", "flac", "m4a", "pdf",
    "doc", "docx", "ppt", "pptx", "xls", "xlsx", "txt", "css", "js", "xml", "json", "html", "htm",
];

/// Rewrites the URLs of a document tree in place.
///
/// Returns the reference table, mapping each token to the URL prefix it
/// stands for.
pub fn refify_urls(nodes: &mut [Node]) -> BTreeMap<String, String> {
    let mut refifier = UrlRefifier::default();
    refifier.refify_nodes(nodes);
    refifier.into_references()
}

/// Assigns reference tokens to URL prefixes.
#[derive(Debug, Default)]
pub struct UrlRefifier {
    prefixes: HashMap<String, EcoString>,
}

impl UrlRefifier {
    /// Rewrites every URL-bearing field below `nodes`.
    pub fn refify_nodes(&mut self, nodes: &mut [Node]) {
        for node in nodes {
            match node {
                Node::Link { href, content } => {
                    self.refify_field(href);
                    self.refify_nodes(content);
                }
                Node::Image { src, .. } => self.refify_field(src),
                Node::Video { src, poster, .. } => {
                    self.refify_field(src);
                    if let Some(poster) = poster {
                        self.refify_field(poster);
                    }
                }
                Node::List { items, .. } => {
                    for item in items {
                        self.refify_nodes(&mut item.content);
                    }
                }
                Node::Table(table) => {
                    for cell in table.rows.iter_mut().flat_map(|row| &mut row.cells) {
                        self.refify_nodes(&mut cell.content);
                    }
                }
                Node::Bold(content)
                | Node::Italic(content)
                | Node::Strikethrough(content)
                | Node::Blockquote(content)
                | Node::Heading { content, .. }
                | Node::Semantic { content, .. } => self.refify_nodes(content),
                Node::Text(_)
                | Node::Code { .. }
                | Node::MetaData(_)
                | Node::Custom(_) => {}
            }
        }
    }

    fn refify_field(&mut self, url: &mut EcoString) {
        if let Some(rewritten) = self.process_url(url) {
            *url = rewritten;
        }
    }

    /// Returns the replacement for a URL, or `None` if it stays unchanged.
    pub fn process_url(&mut self, url: &str) -> Option<EcoString> {
        if !url.starts_with("http") {
            return None;
        }

        if is_media(url)
            && let Some((prefix, filename)) = url.rsplit_once('/')
        {
            let token = self.token_for(prefix);
            return Some(eco_format!("{token}://{filename}"));
        }

        if url.split('/').count() > 4 {
            return Some(self.token_for(url));
        }

        None
    }

    fn token_for(&mut self, prefix: &str) -> EcoString {
        if let Some(token) = self.prefixes.get(prefix) {
            return token.clone();
        }
        let token = eco_format!("ref{}", self.prefixes.len());
        self.prefixes.insert(prefix.to_owned(), token.clone());
        token
    }

    /// The reference table, token to prefix.
    pub fn into_references(self) -> BTreeMap<String, String> {
        self.prefixes
            .into_iter()
            .map(|(prefix, token)| (token.into(), prefix))
            .collect()
    }
}

/// Whether the text after the last `.` (query and fragment stripped) is a
/// media extension.
fn is_media(url: &str) -> bool {
    let suffix = url.rsplit('.').next().unwrap_or_default();
    let suffix = suffix.split(['?', '#']).next().unwrap_or_default();
    MEDIA_SUFFIXES.contains(&suffix.to_ascii_lowercase().as_str())
}
