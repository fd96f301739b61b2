//! Parser implementation for HTML to the semantic document tree

mod core;
mod table;

pub use self::core::HtmlToAstParser;
pub use self::table::{TableParser, generate_column_id};

use markup5ever_rcdom::Handle;

use crate::ast::Node;
use crate::options::ConversionOptions;

/// Converts the children of `root` into document nodes.
pub fn parse(root: &Handle, opts: &ConversionOptions) -> Vec<Node> {
    HtmlToAstParser::new(opts).parse(root)
}
