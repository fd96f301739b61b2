//! Document tree writers.
//!
//! This module provides functionality to serialize the document tree.

pub mod markdown;

pub use self::markdown::MarkdownWriter;
