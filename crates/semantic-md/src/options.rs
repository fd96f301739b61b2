//! Conversion options.
//!
//! This module provides the configuration shared by every stage of a
//! conversion, together with the host extension hooks.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use markup5ever_rcdom::Handle;
use serde::{Deserialize, Serialize};

use crate::ast::{CustomNode, Node};
use crate::error::Error;

/// Which head metadata is extracted and rendered as frontmatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetaDataMode {
    /// No metadata.
    #[default]
    None,
    /// Title and plain `<meta name>` entries.
    Basic,
    /// Basic entries plus Open Graph, Twitter cards and JSON-LD.
    Extended,
}

impl MetaDataMode {
    /// The option value naming this mode.
    pub fn as_str(self) -> &'static str {
        match self {
            MetaDataMode::None => "none",
            MetaDataMode::Basic => "basic",
            MetaDataMode::Extended => "extended",
        }
    }
}

impl fmt::Display for MetaDataMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetaDataMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "" | "none" => Ok(MetaDataMode::None),
            "basic" => Ok(MetaDataMode::Basic),
            "extended" => Ok(MetaDataMode::Extended),
            _ => Err(Error::invalid_configuration(format!(
                "invalid metadata mode: {s:?} (must be empty, 'basic', or 'extended')"
            ))),
        }
    }
}

/// How text is escaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EscapeMode {
    /// Escape characters only where they would form Markdown syntax.
    #[default]
    Smart,
    /// Emit text verbatim.
    Disabled,
}

impl EscapeMode {
    /// The option value naming this mode.
    pub fn as_str(self) -> &'static str {
        match self {
            EscapeMode::Smart => "smart",
            EscapeMode::Disabled => "disabled",
        }
    }
}

impl fmt::Display for EscapeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EscapeMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "" | "smart" => Ok(EscapeMode::Smart),
            "disabled" => Ok(EscapeMode::Disabled),
            _ => Err(Error::invalid_configuration(format!(
                "invalid escape mode: {s:?} (must be 'smart' or 'disabled')"
            ))),
        }
    }
}

/// Host extension points.
///
/// Every method has a default implementation that declines, so a host only
/// overrides the hooks it needs. Hooks are shared between conversions and
/// must not rely on per-call state.
pub trait ConversionHooks: Send + Sync {
    /// Called for every child of a parsed element before the built-in
    /// dispatch. Returning `Some` replaces the child with the given nodes,
    /// `Some(vec![])` drops it.
    fn override_element(
        &self,
        element: &Handle,
        opts: &ConversionOptions,
        depth: usize,
    ) -> Option<Vec<Node>> {
        let _ = (element, opts, depth);
        None
    }

    /// Called for elements without a built-in rule. Returning `None` keeps
    /// the default of converting the element's children.
    fn unhandled_element(
        &self,
        element: &Handle,
        opts: &ConversionOptions,
        depth: usize,
    ) -> Option<Vec<Node>> {
        let _ = (element, opts, depth);
        None
    }

    /// Called for every node before it is rendered. A non-empty result is
    /// used verbatim instead of the built-in rendering.
    fn render_node(&self, node: &Node, opts: &ConversionOptions, depth: usize) -> Option<String> {
        let _ = (node, opts, depth);
        None
    }

    /// Renders the payload of a [`Node::Custom`]. Custom nodes render as
    /// nothing when this returns `None`.
    fn render_custom(
        &self,
        node: &dyn CustomNode,
        opts: &ConversionOptions,
        depth: usize,
    ) -> Option<String> {
        let _ = (node, opts, depth);
        None
    }
}

/// Conversion options
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConversionOptions {
    /// Whether to convert only the detected main content
    pub extract_main_content: bool,
    /// Which head metadata to render as frontmatter
    pub include_meta_data: MetaDataMode,
    /// Whether to replace long URLs by reference tokens
    #[serde(rename = "refifyURLs")]
    pub refify_urls: bool,
    /// Whether to annotate table cells with column IDs
    pub enable_table_column_tracking: bool,
    /// How text is escaped
    pub escape_mode: EscapeMode,
    /// Base domain of the document. Stored only, relative URLs are never
    /// resolved against it.
    pub website_domain: String,
    /// Host extension hooks
    #[serde(skip)]
    pub hooks: Option<Arc<dyn ConversionHooks>>,
}

impl fmt::Debug for ConversionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionOptions")
            .field("extract_main_content", &self.extract_main_content)
            .field("include_meta_data", &self.include_meta_data)
            .field("refify_urls", &self.refify_urls)
            .field(
                "enable_table_column_tracking",
                &self.enable_table_column_tracking,
            )
            .field("escape_mode", &self.escape_mode)
            .field("website_domain", &self.website_domain)
            .field("hooks", &self.hooks.is_some())
            .finish()
    }
}

impl ConversionOptions {
    /// Create a builder starting from the default options.
    pub fn builder() -> ConversionOptionsBuilder {
        ConversionOptionsBuilder::new()
    }

    /// The installed hooks, if any.
    pub(crate) fn hooks(&self) -> Option<&dyn ConversionHooks> {
        self.hooks.as_deref()
    }
}

/// Builder for ConversionOptions
#[derive(Default)]
pub struct ConversionOptionsBuilder {
    options: ConversionOptions,
}

impl ConversionOptionsBuilder {
    /// Create a new ConversionOptionsBuilder with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether to convert only the detected main content
    pub fn extract_main_content(mut self, extract: bool) -> Self {
        self.options.extract_main_content = extract;
        self
    }

    /// Set the metadata mode
    pub fn include_meta_data(mut self, mode: MetaDataMode) -> Self {
        self.options.include_meta_data = mode;
        self
    }

    /// Set the metadata mode from its option value
    pub fn include_meta_data_str(self, mode: &str) -> Result<Self, Error> {
        Ok(self.include_meta_data(mode.parse()?))
    }

    /// Set whether to replace long URLs by reference tokens
    pub fn refify_urls(mut self, refify: bool) -> Self {
        self.options.refify_urls = refify;
        self
    }

    /// Set whether to annotate table cells with column IDs
    pub fn enable_table_column_tracking(mut self, enable: bool) -> Self {
        self.options.enable_table_column_tracking = enable;
        self
    }

    /// Set the escape mode
    pub fn escape_mode(mut self, mode: EscapeMode) -> Self {
        self.options.escape_mode = mode;
        self
    }

    /// Set the escape mode from its option value
    pub fn escape_mode_str(self, mode: &str) -> Result<Self, Error> {
        Ok(self.escape_mode(mode.parse()?))
    }

    /// Set the website domain
    pub fn website_domain(mut self, domain: impl Into<String>) -> Self {
        self.options.website_domain = domain.into();
        self
    }

    /// Install host extension hooks
    pub fn hooks(mut self, hooks: impl ConversionHooks + 'static) -> Self {
        self.options.hooks = Some(Arc::new(hooks));
        self
    }

    /// Build the ConversionOptions
    pub fn build(self) -> ConversionOptions {
        self.options
    }
}
