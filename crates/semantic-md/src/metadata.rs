//! Head metadata extraction.

use markup5ever_rcdom::Handle;
use serde_json::Value;

use crate::ast::MetaData;
use crate::dom;
use crate::options::MetaDataMode;

/// `<meta name>` values that carry no document semantics.
const IGNORED_META_NAMES: [&str; 3] = ["viewport", "referrer", "Content-Security-Policy"];

/// Extracts the metadata of a `<head>` element.
///
/// Returns `None` for [`MetaDataMode::None`]. Basic mode keeps the title and
/// plain named meta entries; extended mode also collects Open Graph and
/// Twitter card properties and JSON-LD objects.
pub fn extract_metadata(head: &Handle, mode: MetaDataMode) -> Option<MetaData> {
    if mode == MetaDataMode::None {
        return None;
    }
    let extended = mode == MetaDataMode::Extended;

    let mut meta = MetaData::default();

    if let Some(title) = dom::find_element(head, "title") {
        meta.standard
            .insert("title".into(), dom::text_content(&title).trim().to_owned());
    }

    let children = dom::element_children(head);
    for child in children.iter().filter(|c| dom::is_element(c, "meta")) {
        let name = dom::attr_or_empty(child, "name");
        let property = dom::attr_or_empty(child, "property");
        let content = dom::attr_or_empty(child, "content");

        if let Some(key) = property.strip_prefix("og:").filter(|_| !content.is_empty()) {
            if extended {
                meta.open_graph.insert(key.to_owned(), content);
            }
        } else if let Some(key) = name.strip_prefix("twitter:").filter(|_| !content.is_empty()) {
            if extended {
                meta.twitter.insert(key.to_owned(), content);
            }
        } else if !name.is_empty()
            && !content.is_empty()
            && !IGNORED_META_NAMES.contains(&name.as_str())
        {
            meta.standard.insert(name, content);
        }
    }

    if extended {
        let scripts = children.iter().filter(|c| {
            dom::is_element(c, "script")
                && dom::attr(c, "type").as_deref() == Some("application/ld+json")
        });
        for script in scripts {
            let source = dom::text_content(script);
            if source.is_empty() {
                continue;
            }
            match serde_json::from_str::<Value>(&source) {
                Ok(Value::Object(object)) => meta.json_ld.push(object),
                Ok(_) => log::debug!("skipping JSON-LD that is not an object"),
                Err(err) => log::debug!("skipping malformed JSON-LD: {err}"),
            }
        }
    }

    log::debug!(
        "extracted metadata: {} standard, {} Open Graph, {} Twitter, {} JSON-LD",
        meta.standard.len(),
        meta.open_graph.len(),
        meta.twitter.len(),
        meta.json_ld.len()
    );

    Some(meta)
}
