//! Helpers over the parsed HTML tree.

use std::io::Read;

use html5ever::tendril::TendrilSink;
use html5ever::tree_builder::TreeBuilderOpts;
use html5ever::{ParseOpts, parse_document};
use markup5ever_rcdom::{Handle, NodeData, RcDom};

use crate::Result;

/// Parses an HTML document.
pub fn parse_html<R: Read>(reader: &mut R) -> Result<RcDom> {
    let opts = ParseOpts {
        tree_builder: TreeBuilderOpts {
            drop_doctype: true,
            ..Default::default()
        },
        ..Default::default()
    };
    let dom = parse_document(RcDom::default(), opts)
        .from_utf8()
        .read_from(reader)?;
    Ok(dom)
}

/// The lowercase tag name of an element.
pub fn tag_name(handle: &Handle) -> Option<&str> {
    match &handle.data {
        NodeData::Element { name, .. } => Some(name.local.as_ref()),
        _ => None,
    }
}

/// Whether the node is an element with the given lowercase tag name.
pub fn is_element(handle: &Handle, tag: &str) -> bool {
    tag_name(handle).is_some_and(|name| name.eq_ignore_ascii_case(tag))
}

/// The value of an attribute, if present.
pub fn attr(handle: &Handle, key: &str) -> Option<String> {
    let NodeData::Element { attrs, .. } = &handle.data else {
        return None;
    };
    attrs
        .borrow()
        .iter()
        .find(|attr| attr.name.local.as_ref() == key)
        .map(|attr| attr.value.to_string())
}

/// The value of an attribute, or the empty string.
pub fn attr_or_empty(handle: &Handle, key: &str) -> String {
    attr(handle, key).unwrap_or_default()
}

/// Whether an attribute is present, regardless of its value.
pub fn has_attr(handle: &Handle, key: &str) -> bool {
    let NodeData::Element { attrs, .. } = &handle.data else {
        return false;
    };
    attrs.borrow().iter().any(|attr| attr.name.local.as_ref() == key)
}

/// The concatenated text of the node and all of its descendants.
pub fn text_content(handle: &Handle) -> String {
    let mut out = String::new();
    collect_text(handle, &mut out);
    out
}

fn collect_text(handle: &Handle, out: &mut String) {
    if let NodeData::Text { contents } = &handle.data {
        out.push_str(&contents.borrow());
        return;
    }
    for child in handle.children.borrow().iter() {
        collect_text(child, out);
    }
}

/// The element children of a node, in document order.
pub fn element_children(handle: &Handle) -> Vec<Handle> {
    handle
        .children
        .borrow()
        .iter()
        .filter(|child| matches!(child.data, NodeData::Element { .. }))
        .cloned()
        .collect()
}

/// The parent of a node, if it is still alive.
pub fn parent(handle: &Handle) -> Option<Handle> {
    let weak = handle.parent.take()?;
    let parent = weak.upgrade();
    handle.parent.set(Some(weak));
    parent
}

/// The first node, in depth-first document order and including `handle`
/// itself, that satisfies the predicate.
pub fn find_first(handle: &Handle, pred: &impl Fn(&Handle) -> bool) -> Option<Handle> {
    if pred(handle) {
        return Some(handle.clone());
    }
    handle
        .children
        .borrow()
        .iter()
        .find_map(|child| find_first(child, pred))
}

/// The first element with the given tag name, see [`find_first`].
pub fn find_element(handle: &Handle, tag: &str) -> Option<Handle> {
    find_first(handle, &|node| is_element(node, tag))
}

/// Visits the node and all of its descendants in depth-first document order.
pub fn walk(handle: &Handle, f: &mut impl FnMut(&Handle)) {
    f(handle);
    for child in handle.children.borrow().iter() {
        walk(child, f);
    }
}

/// Counts the elements with the given tag name, `handle` included.
pub fn count_elements(handle: &Handle, tag: &str) -> usize {
    let mut count = 0;
    walk(handle, &mut |node| {
        if is_element(node, tag) {
            count += 1;
        }
    });
    count
}

#[cfg(test)]
pub(crate) fn parse_str(html: &str) -> Handle {
    let dom = parse_html(&mut html.as_bytes()).unwrap();
    dom.document
}
