//! Main content detection.
//!
//! Pages usually wrap their article in navigation, banners and footers. An
//! explicit `<main>` element or `role="main"` wins outright; otherwise every
//! element below `<body>` is scored with a few cheap heuristics and the best
//! candidate is kept.

use markup5ever_rcdom::{Handle, NodeData};

use crate::dom;

/// Minimum score for an element to be considered as main content.
pub const MIN_SCORE: u32 = 20;

const HIGH_IMPACT_ATTRIBUTES: [&str; 5] =
    ["article", "content", "main-container", "main", "main-content"];
const HIGH_IMPACT_TAGS: [&str; 3] = ["article", "main", "section"];

/// Returns the element holding the primary content of a document.
///
/// Falls back to `<body>`, or to `root` itself when there is no body.
pub fn find_main_content(root: &Handle) -> Handle {
    if let Some(main) = dom::find_element(root, "main") {
        log::debug!("main content: explicit <main> element");
        return main;
    }

    if let Some(role_main) = dom::find_first(root, &has_main_role) {
        log::debug!("main content: element with role=main");
        return role_main;
    }

    let body = dom::find_element(root, "body").unwrap_or_else(|| root.clone());
    detect_main_content(&body)
}

/// Scores every element below `body` and returns the best candidate, or
/// `body` itself when no element reaches [`MIN_SCORE`].
///
/// Among equally scored candidates the first one in document order wins.
pub fn detect_main_content(body: &Handle) -> Handle {
    let mut best: Option<(u32, Handle)> = None;
    let mut candidates = 0;

    dom::walk(body, &mut |node| {
        if !matches!(node.data, NodeData::Element { .. }) {
            return;
        }
        let score = calculate_score(node);
        if score < MIN_SCORE {
            return;
        }
        candidates += 1;
        if best.as_ref().is_none_or(|(top, _)| score > *top) {
            best = Some((score, node.clone()));
        }
    });

    match best {
        Some((score, node)) => {
            log::debug!(
                "main content: <{}> scored {score} out of {candidates} candidates",
                dom::tag_name(&node).unwrap_or_default()
            );
            node
        }
        None => body.clone(),
    }
}

/// Computes the content score of an element.
pub fn calculate_score(node: &Handle) -> u32 {
    let mut score = 0;

    let id = dom::attr_or_empty(node, "id");
    let class = dom::attr_or_empty(node, "class");
    for attr in HIGH_IMPACT_ATTRIBUTES {
        if id == attr || class.split_whitespace().any(|token| token == attr) {
            score += 10;
        }
    }

    if dom::tag_name(node).is_some_and(|tag| HIGH_IMPACT_TAGS.contains(&tag)) {
        score += 5;
    }

    score += dom::count_elements(node, "p").min(5) as u32;

    let text = dom::text_content(node);
    let text_len = text.trim().len();
    if text_len > 200 {
        score += (text_len / 200).min(5) as u32;
    }

    if link_density(node, text.len()) < 0.3 {
        score += 5;
    }

    if dom::has_attr(node, "data-main") || dom::has_attr(node, "data-content") {
        score += 10;
    }

    if has_main_role(node) {
        score += 10;
    }

    score
}

fn has_main_role(node: &Handle) -> bool {
    dom::attr(node, "role").is_some_and(|role| role.contains("main"))
}

/// The share of text inside anchors, `0.0` for elements without text.
fn link_density(node: &Handle, text_len: usize) -> f64 {
    if text_len == 0 {
        return 0.0;
    }

    let mut link_len = 0;
    dom::walk(node, &mut |child| {
        if dom::is_element(child, "a") {
            link_len += dom::text_content(child).len();
        }
    });

    link_len as f64 / text_len as f64
}
