use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use super::ContentNode;

/// Tags that carry readable article structure.
pub const CONTENT_TAGS: &str = "p, h1, h2, h3, h4, h5, h6, img, blockquote, pre, li";

static CONTENT_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(CONTENT_TAGS).expect("content selector is valid CSS"));

/// Parse `html` and collect every allowlisted element in document order.
///
/// Broken markup is repaired by the HTML5 tree builder rather than rejected,
/// so this never fails; garbage in simply yields fewer nodes.
pub fn select_content(html: &str) -> Vec<ContentNode> {
    let document = Html::parse_document(html);
    let nodes: Vec<ContentNode> = document
        .select(&CONTENT_SELECTOR)
        .map(node_from_element)
        .collect();

    tracing::debug!("Selected {} content nodes", nodes.len());
    nodes
}

fn node_from_element(element: ElementRef<'_>) -> ContentNode {
    let tag = element.value().name().to_ascii_lowercase();

    let parent_tag = element
        .parent()
        .and_then(|parent| parent.value().as_element().map(|e| e.name().to_ascii_lowercase()));

    let src = if tag == "img" {
        element.value().attr("src").map(String::from)
    } else {
        None
    };

    let raw = element.text().collect::<String>();
    // Preformatted text keeps its line breaks and indentation
    let text = if tag == "pre" {
        raw.trim_start_matches(['\n', '\r']).trim_end().to_string()
    } else {
        collapse_whitespace(&raw)
    };

    ContentNode {
        tag,
        parent_tag,
        text,
        src,
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
