use serde::{Deserialize, Serialize};

use crate::content::ContentNode;

/// Every kind of row the reader can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReaderItemKind {
    HeaderImage,
    Title,
    Paragraph,
    InlineImage,
    /// `h1` through `h6`
    Heading(u8),
    Blockquote,
    Preformatted,
    UnorderedListItem,
    OrderedListItem,
    /// Anything unrecognized; rendered as plain text
    Other,
}

impl ReaderItemKind {
    /// Classify a content node. List items depend on their enclosing list.
    pub fn for_node(node: &ContentNode) -> Self {
        match node.tag.as_str() {
            "li" => match node.parent_tag.as_deref() {
                Some("ul") => Self::UnorderedListItem,
                Some("ol") => Self::OrderedListItem,
                _ => Self::Other,
            },
            tag => Self::for_tag(tag),
        }
    }

    fn for_tag(tag: &str) -> Self {
        match tag {
            "p" => Self::Paragraph,
            "h1" => Self::Heading(1),
            "h2" => Self::Heading(2),
            "h3" => Self::Heading(3),
            "h4" => Self::Heading(4),
            "h5" => Self::Heading(5),
            "h6" => Self::Heading(6),
            "img" => Self::InlineImage,
            "blockquote" => Self::Blockquote,
            "pre" => Self::Preformatted,
            _ => Self::Other,
        }
    }

    pub fn is_image(self) -> bool {
        matches!(self, Self::HeaderImage | Self::InlineImage)
    }
}

/// Spacing and visibility for one row, derived from its neighbours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutHints {
    pub extra_top_margin: bool,
    pub extra_bottom_margin: bool,
    pub visible: bool,
}

impl Default for LayoutHints {
    fn default() -> Self {
        Self {
            extra_top_margin: false,
            extra_bottom_margin: false,
            visible: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReaderItem {
    pub position: usize,
    pub kind: ReaderItemKind,
    pub layout: LayoutHints,
}
