//! Article content normalization.
//!
//! ```text
//! raw HTML → select_content → filter_content → Vec<ContentNode>
//! ```
//!
//! The selector keeps structural elements in document order, the filter
//! strips boilerplate and decides whether the extraction is worth showing
//! at all, and [`decode_image_url`] turns messy `src` values into
//! something loadable.

mod filter;
mod image_url;
mod selector;

pub use filter::{filter_content, MIN_CONTENT_CHARS, MIN_CONTENT_NODES};
pub use image_url::{decode_image_url, is_image_url, is_remote_image, remove_url_parameters};
pub use selector::{select_content, CONTENT_TAGS};

use serde::{Deserialize, Serialize};

/// One structural element selected from article markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentNode {
    /// Lower-case tag name (`p`, `h2`, `img`, `li`, ...)
    pub tag: String,
    /// Tag of the enclosing element. List items are classified by it.
    pub parent_tag: Option<String>,
    /// Descendant text with whitespace collapsed
    pub text: String,
    /// Raw `src` attribute, only meaningful for images
    pub src: Option<String>,
}

impl ContentNode {
    pub fn new(tag: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            parent_tag: None,
            text: text.into(),
            src: None,
        }
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::new("p", text)
    }

    pub fn image(src: impl Into<String>) -> Self {
        Self {
            tag: "img".into(),
            parent_tag: None,
            text: String::new(),
            src: Some(src.into()),
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent_tag = Some(parent.into());
        self
    }

    pub fn is_paragraph(&self) -> bool {
        self.tag == "p"
    }

    pub fn is_image(&self) -> bool {
        self.tag == "img"
    }
}
