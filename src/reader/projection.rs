use std::collections::HashMap;

use tracing::debug;

use crate::app::{ArticleError, Result};
use crate::content::{decode_image_url, is_remote_image, ContentNode};
use crate::domain::Article;
use crate::reader::item::{LayoutHints, ReaderItem, ReaderItemKind};

/// Smallest inline image worth showing; anything under is treated as a
/// tracking pixel or decoration.
pub const MIN_IMAGE_WIDTH: u32 = 200;
pub const MIN_IMAGE_HEIGHT: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionState {
    /// Article metadata is known, content has not been parsed yet
    LeadingOnly,
    /// Filtered content has been appended
    WithContent,
}

/// Renderer notification for the one bulk insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertRange {
    pub start: usize,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageThresholds {
    pub min_width: u32,
    pub min_height: u32,
}

impl Default for ImageThresholds {
    fn default() -> Self {
        Self {
            min_width: MIN_IMAGE_WIDTH,
            min_height: MIN_IMAGE_HEIGHT,
        }
    }
}

impl ImageThresholds {
    pub fn accepts(&self, size: ImageSize) -> bool {
        size.width >= self.min_width && size.height >= self.min_height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibilityChange {
    pub position: usize,
    pub visible: bool,
}

/// Flat, positionally addressed view of an article.
///
/// Position 0 is always the header image, followed by the title block when
/// the article has a title or author. Content rows are appended once and
/// never move afterwards. Layout hints are not stored; they are derived
/// from neighbouring kinds on every query.
#[derive(Debug, Clone)]
pub struct ArticleProjection {
    article: Article,
    leading: Vec<ReaderItemKind>,
    content: Option<Vec<ContentNode>>,
    kinds: Vec<ReaderItemKind>,
    image_urls: Vec<Option<String>>,
    size_verdicts: HashMap<usize, bool>,
    thresholds: ImageThresholds,
}

impl ArticleProjection {
    pub fn new(article: Article) -> Self {
        Self::with_thresholds(article, ImageThresholds::default())
    }

    pub fn with_thresholds(article: Article, thresholds: ImageThresholds) -> Self {
        let mut leading = vec![ReaderItemKind::HeaderImage];
        if article.title.is_some() || article.author.is_some() {
            leading.push(ReaderItemKind::Title);
        }

        Self {
            article,
            leading,
            content: None,
            kinds: Vec::new(),
            image_urls: Vec::new(),
            size_verdicts: HashMap::new(),
            thresholds,
        }
    }

    pub fn article(&self) -> &Article {
        &self.article
    }

    pub fn state(&self) -> ProjectionState {
        if self.content.is_some() {
            ProjectionState::WithContent
        } else {
            ProjectionState::LeadingOnly
        }
    }

    pub fn leading_count(&self) -> usize {
        self.leading.len()
    }

    pub fn len(&self) -> usize {
        self.leading.len() + self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append the filtered content in one go.
    ///
    /// Only the first call is accepted; a projection never goes back to
    /// leading-only or grows a second content range.
    pub fn append_content(&mut self, nodes: Vec<ContentNode>) -> Result<InsertRange> {
        if self.content.is_some() {
            return Err(ArticleError::Projection(format!(
                "content already appended for {}",
                self.article.url
            )));
        }

        self.kinds = nodes.iter().map(ReaderItemKind::for_node).collect();
        self.image_urls = nodes
            .iter()
            .map(|node| node.is_image().then(|| decode_image_url(node.src.as_deref())))
            .collect();

        let range = InsertRange {
            start: self.leading.len(),
            count: nodes.len(),
        };
        self.content = Some(nodes);

        debug!(
            "Inserted {} reader items at {} for {}",
            range.count, range.start, self.article.url
        );
        Ok(range)
    }

    pub fn kind(&self, position: usize) -> Option<ReaderItemKind> {
        match self.content_index(position) {
            Some(index) => self.kinds.get(index).copied(),
            None => self.leading.get(position).copied(),
        }
    }

    pub fn node(&self, position: usize) -> Option<&ContentNode> {
        let index = self.content_index(position)?;
        self.content.as_ref()?.get(index)
    }

    /// Resolved url of the image shown at `position`.
    ///
    /// For the header image this is the article's lead image, which may be
    /// absent; the renderer shows a placeholder in that case.
    pub fn image_url(&self, position: usize) -> Option<&str> {
        match self.kind(position)? {
            ReaderItemKind::HeaderImage => self
                .article
                .image
                .as_deref()
                .filter(|image| !image.is_empty()),
            ReaderItemKind::InlineImage => {
                let index = self.content_index(position)?;
                self.image_urls.get(index)?.as_deref()
            }
            _ => None,
        }
    }

    pub fn header_image_url(&self) -> Option<String> {
        self.article
            .image
            .as_deref()
            .map(|image| decode_image_url(Some(image)))
            .filter(|url| is_remote_image(url))
    }

    pub fn layout(&self, position: usize) -> Option<LayoutHints> {
        let kind = self.kind(position)?;
        let is_last = position + 1 == self.len();
        let mut layout = LayoutHints::default();

        if kind == ReaderItemKind::InlineImage {
            let index = self.content_index(position)?;
            layout.extra_top_margin = index > 0 && !self.is_content_image(index - 1);
            layout.extra_bottom_margin = !is_last && !self.is_content_image(index + 1);
            layout.visible = self.is_image_visible(position);
        }

        if is_last {
            layout.extra_bottom_margin = true;
        }

        Some(layout)
    }

    pub fn item(&self, position: usize) -> Option<ReaderItem> {
        Some(ReaderItem {
            position,
            kind: self.kind(position)?,
            layout: self.layout(position)?,
        })
    }

    pub fn items(&self) -> Vec<ReaderItem> {
        (0..self.len()).filter_map(|p| self.item(p)).collect()
    }

    /// Inline images that are shown and still await a size verdict.
    pub fn pending_image_checks(&self) -> Vec<(usize, String)> {
        (self.leading.len()..self.len())
            .filter(|p| !self.size_verdicts.contains_key(p) && self.is_image_visible(*p))
            .filter_map(|p| self.image_url(p).map(|url| (p, url.to_string())))
            .collect()
    }

    /// Record the fetched dimensions of an inline image.
    ///
    /// Returns the change when the verdict flips the row's visibility.
    pub fn apply_image_size(&mut self, position: usize, size: ImageSize) -> Option<VisibilityChange> {
        if self.kind(position)? != ReaderItemKind::InlineImage {
            return None;
        }

        let before = self.is_image_visible(position);
        self.size_verdicts
            .insert(position, self.thresholds.accepts(size));
        let after = self.is_image_visible(position);

        if before == after {
            return None;
        }

        debug!(
            "Image at {} is {}x{}, visible: {}",
            position, size.width, size.height, after
        );
        Some(VisibilityChange {
            position,
            visible: after,
        })
    }

    fn content_index(&self, position: usize) -> Option<usize> {
        position.checked_sub(self.leading.len())
    }

    fn is_content_image(&self, index: usize) -> bool {
        self.kinds.get(index) == Some(&ReaderItemKind::InlineImage)
    }

    fn is_image_visible(&self, position: usize) -> bool {
        let resolved = self
            .content_index(position)
            .and_then(|index| self.image_urls.get(index))
            .and_then(|url| url.as_deref());

        match resolved {
            Some(url) if is_remote_image(url) => {
                self.size_verdicts.get(&position).copied().unwrap_or(true)
            }
            _ => false,
        }
    }
}
