//! Reader view model.
//!
//! An [`ArticleProjection`] turns an article plus its filtered content into
//! a flat list of [`ReaderItem`]s. Layout hints are recomputed from
//! neighbouring kinds on every query, so the one bulk insert never leaves
//! stale margins behind.

mod item;
mod probe;
mod projection;
pub mod render;

pub use item::{LayoutHints, ReaderItem, ReaderItemKind};
pub use probe::{
    verify_image_sizes, CachedImageProbe, HttpImageProbe, ImageProbe, PROBE_CONCURRENCY,
};
pub use projection::{
    ArticleProjection, ImageSize, ImageThresholds, InsertRange, ProjectionState, VisibilityChange,
    MIN_IMAGE_HEIGHT, MIN_IMAGE_WIDTH,
};
