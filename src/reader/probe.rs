use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use tracing::debug;

use crate::app::{ArticleError, Result};
use crate::reader::projection::{ArticleProjection, ImageSize, VisibilityChange};

/// How many images are probed at once.
pub const PROBE_CONCURRENCY: usize = 4;

/// Looks up the pixel dimensions of a remote image.
#[async_trait]
pub trait ImageProbe: Send + Sync {
    async fn probe(&self, url: &str) -> Result<ImageSize>;
}

/// Downloads the image and reads its dimensions from the header bytes.
pub struct HttpImageProbe {
    client: Client,
}

impl HttpImageProbe {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .user_agent(concat!("article-reader/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ImageProbe for HttpImageProbe {
    /// Reads the body chunk by chunk and stops as soon as the header parses.
    async fn probe(&self, url: &str) -> Result<ImageSize> {
        let mut response = self.client.get(url).send().await?;
        response.error_for_status_ref()?;

        let mut head = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            head.extend_from_slice(&chunk);
            if let Ok(size) = imagesize::blob_size(&head) {
                debug!("Read size of {} from {} bytes", url, head.len());
                return Ok(image_size(size));
            }
        }

        imagesize::blob_size(&head)
            .map(image_size)
            .map_err(|e| ArticleError::Other(format!("Unreadable image {}: {}", url, e)))
    }
}

fn image_size(size: imagesize::ImageSize) -> ImageSize {
    ImageSize {
        width: u32::try_from(size.width).unwrap_or(u32::MAX),
        height: u32::try_from(size.height).unwrap_or(u32::MAX),
    }
}

/// Remembers sizes by url so an image is only downloaded once.
///
/// Failures are not cached; the next lookup tries again.
pub struct CachedImageProbe {
    inner: Arc<dyn ImageProbe>,
    sizes: Mutex<HashMap<String, ImageSize>>,
}

impl CachedImageProbe {
    pub fn new(inner: Arc<dyn ImageProbe>) -> Self {
        Self {
            inner,
            sizes: Mutex::new(HashMap::new()),
        }
    }

    pub fn cached(&self, url: &str) -> Option<ImageSize> {
        self.sizes.lock().ok()?.get(url).copied()
    }

    pub fn len(&self) -> usize {
        self.sizes.lock().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ImageProbe for CachedImageProbe {
    async fn probe(&self, url: &str) -> Result<ImageSize> {
        if let Some(size) = self.cached(url) {
            return Ok(size);
        }

        let size = self.inner.probe(url).await?;
        if let Ok(mut sizes) = self.sizes.lock() {
            sizes.insert(url.to_string(), size);
        }
        Ok(size)
    }
}

/// Probe every pending inline image and apply the verdicts as they arrive.
///
/// Verdicts land in completion order, not position order. A failed probe
/// leaves the image as it is.
pub async fn verify_image_sizes(
    projection: &mut ArticleProjection,
    probe: Arc<dyn ImageProbe>,
) -> Vec<VisibilityChange> {
    let checks = projection.pending_image_checks();
    if checks.is_empty() {
        return Vec::new();
    }

    let mut results = stream::iter(checks)
        .map(|(position, url)| {
            let probe = probe.clone();
            async move { (position, probe.probe(&url).await, url) }
        })
        .buffer_unordered(PROBE_CONCURRENCY);

    let mut changes = Vec::new();
    while let Some((position, result, url)) = results.next().await {
        match result {
            Ok(size) => {
                if let Some(change) = projection.apply_image_size(position, size) {
                    changes.push(change);
                }
            }
            Err(e) => debug!("Size check failed for {}: {}", url, e),
        }
    }

    changes
}
