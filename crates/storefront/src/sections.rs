//! Section banner images.
//!
//! The landing page shows one banner per catalog partition plus the main
//! banner. The last URLs fetched are kept in the local store under
//! [`SECTION_IMAGES_KEY`] and served when the data store is unreachable.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use esther_core::SectionKey;
use esther_core::image_ref::{ImageRef, classify, resolve};
use serde::Serialize;
use tokio::task::JoinSet;

use crate::gateway::{CatalogGateway, GatewayError};
use crate::local_store::LocalStore;

/// Local store key of the cached section image URLs.
pub const SECTION_IMAGES_KEY: &str = "sectionImages";

/// Resolved banner URL per section.
pub type SectionUrls = BTreeMap<SectionKey, String>;

/// Section images and where they came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionLoad {
    pub urls: SectionUrls,
    /// `true` when the data store failed and the cached copy was used.
    pub from_cache: bool,
}

/// Fetch section images, refreshing the local copy.
///
/// Records without a URL are skipped. When the gateway fails, the cached copy
/// is returned instead.
///
/// # Errors
///
/// Returns the gateway error when it fails and nothing is cached.
pub async fn load_section_images(
    gateway: &dyn CatalogGateway,
    store: &LocalStore,
) -> Result<SectionLoad, GatewayError> {
    match gateway.list_section_images().await {
        Ok(images) => {
            let urls: SectionUrls = images
                .into_iter()
                .filter(|image| !image.image_url.trim().is_empty())
                .map(|image| (image.gender, resolve(&image.image_url)))
                .collect();

            if let Err(e) = store.set_json(SECTION_IMAGES_KEY, &urls) {
                tracing::warn!(error = %e, "Failed to cache section images");
            }

            Ok(SectionLoad {
                urls,
                from_cache: false,
            })
        }
        Err(e) => {
            tracing::warn!(error = %e, "Loading section images failed, trying local copy");
            let urls = store.get_json::<SectionUrls>(SECTION_IMAGES_KEY).ok_or(e)?;
            Ok(SectionLoad {
                urls,
                from_cache: true,
            })
        }
    }
}

/// Fetches one image to warm caches along the delivery path.
#[async_trait]
pub trait ImageProbe: Send + Sync + 'static {
    /// Whether the image at `url` loaded.
    async fn probe(&self, url: &str) -> bool;
}

#[async_trait]
impl ImageProbe for reqwest::Client {
    async fn probe(&self, url: &str) -> bool {
        match self.get(url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!(error = %e, url = %url, "Image probe failed");
                false
            }
        }
    }
}

/// Outcome of a preload run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PreloadReport {
    pub loaded: usize,
    pub failed: usize,
}

/// Probe every absolute URL concurrently and wait for all of them.
///
/// Each probe settles as loaded or failed, so this always completes once the
/// slowest probe does. Empty, relative and `data:` references are skipped.
pub async fn preload<P: ImageProbe>(
    probe: Arc<P>,
    urls: impl IntoIterator<Item = String>,
) -> PreloadReport {
    let mut probes = JoinSet::new();
    for url in urls {
        if !matches!(classify(&url), ImageRef::Url(_) | ImageRef::LegacyShare { .. }) {
            continue;
        }
        let probe = Arc::clone(&probe);
        probes.spawn(async move { probe.probe(&resolve(&url)).await });
    }

    let mut report = PreloadReport::default();
    while let Some(result) = probes.join_next().await {
        match result {
            Ok(true) => report.loaded += 1,
            Ok(false) => report.failed += 1,
            Err(e) => {
                tracing::warn!(error = %e, "Image probe task failed");
                report.failed += 1;
            }
        }
    }

    tracing::info!(loaded = report.loaded, failed = report.failed, "Section images preloaded");
    report
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use esther_core::drafts::NewSectionImage;
    use esther_core::Gender;

    use super::*;
    use crate::gateway::InMemoryGateway;

    #[derive(Default)]
    struct FakeProbe {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ImageProbe for FakeProbe {
        async fn probe(&self, url: &str) -> bool {
            if url.contains("slow") {
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
            self.seen.lock().unwrap().push(url.to_string());
            !url.contains("broken")
        }
    }

    async fn gateway_with_sections() -> InMemoryGateway {
        let gateway = InMemoryGateway::default();
        for (key, url) in [
            (SectionKey::Gender(Gender::Women), "https://drive.google.com/file/d/W1/view"),
            (SectionKey::Gender(Gender::Men), "https://cdn.example.com/men.jpg"),
        ] {
            gateway
                .insert_section_image(&NewSectionImage::new(key, url).unwrap())
                .await
                .unwrap();
        }
        gateway
    }

    #[tokio::test]
    async fn test_load_resolves_and_caches() {
        let gateway = gateway_with_sections().await;
        let store = LocalStore::in_memory();

        let load = load_section_images(&gateway, &store).await.unwrap();

        assert!(!load.from_cache);
        assert_eq!(
            load.urls[&SectionKey::Gender(Gender::Women)],
            "https://drive.google.com/uc?export=view&id=W1"
        );
        assert!(store.get(SECTION_IMAGES_KEY).is_some());
    }

    #[tokio::test]
    async fn test_falls_back_to_cache_when_gateway_fails() {
        let gateway = gateway_with_sections().await;
        let store = LocalStore::in_memory();
        let fresh = load_section_images(&gateway, &store).await.unwrap();

        gateway.set_unavailable(true);
        let cached = load_section_images(&gateway, &store).await.unwrap();

        assert!(cached.from_cache);
        assert_eq!(cached.urls, fresh.urls);
    }

    #[tokio::test]
    async fn test_failure_without_cache_is_an_error() {
        let gateway = InMemoryGateway::default();
        gateway.set_unavailable(true);
        assert!(load_section_images(&gateway, &LocalStore::in_memory()).await.is_err());
    }

    #[tokio::test]
    async fn test_preload_waits_for_every_probe() {
        let probe = Arc::new(FakeProbe::default());
        let urls = vec![
            "https://cdn.example.com/slow.jpg".to_string(),
            "https://cdn.example.com/broken.jpg".to_string(),
            "https://cdn.example.com/ok.jpg".to_string(),
            String::new(),
            "data:image/png;base64,AAAA".to_string(),
        ];

        let report = preload(Arc::clone(&probe), urls).await;

        assert_eq!(report, PreloadReport { loaded: 2, failed: 1 });
        assert_eq!(probe.seen.lock().unwrap().len(), 3);
    }
}
