//! Disk-cached thumbnail textures for the card grid

use crate::card_grid::ThumbnailProvider;
use crate::constants::THUMBNAIL_CONCURRENCY;
use crate::types::Resource;
use crate::utils::lock;
use eframe::egui;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

/// How long a failed thumbnail stays blocked before it is fetched again
const RETRY_AFTER: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
enum ThumbnailError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP {0}")]
    Status(reqwest::StatusCode),
    #[error("response is not an image")]
    NotImage,
    #[error("cache write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Accept only bodies that sniff as a known image format
fn validate_thumbnail(bytes: &[u8]) -> Result<image::ImageFormat, ThumbnailError> {
    image::guess_format(bytes).map_err(|_| ThumbnailError::NotImage)
}

async fn fetch_thumbnail(client: &reqwest::Client, url: &str, path: &Path) -> Result<usize, ThumbnailError> {
    let response = client.get(url).send().await?;
    if !response.status().is_success() {
        return Err(ThumbnailError::Status(response.status()));
    }
    let bytes = response.bytes().await?;
    validate_thumbnail(&bytes)?;
    tokio::fs::write(path, &bytes).await?;
    Ok(bytes.len())
}

pub struct ThumbnailCache {
    dir: PathBuf,
    /// Decoded textures; `None` marks a file that failed to decode
    textures: HashMap<String, Option<egui::TextureHandle>>,
    /// Pks already fetched or in flight
    requested: Arc<Mutex<HashSet<String>>>,
    semaphore: Arc<Semaphore>,
    client: reqwest::Client,
    runtime: tokio::runtime::Handle,
    retry_after: Duration,
}

/// Cache file for a pk; anything outside `[A-Za-z0-9_-]` becomes `_`
pub fn thumbnail_path(dir: &Path, pk: &str) -> PathBuf {
    let name: String = pk
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    dir.join(format!("{}.img", name))
}

impl ThumbnailCache {
    pub fn new(dir: PathBuf, runtime: tokio::runtime::Handle) -> Self {
        Self {
            dir,
            textures: HashMap::new(),
            requested: Arc::new(Mutex::new(HashSet::new())),
            semaphore: Arc::new(Semaphore::new(THUMBNAIL_CONCURRENCY)),
            client: reqwest::Client::new(),
            runtime,
            retry_after: RETRY_AFTER,
        }
    }

    fn decode(ctx: &egui::Context, pk: &str, path: &Path) -> Option<egui::TextureHandle> {
        let bytes = std::fs::read(path).ok()?;
        match image::load_from_memory(&bytes) {
            Ok(img) => {
                let rgba = img.to_rgba8();
                let size = [rgba.width() as usize, rgba.height() as usize];
                let pixels = rgba.into_raw();
                Some(ctx.load_texture(
                    format!("thumb_{}", pk),
                    egui::ColorImage::from_rgba_unmultiplied(size, &pixels),
                    egui::TextureOptions::LINEAR,
                ))
            }
            Err(e) => {
                warn!(pk = %pk, error = %e, "Failed to decode thumbnail");
                None
            }
        }
    }

    fn request(&self, ctx: &egui::Context, pk: &str, url: &str) {
        if !lock(&self.requested).insert(pk.to_string()) {
            return;
        }

        let path = thumbnail_path(&self.dir, pk);
        let url = url.to_string();
        let pk = pk.to_string();
        let client = self.client.clone();
        let semaphore = self.semaphore.clone();
        let requested = self.requested.clone();
        let retry_after = self.retry_after;
        let ctx = ctx.clone();

        self.runtime.spawn(async move {
            let Ok(permit) = semaphore.acquire().await else {
                return;
            };
            let result = fetch_thumbnail(&client, &url, &path).await;
            drop(permit);
            match result {
                Ok(len) => {
                    debug!(pk = %pk, bytes = len, "Thumbnail cached");
                    ctx.request_repaint();
                }
                Err(e) => {
                    match e {
                        ThumbnailError::Io(_) | ThumbnailError::NotImage => {
                            warn!(pk = %pk, error = %e, "Thumbnail not cached")
                        }
                        _ => debug!(pk = %pk, error = %e, "Thumbnail fetch failed"),
                    }
                    // Allow another attempt once the delay has passed
                    tokio::time::sleep(retry_after).await;
                    lock(&requested).remove(&pk);
                }
            }
        });
    }
}

impl ThumbnailProvider for ThumbnailCache {
    fn thumbnail(&mut self, ctx: &egui::Context, resource: &Resource) -> Option<egui::TextureHandle> {
        if let Some(cached) = self.textures.get(&resource.pk) {
            return cached.clone();
        }

        let path = thumbnail_path(&self.dir, &resource.pk);
        if path.exists() {
            let texture = Self::decode(ctx, &resource.pk, &path);
            self.textures.insert(resource.pk.clone(), texture.clone());
            return texture;
        }

        if let Some(url) = resource.thumbnail_url.as_deref().filter(|u| !u.is_empty()) {
            self.request(ctx, &resource.pk, url);
        }
        None
    }
}
