//! Resource downloads with progress tracking and cancellation

use super::App;
use crate::types::*;
use crate::utils::{join_url, lock};
use eframe::egui;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// `filename` parameter of a Content-Disposition header
pub fn filename_from_disposition(header: &str) -> Option<String> {
    header
        .split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("filename="))
        .map(|name| name.trim_matches('"').trim())
        .filter(|name| !name.is_empty())
        .map(|name| {
            // Never let the server pick a directory
            name.rsplit(['/', '\\']).next().unwrap_or(name).to_string()
        })
        .filter(|name| !name.is_empty() && name != ".." && name != ".")
}

/// Fallback file name when the server sends no disposition
fn fallback_name(resource_pk: &str, url: &str) -> String {
    let ext = url
        .split(['?', '#'])
        .next()
        .and_then(|path| path.rsplit('/').next())
        .and_then(|last| last.rsplit_once('.'))
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or("zip");
    format!("resource-{}.{}", resource_pk, ext)
}

/// `rivers.zip` downloads into `rivers.zip.part`
fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    dest.with_file_name(name)
}

fn finish(state: &Mutex<DownloadState>, pk: &str, status: DownloadStatus) {
    let mut s = lock(state);
    match &status {
        DownloadStatus::Complete => s.completed_count += 1,
        DownloadStatus::Cancelled => s.cancelled_count += 1,
        DownloadStatus::Failed(_) => s.failed_count += 1,
        _ => {}
    }
    s.downloads.insert(pk.to_string(), status);
}

/// Stream one resource into `dir`, reporting progress into `state`.
async fn download_resource(
    pk: String,
    url: String,
    dir: PathBuf,
    state: Arc<Mutex<DownloadState>>,
    client: reqwest::Client,
    ctx: egui::Context,
    token: CancellationToken,
) {
    if token.is_cancelled() {
        finish(&state, &pk, DownloadStatus::Cancelled);
        ctx.request_repaint();
        return;
    }

    lock(&state).downloads.insert(pk.clone(), DownloadStatus::Downloading(0, 0));
    ctx.request_repaint();

    let response = match client.get(&url).send().await {
        Ok(r) if r.status().is_success() => r,
        Ok(r) => {
            warn!(pk = %pk, status = %r.status(), "Download refused");
            finish(&state, &pk, DownloadStatus::Failed(format!("HTTP {}", r.status())));
            ctx.request_repaint();
            return;
        }
        Err(e) => {
            warn!(pk = %pk, error = %e, "Download request failed");
            finish(&state, &pk, DownloadStatus::Failed(e.to_string()));
            ctx.request_repaint();
            return;
        }
    };

    let name = response
        .headers()
        .get(reqwest::header::CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .and_then(filename_from_disposition)
        .unwrap_or_else(|| fallback_name(&pk, &url));
    let dest = dir.join(name);
    let partial = partial_path(&dest);
    let total_size = response.content_length().unwrap_or(0);

    let mut file = match tokio::fs::File::create(&partial).await {
        Ok(f) => f,
        Err(e) => {
            warn!(path = %partial.display(), error = %e, "Cannot create download file");
            finish(&state, &pk, DownloadStatus::Failed("Write failed".into()));
            ctx.request_repaint();
            return;
        }
    };

    let mut downloaded: u64 = 0;
    let mut stream = response.bytes_stream();
    let mut last_repaint = std::time::Instant::now();

    let status = loop {
        tokio::select! {
            _ = token.cancelled() => break DownloadStatus::Cancelled,
            chunk = stream.next() => match chunk {
                Some(Ok(data)) => {
                    if file.write_all(&data).await.is_err() {
                        break DownloadStatus::Failed("Write failed".into());
                    }
                    downloaded += data.len() as u64;
                    lock(&state).downloads.insert(pk.clone(), DownloadStatus::Downloading(downloaded, total_size));
                    if last_repaint.elapsed() >= std::time::Duration::from_millis(100) {
                        ctx.request_repaint();
                        last_repaint = std::time::Instant::now();
                    }
                }
                Some(Err(e)) => break DownloadStatus::Failed(e.to_string()),
                None => break DownloadStatus::Complete,
            },
        }
    };

    let status = match status {
        DownloadStatus::Complete => match file.flush().await {
            Ok(()) => {
                drop(file);
                match tokio::fs::rename(&partial, &dest).await {
                    Ok(()) => {
                        info!(pk = %pk, path = %dest.display(), bytes = downloaded, "Download complete");
                        DownloadStatus::Complete
                    }
                    Err(e) => DownloadStatus::Failed(e.to_string()),
                }
            }
            Err(e) => DownloadStatus::Failed(e.to_string()),
        },
        other => {
            drop(file);
            tokio::fs::remove_file(&partial).await.ok();
            other
        }
    };

    if let DownloadStatus::Failed(reason) = &status {
        warn!(pk = %pk, reason = %reason, "Download failed");
    }
    finish(&state, &pk, status);
    ctx.request_repaint();
}

impl App {
    /// Queue `resource` for download into the configured folder
    pub fn start_download(&mut self, ctx: &egui::Context, resource: &Resource) {
        let Some(url) = resource.download_url.as_deref().filter(|u| !u.is_empty()) else {
            self.show_toast(format!("\"{}\" has no download", resource.title));
            return;
        };
        if lock(&self.download_state).downloads.get(&resource.pk).is_some_and(DownloadStatus::is_active) {
            return;
        }

        if let Err(e) = std::fs::create_dir_all(&self.download_path) {
            warn!(path = %self.download_path.display(), error = %e, "Cannot create download folder");
            self.show_toast("Download folder is not writable");
            return;
        }

        let url = join_url(self.settings.catalog_url(), url);
        let pk = resource.pk.clone();
        info!(pk = %pk, url = %url, path = %self.download_path.display(), "Starting download");

        {
            let mut s = lock(&self.download_state);
            s.download_order.retain(|p| p != &pk);
            s.download_order.push(pk.clone());
            s.downloads.insert(pk.clone(), DownloadStatus::Pending);
        }

        let token = self.download_cancel.get_or_insert_with(CancellationToken::new).clone();
        let semaphore = self.download_slots.clone();
        let state = self.download_state.clone();
        let dir = self.download_path.clone();
        let ctx = ctx.clone();

        self.runtime.spawn(async move {
            let Ok(_permit) = semaphore.acquire().await else {
                return;
            };
            download_resource(pk, url, dir, state, reqwest::Client::new(), ctx, token).await;
        });
        self.show_toast(format!("Downloading \"{}\"", resource.title));
    }

    /// Cancel every running download; new downloads get a fresh token
    pub fn cancel_downloads(&mut self) {
        if let Some(token) = self.download_cancel.take() {
            info!("Cancelling downloads");
            token.cancel();
        }
    }

    /// Forget finished entries so the downloads bar only shows live work
    pub fn clear_finished_downloads(&mut self) {
        let mut s = lock(&self.download_state);
        let DownloadState { downloads, download_order, .. } = &mut *s;
        download_order.retain(|pk| downloads.get(pk).is_some_and(DownloadStatus::is_active));
        downloads.retain(|_, status| status.is_active());
    }

    pub fn download_folder(&self) -> &Path {
        &self.download_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disposition_filename_is_extracted() {
        assert_eq!(
            filename_from_disposition("attachment; filename=\"rivers.zip\"").as_deref(),
            Some("rivers.zip")
        );
        assert_eq!(filename_from_disposition("attachment;filename=roads.gpkg").as_deref(), Some("roads.gpkg"));
        assert_eq!(filename_from_disposition("attachment; filename=\"../../etc/passwd\"").as_deref(), Some("passwd"));
        assert_eq!(filename_from_disposition("inline"), None);
        assert_eq!(filename_from_disposition("attachment; filename=\"\""), None);
    }

    #[test]
    fn fallback_name_keeps_a_sane_extension() {
        assert_eq!(fallback_name("7", "https://a.org/documents/7/download/report.pdf"), "resource-7.pdf");
        assert_eq!(fallback_name("8", "https://a.org/datasets/geonode:rivers/dataset_download"), "resource-8.zip");
        assert_eq!(fallback_name("9", "https://a.org/x/file.tar.gz?token=1"), "resource-9.gz");
    }

    #[test]
    fn partial_paths_keep_the_full_name() {
        let dir = Path::new("downloads");
        let zip = partial_path(&dir.join("rivers.zip"));
        let gpkg = partial_path(&dir.join("rivers.gpkg"));
        assert_eq!(zip, dir.join("rivers.zip.part"));
        assert_eq!(gpkg, dir.join("rivers.gpkg.part"));
        assert_ne!(zip, gpkg);
        assert_eq!(partial_path(&dir.join("README")), dir.join("README.part"));
    }

    #[test]
    fn finish_updates_counters() {
        let state = Mutex::new(DownloadState::default());
        finish(&state, "1", DownloadStatus::Complete);
        finish(&state, "2", DownloadStatus::Failed("boom".into()));
        finish(&state, "3", DownloadStatus::Cancelled);
        let s = lock(&state);
        assert_eq!((s.completed_count, s.failed_count, s.cancelled_count), (1, 1, 1));
        assert!(s.downloads.get("1") == Some(&DownloadStatus::Complete));
    }
}
