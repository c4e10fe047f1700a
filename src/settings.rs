//! User settings stored as settings.json in the app data directory

use crate::constants::{CATALOG_URL_ENV, DEFAULT_CATALOG_URL, DEFAULT_PAGE_SIZE};
use crate::types::LayoutStyle;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Window geometry
    pub window_x: Option<f32>,
    pub window_y: Option<f32>,
    pub window_w: Option<f32>,
    pub window_h: Option<f32>,

    // Cards
    #[serde(rename = "layoutCardsStyle")]
    pub layout_cards_style: LayoutStyle,
    pub fixed_mode: bool,

    // Catalog
    pub catalog_url: String,
    pub page_size: u32,
    /// `GN_CATALOG_URL` for this run; never written back
    #[serde(skip)]
    pub catalog_url_override: Option<String>,

    // Paths
    pub download_path: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            window_x: None,
            window_y: None,
            window_w: None,
            window_h: None,
            layout_cards_style: LayoutStyle::Grid,
            fixed_mode: false,
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            catalog_url_override: None,
            download_path: None,
        }
    }
}

impl Settings {
    pub fn load(data_dir: &Path) -> Self {
        let path = data_dir.join("settings.json");
        let mut settings = match std::fs::read_to_string(&path) {
            Ok(s) => match serde_json::from_str(&s) {
                Ok(settings) => {
                    debug!(path = %path.display(), "Settings loaded");
                    settings
                }
                Err(e) => {
                    warn!(error = %e, "Failed to parse settings, using defaults");
                    Self::default()
                }
            },
            Err(_) => {
                debug!("No settings file found, using defaults");
                Self::default()
            }
        };
        settings.apply_env(std::env::var(CATALOG_URL_ENV).ok());
        settings
    }

    pub fn save(&self, data_dir: &Path) {
        let path = data_dir.join("settings.json");
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&path, json) {
                    warn!(error = %e, "Failed to save settings");
                }
            }
            Err(e) => warn!(error = %e, "Failed to serialize settings"),
        }
    }

    /// Environment override for the catalog URL, plus sanity clamps
    fn apply_env(&mut self, catalog_url: Option<String>) {
        if let Some(url) = catalog_url.filter(|u| !u.trim().is_empty()) {
            debug!(url = %url, "Catalog URL overridden from environment");
            self.catalog_url_override = Some(url);
        }
        if self.page_size == 0 {
            self.page_size = DEFAULT_PAGE_SIZE;
        }
    }

    /// Catalog in use: the environment override, else the saved URL
    pub fn catalog_url(&self) -> &str {
        self.catalog_url_override.as_deref().unwrap_or(&self.catalog_url)
    }

    pub fn download_path_or_default(&self) -> PathBuf {
        self.download_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                dirs::download_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join("GeoNode")
            })
    }
}
