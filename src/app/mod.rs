//! App module - contains the main application state and logic

mod actions;
mod catalog;
mod downloads;
mod thumbnails;
mod views;

use catalog::{CatalogClient, CatalogState, LoadMode};
use thumbnails::ThumbnailCache;

use crate::card_grid;
use crate::constants::DOWNLOAD_CONCURRENCY;
use crate::settings::Settings;
use crate::theme;
use crate::types::*;
use crate::utils::{get_cache_dir, lock};
use eframe::egui;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::info;

// ============================================================================
// APP STATE
// ============================================================================

pub struct App {
    // Catalog paging
    pub(crate) catalog: CatalogClient,
    pub(crate) catalog_state: Arc<Mutex<CatalogState>>,
    pub(crate) catalog_cancel: Option<CancellationToken>,
    pub(crate) search_query: String,
    pub(crate) applied_search: String,
    // Card grid
    pub(crate) fixed_mode: bool,
    pub(crate) layout_style: LayoutStyle,
    pub(crate) selected: Option<Resource>,
    pub(crate) thumbnails: ThumbnailCache,
    // Downloads
    pub(crate) download_state: Arc<Mutex<DownloadState>>,
    pub(crate) download_path: PathBuf,
    pub(crate) download_cancel: Option<CancellationToken>,
    pub(crate) download_slots: Arc<Semaphore>,
    pub(crate) runtime: tokio::runtime::Runtime,
    // Toast notification
    pub(crate) toast_message: Option<String>,
    pub(crate) toast_start: Option<std::time::Instant>,
    // Window / persistence
    pub(crate) settings: Settings,
    pub(crate) window_pos: Option<egui::Pos2>,
    pub(crate) window_size: Option<egui::Vec2>,
    pub(crate) needs_center: bool,
    pub(crate) started: bool,
    pub(crate) data_dir: PathBuf,
}

// ============================================================================
// APP INITIALIZATION & HELPERS
// ============================================================================

impl App {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        runtime: tokio::runtime::Runtime,
        settings: Settings,
        data_dir: PathBuf,
    ) -> Self {
        cc.egui_ctx.set_theme(egui::Theme::Dark);

        let mut fonts = egui::FontDefinitions::default();
        egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
        cc.egui_ctx.set_fonts(fonts);

        theme::apply_visuals(&cc.egui_ctx);

        // The grid reads its layout preference from context storage
        card_grid::store_layout_style(&cc.egui_ctx, settings.layout_cards_style);

        let cache_dir = get_cache_dir();
        std::fs::create_dir_all(cache_dir.join("thumbnails")).ok();

        info!(
            catalog = %settings.catalog_url(),
            page_size = settings.page_size,
            fixed = settings.fixed_mode,
            "Catalog browser configured"
        );

        Self {
            catalog: CatalogClient::new(settings.catalog_url(), settings.page_size),
            catalog_state: Arc::new(Mutex::new(CatalogState::default())),
            catalog_cancel: None,
            search_query: String::new(),
            applied_search: String::new(),
            fixed_mode: settings.fixed_mode,
            layout_style: settings.layout_cards_style,
            selected: None,
            thumbnails: ThumbnailCache::new(cache_dir.join("thumbnails"), runtime.handle().clone()),
            download_state: Arc::new(Mutex::new(DownloadState::default())),
            download_path: settings.download_path_or_default(),
            download_cancel: None,
            download_slots: Arc::new(Semaphore::new(DOWNLOAD_CONCURRENCY)),
            runtime,
            toast_message: None,
            toast_start: None,
            window_pos: None,
            window_size: None,
            needs_center: false,
            started: false,
            data_dir,
            settings,
        }
    }

    pub fn save_settings(&self) {
        let settings = Settings {
            window_x: self.window_pos.map(|p| p.x),
            window_y: self.window_pos.map(|p| p.y),
            window_w: self.window_size.map(|s| s.x),
            window_h: self.window_size.map(|s| s.y),
            layout_cards_style: self.layout_style,
            fixed_mode: self.fixed_mode,
            download_path: Some(self.download_path.to_string_lossy().to_string()),
            ..self.settings.clone()
        };
        settings.save(&self.data_dir);
    }

    /// Pks of downloads still running, matched against cards
    pub(crate) fn in_progress_downloads(&self) -> Vec<Download> {
        lock(&self.download_state).in_progress()
    }

    pub(crate) fn show_toast(&mut self, message: impl Into<String>) {
        self.toast_message = Some(message.into());
        self.toast_start = Some(std::time::Instant::now());
    }

    /// Cancel background work; called on exit
    pub(crate) fn shutdown(&mut self) {
        if let Some(token) = self.catalog_cancel.take() {
            token.cancel();
        }
        if let Some(token) = self.download_cancel.take() {
            token.cancel();
        }
    }
}
