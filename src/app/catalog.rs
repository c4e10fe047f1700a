//! Paged access to the GeoNode resources API

use super::App;
use crate::constants::RESOURCES_ENDPOINT;
use crate::types::{Resource, ResourcePage};
use crate::utils::{join_url, lock};
use eframe::egui;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("invalid catalog URL: {0}")]
    InvalidUrl(String),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("catalog answered HTTP {0}")]
    Status(reqwest::StatusCode),
    #[error("unexpected catalog response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("request cancelled")]
    Cancelled,
}

#[derive(Clone)]
pub struct CatalogClient {
    http: reqwest::Client,
    base_url: String,
    page_size: u32,
}

impl CatalogClient {
    pub fn new(base_url: &str, page_size: u32) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            page_size,
        }
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn page_url(&self, page: u32, search: &str) -> Result<reqwest::Url, CatalogError> {
        let endpoint = join_url(&self.base_url, RESOURCES_ENDPOINT);
        let mut url = reqwest::Url::parse(&endpoint).map_err(|e| CatalogError::InvalidUrl(e.to_string()))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("page", &page.to_string());
            query.append_pair("page_size", &self.page_size.to_string());
            let search = search.trim();
            if !search.is_empty() {
                query.append_pair("search", search);
            }
        }
        Ok(url)
    }

    pub async fn fetch_page(&self, page: u32, search: &str) -> Result<ResourcePage, CatalogError> {
        let url = self.page_url(page, search)?;
        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            return Err(CatalogError::Status(response.status()));
        }
        let bytes = response.bytes().await?;
        let mut result: ResourcePage = serde_json::from_slice(&bytes)?;
        // Some deployments omit paging fields
        if result.page == 0 {
            result.page = page;
        }
        if result.page_size == 0 {
            result.page_size = self.page_size;
        }
        Ok(result)
    }
}

/// How a fetched page is merged into the list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMode {
    /// Infinite scroll: add to the end
    Append,
    /// Pager: show only this page
    Replace,
}

#[derive(Debug, Default)]
pub struct CatalogState {
    pub resources: Vec<Resource>,
    pub page: u32,
    pub total: u64,
    pub is_next_page_available: bool,
    pub loading: bool,
    pub error: Option<String>,
    /// Bumped on every reset; responses from older generations are dropped
    pub generation: u64,
}

impl CatalogState {
    /// Clear everything and start a new generation
    pub fn reset(&mut self) -> u64 {
        self.generation += 1;
        self.resources.clear();
        self.page = 0;
        self.total = 0;
        self.is_next_page_available = false;
        self.loading = false;
        self.error = None;
        self.generation
    }

    pub fn begin_load(&mut self) -> u64 {
        self.loading = true;
        self.error = None;
        self.generation
    }

    /// Returns false when the response belongs to an older generation
    pub fn apply_page(&mut self, generation: u64, mode: LoadMode, result: ResourcePage) -> bool {
        if generation != self.generation {
            return false;
        }
        self.is_next_page_available = result.has_next();
        self.total = result.total;
        self.page = result.page;
        match mode {
            LoadMode::Append => self.resources.extend(result.resources),
            LoadMode::Replace => self.resources = result.resources,
        }
        self.loading = false;
        true
    }

    pub fn apply_error(&mut self, generation: u64, error: &CatalogError) -> bool {
        if generation != self.generation {
            return false;
        }
        self.loading = false;
        if !matches!(error, CatalogError::Cancelled) {
            self.error = Some(error.to_string());
            // Stop infinite scroll until Retry resets the list
            self.is_next_page_available = false;
        }
        true
    }

    /// Message shown above the cards, if any
    pub fn message_id(&self, searching: bool) -> Option<&'static str> {
        if self.error.is_some() {
            Some("loadError")
        } else if self.loading || !self.resources.is_empty() || self.page == 0 {
            None
        } else if searching {
            Some("noResults")
        } else {
            Some("noContentYet")
        }
    }

    pub fn page_count(&self, page_size: u32) -> u32 {
        if page_size == 0 {
            return 1;
        }
        (self.total.div_ceil(page_size as u64) as u32).max(1)
    }
}

impl App {
    /// Drop the current list and fetch page 1 with the applied search
    pub fn reload_catalog(&mut self, ctx: &egui::Context) {
        if let Some(token) = self.catalog_cancel.take() {
            token.cancel();
        }
        let generation = lock(&self.catalog_state).reset();
        self.selected = None;
        info!(generation, search = %self.applied_search, fixed = self.fixed_mode, "Reloading catalog");
        self.catalog_cancel = Some(CancellationToken::new());
        self.fetch_page(ctx, 1, LoadMode::Replace);
    }

    /// Spawn the fetch of `page` on the runtime
    pub fn fetch_page(&mut self, ctx: &egui::Context, page: u32, mode: LoadMode) {
        let generation = lock(&self.catalog_state).begin_load();
        let token = self.catalog_cancel.get_or_insert_with(CancellationToken::new).clone();
        let client = self.catalog.clone();
        let state = self.catalog_state.clone();
        let search = self.applied_search.clone();
        let ctx = ctx.clone();

        debug!(page, generation, ?mode, "Fetching catalog page");

        self.runtime.spawn(async move {
            let result = tokio::select! {
                _ = token.cancelled() => Err(CatalogError::Cancelled),
                r = client.fetch_page(page, &search) => r,
            };

            let mut s = lock(&state);
            match result {
                Ok(result) => {
                    let count = result.resources.len();
                    let total = result.total;
                    if s.apply_page(generation, mode, result) {
                        info!(page, count, total, "Catalog page loaded");
                    } else {
                        debug!(page, generation, "Dropping stale catalog page");
                    }
                }
                Err(CatalogError::Cancelled) => {
                    debug!(page, generation, "Catalog fetch cancelled");
                    s.apply_error(generation, &CatalogError::Cancelled);
                }
                Err(e) => {
                    warn!(page, error = %e, "Failed to load catalog page");
                    s.apply_error(generation, &e);
                }
            }
            drop(s);
            ctx.request_repaint();
        });
    }
}
