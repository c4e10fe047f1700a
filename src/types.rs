//! Common types and data structures

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// Process function names a resource can be busy with
pub const PROCESS_TYPES: [&str; 2] = ["delete", "copy"];

/// Execution statuses that count as still running
const RUNNING_STATUSES: [&str; 2] = ["running", "ready"];

/// Accepts both `"42"` and `42` for primary keys
fn pk_from_any<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Pk {
        Str(String),
        Num(i64),
    }
    Ok(match Pk::deserialize(d)? {
        Pk::Str(s) => s,
        Pk::Num(n) => n.to_string(),
    })
}

/// Owner block of a catalog resource
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Owner {
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl Owner {
    pub fn display_name(&self) -> String {
        let full = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if full.is_empty() {
            self.username.clone()
        } else {
            full
        }
    }
}

/// Async process attached to a resource (copy, delete, ...)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Execution {
    pub func_name: String,
    pub status: String,
    pub user: Option<String>,
}

/// A catalog record rendered by a card
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Resource {
    #[serde(deserialize_with = "pk_from_any")]
    pub pk: String,
    /// Set on client-side clones so they don't collide with the original
    #[serde(skip)]
    pub pk2: Option<String>,
    pub title: String,
    pub resource_type: String,
    pub subtype: Option<String>,
    pub alternate: Option<String>,
    pub owner: Option<Owner>,
    pub date: Option<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    pub thumbnail_url: Option<String>,
    pub detail_url: Option<String>,
    pub download_url: Option<String>,
    pub executions: Vec<Execution>,
    pub is_approved: bool,
    pub is_published: bool,
}

/// Derived status flags for a resource
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceStatuses {
    pub is_approved: bool,
    pub is_published: bool,
    pub is_processing: bool,
    pub is_deleting: bool,
    pub is_copying: bool,
}

impl Resource {
    /// Key used to identify the card in a render pass
    pub fn key(&self) -> &str {
        self.pk2.as_deref().unwrap_or(&self.pk)
    }

    pub fn statuses(&self) -> ResourceStatuses {
        let creator = self.owner.as_ref().map(|o| o.username.as_str());
        let running: Vec<&Execution> = self
            .executions
            .iter()
            .filter(|e| {
                RUNNING_STATUSES.contains(&e.status.as_str())
                    && PROCESS_TYPES.contains(&e.func_name.as_str())
                    && (e.user.is_none() || e.user.as_deref() == creator)
            })
            .collect();

        ResourceStatuses {
            is_approved: self.is_approved,
            is_published: self.is_published,
            is_processing: !running.is_empty(),
            is_deleting: running.iter().any(|e| e.func_name == "delete"),
            is_copying: running.iter().any(|e| e.func_name == "copy"),
        }
    }

    pub fn kind(&self) -> ResourceKind {
        ResourceKind::from_type(&self.resource_type)
    }

    /// Release/creation date rendered as YYYY-MM-DD, if parseable
    pub fn formatted_date(&self) -> Option<String> {
        let raw = self.date.as_deref()?;
        if let Ok(d) = chrono::DateTime::parse_from_rfc3339(raw) {
            return Some(d.format("%Y-%m-%d").to_string());
        }
        chrono::NaiveDate::parse_from_str(raw.get(..10)?, "%Y-%m-%d")
            .ok()
            .map(|d| d.to_string())
    }
}

/// Resource types known to the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Dataset,
    Document,
    Map,
    Dashboard,
    GeoStory,
    Other,
}

impl ResourceKind {
    pub fn from_type(t: &str) -> Self {
        match t {
            "dataset" | "layer" => ResourceKind::Dataset,
            "document" => ResourceKind::Document,
            "map" => ResourceKind::Map,
            "dashboard" => ResourceKind::Dashboard,
            "geostory" => ResourceKind::GeoStory,
            _ => ResourceKind::Other,
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            ResourceKind::Dataset => egui_phosphor::regular::STACK,
            ResourceKind::Document => egui_phosphor::regular::FILE_TEXT,
            ResourceKind::Map => egui_phosphor::regular::MAP_TRIFOLD,
            ResourceKind::Dashboard => egui_phosphor::regular::SQUARES_FOUR,
            ResourceKind::GeoStory => egui_phosphor::regular::BOOK_OPEN,
            ResourceKind::Other => egui_phosphor::regular::CUBE,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ResourceKind::Dataset => "Dataset",
            ResourceKind::Document => "Document",
            ResourceKind::Map => "Map",
            ResourceKind::Dashboard => "Dashboard",
            ResourceKind::GeoStory => "GeoStory",
            ResourceKind::Other => "Resource",
        }
    }
}

/// Card layout preference, stored under `layoutCardsStyle`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum LayoutStyle {
    #[default]
    Grid,
    List,
}

impl LayoutStyle {
    /// Anything other than "list" is the default grid
    pub fn from_stored(value: Option<&str>) -> Self {
        match value {
            Some("list") => LayoutStyle::List,
            _ => LayoutStyle::Grid,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LayoutStyle::Grid => "grid",
            LayoutStyle::List => "list",
        }
    }
}

impl From<String> for LayoutStyle {
    fn from(value: String) -> Self {
        Self::from_stored(Some(&value))
    }
}

/// Entry of a card's option menu
#[derive(Debug, Clone, PartialEq)]
pub struct CardOption {
    pub id: &'static str,
    pub label: String,
    pub icon: &'static str,
    /// e.g. `/catalogue/#/${resource_type}/${pk}`
    pub href_template: Option<String>,
}

/// An in-progress download, matched to cards by `pk`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub pk: String,
}

/// Download status for individual resource downloads
#[derive(Clone, PartialEq)]
pub enum DownloadStatus {
    Pending,
    Downloading(u64, u64), // (downloaded_bytes, total_bytes)
    Complete,
    Cancelled,
    Failed(String),
}

impl DownloadStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, DownloadStatus::Pending | DownloadStatus::Downloading(..))
    }
}

/// State tracking for resource downloads, keyed by pk
#[derive(Default)]
pub struct DownloadState {
    pub downloads: HashMap<String, DownloadStatus>,
    pub download_order: Vec<String>,
    pub completed_count: usize,
    pub failed_count: usize,
    pub cancelled_count: usize,
}

impl DownloadState {
    /// Downloads still pending or streaming, in start order
    pub fn in_progress(&self) -> Vec<Download> {
        self.download_order
            .iter()
            .filter(|pk| self.downloads.get(*pk).is_some_and(DownloadStatus::is_active))
            .map(|pk| Download { pk: pk.clone() })
            .collect()
    }
}

/// Pagination links of an API page
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PageLinks {
    pub next: Option<String>,
    pub previous: Option<String>,
}

/// One page of `/api/v2/resources`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ResourcePage {
    pub resources: Vec<Resource>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub links: PageLinks,
}

impl ResourcePage {
    pub fn has_next(&self) -> bool {
        self.links.next.is_some() || (self.page as u64) * (self.page_size as u64) < self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource_with(executions: Vec<Execution>) -> Resource {
        Resource {
            pk: "7".into(),
            owner: Some(Owner { username: "admin".into(), ..Default::default() }),
            executions,
            ..Default::default()
        }
    }

    fn exec(func: &str, status: &str, user: Option<&str>) -> Execution {
        Execution { func_name: func.into(), status: status.into(), user: user.map(String::from) }
    }

    #[test]
    fn key_prefers_clone_pk() {
        let mut r = Resource { pk: "10".into(), ..Default::default() };
        assert_eq!(r.key(), "10");
        r.pk2 = Some("10-copy".into());
        assert_eq!(r.key(), "10-copy");
    }

    #[test]
    fn running_copy_marks_processing() {
        let s = resource_with(vec![exec("copy", "running", Some("admin"))]).statuses();
        assert!(s.is_processing);
        assert!(s.is_copying);
        assert!(!s.is_deleting);
    }

    #[test]
    fn finished_or_foreign_executions_are_ignored() {
        let s = resource_with(vec![
            exec("delete", "finished", None),
            exec("copy", "running", Some("someone_else")),
            exec("resize", "running", None),
        ])
        .statuses();
        assert!(!s.is_processing);
    }

    #[test]
    fn ready_delete_without_user_counts() {
        let s = resource_with(vec![exec("delete", "ready", None)]).statuses();
        assert!(s.is_processing && s.is_deleting);
    }

    #[test]
    fn layout_style_from_storage() {
        assert_eq!(LayoutStyle::from_stored(Some("list")), LayoutStyle::List);
        assert_eq!(LayoutStyle::from_stored(Some("grid")), LayoutStyle::Grid);
        assert_eq!(LayoutStyle::from_stored(Some("mosaic")), LayoutStyle::Grid);
        assert_eq!(LayoutStyle::from_stored(None), LayoutStyle::Grid);
        let style: LayoutStyle = serde_json::from_str(r#""mosaic""#).unwrap();
        assert_eq!(style, LayoutStyle::Grid);
    }

    #[test]
    fn page_decodes_numeric_and_string_pks() {
        let json = r#"{
            "resources": [
                {"pk": 12, "title": "Rivers", "resource_type": "dataset", "abstract": null,
                 "owner": {"username": "admin"}, "date": "2021-06-09T13:33:00Z"},
                {"pk": "13", "title": "Roads", "resource_type": "map",
                 "executions": [{"func_name": "copy", "status": "running"}]}
            ],
            "total": 30, "page": 1, "page_size": 2,
            "links": {"next": null, "previous": null}
        }"#;
        let page: ResourcePage = serde_json::from_str(json).unwrap();
        assert_eq!(page.resources[0].pk, "12");
        assert_eq!(page.resources[1].pk, "13");
        assert_eq!(page.resources[0].kind(), ResourceKind::Dataset);
        assert_eq!(page.resources[0].formatted_date().as_deref(), Some("2021-06-09"));
        assert!(page.resources[1].statuses().is_processing);
        assert!(page.has_next());
    }

    #[test]
    fn last_page_has_no_next() {
        let page = ResourcePage { total: 20, page: 2, page_size: 10, ..Default::default() };
        assert!(!page.has_next());
        let page = ResourcePage {
            total: 0,
            links: PageLinks { next: Some("http://x/?page=2".into()), previous: None },
            ..Default::default()
        };
        assert!(page.has_next());
    }

    #[test]
    fn in_progress_skips_finished_downloads() {
        let mut state = DownloadState::default();
        for (pk, status) in [
            ("1", DownloadStatus::Downloading(10, 100)),
            ("2", DownloadStatus::Complete),
            ("3", DownloadStatus::Pending),
        ] {
            state.download_order.push(pk.to_string());
            state.downloads.insert(pk.to_string(), status);
        }
        let pks: Vec<String> = state.in_progress().into_iter().map(|d| d.pk).collect();
        assert_eq!(pks, vec!["1", "3"]);
    }
}
