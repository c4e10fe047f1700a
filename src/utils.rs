//! Utility functions

use crate::constants::APP_NAME;
use crate::types::Resource;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lock shared state, recovering the data if a background task panicked
pub fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Get the app data directory (settings, logs)
pub fn get_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Get the cache directory path
pub fn get_cache_dir() -> PathBuf {
    get_data_dir().join("cache")
}

/// Format bytes into human-readable string (B, KB, MB)
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Fill `${field}` placeholders of an href template from a resource.
/// Unknown placeholders are left untouched.
pub fn build_href_by_template(resource: &Resource, template: &str) -> String {
    let owner = resource.owner.as_ref().map(|o| o.username.as_str()).unwrap_or("");
    let fields: [(&str, &str); 6] = [
        ("pk", resource.pk.as_str()),
        ("resource_type", resource.resource_type.as_str()),
        ("subtype", resource.subtype.as_deref().unwrap_or("")),
        ("alternate", resource.alternate.as_deref().unwrap_or("")),
        ("title", resource.title.as_str()),
        ("owner", owner),
    ];

    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let name = &after[..end];
                match fields.iter().find(|(k, _)| *k == name) {
                    Some((_, value)) => out.push_str(value),
                    None => out.push_str(&rest[start..start + 2 + end + 1]),
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// Join a base URL and a path/href without doubling the slash.
/// Absolute hrefs are returned as-is.
pub fn join_url(base: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Owner;

    fn resource() -> Resource {
        Resource {
            pk: "42".into(),
            resource_type: "dataset".into(),
            alternate: Some("geonode:rivers".into()),
            owner: Some(Owner { username: "admin".into(), ..Default::default() }),
            ..Default::default()
        }
    }

    #[test]
    fn template_placeholders_are_filled() {
        assert_eq!(
            build_href_by_template(&resource(), "/catalogue/#/${resource_type}/${pk}"),
            "/catalogue/#/dataset/42"
        );
        assert_eq!(
            build_href_by_template(&resource(), "/layers/${alternate}/edit?by=${owner}"),
            "/layers/geonode:rivers/edit?by=admin"
        );
    }

    #[test]
    fn unknown_or_unterminated_placeholders_survive() {
        assert_eq!(build_href_by_template(&resource(), "/x/${nope}/${pk}"), "/x/${nope}/42");
        assert_eq!(build_href_by_template(&resource(), "/x/${pk"), "/x/${pk");
        assert_eq!(build_href_by_template(&resource(), "#"), "#");
    }

    #[test]
    fn join_url_handles_slashes() {
        assert_eq!(join_url("https://a.org/", "/api/v2"), "https://a.org/api/v2");
        assert_eq!(join_url("https://a.org", "api/v2"), "https://a.org/api/v2");
        assert_eq!(join_url("https://a.org", "https://b.org/x"), "https://b.org/x");
    }

    #[test]
    fn format_bytes_units() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MB");
    }
}
