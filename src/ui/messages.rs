//! English message table for the `gnhome.*` ids shown by the card grid

use std::borrow::Cow;

const MESSAGES: &[(&str, &str)] = &[
    ("gnhome.noContentYetTitle", "No content yet"),
    (
        "gnhome.noContentYetContent",
        "This catalog has no resources yet. Upload a dataset or a document to get started.",
    ),
    ("gnhome.noResultsTitle", "No results"),
    (
        "gnhome.noResultsContent",
        "No resources match your search. Try different keywords or clear the search.",
    ),
    ("gnhome.loadErrorTitle", "Unable to load resources"),
    (
        "gnhome.loadErrorContent",
        "The catalog could not be reached. Check the catalog URL in the settings and try again.",
    ),
    ("gnhome.noCreatedContentTitle", "Nothing created yet"),
    ("gnhome.noCreatedContentContent", "Resources you create will appear here."),
    ("gnhome.noFavoriteContentTitle", "No favorites"),
    (
        "gnhome.noFavoriteContentContent",
        "Mark resources as favorites to find them here quickly.",
    ),
];

pub fn title_key(message_id: &str) -> String {
    format!("gnhome.{}Title", message_id)
}

pub fn content_key(message_id: &str) -> String {
    format!("gnhome.{}Content", message_id)
}

/// Look up a message; unknown keys render as the key itself
pub fn resolve(key: &str) -> Cow<'static, str> {
    MESSAGES
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| Cow::Borrowed(*v))
        .unwrap_or_else(|| Cow::Owned(key.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_ids_resolve_both_parts() {
        assert_eq!(resolve(&title_key("noResults")), "No results");
        assert!(resolve(&content_key("loadError")).contains("could not be reached"));
    }

    #[test]
    fn unknown_id_falls_back_to_key() {
        assert_eq!(resolve(&title_key("mystery")), "gnhome.mysteryTitle");
    }
}
