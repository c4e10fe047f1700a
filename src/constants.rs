//! Application constants and configuration

pub const APP_NAME: &str = "GeoNode Catalog";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Catalog used when neither settings nor `GN_CATALOG_URL` provide one
pub const DEFAULT_CATALOG_URL: &str = "https://development.demo.geonode.org";
pub const CATALOG_URL_ENV: &str = "GN_CATALOG_URL";
pub const RESOURCES_ENDPOINT: &str = "/api/v2/resources";
pub const DEFAULT_PAGE_SIZE: u32 = 24;

/// Frontend route used for the card link (`formatHref`)
pub const CATALOGUE_HREF_TEMPLATE: &str = "/catalogue/#/${resource_type}/${pk}";

/// Concurrent thumbnail fetches
pub const THUMBNAIL_CONCURRENCY: usize = 8;
/// Concurrent resource downloads
pub const DOWNLOAD_CONCURRENCY: usize = 4;
