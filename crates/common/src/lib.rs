/**
 * Albums and the derived views the rendering
 *  layer builds pages from.
 */
pub mod album;
/**
 * Stale-while-revalidate cache over an album's
 *  bucket listing, with single-flight refresh.
 */
pub mod cache;
/**
 * Display objects produced from bucket keys,
 *  including the placeholder for missing photos.
 */
pub mod photo;
/**
 * Site-wide settings: bucket access, default
 *  auth and the key -> photo factory.
 */
pub mod site;

pub mod prelude {
    pub use crate::album::{canonicalize_path, Album, AlbumConfig, AlbumError, AlbumListing};
    pub use crate::cache::{KeyCache, KeyCacheConfig, KeyCacheError, KeyFetcher, DEFAULT_TTL};
    pub use crate::photo::{ErrorPhoto, Photo, PhotoView, Renderable};
    pub use crate::site::{Site, SiteConfig};
}
