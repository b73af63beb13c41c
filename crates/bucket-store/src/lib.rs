//! Bucket listing and probing for photo albums.
//!
//! Albums keep their images under a key prefix in an object storage bucket.
//! This crate exposes the two operations the rest of the gallery needs from
//! the bucket: a non-recursive listing of the keys under a prefix, and an
//! existence probe for a single key.
//!
//! # Example
//!
//! ```rust,no_run
//! use bucket_store::{BucketConfig, BucketStore, ObjectBucket};
//!
//! # async fn example() -> Result<(), bucket_store::BucketStoreError> {
//! let bucket = ObjectBucket::new(BucketConfig::Memory).await?;
//! let keys = bucket.list_keys("albums/summer/").await?;
//! # Ok(())
//! # }
//! ```

mod bucket;
mod error;
mod listing;

pub use bucket::{BucketConfig, BucketStore, ObjectBucket};
pub use error::{BucketStoreError, Result};
pub use listing::{filter_listing, DELIMITER};
