//! Error types for the bucket store.

/// Errors that can occur when listing or probing a bucket.
#[derive(Debug, thiserror::Error)]
pub enum BucketStoreError {
    /// Object storage error
    #[error("object storage error: {0}")]
    ObjectStore(#[from] object_store::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// S3 bucket not found - must be created before use
    #[error("S3 bucket '{0}' does not exist. Create it before starting the gallery.")]
    BucketNotFound(String),
}

/// Result type alias for bucket store operations.
pub type Result<T> = std::result::Result<T, BucketStoreError>;
