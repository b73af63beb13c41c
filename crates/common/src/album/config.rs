use serde::{Deserialize, Serialize};

/// Settings for a single album, usually one `[[albums]]` table in the
/// gallery config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlbumConfig {
    /// URL path the album is served under
    pub path: String,
    /// Bucket key prefix holding the album's images
    #[serde(default)]
    pub bucket_prefix: String,
    /// Album-specific credentials, overriding the site's
    #[serde(default)]
    pub auth_user: Option<String>,
    #[serde(default)]
    pub auth_pass: Option<String>,
    #[serde(default)]
    pub meta_title: Option<String>,
    #[serde(default)]
    pub album_title: Option<String>,
    /// Whether the album is listed on the public index
    #[serde(default = "default_in_index")]
    pub in_index: bool,
}

fn default_in_index() -> bool {
    true
}

impl AlbumConfig {
    pub fn new(path: impl Into<String>, bucket_prefix: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            bucket_prefix: bucket_prefix.into(),
            auth_user: None,
            auth_pass: None,
            meta_title: None,
            album_title: None,
            in_index: default_in_index(),
        }
    }

    pub fn with_auth(mut self, user: impl Into<String>, pass: impl Into<String>) -> Self {
        self.auth_user = Some(user.into());
        self.auth_pass = Some(pass.into());
        self
    }

    pub fn with_titles(mut self, meta_title: impl Into<String>, album_title: impl Into<String>) -> Self {
        self.meta_title = Some(meta_title.into());
        self.album_title = Some(album_title.into());
        self
    }

    pub fn in_index(mut self, in_index: bool) -> Self {
        self.in_index = in_index;
        self
    }
}
