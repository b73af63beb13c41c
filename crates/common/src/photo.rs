//! Display objects produced from bucket keys.

use std::fmt::Debug;

use serde::Serialize;
use url::Url;

/// Something the rendering layer can show, either as a thumbnail or full size.
pub trait Renderable: Debug + Send + Sync {
    /// Bucket key backing this photo, if any
    fn key(&self) -> Option<&str>;

    fn thumbnail_url(&self) -> Option<Url>;

    fn full_url(&self) -> Option<Url>;

    /// `false` for placeholders standing in for a photo that couldn't be loaded
    fn is_available(&self) -> bool {
        true
    }

    fn view(&self) -> PhotoView {
        PhotoView {
            key: self.key().map(str::to_string),
            thumbnail_url: self.thumbnail_url(),
            full_url: self.full_url(),
            available: self.is_available(),
        }
    }
}

/// A photo stored in the bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Photo {
    key: String,
    thumbnail_url: Url,
    full_url: Url,
}

impl Photo {
    pub fn new(key: impl Into<String>, thumbnail_url: Url, full_url: Url) -> Self {
        Self {
            key: key.into(),
            thumbnail_url,
            full_url,
        }
    }
}

impl Renderable for Photo {
    fn key(&self) -> Option<&str> {
        Some(self.key.as_str())
    }

    fn thumbnail_url(&self) -> Option<Url> {
        Some(self.thumbnail_url.clone())
    }

    fn full_url(&self) -> Option<Url> {
        Some(self.full_url.clone())
    }
}

/// Placeholder rendered when a photo is unavailable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ErrorPhoto;

impl Renderable for ErrorPhoto {
    fn key(&self) -> Option<&str> {
        None
    }

    fn thumbnail_url(&self) -> Option<Url> {
        None
    }

    fn full_url(&self) -> Option<Url> {
        None
    }

    fn is_available(&self) -> bool {
        false
    }
}

/// Serializable snapshot of a [`Renderable`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhotoView {
    pub key: Option<String>,
    pub thumbnail_url: Option<Url>,
    pub full_url: Option<Url>,
    pub available: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_photo_view() {
        let view = ErrorPhoto.view();
        assert!(!view.available);
        assert!(view.key.is_none());
        assert!(view.full_url.is_none());
        assert!(view.thumbnail_url.is_none());
    }

    #[test]
    fn test_photo_view() {
        let photo = Photo::new(
            "a/1.jpg",
            Url::parse("https://thumbs.example.com/a/1.jpg").unwrap(),
            Url::parse("https://media.example.com/a/1.jpg").unwrap(),
        );
        let view = photo.view();
        assert!(view.available);
        assert_eq!(view.key.as_deref(), Some("a/1.jpg"));
        assert_eq!(
            view.full_url.unwrap().as_str(),
            "https://media.example.com/a/1.jpg"
        );
    }
}
