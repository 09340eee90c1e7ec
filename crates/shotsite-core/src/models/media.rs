use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaFormat {
    pub url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaFormats {
    pub thumbnail: Option<MediaFormat>,
    pub small: Option<MediaFormat>,
    pub medium: Option<MediaFormat>,
    pub large: Option<MediaFormat>,
}

/// An uploaded file as returned by the CMS media library.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Media {
    pub url: Option<String>,
    pub formats: Option<MediaFormats>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Media {
    fn format_url(&self, pick: fn(&MediaFormats) -> Option<&MediaFormat>) -> Option<&str> {
        self.formats
            .as_ref()
            .and_then(pick)
            .and_then(|f| f.url.as_deref())
            .filter(|u| !u.is_empty())
    }

    fn original_url(&self) -> Option<&str> {
        self.url.as_deref().filter(|u| !u.is_empty())
    }

    /// Preferred display path: medium, then small, then the original upload.
    pub fn image_path(&self) -> Option<&str> {
        self.format_url(|f| f.medium.as_ref())
            .or_else(|| self.format_url(|f| f.small.as_ref()))
            .or_else(|| self.original_url())
    }
}

/// Prefix root-relative upload paths with the CMS origin.
fn qualify(path: &str, origin: &str) -> String {
    if path.starts_with("http") {
        path.to_string()
    } else {
        format!("{}{}", origin.trim_end_matches('/'), path)
    }
}

/// Resolve the best image variant of `media` to an absolute URL.
pub fn resolve_image_url(media: Option<&Media>, origin: &str) -> Option<String> {
    media.and_then(|m| m.image_path()).map(|p| qualify(p, origin))
}

/// Resolve the original upload of a generic file (PDF, etc).
pub fn resolve_file_url(media: Option<&Media>, origin: &str) -> Option<String> {
    media.and_then(|m| m.original_url()).map(|p| qualify(p, origin))
}
