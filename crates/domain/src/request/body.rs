//! HTTP Request body types

use serde::{Deserialize, Serialize};

/// Media type used when no `content-type` was staged.
pub const DEFAULT_MEDIA_TYPE: &str = "application/json";

/// HTTP request body with its media type.
///
/// The body is always sent as UTF-8.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestBody {
    /// Media type without parameters (e.g. `application/json`).
    pub media_type: String,
    /// The body content as a string
    #[serde(default)]
    pub content: String,
}

impl RequestBody {
    /// Creates a body with an explicit media type.
    #[must_use]
    pub fn new(media_type: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            media_type: media_type.into(),
            content: content.into(),
        }
    }

    /// Creates a JSON body.
    #[must_use]
    pub fn json(content: impl Into<String>) -> Self {
        Self::new(DEFAULT_MEDIA_TYPE, content)
    }

    /// Returns the `Content-Type` header value, including the charset.
    #[must_use]
    pub fn content_type(&self) -> String {
        if self.media_type.to_ascii_lowercase().contains("charset=") {
            self.media_type.clone()
        } else {
            format!("{}; charset=utf-8", self.media_type)
        }
    }

    /// Returns whether the content is empty or whitespace only.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }
}
