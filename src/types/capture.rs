use std::fmt;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use super::errors::CaptureError;

/// Encoded pixel data of one screenshot.
///
/// Travels between components as a data URL (`data:image/png;base64,...`),
/// the same shape the browser capture primitive hands out.
#[derive(Clone, PartialEq, Eq)]
pub struct CaptureImage {
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl CaptureImage {
    pub fn png(bytes: Vec<u8>) -> Self {
        Self {
            mime: "image/png".to_string(),
            bytes,
        }
    }

    /// Renders the image as a base64 data URL.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, BASE64.encode(&self.bytes))
    }

    /// Parses a base64 data URL.
    pub fn from_data_url(url: &str) -> Result<Self, CaptureError> {
        let rest = url
            .strip_prefix("data:")
            .ok_or_else(|| CaptureError::InvalidImage("missing data: prefix".to_string()))?;
        let (mime, payload) = rest
            .split_once(";base64,")
            .ok_or_else(|| CaptureError::InvalidImage("missing ;base64, marker".to_string()))?;
        if mime.is_empty() {
            return Err(CaptureError::InvalidImage("missing mime type".to_string()));
        }
        let bytes = BASE64
            .decode(payload)
            .map_err(|e| CaptureError::InvalidImage(format!("base64 decode error: {}", e)))?;
        Ok(Self {
            mime: mime.to_string(),
            bytes,
        })
    }
}

impl fmt::Debug for CaptureImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureImage")
            .field("mime", &self.mime)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl Serialize for CaptureImage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_data_url())
    }
}

impl<'de> Deserialize<'de> for CaptureImage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let url = String::deserialize(deserializer)?;
        CaptureImage::from_data_url(&url).map_err(de::Error::custom)
    }
}

/// One screenshot plus the click that triggered it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capture {
    pub image: CaptureImage,
    pub click_x: f64,
    pub click_y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<String>,
}

impl Capture {
    pub fn new(image: CaptureImage, click_x: f64, click_y: f64) -> Self {
        Self {
            image,
            click_x,
            click_y,
            annotation: None,
        }
    }

    /// Returns a copy carrying the given annotation; blank text clears it.
    pub fn with_annotation(mut self, text: &str) -> Self {
        let trimmed = text.trim();
        self.annotation = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
        self
    }
}
