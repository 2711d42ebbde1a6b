/*
[INPUT]:  Raw image bytes and declared mime type from an image source
[OUTPUT]: Immutable ImagePayload with local validation
[POS]:    Data layer - the one value handed from image source to controller
[UPDATE]: When accepted image formats or validation rules change
*/

use std::fmt;

use crate::http::{EnhancerError, Result};

/// Image bytes plus declared mime type, never mutated after construction
#[derive(Clone, PartialEq, Eq)]
pub struct ImagePayload {
    bytes: Vec<u8>,
    mime_type: String,
    file_name: Option<String>,
}

impl ImagePayload {
    pub fn new(bytes: impl Into<Vec<u8>>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            mime_type: mime_type.into(),
            file_name: None,
        }
    }

    /// Attach the original file name sent in the multipart part
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// File name for the upload; derived from the mime subtype when none was given.
    pub fn file_name(&self) -> String {
        if let Some(name) = &self.file_name {
            return name.clone();
        }
        let subtype = self
            .mime_type
            .split_once('/')
            .map(|(_, subtype)| subtype.trim().to_ascii_lowercase())
            .unwrap_or_default();
        let extension = match subtype.as_str() {
            "jpeg" | "pjpeg" | "" => "jpg",
            "svg+xml" => "svg",
            other => other,
        };
        format!("image.{extension}")
    }

    /// Local checks: non-empty and an `image/*` mime type.
    pub fn validate(&self) -> Result<()> {
        if self.bytes.is_empty() {
            return Err(EnhancerError::InvalidInput(
                "image payload is empty".to_string(),
            ));
        }
        let is_image = self
            .mime_type
            .trim()
            .to_ascii_lowercase()
            .strip_prefix("image/")
            .is_some_and(|subtype| !subtype.is_empty());
        if !is_image {
            return Err(EnhancerError::InvalidInput(format!(
                "unsupported mime type {:?}",
                self.mime_type
            )));
        }
        Ok(())
    }
}

impl fmt::Debug for ImagePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImagePayload")
            .field("len", &self.bytes.len())
            .field("mime_type", &self.mime_type)
            .field("file_name", &self.file_name)
            .finish()
    }
}
