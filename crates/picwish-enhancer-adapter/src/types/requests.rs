/*
[INPUT]:  ImagePayload and enhancement options
[OUTPUT]: Multipart form for the create-task endpoint
[POS]:    Data layer - request construction for the visual/scale API
[UPDATE]: When form fields or enhancement modes change
*/

use reqwest::multipart::{Form, Part};

use super::payload::ImagePayload;
use crate::http::{EnhancerError, Result};

/// Enhancement mode sent as the `type` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnhanceMode {
    #[default]
    Clean,
    Face,
}

impl EnhanceMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnhanceMode::Clean => "clean",
            EnhanceMode::Face => "face",
        }
    }
}

/// Fields of a create-task request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaleTaskRequest {
    pub mode: EnhanceMode,
    /// `sync=1` blocks until done; the controller always polls, so this stays false.
    pub sync: bool,
    /// `return_type=1` asks for a result URL instead of inline bytes
    pub return_url: bool,
}

impl Default for ScaleTaskRequest {
    fn default() -> Self {
        Self {
            mode: EnhanceMode::Clean,
            sync: false,
            return_url: true,
        }
    }
}

impl ScaleTaskRequest {
    /// Text fields in the order they are appended to the form
    pub fn fields(&self) -> [(&'static str, &'static str); 3] {
        [
            ("sync", if self.sync { "1" } else { "0" }),
            ("type", self.mode.as_str()),
            ("return_type", if self.return_url { "1" } else { "2" }),
        ]
    }

    pub fn into_form(self, payload: &ImagePayload) -> Result<Form> {
        let part = Part::bytes(payload.bytes().to_vec())
            .file_name(payload.file_name())
            .mime_str(payload.mime_type().trim())
            .map_err(|err| {
                EnhancerError::InvalidInput(format!(
                    "mime type {:?} is not valid: {err}",
                    payload.mime_type()
                ))
            })?;

        let form = self
            .fields()
            .into_iter()
            .fold(Form::new().part("image_file", part), |form, (name, value)| {
                form.text(name, value)
            });
        Ok(form)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_fields() {
        assert_eq!(
            ScaleTaskRequest::default().fields(),
            [("sync", "0"), ("type", "clean"), ("return_type", "1")]
        );
    }

    #[test]
    fn test_face_mode() {
        let request = ScaleTaskRequest {
            mode: EnhanceMode::Face,
            ..Default::default()
        };
        assert_eq!(request.fields()[1], ("type", "face"));
    }

    #[test]
    fn test_form_rejects_unparseable_mime() {
        let payload = ImagePayload::new(b"data".to_vec(), "not a mime");
        let result = ScaleTaskRequest::default().into_form(&payload);
        assert!(matches!(result, Err(EnhancerError::InvalidInput(_))));
    }
}
