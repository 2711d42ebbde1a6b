/*
[INPUT]:  Path to an image file chosen by the user
[OUTPUT]: ImagePayload (bytes + mime type inferred from the extension)
[POS]:    Image source - file-backed collaborator feeding the controller
[UPDATE]: When supported file extensions change
*/

use std::io;
use std::path::Path;

use picwish_enhancer_adapter::ImagePayload;

/// Mime type used for files whose extension is not a known image format
pub const UNKNOWN_MIME_TYPE: &str = "application/octet-stream";

/// Mime type for a file name, judged by extension only
pub fn mime_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("jpg" | "jpeg" | "jpe" | "jfif") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        Some("tif" | "tiff") => "image/tiff",
        Some("heic") => "image/heic",
        _ => UNKNOWN_MIME_TYPE,
    }
}

/// Read an image file into a payload.
///
/// Non-image files still load; the controller rejects them as invalid input.
pub async fn load_image(path: impl AsRef<Path>) -> io::Result<ImagePayload> {
    let path = path.as_ref();
    let bytes = tokio::fs::read(path).await?;
    let payload = ImagePayload::new(bytes, mime_type_for(path));

    Ok(match path.file_name().and_then(|name| name.to_str()) {
        Some(name) => payload.with_file_name(name),
        None => payload,
    })
}
