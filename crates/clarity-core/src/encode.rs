//! Fallback encoding: the original file as a base64 data URL.

use base64::Engine;
use image::ImageFormat;
use std::path::Path;

use crate::error::EncodeError;
use crate::types::FileBlob;

/// Media type reported for blobs we can't identify.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// A decoded `data:` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    pub media_type: String,
    pub data: Vec<u8>,
}

/// Extensions `image` doesn't know, mapped the way a browser file picker
/// types them.
const EXTRA_MEDIA_TYPES: &[(&str, &str)] = &[
    ("heic", "image/heic"),
    ("heif", "image/heif"),
    ("svg", "image/svg+xml"),
    ("txt", "text/plain"),
    ("json", "application/json"),
    ("pdf", "application/pdf"),
    ("zip", "application/zip"),
];

/// Resolve the media type of a blob.
///
/// Magic bytes win over the file extension; content with neither a known
/// signature nor a known extension falls back to `application/octet-stream`.
pub fn sniff_media_type(data: &[u8], path: Option<&Path>) -> String {
    if let Ok(format) = image::guess_format(data) {
        return format.to_mime_type().to_string();
    }
    let Some(path) = path else {
        return OCTET_STREAM.to_string();
    };
    if let Ok(format) = ImageFormat::from_path(path) {
        return format.to_mime_type().to_string();
    }
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .and_then(|ext| {
            EXTRA_MEDIA_TYPES
                .iter()
                .find(|(known, _)| *known == ext)
                .map(|(_, media)| media.to_string())
        })
        .unwrap_or_else(|| OCTET_STREAM.to_string())
}

/// Encode raw bytes as `data:<media_type>;base64,<payload>`.
pub fn to_data_url(data: &[u8], media_type: &str) -> String {
    format!(
        "data:{};base64,{}",
        media_type,
        base64::engine::general_purpose::STANDARD.encode(data)
    )
}

impl FileBlob {
    pub fn data_url(&self) -> String {
        to_data_url(&self.data, &self.media_type)
    }
}

/// Decode a base64 data URL back into its media type and bytes.
pub fn decode_data_url(url: &str) -> Result<DataUrl, EncodeError> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| EncodeError::InvalidDataUrl("missing data: scheme".to_string()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| EncodeError::InvalidDataUrl("missing ',' separator".to_string()))?;
    let media_type = header
        .strip_suffix(";base64")
        .ok_or_else(|| EncodeError::InvalidDataUrl("payload is not base64".to_string()))?;

    let data = base64::engine::general_purpose::STANDARD.decode(payload)?;
    Ok(DataUrl {
        media_type: media_type.to_string(),
        data,
    })
}
