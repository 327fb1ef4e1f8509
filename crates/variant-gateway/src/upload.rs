//! Decoding of uploaded file payloads
//!
//! Uploads arrive as base64, optionally wrapped in a data URL such as
//! `data:image/png;base64,iVBOR...`. The data URL's media type becomes the
//! object's content type; bare base64 is assumed to be a JPEG.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use std::fmt;

/// Content type assumed when the payload carries no data URL prefix
pub const DEFAULT_UPLOAD_CONTENT_TYPE: &str = "image/jpeg";

/// Standard alphabet, padding optional
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// A decoded upload ready to be stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPayload {
    pub data: Vec<u8>,
    pub content_type: String,
}

#[derive(Debug)]
pub enum UploadError {
    InvalidBase64(base64::DecodeError),
}

impl fmt::Display for UploadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadError::InvalidBase64(err) => write!(f, "Invalid base64 file data: {}", err),
        }
    }
}

impl std::error::Error for UploadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            UploadError::InvalidBase64(err) => Some(err),
        }
    }
}

/// Split a `data:<type>;base64,` prefix off the payload
fn split_data_url(file: &str) -> Option<(&str, &str)> {
    let rest = file.strip_prefix("data:")?;
    let semi = rest.find(';')?;
    let (content_type, tail) = rest.split_at(semi);
    if content_type.is_empty() {
        return None;
    }
    let encoded = tail.strip_prefix(";base64,")?;
    Some((content_type, encoded))
}

/// Decode an uploaded file into raw bytes and a content type
pub fn decode_upload(file: &str) -> Result<UploadPayload, UploadError> {
    let (content_type, encoded) =
        split_data_url(file).unwrap_or((DEFAULT_UPLOAD_CONTENT_TYPE, file));

    let data = LENIENT_BASE64
        .decode(encoded)
        .map_err(UploadError::InvalidBase64)?;

    Ok(UploadPayload {
        data,
        content_type: content_type.to_string(),
    })
}
