//! Error types for variant derivation

use std::fmt;

#[derive(Debug)]
pub enum DeriveError {
    /// Input bytes could not be decoded as a supported image
    Decode(Box<image::ImageError>),
    /// The decoded image could not be re-encoded
    Encode(Box<image::ImageError>),
    /// The derivation task did not run to completion
    Aborted(String),
}

impl fmt::Display for DeriveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeriveError::Decode(err) => write!(f, "Failed to decode image: {}", err),
            DeriveError::Encode(err) => write!(f, "Failed to encode JPEG: {}", err),
            DeriveError::Aborted(msg) => write!(f, "Derivation aborted: {}", msg),
        }
    }
}

impl std::error::Error for DeriveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DeriveError::Decode(err) | DeriveError::Encode(err) => Some(err.as_ref()),
            DeriveError::Aborted(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, DeriveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_display() {
        let err = DeriveError::Decode(Box::new(image::ImageError::IoError(
            std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "truncated"),
        )));
        assert!(format!("{}", err).starts_with("Failed to decode image"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_aborted_error_display() {
        let err = DeriveError::Aborted("task panicked".to_string());
        assert_eq!(format!("{}", err), "Derivation aborted: task panicked");
        assert!(std::error::Error::source(&err).is_none());
    }
}
