//! Error types for the variant gateway

use blob_store::{BlobStoreError, StoreId};
use image_deriver::DeriveError;
use std::fmt;

/// Errors surfaced by gateway operations
#[derive(Debug)]
pub enum GatewayError {
    /// The key is absent from the store the operation required
    NotFound { store: StoreId, key: String },
    /// Transport or infrastructure failure from either store
    StoreUnavailable(BlobStoreError),
    /// The original could not be turned into a compressed variant
    DerivationFailed(DeriveError),
    /// One of the two deletes failed while the other succeeded
    PartialDeleteFailure(BlobStoreError),
}

impl GatewayError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, GatewayError::NotFound { .. })
    }
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::NotFound { store, key } => {
                write!(f, "Object not found in {} store: {}", store, key)
            }
            GatewayError::StoreUnavailable(err) => write!(f, "Store unavailable: {}", err),
            GatewayError::DerivationFailed(err) => write!(f, "Derivation failed: {}", err),
            GatewayError::PartialDeleteFailure(err) => {
                write!(f, "Partial delete failure: {}", err)
            }
        }
    }
}

impl std::error::Error for GatewayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GatewayError::StoreUnavailable(err) | GatewayError::PartialDeleteFailure(err) => {
                Some(err)
            }
            GatewayError::DerivationFailed(err) => Some(err),
            GatewayError::NotFound { .. } => None,
        }
    }
}

impl From<BlobStoreError> for GatewayError {
    fn from(err: BlobStoreError) -> Self {
        match err {
            BlobStoreError::NotFound { store, key } => GatewayError::NotFound { store, key },
            other => GatewayError::StoreUnavailable(other),
        }
    }
}

impl From<DeriveError> for GatewayError {
    fn from(err: DeriveError) -> Self {
        GatewayError::DerivationFailed(err)
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;

/// Errors that stop the service from starting
#[derive(Debug)]
pub enum StartupError {
    Store(BlobStoreError),
    Io(Box<std::io::Error>),
    Config(String),
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartupError::Store(err) => write!(f, "Store error: {}", err),
            StartupError::Io(err) => write!(f, "IO error: {}", err),
            StartupError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for StartupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StartupError::Store(err) => Some(err),
            StartupError::Io(err) => Some(err.as_ref()),
            StartupError::Config(_) => None,
        }
    }
}

impl From<BlobStoreError> for StartupError {
    fn from(err: BlobStoreError) -> Self {
        StartupError::Store(err)
    }
}

impl From<std::io::Error> for StartupError {
    fn from(err: std::io::Error) -> Self {
        StartupError::Io(Box::new(err))
    }
}

impl From<tracing_subscriber::filter::ParseError> for StartupError {
    fn from(err: tracing_subscriber::filter::ParseError) -> Self {
        StartupError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_conversion() {
        let err: GatewayError = BlobStoreError::not_found(StoreId::Origin, "a.png").into();
        assert!(err.is_not_found());
        assert_eq!(format!("{}", err), "Object not found in origin store: a.png");
    }

    #[test]
    fn test_unavailable_conversion() {
        let err: GatewayError = BlobStoreError::unavailable(StoreId::Derived, "timed out").into();
        assert!(matches!(err, GatewayError::StoreUnavailable(_)));
        assert_eq!(
            format!("{}", err),
            "Store unavailable: derived store unavailable: timed out"
        );
    }

    #[test]
    fn test_config_error_display() {
        let err = StartupError::Config("invalid PORT".to_string());
        assert_eq!(format!("{}", err), "Configuration error: invalid PORT");
    }
}
