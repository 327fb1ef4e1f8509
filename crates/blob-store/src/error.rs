//! Error types for blob stores

use crate::types::StoreId;
use std::fmt;

#[derive(Debug)]
pub enum BlobStoreError {
    /// No object is stored under the key
    NotFound { store: StoreId, key: String },
    /// Transport or infrastructure failure
    Unavailable {
        store: StoreId,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl BlobStoreError {
    pub fn not_found(store: StoreId, key: &str) -> Self {
        BlobStoreError::NotFound {
            store,
            key: key.to_string(),
        }
    }

    pub fn unavailable(
        store: StoreId,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        BlobStoreError::Unavailable {
            store,
            source: source.into(),
        }
    }

    /// The store that reported the error
    pub fn store(&self) -> StoreId {
        match self {
            BlobStoreError::NotFound { store, .. } | BlobStoreError::Unavailable { store, .. } => {
                *store
            }
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, BlobStoreError::NotFound { .. })
    }
}

impl fmt::Display for BlobStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlobStoreError::NotFound { store, key } => {
                write!(f, "Object not found in {} store: {}", store, key)
            }
            BlobStoreError::Unavailable { store, source } => {
                write!(f, "{} store unavailable: {}", store, source)
            }
        }
    }
}

impl std::error::Error for BlobStoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BlobStoreError::Unavailable { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, BlobStoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = BlobStoreError::not_found(StoreId::Origin, "photos/cat.png");
        assert_eq!(
            format!("{}", err),
            "Object not found in origin store: photos/cat.png"
        );
        assert!(err.is_not_found());
        assert_eq!(err.store(), StoreId::Origin);
    }

    #[test]
    fn test_unavailable_display_and_source() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only volume");
        let err = BlobStoreError::unavailable(StoreId::Derived, io);
        assert_eq!(
            format!("{}", err),
            "derived store unavailable: read-only volume"
        );
        assert!(!err.is_not_found());
        assert!(std::error::Error::source(&err).is_some());
    }
}
