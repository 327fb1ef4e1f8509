//! Core types for the variant gateway

use crate::error::{GatewayError, Result};
use blob_store::{BlobStoreError, StoreId};
use image_deriver::DeriveError;
use serde::Serialize;

/// Where the bytes returned by a fetch came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchSource {
    /// The original object, unchanged
    Origin,
    /// A variant already present in the derived store
    CacheHit,
    /// A variant derived during this request
    CacheMiss,
}

/// Bytes and content type returned by a fetch
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub data: Vec<u8>,
    pub content_type: String,
    pub source: FetchSource,
}

/// What happened on the derived side of a store
#[derive(Debug)]
pub enum DerivedWrite {
    /// Content type not eligible for derivation
    Skipped,
    Written,
    DerivationFailed(DeriveError),
    WriteFailed(BlobStoreError),
    /// A variant from an earlier upload could not be deleted
    ClearFailed(BlobStoreError),
    /// The origin write failed, so the derived store was left alone
    NotAttempted,
}

impl DerivedWrite {
    pub fn is_written(&self) -> bool {
        matches!(self, DerivedWrite::Written)
    }

    pub fn report(&self) -> WriteReport {
        match self {
            DerivedWrite::Skipped | DerivedWrite::NotAttempted => {
                WriteReport::skipped(StoreId::Derived)
            }
            DerivedWrite::Written => WriteReport::ok(StoreId::Derived),
            DerivedWrite::DerivationFailed(e) => WriteReport::failed(StoreId::Derived, e),
            DerivedWrite::WriteFailed(e) | DerivedWrite::ClearFailed(e) => {
                WriteReport::failed(StoreId::Derived, e)
            }
        }
    }
}

/// Outcome of storing an object in both stores
#[derive(Debug)]
pub struct StoreOutcome {
    pub origin: std::result::Result<(), BlobStoreError>,
    pub derived: DerivedWrite,
}

impl StoreOutcome {
    /// Fails only when the origin write failed
    pub fn into_result(self) -> Result<Self> {
        if let Err(e) = self.origin {
            return Err(GatewayError::StoreUnavailable(e));
        }
        Ok(Self {
            origin: Ok(()),
            derived: self.derived,
        })
    }

    pub fn origin_report(&self) -> WriteReport {
        WriteReport::from_result(StoreId::Origin, &self.origin)
    }

    pub fn derived_report(&self) -> WriteReport {
        self.derived.report()
    }
}

/// Outcome of deleting an object from both stores
#[derive(Debug)]
pub struct RemoveOutcome {
    pub origin: std::result::Result<(), BlobStoreError>,
    pub derived: std::result::Result<(), BlobStoreError>,
}

impl RemoveOutcome {
    /// Escalate per-store failures into a single error
    pub fn into_result(self) -> Result<Self> {
        match (self.origin, self.derived) {
            (Ok(()), Ok(())) => Ok(Self {
                origin: Ok(()),
                derived: Ok(()),
            }),
            (Err(e), Ok(())) | (Ok(()), Err(e)) => Err(GatewayError::PartialDeleteFailure(e)),
            (Err(e), Err(_)) => Err(GatewayError::StoreUnavailable(e)),
        }
    }

    pub fn origin_report(&self) -> WriteReport {
        WriteReport::from_result(StoreId::Origin, &self.origin)
    }

    pub fn derived_report(&self) -> WriteReport {
        WriteReport::from_result(StoreId::Derived, &self.derived)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteStatus {
    Ok,
    Skipped,
    Failed,
}

/// Per-store result included in API responses
#[derive(Debug, Clone, Serialize)]
pub struct WriteReport {
    pub store: StoreId,
    pub status: WriteStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WriteReport {
    fn ok(store: StoreId) -> Self {
        Self {
            store,
            status: WriteStatus::Ok,
            error: None,
        }
    }

    fn skipped(store: StoreId) -> Self {
        Self {
            store,
            status: WriteStatus::Skipped,
            error: None,
        }
    }

    fn failed(store: StoreId, err: &dyn std::error::Error) -> Self {
        Self {
            store,
            status: WriteStatus::Failed,
            error: Some(err.to_string()),
        }
    }

    fn from_result(store: StoreId, result: &std::result::Result<(), BlobStoreError>) -> Self {
        match result {
            Ok(()) => Self::ok(store),
            Err(e) => Self::failed(store, e),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_secs: u64,
}
