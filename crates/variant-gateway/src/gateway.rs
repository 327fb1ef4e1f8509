//! Object gateway over the origin and derived stores
//!
//! The gateway holds no state of its own. Whether a derived variant exists is
//! discovered by reading the derived store, and a missing variant is computed
//! from the original and written back on first request.

use crate::error::{GatewayError, Result};
use crate::types::{DerivedWrite, FetchResult, FetchSource, RemoveOutcome, StoreOutcome};
use blob_store::{BlobStore, StoredObject};
use image_deriver::{
    is_derivable, DeriveError, DerivedVariant, VariantDeriver, DERIVED_CONTENT_TYPE,
};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Coordinates the origin store, the derived store and the deriver
pub struct ObjectGateway {
    origin: Arc<dyn BlobStore>,
    derived: Arc<dyn BlobStore>,
    deriver: Arc<dyn VariantDeriver>,
}

impl ObjectGateway {
    pub fn new(
        origin: Arc<dyn BlobStore>,
        derived: Arc<dyn BlobStore>,
        deriver: Arc<dyn VariantDeriver>,
    ) -> Self {
        Self {
            origin,
            derived,
            deriver,
        }
    }

    /// Store an original and, for images, its compressed variant.
    ///
    /// Derivation runs alongside the origin write, but the derived store is
    /// only touched once the origin write has succeeded. When no fresh variant
    /// can be written, any variant left from an earlier upload under the same
    /// key is deleted. Derived-side failures are reported in the outcome and
    /// never affect the origin write.
    pub async fn store(&self, key: &str, data: &[u8], content_type: &str) -> StoreOutcome {
        let derivation = async {
            if !is_derivable(content_type) {
                return None;
            }
            let derived = self
                .derive_blocking(data.to_vec(), content_type.to_string())
                .await;
            Some(derived.map(|(_, variant)| variant))
        };

        let (origin, derivation) =
            tokio::join!(self.origin.put(key, data, content_type), derivation);

        let derived = match &origin {
            Ok(()) => self.store_derived(key, content_type, derivation).await,
            Err(e) => {
                error!(key, error = %e, "Failed to store original");
                DerivedWrite::NotAttempted
            }
        };

        if origin.is_ok() {
            info!(
                key,
                content_type,
                size = data.len(),
                derived_written = derived.is_written(),
                "Stored object"
            );
        }

        StoreOutcome { origin, derived }
    }

    async fn store_derived(
        &self,
        key: &str,
        content_type: &str,
        derivation: Option<std::result::Result<Option<DerivedVariant>, DeriveError>>,
    ) -> DerivedWrite {
        let variant = match derivation {
            Some(Ok(Some(variant))) => variant,
            None | Some(Ok(None)) => return self.clear_derived(key, DerivedWrite::Skipped).await,
            Some(Err(e)) => {
                warn!(key, content_type, error = %e, "Failed to derive variant on upload");
                return self
                    .clear_derived(key, DerivedWrite::DerivationFailed(e))
                    .await;
            }
        };

        match self
            .derived
            .put(key, &variant.data, variant.content_type)
            .await
        {
            Ok(()) => DerivedWrite::Written,
            Err(e) => {
                warn!(key, error = %e, "Failed to store derived variant");
                if let Err(clear) = self.derived.delete(key).await {
                    warn!(key, error = %clear, "Failed to clear stale derived variant");
                }
                DerivedWrite::WriteFailed(e)
            }
        }
    }

    /// Delete a variant that no longer matches the original
    async fn clear_derived(&self, key: &str, outcome: DerivedWrite) -> DerivedWrite {
        match self.derived.delete(key).await {
            Ok(()) => outcome,
            Err(e) => {
                warn!(key, error = %e, "Failed to clear stale derived variant");
                DerivedWrite::ClearFailed(e)
            }
        }
    }

    /// Run the deriver on the blocking pool, handing the input buffer back
    async fn derive_blocking(
        &self,
        data: Vec<u8>,
        content_type: String,
    ) -> std::result::Result<(Vec<u8>, Option<DerivedVariant>), DeriveError> {
        let deriver = Arc::clone(&self.deriver);
        tokio::task::spawn_blocking(move || -> std::result::Result<_, DeriveError> {
            let variant = deriver.derive(&data, &content_type)?;
            Ok((data, variant))
        })
        .await
        .map_err(|e| DeriveError::Aborted(e.to_string()))?
    }

    /// Fetch an object, optionally as its compressed variant.
    ///
    /// With `want_derived`, the derived store is consulted first. On a miss the
    /// variant is derived from the original and written back; a failed write
    /// back does not fail the fetch. Originals that are not images are
    /// returned unchanged.
    pub async fn fetch(&self, key: &str, want_derived: bool) -> Result<FetchResult> {
        if !want_derived {
            let original = self.origin.get(key).await?;
            return Ok(passthrough(original));
        }

        match self.derived.get(key).await {
            Ok(cached) => {
                debug!(key, "Derived variant cache hit");
                return Ok(FetchResult {
                    data: cached.data,
                    content_type: DERIVED_CONTENT_TYPE.to_string(),
                    source: FetchSource::CacheHit,
                });
            }
            Err(e) if e.is_not_found() => debug!(key, "Derived variant cache miss"),
            Err(e) => return Err(e.into()),
        }

        let original = self.origin.get(key).await?;
        if !is_derivable(&original.content_type) {
            return Ok(passthrough(original));
        }

        let (data, variant) = self
            .derive_blocking(original.data, original.content_type.clone())
            .await
            .map_err(|e| {
                warn!(key, content_type = %original.content_type, error = %e, "Failed to derive variant");
                GatewayError::DerivationFailed(e)
            })?;

        let Some(variant) = variant else {
            return Ok(FetchResult {
                data,
                content_type: original.content_type,
                source: FetchSource::Origin,
            });
        };

        if let Err(e) = self
            .derived
            .put(key, &variant.data, variant.content_type)
            .await
        {
            warn!(key, error = %e, "Failed to cache derived variant");
        }

        Ok(FetchResult {
            data: variant.data,
            content_type: variant.content_type.to_string(),
            source: FetchSource::CacheMiss,
        })
    }

    /// Delete an object from both stores concurrently.
    pub async fn remove(&self, key: &str) -> RemoveOutcome {
        let (origin, derived) = tokio::join!(self.origin.delete(key), self.derived.delete(key));

        if let Err(e) = &origin {
            error!(key, error = %e, "Failed to delete original");
        }
        if let Err(e) = &derived {
            error!(key, error = %e, "Failed to delete derived variant");
        }
        if origin.is_ok() && derived.is_ok() {
            info!(key, "Removed object");
        }

        RemoveOutcome { origin, derived }
    }
}

fn passthrough(object: StoredObject) -> FetchResult {
    FetchResult {
        data: object.data,
        content_type: object.content_type,
        source: FetchSource::Origin,
    }
}
