//! Compressed image variant derivation
//!
//! Turns an uploaded image into its compressed JPEG variant. Derivation is a
//! pure function of the input bytes: the same image always yields the same
//! output, and nothing is retained between calls.

mod deriver;
mod error;

pub use deriver::{is_derivable, DerivedVariant, JpegDeriver, VariantDeriver};
pub use error::{DeriveError, Result};

/// Content type of every derived variant
pub const DERIVED_CONTENT_TYPE: &str = "image/jpeg";

/// JPEG quality used when none is configured
pub const DEFAULT_JPEG_QUALITY: u8 = 70;
