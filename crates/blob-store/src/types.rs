//! Store types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a store instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreId {
    /// Holds the bytes exactly as submitted
    Origin,
    /// Holds the lazily computed compressed variant
    Derived,
}

impl StoreId {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreId::Origin => "origin",
            StoreId::Derived => "derived",
        }
    }
}

impl fmt::Display for StoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An object read back from a store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    pub data: Vec<u8>,
    pub content_type: String,
    pub store: StoreId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_id_display() {
        assert_eq!(StoreId::Origin.to_string(), "origin");
        assert_eq!(StoreId::Derived.to_string(), "derived");
    }

    #[test]
    fn test_store_id_serialization() {
        let json = serde_json::to_string(&StoreId::Derived).unwrap();
        assert_eq!(json, "\"derived\"");

        let id: StoreId = serde_json::from_str("\"origin\"").unwrap();
        assert_eq!(id, StoreId::Origin);
    }
}
