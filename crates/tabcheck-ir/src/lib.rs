//! tabcheck intermediate representation
//!
//! Shared data model for the validation workspace: schemas describing the
//! columns a dataset must carry, and the in-memory tables checked against them.
//! Schemas serialize deterministically so they can be fingerprinted and
//! loaded from YAML.

use sha2::{Digest, Sha256};

mod table;
mod types;

pub use table::*;
pub use types::*;

impl Schema {
    /// Calculate fingerprint (SHA-256) of the schema definition
    pub fn fingerprint(&self) -> String {
        let json = serde_json::to_string(self).unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(json.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}
