//! Deterministic record identifiers (ALID)
//!
//! Every record gets a 128-bit identifier computed once at build time as a
//! name-based UUID (version 5, SHA-1):
//!
//! ```text
//! namespace = 6ba7b811-9dad-11d1-80b4-00c04fd430c8   (RFC 4122 URL namespace)
//! name      = "{kind}|{relative_path}|{seq_no}|{domain_id}"
//! ```
//!
//! `kind` is `compound` or `conformer`, `seq_no` is the 0-based position of
//! the record in its file, `domain_id` is the CID (decimal) or conformer id,
//! or the empty string when the record has none. Any implementation holding
//! the namespace and this template reproduces the same identifiers.
//!
//! Identity depends on the relative path: moving the whole root keeps
//! identifiers, renaming a file changes them.

use crate::error::{IndexError, Result};
use crate::types::RecordKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Namespace of the identifier scheme
pub const ALID_NAMESPACE: Uuid = Uuid::NAMESPACE_URL;

/// Encoded length of an identifier
pub const ALID_LEN: usize = 16;

/// Deterministic 128-bit record identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Alid(Uuid);

impl Alid {
    /// Generate the identifier of a record
    pub fn generate(
        kind: RecordKind,
        relative_path: &str,
        seq_no: u64,
        domain_id: Option<&str>,
    ) -> Self {
        let name = alid_name(kind, relative_path, seq_no, domain_id);
        Self(Uuid::new_v5(&ALID_NAMESPACE, name.as_bytes()))
    }

    /// Create an Alid from raw bytes
    pub fn from_bytes(bytes: [u8; ALID_LEN]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }

    /// Create an Alid from a slice that must be exactly 16 bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; ALID_LEN] = bytes.try_into().map_err(|_| {
            IndexError::corruption(format!(
                "identifier must be {} bytes, got {}",
                ALID_LEN,
                bytes.len()
            ))
        })?;
        Ok(Self::from_bytes(arr))
    }

    /// Get the raw bytes of this Alid
    pub fn as_bytes(&self) -> &[u8; ALID_LEN] {
        self.0.as_bytes()
    }

    /// Underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

/// Composite name hashed into an identifier
pub fn alid_name(
    kind: RecordKind,
    relative_path: &str,
    seq_no: u64,
    domain_id: Option<&str>,
) -> String {
    format!(
        "{}|{}|{}|{}",
        kind.as_str(),
        relative_path,
        seq_no,
        domain_id.unwrap_or("")
    )
}

impl fmt::Display for Alid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Alid {
    type Err = IndexError;

    /// Accepts standard UUID format (with or without hyphens)
    fn from_str(s: &str) -> Result<Self> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| IndexError::invalid_input(format!("invalid ALID '{}': {}", s, e)))
    }
}
