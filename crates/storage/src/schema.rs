//! Table names and key/value byte formats
//!
//! # Tables
//!
//! | table | key | value |
//! |---|---|---|
//! | `meta` | `b"meta"` | JSON [`IndexMeta`](crate::IndexMeta) |
//! | `files` | file_id u32 BE | relative path |
//! | `files_rev` | relative path | file_id u32 BE |
//! | `records` | tag(1) + alid(16) | locator (32) |
//! | `cid_to_compound` | cid u64 BE | records key (17) |
//! | `confid_to_conf` | conformer id | records key (17) |
//! | `cid_to_conformers_h` | cid u64 BE | page_count u32 LE |
//! | `cid_to_conformers_p` | cid u64 BE + page_no u32 BE | alid(16) * n |
//!
//! Integer keys are big-endian so LMDB's byte order matches numeric order and
//! all pages of one CID are adjacent.

use sdfdex_core::{Alid, Cid, FileId, IndexError, RecordKind, Result, ALID_LEN};

/// Meta table name
pub const META_TABLE: &str = "meta";
/// file_id -> relative path
pub const FILES_TABLE: &str = "files";
/// relative path -> file_id
pub const FILES_REV_TABLE: &str = "files_rev";
/// records key -> locator
pub const RECORDS_TABLE: &str = "records";
/// CID -> compound records key
pub const CID_TO_COMPOUND_TABLE: &str = "cid_to_compound";
/// conformer id -> conformer records key
pub const CONFID_TO_CONF_TABLE: &str = "confid_to_conf";
/// CID -> posting page count
pub const CONFORMER_HEADERS_TABLE: &str = "cid_to_conformers_h";
/// (CID, page_no) -> posting page
pub const CONFORMER_PAGES_TABLE: &str = "cid_to_conformers_p";

/// All table names, in creation order
pub const ALL_TABLES: [&str; 8] = [
    META_TABLE,
    FILES_TABLE,
    FILES_REV_TABLE,
    RECORDS_TABLE,
    CID_TO_COMPOUND_TABLE,
    CONFID_TO_CONF_TABLE,
    CONFORMER_HEADERS_TABLE,
    CONFORMER_PAGES_TABLE,
];

/// Key of the single entry in the meta table
pub const META_KEY: &[u8] = b"meta";

/// Encoded length of a records key
pub const RECORD_KEY_LEN: usize = 1 + ALID_LEN;

/// Key of the `records` table: kind tag followed by the identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordKey([u8; RECORD_KEY_LEN]);

impl RecordKey {
    /// Build the key of a record
    pub fn new(kind: RecordKind, alid: &Alid) -> Self {
        let mut buf = [0u8; RECORD_KEY_LEN];
        buf[0] = kind.tag();
        buf[1..].copy_from_slice(alid.as_bytes());
        Self(buf)
    }

    /// Parse a key read back from an index table
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != RECORD_KEY_LEN {
            return Err(IndexError::corruption(format!(
                "records key must be {} bytes, got {}",
                RECORD_KEY_LEN,
                bytes.len()
            )));
        }
        if RecordKind::from_tag(bytes[0]).is_none() {
            return Err(IndexError::corruption(format!(
                "unknown record tag {:#04x}",
                bytes[0]
            )));
        }
        let mut buf = [0u8; RECORD_KEY_LEN];
        buf.copy_from_slice(bytes);
        Ok(Self(buf))
    }

    /// Record kind encoded in the tag byte
    pub fn kind(&self) -> RecordKind {
        // tag validated on construction
        match self.0[0] {
            b'F' => RecordKind::Conformer,
            _ => RecordKind::Compound,
        }
    }

    /// Identifier part of the key
    pub fn alid(&self) -> Alid {
        let mut bytes = [0u8; ALID_LEN];
        bytes.copy_from_slice(&self.0[1..]);
        Alid::from_bytes(bytes)
    }

    /// Raw key bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Encode a file id key
pub fn file_id_key(file_id: FileId) -> [u8; 4] {
    file_id.to_be_bytes()
}

/// Decode a file id stored as a key or value
pub fn decode_file_id(bytes: &[u8]) -> Result<FileId> {
    let arr: [u8; 4] = bytes.try_into().map_err(|_| {
        IndexError::corruption(format!("file id must be 4 bytes, got {}", bytes.len()))
    })?;
    Ok(FileId::from_be_bytes(arr))
}

/// Encode a CID key
pub fn cid_key(cid: Cid) -> [u8; 8] {
    cid.to_be_bytes()
}

/// Decode a CID key
pub fn decode_cid(bytes: &[u8]) -> Result<Cid> {
    let arr: [u8; 8] = bytes.try_into().map_err(|_| {
        IndexError::corruption(format!("CID key must be 8 bytes, got {}", bytes.len()))
    })?;
    Ok(Cid::from_be_bytes(arr))
}

/// Encode a posting page key
pub fn page_key(cid: Cid, page_no: u32) -> [u8; 12] {
    let mut buf = [0u8; 12];
    buf[0..8].copy_from_slice(&cid.to_be_bytes());
    buf[8..12].copy_from_slice(&page_no.to_be_bytes());
    buf
}

/// Encode a posting header value
pub fn encode_page_count(count: u32) -> [u8; 4] {
    count.to_le_bytes()
}

/// Decode a posting header value
pub fn decode_page_count(bytes: &[u8]) -> Result<u32> {
    let arr: [u8; 4] = bytes.try_into().map_err(|_| {
        IndexError::corruption(format!("page count must be 4 bytes, got {}", bytes.len()))
    })?;
    Ok(u32::from_le_bytes(arr))
}

/// Number of identifiers in a posting page blob
pub fn page_len(blob: &[u8]) -> Result<usize> {
    if blob.len() % ALID_LEN != 0 {
        return Err(IndexError::corruption(format!(
            "posting page length {} is not a multiple of {}",
            blob.len(),
            ALID_LEN
        )));
    }
    Ok(blob.len() / ALID_LEN)
}

/// Split a posting page blob into identifiers
pub fn page_entries(blob: &[u8]) -> Result<impl Iterator<Item = Alid> + '_> {
    page_len(blob)?;
    Ok(blob.chunks_exact(ALID_LEN).map(|chunk| {
        let mut bytes = [0u8; ALID_LEN];
        bytes.copy_from_slice(chunk);
        Alid::from_bytes(bytes)
    }))
}
