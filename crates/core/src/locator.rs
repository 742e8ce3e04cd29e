//! Record locators and their fixed-size binary encoding
//!
//! # Binary Format (32 bytes, little-endian)
//!
//! ```text
//! file_id(4) + start(8) + end(8) + flags(1) + reserved(3) + cid(8) = 32 bytes
//! ```
//!
//! Flags: bit 0 set for conformer records, bit 1 set when `cid` is present.
//! An absent CID is stored as `-1`. Reserved bytes are written as zero.
//!
//! # Span convention
//!
//! `start` is the offset of the record's first byte. `end` is exclusive and
//! lies just past the line terminator of the record's delimiter line, so the
//! span includes `$$$$\n` and the next record starts at `end`.

use crate::error::{IndexError, Result};
use crate::limits::MAX_CID;
use crate::types::{Cid, FileId, RecordKind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Encoded size of a locator
pub const LOCATOR_LEN: usize = 32;

/// Flag bit: record is a conformer
pub const FLAG_CONFORMER: u8 = 0x01;

/// Flag bit: `cid` slot holds a value
pub const FLAG_HAS_CID: u8 = 0x02;

const KNOWN_FLAGS: u8 = FLAG_CONFORMER | FLAG_HAS_CID;

/// Position of one record inside one source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordLocator {
    /// File the record lives in
    pub file_id: FileId,
    /// Offset of the first byte
    pub start: u64,
    /// Offset one past the last byte (delimiter line included)
    pub end: u64,
    /// Record kind
    pub kind: RecordKind,
    /// Compound CID, or the parent CID of a conformer
    pub cid: Option<Cid>,
}

impl RecordLocator {
    /// Create a locator, checking the span and CID range
    pub fn new(
        file_id: FileId,
        start: u64,
        end: u64,
        kind: RecordKind,
        cid: Option<Cid>,
    ) -> Result<Self> {
        if start >= end {
            return Err(IndexError::invalid_input(format!(
                "empty or inverted span {}..{}",
                start, end
            )));
        }
        if let Some(cid) = cid {
            if cid > MAX_CID {
                return Err(IndexError::invalid_input(format!(
                    "CID {} exceeds {}",
                    cid, MAX_CID
                )));
            }
        }
        Ok(Self {
            file_id,
            start,
            end,
            kind,
            cid,
        })
    }

    /// Number of bytes in the record
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    /// Always false: a valid locator spans at least one byte
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Serialize to the 32-byte value stored in the `records` table
    pub fn to_bytes(&self) -> [u8; LOCATOR_LEN] {
        let mut buf = [0u8; LOCATOR_LEN];
        let mut flags = 0u8;
        if self.kind == RecordKind::Conformer {
            flags |= FLAG_CONFORMER;
        }
        let cid = match self.cid {
            Some(cid) => {
                flags |= FLAG_HAS_CID;
                cid as i64
            }
            None => -1,
        };
        buf[0..4].copy_from_slice(&self.file_id.to_le_bytes());
        buf[4..12].copy_from_slice(&self.start.to_le_bytes());
        buf[12..20].copy_from_slice(&self.end.to_le_bytes());
        buf[20] = flags;
        buf[24..32].copy_from_slice(&cid.to_le_bytes());
        buf
    }

    /// Deserialize, validating length, flags and span
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() != LOCATOR_LEN {
            return Err(IndexError::corruption(format!(
                "locator must be {} bytes, got {}",
                LOCATOR_LEN,
                data.len()
            )));
        }
        let flags = data[20];
        if flags & !KNOWN_FLAGS != 0 {
            return Err(IndexError::corruption(format!(
                "unknown locator flags {:#04x}",
                flags
            )));
        }

        let file_id = u32::from_le_bytes(read_array(&data[0..4]));
        let start = u64::from_le_bytes(read_array(&data[4..12]));
        let end = u64::from_le_bytes(read_array(&data[12..20]));
        let raw_cid = i64::from_le_bytes(read_array(&data[24..32]));

        if start >= end {
            return Err(IndexError::corruption(format!(
                "locator span {}..{} is empty",
                start, end
            )));
        }
        let cid = if flags & FLAG_HAS_CID != 0 {
            if raw_cid < 0 {
                return Err(IndexError::corruption(format!(
                    "negative CID {} in locator",
                    raw_cid
                )));
            }
            Some(raw_cid as u64)
        } else {
            None
        };
        let kind = if flags & FLAG_CONFORMER != 0 {
            RecordKind::Conformer
        } else {
            RecordKind::Compound
        };

        Ok(Self {
            file_id,
            start,
            end,
            kind,
            cid,
        })
    }
}

impl fmt::Display for RecordLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "file_id={} start={} end={} kind={}",
            self.file_id, self.start, self.end, self.kind
        )?;
        match self.cid {
            Some(cid) => write!(f, " cid={}", cid),
            None => f.write_str(" cid=-"),
        }
    }
}

fn read_array<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut arr = [0u8; N];
    arr.copy_from_slice(bytes);
    arr
}
