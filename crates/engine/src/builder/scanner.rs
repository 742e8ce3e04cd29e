//! Record delimiting over a binary byte stream
//!
//! The scanner reads lines with `read_until(b'\n')`, so offsets are exact byte
//! positions in the file whatever the line terminator (`\n` or `\r\n`) and
//! whatever the encoding. A line that equals the delimiter after trimming
//! ASCII whitespace ends the current record; the record's `end` is the offset
//! just past that line's terminator.

use crate::collab::{ExtractedFields, FieldExtractor};
use sdfdex_core::{RecordKind, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Read buffer for source files
const READ_BUFFER_SIZE: usize = 1 << 20;

/// Strip leading and trailing ASCII whitespace.
pub(crate) fn trim_ascii(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    let end = bytes
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(start, |i| i + 1);
    &bytes[start..end]
}

/// One delimited record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedRecord {
    /// 0-based record number within the file
    pub seq_no: u64,
    /// Offset of the first byte
    pub start: u64,
    /// Offset just past the delimiter line
    pub end: u64,
    /// Record bytes, delimiter line included
    pub raw: Vec<u8>,
}

/// Non-blank bytes after the last delimiter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TruncatedTail {
    /// Offset where the fragment starts
    pub start: u64,
    /// Fragment length
    pub len: u64,
}

/// Iterator over the records of a byte stream
pub struct RecordScanner<R> {
    reader: R,
    delimiter: Vec<u8>,
    offset: u64,
    seq_no: u64,
    truncated: Option<TruncatedTail>,
    done: bool,
}

impl<R: BufRead> RecordScanner<R> {
    /// Scanner over `reader`, splitting on `delimiter` lines.
    pub fn new(reader: R, delimiter: &str) -> Self {
        Self {
            reader,
            delimiter: trim_ascii(delimiter.as_bytes()).to_vec(),
            offset: 0,
            seq_no: 0,
            truncated: None,
            done: false,
        }
    }

    /// Trailing fragment seen at end of input, once the scan is exhausted.
    pub fn truncated_tail(&self) -> Option<TruncatedTail> {
        self.truncated
    }

    /// Bytes consumed so far.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    fn next_record(&mut self) -> Result<Option<ScannedRecord>> {
        let start = self.offset;
        let mut raw = Vec::new();
        loop {
            let line_start = raw.len();
            let n = self.reader.read_until(b'\n', &mut raw)?;
            if n == 0 {
                if !trim_ascii(&raw).is_empty() {
                    self.truncated = Some(TruncatedTail {
                        start,
                        len: raw.len() as u64,
                    });
                }
                return Ok(None);
            }
            self.offset += n as u64;
            if trim_ascii(&raw[line_start..]) == self.delimiter.as_slice() {
                let record = ScannedRecord {
                    seq_no: self.seq_no,
                    start,
                    end: self.offset,
                    raw,
                };
                self.seq_no += 1;
                return Ok(Some(record));
            }
        }
    }
}

impl<R: BufRead> Iterator for RecordScanner<R> {
    type Item = Result<ScannedRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// A record after field extraction; the raw bytes are no longer needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedRecord {
    /// 0-based record number within the file
    pub seq_no: u64,
    /// Offset of the first byte
    pub start: u64,
    /// Offset just past the delimiter line
    pub end: u64,
    /// Keys found in the record
    pub fields: ExtractedFields,
}

/// Scan one file, handing each extracted record to `sink` in file order.
///
/// Returns the trailing fragment, if any.
pub fn scan_file<F>(
    path: &Path,
    kind: RecordKind,
    delimiter: &str,
    extractor: &dyn FieldExtractor,
    mut sink: F,
) -> Result<Option<TruncatedTail>>
where
    F: FnMut(ExtractedRecord) -> Result<()>,
{
    let file = File::open(path)?;
    let mut scanner = RecordScanner::new(BufReader::with_capacity(READ_BUFFER_SIZE, file), delimiter);
    for record in scanner.by_ref() {
        let record = record?;
        let fields = extractor.extract(&record.raw, kind);
        sink(ExtractedRecord {
            seq_no: record.seq_no,
            start: record.start,
            end: record.end,
            fields,
        })?;
    }
    Ok(scanner.truncated_tail())
}
