//! SDF property extraction
//!
//! An SDF record starts with a title line, followed by the molfile block and
//! any number of property blocks:
//!
//! ```text
//! > <PUBCHEM_COMPOUND_CID>
//! 2244
//!
//! ```
//!
//! A block's value is its first non-empty line; the block ends at a blank
//! line. Only the configured key fields are looked at, and the first match of
//! each key wins.

use super::{ExtractedFields, FieldExtractor};
use crate::builder::scanner::trim_ascii;
use crate::config::BuildConfig;
use sdfdex_core::{Cid, RecordKind, MAX_CID};

/// Field extractor for SDF property blocks.
#[derive(Debug, Clone)]
pub struct SdfFieldExtractor {
    cid_fields: Vec<String>,
    conformer_id_fields: Vec<String>,
    parent_cid_fields: Vec<String>,
}

fn normalize(name: &str) -> String {
    name.trim().to_ascii_uppercase()
}

fn normalize_all(names: &[String]) -> Vec<String> {
    names.iter().map(|n| normalize(n)).collect()
}

/// Digits-only values within the CID range.
fn parse_cid(value: &[u8]) -> Option<Cid> {
    if value.is_empty() || !value.iter().all(u8::is_ascii_digit) {
        return None;
    }
    std::str::from_utf8(value)
        .ok()?
        .parse::<Cid>()
        .ok()
        .filter(|cid| *cid <= MAX_CID)
}

/// Property name of a `> <NAME>` header line.
fn property_name(line: &[u8]) -> Option<&[u8]> {
    let rest = line.strip_prefix(b">")?;
    let open = rest.iter().position(|&b| b == b'<')?;
    let rest = &rest[open + 1..];
    let close = rest.iter().position(|&b| b == b'>')?;
    if close == 0 {
        return None;
    }
    Some(&rest[..close])
}

impl SdfFieldExtractor {
    /// Extractor looking for the given property names.
    pub fn new(cid_fields: &[String], conformer_id_fields: &[String], parent_cid_fields: &[String]) -> Self {
        Self {
            cid_fields: normalize_all(cid_fields),
            conformer_id_fields: normalize_all(conformer_id_fields),
            parent_cid_fields: normalize_all(parent_cid_fields),
        }
    }

    /// Extractor using the field names of a build config.
    pub fn from_config(config: &BuildConfig) -> Self {
        Self::new(
            &config.cid_fields,
            &config.conformer_id_fields,
            &config.parent_cid_fields,
        )
    }

    fn accept(&self, fields: &mut ExtractedFields, name: &str, value: &[u8]) {
        if fields.cid.is_none() && self.cid_fields.iter().any(|f| f == name) {
            fields.cid = parse_cid(value);
        }
        if fields.parent_cid.is_none() && self.parent_cid_fields.iter().any(|f| f == name) {
            fields.parent_cid = parse_cid(value);
        }
        if fields.conformer_id.is_none() && self.conformer_id_fields.iter().any(|f| f == name) {
            fields.conformer_id = Some(String::from_utf8_lossy(value).into_owned());
        }
    }
}

impl Default for SdfFieldExtractor {
    fn default() -> Self {
        Self::from_config(&BuildConfig::default())
    }
}

impl FieldExtractor for SdfFieldExtractor {
    fn extract(&self, raw: &[u8], kind: RecordKind) -> ExtractedFields {
        let mut fields = ExtractedFields::default();
        let mut lines = raw.split(|&b| b == b'\n');

        if kind == RecordKind::Compound {
            if let Some(title) = lines.next() {
                fields.cid = parse_cid(trim_ascii(title));
            }
        }

        // (normalized name, first non-empty value) of the open block
        let mut current: Option<(String, Option<&[u8]>)> = None;
        for line in lines {
            let trimmed = trim_ascii(line);
            if let Some(name) = property_name(trimmed) {
                if let Some((name, Some(value))) = current.take() {
                    self.accept(&mut fields, &name, value);
                }
                current = Some((normalize(&String::from_utf8_lossy(name)), None));
                continue;
            }
            let Some((name, value)) = current.as_mut() else {
                continue;
            };
            if trimmed.is_empty() {
                if let Some(value) = *value {
                    self.accept(&mut fields, name, value);
                }
                current = None;
            } else if value.is_none() {
                *value = Some(trimmed);
            }
        }
        if let Some((name, Some(value))) = current {
            self.accept(&mut fields, &name, value);
        }
        fields
    }
}
