//! Index configuration via `sdfdex.toml`
//!
//! Every field has a default, so an empty file (or no file at all) yields a
//! working configuration. The CLI writes a commented default file next to the
//! index on first build; edit it and rebuild to change behavior.

use regex::Regex;
use sdfdex_core::{IndexError, Result, DEFAULT_BATCH_CHUNK_SIZE, DEFAULT_DELIMITER};
use sdfdex_storage::StorageOptions;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Config file name placed in the index directory.
pub const CONFIG_FILE_NAME: &str = "sdfdex.toml";

/// Which record wins when a unique key is seen more than once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// The first record in build order keeps the key.
    #[default]
    KeepFirst,
    /// Each later record overwrites the key.
    KeepLast,
}

/// Build-time settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// File extensions considered during traversal (without the dot).
    pub extensions: Vec<String>,
    /// Record delimiter line.
    pub delimiter: String,
    /// Records per write transaction.
    pub commit_every: usize,
    /// Behavior on duplicate CIDs and conformer ids.
    pub duplicate_policy: DuplicatePolicy,
    /// Scan files on the rayon pool ahead of the writer.
    pub parallel_scan: bool,
    /// Files scanned per parallel window.
    pub scan_window: usize,
    /// Posting entries buffered in memory before open pages are spilled.
    pub posting_buffer_limit: usize,
    /// File name patterns of compound files (case-insensitive regexes).
    pub compound_patterns: Vec<String>,
    /// File name patterns of conformer files; checked before compound ones.
    pub conformer_patterns: Vec<String>,
    /// Property names holding a compound CID.
    pub cid_fields: Vec<String>,
    /// Property names holding a conformer id.
    pub conformer_id_fields: Vec<String>,
    /// Property names holding a conformer's parent CID.
    pub parent_cid_fields: Vec<String>,
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            extensions: strings(&["sdf"]),
            delimiter: DEFAULT_DELIMITER.to_string(),
            commit_every: 100_000,
            duplicate_policy: DuplicatePolicy::KeepFirst,
            parallel_scan: false,
            scan_window: 8,
            posting_buffer_limit: 4_000_000,
            compound_patterns: strings(&["compound", "cmpd"]),
            conformer_patterns: strings(&["conformer", "conf"]),
            cid_fields: strings(&["CID", "PUBCHEM_COMPOUND_CID", "PUBCHEM_CID", "COMPOUND_CID"]),
            conformer_id_fields: strings(&[
                "CONFORMER_ID",
                "CONFID",
                "PUBCHEM_CONFORMER_ID",
                "CONFORMERID",
            ]),
            parent_cid_fields: strings(&[
                "CID",
                "PUBCHEM_COMPOUND_CID",
                "PUBCHEM_CID",
                "COMPOUND_CID",
                "PARENT_CID",
            ]),
        }
    }
}

/// Query-time settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Keys resolved per read transaction in batch lookups.
    pub batch_chunk_size: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            batch_chunk_size: DEFAULT_BATCH_CHUNK_SIZE,
        }
    }
}

/// Index configuration loaded from `sdfdex.toml`.
///
/// # Example
///
/// ```toml
/// [storage]
/// map_size = 1099511627776
///
/// [build]
/// duplicate_policy = "keep-last"
/// parallel_scan = true
///
/// [query]
/// batch_chunk_size = 50000
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexConfig {
    /// LMDB environment options.
    #[serde(default)]
    pub storage: StorageOptions,
    /// Build settings.
    #[serde(default)]
    pub build: BuildConfig,
    /// Query settings.
    #[serde(default)]
    pub query: QueryConfig,
}

impl IndexConfig {
    /// Check values that serde cannot.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for zero batch sizes, an empty delimiter or
    /// name patterns that are not valid regexes.
    pub fn validate(&self) -> Result<()> {
        let build = &self.build;
        if build.delimiter.trim().is_empty() {
            return Err(IndexError::invalid_input("delimiter must not be empty"));
        }
        if !build.delimiter.is_ascii() {
            return Err(IndexError::invalid_input("delimiter must be ASCII"));
        }
        if build.commit_every == 0 {
            return Err(IndexError::invalid_input("commit_every must be positive"));
        }
        if build.scan_window == 0 {
            return Err(IndexError::invalid_input("scan_window must be positive"));
        }
        if self.query.batch_chunk_size == 0 {
            return Err(IndexError::invalid_input("batch_chunk_size must be positive"));
        }
        for pattern in build
            .compound_patterns
            .iter()
            .chain(build.conformer_patterns.iter())
        {
            Regex::new(pattern).map_err(|e| {
                IndexError::invalid_input(format!("invalid file name pattern '{}': {}", pattern, e))
            })?;
        }
        Ok(())
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# sdfdex index configuration
#
# Every setting is optional; the values below are the defaults.

[storage]
# LMDB map size in bytes (an upper bound, not an allocation)
map_size = 1099511627776
max_readers = 126

[build]
extensions = ["sdf"]
delimiter = "$$$$"
# Records per write transaction
commit_every = 100000
# "keep-first" or "keep-last"; duplicates are counted either way
duplicate_policy = "keep-first"
# Scan files on all cores; writes stay sequential and deterministic
parallel_scan = false
scan_window = 8
# Posting entries held in memory before open pages are spilled
posting_buffer_limit = 4000000
compound_patterns = ["compound", "cmpd"]
conformer_patterns = ["conformer", "conf"]
cid_fields = ["CID", "PUBCHEM_COMPOUND_CID", "PUBCHEM_CID", "COMPOUND_CID"]
conformer_id_fields = ["CONFORMER_ID", "CONFID", "PUBCHEM_CONFORMER_ID", "CONFORMERID"]
parent_cid_fields = ["CID", "PUBCHEM_COMPOUND_CID", "PUBCHEM_CID", "COMPOUND_CID", "PARENT_CID"]

[query]
# Keys resolved per read transaction in batch lookups
batch_chunk_size = 50000
"#
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            IndexError::invalid_input(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: IndexConfig = toml::from_str(&content).map_err(|e| {
            IndexError::invalid_input(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load `sdfdex.toml` from a directory, or the defaults when it has none.
    pub fn load_or_default(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE_NAME);
        if path.is_file() {
            Self::from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Write the default config file if it does not already exist.
    ///
    /// Returns `Ok(())` whether the file was created or already existed.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                IndexError::storage(format!(
                    "Failed to write default config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| IndexError::invalid_input(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| {
            IndexError::storage(format!(
                "Failed to write config file '{}': {}",
                path.display(),
                e
            ))
        })
    }
}
