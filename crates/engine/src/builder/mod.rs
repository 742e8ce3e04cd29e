//! Index builder
//!
//! One full rebuild in a single streaming pass over the source tree:
//!
//! 1. list candidate files (sorted by relative path) and classify them;
//!    indexable files get dense ids `1..` in that order
//! 2. scan each file for delimited records and extract their keys
//! 3. feed every record, in file order, to the single [`IndexWriter`]
//!
//! With `parallel_scan` enabled, step 2 runs on the rayon pool for a window
//! of files at a time while step 3 stays sequential, so the resulting index is
//! byte-for-byte the one a sequential build produces.

pub mod posting;
pub mod scanner;
pub mod writer;

pub use posting::{PostingTotals, PostingWriter};
pub use scanner::{scan_file, ExtractedRecord, RecordScanner, ScannedRecord, TruncatedTail};
pub use writer::IndexWriter;

use crate::collab::{
    walk_source_files, FieldExtractor, FileClassifier, NamePatternClassifier, SdfFieldExtractor,
};
use crate::config::BuildConfig;
use rayon::prelude::*;
use sdfdex_core::{validate_key, FileId, IndexError, Result, SourceFile};
use sdfdex_storage::{IndexEnv, RecordCounts};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Outcome of a build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildReport {
    /// Root directory that was indexed
    pub root_dir: String,
    /// Record and file counters
    #[serde(flatten)]
    pub counts: RecordCounts,
    /// Whether files were scanned in parallel
    pub parallel_scan: bool,
    /// Wall-clock duration in milliseconds
    pub elapsed_ms: u64,
}

/// A file that will be indexed
#[derive(Debug, Clone)]
struct PlannedFile {
    path: PathBuf,
    source: SourceFile,
}

/// Records of one file scanned ahead of the writer
struct ScannedFile {
    records: Vec<ExtractedRecord>,
    truncated: Option<TruncatedTail>,
}

/// Builds an index from a directory of record files
pub struct IndexBuilder {
    root: PathBuf,
    config: BuildConfig,
    classifier: Box<dyn FileClassifier>,
    extractor: Box<dyn FieldExtractor>,
}

impl std::fmt::Debug for IndexBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexBuilder")
            .field("root", &self.root)
            .field("config", &self.config)
            .finish()
    }
}

impl IndexBuilder {
    /// Builder with the default classifier and extractor for `config`
    pub fn new<P: AsRef<Path>>(root: P, config: BuildConfig) -> Result<Self> {
        if config.delimiter.trim().is_empty() {
            return Err(IndexError::invalid_input("delimiter must not be empty"));
        }
        let classifier = NamePatternClassifier::from_config(&config)?;
        let extractor = SdfFieldExtractor::from_config(&config);
        Ok(Self {
            root: root.as_ref().to_path_buf(),
            config,
            classifier: Box::new(classifier),
            extractor: Box::new(extractor),
        })
    }

    /// Replace the file classifier
    pub fn with_classifier<C: FileClassifier + 'static>(mut self, classifier: C) -> Self {
        self.classifier = Box::new(classifier);
        self
    }

    /// Replace the field extractor
    pub fn with_extractor<E: FieldExtractor + 'static>(mut self, extractor: E) -> Self {
        self.extractor = Box::new(extractor);
        self
    }

    /// Build settings in use
    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Rebuild the index held by `env` from scratch.
    ///
    /// # Errors
    ///
    /// `ReadOnly` when `env` is not writable; I/O and storage errors abort the
    /// build and leave the index marked incomplete.
    pub fn build(&self, env: &IndexEnv) -> Result<BuildReport> {
        let started = Instant::now();
        let root = self.root.canonicalize()?;
        let root_dir = root.to_string_lossy().into_owned();
        info!(
            target: "sdfdex::build",
            root = %root_dir,
            index = ?env.path(),
            parallel = self.config.parallel_scan,
            "Build started"
        );

        let listing = walk_source_files(&root, &self.config.extensions)?;
        let mut writer = IndexWriter::begin(env, &root_dir, &self.config)?;
        for _ in 0..listing.unreadable_paths {
            writer.skip_file();
        }

        let mut plan = Vec::with_capacity(listing.files.len());
        for candidate in listing.files {
            let kind = match self
                .classifier
                .classify(Path::new(&candidate.relative_path))
                .record_kind()
            {
                Some(kind) => kind,
                None => {
                    debug!(target: "sdfdex::build", file = %candidate.relative_path, "Skipping unclassified file");
                    writer.skip_file();
                    continue;
                }
            };
            if validate_key(candidate.relative_path.as_bytes()).is_err() {
                warn!(target: "sdfdex::build", file = %candidate.relative_path, "Skipping file: path too long for a key");
                writer.skip_file();
                continue;
            }
            let file_id = FileId::try_from(plan.len() + 1)
                .map_err(|_| IndexError::invalid_input("too many source files"))?;
            plan.push(PlannedFile {
                path: candidate.path,
                source: SourceFile {
                    file_id,
                    relative_path: candidate.relative_path,
                    kind,
                },
            });
        }

        if self.config.parallel_scan {
            self.write_parallel(&mut writer, &plan)?;
        } else {
            self.write_sequential(&mut writer, &plan)?;
        }

        let counts = writer.finish()?;
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        info!(
            target: "sdfdex::build",
            files = counts.files,
            skipped_files = counts.skipped_files,
            compounds = counts.compound_records,
            conformers = counts.conformer_records,
            duplicates = counts.duplicate_cids + counts.duplicate_conformer_ids,
            truncated = counts.truncated_records,
            elapsed_ms,
            "Build finished"
        );
        Ok(BuildReport {
            root_dir,
            counts,
            parallel_scan: self.config.parallel_scan,
            elapsed_ms,
        })
    }

    fn write_sequential(&self, writer: &mut IndexWriter<'_>, plan: &[PlannedFile]) -> Result<()> {
        for file in plan {
            debug!(target: "sdfdex::build", file = %file.source.relative_path, file_id = file.source.file_id, "Indexing file");
            writer.add_file(&file.source)?;
            let truncated = scan_file(
                &file.path,
                file.source.kind,
                &self.config.delimiter,
                self.extractor.as_ref(),
                |record| writer.add_record(&file.source, &record),
            )?;
            finish_file(writer, &file.source, truncated)?;
        }
        Ok(())
    }

    fn write_parallel(&self, writer: &mut IndexWriter<'_>, plan: &[PlannedFile]) -> Result<()> {
        let extractor = self.extractor.as_ref();
        let delimiter = self.config.delimiter.as_str();
        for window in plan.chunks(self.config.scan_window.max(1)) {
            let scanned: Vec<Result<ScannedFile>> = window
                .par_iter()
                .map(|file| {
                    let mut records = Vec::new();
                    let truncated = scan_file(&file.path, file.source.kind, delimiter, extractor, |record| {
                        records.push(record);
                        Ok(())
                    })?;
                    Ok(ScannedFile { records, truncated })
                })
                .collect();

            for (file, scanned) in window.iter().zip(scanned) {
                let scanned = scanned?;
                debug!(
                    target: "sdfdex::build",
                    file = %file.source.relative_path,
                    file_id = file.source.file_id,
                    records = scanned.records.len(),
                    "Writing scanned file"
                );
                writer.add_file(&file.source)?;
                for record in &scanned.records {
                    writer.add_record(&file.source, record)?;
                }
                finish_file(writer, &file.source, scanned.truncated)?;
            }
        }
        Ok(())
    }
}

fn finish_file(writer: &mut IndexWriter<'_>, file: &SourceFile, truncated: Option<TruncatedTail>) -> Result<()> {
    if let Some(tail) = truncated {
        warn!(
            target: "sdfdex::build",
            file = %file.relative_path,
            offset = tail.start,
            bytes = tail.len,
            "Dropping truncated record at end of file"
        );
        writer.truncated_record();
    }
    writer.end_file()
}
