//! File classification by file name patterns

use super::FileClassifier;
use crate::config::BuildConfig;
use regex::{Regex, RegexBuilder};
use sdfdex_core::{FileKind, IndexError, Result};
use std::path::Path;

/// Classifies files by case-insensitive regexes on their file name.
///
/// Conformer patterns are checked first: conformer files are commonly named
/// after the compound range they cover (`Conformer3D_COMPOUND_CID_...`).
#[derive(Debug, Clone)]
pub struct NamePatternClassifier {
    compound: Vec<Regex>,
    conformer: Vec<Regex>,
}

impl NamePatternClassifier {
    /// Compile the patterns.
    pub fn new<S: AsRef<str>>(compound_patterns: &[S], conformer_patterns: &[S]) -> Result<Self> {
        Ok(Self {
            compound: compile(compound_patterns)?,
            conformer: compile(conformer_patterns)?,
        })
    }

    /// Classifier using the patterns of a build config.
    pub fn from_config(config: &BuildConfig) -> Result<Self> {
        Self::new(&config.compound_patterns, &config.conformer_patterns)
    }
}

fn compile<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| {
            RegexBuilder::new(p.as_ref())
                .case_insensitive(true)
                .build()
                .map_err(|e| {
                    IndexError::invalid_input(format!("invalid pattern '{}': {}", p.as_ref(), e))
                })
        })
        .collect()
}

impl FileClassifier for NamePatternClassifier {
    fn classify(&self, relative_path: &Path) -> FileKind {
        let name = match relative_path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name,
            None => return FileKind::Unknown,
        };
        if self.conformer.iter().any(|re| re.is_match(name)) {
            FileKind::Conformer
        } else if self.compound.iter().any(|re| re.is_match(name)) {
            FileKind::Compound
        } else {
            FileKind::Unknown
        }
    }
}
