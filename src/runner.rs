//! Runner that stamps a set of files.

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::StampError;
use crate::stamp::{self, DocEdit, StampOptions};
use crate::syntax::{self, GoParser, SyntaxParser};

/// What happened to one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Modified,
    Unchanged,
    Error,
}

impl std::fmt::Display for FileStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileStatus::Modified => write!(f, "modified"),
            FileStatus::Unchanged => write!(f, "unchanged"),
            FileStatus::Error => write!(f, "error"),
        }
    }
}

/// Result for a single file.
#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    pub path: String,
    pub status: FileStatus,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub edits: Vec<DocEdit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Rewritten source, present only for modified files.
    #[serde(skip)]
    pub output: Option<String>,
}

/// Results of a run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub files: Vec<FileOutcome>,
}

impl RunSummary {
    pub fn scanned(&self) -> usize {
        self.files.len()
    }

    pub fn modified_count(&self) -> usize {
        self.count(FileStatus::Modified)
    }

    pub fn error_count(&self) -> usize {
        self.count(FileStatus::Error)
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    fn count(&self, status: FileStatus) -> usize {
        self.files.iter().filter(|f| f.status == status).count()
    }
}

/// Stamps doc comments into files.
pub struct Runner {
    options: StampOptions,
    write: bool,
    parser: GoParser,
}

impl Runner {
    /// Create a new runner.
    pub fn new(options: StampOptions) -> Self {
        Self {
            options,
            write: false,
            parser: GoParser::new(),
        }
    }

    /// Set whether modified files are written back in place.
    pub fn write(mut self, write: bool) -> Self {
        self.write = write;
        self
    }

    /// Stamp every file. Files are processed in parallel; outcomes are sorted by path.
    pub fn run(&self, files: &[PathBuf]) -> RunSummary {
        let mut outcomes: Vec<FileOutcome> = files
            .par_iter()
            .map(|path| match self.run_file(path) {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping file");
                    FileOutcome {
                        path: path.to_string_lossy().to_string(),
                        status: FileStatus::Error,
                        edits: Vec::new(),
                        error: Some(e.to_string()),
                        output: None,
                    }
                }
            })
            .collect();

        // Sort by path for deterministic ordering
        outcomes.sort_by(|a, b| a.path.cmp(&b.path));

        RunSummary { files: outcomes }
    }

    /// Stamp one file.
    pub fn run_file(&self, path: &Path) -> Result<FileOutcome, StampError> {
        let source = fs::read_to_string(path).map_err(|source| StampError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let (output, edits) = match self.stamp_source(path, &source)? {
            Some((output, edits)) => (Some(output), edits),
            None => (None, Vec::new()),
        };

        let status = if output.is_some() {
            FileStatus::Modified
        } else {
            FileStatus::Unchanged
        };

        if let (true, Some(text)) = (self.write, &output) {
            fs::write(path, text).map_err(|source| StampError::Write {
                path: path.to_path_buf(),
                source,
            })?;
            info!(path = %path.display(), docs = edits.len(), "rewrote file");
        } else {
            debug!(
                path = %path.display(),
                language = self.parser.language_id(),
                %status,
                "checked file"
            );
        }

        Ok(FileOutcome {
            path: path.to_string_lossy().to_string(),
            status,
            edits,
            error: None,
            output,
        })
    }

    /// Stamp source text. Returns the rewritten text and the doc edits, or
    /// `None` when no comment changed.
    pub fn stamp_source(
        &self,
        path: &Path,
        source: &str,
    ) -> Result<Option<(String, Vec<DocEdit>)>, StampError> {
        let mut tree = self.parser.parse(path, source)?;
        let outcome = stamp::stamp(&mut tree, &self.options)?;
        if !outcome.modified {
            return Ok(None);
        }
        Ok(Some((syntax::render(&tree), outcome.edits)))
    }
}
