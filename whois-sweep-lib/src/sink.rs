//! Append-only result log.
//!
//! One line per resolved domain, pipe-delimited:
//!
//! ```text
//! acme.com|taken|2026-03-15
//! acme.io|avail|
//! acme.ai|error|retries-exceeded
//! ```
//!
//! Lines are never rewritten. A domain with any line in the log counts as
//! processed, which is what makes an interrupted sweep resumable.

use crate::error::SweepError;
use crate::types::{ErrorReason, Verdict};
use std::collections::HashSet;
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Status column of a result record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordStatus {
    Avail,
    Taken,
    Error,
}

impl RecordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::Avail => "avail",
            RecordStatus::Taken => "taken",
            RecordStatus::Error => "error",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "avail" => Some(RecordStatus::Avail),
            "taken" => Some(RecordStatus::Taken),
            "error" => Some(RecordStatus::Error),
            _ => None,
        }
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of the result log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRecord {
    pub domain: String,
    pub status: RecordStatus,
    /// Expiry date for taken, error tag for error, empty for avail
    pub detail: String,
}

impl ResultRecord {
    /// Build the record for a terminal verdict; `None` for transient ones.
    pub fn from_verdict(domain: &str, verdict: &Verdict) -> Option<Self> {
        let (status, detail) = match verdict {
            Verdict::Available => (RecordStatus::Avail, String::new()),
            Verdict::Taken { expiry } => (RecordStatus::Taken, expiry.clone().unwrap_or_default()),
            Verdict::Error { reason } => (RecordStatus::Error, reason.as_str().to_string()),
            Verdict::RateLimited | Verdict::Empty => return None,
        };
        Some(Self {
            domain: domain.to_string(),
            status,
            detail,
        })
    }

    /// Map back to the verdict this record was written for.
    pub fn verdict(&self) -> Verdict {
        match self.status {
            RecordStatus::Avail => Verdict::Available,
            RecordStatus::Taken => Verdict::Taken {
                expiry: (!self.detail.is_empty()).then(|| self.detail.clone()),
            },
            RecordStatus::Error => Verdict::Error {
                reason: ErrorReason::from_tag(&self.detail),
            },
        }
    }

    /// Render as `domain|status|detail` (no trailing newline).
    pub fn to_line(&self) -> String {
        format!("{}|{}|{}", self.domain, self.status, self.detail)
    }

    /// Parse one log line. Malformed lines yield `None`.
    pub fn parse_line(line: &str) -> Option<Self> {
        let line = line.trim_end_matches(['\r', '\n']);
        let mut parts = line.splitn(3, '|');
        let domain = parts.next()?.trim();
        let status = RecordStatus::parse(parts.next()?.trim())?;
        let detail = parts.next().unwrap_or("").trim();

        if domain.is_empty() {
            return None;
        }

        Some(Self {
            domain: domain.to_string(),
            status,
            detail: detail.to_string(),
        })
    }
}

/// Append-only log of result records.
///
/// Appends go through a mutex so one log can be shared between tasks.
pub struct ResultLog {
    path: PathBuf,
    file: Mutex<File>,
}

impl ResultLog {
    /// Open (creating if needed) the log at `path` in append mode.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SweepError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| {
                SweepError::file_error(
                    path.to_string_lossy(),
                    format!("Failed to open result log: {}", e),
                )
            })?;

        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record and flush it.
    pub fn append(&self, record: &ResultRecord) -> Result<(), SweepError> {
        let mut file = self
            .file
            .lock()
            .map_err(|_| SweepError::internal("Result log lock poisoned"))?;

        writeln!(file, "{}", record.to_line())
            .and_then(|_| file.flush())
            .map_err(|e| {
                SweepError::file_error(
                    self.path.to_string_lossy(),
                    format!("Failed to append record: {}", e),
                )
            })
    }

    /// All records currently in the log, skipping malformed lines.
    pub fn records(&self) -> Result<Vec<ResultRecord>, SweepError> {
        read_records(&self.path)
    }

    /// Domains that already have a record.
    pub fn processed_domains(&self) -> Result<HashSet<String>, SweepError> {
        processed_domains(&self.path)
    }
}

/// Read every well-formed record from the log at `path`.
///
/// A missing file is an empty log.
pub fn read_records<P: AsRef<Path>>(path: P) -> Result<Vec<ResultRecord>, SweepError> {
    Ok(read_log(path.as_ref())?
        .lines()
        .filter_map(ResultRecord::parse_line)
        .collect())
}

/// Set of domains with a line in the log at `path`.
///
/// Any line starting `domain|` counts, whatever its status field holds.
pub fn processed_domains<P: AsRef<Path>>(path: P) -> Result<HashSet<String>, SweepError> {
    Ok(read_log(path.as_ref())?
        .lines()
        .filter_map(|line| line.split_once('|'))
        .map(|(domain, _)| domain.trim())
        .filter(|domain| !domain.is_empty())
        .map(str::to_string)
        .collect())
}

fn read_log(path: &Path) -> Result<String, SweepError> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(SweepError::file_error(
            path.to_string_lossy(),
            format!("Failed to read result log: {}", e),
        )),
    }
}
