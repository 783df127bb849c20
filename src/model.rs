//! Core types shared by every phase of a grouping run.
//!
//! Everything here is derived fresh from the target directory on each run:
//! files are parsed into [`TimestampedFile`]s, partitioned into [`Group`]s,
//! collected into a [`GroupPlan`], and the plan is consumed by the relocator.

use std::path::PathBuf;

use serde::Serialize;

use crate::error::GrouperError;

// ---------------------------------------------------------------------------
// Files and groups
// ---------------------------------------------------------------------------

/// A recording whose name encodes its creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimestampedFile {
    /// File name inside the target directory (e.g. `2025-06-17-14-50-00.fit`).
    pub filename: String,
    /// The name with the extension stripped (`YYYY-MM-DD-HH-MM-SS`).
    pub timestamp_raw: String,
    /// Seconds since the Unix epoch under the active [`ZonePolicy`].
    pub epoch_seconds: i64,
}

/// A contiguous session of recordings, ordered by ascending time.
///
/// Never empty: the only constructor takes the first member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Group {
    name: String,
    files: Vec<TimestampedFile>,
}

impl Group {
    /// Open a group with its earliest file; the group is named after it.
    pub fn start(first: TimestampedFile) -> Self {
        Self {
            name: first.timestamp_raw.clone(),
            files: vec![first],
        }
    }

    pub(crate) fn push(&mut self, file: TimestampedFile) {
        self.files.push(file);
    }

    /// Destination directory name: the raw timestamp of the first member.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn files(&self) -> &[TimestampedFile] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the group has no members; false for every constructed group.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn filenames(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(|f| f.filename.as_str())
    }
}

/// A matching file whose name could not be parsed as a timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFile {
    pub filename: String,
    pub reason: String,
}

/// Output of the pure grouping phase; input of the relocation phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupPlan {
    /// Directory the files live in and the session directories are created in.
    pub target_dir: PathBuf,
    /// Number of files with the recording extension, parseable or not.
    pub total_files: usize,
    pub groups: Vec<Group>,
    pub skipped: Vec<SkippedFile>,
}

impl GroupPlan {
    /// Number of files that ended up in a group.
    pub fn grouped_files(&self) -> usize {
        self.groups.iter().map(Group::len).sum()
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Default lower bound: recordings every 5 minutes.
pub const DEFAULT_MIN_GAP_SECS: i64 = 300;
/// Default upper bound: 5 minutes plus 2 seconds of clock drift.
pub const DEFAULT_MAX_GAP_SECS: i64 = 302;
/// Extension of the device's binary recordings.
pub const DEFAULT_EXTENSION: &str = "fit";

/// Inclusive range of elapsed seconds between consecutive recordings of one
/// session.
///
/// A gap below the lower bound breaks a session just like a gap above the
/// upper bound does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ToleranceWindow {
    min_gap_secs: i64,
    max_gap_secs: i64,
}

impl ToleranceWindow {
    pub fn new(min_gap_secs: i64, max_gap_secs: i64) -> Result<Self, GrouperError> {
        let invalid = |reason: &str| GrouperError::InvalidWindow {
            min_gap_secs,
            max_gap_secs,
            reason: reason.to_string(),
        };
        if min_gap_secs < 0 {
            return Err(invalid("bounds must not be negative"));
        }
        if min_gap_secs > max_gap_secs {
            return Err(invalid("lower bound is greater than upper bound"));
        }
        Ok(Self {
            min_gap_secs,
            max_gap_secs,
        })
    }

    pub fn min_gap_secs(&self) -> i64 {
        self.min_gap_secs
    }

    pub fn max_gap_secs(&self) -> i64 {
        self.max_gap_secs
    }

    pub fn contains(&self, diff: i64) -> bool {
        (self.min_gap_secs..=self.max_gap_secs).contains(&diff)
    }
}

impl Default for ToleranceWindow {
    fn default() -> Self {
        Self {
            min_gap_secs: DEFAULT_MIN_GAP_SECS,
            max_gap_secs: DEFAULT_MAX_GAP_SECS,
        }
    }
}

/// How embedded wall-clock timestamps map to absolute time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ZonePolicy {
    /// The machine's local time zone (what the recording device wrote).
    #[default]
    Local,
    /// Treat timestamps as UTC.
    Utc,
}

/// Everything the grouping phase needs besides the file list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupingConfig {
    /// Recording extension without the leading dot, matched case-insensitively.
    pub extension: String,
    pub window: ToleranceWindow,
    pub zone: ZonePolicy,
}

impl GroupingConfig {
    pub fn new(extension: &str, window: ToleranceWindow, zone: ZonePolicy) -> Self {
        Self {
            extension: extension.trim_start_matches('.').to_string(),
            window,
            zone,
        }
    }
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self::new(
            DEFAULT_EXTENSION,
            ToleranceWindow::default(),
            ZonePolicy::default(),
        )
    }
}
