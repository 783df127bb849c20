//! Actionable typed errors for fitsession.
//!
//! Each error variant includes enough context for the operator to understand
//! what went wrong and what to do next. The binary propagates with `anyhow`;
//! the library API exposes these `thiserror` types.

use std::path::PathBuf;

/// Errors that fitsession surfaces to the operator.
///
/// Every variant renders an actionable message *and* maps to a stable JSON
/// `error_type` string via [`GrouperError::error_type`].
#[derive(Debug, thiserror::Error)]
pub enum GrouperError {
    /// Target directory does not exist.
    #[error("Directory {} does not exist.", path.display())]
    DirectoryNotFound { path: PathBuf },

    /// Target path exists but is not a directory.
    #[error("{} is not a directory.", path.display())]
    NotADirectory { path: PathBuf },

    /// Listing the target directory failed.
    #[error("Failed to list {}: {detail}", path.display())]
    ListFailed { path: PathBuf, detail: String },

    /// No files with the recording extension (or none with a parseable name).
    #[error(
        "No groupable .{extension} files found in {} ({skipped} skipped as unparseable).",
        path.display()
    )]
    NoMatchingFiles {
        path: PathBuf,
        extension: String,
        skipped: usize,
    },

    /// Tolerance window bounds are unusable.
    #[error("Invalid tolerance window {min_gap_secs}..={max_gap_secs}: {reason}")]
    InvalidWindow {
        min_gap_secs: i64,
        max_gap_secs: i64,
        reason: String,
    },

    /// A session directory with a group's name already exists.
    ///
    /// Raised before any file is moved, so earlier groupings are never
    /// overwritten or merged into.
    #[error(
        "Destination {} already exists. Refusing to continue to avoid overwriting a previous grouping run; no files were moved.",
        path.display()
    )]
    DestinationExists { group: String, path: PathBuf },

    /// Creating a session directory failed.
    #[error("Failed to create session directory {}: {detail}", path.display())]
    CreateDirFailed { path: PathBuf, detail: String },

    /// Moving a file into its session directory failed.
    ///
    /// Files already moved for the same group stay where they are; the
    /// operator has to finish or undo the move by hand.
    #[error(
        "Failed to move {} to {}: {detail}. {moved_in_group} file(s) of group '{group}' were already moved; manual recovery required.",
        from.display(),
        to.display()
    )]
    MoveFailed {
        group: String,
        from: PathBuf,
        to: PathBuf,
        moved_in_group: usize,
        detail: String,
    },

    /// A post-grouping step program could not be found.
    #[error("Step program '{program}' not found on PATH.")]
    StepNotFound { program: String },

    /// A post-grouping step exited unsuccessfully.
    ///
    /// `relocated` lists the session directories created before the step
    /// ran; they stay in place.
    #[error(
        "Step '{step}' failed on {} ({status}). Pipeline stopped; {} session director(ies) were already created.",
        dir.display(),
        relocated.len()
    )]
    StepFailed {
        step: String,
        dir: PathBuf,
        status: String,
        relocated: Vec<PathBuf>,
    },

    /// Interacting with the terminal failed.
    #[error("Failed to read confirmation: {detail}")]
    PromptFailed { detail: String },
}

impl GrouperError {
    /// Stable snake_case identifier used in JSON output.
    pub fn error_type(&self) -> &'static str {
        match self {
            GrouperError::DirectoryNotFound { .. } => "directory_not_found",
            GrouperError::NotADirectory { .. } => "not_a_directory",
            GrouperError::ListFailed { .. } => "list_failed",
            GrouperError::NoMatchingFiles { .. } => "no_matching_files",
            GrouperError::InvalidWindow { .. } => "invalid_window",
            GrouperError::DestinationExists { .. } => "destination_exists",
            GrouperError::CreateDirFailed { .. } => "create_dir_failed",
            GrouperError::MoveFailed { .. } => "move_failed",
            GrouperError::StepNotFound { .. } => "step_not_found",
            GrouperError::StepFailed { .. } => "step_failed",
            GrouperError::PromptFailed { .. } => "prompt_failed",
        }
    }

    /// Session directories that exist on disk despite the failure.
    pub fn relocated_dirs(&self) -> &[PathBuf] {
        match self {
            GrouperError::StepFailed { relocated, .. } => relocated,
            _ => &[],
        }
    }
}
