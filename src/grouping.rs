//! Session grouping.
//!
//! Partitions a chronologically sorted list of recordings into sessions. Two
//! consecutive recordings belong to the same session only when the elapsed
//! time between them falls inside the [`ToleranceWindow`](crate::model::ToleranceWindow).
//! A recording that arrives too early breaks the session exactly like one
//! that arrives too late.
//!
//! This phase is pure: it never touches the filesystem beyond the initial
//! listing done by [`plan_directory`].

use std::path::Path;

use tracing::{debug, info, warn};

use crate::discovery::list_recordings;
use crate::error::GrouperError;
use crate::model::{Group, GroupPlan, GroupingConfig, SkippedFile};
use crate::timestamp::parse_filename;

/// Group `sorted_filenames` (already in lexicographic order).
///
/// Every parseable file lands in exactly one group, in input order.
/// Unparseable files are reported in [`GroupPlan::skipped`] and logged.
pub fn group_filenames(
    target_dir: &Path,
    sorted_filenames: &[String],
    config: &GroupingConfig,
) -> GroupPlan {
    let mut groups: Vec<Group> = Vec::new();
    let mut skipped: Vec<SkippedFile> = Vec::new();
    let mut current: Option<Group> = None;
    let mut last_seconds = 0_i64;

    for filename in sorted_filenames {
        let file = match parse_filename(filename, &config.extension, config.zone) {
            Ok(file) => file,
            Err(e) => {
                warn!(file = %filename, reason = %e, "skipping file with unparseable timestamp");
                skipped.push(SkippedFile {
                    filename: filename.clone(),
                    reason: e.to_string(),
                });
                continue;
            }
        };

        let seconds = file.epoch_seconds;
        current = match current.take() {
            None => Some(Group::start(file)),
            Some(mut group) => {
                let diff = seconds - last_seconds;
                if config.window.contains(diff) {
                    group.push(file);
                    Some(group)
                } else {
                    debug!(
                        group = group.name(),
                        members = group.len(),
                        diff,
                        "closing group"
                    );
                    groups.push(group);
                    Some(Group::start(file))
                }
            }
        };
        last_seconds = seconds;
    }

    if let Some(group) = current {
        groups.push(group);
    }

    GroupPlan {
        target_dir: target_dir.to_path_buf(),
        total_files: sorted_filenames.len(),
        groups,
        skipped,
    }
}

/// List `dir` and group its recordings.
///
/// Fails with [`GrouperError::NoMatchingFiles`] when nothing is groupable.
pub fn plan_directory(dir: &Path, config: &GroupingConfig) -> Result<GroupPlan, GrouperError> {
    let names = list_recordings(dir, &config.extension)?;
    let plan = group_filenames(dir, &names, config);

    if plan.groups.is_empty() {
        return Err(GrouperError::NoMatchingFiles {
            path: dir.to_path_buf(),
            extension: config.extension.clone(),
            skipped: plan.skipped.len(),
        });
    }

    info!(
        files = plan.total_files,
        groups = plan.groups.len(),
        skipped = plan.skipped.len(),
        "grouping computed"
    );
    Ok(plan)
}
