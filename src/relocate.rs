//! Applying a [`GroupPlan`]: one new directory per group, files moved in.
//!
//! Every destination is checked before the first mutation, so a collision
//! with an earlier run leaves the target directory untouched. A failure in
//! the middle of a group is not rolled back; the error says how far it got.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::error::GrouperError;
use crate::model::GroupPlan;

/// The filesystem operations the relocator needs.
pub trait SessionFs {
    /// Whether anything (file, directory, link) exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Create a single directory; must fail if `path` already exists.
    fn create_dir(&mut self, path: &Path) -> std::io::Result<()>;

    /// Move a file within the same filesystem.
    fn rename(&mut self, from: &Path, to: &Path) -> std::io::Result<()>;
}

/// [`SessionFs`] backed by `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl SessionFs for RealFs {
    fn exists(&self, path: &Path) -> bool {
        path.symlink_metadata().is_ok()
    }

    fn create_dir(&mut self, path: &Path) -> std::io::Result<()> {
        std::fs::create_dir(path)
    }

    fn rename(&mut self, from: &Path, to: &Path) -> std::io::Result<()> {
        std::fs::rename(from, to)
    }
}

/// One session directory produced by [`apply_plan`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelocatedGroup {
    pub name: String,
    pub path: PathBuf,
    pub files: usize,
}

/// Outcome of a completed relocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RelocationReport {
    pub directories: Vec<RelocatedGroup>,
    pub moved_files: usize,
}

impl RelocationReport {
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.directories.iter().map(|d| d.path.as_path())
    }
}

/// Fail if any group's destination already exists or two groups share one.
pub fn check_destinations<F: SessionFs>(fs: &F, plan: &GroupPlan) -> Result<(), GrouperError> {
    let mut seen: HashSet<&str> = HashSet::new();
    for group in &plan.groups {
        let dest = plan.target_dir.join(group.name());
        if !seen.insert(group.name()) || fs.exists(&dest) {
            return Err(GrouperError::DestinationExists {
                group: group.name().to_string(),
                path: dest,
            });
        }
    }
    Ok(())
}

/// Create every group directory and move its files into it, in plan order.
pub fn apply_plan<F: SessionFs>(
    fs: &mut F,
    plan: &GroupPlan,
) -> Result<RelocationReport, GrouperError> {
    check_destinations(&*fs, plan)?;

    let mut report = RelocationReport::default();
    for group in &plan.groups {
        let dest = plan.target_dir.join(group.name());
        if fs.exists(&dest) {
            return Err(GrouperError::DestinationExists {
                group: group.name().to_string(),
                path: dest,
            });
        }

        fs.create_dir(&dest).map_err(|e| {
            if e.kind() == std::io::ErrorKind::AlreadyExists {
                GrouperError::DestinationExists {
                    group: group.name().to_string(),
                    path: dest.clone(),
                }
            } else {
                GrouperError::CreateDirFailed {
                    path: dest.clone(),
                    detail: e.to_string(),
                }
            }
        })?;
        debug!(dir = %dest.display(), "session directory created");

        for (moved, file) in group.files().iter().enumerate() {
            let from = plan.target_dir.join(&file.filename);
            let to = dest.join(&file.filename);
            fs.rename(&from, &to)
                .map_err(|e| GrouperError::MoveFailed {
                    group: group.name().to_string(),
                    from: from.clone(),
                    to: to.clone(),
                    moved_in_group: moved,
                    detail: e.to_string(),
                })?;
        }

        info!(group = group.name(), files = group.len(), "group relocated");
        report.moved_files += group.len();
        report.directories.push(RelocatedGroup {
            name: group.name().to_string(),
            path: dest,
            files: group.len(),
        });
    }

    Ok(report)
}
