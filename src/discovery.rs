//! Target directory validation and recording discovery.
//!
//! Only regular files directly inside the target directory are considered;
//! subdirectories (including session directories from earlier runs) are
//! never descended into.

use std::path::Path;

use tracing::{debug, trace, warn};
use walkdir::WalkDir;

use crate::error::GrouperError;
use crate::timestamp::strip_extension;

/// Check that `dir` exists and is a directory.
pub fn ensure_target_dir(dir: &Path) -> Result<(), GrouperError> {
    match std::fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(GrouperError::NotADirectory {
            path: dir.to_path_buf(),
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(GrouperError::DirectoryNotFound {
                path: dir.to_path_buf(),
            })
        }
        Err(e) => Err(GrouperError::ListFailed {
            path: dir.to_path_buf(),
            detail: e.to_string(),
        }),
    }
}

/// List recording file names in `dir`, sorted lexicographically.
///
/// The fixed-width timestamp encoding makes this order chronological.
pub fn list_recordings(dir: &Path, extension: &str) -> Result<Vec<String>, GrouperError> {
    ensure_target_dir(dir)?;

    let mut names = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| GrouperError::ListFailed {
            path: dir.to_path_buf(),
            detail: e.to_string(),
        })?;
        if !entry.file_type().is_file() {
            trace!(path = %entry.path().display(), "skipping non-file entry");
            continue;
        }
        // Non-UTF-8 names keep a replacement character, so they never parse
        // as a timestamp and end up reported as skipped, not silently lost.
        let name = entry.file_name().to_string_lossy();
        if strip_extension(&name, extension).is_some() {
            if entry.file_name().to_str().is_none() {
                warn!(path = %entry.path().display(), "recording name is not valid UTF-8");
            }
            names.push(name.into_owned());
        }
    }

    names.sort();
    debug!(dir = %dir.display(), count = names.len(), "recordings discovered");
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn lists_only_matching_regular_files_in_order() {
        let tmp = tempfile::TempDir::new().unwrap();
        fs::write(tmp.path().join("2025-06-17-14-55-00.fit"), b"b").unwrap();
        fs::write(tmp.path().join("2025-06-17-14-50-00.fit"), b"a").unwrap();
        fs::write(tmp.path().join("notes.txt"), b"x").unwrap();
        fs::create_dir(tmp.path().join("2025-06-17-13-00-00.fit")).unwrap();
        fs::create_dir(tmp.path().join("2025-06-16-10-00-00")).unwrap();
        fs::write(
            tmp.path().join("2025-06-16-10-00-00/2025-06-16-10-00-00.fit"),
            b"old",
        )
        .unwrap();

        let names = list_recordings(tmp.path(), "fit").unwrap();
        assert_eq!(
            names,
            vec!["2025-06-17-14-50-00.fit", "2025-06-17-14-55-00.fit"]
        );
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn non_utf8_recording_is_listed_and_skipped_by_grouping() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        use crate::grouping::group_filenames;
        use crate::model::{GroupingConfig, ToleranceWindow, ZonePolicy};

        let tmp = tempfile::TempDir::new().unwrap();
        fs::write(tmp.path().join("2025-06-17-14-50-00.fit"), b"a").unwrap();
        fs::write(
            tmp.path().join(OsStr::from_bytes(b"2025-06-17-14-5\xff-00.fit")),
            b"b",
        )
        .unwrap();

        let names = list_recordings(tmp.path(), "fit").unwrap();
        assert_eq!(names.len(), 2);

        let config = GroupingConfig::new("fit", ToleranceWindow::default(), ZonePolicy::Utc);
        let plan = group_filenames(tmp.path(), &names, &config);
        assert_eq!(plan.total_files, 2);
        assert_eq!(plan.groups.len(), 1);
        assert_eq!(plan.skipped.len(), 1);
        assert!(plan.skipped[0].filename.contains('\u{FFFD}'));
    }

    #[test]
    fn missing_directory_is_a_usage_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let err = list_recordings(&tmp.path().join("nope"), "fit").unwrap_err();
        assert_eq!(err.error_type(), "directory_not_found");
    }

    #[test]
    fn file_as_target_is_rejected() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("a.fit");
        fs::write(&path, b"x").unwrap();
        let err = ensure_target_dir(&path).unwrap_err();
        assert_eq!(err.error_type(), "not_a_directory");
    }
}
