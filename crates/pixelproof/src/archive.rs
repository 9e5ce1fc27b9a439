//! Timestamped history files.
//!
//! An archived file is named `<prefix><stamp>-<counter>.<ext>`, where the
//! stamp is local time down to the microsecond and the counter breaks ties
//! within one stamp. Listing orders by `(stamp, counter)`, so archives made
//! in the same microsecond still come back in creation order.

use crate::result::ProofResult;
use std::fs;
use std::path::{Path, PathBuf};

const STAMP_FORMAT: &str = "%Y%m%d%H%M%S%6f";

/// First free archive path in `dir` for the current instant
#[must_use]
pub fn next_path(dir: &Path, prefix: &str, ext: &str) -> PathBuf {
    let stamp = chrono::Local::now().format(STAMP_FORMAT).to_string();
    let mut counter = 0_u32;
    loop {
        let path = dir.join(format!("{prefix}{stamp}-{counter:03}.{ext}"));
        if !path.exists() {
            return path;
        }
        counter += 1;
    }
}

/// Archived files in `dir` matching `prefix` and `ext`, oldest first
pub fn list(dir: &Path, prefix: &str, ext: &str) -> ProofResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut entries: Vec<((String, u32), PathBuf)> = fs::read_dir(dir)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter_map(|path| {
            let file = path.file_name()?.to_string_lossy().into_owned();
            order_key(&file, prefix, ext).map(|key| (key, path))
        })
        .collect();
    entries.sort();
    Ok(entries.into_iter().map(|(_, path)| path).collect())
}

/// `(stamp, counter)` of an archive name; a name without a counter sorts first
fn order_key(file: &str, prefix: &str, ext: &str) -> Option<(String, u32)> {
    let rest = file
        .strip_prefix(prefix)?
        .strip_suffix(ext)?
        .strip_suffix('.')?;
    match rest.split_once('-') {
        Some((stamp, counter)) => Some((stamp.to_string(), counter.parse().ok()?)),
        None => Some((rest.to_string(), 0)),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_order_key() {
        assert_eq!(
            order_key("inbox_baseline.20260101120000000001-002.png", "inbox_baseline.", "png"),
            Some(("20260101120000000001".to_string(), 2))
        );
        assert_eq!(
            order_key("inbox_baseline.20260101120000000001.png", "inbox_baseline.", "png"),
            Some(("20260101120000000001".to_string(), 0))
        );
        assert_eq!(order_key("inbox_baseline.x-y.png", "inbox_baseline.", "png"), None);
        assert_eq!(order_key("other.20260101.png", "inbox_baseline.", "png"), None);
        assert_eq!(order_key("inbox_baseline.20260101.json", "inbox_baseline.", "png"), None);
    }

    #[test]
    fn test_same_stamp_lists_in_creation_order() {
        let dir = TempDir::new().unwrap();
        let stamp = "20260101120000000001";
        for name in [
            format!("inbox_checklist.{stamp}.json"),
            format!("inbox_checklist.{stamp}-1.json"),
            format!("inbox_checklist.{stamp}-2.json"),
            format!("inbox_checklist.{stamp}-10.json"),
            "inbox_checklist.20260101115959999999-000.json".to_string(),
            "inbox_header_checklist.20260101000000000000-000.json".to_string(),
        ] {
            fs::write(dir.path().join(name), "{}").unwrap();
        }

        let files: Vec<String> = list(dir.path(), "inbox_checklist.", "json")
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            files,
            vec![
                "inbox_checklist.20260101115959999999-000.json".to_string(),
                format!("inbox_checklist.{stamp}.json"),
                format!("inbox_checklist.{stamp}-1.json"),
                format!("inbox_checklist.{stamp}-2.json"),
                format!("inbox_checklist.{stamp}-10.json"),
            ]
        );
    }

    #[test]
    fn test_next_path_skips_taken_names() {
        let dir = TempDir::new().unwrap();
        let first = next_path(dir.path(), "inbox_baseline.", "png");
        assert!(first.to_string_lossy().ends_with("-000.png"));
        fs::write(&first, b"x").unwrap();

        let second = next_path(dir.path(), "inbox_baseline.", "png");
        assert_ne!(first, second);
        fs::write(&second, b"y").unwrap();

        let listed = list(dir.path(), "inbox_baseline.", "png").unwrap();
        assert_eq!(listed, vec![first, second]);
    }

    #[test]
    fn test_list_missing_dir_is_empty() {
        let dir = TempDir::new().unwrap();
        assert!(list(&dir.path().join("history"), "inbox_baseline.", "png")
            .unwrap()
            .is_empty());
    }
}
