//! Single-value durable cursor per stage.
//!
//! The file holds either the identifier of the last fully completed unit or
//! the sentinel `COMPLETED`.

use crate::constants::COMPLETED;
use crate::error::Result;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub fn load(path: &Path) -> Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value = content.trim();
    Ok(if value.is_empty() { None } else { Some(value.to_string()) })
}

/// Replace the stored value; readers never see a half-written file.
pub fn mark_completed(path: &Path, unit: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let tmp = temp_path(path);
    {
        let mut file = File::create(&tmp)?;
        file.write_all(unit.as_bytes())?;
        file.sync_all()?;
    }
    fs::rename(&tmp, path)?;
    debug!(checkpoint = %path.display(), unit, "Checkpoint advanced");
    Ok(())
}

pub fn mark_terminal(path: &Path) -> Result<()> {
    mark_completed(path, COMPLETED)
}

pub fn is_done(path: &Path) -> bool {
    matches!(load(path), Ok(Some(value)) if value == COMPLETED)
}

pub fn clear(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path)?;
    }
    Ok(())
}

/// Index of the first unit still to process given the stored checkpoint.
///
/// Every unit up to and including the checkpointed one is skipped. A checkpoint
/// that names no unit in the list restarts from the beginning.
pub fn resume_index(units: &[String], checkpoint: Option<&str>) -> usize {
    match checkpoint {
        None => 0,
        Some(COMPLETED) => units.len(),
        Some(last) => match units.iter().position(|u| u == last) {
            Some(idx) => idx + 1,
            None => {
                warn!("Checkpoint '{}' not found among {} units; starting over", last, units.len());
                0
            }
        },
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "checkpoint".into());
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_overwrite_keeps_single_value() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/stage.checkpoint");

        assert_eq!(load(&path).unwrap(), None);
        mark_completed(&path, "https://example.com/a").unwrap();
        mark_completed(&path, "https://example.com/b").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "https://example.com/b");
        assert_eq!(load(&path).unwrap().as_deref(), Some("https://example.com/b"));
        assert!(!is_done(&path));
        assert!(!temp_path(&path).exists());

        mark_terminal(&path).unwrap();
        assert!(is_done(&path));

        clear(&path).unwrap();
        assert_eq!(load(&path).unwrap(), None);
    }

    #[test]
    fn test_load_trims_and_treats_blank_as_absent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("c.txt");
        fs::write(&path, "  https://example.com/x\n").unwrap();
        assert_eq!(load(&path).unwrap().as_deref(), Some("https://example.com/x"));
        fs::write(&path, "\n").unwrap();
        assert_eq!(load(&path).unwrap(), None);
    }

    #[test]
    fn test_resume_index() {
        let units: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        assert_eq!(resume_index(&units, None), 0);
        assert_eq!(resume_index(&units, Some("a")), 1);
        assert_eq!(resume_index(&units, Some("c")), 3);
        assert_eq!(resume_index(&units, Some(COMPLETED)), 3);
        assert_eq!(resume_index(&units, Some("zzz")), 0);
    }
}
