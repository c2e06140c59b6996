use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use crate::error::{IoResultExt, Result};

/// replace `target` with `content` atomically
///
/// content is written to a uniquely named file under `tmp_dir`, synced, then
/// renamed over the target. readers see either the old or the new file,
/// never a truncated one. `tmp_dir` must be on the same filesystem.
pub fn atomic_write(tmp_dir: &Path, target: &Path, content: &[u8]) -> Result<()> {
    let tmp_path = tmp_dir.join(uuid::Uuid::new_v4().to_string());
    {
        let mut tmp_file = File::create(&tmp_path).with_path(&tmp_path)?;
        tmp_file.write_all(content).with_path(&tmp_path)?;
        tmp_file.sync_all().with_path(&tmp_path)?;
    }

    if let Err(e) = fs::rename(&tmp_path, target) {
        let _ = fs::remove_file(&tmp_path);
        return Err(crate::Error::Io {
            path: target.to_path_buf(),
            source: e,
        });
    }

    if let Some(parent) = target.parent() {
        fsync_dir(parent)?;
    }

    Ok(())
}

/// sync a directory to disk
pub fn fsync_dir(path: &Path) -> Result<()> {
    let dir = File::open(path).with_path(path)?;
    dir.sync_all().with_path(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_atomic_write_creates_file() {
        let dir = tempdir().unwrap();
        let tmp = dir.path().join("tmp");
        fs::create_dir(&tmp).unwrap();
        let target = dir.path().join("target");

        atomic_write(&tmp, &target, b"content").unwrap();

        assert_eq!(fs::read(&target).unwrap(), b"content");
        // no leftovers in tmp
        assert_eq!(fs::read_dir(&tmp).unwrap().count(), 0);
    }

    #[test]
    fn test_atomic_write_replaces_file() {
        let dir = tempdir().unwrap();
        let tmp = dir.path().join("tmp");
        fs::create_dir(&tmp).unwrap();
        let target = dir.path().join("target");
        fs::write(&target, "a much longer original body").unwrap();

        atomic_write(&tmp, &target, b"short").unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "short");
    }

    #[test]
    fn test_atomic_write_missing_parent() {
        let dir = tempdir().unwrap();
        let tmp = dir.path().join("tmp");
        fs::create_dir(&tmp).unwrap();
        let target = dir.path().join("missing/target");

        let result = atomic_write(&tmp, &target, b"x");
        assert!(matches!(result, Err(crate::Error::Io { .. })));
        assert_eq!(fs::read_dir(&tmp).unwrap().count(), 0);
    }

    #[test]
    fn test_fsync_dir() {
        let dir = tempdir().unwrap();

        fsync_dir(dir.path()).unwrap();
        assert!(fsync_dir(&dir.path().join("nope")).is_err());
    }
}
