//! Timestamped snapshots of the prompts document and their rotation.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::warn;

use super::utils::file_timestamp;

/// Number of backups kept when nothing else is configured.
pub const DEFAULT_MAX_BACKUPS: usize = 10;

const BACKUP_PREFIX: &str = "prompts-";
const BACKUP_EXT: &str = ".json";

/// A backup file as found on disk.
#[derive(Debug, Clone, Serialize)]
pub struct BackupInfo {
    pub name: String,
    pub path: PathBuf,
    pub modified: DateTime<Utc>,
    pub size: u64,
}

/// Owns the backup directory: creates snapshots, lists them and enforces
/// the retention limit.
#[derive(Debug, Clone)]
pub struct BackupManager {
    dir: PathBuf,
    max_backups: usize,
}

impl BackupManager {
    pub fn new(dir: impl Into<PathBuf>, max_backups: usize) -> Self {
        Self {
            dir: dir.into(),
            max_backups,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn max_backups(&self) -> usize {
        self.max_backups
    }

    /// Copies `source` into a new backup file and returns its path.
    ///
    /// Names carry a microsecond timestamp. If that name is already taken
    /// the timestamp is nudged forward, so names never collide and always
    /// sort in creation order.
    pub fn create(&self, source: &Path) -> io::Result<PathBuf> {
        let mut at = Utc::now();
        let mut path = self.path_for(at);
        while path.exists() {
            at += Duration::microseconds(1);
            path = self.path_for(at);
        }
        fs::copy(source, &path)?;
        Ok(path)
    }

    fn path_for(&self, at: DateTime<Utc>) -> PathBuf {
        self.dir
            .join(format!("{BACKUP_PREFIX}{}{BACKUP_EXT}", file_timestamp(at)))
    }

    /// Lists backups, newest first (modification time, then name).
    pub fn list(&self) -> io::Result<Vec<BackupInfo>> {
        let mut backups = Vec::new();
        if !self.dir.exists() {
            return Ok(backups);
        }
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let name = match entry.file_name().to_str() {
                Some(name) if is_backup_name(name) => name.to_string(),
                _ => continue,
            };
            let meta = entry.metadata()?;
            if !meta.is_file() {
                continue;
            }
            backups.push(BackupInfo {
                name,
                path: entry.path(),
                modified: meta.modified()?.into(),
                size: meta.len(),
            });
        }
        backups.sort_by(|a, b| {
            b.modified
                .cmp(&a.modified)
                .then_with(|| b.name.cmp(&a.name))
        });
        Ok(backups)
    }

    /// Deletes every backup beyond the retention limit, oldest first.
    /// Returns how many files were removed. A file that cannot be removed
    /// is logged and skipped.
    pub fn rotate(&self) -> io::Result<usize> {
        let backups = self.list()?;
        let mut removed = 0;
        for stale in backups.iter().skip(self.max_backups).rev() {
            match fs::remove_file(&stale.path) {
                Ok(()) => removed += 1,
                Err(e) => warn!(
                    backup = %stale.path.display(),
                    error = %e,
                    "failed to remove old backup"
                ),
            }
        }
        Ok(removed)
    }

    /// Resolves a backup name to its path inside the backup directory.
    /// Returns `None` for anything that is not a plain backup file name.
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        if !is_backup_name(name) || name.contains(['/', '\\']) {
            return None;
        }
        let path = self.dir.join(name);
        path.is_file().then_some(path)
    }
}

fn is_backup_name(name: &str) -> bool {
    name.starts_with(BACKUP_PREFIX) && name.ends_with(BACKUP_EXT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn create_never_reuses_a_name() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("prompts.json");
        fs::write(&source, "{}").unwrap();
        let backups = BackupManager::new(dir.path().join("b"), 10);
        fs::create_dir_all(backups.dir()).unwrap();

        let a = backups.create(&source).unwrap();
        let b = backups.create(&source).unwrap();

        assert_ne!(a, b);
        assert_eq!(backups.list().unwrap().len(), 2);
    }

    #[test]
    fn rotate_keeps_the_newest() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("prompts.json");
        fs::write(&source, "{}").unwrap();
        let backups = BackupManager::new(dir.path().join("b"), 3);
        fs::create_dir_all(backups.dir()).unwrap();

        let mut created = Vec::new();
        for _ in 0..6 {
            created.push(backups.create(&source).unwrap());
            std::thread::sleep(std::time::Duration::from_millis(5));
        }

        assert_eq!(backups.rotate().unwrap(), 3);
        let kept: Vec<PathBuf> = backups.list().unwrap().into_iter().map(|b| b.path).collect();
        let expected: Vec<PathBuf> = created.iter().rev().take(3).cloned().collect();
        assert_eq!(kept, expected);
    }

    #[test]
    fn unrelated_files_are_ignored() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("notes.txt"), "keep me").unwrap();
        let backups = BackupManager::new(dir.path(), 0);

        assert!(backups.list().unwrap().is_empty());
        backups.rotate().unwrap();
        assert!(dir.path().join("notes.txt").exists());
    }

    #[test]
    fn resolve_rejects_paths() {
        let dir = tempdir().unwrap();
        let backups = BackupManager::new(dir.path(), 10);
        fs::write(dir.path().join("prompts-x.json"), "{}").unwrap();

        assert!(backups.resolve("prompts-x.json").is_some());
        assert!(backups.resolve("../prompts-x.json").is_none());
        assert!(backups.resolve("prompts.json").is_none());
        assert!(backups.resolve("prompts-missing.json").is_none());
    }
}
