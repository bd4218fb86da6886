//! Progress persistence
//!
//! The round core never touches storage. Cross-round totals are kept by the
//! collaborator layer behind `ProgressStore`:
//! - `MemoryProgressStore` for tests and throwaway sessions
//! - `JsonFileProgressStore` writes a temp file and renames it over the save

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::PersistenceError;

/// Totals carried across rounds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Progress {
    pub total_score: u64,
    pub best_round: u32,
    pub rounds_played: u32,
}

impl Progress {
    /// Fold one finished round into the totals
    pub fn record_round(&mut self, points: u32) {
        self.total_score = self.total_score.saturating_add(u64::from(points));
        self.best_round = self.best_round.max(points);
        self.rounds_played = self.rounds_played.saturating_add(1);
    }
}

pub trait ProgressStore {
    /// Stored progress, or the default when nothing was saved yet
    fn load(&self) -> Result<Progress, PersistenceError>;
    fn save(&mut self, progress: &Progress) -> Result<(), PersistenceError>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryProgressStore {
    saved: Option<Progress>,
    saves: u32,
}

impl MemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful saves so far
    pub fn save_count(&self) -> u32 {
        self.saves
    }
}

impl ProgressStore for MemoryProgressStore {
    fn load(&self) -> Result<Progress, PersistenceError> {
        Ok(self.saved.unwrap_or_default())
    }

    fn save(&mut self, progress: &Progress) -> Result<(), PersistenceError> {
        self.saved = Some(*progress);
        self.saves += 1;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct JsonFileProgressStore {
    path: PathBuf,
}

impl JsonFileProgressStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_error(path: &Path, source: std::io::Error) -> PersistenceError {
        PersistenceError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl ProgressStore for JsonFileProgressStore {
    fn load(&self) -> Result<Progress, PersistenceError> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No progress at {}, starting fresh", self.path.display());
                return Ok(Progress::default());
            }
            Err(e) => return Err(Self::io_error(&self.path, e)),
        };
        let progress: Progress = serde_json::from_str(&json)?;
        log::info!(
            "Loaded progress: {} points over {} rounds",
            progress.total_score,
            progress.rounds_played
        );
        Ok(progress)
    }

    fn save(&mut self, progress: &Progress) -> Result<(), PersistenceError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| Self::io_error(dir, e))?;
        }

        let json = serde_json::to_string_pretty(progress)?;
        let tmp = self.tmp_path();
        fs::write(&tmp, json).map_err(|e| Self::io_error(&tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| Self::io_error(&self.path, e))?;
        log::debug!("Progress saved to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_record_round() {
        let mut progress = Progress::default();
        progress.record_round(12);
        progress.record_round(5);
        assert_eq!(progress.total_score, 17);
        assert_eq!(progress.best_round, 12);
        assert_eq!(progress.rounds_played, 2);
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryProgressStore::new();
        assert_eq!(store.load().unwrap(), Progress::default());

        let progress = Progress {
            total_score: 40,
            best_round: 30,
            rounds_played: 2,
        };
        store.save(&progress).unwrap();
        assert_eq!(store.load().unwrap(), progress);
        assert_eq!(store.save_count(), 1);
    }

    #[test]
    fn test_file_store_missing_is_default() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileProgressStore::new(dir.path().join("progress.json"));
        assert_eq!(store.load().unwrap(), Progress::default());
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/progress.json");

        let mut store = JsonFileProgressStore::new(&path);
        let mut progress = Progress::default();
        progress.record_round(250);
        store.save(&progress).unwrap();

        assert!(path.exists());
        assert!(!store.tmp_path().exists());
        let reopened = JsonFileProgressStore::new(&path);
        assert_eq!(reopened.load().unwrap(), progress);
    }

    #[test]
    fn test_file_store_rejects_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("progress.json");
        fs::write(&path, "{ not json").unwrap();

        let store = JsonFileProgressStore::new(&path);
        assert!(matches!(store.load(), Err(PersistenceError::Json(_))));
    }

    #[test]
    fn test_file_store_accepts_partial_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("progress.json");
        fs::write(&path, r#"{"total_score": 120}"#).unwrap();

        let progress = JsonFileProgressStore::new(&path).load().unwrap();
        assert_eq!(progress.total_score, 120);
        assert_eq!(progress.rounds_played, 0);
    }
}
