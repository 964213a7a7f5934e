//! File-backed local cache.
//!
//! Directory structure:
//! ```text
//! cache_dir/
//! ├── therapy_session
//! ├── therapy_messages
//! └── therapy_last_activity
//! ```
//!
//! Writes go to a hidden temp file that is synced and renamed over the slot,
//! so a crash mid-write leaves either the old or the new value.

use async_trait::async_trait;
use cadence_core::cache::{CacheSlot, LocalCache};
use cadence_core::config::CacheSettings;
use cadence_core::error::Result;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

pub struct FileLocalCache {
    dir: PathBuf,
}

impl FileLocalCache {
    /// Creates a cache rooted at `dir`. The directory is created lazily.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Creates a cache in the platform data directory.
    pub fn default_location() -> Result<Self> {
        let dir = crate::paths::CadencePaths::cache_dir()
            .map_err(|e| cadence_core::CadenceError::config(e.to_string()))?;
        Ok(Self::new(dir))
    }

    /// Creates a cache from the `[cache]` config section, falling back to
    /// the platform data directory when `dir` is unset.
    pub fn from_settings(settings: &CacheSettings) -> Result<Self> {
        match &settings.dir {
            Some(dir) => Ok(Self::new(dir.clone())),
            None => Self::default_location(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn slot_path(&self, slot: CacheSlot) -> PathBuf {
        self.dir.join(slot.key())
    }

    fn temp_path(&self, slot: CacheSlot) -> PathBuf {
        self.dir.join(format!(".{}.tmp", slot.key()))
    }
}

#[async_trait]
impl LocalCache for FileLocalCache {
    async fn get(&self, slot: CacheSlot) -> Result<Option<String>> {
        match fs::read_to_string(self.slot_path(slot)).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, slot: CacheSlot, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir).await?;

        let tmp_path = self.temp_path(slot);
        let mut tmp_file = fs::File::create(&tmp_path).await?;
        tmp_file.write_all(value.as_bytes()).await?;
        tmp_file.sync_all().await?;
        drop(tmp_file);

        fs::rename(&tmp_path, self.slot_path(slot)).await?;
        Ok(())
    }

    async fn remove(&self, slot: CacheSlot) -> Result<()> {
        match fs::remove_file(self.slot_path(slot)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_set_get_remove() {
        let temp_dir = TempDir::new().unwrap();
        let cache = FileLocalCache::new(temp_dir.path().join("cache"));

        assert_eq!(cache.get(CacheSlot::Messages).await.unwrap(), None);

        cache.set(CacheSlot::Messages, "[]").await.unwrap();
        assert_eq!(
            cache.get(CacheSlot::Messages).await.unwrap().as_deref(),
            Some("[]")
        );

        cache.remove(CacheSlot::Messages).await.unwrap();
        assert_eq!(cache.get(CacheSlot::Messages).await.unwrap(), None);
        cache.remove(CacheSlot::Messages).await.unwrap();
    }

    #[tokio::test]
    async fn test_overwrite_leaves_no_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        let cache = FileLocalCache::new(temp_dir.path());

        cache.set(CacheSlot::LastActivity, "first").await.unwrap();
        cache.set(CacheSlot::LastActivity, "second").await.unwrap();

        assert_eq!(
            cache.get(CacheSlot::LastActivity).await.unwrap().as_deref(),
            Some("second")
        );
        assert!(!temp_dir.path().join(".therapy_last_activity.tmp").exists());
    }

    #[tokio::test]
    async fn test_from_settings_uses_configured_dir() {
        let temp_dir = TempDir::new().unwrap();
        let settings = CacheSettings {
            dir: Some(temp_dir.path().join("slots")),
        };
        let cache = FileLocalCache::from_settings(&settings).unwrap();
        assert_eq!(cache.dir(), temp_dir.path().join("slots"));

        cache.set(CacheSlot::SessionSnapshot, "{}").await.unwrap();
        assert!(temp_dir.path().join("slots").join("therapy_session").exists());
    }

    #[test]
    fn test_from_settings_defaults_to_platform_dir() {
        let Ok(expected) = crate::paths::CadencePaths::cache_dir() else {
            return;
        };
        let cache = FileLocalCache::from_settings(&CacheSettings::default()).unwrap();
        assert_eq!(cache.dir(), expected);
    }

    #[tokio::test]
    async fn test_clear_removes_every_slot() {
        let temp_dir = TempDir::new().unwrap();
        let cache = FileLocalCache::new(temp_dir.path());
        for slot in CacheSlot::ALL {
            cache.set(slot, "x").await.unwrap();
        }

        cache.clear().await.unwrap();

        for slot in CacheSlot::ALL {
            assert_eq!(cache.get(slot).await.unwrap(), None);
        }
    }
}
