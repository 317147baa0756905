// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::{Path, PathBuf};

use tokio::sync::RwLock;

use crate::error::ConfigError;

use super::settings::{Config, FeedMetadata, load_or_init_config, save_config};

/// Process-wide owner of the configuration and its backing file
///
/// Every mutation holds the write lock across both the in-memory change and
/// the file rewrite, so concurrent updates are applied one at a time and the
/// last one to acquire the lock wins. Payloads are never merged.
///
/// If the rewrite fails the in-memory change is kept, leaving memory ahead of
/// disk until the next successful write.
#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    config: RwLock<Config>,
}

impl ConfigStore {
    /// Wrap an already loaded configuration
    pub fn new(path: impl Into<PathBuf>, config: Config) -> Self {
        Self {
            path: path.into(),
            config: RwLock::new(config),
        }
    }

    /// Load the configuration at `path`, persisting the bootstrap default if
    /// it is missing or unreadable
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let config = load_or_init_config(&path, Config::bootstrap())?;
        Ok(Self::new(path, config))
    }

    /// Path of the backing JSON file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A copy of the current configuration
    pub async fn snapshot(&self) -> Config {
        self.config.read().await.clone()
    }

    pub async fn audio_dir(&self) -> PathBuf {
        self.config.read().await.audio_dir.clone()
    }

    /// Replace the feed metadata fields and persist
    pub async fn update_metadata(&self, metadata: FeedMetadata) -> Result<(), ConfigError> {
        let mut config = self.config.write().await;
        config.apply_metadata(metadata);
        tracing::info!(title = %config.title, "feed metadata updated");
        save_config(&config, &self.path)
    }

    /// Replace the selection list wholesale and persist
    pub async fn update_selection(&self, files: Vec<String>) -> Result<(), ConfigError> {
        let mut config = self.config.write().await;
        config.selected_files = files;
        tracing::info!(count = config.selected_files.len(), "selection updated");
        save_config(&config, &self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use tempfile::tempdir;

    use crate::config::load_config;

    fn make_store(dir: &Path) -> ConfigStore {
        let mut config = Config::bootstrap();
        config.audio_dir = dir.join("audiobooks");
        ConfigStore::new(dir.join("config.json"), config)
    }

    #[tokio::test]
    async fn open_loads_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut seeded = Config::bootstrap();
        seeded.audio_dir = dir.path().join("books");
        save_config(&seeded, &path).unwrap();

        let store = ConfigStore::open(&path).unwrap();

        assert_eq!(store.snapshot().await, seeded);
        assert_eq!(store.path(), path.as_path());
    }

    #[tokio::test]
    async fn update_selection_persists_to_store_path() {
        let dir = tempdir().unwrap();
        let store = make_store(dir.path());

        store
            .update_selection(vec!["b.mp3".to_string(), "a.mp3".to_string()])
            .await
            .unwrap();

        let on_disk = load_config(store.path()).unwrap();
        assert_eq!(on_disk.selected_files, vec!["b.mp3", "a.mp3"]);
        assert_eq!(store.snapshot().await, on_disk);
    }

    #[tokio::test]
    async fn update_metadata_keeps_selection() {
        let dir = tempdir().unwrap();
        let store = make_store(dir.path());
        store.update_selection(vec!["a.mp3".to_string()]).await.unwrap();

        store
            .update_metadata(FeedMetadata {
                title: "Renamed".to_string(),
                audio_dir: dir.path().join("elsewhere"),
                ..Default::default()
            })
            .await
            .unwrap();

        let config = store.snapshot().await;
        assert_eq!(config.title, "Renamed");
        assert_eq!(config.selected_files, vec!["a.mp3"]);
        assert_eq!(store.audio_dir().await, dir.path().join("elsewhere"));
        assert_eq!(load_config(store.path()).unwrap(), config);
    }

    #[tokio::test]
    async fn failed_persist_keeps_in_memory_change() {
        let dir = tempdir().unwrap();
        // A directory in place of the config file makes the write fail
        let path = dir.path().join("config.json");
        std::fs::create_dir(&path).unwrap();
        let store = ConfigStore::new(&path, Config::bootstrap());

        let result = store.update_selection(vec!["a.mp3".to_string()]).await;

        assert!(matches!(result, Err(ConfigError::WriteFailed { .. })));
        assert_eq!(store.snapshot().await.selected_files, vec!["a.mp3"]);
    }

    #[tokio::test]
    async fn concurrent_selection_updates_last_writer_wins() {
        let dir = tempdir().unwrap();
        let store = Arc::new(make_store(dir.path()));
        let first = vec!["one.mp3".to_string(), "two.mp3".to_string()];
        let second = vec!["three.mp3".to_string()];

        let a = tokio::spawn({
            let store = Arc::clone(&store);
            let files = first.clone();
            async move { store.update_selection(files).await }
        });
        let b = tokio::spawn({
            let store = Arc::clone(&store);
            let files = second.clone();
            async move { store.update_selection(files).await }
        });
        a.await.unwrap().unwrap();
        b.await.unwrap().unwrap();

        let in_memory = store.snapshot().await.selected_files;
        let on_disk = load_config(store.path()).unwrap().selected_files;

        // Exactly one payload survives, unmerged, and disk agrees with memory
        assert!(in_memory == first || in_memory == second);
        assert_eq!(in_memory, on_disk);
    }
}
