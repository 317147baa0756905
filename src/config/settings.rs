// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ConfigError;

/// Decode an explicit `null` the same way as a missing key
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Persisted server configuration: feed metadata plus the selected files
///
/// Keys missing from the JSON document, or set to `null`, decode to their
/// zero value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Listen spec, either `:PORT` or `HOST:PORT`
    #[serde(deserialize_with = "null_as_default")]
    pub port: String,
    /// Externally visible origin used for feed and enclosure links
    #[serde(deserialize_with = "null_as_default")]
    pub base_url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub audio_dir: PathBuf,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub author: String,
    #[serde(deserialize_with = "null_as_default")]
    pub email: String,
    /// Feed artwork; empty means no image
    #[serde(deserialize_with = "null_as_default")]
    pub image_url: String,
    /// Paths relative to `audio_dir`, in feed order
    #[serde(deserialize_with = "null_as_default")]
    pub selected_files: Vec<String>,
}

/// The metadata fields a client may overwrite through the config endpoint
///
/// Every field is replaced wholesale; a field absent from the payload
/// overwrites the stored value with an empty one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FeedMetadata {
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub author: String,
    #[serde(deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(deserialize_with = "null_as_default")]
    pub image_url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub base_url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub audio_dir: PathBuf,
}

impl Config {
    /// The configuration written on first start
    pub fn bootstrap() -> Self {
        Self {
            port: ":8083".to_string(),
            base_url: "http://localhost:8083".to_string(),
            audio_dir: PathBuf::from("./audiobooks"),
            title: "My Audiobook Feed".to_string(),
            description: "Personal audiobook RSS feed for Overcast".to_string(),
            author: "Overss".to_string(),
            email: "user@example.com".to_string(),
            image_url: String::new(),
            selected_files: Vec::new(),
        }
    }

    /// Overwrite the feed metadata fields, leaving port and selection untouched
    pub fn apply_metadata(&mut self, metadata: FeedMetadata) {
        self.title = metadata.title;
        self.description = metadata.description;
        self.author = metadata.author;
        self.email = metadata.email;
        self.image_url = metadata.image_url;
        self.base_url = metadata.base_url;
        self.audio_dir = metadata.audio_dir;
    }

    /// Address string suitable for binding a TCP listener
    ///
    /// A bare `:PORT` binds on all interfaces.
    pub fn listen_addr(&self) -> String {
        if self.port.starts_with(':') {
            format!("0.0.0.0{}", self.port)
        } else {
            self.port.clone()
        }
    }
}

/// Read and decode the configuration file
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
        path: path.to_path_buf(),
        source: e,
    })?;

    serde_json::from_str(&content).map_err(|e| ConfigError::JsonParseFailed {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Serialize the configuration as indented JSON, overwriting the file
pub fn save_config(config: &Config, path: &Path) -> Result<(), ConfigError> {
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(path, json).map_err(|e| ConfigError::WriteFailed {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Create the audio directory of `config` and persist it as a new config file
pub fn init_config(config: Config, path: &Path) -> Result<Config, ConfigError> {
    std::fs::create_dir_all(&config.audio_dir).map_err(|e| {
        ConfigError::CreateDirectoryFailed {
            path: config.audio_dir.clone(),
            source: e,
        }
    })?;

    save_config(&config, path)?;
    Ok(config)
}

/// Load the configuration, falling back to persisting `default`
///
/// A missing file and a malformed one are treated the same way.
pub fn load_or_init_config(path: &Path, default: Config) -> Result<Config, ConfigError> {
    match load_config(path) {
        Ok(config) => Ok(config),
        Err(err) => {
            tracing::warn!("Creating default config: {err}");
            init_config(default, path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::tempdir;

    fn make_config() -> Config {
        Config {
            port: "127.0.0.1:9000".to_string(),
            base_url: "http://books.local:9000".to_string(),
            audio_dir: PathBuf::from("/srv/audiobooks"),
            title: "Night Reading".to_string(),
            description: "Books for the commute".to_string(),
            author: "Jane Reader".to_string(),
            email: "jane@example.com".to_string(),
            image_url: "http://books.local:9000/cover.jpg".to_string(),
            selected_files: vec!["b.mp3".to_string(), "sub/a.m4b".to_string()],
        }
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let config = make_config();

        save_config(&config, &path).unwrap();
        let read_back = load_config(&path).unwrap();

        assert_eq!(read_back, config);
    }

    #[test]
    fn saved_file_is_indented_snake_case_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");

        save_config(&make_config(), &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();

        assert!(content.contains("\n  \"base_url\": \"http://books.local:9000\""));
        assert!(content.contains("\"selected_files\""));
    }

    #[test]
    fn load_nonexistent_returns_error() {
        let dir = tempdir().unwrap();
        let result = load_config(&dir.path().join("missing.json"));
        assert!(matches!(result, Err(ConfigError::ReadFailed { .. })));
    }

    #[test]
    fn load_malformed_returns_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ this is not json").unwrap();

        let result = load_config(&path);
        assert!(matches!(result, Err(ConfigError::JsonParseFailed { .. })));
    }

    #[test]
    fn load_fills_missing_keys_with_zero_values() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"title": "Only a title"}"#).unwrap();

        let config = load_config(&path).unwrap();

        assert_eq!(config.title, "Only a title");
        assert!(config.base_url.is_empty());
        assert!(config.selected_files.is_empty());
    }

    #[test]
    fn load_treats_null_values_as_zero_values() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"title": "Mine", "image_url": null, "selected_files": null}"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();

        assert_eq!(config.title, "Mine");
        assert!(config.image_url.is_empty());
        assert!(config.selected_files.is_empty());
    }

    #[test]
    fn load_or_init_keeps_file_with_null_selection() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"title": "Mine", "selected_files": null}"#).unwrap();

        let config = load_or_init_config(&path, Config::bootstrap()).unwrap();

        assert_eq!(config.title, "Mine");
    }

    #[test]
    fn feed_metadata_treats_null_as_empty() {
        let metadata: FeedMetadata =
            serde_json::from_str(r#"{"title": "T", "author": null, "audio_dir": null}"#).unwrap();

        assert_eq!(metadata.title, "T");
        assert!(metadata.author.is_empty());
        assert_eq!(metadata.audio_dir, PathBuf::new());
    }

    #[test]
    fn bootstrap_matches_documented_defaults() {
        let config = Config::bootstrap();

        assert_eq!(config.port, ":8083");
        assert_eq!(config.base_url, "http://localhost:8083");
        assert_eq!(config.audio_dir, PathBuf::from("./audiobooks"));
        assert_eq!(config.email, "user@example.com");
        assert!(config.image_url.is_empty());
        assert!(config.selected_files.is_empty());
    }

    #[test]
    fn init_creates_audio_dir_and_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut config = Config::bootstrap();
        config.audio_dir = dir.path().join("audiobooks");

        let written = init_config(config.clone(), &path).unwrap();

        assert_eq!(written, config);
        assert!(config.audio_dir.is_dir());
        assert_eq!(load_config(&path).unwrap(), config);
    }

    #[test]
    fn load_or_init_replaces_corrupt_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "garbage").unwrap();
        let mut default = Config::bootstrap();
        default.audio_dir = dir.path().join("audiobooks");

        let config = load_or_init_config(&path, default.clone()).unwrap();

        assert_eq!(config, default);
        assert_eq!(load_config(&path).unwrap(), default);
    }

    #[test]
    fn load_or_init_keeps_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        save_config(&make_config(), &path).unwrap();

        let config = load_or_init_config(&path, Config::bootstrap()).unwrap();
        assert_eq!(config, make_config());
    }

    #[test]
    fn apply_metadata_overwrites_fields_but_keeps_selection_and_port() {
        let mut config = make_config();
        let metadata = FeedMetadata {
            title: "New Title".to_string(),
            base_url: "https://feeds.example.org".to_string(),
            audio_dir: PathBuf::from("/mnt/books"),
            ..Default::default()
        };

        config.apply_metadata(metadata);

        assert_eq!(config.title, "New Title");
        assert_eq!(config.base_url, "https://feeds.example.org");
        assert_eq!(config.audio_dir, PathBuf::from("/mnt/books"));
        // Absent fields are cleared, not merged
        assert!(config.description.is_empty());
        assert!(config.author.is_empty());
        assert!(config.email.is_empty());
        assert!(config.image_url.is_empty());
        assert_eq!(config.port, "127.0.0.1:9000");
        assert_eq!(config.selected_files, make_config().selected_files);
    }

    #[test]
    fn feed_metadata_ignores_port_and_selection_keys() {
        let payload = r#"{
            "port": ":1",
            "title": "T",
            "selected_files": ["x.mp3"]
        }"#;
        let metadata: FeedMetadata = serde_json::from_str(payload).unwrap();
        assert_eq!(metadata.title, "T");
    }

    #[test]
    fn listen_addr_expands_bare_port() {
        let mut config = Config::bootstrap();
        assert_eq!(config.listen_addr(), "0.0.0.0:8083");

        config.port = "127.0.0.1:9000".to_string();
        assert_eq!(config.listen_addr(), "127.0.0.1:9000");
    }
}
