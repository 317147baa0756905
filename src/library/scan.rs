// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::collections::HashSet;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use walkdir::WalkDir;

use crate::error::ScanError;

use super::media::is_audio_file;

/// An audio file found under the audio directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AudioFile {
    /// Base file name
    pub name: String,
    /// Path relative to the audio directory, as stored in the selection
    pub path: String,
    /// Size in bytes
    pub size: u64,
    pub mod_time: DateTime<Utc>,
    /// Whether `path` is part of the current selection
    pub selected: bool,
}

/// Recursively scan `root` for supported audio files
///
/// Entries are visited depth-first, sorted by file name within each
/// directory. The first walk or metadata error aborts the scan; no partial
/// listing is returned.
pub fn scan_audio_files(
    root: &Path,
    selected_files: &[String],
) -> Result<Vec<AudioFile>, ScanError> {
    let selected: HashSet<&str> = selected_files.iter().map(String::as_str).collect();
    let mut files = Vec::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| ScanError::WalkFailed {
            root: root.to_path_buf(),
            source: e,
        })?;

        let path = entry.path();
        if entry.file_type().is_dir() || !is_audio_file(path) {
            continue;
        }

        let metadata = entry.metadata().map_err(|e| ScanError::WalkFailed {
            root: root.to_path_buf(),
            source: e,
        })?;
        let modified = metadata.modified().map_err(|e| ScanError::MetadataFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

        let relative = path
            .strip_prefix(root)
            .unwrap_or(path)
            .to_string_lossy()
            .into_owned();

        files.push(AudioFile {
            name: entry.file_name().to_string_lossy().into_owned(),
            selected: selected.contains(relative.as_str()),
            path: relative,
            size: metadata.len(),
            mod_time: DateTime::<Utc>::from(modified),
        });
    }

    tracing::debug!(root = %root.display(), count = files.len(), "scanned audio directory");
    Ok(files)
}
