// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::Path;

/// MIME type used when an extension is not in the table
pub const DEFAULT_MIME_TYPE: &str = "audio/mpeg";

/// Supported audio extensions (lowercase, without dot) and their MIME types
const AUDIO_FORMATS: &[(&str, &str)] = &[
    ("mp3", "audio/mpeg"),
    ("m4a", "audio/mp4"),
    ("m4b", "audio/mp4"),
    ("ogg", "audio/ogg"),
    ("opus", "audio/opus"),
    ("flac", "audio/flac"),
    ("wav", "audio/wav"),
    ("aac", "audio/aac"),
];

fn normalize_extension(ext: &str) -> String {
    ext.trim_start_matches('.').to_ascii_lowercase()
}

fn lookup(ext: &str) -> Option<&'static str> {
    let ext = normalize_extension(ext);
    AUDIO_FORMATS
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, mime)| *mime)
}

/// Map a file extension (with or without leading dot, any case) to a MIME type
///
/// Unknown extensions fall back to [`DEFAULT_MIME_TYPE`].
pub fn mime_type_for_extension(ext: &str) -> &'static str {
    lookup(ext).unwrap_or(DEFAULT_MIME_TYPE)
}

/// Text after the last dot of the file name
///
/// Unlike [`Path::extension`] a leading dot counts, so `.mp3` has the
/// extension `mp3`. A trailing dot yields no extension.
fn file_extension(path: &Path) -> Option<&str> {
    let name = path.file_name()?.to_str()?;
    let (_, ext) = name.rsplit_once('.')?;
    (!ext.is_empty()).then_some(ext)
}

/// MIME type for a path, judged by its extension
pub fn mime_type_for_path(path: &Path) -> &'static str {
    file_extension(path)
        .map(mime_type_for_extension)
        .unwrap_or(DEFAULT_MIME_TYPE)
}

/// Check whether a path has one of the supported audio extensions
pub fn is_audio_file(path: &Path) -> bool {
    file_extension(path).is_some_and(|ext| lookup(ext).is_some())
}
