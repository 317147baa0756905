// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, Utc};
use rss::extension::itunes::{ITunesChannelExtensionBuilder, ITunesOwnerBuilder};
use rss::{Channel, ChannelBuilder, EnclosureBuilder, GuidBuilder, ImageBuilder, Item, ItemBuilder};

use crate::config::Config;
use crate::error::FeedError;
use crate::library::mime_type_for_path;

/// A selected file that still exists on disk, ready to become a feed item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    /// Path relative to the audio directory, with `/` separators
    pub relative_path: String,
    pub size: u64,
    pub modified: DateTime<Utc>,
}

/// Join a selection entry under the audio directory
///
/// Root and prefix components are ignored so `/a.mp3` means `audio_dir/a.mp3`.
/// Entries with `..` components never resolve.
pub fn resolve_selected_path(audio_dir: &Path, relative: &str) -> Option<PathBuf> {
    let mut path = audio_dir.to_path_buf();
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) => path.push(part),
            Component::ParentDir => return None,
            Component::RootDir | Component::Prefix(_) | Component::CurDir => {}
        }
    }
    Some(path)
}

/// Resolve the selection against the audio directory
///
/// Keeps selection order and duplicates. Entries that cannot be stat'ed,
/// point outside the audio directory, or are not regular files are dropped
/// without error.
pub fn resolve_entries(audio_dir: &Path, selected_files: &[String]) -> Vec<FeedEntry> {
    selected_files
        .iter()
        .filter_map(|relative| {
            let stat = resolve_selected_path(audio_dir, relative).map(std::fs::metadata);
            let metadata = match stat {
                Some(Ok(metadata)) if metadata.is_file() => metadata,
                _ => {
                    tracing::debug!(path = %relative, "selected file missing, omitted from feed");
                    return None;
                }
            };

            let modified = metadata
                .modified()
                .map(DateTime::<Utc>::from)
                .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);

            Some(FeedEntry {
                relative_path: normalize_separators(relative)
                    .trim_start_matches('/')
                    .to_string(),
                size: metadata.len(),
                modified,
            })
        })
        .collect()
}

fn normalize_separators(path: &str) -> String {
    path.replace('\\', "/")
}

/// Public URL of an audio file: `{base_url}/audio/{relative_path}`
pub fn enclosure_url(base_url: &str, relative_path: &str) -> String {
    format!(
        "{}/audio/{}",
        base_url.trim_end_matches('/'),
        normalize_separators(relative_path)
    )
}

/// Item title: the file name without its extension
pub fn episode_title(relative_path: &str) -> String {
    let normalized = normalize_separators(relative_path);
    let file_name = normalized.rsplit('/').next().unwrap_or_default();

    // Same dot rule as the audio filter: `.mp3` is all extension
    match file_name.rsplit_once('.') {
        Some((stem, _)) => stem.to_string(),
        None => file_name.to_string(),
    }
}

/// `email (author)`, just the email without an author, nothing without an email
fn managing_editor(email: &str, author: &str) -> Option<String> {
    match (email.is_empty(), author.is_empty()) {
        (true, _) => None,
        (false, true) => Some(email.to_string()),
        (false, false) => Some(format!("{email} ({author})")),
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

fn build_item(config: &Config, entry: &FeedEntry) -> Item {
    let url = enclosure_url(&config.base_url, &entry.relative_path);
    let file_name = entry.relative_path.rsplit('/').next().unwrap_or_default();

    let enclosure = EnclosureBuilder::default()
        .url(url.clone())
        .length(entry.size.to_string())
        .mime_type(mime_type_for_path(Path::new(&entry.relative_path)))
        .build();

    let guid = GuidBuilder::default()
        .value(url.clone())
        .permalink(false)
        .build();

    ItemBuilder::default()
        .title(Some(episode_title(&entry.relative_path)))
        .link(Some(url))
        .description(Some(format!("Audiobook: {file_name}")))
        .pub_date(Some(entry.modified.to_rfc2822()))
        .enclosure(Some(enclosure))
        .guid(Some(guid))
        .build()
}

/// Assemble the RSS channel for `config` from already resolved entries
///
/// `now` becomes the channel's publication and build date.
pub fn build_channel(config: &Config, entries: &[FeedEntry], now: DateTime<Utc>) -> Channel {
    let has_image = !config.image_url.is_empty();

    let image = has_image.then(|| {
        ImageBuilder::default()
            .url(config.image_url.clone())
            .title(config.title.clone())
            .link(config.base_url.clone())
            .build()
    });

    let has_owner = !config.author.is_empty() || !config.email.is_empty();
    let owner = has_owner.then(|| {
        ITunesOwnerBuilder::default()
            .name(non_empty(&config.author))
            .email(non_empty(&config.email))
            .build()
    });

    let itunes = ITunesChannelExtensionBuilder::default()
        .author(non_empty(&config.author))
        .owner(owner)
        .image(has_image.then(|| config.image_url.clone()))
        .build();

    let items = entries
        .iter()
        .map(|entry| build_item(config, entry))
        .collect::<Vec<_>>();

    ChannelBuilder::default()
        .title(config.title.clone())
        .link(config.base_url.clone())
        .description(config.description.clone())
        .managing_editor(managing_editor(&config.email, &config.author))
        .pub_date(Some(now.to_rfc2822()))
        .last_build_date(Some(now.to_rfc2822()))
        .image(image)
        .itunes_ext(Some(itunes))
        .items(items)
        .build()
}

/// Render the feed for the current configuration as RSS 2.0 XML
///
/// The selection is re-checked against the filesystem on every call.
pub fn build_feed(config: &Config) -> Result<Vec<u8>, FeedError> {
    build_feed_at(config, Utc::now())
}

/// Same as [`build_feed`], with an explicit render time
pub fn build_feed_at(config: &Config, now: DateTime<Utc>) -> Result<Vec<u8>, FeedError> {
    let entries = resolve_entries(&config.audio_dir, &config.selected_files);
    tracing::debug!(
        selected = config.selected_files.len(),
        included = entries.len(),
        "rendering feed"
    );

    let channel = build_channel(config, &entries, now);
    let xml = channel.write_to(Vec::new())?;
    Ok(xml)
}
