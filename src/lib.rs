// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

pub mod config;
pub mod error;
pub mod feed;
pub mod library;
pub mod server;

// Re-export main types for convenience
pub use config::{Config, ConfigStore, FeedMetadata, load_config, save_config};
pub use error::{ApiError, ConfigError, FeedError, ScanError};
pub use feed::{build_feed, enclosure_url};
pub use library::{AudioFile, mime_type_for_extension, scan_audio_files};
pub use server::{AppState, router};
