// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

mod build;

pub use build::{
    FeedEntry, build_channel, build_feed, build_feed_at, enclosure_url, episode_title,
    resolve_entries, resolve_selected_path,
};
