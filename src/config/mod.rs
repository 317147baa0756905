// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

mod settings;
mod store;

pub(crate) use settings::null_as_default;
pub use settings::{
    Config, FeedMetadata, init_config, load_config, load_or_init_config, save_config,
};
pub use store::ConfigStore;
