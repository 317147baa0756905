// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

mod media;
mod scan;

pub use media::{DEFAULT_MIME_TYPE, is_audio_file, mime_type_for_extension, mime_type_for_path};
pub use scan::{AudioFile, scan_audio_files};
