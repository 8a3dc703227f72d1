// Copyright (C) 2026 The padboard authors
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::{error::Error, fmt, sync::Arc};

use crate::assets::DecodedSound;

pub mod cpal;
pub mod mixer;
pub mod mock;

/// Sample rate assumed by outputs that have no real device behind them.
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;

/// An audio output capable of fire-and-forget one-shot playback. Each
/// trigger creates a fresh voice; voices end on their own when the sound
/// runs out. Triggering never blocks on sound completion.
pub trait Output: fmt::Display + Send + Sync {
    /// Starts immediate playback of the sound at the given gain.
    fn trigger(&self, sound: DecodedSound, gain: f32) -> Result<(), Box<dyn Error>>;

    /// The rate sounds should be decoded to for this output.
    fn sample_rate(&self) -> u32;

    #[cfg(test)]
    fn to_mock(&self) -> Result<Arc<mock::Output>, Box<dyn Error>>;
}

/// Lists the output devices known to cpal.
pub fn list_devices() -> Result<Vec<String>, Box<dyn Error>> {
    cpal::Output::list()
}

/// Gets the output with the given name. Names starting with `mock` yield a
/// silent recording output; anything else is resolved through cpal, with
/// None selecting the default device.
pub fn get_output(name: Option<&str>) -> Result<Arc<dyn Output>, Box<dyn Error>> {
    if let Some(name) = name {
        if name.starts_with("mock") {
            return Ok(Arc::new(mock::Output::get(name)));
        }
    }

    Ok(Arc::new(cpal::Output::get(name)?))
}
