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

//! Two-stage gain: a per-pad volume scaled by a master volume.
//!
//! Both stages are persisted, the master under `masterVolume` and the per-pad
//! map under `padVolumeMap`. Pads absent from the map play at full per-pad
//! volume. All values are clamped to [0, 1] on the way in and on the way out,
//! so a tampered settings file can never drive the gain out of range.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::warn;

use crate::store::{SettingsStore, StoreError};

const MASTER_KEY: &str = "masterVolume";
const PAD_MAP_KEY: &str = "padVolumeMap";

const DEFAULT_MASTER: f32 = 0.8;
const DEFAULT_PAD: f32 = 1.0;

/// The persisted volume state.
pub struct VolumeModel {
    settings: Arc<dyn SettingsStore>,
    master: RwLock<f32>,
    pads: RwLock<HashMap<String, f32>>,
}

impl VolumeModel {
    /// Loads volumes from settings storage. Missing or corrupt values fall
    /// back to defaults; loading never fails.
    pub fn load(settings: Arc<dyn SettingsStore>) -> VolumeModel {
        let master = match settings.get(MASTER_KEY) {
            Some(raw) => match raw.parse::<f32>() {
                Ok(value) => clamp(value),
                Err(e) => {
                    warn!(error = %e, "Master volume is corrupt, using default");
                    DEFAULT_MASTER
                }
            },
            None => DEFAULT_MASTER,
        };

        let pads = match settings.get(PAD_MAP_KEY) {
            Some(raw) => match serde_json::from_str::<HashMap<String, f32>>(&raw) {
                Ok(map) => map
                    .into_iter()
                    .map(|(pad_id, value)| (pad_id, clamp(value)))
                    .collect(),
                Err(e) => {
                    warn!(error = %e, "Pad volume map is corrupt, using defaults");
                    HashMap::new()
                }
            },
            None => HashMap::new(),
        };

        VolumeModel {
            settings,
            master: RwLock::new(master),
            pads: RwLock::new(pads),
        }
    }

    /// The master volume, in [0, 1].
    pub fn master(&self) -> f32 {
        *self.master.read()
    }

    /// Sets and persists the master volume, clamped to [0, 1].
    pub fn set_master(&self, value: f32) -> Result<(), StoreError> {
        let value = clamp(value);
        *self.master.write() = value;
        self.settings.set(MASTER_KEY, &value.to_string())
    }

    /// The volume for a pad, in [0, 1]. Pads without an entry are at 1.
    pub fn pad(&self, pad_id: &str) -> f32 {
        self.pads.read().get(pad_id).copied().unwrap_or(DEFAULT_PAD)
    }

    /// Sets and persists a pad's volume, clamped to [0, 1].
    pub fn set_pad(&self, pad_id: &str, value: f32) -> Result<(), StoreError> {
        let value = clamp(value);
        let mut pads = self.pads.write();
        pads.insert(pad_id.to_string(), value);
        self.settings.set(PAD_MAP_KEY, &serde_json::to_string(&*pads)?)
    }

    /// The gain a pad plays at: pad volume times master volume. Both factors
    /// are already in [0, 1], so the product is too.
    pub fn effective_gain(&self, pad_id: &str) -> f32 {
        clamp(self.pad(pad_id) * self.master())
    }
}

fn clamp(value: f32) -> f32 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::store::settings::MemorySettings;

    #[test]
    fn test_defaults() {
        let volumes = VolumeModel::load(Arc::new(MemorySettings::new()));
        assert_eq!(volumes.master(), 0.8);
        assert_eq!(volumes.pad("pad_Q"), 1.0);
        assert!((volumes.effective_gain("pad_Q") - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_set_and_reload() -> Result<(), StoreError> {
        let settings = Arc::new(MemorySettings::new());
        let volumes = VolumeModel::load(settings.clone());

        volumes.set_master(0.5)?;
        volumes.set_pad("pad_Q", 0.6)?;
        assert!((volumes.effective_gain("pad_Q") - 0.3).abs() < 1e-6);
        assert!((volumes.effective_gain("pad_W") - 0.5).abs() < 1e-6);

        let reloaded = VolumeModel::load(settings);
        assert_eq!(reloaded.master(), 0.5);
        assert_eq!(reloaded.pad("pad_Q"), 0.6);
        Ok(())
    }

    #[test]
    fn test_values_are_clamped() -> Result<(), StoreError> {
        let volumes = VolumeModel::load(Arc::new(MemorySettings::new()));
        volumes.set_master(3.0)?;
        volumes.set_pad("pad_Q", -0.5)?;
        assert_eq!(volumes.master(), 1.0);
        assert_eq!(volumes.pad("pad_Q"), 0.0);
        assert_eq!(volumes.effective_gain("pad_Q"), 0.0);
        Ok(())
    }

    #[test]
    fn test_full_volumes_stay_at_unity() -> Result<(), StoreError> {
        let volumes = VolumeModel::load(Arc::new(MemorySettings::new()));
        volumes.set_master(1.0)?;
        volumes.set_pad("pad_Q", 1.0)?;
        assert_eq!(volumes.effective_gain("pad_Q"), 1.0);
        Ok(())
    }

    #[test]
    fn test_corrupt_values_fall_back() {
        let settings = Arc::new(MemorySettings::new());
        settings.set("masterVolume", "loud").expect("set failed");
        settings.set("padVolumeMap", "[not a map").expect("set failed");

        let volumes = VolumeModel::load(settings);
        assert_eq!(volumes.master(), 0.8);
        assert_eq!(volumes.pad("pad_Q"), 1.0);
    }
}
