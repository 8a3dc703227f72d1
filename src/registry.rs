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

//! The custom sound registry: which sound does each pad currently play.
//!
//! The mapping is persisted under the `customPadSounds` settings key as a
//! JSON object of pad id to sound string, where user sounds carry a `user_`
//! prefix. Pads without an entry fall back to their catalog default, so
//! resolution is always defined for a known pad.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::warn;

use crate::catalog::Pad;
use crate::store::{SettingsStore, StoreError};

/// The settings key the mapping is persisted under.
const SETTINGS_KEY: &str = "customPadSounds";

/// The prefix that marks a persisted sound string as user-uploaded.
const USER_PREFIX: &str = "user_";

/// A resolved reference to the audio a pad plays: either a builtin sound by
/// name, or a user-uploaded sound by its blob store key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SoundRef {
    Builtin(String),
    User(String),
}

impl SoundRef {
    /// Derives the blob store key for a pad's user sound. The key depends
    /// only on the pad id, so re-uploading overwrites the same entry.
    pub fn user_for(pad: &Pad) -> SoundRef {
        SoundRef::User(format!("{}{}", USER_PREFIX, pad.id))
    }

    /// Parses the persisted string form.
    pub fn parse(value: &str) -> SoundRef {
        if value.starts_with(USER_PREFIX) {
            SoundRef::User(value.to_string())
        } else {
            SoundRef::Builtin(value.to_string())
        }
    }

    /// The string under which this sound's decoded buffer is cached. Also
    /// the persisted form.
    pub fn key(&self) -> &str {
        match self {
            SoundRef::Builtin(name) => name,
            SoundRef::User(key) => key,
        }
    }

    /// Returns true for user-uploaded sounds.
    pub fn is_user(&self) -> bool {
        matches!(self, SoundRef::User(_))
    }
}

impl fmt::Display for SoundRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// The pad to sound mapping, authoritative for what each pad plays.
pub struct Registry {
    settings: Arc<dyn SettingsStore>,
    entries: RwLock<HashMap<String, SoundRef>>,
}

impl Registry {
    /// Loads the registry from settings storage. Missing or corrupt data
    /// yields an empty mapping; loading never fails.
    pub fn load(settings: Arc<dyn SettingsStore>) -> Registry {
        let entries = match settings.get(SETTINGS_KEY) {
            Some(serialized) => {
                match serde_json::from_str::<HashMap<String, String>>(&serialized) {
                    Ok(raw) => raw
                        .into_iter()
                        .map(|(pad_id, value)| (pad_id, SoundRef::parse(&value)))
                        .collect(),
                    Err(e) => {
                        warn!(error = %e, "Custom sound mapping is corrupt, using defaults");
                        HashMap::new()
                    }
                }
            }
            None => HashMap::new(),
        };

        Registry {
            settings,
            entries: RwLock::new(entries),
        }
    }

    /// Resolves the sound a pad currently plays: its registry entry if
    /// present, else the catalog default. Synchronous and always defined.
    pub fn resolve(&self, pad: &Pad) -> SoundRef {
        self.entries
            .read()
            .get(pad.id)
            .cloned()
            .unwrap_or_else(|| SoundRef::Builtin(pad.default_sound.to_string()))
    }

    /// Returns true if the pad currently plays a user-uploaded sound.
    pub fn is_custom(&self, pad: &Pad) -> bool {
        self.entries
            .read()
            .get(pad.id)
            .is_some_and(|sound| sound.is_user())
    }

    /// Assigns a sound to a pad and persists the mapping. A failed persist
    /// restores the previous entry; the mapping never claims a sound that
    /// didn't make it to storage.
    pub fn set(&self, pad: &Pad, sound: SoundRef) -> Result<(), StoreError> {
        let mut entries = self.entries.write();
        let previous = entries.insert(pad.id.to_string(), sound);
        if let Err(e) = self.persist(&entries) {
            match previous {
                Some(previous) => entries.insert(pad.id.to_string(), previous),
                None => entries.remove(pad.id),
            };
            return Err(e);
        }
        Ok(())
    }

    /// Removes a pad's entry, reverting it to the catalog default, and
    /// persists the mapping. Returns the removed entry, if any. A failed
    /// persist restores the entry.
    pub fn remove(&self, pad: &Pad) -> Result<Option<SoundRef>, StoreError> {
        let mut entries = self.entries.write();
        let removed = entries.remove(pad.id);
        if let Err(e) = self.persist(&entries) {
            if let Some(removed) = removed {
                entries.insert(pad.id.to_string(), removed);
            }
            return Err(e);
        }
        Ok(removed)
    }

    /// All user sound entries, for startup hydration.
    pub fn user_entries(&self) -> Vec<(String, SoundRef)> {
        self.entries
            .read()
            .iter()
            .filter(|(_, sound)| sound.is_user())
            .map(|(pad_id, sound)| (pad_id.clone(), sound.clone()))
            .collect()
    }

    fn persist(&self, entries: &HashMap<String, SoundRef>) -> Result<(), StoreError> {
        let raw: HashMap<&str, &str> = entries
            .iter()
            .map(|(pad_id, sound)| (pad_id.as_str(), sound.key()))
            .collect();
        self.settings.set(SETTINGS_KEY, &serde_json::to_string(&raw)?)
    }
}
