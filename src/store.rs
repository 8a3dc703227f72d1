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

//! Persistence collaborators.
//!
//! Two stores back the instrument: a synchronous, string-keyed settings store
//! for small serialized state (the custom sound mapping and the volume model)
//! and an asynchronous blob store for raw user-uploaded audio bytes.
//!
//! Persistence is read-modify-write with no cross-process coordination. When
//! two processes share the same data directory the last writer wins; there is
//! no merge or versioning.

use std::sync::Arc;

pub mod blob;
pub mod settings;

pub use blob::BlobStore;

/// Errors from the persistence layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Synchronous string-keyed storage for small serialized settings. Reads
/// never block on I/O; writes persist before returning.
pub trait SettingsStore: Send + Sync {
    /// Returns the stored value for the key, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores the value under the key, persisting the change.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Opens the settings store backing the given data directory.
pub fn open_settings(
    data_dir: &std::path::Path,
) -> Result<Arc<dyn SettingsStore>, StoreError> {
    Ok(Arc::new(settings::FileSettings::open(
        data_dir.join("settings.json"),
    )?))
}
