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
use std::collections::HashMap;
use std::path::PathBuf;

use parking_lot::Mutex;

use super::StoreError;

/// Durable storage for raw user sound bytes, keyed by string. The blob store
/// is the source of truth for a user sound across restarts; the decoded
/// buffer in the asset cache is derived from it.
pub enum BlobStore {
    Dir(DirBlobStore),
    Memory(MemoryBlobStore),
}

impl BlobStore {
    /// Opens a directory-backed blob store rooted at `<data_dir>/blobs`.
    pub fn open(data_dir: &std::path::Path) -> Result<BlobStore, StoreError> {
        Ok(BlobStore::Dir(DirBlobStore::open(data_dir.join("blobs"))?))
    }

    /// An in-memory blob store for tests and ephemeral runs.
    pub fn memory() -> BlobStore {
        BlobStore::Memory(MemoryBlobStore::default())
    }

    /// Returns the stored bytes for the key, or None if absent.
    pub async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        match self {
            BlobStore::Dir(store) => store.get(key).await,
            BlobStore::Memory(store) => Ok(store.get(key)),
        }
    }

    /// Stores bytes under the key, overwriting any previous entry.
    pub async fn set(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        match self {
            BlobStore::Dir(store) => store.set(key, bytes).await,
            BlobStore::Memory(store) => {
                store.set(key, bytes);
                Ok(())
            }
        }
    }

    /// Deletes the entry for the key. Deleting an absent key is not an error.
    pub async fn delete(&self, key: &str) -> Result<(), StoreError> {
        match self {
            BlobStore::Dir(store) => store.delete(key).await,
            BlobStore::Memory(store) => {
                store.delete(key);
                Ok(())
            }
        }
    }

    /// Returns true if the store holds an entry for the key.
    pub async fn contains(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.get(key).await?.is_some())
    }
}

/// Blob storage as one file per key under a root directory.
pub struct DirBlobStore {
    root: PathBuf,
}

impl DirBlobStore {
    fn open(root: PathBuf) -> Result<DirBlobStore, StoreError> {
        std::fs::create_dir_all(&root)?;
        Ok(DirBlobStore { root })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.bin", key))
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        match tokio::fs::read(self.path_for(key)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        Ok(tokio::fs::write(self.path_for(key), bytes).await?)
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory blob storage.
#[derive(Default)]
pub struct MemoryBlobStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.entries.lock().get(key).cloned()
    }

    fn set(&self, key: &str, bytes: &[u8]) {
        self.entries.lock().insert(key.to_string(), bytes.to_vec());
    }

    fn delete(&self, key: &str) {
        self.entries.lock().remove(key);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn test_dir_blob_store_roundtrip() -> Result<(), StoreError> {
        let dir = tempfile::tempdir()?;
        let store = BlobStore::open(dir.path())?;

        assert_eq!(store.get("user_pad_Q").await?, None);

        store.set("user_pad_Q", &[1, 2, 3]).await?;
        assert_eq!(store.get("user_pad_Q").await?, Some(vec![1, 2, 3]));
        assert!(store.contains("user_pad_Q").await?);

        // Overwrite in place.
        store.set("user_pad_Q", &[4, 5]).await?;
        assert_eq!(store.get("user_pad_Q").await?, Some(vec![4, 5]));

        store.delete("user_pad_Q").await?;
        assert_eq!(store.get("user_pad_Q").await?, None);

        // Deleting again is fine.
        store.delete("user_pad_Q").await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_memory_blob_store() -> Result<(), StoreError> {
        let store = BlobStore::memory();
        store.set("user_pad_1", &[9]).await?;
        assert_eq!(store.get("user_pad_1").await?, Some(vec![9]));
        store.delete("user_pad_1").await?;
        assert!(!store.contains("user_pad_1").await?);
        Ok(())
    }
}
