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

//! The audio asset cache.
//!
//! Sounds are decoded once, entirely into memory, for zero-latency triggering.
//! Builtins are preloaded concurrently at startup; user sounds are hydrated
//! from the blob store or decoded at upload time. A missing or malformed
//! sound leaves its slot empty and the rest of the batch intact: a pad whose
//! sound failed to load plays nothing until fixed, and nothing else breaks.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::catalog;
use crate::registry::Registry;
use crate::store::BlobStore;

mod decoder;
pub mod error;

pub use error::{AssetError, DecodeError};

/// Extensions probed for bundled sound files, in order.
const BUILTIN_EXTENSIONS: [&str; 3] = ["ogg", "wav", "mp3"];

/// A decoded, ready-to-play sound. The PCM data is interleaved f32 shared
/// through an Arc, so cloning is cheap and playback voices can hold the data
/// without copying.
#[derive(Clone)]
pub struct DecodedSound {
    data: Arc<Vec<f32>>,
    channel_count: u16,
    sample_rate: u32,
}

impl DecodedSound {
    fn new(data: Vec<f32>, channel_count: u16, sample_rate: u32) -> DecodedSound {
        DecodedSound {
            data: Arc::new(data),
            channel_count,
            sample_rate,
        }
    }

    /// The interleaved PCM samples.
    pub fn samples(&self) -> &[f32] {
        &self.data
    }

    /// Number of interleaved channels.
    pub fn channel_count(&self) -> u16 {
        self.channel_count
    }

    /// Sample rate of the PCM data.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of frames (samples per channel).
    pub fn frames(&self) -> usize {
        self.data.len() / self.channel_count.max(1) as usize
    }

    /// Playback duration.
    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.frames() as f64 / self.sample_rate as f64)
    }

    /// Memory used by the PCM data in bytes.
    pub fn memory_size(&self) -> usize {
        self.data.len() * std::mem::size_of::<f32>()
    }
}

/// Cache of decoded sounds, keyed by sound key (builtin name or user key).
pub struct AssetCache {
    sounds: RwLock<HashMap<String, DecodedSound>>,
    /// Output sample rate; sounds are resampled to this at decode time.
    target_sample_rate: u32,
}

impl AssetCache {
    pub fn new(target_sample_rate: u32) -> AssetCache {
        AssetCache {
            sounds: RwLock::new(HashMap::new()),
            target_sample_rate,
        }
    }

    /// Synchronous lookup; never blocks on I/O or decoding. Returns None for
    /// sounds that failed to load or have not been loaded yet.
    pub fn get(&self, key: &str) -> Option<DecodedSound> {
        self.sounds.read().get(key).cloned()
    }

    /// Decodes raw audio bytes and resamples them to the output rate, without
    /// touching the cache. Malformed input fails with a `DecodeError`.
    pub fn decode(
        &self,
        bytes: &[u8],
        extension_hint: Option<&str>,
    ) -> Result<DecodedSound, DecodeError> {
        let decoded = decoder::decode_bytes(bytes, extension_hint)?;
        let decoded = self.resample(decoded);

        debug!(
            channels = decoded.channel_count(),
            sample_rate = decoded.sample_rate(),
            duration_ms = decoded.duration().as_millis(),
            memory_kb = decoded.memory_size() / 1024,
            "Sound decoded"
        );
        Ok(decoded)
    }

    /// Stores an already decoded sound under the key.
    pub fn insert(&self, key: &str, sound: DecodedSound) {
        self.sounds.write().insert(key.to_string(), sound);
    }

    /// Decodes raw audio bytes, resamples them to the output rate and stores
    /// the result under the key. Malformed input fails with a `DecodeError`
    /// and leaves the cache untouched.
    pub fn decode_and_store(
        &self,
        key: &str,
        bytes: &[u8],
        extension_hint: Option<&str>,
    ) -> Result<DecodedSound, DecodeError> {
        let decoded = self.decode(bytes, extension_hint)?;
        self.insert(key, decoded.clone());
        Ok(decoded)
    }

    /// Removes a cached sound. Used when a pad is reset.
    pub fn evict(&self, key: &str) {
        self.sounds.write().remove(key);
    }

    /// Total memory used by cached PCM data.
    pub fn total_memory(&self) -> usize {
        self.sounds
            .read()
            .values()
            .map(|sound| sound.memory_size())
            .sum()
    }

    /// Loads every builtin sound from the sounds directory, concurrently.
    /// Individual failures are logged and leave that slot absent; the rest
    /// of the catalog stays usable.
    pub async fn preload_builtins(self: &Arc<Self>, sounds_dir: &Path) {
        let mut tasks = JoinSet::new();
        for name in catalog::BUILTIN_SOUNDS {
            let cache = Arc::clone(self);
            let sounds_dir = sounds_dir.to_path_buf();
            tasks.spawn(async move {
                if let Err(e) = cache.load_builtin(&sounds_dir, name).await {
                    warn!(sound = name, error = %e, "Failed to load builtin sound");
                }
            });
        }
        while tasks.join_next().await.is_some() {}

        info!(
            loaded = self.sounds.read().len(),
            total = catalog::BUILTIN_SOUNDS.len(),
            memory_kb = self.total_memory() / 1024,
            "Builtin sounds loaded"
        );
    }

    /// Loads every user sound referenced by the registry from the blob store,
    /// concurrently. A missing or malformed blob logs a warning and leaves
    /// that pad silent until it is re-uploaded or reset.
    pub async fn hydrate_user_sounds(
        self: &Arc<Self>,
        registry: &Registry,
        blobs: &Arc<BlobStore>,
    ) {
        let mut tasks = JoinSet::new();
        for (pad_id, sound) in registry.user_entries() {
            let cache = Arc::clone(self);
            let blobs = Arc::clone(blobs);
            tasks.spawn(async move {
                let key = sound.key();
                match blobs.get(key).await {
                    Ok(Some(bytes)) => {
                        if let Err(e) = cache.decode_and_store(key, &bytes, None) {
                            warn!(pad = %pad_id, key, error = %e, "Stored user sound is malformed");
                        }
                    }
                    Ok(None) => {
                        warn!(pad = %pad_id, key, "User sound missing from blob store");
                    }
                    Err(e) => {
                        warn!(pad = %pad_id, key, error = %e, "Failed to read user sound");
                    }
                }
            });
        }
        while tasks.join_next().await.is_some() {}
    }

    async fn load_builtin(&self, sounds_dir: &Path, name: &str) -> Result<(), AssetError> {
        let (path, extension) = builtin_path(sounds_dir, name)
            .await
            .ok_or_else(|| AssetError::NotFound(name.to_string()))?;
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(crate::store::StoreError::from)?;
        self.decode_and_store(name, &bytes, Some(extension))?;
        Ok(())
    }

    fn resample(&self, sound: DecodedSound) -> DecodedSound {
        if self.target_sample_rate == 0 || sound.sample_rate() == self.target_sample_rate {
            return sound;
        }
        let resampled = decoder::resample_linear(
            sound.samples(),
            sound.channel_count(),
            sound.sample_rate(),
            self.target_sample_rate,
        );
        DecodedSound::new(resampled, sound.channel_count(), self.target_sample_rate)
    }
}

impl std::fmt::Debug for AssetCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetCache")
            .field("sounds", &self.sounds.read().len())
            .field("target_sample_rate", &self.target_sample_rate)
            .field("memory_kb", &(self.total_memory() / 1024))
            .finish()
    }
}

/// Finds the file for a builtin sound by probing known extensions.
async fn builtin_path(sounds_dir: &Path, name: &str) -> Option<(PathBuf, &'static str)> {
    for extension in BUILTIN_EXTENSIONS {
        let path = sounds_dir.join(format!("{}.{}", name, extension));
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Some((path, extension));
        }
    }
    None
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::registry::SoundRef;
    use crate::store::settings::MemorySettings;
    use crate::testutil;

    #[test]
    fn test_decode_and_store() -> Result<(), DecodeError> {
        let cache = AssetCache::new(0);
        let bytes = testutil::wav_bytes(&testutil::sine(440.0, 0.6, 44100), 1, 44100);

        assert!(cache.get("Snare").is_none());
        let decoded = cache.decode_and_store("Snare", &bytes, Some("wav"))?;
        assert_eq!(decoded.channel_count(), 1);
        assert_eq!(decoded.sample_rate(), 44100);
        assert!(decoded.frames() > 0);

        let cached = cache.get("Snare").expect("sound not cached");
        assert_eq!(cached.frames(), decoded.frames());

        cache.evict("Snare");
        assert!(cache.get("Snare").is_none());
        Ok(())
    }

    #[test]
    fn test_decode_malformed_bytes_fails() {
        let cache = AssetCache::new(44100);
        let result = cache.decode_and_store("bad", b"this is not audio data at all", None);
        assert!(result.is_err());
        assert!(cache.get("bad").is_none());
    }

    #[test]
    fn test_resamples_to_target_rate() -> Result<(), DecodeError> {
        let cache = AssetCache::new(48000);
        let bytes = testutil::wav_bytes(&testutil::sine(440.0, 0.5, 44100), 1, 44100);

        let decoded = cache.decode_and_store("Snare", &bytes, Some("wav"))?;
        assert_eq!(decoded.sample_rate(), 48000);
        // Duration is preserved across the resample.
        let duration = decoded.duration().as_secs_f64();
        assert!((duration - 0.5).abs() < 0.01, "duration was {}", duration);
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_preload_builtins_skips_missing() {
        let dir = tempfile::tempdir().expect("tempdir failed");
        testutil::write_wav(
            &dir.path().join("Snare.wav"),
            &testutil::sine(200.0, 0.1, 44100),
            1,
            44100,
        );
        testutil::write_wav(
            &dir.path().join("Kick_thick.wav"),
            &testutil::sine(60.0, 0.1, 44100),
            1,
            44100,
        );
        // A present but malformed file must not abort the batch.
        std::fs::write(dir.path().join("Conga.ogg"), b"garbage").expect("write failed");

        let cache = Arc::new(AssetCache::new(44100));
        cache.preload_builtins(dir.path()).await;

        assert!(cache.get("Snare").is_some());
        assert!(cache.get("Kick_thick").is_some());
        assert!(cache.get("Conga").is_none());
        assert!(cache.get("Timbal").is_none());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_hydrate_user_sounds() {
        let settings = Arc::new(MemorySettings::new());
        let registry = Registry::load(settings);
        let blobs = Arc::new(BlobStore::memory());

        let pad_q = crate::catalog::get("pad_Q").expect("pad_Q missing");
        let pad_w = crate::catalog::get("pad_W").expect("pad_W missing");
        registry
            .set(pad_q, SoundRef::user_for(pad_q))
            .expect("set failed");
        registry
            .set(pad_w, SoundRef::user_for(pad_w))
            .expect("set failed");

        // pad_Q has stored bytes; pad_W's blob is missing.
        let bytes = testutil::wav_bytes(&testutil::sine(300.0, 0.1, 44100), 1, 44100);
        blobs.set("user_pad_Q", &bytes).await.expect("set failed");

        let cache = Arc::new(AssetCache::new(44100));
        cache.hydrate_user_sounds(&registry, &blobs).await;

        assert!(cache.get("user_pad_Q").is_some());
        assert!(cache.get("user_pad_W").is_none());
    }
}
