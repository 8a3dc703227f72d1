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

//! The playback engine.
//!
//! `Instrument` ties the registry, asset cache, volumes, blob store and audio
//! output together behind one explicitly passed handle. Everything that plays
//! a pad or changes its sound goes through here; none of the parts reach each
//! other through globals.

use std::error::Error;
use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::assets::{AssetCache, AssetError};
use crate::audio::Output;
use crate::catalog::{self, Pad};
use crate::registry::{Registry, SoundRef};
use crate::store::{BlobStore, SettingsStore};
use crate::volume::VolumeModel;

pub struct Instrument {
    registry: Registry,
    cache: Arc<AssetCache>,
    volumes: VolumeModel,
    blobs: Arc<BlobStore>,
    output: Arc<dyn Output>,
}

impl Instrument {
    /// Assembles an instrument from its storage backends and audio output.
    /// The asset cache decodes to the output's sample rate.
    pub fn new(
        settings: Arc<dyn SettingsStore>,
        blobs: BlobStore,
        output: Arc<dyn Output>,
    ) -> Instrument {
        Instrument {
            registry: Registry::load(settings.clone()),
            cache: Arc::new(AssetCache::new(output.sample_rate())),
            volumes: VolumeModel::load(settings),
            blobs: Arc::new(blobs),
            output,
        }
    }

    /// Loads every sound the instrument can play: the builtin catalog from
    /// the sounds directory and any stored user sounds. Individual load
    /// failures leave that pad silent and are already logged.
    pub async fn load_sounds(&self, sounds_dir: &Path) {
        self.cache.preload_builtins(sounds_dir).await;
        self.cache
            .hydrate_user_sounds(&self.registry, &self.blobs)
            .await;
    }

    /// Plays a pad's current sound at its effective gain, fire and forget.
    /// A pad whose sound isn't in the cache plays nothing.
    pub fn play(&self, pad: &Pad) -> Result<(), Box<dyn Error>> {
        let sound_ref = self.registry.resolve(pad);
        let Some(sound) = self.cache.get(sound_ref.key()) else {
            warn!(pad = pad.id, sound = %sound_ref, "No decoded sound for pad, ignoring trigger");
            return Ok(());
        };

        let gain = self.volumes.effective_gain(pad.id);
        self.output.trigger(sound, gain)
    }

    /// Assigns a builtin sound to a pad. Fails if the name isn't in the
    /// catalog; nothing is changed in that case.
    pub fn set_builtin_sound(&self, pad: &Pad, name: &str) -> Result<(), AssetError> {
        if !catalog::is_builtin(name) {
            return Err(AssetError::UnknownSound(name.to_string()));
        }
        self.registry.set(pad, SoundRef::Builtin(name.to_string()))?;
        info!(pad = pad.id, sound = name, "Pad sound set");
        Ok(())
    }

    /// Assigns uploaded audio bytes to a pad: decode, persist the raw bytes,
    /// cache the decoded buffer, then point the registry at it. A failure at
    /// any step leaves the pad playing what it played before.
    pub async fn set_user_sound(
        &self,
        pad: &Pad,
        bytes: &[u8],
        extension_hint: Option<&str>,
    ) -> Result<(), AssetError> {
        let sound_ref = SoundRef::user_for(pad);
        let key = sound_ref.key();

        let decoded = self.cache.decode(bytes, extension_hint)?;
        self.blobs.set(key, bytes).await?;
        self.cache.insert(key, decoded);
        self.registry.set(pad, sound_ref.clone())?;

        info!(pad = pad.id, sound = %sound_ref, bytes = bytes.len(), "User sound uploaded");
        Ok(())
    }

    /// Reverts a pad to its catalog default, deleting any stored user sound
    /// and its cached buffer. The blob goes first: if the delete fails the
    /// registry entry is untouched and the reset can be retried. Resetting
    /// an unmodified pad is a no-op.
    pub async fn reset_pad(&self, pad: &Pad) -> Result<(), AssetError> {
        if self.registry.is_custom(pad) {
            let sound_ref = SoundRef::user_for(pad);
            let key = sound_ref.key();
            self.blobs.delete(key).await?;
            self.cache.evict(key);
            info!(pad = pad.id, "Pad reset, user sound deleted");
        }
        self.registry.remove(pad)?;
        Ok(())
    }

    /// Returns true if the pad currently plays a user-uploaded sound.
    pub fn has_custom_sound(&self, pad: &Pad) -> bool {
        self.registry.is_custom(pad)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn cache(&self) -> &Arc<AssetCache> {
        &self.cache
    }

    pub fn volumes(&self) -> &VolumeModel {
        &self.volumes
    }

    pub fn output(&self) -> &Arc<dyn Output> {
        &self.output
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::audio;
    use crate::store::settings::MemorySettings;
    use crate::testutil;

    fn instrument() -> (Instrument, Arc<audio::mock::Output>) {
        let output = audio::get_output(Some("mock")).expect("mock output failed");
        let instrument = Instrument::new(
            Arc::new(MemorySettings::new()),
            BlobStore::memory(),
            output,
        );
        let mock = instrument.output().to_mock().expect("not a mock output");
        (instrument, mock)
    }

    fn pad(id: &str) -> &'static Pad {
        catalog::get(id).expect("unknown pad")
    }

    fn wav(frequency: f32) -> Vec<u8> {
        testutil::wav_bytes(&testutil::sine(frequency, 0.1, 44100), 1, 44100)
    }

    #[test]
    fn test_play_applies_effective_gain() -> Result<(), Box<dyn Error>> {
        let (instrument, mock) = instrument();
        instrument
            .cache()
            .decode_and_store("Snare", &wav(200.0), Some("wav"))?;

        instrument.volumes().set_pad("pad_Q", 0.5)?;
        instrument.volumes().set_master(0.6)?;
        instrument.play(pad("pad_Q"))?;

        let triggers = mock.triggers();
        assert_eq!(triggers.len(), 1);
        assert!((triggers[0].gain - 0.3).abs() < 1e-6);
        Ok(())
    }

    #[test]
    fn test_play_without_decoded_sound_is_silent() -> Result<(), Box<dyn Error>> {
        let (instrument, mock) = instrument();
        instrument.play(pad("pad_Q"))?;
        assert_eq!(mock.trigger_count(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_upload_play_and_reset() -> Result<(), Box<dyn Error>> {
        let (instrument, mock) = instrument();
        let pad_q = pad("pad_Q");

        instrument
            .set_user_sound(pad_q, &wav(300.0), Some("wav"))
            .await?;
        assert!(instrument.has_custom_sound(pad_q));
        assert_eq!(
            instrument.registry().resolve(pad_q),
            SoundRef::User("user_pad_Q".to_string())
        );
        assert!(instrument.cache().get("user_pad_Q").is_some());

        instrument.play(pad_q)?;
        assert_eq!(mock.trigger_count(), 1);

        instrument.reset_pad(pad_q).await?;
        assert!(!instrument.has_custom_sound(pad_q));
        assert_eq!(
            instrument.registry().resolve(pad_q),
            SoundRef::Builtin("Snare".to_string())
        );
        assert!(instrument.cache().get("user_pad_Q").is_none());

        // The default isn't in the cache here, so the pad is silent.
        instrument.play(pad_q)?;
        assert_eq!(mock.trigger_count(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_upload_changes_nothing() {
        let (instrument, _) = instrument();
        let pad_q = pad("pad_Q");

        let result = instrument
            .set_user_sound(pad_q, b"definitely not audio", None)
            .await;
        assert!(matches!(result, Err(AssetError::Decode(_))));
        assert!(!instrument.has_custom_sound(pad_q));
        assert!(instrument.cache().get("user_pad_Q").is_none());
    }

    #[test]
    fn test_set_builtin_sound_validates_name() {
        let (instrument, _) = instrument();
        let pad_q = pad("pad_Q");

        let result = instrument.set_builtin_sound(pad_q, "NotASound");
        assert!(matches!(result, Err(AssetError::UnknownSound(_))));
        assert_eq!(
            instrument.registry().resolve(pad_q),
            SoundRef::Builtin("Snare".to_string())
        );

        instrument
            .set_builtin_sound(pad_q, "Timbal")
            .expect("set failed");
        assert_eq!(
            instrument.registry().resolve(pad_q),
            SoundRef::Builtin("Timbal".to_string())
        );
    }

    #[tokio::test]
    async fn test_reset_with_failing_persist_keeps_entry() -> Result<(), Box<dyn Error>> {
        let output = audio::get_output(Some("mock"))?;
        let settings = Arc::new(crate::testutil::FlakySettings::default());
        let instrument = Instrument::new(settings.clone(), BlobStore::memory(), output);
        let pad_q = pad("pad_Q");

        instrument
            .set_user_sound(pad_q, &wav(300.0), Some("wav"))
            .await?;

        // The blob and buffer go before the registry entry, so a failed
        // persist leaves the entry in place for a retry; the pad is silent
        // in the meantime.
        settings.fail_writes(true);
        assert!(instrument.reset_pad(pad_q).await.is_err());
        assert!(instrument.has_custom_sound(pad_q));
        assert!(instrument.cache().get("user_pad_Q").is_none());

        settings.fail_writes(false);
        instrument.reset_pad(pad_q).await?;
        assert!(!instrument.has_custom_sound(pad_q));
        assert_eq!(
            instrument.registry().resolve(pad_q),
            SoundRef::Builtin("Snare".to_string())
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_reset_unmodified_pad_is_noop() -> Result<(), Box<dyn Error>> {
        let (instrument, _) = instrument();
        instrument.reset_pad(pad("pad_Q")).await?;
        assert_eq!(
            instrument.registry().resolve(pad("pad_Q")),
            SoundRef::Builtin("Snare".to_string())
        );
        Ok(())
    }
}
