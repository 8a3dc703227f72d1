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
// One-shot mixing logic shared by the cpal output and tests.
use parking_lot::Mutex;

use crate::assets::DecodedSound;

/// A single playing one-shot. Voices are created per trigger and dropped
/// when their sound runs out; there is no pooling or reuse.
struct Voice {
    sound: DecodedSound,
    gain: f32,
    /// Current playback position in frames.
    position: usize,
}

impl Voice {
    /// Mixes this voice into an interleaved output buffer, advancing its
    /// position. Returns false once the voice has played out.
    fn mix_into(&mut self, output: &mut [f32], out_channels: u16) -> bool {
        let out_channels = out_channels as usize;
        let src_channels = self.sound.channel_count() as usize;
        let samples = self.sound.samples();
        let total_frames = self.sound.frames();
        let out_frames = output.len() / out_channels;

        for frame in 0..out_frames {
            let src_frame = self.position + frame;
            if src_frame >= total_frames {
                self.position = total_frames;
                return false;
            }

            for channel in 0..out_channels {
                // Mono fans out to every output channel; extra output
                // channels repeat the last source channel.
                let src_channel = channel.min(src_channels - 1);
                let sample = samples[src_frame * src_channels + src_channel];
                output[frame * out_channels + channel] += sample * self.gain;
            }
        }

        self.position += out_frames;
        self.position < total_frames
    }
}

/// Sums active one-shot voices into interleaved output frames.
pub struct OneShotMixer {
    voices: Mutex<Vec<Voice>>,
    channels: u16,
    sample_rate: u32,
}

impl OneShotMixer {
    pub fn new(channels: u16, sample_rate: u32) -> OneShotMixer {
        OneShotMixer {
            voices: Mutex::new(Vec::new()),
            channels,
            sample_rate,
        }
    }

    /// Adds a new voice playing the sound at the given gain.
    pub fn add_voice(&self, sound: DecodedSound, gain: f32) {
        self.voices.lock().push(Voice {
            sound,
            gain,
            position: 0,
        });
    }

    /// Fills the interleaved output buffer with the mix of all active
    /// voices, dropping any that finish.
    pub fn fill(&self, output: &mut [f32]) {
        output.fill(0.0);
        let mut voices = self.voices.lock();
        voices.retain_mut(|voice| voice.mix_into(output, self.channels));
    }

    /// The number of voices still playing.
    pub fn active_voices(&self) -> usize {
        self.voices.lock().len()
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::assets::AssetCache;
    use crate::testutil;

    fn sound(samples: &[f32], channels: u16) -> DecodedSound {
        let cache = AssetCache::new(0);
        let bytes = testutil::wav_bytes(samples, channels, 44100);
        cache
            .decode_and_store("test", &bytes, Some("wav"))
            .expect("decode failed")
    }

    #[test]
    fn test_mono_fans_out_with_gain() {
        let mixer = OneShotMixer::new(2, 44100);
        mixer.add_voice(sound(&[0.5, 0.8], 1), 0.5);

        let mut output = vec![0.0f32; 4];
        mixer.fill(&mut output);

        assert!((output[0] - 0.25).abs() < 1e-6); // Frame 1, left
        assert!((output[1] - 0.25).abs() < 1e-6); // Frame 1, right
        assert!((output[2] - 0.4).abs() < 1e-6); // Frame 2, left
        assert!((output[3] - 0.4).abs() < 1e-6); // Frame 2, right
        assert_eq!(mixer.active_voices(), 0);
    }

    #[test]
    fn test_voices_sum_and_finish() {
        let mixer = OneShotMixer::new(1, 44100);
        mixer.add_voice(sound(&[0.5, 0.5, 0.5, 0.5], 1), 1.0);
        mixer.add_voice(sound(&[0.25, 0.25], 1), 1.0);
        assert_eq!(mixer.active_voices(), 2);

        let mut output = vec![0.0f32; 2];
        mixer.fill(&mut output);
        assert!((output[0] - 0.75).abs() < 1e-6);
        assert!((output[1] - 0.75).abs() < 1e-6);

        // The short voice is done; only the long one remains.
        assert_eq!(mixer.active_voices(), 1);
        mixer.fill(&mut output);
        assert!((output[0] - 0.5).abs() < 1e-6);
        assert_eq!(mixer.active_voices(), 0);

        // Silence once everything has played out.
        mixer.fill(&mut output);
        assert_eq!(output, vec![0.0, 0.0]);
    }

    #[test]
    fn test_stereo_passthrough() {
        let mixer = OneShotMixer::new(2, 44100);
        mixer.add_voice(sound(&[0.5, -0.5, 0.25, -0.25], 2), 1.0);

        let mut output = vec![0.0f32; 4];
        mixer.fill(&mut output);

        assert!((output[0] - 0.5).abs() < 1e-6);
        assert!((output[1] + 0.5).abs() < 1e-6);
        assert!((output[2] - 0.25).abs() < 1e-6);
        assert!((output[3] + 0.25).abs() < 1e-6);
    }
}
