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

//! Test helpers: audio data generation and fault-injecting stores.

use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use hound::{SampleFormat, WavSpec, WavWriter};

use crate::store::settings::MemorySettings;
use crate::store::{SettingsStore, StoreError};

/// An in-memory settings store whose writes can be made to fail, for
/// exercising persistence error paths.
#[derive(Default)]
pub struct FlakySettings {
    inner: MemorySettings,
    fail: AtomicBool,
}

impl FlakySettings {
    pub fn fail_writes(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

impl SettingsStore for FlakySettings {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "settings write failed",
            )));
        }
        self.inner.set(key, value)
    }
}

/// Generates a sine wave at the given frequency.
pub fn sine(frequency: f32, duration_seconds: f32, sample_rate: u32) -> Vec<f32> {
    let sample_count = (sample_rate as f32 * duration_seconds) as usize;
    (0..sample_count)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            0.5 * (2.0 * std::f32::consts::PI * frequency * t).sin()
        })
        .collect()
}

fn spec(channels: u16, sample_rate: u32) -> WavSpec {
    WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    }
}

/// Encodes interleaved f32 samples as WAV bytes.
pub fn wav_bytes(samples: &[f32], channels: u16, sample_rate: u32) -> Vec<u8> {
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer =
            WavWriter::new(&mut cursor, spec(channels, sample_rate)).expect("wav writer failed");
        for sample in samples {
            writer.write_sample(*sample).expect("wav write failed");
        }
        writer.finalize().expect("wav finalize failed");
    }
    cursor.into_inner()
}

/// Writes interleaved f32 samples to a WAV file.
pub fn write_wav(path: &Path, samples: &[f32], channels: u16, sample_rate: u32) {
    let mut writer =
        WavWriter::create(path, spec(channels, sample_rate)).expect("wav create failed");
    for sample in samples {
        writer.write_sample(*sample).expect("wav write failed");
    }
    writer.finalize().expect("wav finalize failed");
}
