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
use std::{error::Error, fmt, sync::Arc, thread};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use parking_lot::Mutex;
use tracing::{error, info};

use crate::assets::DecodedSound;
use crate::audio::mixer::OneShotMixer;

/// A cpal-backed audio output. The output stream is created lazily on the
/// first trigger and lives for the rest of the process; cpal streams are not
/// Send, so the stream is owned by a dedicated thread.
pub struct Output {
    /// The configured device name; None selects the host default.
    device_name: Option<String>,
    /// The resolved name, for display.
    resolved_name: String,
    channels: u16,
    sample_rate: u32,
    mixer: Arc<OneShotMixer>,
    started: Mutex<bool>,
}

impl Output {
    /// Lists the available output devices.
    pub fn list() -> Result<Vec<String>, Box<dyn Error>> {
        let host = cpal::default_host();
        let mut devices = Vec::new();
        for device in host.output_devices()? {
            let name = device.name()?;
            match device.default_output_config() {
                Ok(config) => devices.push(format!(
                    "{} (Channels={}) ({})",
                    name,
                    config.channels(),
                    host.id().name()
                )),
                Err(_) => devices.push(name),
            }
        }
        Ok(devices)
    }

    /// Gets the output for the given device name, or the host default.
    pub fn get(device_name: Option<&str>) -> Result<Output, Box<dyn Error>> {
        let device = find_device(device_name)?;
        let config = device.default_output_config()?;
        let channels = config.channels();
        let sample_rate = config.sample_rate();

        Ok(Output {
            device_name: device_name.map(|name| name.to_string()),
            resolved_name: device.name().unwrap_or_else(|_| "default".to_string()),
            channels,
            sample_rate,
            mixer: Arc::new(OneShotMixer::new(channels, sample_rate)),
            started: Mutex::new(false),
        })
    }

    /// Starts the output stream thread if it isn't running yet.
    fn ensure_started(&self) -> Result<(), Box<dyn Error>> {
        let mut started = self.started.lock();
        if *started {
            return Ok(());
        }

        let device_name = self.device_name.clone();
        let mixer = Arc::clone(&self.mixer);
        let (ready_tx, ready_rx) = crossbeam_channel::bounded::<Result<(), String>>(1);
        thread::spawn(move || run_stream(device_name, mixer, ready_tx));

        ready_rx.recv()?.map_err(|e| -> Box<dyn Error> { e.into() })?;
        *started = true;

        info!(
            device = self.resolved_name,
            channels = self.channels,
            sample_rate = self.sample_rate,
            "Audio output started"
        );
        Ok(())
    }
}

impl crate::audio::Output for Output {
    fn trigger(&self, sound: DecodedSound, gain: f32) -> Result<(), Box<dyn Error>> {
        self.ensure_started()?;
        self.mixer.add_voice(sound, gain);
        Ok(())
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    #[cfg(test)]
    fn to_mock(&self) -> Result<Arc<crate::audio::mock::Output>, Box<dyn Error>> {
        Err("not a mock output".into())
    }
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (Channels={})", self.resolved_name, self.channels)
    }
}

fn find_device(device_name: Option<&str>) -> Result<cpal::Device, Box<dyn Error>> {
    let host = cpal::default_host();
    match device_name {
        Some(name) => {
            for device in host.output_devices()? {
                if device.name()? == name {
                    return Ok(device);
                }
            }
            Err(format!("no output device named {}", name).into())
        }
        None => host
            .default_output_device()
            .ok_or_else(|| "no default output device".into()),
    }
}

/// Builds and owns the output stream for the lifetime of the process. Runs
/// on its own thread; reports startup success or failure through the
/// channel, then parks forever keeping the stream alive.
fn run_stream(
    device_name: Option<String>,
    mixer: Arc<OneShotMixer>,
    ready_tx: crossbeam_channel::Sender<Result<(), String>>,
) {
    let stream = match build_stream(device_name.as_deref(), mixer) {
        Ok(stream) => stream,
        Err(e) => {
            let _ = ready_tx.send(Err(e.to_string()));
            return;
        }
    };

    if let Err(e) = stream.play() {
        let _ = ready_tx.send(Err(e.to_string()));
        return;
    }
    let _ = ready_tx.send(Ok(()));

    loop {
        thread::park();
    }
}

fn build_stream(
    device_name: Option<&str>,
    mixer: Arc<OneShotMixer>,
) -> Result<cpal::Stream, Box<dyn Error>> {
    let device = find_device(device_name)?;
    let supported = device.default_output_config()?;
    let config: cpal::StreamConfig = supported.config();

    let err_fn = |e| error!(error = %e, "Audio stream error");

    let stream = match supported.sample_format() {
        cpal::SampleFormat::F32 => device.build_output_stream(
            &config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                mixer.fill(data);
            },
            err_fn,
            None,
        )?,
        cpal::SampleFormat::I16 => build_converting_stream::<i16>(&device, &config, mixer)?,
        cpal::SampleFormat::U16 => build_converting_stream::<u16>(&device, &config, mixer)?,
        format => return Err(format!("unsupported sample format {:?}", format).into()),
    };

    Ok(stream)
}

/// Integer formats: mix into a scratch f32 buffer, then convert.
fn build_converting_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    mixer: Arc<OneShotMixer>,
) -> Result<cpal::Stream, Box<dyn Error>>
where
    T: cpal::SizedSample + cpal::FromSample<f32>,
{
    let err_fn = |e| error!(error = %e, "Audio stream error");
    let mut scratch: Vec<f32> = Vec::new();

    Ok(device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            scratch.resize(data.len(), 0.0);
            mixer.fill(&mut scratch);
            for (dst, src) in data.iter_mut().zip(scratch.iter()) {
                *dst = T::from_sample(*src);
            }
        },
        err_fn,
        None,
    )?)
}
