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
use std::io::Cursor;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::default::{get_codecs, get_probe};

use super::error::DecodeError;
use super::DecodedSound;

/// Decodes a complete audio stream (OGG, WAV, MP3, FLAC, ...) from raw bytes
/// into interleaved f32 PCM. The whole stream is decoded up front; sounds
/// here are short one-shots.
pub fn decode_bytes(bytes: &[u8], extension_hint: Option<&str>) -> Result<DecodedSound, DecodeError> {
    let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes.to_vec())), Default::default());

    let mut hint = Hint::new();
    if let Some(extension) = extension_hint {
        hint.with_extension(extension);
    }

    let fmt_opts: FormatOptions = Default::default();
    let meta_opts: MetadataOptions = Default::default();
    let probed = get_probe()
        .format(&hint, mss, &fmt_opts, &meta_opts)
        .map_err(DecodeError::UnrecognizedFormat)?;
    let mut format_reader = probed.format;

    let track = format_reader
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or(DecodeError::MissingStreamInfo("audio track"))?;
    let track_id = track.id;

    let decoder_opts: DecoderOptions = Default::default();
    let mut decoder = get_codecs()
        .make(&track.codec_params, &decoder_opts)
        .map_err(DecodeError::Decode)?;

    let mut samples: Vec<f32> = Vec::new();
    let mut sample_buf: Option<SampleBuffer<f32>> = None;
    let mut channels: u16 = 0;
    let mut sample_rate: u32 = 0;

    loop {
        let packet = match format_reader.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::ResetRequired) => {
                decoder.reset();
                continue;
            }
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            // Some decoders report EOF as a decode error on the final read.
            Err(SymphoniaError::DecodeError(_)) => break,
            Err(e) => return Err(DecodeError::Decode(e)),
        };
        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::ResetRequired) => {
                decoder.reset();
                continue;
            }
            Err(e) => return Err(DecodeError::Decode(e)),
        };

        let spec = *decoded.spec();
        if channels == 0 {
            channels = spec.channels.count() as u16;
            sample_rate = spec.rate;
        }

        // (Re)allocate the conversion buffer if this packet is larger than
        // anything seen so far.
        let needs_realloc = sample_buf
            .as_ref()
            .map(|buf| buf.capacity() < decoded.capacity())
            .unwrap_or(true);
        if needs_realloc {
            sample_buf = Some(SampleBuffer::new(decoded.capacity() as u64, spec));
        }

        let buf = sample_buf.as_mut().ok_or(DecodeError::Empty)?;
        buf.copy_interleaved_ref(decoded);
        samples.extend_from_slice(buf.samples());
    }

    if channels == 0 || sample_rate == 0 || samples.is_empty() {
        return Err(DecodeError::Empty);
    }

    Ok(DecodedSound::new(samples, channels, sample_rate))
}

/// Resamples interleaved PCM using linear interpolation. Sufficient quality
/// for short percussive one-shots, and avoids pulling in a full resampler.
pub fn resample_linear(
    samples: &[f32],
    channel_count: u16,
    source_rate: u32,
    target_rate: u32,
) -> Vec<f32> {
    let channels = channel_count.max(1) as usize;
    let ratio = target_rate as f64 / source_rate as f64;
    let source_frames = samples.len() / channels;
    let target_frames = (source_frames as f64 * ratio).ceil() as usize;

    let mut output = Vec::with_capacity(target_frames * channels);
    for target_frame in 0..target_frames {
        let source_pos = target_frame as f64 / ratio;
        let source_frame = source_pos.floor() as usize;
        let frac = source_pos.fract() as f32;

        for channel in 0..channels {
            let idx0 = source_frame * channels + channel;
            let idx1 = (source_frame + 1) * channels + channel;

            let s0 = samples.get(idx0).copied().unwrap_or(0.0);
            let s1 = samples.get(idx1).copied().unwrap_or(s0);

            output.push(s0 + (s1 - s0) * frac);
        }
    }

    output
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::testutil;

    #[test]
    fn test_decode_wav_preserves_samples() -> Result<(), DecodeError> {
        let original = testutil::sine(440.0, 0.1, 44100);
        let bytes = testutil::wav_bytes(&original, 1, 44100);

        let decoded = decode_bytes(&bytes, Some("wav"))?;
        assert_eq!(decoded.channel_count(), 1);
        assert_eq!(decoded.sample_rate(), 44100);
        assert_eq!(decoded.samples().len(), original.len());
        for (got, want) in decoded.samples().iter().zip(original.iter()) {
            assert!((got - want).abs() < 1e-6);
        }
        Ok(())
    }

    #[test]
    fn test_decode_stereo() -> Result<(), DecodeError> {
        // Interleaved stereo: L=0.5, R=-0.5.
        let samples: Vec<f32> = (0..2000)
            .map(|i| if i % 2 == 0 { 0.5 } else { -0.5 })
            .collect();
        let bytes = testutil::wav_bytes(&samples, 2, 48000);

        let decoded = decode_bytes(&bytes, Some("wav"))?;
        assert_eq!(decoded.channel_count(), 2);
        assert_eq!(decoded.sample_rate(), 48000);
        assert_eq!(decoded.frames(), 1000);
        assert!((decoded.samples()[0] - 0.5).abs() < 1e-6);
        assert!((decoded.samples()[1] + 0.5).abs() < 1e-6);
        Ok(())
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(decode_bytes(b"not audio", None).is_err());
        assert!(decode_bytes(&[], None).is_err());
    }

    #[test]
    fn test_resample_linear_lengths() {
        let samples: Vec<f32> = (0..4410).map(|i| (i as f32 / 4410.0).sin()).collect();
        let resampled = resample_linear(&samples, 1, 44100, 48000);
        let expected = (4410.0_f64 * 48000.0 / 44100.0).ceil() as usize;
        assert_eq!(resampled.len(), expected);
    }

    #[test]
    fn test_resample_linear_preserves_channels() {
        let samples = vec![1.0f32, -1.0, 1.0, -1.0, 1.0, -1.0, 1.0, -1.0];
        let resampled = resample_linear(&samples, 2, 44100, 88200);
        assert_eq!(resampled.len() % 2, 0);
        assert!((resampled[0] - 1.0).abs() < 0.1);
        assert!((resampled[1] + 1.0).abs() < 0.1);
    }
}
