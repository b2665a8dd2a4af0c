//! Decode an uploaded audio blob of unknown container format and transcode
//! it to an in-memory 16 kHz mono 16-bit PCM WAV, the canonical waveform the
//! recognizer consumes.

use std::io::Cursor;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use thiserror::Error;
use tracing::{debug, warn};

pub const TARGET_SAMPLE_RATE: u32 = 16_000;

#[derive(Debug, Error)]
#[error("{0}")]
pub struct AudioError(String);

impl AudioError {
    fn new(stage: &str, detail: impl std::fmt::Display) -> Self {
        Self(format!("{}: {}", stage, detail))
    }
}

/// Sniff, decode, downmix, resample and re-encode in one pass. CPU-bound;
/// callers on the async runtime should run this on the blocking pool.
pub fn transcode_to_wav(data: &[u8]) -> Result<Vec<u8>, AudioError> {
    let (samples, source_rate) = decode_to_mono(data)?;

    let samples = if source_rate != TARGET_SAMPLE_RATE {
        resample(&samples, source_rate, TARGET_SAMPLE_RATE)?
    } else {
        samples
    };

    debug!(
        samples = samples.len(),
        duration_secs = samples.len() as f32 / TARGET_SAMPLE_RATE as f32,
        "transcoded upload to 16kHz mono WAV"
    );

    encode_wav(&samples)
}

/// Decode the default audio track to interleaved mono f32 samples, returning
/// the source sample rate. The container format is probed from the bytes
/// alone; no extension hint is available for an upload.
fn decode_to_mono(data: &[u8]) -> Result<(Vec<f32>, u32), AudioError> {
    let cursor = Cursor::new(data.to_vec());
    let mss = MediaSourceStream::new(Box::new(cursor), Default::default());

    let probed = symphonia::default::get_probe()
        .format(
            &Hint::new(),
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| AudioError::new("probe", e))?;

    let mut format = probed.format;

    let track = format
        .default_track()
        .ok_or_else(|| AudioError::new("probe", "no audio track found"))?;
    let track_id = track.id;
    let codec_params = track.codec_params.clone();
    let source_rate = codec_params
        .sample_rate
        .ok_or_else(|| AudioError::new("probe", "unknown sample rate"))?;
    let channels = codec_params.channels.map(|c| c.count()).unwrap_or(1);

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|e| AudioError::new("codec", e))?;

    let mut samples: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(symphonia::core::errors::Error::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => return Err(AudioError::new("packet", e)),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(symphonia::core::errors::Error::DecodeError(e)) => {
                warn!(error = %e, "skipping corrupt audio frame");
                continue;
            }
            Err(e) => return Err(AudioError::new("decode", e)),
        };

        let spec = *decoded.spec();
        let frames = decoded.frames();
        if frames == 0 {
            continue;
        }

        let mut sample_buf = SampleBuffer::<f32>::new(frames as u64, spec);
        sample_buf.copy_interleaved_ref(decoded);
        let interleaved = sample_buf.samples();

        if channels > 1 {
            for frame in interleaved.chunks(channels) {
                samples.push(frame.iter().sum::<f32>() / channels as f32);
            }
        } else {
            samples.extend_from_slice(interleaved);
        }
    }

    if samples.is_empty() {
        return Err(AudioError::new("decode", "no audio samples decoded"));
    }

    Ok((samples, source_rate))
}

fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>, AudioError> {
    use rubato::{
        Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
    };

    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let ratio = to_rate as f64 / from_rate as f64;
    let chunk_size = 1024;

    let mut resampler = SincFixedIn::<f32>::new(ratio, 2.0, params, chunk_size, 1)
        .map_err(|e| AudioError::new("resampler init", e))?;

    let mut output = Vec::with_capacity((samples.len() as f64 * ratio) as usize + chunk_size);

    for chunk in samples.chunks(chunk_size) {
        let input = if chunk.len() < chunk_size {
            let mut padded = chunk.to_vec();
            padded.resize(chunk_size, 0.0);
            padded
        } else {
            chunk.to_vec()
        };

        let result = resampler
            .process(&[input], None)
            .map_err(|e| AudioError::new("resample", e))?;

        if let Some(channel) = result.first() {
            output.extend_from_slice(channel);
        }
    }

    // Zero-padding of the last chunk overshoots; trim to the exact length.
    let expected_len = (samples.len() as f64 * ratio) as usize;
    output.truncate(expected_len);

    Ok(output)
}

fn encode_wav(samples: &[f32]) -> Result<Vec<u8>, AudioError> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: TARGET_SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)
            .map_err(|e| AudioError::new("wav encode", e))?;
        for &sample in samples {
            let clamped = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
            writer
                .write_sample(clamped)
                .map_err(|e| AudioError::new("wav encode", e))?;
        }
        writer
            .finalize()
            .map_err(|e| AudioError::new("wav encode", e))?;
    }

    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 0.25s of a 440Hz sine as a WAV container at the given rate.
    fn sine_wav(sample_rate: u32, channels: u16) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            for i in 0..(sample_rate / 4) {
                let t = i as f32 / sample_rate as f32;
                let value = ((t * 440.0 * 2.0 * std::f32::consts::PI).sin() * 0.5
                    * i16::MAX as f32) as i16;
                for _ in 0..channels {
                    writer.write_sample(value).unwrap();
                }
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn transcodes_wav_to_target_rate() {
        let input = sine_wav(8_000, 1);
        let output = transcode_to_wav(&input).unwrap();

        let reader = hound::WavReader::new(Cursor::new(output)).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.sample_rate, TARGET_SAMPLE_RATE);
        assert_eq!(spec.channels, 1);
        assert!(reader.len() > 0);
    }

    #[test]
    fn downmixes_stereo_input() {
        let input = sine_wav(16_000, 2);
        let output = transcode_to_wav(&input).unwrap();

        let reader = hound::WavReader::new(Cursor::new(output)).unwrap();
        assert_eq!(reader.spec().channels, 1);
    }

    #[test]
    fn passthrough_rate_is_preserved() {
        let input = sine_wav(16_000, 1);
        let output = transcode_to_wav(&input).unwrap();

        let reader = hound::WavReader::new(Cursor::new(output)).unwrap();
        assert_eq!(reader.spec().sample_rate, TARGET_SAMPLE_RATE);
        // 0.25s at 16kHz, no resampling involved
        assert_eq!(reader.len(), 4_000);
    }

    #[test]
    fn rejects_non_audio_bytes() {
        let err = transcode_to_wav(b"definitely not an audio container").unwrap_err();
        assert!(err.to_string().contains("probe"));
    }

    #[test]
    fn rejects_empty_input() {
        assert!(transcode_to_wav(&[]).is_err());
    }
}
