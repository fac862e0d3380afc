//! Audio decoding using Symphonia
//!
//! Decodes entirely in memory: the upload bytes are wrapped in a cursor and
//! handed to Symphonia's probe, so no temporary file is ever written.

use super::format::AudioFormat;
use crate::error::ScreeningError;
use crate::features::voice::AudioClip;
use crate::preprocessing::channel_mixer::downmix_interleaved;
use std::io::Cursor;
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

fn decoding_error(context: &str, err: SymphoniaError) -> ScreeningError {
    ScreeningError::DecodingError(format!("{}: {}", context, err))
}

/// Decode an in-memory audio file to mono samples
///
/// # Arguments
///
/// * `bytes` - Complete file contents
/// * `format` - Container recognized from the filename (used as a probe hint)
///
/// # Returns
///
/// Mono clip at the file's native sample rate (channels averaged)
///
/// # Errors
///
/// Returns `DecodingError` if the container cannot be probed, has no audio
/// track, or a packet fails with a non-recoverable error
pub fn decode_audio_bytes(bytes: Vec<u8>, format: AudioFormat) -> Result<AudioClip, ScreeningError> {
    log::debug!("Decoding {} bytes as {:?}", bytes.len(), format);

    let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes)), Default::default());

    let mut hint = Hint::new();
    hint.with_extension(format.extension());

    let meta_opts: MetadataOptions = Default::default();
    let fmt_opts: FormatOptions = Default::default();

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &fmt_opts, &meta_opts)
        .map_err(|e| decoding_error("Unrecognized audio container", e))?;
    let mut reader = probed.format;

    let track = reader
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| ScreeningError::DecodingError("No supported audio tracks found".to_string()))?;

    let track_id = track.id;
    let mut sample_rate = track.codec_params.sample_rate;
    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| decoding_error("Unsupported codec", e))?;

    let mut channels = track.codec_params.channels.map(|c| c.count()).unwrap_or(1);
    let mut interleaved: Vec<f32> = Vec::new();

    loop {
        let packet = match reader.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(decoding_error("Failed to read packet", e)),
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                channels = spec.channels.count();
                sample_rate.get_or_insert(spec.rate);

                let mut buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                buffer.copy_interleaved_ref(decoded);
                interleaved.extend_from_slice(buffer.samples());
            }
            Err(SymphoniaError::DecodeError(e)) => {
                // Corrupted packets are skipped
                log::warn!("Skipping undecodable packet: {}", e);
                continue;
            }
            Err(e) => return Err(decoding_error("Failed to decode packet", e)),
        }
    }

    let sample_rate = sample_rate
        .ok_or_else(|| ScreeningError::DecodingError("Unknown sample rate".to_string()))?;
    let samples = downmix_interleaved(&interleaved, channels)?;

    log::debug!(
        "Decoded {} mono samples @ {} Hz from {} channel(s)",
        samples.len(),
        sample_rate,
        channels
    );

    Ok(AudioClip::new(samples, sample_rate))
}

/// Decode an audio file from disk
///
/// # Errors
///
/// Returns `UnsupportedFormat` for an unrecognized extension, `DecodingError`
/// if the file cannot be read or decoded
pub fn decode_audio_file(path: impl AsRef<Path>) -> Result<AudioClip, ScreeningError> {
    let path = path.as_ref();
    let format = AudioFormat::from_filename(&path.to_string_lossy())?;
    let bytes = std::fs::read(path).map_err(|e| {
        ScreeningError::DecodingError(format!("Cannot read {}: {}", path.display(), e))
    })?;
    decode_audio_bytes(bytes, format)
}
