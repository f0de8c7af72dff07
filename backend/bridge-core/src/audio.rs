//! Voice-message transcoding: codec subprocess plus WAV synthesis.

use crate::error::transcode::TranscodeError;

use common::ErrorLocation;

use std::env::consts::EXE_SUFFIX;
use std::env::temp_dir;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use tokio::process::Command as TokioCommand;
use uuid::Uuid;

/// Codec binary name, platform executable suffix appended at runtime.
pub const CODEC_BINARY_STEM: &str = "silk-codec";
/// Codec subcommand selecting speech-to-PCM decoding.
pub const DECODE_SUBCOMMAND: &str = "stp";

/// Fixed target format for voice messages.
pub const VOICE_CHANNELS: u16 = 1;
pub const VOICE_SAMPLE_RATE: u32 = 24_000;
pub const VOICE_BITS_PER_SAMPLE: u16 = 16;

pub const WAV_HEADER_LEN: usize = 44;

fn codec_binary(resource_dir: &Path) -> PathBuf {
    resource_dir.join(format!("{CODEC_BINARY_STEM}{EXE_SUFFIX}"))
}

/// Decode a proprietary speech-codec file to raw PCM.
///
/// Spawns `silk-codec stp -i <input> -o <tmp> -s <rate>` with a
/// uniquely named temp file per request, waits for exit, then reads
/// the temp file back and removes it.
///
/// A non-zero exit status is logged but not treated as fatal, matching
/// the established behavior of this pipeline; the output read is what
/// decides success. A failed codec run therefore surfaces either as a
/// read error or as a short PCM buffer.
pub async fn silk_to_pcm(
    resource_dir: &Path,
    input: &Path,
    sample_rate: u32,
) -> Result<Vec<u8>, TranscodeError> {
    let output = temp_dir().join(Uuid::new_v4().to_string());
    let binary = codec_binary(resource_dir);

    debug!(
        "Transcoding {} via {} at {sample_rate} Hz",
        input.display(),
        binary.display()
    );

    let mut child = TokioCommand::new(&binary)
        .arg(DECODE_SUBCOMMAND)
        .arg("-i")
        .arg(input)
        .arg("-o")
        .arg(&output)
        .arg("-s")
        .arg(sample_rate.to_string())
        .spawn()
        .map_err(|e| TranscodeError::Spawn {
            location: ErrorLocation::caller(),
            path: binary.clone(),
            source: e,
        })?;

    let status = child.wait().await.map_err(|e| TranscodeError::Wait {
        location: ErrorLocation::caller(),
        source: e,
    })?;
    if !status.success() {
        warn!("Codec exited with status {status}, reading output anyway");
    }

    let pcm = tokio::fs::read(&output)
        .await
        .map_err(|e| TranscodeError::ReadOutput {
            location: ErrorLocation::caller(),
            path: output.clone(),
            source: e,
        })?;
    let _ = tokio::fs::remove_file(&output).await;

    debug!("Transcoded {} PCM bytes", pcm.len());
    Ok(pcm)
}

/// Wrap raw PCM in a RIFF/WAVE container.
///
/// The 44-byte header layout is byte-exact, all multi-byte fields
/// little-endian; the data chunk size is the PCM byte length.
pub fn pcm_to_wav(pcm: &[u8], channels: u16, sample_rate: u32, bits_per_sample: u16) -> Vec<u8> {
    let block_align = channels * bits_per_sample / 8;
    let byte_rate = u32::from(block_align) * sample_rate;
    let data_size = pcm.len() as u32;
    let chunk_size = 36 + data_size;

    let mut wav = Vec::with_capacity(WAV_HEADER_LEN + pcm.len());
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&chunk_size.to_le_bytes());
    wav.extend_from_slice(b"WAVE");
    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&16u32.to_le_bytes());
    wav.extend_from_slice(&1u16.to_le_bytes());
    wav.extend_from_slice(&channels.to_le_bytes());
    wav.extend_from_slice(&sample_rate.to_le_bytes());
    wav.extend_from_slice(&byte_rate.to_le_bytes());
    wav.extend_from_slice(&block_align.to_le_bytes());
    wav.extend_from_slice(&bits_per_sample.to_le_bytes());
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&data_size.to_le_bytes());
    wav.extend_from_slice(pcm);
    wav
}

/// Transcode one voice-message file to a playable WAV at the fixed
/// mono / 24 kHz / 16-bit target.
pub async fn read_voice_message(resource_dir: &Path, file: &str) -> Result<Vec<u8>, TranscodeError> {
    let pcm = silk_to_pcm(resource_dir, Path::new(file), VOICE_SAMPLE_RATE).await?;
    Ok(pcm_to_wav(
        &pcm,
        VOICE_CHANNELS,
        VOICE_SAMPLE_RATE,
        VOICE_BITS_PER_SAMPLE,
    ))
}
