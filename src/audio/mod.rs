//! Audio Normalizer: arbitrary compressed audio in, fixed-length mono PCM out.
//!
//! Pipeline: symphonia decode (hint-guided, then autodetect) with an ffmpeg
//! transcode fallback for codecs outside the bundled set, followed by
//! padding/truncation to exactly `target_duration_seconds * sample_rate`
//! samples. Decode failures are client errors — never silently substituted
//! with zeros.

mod decoder;
mod transcode;

pub use decoder::decode_bytes;
pub use transcode::transcode_to_wav;

use tracing::debug;

use crate::config::AudioConfig;
use crate::error::AnalysisError;
use crate::types::PcmBuffer;

/// Decode and normalize an uploaded clip into a fixed-length mono buffer.
///
/// The symphonia path covers WAV/MP3/FLAC/OGG/AAC uploads; anything it cannot
/// demux (typically WebM/Opus browser captures) is routed through ffmpeg and
/// re-decoded as WAV. If both paths fail, the first decoder's error is
/// returned since it describes the original stream.
pub fn normalize(
    bytes: Vec<u8>,
    content_type: Option<&str>,
    config: &AudioConfig,
) -> Result<PcmBuffer, AnalysisError> {
    let primary_err = match decode_bytes(bytes.clone(), content_type) {
        Ok(pcm) => return Ok(fit_to_window(pcm, config.target_duration_seconds)),
        Err(e) => e,
    };

    debug!(error = %primary_err, "Primary decode failed, trying ffmpeg fallback");

    match transcode_to_wav(&bytes, content_type, &config.ffmpeg_path) {
        Ok(wav) => {
            let pcm = decode_bytes(wav, Some("audio/wav"))?;
            Ok(fit_to_window(pcm, config.target_duration_seconds))
        }
        Err(_) => Err(primary_err),
    }
}

/// Pad with trailing silence or truncate so the buffer holds exactly
/// `target_duration * sample_rate` samples (the downstream feature extractor
/// assumes a fixed window).
pub fn fit_to_window(mut pcm: PcmBuffer, target_duration_seconds: f64) -> PcmBuffer {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let target_len = (target_duration_seconds * f64::from(pcm.sample_rate)).round() as usize;

    if pcm.samples.len() < target_len {
        pcm.samples.resize(target_len, 0.0);
    } else {
        pcm.samples.truncate(target_len);
    }
    pcm
}
