//! ffmpeg transcode fallback for codecs symphonia cannot demux.
//!
//! Browser recordings typically arrive as WebM/Opus, which is outside the
//! bundled symphonia codec set. The fallback shells out to ffmpeg to produce
//! a WAV that the primary decoder handles.
//!
//! Scoped-resource contract: both scratch files live inside a
//! [`tempfile::TempDir`], which removes them on every exit path (success,
//! decode failure, or panic unwinding through this frame).

use std::process::{Command, Stdio};

use tempfile::TempDir;
use tracing::{debug, warn};

use crate::error::AnalysisError;

/// Guess a scratch-file extension from the content-type hint so ffmpeg's own
/// format detection has something to work with.
fn extension_for(content_type: Option<&str>) -> &'static str {
    match content_type {
        Some("audio/webm" | "video/webm") => "webm",
        Some("audio/ogg" | "application/ogg") => "ogg",
        Some("audio/mpeg" | "audio/mp3") => "mp3",
        Some("audio/mp4" | "audio/x-m4a") => "m4a",
        _ => "bin",
    }
}

/// Transcode arbitrary compressed audio to WAV via the external ffmpeg
/// binary. Returns the WAV bytes for the primary decoder.
///
/// A non-zero ffmpeg exit status is propagated as a decode failure, never
/// swallowed. A missing ffmpeg binary reports `UnsupportedFormat` since the
/// codec genuinely has no available decoder in that deployment.
pub fn transcode_to_wav(
    bytes: &[u8],
    content_type: Option<&str>,
    ffmpeg_path: &str,
) -> Result<Vec<u8>, AnalysisError> {
    let scratch = TempDir::new().map_err(|e| {
        AnalysisError::Decode(format!("failed to create transcode scratch dir: {e}"))
    })?;

    let input_path = scratch
        .path()
        .join(format!("input.{}", extension_for(content_type)));
    let output_path = scratch.path().join("output.wav");

    std::fs::write(&input_path, bytes)
        .map_err(|e| AnalysisError::Decode(format!("failed to write scratch input: {e}")))?;

    debug!(
        input = %input_path.display(),
        ffmpeg = ffmpeg_path,
        "Invoking ffmpeg transcode fallback"
    );

    let output = Command::new(ffmpeg_path)
        .arg("-y")
        .arg("-i")
        .arg(&input_path)
        .arg(&output_path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AnalysisError::UnsupportedFormat(format!(
                    "no decoder available for this format ({ffmpeg_path} not found)"
                ))
            } else {
                AnalysisError::Decode(format!("failed to spawn {ffmpeg_path}: {e}"))
            }
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        // Last stderr line usually carries the actual ffmpeg error.
        let reason = stderr.lines().last().unwrap_or("unknown error").to_string();
        warn!(status = %output.status, reason = %reason, "ffmpeg transcode failed");
        return Err(AnalysisError::Decode(format!(
            "ffmpeg exited with {}: {reason}",
            output.status
        )));
    }

    let wav = std::fs::read(&output_path)
        .map_err(|e| AnalysisError::Decode(format!("failed to read transcoded output: {e}")))?;

    // TempDir drop removes both scratch files regardless of outcome above.
    Ok(wav)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_mapping() {
        assert_eq!(extension_for(Some("audio/webm")), "webm");
        assert_eq!(extension_for(Some("audio/ogg")), "ogg");
        assert_eq!(extension_for(Some("text/plain")), "bin");
        assert_eq!(extension_for(None), "bin");
    }

    #[test]
    fn test_missing_binary_is_unsupported_format() {
        let result = transcode_to_wav(b"not audio", None, "/nonexistent/ffmpeg-binary");
        match result {
            Err(AnalysisError::UnsupportedFormat(_)) => {}
            other => panic!("expected UnsupportedFormat, got {other:?}"),
        }
    }
}
