//! FFprobe-based media probing.

use super::types::*;
use crate::{Error, Result, UNDETERMINED_LANGUAGE};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::process::Command;

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    format: Option<FfprobeFormat>,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    index: u32,
    codec_type: Option<String>,
    codec_name: Option<String>,
    #[serde(default)]
    tags: FfprobeTags,
}

#[derive(Debug, Default, Deserialize)]
struct FfprobeTags {
    language: Option<String>,
}

/// Run ffprobe on `path` and parse its JSON output.
pub async fn probe_with_ffprobe(program: &Path, path: &Path) -> Result<MediaDescriptor> {
    #[cfg(feature = "tracing")]
    tracing::info!("Probing file: {}", path.display());

    let output = Command::new(program)
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(path)
        .output()
        .await
        .map_err(|e| Error::spawn("ffprobe", e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::probe_failed(format!(
            "ffprobe exited with {} for {}: {}",
            output.status,
            path.display(),
            stderr.trim()
        )));
    }

    let json_str = String::from_utf8(output.stdout)
        .map_err(|e| Error::parse("ffprobe", format!("Invalid UTF-8: {}", e)))?;

    parse_ffprobe_json(&json_str)
}

/// Parse ffprobe's `-print_format json -show_streams -show_format` output.
pub fn parse_ffprobe_json(json: &str) -> Result<MediaDescriptor> {
    let output: FfprobeOutput = serde_json::from_str(json)?;
    Ok(parse_ffprobe_output(output))
}

fn parse_ffprobe_output(output: FfprobeOutput) -> MediaDescriptor {
    let duration_seconds = output
        .format
        .and_then(|f| f.duration)
        .and_then(|s| s.parse::<f64>().ok());

    let mut streams: Vec<MediaStream> = output
        .streams
        .into_iter()
        .map(|stream| MediaStream {
            index: stream.index,
            codec_name: stream.codec_name.unwrap_or_default(),
            media_type: MediaType::from_codec_type(stream.codec_type.as_deref().unwrap_or("")),
            type_index: 0,
            language: stream
                .tags
                .language
                .filter(|l| !l.is_empty())
                .unwrap_or_else(|| UNDETERMINED_LANGUAGE.to_string()),
        })
        .collect();

    assign_type_indexes(&mut streams);

    MediaDescriptor {
        streams,
        duration_seconds,
    }
}

/// ffprobe invoked as an external process.
#[derive(Debug, Clone)]
pub struct Ffprobe {
    program: PathBuf,
}

impl Ffprobe {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl Default for Ffprobe {
    fn default() -> Self {
        Self::new("ffprobe")
    }
}
