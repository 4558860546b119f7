//! Output encoding with ffmpeg.
//!
//! An [`EncodeSpec`] describes which streams end up in the output. A
//! [`Transcoder`] starts the encode and hands back a [`ProgressStream`] that
//! yields one [`ProgressSample`] per ffmpeg progress block and finishes when
//! the process exits.

mod ffmpeg;
mod progress;

pub use ffmpeg::{FfmpegRun, FfmpegTranscoder};
pub use progress::{parse_progress_chunk, parse_progress_line, ProgressSample};

use crate::select::StreamSelection;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Subtitle codecs that can be converted to a text track in MP4.
///
/// Bitmap formats (PGS, VobSub, DVB) cannot become `mov_text` and are dropped.
pub const TEXT_SUBTITLE_CODECS: &[&str] = &["subrip", "srt", "ass", "ssa", "webvtt", "mov_text", "text"];

/// Encoder settings shared by every job.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EncodeSettings {
    /// Audio encoder for the selected track (default: "aac").
    #[serde(default = "default_audio_codec")]
    pub audio_codec: String,

    /// Subtitle encoder for text subtitles (default: "mov_text").
    #[serde(default = "default_subtitle_codec")]
    pub subtitle_codec: String,

    /// Seconds between ffmpeg progress snapshots (default: 5).
    #[serde(default = "default_stats_period_secs")]
    pub stats_period_secs: u64,
}

fn default_audio_codec() -> String {
    "aac".to_string()
}

fn default_subtitle_codec() -> String {
    "mov_text".to_string()
}

fn default_stats_period_secs() -> u64 {
    5
}

impl EncodeSettings {
    pub fn stats_period(&self) -> Duration {
        Duration::from_secs(self.stats_period_secs)
    }
}

impl Default for EncodeSettings {
    fn default() -> Self {
        Self {
            audio_codec: default_audio_codec(),
            subtitle_codec: default_subtitle_codec(),
            stats_period_secs: default_stats_period_secs(),
        }
    }
}

/// Everything ffmpeg needs to produce one output file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EncodeSpec {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub video_type_index: u32,
    pub audio_type_indexes: Vec<u32>,
    pub subtitle_type_indexes: Vec<u32>,
    pub audio_codec: String,
    pub subtitle_codec: String,
    pub stats_period_secs: u64,
}

impl EncodeSpec {
    /// Build the spec for a stream selection, keeping only text subtitles.
    pub fn from_selection(
        input_path: impl Into<PathBuf>,
        output_path: impl Into<PathBuf>,
        selection: &StreamSelection,
        settings: &EncodeSettings,
    ) -> Self {
        let subtitle_type_indexes = selection
            .subtitles
            .iter()
            .filter(|s| is_text_subtitle(&s.codec_name))
            .map(|s| s.type_index)
            .collect();

        Self {
            input_path: input_path.into(),
            output_path: output_path.into(),
            video_type_index: selection.video.type_index,
            audio_type_indexes: vec![selection.audio.type_index],
            subtitle_type_indexes,
            audio_codec: settings.audio_codec.clone(),
            subtitle_codec: settings.subtitle_codec.clone(),
            stats_period_secs: settings.stats_period_secs,
        }
    }

    /// ffmpeg arguments for this spec, program name excluded.
    pub fn to_args(&self) -> Vec<String> {
        let mut args: Vec<String> = [
            "-y",
            "-v",
            "error",
            "-progress",
            "-",
            "-stats_period",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        args.push(self.stats_period_secs.to_string());
        args.push("-nostats".to_string());
        args.push("-i".to_string());
        args.push(self.input_path.to_string_lossy().to_string());

        args.push("-map".to_string());
        args.push(format!("0:v:{}", self.video_type_index));
        args.push("-c:v".to_string());
        args.push("copy".to_string());

        if !self.audio_type_indexes.is_empty() {
            for index in &self.audio_type_indexes {
                args.push("-map".to_string());
                args.push(format!("0:a:{}", index));
            }
            args.push("-c:a".to_string());
            args.push(self.audio_codec.clone());
        }

        if !self.subtitle_type_indexes.is_empty() {
            for index in &self.subtitle_type_indexes {
                args.push("-map".to_string());
                args.push(format!("0:s:{}", index));
            }
            args.push("-c:s".to_string());
            args.push(self.subtitle_codec.clone());
        }

        args.push(self.output_path.to_string_lossy().to_string());
        args
    }
}

/// Whether a subtitle codec can be muxed as a text track.
pub fn is_text_subtitle(codec_name: &str) -> bool {
    TEXT_SUBTITLE_CODECS
        .iter()
        .any(|c| c.eq_ignore_ascii_case(codec_name))
}

/// Starts encodes.
#[async_trait::async_trait]
pub trait Transcoder: Send + Sync {
    async fn start(&self, spec: &EncodeSpec) -> Result<Box<dyn ProgressStream>>;
}

/// Progress of a running encode.
///
/// `Ok(None)` means the encoder exited successfully; a failed exit surfaces as
/// an error from the call that observes it.
#[async_trait::async_trait]
pub trait ProgressStream: Send {
    async fn next_sample(&mut self) -> Result<Option<ProgressSample>>;
}
