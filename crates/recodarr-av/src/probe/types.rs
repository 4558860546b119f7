//! Stream inventory types.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Kind of elementary stream inside a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Video,
    Audio,
    Subtitle,
    /// Data, attachment and other streams ffmpeg reports but we never map.
    Other,
}

impl MediaType {
    /// Map ffprobe's `codec_type` to a media type.
    pub fn from_codec_type(codec_type: &str) -> Self {
        match codec_type {
            "video" => Self::Video,
            "audio" => Self::Audio,
            "subtitle" => Self::Subtitle,
            _ => Self::Other,
        }
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaType::Video => write!(f, "video"),
            MediaType::Audio => write!(f, "audio"),
            MediaType::Subtitle => write!(f, "subtitle"),
            MediaType::Other => write!(f, "other"),
        }
    }
}

/// One stream of a probed container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaStream {
    /// Global stream index within the container.
    pub index: u32,
    /// Codec name as reported by ffprobe (e.g. "hevc", "eac3", "subrip").
    pub codec_name: String,
    /// Stream kind.
    pub media_type: MediaType,
    /// Zero-based position among streams of the same media type.
    pub type_index: u32,
    /// ISO 639 language code, "und" when untagged.
    pub language: String,
}

/// Stream inventory and duration of a media file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaDescriptor {
    pub streams: Vec<MediaStream>,
    /// Container duration in seconds.
    pub duration_seconds: Option<f64>,
}

impl MediaDescriptor {
    /// All streams of the given type, in `type_index` order.
    pub fn streams_of(&self, media_type: MediaType) -> Vec<&MediaStream> {
        self.streams
            .iter()
            .filter(|s| s.media_type == media_type)
            .collect()
    }

    /// First video stream.
    pub fn primary_video(&self) -> Option<&MediaStream> {
        self.streams
            .iter()
            .find(|s| s.media_type == MediaType::Video)
    }

    pub fn audio_streams(&self) -> Vec<&MediaStream> {
        self.streams_of(MediaType::Audio)
    }

    pub fn subtitle_streams(&self) -> Vec<&MediaStream> {
        self.streams_of(MediaType::Subtitle)
    }
}

/// Assign per-type `type_index` values.
///
/// Streams are ordered by their global index and each media type keeps its own
/// counter, so interleaved layouts (video, audio, subtitle, audio) still number
/// the second audio stream 1. This matches ffmpeg's `0:a:N` stream specifiers.
pub fn assign_type_indexes(streams: &mut [MediaStream]) {
    streams.sort_by_key(|s| s.index);

    let mut counters: HashMap<MediaType, u32> = HashMap::new();
    for stream in streams.iter_mut() {
        let counter = counters.entry(stream.media_type).or_insert(0);
        stream.type_index = *counter;
        *counter += 1;
    }
}
