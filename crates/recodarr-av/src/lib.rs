//! # recodarr-av
//!
//! Media probing, stream selection and transcoding for recodarr.
//!
//! This crate provides functionality for:
//! - Probing media files with ffprobe into a per-type indexed stream inventory
//! - Choosing the audio and subtitle streams to keep in the output
//! - Building ffmpeg invocations and reading their `-progress` output as a
//!   stream of [`ProgressSample`]s
//!
//! ## Features
//!
//! - `tracing` - Enable tracing support
//!
//! ## Example
//!
//! ```no_run
//! use recodarr_av::{Ffprobe, MediaProber, SelectionPolicy};
//!
//! # async fn example() -> recodarr_av::Result<()> {
//! let descriptor = Ffprobe::default().probe("/movies/movie.mkv".as_ref()).await?;
//! let policy = SelectionPolicy::default();
//! if let Some(selection) = policy.select(&descriptor) {
//!     println!("Audio language: {}", selection.audio.language);
//! }
//! # Ok(())
//! # }
//! ```

pub mod encode;
mod error;
pub mod probe;
pub mod select;
pub mod tools;

// Re-exports
pub use encode::{
    parse_progress_chunk, parse_progress_line, EncodeSettings, EncodeSpec, FfmpegTranscoder,
    ProgressSample, ProgressStream, Transcoder,
};
pub use error::{Error, Result};
pub use probe::{Ffprobe, MediaDescriptor, MediaProber, MediaStream, MediaType};
pub use select::{
    select_all, select_first, LanguagePreference, NotSubtitled, SelectionPolicy,
    StreamSelection, StreamSelector,
};
pub use tools::{check_tool, check_tools, get_tool_path, require_tool, ToolInfo};

/// Language code used when a stream carries no language tag.
pub const UNDETERMINED_LANGUAGE: &str = "und";
