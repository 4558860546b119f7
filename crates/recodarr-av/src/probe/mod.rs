//! Media file probing.
//!
//! The pipeline only depends on [`MediaProber`]; [`Ffprobe`] is the
//! implementation backed by the ffprobe CLI.

mod ffprobe;
mod types;

pub use ffprobe::{parse_ffprobe_json, probe_with_ffprobe, Ffprobe};
pub use types::*;

use crate::Result;
use std::path::Path;

/// Something that can describe the streams of a media file.
#[async_trait::async_trait]
pub trait MediaProber: Send + Sync {
    async fn probe(&self, path: &Path) -> Result<MediaDescriptor>;
}

#[async_trait::async_trait]
impl MediaProber for Ffprobe {
    async fn probe(&self, path: &Path) -> Result<MediaDescriptor> {
        probe_with_ffprobe(self.program(), path).await
    }
}
