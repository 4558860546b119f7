//! Parsing of ffmpeg `-progress` output.
//!
//! ffmpeg writes blocks of `key=value` lines, each block terminated by a
//! `progress=continue` (or `progress=end`) line.

use serde::Serialize;

/// Progress fields we care about from one snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProgressSample {
    /// Encoding speed as printed by ffmpeg, e.g. "1.5x".
    pub speed: Option<String>,
    /// Output timestamp reached so far.
    pub current_time_seconds: Option<f64>,
}

impl ProgressSample {
    pub fn is_empty(&self) -> bool {
        self.speed.is_none() && self.current_time_seconds.is_none()
    }

    /// Fold one `key=value` line into the sample.
    ///
    /// Returns `false` for lines that are not exactly one `key=value` pair.
    pub fn apply_line(&mut self, line: &str) -> bool {
        let Some((key, value)) = parse_progress_line(line) else {
            return false;
        };

        match key {
            "speed" => self.speed = Some(value.to_string()),
            // Despite the name, ffmpeg reports microseconds here.
            "out_time_ms" => {
                // ffmpeg reports a large negative value before the first packet.
                if let Some(micros) = value.parse::<i64>().ok().filter(|m| *m >= 0) {
                    self.current_time_seconds = Some(micros as f64 / 1_000_000.0);
                }
            }
            _ => {}
        }
        true
    }
}

/// Split a progress line into key and value.
///
/// Lines without `=` or with more than one `=` are rejected.
pub fn parse_progress_line(line: &str) -> Option<(&str, &str)> {
    let mut parts = line.trim_end_matches('\r').split('=');
    let key = parts.next()?;
    let value = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    Some((key.trim(), value.trim()))
}

/// Parse a chunk of progress output into a single sample.
pub fn parse_progress_chunk(chunk: &str) -> ProgressSample {
    let mut sample = ProgressSample::default();
    for line in chunk.split('\n') {
        sample.apply_line(line);
    }
    sample
}

/// Whether the line closes a progress block.
pub(crate) fn is_block_end(line: &str) -> bool {
    matches!(parse_progress_line(line), Some(("progress", _)))
}
