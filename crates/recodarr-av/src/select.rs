//! Stream selection.
//!
//! Selectors are small policies over a candidate list. They are tried in
//! order and the first one that returns anything wins; when none does, a
//! default applies (the first candidate for a single pick, every candidate for
//! a set).

use crate::probe::{MediaDescriptor, MediaStream, MediaType};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A policy choosing streams from a candidate list.
///
/// Implementations must preserve candidate order in their output.
pub trait StreamSelector {
    fn select<'a>(&self, candidates: &[&'a MediaStream]) -> Vec<&'a MediaStream>;
}

/// Keeps candidates whose language is one of the accepted codes.
///
/// The accepted list is a membership set, not a ranking: with candidates
/// `[eng, jpn]` and languages `[jpn, eng]` the `eng` stream comes first.
#[derive(Debug, Clone)]
pub struct LanguagePreference {
    languages: Vec<String>,
}

impl LanguagePreference {
    pub fn new<I, S>(languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            languages: languages.into_iter().map(Into::into).collect(),
        }
    }
}

impl StreamSelector for LanguagePreference {
    fn select<'a>(&self, candidates: &[&'a MediaStream]) -> Vec<&'a MediaStream> {
        candidates
            .iter()
            .copied()
            .filter(|s| self.languages.iter().any(|l| *l == s.language))
            .collect()
    }
}

/// Keeps candidates whose language no subtitle stream already covers.
///
/// Yields nothing for files without subtitles.
#[derive(Debug, Clone)]
pub struct NotSubtitled {
    subtitle_languages: HashSet<String>,
}

impl NotSubtitled {
    pub fn new(descriptor: &MediaDescriptor) -> Self {
        Self {
            subtitle_languages: descriptor
                .streams_of(MediaType::Subtitle)
                .into_iter()
                .map(|s| s.language.clone())
                .collect(),
        }
    }
}

impl StreamSelector for NotSubtitled {
    fn select<'a>(&self, candidates: &[&'a MediaStream]) -> Vec<&'a MediaStream> {
        if self.subtitle_languages.is_empty() {
            return Vec::new();
        }
        candidates
            .iter()
            .copied()
            .filter(|s| !self.subtitle_languages.contains(&s.language))
            .collect()
    }
}

/// Pick one stream: the first hit of the first selector that matches,
/// otherwise the first candidate.
pub fn select_first<'a>(
    candidates: &[&'a MediaStream],
    selectors: &[&dyn StreamSelector],
) -> Option<&'a MediaStream> {
    selectors
        .iter()
        .find_map(|selector| selector.select(candidates).into_iter().next())
        .or_else(|| candidates.first().copied())
}

/// Pick a set of streams: the output of the first selector that matches,
/// otherwise all candidates.
pub fn select_all<'a>(
    candidates: &[&'a MediaStream],
    selectors: &[&dyn StreamSelector],
) -> Vec<&'a MediaStream> {
    selectors
        .iter()
        .map(|selector| selector.select(candidates))
        .find(|selected| !selected.is_empty())
        .unwrap_or_else(|| candidates.to_vec())
}

/// Streams chosen for the output file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamSelection {
    pub video: MediaStream,
    pub audio: MediaStream,
    pub subtitles: Vec<MediaStream>,
}

/// Configured audio/subtitle selection rules.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SelectionPolicy {
    /// Audio languages to prefer, e.g. `["jpn", "kor"]`.
    #[serde(default)]
    pub audio_languages: Vec<String>,

    /// Subtitle languages to keep; all subtitles are kept when none match.
    #[serde(default)]
    pub subtitle_languages: Vec<String>,

    /// Fall back to an audio track whose language has no subtitles.
    #[serde(default = "default_prefer_unsubtitled_audio")]
    pub prefer_unsubtitled_audio: bool,
}

fn default_prefer_unsubtitled_audio() -> bool {
    true
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self {
            audio_languages: Vec::new(),
            subtitle_languages: Vec::new(),
            prefer_unsubtitled_audio: default_prefer_unsubtitled_audio(),
        }
    }
}

impl SelectionPolicy {
    /// Choose the video, audio and subtitle streams for `descriptor`.
    ///
    /// Returns `None` when the file has no video or no audio stream; such files
    /// are left alone.
    pub fn select(&self, descriptor: &MediaDescriptor) -> Option<StreamSelection> {
        let video = descriptor.primary_video()?;

        let audio_candidates = descriptor.audio_streams();
        let by_language = LanguagePreference::new(self.audio_languages.iter().cloned());
        let not_subtitled = NotSubtitled::new(descriptor);
        let mut audio_selectors: Vec<&dyn StreamSelector> = vec![&by_language];
        if self.prefer_unsubtitled_audio {
            audio_selectors.push(&not_subtitled);
        }
        let audio = select_first(&audio_candidates, &audio_selectors)?;

        let subtitle_candidates = descriptor.subtitle_streams();
        let subtitle_language =
            LanguagePreference::new(self.subtitle_languages.iter().cloned());
        let subtitles = select_all(&subtitle_candidates, &[&subtitle_language]);

        Some(StreamSelection {
            video: video.clone(),
            audio: audio.clone(),
            subtitles: subtitles.into_iter().cloned().collect(),
        })
    }
}
