//! Radarr v3 integration: webhook payloads, the API client and the import
//! step that hands a finished output back to Radarr.

mod client;
mod types;

pub use client::{MovieLibrary, RadarrClient};
pub use types::*;

use thiserror::Error;

/// Reasons a finished output cannot be handed back to Radarr.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Unknown language code: {0}")]
    UnknownLanguageCode(String),

    #[error("Could not find language {name} ({code}) in Radarr")]
    LanguageNotOffered { code: String, name: String },

    #[error("Output file {file_name} not found among import candidates for movie {movie_id}")]
    OutputNotFound { file_name: String, movie_id: i64 },
}

/// ISO 639-2/B codes that differ from their 639-3 form.
const BIBLIOGRAPHIC_CODES: &[(&str, &str)] = &[
    ("alb", "sqi"),
    ("arm", "hye"),
    ("baq", "eus"),
    ("bur", "mya"),
    ("chi", "zho"),
    ("cze", "ces"),
    ("dut", "nld"),
    ("fre", "fra"),
    ("geo", "kat"),
    ("ger", "deu"),
    ("gre", "ell"),
    ("ice", "isl"),
    ("mac", "mkd"),
    ("mao", "mri"),
    ("may", "msa"),
    ("per", "fas"),
    ("rum", "ron"),
    ("slo", "slk"),
    ("tib", "bod"),
    ("wel", "cym"),
];

/// English name for a stream language tag (`jpn` → `Japanese`).
///
/// Accepts ISO 639-1, 639-2/B and 639-3 codes.
pub fn language_name(code: &str) -> Option<&'static str> {
    let code = code.trim().to_ascii_lowercase();
    let code = BIBLIOGRAPHIC_CODES
        .iter()
        .find(|(bibliographic, _)| *bibliographic == code)
        .map(|(_, terminologic)| terminologic.to_string())
        .unwrap_or(code);

    let language = match code.len() {
        2 => isolang::Language::from_639_1(&code),
        3 => isolang::Language::from_639_3(&code),
        _ => None,
    }?;
    Some(language.to_name())
}

/// Find the Radarr language matching a stream language tag.
pub fn resolve_language(
    code: &str,
    languages: &[RadarrLanguage],
) -> Result<RadarrLanguage, ImportError> {
    let name =
        language_name(code).ok_or_else(|| ImportError::UnknownLanguageCode(code.to_string()))?;

    languages
        .iter()
        .find(|language| language.name.eq_ignore_ascii_case(name))
        .cloned()
        .ok_or_else(|| ImportError::LanguageNotOffered {
            code: code.to_string(),
            name: name.to_string(),
        })
}

/// Find the import candidate for the output file.
pub fn find_candidate<'a>(
    candidates: &'a [ManualImportItem],
    file_name: &str,
    movie_id: i64,
) -> Result<&'a ManualImportItem, ImportError> {
    candidates
        .iter()
        .find(|item| item.relative_path == file_name)
        .ok_or_else(|| ImportError::OutputNotFound {
            file_name: file_name.to_string(),
            movie_id,
        })
}
