use crate::state::JobRequest;
use serde::{Deserialize, Serialize};

/// Radarr webhook payload
///
/// Only the fields needed to locate the imported file are required.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RadarrWebhook {
    #[serde(default)]
    pub event_type: Option<String>,
    pub movie: RadarrMovie,
    pub movie_file: RadarrMovieFile,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RadarrMovie {
    pub id: i64,
    pub folder_path: String,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RadarrMovieFile {
    pub id: i64,
    pub relative_path: String,
}

impl RadarrWebhook {
    /// Whether this event announces a newly imported file.
    ///
    /// Payloads without an event type are treated as imports.
    pub fn is_import(&self) -> bool {
        match self.event_type.as_deref() {
            None => true,
            Some(event) => event.eq_ignore_ascii_case("Download"),
        }
    }

    pub fn to_request(&self) -> JobRequest {
        JobRequest {
            movie_id: self.movie.id,
            movie_file_id: self.movie_file.id,
            folder_path: self.movie.folder_path.clone(),
            relative_path: self.movie_file.relative_path.clone(),
        }
    }
}

/// Language as Radarr knows it (`GET /api/v3/language`)
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RadarrLanguage {
    pub id: i64,
    pub name: String,
}

/// A file Radarr offers for manual import (`GET /api/v3/manualimport`)
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualImportItem {
    pub path: String,
    pub relative_path: String,
    #[serde(default)]
    pub folder_name: Option<String>,
    #[serde(default)]
    pub quality: Option<serde_json::Value>,
    #[serde(default)]
    pub languages: Vec<RadarrLanguage>,
    #[serde(default)]
    pub release_group: Option<String>,
}

/// One entry of a `ManualImport` command
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualImportFile {
    pub path: String,
    pub folder_name: Option<String>,
    pub movie_id: i64,
    pub quality: Option<serde_json::Value>,
    pub languages: Vec<RadarrLanguage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_group: Option<String>,
}

impl ManualImportFile {
    pub fn from_candidate(
        item: &ManualImportItem,
        movie_id: i64,
        languages: Vec<RadarrLanguage>,
    ) -> Self {
        Self {
            path: item.path.clone(),
            folder_name: item.folder_name.clone(),
            movie_id,
            quality: item.quality.clone(),
            languages,
            release_group: item.release_group.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ManualImportCommand {
    pub name: &'static str,
    pub import_mode: &'static str,
    pub files: Vec<ManualImportFile>,
}
