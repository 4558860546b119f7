use chrono::{DateTime, Utc};
use recodarr_av::ProgressSample;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Processing,
    Done,
    Error,
}

/// What the notification message currently shows.
///
/// Every update sends the whole state; the remote message mirrors it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationState {
    /// Remote message id, assigned when the message is created.
    pub remote_id: Option<String>,
    pub status: JobStatus,
    pub input_file: String,
    pub output_file: Option<String>,
    pub audio_language: Option<String>,
    pub speed: Option<String>,
    pub total_time_seconds: Option<f64>,
    pub current_time_seconds: Option<f64>,
    pub error_message: Option<String>,
}

impl NotificationState {
    pub fn new(input_file: impl Into<String>) -> Self {
        Self {
            remote_id: None,
            status: JobStatus::Queued,
            input_file: input_file.into(),
            output_file: None,
            audio_language: None,
            speed: None,
            total_time_seconds: None,
            current_time_seconds: None,
            error_message: None,
        }
    }

    /// Merge a progress snapshot; absent fields keep their previous value.
    pub fn apply_progress(&mut self, sample: &ProgressSample) {
        if let Some(speed) = &sample.speed {
            self.speed = Some(speed.clone());
        }
        if let Some(current) = sample.current_time_seconds {
            self.current_time_seconds = Some(current);
        }
    }

    /// Fraction of the encode done, when both times are known.
    pub fn progress(&self) -> Option<f64> {
        match (self.current_time_seconds, self.total_time_seconds) {
            (Some(current), Some(total)) if total > 0.0 => Some(current / total),
            _ => None,
        }
    }
}

/// Radarr webhook fields a job needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRequest {
    pub movie_id: i64,
    pub movie_file_id: i64,
    pub folder_path: String,
    pub relative_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub movie_id: i64,
    pub movie_file_id: i64,
    /// Movie folder as Radarr reports it
    pub folder_path: String,
    /// Source file relative to the movie folder
    pub source_relative_path: String,
    pub output_file_name: String,
    pub status: JobStatus,
    pub notification: NotificationState,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Job {
    pub fn new(request: JobRequest, output_suffix: &str) -> Self {
        let output_file_name = output_file_name(&request.relative_path, output_suffix);
        let notification = NotificationState::new(request.relative_path.clone());

        Self {
            id: Uuid::new_v4(),
            movie_id: request.movie_id,
            movie_file_id: request.movie_file_id,
            folder_path: request.folder_path,
            source_relative_path: request.relative_path,
            output_file_name,
            status: JobStatus::Queued,
            notification,
            error: None,
            created_at: Utc::now(),
        }
    }

    /// Absolute path of the source file under `library_root`.
    ///
    /// Radarr reports absolute folder paths; they are treated as relative to
    /// the library root so the container can mount the library anywhere.
    pub fn input_path(&self, library_root: &Path) -> PathBuf {
        library_root
            .join(self.folder_path.trim_start_matches('/'))
            .join(&self.source_relative_path)
    }

    /// Output path, next to the source file.
    pub fn output_path(&self, library_root: &Path) -> PathBuf {
        let input = self.input_path(library_root);
        match input.parent() {
            Some(dir) => dir.join(&self.output_file_name),
            None => PathBuf::from(&self.output_file_name),
        }
    }

    pub fn start(&mut self) {
        self.status = JobStatus::Processing;
        self.notification.status = JobStatus::Processing;
        self.notification.output_file = Some(self.output_file_name.clone());
    }

    pub fn complete(&mut self) {
        self.status = JobStatus::Done;
        self.notification.status = JobStatus::Done;
        self.notification.speed = None;
        self.notification.current_time_seconds = None;
    }

    pub fn fail(&mut self, error: &str) {
        self.status = JobStatus::Error;
        self.error = Some(error.to_string());
        self.notification.status = JobStatus::Error;
        self.notification.error_message = Some(error.to_string());
    }
}

/// `Movie.2010.mkv` → `Movie.2010.out.mp4`
pub fn output_file_name(relative_path: &str, suffix: &str) -> String {
    let path = Path::new(relative_path);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| relative_path.to_string());
    format!("{}{}", stem, suffix)
}
