//! Shared fakes for integration tests.
//!
//! Every fake records what it was asked to do so tests can assert on call
//! order without touching ffmpeg, Radarr or Discord.

#![allow(dead_code)]

use anyhow::Result;
use parking_lot::Mutex;
use recodarr::arr::{ManualImportFile, ManualImportItem, MovieLibrary, RadarrLanguage};
use recodarr::config::Config;
use recodarr::notifications::Reporter;
use recodarr::state::{Job, JobHandler, JobOutcome, JobQueue, JobRequest, NotificationState};
use recodarr_av::{
    probe::assign_type_indexes, EncodeSpec, MediaDescriptor, MediaProber, MediaStream, MediaType,
    ProgressSample, ProgressStream, Transcoder,
};
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

// ---------------------------------------------------------------------------
// Media fixtures
// ---------------------------------------------------------------------------

pub fn stream(index: u32, media_type: MediaType, codec_name: &str, language: &str) -> MediaStream {
    MediaStream {
        index,
        codec_name: codec_name.to_string(),
        media_type,
        type_index: 0,
        language: language.to_string(),
    }
}

pub fn descriptor(mut streams: Vec<MediaStream>, duration_seconds: Option<f64>) -> MediaDescriptor {
    assign_type_indexes(&mut streams);
    MediaDescriptor {
        streams,
        duration_seconds,
    }
}

/// Video, English + Japanese audio, English text and bitmap subtitles.
pub fn anime_descriptor() -> MediaDescriptor {
    descriptor(
        vec![
            stream(0, MediaType::Video, "h264", "und"),
            stream(1, MediaType::Audio, "ac3", "eng"),
            stream(2, MediaType::Audio, "flac", "jpn"),
            stream(3, MediaType::Subtitle, "subrip", "eng"),
            stream(4, MediaType::Subtitle, "hdmv_pgs_subtitle", "eng"),
        ],
        Some(1500.0),
    )
}

pub fn video_only_descriptor() -> MediaDescriptor {
    descriptor(vec![stream(0, MediaType::Video, "h264", "und")], Some(60.0))
}

pub fn request(movie_id: i64, relative_path: &str) -> JobRequest {
    JobRequest {
        movie_id,
        movie_file_id: movie_id * 100,
        folder_path: format!("/movies/Movie {}", movie_id),
        relative_path: relative_path.to_string(),
    }
}

pub fn job(movie_id: i64, relative_path: &str) -> Job {
    Job::new(request(movie_id, relative_path), ".out.mp4")
}

/// Config pointing the library root at `root`.
pub fn config(root: &Path) -> Config {
    let mut config = Config::default();
    config.library.root = root.to_path_buf();
    config.radarr.url = "http://radarr.test".to_string();
    config.radarr.api_key = "test-key".to_string();
    config.selection.audio_languages = vec!["jpn".to_string()];
    config
}

/// Create the job's source file under `root` and return its path.
pub fn create_source(root: &Path, job: &Job) -> PathBuf {
    let path = job.input_path(root);
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).unwrap();
    }
    std::fs::write(&path, b"fake movie data").unwrap();
    path
}

/// Wait until the queue has nothing pending and nothing running.
pub async fn wait_idle(queue: &JobQueue) {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            tokio::task::yield_now().await;
            if queue.pending_len() == 0 && !queue.is_busy() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("queue did not go idle");
}

// ---------------------------------------------------------------------------
// Prober
// ---------------------------------------------------------------------------

/// Answers probes by file name; unknown files fail like a broken ffprobe run.
#[derive(Default)]
pub struct FakeProber {
    descriptors: HashMap<String, MediaDescriptor>,
    pub probed: Mutex<Vec<PathBuf>>,
}

impl FakeProber {
    pub fn with(mut self, file_name: &str, descriptor: MediaDescriptor) -> Self {
        self.descriptors.insert(file_name.to_string(), descriptor);
        self
    }
}

#[async_trait::async_trait]
impl MediaProber for FakeProber {
    async fn probe(&self, path: &Path) -> recodarr_av::Result<MediaDescriptor> {
        self.probed.lock().push(path.to_path_buf());
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        self.descriptors
            .get(&name)
            .cloned()
            .ok_or_else(|| recodarr_av::Error::probe_failed(format!("{}: Invalid data found", name)))
    }
}

// ---------------------------------------------------------------------------
// Transcoder
// ---------------------------------------------------------------------------

/// Replays a fixed list of progress samples for every run.
#[derive(Default)]
pub struct FakeTranscoder {
    samples: Vec<ProgressSample>,
    fail: bool,
    pub specs: Mutex<Vec<EncodeSpec>>,
}

impl FakeTranscoder {
    pub fn with_samples(samples: Vec<ProgressSample>) -> Self {
        Self {
            samples,
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }
}

struct FakeRun {
    samples: VecDeque<ProgressSample>,
    fail: bool,
}

#[async_trait::async_trait]
impl ProgressStream for FakeRun {
    async fn next_sample(&mut self) -> recodarr_av::Result<Option<ProgressSample>> {
        match self.samples.pop_front() {
            Some(sample) => Ok(Some(sample)),
            None if self.fail => Err(recodarr_av::Error::parse("ffmpeg", "encoder crashed")),
            None => Ok(None),
        }
    }
}

#[async_trait::async_trait]
impl Transcoder for FakeTranscoder {
    async fn start(&self, spec: &EncodeSpec) -> recodarr_av::Result<Box<dyn ProgressStream>> {
        self.specs.lock().push(spec.clone());
        Ok(Box::new(FakeRun {
            samples: self.samples.iter().cloned().collect(),
            fail: self.fail,
        }))
    }
}

pub fn sample(speed: &str, current_time_seconds: f64) -> ProgressSample {
    ProgressSample {
        speed: Some(speed.to_string()),
        current_time_seconds: Some(current_time_seconds),
    }
}

// ---------------------------------------------------------------------------
// Reporter
// ---------------------------------------------------------------------------

/// Records every create and update.
#[derive(Default)]
pub struct RecordingReporter {
    pub created: Mutex<Vec<NotificationState>>,
    pub updates: Mutex<Vec<NotificationState>>,
    pub fail_create: bool,
    next_id: AtomicUsize,
}

impl RecordingReporter {
    pub fn failing_create() -> Self {
        Self {
            fail_create: true,
            ..Default::default()
        }
    }

    pub fn updates(&self) -> Vec<NotificationState> {
        self.updates.lock().clone()
    }

    /// Last update sent for an input file.
    pub fn last_update_for(&self, input_file: &str) -> Option<NotificationState> {
        self.updates
            .lock()
            .iter()
            .rev()
            .find(|s| s.input_file == input_file)
            .cloned()
    }
}

#[async_trait::async_trait]
impl Reporter for RecordingReporter {
    async fn create(&self, state: &NotificationState) -> Result<String> {
        if self.fail_create {
            anyhow::bail!("Discord webhook request failed (500 Internal Server Error)");
        }
        self.created.lock().push(state.clone());
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("msg-{}", id))
    }

    async fn update(&self, state: NotificationState) -> NotificationState {
        self.updates.lock().push(state.clone());
        state
    }
}

// ---------------------------------------------------------------------------
// Radarr
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum LibraryCall {
    ListCandidates { movie_id: i64, folder: String },
    ListLanguages,
    Import(Vec<String>),
    DeleteMovieFile(i64),
}

/// In-memory Radarr offering every output name it is told about.
pub struct FakeLibrary {
    languages: Vec<RadarrLanguage>,
    candidates: Vec<ManualImportItem>,
    pub calls: Mutex<Vec<LibraryCall>>,
    pub imported: Mutex<Vec<ManualImportFile>>,
}

impl FakeLibrary {
    pub fn new(candidate_names: &[&str]) -> Self {
        let languages = ["Unknown", "English", "Japanese"]
            .iter()
            .enumerate()
            .map(|(id, name)| RadarrLanguage {
                id: id as i64,
                name: name.to_string(),
            })
            .collect();
        let candidates = candidate_names
            .iter()
            .map(|name| ManualImportItem {
                path: format!("/movies/{}", name),
                relative_path: name.to_string(),
                folder_name: Some("movies".to_string()),
                quality: Some(serde_json::json!({"quality": {"id": 7, "name": "Bluray-1080p"}})),
                languages: vec![],
                release_group: None,
            })
            .collect();

        Self {
            languages,
            candidates,
            calls: Mutex::new(Vec::new()),
            imported: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<LibraryCall> {
        self.calls.lock().clone()
    }
}

#[async_trait::async_trait]
impl MovieLibrary for FakeLibrary {
    async fn list_import_candidates(
        &self,
        movie_id: i64,
        folder: &str,
    ) -> Result<Vec<ManualImportItem>> {
        self.calls.lock().push(LibraryCall::ListCandidates {
            movie_id,
            folder: folder.to_string(),
        });
        Ok(self.candidates.clone())
    }

    async fn list_languages(&self) -> Result<Vec<RadarrLanguage>> {
        self.calls.lock().push(LibraryCall::ListLanguages);
        Ok(self.languages.clone())
    }

    async fn import_files(&self, files: Vec<ManualImportFile>) -> Result<()> {
        self.calls
            .lock()
            .push(LibraryCall::Import(files.iter().map(|f| f.path.clone()).collect()));
        self.imported.lock().extend(files);
        Ok(())
    }

    async fn delete_movie_file(&self, movie_file_id: i64) -> Result<()> {
        self.calls.lock().push(LibraryCall::DeleteMovieFile(movie_file_id));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Queue handler
// ---------------------------------------------------------------------------

/// Handler that records run order and the highest number of concurrent runs.
#[derive(Default)]
pub struct RecordingHandler {
    pub order: Mutex<Vec<String>>,
    active: AtomicUsize,
    pub max_active: AtomicUsize,
    /// Source files whose run should fail.
    pub failing: Vec<String>,
}

impl RecordingHandler {
    pub fn failing_on(files: &[&str]) -> Self {
        Self {
            failing: files.iter().map(|f| f.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn order(&self) -> Vec<String> {
        self.order.lock().clone()
    }
}

#[async_trait::async_trait]
impl JobHandler for RecordingHandler {
    async fn process(&self, job: &mut Job) -> Result<JobOutcome> {
        let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(active, Ordering::SeqCst);
        self.order.lock().push(job.source_relative_path.clone());

        // Give other drain tasks a chance to run while this job is active.
        tokio::time::sleep(Duration::from_millis(10)).await;

        self.active.fetch_sub(1, Ordering::SeqCst);
        if self.failing.contains(&job.source_relative_path) {
            anyhow::bail!("{} is corrupt", job.source_relative_path);
        }
        Ok(JobOutcome::Completed)
    }
}

pub fn queue(handler: Arc<dyn JobHandler>, reporter: Arc<dyn Reporter>) -> Arc<JobQueue> {
    JobQueue::new(handler, reporter)
}
