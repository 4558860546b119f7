//! Per-job pipeline: probe, select, transcode, then hand the output back to
//! Radarr.

use crate::arr::{self, ManualImportFile, MovieLibrary};
use crate::config::Config;
use crate::notifications::Reporter;
use crate::state::{Job, JobHandler, JobOutcome};
use anyhow::{Context, Result};
use recodarr_av::{EncodeSettings, EncodeSpec, MediaProber, SelectionPolicy, Transcoder};
use std::path::PathBuf;
use std::sync::Arc;

/// Job processor that runs the transcode pipeline for queued jobs
pub struct JobProcessor {
    prober: Arc<dyn MediaProber>,
    transcoder: Arc<dyn Transcoder>,
    reporter: Arc<dyn Reporter>,
    library: Arc<dyn MovieLibrary>,
    library_root: PathBuf,
    policy: SelectionPolicy,
    settings: EncodeSettings,
}

impl JobProcessor {
    pub fn new(
        config: &Config,
        prober: Arc<dyn MediaProber>,
        transcoder: Arc<dyn Transcoder>,
        reporter: Arc<dyn Reporter>,
        library: Arc<dyn MovieLibrary>,
    ) -> Self {
        Self {
            prober,
            transcoder,
            reporter,
            library,
            library_root: config.library.root.clone(),
            policy: config.selection.clone(),
            settings: config.encode.settings.clone(),
        }
    }

    async fn publish(&self, job: &mut Job) {
        job.notification = self.reporter.update(job.notification.clone()).await;
    }

    /// Run ffmpeg, pushing every progress snapshot before reading the next.
    async fn transcode(&self, job: &mut Job, spec: &EncodeSpec) -> Result<()> {
        tracing::debug!("ffmpeg {}", spec.to_args().join(" "));

        let mut progress = self
            .transcoder
            .start(spec)
            .await
            .context("Failed to start ffmpeg")?;

        while let Some(sample) = progress.next_sample().await? {
            job.notification.apply_progress(&sample);
            self.publish(job).await;
        }
        Ok(())
    }

    /// Tag the output with the kept audio language and import it into Radarr.
    async fn import_output(&self, job: &Job, audio_language: &str) -> Result<()> {
        let languages = self
            .library
            .list_languages()
            .await
            .context("Failed to list Radarr languages")?;
        let language = arr::resolve_language(audio_language, &languages)?;

        let candidates = self
            .library
            .list_import_candidates(job.movie_id, &job.folder_path)
            .await
            .context("Failed to list import candidates")?;
        let candidate = arr::find_candidate(&candidates, &job.output_file_name, job.movie_id)?;

        tracing::info!(
            "Importing {} for movie {} as {}",
            candidate.path,
            job.movie_id,
            language.name
        );
        let file = ManualImportFile::from_candidate(candidate, job.movie_id, vec![language]);
        self.library.import_files(vec![file]).await?;

        self.library
            .delete_movie_file(job.movie_file_id)
            .await
            .with_context(|| format!("Failed to delete movie file {}", job.movie_file_id))?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl JobHandler for JobProcessor {
    async fn process(&self, job: &mut Job) -> Result<JobOutcome> {
        let input_path = job.input_path(&self.library_root);
        let output_path = job.output_path(&self.library_root);

        job.start();
        self.publish(job).await;

        let descriptor = self
            .prober
            .probe(&input_path)
            .await
            .with_context(|| format!("Failed to probe {:?}", input_path))?;

        let Some(selection) = self.policy.select(&descriptor) else {
            return Ok(JobOutcome::Skipped(format!(
                "no video or audio stream in {:?}",
                input_path
            )));
        };

        tracing::info!(
            "Keeping audio stream {} ({}) and {} subtitle stream(s)",
            selection.audio.type_index,
            selection.audio.language,
            selection.subtitles.len()
        );
        job.notification.audio_language = Some(selection.audio.language.clone());
        job.notification.total_time_seconds = descriptor.duration_seconds;
        self.publish(job).await;

        let spec = EncodeSpec::from_selection(&input_path, &output_path, &selection, &self.settings);
        self.transcode(job, &spec).await?;

        job.complete();
        self.publish(job).await;

        tokio::fs::remove_file(&input_path)
            .await
            .with_context(|| format!("Failed to delete source file {:?}", input_path))?;
        tracing::info!("Deleted source file {:?}", input_path);

        self.import_output(job, &selection.audio.language).await?;
        Ok(JobOutcome::Completed)
    }
}
