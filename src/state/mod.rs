//! Job queue and worker loop.
//!
//! At most one job runs at a time. Jobs are taken from the *end* of the
//! pending list, so the most recently triggered import runs next. This LIFO
//! order is long-standing behavior; whether newest-first is wanted or FIFO
//! would be better is still undecided, so it is kept and covered by tests.

mod types;

pub use types::*;

use crate::notifications::Reporter;
use anyhow::{Context, Result};
use futures::FutureExt;
use parking_lot::Mutex;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use uuid::Uuid;

/// How a job ended when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    /// Output produced and imported.
    Completed,
    /// Nothing to do for this file (e.g. it has no audio stream).
    Skipped(String),
}

/// Runs a single job to completion.
#[async_trait::async_trait]
pub trait JobHandler: Send + Sync {
    async fn process(&self, job: &mut Job) -> Result<JobOutcome>;
}

#[derive(Default)]
struct QueueInner {
    pending: Vec<Job>,
    busy: bool,
}

/// Single-worker job queue.
pub struct JobQueue {
    inner: Mutex<QueueInner>,
    handler: Arc<dyn JobHandler>,
    reporter: Arc<dyn Reporter>,
}

impl JobQueue {
    pub fn new(handler: Arc<dyn JobHandler>, reporter: Arc<dyn Reporter>) -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(QueueInner::default()),
            handler,
            reporter,
        })
    }

    /// Create the job's notification message, then queue the job.
    ///
    /// A job whose notification cannot be created is not queued.
    pub async fn admit(self: &Arc<Self>, mut job: Job) -> Result<Uuid> {
        let remote_id = self
            .reporter
            .create(&job.notification)
            .await
            .with_context(|| format!("Failed to create notification for job {}", job.id))?;
        job.notification.remote_id = Some(remote_id);

        let id = job.id;
        self.enqueue(job);
        Ok(id)
    }

    /// Append a job and schedule a drain.
    pub fn enqueue(self: &Arc<Self>, job: Job) {
        tracing::info!(
            "Adding to queue: job {} (movie {}, {})",
            job.id,
            job.movie_id,
            job.source_relative_path
        );
        self.inner.lock().pending.push(job);

        let queue = Arc::clone(self);
        tokio::spawn(async move {
            queue.drain().await;
        });
    }

    /// Run jobs until the queue is empty or another drain holds the worker.
    pub async fn drain(&self) {
        while self.drain_one().await {}
    }

    /// Run the newest pending job if the worker is idle.
    ///
    /// Returns `false` without doing anything when the worker is busy or the
    /// queue is empty.
    pub async fn drain_one(&self) -> bool {
        let (job, _busy) = {
            let mut inner = self.inner.lock();
            if inner.busy {
                return false;
            }
            let Some(job) = inner.pending.pop() else {
                return false;
            };
            inner.busy = true;
            (job, BusyGuard { queue: self })
        };

        self.run(job).await;
        true
    }

    async fn run(&self, mut job: Job) {
        let job_id = job.id;
        tracing::info!("Processing job {}: {}", job_id, job.source_relative_path);

        let result = AssertUnwindSafe(self.handler.process(&mut job))
            .catch_unwind()
            .await
            .unwrap_or_else(|payload| Err(anyhow::anyhow!(panic_message(payload.as_ref()))));

        match result {
            Ok(JobOutcome::Completed) => {
                tracing::info!("Job {} completed successfully", job_id);
            }
            Ok(JobOutcome::Skipped(reason)) => {
                tracing::info!("Job {} skipped: {}", job_id, reason);
            }
            Err(e) => {
                tracing::error!("Job {} failed: {:#}", job_id, e);
                job.fail(&failure_message(&e));
                job.notification = self.reporter.update(job.notification.clone()).await;
            }
        }
    }

    /// Number of jobs waiting to run.
    pub fn pending_len(&self) -> usize {
        self.inner.lock().pending.len()
    }

    /// Ids of waiting jobs, next to run first.
    pub fn pending_ids(&self) -> Vec<Uuid> {
        self.inner.lock().pending.iter().rev().map(|j| j.id).collect()
    }

    pub fn is_busy(&self) -> bool {
        self.inner.lock().busy
    }
}

/// Clears the busy flag when the running job is done, even on panic.
struct BusyGuard<'a> {
    queue: &'a JobQueue,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.queue.inner.lock().busy = false;
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("Job panicked: {}", message)
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("Job panicked: {}", message)
    } else {
        "Unknown error".to_string()
    }
}

fn failure_message(err: &anyhow::Error) -> String {
    let message = format!("{:#}", err);
    if message.trim().is_empty() {
        "Unknown error".to_string()
    } else {
        message
    }
}
