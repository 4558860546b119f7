pub mod discord;
pub mod render;

pub use discord::DiscordReporter;

use crate::config::Config;
use crate::state::NotificationState;
use anyhow::Result;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Mirrors job state to an external notification channel.
#[async_trait::async_trait]
pub trait Reporter: Send + Sync {
    /// Create the remote message and return its id.
    async fn create(&self, state: &NotificationState) -> Result<String>;

    /// Push the full state to the remote message.
    ///
    /// Best-effort: failures are logged and `state` is returned unchanged.
    async fn update(&self, state: NotificationState) -> NotificationState;
}

/// Reporter used when no notification channel is configured.
#[derive(Default)]
pub struct NullReporter {
    next_id: AtomicU64,
}

#[async_trait::async_trait]
impl Reporter for NullReporter {
    async fn create(&self, state: &NotificationState) -> Result<String> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::info!("[{}] {:?}: {}", id, state.status, state.input_file);
        Ok(id.to_string())
    }

    async fn update(&self, state: NotificationState) -> NotificationState {
        match state.progress() {
            Some(progress) => tracing::debug!(
                "[{}] {:?}: {} {:.1}% ({})",
                state.remote_id.as_deref().unwrap_or("-"),
                state.status,
                state.input_file,
                progress * 100.0,
                state.speed.as_deref().unwrap_or("-")
            ),
            None => tracing::info!(
                "[{}] {:?}: {}",
                state.remote_id.as_deref().unwrap_or("-"),
                state.status,
                state.input_file
            ),
        }
        state
    }
}

/// Pick the reporter for the configured channel.
pub fn create_reporter(config: &Config) -> Arc<dyn Reporter> {
    match config.discord.webhook_url.as_deref() {
        Some(url) if !url.is_empty() => Arc::new(DiscordReporter::new(url)),
        _ => Arc::new(NullReporter::default()),
    }
}
