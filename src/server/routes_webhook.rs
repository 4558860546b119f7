use crate::arr::RadarrWebhook;
use crate::server::AppContext;
use crate::state::Job;
use axum::{extract::State, response::IntoResponse, routing::post, Json, Router};
use std::sync::Arc;

/// Radarr is pointed at either `/` or `/webhook`.
pub fn webhook_routes() -> Router<AppContext> {
    Router::new()
        .route("/", post(handle_webhook))
        .route("/webhook", post(handle_webhook))
}

/// Acknowledge the webhook and admit the job in the background.
async fn handle_webhook(
    State(ctx): State<AppContext>,
    Json(webhook): Json<RadarrWebhook>,
) -> impl IntoResponse {
    let event_type = webhook.event_type.as_deref().unwrap_or("Download");
    tracing::info!(
        "Received Radarr webhook: {} for {}",
        event_type,
        webhook
            .movie
            .title
            .as_deref()
            .unwrap_or(&webhook.movie_file.relative_path)
    );

    if !webhook.is_import() {
        tracing::debug!("Ignoring event type: {}", event_type);
        return Json(serde_json::json!({
            "status": "ignored",
            "reason": format!("Event type '{}' not processed", event_type)
        }));
    }

    let job = Job::new(webhook.to_request(), &ctx.config.encode.output_suffix);
    let job_id = job.id;
    let file = job.source_relative_path.clone();

    let queue = Arc::clone(&ctx.queue);
    tokio::spawn(async move {
        if let Err(e) = queue.admit(job).await {
            tracing::error!("Failed to queue job {}: {:#}", job_id, e);
        }
    });

    Json(serde_json::json!({
        "status": "accepted",
        "job_id": job_id,
        "file": file
    }))
}
