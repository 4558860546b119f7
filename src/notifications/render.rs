//! Discord embed rendering for job notifications.

use crate::state::{JobStatus, NotificationState};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

const PROGRESS_BAR_SIZE: usize = 20;

#[derive(Debug, Clone, Serialize)]
pub struct WebhookMessage {
    pub embeds: Vec<Embed>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Embed {
    pub title: String,
    pub color: u32,
    pub timestamp: String,
    pub footer: EmbedFooter,
    pub fields: Vec<EmbedField>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmbedFooter {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub inline: bool,
}

/// Color and label shown for a job status.
pub fn status_style(status: JobStatus) -> (u32, &'static str) {
    match status {
        JobStatus::Queued => (0xa855f7, "Queued"),
        JobStatus::Processing => (0xf97316, "Converting"),
        JobStatus::Done => (0x84cc16, "Done"),
        JobStatus::Error => (0xef4444, "Error"),
    }
}

/// Render the full message for a notification state.
pub fn render_message(state: &NotificationState) -> WebhookMessage {
    let (color, label) = status_style(state.status);

    let mut fields = vec![field("Status", Some(label.to_string()), false)];
    fields.extend([
        field("Input file", Some(state.input_file.clone()), true),
        field("Output file", state.output_file.clone(), true),
        field("Audio language", state.audio_language.clone(), true),
        field("Speed", state.speed.clone(), true),
        field("Duration", state.total_time_seconds.map(format_seconds), true),
        field(
            "Current Timestamp",
            state.current_time_seconds.map(format_seconds),
            true,
        ),
        field("Progress", state.progress().map(progress_bar), false),
        field(
            "Error Message",
            state
                .error_message
                .as_ref()
                .filter(|e| !e.is_empty())
                .map(|e| format!("```\n{}\n```", e)),
            false,
        ),
    ]);

    WebhookMessage {
        embeds: vec![Embed {
            title: "Converting file".to_string(),
            color,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            footer: EmbedFooter {
                text: "Last update".to_string(),
            },
            fields: fields.into_iter().flatten().collect(),
        }],
    }
}

fn field(name: &str, value: Option<String>, inline: bool) -> Option<EmbedField> {
    value.map(|value| EmbedField {
        name: name.to_string(),
        value,
        inline,
    })
}

/// `3725.9` → `1h 2m 5s`. Zero components are left out; zero itself is `0s`.
pub fn format_seconds(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.trunc() as u64
    } else {
        0
    };
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);

    let parts: Vec<String> = [(h, "h"), (m, "m"), (s, "s")]
        .iter()
        .filter(|(value, _)| *value > 0)
        .map(|(value, unit)| format!("{}{}", value, unit))
        .collect();

    if parts.is_empty() {
        "0s".to_string()
    } else {
        parts.join(" ")
    }
}

/// Fixed-width glyph bar followed by the percentage, e.g. `██████░░… 30.0%`.
pub fn progress_bar(progress: f64) -> String {
    let bar: String = (0..PROGRESS_BAR_SIZE)
        .map(|i| {
            if (i as f64 / PROGRESS_BAR_SIZE as f64) < progress {
                '█'
            } else {
                '░'
            }
        })
        .collect();
    format!("{} {:.1}%", bar, progress * 100.0)
}
