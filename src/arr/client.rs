use super::types::{ManualImportCommand, ManualImportFile, ManualImportItem, RadarrLanguage};
use crate::config::RadarrConfig;
use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// Request timeout for Radarr API calls; manual import scans can be slow
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Media-management operations the import step needs
#[async_trait::async_trait]
pub trait MovieLibrary: Send + Sync {
    /// Files Radarr would import from `folder` for the movie
    async fn list_import_candidates(
        &self,
        movie_id: i64,
        folder: &str,
    ) -> Result<Vec<ManualImportItem>>;

    /// Languages Radarr can tag files with
    async fn list_languages(&self) -> Result<Vec<RadarrLanguage>>;

    /// Trigger a manual import of the given files
    async fn import_files(&self, files: Vec<ManualImportFile>) -> Result<()>;

    /// Remove a movie file record
    async fn delete_movie_file(&self, movie_file_id: i64) -> Result<()>;
}

pub struct RadarrClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl RadarrClient {
    pub fn new(config: &RadarrConfig) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to build HTTP client with timeout: {}", e);
                Client::new()
            });

        Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v3{}", self.base_url, path)
    }

    async fn send(&self, request: RequestBuilder, context_msg: &str) -> Result<Response> {
        let response = request
            .header("X-Api-Key", &self.api_key)
            .header("Accept", "application/json")
            .send()
            .await
            .with_context(|| context_msg.to_string())?;

        let status = response.status();
        tracing::debug!("[INCOMING] {} {}", response.url(), status);

        if !status.is_success() {
            let error = response.text().await.unwrap_or_default();
            anyhow::bail!("{} ({}): {}", context_msg, status, error);
        }
        Ok(response)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let context_msg = format!("Failed to GET {}", path);
        tracing::debug!("[OUTGOING] GET {} {:?}", path, query);

        let response = self
            .send(self.client.get(self.url(path)).query(query), &context_msg)
            .await?;
        response.json().await.context(context_msg)
    }

    async fn post_command<T: Serialize>(&self, command: &T, context_msg: &str) -> Result<()> {
        tracing::debug!("[OUTGOING] POST /command");
        self.send(self.client.post(self.url("/command")).json(command), context_msg)
            .await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl MovieLibrary for RadarrClient {
    async fn list_import_candidates(
        &self,
        movie_id: i64,
        folder: &str,
    ) -> Result<Vec<ManualImportItem>> {
        self.get(
            "/manualimport",
            &[
                ("movieId", movie_id.to_string()),
                ("folder", folder.to_string()),
                ("filterExistingFiles", "false".to_string()),
            ],
        )
        .await
    }

    async fn list_languages(&self) -> Result<Vec<RadarrLanguage>> {
        self.get("/language", &[]).await
    }

    async fn import_files(&self, files: Vec<ManualImportFile>) -> Result<()> {
        let command = ManualImportCommand {
            name: "ManualImport",
            import_mode: "auto",
            files,
        };

        self.post_command(&command, "Failed to trigger Radarr manual import")
            .await
    }

    async fn delete_movie_file(&self, movie_file_id: i64) -> Result<()> {
        let path = format!("/moviefile/{}", movie_file_id);
        tracing::debug!("[OUTGOING] DELETE {}", path);
        self.send(
            self.client.delete(self.url(&path)),
            &format!("Failed to delete movie file {}", movie_file_id),
        )
        .await?;
        Ok(())
    }
}
