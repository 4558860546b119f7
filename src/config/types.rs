use recodarr_av::{EncodeSettings, SelectionPolicy};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub library: LibraryConfig,

    #[serde(default)]
    pub radarr: RadarrConfig,

    #[serde(default)]
    pub discord: DiscordConfig,

    #[serde(default)]
    pub selection: SelectionPolicy,

    #[serde(default)]
    pub encode: EncodeConfig,

    #[serde(default)]
    pub tools: ToolsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LibraryConfig {
    /// Directory the webhook's `folderPath` values are resolved against
    #[serde(default = "default_library_root")]
    pub root: PathBuf,
}

fn default_library_root() -> PathBuf {
    PathBuf::from("/")
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            root: default_library_root(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RadarrConfig {
    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub api_key: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DiscordConfig {
    /// Webhook URL; progress is only logged when unset
    #[serde(default)]
    pub webhook_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EncodeConfig {
    #[serde(flatten)]
    pub settings: EncodeSettings,

    /// Replaces the source extension to form the output file name (default: ".out.mp4")
    #[serde(default = "default_output_suffix")]
    pub output_suffix: String,
}

fn default_output_suffix() -> String {
    ".out.mp4".to_string()
}

impl Default for EncodeConfig {
    fn default() -> Self {
        Self {
            settings: EncodeSettings::default(),
            output_suffix: default_output_suffix(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ToolsConfig {
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,

    #[serde(default)]
    pub ffprobe_path: Option<PathBuf>,
}
