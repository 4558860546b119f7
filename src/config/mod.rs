mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    apply_env_overrides(&mut config)?;
    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./config.toml",
        "./recodarr.toml",
        "~/.config/recodarr/config.toml",
        "/etc/recodarr/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    // No file: environment only
    let mut config = Config::default();
    apply_env_overrides(&mut config)?;
    validate_config(&config)?;
    Ok(config)
}

/// Environment variables win over file values.
///
/// Supported: `LIBRARY_PATH`, `RADARR_URL`, `RADARR_API_KEY`,
/// `DISCORD_WEBHOOK_URL`, `PORT`.
pub fn apply_env_overrides(config: &mut Config) -> Result<()> {
    if let Some(root) = env_var("LIBRARY_PATH") {
        config.library.root = PathBuf::from(root);
    }
    if let Some(url) = env_var("RADARR_URL") {
        config.radarr.url = url;
    }
    if let Some(key) = env_var("RADARR_API_KEY") {
        config.radarr.api_key = key;
    }
    if let Some(url) = env_var("DISCORD_WEBHOOK_URL") {
        config.discord.webhook_url = Some(url);
    }
    if let Some(port) = env_var("PORT") {
        config.server.port = port
            .parse()
            .with_context(|| format!("Invalid PORT value: {}", port))?;
    }
    Ok(())
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.server.port == 0 {
        anyhow::bail!("Server port cannot be 0");
    }

    if config.radarr.url.is_empty() {
        anyhow::bail!("Radarr URL is not configured (radarr.url or RADARR_URL)");
    }
    if config.radarr.api_key.is_empty() {
        anyhow::bail!("Radarr API key is not configured (radarr.api_key or RADARR_API_KEY)");
    }

    if config.encode.settings.stats_period_secs == 0 {
        anyhow::bail!("encode.stats_period_secs must be greater than 0");
    }

    if !config.library.root.exists() {
        tracing::warn!("Library root does not exist: {:?}", config.library.root);
    }

    if config.discord.webhook_url.is_none() {
        tracing::warn!("No Discord webhook configured, job progress will only be logged");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    const ENV_VARS: [&str; 5] = [
        "LIBRARY_PATH",
        "RADARR_URL",
        "RADARR_API_KEY",
        "DISCORD_WEBHOOK_URL",
        "PORT",
    ];

    fn clear_env() {
        for name in ENV_VARS {
            std::env::remove_var(name);
        }
    }

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    #[serial]
    fn test_load_full_config() {
        clear_env();
        let file = write_config(
            r#"
            [server]
            port = 9090

            [library]
            root = "/data/movies"

            [radarr]
            url = "http://radarr:7878"
            api_key = "abc"

            [discord]
            webhook_url = "https://discord.com/api/webhooks/1/token"

            [selection]
            audio_languages = ["jpn"]
            subtitle_languages = ["eng", "fre"]

            [encode]
            audio_codec = "libfdk_aac"
            stats_period_secs = 10
            "#,
        );

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.library.root, PathBuf::from("/data/movies"));
        assert_eq!(config.radarr.api_key, "abc");
        assert_eq!(config.selection.audio_languages, vec!["jpn"]);
        assert!(config.selection.prefer_unsubtitled_audio);
        assert_eq!(config.encode.settings.audio_codec, "libfdk_aac");
        assert_eq!(config.encode.settings.subtitle_codec, "mov_text");
        assert_eq!(config.encode.settings.stats_period_secs, 10);
        assert_eq!(config.encode.output_suffix, ".out.mp4");
    }

    #[test]
    #[serial]
    fn test_env_overrides_file() {
        clear_env();
        let file = write_config(
            r#"
            [radarr]
            url = "http://radarr:7878"
            api_key = "from-file"
            "#,
        );
        std::env::set_var("RADARR_API_KEY", "from-env");
        std::env::set_var("PORT", "3000");
        std::env::set_var("LIBRARY_PATH", "/mnt/library");

        let config = load_config(file.path()).unwrap();
        clear_env();

        assert_eq!(config.radarr.api_key, "from-env");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.library.root, PathBuf::from("/mnt/library"));
    }

    #[test]
    #[serial]
    fn test_invalid_port_env() {
        clear_env();
        let mut config = Config::default();
        std::env::set_var("PORT", "not-a-port");
        let result = apply_env_overrides(&mut config);
        clear_env();
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_requires_radarr() {
        let config = Config::default();
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("Radarr URL"));

        let mut config = Config::default();
        config.radarr.url = "http://radarr:7878".to_string();
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("API key"));

        config.radarr.api_key = "abc".to_string();
        assert!(validate_config(&config).is_ok());

        config.encode.settings.stats_period_secs = 0;
        assert!(validate_config(&config).is_err());
    }
}
