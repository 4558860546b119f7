mod cli;

use recodarr::{
    arr::RadarrClient,
    config::{self, Config},
    notifications,
    processor::JobProcessor,
    server,
    state::JobQueue,
};
use recodarr_av::{Ffprobe, FfmpegTranscoder, MediaProber};

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use std::path::Path;
use std::sync::Arc;

async fn start_server(
    host: Option<String>,
    port: Option<u16>,
    config_path: Option<&Path>,
) -> Result<()> {
    let mut config = config::load_config_or_default(config_path)?;

    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    tracing::info!("Starting recodarr");
    tracing::info!("Library root: {:?}", config.library.root);
    tracing::info!("Radarr: {}", config.radarr.url);

    let ffprobe = recodarr_av::get_tool_path("ffprobe", config.tools.ffprobe_path.as_deref())?;
    let ffmpeg = recodarr_av::get_tool_path("ffmpeg", config.tools.ffmpeg_path.as_deref())?;
    tracing::info!("Using {:?} and {:?}", ffmpeg, ffprobe);

    let config = Arc::new(config);
    let reporter = notifications::create_reporter(&config);
    let processor = JobProcessor::new(
        &config,
        Arc::new(Ffprobe::new(ffprobe)),
        Arc::new(FfmpegTranscoder::new(ffmpeg)),
        Arc::clone(&reporter),
        Arc::new(RadarrClient::new(&config.radarr)),
    );
    let queue = JobQueue::new(Arc::new(processor), reporter);

    let result = server::start_server(config, Arc::clone(&queue)).await;

    let pending = queue.pending_len();
    if pending > 0 || queue.is_busy() {
        tracing::warn!(
            "Shutting down with {} queued job(s){}",
            pending,
            if queue.is_busy() { " and one in progress" } else { "" }
        );
    }

    result
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "recodarr=trace,recodarr_av=trace,tower_http=debug".to_string()
        } else {
            "recodarr=info,recodarr_av=info,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Start { host, port } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(host, port, cli.config.as_deref()))
        }
        Commands::Probe { file, json } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(probe_file(&file, json, cli.config.as_deref()))
        }
        Commands::CheckTools => check_tools(cli.config.as_deref()),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("recodarr {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Config for offline commands; Radarr settings are not required there.
fn offline_config(config_path: Option<&Path>) -> Config {
    config::load_config_or_default(config_path).unwrap_or_else(|e| {
        tracing::debug!("Using default config: {:#}", e);
        Config::default()
    })
}

async fn probe_file(file: &Path, json: bool, config_path: Option<&Path>) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {:?}", file);
    }

    let config = offline_config(config_path);
    let ffprobe = recodarr_av::get_tool_path("ffprobe", config.tools.ffprobe_path.as_deref())?;
    let descriptor = Ffprobe::new(ffprobe).probe(file).await?;
    let selection = config.selection.select(&descriptor);

    if json {
        let json_str = serde_json::to_string_pretty(&serde_json::json!({
            "descriptor": descriptor,
            "selection": selection,
        }))?;
        println!("{}", json_str);
        return Ok(());
    }

    println!("File: {}", file.display());
    match descriptor.duration_seconds {
        Some(duration) => println!(
            "Duration: {}",
            notifications::render::format_seconds(duration)
        ),
        None => println!("Duration: unknown"),
    }

    println!("\nStreams: {}", descriptor.streams.len());
    for stream in &descriptor.streams {
        println!(
            "  [{}] {}:{} {} ({})",
            stream.index, stream.media_type, stream.type_index, stream.codec_name, stream.language
        );
    }

    match selection {
        Some(selection) => {
            println!("\nWould keep:");
            println!("  Video: {}:{}", selection.video.media_type, selection.video.type_index);
            println!(
                "  Audio: {}:{} ({})",
                selection.audio.media_type, selection.audio.type_index, selection.audio.language
            );
            for subtitle in &selection.subtitles {
                let note = if recodarr_av::encode::is_text_subtitle(&subtitle.codec_name) {
                    ""
                } else {
                    " [bitmap, dropped]"
                };
                println!(
                    "  Subtitle: {}:{} ({}){}",
                    subtitle.media_type, subtitle.type_index, subtitle.language, note
                );
            }
        }
        None => println!("\nNo video or audio stream, file would be left alone"),
    }

    Ok(())
}

fn check_tools(config_path: Option<&Path>) -> Result<()> {
    println!("Checking external tools...\n");

    let config = offline_config(config_path);
    let tools = recodarr_av::check_tools(
        config.tools.ffmpeg_path.as_deref(),
        config.tools.ffprobe_path.as_deref(),
    );
    let mut all_ok = true;

    for tool in &tools {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, tool.name);

        if let Some(ref version) = tool.version {
            print!(" ({})", version.lines().next().unwrap_or(""));
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    println!();
    if all_ok {
        println!("All required tools are available!");
        Ok(())
    } else {
        anyhow::bail!("ffmpeg and ffprobe are both required")
    }
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => println!("Validating config: {:?}", p),
        None => println!("Validating config from default locations and environment"),
    }

    let config = config::load_config_or_default(path)?;
    println!("✓ Configuration is valid");
    println!("  Server: {}:{}", config.server.host, config.server.port);
    println!("  Library root: {:?}", config.library.root);
    println!("  Radarr: {}", config.radarr.url);
    println!(
        "  Discord: {}",
        if config.discord.webhook_url.is_some() {
            "configured"
        } else {
            "not configured"
        }
    );
    println!(
        "  Audio languages: {}",
        config.selection.audio_languages.join(", ")
    );
    println!(
        "  Subtitle languages: {}",
        config.selection.subtitle_languages.join(", ")
    );

    Ok(())
}
