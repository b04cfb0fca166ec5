//! CLI entrypoint for threadline
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use threadline_application::{
    ConversationController, ConversationLogger, HydrationStatus, SendOutcome, ThreadIdentityStore,
};
use threadline_infrastructure::{
    ConfigLoader, FileConfig, FileThreadStore, HttpChatGateway, JsonlConversationLogger,
};
use threadline_presentation::{ChatRepl, Cli, ConsoleRenderer};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// Initialize logging. `RUST_LOG` wins over the `-v` count when set.
///
/// The returned guard must live until exit so the file writer flushes.
fn init_logging(verbose: u8, log_file: Option<&Path>) -> Option<WorkerGuard> {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let directory = path.parent().unwrap_or_else(|| Path::new("."));
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "threadline.log".to_string());
            let _ = std::fs::create_dir_all(directory);
            let appender = tracing_appender::rolling::never(directory, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    guard
}

/// Merge configuration sources and apply CLI overrides. Not validated yet.
fn load_config(cli: &Cli) -> Result<FileConfig> {
    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())
            .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?
    };

    if let Some(base_url) = &cli.base_url {
        config.service.base_url = base_url.clone();
    }

    Ok(config)
}

/// Effective configuration as TOML, for `--show-config`.
fn render_config(config: &FileConfig) -> Result<String> {
    let mut rendered = toml::to_string_pretty(config)?;
    if let Err(e) = config.validate() {
        rendered.push_str(&format!("\n# Invalid configuration: {}\n", e));
    }
    Ok(rendered)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_deref());
        println!();
        println!("Effective configuration:");
        println!("{}", render_config(&config)?);
        return Ok(());
    }
    config.validate().context("Invalid configuration")?;

    let _log_guard = init_logging(cli.verbose, config.logging.log_file_path().as_deref());
    info!("Starting threadline against {}", config.service.base_url);

    // === Dependency Injection ===
    let gateway = Arc::new(
        HttpChatGateway::new(&config.service.to_gateway_settings())
            .context("Failed to create HTTP client")?,
    );

    let Some(state_file) = config.storage.resolve_state_file() else {
        bail!("Could not determine a state file location; set storage.state_file");
    };
    let store = Arc::new(FileThreadStore::new(state_file, &config.storage.thread_key));

    if cli.new_thread {
        match store.clear() {
            Ok(()) => info!("Cleared stored thread; starting a new conversation"),
            Err(e) => warn!("Could not clear stored thread: {}", e),
        }
    }

    let show_progress = config.repl.show_progress && !cli.quiet;
    let renderer = Arc::new(ConsoleRenderer::new().with_progress(show_progress));

    let mut controller = ConversationController::new(gateway, store).with_observer(renderer);
    if let Some(path) = config.logging.conversation_log_path() {
        match JsonlConversationLogger::new(&path) {
            Some(logger) => {
                info!("Conversation log: {}", logger.path().display());
                let logger: Arc<dyn ConversationLogger> = Arc::new(logger);
                controller = controller.with_conversation_logger(logger);
            }
            None => warn!("Conversation logging disabled"),
        }
    }
    let controller = Arc::new(controller);

    if controller.hydrate().await == HydrationStatus::Failed {
        warn!("Could not load conversation history; continuing without it");
    }

    let repl = ChatRepl::new(Arc::clone(&controller));

    // One-shot mode
    if let Some(message) = cli.message {
        return match repl.send_message(&message).await {
            SendOutcome::Completed(_) => Ok(()),
            SendOutcome::Failed(failure) => bail!("Reply failed: {:?}", failure),
            SendOutcome::Rejected(reason) => bail!("Message not sent: {:?}", reason),
            SendOutcome::Interrupted => bail!("Reply interrupted"),
        };
    }

    let history_file = config.repl.history_file_path();
    let repl = match history_file {
        Some(path) => repl.with_history_file(Some(path)),
        None => repl,
    };
    repl.run().await?;

    Ok(())
}
