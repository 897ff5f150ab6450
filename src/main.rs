use clap::{Parser, Subcommand};
use std::future::Future;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;

use mention_bot::application::services::{reply_registry, CommandBot};
use mention_bot::infrastructure::adapters::ConsoleClient;
use mention_bot::infrastructure::config::Config;
use mention_bot::BotError;

/// Grace period for background tasks once the bot stopped. The console
/// reader sits in a blocking stdin read that never finishes on its own.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(100);

#[derive(Parser)]
#[command(name = "mention-bot")]
#[command(about = "A chat bot that answers commands addressed to it", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Bot name (overrides config)
    #[arg(short, long)]
    name: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot
    Run,
    /// Show version
    Version,
    /// Generate default config
    InitConfig,
}

fn main() -> ExitCode {
    // Initialize logging; stdout belongs to the console chat
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run => match run_bot(&cli.config, cli.name) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                tracing::error!("{}", e);
                ExitCode::FAILURE
            }
        },
        Commands::Version => {
            println!("mention-bot v{}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
        Commands::InitConfig => init_config(&cli.config),
    }
}

fn load_config(config_path: &str, name_override: Option<String>) -> Config {
    let mut config = if Path::new(config_path).exists() {
        match Config::load(config_path) {
            Ok(mut config) => {
                config.apply_env();
                config
            }
            Err(e) => {
                tracing::warn!("Failed to load config: {}, using defaults", e);
                Config::load_env()
            }
        }
    } else {
        Config::load_env()
    };

    if let Some(name) = name_override {
        config.bot.name = name;
    }
    config
}

fn run_bot(config_path: &str, name_override: Option<String>) -> Result<(), BotError> {
    let config = load_config(config_path, name_override);
    config.validate()?;

    tracing::info!("Starting mention-bot: {}", config.bot.name);

    let rt = Runtime::new()
        .map_err(|e| BotError::Internal(format!("Failed to start runtime: {}", e)))?;

    block_on_then_shutdown(rt, async {
        let cancel = CancellationToken::new();
        let client = Arc::new(
            ConsoleClient::new(&config.bot.name, &config.console).close_on_eof(cancel.clone()),
        );

        let registry = reply_registry(client.clone(), &config.commands);
        let bot = CommandBot::new(config.bot_settings(), client, registry).await?;
        tracing::info!(
            "Type '@{} <command>' to talk to the bot. Commands: {}",
            config.bot.name,
            bot.commands().join(", ")
        );

        let shutdown = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Shutting down");
                shutdown.cancel();
            }
        });

        bot.start(&cancel).await
    })
}

/// Drive `future` to completion, then shut the runtime down without waiting
/// on blocking tasks past [`SHUTDOWN_GRACE`]
fn block_on_then_shutdown<F: Future>(rt: Runtime, future: F) -> F::Output {
    let output = rt.block_on(future);
    rt.shutdown_timeout(SHUTDOWN_GRACE);
    output
}

fn init_config(config_path: &str) -> ExitCode {
    if Path::new(config_path).exists() {
        tracing::warn!("{} already exists, not overwriting", config_path);
        return ExitCode::FAILURE;
    }

    let yaml = match Config::default().to_yaml() {
        Ok(yaml) => yaml,
        Err(e) => {
            tracing::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    match std::fs::write(config_path, yaml) {
        Ok(()) => {
            println!("Wrote default config to {}", config_path);
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("Failed to write {}: {}", config_path, e);
            ExitCode::FAILURE
        }
    }
}
