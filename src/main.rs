// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, warn};
use std::fs::{File, OpenOptions};
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::app_config::Config;
use app_controller::Controller;

mod app_config;
mod app_controller;
mod errors;
mod repository;
mod status_fetch;
mod translation_sync;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

fn level_filter(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Synchronize translations with the service and publish to the repository
    #[command(alias = "txupdate")]
    TxUpdate(TxUpdateArgs),

    /// Download the status file with crash-safe replacement
    FetchStatus {
        /// Target file path
        #[arg(value_name = "TARGET")]
        target: PathBuf,
    },

    /// Generate shell completions for txbot
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct TxUpdateArgs {
    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Repository working-copy path (overrides the config file)
    #[arg(short, long)]
    repo_dir: Option<PathBuf>,

    /// Branch to update (overrides the config file)
    #[arg(short, long)]
    branch: Option<String>,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// txbot - translation maintenance buildbot
///
/// Automates server-side maintenance: keeps the project's translation source
/// file synchronized with the translation service and publishes the results
/// back to the project's git repository.
#[derive(Parser, Debug)]
#[command(name = "txbot")]
#[command(version)]
#[command(about = "Translation maintenance buildbot")]
#[command(long_about = "txbot automates server-side maintenance actions.

EXAMPLES:
    txbot tx-update                        # Update translations using conf.json
    txbot tx-update -c /etc/txbot.json     # Use a specific config file
    txbot tx-update --log-level debug      # Verbose run
    txbot fetch-status status.txt          # Mirror the status file locally
    txbot completions bash > txbot.bash    # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a
    different config file with --config-path. If the config file doesn't
    exist, a default one will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
    file: Option<Mutex<File>>,
}

impl CustomLogger {
    // @initializes: Global logger, with an optional duplicate file sink
    fn init(level: LevelFilter, log_file: Option<&Path>) -> Result<()> {
        let file = match log_file {
            Some(path) => {
                let handle = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .with_context(|| format!("Failed to open log file: {:?}", path))?;
                Some(Mutex::new(handle))
            }
            None => None,
        };
        let logger = Box::new(CustomLogger { level, file });
        log::set_boxed_logger(logger).map_err(|e: SetLoggerError| anyhow!(e))?;
        log::set_max_level(level);
        Ok(())
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let now = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S");
        let line = format!("[{}] {} {}", now, record.level(), record.args());

        let mut stderr = std::io::stderr();
        let _ = match record.level() {
            Level::Error => writeln!(stderr, "\x1B[1;31m{}\x1B[0m", line),
            Level::Warn => writeln!(stderr, "\x1B[1;33m{}\x1B[0m", line),
            _ => writeln!(stderr, "{}", line),
        };

        if let Some(file) = &self.file {
            if let Ok(mut file) = file.lock() {
                let _ = writeln!(file, "{}", line);
            }
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments using clap
    let cli = CommandLineOptions::parse();

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "txbot", &mut std::io::stdout());
            Ok(())
        }
        Commands::TxUpdate(args) => run_tx_update(args).await,
        Commands::FetchStatus { target } => run_fetch_status(&target).await,
    }
}

async fn run_tx_update(options: TxUpdateArgs) -> Result<()> {
    // Load or create configuration
    let config_path = &options.config_path;
    let (mut config, created) = if Path::new(config_path).exists() {
        let file = File::open(config_path)
            .context(format!("Failed to open config file: {}", config_path))?;
        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)
            .context(format!("Failed to parse config file: {}", config_path))?;
        (config, false)
    } else {
        (Config::default(), true)
    };

    // Override config with CLI options if provided
    if let Some(repo_dir) = &options.repo_dir {
        config.repo_dir = repo_dir.to_string_lossy().into_owned();
    }
    if let Some(branch) = &options.branch {
        config.branch = branch.clone();
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }

    CustomLogger::init(
        level_filter(&config.log_level),
        config.log_file.as_deref().map(Path::new),
    )?;

    if created {
        warn!(
            "Config file not found at '{}', creating default config.",
            config_path
        );
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(config_path, config_json)
            .context(format!("Failed to write default config to: {}", config_path))?;
    }

    // Validate the configuration after loading and overriding
    config
        .validate()
        .context("Configuration validation failed")?;

    let controller = Controller::with_config(config);
    controller.run_update().await?;
    Ok(())
}

async fn run_fetch_status(target: &Path) -> Result<()> {
    CustomLogger::init(LevelFilter::Info, None)?;
    status_fetch::fetch_to(status_fetch::STATUS_URL, target).await?;
    Ok(())
}
