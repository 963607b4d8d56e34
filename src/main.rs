// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, error, info, warn};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

use docs_translator::AppError;
use docs_translator::app_config::{self, Config, TranslationProvider};
use docs_translator::app_controller::{Controller, TranslateOptions};

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    ClaudeCode,
    Anthropic,
    #[value(name = "openai")]
    OpenAI,
    Ollama,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::ClaudeCode => TranslationProvider::ClaudeCode,
            CliTranslationProvider::Anthropic => TranslationProvider::Anthropic,
            CliTranslationProvider::OpenAI => TranslationProvider::OpenAI,
            CliTranslationProvider::Ollama => TranslationProvider::Ollama,
        }
    }
}

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

/// Options shared by every subcommand that reads the configuration
#[derive(clap::Args, Debug, Clone)]
struct CommonArgs {
    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

#[derive(clap::Args, Debug)]
struct TranslateArgs {
    /// Markdown files or directories to translate
    #[arg(value_name = "INPUT_PATH", required = true)]
    input_paths: Vec<PathBuf>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// Directory the localized tree is written under
    #[arg(short, long)]
    output_root: Option<PathBuf>,

    /// Write a JSON manifest of translated and failed documents
    #[arg(long, value_name = "FILE")]
    manifest: Option<PathBuf>,

    /// List the documents that would be translated and stop
    #[arg(long)]
    dry_run: bool,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate Markdown/MDX documents
    Translate(TranslateArgs),

    /// Report broken in-page links and structural problems (no translation)
    Check {
        /// Markdown files or directories to check
        #[arg(value_name = "INPUT_PATH", required = true)]
        input_paths: Vec<PathBuf>,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Preview how the headings of a document and its translation pair up
    Anchors {
        /// Original document
        original: PathBuf,

        /// Translated document
        translated: PathBuf,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Generate shell completions for docs-translator
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// docs-translator - structure-preserving documentation translation with AI
#[derive(Parser, Debug)]
#[command(name = "docs-translator")]
#[command(version)]
#[command(about = "AI-powered Markdown documentation translator")]
#[command(long_about = "docs-translator translates Markdown/MDX documentation with AI providers while keeping \
front matter, code blocks and in-page links intact.

EXAMPLES:
    docs-translator translate docs/                      # Translate every document under docs/
    docs-translator translate -f docs/intro.md           # Force overwrite an existing translation
    docs-translator translate -p anthropic docs/         # Use a specific provider
    docs-translator translate --dry-run docs/            # Show what would be translated
    docs-translator translate --manifest out.json docs/  # Record the results as JSON
    docs-translator check docs/ja-jp/                    # Report broken in-page links
    docs-translator anchors docs/a.md docs/ja-jp/a.md    # Preview the anchor mapping
    docs-translator completions bash > docs-translator.bash

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.

SUPPORTED PROVIDERS:
    claude-code - Claude Code CLI in print mode (default)
    anthropic   - Anthropic API (requires API key)
    openai      - OpenAI API or compatible server (requires API key)
    ollama      - Local Ollama server")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,
}

// @struct: Custom logger implementation, filtered by the global max level
struct CustomLogger;

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {:<5} {}\x1B[0m",
                Self::color_for_level(record.level()),
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = CustomLogger::init(LevelFilter::Info) {
        eprintln!("Failed to initialize logger: {}", e);
    }

    let cli = CommandLineOptions::parse();

    if let Err(e) = run(cli).await {
        let app_error = AppError::from(e);
        error!("{}", app_error);
        std::process::exit(1);
    }
}

async fn run(cli: CommandLineOptions) -> Result<()> {
    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "docs-translator", &mut std::io::stdout());
            Ok(())
        }
        Commands::Translate(args) => run_translate(args).await,
        Commands::Check { input_paths, common } => {
            let config = load_config(&common, None, None)?;
            let report = Controller::with_config(config)?.check(&input_paths)?;
            if report.is_clean() {
                Ok(())
            } else {
                Err(anyhow!(
                    "{} broken link(s) and {} structural issue(s) found",
                    report.broken_links,
                    report.lint_issues
                ))
            }
        }
        Commands::Anchors {
            original,
            translated,
            common,
        } => {
            let config = load_config(&common, None, None)?;
            Controller::with_config(config)?.anchors(&original, &translated)?;
            Ok(())
        }
    }
}

async fn run_translate(args: TranslateArgs) -> Result<()> {
    let config = load_config(&args.common, args.provider.clone(), args.model.clone())?;
    config.validate().context("Configuration validation failed")?;

    info!(
        "Translating {} -> {} with {}",
        config.source_language,
        config.target_language,
        config.translation.provider.display_name()
    );

    let options = TranslateOptions {
        force_overwrite: args.force_overwrite,
        dry_run: args.dry_run,
        output_root: args.output_root,
        manifest: args.manifest,
    };

    let controller = Controller::with_config(config)?;
    let summary = controller.run(&args.input_paths, &options).await?;

    if options.dry_run {
        info!("Dry run: {} document(s) would be translated", summary.planned.len());
    }

    if summary.report.is_success() {
        Ok(())
    } else {
        Err(anyhow!(summary.report.summary()))
    }
}

/// Load the configuration file (creating it when missing) and apply CLI overrides
fn load_config(common: &CommonArgs, provider: Option<CliTranslationProvider>, model: Option<String>) -> Result<Config> {
    // If log level is set via command line, apply it immediately
    if let Some(level) = &common.log_level {
        let level: app_config::LogLevel = level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let config_path = &common.config_path;
    let mut config = if Path::new(config_path).exists() {
        let file = File::open(config_path).with_context(|| format!("Failed to open config file: {}", config_path))?;
        let reader = BufReader::new(file);
        serde_json::from_reader::<_, Config>(reader)
            .with_context(|| format!("Failed to parse config file: {}", config_path))?
    } else {
        warn!("Config file not found at '{}', creating default config.", config_path);
        let config = Config::default();
        let config_json =
            serde_json::to_string_pretty(&config).context("Failed to serialize default config to JSON")?;
        std::fs::write(config_path, config_json)
            .with_context(|| format!("Failed to write default config to file: {}", config_path))?;
        config
    };

    // Override config with CLI options if provided
    if let Some(provider) = provider {
        config.translation.provider = provider.into();
    }
    if let Some(model) = model {
        let provider = config.translation.provider.clone();
        config.translation.provider_config_mut(&provider).model = model;
    }
    if let Some(level) = &common.log_level {
        config.log_level = level.clone().into();
    } else {
        log::set_max_level(config.log_level.to_level_filter());
    }

    Ok(config)
}
