/// Version injected at compile time via MEDIABACK_VERSION env var (set by CI/CD),
/// or "dev" for local builds.
pub const VERSION: &str = match option_env!("MEDIABACK_VERSION") {
    Some(v) => v,
    None => "dev",
};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use mediaback::config::Config;
use mediaback::deploy::{DeploymentTarget, OutputDirectory, OutputFormat};
use mediaback::{assemble_variant, AssembledStack, Variant};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Declare the media backend stacks
#[derive(Parser, Debug)]
#[command(name = "mediaback", version, about, long_about = None)]
struct Args {
    /// Variant to assemble (repeatable, all when omitted)
    #[arg(short, long, value_enum)]
    variant: Vec<Variant>,

    /// Directory holding resource-names and lambda-environment-variables
    #[arg(short, long)]
    conf_dir: Option<PathBuf>,

    /// Directory the declarations are written to
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Declaration encoding
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Print each stack's routes
    #[arg(long)]
    routes: bool,

    /// Save the effective directories and format as defaults
    #[arg(long)]
    remember: bool,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off")]
    log_level: LogLevel,
}

/// Environment variable holding tracing directives; overrides `--log-level`
const LOG_ENV: &str = "MEDIABACK_LOG";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Directive scoping the level to this crate
    fn directive(self) -> Option<&'static str> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some("mediaback=error"),
            LogLevel::Warn => Some("mediaback=warn"),
            LogLevel::Info => Some("mediaback=info"),
            LogLevel::Debug => Some("mediaback=debug"),
            LogLevel::Trace => Some("mediaback=trace"),
        }
    }
}

/// Filter for the log file, or `None` when logging is off
fn log_filter(level: LogLevel, from_env: Option<String>) -> Result<Option<EnvFilter>> {
    if let Some(directives) = from_env.filter(|d| !d.trim().is_empty()) {
        return EnvFilter::try_new(&directives)
            .map(Some)
            .with_context(|| format!("Invalid {} directives '{}'", LOG_ENV, directives));
    }
    Ok(level.directive().map(EnvFilter::new))
}

fn setup_logging(level: LogLevel) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(filter) = log_filter(level, std::env::var(LOG_ENV).ok())? else {
        return Ok(None);
    };

    let log_path = Config::log_path();
    if let Some(parent) = log_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("mediaback {} started with log level: {:?}", VERSION, level);
    tracing::info!("Log file: {}", log_path.display());

    Ok(Some(guard))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level)?;

    let mut config = Config::load();
    let conf_dir = config.effective_conf_dir(args.conf_dir.as_deref());
    let out_dir = config.effective_out_dir(args.out.as_deref());
    let format = config.effective_format(args.format);

    let variants = selected_variants(&args.variant);

    let stacks = assemble_all(&variants, conf_dir.clone()).await?;

    let mut target = OutputDirectory::new(&out_dir, format);
    for stack in &stacks {
        target.register(stack)?;
        println!("{} -> {}", stack.stack_id, target.path_for(stack).display());

        if args.routes {
            for route in stack.api.routes() {
                println!("  {}", route);
            }
        }
    }

    if args.remember {
        config.remember(conf_dir, out_dir, format)?;
    }

    Ok(())
}

/// Requested variants, deduplicated, in declaration order
fn selected_variants(requested: &[Variant]) -> Vec<Variant> {
    if requested.is_empty() {
        return Variant::ALL.to_vec();
    }
    let mut variants = requested.to_vec();
    variants.sort();
    variants.dedup();
    variants
}

/// Assemble every variant on its own blocking task. Each task loads its
/// own manifest; nothing is shared between stacks.
async fn assemble_all(variants: &[Variant], conf_dir: Option<PathBuf>) -> Result<Vec<AssembledStack>> {
    let tasks = variants.iter().map(|&variant| {
        let conf_dir = conf_dir.clone();
        async move {
            tokio::task::spawn_blocking(move || assemble_variant(variant, conf_dir.as_deref()))
                .await
                .context("Assembly task panicked")?
                .with_context(|| format!("Failed to assemble the {} stack", variant))
        }
    });

    futures::future::try_join_all(tasks).await
}
