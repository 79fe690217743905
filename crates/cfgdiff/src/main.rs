//! cfgdiff - colorized diffs between a device config and a candidate config

mod config;
mod views;

use anyhow::{Context, Result};
use cfgdiff_core::{ConfigSession, LoadOptions, MemoryPlatform, Substitute};
use clap::{Args, Parser, Subcommand, ValueEnum};
use config::{Config, ViewMode};
use crossterm::tty::IsTty;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Once;
use tracing_subscriber::EnvFilter;

/// Config stores the offline session accepts
const CONFIG_SOURCES: [&str; 2] = ["running", "startup"];

#[derive(Parser, Debug)]
#[command(name = "cfgdiff")]
#[command(author, version, about = "Colorized diffs for device configurations")]
struct Cli {
    /// Config file (defaults to <config dir>/cfgdiff/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Diff a source config file against a candidate config file
    Diff(DiffArgs),
    /// Fill a config template with values found in a source config file
    Render(RenderArgs),
}

#[derive(Args, Debug)]
struct DiffArgs {
    /// Config currently on the device
    source_file: PathBuf,

    /// Config about to be applied
    candidate_file: PathBuf,

    /// Host the configs belong to
    #[arg(long, default_value = "localhost")]
    host: String,

    /// Config store the source file stands for
    #[arg(long, default_value = "running")]
    source: String,

    /// Merge the candidate into the source instead of replacing it
    #[arg(long)]
    merge: bool,

    /// Output view (overrides the config file)
    #[arg(short, long, value_enum)]
    mode: Option<ViewMode>,

    /// Side-by-side width, 0 for the terminal width (overrides the config file)
    #[arg(short, long)]
    width: Option<usize>,

    #[arg(long, value_enum, default_value_t = ColorChoice::Auto)]
    color: ColorChoice,

    /// Exit with status 1 when the configs differ
    #[arg(long)]
    exit_code: bool,
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Template containing `{{ name }}` placeholders
    template_file: PathBuf,

    /// Config to pull substitution values from
    source_file: PathBuf,

    /// Substitution as NAME=PATTERN; capture group 1 is used when present
    #[arg(short = 's', long = "sub", value_parser = parse_substitute)]
    substitutes: Vec<Substitute>,

    #[arg(long, default_value = "localhost")]
    host: String,

    #[arg(long, default_value = "running")]
    source: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ColorChoice {
    Auto,
    Always,
    Never,
}

fn parse_substitute(arg: &str) -> Result<Substitute, String> {
    let (name, pattern) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=PATTERN, got `{}`", arg))?;
    Substitute::new(name.trim(), pattern).map_err(|e| e.to_string())
}

static LOG_INIT: Once = Once::new();

fn init_logging(verbose: bool) {
    LOG_INIT.call_once(|| {
        let default = if verbose {
            "cfgdiff=debug,cfgdiff_core=debug"
        } else {
            "cfgdiff=warn,cfgdiff_core=warn"
        };
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
            )
            .init();
    });
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn open_session(platform: MemoryPlatform) -> Result<ConfigSession<MemoryPlatform>> {
    let mut session = ConfigSession::new(platform, CONFIG_SOURCES).with_on_open(|session| {
        tracing::debug!(host = %session.host(), "session ready");
        Ok(())
    });
    session.open()?;
    Ok(session)
}

fn run_diff(args: DiffArgs, config: &Config) -> Result<bool> {
    let source_config = read_file(&args.source_file)?;
    let candidate_config = read_file(&args.candidate_file)?;

    let colorize = match args.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => config.diff.colorize && std::io::stdout().is_tty(),
    };
    let width = args.width.unwrap_or(config.diff.side_by_side_width);
    let mode = args.mode.unwrap_or(config.diff.mode);

    let platform = MemoryPlatform::new(&args.host)
        .with_store(&args.source, source_config)
        .with_engine(config.diff.engine())
        .with_rendering(colorize, width);
    let mut session = open_session(platform)?;

    session
        .load_config(&candidate_config, !args.merge, &LoadOptions::new())?
        .raise_for_status()?;
    let record = session.diff_config(&args.source)?;
    session.abort_config()?.raise_for_status()?;

    let out = views::render_view(mode, &record)?;
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(out.as_bytes())?;
    stdout.flush()?;

    Ok(record.has_changes()?)
}

fn run_render(args: RenderArgs) -> Result<()> {
    let template = read_file(&args.template_file)?;
    let source_config = read_file(&args.source_file)?;

    let platform = MemoryPlatform::new(&args.host).with_store(&args.source, source_config);
    let mut session = open_session(platform)?;
    let rendered = session.render_substituted_config(&template, &args.substitutes, &args.source)?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(rendered.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Command::Diff(args) => {
            let exit_code = args.exit_code;
            let changed = run_diff(args, &config)?;
            if exit_code && changed {
                std::process::exit(1);
            }
        }
        Command::Render(args) => run_render(args)?,
    }

    Ok(())
}
