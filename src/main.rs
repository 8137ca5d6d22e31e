//! appmenu: an application launcher front end for dmenu-style selectors.
//!
//! This is the entry point of the application. It parses command-line arguments,
//! loads configuration, scans the application descriptors, feeds them to the
//! selector in most-recently-used order and launches the chosen command.

mod cache;
mod config;
mod entry;
mod ignore;
mod launcher;
mod paths;
mod scanner;
mod selector;

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::builder::styling::{AnsiColor, Effects, Style};
use clap::builder::Styles;
use clap::{ArgAction, Parser};
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::cache::CacheStore;
use crate::config::Config;
use crate::ignore::IgnoreList;
use crate::launcher::Launcher;
use crate::paths::Roots;
use crate::selector::Selector;

/// Command-line interface definition.
///
/// Options are long-only so that selector flags such as `-l`, `-p` or `-h` pass
/// through untouched.
#[derive(Debug, Parser)]
#[command(
    name = "appmenu",
    version,
    about = "Application launcher menu for dmenu-style selectors",
    after_help = "Arguments after the appmenu options are passed to the selector unchanged.",
    styles = help_styles(),
    disable_help_flag = true,
    disable_version_flag = true
)]
struct Cli {
    /// Print help.
    #[arg(long, action = ArgAction::Help)]
    help: Option<bool>,
    /// Print version.
    #[arg(long, action = ArgAction::Version)]
    version: Option<bool>,
    /// Path to appmenu.toml configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Ignore the default appmenu.toml.
    #[arg(long)]
    no_config: bool,
    /// Directory containing application descriptors.
    #[arg(long)]
    descriptor_dir: Option<PathBuf>,
    /// Selector command (program and leading arguments).
    #[arg(long)]
    selector: Option<String>,
    /// File listing entry names to hide, one per line.
    #[arg(long)]
    ignore_file: Option<PathBuf>,
    /// File holding the most-recently-used order.
    #[arg(long)]
    cache_file: Option<PathBuf>,
    /// Give up if the selector stays open longer than this (ms).
    #[arg(long)]
    selector_timeout_ms: Option<u64>,
    /// Print the chosen command instead of launching it.
    #[arg(long)]
    print: bool,
    /// Enable debug logging on stderr.
    #[arg(long)]
    verbose: bool,
    /// Arguments forwarded to the selector.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    selector_args: Vec<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let roots = Roots::from_env()?;
    let settings = load_settings(&cli, &roots)?;
    match run(&settings, &mut std::io::stdout()).await? {
        Outcome::Launched { name, pid } => debug!(%name, pid, "launched entry"),
        Outcome::Printed { name, command } => debug!(%name, %command, "printed command"),
        Outcome::Unresolved(choice) => debug!(%choice, "no matching entry"),
        Outcome::Cancelled => {}
    }
    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

fn help_styles() -> Styles {
    Styles::styled()
        .header(
            Style::new()
                .fg_color(Some(AnsiColor::Cyan.into()))
                .effects(Effects::BOLD),
        )
        .usage(
            Style::new()
                .fg_color(Some(AnsiColor::Green.into()))
                .effects(Effects::BOLD),
        )
        .literal(Style::new().fg_color(Some(AnsiColor::Yellow.into())))
        .placeholder(Style::new().fg_color(Some(AnsiColor::Magenta.into())))
}

/// Runtime configuration derived from CLI arguments and the config file.
#[derive(Debug, Clone)]
struct RunSettings {
    descriptor_dir: PathBuf,
    ignore_file: PathBuf,
    cache_file: PathBuf,
    selector: Selector,
    shell: PathBuf,
    print_only: bool,
}

impl RunSettings {
    fn from_cli(cli: &Cli, config: Config, roots: &Roots) -> Result<Self> {
        let descriptor_dir = cli
            .descriptor_dir
            .clone()
            .or(config.descriptor_dir)
            .unwrap_or_else(|| PathBuf::from(paths::DEFAULT_DESCRIPTOR_DIR));
        let ignore_file = cli
            .ignore_file
            .clone()
            .or(config.ignore_file)
            .unwrap_or_else(|| roots.ignore_file());
        let cache_file = cli
            .cache_file
            .clone()
            .or(config.cache_file)
            .unwrap_or_else(|| roots.cache_file());
        let shell = config
            .shell
            .unwrap_or_else(|| PathBuf::from(paths::DEFAULT_SHELL));

        let (program, mut args) = match cli.selector.as_deref().or(config.selector.as_deref()) {
            Some(value) => config::split_selector(value)?,
            None => (PathBuf::from(paths::DEFAULT_SELECTOR), Vec::new()),
        };
        args.extend(cli.selector_args.iter().cloned());
        let timeout = cli
            .selector_timeout_ms
            .or(config.selector_timeout_ms)
            .map(Duration::from_millis);

        Ok(Self {
            descriptor_dir,
            ignore_file,
            cache_file,
            selector: Selector::new(program, args).with_timeout(timeout),
            shell,
            print_only: cli.print,
        })
    }
}

fn load_settings(cli: &Cli, roots: &Roots) -> Result<RunSettings> {
    let config = if cli.no_config {
        Config::default()
    } else if let Some(path) = &cli.config {
        config::load_config(path)?
    } else {
        let path = roots.config_file();
        if path.exists() {
            config::load_config(&path)?
        } else {
            Config::default()
        }
    };
    RunSettings::from_cli(cli, config, roots)
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Outcome {
    /// The selector returned nothing.
    Cancelled,
    /// The selector returned a line that names no entry.
    Unresolved(String),
    /// The command was written to the output instead of being launched.
    Printed { name: String, command: String },
    Launched { name: String, pid: u32 },
}

async fn run(settings: &RunSettings, out: &mut impl Write) -> Result<Outcome> {
    let ignore = IgnoreList::load(&settings.ignore_file)?;
    let repo = scanner::scan(&settings.descriptor_dir, &ignore)?;
    if repo.is_empty() {
        warn!(dir = %settings.descriptor_dir.display(), "no application entries found");
    }

    let store = CacheStore::new(&settings.cache_file);
    let persist = match store.prepare() {
        Ok(()) => true,
        Err(err) => {
            warn!(
                path = %store.path().display(),
                "continuing without most-recently-used order: {}",
                err
            );
            false
        }
    };
    let order = if persist {
        store.load(&repo)?
    } else {
        cache::merge_order([], &repo)
    };

    // Stored names of uninstalled entries stay in the cache but are not offered.
    let menu: Vec<&str> = order
        .iter()
        .map(String::as_str)
        .filter(|name| repo.contains(name))
        .collect();

    let Some(choice) = settings.selector.select(&menu).await? else {
        info!("selection cancelled");
        return Ok(Outcome::Cancelled);
    };
    let Some(entry) = repo.lookup(&choice) else {
        warn!("'{}' does not match any application", choice);
        return Ok(Outcome::Unresolved(choice));
    };

    if persist {
        store.promote(entry.name())?;
    }

    if settings.print_only {
        writeln!(out, "{}", entry.command()).context("failed to write command")?;
        return Ok(Outcome::Printed {
            name: entry.name().to_string(),
            command: entry.command().to_string(),
        });
    }

    let pid = Launcher::new(&settings.shell).launch(entry.command())?;
    Ok(Outcome::Launched {
        name: entry.name().to_string(),
        pid,
    })
}
