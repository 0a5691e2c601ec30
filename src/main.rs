use std::fs::OpenOptions;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use tffocus::cli::args::{Cli, Commands};
use tffocus::cli::commands;
use tffocus::config::{Config, Paths};

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {:#}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let paths = match cli.data_dir.clone() {
        Some(root) => Paths::with_root(root),
        None => Paths::new()?,
    };

    let config = Config::load_from_path(&paths.config_file)
        .with_context(|| format!("loading {}", paths.config_file.display()))?;
    config.general.color.apply();

    let interactive = matches!(
        cli.command,
        Commands::Pomodoro { .. } | Commands::Tff | Commands::Start
    );
    init_tracing(&paths, cli.verbose, interactive);

    let format = cli.output;
    let output = match cli.command {
        Commands::Pomodoro { work, rest } => {
            commands::pomodoro(&paths, &config, work.as_deref(), rest.as_deref(), format)?
        }
        Commands::Tff => commands::tff(&paths, &config, format)?,
        Commands::Start => commands::start(&paths, &config, format)?,
        Commands::Config(args) => commands::config(&paths, &config, args.command, format)?,
        Commands::History { limit, mode } => commands::history(&paths, limit, mode, format)?,
        Commands::Last => commands::last(&paths, format)?,
        Commands::Summary { period } => commands::summary(&paths, &period, format)?,
        Commands::Completions { shell } => commands::completions(shell)?,
    };

    if !output.is_empty() {
        println!("{output}");
    }

    Ok(())
}

/// Diagnostics go to stderr, or to `tffocus.log` while the timer view
/// owns the terminal. `RUST_LOG` overrides the level.
fn init_tracing(paths: &Paths, verbose: bool, interactive: bool) {
    let level = if verbose { "tffocus=debug" } else { "tffocus=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    if !interactive {
        let _ = builder.with_writer(std::io::stderr).try_init();
        return;
    }

    let file = paths.ensure_dirs().ok().and_then(|()| {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&paths.log_file)
            .ok()
    });
    match file {
        Some(file) => {
            let _ = builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init();
        }
        None => {
            let _ = builder.with_writer(std::io::sink).try_init();
        }
    }
}
