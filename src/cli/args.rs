use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::config::HOME_ENV;
use crate::features::focus::TimerMode;

#[derive(Parser)]
#[command(name = "tffocus")]
#[command(about = "A Pomodoro and Time Free Focus timer for the terminal")]
#[command(long_about = "tffocus - Pomodoro and Time Free Focus timer

Runs focused work sessions in the terminal. A session is one Work phase
followed by one Rest phase. Pomodoro uses fixed lengths; Time Free Focus
draws each length at random from configured bounds so you stop watching
the clock.

QUICK START:
  tffocus pomodoro                  25 min work, 5 min rest
  tffocus pomodoro -w 50 -r 10      Custom Pomodoro lengths
  tffocus tff                       Randomized work and rest
  tffocus start                     Run the mode used last
  tffocus history                   Recent sessions

While a session runs, press d to note a distraction, s to stop, q to quit.

OUTPUT FORMATS:
  --output pretty    Human-readable colored output (default)
  --output json      Machine-readable JSON for scripting

For more information on a specific command, run:
  tffocus <command> --help")]
#[command(version, propagate_version = true)]
pub struct Cli {
    /// Output format for command results
    ///
    /// Use 'pretty' for human-readable colored output (default),
    /// or 'json' for machine-readable output suitable for scripting.
    #[arg(short, long, value_enum, default_value = "pretty", global = true)]
    pub output: OutputFormat,

    /// Directory holding settings and session history
    ///
    /// Defaults to ~/.tffocus.
    #[arg(long, env = HOME_ENV, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Log debug output (to tffocus.log while the timer view is open)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for command results.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable colored output.
    #[default]
    Pretty,
    /// Machine-readable JSON output.
    Json,
}

/// Timer mode selector on the command line.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModeArg {
    /// Fixed work and rest lengths.
    Pomodoro,
    /// Randomized work and rest lengths.
    Tff,
}

impl From<ModeArg> for TimerMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Pomodoro => Self::Pomodoro,
            ModeArg::Tff => Self::TimeFreeFocus,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a Pomodoro session
    ///
    /// Opens the timer view with fixed work and rest lengths. Lengths
    /// default to timer.pomodoro_work_minutes and
    /// timer.pomodoro_rest_minutes from config.yaml (25 and 5).
    ///
    /// # Examples
    ///
    ///   tffocus pomodoro              Default lengths
    ///   tffocus pomodoro -w 50 -r 10  50 min work, 10 min rest
    ///   tffocus p                     Short alias
    #[command(alias = "p")]
    Pomodoro {
        /// Work length in whole minutes
        #[arg(long, short = 'w', value_name = "MIN")]
        work: Option<String>,

        /// Rest length in whole minutes
        #[arg(long, short = 'r', value_name = "MIN")]
        rest: Option<String>,
    },

    /// Run a Time Free Focus session
    ///
    /// Opens the timer view. Work length is drawn at random from the
    /// configured bounds; the rest that follows is drawn from the rest
    /// bounds (or derived from the work length in percent mode).
    ///
    /// See 'tffocus config tff' to change the bounds.
    #[command(alias = "f")]
    Tff,

    /// Run a session in the mode used last
    #[command(alias = "s")]
    Start,

    /// Show or change settings
    Config(ConfigArgs),

    /// List recorded sessions, most recent first
    ///
    /// # Examples
    ///
    ///   tffocus history               Last 10 sessions
    ///   tffocus history -n 50         Last 50 sessions
    ///   tffocus history --mode tff    Only Time Free Focus
    ///   tffocus history -o json       Output as JSON
    #[command(alias = "h")]
    History {
        /// Number of sessions to show
        #[arg(long, short = 'n', default_value = "10")]
        limit: usize,

        /// Only sessions in this mode
        #[arg(long, short = 'm', value_enum)]
        mode: Option<ModeArg>,
    },

    /// Show the most recent session in detail
    Last,

    /// Summarize recorded sessions
    ///
    /// Shows session counts, total work and rest time, manual stops,
    /// and the most frequent distraction causes.
    Summary {
        /// Period (today, week, month, all)
        #[arg(long, short = 'p', default_value = "all")]
        period: String,
    },

    /// Generate shell completions
    ///
    /// Outputs completion script for the specified shell.
    /// Redirect to a file or source directly.
    ///
    /// Example: tffocus completions bash > ~/.bash_completion.d/tffocus
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Arguments for settings management.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

/// Settings subcommands.
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show effective settings
    Show,

    /// Set Time Free Focus bounds
    ///
    /// Work and rest lengths are drawn uniformly from the inclusive ranges.
    ///
    /// Example: tffocus config tff --work-min 20 --work-max 45 --rest-min 8 --rest-max 10
    Tff {
        /// Shortest work length in minutes
        #[arg(long, value_name = "MIN")]
        work_min: String,

        /// Longest work length in minutes
        #[arg(long, value_name = "MIN")]
        work_max: String,

        /// Shortest rest length in minutes
        #[arg(long, value_name = "MIN")]
        rest_min: String,

        /// Longest rest length in minutes
        #[arg(long, value_name = "MIN")]
        rest_max: String,
    },

    /// Derive Time Free Focus rest from the work length
    ///
    /// Rest becomes PERCENT of the work length, rounded to whole minutes,
    /// never below one minute. Allowed values: 5 to 20.
    Percent {
        /// Percentage of the work length
        percent: String,
    },

    /// Restore default Time Free Focus bounds (work 20-45, rest 2-10)
    Reset,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default_output_format() {
        let cli = Cli::try_parse_from(["tffocus", "tff"]).unwrap();
        assert!(matches!(cli.output, OutputFormat::Pretty));
        assert!(!cli.verbose);
    }

    #[test]
    fn test_cli_output_format_short() {
        let cli = Cli::try_parse_from(["tffocus", "-o", "json", "history"]).unwrap();
        assert!(matches!(cli.output, OutputFormat::Json));
    }

    #[test]
    fn test_cli_pomodoro_lengths() {
        let cli = Cli::try_parse_from(["tffocus", "pomodoro", "-w", "50", "-r", "10"]).unwrap();
        if let Commands::Pomodoro { work, rest } = cli.command {
            assert_eq!(work.as_deref(), Some("50"));
            assert_eq!(rest.as_deref(), Some("10"));
        } else {
            panic!("Expected Pomodoro command");
        }
    }

    #[test]
    fn test_cli_history_defaults() {
        let cli = Cli::try_parse_from(["tffocus", "history", "--mode", "tff"]).unwrap();
        if let Commands::History { limit, mode } = cli.command {
            assert_eq!(limit, 10);
            assert_eq!(mode.map(TimerMode::from), Some(TimerMode::TimeFreeFocus));
        } else {
            panic!("Expected History command");
        }
    }

    #[test]
    fn test_cli_config_tff_requires_all_bounds() {
        assert!(Cli::try_parse_from(["tffocus", "config", "tff", "--work-min", "20"]).is_err());

        let cli = Cli::try_parse_from([
            "tffocus", "config", "tff", "--work-min", "20", "--work-max", "45", "--rest-min", "8",
            "--rest-max", "10",
        ])
        .unwrap();
        if let Commands::Config(args) = cli.command {
            assert!(matches!(args.command, ConfigCommands::Tff { .. }));
        } else {
            panic!("Expected Config command");
        }
    }

    #[test]
    fn test_cli_data_dir_flag() {
        let cli = Cli::try_parse_from(["tffocus", "--data-dir", "/tmp/x", "config", "show"]).unwrap();
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/x")));
    }

    #[test]
    fn test_cli_completions_shell() {
        let cli = Cli::try_parse_from(["tffocus", "completions", "zsh"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Completions {
                shell: clap_complete::Shell::Zsh
            }
        ));
        assert!(Cli::try_parse_from(["tffocus", "completions", "tcsh"]).is_err());
    }

    #[test]
    fn test_output_format_default() {
        assert!(matches!(OutputFormat::default(), OutputFormat::Pretty));
    }
}
