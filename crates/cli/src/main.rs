// twin CLI - roster import, partner preferences and pair reports

mod config_cmd;
mod exit_codes;
mod groups;
mod import;
mod pairs;
mod prefer;
mod util;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

use config_cmd::ConfigCommands;
use exit_codes::EXIT_SUCCESS;
use groups::FormatArg;
use prefer::PreferCommands;

#[derive(Parser)]
#[command(name = "twin")]
#[command(about = "Pair students who chose each other, group by class")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Flags shared by every subcommand
#[derive(Args)]
pub struct GlobalArgs {
    /// Settings file (default: <config dir>/twin/twin.toml)
    #[arg(long, global = true, env = "TWIN_CONFIG")]
    pub config: Option<PathBuf>,

    /// More log output (-v info, -vv debug). RUST_LOG overrides.
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare a roster file with the student store
    #[command(after_help = "\
Examples:
  twin import klassen.xlsx
  twin import klassen.xlsx --apply
  twin import klassen.xlsx --apply --delete
  twin import IN01.csv --group IN01 --check
  twin import klassen.xlsx --json > changes.json

Exit codes: 0 = in sync or applied, 8 = --check found pending changes")]
    Import {
        /// Roster workbook (xlsx, xls, ods: one sheet per group) or csv (one group)
        roster: PathBuf,

        /// Student store (default: from settings)
        #[arg(long, env = "TWIN_STORE")]
        store: Option<PathBuf>,

        /// Group label for a csv roster (default: file name)
        #[arg(long)]
        group: Option<String>,

        /// Write the changes to the store
        #[arg(long, conflicts_with = "check")]
        apply: bool,

        /// Exit 8 when the store is behind the roster
        #[arg(long)]
        check: bool,

        /// Also remove stored students missing from the roster (and their
        /// preferences). Without it they are listed but kept.
        #[arg(long)]
        delete: bool,

        /// Output JSON to stdout instead of human summary
        #[arg(long)]
        json: bool,
    },

    /// Build pair reports per group and export them
    #[command(after_help = "\
Examples:
  twin groups klassen.xlsx
  twin groups klassen.xlsx --out twin.xlsx
  twin groups klassen.xlsx --format csv --out reports/
  twin groups klassen.xlsx --json

With --json and no --out nothing is written; reports go to stdout.")]
    Groups {
        /// Roster workbook or csv
        roster: PathBuf,

        #[arg(long, env = "TWIN_STORE")]
        store: Option<PathBuf>,

        /// Group label for a csv roster (default: file name)
        #[arg(long)]
        group: Option<String>,

        /// Output file (xlsx) or directory (csv). Default: twin.xlsx / twin/
        #[arg(long, short = 'o')]
        out: Option<PathBuf>,

        /// Export format (default: from settings)
        #[arg(long, short = 'f', value_enum)]
        format: Option<FormatArg>,

        #[arg(long)]
        json: bool,
    },

    /// List mutual pairs among stored students
    Pairs {
        #[arg(long, env = "TWIN_STORE")]
        store: Option<PathBuf>,

        #[arg(long)]
        json: bool,
    },

    /// Read or change a student's preferred partner
    #[command(subcommand)]
    Prefer(PreferCommands),

    /// Settings file
    #[command(subcommand)]
    Config(ConfigCommands),
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        "\nengine:  twin-recon ",
        env!("CARGO_PKG_VERSION"),
    )
}

fn init_logging(global: &GlobalArgs) {
    let filter = match (global.quiet, global.verbose) {
        (true, _) => "error",
        (_, 0) => "warn",
        (_, 1) => "info",
        (_, 2) => "debug",
        _ => "trace",
    };

    // stdout is reserved for --json output
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.global);
    let global = &cli.global;

    let result = match cli.command {
        Commands::Import { roster, store, group, apply, check, delete, json } => import::cmd_import(
            global,
            import::ImportArgs { roster, store, group, apply, check, delete, json },
        ),
        Commands::Groups { roster, store, group, out, format, json } => groups::cmd_groups(
            global,
            groups::GroupsArgs { roster, store, group, out, format, json },
        ),
        Commands::Pairs { store, json } => pairs::cmd_pairs(global, store, json),
        Commands::Prefer(cmd) => prefer::cmd_prefer(global, cmd),
        Commands::Config(cmd) => config_cmd::cmd_config(global, cmd),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
