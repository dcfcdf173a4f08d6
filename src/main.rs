//! menuorg: organize WordPress admin menus offline. Validates, previews,
//! and simulates ordering configs against an exported menu snapshot.

mod accordion;
mod commands;
mod diagnostics;
mod error;
mod groups;
mod parser;
mod rebuild;
mod reconcile;
mod settings;
mod snapshot;
mod watch;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

use crate::commands::Inputs;

#[derive(Parser)]
#[command(name = "menuorg", about = "Organize WordPress admin menus offline", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Paths to the configuration sources.
#[derive(Args)]
struct ConfigArgs {
    /// Path to the file-backed configuration
    #[arg(long, default_value = "settings.json")]
    config: PathBuf,
    /// Path to the local settings record
    #[arg(long, default_value = ".menuorg.toml")]
    local: PathBuf,
}

/// Paths to every input the pipeline commands read.
#[derive(Args)]
struct InputArgs {
    /// Configuration source paths.
    #[command(flatten)]
    config: ConfigArgs,
    /// Path to the exported menu snapshot
    #[arg(long, default_value = "menu.json")]
    snapshot: PathBuf,
}

impl InputArgs {
    /// Borrow the three paths as command inputs.
    fn inputs(&self) -> Inputs<'_> {
        return Inputs {
            config: &self.config.config,
            local: &self.config.local,
            snapshot: &self.snapshot,
        };
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the ordering config against the menu snapshot
    Check(InputArgs),
    /// Emit the bootstrap payload consumed by the accordion runtime
    Export(InputArgs),
    /// Print the fingerprint of the resolved configuration
    Hash(ConfigArgs),
    /// Print the reordered menu as it would render
    Preview {
        /// Input file paths.
        #[command(flatten)]
        inputs: InputArgs,
        /// Treat this location as the current request when locking groups
        #[arg(long)]
        current: Option<String>,
    },
    /// Print an ordering scaffold built from the snapshot
    Scaffold {
        /// Path to the exported menu snapshot
        #[arg(long, default_value = "menu.json")]
        snapshot: PathBuf,
    },
    /// Drive the accordion against the rebuilt menu, persisting panel state
    Simulate {
        /// Input file paths.
        #[command(flatten)]
        inputs: InputArgs,
        /// Path to the persisted panel-state file
        #[arg(long, default_value = ".menuorg-state.json")]
        state: PathBuf,
        /// Activate this panel before printing
        #[arg(long)]
        toggle: Option<String>,
        /// Deliver the toggle as this keyboard key instead of a click
        #[arg(long, requires = "toggle")]
        key: Option<String>,
        /// Treat this location as the current request when locking groups
        #[arg(long)]
        current: Option<String>,
    },
    /// Flip a local settings toggle (accordion, hide-unspecified)
    Set {
        /// The toggle to change
        key: String,
        /// on/off
        #[arg(
            action = clap::ArgAction::Set,
            value_parser = clap::builder::BoolishValueParser::new(),
        )]
        value: bool,
        /// Path to the local settings record
        #[arg(long, default_value = ".menuorg.toml")]
        local: PathBuf,
    },
    /// Re-run check whenever an input file changes
    Watch(InputArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check(args) => commands::check(&args.inputs()),
        Commands::Export(args) => commands::export(&args.inputs()).map(|()| return ExitCode::SUCCESS),
        Commands::Hash(args) => {
            commands::hash(&args.config, &args.local).map(|()| return ExitCode::SUCCESS)
        },
        Commands::Preview { inputs, current } => {
            commands::preview(&inputs.inputs(), current.as_deref())
                .map(|()| return ExitCode::SUCCESS)
        },
        Commands::Scaffold { snapshot } => {
            commands::scaffold(&snapshot).map(|()| return ExitCode::SUCCESS)
        },
        Commands::Simulate { inputs, state, toggle, key, current } => {
            commands::simulate(
                &inputs.inputs(),
                &state,
                toggle.as_deref(),
                key.as_deref(),
                current.as_deref(),
            )
            .map(|()| return ExitCode::SUCCESS)
        },
        Commands::Set { key, value, local } => {
            commands::set(&local, &key, value).map(|()| return ExitCode::SUCCESS)
        },
        Commands::Watch(args) => watch::run(&args.inputs()),
    };

    return match result {
        Ok(code) => code,
        Err(e) => {
            diagnostics::print_error(&e);
            ExitCode::from(2)
        },
    };
}
