use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod completion;
mod dispatch;
mod flows;
mod render;
mod terminal_host;

use completion::CliCompletionShell;

#[derive(Parser, Debug)]
#[command(name = "termsetup")]
#[command(about = "Install and configure the Alacritty terminal", long_about = None)]
struct Cli {
    /// Package manager program (overrides $PACKAGER)
    #[arg(long, global = true)]
    packager: Option<String>,
    /// Privilege wrapper for package commands, or `none` (overrides $ESCALATION_TOOL)
    #[arg(long, global = true)]
    escalation_tool: Option<String>,
    /// Home directory whose configuration is managed (overrides $HOME)
    #[arg(long, global = true)]
    home: Option<PathBuf>,
    /// Settings file (default: ~/.config/termsetup/settings.toml)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Install the terminal, back up its config and fetch the shipped config
    Run {
        #[arg(long)]
        dry_run: bool,
    },
    /// Restore the backed-up config and optionally uninstall the terminal
    Revert {
        #[arg(long)]
        dry_run: bool,
        /// Uninstall without asking
        #[arg(long, conflicts_with = "keep_package")]
        yes: bool,
        /// Keep the package without asking
        #[arg(long)]
        keep_package: bool,
    },
    Status,
    Completions {
        #[arg(value_enum)]
        shell: CliCompletionShell,
    },
    Version,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("TERMSETUP_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    dispatch::run_cli(cli)
}
