use anyhow::Result;
use termsetup_core::{EnvSnapshot, SettingsOverrides, SetupContext};
use tracing::debug;

use crate::completion::write_completions_script;
use crate::flows::{run_install_command, run_revert_command, run_status_command};
use crate::render::current_output_style;
use crate::terminal_host::UninstallPolicy;
use crate::{Cli, Commands};

pub(crate) fn run_cli(cli: Cli) -> Result<()> {
    let overrides = settings_overrides(&cli);

    match cli.command {
        Commands::Run { dry_run } => {
            let context = resolve_context(&overrides)?;
            run_install_command(&context, dry_run, current_output_style())?;
        }
        Commands::Revert {
            dry_run,
            yes,
            keep_package,
        } => {
            let context = resolve_context(&overrides)?;
            run_revert_command(
                &context,
                dry_run,
                UninstallPolicy::from_flags(yes, keep_package),
                current_output_style(),
            )?;
        }
        Commands::Status => {
            let context = resolve_context(&overrides)?;
            run_status_command(&context, current_output_style())?;
        }
        Commands::Completions { shell } => {
            let mut stdout = std::io::stdout();
            write_completions_script(shell, &mut stdout)?;
        }
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

fn resolve_context(overrides: &SettingsOverrides) -> Result<SetupContext> {
    let context = SetupContext::resolve(overrides, &EnvSnapshot::capture())?;
    debug!(
        home = %context.home.display(),
        packager = %context.packager,
        escalation = %context.escalation,
        "resolved setup context"
    );
    Ok(context)
}

pub(crate) fn settings_overrides(cli: &Cli) -> SettingsOverrides {
    SettingsOverrides {
        packager: cli.packager.clone(),
        escalation_tool: cli.escalation_tool.clone(),
        home: cli.home.clone(),
        settings_path: cli.settings.clone(),
    }
}
