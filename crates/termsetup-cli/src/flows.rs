use anyhow::Result;
use termsetup_core::SetupContext;
use termsetup_installer::{
    inspect_state, install, plan_install, plan_revert, revert, BackupAction, InstallOutcome,
    PackageAction, PlannedStep, RevertOutcome, SetupState, UninstallDecision,
};

use crate::render::{render_status_line, OutputStyle, TerminalRenderer};
use crate::terminal_host::{TerminalHost, UninstallPolicy};

pub(crate) fn run_install_command(
    context: &SetupContext,
    dry_run: bool,
    style: OutputStyle,
) -> Result<()> {
    let renderer = TerminalRenderer::from_style(style);
    let mut host = TerminalHost::new(renderer, UninstallPolicy::AssumeNo)?;

    if dry_run {
        let state = inspect_state(context, &mut host);
        renderer.print_section("Planned run");
        renderer.print_lines(&format_plan_lines(&plan_install(context, &state), style));
        return Ok(());
    }

    renderer.print_section(&format!("Setting up {}", context.package));
    let outcome = install(context, &mut host)?;
    renderer.print_lines(&format_install_outcome_lines(&outcome, style));
    Ok(())
}

pub(crate) fn run_revert_command(
    context: &SetupContext,
    dry_run: bool,
    uninstall_policy: UninstallPolicy,
    style: OutputStyle,
) -> Result<()> {
    let renderer = TerminalRenderer::from_style(style);
    let mut host = TerminalHost::new(renderer, uninstall_policy)?;

    if dry_run {
        let state = inspect_state(context, &mut host);
        renderer.print_section("Planned revert");
        renderer.print_lines(&format_plan_lines(&plan_revert(context, &state), style));
        return Ok(());
    }

    renderer.print_section(&format!("Reverting {}", context.package));
    let outcome = revert(context, &mut host)?;
    renderer.print_lines(&format_revert_outcome_lines(&outcome, &context.package, style));
    Ok(())
}

pub(crate) fn run_status_command(context: &SetupContext, style: OutputStyle) -> Result<()> {
    let renderer = TerminalRenderer::from_style(style);
    let mut host = TerminalHost::new(renderer, UninstallPolicy::AssumeNo)?;
    let state = inspect_state(context, &mut host);
    renderer.print_lines(&format_status_lines(context, &state, style));
    Ok(())
}

pub(crate) fn format_plan_lines(steps: &[PlannedStep], style: OutputStyle) -> Vec<String> {
    steps
        .iter()
        .enumerate()
        .map(|(index, step)| {
            render_status_line(
                style,
                "plan",
                &format!("{}. {}", index + 1, step.describe()),
            )
        })
        .collect()
}

pub(crate) fn format_install_outcome_lines(
    outcome: &InstallOutcome,
    style: OutputStyle,
) -> Vec<String> {
    let mut lines = Vec::with_capacity(outcome.fetched.len() + 3);
    lines.push(match outcome.package {
        PackageAction::Installed => render_status_line(style, "ok", "package: installed"),
        PackageAction::AlreadyInstalled => {
            render_status_line(style, "ok", "package: already installed")
        }
    });
    lines.push(match &outcome.backup {
        BackupAction::NotNeeded => render_status_line(
            style,
            "step",
            "backup: not needed (no existing configuration)",
        ),
        BackupAction::Created(path) => render_status_line(
            style,
            "step",
            &format!("backup: {} (created)", path.display()),
        ),
        BackupAction::KeptExisting(path) => render_status_line(
            style,
            "warn",
            &format!("backup: {} (kept existing backup)", path.display()),
        ),
    });
    for fetched in &outcome.fetched {
        lines.push(render_status_line(
            style,
            "step",
            &format!(
                "config: {} ({} bytes, sha256 {})",
                fetched.path.display(),
                fetched.bytes,
                fetched.sha256
            ),
        ));
    }
    lines.push(render_status_line(
        style,
        "ok",
        "configuration files copied",
    ));
    lines
}

pub(crate) fn format_revert_outcome_lines(
    outcome: &RevertOutcome,
    package: &str,
    style: OutputStyle,
) -> Vec<String> {
    match outcome {
        RevertOutcome::NothingToRevert { backup } => vec![render_status_line(
            style,
            "warn",
            &format!("no backup found at {}; nothing to revert", backup.display()),
        )],
        RevertOutcome::Restored { live, uninstall } => {
            let mut lines = vec![render_status_line(
                style,
                "ok",
                &format!("configuration restored to {}", live.display()),
            )];
            match uninstall {
                UninstallDecision::Removed => {
                    lines.push(render_status_line(
                        style,
                        "ok",
                        &format!("uninstalled {package}"),
                    ));
                }
                UninstallDecision::Kept => {
                    lines.push(render_status_line(
                        style,
                        "step",
                        &format!("{package} left installed"),
                    ));
                }
                UninstallDecision::NotInstalled => {}
            }
            lines
        }
    }
}

pub(crate) fn format_status_lines(
    context: &SetupContext,
    state: &SetupState,
    style: OutputStyle,
) -> Vec<String> {
    let layout = context.layout();
    let presence = |present: bool| if present { "present" } else { "absent" };
    vec![
        render_status_line(style, "step", &format!("packager: {}", context.packager)),
        render_status_line(
            style,
            "step",
            &format!("escalation: {}", context.escalation),
        ),
        render_status_line(
            style,
            "step",
            &format!(
                "package {}: {}",
                context.package,
                if state.package_installed {
                    "installed"
                } else {
                    "not installed"
                }
            ),
        ),
        render_status_line(
            style,
            "step",
            &format!(
                "live config: {} ({})",
                layout.live_dir().display(),
                presence(state.live_config_present)
            ),
        ),
        render_status_line(
            style,
            "step",
            &format!(
                "backup: {} ({})",
                layout.backup_dir().display(),
                presence(state.backup_present)
            ),
        ),
    ]
}
