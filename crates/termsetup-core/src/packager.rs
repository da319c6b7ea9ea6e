use std::fmt;
use std::process::Command;

use anyhow::{anyhow, Result};

use crate::escalation::EscalationTool;

/// The package manager a setup run talks to.
///
/// `pacman` takes its own flag set; every other program is driven through the
/// `install -y` / `remove -y` subcommand form shared by apt-get, dnf, zypper
/// and friends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Packager {
    Pacman,
    Generic { program: String },
}

impl Packager {
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(anyhow!("packager name must not be empty"));
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(anyhow!(
                "packager name must be a single program name: '{trimmed}'"
            ));
        }

        match trimmed {
            "pacman" => Ok(Self::Pacman),
            other => Ok(Self::Generic {
                program: other.to_string(),
            }),
        }
    }

    pub fn program(&self) -> &str {
        match self {
            Self::Pacman => "pacman",
            Self::Generic { program } => program,
        }
    }

    pub fn install_command(&self, escalation: &EscalationTool, package: &str) -> PackageCommand {
        let args: &[&str] = match self {
            Self::Pacman => &["-S", "--needed", "--noconfirm"],
            Self::Generic { .. } => &["install", "-y"],
        };
        self.wrapped(escalation, args, package)
    }

    pub fn remove_command(&self, escalation: &EscalationTool, package: &str) -> PackageCommand {
        let args: &[&str] = match self {
            Self::Pacman => &["-R", "--noconfirm"],
            Self::Generic { .. } => &["remove", "-y"],
        };
        self.wrapped(escalation, args, package)
    }

    fn wrapped(&self, escalation: &EscalationTool, args: &[&str], package: &str) -> PackageCommand {
        let mut argv = Vec::with_capacity(args.len() + 2);
        argv.push(self.program().to_string());
        argv.extend(args.iter().map(|arg| arg.to_string()));
        argv.push(package.to_string());
        escalation.wrap(argv)
    }
}

impl fmt::Display for Packager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program())
    }
}

/// A fully spelled-out package manager invocation, escalation prefix included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl PackageCommand {
    pub fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        command
    }
}

impl fmt::Display for PackageCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}
