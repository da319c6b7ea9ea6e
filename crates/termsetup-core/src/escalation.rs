use std::fmt;

use anyhow::{anyhow, Result};

use crate::packager::PackageCommand;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EscalationTool {
    /// Package commands run as the current user (already root).
    None,
    Program(String),
}

impl EscalationTool {
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        match trimmed {
            "" | "none" | "eval" => Ok(Self::None),
            other if other.chars().any(char::is_whitespace) => Err(anyhow!(
                "escalation tool must be a single program name: '{other}'"
            )),
            other => Ok(Self::Program(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::None => "none",
            Self::Program(program) => program,
        }
    }

    pub(crate) fn wrap(&self, mut argv: Vec<String>) -> PackageCommand {
        match self {
            Self::None => {
                let program = argv.remove(0);
                PackageCommand {
                    program,
                    args: argv,
                }
            }
            Self::Program(tool) => PackageCommand {
                program: tool.clone(),
                args: argv,
            },
        }
    }
}

impl fmt::Display for EscalationTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
