//! Hands the add-on process over to the token fetcher.

use crate::config::Credentials;
use crate::endpoints::FETCHER_BINARY;
use std::path::PathBuf;
use std::process::Command;
use thiserror::Error;

pub const LOGIN_VAR: &str = "LOGIN";
pub const PASSWORD_VAR: &str = "PASSWORD";

#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("Failed to execute {}", program.display())]
    Exec {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to start {}", program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} was terminated by a signal", program.display())]
    Terminated { program: PathBuf },
}

#[derive(Debug, Clone)]
pub struct Launcher {
    credentials: Credentials,
    program: PathBuf,
}

impl Launcher {
    pub fn new(credentials: Credentials, program: impl Into<PathBuf>) -> Self {
        Launcher {
            credentials,
            program: program.into(),
        }
    }

    /// Both variables are always present, possibly empty.
    pub fn env_vars(&self) -> [(&'static str, &str); 2] {
        [
            (LOGIN_VAR, self.credentials.login.as_str()),
            (PASSWORD_VAR, self.credentials.password.as_str()),
        ]
    }

    /// The child command, with no arguments.
    pub fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.envs(self.env_vars());
        command
    }

    /// Replaces the current process with the fetcher. Only returns on failure.
    #[cfg(unix)]
    pub fn exec(self) -> LaunchError {
        use std::os::unix::process::CommandExt;

        tracing::info!(program = %self.program.display(), "Starting token fetcher");
        let source = self.command().exec();
        LaunchError::Exec {
            program: self.program,
            source,
        }
    }

    /// Runs the fetcher to completion and returns its exit code.
    pub fn run(self) -> Result<i32, LaunchError> {
        tracing::info!(program = %self.program.display(), "Starting token fetcher");
        let status = self
            .command()
            .status()
            .map_err(|source| LaunchError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        status.code().ok_or(LaunchError::Terminated {
            program: self.program,
        })
    }
}

/// The fetcher installed next to the running launcher, or the bare binary
/// name to be resolved through `PATH`.
pub fn default_program() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(FETCHER_BINARY)))
        .filter(|candidate| candidate.is_file())
        .unwrap_or_else(|| PathBuf::from(FETCHER_BINARY))
}
