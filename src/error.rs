//! Failure taxonomy of the shell and its diagnostic line format.
//!
//! Every failure the interpreter can hit while running a line is a [`ShellError`].
//! [`ShellError::status`] is the only place that decides which exit status a failure
//! produces, and [`Diagnostic`] renders the single line written to the error stream:
//!
//! ```text
//! <program_name>: <line_number>: <command>: <reason>
//! ```

use crate::command::{self, ExitCode};
use std::fmt;
use thiserror::Error;

/// Errors produced while tokenizing, resolving or running a command.
#[derive(Debug, Error)]
pub enum ShellError {
    /// No builtin, no executable on the search path.
    #[error("{command}: not found")]
    NotFound { command: String },

    /// The command exists but is not an executable file.
    #[error("{command}: Permission denied")]
    PermissionDenied { command: String },

    /// `exit` was given something that is not a non-negative 32-bit number.
    #[error("exit: Illegal number: {0}")]
    IllegalNumber(String),

    #[error("cd: can't cd to {0}")]
    CantCd(String),

    #[error("cd: Illegal option {0}")]
    IllegalOption(String),

    /// `setenv`/`unsetenv` called with the wrong number of arguments.
    #[error("{command}: Unable to add/remove from environment")]
    EnvUpdate { command: String },

    #[error("alias: {0} not found")]
    AliasNotFound(String),

    /// A command separator with nothing in front of it.
    #[error("Syntax error: \"{0}\" unexpected")]
    Syntax(String),

    #[error("help: no help topics match '{0}'")]
    HelpTopic(String),

    #[error("{command}: fork failed: {source}")]
    Fork {
        command: String,
        #[source]
        source: nix::Error,
    },

    /// Script file could not be read.
    #[error("Can't open {0}")]
    CantOpen(String),

    #[error("{command}: {source}")]
    Io {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

impl ShellError {
    /// Exit status a failure of this kind leaves in `$?`.
    pub fn status(&self) -> ExitCode {
        match self {
            ShellError::NotFound { .. } | ShellError::CantOpen(_) => command::NOT_FOUND,
            ShellError::PermissionDenied { .. } => command::NOT_EXECUTABLE,
            ShellError::IllegalNumber(_)
            | ShellError::CantCd(_)
            | ShellError::IllegalOption(_)
            | ShellError::EnvUpdate { .. }
            | ShellError::Syntax(_)
            | ShellError::HelpTopic(_) => command::USAGE,
            ShellError::AliasNotFound(_) | ShellError::Fork { .. } | ShellError::Io { .. } => {
                command::FAILURE
            }
        }
    }

    /// Wraps an I/O failure of `command` (usually a write to stdout).
    pub fn io(command: impl Into<String>, source: std::io::Error) -> Self {
        ShellError::Io {
            command: command.into(),
            source,
        }
    }

    /// Pairs the error with the context needed to print it.
    pub fn diagnostic<'a>(&'a self, program: &'a str, line: usize) -> Diagnostic<'a> {
        Diagnostic {
            program,
            line,
            error: self,
        }
    }
}

/// One diagnostic line, ready to be written to the error stream.
pub struct Diagnostic<'a> {
    program: &'a str,
    line: usize,
    error: &'a ShellError,
}

impl fmt::Display for Diagnostic<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.program, self.line, self.error)
    }
}
