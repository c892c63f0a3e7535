/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
/// This mirrors the convention used by POSIX shells and many command-line tools.
pub type ExitCode = i32;

/// The command completed successfully.
pub const SUCCESS: ExitCode = 0;

/// Generic failure, e.g. `alias` asked to print a name it does not know.
pub const FAILURE: ExitCode = 1;

/// Builtin misuse or a syntax error on the input line.
pub const USAGE: ExitCode = 2;

/// The command was found but could not be executed.
pub const NOT_EXECUTABLE: ExitCode = 126;

/// The command could not be located.
pub const NOT_FOUND: ExitCode = 127;

/// Added to the signal number when a child is terminated by a signal.
pub const SIGNAL_BASE: ExitCode = 128;

/// Exit status reported for a child killed by `signal`.
pub fn signaled(signal: i32) -> ExitCode {
    SIGNAL_BASE + signal
}

/// One command of an input line after tokenization: the argument vector
/// (name included) ready for alias and variable expansion.
pub type ArgVector = Vec<String>;
