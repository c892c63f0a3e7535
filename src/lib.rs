//! A small POSIX-style command interpreter.
//!
//! Each input line is tokenized, split into commands at `;`, `&&` and `||`, and every
//! command then has its first word alias-expanded and its `$?`, `$$` and `$NAME`
//! parameters substituted before it runs. Names of builtins (`exit`, `env`, `setenv`,
//! `unsetenv`, `cd`, `alias`, `help`) run in-process; anything else is looked up on
//! `PATH` and run in a forked child. Failures are reported as
//! `<program>: <line>: <command>: <reason>` with the usual shell exit statuses
//! (2 usage, 126 not executable, 127 not found, 128+N killed by signal N).
//!
//! The main entry point is [`Interpreter`]. The public modules expose the individual
//! stages for embedding and testing.

pub mod alias;
pub mod builtin;
pub mod command;
pub mod env;
pub mod error;
pub mod expand;
pub mod external;
mod interpreter;
mod io_adapters;
pub mod lexer;
pub mod parser;
pub mod path;

/// Just a convenient re-export of the command runner and its state.
///
/// See [`Interpreter`] for the high-level API and examples.
pub use interpreter::{Interpreter, Session};
pub use io_adapters::MemWriter;
