//! Variable substitution in command words.
//!
//! Recognized forms:
//! - `$?` - status of the last command
//! - `$$` - process id of the shell
//! - `$NAME` - value of `NAME` in the environment store, empty when unset
//!
//! A `$` that starts none of these is kept as is. Substituted text is never split
//! into more words.

use crate::command::{ArgVector, ExitCode};
use crate::env::Environment;
use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::LazyLock;

static PARAM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$(\?|\$|[A-Za-z_][A-Za-z0-9_]*)").expect("parameter pattern is valid")
});

/// Everything substitution reads, borrowed from the interpreter for one command.
pub struct Expander<'a> {
    env: &'a Environment,
    last_status: ExitCode,
    pid: u32,
}

impl<'a> Expander<'a> {
    pub fn new(env: &'a Environment, last_status: ExitCode, pid: u32) -> Self {
        Self {
            env,
            last_status,
            pid,
        }
    }

    /// Substitute every parameter in `word`. Words without `$` are returned borrowed.
    pub fn expand_word<'w>(&self, word: &'w str) -> Cow<'w, str> {
        if !word.contains('$') {
            return Cow::Borrowed(word);
        }
        PARAM.replace_all(word, |caps: &Captures| match &caps[1] {
            "?" => self.last_status.to_string(),
            "$" => self.pid.to_string(),
            name => self.env.get_var(name).unwrap_or_default().to_string(),
        })
    }

    /// Expand all words of `args` in place.
    pub fn expand(&self, args: &mut ArgVector) {
        for arg in args.iter_mut() {
            if let Cow::Owned(expanded) = self.expand_word(arg) {
                *arg = expanded;
            }
        }
    }
}
