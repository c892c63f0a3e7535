use crate::command::ExitCode;
use std::env as stdenv;
use std::ffi::{CString, OsString};
use std::os::unix::ffi::OsStrExt;
use std::path::PathBuf;

/// Mutable, user-level view of the process environment used by the interpreter.
///
/// The environment contains:
/// - `vars`: the variables that will be visible to executed commands, in the order
///   they were first defined. Names are unique.
/// - `current_dir`: the working directory as last observed by the shell.
/// - `should_exit`: set by `exit`; the command loop stops and exits with this status.
///
/// Inherited variables that are not valid UTF-8 cannot be read or printed by the shell,
/// but they are still handed to children until a builtin sets or removes that name.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    vars: Vec<(String, String)>,
    opaque: Vec<(OsString, OsString)>,
    /// The current working directory for command execution.
    pub current_dir: PathBuf,
    /// When set, indicates that the command loop should exit with this status.
    pub should_exit: Option<ExitCode>,
}

impl Environment {
    /// Capture the current process state into a new `Environment` instance.
    pub fn new() -> Self {
        let mut env = Self::from_os_vars(stdenv::vars_os());
        env.current_dir = stdenv::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        env
    }

    /// Build an environment from raw pairs as the OS hands them over.
    ///
    /// Pairs that are not valid UTF-8 are kept aside and only passed on to children.
    pub fn from_os_vars(vars: impl IntoIterator<Item = (OsString, OsString)>) -> Self {
        let mut env = Self::from_vars(Vec::<(String, String)>::new());
        for (k, v) in vars {
            match (k.into_string(), v.into_string()) {
                (Ok(k), Ok(v)) => env.set_var(k, v),
                (k, v) => {
                    let k = k.map_or_else(|raw| raw, OsString::from);
                    let v = v.map_or_else(|raw| raw, OsString::from);
                    tracing::debug!(name = ?k, "inherited variable is not UTF-8, passing through");
                    env.opaque.retain(|(name, _)| *name != k);
                    env.opaque.push((k, v));
                }
            }
        }
        env
    }

    /// Build an environment from explicit pairs. Later duplicates replace earlier ones.
    pub fn from_vars<K, V>(vars: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut env = Self {
            vars: Vec::new(),
            opaque: Vec::new(),
            current_dir: PathBuf::from("."),
            should_exit: None,
        };
        for (k, v) in vars {
            env.set_var(k, v);
        }
        env
    }

    /// Get the value of an environment variable.
    pub fn get_var(&self, key: &str) -> Option<&str> {
        self.vars
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set or override an environment variable. An existing entry keeps its position.
    pub fn set_var(&mut self, key: impl Into<String>, val: impl Into<String>) {
        let key = key.into();
        let val = val.into();
        self.opaque.retain(|(k, _)| *k != *key);
        match self.vars.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = val,
            None => self.vars.push((key, val)),
        }
    }

    /// Remove a variable. Returns whether it was present.
    pub fn remove_var(&mut self, key: &str) -> bool {
        let before = self.vars.len() + self.opaque.len();
        self.vars.retain(|(k, _)| k != key);
        self.opaque.retain(|(k, _)| *k != *key);
        self.vars.len() + self.opaque.len() != before
    }

    /// Iterate over `(name, value)` pairs in definition order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Materialize the store as `NAME=VALUE` strings for `execve`.
    ///
    /// Entries containing an interior NUL cannot be passed to a child and are left out.
    /// Inherited non-UTF-8 entries follow the regular ones.
    pub fn to_envp(&self) -> Vec<CString> {
        let opaque = self.opaque.iter().filter_map(|(k, v)| {
            let mut entry = k.as_bytes().to_vec();
            entry.push(b'=');
            entry.extend_from_slice(v.as_bytes());
            CString::new(entry).ok()
        });
        self.vars
            .iter()
            .filter_map(|(k, v)| CString::new(format!("{k}={v}")).ok())
            .chain(opaque)
            .collect()
    }
}
