use crate::command::{self, ExitCode};
use crate::error::ShellError;
use crate::interpreter::Session;
use std::env as stdenv;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

/// Output streams handed to a builtin.
pub struct Io<'a> {
    pub out: &'a mut dyn Write,
    pub err: &'a mut dyn Write,
}

/// Built-in commands known to the shell at compile time.
///
/// Builtins are parsed from the raw argument vector (command name included) and
/// executed directly in-process without spawning a child process.
pub(crate) trait BuiltinCommand: Sized {
    /// Canonical name of the command, e.g. "exit" or "cd".
    const NAME: &'static str;

    /// Text printed by `help <name>`.
    const HELP: &'static str;

    /// Validate the arguments. `args[0]` is the command name.
    fn parse(args: &[String]) -> Result<Self, ShellError>;

    /// Executes the command using provided IO streams and shell state.
    ///
    /// Return value should follow shell conventions: 0 for success, non-zero for error.
    fn execute(self, io: &mut Io<'_>, session: &mut Session) -> Result<ExitCode, ShellError>;
}

/// Uniform entry point stored in the registry.
pub type Handler = fn(&[String], &mut Io<'_>, &mut Session) -> Result<ExitCode, ShellError>;

/// One row of the builtin table.
pub struct BuiltinEntry {
    pub name: &'static str,
    pub help: &'static str,
    pub handler: Handler,
}

fn run<T: BuiltinCommand>(
    args: &[String],
    io: &mut Io<'_>,
    session: &mut Session,
) -> Result<ExitCode, ShellError> {
    T::parse(args)?.execute(io, session)
}

const fn entry<T: BuiltinCommand>() -> BuiltinEntry {
    BuiltinEntry {
        name: T::NAME,
        help: T::HELP,
        handler: run::<T>,
    }
}

/// Every builtin, in the order `help` lists them.
pub static BUILTINS: [BuiltinEntry; 7] = [
    entry::<Exit>(),
    entry::<Env>(),
    entry::<Setenv>(),
    entry::<Unsetenv>(),
    entry::<Cd>(),
    entry::<Alias>(),
    entry::<Help>(),
];

/// Exact, case-sensitive lookup.
pub fn lookup(name: &str) -> Option<&'static BuiltinEntry> {
    BUILTINS.iter().find(|b| b.name == name)
}

fn write_err(command: &str) -> impl Fn(std::io::Error) -> ShellError + '_ {
    move |e| ShellError::io(command, e)
}

/// Exit shell process.
pub struct Exit {
    status: Option<String>,
}

impl BuiltinCommand for Exit {
    const NAME: &'static str = "exit";
    const HELP: &'static str = "exit: exit [STATUS]\n    \
        Exit the shell with STATUS, or with the status of the last command if omitted.\n";

    fn parse(args: &[String]) -> Result<Self, ShellError> {
        Ok(Exit {
            status: args.get(1).cloned(),
        })
    }

    fn execute(self, _io: &mut Io<'_>, session: &mut Session) -> Result<ExitCode, ShellError> {
        let status = match self.status {
            None => session.last_status,
            Some(arg) => parse_status(&arg).ok_or(ShellError::IllegalNumber(arg))?,
        };
        session.env.should_exit = Some(status);
        Ok(status)
    }
}

/// Decimal digits only, within `i32`.
fn parse_status(arg: &str) -> Option<ExitCode> {
    if arg.is_empty() || !arg.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    arg.parse().ok()
}

/// Print the environment, one `NAME=VALUE` per line.
pub struct Env;

impl BuiltinCommand for Env {
    const NAME: &'static str = "env";
    const HELP: &'static str = "env: env\n    Print the environment, one NAME=VALUE per line.\n";

    fn parse(_args: &[String]) -> Result<Self, ShellError> {
        Ok(Env)
    }

    fn execute(self, io: &mut Io<'_>, session: &mut Session) -> Result<ExitCode, ShellError> {
        for (k, v) in session.env.iter() {
            writeln!(io.out, "{k}={v}").map_err(write_err(Self::NAME))?;
        }
        Ok(command::SUCCESS)
    }
}

/// Add or replace an environment variable.
pub struct Setenv {
    name: String,
    value: String,
}

impl BuiltinCommand for Setenv {
    const NAME: &'static str = "setenv";
    const HELP: &'static str = "setenv: setenv VARIABLE VALUE\n    \
        Set VARIABLE to VALUE, creating it if needed.\n";

    fn parse(args: &[String]) -> Result<Self, ShellError> {
        match args {
            [_, name, value] if is_valid_name(name) => Ok(Setenv {
                name: name.clone(),
                value: value.clone(),
            }),
            _ => Err(ShellError::EnvUpdate {
                command: Self::NAME.to_string(),
            }),
        }
    }

    fn execute(self, _io: &mut Io<'_>, session: &mut Session) -> Result<ExitCode, ShellError> {
        session.env.set_var(self.name, self.value);
        Ok(command::SUCCESS)
    }
}

/// Remove an environment variable.
pub struct Unsetenv {
    name: String,
}

impl BuiltinCommand for Unsetenv {
    const NAME: &'static str = "unsetenv";
    const HELP: &'static str = "unsetenv: unsetenv VARIABLE\n    \
        Remove VARIABLE from the environment. Unknown names are ignored.\n";

    fn parse(args: &[String]) -> Result<Self, ShellError> {
        match args {
            [_, name] => Ok(Unsetenv { name: name.clone() }),
            _ => Err(ShellError::EnvUpdate {
                command: Self::NAME.to_string(),
            }),
        }
    }

    fn execute(self, _io: &mut Io<'_>, session: &mut Session) -> Result<ExitCode, ShellError> {
        session.env.remove_var(&self.name);
        Ok(command::SUCCESS)
    }
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && !name.contains('=')
}

/// Change the current working directory.
/// If no target is provided, changes to the directory specified by the HOME environment variable.
pub struct Cd {
    /// directory to switch to; absolute or relative to the current directory. Defaults to $HOME when omitted.
    pub target: Option<String>,
}

impl BuiltinCommand for Cd {
    const NAME: &'static str = "cd";
    const HELP: &'static str = "cd: cd [DIRECTORY]\n    \
        Change the working directory to DIRECTORY, $HOME when omitted,\n    \
        or the previous directory for `-`. Updates PWD and OLDPWD.\n";

    fn parse(args: &[String]) -> Result<Self, ShellError> {
        Ok(Cd {
            target: args.get(1).cloned(),
        })
    }

    fn execute(self, io: &mut Io<'_>, session: &mut Session) -> Result<ExitCode, ShellError> {
        let env = &mut session.env;
        let (target, announce) = match self.target.as_deref() {
            None | Some("--") => match env.get_var("HOME") {
                Some(home) => (home.to_string(), false),
                None => return Ok(command::SUCCESS),
            },
            Some("-") => match env.get_var("OLDPWD") {
                Some(old) => (old.to_string(), true),
                None => (env.current_dir.to_string_lossy().into_owned(), true),
            },
            Some(opt) if opt.starts_with('-') => {
                return Err(ShellError::IllegalOption(opt.to_string()));
            }
            Some(dir) => (dir.to_string(), false),
        };

        let new_dir = PathBuf::from(&target);
        let new_dir = if new_dir.is_absolute() {
            new_dir
        } else {
            env.current_dir.join(new_dir)
        };

        let canonical =
            fs::canonicalize(&new_dir).map_err(|_| ShellError::CantCd(target.clone()))?;
        stdenv::set_current_dir(&canonical).map_err(|_| ShellError::CantCd(target))?;

        let pwd = canonical.to_string_lossy().into_owned();
        let old = std::mem::replace(&mut env.current_dir, canonical);
        env.set_var("OLDPWD", old.to_string_lossy());
        env.set_var("PWD", pwd);
        tracing::debug!(from = %old.display(), to = %env.current_dir.display(), "changed directory");

        if announce {
            writeln!(io.out, "{}", env.current_dir.display()).map_err(write_err(Self::NAME))?;
        }
        Ok(command::SUCCESS)
    }
}

/// One operand of `alias`.
#[derive(Debug, PartialEq, Eq)]
enum AliasArg {
    Define { name: String, value: String },
    Show(String),
}

/// Define or print aliases.
pub struct Alias {
    args: Vec<AliasArg>,
}

impl Alias {
    /// Split operands into definitions and lookups.
    ///
    /// A value opening with `'` extends over the following words until one closes the
    /// quote, so `alias ll='ls -l'` defines a two-word value. The quotes are dropped.
    fn operands(words: &[String]) -> Vec<AliasArg> {
        let mut out = Vec::new();
        let mut words = words.iter();
        while let Some(word) = words.next() {
            let Some((name, value)) = word.split_once('=').filter(|(n, _)| !n.is_empty()) else {
                out.push(AliasArg::Show(word.clone()));
                continue;
            };
            let mut value = value.to_string();
            if value.starts_with('\'') && (value.len() == 1 || !value.ends_with('\'')) {
                for next in words.by_ref() {
                    value.push(' ');
                    value.push_str(next);
                    if next.ends_with('\'') {
                        break;
                    }
                }
            }
            let value = value
                .strip_prefix('\'')
                .map(|v| v.strip_suffix('\'').unwrap_or(v))
                .unwrap_or(value.as_str())
                .to_string();
            out.push(AliasArg::Define {
                name: name.to_string(),
                value,
            });
        }
        out
    }
}

impl BuiltinCommand for Alias {
    const NAME: &'static str = "alias";
    const HELP: &'static str = "alias: alias [NAME[='VALUE'] ...]\n    \
        Without arguments, print all aliases as NAME='VALUE'.\n    \
        With NAME, print that alias; with NAME=VALUE, define or replace it.\n";

    fn parse(args: &[String]) -> Result<Self, ShellError> {
        Ok(Alias {
            args: Self::operands(&args[1..]),
        })
    }

    fn execute(self, io: &mut Io<'_>, session: &mut Session) -> Result<ExitCode, ShellError> {
        if self.args.is_empty() {
            for alias in session.aliases.iter() {
                writeln!(io.out, "{alias}").map_err(write_err(Self::NAME))?;
            }
            return Ok(command::SUCCESS);
        }

        let mut status = command::SUCCESS;
        for arg in self.args {
            match arg {
                AliasArg::Define { name, value } => session.aliases.add(name, value),
                AliasArg::Show(name) => match session.aliases.get(&name) {
                    Some(alias) => writeln!(io.out, "{alias}").map_err(write_err(Self::NAME))?,
                    None => status = session.report(io.err, &ShellError::AliasNotFound(name)),
                },
            }
        }
        Ok(status)
    }
}

/// Print usage of the builtins.
pub struct Help {
    topics: Vec<String>,
}

impl BuiltinCommand for Help {
    const NAME: &'static str = "help";
    const HELP: &'static str = "help: help [BUILTIN ...]\n    \
        Print usage of the named builtins, or list every builtin.\n";

    fn parse(args: &[String]) -> Result<Self, ShellError> {
        Ok(Help {
            topics: args[1..].to_vec(),
        })
    }

    fn execute(self, io: &mut Io<'_>, session: &mut Session) -> Result<ExitCode, ShellError> {
        let write = write_err(Self::NAME);
        if self.topics.is_empty() {
            writeln!(io.out, "Shell builtins. Type `help NAME` for details.\n").map_err(&write)?;
            for b in BUILTINS.iter() {
                let usage = b.help.lines().next().unwrap_or(b.name);
                writeln!(io.out, "  {usage}").map_err(&write)?;
            }
            return Ok(command::SUCCESS);
        }

        let mut status = command::SUCCESS;
        for topic in self.topics {
            match lookup(&topic) {
                Some(b) => io.out.write_all(b.help.as_bytes()).map_err(&write)?,
                None => status = session.report(io.err, &ShellError::HelpTopic(topic)),
            }
        }
        Ok(status)
    }
}
