use crate::alias::AliasTable;
use crate::builtin::{self, Io};
use crate::command::{self, ArgVector, ExitCode};
use crate::env::Environment;
use crate::error::ShellError;
use crate::expand::Expander;
use crate::external::{ChildOutcome, ExternalCommand};
use crate::lexer;
use crate::parser::{self, ListItem};
use crate::path::{PathList, Resolution};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

/// Process-wide shell state shared by every stage of the pipeline.
///
/// Builtins receive it mutably; everything else reads it.
#[derive(Debug)]
pub struct Session {
    pub env: Environment,
    pub aliases: AliasTable,
    pub paths: PathList,
    /// Status of the last command, read by `$?` and by `exit` without argument.
    pub last_status: ExitCode,
    /// Name the shell was invoked as, first field of every diagnostic.
    pub program: String,
    /// Number of input lines read so far, second field of every diagnostic.
    pub line: usize,
    pid: u32,
}

impl Session {
    pub fn new(program: impl Into<String>, env: Environment) -> Self {
        Self {
            env,
            aliases: AliasTable::new(),
            paths: PathList::default(),
            last_status: command::SUCCESS,
            program: program.into(),
            line: 0,
            pid: std::process::id(),
        }
    }

    /// Write the diagnostic for `error` and return the status it maps to.
    pub fn report(&self, err: &mut dyn Write, error: &ShellError) -> ExitCode {
        tracing::debug!(?error, "command failed");
        let _ = writeln!(err, "{}", error.diagnostic(&self.program, self.line));
        let _ = err.flush();
        error.status()
    }
}

/// A minimal POSIX-style interpreter that can execute built-in and external commands.
///
/// Each input line goes through tokenization, alias expansion of the first word,
/// variable substitution, and finally either a builtin or a fork/exec of a program
/// found on `PATH`.
///
/// Example
/// ```
/// use hsh::{Interpreter, MemWriter, env::Environment};
/// let out = MemWriter::new();
/// let mut sh = Interpreter::with_io("hsh", Environment::from_vars([("X", "1")]), out.clone(), std::io::sink());
/// sh.run_line("setenv Y $X; env");
/// assert_eq!(out.contents(), "X=1\nY=1\n");
/// ```
pub struct Interpreter {
    session: Session,
    out: Box<dyn Write>,
    err: Box<dyn Write>,
}

impl Interpreter {
    /// Interpreter over the current process environment, writing to stdout and stderr.
    pub fn new(program: impl Into<String>) -> Self {
        Self::with_io(program, Environment::new(), io::stdout(), io::stderr())
    }

    /// Interpreter with an explicit environment and output streams.
    pub fn with_io(
        program: impl Into<String>,
        env: Environment,
        out: impl Write + 'static,
        err: impl Write + 'static,
    ) -> Self {
        Self {
            session: Session::new(program, env),
            out: Box::new(out),
            err: Box::new(err),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn last_status(&self) -> ExitCode {
        self.session.last_status
    }

    /// Status requested by `exit`, once it has run.
    pub fn should_exit(&self) -> Option<ExitCode> {
        self.session.env.should_exit
    }

    /// Run one input line and return the resulting status.
    ///
    /// A syntax error rejects the whole line. Otherwise the commands run left to right,
    /// each one gated by the separator before it, until the line ends or `exit` runs.
    pub fn run_line(&mut self, line: &str) -> ExitCode {
        self.session.line += 1;

        let tokens = lexer::split_into_tokens(line);
        if tokens.is_empty() {
            return self.session.last_status;
        }
        tracing::trace!(line = self.session.line, ?tokens, "tokenized");

        let items = match parser::construct_list(tokens) {
            Ok(items) => items,
            Err(e) => {
                let status = self.report(&e.into());
                self.session.last_status = status;
                return status;
            }
        };

        for ListItem { connector, argv } in items {
            if !connector.should_run(self.session.last_status) {
                continue;
            }
            self.session.last_status = self.run(argv);
            if self.should_exit().is_some() {
                break;
            }
        }
        self.session.last_status
    }

    /// Expand and dispatch a single command, returning its status.
    pub fn run(&mut self, args: ArgVector) -> ExitCode {
        let mut args = self.session.aliases.expand(args);
        Expander::new(&self.session.env, self.session.last_status, self.session.pid)
            .expand(&mut args);
        if args.is_empty() {
            return command::SUCCESS;
        }

        match self.dispatch(&args) {
            Ok(status) => status,
            Err(e) => self.report(&e),
        }
    }

    fn dispatch(&mut self, args: &[String]) -> Result<ExitCode, ShellError> {
        let name = &args[0];

        if let Some(builtin) = builtin::lookup(name) {
            tracing::debug!(%name, ?args, "running builtin");
            let mut io = Io {
                out: &mut *self.out,
                err: &mut *self.err,
            };
            let result = (builtin.handler)(args, &mut io, &mut self.session);
            let _ = self.out.flush();
            return result;
        }

        self.session.paths.refresh(self.session.env.get_var("PATH"));
        let executable = match self.session.paths.resolve(name) {
            Resolution::Found(path) => path,
            Resolution::NotExecutable(path) => {
                tracing::debug!(path = %path.display(), "not executable");
                return Err(ShellError::PermissionDenied {
                    command: name.clone(),
                });
            }
            Resolution::NotFound => {
                return Err(ShellError::NotFound {
                    command: name.clone(),
                });
            }
        };
        tracing::debug!(%name, path = %executable.display(), ?args, "running external");

        let external = ExternalCommand::new(
            &executable,
            args,
            &self.session.env,
            &self.session.program,
            self.session.line,
        )?;
        // the child inherits our descriptors; anything still buffered would print out of order
        let _ = self.out.flush();
        let _ = self.err.flush();

        let outcome = external.spawn();
        tracing::debug!(?outcome, "child finished");
        match outcome {
            ChildOutcome::Exited(code) => Ok(code),
            ChildOutcome::Signaled(signal) => Ok(command::signaled(signal)),
            ChildOutcome::SpawnFailed(source) => Err(ShellError::Fork {
                command: name.clone(),
                source,
            }),
            ChildOutcome::WaitFailed(errno) => Err(ShellError::io(name, errno.into())),
        }
    }

    fn report(&mut self, error: &ShellError) -> ExitCode {
        self.session.report(&mut *self.err, error)
    }

    /// Read lines from `reader` until end of input or `exit`.
    ///
    /// Input is taken as raw bytes; anything that is not UTF-8 is replaced with U+FFFD
    /// so one bad line never ends the loop. Returns the status the shell should exit with.
    pub fn run_reader(&mut self, mut reader: impl BufRead) -> ExitCode {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => break,
                Ok(_) => {
                    if buf.last() == Some(&b'\n') {
                        buf.pop();
                        if buf.last() == Some(&b'\r') {
                            buf.pop();
                        }
                    }
                    let line = String::from_utf8_lossy(&buf);
                    self.run_line(&line);
                    if let Some(status) = self.should_exit() {
                        return status;
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.session.last_status = self.report(&ShellError::io("read", e));
                    break;
                }
            }
        }
        self.session.last_status
    }

    /// Run a script file line by line.
    pub fn run_script(&mut self, path: &Path) -> ExitCode {
        match File::open(path) {
            Ok(file) => self.run_reader(BufReader::new(file)),
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "cannot open script");
                let error = ShellError::CantOpen(path.display().to_string());
                self.session.last_status = self.report(&error);
                self.session.last_status
            }
        }
    }

    /// Interactive loop with line editing and history.
    pub fn repl(&mut self) -> anyhow::Result<ExitCode> {
        let mut rl = DefaultEditor::new()?;

        loop {
            match rl.readline("$ ") {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        rl.add_history_entry(line.as_str())?;
                    }
                    self.run_line(&line);
                    if let Some(status) = self.should_exit() {
                        return Ok(status);
                    }
                }
                // Ctrl-C abandons the current line only
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => {
                    writeln!(self.out)?;
                    break;
                }
                Err(err) => return Err(err.into()),
            }
        }

        Ok(self.session.last_status)
    }
}
