use crate::command::{self, ExitCode};
use crate::env::Environment;
use crate::error::ShellError;
use nix::errno::Errno;
use nix::libc;
use nix::sys::signal::{self, SigHandler, Signal};
use nix::sys::wait::{WaitStatus, waitpid};
use nix::unistd::{self, ForkResult, Pid};
use std::ffi::CString;
use std::path::Path;

/// How a child process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildOutcome {
    /// Normal termination with this exit code.
    Exited(ExitCode),
    /// Terminated by this signal number.
    Signaled(i32),
    /// `fork` itself failed; no child exists.
    SpawnFailed(Errno),
    /// The child was created but could not be waited for.
    WaitFailed(Errno),
}

/// Command that is not a builtin, already resolved to a file.
///
/// Everything the child needs is converted to C strings up front so that nothing
/// between `fork` and `execve` allocates.
pub struct ExternalCommand {
    path: CString,
    args: Vec<CString>,
    envp: Vec<CString>,
    not_found: Vec<u8>,
    denied: Vec<u8>,
}

impl ExternalCommand {
    /// Prepare `args` (command name first) to run from `executable`.
    ///
    /// `program` and `line` are only used for the diagnostic the child prints if
    /// `execve` fails.
    pub fn new(
        executable: &Path,
        args: &[String],
        env: &Environment,
        program: &str,
        line: usize,
    ) -> Result<Self, ShellError> {
        let name = args.first().map(String::as_str).unwrap_or_default();
        let to_c = |s: &str| CString::new(s).map_err(|e| ShellError::io(name, e.into()));

        let path = to_c(&executable.to_string_lossy())?;
        let args = args
            .iter()
            .map(|a| to_c(a))
            .collect::<Result<Vec<_>, _>>()?;
        let not_found = ShellError::NotFound {
            command: name.to_string(),
        };
        let denied = ShellError::PermissionDenied {
            command: name.to_string(),
        };
        Ok(Self {
            path,
            args,
            envp: env.to_envp(),
            not_found: format!("{}\n", not_found.diagnostic(program, line)).into_bytes(),
            denied: format!("{}\n", denied.diagnostic(program, line)).into_bytes(),
        })
    }

    /// Fork, replace the child's image with the command and block until it terminates.
    ///
    /// An `execve` failure terminates only the child: 127 if the file vanished,
    /// 126 for anything else.
    pub fn spawn(&self) -> ChildOutcome {
        // Safety: the child only performs async-signal-safe calls before execve or _exit.
        match unsafe { unistd::fork() } {
            Ok(ForkResult::Child) => self.exec_child(),
            Ok(ForkResult::Parent { child }) => {
                tracing::trace!(pid = child.as_raw(), "forked child");
                wait_for(child)
            }
            Err(errno) => ChildOutcome::SpawnFailed(errno),
        }
    }

    fn exec_child(&self) -> ! {
        // Undo the interactive shell's SIGINT disposition; ignored signals survive exec.
        let _ = unsafe { signal::signal(Signal::SIGINT, SigHandler::SigDfl) };

        let errno = match unistd::execve(&self.path, &self.args, &self.envp) {
            Ok(never) => match never {},
            Err(errno) => errno,
        };
        let (message, code) = match errno {
            Errno::ENOENT | Errno::ENOTDIR => (&self.not_found, command::NOT_FOUND),
            _ => (&self.denied, command::NOT_EXECUTABLE),
        };
        let _ = unistd::write(libc::STDERR_FILENO, message);
        // Safety: _exit skips atexit handlers and stdio buffers inherited from the parent.
        unsafe { libc::_exit(code) }
    }
}

fn wait_for(child: Pid) -> ChildOutcome {
    loop {
        match waitpid(child, None) {
            Ok(WaitStatus::Exited(_, code)) => return ChildOutcome::Exited(code),
            Ok(WaitStatus::Signaled(_, signal, _)) => return ChildOutcome::Signaled(signal as i32),
            // stops and continues are only reported with WUNTRACED/WCONTINUED
            Ok(_) | Err(Errno::EINTR) => continue,
            Err(errno) => return ChildOutcome::WaitFailed(errno),
        }
    }
}
