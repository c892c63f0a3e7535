use argh::FromArgs;
use hsh::Interpreter;
use nix::sys::signal::{SigHandler, Signal, signal};
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(FromArgs)]
/// A small POSIX-style command interpreter.
struct Args {
    #[argh(option, short = 'c')]
    /// run COMMAND as a single line and exit with its status
    command: Option<String>,

    #[argh(positional)]
    /// file to read commands from instead of standard input
    script: Option<PathBuf>,
}

fn main() {
    // Initialize tracing (respects RUST_LOG env var); stdout belongs to the commands
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let program = std::env::args().next().unwrap_or_else(|| "hsh".to_string());
    let args: Args = argh::from_env();
    let mut sh = Interpreter::new(program.clone());

    let status = if let Some(line) = args.command {
        sh.run_line(&line);
        sh.should_exit().unwrap_or(sh.last_status())
    } else if let Some(script) = args.script {
        sh.run_script(&script)
    } else if io::stdin().is_terminal() {
        // Ctrl-C is for the foreground command, not the shell; children restore the default.
        if let Err(e) = unsafe { signal(Signal::SIGINT, SigHandler::SigIgn) } {
            tracing::warn!(error = %e, "cannot ignore SIGINT");
        }
        match sh.repl() {
            Ok(status) => status,
            Err(e) => {
                eprintln!("{program}: {e:#}");
                1
            }
        }
    } else {
        sh.run_reader(io::stdin().lock())
    };

    std::process::exit(status & 0xff);
}
