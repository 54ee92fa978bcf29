//! External process execution with live output
//!
//! Every `brew` and `git` call goes through a [`CommandRunner`]. The system
//! runner echoes child output line by line while the child runs, so long
//! builds show progress in the CI log, and also keeps the bytes for callers
//! that need them (`brew --repository`).

use crate::error::{ActionError, Result};
use crate::state::RunState;
use std::fmt;
use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;

/// Exit code reported when the process could not be started at all.
pub const SPAWN_FAILURE_EXIT_CODE: i32 = -1;

/// A single external command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub env: Vec<(String, String)>,
    pub ignore_error: bool,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            env: Vec::new(),
            ignore_error: false,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Run the child in `dir`. Only the child sees this; the parent's
    /// working directory is never touched.
    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Add a variable on top of the inherited environment.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// A failure of this command is reported but does not fail the run.
    pub fn ignore_error(mut self) -> Self {
        self.ignore_error = true;
        self
    }

    pub fn argv(&self) -> Vec<&str> {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect()
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.argv().join(" "))
    }
}

/// Outcome of one child process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessResult {
    pub succeeded: bool,
    pub exit_code: i32,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ProcessResult {
    pub fn success() -> Self {
        Self {
            succeeded: true,
            ..Self::default()
        }
    }

    pub fn failure(exit_code: i32) -> Self {
        Self {
            succeeded: false,
            exit_code,
            ..Self::default()
        }
    }

    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).trim().to_string()
    }
}

/// Seam between the drivers and the operating system.
pub trait CommandRunner {
    fn run(&self, command: &CommandSpec) -> impl Future<Output = Result<ProcessResult>> + Send;
}

/// Runs commands as real child processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

#[derive(Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

/// Read `reader` to EOF, echoing each line as it arrives.
async fn drain<R>(reader: Option<R>, stream: Stream) -> Vec<u8>
where
    R: AsyncRead + Unpin,
{
    let mut collected = Vec::new();
    let Some(reader) = reader else {
        return collected;
    };

    let mut reader = BufReader::new(reader);
    let mut line = Vec::new();
    loop {
        line.clear();
        match reader.read_until(b'\n', &mut line).await {
            Ok(0) => break,
            Ok(_) => {
                let text = String::from_utf8_lossy(&line);
                match stream {
                    Stream::Stdout => {
                        print!("{}", text);
                        let _ = std::io::stdout().flush();
                    }
                    Stream::Stderr => {
                        eprint!("{}", text);
                    }
                }
                collected.extend_from_slice(&line);
            }
            Err(e) => {
                tracing::warn!("Failed to read child output: {}", e);
                break;
            }
        }
    }
    collected
}

impl CommandRunner for SystemRunner {
    async fn run(&self, command: &CommandSpec) -> Result<ProcessResult> {
        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        if let Some(dir) = &command.cwd {
            cmd.current_dir(dir);
        }
        for (key, value) in &command.env {
            cmd.env(key, value);
        }

        let mut child = cmd.spawn().map_err(|source| ActionError::Spawn {
            program: command.program.clone(),
            source,
        })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        // Both pipes are drained while waiting, otherwise a chatty child can
        // block on a full pipe buffer.
        let (stdout, stderr, status) = tokio::join!(
            drain(stdout, Stream::Stdout),
            drain(stderr, Stream::Stderr),
            child.wait()
        );
        let status = status?;

        Ok(ProcessResult {
            succeeded: status.success(),
            exit_code: status.code().unwrap_or(SPAWN_FAILURE_EXIT_CODE),
            stdout,
            stderr,
        })
    }
}

/// Run `command` and apply the failure policy to `state`.
///
/// A nonzero exit prints a workflow error annotation naming the command.
/// Unless the command is marked `ignore_error`, the run's error flag is set.
/// A command that cannot be spawned counts as a failure with exit code -1.
pub async fn execute<R: CommandRunner>(
    runner: &R,
    state: &mut RunState,
    command: &CommandSpec,
) -> ProcessResult {
    tracing::debug!(command = %command, cwd = ?command.cwd, "Running command");

    let result = match runner.run(command).await {
        Ok(result) => result,
        Err(e) => {
            tracing::warn!("{}", e);
            ProcessResult::failure(SPAWN_FAILURE_EXIT_CODE)
        }
    };

    if result.succeeded {
        return result;
    }

    println!(
        "::error:: Process [{}] failed with exit code {}",
        command, result.exit_code
    );
    if !command.ignore_error {
        state.mark_error();
    }
    result
}
