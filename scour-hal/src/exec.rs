//! Process execution boundary.
//!
//! External commands are "world-touching" and must go through the `Execute`
//! capability so cleanup flows can be tested without spawning real processes.

use crate::{OpsError, OpsResult};
use log::debug;
use std::io::Read;
use std::process::{Command, Stdio};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wait_timeout::ChildExt;

/// Ceiling for a single tool invocation. LVM and mdadm can stall on
/// half-dead devices; a cleanup step must not hang the install.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(180);

/// Single-method capability for running an external command.
///
/// On success the returned string merges stdout with any diagnostic output
/// the tool wrote to stderr. stdin is never piped.
pub trait Execute: Send + Sync {
    fn execute(&self, command: &str, args: &[&str]) -> OpsResult<String>;
}

/// Production executor spawning real subprocesses with a timeout.
#[derive(Debug, Clone)]
pub struct ShellExecutor {
    timeout: Duration,
}

impl ShellExecutor {
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_COMMAND_TIMEOUT,
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for ShellExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl Execute for ShellExecutor {
    fn execute(&self, command: &str, args: &[&str]) -> OpsResult<String> {
        debug!("exec: {} {}", command, args.join(" "));

        let mut child = Command::new(command)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| match err.kind() {
                std::io::ErrorKind::NotFound => OpsError::CommandNotFound(command.to_string()),
                _ => OpsError::Io(err),
            })?;

        // Drain the pipes on threads so a chatty tool cannot deadlock
        // against a full pipe buffer while we wait on the exit status.
        let mut stdout_pipe = child.stdout.take();
        let mut stderr_pipe = child.stderr.take();
        let stdout_handle = std::thread::spawn(move || {
            let mut buf = Vec::new();
            if let Some(ref mut pipe) = stdout_pipe {
                let _ = pipe.read_to_end(&mut buf);
            }
            buf
        });
        let stderr_handle = std::thread::spawn(move || {
            let mut buf = Vec::new();
            if let Some(ref mut pipe) = stderr_pipe {
                let _ = pipe.read_to_end(&mut buf);
            }
            buf
        });

        let status = match child.wait_timeout(self.timeout)? {
            Some(status) => status,
            None => {
                let _ = child.kill();
                let _ = child.wait();
                let _ = stdout_handle.join();
                let _ = stderr_handle.join();
                return Err(OpsError::CommandTimeout {
                    program: command.to_string(),
                    timeout_secs: self.timeout.as_secs(),
                });
            }
        };

        let stdout = String::from_utf8(stdout_handle.join().unwrap_or_default())?;
        let stderr = String::from_utf8(stderr_handle.join().unwrap_or_default())?;

        if !status.success() {
            return Err(OpsError::CommandFailed {
                program: command.to_string(),
                code: status.code(),
                stderr: stderr.trim_end().to_string(),
            });
        }

        // The LVM and mdadm tools report warnings on stderr even when they
        // succeed; callers get one merged transcript.
        let mut merged = stdout;
        merged.push_str(&stderr);
        Ok(merged)
    }
}

/// One recorded call through a [`FakeExecutor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub command: String,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn has_arg(&self, arg: &str) -> bool {
        self.args.iter().any(|a| a == arg)
    }
}

#[derive(Debug)]
struct Expectation {
    command: String,
    args: Vec<String>,
    result: Result<String, String>,
    consumed: bool,
}

#[derive(Debug, Default)]
struct FakeExecutorState {
    expectations: Vec<Expectation>,
    invocations: Vec<Invocation>,
}

/// Scripted executor for CI-safe testing.
///
/// Each expectation names a command plus argument tokens that must all be
/// present in the call (argument ordering within one invocation is not part
/// of the contract); the first unconsumed match supplies the scripted
/// output or error. Every call is recorded for later assertion.
#[derive(Debug, Clone, Default)]
pub struct FakeExecutor {
    state: Arc<Mutex<FakeExecutorState>>,
}

impl FakeExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a successful invocation.
    pub fn expect(&self, command: &str, args: &[&str], stdout: &str) {
        self.push(command, args, Ok(stdout.to_string()));
    }

    /// Script a failing invocation.
    pub fn expect_err(&self, command: &str, args: &[&str], message: &str) {
        self.push(command, args, Err(message.to_string()));
    }

    /// All calls made so far, in order.
    pub fn invocations(&self) -> Vec<Invocation> {
        self.state.lock().unwrap().invocations.clone()
    }

    pub fn has_invocation(&self, check: impl Fn(&Invocation) -> bool) -> bool {
        self.state.lock().unwrap().invocations.iter().any(check)
    }

    /// Number of scripted expectations not yet served.
    pub fn pending_expectations(&self) -> usize {
        self.state
            .lock()
            .unwrap()
            .expectations
            .iter()
            .filter(|e| !e.consumed)
            .count()
    }

    fn push(&self, command: &str, args: &[&str], result: Result<String, String>) {
        self.state.lock().unwrap().expectations.push(Expectation {
            command: command.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            result,
            consumed: false,
        });
    }
}

impl Execute for FakeExecutor {
    fn execute(&self, command: &str, args: &[&str]) -> OpsResult<String> {
        let mut state = self.state.lock().unwrap();
        state.invocations.push(Invocation {
            command: command.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        });

        let slot = state.expectations.iter_mut().find(|e| {
            !e.consumed
                && e.command == command
                && e.args.iter().all(|want| args.contains(&want.as_str()))
        });
        match slot {
            Some(expectation) => {
                expectation.consumed = true;
                match &expectation.result {
                    Ok(stdout) => Ok(stdout.clone()),
                    Err(message) => Err(OpsError::Other(message.clone())),
                }
            }
            None => Err(OpsError::Other(format!(
                "unexpected invocation: {} {}",
                command,
                args.join(" ")
            ))),
        }
    }
}
