//! External tool invocation.
//!
//! Every analyzer shells out to a third-party tool. Tools are run with stdin
//! closed, both output streams captured, and a hard timeout after which the
//! child's whole process group is killed. A non-zero exit status is not an
//! error: most linters exit non-zero exactly when they have something to
//! report.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;

/// How often a running child is polled for exit.
const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Errors that can occur while running an external tool.
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("{program} not found")]
    NotFound { program: String },
    #[error("{program} timed out after {}s", .timeout.as_secs())]
    TimedOut { program: String, timeout: Duration },
    #[error("failed to run {program}: {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

impl ToolError {
    /// Whether the tool should be treated as absent (missing or hung).
    pub fn is_unavailable(&self) -> bool {
        matches!(self, ToolError::NotFound { .. } | ToolError::TimedOut { .. })
    }
}

/// Captured output of a finished tool.
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
    /// Exit code; None when terminated by a signal.
    pub code: Option<i32>,
}

impl ToolOutput {
    /// stdout followed by stderr.
    pub fn combined(&self) -> String {
        if self.stderr.is_empty() {
            return self.stdout.clone();
        }
        if self.stdout.is_empty() {
            return self.stderr.clone();
        }
        let mut out = self.stdout.clone();
        if !out.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(&self.stderr);
        out
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Builder for a single tool invocation.
#[derive(Debug, Clone)]
pub struct Tool {
    program: String,
    args: Vec<String>,
    cwd: Option<PathBuf>,
    timeout: Duration,
}

impl Tool {
    pub fn new(program: &str, timeout: Duration) -> Self {
        Self {
            program: program.to_string(),
            args: Vec::new(),
            cwd: None,
            timeout,
        }
    }

    pub fn arg<S: AsRef<str>>(mut self, arg: S) -> Self {
        self.args.push(arg.as_ref().to_string());
        self
    }

    pub fn path_arg<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.args
            .push(path.as_ref().to_string_lossy().into_owned());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_string()));
        self
    }

    pub fn current_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Run the tool to completion or until the timeout expires.
    pub fn run(&self) -> Result<ToolOutput, ToolError> {
        log::debug!("running {} {}", self.program, self.args.join(" "));
        let started = Instant::now();

        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &self.cwd {
            command.current_dir(dir);
        }
        // Own process group: npx and the jar wrappers fork the real tool.
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }

        let mut child = command.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ToolError::NotFound {
                    program: self.program.clone(),
                }
            } else {
                ToolError::Io {
                    program: self.program.clone(),
                    source: e,
                }
            }
        })?;

        // Drain both pipes on their own threads so a chatty tool cannot block
        // on a full pipe while we wait for it.
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let stdout_reader = thread::spawn(move || read_stream(stdout));
        let stderr_reader = thread::spawn(move || read_stream(stderr));

        let deadline = started + self.timeout;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) if Instant::now() >= deadline => {
                    kill_process_group(&mut child);
                    let _ = child.wait();
                    log::warn!(
                        "{} did not finish within {}s, killed",
                        self.program,
                        self.timeout.as_secs()
                    );
                    return Err(ToolError::TimedOut {
                        program: self.program.clone(),
                        timeout: self.timeout,
                    });
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(e) => {
                    let _ = child.kill();
                    return Err(ToolError::Io {
                        program: self.program.clone(),
                        source: e,
                    });
                }
            }
        };

        let output = ToolOutput {
            stdout: stdout_reader.join().unwrap_or_default(),
            stderr: stderr_reader.join().unwrap_or_default(),
            code: status.code(),
        };
        log::debug!(
            "{} exited with {:?} in {:.2}s",
            self.program,
            output.code,
            started.elapsed().as_secs_f64()
        );
        Ok(output)
    }
}

/// Kill `child` together with everything in its process group.
#[cfg(unix)]
fn kill_process_group(child: &mut Child) {
    let group = format!("-{}", child.id());
    let killed = Command::new("kill")
        .args(["-KILL", "--", &group])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false);
    if !killed {
        log::debug!("could not signal process group {}, killing child only", group);
        let _ = child.kill();
    }
}

#[cfg(not(unix))]
fn kill_process_group(child: &mut Child) {
    let _ = child.kill();
}

fn read_stream<R: Read>(stream: Option<R>) -> String {
    let mut buf = Vec::new();
    if let Some(mut s) = stream {
        let _ = s.read_to_end(&mut buf);
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// Check whether a tool can be started and exits successfully with `args`.
pub fn is_available(program: &str, args: &[&str], timeout: Duration) -> bool {
    Tool::new(program, timeout)
        .args(args)
        .run()
        .map(|o| o.success())
        .unwrap_or(false)
}
