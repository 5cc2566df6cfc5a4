//! Bounded execution of external tools.

use std::io::Read;
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use super::{MediaError, MediaResult};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Number of stderr lines kept in error messages.
const STDERR_TAIL_LINES: usize = 10;

/// Captured output of a finished tool.
#[derive(Debug, Clone, Default)]
pub struct ProcessOutput {
    pub stdout: Vec<u8>,
    pub stderr: String,
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<Vec<u8>>> {
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buffer = Vec::new();
            let _ = pipe.read_to_end(&mut buffer);
            buffer
        })
    })
}

fn collect(handle: Option<JoinHandle<Vec<u8>>>) -> Vec<u8> {
    handle.and_then(|h| h.join().ok()).unwrap_or_default()
}

fn stderr_tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr.lines().collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}

fn kill_and_reap(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

/// Run `cmd` to completion, killing it if it outlives `timeout`.
///
/// stdout and stderr are drained on helper threads so a chatty tool cannot
/// block on a full pipe while we wait on it.
pub fn run_with_timeout(
    cmd: &mut Command,
    tool: &str,
    timeout: Duration,
) -> MediaResult<ProcessOutput> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    tracing::debug!("Running {}: {:?}", tool, cmd);

    let mut child = cmd.spawn().map_err(|source| MediaError::Spawn {
        tool: tool.to_string(),
        source,
    })?;

    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {
                if Instant::now() >= deadline {
                    kill_and_reap(&mut child);
                    let _ = collect(stdout);
                    let _ = collect(stderr);
                    tracing::warn!("{} exceeded {:?}, killed", tool, timeout);
                    return Err(MediaError::TimedOut {
                        tool: tool.to_string(),
                        timeout,
                    });
                }
                thread::sleep(POLL_INTERVAL);
            }
            Err(source) => {
                kill_and_reap(&mut child);
                return Err(MediaError::Io {
                    operation: format!("waiting for {}", tool),
                    source,
                });
            }
        }
    };

    let output = ProcessOutput {
        stdout: collect(stdout),
        stderr: String::from_utf8_lossy(&collect(stderr)).into_owned(),
    };

    if !status.success() {
        return Err(MediaError::CommandFailed {
            tool: tool.to_string(),
            exit_code: status.code().unwrap_or(-1),
            message: stderr_tail(&output.stderr),
        });
    }

    Ok(output)
}
