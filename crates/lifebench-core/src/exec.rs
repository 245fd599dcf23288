//! Blocking subprocess execution.
//!
//! One child at a time. stdout is inherited so the simulation's own output
//! stays visible; stderr is captured in full for the timing report.

use crate::error::{Result, SweepError};
use crate::invocation::Invocation;
use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

/// What the sweep needs back from one finished run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// `None` when the child was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stderr: String,
    /// Wall-clock time measured around the blocking call.
    pub wall: Duration,
}

pub trait Executor {
    fn execute(&mut self, inv: &Invocation) -> Result<RunOutput>;
}

/// Runs invocations as real child processes with the inherited environment.
#[derive(Debug, Clone, Default)]
pub struct ProcessExecutor {
    timeout: Option<Duration>,
}

impl ProcessExecutor {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }
}

impl Executor for ProcessExecutor {
    fn execute(&mut self, inv: &Invocation) -> Result<RunOutput> {
        let start = Instant::now();
        let mut cmd = Command::new(inv.program());
        cmd.args(inv.args())
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::piped());
        // A timed run gets its own process group so the timer wrapper, the
        // launcher and the simulation can be killed together. Untimed runs stay
        // in ours and keep receiving terminal signals.
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            if self.timeout.is_some() {
                cmd.process_group(0);
            }
        }
        let mut child = cmd
            .spawn()
            .map_err(|source| SweepError::Launch {
                program: inv.program().to_string_lossy().into_owned(),
                source,
            })?;

        // Drain stderr on a side thread so a chatty child cannot block on a full pipe.
        let reader = child.stderr.take().map(|mut pipe| {
            std::thread::spawn(move || {
                let mut buf = Vec::new();
                let _ = pipe.read_to_end(&mut buf);
                buf
            })
        });

        let waited = match self.timeout {
            None => child.wait().map(Some),
            Some(limit) => child.wait_timeout(limit),
        };

        let status = match waited {
            Ok(Some(status)) => status,
            Ok(None) => {
                kill_and_reap(&mut child, self.timeout.is_some());
                return Err(SweepError::Timeout {
                    command: inv.to_string(),
                    timeout: self.timeout.unwrap_or_default(),
                });
            }
            Err(source) => {
                kill_and_reap(&mut child, self.timeout.is_some());
                return Err(SweepError::Wait {
                    command: inv.to_string(),
                    source,
                });
            }
        };
        let wall = start.elapsed();

        let stderr = reader
            .and_then(|h| h.join().ok())
            .map(|buf| String::from_utf8_lossy(&buf).into_owned())
            .unwrap_or_default();

        if !status.success() {
            tracing::warn!(
                command = %inv,
                code = ?status.code(),
                "child exited unsuccessfully"
            );
        }

        Ok(RunOutput {
            exit_code: status.code(),
            stderr,
            wall,
        })
    }
}

/// SIGKILL the child's whole process group when it leads one, then reap it.
fn kill_and_reap(child: &mut Child, grouped: bool) {
    #[cfg(unix)]
    {
        use nix::sys::signal::{killpg, Signal};
        use nix::unistd::Pid;
        if grouped {
            let _ = killpg(Pid::from_raw(child.id() as i32), Signal::SIGKILL);
        }
    }
    #[cfg(not(unix))]
    let _ = grouped;
    let _ = child.kill();
    let _ = child.wait();
}

/// Extension trait to add `wait_timeout` to `Child`.
trait ChildExt {
    fn wait_timeout(&mut self, timeout: Duration) -> std::io::Result<Option<ExitStatus>>;
}

impl ChildExt for Child {
    fn wait_timeout(&mut self, timeout: Duration) -> std::io::Result<Option<ExitStatus>> {
        let start = Instant::now();
        let poll_interval = Duration::from_millis(50);

        loop {
            match self.try_wait()? {
                Some(status) => return Ok(Some(status)),
                None => {
                    if start.elapsed() >= timeout {
                        return Ok(None);
                    }
                    std::thread::sleep(poll_interval);
                }
            }
        }
    }
}
