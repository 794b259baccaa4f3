use super::types::{FAILED_EXIT_CODE, TaskResult};
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::process::Stdio;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;

/// Maximum captured size per stream (1 MB).
const MAX_OUTPUT_BYTES: usize = 1_048_576;
/// How long to wait for pipes to drain once the process is gone.
const DRAIN_GRACE: Duration = Duration::from_secs(2);
/// Variables passed through to children. Everything else, API keys
/// included, is dropped.
const SAFE_ENV_VARS: &[&str] = &[
    "PATH", "HOME", "TERM", "LANG", "LC_ALL", "LC_CTYPE", "USER", "SHELL", "TMPDIR",
];
#[cfg(windows)]
const SAFE_WINDOWS_ENV_VARS: &[&str] =
    &["SYSTEMROOT", "WINDIR", "COMSPEC", "PATHEXT", "USERPROFILE", "TEMP", "TMP"];

/// A program plus arguments to run as a separate OS process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
}

impl Invocation {
    /// `<shell> -c <command>`: the command line goes to the shell verbatim.
    pub fn shell(shell: &str, command: &str) -> Self {
        Self {
            program: shell.to_string(),
            args: vec!["-c".to_string(), command.to_string()],
            working_dir: None,
        }
    }

    pub fn in_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.working_dir = dir;
        self
    }
}

/// Spawns processes with captured output and a hard wall-clock ceiling.
///
/// Implementations never fail: spawn errors and timeouts come back as a
/// failed [`TaskResult`].
pub trait ProcessSpawner: Send + Sync {
    fn run<'a>(
        &'a self,
        invocation: &'a Invocation,
        timeout: Duration,
    ) -> Pin<Box<dyn Future<Output = TaskResult> + Send + 'a>>;
}

/// Runs processes on the host.
///
/// Each child leads its own process group; when the timeout fires, or once
/// the child exits, the whole group is killed so nothing it started
/// outlives the task.
pub struct HostSpawner;

impl HostSpawner {
    pub const fn new() -> Self {
        Self
    }
}

impl ProcessSpawner for HostSpawner {
    fn run<'a>(
        &'a self,
        invocation: &'a Invocation,
        timeout: Duration,
    ) -> Pin<Box<dyn Future<Output = TaskResult> + Send + 'a>> {
        Box::pin(async move {
            let mut cmd = Command::new(&invocation.program);
            cmd.args(&invocation.args)
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true)
                .env_clear();
            for var in SAFE_ENV_VARS {
                if let Ok(val) = std::env::var(var) {
                    cmd.env(var, val);
                }
            }
            #[cfg(windows)]
            for var in SAFE_WINDOWS_ENV_VARS {
                if let Ok(val) = std::env::var(var) {
                    cmd.env(var, val);
                }
            }
            if let Some(dir) = &invocation.working_dir {
                cmd.current_dir(dir);
            }
            #[cfg(unix)]
            cmd.process_group(0);

            let mut child = match cmd.spawn() {
                Ok(child) => child,
                Err(e) => {
                    tracing::warn!(program = %invocation.program, error = %e, "spawn failed");
                    return TaskResult::aborted(format!("Failed to execute command: {e}"));
                }
            };

            // `Child::id` turns into `None` once the child has been reaped.
            let pid = child.id();
            let stdout_reader = StreamReader::spawn(child.stdout.take());
            let stderr_reader = StreamReader::spawn(child.stderr.take());

            let waited = tokio::time::timeout(timeout, child.wait()).await;
            terminate_group(&mut child, pid).await;

            match waited {
                Ok(Ok(status)) => {
                    let stdout = stdout_reader.finish().await;
                    let stderr = stderr_reader.finish().await;
                    TaskResult::from_exit(
                        status.code().unwrap_or(FAILED_EXIT_CODE),
                        stdout,
                        stderr,
                    )
                }
                Ok(Err(e)) => {
                    stdout_reader.abort();
                    stderr_reader.abort();
                    TaskResult::aborted(format!("Failed to wait for command: {e}"))
                }
                Err(_) => {
                    stdout_reader.abort();
                    stderr_reader.abort();
                    tracing::warn!(
                        program = %invocation.program,
                        timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                        "command timed out, process group killed"
                    );
                    TaskResult::aborted(format!(
                        "Command timed out after {} and was killed",
                        describe_duration(timeout)
                    ))
                }
            }
        })
    }
}

/// Kill every process in the child's group, then reap the child itself.
async fn terminate_group(child: &mut Child, pid: Option<u32>) {
    #[cfg(unix)]
    if let Some(pid) = pid.and_then(|pid| i32::try_from(pid).ok()) {
        use nix::sys::signal::{Signal, killpg};
        use nix::unistd::Pid;
        // ESRCH just means the group is already gone.
        let _ = killpg(Pid::from_raw(pid), Signal::SIGKILL);
    }
    #[cfg(not(unix))]
    let _ = pid;
    let _ = child.kill().await;
}

#[derive(Default)]
struct Capture {
    bytes: Vec<u8>,
    truncated: bool,
}

/// Reads one pipe in the background into a buffer that stays readable if
/// the pipe never reaches EOF.
struct StreamReader {
    capture: Arc<Mutex<Capture>>,
    task: JoinHandle<()>,
}

impl StreamReader {
    fn spawn<R>(stream: Option<R>) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let capture = Arc::new(Mutex::new(Capture::default()));
        let task = tokio::spawn(read_capped(stream, Arc::clone(&capture)));
        Self { capture, task }
    }

    /// Wait up to [`DRAIN_GRACE`] for EOF, then return whatever was read.
    /// A process outside the killed group can hold the pipe open forever.
    async fn finish(mut self) -> String {
        if tokio::time::timeout(DRAIN_GRACE, &mut self.task).await.is_err() {
            tracing::debug!("pipe still open after exit; keeping partial output");
        }
        self.task.abort();
        let capture = self.capture.lock().unwrap_or_else(PoisonError::into_inner);
        let mut text = String::from_utf8_lossy(&capture.bytes).into_owned();
        if capture.truncated {
            text.push_str("\n... [output truncated at 1MB]");
        }
        text
    }

    fn abort(&self) {
        self.task.abort();
    }
}

async fn read_capped<R>(stream: Option<R>, capture: Arc<Mutex<Capture>>)
where
    R: AsyncRead + Unpin,
{
    let Some(mut stream) = stream else {
        return;
    };

    let mut chunk = [0_u8; 8192];
    loop {
        match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                let mut capture = capture.lock().unwrap_or_else(PoisonError::into_inner);
                let room = MAX_OUTPUT_BYTES.saturating_sub(capture.bytes.len());
                if n > room {
                    capture.truncated = true;
                }
                capture.bytes.extend_from_slice(&chunk[..n.min(room)]);
            }
        }
    }
}

fn describe_duration(duration: Duration) -> String {
    if duration.subsec_millis() == 0 {
        format!("{}s", duration.as_secs())
    } else {
        format!("{}ms", duration.as_millis())
    }
}
