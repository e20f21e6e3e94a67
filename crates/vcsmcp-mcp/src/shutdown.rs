//! Graceful shutdown for server child processes with SIGTERM → SIGKILL escalation.

use std::io;
use std::process::ExitStatus;
use std::time::Duration;

use tokio::process::Child;

#[cfg(unix)]
use nix::sys::signal::{self, Signal};
#[cfg(unix)]
use nix::unistd::Pid;
#[cfg(unix)]
use tokio::time::timeout;

/// Shut down a child process, escalating to a hard kill after `grace`.
///
/// # Strategy
/// 1. Send SIGTERM and wait up to `grace` for the process to exit
/// 2. If still running, kill it
/// 3. Reap the process
///
/// On Windows there is no SIGTERM equivalent, so the process is killed
/// immediately.
pub(crate) async fn shutdown_child(child: &mut Child, grace: Duration) -> io::Result<ExitStatus> {
    #[cfg(unix)]
    {
        shutdown_unix(child, grace).await
    }

    #[cfg(not(unix))]
    {
        let _ = grace;
        child.kill().await?;
        child.wait().await
    }
}

#[cfg(unix)]
async fn shutdown_unix(child: &mut Child, grace: Duration) -> io::Result<ExitStatus> {
    // No PID means the child was already reaped
    let Some(pid) = child.id() else {
        return child.wait().await;
    };
    let pid = i32::try_from(pid).map_err(io::Error::other)?;

    if let Err(e) = signal::kill(Pid::from_raw(pid), Signal::SIGTERM) {
        if e == nix::errno::Errno::ESRCH {
            return child.wait().await;
        }
        return Err(io::Error::other(e));
    }

    if let Ok(result) = timeout(grace, child.wait()).await {
        return result;
    }

    tracing::debug!(pid, "Server ignored SIGTERM, sending SIGKILL");
    child.kill().await?;
    child.wait().await
}
