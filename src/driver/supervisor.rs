//! Child termination and escalating cancellation
//!
//! Cancellation is cooperative and explicit: interrupt, interrupt again (one
//! for an interactive sub-prompt, one for the outer process), then a
//! stronger termination signal, then after a short grace delay a best-effort
//! kill so the test runner never leaks a child.

use std::time::Duration;

use tokio::process::Child;

/// Grace period between the termination request and the hard kill
pub const GRACE: Duration = Duration::from_millis(100);

#[cfg(unix)]
fn signal(child: &Child, sig: libc::c_int) {
    if let Some(pid) = child.id() {
        // Signal delivery is best-effort; the child may already be gone
        unsafe {
            libc::kill(pid as i32, sig);
        }
    }
}

/// Request graceful shutdown (SIGINT on Unix)
pub fn interrupt(child: &mut Child) {
    #[cfg(unix)]
    signal(child, libc::SIGINT);
    #[cfg(not(unix))]
    let _ = child.start_kill();
}

/// Request termination (SIGTERM on Unix)
pub fn terminate(child: &mut Child) {
    #[cfg(unix)]
    signal(child, libc::SIGTERM);
    #[cfg(not(unix))]
    let _ = child.start_kill();
}

/// The full escalation sequence used when a run times out:
/// interrupt, interrupt, terminate, grace delay, then kill if still alive.
pub async fn escalate(child: &mut Child) {
    interrupt(child);
    interrupt(child);
    terminate(child);
    tokio::time::sleep(GRACE).await;
    if matches!(child.try_wait(), Ok(None)) {
        tracing::warn!("child survived termination request, killing");
        let _ = child.start_kill();
        let _ = child.wait().await;
    }
}

/// Reap the child, escalating to a kill if it ignores the interrupts
pub async fn reap(child: &mut Child) {
    match tokio::time::timeout(Duration::from_secs(2), child.wait()).await {
        Ok(_) => {}
        Err(_) => {
            let _ = child.start_kill();
            let _ = child.wait().await;
        }
    }
}
