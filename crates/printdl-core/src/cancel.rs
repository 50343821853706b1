//! Run cancellation: a shared abort token, set from SIGINT.
//!
//! The orchestrator checks the token between files and the fetcher checks it
//! inside the streaming write callback, so an interrupt stops the run at the
//! next chunk boundary. An in-flight file may be left truncated; there is no
//! temp-file-then-rename step.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Error returned when the run is stopped by the user.
#[derive(Debug)]
pub struct Cancelled;

impl fmt::Display for Cancelled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "run cancelled by user")
    }
}

impl std::error::Error for Cancelled {}

/// Process-wide flag flipped by the SIGINT handler.
static SIGINT_FLAG: AtomicBool = AtomicBool::new(false);

/// Abort token passed into the orchestrator and fetcher. Cloning shares the
/// underlying flag; `is_cancelled` also observes SIGINT.
#[derive(Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation (tests; SIGINT uses the process-wide flag).
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed) || SIGINT_FLAG.load(Ordering::Relaxed)
    }
}

#[cfg(unix)]
extern "C" fn on_sigint(_sig: libc::c_int) {
    SIGINT_FLAG.store(true, Ordering::Relaxed);
}

/// Install the SIGINT handler. Call once at startup, before the run begins.
#[cfg(unix)]
pub fn install_sigint_handler() {
    let handler = on_sigint as extern "C" fn(libc::c_int);
    unsafe {
        libc::signal(libc::SIGINT, handler as libc::sighandler_t);
    }
}

#[cfg(not(unix))]
pub fn install_sigint_handler() {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_starts_clear() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
    }

    #[test]
    fn cancel_is_visible_through_clones() {
        let token = CancelToken::new();
        let other = token.clone();
        token.cancel();
        assert!(other.is_cancelled());
    }

    #[test]
    fn independent_tokens_do_not_share_state() {
        let a = CancelToken::new();
        let b = CancelToken::new();
        a.cancel();
        assert!(!b.is_cancelled());
    }
}
