//! Side-channel accounting (C6): one process-global boolean latch.
//!
//! Any operation whose result type is plaintext, or whose control flow can
//! branch on a decrypted value, leaks through timing or branching sooner or
//! later. The latch is a conservative, user-resettable "leakage has
//! occurred since the last reset" signal, not a guarantee of how much.

use std::sync::atomic::{AtomicBool, Ordering};

static SC_WARNING: AtomicBool = AtomicBool::new(false);

/// Raises the latch if it isn't already raised, logging a one-shot warning
/// on the transition. Idempotent: repeated calls after the first are silent.
pub(crate) fn raise_warning() {
    let was_already_raised = SC_WARNING.swap(true, Ordering::SeqCst);
    if !was_already_raised {
        log::warn!("kevlar: operation's control flow or timing is data-dependent; side-channel leakage may have occurred");
    }
}

/// Forces the latch to `value`, returning its previous value so the caller
/// can restore it. Used by [`crate::oblivious`] to suppress warnings for the
/// duration of a constant-time primitive's body.
pub(crate) fn force(value: bool) -> bool {
    SC_WARNING.swap(value, Ordering::SeqCst)
}

/// Reports whether the latch is currently raised.
pub(crate) fn is_raised() -> bool {
    SC_WARNING.load(Ordering::SeqCst)
}

/// Clears the side-channel latch and logs the reset.
///
/// Part of the crate's public surface: callers use this between
/// algorithm runs to isolate which run's behavior raised the latch.
pub fn reset_warnings() {
    SC_WARNING.store(false, Ordering::SeqCst);
    log::info!("kevlar: resetting leaky behavior detectors");
}

/// Serializes every test in the crate that asserts on the exact state of
/// the latch. `SC_WARNING` is one process-global static and `cargo test`
/// runs on multiple threads by default, so without this, two latch
/// assertions in different modules could interleave and observe each
/// other's writes. Tests that only use the latch incidentally (e.g. because
/// `get_value` happens to raise it) don't need this guard.
#[cfg(test)]
pub(crate) fn latch_test_guard() -> std::sync::MutexGuard<'static, ()> {
    use std::sync::{Mutex, OnceLock};
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}
