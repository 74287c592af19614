//! Load-time bootstrap (C8): runs the key schedule exactly once, before any
//! [`crate::EncU64`] operation touches the cipher.
//!
//! Rust has no portable equivalent of a GCC `__attribute__((constructor))`
//! reachable from a library crate, so "runs before user code, exactly once"
//! is expressed the idiomatic lazy way: a [`OnceLock`] guarding the
//! key-schedule initialization, entered by every public entry point.

use std::sync::{Mutex, OnceLock};

use crate::keysched::{self, Registers};

/// The one fatal condition this library can report: it refused to
/// initialize. Everything after a successful bootstrap is non-throwing.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("hardware true-random seed instruction (RDSEED) unavailable or never reported success")]
    EntropyUnavailable,
    #[error("required AES-NI CPU features (aes, sse2) were not detected on this host")]
    MissingCpuFeature,
}

static STATE: OnceLock<Mutex<Registers>> = OnceLock::new();

/// Runs the bootstrap sequence if it has not already run, and returns
/// whether the process is ready to construct encrypted integers.
///
/// Safe to call from every public entry point: after the first successful
/// call this is a single atomic load.
pub fn try_bootstrap() -> Result<(), BootstrapError> {
    if STATE.get().is_some() {
        return Ok(());
    }

    if !(is_x86_feature_detected!("aes") && is_x86_feature_detected!("sse2")) {
        log::error!("kevlar: bootstrap failed, required AES-NI features are not present");
        return Err(BootstrapError::MissingCpuFeature);
    }

    let registers = keysched::init_ephemeral_key()?;

    // Another thread may have won the race to initialize; that's fine, the
    // schedule we just built is simply discarded.
    if STATE.set(Mutex::new(registers)).is_ok() {
        log::info!("kevlar: ephemeral AES-128 key schedule and salt initialized");
    }

    Ok(())
}

/// Runs the operation against the process-wide pinned register state,
/// bootstrapping it first if needed.
///
/// # Panics
/// Panics if bootstrap fails. Entropy/CPU-feature unavailability is the
/// single fatal condition this library defines: there is no plaintext
/// path forward without a key schedule, so every caller that reaches this
/// point has already accepted that a panic here means the library refused
/// to initialize. Callers that want to handle that condition explicitly
/// should call [`try_bootstrap`] first.
pub(crate) fn with_registers<F, R>(f: F) -> R
where
    F: FnOnce(&mut Registers) -> R,
{
    try_bootstrap().expect("kevlar: failed to bootstrap the register-resident cipher state");
    let mutex = STATE.get().expect("bootstrap just ran or already ran");
    let mut guard = mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    f(&mut guard)
}
