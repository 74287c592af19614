//! True-random seeds for the key schedule, and the deterministic PRNG stream
//! derived from them.
//!
//! Only one hardware-random draw ever happens per process: [`seed64`] polls
//! `RDSEED` until it reports success, and that single 64-bit word seeds a
//! [`ChaCha20Rng`] stream used for every subsequent "random" value (the
//! master key's four lanes, the initial salt). `RDSEED` itself is not
//! reused: it is a true-random seed instruction, not a stream generator.

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::bootstrap::BootstrapError;

#[cfg(target_arch = "x86")]
use core::arch::x86::_rdseed64_step;
#[cfg(target_arch = "x86_64")]
use core::arch::x86_64::_rdseed64_step;

/// Polls the CPU's true-random seed instruction until it reports success and
/// returns the resulting 64-bit word.
///
/// Fails only when the instruction itself is unsupported by this CPU; once
/// the feature is present the poll loop always eventually succeeds.
pub(crate) fn seed64() -> Result<u64, BootstrapError> {
    if !is_x86_feature_detected!("rdseed") {
        return Err(BootstrapError::EntropyUnavailable);
    }

    loop {
        let mut candidate: u64 = 0;
        let ok = unsafe { rdseed64_step(&mut candidate) };
        if ok {
            return Ok(candidate);
        }
    }
}

#[target_feature(enable = "rdseed")]
unsafe fn rdseed64_step(out: &mut u64) -> bool {
    _rdseed64_step(out) == 1
}

/// Seeds a deterministic PRNG stream from one [`seed64`] draw. Every 32-bit
/// value used to build the master key and the initial salt comes from this
/// stream, never from another hardware poll.
pub(crate) fn prng_from_seed(seed: u64) -> ChaCha20Rng {
    ChaCha20Rng::seed_from_u64(seed)
}

/// Draws the next 32-bit word from the PRNG stream.
pub(crate) fn next_u32(rng: &mut ChaCha20Rng) -> u32 {
    rng.next_u32()
}
