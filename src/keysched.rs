//! Register-resident key schedule (C2).
//!
//! Builds the 11-entry AES-128 round-key table from a random seed and bundles
//! it with the salt/increment pair known as R_SALT/R_INC. The bundle
//! (`Registers`) is the single process-wide cell bootstrap pins in place;
//! see [`crate::bootstrap`] for the "never spilled to memory after boot"
//! adaptation note.

use crate::bootstrap::BootstrapError;
use crate::cipher::simd;
use crate::entropy;

/// The salt increment: a 128-bit word whose only nonzero lane is value 1
/// in lane 1.
pub(crate) const SALT_INC: [u32; 4] = [0, 1, 0, 0];

/// The pinned state C2 builds once: the round-key table (indices 0..6 and 10
/// are the ones the reduced-round cipher actually reads) and the
/// monotonically-incrementing salt.
pub(crate) struct Registers {
    pub(crate) round_keys: [u128; 11],
    pub(crate) salt: [u32; 4],
}

/// Builds a fresh ephemeral key schedule and initial salt. Idempotence is
/// the caller's job (`bootstrap::try_bootstrap` only calls this once).
pub(crate) fn init_ephemeral_key() -> Result<Registers, BootstrapError> {
    let seed = entropy::seed64()?;
    let mut rng = entropy::prng_from_seed(seed);

    // Four PRNG draws assembled into the 128-bit master key, one lane each.
    let lane0 = entropy::next_u32(&mut rng) as u128;
    let lane1 = entropy::next_u32(&mut rng) as u128;
    let lane2 = entropy::next_u32(&mut rng) as u128;
    let lane3 = entropy::next_u32(&mut rng) as u128;
    let master_key = lane0 | (lane1 << 32) | (lane2 << 64) | (lane3 << 96);

    let round_keys = unsafe { simd::key_expansion(master_key) };

    // R_SALT = (0, PRNG_draw(), 0, 0): only lane 1 starts nonzero, matching
    // the lane R_INC ever touches.
    let salt = [0, entropy::next_u32(&mut rng), 0, 0];

    Ok(Registers { round_keys, salt })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_schedules_are_independent() {
        let _ = env_logger::try_init();
        // Each call draws fresh entropy, so round keys should essentially
        // never collide; this is a sanity check, not a cryptographic claim.
        let a = init_ephemeral_key().expect("AES-NI + RDSEED must be present to run tests");
        let b = init_ephemeral_key().expect("AES-NI + RDSEED must be present to run tests");
        assert_ne!(a.round_keys, b.round_keys);
    }

    #[test]
    fn only_lane_one_of_initial_salt_is_nonzero() {
        let _ = env_logger::try_init();
        let regs = init_ephemeral_key().expect("AES-NI + RDSEED must be present to run tests");
        assert_eq!(regs.salt[0], 0);
        assert_eq!(regs.salt[2], 0);
        assert_eq!(regs.salt[3], 0);
    }
}
