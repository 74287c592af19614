//! Authentication recovery (C5): walk single-bit flips over a ciphertext
//! that failed to authenticate until one of them fixes it, or the space is
//! exhausted.

use crate::cipher;

/// Attempts to recover `ciphertext` in place.
///
/// On success, returns the recovered plaintext value and the bit index that
/// was corrected, and leaves `ciphertext` holding the flipped bit so that
/// the caller's retried decrypt now succeeds. On failure, restores
/// `ciphertext` to its original value and returns `None`; the caller's
/// plaintext is undefined in that case.
pub(crate) fn try_recover(round_keys: &[u128; 11], ciphertext: &mut u128) -> Option<(u64, u32)> {
    log::error!("kevlar: decryption authentication failure");
    log::info!("kevlar: attempting recovery of corrupted ciphertext...");

    for bit in 0..128u32 {
        *ciphertext ^= 1u128 << bit;

        let (value, auth) = cipher::decrypt_value(round_keys, *ciphertext);
        if auth {
            log::info!("kevlar: ciphertext was fixed (flipped bit {bit})");
            return Some((value, bit));
        }

        // Undo the flip and keep walking.
        *ciphertext ^= 1u128 << bit;
    }

    log::warn!("kevlar: ciphertext was not fixed, too many bit flips");
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keysched::init_ephemeral_key;

    #[test]
    fn recovers_from_every_possible_single_bit_flip() {
        let _ = env_logger::try_init();
        let regs = init_ephemeral_key().expect("AES-NI + RDSEED must be present to run tests");
        let mut regs_mut = regs;
        let valid = crate::cipher::encrypt_value(&mut regs_mut, 13);

        for bit in 0..128u32 {
            let mut corrupted = valid ^ (1u128 << bit);
            let recovered = try_recover(&regs_mut.round_keys, &mut corrupted)
                .expect("a single bit flip must always be recoverable");
            assert_eq!(recovered, (13, bit));
            assert_eq!(corrupted, valid, "recovery should flip the ciphertext back to the valid block");
        }
    }
}
