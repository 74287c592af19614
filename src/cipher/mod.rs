//! Block cipher primitive (C3): the authenticated 128-bit packet layout
//! layout, the salt mix-in, and the two straight-line entry points
//! (`encrypt_value`/`decrypt_value`) that are the sole channel plaintext
//! ever crosses.

pub(crate) mod simd;

use crate::keysched::{Registers, SALT_INC};

/// Lane 0 of a well-formed plaintext packet before encryption: the fixed
/// authentication cookie, fixed rather than derived.
const AUTH_COOKIE: u32 = 42;

/// Splits a 128-bit block into its four 32-bit lanes, lane 0 at the low end.
fn unpack_lanes(block: u128) -> [u32; 4] {
    [
        block as u32,
        (block >> 32) as u32,
        (block >> 64) as u32,
        (block >> 96) as u32,
    ]
}

/// Packs four 32-bit lanes back into a single 128-bit block.
fn pack_lanes(lanes: [u32; 4]) -> u128 {
    (lanes[0] as u128)
        | (lanes[1] as u128) << 32
        | (lanes[2] as u128) << 64
        | (lanes[3] as u128) << 96
}

/// Adds two lane tuples together, lane-wise, with wraparound per lane (the
/// `paddd`/salt mix-in is a per-lane add, never a carrying 128-bit add).
fn add_lanes(a: [u32; 4], b: [u32; 4]) -> [u32; 4] {
    [
        a[0].wrapping_add(b[0]),
        a[1].wrapping_add(b[1]),
        a[2].wrapping_add(b[2]),
        a[3].wrapping_add(b[3]),
    ]
}

/// Encrypts `value` under the current salt, advancing the salt first so that
/// every call this process produces a unique ciphertext.
///
/// This is C3's `encrypt_from_reg`: it both reads and mutates `registers`,
/// since advancing R_SALT is the encrypt primitive's job, not the caller's.
pub(crate) fn encrypt_value(registers: &mut Registers, value: u64) -> u128 {
    registers.salt = add_lanes(registers.salt, SALT_INC);

    let packet_lanes = [AUTH_COOKIE, 0, value as u32, (value >> 32) as u32];
    let salted = add_lanes(packet_lanes, registers.salt);
    let block = pack_lanes(salted);

    unsafe { simd::encrypt_block(block, &registers.round_keys) }
}

/// Decrypts `ciphertext` and checks the authentication cookie. Returns the
/// recovered value and whether authentication succeeded; never panics on a
/// bad ciphertext (that's C5's job, one layer up).
pub(crate) fn decrypt_value(round_keys: &[u128; 11], ciphertext: u128) -> (u64, bool) {
    let block = unsafe { simd::decrypt_block(ciphertext, round_keys) };
    let lanes = unpack_lanes(block);

    let auth = lanes[0] == AUTH_COOKIE;
    let value = (lanes[3] as u64) << 32 | lanes[2] as u64;

    (value, auth)
}
