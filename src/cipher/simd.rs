//! AES-NI intrinsics for the key expansion and the reduced-round cipher
//! itself. This is the only place in the crate that speaks `__m128i`.

#[cfg(target_arch = "x86")]
use core::arch::x86::{
    __m128i, _mm_aesdec_si128, _mm_aesdeclast_si128, _mm_aesenc_si128, _mm_aesenclast_si128,
    _mm_aesimc_si128, _mm_aeskeygenassist_si128, _mm_shuffle_epi32, _mm_slli_si128, _mm_xor_si128,
};
#[cfg(target_arch = "x86_64")]
use core::arch::x86_64::{
    __m128i, _mm_aesdec_si128, _mm_aesdeclast_si128, _mm_aesenc_si128, _mm_aesenclast_si128,
    _mm_aesimc_si128, _mm_aeskeygenassist_si128, _mm_shuffle_epi32, _mm_slli_si128, _mm_xor_si128,
};

/// AES-128 key expansion round constants, one per expansion step.
const RCON: [i32; 10] = [0x01, 0x02, 0x04, 0x08, 0x10, 0x20, 0x40, 0x80, 0x1B, 0x36];

/// Transmutes a `u128` straight into the vector register type. There is no
/// cheaper or safer way to get a 128-bit value into `__m128i`.
unsafe fn to_sse_128(n: u128) -> __m128i {
    std::mem::transmute(n)
}

unsafe fn from_sse_128(n: __m128i) -> u128 {
    std::mem::transmute(n)
}

/// Produces round key `i` (i > 0, i <= 10) from round key `i - 1`, using the
/// `_mm_aeskeygenassist_si128` intrinsic.
macro_rules! key_expand_i {
    ($key:ident, $i:expr) => {{
        let xmm1 = to_sse_128($key);
        let xmm2 = _mm_aeskeygenassist_si128::<{ RCON[$i] }>(xmm1);
        from_sse_128(key_expansion_assist(xmm1, xmm2))
    }};
}

/// Expands one 128-bit master key into the full 11-entry AES-128 round-key
/// table. The reduced-round cipher below only ever reads indices
/// 0, 1..=6 and 10; 7..=9 are computed for completeness but otherwise unused.
#[target_feature(enable = "aes")]
pub(crate) unsafe fn key_expansion(key: u128) -> [u128; 11] {
    let rk0 = key;
    let rk1 = key_expand_i!(rk0, 0);
    let rk2 = key_expand_i!(rk1, 1);
    let rk3 = key_expand_i!(rk2, 2);
    let rk4 = key_expand_i!(rk3, 3);
    let rk5 = key_expand_i!(rk4, 4);
    let rk6 = key_expand_i!(rk5, 5);
    let rk7 = key_expand_i!(rk6, 6);
    let rk8 = key_expand_i!(rk7, 7);
    let rk9 = key_expand_i!(rk8, 8);
    let rk10 = key_expand_i!(rk9, 9);

    [rk0, rk1, rk2, rk3, rk4, rk5, rk6, rk7, rk8, rk9, rk10]
}

#[target_feature(enable = "sse2")]
unsafe fn key_expansion_assist(mut xmm1: __m128i, mut xmm2: __m128i) -> __m128i {
    let mut xmm3: __m128i;

    xmm2 = _mm_shuffle_epi32::<255>(xmm2);
    xmm3 = _mm_slli_si128::<4>(xmm1);
    xmm1 = _mm_xor_si128(xmm1, xmm3);
    xmm3 = _mm_slli_si128::<4>(xmm1);
    xmm1 = _mm_xor_si128(xmm1, xmm3);
    xmm3 = _mm_slli_si128::<4>(xmm1);
    xmm1 = _mm_xor_si128(xmm1, xmm3);
    xmm1 = _mm_xor_si128(xmm1, xmm2);
    xmm1
}

/// Reduced-round AES-128 encrypt: key0 whitening, six forward rounds with
/// keys 1..=6, one last round with key 10. Keys 7..=9 are never
/// touched; that's what "reduced-round" means here.
#[target_feature(enable = "aes")]
pub(crate) unsafe fn encrypt_block(state: u128, round_keys: &[u128; 11]) -> u128 {
    let mut block = to_sse_128(state);

    block = _mm_xor_si128(block, to_sse_128(round_keys[0]));
    for key in &round_keys[1..=6] {
        block = _mm_aesenc_si128(block, to_sse_128(*key));
    }
    block = _mm_aesenclast_si128(block, to_sse_128(round_keys[10]));

    from_sse_128(block)
}

/// Reduced-round AES-128 decrypt, aligned to the inverse of the six-round
/// forward path above, not the 9-round inverse a naive mirror would use:
/// key10 whitening, six inverse rounds over keys 6..=1 (each round key's
/// inverse-mix-columns form computed fresh via `_mm_aesimc_si128`), one
/// last inverse round with key0.
#[target_feature(enable = "aes")]
pub(crate) unsafe fn decrypt_block(ciphertext: u128, round_keys: &[u128; 11]) -> u128 {
    let mut block = to_sse_128(ciphertext);

    block = _mm_xor_si128(block, to_sse_128(round_keys[10]));
    for key in round_keys[1..=6].iter().rev() {
        let scratch = _mm_aesimc_si128(to_sse_128(*key));
        block = _mm_aesdec_si128(block, scratch);
    }
    block = _mm_aesdeclast_si128(block, to_sse_128(round_keys[0]));

    from_sse_128(block)
}
