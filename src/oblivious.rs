//! Constant-time select (C7): the building blocks data-oblivious algorithms
//! are built from. Each primitive forces the side-channel latch on for the
//! duration of its body and restores whatever value it found, so the
//! `if p { x } else { y }` branch hiding inside it never shows up as a
//! fresh warning.

use crate::encint::EncU64;
use crate::sidechannel;

/// A type `cmov` can select between. Implemented for [`EncU64`] and `bool`,
/// mirroring the original's two overloads of `cmov` — Rust has no operator
/// overloading by argument type for free functions, but it does have
/// generics, which is the idiomatic way to express "the same primitive over
/// two plaintext-adjacent types."
pub trait Selectable: Sized {
    /// Returns `x` if `p`, else `y`. The default implementation is the
    /// primitive itself; [`cmov`] is what wraps it with the latch
    /// suppression it needs.
    fn select(p: bool, x: Self, y: Self) -> Self {
        if p {
            x
        } else {
            y
        }
    }
}

impl Selectable for bool {}

/// Returns `x` if `p` else `y`, without raising the side-channel latch for
/// the branch this performs internally.
pub fn cmov<T: Selectable>(p: bool, x: T, y: T) -> T {
    let prev = sidechannel::force(true);
    let result = T::select(p, x, y);
    sidechannel::force(prev);
    result
}

/// Returns `x` if `a < b` else `y`, without raising the side-channel latch
/// for the comparison or the branch.
pub fn cmov_lt(a: &EncU64, b: &EncU64, x: bool, y: bool) -> bool {
    let prev = sidechannel::force(true);
    let result = if a < b { x } else { y };
    sidechannel::force(prev);
    result
}
