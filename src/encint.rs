//! The encrypted-integer value type (C4): a 64-bit unsigned integer whose
//! plaintext is only ever visible inside the body of one of these methods,
//! and only for as long as it takes to compute the next ciphertext.

use std::cell::Cell;
use std::cmp::Ordering;
use std::fmt;

use crate::bootstrap;
use crate::cipher;
use crate::recovery;
use crate::sidechannel;

/// An encrypted 64-bit unsigned integer.
///
/// The ciphertext lives in a [`Cell`] rather than a plain field: decrypting
/// operations are logically read-only (compare to the original's `const`
/// methods that still need to patch a corrupted ciphertext during
/// recovery), and [`EncU64::flip_bits`] is deliberately `&self` for the same
/// reason the original keeps it callable on a `const` value.
pub struct EncU64 {
    ciphertext: Cell<u128>,
}

impl EncU64 {
    /// Constructs an encrypted zero.
    pub fn new(value: u64) -> Self {
        let ciphertext = bootstrap::with_registers(|regs| cipher::encrypt_value(regs, value));
        EncU64 { ciphertext: Cell::new(ciphertext) }
    }

    /// Adopts a raw ciphertext block unchanged — no decrypt, no re-salt.
    /// Used internally to hand back results that were already produced
    /// under a fresh salt by [`cipher::encrypt_value`].
    fn from_ciphertext(ciphertext: u128) -> Self {
        EncU64 { ciphertext: Cell::new(ciphertext) }
    }

    /// Decrypts the stored ciphertext, attempting bit-flip recovery on
    /// authentication failure, without touching the side-channel latch.
    /// Every other method on this type is built from this one primitive
    /// plus a decision about whether to raise the latch afterward.
    fn decrypt(&self) -> u64 {
        bootstrap::with_registers(|regs| {
            let mut ct = self.ciphertext.get();
            let (value, auth) = cipher::decrypt_value(&regs.round_keys, ct);
            if auth {
                return value;
            }

            match recovery::try_recover(&regs.round_keys, &mut ct) {
                Some((value, _bit)) => {
                    self.ciphertext.set(ct);
                    value
                }
                None => value,
            }
        })
    }

    fn encrypt(&self, value: u64) -> u128 {
        bootstrap::with_registers(|regs| cipher::encrypt_value(regs, value))
    }

    /// Decrypts and returns the value, raising the side-channel latch: the
    /// return type is plaintext, so this is an unavoidable leak point.
    pub fn get_value(&self) -> u64 {
        let value = self.decrypt();
        sidechannel::raise_warning();
        value
    }

    /// Decrypts and returns the value without raising the latch. Intended
    /// for diagnostics (logging, assertions in tests) where the caller
    /// isn't branching on the result.
    pub fn print_value(&self) -> u64 {
        self.decrypt()
    }

    /// Explicit conversion to `u64`, the named-method equivalent of the
    /// original's `explicit operator uint64_t()`.
    pub fn to_u64(&self) -> u64 {
        self.get_value()
    }

    /// Explicit conversion to `bool` (nonzero is true), the named-method
    /// equivalent of `explicit operator bool()`.
    pub fn to_bool(&self) -> bool {
        let value = self.decrypt();
        sidechannel::raise_warning();
        value != 0
    }

    /// XORs `hi_mask`/`lo_mask` into the stored ciphertext's high/low 64-bit
    /// halves. Takes `&self`, not `&mut self`: corrupting your own
    /// ciphertext on purpose (to exercise recovery, or to simulate a fault)
    /// doesn't need exclusive access any more than recovery itself does.
    pub fn flip_bits(&self, hi_mask: u64, lo_mask: u64) {
        let mask = (hi_mask as u128) << 64 | lo_mask as u128;
        self.ciphertext.set(self.ciphertext.get() ^ mask);
    }

    /// Logs the raw ciphertext block under `name`, for diagnostics. Never
    /// decrypts, so it cannot raise the side-channel latch.
    pub fn print_state(&self, name: &str) {
        log::info!("{name:>6}: {:032x}", self.ciphertext.get());
    }
}

impl Default for EncU64 {
    fn default() -> Self {
        EncU64::new(0)
    }
}

impl From<u64> for EncU64 {
    fn from(value: u64) -> Self {
        EncU64::new(value)
    }
}

/// Copy-construct / assign: decrypt the source, re-encrypt into a
/// fresh ciphertext under a new salt. `let b = a.clone()` and `b = a.clone()`
/// are the idiomatic spellings of the original's copy constructor and
/// `operator=`; Rust has no user-overloadable assignment operator.
impl Clone for EncU64 {
    fn clone(&self) -> Self {
        let value = self.decrypt();
        EncU64::new(value)
    }
}

impl fmt::Debug for EncU64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EncU64 {{ ciphertext: {:#034x} }}", self.ciphertext.get())
    }
}

/// Equality is a relational operator like any other here: it can only be
/// answered by decrypting both sides, so it raises the latch exactly like
/// `<` does.
impl PartialEq for EncU64 {
    fn eq(&self, other: &Self) -> bool {
        let result = self.decrypt() == other.decrypt();
        sidechannel::raise_warning();
        result
    }
}

impl PartialOrd for EncU64 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        let result = self.decrypt().partial_cmp(&other.decrypt());
        sidechannel::raise_warning();
        result
    }
}

impl crate::oblivious::Selectable for EncU64 {}

macro_rules! impl_arith_op {
    ($trait:ident, $method:ident, $checked:ident, $op:tt) => {
        impl std::ops::$trait<&EncU64> for &EncU64 {
            type Output = EncU64;
            fn $method(self, other: &EncU64) -> EncU64 {
                let op1 = self.decrypt();
                let op2 = other.decrypt();
                EncU64::from_ciphertext(self.encrypt(op1.$checked(op2)))
            }
        }

        impl std::ops::$trait<EncU64> for EncU64 {
            type Output = EncU64;
            fn $method(self, other: EncU64) -> EncU64 {
                &self $op &other
            }
        }
    };
}

impl_arith_op!(Add, add, wrapping_add, +);
impl_arith_op!(Sub, sub, wrapping_sub, -);
impl_arith_op!(Mul, mul, wrapping_mul, *);

/// Unlike `+ - *`, division and modulo do not wrap: a decrypted zero
/// divisor is undefined behavior at this layer, and Rust's own
/// integer division already panics on divide-by-zero, which is as
/// reasonable an expression of "the caller's responsibility" as any.
impl std::ops::Div<&EncU64> for &EncU64 {
    type Output = EncU64;
    fn div(self, other: &EncU64) -> EncU64 {
        let op1 = self.decrypt();
        let op2 = other.decrypt();
        EncU64::from_ciphertext(self.encrypt(op1 / op2))
    }
}

impl std::ops::Div<EncU64> for EncU64 {
    type Output = EncU64;
    fn div(self, other: EncU64) -> EncU64 {
        &self / &other
    }
}

impl std::ops::Rem<&EncU64> for &EncU64 {
    type Output = EncU64;
    fn rem(self, other: &EncU64) -> EncU64 {
        let op1 = self.decrypt();
        let op2 = other.decrypt();
        EncU64::from_ciphertext(self.encrypt(op1 % op2))
    }
}

impl std::ops::Rem<EncU64> for EncU64 {
    type Output = EncU64;
    fn rem(self, other: EncU64) -> EncU64 {
        &self % &other
    }
}

macro_rules! impl_compound_assign {
    ($trait:ident, $method:ident, $checked:ident) => {
        impl std::ops::$trait<&EncU64> for EncU64 {
            fn $method(&mut self, other: &EncU64) {
                let op1 = self.decrypt();
                let op2 = other.decrypt();
                self.ciphertext.set(self.encrypt(op1.$checked(op2)));
            }
        }

        impl std::ops::$trait<EncU64> for EncU64 {
            fn $method(&mut self, other: EncU64) {
                self.$method(&other);
            }
        }
    };
}

impl_compound_assign!(AddAssign, add_assign, wrapping_add);
impl_compound_assign!(SubAssign, sub_assign, wrapping_sub);
impl_compound_assign!(MulAssign, mul_assign, wrapping_mul);

impl std::ops::DivAssign<&EncU64> for EncU64 {
    fn div_assign(&mut self, other: &EncU64) {
        let op1 = self.decrypt();
        let op2 = other.decrypt();
        self.ciphertext.set(self.encrypt(op1 / op2));
    }
}

impl std::ops::DivAssign<EncU64> for EncU64 {
    fn div_assign(&mut self, other: EncU64) {
        *self /= &other;
    }
}

impl std::ops::RemAssign<&EncU64> for EncU64 {
    fn rem_assign(&mut self, other: &EncU64) {
        let op1 = self.decrypt();
        let op2 = other.decrypt();
        self.ciphertext.set(self.encrypt(op1 % op2));
    }
}

impl std::ops::RemAssign<EncU64> for EncU64 {
    fn rem_assign(&mut self, other: EncU64) {
        *self %= &other;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_construct_is_zero() {
        let _ = env_logger::try_init();
        let a = EncU64::default();
        assert_eq!(a.get_value(), 0);
    }

    #[test]
    fn value_construct_round_trips() {
        let _ = env_logger::try_init();
        let b = EncU64::new(10);
        assert_eq!(b.get_value(), 10);
        let c = EncU64::new(20);
        assert_eq!(c.get_value(), 20);
    }

    #[test]
    fn copy_and_assign_preserve_value_but_not_ciphertext() {
        let _ = env_logger::try_init();
        let b = EncU64::new(10);
        let d = b.clone();
        assert_eq!(d.get_value(), b.get_value());
        assert_ne!(format!("{b:?}"), format!("{d:?}"), "clone must re-salt, not duplicate the ciphertext");
    }

    #[test]
    fn arithmetic_surface_matches_scenario_two() {
        let _ = env_logger::try_init();
        let b = EncU64::new(10);
        let c = EncU64::new(20);

        assert_eq!((&b + &c).get_value(), 30);
        assert_eq!((&c - &b).get_value(), 10);
        assert_eq!((&b * &c).get_value(), 200);
        assert_eq!((&c / &b).get_value(), 2);
        assert_eq!((&c % &b).get_value(), 0);
    }

    #[test]
    fn addition_wraps_on_overflow() {
        let _ = env_logger::try_init();
        let a = EncU64::new(u64::MAX);
        let b = EncU64::new(1);
        assert_eq!((&a + &b).get_value(), 0);
    }

    #[test]
    fn compound_assignment_and_bit_flip_recovery_match_scenario_three() {
        let _ = env_logger::try_init();
        let mut j = EncU64::new(3);
        j += EncU64::new(10);
        // Inject a single-bit error into the stored ciphertext.
        j.flip_bits(0x0000_0000_0000_0000, 0x0000_0000_0000_0100);
        assert_eq!(j.get_value(), 13, "recovery should undo the injected single-bit flip");
    }

    #[test]
    fn re_salting_makes_repeated_constructions_produce_distinct_ciphertexts() {
        let _ = env_logger::try_init();
        let a = EncU64::new(99);
        let b = EncU64::new(99);
        assert_eq!(a.get_value(), b.get_value());
        assert_ne!(format!("{a:?}"), format!("{b:?}"));
    }

    #[test]
    fn relational_operators_decrypt_both_sides() {
        let _ = env_logger::try_init();
        let small = EncU64::new(1);
        let big = EncU64::new(2);
        assert!(small < big);
        assert!(!(big < small));
        assert_eq!(EncU64::new(5), EncU64::new(5));
    }

    #[test]
    fn explicit_conversions_match_get_value() {
        let _ = env_logger::try_init();
        let v = EncU64::new(42);
        assert_eq!(v.to_u64(), 42);
        assert!(v.to_bool());
        assert!(!EncU64::new(0).to_bool());
    }

    #[test]
    fn print_value_and_print_state_do_not_raise_the_latch() {
        let _ = env_logger::try_init();
        let _guard = sidechannel::latch_test_guard();
        let prev = sidechannel::force(false);
        let v = EncU64::new(7);
        let _ = v.print_value();
        v.print_state("v");
        assert!(!sidechannel::is_raised());
        sidechannel::force(prev);
    }

    #[test]
    fn get_value_raises_the_latch() {
        let _ = env_logger::try_init();
        let _guard = sidechannel::latch_test_guard();
        let prev = sidechannel::force(false);
        let v = EncU64::new(7);
        let _ = v.get_value();
        assert!(sidechannel::is_raised());
        sidechannel::force(prev);
    }
}
