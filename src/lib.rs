//! `kevlar`: a 64-bit unsigned integer whose plaintext value is never held
//! in memory between operations.
//!
//! Every [`EncU64`] is kept as an authenticated ciphertext block produced by
//! a reduced-round AES-128 cipher whose round keys are built once at
//! bootstrap and never copied back out to a location the rest of the
//! program can read. Every operation — construction, copy, assignment,
//! arithmetic, comparison — decrypts its operands, computes on the
//! recovered plaintext, produces a fresh random salt, and re-encrypts.
//!
//! This is a research construct, not a hardened cryptographic primitive: the
//! cipher is a fixed reduced-round AES-128 variant, authentication is a
//! single 32-bit cookie rather than a real MAC, and there is no
//! cross-architecture fallback. See the component notes on each module for
//! the specifics, and [`oblivious`] for the constant-time primitives that
//! data-oblivious algorithms are built from.

#[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
compile_error!("kevlar requires an x86/x86_64 host with AES-NI and RDSEED");

mod bootstrap;
mod cipher;
mod encint;
mod entropy;
mod keysched;
mod oblivious;
mod recovery;
mod sidechannel;

pub use bootstrap::{try_bootstrap, BootstrapError};
pub use encint::EncU64;
pub use oblivious::{cmov, cmov_lt, Selectable};
pub use sidechannel::reset_warnings;
