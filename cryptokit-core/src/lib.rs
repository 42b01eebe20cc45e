//! Symmetric-key primitive engine.
//!
//! This crate knows how to compute things — block cipher encrypt/decrypt,
//! AEAD seal/open, hash, HMAC, and DUKPT key derivation — given raw key
//! bytes and a [`Mechanism`] describing what to compute. It has no
//! knowledge of key lifecycle, storage, or capability enforcement; that
//! lives one layer up.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod aead;
pub mod block;
pub mod dukpt;
pub mod error;
pub mod hash;
pub mod hmac;
pub mod mechanism;

pub use error::CoreError;
pub use mechanism::{CipherFamily, Mechanism};
