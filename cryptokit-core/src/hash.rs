//! Unkeyed hashing: SHA-1, SHA-256, SHA-512.

extern crate alloc;
use alloc::vec::Vec;

use sha1::Sha1;
use sha2::{Digest, Sha256, Sha512};

use crate::error::CoreError;
use crate::mechanism::Mechanism;

/// Compute the digest named by `mech`. `mech` must be `Sha1`, `Sha256`,
/// or `Sha512`.
pub fn digest(mech: &Mechanism, data: &[u8]) -> Result<Vec<u8>, CoreError> {
    match mech {
        Mechanism::Sha1 => Ok(Sha1::digest(data).to_vec()),
        Mechanism::Sha256 => Ok(Sha256::digest(data).to_vec()),
        Mechanism::Sha512 => Ok(Sha512::digest(data).to_vec()),
        _ => Err(CoreError::MechanismUnsupported("not a hash mechanism")),
    }
}
