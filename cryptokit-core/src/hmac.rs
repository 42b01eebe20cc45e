//! Keyed hashing (HMAC) over SHA-1, SHA-256, or SHA-512.

extern crate alloc;
use alloc::vec::Vec;

use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::{Sha256, Sha512};

use crate::error::CoreError;
use crate::mechanism::Mechanism;

/// Compute an HMAC over `data` under `key`, using the hash identity named
/// by `underlying` (`Sha1`, `Sha256`, or `Sha512`).
pub fn compute(underlying: &Mechanism, key: &[u8], data: &[u8]) -> Result<Vec<u8>, CoreError> {
    match underlying {
        Mechanism::Sha1 => {
            let mut mac = Hmac::<Sha1>::new_from_slice(key)
                .map_err(|_| CoreError::CryptoFailure("invalid HMAC key length"))?;
            mac.update(data);
            Ok(mac.finalize().into_bytes().to_vec())
        }
        Mechanism::Sha256 => {
            let mut mac = Hmac::<Sha256>::new_from_slice(key)
                .map_err(|_| CoreError::CryptoFailure("invalid HMAC key length"))?;
            mac.update(data);
            Ok(mac.finalize().into_bytes().to_vec())
        }
        Mechanism::Sha512 => {
            let mut mac = Hmac::<Sha512>::new_from_slice(key)
                .map_err(|_| CoreError::CryptoFailure("invalid HMAC key length"))?;
            mac.update(data);
            Ok(mac.finalize().into_bytes().to_vec())
        }
        _ => Err(CoreError::MechanismUnsupported(
            "HMAC underlying mechanism must be a hash identity",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hmac_sha1_known_answer() {
        // RFC 2202 test case 1
        let key = [0x0bu8; 20];
        let out = compute(&Mechanism::Sha1, &key, b"Hi There").unwrap();
        assert_eq!(
            hex::encode(out),
            "b617318655057264e28bc0b6fb378c8ef146be00"
        );
    }

    #[test]
    fn hmac_sha256_known_answer() {
        // RFC 4231 test case 1
        let key = [0x0bu8; 20];
        let out = compute(&Mechanism::Sha256, &key, b"Hi There").unwrap();
        assert_eq!(
            hex::encode(out),
            "b0344c61d8db38535ca8afceaf0bf12b881dc200c9833da726e9376c2e32cff7"
        );
    }

    #[test]
    fn wrong_key_changes_output() {
        let out_a = compute(&Mechanism::Sha256, b"key-a", b"message").unwrap();
        let out_b = compute(&Mechanism::Sha256, b"key-b", b"message").unwrap();
        assert_ne!(out_a, out_b);
    }
}
