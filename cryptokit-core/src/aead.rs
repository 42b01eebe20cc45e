//! AES-GCM dispatch. Nonces are fixed at 12 bytes, the only size the
//! underlying AEAD construction accepts.

extern crate alloc;
use alloc::vec::Vec;

use aes_gcm::aead::generic_array::typenum::U12;
use aes_gcm::aead::{Aead, Payload};
use aes_gcm::{Aes128Gcm, Aes256Gcm, KeyInit, Nonce};

use crate::error::CoreError;

type Aes192Gcm = aes_gcm::AesGcm<aes::Aes192, U12>;

enum GcmImpl {
    Aes128(Aes128Gcm),
    Aes192(Aes192Gcm),
    Aes256(Aes256Gcm),
}

impl GcmImpl {
    fn new(key: &[u8]) -> Result<Self, CoreError> {
        match key.len() {
            16 => Ok(GcmImpl::Aes128(
                Aes128Gcm::new_from_slice(key)
                    .map_err(|_| CoreError::CryptoFailure("invalid AES-GCM key length"))?,
            )),
            24 => Ok(GcmImpl::Aes192(
                Aes192Gcm::new_from_slice(key)
                    .map_err(|_| CoreError::CryptoFailure("invalid AES-GCM key length"))?,
            )),
            32 => Ok(GcmImpl::Aes256(
                Aes256Gcm::new_from_slice(key)
                    .map_err(|_| CoreError::CryptoFailure("invalid AES-GCM key length"))?,
            )),
            _ => Err(CoreError::CryptoFailure("invalid AES-GCM key length")),
        }
    }

    fn seal(&self, nonce: &Nonce<U12>, aad: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, CoreError> {
        let payload = Payload {
            msg: plaintext,
            aad,
        };
        let result = match self {
            GcmImpl::Aes128(c) => c.encrypt(nonce, payload),
            GcmImpl::Aes192(c) => c.encrypt(nonce, payload),
            GcmImpl::Aes256(c) => c.encrypt(nonce, payload),
        };
        result.map_err(|_| CoreError::CryptoFailure("AEAD seal failed"))
    }

    fn open(&self, nonce: &Nonce<U12>, aad: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, CoreError> {
        let payload = Payload {
            msg: ciphertext,
            aad,
        };
        let result = match self {
            GcmImpl::Aes128(c) => c.decrypt(nonce, payload),
            GcmImpl::Aes192(c) => c.decrypt(nonce, payload),
            GcmImpl::Aes256(c) => c.decrypt(nonce, payload),
        };
        result.map_err(|_| CoreError::CryptoFailure("AEAD authentication failed"))
    }
}

/// `AesGcmSeal(key, nonce, aad, plaintext) -> ciphertext||tag`.
pub fn gcm_seal(key: &[u8], nonce: &[u8], aad: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, CoreError> {
    if nonce.len() != 12 {
        return Err(CoreError::InputInvalid("GCM nonce must be 12 bytes"));
    }
    let cipher = GcmImpl::new(key)?;
    let nonce = Nonce::from_slice(nonce);
    cipher.seal(nonce, aad, plaintext)
}

/// `AesGcmOpen(key, nonce, aad, ciphertext||tag) -> plaintext`.
pub fn gcm_open(key: &[u8], nonce: &[u8], aad: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, CoreError> {
    if nonce.len() != 12 {
        return Err(CoreError::InputInvalid("GCM nonce must be 12 bytes"));
    }
    let cipher = GcmImpl::new(key)?;
    let nonce = Nonce::from_slice(nonce);
    cipher.open(nonce, aad, ciphertext)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seal_open_roundtrip() {
        let key = [0x11u8; 32];
        let nonce = [0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b];
        let plaintext = b"a sixteen byte blk";
        let ct = gcm_seal(&key, &nonce, b"", plaintext).unwrap();
        let pt = gcm_open(&key, &nonce, b"", &ct).unwrap();
        assert_eq!(pt, plaintext);
    }

    #[test]
    fn tampered_ciphertext_fails() {
        let key = [0x22u8; 16];
        let nonce = [0u8; 12];
        let mut ct = gcm_seal(&key, &nonce, b"", b"hello world").unwrap();
        let last = ct.len() - 1;
        ct[last] ^= 0x01;
        assert!(gcm_open(&key, &nonce, b"", &ct).is_err());
    }

    #[test]
    fn wrong_nonce_length_rejected() {
        let key = [0x00u8; 16];
        let err = gcm_seal(&key, &[0u8; 8], b"", b"x").unwrap_err();
        assert_eq!(err, CoreError::InputInvalid("GCM nonce must be 12 bytes"));
    }
}
