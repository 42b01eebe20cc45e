//! Mechanism taxonomy: the closed set of "what to compute" tags a
//! [`Session`](../cryptokit_keystore/struct.Session.html) dispatches on.

extern crate alloc;
use alloc::boxed::Box;
use alloc::vec::Vec;

/// A cryptographic mechanism. Wrapper variants (`Cbc`/`Ecb`/`Gcm`/`Hmac`)
/// nest exactly one underlying mechanism; nesting depth is always 2.
#[derive(Clone, Debug)]
pub enum Mechanism {
    /// Block cipher identity, 16/24/32-byte key.
    Aes,
    /// 8-byte key block cipher.
    Des,
    /// 24-byte key triple-DES block cipher.
    Tdes,
    /// CBC block-mode wrapper over a block cipher.
    Cbc {
        underlying: Box<Mechanism>,
        iv: Option<Vec<u8>>,
    },
    /// ECB block-mode wrapper over a block cipher (`iv` is ignored).
    Ecb {
        underlying: Box<Mechanism>,
        iv: Option<Vec<u8>>,
    },
    /// AEAD wrapper (AES-GCM) over a block cipher.
    Gcm {
        underlying: Box<Mechanism>,
        nonce: Vec<u8>,
        aad: Option<Vec<u8>>,
    },
    /// Keyed MAC over a hash identity.
    Hmac { underlying: Box<Mechanism> },
    /// Unkeyed hash identities.
    Sha1,
    Sha256,
    Sha512,
    /// CSPRNG-sourced key material.
    Random,
    /// Literal key material.
    FixedKey { key: Vec<u8> },
    /// Payment key derivation; `ksn` is always 10 bytes.
    Dukpt { ksn: [u8; 10] },
}

/// Which family a mechanism belongs to, for block-size/category checks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CipherFamily {
    Aes,
    Des,
    Tdes,
}

impl Mechanism {
    /// Resolve a cipher-identity mechanism to its family, if it is one.
    pub fn cipher_family(&self) -> Option<CipherFamily> {
        match self {
            Mechanism::Aes => Some(CipherFamily::Aes),
            Mechanism::Des => Some(CipherFamily::Des),
            Mechanism::Tdes => Some(CipherFamily::Tdes),
            _ => None,
        }
    }

    /// True for SHA1/SHA256/SHA512 identities.
    pub fn is_hash_identity(&self) -> bool {
        matches!(self, Mechanism::Sha1 | Mechanism::Sha256 | Mechanism::Sha512)
    }
}
