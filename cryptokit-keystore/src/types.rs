//! Core types: KeyId, KeyType, Capability, Key.

use std::fmt;

use bitflags::bitflags;
use rand_core::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

// ---------------------------------------------------------------------------
// Key identifier
// ---------------------------------------------------------------------------

/// Unique key identifier (hex-encoded random bytes), unique within a backend.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyId(String);

impl KeyId {
    /// Generate a new random identifier.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 16];
        rand_core::OsRng.fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    /// Construct from an existing string (lookup, deterministic tests).
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Key classification
// ---------------------------------------------------------------------------

/// Key material family. Assigned explicit, pairwise-distinct discriminants —
/// the source this is re-architected from gave TDES and RSA the same
/// numeric value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum KeyType {
    Aes = 0,
    Des = 1,
    Tdes = 2,
    Rsa = 3,
    Dsa = 4,
    Raw = 5,
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyType::Aes => write!(f, "AES"),
            KeyType::Des => write!(f, "DES"),
            KeyType::Tdes => write!(f, "TDES"),
            KeyType::Rsa => write!(f, "RSA"),
            KeyType::Dsa => write!(f, "DSA"),
            KeyType::Raw => write!(f, "RAW"),
        }
    }
}

bitflags! {
    /// Capability bits a key carries. An operation checks exactly one bit
    /// before doing any cryptographic work. At rest this travels as the raw
    /// `u8` on [`KeyRecord`], not as a serialized `Capability` itself.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Capability: u8 {
        const ENCRYPT = 0b0000_0001;
        const DECRYPT = 0b0000_0010;
        const WRAP    = 0b0000_0100;
        const UNWRAP  = 0b0000_1000;
        const DERIVE  = 0b0001_0000;
    }
}

impl Capability {
    /// Name used in `CapabilityDenied` messages.
    pub fn name(self) -> &'static str {
        match self {
            Capability::ENCRYPT => "Encrypt",
            Capability::DECRYPT => "Decrypt",
            Capability::WRAP => "Wrap",
            Capability::UNWRAP => "Unwrap",
            Capability::DERIVE => "Derive",
            _ => "Unknown",
        }
    }
}

// ---------------------------------------------------------------------------
// Key
// ---------------------------------------------------------------------------

/// Attributes supplied to Generate/Derive/Unwrap; the caller-facing half of
/// a [`Key`] before `data` exists.
#[derive(Clone, Debug)]
pub struct KeyAttrs {
    pub key_type: KeyType,
    pub length: usize,
    pub permanent: bool,
    pub extractable: bool,
    pub capabilities: Capability,
}

/// A symmetric key: immutable metadata plus raw material.
///
/// Keys do not hold a reference back to their owning session; callers pass
/// the session explicitly to operations that need to route a save or
/// destroy to the backend.
#[derive(Clone, Debug, Zeroize, ZeroizeOnDrop)]
pub struct Key {
    #[zeroize(skip)]
    pub id: KeyId,
    #[zeroize(skip)]
    pub key_type: KeyType,
    pub length: usize,
    #[zeroize(skip)]
    pub permanent: bool,
    #[zeroize(skip)]
    pub extractable: bool,
    #[zeroize(skip)]
    pub capabilities: Capability,
    pub data: Vec<u8>,
}

impl Key {
    pub fn new(id: KeyId, attrs: KeyAttrs, data: Vec<u8>) -> Self {
        Self {
            id,
            key_type: attrs.key_type,
            length: attrs.length,
            permanent: attrs.permanent,
            extractable: attrs.extractable,
            capabilities: attrs.capabilities,
            data,
        }
    }

    pub fn has_capability(&self, cap: Capability) -> bool {
        self.capabilities.contains(cap)
    }

    /// Return raw key bytes, if this key permits export.
    pub fn extract(&self) -> Option<&[u8]> {
        self.extractable.then_some(self.data.as_slice())
    }
}

// ---------------------------------------------------------------------------
// At-rest attribute record
// ---------------------------------------------------------------------------

/// The self-describing attribute map persisted by a [`crate::storage::StorageBackend`]
/// and exchanged verbatim with the remote secret-store backend.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KeyRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub key_type: KeyType,
    pub length: u64,
    pub permanent: bool,
    pub extractable: bool,
    pub capabilities: u8,
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
}

impl KeyRecord {
    pub fn from_key(key: &Key) -> Self {
        Self {
            id: key.id.as_str().to_string(),
            key_type: key.key_type,
            length: key.length as u64,
            permanent: key.permanent,
            extractable: key.extractable,
            capabilities: key.capabilities.bits(),
            data: key.data.clone(),
        }
    }

    pub fn into_key(self) -> Key {
        let id = KeyId::new(self.id);
        let attrs = KeyAttrs {
            key_type: self.key_type,
            length: self.length as usize,
            permanent: self.permanent,
            extractable: self.extractable,
            capabilities: Capability::from_bits_truncate(self.capabilities),
        };
        Key::new(id, attrs, self.data)
    }
}

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(d)?;
        STANDARD
            .decode(s.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_type_discriminants_are_distinct() {
        let all = [
            KeyType::Aes,
            KeyType::Des,
            KeyType::Tdes,
            KeyType::Rsa,
            KeyType::Dsa,
            KeyType::Raw,
        ];
        for (i, a) in all.iter().enumerate() {
            for (j, b) in all.iter().enumerate() {
                if i != j {
                    assert_ne!(*a as u8, *b as u8);
                }
            }
        }
    }

    #[test]
    fn record_roundtrip_preserves_capabilities() {
        let key = Key::new(
            KeyId::new("k1"),
            KeyAttrs {
                key_type: KeyType::Aes,
                length: 4,
                permanent: true,
                extractable: true,
                capabilities: Capability::ENCRYPT | Capability::DECRYPT,
            },
            vec![1, 2, 3, 4],
        );
        let record = KeyRecord::from_key(&key);
        let json = serde_json::to_string(&record).unwrap();
        let back: KeyRecord = serde_json::from_str(&json).unwrap();
        let restored = back.into_key();
        assert_eq!(restored.data, vec![1, 2, 3, 4]);
        assert!(restored.has_capability(Capability::ENCRYPT));
        assert!(!restored.has_capability(Capability::WRAP));
    }
}
