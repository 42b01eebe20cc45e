//! Error taxonomy for the key store and session layer.

use std::fmt;

/// Unified error returned by session and store operations.
#[derive(Debug)]
pub enum KeystoreError {
    CapabilityDenied { key_id: String, capability: &'static str },
    MechanismUnsupported(String),
    InputInvalid(String),
    CryptoFailure(String),
    StoreFailure(String),
}

impl fmt::Display for KeystoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapabilityDenied { key_id, capability } => {
                write!(f, "key {} lacks capability {}", key_id, capability)
            }
            Self::MechanismUnsupported(msg) => write!(f, "{}", msg),
            Self::InputInvalid(msg) => write!(f, "{}", msg),
            Self::CryptoFailure(msg) => write!(f, "{}", msg),
            Self::StoreFailure(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for KeystoreError {}

impl From<cryptokit_core::CoreError> for KeystoreError {
    fn from(e: cryptokit_core::CoreError) -> Self {
        match e {
            cryptokit_core::CoreError::MechanismUnsupported(m) => {
                Self::MechanismUnsupported(m.to_string())
            }
            cryptokit_core::CoreError::InputInvalid(m) => Self::InputInvalid(m.to_string()),
            cryptokit_core::CoreError::CryptoFailure(m) => Self::CryptoFailure(m.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Specific operation errors (type-safe)
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct GenerateError(pub KeystoreError);
impl fmt::Display for GenerateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
impl std::error::Error for GenerateError {}
impl From<KeystoreError> for GenerateError {
    fn from(e: KeystoreError) -> Self {
        Self(e)
    }
}

#[derive(Debug)]
pub struct DeriveError(pub KeystoreError);
impl fmt::Display for DeriveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
impl std::error::Error for DeriveError {}
impl From<KeystoreError> for DeriveError {
    fn from(e: KeystoreError) -> Self {
        Self(e)
    }
}

#[derive(Debug)]
pub struct EncryptError(pub KeystoreError);
impl fmt::Display for EncryptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "encrypt: {}", self.0)
    }
}
impl std::error::Error for EncryptError {}
impl From<KeystoreError> for EncryptError {
    fn from(e: KeystoreError) -> Self {
        Self(e)
    }
}

#[derive(Debug)]
pub struct DecryptError(pub KeystoreError);
impl fmt::Display for DecryptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "decrypt: {}", self.0)
    }
}
impl std::error::Error for DecryptError {}
impl From<KeystoreError> for DecryptError {
    fn from(e: KeystoreError) -> Self {
        Self(e)
    }
}

#[derive(Debug)]
pub struct WrapError(pub KeystoreError);
impl fmt::Display for WrapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "wrap: {}", self.0)
    }
}
impl std::error::Error for WrapError {}
impl From<KeystoreError> for WrapError {
    fn from(e: KeystoreError) -> Self {
        Self(e)
    }
}

#[derive(Debug)]
pub struct UnwrapError(pub KeystoreError);
impl fmt::Display for UnwrapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unwrap: {}", self.0)
    }
}
impl std::error::Error for UnwrapError {}
impl From<KeystoreError> for UnwrapError {
    fn from(e: KeystoreError) -> Self {
        Self(e)
    }
}

#[derive(Debug)]
pub struct ProviderError(pub String);
impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "provider: {}", self.0)
    }
}
impl std::error::Error for ProviderError {}
