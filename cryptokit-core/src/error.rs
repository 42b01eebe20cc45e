//! Error taxonomy for the primitive engine.

use core::fmt;

/// Unified error returned by every `cryptokit_core` operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreError {
    /// A mechanism tag, or combination of tags, this engine does not support.
    MechanismUnsupported(&'static str),
    /// Caller-supplied input that cannot be processed (bad length, zero-sized key, ...).
    InputInvalid(&'static str),
    /// A primitive itself rejected the operation: AEAD authentication
    /// failure, or a key length the underlying cipher cannot accept.
    CryptoFailure(&'static str),
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MechanismUnsupported(msg) => write!(f, "{}", msg),
            Self::InputInvalid(msg) => write!(f, "{}", msg),
            Self::CryptoFailure(msg) => write!(f, "{}", msg),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for CoreError {}
