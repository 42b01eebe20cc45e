//! Session: mechanism dispatcher and capability enforcement.
//!
//! A `Session` is not safe for concurrent use from multiple threads;
//! callers needing parallel operations open multiple sessions over the
//! same [`crate::provider::Provider`]. All operations are synchronous and
//! block the calling thread for the duration of the underlying primitive.

use std::sync::Arc;

use cryptokit_core::mechanism::Mechanism;
use cryptokit_core::{aead, block, dukpt, hash, hmac};
use rand_core::RngCore;

use crate::error::{
    DecryptError, DeriveError, EncryptError, GenerateError, KeystoreError, UnwrapError, WrapError,
};
use crate::storage::StorageBackend;
use crate::types::{Capability, Key, KeyAttrs, KeyId, KeyRecord};

fn validate_attrs(attrs: &KeyAttrs) -> Result<(), KeystoreError> {
    if attrs.length == 0 {
        return Err(KeystoreError::InputInvalid(
            "key length must be greater than zero".into(),
        ));
    }
    // Empty capability sets are rejected rather than defaulted to "all
    // capabilities" — see DESIGN.md.
    if attrs.capabilities.is_empty() {
        return Err(KeystoreError::InputInvalid(
            "capabilities must not be empty".into(),
        ));
    }
    Ok(())
}

/// Encrypt or decrypt `input` under `key_data` per `mech`'s dispatch
/// category. Capability checks happen in the caller; this function only
/// resolves mechanism tags to primitives.
fn dispatch_crypt(
    mech: &Mechanism,
    key_data: &[u8],
    input: &[u8],
    encrypt: bool,
) -> Result<Vec<u8>, KeystoreError> {
    match mech {
        Mechanism::Cbc { underlying, iv } => {
            let family = underlying
                .cipher_family()
                .ok_or_else(|| KeystoreError::MechanismUnsupported("Unknown mechanism".into()))?;
            block::cbc_crypt(family, key_data, iv.as_deref(), input, encrypt).map_err(Into::into)
        }
        Mechanism::Ecb { underlying, .. } => {
            let family = underlying
                .cipher_family()
                .ok_or_else(|| KeystoreError::MechanismUnsupported("Unknown mechanism".into()))?;
            block::ecb_crypt(family, key_data, input, encrypt).map_err(Into::into)
        }
        Mechanism::Gcm {
            underlying: _,
            nonce,
            aad,
        } => {
            let aad_bytes = aad.as_deref().unwrap_or(&[]);
            if encrypt {
                aead::gcm_seal(key_data, nonce, aad_bytes, input).map_err(Into::into)
            } else {
                aead::gcm_open(key_data, nonce, aad_bytes, input).map_err(Into::into)
            }
        }
        Mechanism::Hmac { underlying } => {
            if !encrypt {
                return Err(KeystoreError::MechanismUnsupported("encrypt only".into()));
            }
            hmac::compute(underlying, key_data, input).map_err(Into::into)
        }
        _ => Err(KeystoreError::MechanismUnsupported(
            "Unknown mechanism".into(),
        )),
    }
}

/// Orchestrates mechanism+key → primitive, enforces capability bits, and
/// persists generated/unwrapped permanent keys.
pub struct Session {
    backend: Arc<dyn StorageBackend>,
}

impl Session {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    fn require(&self, key: &Key, cap: Capability) -> Result<(), KeystoreError> {
        if key.has_capability(cap) {
            Ok(())
        } else {
            Err(KeystoreError::CapabilityDenied {
                key_id: key.id.to_string(),
                capability: cap.name(),
            })
        }
    }

    fn save(&self, key: &Key) -> Result<(), KeystoreError> {
        let record = KeyRecord::from_key(key);
        self.backend.save(key.id.as_str(), &record)
    }

    /// Look up `id` in the backend and reconstruct a [`Key`] bound to this
    /// session. `Ok(None)` unambiguously means absent; `NotFound` is never
    /// an error.
    pub fn find_key(&self, id: &str) -> Result<Option<Key>, KeystoreError> {
        Ok(self.backend.find_key(id)?.map(KeyRecord::into_key))
    }

    /// Produce `attrs.length` bytes of key material from `mech` and persist
    /// it if `attrs.permanent`.
    pub fn generate(&self, mech: &Mechanism, attrs: KeyAttrs) -> Result<Key, GenerateError> {
        validate_attrs(&attrs)?;
        let data = match mech {
            Mechanism::Random => {
                let mut buf = vec![0u8; attrs.length];
                rand_core::OsRng.fill_bytes(&mut buf);
                buf
            }
            Mechanism::FixedKey { key } => {
                let mut buf = vec![0u8; attrs.length];
                let n = key.len().min(attrs.length);
                buf[..n].copy_from_slice(&key[..n]);
                buf
            }
            _ => {
                return Err(
                    KeystoreError::MechanismUnsupported("unsupported for Generate".into()).into(),
                )
            }
        };
        let key = Key::new(KeyId::generate(), attrs, data);
        if key.permanent {
            self.save(&key)?;
        }
        tracing::info!(key_id = %key.id, "key generated");
        Ok(key)
    }

    /// Derive a new key from `parent` (which must hold the `Derive`
    /// capability) and persist it if `attrs.permanent`.
    pub fn derive(
        &self,
        mech: &Mechanism,
        parent: &Key,
        attrs: KeyAttrs,
    ) -> Result<Key, DeriveError> {
        self.require(parent, Capability::DERIVE)?;
        validate_attrs(&attrs)?;
        let data = match mech {
            Mechanism::Dukpt { ksn } => {
                let bdk = <[u8; 16]>::try_from(parent.data.as_slice())
                    .map_err(|_| KeystoreError::InputInvalid("BDK must be 16 bytes".into()))?;
                dukpt::derive_pek_from_bdk(&bdk, ksn)
                    .map_err(KeystoreError::from)?
                    .to_vec()
            }
            _ => {
                return Err(
                    KeystoreError::MechanismUnsupported("unsupported for Derive".into()).into(),
                )
            }
        };
        let key = Key::new(KeyId::generate(), attrs, data);
        if key.permanent {
            self.save(&key)?;
        }
        tracing::info!(key_id = %key.id, parent_id = %parent.id, "key derived");
        Ok(key)
    }

    /// Requires `Encrypt` on `key`.
    pub fn encrypt(&self, mech: &Mechanism, key: &Key, input: &[u8]) -> Result<Vec<u8>, EncryptError> {
        self.require(key, Capability::ENCRYPT)?;
        dispatch_crypt(mech, &key.data, input, true).map_err(Into::into)
    }

    /// Requires `Decrypt` on `key`.
    pub fn decrypt(&self, mech: &Mechanism, key: &Key, input: &[u8]) -> Result<Vec<u8>, DecryptError> {
        self.require(key, Capability::DECRYPT)?;
        dispatch_crypt(mech, &key.data, input, false).map_err(Into::into)
    }

    /// `Decrypt(mech, in_key, input)` then `Encrypt(mech, out_key, plaintext)`.
    /// Both capability checks apply.
    pub fn translate(
        &self,
        mech: &Mechanism,
        in_key: &Key,
        input: &[u8],
        out_key: &Key,
    ) -> Result<Vec<u8>, KeystoreError> {
        let plaintext = self.decrypt(mech, in_key, input).map_err(|e| e.0)?;
        self.encrypt(mech, out_key, &plaintext).map_err(|e| e.0)
    }

    /// Requires `Wrap` on `kek`. HMAC is rejected: HMAC dispatched from
    /// Wrap would produce a MAC, not a wrapped key.
    pub fn wrap(&self, mech: &Mechanism, kek: &Key, key: &Key) -> Result<Vec<u8>, WrapError> {
        self.require(kek, Capability::WRAP)?;
        if matches!(mech, Mechanism::Hmac { .. }) {
            return Err(
                KeystoreError::MechanismUnsupported("HMAC cannot be used for Wrap".into()).into(),
            );
        }
        dispatch_crypt(mech, &kek.data, &key.data, true).map_err(Into::into)
    }

    /// Requires `Unwrap` on `kek`.
    pub fn unwrap(
        &self,
        mech: &Mechanism,
        kek: &Key,
        ciphertext: &[u8],
        attrs: KeyAttrs,
    ) -> Result<Key, UnwrapError> {
        self.require(kek, Capability::UNWRAP)?;
        validate_attrs(&attrs)?;
        if matches!(mech, Mechanism::Hmac { .. }) {
            return Err(
                KeystoreError::MechanismUnsupported("HMAC cannot be used for Unwrap".into())
                    .into(),
            );
        }
        let data = dispatch_crypt(mech, &kek.data, ciphertext, false)?;
        if data.len() != attrs.length {
            return Err(
                KeystoreError::InputInvalid("unwrapped key length mismatch".into()).into(),
            );
        }
        let key = Key::new(KeyId::generate(), attrs, data);
        if key.permanent {
            self.save(&key)?;
        }
        Ok(key)
    }

    /// Hashes `input`; does not involve any key.
    pub fn hash(&self, mech: &Mechanism, input: &[u8]) -> Result<Vec<u8>, KeystoreError> {
        hash::digest(mech, input).map_err(Into::into)
    }

    /// Removes a permanent key's persistent state; otherwise a no-op.
    pub fn destroy(&self, key: &Key) -> Result<(), KeystoreError> {
        if key.permanent {
            self.backend.remove(key.id.as_str())?;
        }
        Ok(())
    }

    /// Releases session-local resources. Does not close the backend.
    pub fn close(&self) {}
}
