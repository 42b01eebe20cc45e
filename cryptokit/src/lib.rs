//! Provider-agnostic symmetric-key cryptography and DUKPT key derivation
//! for payments systems.
//!
//! ```no_run
//! use cryptokit::{Capability, KeyAttrs, KeyType, Mechanism, Provider};
//!
//! let provider = Provider::open("soft:///var/lib/cryptokit/store.db?key=00112233445566778899aabbccddeeff00112233445566778899aabbccddeeff").unwrap();
//! let session = provider.open_session();
//! let key = session
//!     .generate(
//!         &Mechanism::Random,
//!         KeyAttrs {
//!             key_type: KeyType::Aes,
//!             length: 32,
//!             permanent: true,
//!             extractable: false,
//!             capabilities: Capability::ENCRYPT | Capability::DECRYPT,
//!         },
//!     )
//!     .unwrap();
//! let ciphertext = session
//!     .encrypt(
//!         &Mechanism::Cbc { underlying: Box::new(Mechanism::Aes), iv: None },
//!         &key,
//!         &[0u8; 16],
//!     )
//!     .unwrap();
//! ```

pub use cryptokit_core::{aead, block, dukpt, hash, hmac, CoreError};
pub use cryptokit_keystore::{
    Capability, Key, KeyAttrs, KeyId, KeyRecord, KeyType, KeystoreError, Mechanism, Provider,
    Session, StorageBackend,
};

pub use cryptokit_keystore::error::{
    DecryptError, DeriveError, EncryptError, GenerateError, ProviderError, UnwrapError, WrapError,
};
pub use cryptokit_keystore::storage::{InMemoryBackend, LocalEncryptedBackend, RemoteBackend};
