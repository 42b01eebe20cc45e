//! Key model, storage backends, and the capability-enforcing session
//! dispatcher built on [`cryptokit_core`].

pub mod error;
pub mod provider;
pub mod session;
pub mod storage;
pub mod types;

pub use error::KeystoreError;
pub use provider::Provider;
pub use session::Session;
pub use storage::{InMemoryBackend, LocalEncryptedBackend, RemoteBackend, StorageBackend};
pub use types::{Capability, Key, KeyAttrs, KeyId, KeyRecord, KeyType};

pub use cryptokit_core::mechanism::Mechanism;
