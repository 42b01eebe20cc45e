//! Storage backends: where key attribute records live.
//!
//! The trait is the exact shape of the source `Database` interface
//! (list/find/save/remove/close), generalized here as `StorageBackend`.

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;
use std::path::PathBuf;
use std::sync::Mutex;

use rand_core::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::KeystoreError;
use crate::types::KeyRecord;

/// Backend for persisting key attribute records.
///
/// Implement this for your infrastructure: in-memory (testing), a single
/// encrypted file (embedded/local), or a remote secret-store HTTP service.
pub trait StorageBackend: Send + Sync {
    fn list_keys(&self) -> Result<Vec<String>, KeystoreError>;
    fn find_key(&self, id: &str) -> Result<Option<KeyRecord>, KeystoreError>;
    fn save(&self, id: &str, record: &KeyRecord) -> Result<(), KeystoreError>;
    fn remove(&self, id: &str) -> Result<(), KeystoreError>;
    fn close(&self) -> Result<(), KeystoreError>;
}

// ---------------------------------------------------------------------------
// In-memory backend
// ---------------------------------------------------------------------------

/// In-memory storage. No at-rest protection; for testing and ephemeral use.
#[derive(Default)]
pub struct InMemoryBackend {
    records: Mutex<HashMap<String, KeyRecord>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for InMemoryBackend {
    fn list_keys(&self) -> Result<Vec<String>, KeystoreError> {
        let records = self.records.lock().unwrap();
        Ok(records.keys().cloned().collect())
    }

    fn find_key(&self, id: &str) -> Result<Option<KeyRecord>, KeystoreError> {
        let records = self.records.lock().unwrap();
        Ok(records.get(id).cloned())
    }

    fn save(&self, id: &str, record: &KeyRecord) -> Result<(), KeystoreError> {
        let mut records = self.records.lock().unwrap();
        records.insert(id.to_string(), record.clone());
        Ok(())
    }

    fn remove(&self, id: &str) -> Result<(), KeystoreError> {
        let mut records = self.records.lock().unwrap();
        records.remove(id);
        Ok(())
    }

    fn close(&self) -> Result<(), KeystoreError> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Local encrypted backend
// ---------------------------------------------------------------------------

/// A single 0600-permission file holding every record under the `keys`
/// namespace, each value sealed with AES-GCM under the master key (key
/// length selects the AES variant: 16/24/32 bytes -> AES-128/192/256).
///
/// `record = nonce || AEAD_Seal(master_key, nonce, plaintext, aad="")`. The
/// whole namespace is loaded into memory on open and rewritten wholesale on
/// each mutation, mirroring the source's single-bucket bolt store without
/// introducing an embedded-database dependency this pack does not carry.
pub struct LocalEncryptedBackend {
    path: PathBuf,
    master_key: Vec<u8>,
    namespace: Mutex<HashMap<String, String>>,
}

#[derive(Default, Serialize, Deserialize)]
struct OnDiskFile {
    keys: HashMap<String, String>,
}

const GCM_NONCE_LEN: usize = 12;

impl LocalEncryptedBackend {
    /// Open (creating if absent) the file at `path`, keyed by `master_key`
    /// (16, 24, or 32 bytes, selecting AES-128/192/256-GCM respectively —
    /// the same variable-length acceptance as the source's direct
    /// `aes.NewCipher(key)` call).
    pub fn open(
        path: impl Into<PathBuf>,
        master_key: impl Into<Vec<u8>>,
    ) -> Result<Self, KeystoreError> {
        let master_key = master_key.into();
        let path = path.into();
        let namespace = if path.exists() {
            let mut file = File::open(&path)
                .map_err(|e| KeystoreError::StoreFailure(format!("open: {}", e)))?;
            let mut contents = String::new();
            file.read_to_string(&mut contents)
                .map_err(|e| KeystoreError::StoreFailure(format!("read: {}", e)))?;
            if contents.trim().is_empty() {
                HashMap::new()
            } else {
                let on_disk: OnDiskFile = serde_json::from_str(&contents)
                    .map_err(|e| KeystoreError::StoreFailure(format!("parse: {}", e)))?;
                on_disk.keys
            }
        } else {
            HashMap::new()
        };

        let backend = Self {
            path,
            master_key,
            namespace: Mutex::new(namespace),
        };
        backend.flush()?;
        Ok(backend)
    }

    fn seal(&self, plaintext: &[u8]) -> Result<String, KeystoreError> {
        let mut nonce = [0u8; GCM_NONCE_LEN];
        rand_core::OsRng.fill_bytes(&mut nonce);
        let ciphertext = cryptokit_core::aead::gcm_seal(&self.master_key, &nonce, b"", plaintext)
            .map_err(|e| KeystoreError::StoreFailure(e.to_string()))?;
        let mut sealed = Vec::with_capacity(GCM_NONCE_LEN + ciphertext.len());
        sealed.extend_from_slice(&nonce);
        sealed.extend_from_slice(&ciphertext);
        Ok(hex::encode(sealed))
    }

    fn open_envelope(&self, sealed_hex: &str) -> Result<Vec<u8>, KeystoreError> {
        let sealed = hex::decode(sealed_hex)
            .map_err(|e| KeystoreError::StoreFailure(format!("envelope decode: {}", e)))?;
        if sealed.len() < GCM_NONCE_LEN {
            return Err(KeystoreError::StoreFailure("envelope too short".into()));
        }
        let (nonce, ciphertext) = sealed.split_at(GCM_NONCE_LEN);
        cryptokit_core::aead::gcm_open(&self.master_key, nonce, b"", ciphertext)
            .map_err(|e| KeystoreError::StoreFailure(e.to_string()))
    }

    fn flush(&self) -> Result<(), KeystoreError> {
        let namespace = self.namespace.lock().unwrap();
        let on_disk = OnDiskFile {
            keys: namespace.clone(),
        };
        let json = serde_json::to_string_pretty(&on_disk)
            .map_err(|e| KeystoreError::StoreFailure(format!("serialize: {}", e)))?;

        let tmp = self.path.with_extension("tmp");
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o600);
        let mut file = options
            .open(&tmp)
            .map_err(|e| KeystoreError::StoreFailure(format!("write: {}", e)))?;
        file.write_all(json.as_bytes())
            .map_err(|e| KeystoreError::StoreFailure(format!("write: {}", e)))?;
        std::fs::rename(&tmp, &self.path)
            .map_err(|e| KeystoreError::StoreFailure(format!("rename: {}", e)))?;
        Ok(())
    }
}

impl StorageBackend for LocalEncryptedBackend {
    fn list_keys(&self) -> Result<Vec<String>, KeystoreError> {
        let namespace = self.namespace.lock().unwrap();
        Ok(namespace.keys().cloned().collect())
    }

    fn find_key(&self, id: &str) -> Result<Option<KeyRecord>, KeystoreError> {
        let sealed = {
            let namespace = self.namespace.lock().unwrap();
            match namespace.get(id) {
                Some(s) => s.clone(),
                None => return Ok(None),
            }
        };
        let plaintext = self.open_envelope(&sealed)?;
        let record: KeyRecord = serde_json::from_slice(&plaintext)
            .map_err(|e| KeystoreError::StoreFailure(format!("parse: {}", e)))?;
        Ok(Some(record))
    }

    fn save(&self, id: &str, record: &KeyRecord) -> Result<(), KeystoreError> {
        let plaintext = serde_json::to_vec(record)
            .map_err(|e| KeystoreError::StoreFailure(format!("serialize: {}", e)))?;
        let sealed = self.seal(&plaintext)?;
        {
            let mut namespace = self.namespace.lock().unwrap();
            namespace.insert(id.to_string(), sealed);
        }
        self.flush()
    }

    fn remove(&self, id: &str) -> Result<(), KeystoreError> {
        {
            let mut namespace = self.namespace.lock().unwrap();
            namespace.remove(id);
        }
        self.flush()
    }

    fn close(&self) -> Result<(), KeystoreError> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Remote secret-store backend
// ---------------------------------------------------------------------------

/// Issues read/write/list/delete requests against a remote HTTP secret
/// service under `secret/<base>`. Attribute maps cross the wire verbatim as
/// the service's native JSON payload; the service is relied on for at-rest
/// protection.
pub struct RemoteBackend {
    base_url: String,
    base_path: String,
    token: String,
    client: reqwest::blocking::Client,
}

impl RemoteBackend {
    pub fn new(
        base_url: impl Into<String>,
        base_path: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self, KeystoreError> {
        let client = reqwest::blocking::Client::builder()
            .build()
            .map_err(|e| KeystoreError::StoreFailure(format!("http client: {}", e)))?;
        Ok(Self {
            base_url: base_url.into(),
            base_path: base_path.into(),
            token: token.into(),
            client,
        })
    }

    fn url_for(&self, id: &str) -> String {
        format!(
            "{}/secret/{}/{}",
            self.base_url.trim_end_matches('/'),
            self.base_path,
            id
        )
    }

    fn list_url(&self) -> String {
        format!(
            "{}/secret/{}",
            self.base_url.trim_end_matches('/'),
            self.base_path
        )
    }
}

impl StorageBackend for RemoteBackend {
    fn list_keys(&self) -> Result<Vec<String>, KeystoreError> {
        let resp = self
            .client
            .get(self.list_url())
            .header("X-Vault-Token", &self.token)
            .send()
            .map_err(|e| KeystoreError::StoreFailure(format!("list request: {}", e)))?;
        if !resp.status().is_success() {
            return Err(KeystoreError::StoreFailure(format!(
                "list failed: {}",
                resp.status()
            )));
        }
        resp.json::<Vec<String>>()
            .map_err(|e| KeystoreError::StoreFailure(format!("list decode: {}", e)))
    }

    fn find_key(&self, id: &str) -> Result<Option<KeyRecord>, KeystoreError> {
        let resp = self
            .client
            .get(self.url_for(id))
            .header("X-Vault-Token", &self.token)
            .send()
            .map_err(|e| KeystoreError::StoreFailure(format!("get request: {}", e)))?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(KeystoreError::StoreFailure(format!(
                "get failed: {}",
                resp.status()
            )));
        }
        let record = resp
            .json::<KeyRecord>()
            .map_err(|e| KeystoreError::StoreFailure(format!("get decode: {}", e)))?;
        Ok(Some(record))
    }

    fn save(&self, id: &str, record: &KeyRecord) -> Result<(), KeystoreError> {
        let resp = self
            .client
            .put(self.url_for(id))
            .header("X-Vault-Token", &self.token)
            .json(record)
            .send()
            .map_err(|e| KeystoreError::StoreFailure(format!("put request: {}", e)))?;
        if !resp.status().is_success() {
            return Err(KeystoreError::StoreFailure(format!(
                "put failed: {}",
                resp.status()
            )));
        }
        Ok(())
    }

    fn remove(&self, id: &str) -> Result<(), KeystoreError> {
        let resp = self
            .client
            .delete(self.url_for(id))
            .header("X-Vault-Token", &self.token)
            .send()
            .map_err(|e| KeystoreError::StoreFailure(format!("delete request: {}", e)))?;
        if !resp.status().is_success() && resp.status() != reqwest::StatusCode::NOT_FOUND {
            return Err(KeystoreError::StoreFailure(format!(
                "delete failed: {}",
                resp.status()
            )));
        }
        Ok(())
    }

    fn close(&self) -> Result<(), KeystoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Capability, Key, KeyAttrs, KeyId, KeyType};

    fn sample_record() -> KeyRecord {
        let key = Key::new(
            KeyId::new("k1"),
            KeyAttrs {
                key_type: KeyType::Aes,
                length: 4,
                permanent: true,
                extractable: true,
                capabilities: Capability::ENCRYPT,
            },
            vec![9, 9, 9, 9],
        );
        KeyRecord::from_key(&key)
    }

    #[test]
    fn in_memory_roundtrip() {
        let backend = InMemoryBackend::new();
        let record = sample_record();
        backend.save("k1", &record).unwrap();
        let found = backend.find_key("k1").unwrap().unwrap();
        assert_eq!(found.data, record.data);
        backend.remove("k1").unwrap();
        assert!(backend.find_key("k1").unwrap().is_none());
    }

    #[test]
    fn local_encrypted_roundtrip_and_wrong_master_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        let master = vec![0x11u8; 16];

        let backend = LocalEncryptedBackend::open(&path, master.clone()).unwrap();
        let record = sample_record();
        backend.save("k1", &record).unwrap();
        drop(backend);

        let reopened = LocalEncryptedBackend::open(&path, master).unwrap();
        let found = reopened.find_key("k1").unwrap().unwrap();
        assert_eq!(found.data, record.data);

        let wrong_master = vec![0x22u8; 16];
        let wrong = LocalEncryptedBackend::open(&path, wrong_master).unwrap();
        assert!(wrong.find_key("k1").is_err());
    }
}
