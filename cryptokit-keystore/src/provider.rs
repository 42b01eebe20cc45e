//! Provider factory: opens a backend from a URL and hands out sessions.
//!
//! Registered schemes: `soft`, `soft+vault+http`, `soft+vault+https`. This
//! is the URL-selection surface described explicitly with exact formats;
//! the more elaborate plugin-style scheme registry and the interactive
//! command shell that drives it are external collaborators and not part
//! of this crate.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::ProviderError;
use crate::session::Session;
use crate::storage::{LocalEncryptedBackend, RemoteBackend, StorageBackend};

/// Opens a [`StorageBackend`] from a `soft://` or `soft+vault+http(s)://`
/// URL and hands out [`Session`]s over it. A `Provider` may be used from
/// multiple threads to open sessions; the backend itself is responsible
/// for concurrent-access safety.
pub struct Provider {
    backend: Arc<dyn StorageBackend>,
}

impl std::fmt::Debug for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provider").finish_non_exhaustive()
    }
}

impl Provider {
    /// Construct a provider directly over an already-open backend.
    pub fn from_backend(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// Parse `url` and open the backend it names.
    ///
    /// - `soft://<path>?key=<hex>` — local encrypted store at filesystem
    ///   `<path>`, master key is a 16-byte hex value (32 hex chars,
    ///   AES-128-GCM); 24- or 32-byte keys are also accepted, selecting
    ///   AES-192/256-GCM, matching the source's variable-length
    ///   `aes.NewCipher(key)` call.
    /// - `soft+vault+http://<host>/<base>?token=<t>` and `+https` — remote
    ///   secret-store; `token` falls back to the `VAULT_TOKEN` environment
    ///   variable when the query string omits it.
    pub fn open(url: &str) -> Result<Self, ProviderError> {
        if let Some(rest) = url.strip_prefix("soft://") {
            return Self::open_local(rest);
        }
        if let Some(rest) = url.strip_prefix("soft+vault+https://") {
            return Self::open_remote(rest, true);
        }
        if let Some(rest) = url.strip_prefix("soft+vault+http://") {
            return Self::open_remote(rest, false);
        }
        Err(ProviderError(format!("unrecognized provider scheme: {}", url)))
    }

    fn open_local(rest: &str) -> Result<Self, ProviderError> {
        let (path, query) = split_query(rest);
        let params = parse_query(query);
        let key_hex = params
            .get("key")
            .ok_or_else(|| ProviderError("missing key".into()))?;
        let key_bytes =
            hex::decode(key_hex).map_err(|e| ProviderError(format!("invalid key: {}", e)))?;
        if !matches!(key_bytes.len(), 16 | 24 | 32) {
            return Err(ProviderError(
                "master key must be 16, 24, or 32 bytes".into(),
            ));
        }
        let backend = LocalEncryptedBackend::open(path, key_bytes)
            .map_err(|e| ProviderError(e.to_string()))?;
        Ok(Self {
            backend: Arc::new(backend),
        })
    }

    fn open_remote(rest: &str, https: bool) -> Result<Self, ProviderError> {
        let (host_and_path, query) = split_query(rest);
        let mut parts = host_and_path.splitn(2, '/');
        let host = parts
            .next()
            .ok_or_else(|| ProviderError("missing host".into()))?;
        let base = parts.next().unwrap_or("");

        let params = parse_query(query);
        let token = match params.get("token") {
            Some(t) => t.clone(),
            None => std::env::var("VAULT_TOKEN")
                .map_err(|_| ProviderError("missing token (VAULT_TOKEN not set)".into()))?,
        };

        let scheme = if https { "https" } else { "http" };
        let base_url = format!("{}://{}", scheme, host);
        let backend = RemoteBackend::new(base_url, base, token)
            .map_err(|e| ProviderError(e.to_string()))?;
        Ok(Self {
            backend: Arc::new(backend),
        })
    }

    /// Open a new session over this provider's backend.
    pub fn open_session(&self) -> Session {
        Session::new(Arc::clone(&self.backend))
    }

    /// Close the backend. Cascades to any session-independent resources
    /// the backend holds.
    pub fn close(&self) -> Result<(), ProviderError> {
        self.backend.close().map_err(|e| ProviderError(e.to_string()))
    }
}

fn split_query(s: &str) -> (&str, &str) {
    match s.split_once('?') {
        Some((path, query)) => (path, query),
        None => (s, ""),
    }
}

fn parse_query(query: &str) -> HashMap<&str, String> {
    query
        .split('&')
        .filter(|s| !s.is_empty())
        .filter_map(|pair| pair.split_once('='))
        .map(|(k, v)| (k, v.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_url_missing_key_is_an_error() {
        let err = Provider::open("soft:///tmp/store.db").unwrap_err();
        assert_eq!(err.0, "missing key");
    }

    #[test]
    fn local_url_opens_and_hands_out_sessions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.db");
        let url = format!("soft://{}?key={}", path.display(), "11".repeat(16));
        let provider = Provider::open(&url).unwrap();
        let _session = provider.open_session();
    }

    #[test]
    fn vault_url_missing_token_falls_back_to_env_error() {
        std::env::remove_var("VAULT_TOKEN");
        let err = Provider::open("soft+vault+https://example.com/payments").unwrap_err();
        assert!(err.0.contains("VAULT_TOKEN"));
    }
}
