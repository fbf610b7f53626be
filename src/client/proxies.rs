//! Static WASM proxy registry, optionally backed by a remote one.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;

use super::traits::WasmProxyRegistry;
use crate::domain::ClientError;

/// Module hashes known to be WASM proxies.
///
/// Hashes outside the set are forwarded to the fallback registry when one
/// is configured, and are not proxies otherwise.
#[derive(Clone, Default)]
pub struct KnownWasmProxies {
    hashes: HashSet<String>,
    fallback: Option<Arc<dyn WasmProxyRegistry>>,
}

impl KnownWasmProxies {
    #[must_use]
    pub fn new<I, S>(hashes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            hashes: hashes
                .into_iter()
                .map(|hash| hash.as_ref().to_ascii_lowercase())
                .collect(),
            fallback: None,
        }
    }

    /// Consult `registry` for hashes not in the static set.
    #[must_use]
    pub fn with_fallback(mut self, registry: Arc<dyn WasmProxyRegistry>) -> Self {
        self.fallback = Some(registry);
        self
    }

    #[must_use]
    pub fn contains(&self, wasm_hash: &str) -> bool {
        self.hashes.contains(&wasm_hash.to_ascii_lowercase())
    }
}

impl std::fmt::Debug for KnownWasmProxies {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KnownWasmProxies")
            .field("hashes", &self.hashes)
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}

#[async_trait]
impl WasmProxyRegistry for KnownWasmProxies {
    async fn is_wasm_proxy(&self, wasm_hash: &str) -> Result<bool, ClientError> {
        if self.contains(wasm_hash) {
            return Ok(true);
        }
        match &self.fallback {
            Some(registry) => registry.is_wasm_proxy(wasm_hash).await,
            None => Ok(false),
        }
    }
}
