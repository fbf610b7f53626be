//! In-memory account info cache in front of an [`AccountInfoSource`].

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::traits::AccountInfoSource;
use crate::domain::account::AccountInfoMap;
use crate::domain::keys::AccountKeyType;
use crate::domain::{CasperNetwork, ClientError};

/// Accounts kept per network unless configured otherwise.
pub const DEFAULT_MAX_ACCOUNTS_PER_NETWORK: usize = 1024;

/// Remembers the accounts the inner source returned, per network, and only
/// asks it for hashes not seen yet.
///
/// Each network holds at most `max_per_network` accounts. A fetch that
/// would overflow it drops that network's entries and starts over.
pub struct AccountInfoCache {
    inner: Arc<dyn AccountInfoSource>,
    entries: RwLock<HashMap<CasperNetwork, AccountInfoMap>>,
    max_per_network: usize,
}

impl AccountInfoCache {
    #[must_use]
    pub fn new(inner: Arc<dyn AccountInfoSource>) -> Self {
        Self::with_capacity(inner, DEFAULT_MAX_ACCOUNTS_PER_NETWORK)
    }

    #[must_use]
    pub fn with_capacity(inner: Arc<dyn AccountInfoSource>, max_per_network: usize) -> Self {
        Self {
            inner,
            entries: RwLock::new(HashMap::new()),
            max_per_network,
        }
    }

    /// Number of cached accounts on a network.
    pub async fn len(&self, network: CasperNetwork) -> usize {
        self.entries
            .read()
            .await
            .get(&network)
            .map_or(0, AccountInfoMap::len)
    }

    /// Drops every cached entry.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    async fn split_hits(
        &self,
        network: CasperNetwork,
        account_hashes: &[String],
    ) -> (AccountInfoMap, Vec<String>) {
        let entries = self.entries.read().await;
        let cached = entries.get(&network);
        let mut hits = AccountInfoMap::new();
        let mut misses = Vec::new();
        for hash in account_hashes {
            match cached.and_then(|cached| cached.resolve(hash, AccountKeyType::AccountHash)) {
                Some(info) => hits.insert(info.clone()),
                None => misses.push(hash.clone()),
            }
        }
        (hits, misses)
    }
}

#[async_trait]
impl AccountInfoSource for AccountInfoCache {
    async fn accounts_info(
        &self,
        network: CasperNetwork,
        account_hashes: &[String],
    ) -> Result<AccountInfoMap, ClientError> {
        let (mut result, misses) = self.split_hits(network, account_hashes).await;
        if misses.is_empty() {
            return Ok(result);
        }

        tracing::trace!(network = %network, misses = misses.len(), "Fetching uncached accounts");
        let fetched = self.inner.accounts_info(network, &misses).await?;
        {
            let mut entries = self.entries.write().await;
            let cached = entries.entry(network).or_default();
            if cached.len() + fetched.len() > self.max_per_network {
                tracing::debug!(network = %network, evicted = cached.len(), "Account cache full, starting over");
                *cached = AccountInfoMap::new();
            }
            if fetched.len() <= self.max_per_network {
                cached.extend(fetched.clone());
            }
        }
        result.extend(fetched);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::keys::account_hash_from_public_key;
    use crate::test_utils::{AccountInfoMother, FakeAccounts, RECIPIENT_KEY, SENDER_KEY};

    #[tokio::test]
    async fn test_only_misses_are_fetched() {
        let source = Arc::new(FakeAccounts::new(vec![
            AccountInfoMother::with_public_key(SENDER_KEY, "Alice"),
            AccountInfoMother::with_public_key(RECIPIENT_KEY, "Bob"),
        ]));
        let cache = AccountInfoCache::new(source.clone());
        let alice = account_hash_from_public_key(SENDER_KEY).unwrap();
        let bob = account_hash_from_public_key(RECIPIENT_KEY).unwrap();

        let first = cache
            .accounts_info(CasperNetwork::Testnet, &[alice.clone()])
            .await
            .unwrap();
        assert_eq!(first.len(), 1);

        let second = cache
            .accounts_info(CasperNetwork::Testnet, &[alice.clone(), bob.clone()])
            .await
            .unwrap();
        assert_eq!(second.len(), 2);
        assert_eq!(source.requests(), vec![vec![alice], vec![bob]]);
        assert_eq!(cache.len(CasperNetwork::Testnet).await, 2);
    }

    #[tokio::test]
    async fn test_networks_are_cached_separately() {
        let source = Arc::new(FakeAccounts::new(vec![AccountInfoMother::with_public_key(
            SENDER_KEY, "Alice",
        )]));
        let cache = AccountInfoCache::new(source.clone());
        let alice = account_hash_from_public_key(SENDER_KEY).unwrap();

        cache
            .accounts_info(CasperNetwork::Testnet, &[alice.clone()])
            .await
            .unwrap();
        cache
            .accounts_info(CasperNetwork::Mainnet, &[alice.clone()])
            .await
            .unwrap();
        assert_eq!(source.requests().len(), 2);

        cache.clear().await;
        assert_eq!(cache.len(CasperNetwork::Testnet).await, 0);
    }

    #[tokio::test]
    async fn test_full_network_starts_over() {
        let source = Arc::new(FakeAccounts::new(vec![
            AccountInfoMother::with_public_key(SENDER_KEY, "Alice"),
            AccountInfoMother::with_public_key(RECIPIENT_KEY, "Bob"),
        ]));
        let cache = AccountInfoCache::with_capacity(source.clone(), 1);
        let alice = account_hash_from_public_key(SENDER_KEY).unwrap();
        let bob = account_hash_from_public_key(RECIPIENT_KEY).unwrap();

        for hash in [&alice, &bob, &alice] {
            let result = cache
                .accounts_info(CasperNetwork::Testnet, &[hash.clone()])
                .await
                .unwrap();
            assert_eq!(result.len(), 1);
            assert_eq!(cache.len(CasperNetwork::Testnet).await, 1);
        }
        assert_eq!(source.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_oversized_batch_is_returned_but_not_cached() {
        let source = Arc::new(FakeAccounts::new(vec![
            AccountInfoMother::with_public_key(SENDER_KEY, "Alice"),
            AccountInfoMother::with_public_key(RECIPIENT_KEY, "Bob"),
        ]));
        let cache = AccountInfoCache::with_capacity(source.clone(), 1);
        let hashes = [SENDER_KEY, RECIPIENT_KEY].map(|key| account_hash_from_public_key(key).unwrap());

        let result = cache
            .accounts_info(CasperNetwork::Testnet, &hashes)
            .await
            .unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(cache.len(CasperNetwork::Testnet).await, 0);
    }

    #[tokio::test]
    async fn test_unknown_accounts_are_not_cached() {
        let source = Arc::new(FakeAccounts::new(Vec::new()));
        let cache = AccountInfoCache::new(source.clone());
        let unknown = "ee".repeat(32);

        for _ in 0..2 {
            let result = cache
                .accounts_info(CasperNetwork::Testnet, &[unknown.clone()])
                .await
                .unwrap();
            assert!(result.is_empty());
        }
        assert_eq!(source.requests().len(), 2);
    }
}
