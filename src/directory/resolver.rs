//! Recipient Resolver
//!
//! Resolves a handle or address to a stable recipient. Addresses with the
//! `nova1` prefix short-circuit without a directory lookup; handles are
//! normalized, served from cache inside the TTL, and otherwise looked up
//! against the directory (active accounts only).

use std::sync::Arc;
use std::time::Duration;

use crate::common::error::{Result, WalletError};
use crate::rpc::api::{Directory, ResolvedAccount};

use super::cache::RecipientCache;

/// Fixed prefix marking an on-chain-style address
pub const ADDRESS_PREFIX: &str = "nova1";

/// What kind of identifier a recipient was resolved from
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecipientKind {
    /// A directory account resolved from a handle
    Account,
    /// A raw `nova1…` address; carries no directory identity
    Address,
}

/// A resolved transfer recipient
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ResolvedRecipient {
    /// Stable account id, or the raw address for address recipients
    pub id: String,
    pub handle: Option<String>,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub verified: bool,
    pub kind: RecipientKind,
}

impl From<ResolvedAccount> for ResolvedRecipient {
    fn from(account: ResolvedAccount) -> Self {
        Self {
            id: account.id,
            handle: Some(account.handle),
            display_name: Some(account.display_name),
            avatar_url: account.avatar_url,
            verified: account.verified,
            kind: RecipientKind::Account,
        }
    }
}

/// Normalize a raw handle: strip the `@` sigil, trim, lowercase
pub fn normalize_handle(raw: &str) -> String {
    raw.trim().trim_start_matches('@').trim().to_lowercase()
}

/// Cached handle/address resolver
#[derive(Clone)]
pub struct RecipientResolver {
    directory: Arc<dyn Directory>,
    cache: RecipientCache,
}

impl RecipientResolver {
    /// Create a resolver over a directory collaborator with the given cache TTL
    pub fn new(directory: Arc<dyn Directory>, cache_ttl: Duration) -> Self {
        Self {
            directory,
            cache: RecipientCache::new(cache_ttl),
        }
    }

    /// Resolve an identifier to a recipient.
    ///
    /// Self-transfer checking is the orchestrator's job; this only answers
    /// "who is this identifier".
    pub async fn resolve(&self, identifier: &str) -> Result<ResolvedRecipient> {
        let trimmed = identifier.trim();

        // Addresses are not handles: no lookup, no cache.
        if trimmed.starts_with(ADDRESS_PREFIX) {
            return Ok(ResolvedRecipient {
                id: trimmed.to_string(),
                handle: None,
                display_name: None,
                avatar_url: None,
                verified: false,
                kind: RecipientKind::Address,
            });
        }

        let handle = normalize_handle(trimmed);
        if handle.is_empty() {
            return Err(WalletError::invalid_input("empty recipient identifier"));
        }

        if let Some(cached) = self.cache.get(&handle).await {
            return Ok(cached);
        }

        let account = self
            .directory
            .lookup_identity(&handle)
            .await
            .map_err(WalletError::from)?
            .ok_or_else(|| WalletError::not_found(format!("@{}", handle)))?;

        let recipient = ResolvedRecipient::from(account);
        self.cache.insert(&handle, recipient.clone()).await;

        Ok(recipient)
    }

    /// Drop one cached handle
    pub async fn invalidate(&self, handle: &str) {
        self.cache.invalidate(&normalize_handle(handle)).await;
    }

    /// Drop the whole cache; called on sign-out
    pub async fn clear_cache(&self) {
        self.cache.clear().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::api::MockDirectory;

    fn account(id: &str, handle: &str) -> ResolvedAccount {
        ResolvedAccount {
            id: id.to_string(),
            handle: handle.to_string(),
            display_name: handle.to_uppercase(),
            avatar_url: None,
            verified: false,
        }
    }

    #[test]
    fn test_normalization() {
        assert_eq!(normalize_handle("@Alice "), "alice");
        assert_eq!(normalize_handle("  BOB"), "bob");
        assert_eq!(normalize_handle("@"), "");
    }

    #[tokio::test]
    async fn test_address_short_circuits_directory() {
        let mut directory = MockDirectory::new();
        directory.expect_lookup_identity().times(0);

        let resolver = RecipientResolver::new(Arc::new(directory), Duration::from_secs(60));
        let recipient = resolver.resolve("nova1q8gk5w7e9").await.unwrap();

        assert_eq!(recipient.kind, RecipientKind::Address);
        assert_eq!(recipient.id, "nova1q8gk5w7e9");
        assert!(recipient.handle.is_none());
    }

    #[tokio::test]
    async fn test_empty_identifier_is_invalid_input() {
        let mut directory = MockDirectory::new();
        directory.expect_lookup_identity().times(0);

        let resolver = RecipientResolver::new(Arc::new(directory), Duration::from_secs(60));
        let err = resolver.resolve("  @ ").await.unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }

    #[tokio::test]
    async fn test_unknown_handle_is_not_found() {
        let mut directory = MockDirectory::new();
        directory
            .expect_lookup_identity()
            .times(1)
            .returning(|_| Ok(None));

        let resolver = RecipientResolver::new(Arc::new(directory), Duration::from_secs(60));
        let err = resolver.resolve("@doesnotexist").await.unwrap_err();
        assert_eq!(err.error_code(), "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_second_resolution_within_ttl_skips_lookup() {
        let mut directory = MockDirectory::new();
        directory
            .expect_lookup_identity()
            .times(1)
            .returning(|h| Ok(Some(account("u_1", h))));

        let resolver = RecipientResolver::new(Arc::new(directory), Duration::from_secs(60));

        let first = resolver.resolve("@alice").await.unwrap();
        let second = resolver.resolve("Alice").await.unwrap();

        assert_eq!(first.id, "u_1");
        assert_eq!(second.id, "u_1");
    }

    #[tokio::test]
    async fn test_expired_entry_triggers_second_lookup() {
        let mut directory = MockDirectory::new();
        directory
            .expect_lookup_identity()
            .times(2)
            .returning(|h| Ok(Some(account("u_1", h))));

        let resolver = RecipientResolver::new(Arc::new(directory), Duration::from_millis(10));

        resolver.resolve("@alice").await.unwrap();
        tokio::time::sleep(Duration::from_millis(25)).await;
        resolver.resolve("@alice").await.unwrap();
    }

    #[tokio::test]
    async fn test_directory_errors_pass_through() {
        let mut directory = MockDirectory::new();
        directory
            .expect_lookup_identity()
            .times(1)
            .returning(|_| Err(crate::rpc::api::RpcError::Timeout));

        let resolver = RecipientResolver::new(Arc::new(directory), Duration::from_secs(60));
        let err = resolver.resolve("@alice").await.unwrap_err();
        assert_eq!(err.error_code(), "TIMEOUT");
    }
}
