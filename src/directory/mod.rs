//! Recipient Resolution
//!
//! Translates human-entered handles into stable account identities, with a
//! TTL cache so repeated lookups inside one session (autocomplete,
//! confirmation, ledger display) cost one directory round-trip.

pub mod cache;
pub mod resolver;

pub use cache::RecipientCache;
pub use resolver::{normalize_handle, RecipientKind, RecipientResolver, ResolvedRecipient, ADDRESS_PREFIX};
