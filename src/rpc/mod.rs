//! Remote Collaborator Interfaces
//!
//! Defines the contracts the engine consumes from the platform backend and
//! the HTTP implementation of both. All durable state lives behind these
//! traits; the engine itself persists nothing.

pub mod api;
pub mod http;

pub use api::{
    BalanceStream, Directory, EntryStream, LedgerGateway, ResolvedAccount, RpcError, RpcResult,
};
pub use http::HttpLedgerClient;
