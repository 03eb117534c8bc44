//! HTTP Ledger Client
//!
//! Implements `Directory` and `LedgerGateway` over the platform REST API.
//! Every call carries a bounded timeout; a timeout is surfaced as
//! `RpcError::Timeout`, never as a generic failure, because the caller must
//! treat the outcome as unknown.
//!
//! Push subscriptions are long-poll streams: the server holds the request
//! open until events arrive or the poll window elapses. A transport failure
//! ends the stream; the sync layer reacts by marking the store stale.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::api::{
    BalanceStream, Directory, EntryStream, LedgerGateway, ResolvedAccount, RpcError, RpcResult,
};
use crate::common::config::WalletConfig;
use crate::types::ledger::LedgerEntry;
use crate::types::transfer::{TransferCall, TransferReceipt};
use crate::types::wallet::WalletBalances;

/// Server-side hold on long-poll requests, in seconds
const LONG_POLL_WINDOW_SECS: u64 = 25;

/// HTTP client for the platform ledger API
#[derive(Debug, Clone)]
pub struct HttpLedgerClient {
    http: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpLedgerClient {
    /// Create a client with a custom base URL and per-call timeout
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    /// Create a client from engine configuration
    pub fn from_config(config: &WalletConfig) -> Self {
        Self::new(&config.api_url, config.rpc_timeout())
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Classify a transport error; timeouts must stay distinguishable
    fn classify(err: reqwest::Error) -> RpcError {
        if err.is_timeout() {
            RpcError::Timeout
        } else {
            RpcError::Unavailable(err.to_string())
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> RpcResult<T> {
        let resp = self
            .http
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(Self::classify)?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Err(RpcError::NotFound(url.to_string()));
        }
        if !resp.status().is_success() {
            return Err(RpcError::Unavailable(format!(
                "unexpected status {} from {}",
                resp.status(),
                url
            )));
        }

        resp.json::<T>()
            .await
            .map_err(|e| RpcError::Protocol(e.to_string()))
    }

    /// One long-poll round against an event feed. The per-request timeout is
    /// widened past the server's hold so an idle window is not a timeout.
    async fn poll_events<T: DeserializeOwned>(
        &self,
        path: &str,
        user_id: &str,
        cursor: u64,
        wait_secs: u64,
    ) -> RpcResult<EventPage<T>> {
        let url = format!(
            "{}/v1/wallets/{}/{}?cursor={}&wait={}",
            self.base_url, user_id, path, cursor, wait_secs
        );

        let resp = self
            .http
            .get(&url)
            .timeout(Duration::from_secs(wait_secs) + self.timeout)
            .send()
            .await
            .map_err(Self::classify)?;

        if !resp.status().is_success() {
            return Err(RpcError::Unavailable(format!(
                "event feed returned {}",
                resp.status()
            )));
        }

        resp.json::<EventPage<T>>()
            .await
            .map_err(|e| RpcError::Protocol(e.to_string()))
    }

    /// Establish an event stream: one immediate round to learn the current
    /// cursor (so subscription failures surface to the caller), then a
    /// long-poll loop that ends on the first transport failure.
    async fn event_stream<T: DeserializeOwned + Send + 'static>(
        &self,
        user_id: &str,
        path: &'static str,
    ) -> RpcResult<stream::BoxStream<'static, T>> {
        let initial: EventPage<T> = self.poll_events(path, user_id, 0, 0).await?;

        let state = PollState {
            client: self.clone(),
            user_id: user_id.to_string(),
            cursor: initial.cursor,
            buffered: initial.events.into(),
        };

        let stream = stream::unfold(state, move |mut state| async move {
            loop {
                if let Some(item) = state.buffered.pop_front() {
                    return Some((item, state));
                }

                match state
                    .client
                    .poll_events::<T>(path, &state.user_id, state.cursor, LONG_POLL_WINDOW_SECS)
                    .await
                {
                    Ok(page) => {
                        state.cursor = page.cursor;
                        state.buffered = page.events.into();
                        // An empty page is just an idle window; poll again.
                    }
                    Err(err) => {
                        tracing::warn!(
                            target: "nova_wallet::rpc",
                            "event feed {} dropped: {}",
                            path,
                            err
                        );
                        return None;
                    }
                }
            }
        })
        .boxed();

        Ok(stream)
    }
}

/// Long-poll state carried between stream items
struct PollState<T> {
    client: HttpLedgerClient,
    user_id: String,
    cursor: u64,
    buffered: VecDeque<T>,
}

#[async_trait]
impl Directory for HttpLedgerClient {
    async fn lookup_identity(&self, handle: &str) -> RpcResult<Option<ResolvedAccount>> {
        let url = format!("{}/v1/directory/{}", self.base_url, handle);
        match self.get_json::<ResolvedAccount>(&url).await {
            Ok(account) => Ok(Some(account)),
            Err(RpcError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl LedgerGateway for HttpLedgerClient {
    async fn get_wallet(&self, user_id: &str) -> RpcResult<WalletBalances> {
        let url = format!("{}/v1/wallets/{}", self.base_url, user_id);
        self.get_json(&url).await
    }

    async fn transfer(&self, call: &TransferCall) -> RpcResult<TransferReceipt> {
        let url = format!("{}/v1/transfers", self.base_url);
        let resp = self
            .http
            .post(&url)
            .timeout(self.timeout)
            .json(call)
            .send()
            .await
            .map_err(Self::classify)?;

        if !resp.status().is_success() && resp.status() != StatusCode::UNPROCESSABLE_ENTITY {
            return Err(RpcError::Unavailable(format!(
                "transfer endpoint returned {}",
                resp.status()
            )));
        }

        let body: TransferResponse = resp
            .json()
            .await
            .map_err(|e| RpcError::Protocol(e.to_string()))?;

        body.into_receipt()
    }

    async fn credit_points(
        &self,
        user_id: &str,
        amount: f64,
        reason: &str,
        metadata: Option<serde_json::Value>,
    ) -> RpcResult<f64> {
        let url = format!("{}/v1/wallets/{}/points-credits", self.base_url, user_id);
        let resp = self
            .http
            .post(&url)
            .timeout(self.timeout)
            .json(&serde_json::json!({
                "amount": amount,
                "reason": reason,
                "metadata": metadata,
            }))
            .send()
            .await
            .map_err(Self::classify)?;

        if !resp.status().is_success() {
            return Err(RpcError::Unavailable(format!(
                "credit endpoint returned {}",
                resp.status()
            )));
        }

        let body: CreditResponse = resp
            .json()
            .await
            .map_err(|e| RpcError::Protocol(e.to_string()))?;

        Ok(body.new_total)
    }

    async fn recent_entries(&self, user_id: &str, limit: u32) -> RpcResult<Vec<LedgerEntry>> {
        let url = format!(
            "{}/v1/wallets/{}/entries?limit={}",
            self.base_url, user_id, limit
        );
        self.get_json(&url).await
    }

    async fn subscribe_balances(&self, user_id: &str) -> RpcResult<BalanceStream> {
        self.event_stream::<WalletBalances>(user_id, "balance-events")
            .await
    }

    async fn subscribe_history(&self, user_id: &str) -> RpcResult<EntryStream> {
        self.event_stream::<LedgerEntry>(user_id, "entry-events").await
    }
}

// =============================================================================
// Wire Response Types
// =============================================================================

/// A page of pushed events plus the cursor to resume from
#[derive(Debug, Deserialize)]
struct EventPage<T> {
    events: Vec<T>,
    cursor: u64,
}

/// Transfer endpoint envelope
#[derive(Debug, Deserialize)]
struct TransferResponse {
    success: bool,
    #[serde(default)]
    transaction_id: Option<String>,
    #[serde(default)]
    amount: Option<f64>,
    #[serde(default)]
    currency: Option<crate::types::wallet::Currency>,
    #[serde(default)]
    fee_charged: Option<f64>,
    #[serde(default)]
    error: Option<String>,
}

impl TransferResponse {
    fn into_receipt(self) -> RpcResult<TransferReceipt> {
        if !self.success {
            return Err(RpcError::Rejected {
                reason: self.error.unwrap_or_else(|| "unspecified".to_string()),
            });
        }

        match (self.transaction_id, self.amount, self.currency, self.fee_charged) {
            (Some(transaction_id), Some(amount), Some(currency), Some(fee_charged)) => {
                Ok(TransferReceipt {
                    transaction_id,
                    amount,
                    currency,
                    fee_charged,
                })
            }
            _ => Err(RpcError::Protocol(
                "accepted transfer missing receipt fields".to_string(),
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CreditResponse {
    new_total: f64,
}
