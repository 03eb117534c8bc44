//! Engagement Point Award Engine
//!
//! Maps engagement events to point credits. Awarding is a reward
//! side-channel, never the primary action: unknown kinds are a silent
//! no-op, and remote failures are logged and swallowed so a like or a
//! comment never fails because the points service hiccuped.

use std::sync::Arc;

use crate::common::logging::log_award_event;
use crate::rpc::api::LedgerGateway;
use crate::units::EP_PER_REFERENCE_UNIT;

/// Audit reason prefix for engagement awards
pub const REASON_ENGAGEMENT_PREFIX: &str = "engagement:";
/// Audit reason for deposit-mint credits
pub const REASON_DEPOSIT_MINT: &str = "deposit_mint";

/// Points for an engagement event kind. Unknown kinds map to `None`.
pub fn points_for(kind: &str) -> Option<f64> {
    let points = match kind {
        "post_liked" => 1.0,
        "comment_received" => 2.0,
        "post_shared" => 3.0,
        "follower_gained" => 2.0,
        "story_viewed" => 0.5,
        "daily_login" => 5.0,
        "gift_bronze" => 5.0,
        "gift_silver" => 25.0,
        "gift_gold" => 100.0,
        _ => return None,
    };
    Some(points)
}

/// A completed award
#[derive(Debug, Clone, PartialEq)]
pub struct AwardResult {
    /// Points credited
    pub points: f64,
    /// Remote-reported engagement total after the credit
    pub new_total: f64,
}

/// Fire-and-forget engagement point awarder
#[derive(Clone)]
pub struct AwardEngine {
    gateway: Arc<dyn LedgerGateway>,
}

impl AwardEngine {
    /// Create an award engine over the ledger gateway
    pub fn new(gateway: Arc<dyn LedgerGateway>) -> Self {
        Self { gateway }
    }

    /// Award points for an engagement event.
    ///
    /// Returns `None` for unknown kinds (zero remote calls) and for remote
    /// failures (logged, not propagated). Callers must not block user-visible
    /// actions on this result.
    pub async fn award(
        &self,
        user_id: &str,
        kind: &str,
        metadata: Option<serde_json::Value>,
    ) -> Option<AwardResult> {
        let points = match points_for(kind) {
            Some(p) if p > 0.0 => p,
            _ => return None,
        };

        let reason = format!("{}{}", REASON_ENGAGEMENT_PREFIX, kind);
        match self
            .gateway
            .credit_points(user_id, points, &reason, metadata)
            .await
        {
            Ok(new_total) => {
                log_award_event(kind, points, true, None);
                Some(AwardResult { points, new_total })
            }
            Err(err) => {
                log_award_event(kind, points, false, Some(&err.to_string()));
                None
            }
        }
    }

    /// Mint points for a reference-currency deposit: a fixed linear rate,
    /// floored to a whole point quantity before crediting.
    pub async fn mint_for_deposit(
        &self,
        user_id: &str,
        reference_amount: f64,
    ) -> Option<AwardResult> {
        if !(reference_amount.is_finite() && reference_amount > 0.0) {
            return None;
        }

        let points = (reference_amount * EP_PER_REFERENCE_UNIT).floor();
        if points <= 0.0 {
            return None;
        }

        match self
            .gateway
            .credit_points(user_id, points, REASON_DEPOSIT_MINT, None)
            .await
        {
            Ok(new_total) => {
                log_award_event(REASON_DEPOSIT_MINT, points, true, None);
                Some(AwardResult { points, new_total })
            }
            Err(err) => {
                log_award_event(REASON_DEPOSIT_MINT, points, false, Some(&err.to_string()));
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::api::{MockLedgerGateway, RpcError};

    #[test]
    fn test_mapping_table() {
        assert_eq!(points_for("post_liked"), Some(1.0));
        assert_eq!(points_for("gift_gold"), Some(100.0));
        assert_eq!(points_for("unknown_kind"), None);
        assert_eq!(points_for(""), None);
    }

    #[tokio::test]
    async fn test_unknown_kind_is_noop_with_zero_remote_calls() {
        let mut gateway = MockLedgerGateway::new();
        gateway.expect_credit_points().times(0);

        let engine = AwardEngine::new(Arc::new(gateway));
        assert!(engine.award("u_1", "unknown_kind", None).await.is_none());
    }

    #[tokio::test]
    async fn test_known_kind_credits_with_audit_reason() {
        let mut gateway = MockLedgerGateway::new();
        gateway
            .expect_credit_points()
            .times(1)
            .withf(|_, amount, reason, _| *amount == 2.0 && reason == "engagement:comment_received")
            .returning(|_, amount, _, _| Ok(40.0 + amount));

        let engine = AwardEngine::new(Arc::new(gateway));
        let result = engine.award("u_1", "comment_received", None).await.unwrap();
        assert_eq!(result.points, 2.0);
        assert_eq!(result.new_total, 42.0);
    }

    #[tokio::test]
    async fn test_remote_failure_is_swallowed() {
        let mut gateway = MockLedgerGateway::new();
        gateway
            .expect_credit_points()
            .times(1)
            .returning(|_, _, _, _| Err(RpcError::Unavailable("points service down".to_string())));

        let engine = AwardEngine::new(Arc::new(gateway));
        // Failure reaches the log, never the caller.
        assert!(engine.award("u_1", "post_liked", None).await.is_none());
    }

    #[tokio::test]
    async fn test_deposit_mint_floors_to_whole_points() {
        let mut gateway = MockLedgerGateway::new();
        gateway
            .expect_credit_points()
            .times(1)
            .withf(|_, amount, reason, _| *amount == 125.0 && reason == REASON_DEPOSIT_MINT)
            .returning(|_, _, _, _| Ok(125.0));

        let engine = AwardEngine::new(Arc::new(gateway));
        // 12.59 reference * 10 = 125.9 -> floored to 125
        let result = engine.mint_for_deposit("u_1", 12.59).await.unwrap();
        assert_eq!(result.points, 125.0);
    }

    #[tokio::test]
    async fn test_deposit_mint_rejects_dust_and_garbage() {
        let mut gateway = MockLedgerGateway::new();
        gateway.expect_credit_points().times(0);

        let engine = AwardEngine::new(Arc::new(gateway));
        assert!(engine.mint_for_deposit("u_1", 0.05).await.is_none());
        assert!(engine.mint_for_deposit("u_1", -3.0).await.is_none());
        assert!(engine.mint_for_deposit("u_1", f64::NAN).await.is_none());
    }
}
