//! Port interface for the campaign backend transport

use async_trait::async_trait;
use nudgekit_domain::{NudgeKitError, PendingCsatResponse, PendingEvent, PendingUserAttributes};

/// Bearer-authenticated submission of records to the campaign backend.
///
/// Each call is a single delivery attempt; retry and offline staging live
/// one layer up in the delivery service.
#[async_trait]
pub trait CampaignTransport: Send + Sync {
    /// Deliver a batch of analytics events.
    async fn send_events(
        &self,
        access_token: &str,
        events: &[PendingEvent],
    ) -> Result<(), NudgeKitError>;

    /// Deliver a batch of CSAT survey responses.
    async fn send_csat(
        &self,
        access_token: &str,
        responses: &[PendingCsatResponse],
    ) -> Result<(), NudgeKitError>;

    /// Deliver the latest user-attribute snapshot.
    async fn send_user_attributes(
        &self,
        access_token: &str,
        snapshot: &PendingUserAttributes,
    ) -> Result<(), NudgeKitError>;
}
