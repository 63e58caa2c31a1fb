//! Delivery service
//!
//! The SDK-facing facade campaign views call into. Submission never errors
//! back to the caller: a record is either delivered live or staged in the
//! offline outbox for the next flush. `flush` replays each staged batch
//! wholesale and clears a queue only after its entire batch was confirmed
//! delivered - duplicates are tolerated downstream, loss is not.

use std::sync::Arc;

use nudgekit_domain::{
    AttributeMap, NudgeKitError, PendingCsatResponse, PendingEvent, PendingUserAttributes,
};
use tracing::{debug, info, instrument, warn};

use crate::auth::AuthSession;
use crate::outbox::OfflineOutbox;

use super::ports::CampaignTransport;

/// Summary of one outbox replay pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FlushReport {
    /// Events confirmed delivered and cleared
    pub events_delivered: usize,
    /// CSAT responses confirmed delivered and cleared
    pub csat_delivered: usize,
    /// Whether the pending user-attribute snapshot was delivered
    pub attributes_delivered: bool,
}

/// Facade over live delivery with outbox fallback.
pub struct DeliveryService {
    session: Arc<AuthSession>,
    transport: Arc<dyn CampaignTransport>,
    outbox: Arc<OfflineOutbox>,
}

impl DeliveryService {
    /// Create a delivery service.
    #[must_use]
    pub fn new(
        session: Arc<AuthSession>,
        transport: Arc<dyn CampaignTransport>,
        outbox: Arc<OfflineOutbox>,
    ) -> Self {
        Self { session, transport, outbox }
    }

    /// Submit an analytics event. Never errors: on any failure the event is
    /// staged for the next flush.
    #[instrument(skip(self, metadata), fields(event = %event))]
    pub async fn track_event(
        &self,
        campaign_id: Option<String>,
        event: String,
        metadata: Option<AttributeMap>,
    ) {
        let record = PendingEvent::new(campaign_id, event, metadata);

        match self.access_token().await {
            Some(token) => {
                if let Err(err) =
                    self.transport.send_events(&token, std::slice::from_ref(&record)).await
                {
                    warn!(error = %err, "Live event delivery failed, staging record");
                    self.outbox.enqueue_event(record);
                } else {
                    debug!("Event delivered live");
                }
            }
            None => self.outbox.enqueue_event(record),
        }
    }

    /// Submit a CSAT response. Never errors: on any failure the response is
    /// staged for the next flush.
    #[instrument(skip(self, response), fields(csat_id = %response.csat_id))]
    pub async fn submit_csat(&self, response: PendingCsatResponse) {
        match self.access_token().await {
            Some(token) => {
                if let Err(err) =
                    self.transport.send_csat(&token, std::slice::from_ref(&response)).await
                {
                    warn!(error = %err, "Live CSAT delivery failed, staging record");
                    self.outbox.enqueue_csat(response);
                } else {
                    debug!("CSAT response delivered live");
                }
            }
            None => self.outbox.enqueue_csat(response),
        }
    }

    /// Submit a user-attribute snapshot. Never errors: on any failure the
    /// snapshot overwrites the pending slot for the next flush.
    #[instrument(skip(self, attributes), fields(user_id = %user_id))]
    pub async fn set_user_attributes(&self, user_id: String, attributes: AttributeMap) {
        let snapshot = PendingUserAttributes::new(user_id, attributes);

        match self.access_token().await {
            Some(token) => {
                if let Err(err) = self.transport.send_user_attributes(&token, &snapshot).await {
                    warn!(error = %err, "Live attribute delivery failed, staging snapshot");
                    self.outbox.set_pending_user_attributes(snapshot);
                } else {
                    debug!("User attributes delivered live");
                }
            }
            None => self.outbox.set_pending_user_attributes(snapshot),
        }
    }

    /// Replay staged records after a network window opens (app foreground or
    /// an explicit retry trigger).
    ///
    /// Each queue is flushed all-or-nothing: cleared only after its whole
    /// batch was delivered, retained wholesale otherwise.
    #[instrument(skip(self))]
    pub async fn flush(&self) -> FlushReport {
        let mut report = FlushReport::default();

        let Some(token) = self.access_token().await else {
            debug!("No access token, keeping outbox staged");
            return report;
        };

        let events = self.outbox.drain_events();
        if !events.is_empty() {
            match self.transport.send_events(&token, &events).await {
                Ok(()) => {
                    self.outbox.clear_events();
                    report.events_delivered = events.len();
                    info!(count = events.len(), "Flushed pending events");
                }
                Err(err) => {
                    warn!(error = %err, count = events.len(), "Event flush failed, batch retained");
                }
            }
        }

        let responses = self.outbox.drain_csat();
        if !responses.is_empty() {
            match self.transport.send_csat(&token, &responses).await {
                Ok(()) => {
                    self.outbox.clear_csat();
                    report.csat_delivered = responses.len();
                    info!(count = responses.len(), "Flushed pending CSAT responses");
                }
                Err(err) => {
                    warn!(error = %err, count = responses.len(), "CSAT flush failed, batch retained");
                }
            }
        }

        if let Some(snapshot) = self.outbox.pending_user_attributes() {
            match self.transport.send_user_attributes(&token, &snapshot).await {
                Ok(()) => {
                    self.outbox.clear_pending_user_attributes();
                    report.attributes_delivered = true;
                    info!(user_id = %snapshot.user_id, "Flushed pending user attributes");
                }
                Err(err) => {
                    warn!(error = %err, "Attribute flush failed, snapshot retained");
                }
            }
        }

        report
    }

    async fn access_token(&self) -> Option<String> {
        match self.session.get_access_token().await {
            Ok(token) => Some(token),
            Err(NudgeKitError::NoAccessToken) => {
                debug!("No cached access token, staging instead of sending");
                None
            }
            Err(err) => {
                warn!(error = %err, "Token lookup failed, staging instead of sending");
                None
            }
        }
    }
}
