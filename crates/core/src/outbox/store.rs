//! Offline outbox
//!
//! Durable at-least-once staging for records that could not be delivered
//! live. Events and CSAT responses are append-only queues in insertion
//! order; the user-attribute snapshot is a single overwrite slot. Enqueues
//! are fire-and-forget: a persistence failure is logged and swallowed so an
//! analytics loss can never break the host app's UI flow. Clears are
//! explicit and only issued by the caller after a confirmed wholesale
//! re-delivery - there is no partial acknowledgment.

use std::sync::Arc;

use nudgekit_domain::{PendingCsatResponse, PendingEvent, PendingUserAttributes, StorageError};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use super::ports::KeyValueStore;

/// Backing-store key for the pending events queue.
pub const PENDING_EVENTS_KEY: &str = "pending_events";
/// Backing-store key for the pending CSAT-response queue.
pub const PENDING_CSAT_KEY: &str = "pending_csat_responses";
/// Backing-store key for the single pending user-attributes snapshot.
pub const PENDING_ATTRIBUTES_KEY: &str = "pending_user_attributes";

/// Exclusive owner of the three pending-record collections.
pub struct OfflineOutbox {
    store: Arc<dyn KeyValueStore>,
    // Serializes read-modify-write cycles against the shared backing store.
    guard: Mutex<()>,
}

impl OfflineOutbox {
    /// Create an outbox over the given backing store.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store, guard: Mutex::new(()) }
    }

    /// Append an event to the pending queue. Failures are swallowed.
    pub fn enqueue_event(&self, event: PendingEvent) {
        let _lock = self.guard.lock();
        if let Err(err) = self.append(PENDING_EVENTS_KEY, &event) {
            warn!(error = %err, event = %event.event, "Failed to persist pending event");
        } else {
            debug!(event = %event.event, "Staged event for later delivery");
        }
    }

    /// Append a CSAT response to the pending queue. Failures are swallowed.
    pub fn enqueue_csat(&self, response: PendingCsatResponse) {
        let _lock = self.guard.lock();
        if let Err(err) = self.append(PENDING_CSAT_KEY, &response) {
            warn!(error = %err, csat_id = %response.csat_id, "Failed to persist pending CSAT response");
        } else {
            debug!(csat_id = %response.csat_id, "Staged CSAT response for later delivery");
        }
    }

    /// Overwrite the pending user-attribute snapshot. Failures are swallowed.
    ///
    /// Last-writer-wins: attribute state is idempotent per user, so only the
    /// latest snapshot is retained.
    pub fn set_pending_user_attributes(&self, attributes: PendingUserAttributes) {
        let _lock = self.guard.lock();
        let result = serde_json::to_string(&attributes)
            .map_err(StorageError::from)
            .and_then(|encoded| self.store.set(PENDING_ATTRIBUTES_KEY, &encoded));
        if let Err(err) = result {
            warn!(error = %err, user_id = %attributes.user_id, "Failed to persist pending user attributes");
        } else {
            debug!(user_id = %attributes.user_id, "Staged user attributes for later delivery");
        }
    }

    /// Read the pending events in insertion order without clearing them.
    #[must_use]
    pub fn drain_events(&self) -> Vec<PendingEvent> {
        let _lock = self.guard.lock();
        self.read_list(PENDING_EVENTS_KEY)
    }

    /// Read the pending CSAT responses in insertion order without clearing.
    #[must_use]
    pub fn drain_csat(&self) -> Vec<PendingCsatResponse> {
        let _lock = self.guard.lock();
        self.read_list(PENDING_CSAT_KEY)
    }

    /// Read the pending user-attribute snapshot without clearing it.
    #[must_use]
    pub fn pending_user_attributes(&self) -> Option<PendingUserAttributes> {
        let _lock = self.guard.lock();
        match self.store.get(PENDING_ATTRIBUTES_KEY) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(snapshot) => Some(snapshot),
                Err(err) => {
                    warn!(error = %err, "Discarding undecodable user-attribute snapshot");
                    None
                }
            },
            Ok(None) => None,
            Err(err) => {
                warn!(error = %err, "Failed to read pending user attributes");
                None
            }
        }
    }

    /// Remove all pending events after a confirmed batch delivery.
    pub fn clear_events(&self) {
        let _lock = self.guard.lock();
        self.clear(PENDING_EVENTS_KEY);
    }

    /// Remove all pending CSAT responses after a confirmed batch delivery.
    pub fn clear_csat(&self) {
        let _lock = self.guard.lock();
        self.clear(PENDING_CSAT_KEY);
    }

    /// Remove the pending user-attribute snapshot after delivery.
    pub fn clear_pending_user_attributes(&self) {
        let _lock = self.guard.lock();
        self.clear(PENDING_ATTRIBUTES_KEY);
    }

    fn append<T: Serialize>(&self, key: &str, record: &T) -> Result<(), StorageError> {
        let mut list: Vec<serde_json::Value> = match self.store.get(key)? {
            Some(raw) => serde_json::from_str(&raw)?,
            None => Vec::new(),
        };
        list.push(serde_json::to_value(record)?);
        let encoded = serde_json::to_string(&list)?;
        self.store.set(key, &encoded)
    }

    fn read_list<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        match self.store.get(key) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(list) => list,
                Err(err) => {
                    warn!(key, error = %err, "Discarding undecodable pending queue");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!(key, error = %err, "Failed to read pending queue");
                Vec::new()
            }
        }
    }

    fn clear(&self, key: &str) {
        if let Err(err) = self.store.remove(key) {
            warn!(key, error = %err, "Failed to clear pending queue");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex as StdMutex;

    use nudgekit_domain::AttributeMap;
    use serde_json::json;

    use super::*;

    #[derive(Default)]
    struct MemoryKv {
        values: StdMutex<HashMap<String, String>>,
        fail_writes: bool,
    }

    impl MemoryKv {
        fn failing() -> Self {
            Self { values: StdMutex::new(HashMap::new()), fail_writes: true }
        }
    }

    impl KeyValueStore for MemoryKv {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            Ok(self.values.lock().unwrap().get(key).cloned())
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            if self.fail_writes {
                return Err(StorageError::Persistence("disk full".to_string()));
            }
            self.values.lock().unwrap().insert(key.to_string(), value.to_string());
            Ok(())
        }

        fn remove(&self, key: &str) -> Result<(), StorageError> {
            self.values.lock().unwrap().remove(key);
            Ok(())
        }
    }

    fn sample_event(name: &str) -> PendingEvent {
        PendingEvent::new(Some("cmp-1".to_string()), name.to_string(), None)
    }

    fn sample_attributes(user_id: &str, plan: &str) -> PendingUserAttributes {
        let mut attributes = AttributeMap::new();
        attributes.insert("plan".to_string(), json!(plan));
        PendingUserAttributes::new(user_id.to_string(), attributes)
    }

    #[test]
    fn events_round_trip_in_insertion_order() {
        let store = Arc::new(MemoryKv::default());
        let outbox = OfflineOutbox::new(store);

        outbox.enqueue_event(sample_event("shown"));
        outbox.enqueue_event(sample_event("clicked"));
        outbox.enqueue_event(sample_event("dismissed"));

        let drained = outbox.drain_events();
        let names: Vec<_> = drained.iter().map(|e| e.event.as_str()).collect();
        assert_eq!(names, vec!["shown", "clicked", "dismissed"]);

        // Drain does not clear.
        assert_eq!(outbox.drain_events().len(), 3);

        outbox.clear_events();
        assert!(outbox.drain_events().is_empty());
    }

    #[test]
    fn events_survive_a_simulated_process_restart() {
        let store = Arc::new(MemoryKv::default());

        {
            let outbox = OfflineOutbox::new(store.clone() as Arc<dyn KeyValueStore>);
            outbox.enqueue_event(sample_event("one"));
            outbox.enqueue_event(sample_event("two"));
            outbox.enqueue_event(sample_event("three"));
        }

        // New outbox over the same backing store = fresh process, same disk.
        let recovered = OfflineOutbox::new(store);
        assert_eq!(recovered.drain_events().len(), 3);
    }

    #[test]
    fn csat_queue_is_independent_of_events() {
        let store = Arc::new(MemoryKv::default());
        let outbox = OfflineOutbox::new(store);

        outbox.enqueue_event(sample_event("shown"));
        outbox.enqueue_csat(PendingCsatResponse {
            csat_id: "csat-1".to_string(),
            user_id: "user-1".to_string(),
            rating: 5,
            feedback_option: None,
            additional_comments: Some("great".to_string()),
            timestamp: chrono::Utc::now(),
        });

        assert_eq!(outbox.drain_csat().len(), 1);
        outbox.clear_csat();
        assert!(outbox.drain_csat().is_empty());
        assert_eq!(outbox.drain_events().len(), 1);
    }

    #[test]
    fn user_attributes_overwrite_not_append() {
        let store = Arc::new(MemoryKv::default());
        let outbox = OfflineOutbox::new(store);

        outbox.set_pending_user_attributes(sample_attributes("user-1", "free"));
        outbox.set_pending_user_attributes(sample_attributes("user-1", "premium"));

        let snapshot = outbox.pending_user_attributes().unwrap();
        assert_eq!(snapshot.attributes["plan"], json!("premium"));

        outbox.clear_pending_user_attributes();
        assert!(outbox.pending_user_attributes().is_none());
    }

    #[test]
    fn persistence_failures_are_swallowed() {
        let store = Arc::new(MemoryKv::failing());
        let outbox = OfflineOutbox::new(store);

        // None of these may panic or surface an error.
        outbox.enqueue_event(sample_event("shown"));
        outbox.enqueue_csat(PendingCsatResponse {
            csat_id: "csat-1".to_string(),
            user_id: "user-1".to_string(),
            rating: 3,
            feedback_option: None,
            additional_comments: None,
            timestamp: chrono::Utc::now(),
        });
        outbox.set_pending_user_attributes(sample_attributes("user-1", "free"));

        assert!(outbox.drain_events().is_empty());
        assert!(outbox.drain_csat().is_empty());
        assert!(outbox.pending_user_attributes().is_none());
    }

    #[test]
    fn corrupt_queue_payload_is_discarded_not_fatal() {
        let store = Arc::new(MemoryKv::default());
        store.values.lock().unwrap().insert(PENDING_EVENTS_KEY.to_string(), "{not json".into());

        let outbox = OfflineOutbox::new(store);
        assert!(outbox.drain_events().is_empty());
    }
}
