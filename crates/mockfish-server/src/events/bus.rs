//! Broadcast channel for event records.
//!
//! Publishers (task workers) push [`EventRecord`]s onto a
//! [`tokio::sync::broadcast`] channel consumed by SSE streams. Registered
//! subscriptions are matched on publish; outbound HTTP delivery to their
//! destinations is not performed.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use mockfish_core::resources::{Health, Link, Message};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, info};

use super::subscription::SubscriptionStore;
use crate::tasks::model::rfc3339;

/// Buffered events per SSE receiver before it starts lagging.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// One entry of a Redfish `Event` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct EventRecord {
    pub event_type: &'static str,
    pub event_id: String,
    pub event_timestamp: String,
    pub severity: Health,
    pub message: String,
    pub message_id: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub message_args: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin_of_condition: Option<Link>,
    pub member_id: String,
    #[serde(skip)]
    pub resource_type: Option<String>,
}

impl EventRecord {
    pub fn new(
        event_id: impl Into<String>,
        message: Message,
        origin: Option<Link>,
        resource_type: Option<&str>,
    ) -> Self {
        Self {
            event_type: "Alert",
            event_id: event_id.into(),
            event_timestamp: rfc3339(Utc::now()),
            severity: message.severity,
            message: message.message,
            message_id: message.message_id,
            message_args: message.message_args,
            origin_of_condition: origin,
            member_id: "0".to_string(),
            resource_type: resource_type.map(str::to_string),
        }
    }

    /// Registry part of the message id (`TaskEvent` in `TaskEvent.1.0.TaskStarted`).
    pub fn registry_prefix(&self) -> &str {
        self.message_id.split('.').next().unwrap_or_default()
    }

    /// Wrap the record in an `Event` document.
    pub fn to_event_document(&self) -> EventDocument<'_> {
        EventDocument {
            odata_type: "#Event.v1_12_0.Event",
            id: &self.event_id,
            name: "Event",
            events: std::slice::from_ref(self),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EventDocument<'a> {
    #[serde(rename = "@odata.type")]
    pub odata_type: &'static str,
    #[serde(rename = "Id")]
    pub id: &'a str,
    #[serde(rename = "Name")]
    pub name: &'static str,
    #[serde(rename = "Events")]
    pub events: &'a [EventRecord],
}

/// Cloneable handle to the process-wide event channel.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<EventRecord>,
    subscriptions: Arc<SubscriptionStore>,
    next_id: Arc<AtomicU64>,
}

impl EventBus {
    pub fn new(subscriptions: Arc<SubscriptionStore>, capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            tx,
            subscriptions,
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EventRecord> {
        self.tx.subscribe()
    }

    /// Build a record with a fresh event id and publish it.
    pub async fn publish(
        &self,
        message: Message,
        origin: Option<Link>,
        resource_type: Option<&str>,
    ) -> EventRecord {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let event = EventRecord::new(id.to_string(), message, origin, resource_type);

        let matched = self.subscriptions.matching(&event).await;
        for sub in &matched {
            info!(
                subscription_id = %sub.id,
                destination = %sub.destination,
                message_id = %event.message_id,
                "Event matched subscription"
            );
        }

        // No live receivers is not an error.
        let receivers = self.tx.send(event.clone()).unwrap_or(0);
        debug!(
            event_id = %event.event_id,
            message_id = %event.message_id,
            receivers,
            subscriptions = matched.len(),
            "Event published"
        );
        event
    }
}
