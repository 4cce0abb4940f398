//! Event destination registrations.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use mockfish_core::resources::{Collection, Header, Link, Status, odata_id};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::info;

use super::bus::EventRecord;

pub const SUBSCRIPTIONS_PATH: &str = "EventService/Subscriptions";

const DEFAULT_PROTOCOL: &str = "Redfish";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubscriptionError {
    #[error("Destination is required")]
    MissingDestination,
}

/// Body of `POST /EventService/Subscriptions`. Unknown properties are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct SubscriptionRequest {
    pub destination: Option<String>,
    pub protocol: Option<String>,
    pub context: Option<String>,
    pub registry_prefixes: Vec<String>,
    pub resource_types: Vec<String>,
    pub severities: Vec<String>,
    pub message_ids: Vec<String>,
    pub include_origin_of_condition: bool,
    pub subordinate_resources: bool,
    pub http_headers: Vec<Value>,
}

/// A registered event destination.
#[derive(Debug, Clone)]
pub struct Subscription {
    pub id: String,
    pub destination: String,
    pub protocol: String,
    pub context: Option<String>,
    pub registry_prefixes: Vec<String>,
    pub resource_types: Vec<String>,
    pub severities: Vec<String>,
    pub message_ids: Vec<String>,
    pub include_origin_of_condition: bool,
    pub subordinate_resources: bool,
    /// Stored for delivery, never rendered back.
    pub http_headers: Vec<Value>,
}

impl Subscription {
    fn from_request(id: String, destination: String, request: SubscriptionRequest) -> Self {
        let protocol = request
            .protocol
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PROTOCOL.to_string());
        Self {
            id,
            destination,
            protocol,
            context: request.context,
            registry_prefixes: request.registry_prefixes,
            resource_types: request.resource_types,
            severities: request.severities,
            message_ids: request.message_ids,
            include_origin_of_condition: request.include_origin_of_condition,
            subordinate_resources: request.subordinate_resources,
            http_headers: request.http_headers,
        }
    }

    pub fn uri(&self) -> String {
        subscription_uri(&self.id)
    }

    /// Whether `event` passes every filter criterion. An empty criterion
    /// accepts everything.
    pub fn accepts(&self, event: &EventRecord) -> bool {
        let prefix = event.registry_prefix();
        let severity = event.severity.as_str();

        (self.registry_prefixes.is_empty() || self.registry_prefixes.iter().any(|p| p == prefix))
            && (self.severities.is_empty() || self.severities.iter().any(|s| s == severity))
            && (self.message_ids.is_empty()
                || self
                    .message_ids
                    .iter()
                    .any(|id| message_id_matches(id, &event.message_id)))
            && (self.resource_types.is_empty()
                || event
                    .resource_type
                    .as_deref()
                    .is_some_and(|t| self.resource_types.iter().any(|r| r == t)))
    }

    pub fn to_document(&self) -> SubscriptionDocument {
        SubscriptionDocument {
            header: Header::new(
                "EventDestination",
                "v1_15_1",
                self.uri(),
                &self.id,
                format!("Event Subscription {}", self.id),
            ),
            destination: self.destination.clone(),
            protocol: self.protocol.clone(),
            context: self.context.clone(),
            registry_prefixes: self.registry_prefixes.clone(),
            resource_types: self.resource_types.clone(),
            severities: self.severities.clone(),
            message_ids: self.message_ids.clone(),
            include_origin_of_condition: self.include_origin_of_condition,
            subordinate_resources: self.subordinate_resources,
            subscription_type: "RedfishEvent",
            event_format_type: "Event",
            status: Status::enabled(),
        }
    }
}

/// `Registry.Major.Minor.Key` ids also match a versionless `Registry.Key`.
fn message_id_matches(wanted: &str, actual: &str) -> bool {
    if wanted == actual {
        return true;
    }
    registry_and_key(wanted) == registry_and_key(actual)
}

fn registry_and_key(id: &str) -> (&str, &str) {
    let mut parts = id.split('.');
    let registry = parts.next().unwrap_or_default();
    (registry, parts.next_back().unwrap_or_default())
}

pub fn subscription_uri(id: &str) -> String {
    odata_id(&format!("{SUBSCRIPTIONS_PATH}/{id}"))
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SubscriptionDocument {
    #[serde(flatten)]
    pub header: Header,
    pub destination: String,
    pub protocol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    pub registry_prefixes: Vec<String>,
    pub resource_types: Vec<String>,
    pub severities: Vec<String>,
    pub message_ids: Vec<String>,
    pub include_origin_of_condition: bool,
    pub subordinate_resources: bool,
    pub subscription_type: &'static str,
    pub event_format_type: &'static str,
    pub status: Status,
}

pub fn subscriptions_collection(subscriptions: &[Subscription]) -> Collection {
    Collection::new(
        "EventDestinationCollection",
        SUBSCRIPTIONS_PATH,
        "Event Subscriptions Collection",
        subscriptions.iter().map(|s| Link::new(s.uri())).collect(),
    )
}

/// Thread-safe subscription registry.
pub struct SubscriptionStore {
    subscriptions: RwLock<HashMap<String, Subscription>>,
    next_id: AtomicU64,
}

impl Default for SubscriptionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SubscriptionStore {
    pub fn new() -> Self {
        Self {
            subscriptions: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub async fn create(&self, request: SubscriptionRequest) -> Result<Subscription, SubscriptionError> {
        let Some(destination) = request
            .destination
            .clone()
            .filter(|d| !d.trim().is_empty())
        else {
            return Err(SubscriptionError::MissingDestination);
        };
        let id = self.next_id.fetch_add(1, Ordering::Relaxed).to_string();
        let subscription = Subscription::from_request(id.clone(), destination, request);
        self.subscriptions
            .write()
            .await
            .insert(id.clone(), subscription.clone());
        info!(
            subscription_id = %id,
            destination = %subscription.destination,
            protocol = %subscription.protocol,
            "Event subscription created"
        );
        Ok(subscription)
    }

    pub async fn get(&self, id: &str) -> Option<Subscription> {
        self.subscriptions.read().await.get(id).cloned()
    }

    /// All subscriptions in creation order.
    pub async fn list(&self) -> Vec<Subscription> {
        let mut all: Vec<Subscription> = self.subscriptions.read().await.values().cloned().collect();
        all.sort_by_key(|s| s.id.parse::<u64>().unwrap_or(u64::MAX));
        all
    }

    pub async fn delete(&self, id: &str) -> bool {
        let removed = self.subscriptions.write().await.remove(id).is_some();
        if removed {
            info!(subscription_id = %id, "Event subscription deleted");
        }
        removed
    }

    /// Subscriptions whose filters accept `event`.
    pub async fn matching(&self, event: &EventRecord) -> Vec<Subscription> {
        self.list()
            .await
            .into_iter()
            .filter(|s| s.accepts(event))
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use mockfish_core::resources::{Health, Message};

    use super::*;

    fn request(destination: &str) -> SubscriptionRequest {
        SubscriptionRequest {
            destination: Some(destination.to_string()),
            ..SubscriptionRequest::default()
        }
    }

    fn task_event() -> EventRecord {
        EventRecord::new(
            "1",
            Message::new(
                "TaskEvent.1.0.TaskStarted",
                "The task with Id '1' has started.",
                Health::Ok,
                "None.",
            ),
            Some(Link::new("/redfish/v1/TaskService/Tasks/1")),
            Some("Task"),
        )
    }

    #[tokio::test]
    async fn created_subscription_is_retained() {
        let store = SubscriptionStore::new();
        let sub = store.create(request("https://listener.example/events")).await.unwrap();
        assert_eq!(sub.protocol, "Redfish");

        let fetched = store.get(&sub.id).await.unwrap();
        assert_eq!(fetched.destination, "https://listener.example/events");
        assert_eq!(store.list().await.len(), 1);

        assert!(store.delete(&sub.id).await);
        assert!(store.get(&sub.id).await.is_none());
        assert!(!store.delete(&sub.id).await);
    }

    #[tokio::test]
    async fn blank_destination_is_rejected() {
        let store = SubscriptionStore::new();
        assert_eq!(
            store.create(request("  ")).await.unwrap_err(),
            SubscriptionError::MissingDestination
        );
        assert_eq!(
            store
                .create(SubscriptionRequest::default())
                .await
                .unwrap_err(),
            SubscriptionError::MissingDestination
        );
        assert!(store.list().await.is_empty());
    }

    #[tokio::test]
    async fn explicit_protocol_is_kept() {
        let store = SubscriptionStore::new();
        let mut req = request("https://listener.example");
        req.protocol = Some("SNMPv3".into());
        assert_eq!(store.create(req).await.unwrap().protocol, "SNMPv3");
    }

    #[test]
    fn request_ignores_unknown_properties() {
        let req: SubscriptionRequest = serde_json::from_value(serde_json::json!({
            "Destination": "https://x",
            "Context": "ctx",
            "HttpHeaders": [{"X-Token": "secret"}],
            "Bogus": 1
        }))
        .unwrap();
        assert_eq!(req.context.as_deref(), Some("ctx"));
        assert_eq!(req.http_headers.len(), 1);
    }

    #[test]
    fn document_omits_http_headers() {
        let mut req = request("https://x");
        req.http_headers = vec![serde_json::json!({"X-Token": "secret"})];
        let sub = Subscription::from_request("7".into(), "https://x".into(), req);
        let doc = serde_json::to_value(sub.to_document()).unwrap();
        assert_eq!(doc["@odata.id"], "/redfish/v1/EventService/Subscriptions/7");
        assert_eq!(doc["Name"], "Event Subscription 7");
        assert_eq!(doc["SubscriptionType"], "RedfishEvent");
        assert!(doc.get("HttpHeaders").is_none());
    }

    #[test]
    fn filters_apply_to_events() {
        let event = task_event();
        let all = Subscription::from_request("1".into(), "https://x".into(), request("https://x"));
        assert!(all.accepts(&event));

        let mut base_only = request("https://x");
        base_only.registry_prefixes = vec!["Base".into()];
        assert!(!Subscription::from_request("2".into(), "https://x".into(), base_only).accepts(&event));

        let mut critical = request("https://x");
        critical.severities = vec!["Critical".into()];
        assert!(!Subscription::from_request("3".into(), "https://x".into(), critical).accepts(&event));

        let mut versionless = request("https://x");
        versionless.message_ids = vec!["TaskEvent.TaskStarted".into()];
        versionless.resource_types = vec!["Task".into()];
        assert!(Subscription::from_request("4".into(), "https://x".into(), versionless).accepts(&event));
    }

    #[tokio::test]
    async fn matching_returns_accepting_subscriptions() {
        let store = SubscriptionStore::new();
        store.create(request("https://a")).await.unwrap();
        let mut systems = request("https://b");
        systems.resource_types = vec!["ComputerSystem".into()];
        store.create(systems).await.unwrap();

        let matched = store.matching(&task_event()).await;
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].destination, "https://a");
    }
}
