//! EventService: subscriptions and the server-sent event stream.

use std::convert::Infallible;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use mockfish_core::resources::service::event_service as event_service_document;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};
use tracing::{debug, warn};

use crate::events::SubscriptionRequest;
use crate::events::subscription::subscriptions_collection;
use crate::server::respond::{ODataQuery, conditional_json, created, json_object};
use crate::server::{ApiError, AppState};

const HEARTBEAT: &str = r#"{"EventType":"Heartbeat","Message":"Connection established"}"#;

fn not_found() -> ApiError {
    ApiError::ResourceNotFound("EventDestination".into())
}

/// `GET /redfish/v1/EventService`
pub async fn event_service(headers: HeaderMap) -> Result<Response, ApiError> {
    conditional_json(&headers, &event_service_document())
}

/// `GET /redfish/v1/EventService/Subscriptions`
pub async fn list_subscriptions(
    State(state): State<AppState>,
    ODataQuery(query): ODataQuery,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let subscriptions = query.paginate(state.subscriptions.list().await);
    conditional_json(&headers, &subscriptions_collection(&subscriptions))
}

/// `POST /redfish/v1/EventService/Subscriptions`
pub async fn create_subscription(State(state): State<AppState>, body: Bytes) -> Result<Response, ApiError> {
    let body = json_object(&body, false)?;
    let request: SubscriptionRequest = serde_json::from_value(body.into())
        .map_err(|e| ApiError::MalformedRequestBody(e.to_string()))?;
    let subscription = state.subscriptions.create(request).await?;
    created(&subscription.uri(), &subscription.to_document())
}

/// `GET /redfish/v1/EventService/Subscriptions/{id}`
pub async fn get_subscription(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let subscription = state.subscriptions.get(&id).await.ok_or_else(not_found)?;
    conditional_json(&headers, &subscription.to_document())
}

/// `DELETE /redfish/v1/EventService/Subscriptions/{id}`
pub async fn delete_subscription(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    if state.subscriptions.delete(&id).await {
        Ok(StatusCode::NO_CONTENT.into_response())
    } else {
        Err(not_found())
    }
}

/// `GET /redfish/v1/EventService/SSE`
///
/// Opens with a `heartbeat` event, then relays every published event as an
/// `Event` document. Receivers that fall behind skip the missed events.
pub async fn sse(State(state): State<AppState>) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let receiver = state.events.subscribe();
    debug!("SSE client connected");

    let heartbeat = Event::default().event("heartbeat").data(HEARTBEAT);
    let live = BroadcastStream::new(receiver).filter_map(|item| {
        let record = match item {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "SSE client lagging");
                return None;
            }
        };
        match serde_json::to_string(&record.to_event_document()) {
            Ok(data) => Some(Ok(Event::default()
                .event("Event")
                .id(record.event_id.clone())
                .data(data))),
            Err(e) => {
                warn!(error = %e, "Failed to encode event");
                None
            }
        }
    });

    Sse::new(tokio_stream::once(Ok(heartbeat)).chain(live)).keep_alive(KeepAlive::default())
}
