//! HTTP surface: shared state, routing, and the middleware stack.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod respond;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::http::header::{self, HeaderName, HeaderValue};
use axum::http::{Method, StatusCode};
use axum::routing::{MethodRouter, get, post};
use mockfish_core::ServerConfig;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::timeout::{RequestBodyTimeoutLayer, TimeoutLayer};
use tower_http::trace::TraceLayer;

use crate::auth::header::X_AUTH_TOKEN;
use crate::auth::{CredentialStore, IdentityStore, SessionPolicy};
use crate::events::bus::DEFAULT_CHANNEL_CAPACITY;
use crate::events::{EventBus, SubscriptionStore};
use crate::tasks::{DispatchConfig, TaskDispatcher, TaskStore};

pub use error::ApiError;

const ODATA_VERSION: &str = "odata-version";
const METADATA_LINK: &str = "</redfish/v1/$metadata>; rel=describedby";

/// Values handlers read from the configuration.
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub service_name: String,
    pub session_timeout_secs: u64,
    pub task_auto_delete_minutes: u64,
    pub read_timeout: Duration,
    pub write_timeout: Duration,
}

impl ServiceSettings {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            service_name: config.service_name.clone(),
            session_timeout_secs: config.sessions.ttl_secs,
            task_auto_delete_minutes: config.tasks.auto_delete_minutes,
            read_timeout: config.read_timeout(),
            write_timeout: config.write_timeout(),
        }
    }
}

/// Shared application state. Every store is constructed here and injected
/// into handlers; nothing is global.
#[derive(Clone)]
pub struct AppState {
    pub identity: Arc<IdentityStore>,
    pub tasks: Arc<TaskStore>,
    pub dispatcher: TaskDispatcher,
    pub subscriptions: Arc<SubscriptionStore>,
    pub events: EventBus,
    pub settings: Arc<ServiceSettings>,
}

impl AppState {
    /// Build every store and start the task dispatcher. Must be called
    /// inside a Tokio runtime.
    pub fn new(config: &ServerConfig, credentials: Arc<dyn CredentialStore>) -> Self {
        let identity = Arc::new(IdentityStore::new(
            credentials,
            SessionPolicy {
                ttl: config.sessions.ttl(),
                enforce_expiry: config.sessions.enforce_expiry,
            },
        ));
        let subscriptions = Arc::new(SubscriptionStore::new());
        let events = EventBus::new(Arc::clone(&subscriptions), DEFAULT_CHANNEL_CAPACITY);
        let tasks = Arc::new(TaskStore::new());
        let dispatcher = TaskDispatcher::spawn(
            Arc::clone(&tasks),
            events.clone(),
            DispatchConfig {
                workers: config.tasks.workers,
                queue_capacity: config.tasks.queue_capacity,
                step_delay: config.tasks.step_delay(),
            },
        );
        Self {
            identity,
            tasks,
            dispatcher,
            subscriptions,
            events,
            settings: Arc::new(ServiceSettings::from_config(config)),
        }
    }
}

async fn method_not_allowed(method: Method) -> ApiError {
    ApiError::MethodNotAllowed(method)
}

async fn not_found() -> ApiError {
    ApiError::ResourceNotFound("Resource".into())
}

/// Finish a route: unsupported verbs answer 405 and every response carries
/// `Allow`.
fn resource(methods: MethodRouter<AppState>, allow: &'static str) -> MethodRouter<AppState> {
    methods
        .fallback(method_not_allowed)
        .layer(SetResponseHeaderLayer::overriding(
            header::ALLOW,
            HeaderValue::from_static(allow),
        ))
}

pub fn build_router(state: AppState) -> Router {
    use handlers::{accounts, actions, events, inventory, oem, registries, root, sessions, tasks};

    const GET: &str = "GET, HEAD";
    const GET_POST: &str = "GET, HEAD, POST";
    const GET_DELETE: &str = "GET, HEAD, DELETE";

    let read_timeout = state.settings.read_timeout;
    let write_timeout = state.settings.write_timeout;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([
            HeaderName::from_static(ODATA_VERSION),
            header::LOCATION,
            header::LINK,
            HeaderName::from_static(X_AUTH_TOKEN),
            header::ETAG,
        ]);

    Router::new()
        .route("/health", resource(get(root::health), GET))
        .route("/redfish", resource(get(root::versions), GET))
        .route("/redfish/v1", resource(get(root::service_root), GET))
        .route("/redfish/v1/", resource(get(root::service_root), GET))
        .route("/redfish/v1/$metadata", resource(get(root::metadata), GET))
        .route("/redfish/v1/odata", resource(get(root::odata), GET))
        .route("/redfish/v1/openapi.yaml", resource(get(root::openapi), GET))
        // Sessions
        .route(
            "/redfish/v1/SessionService",
            resource(get(sessions::session_service), GET),
        )
        .route(
            "/redfish/v1/SessionService/Sessions",
            resource(
                get(sessions::list_sessions).post(sessions::create_session),
                GET_POST,
            ),
        )
        .route(
            "/redfish/v1/SessionService/Sessions/{token}",
            resource(
                get(sessions::get_session).delete(sessions::delete_session),
                GET_DELETE,
            ),
        )
        // Accounts
        .route(
            "/redfish/v1/AccountService",
            resource(get(accounts::account_service), GET),
        )
        .route(
            "/redfish/v1/AccountService/Accounts",
            resource(get(accounts::list_accounts), GET),
        )
        .route(
            "/redfish/v1/AccountService/Accounts/{id}",
            resource(get(accounts::get_account), GET),
        )
        .route(
            "/redfish/v1/AccountService/Roles",
            resource(get(accounts::list_roles), GET),
        )
        .route(
            "/redfish/v1/AccountService/Roles/{id}",
            resource(get(accounts::get_role), GET),
        )
        // Inventory
        .route("/redfish/v1/Systems", resource(get(inventory::list_systems), GET))
        .route("/redfish/v1/Systems/{id}", resource(get(inventory::get_system), GET))
        .route(
            "/redfish/v1/Systems/{id}/Actions/{action}",
            resource(
                get(actions::system_action_info).post(actions::invoke_system_action),
                GET_POST,
            ),
        )
        .route("/redfish/v1/Chassis", resource(get(inventory::list_chassis), GET))
        .route("/redfish/v1/Chassis/{id}", resource(get(inventory::get_chassis), GET))
        .route(
            "/redfish/v1/Chassis/{id}/Actions/{action}",
            resource(
                get(actions::chassis_action_info).post(actions::invoke_chassis_action),
                GET_POST,
            ),
        )
        .route("/redfish/v1/Managers", resource(get(inventory::list_managers), GET))
        .route("/redfish/v1/Managers/{id}", resource(get(inventory::get_manager), GET))
        .route(
            "/redfish/v1/Managers/{id}/Actions/{action}",
            resource(
                get(actions::manager_action_info).post(actions::invoke_manager_action),
                GET_POST,
            ),
        )
        // Tasks
        .route(
            "/redfish/v1/TaskService",
            resource(get(tasks::task_service), GET),
        )
        .route(
            "/redfish/v1/TaskService/Tasks",
            resource(get(tasks::list_tasks).post(tasks::create_task), GET_POST),
        )
        .route(
            "/redfish/v1/TaskService/Tasks/{id}",
            resource(get(tasks::get_task).delete(tasks::delete_task), GET_DELETE),
        )
        // Events
        .route(
            "/redfish/v1/EventService",
            resource(get(events::event_service), GET),
        )
        .route(
            "/redfish/v1/EventService/Subscriptions",
            resource(
                get(events::list_subscriptions).post(events::create_subscription),
                GET_POST,
            ),
        )
        .route(
            "/redfish/v1/EventService/Subscriptions/{id}",
            resource(
                get(events::get_subscription).delete(events::delete_subscription),
                GET_DELETE,
            ),
        )
        .route("/redfish/v1/EventService/SSE", resource(get(events::sse), GET))
        // Registries
        .route(
            "/redfish/v1/Registries",
            resource(get(registries::list_registries), GET),
        )
        .route(
            "/redfish/v1/Registries/{id}",
            resource(get(registries::get_registry), GET),
        )
        // OEM
        .route(
            "/redfish/v1/Oem/Contoso/CustomAction",
            resource(post(oem::custom_action), "POST"),
        )
        .fallback(not_found)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static(ODATA_VERSION),
            HeaderValue::from_static("4.0"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-cache"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::LINK,
            HeaderValue::from_static(METADATA_LINK),
        ))
        .layer(RequestBodyTimeoutLayer::new(read_timeout))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            write_timeout,
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
