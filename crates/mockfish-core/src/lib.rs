//! `mockfish` core library
//!
//! I/O-free building blocks of the management service:
//! - Resource projection into typed Redfish documents
//! - OData query-parameter engine (`$top`, `$skip`, `$select`, `$expand`, `$filter`)
//! - Entity validators for conditional requests
//! - Action catalogue and parameter validation
//! - Configuration model, error types and tracing setup

pub mod actions;
pub mod config;
pub mod error;
pub mod etag;
pub mod query;
pub mod resources;
pub mod tracing_init;

pub use config::ServerConfig;
pub use error::{Error, Result};
pub use etag::EntityTag;
pub use query::{QueryError, QueryParams};
