//! mockfish server library
//!
//! In-memory Redfish-style management service:
//! - Identity store: credential checks and session tokens
//! - Task store and the bounded worker pool that runs actions
//! - Event subscriptions and the broadcast bus behind the SSE stream
//! - axum router with the authentication gate and error envelope
//! - TLS listener configuration

pub mod auth;
pub mod events;
pub mod server;
pub mod tasks;
pub mod tls;
