//! HTTPS listener configuration and development certificates.

pub mod certs;
pub mod config;

pub use certs::{CertBundle, CertError, generate_dev_bundle};
pub use config::{TlsConfigError, TlsMode};
