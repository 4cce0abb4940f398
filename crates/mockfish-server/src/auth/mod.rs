//! Authentication: credential verification, session tokens, and request
//! credential extraction.

pub mod credentials;
pub mod header;
pub mod identity;

pub use credentials::{CredentialStore, Identity, StaticCredentials};
pub use header::{AuthScheme, Principal};
pub use identity::{IdentityError, IdentityStore, Session, SessionPolicy};
