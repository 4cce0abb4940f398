//! Route handlers, one module per Redfish service area.

pub mod accounts;
pub mod actions;
pub mod events;
pub mod inventory;
pub mod oem;
pub mod registries;
pub mod root;
pub mod sessions;
pub mod tasks;
