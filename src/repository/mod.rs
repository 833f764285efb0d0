//! Persistence collaborator interfaces

pub mod tenant;

pub use tenant::{sample_tenants, JsonFileSource, TenantSource};
