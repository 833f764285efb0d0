//! DutyWire Core - Tenant Onboarding Gate
//!
//! This crate provides the multi-tenant identity gate for DutyWire: the
//! tenant registry, the onboarding access gate that decides whether an
//! authentication attempt may proceed, and the audit-emission contract
//! they share.

pub mod audit;
pub mod config;
pub mod domain;
pub mod error;
pub mod registry;
pub mod repository;
pub mod service;
pub mod telemetry;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, Result};
