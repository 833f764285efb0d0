//! Configuration management for DutyWire Core

use crate::registry::DomainClaimPolicy;
use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Tenant registry configuration
    pub registry: RegistryConfig,
    /// Audit sink configuration
    pub audit: AuditConfig,
    /// Telemetry configuration
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Path to a JSON tenant seed file; built-in samples are used when unset
    pub seed_path: Option<PathBuf>,
    /// What to do when an upsert claims a domain owned by another tenant
    pub domain_claim_policy: DomainClaimPolicy,
}

#[derive(Debug, Clone)]
pub struct AuditConfig {
    /// Bounded capacity of the audit dispatch queue
    pub queue_capacity: usize,
}

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Log output format: "text" or "json"
    pub log_format: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            registry: RegistryConfig {
                seed_path: env::var("DUTYWIRE_TENANT_SEED_PATH").ok().map(PathBuf::from),
                domain_claim_policy: env::var("DUTYWIRE_DOMAIN_CLAIM_POLICY")
                    .unwrap_or_else(|_| "reject".to_string())
                    .parse::<DomainClaimPolicy>()
                    .map_err(anyhow::Error::msg)
                    .context("Invalid DUTYWIRE_DOMAIN_CLAIM_POLICY")?,
            },
            audit: AuditConfig {
                queue_capacity: env::var("DUTYWIRE_AUDIT_QUEUE_CAPACITY")
                    .unwrap_or_else(|_| "256".to_string())
                    .parse()
                    .unwrap_or(256),
            },
            telemetry: TelemetryConfig {
                log_format: env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string()),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_claim_policy_parse() {
        assert_eq!(
            "reject".parse::<DomainClaimPolicy>().unwrap(),
            DomainClaimPolicy::Reject
        );
        assert_eq!(
            "Overwrite".parse::<DomainClaimPolicy>().unwrap(),
            DomainClaimPolicy::Overwrite
        );
        assert!("merge".parse::<DomainClaimPolicy>().is_err());
    }

    #[test]
    fn test_from_env_defaults() {
        let config = Config::from_env().unwrap();
        assert_eq!(config.audit.queue_capacity, 256);
        assert_eq!(config.telemetry.log_format, "text");
        assert_eq!(
            config.registry.domain_claim_policy,
            DomainClaimPolicy::Reject
        );
    }
}
