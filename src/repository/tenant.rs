//! Tenant persistence collaborator
//!
//! The registry is seeded from whatever source is wired in at process
//! start; the source only has to provide "load all" and "upsert one".

use crate::domain::{Lexicon, OnboardingStatus, SecurityPolicy, Tenant};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::path::PathBuf;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TenantSource: Send + Sync {
    async fn load_all(&self) -> Result<Vec<Tenant>>;
    async fn upsert_one(&self, tenant: &Tenant) -> Result<()>;
}

/// Tenant source backed by a single JSON file holding an array of records.
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl TenantSource for JsonFileSource {
    async fn load_all(&self) -> Result<Vec<Tenant>> {
        let raw = tokio::fs::read_to_string(&self.path).await?;
        let records: Vec<Tenant> = serde_json::from_str(&raw)?;
        Ok(records)
    }

    async fn upsert_one(&self, tenant: &Tenant) -> Result<()> {
        let mut records = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => serde_json::from_str::<Vec<Tenant>>(&raw)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(err) => return Err(AppError::Io(err)),
        };

        match records
            .iter()
            .position(|existing| existing.id.eq_ignore_ascii_case(&tenant.id))
        {
            Some(position) => records[position] = tenant.clone(),
            None => records.push(tenant.clone()),
        }

        let raw = serde_json::to_string_pretty(&records)?;
        tokio::fs::write(&self.path, raw).await?;
        Ok(())
    }
}

/// Built-in sample organizations so the gate can be exercised before a
/// real source is wired in.
pub fn sample_tenants() -> Vec<Tenant> {
    let now = Utc::now();
    vec![
        Tenant {
            id: "demo-pd".to_string(),
            organization_key: "DEMO-PD".to_string(),
            display_name: "Demo Police Department".to_string(),
            verified_domains: vec![
                "demopd.example".to_string(),
                "ops.demopd.example".to_string(),
                "gmail.com".to_string(),
            ],
            owner_usernames: vec![
                "gmail.com".to_string(),
                "sheriff.demopd".to_string(),
                "chief.demopd".to_string(),
            ],
            security_officer_usernames: vec!["gmail.com".to_string(), "aso.demopd".to_string()],
            onboarding_status: OnboardingStatus::Ready,
            security_policy: SecurityPolicy {
                requires_strong_mfa: true,
                invite_expiry_hours: 24,
                allow_self_registration: false,
                default_role: "Officer".to_string(),
            },
            lexicon: Lexicon::default(),
            created_at: now,
            updated_at: now,
        },
        Tenant {
            id: "alpha-sheriff".to_string(),
            organization_key: "ALPHA-SO".to_string(),
            display_name: "Alpha County Sheriff's Office".to_string(),
            verified_domains: vec!["alphaso.example".to_string()],
            owner_usernames: vec!["sheriff.alpha".to_string(), "chief.alpha".to_string()],
            security_officer_usernames: vec!["aso.alpha".to_string()],
            onboarding_status: OnboardingStatus::PendingOwnerBootstrap,
            security_policy: SecurityPolicy {
                requires_strong_mfa: true,
                invite_expiry_hours: 12,
                allow_self_registration: false,
                default_role: "Officer".to_string(),
            },
            lexicon: Lexicon {
                squad_singular: "Platoon".to_string(),
                squad_plural: "Platoons".to_string(),
                bureau_singular: "Division".to_string(),
                bureau_plural: "Divisions".to_string(),
                task_singular: "Directive".to_string(),
                task_plural: "Directives".to_string(),
            },
            created_at: now,
            updated_at: now,
        },
        Tenant {
            id: "beta-campus".to_string(),
            organization_key: "BETA-CAMPUS".to_string(),
            display_name: "Beta University Public Safety".to_string(),
            verified_domains: vec!["publicsafety.beta.edu".to_string()],
            owner_usernames: vec!["captain.beta".to_string()],
            security_officer_usernames: vec!["aso.beta".to_string(), "infosec.beta".to_string()],
            onboarding_status: OnboardingStatus::AwaitingVerification,
            security_policy: SecurityPolicy {
                requires_strong_mfa: false,
                invite_expiry_hours: 48,
                allow_self_registration: true,
                default_role: "Supervisor".to_string(),
            },
            lexicon: Lexicon {
                squad_singular: "Watch".to_string(),
                squad_plural: "Watches".to_string(),
                bureau_singular: "Precinct".to_string(),
                bureau_plural: "Precincts".to_string(),
                task_singular: "Assignment".to_string(),
                task_plural: "Assignments".to_string(),
            },
            created_at: now,
            updated_at: now,
        },
    ]
}
