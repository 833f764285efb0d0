//! Onboarding access gate
//!
//! Central gatekeeper that validates organization keys and duty emails
//! before allowing an authentication attempt to proceed. Every outcome,
//! allowed or blocked, emits exactly one audit record.

use crate::audit::AuditSink;
use crate::domain::{AuditCategory, OnboardingStatus, Tenant};
use crate::registry::{email_domain, TenantRegistry};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Outcome of one sign-in attempt evaluation.
///
/// Every `Blocked` reason is a complete sentence suitable for direct
/// display.
#[derive(Debug, Clone, PartialEq)]
pub enum GateDecision {
    Allowed { tenant: Tenant },
    Blocked { reason: String },
}

impl GateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GateDecision::Allowed { .. })
    }
}

/// Pure decision function over the tenant registry.
///
/// Evaluation is synchronous and reads a single registry snapshot; the
/// audit dispatch is fire-and-forget. `evaluate` never fails: empty and
/// malformed inputs are blocked outcomes, not errors.
pub struct OnboardingGate {
    registry: Arc<TenantRegistry>,
    audit: Arc<dyn AuditSink>,
}

impl OnboardingGate {
    pub fn new(registry: Arc<TenantRegistry>, audit: Arc<dyn AuditSink>) -> Self {
        Self { registry, audit }
    }

    /// Evaluate a raw (organization key, email) pair.
    ///
    /// Checks run in a fixed order; the first failing check decides the
    /// outcome and the audit record's content.
    pub fn evaluate(&self, raw_organization_key: &str, raw_email: &str) -> GateDecision {
        let organization_key = raw_organization_key.trim().to_uppercase();
        let email = raw_email.trim().to_lowercase();

        if organization_key.is_empty() {
            return self.blocked(
                "Enter your organization key.".to_string(),
                None,
                HashMap::from([("email".to_string(), email)]),
            );
        }

        if email.is_empty() {
            return self.blocked(
                "Enter your organization email address.".to_string(),
                None,
                HashMap::from([("organizationKey".to_string(), organization_key)]),
            );
        }

        let Some(tenant) = self.registry.by_organization_key(&organization_key) else {
            return self.blocked(
                "That organization key is not registered. Contact support to be added."
                    .to_string(),
                None,
                request_metadata(&organization_key, &email),
            );
        };

        if tenant.onboarding_status != OnboardingStatus::Ready {
            return self.blocked(
                format!(
                    "{} is still onboarding ({}). Please try again later or contact support.",
                    tenant.display_name,
                    tenant.onboarding_status.label()
                ),
                Some(tenant.id.clone()),
                request_metadata(&organization_key, &email),
            );
        }

        if !is_email_allowed(&email, &tenant) {
            return self.blocked(
                format!(
                    "This email domain is not authorized for {}. Use your organization email or contact support to be provisioned.",
                    tenant.display_name
                ),
                Some(tenant.id.clone()),
                request_metadata(&organization_key, &email),
            );
        }

        debug!(tenant_id = %tenant.id, organization_key = %organization_key, "login gate passed");
        self.audit.record(
            AuditCategory::Authentication,
            Some(tenant.id.clone()),
            "Login gate passed".to_string(),
            request_metadata(&organization_key, &email),
        );
        GateDecision::Allowed { tenant }
    }

    fn blocked(
        &self,
        reason: String,
        tenant_id: Option<String>,
        metadata: HashMap<String, String>,
    ) -> GateDecision {
        debug!(tenant_id = tenant_id.as_deref().unwrap_or("-"), reason = %reason, "login gate blocked");
        self.audit
            .record(AuditCategory::Onboarding, tenant_id, reason.clone(), metadata);
        GateDecision::Blocked { reason }
    }
}

fn is_email_allowed(email: &str, tenant: &Tenant) -> bool {
    match email_domain(email) {
        Some(domain) => tenant.owns_domain(domain),
        None => false,
    }
}

fn request_metadata(organization_key: &str, email: &str) -> HashMap<String, String> {
    HashMap::from([
        ("organizationKey".to_string(), organization_key.to_string()),
        ("email".to_string(), email.to_string()),
    ])
}
