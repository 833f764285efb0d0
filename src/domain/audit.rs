//! Audit event shape shared by the gate and the audit sink

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Category of an audit event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditCategory {
    Authentication,
    Onboarding,
    Roster,
    System,
}

impl std::fmt::Display for AuditCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuditCategory::Authentication => write!(f, "authentication"),
            AuditCategory::Onboarding => write!(f, "onboarding"),
            AuditCategory::Roster => write!(f, "roster"),
            AuditCategory::System => write!(f, "system"),
        }
    }
}

/// Immutable record of a gate decision or administrative action.
///
/// Created once, then owned entirely by whichever sink accepted it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub category: AuditCategory,
    pub tenant_id: Option<String>,
    pub message: String,
    pub metadata: HashMap<String, String>,
}

impl AuditEvent {
    pub fn new(
        category: AuditCategory,
        tenant_id: Option<String>,
        message: String,
        metadata: HashMap<String, String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            category,
            tenant_id,
            message,
            metadata,
        }
    }
}
