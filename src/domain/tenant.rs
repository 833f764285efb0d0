//! Tenant domain model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Onboarding lifecycle status of a tenant.
///
/// Transitions are driven by administrative upserts only; nothing in this
/// crate advances the state machine on its own. Only `Ready` permits
/// sign-in through the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum OnboardingStatus {
    #[default]
    AwaitingVerification,
    PendingOwnerBootstrap,
    Ready,
    Suspended,
}

impl OnboardingStatus {
    /// Human-readable label used in user-facing messaging.
    pub fn label(&self) -> &'static str {
        match self {
            OnboardingStatus::AwaitingVerification => "Awaiting Verification",
            OnboardingStatus::PendingOwnerBootstrap => "Pending Owner Bootstrap",
            OnboardingStatus::Ready => "Ready",
            OnboardingStatus::Suspended => "Suspended",
        }
    }
}

impl std::str::FromStr for OnboardingStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "awaitingverification" => Ok(OnboardingStatus::AwaitingVerification),
            "pendingownerbootstrap" => Ok(OnboardingStatus::PendingOwnerBootstrap),
            "ready" => Ok(OnboardingStatus::Ready),
            "suspended" => Ok(OnboardingStatus::Suspended),
            _ => Err(format!("Unknown onboarding status: {}", s)),
        }
    }
}

impl std::fmt::Display for OnboardingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OnboardingStatus::AwaitingVerification => write!(f, "awaitingVerification"),
            OnboardingStatus::PendingOwnerBootstrap => write!(f, "pendingOwnerBootstrap"),
            OnboardingStatus::Ready => write!(f, "ready"),
            OnboardingStatus::Suspended => write!(f, "suspended"),
        }
    }
}

/// Security policy knobs every tenant tracks before its users sign in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityPolicy {
    /// Whether phishing-resistant MFA is required for all users
    #[serde(default)]
    pub requires_strong_mfa: bool,
    /// How long invitations stay valid, in hours
    #[serde(default = "default_invite_expiry_hours")]
    pub invite_expiry_hours: i64,
    /// Whether users may register without an invitation
    #[serde(default)]
    pub allow_self_registration: bool,
    /// Role assigned to newly provisioned users
    #[serde(default = "default_role")]
    pub default_role: String,
}

fn default_invite_expiry_hours() -> i64 {
    24
}

fn default_role() -> String {
    "Officer".to_string()
}

impl Default for SecurityPolicy {
    fn default() -> Self {
        Self {
            requires_strong_mfa: false,
            invite_expiry_hours: default_invite_expiry_hours(),
            allow_self_registration: false,
            default_role: default_role(),
        }
    }
}

/// Tenant-specific display vocabulary for organizational terms.
///
/// Purely cosmetic; never consulted by the gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Lexicon {
    pub squad_singular: String,
    pub squad_plural: String,
    pub bureau_singular: String,
    pub bureau_plural: String,
    pub task_singular: String,
    pub task_plural: String,
}

impl Default for Lexicon {
    fn default() -> Self {
        Self {
            squad_singular: "Squad".to_string(),
            squad_plural: "Squads".to_string(),
            bureau_singular: "Bureau".to_string(),
            bureau_plural: "Bureaus".to_string(),
            task_singular: "Task".to_string(),
            task_plural: "Tasks".to_string(),
        }
    }
}

/// Tenant entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    /// Internal id, opaque and compared case-insensitively (e.g. "demo-pd")
    #[validate(length(min = 1, max = 63))]
    pub id: String,
    /// Human-chosen short code typed at sign-in (e.g. "DEMO-PD")
    #[validate(
        length(min = 1, max = 63),
        custom(function = "validate_organization_key")
    )]
    pub organization_key: String,
    #[validate(length(min = 1, max = 255))]
    pub display_name: String,
    /// Email domains this tenant has proven ownership of
    #[serde(default)]
    pub verified_domains: Vec<String>,
    /// Opaque owner identifiers; not validated here
    #[serde(default)]
    pub owner_usernames: Vec<String>,
    /// Opaque security-officer identifiers; not validated here
    #[serde(default)]
    pub security_officer_usernames: Vec<String>,
    #[serde(default)]
    pub onboarding_status: OnboardingStatus,
    #[serde(default)]
    pub security_policy: SecurityPolicy,
    #[serde(default)]
    pub lexicon: Lexicon,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tenant {
    /// Whether `domain` is a member of this tenant's verified-domain set.
    pub fn owns_domain(&self, domain: &str) -> bool {
        self.verified_domains
            .iter()
            .any(|d| d.eq_ignore_ascii_case(domain))
    }
}

impl Default for Tenant {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: String::new(),
            organization_key: String::new(),
            display_name: String::new(),
            verified_domains: Vec::new(),
            owner_usernames: Vec::new(),
            security_officer_usernames: Vec::new(),
            onboarding_status: OnboardingStatus::default(),
            security_policy: SecurityPolicy::default(),
            lexicon: Lexicon::default(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Validate organization key format (uppercase alphanumeric with hyphens)
fn validate_organization_key(key: &str) -> std::result::Result<(), validator::ValidationError> {
    if ORGANIZATION_KEY_REGEX.is_match(key) {
        Ok(())
    } else {
        Err(validator::ValidationError::new("invalid_organization_key"))
    }
}

// Regex for organization key validation
lazy_static::lazy_static! {
    pub static ref ORGANIZATION_KEY_REGEX: regex::Regex =
        regex::Regex::new(r"^[A-Z0-9]+(?:-[A-Z0-9]+)*$").unwrap();
}
