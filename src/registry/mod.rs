//! In-memory tenant registry with derived lookup indexes
//!
//! The registry owns the authoritative set of tenant records plus three
//! point-lookup indexes (organization key, internal id, verified email
//! domain). Writers rebuild a complete snapshot off to the side and
//! publish it with a single atomic swap, so readers always observe either
//! the old or the new index set and never block.

use crate::domain::Tenant;
use crate::error::{AppError, Result};
use arc_swap::ArcSwap;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use validator::Validate;

/// What happens when an upsert claims a verified domain already indexed
/// to a different tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DomainClaimPolicy {
    /// Fail the upsert with a conflict error; nothing is published.
    #[default]
    Reject,
    /// Last write wins; the later record silently takes the domain.
    Overwrite,
}

impl std::str::FromStr for DomainClaimPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "reject" => Ok(DomainClaimPolicy::Reject),
            "overwrite" => Ok(DomainClaimPolicy::Overwrite),
            _ => Err(format!("Unknown domain claim policy: {}", s)),
        }
    }
}

/// One consistent view of the registry: records plus fully built indexes.
/// Index keys are lowercased; values index into `records`.
struct Snapshot {
    records: Vec<Tenant>,
    by_organization_key: HashMap<String, usize>,
    by_internal_id: HashMap<String, usize>,
    by_verified_domain: HashMap<String, usize>,
}

impl Snapshot {
    fn empty() -> Self {
        Self {
            records: Vec::new(),
            by_organization_key: HashMap::new(),
            by_internal_id: HashMap::new(),
            by_verified_domain: HashMap::new(),
        }
    }

    /// Build indexes over `records`. Organization keys and internal ids
    /// are last-write-wins; verified domains follow `policy`.
    fn build(records: Vec<Tenant>, policy: DomainClaimPolicy) -> Result<Self> {
        let mut by_organization_key = HashMap::with_capacity(records.len());
        let mut by_internal_id = HashMap::with_capacity(records.len());
        let mut by_verified_domain = HashMap::new();

        for (position, tenant) in records.iter().enumerate() {
            by_organization_key.insert(tenant.organization_key.to_lowercase(), position);
            by_internal_id.insert(tenant.id.to_lowercase(), position);

            for domain in &tenant.verified_domains {
                let key = domain.to_lowercase();
                if let Some(&claimed) = by_verified_domain.get(&key) {
                    let holder: &Tenant = &records[claimed];
                    if policy == DomainClaimPolicy::Reject
                        && !holder.id.eq_ignore_ascii_case(&tenant.id)
                    {
                        return Err(AppError::Conflict(format!(
                            "Domain '{}' is already claimed by tenant '{}'",
                            domain, holder.id
                        )));
                    }
                }
                by_verified_domain.insert(key, position);
            }
        }

        Ok(Self {
            records,
            by_organization_key,
            by_internal_id,
            by_verified_domain,
        })
    }
}

/// Authoritative in-memory tenant store.
///
/// Constructed once at process start and passed by reference into the
/// gate; there is no global instance.
pub struct TenantRegistry {
    snapshot: ArcSwap<Snapshot>,
    /// Serializes writers; readers never take it.
    write_lock: Mutex<()>,
    domain_claim_policy: DomainClaimPolicy,
}

impl TenantRegistry {
    pub fn new(domain_claim_policy: DomainClaimPolicy) -> Self {
        Self {
            snapshot: ArcSwap::from_pointee(Snapshot::empty()),
            write_lock: Mutex::new(()),
            domain_claim_policy,
        }
    }

    /// Seed the registry from a persistence collaborator's full record
    /// set, replacing whatever was loaded before.
    pub fn load_initial(&self, records: Vec<Tenant>) -> Result<()> {
        for tenant in &records {
            tenant.validate()?;
        }
        let _guard = self.write_lock.lock().expect("registry write lock poisoned");
        let next = Snapshot::build(records, self.domain_claim_policy)?;
        self.snapshot.store(Arc::new(next));
        Ok(())
    }

    /// Insert a new record or replace the record with a matching internal
    /// id (case-insensitive), then rebuild and publish all indexes.
    pub fn upsert(&self, tenant: Tenant) -> Result<()> {
        tenant.validate()?;
        let _guard = self.write_lock.lock().expect("registry write lock poisoned");

        let mut records = self.snapshot.load().records.clone();
        match records
            .iter()
            .position(|existing| existing.id.eq_ignore_ascii_case(&tenant.id))
        {
            Some(position) => records[position] = tenant,
            None => records.push(tenant),
        }

        let next = Snapshot::build(records, self.domain_claim_policy)?;
        self.snapshot.store(Arc::new(next));
        Ok(())
    }

    /// Case-insensitive exact match on organization key.
    pub fn by_organization_key(&self, key: &str) -> Option<Tenant> {
        let snapshot = self.snapshot.load();
        snapshot
            .by_organization_key
            .get(&key.to_lowercase())
            .map(|&position| snapshot.records[position].clone())
    }

    /// Case-insensitive exact match on internal id.
    pub fn by_internal_id(&self, id: &str) -> Option<Tenant> {
        let snapshot = self.snapshot.load();
        snapshot
            .by_internal_id
            .get(&id.to_lowercase())
            .map(|&position| snapshot.records[position].clone())
    }

    /// Case-insensitive exact match on a verified email domain.
    pub fn by_verified_domain(&self, domain: &str) -> Option<Tenant> {
        let snapshot = self.snapshot.load();
        snapshot
            .by_verified_domain
            .get(&domain.to_lowercase())
            .map(|&position| snapshot.records[position].clone())
    }

    /// Resolve a tenant by organization key, then internal id, then the
    /// domain of `email`. First match wins; when more than one identifier
    /// is supplied the results are deliberately not cross-checked for
    /// agreement.
    pub fn resolve(
        &self,
        organization_key: Option<&str>,
        internal_id: Option<&str>,
        email: Option<&str>,
    ) -> Option<Tenant> {
        if let Some(key) = organization_key {
            if let Some(tenant) = self.by_organization_key(key) {
                return Some(tenant);
            }
        }
        if let Some(id) = internal_id {
            if let Some(tenant) = self.by_internal_id(id) {
                return Some(tenant);
            }
        }
        if let Some(domain) = email.and_then(email_domain) {
            if let Some(tenant) = self.by_verified_domain(domain) {
                return Some(tenant);
            }
        }
        None
    }

    /// Point-in-time listing of all records.
    pub fn tenants(&self) -> Vec<Tenant> {
        self.snapshot.load().records.clone()
    }

    pub fn len(&self) -> usize {
        self.snapshot.load().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The substring strictly after the last `@`, if any.
pub fn email_domain(email: &str) -> Option<&str> {
    email.rsplit_once('@').map(|(_, domain)| domain)
}
