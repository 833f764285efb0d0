use dutywire_core::domain::{OnboardingStatus, Tenant};
use dutywire_core::registry::{DomainClaimPolicy, TenantRegistry};
use dutywire_core::repository::{sample_tenants, JsonFileSource, TenantSource};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use uuid::Uuid;

#[test]
fn test_seeded_lookups() {
    let registry = TenantRegistry::new(DomainClaimPolicy::Reject);
    registry.load_initial(sample_tenants()).unwrap();

    assert_eq!(registry.len(), 3);

    let demo = registry.by_organization_key("DEMO-PD").unwrap();
    assert_eq!(demo.id, "demo-pd");
    assert_eq!(demo.onboarding_status, OnboardingStatus::Ready);

    let alpha = registry.by_internal_id("ALPHA-SHERIFF").unwrap();
    assert_eq!(alpha.organization_key, "ALPHA-SO");
    assert_eq!(alpha.lexicon.squad_singular, "Platoon");

    let beta = registry.by_verified_domain("PublicSafety.Beta.EDU").unwrap();
    assert_eq!(beta.id, "beta-campus");
}

#[test]
fn test_readers_see_complete_snapshots_during_writes() {
    let registry = Arc::new(TenantRegistry::new(DomainClaimPolicy::Overwrite));
    registry.load_initial(sample_tenants()).unwrap();

    let writer = {
        let registry = registry.clone();
        std::thread::spawn(move || {
            for round in 0..200 {
                let mut demo = registry.by_internal_id("demo-pd").unwrap();
                demo.display_name = format!("Demo Police Department #{}", round);
                registry.upsert(demo).unwrap();
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let registry = registry.clone();
            std::thread::spawn(move || {
                for _ in 0..500 {
                    // Key and domain index must always agree on one record.
                    let by_key = registry.by_organization_key("DEMO-PD").unwrap();
                    let by_domain = registry.by_verified_domain("demopd.example").unwrap();
                    assert_eq!(by_key.id, "demo-pd");
                    assert_eq!(by_domain.id, "demo-pd");
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }

    let last = registry.by_internal_id("demo-pd").unwrap();
    assert_eq!(last.display_name, "Demo Police Department #199");
}

#[tokio::test]
async fn test_seed_from_json_file_source() {
    let path = std::env::temp_dir().join(format!("dutywire-seed-{}.json", Uuid::new_v4()));
    let raw = serde_json::to_string_pretty(&sample_tenants()).unwrap();
    tokio::fs::write(&path, raw).await.unwrap();

    let source = JsonFileSource::new(&path);
    let registry = TenantRegistry::new(DomainClaimPolicy::Reject);
    registry.load_initial(source.load_all().await.unwrap()).unwrap();

    assert_eq!(registry.len(), 3);
    assert!(registry.by_organization_key("BETA-CAMPUS").is_some());

    // Write-through upsert lands in both the file and the registry.
    let mut beta: Tenant = registry.by_internal_id("beta-campus").unwrap();
    beta.onboarding_status = OnboardingStatus::Ready;
    registry.upsert(beta.clone()).unwrap();
    source.upsert_one(&beta).await.unwrap();

    let reloaded = source.load_all().await.unwrap();
    let beta_reloaded = reloaded.iter().find(|t| t.id == "beta-campus").unwrap();
    assert_eq!(beta_reloaded.onboarding_status, OnboardingStatus::Ready);

    tokio::fs::remove_file(&path).await.unwrap();
}

#[test]
fn test_domain_claim_rejected_across_tenants() {
    let registry = TenantRegistry::new(DomainClaimPolicy::Reject);
    registry.load_initial(sample_tenants()).unwrap();

    let mut claimer = registry.by_internal_id("alpha-sheriff").unwrap();
    claimer.verified_domains.push("demopd.example".to_string());

    assert!(registry.upsert(claimer).is_err());
    // The earlier claim still stands.
    assert_eq!(
        registry.by_verified_domain("demopd.example").unwrap().id,
        "demo-pd"
    );
}
