use dutywire_core::audit::{ChannelAuditSink, MemoryAuditSink};
use dutywire_core::domain::{AuditCategory, OnboardingStatus, Tenant};
use dutywire_core::registry::{DomainClaimPolicy, TenantRegistry};
use dutywire_core::repository::sample_tenants;
use dutywire_core::service::{GateDecision, OnboardingGate};
use pretty_assertions::assert_eq;
use std::sync::{Arc, Mutex};

fn seeded_registry() -> Arc<TenantRegistry> {
    let registry = TenantRegistry::new(DomainClaimPolicy::Reject);
    registry.load_initial(sample_tenants()).unwrap();
    Arc::new(registry)
}

#[test]
fn test_allowed_for_ready_tenant_with_verified_domain() {
    let sink = Arc::new(MemoryAuditSink::new());
    let gate = OnboardingGate::new(seeded_registry(), sink.clone());

    // Case-insensitive match on both key and domain
    let decision = gate.evaluate("demo-pd", "officer@DEMOPD.EXAMPLE");
    match decision {
        GateDecision::Allowed { tenant } => {
            assert_eq!(tenant.id, "demo-pd");
            assert_eq!(tenant.display_name, "Demo Police Department");
        }
        GateDecision::Blocked { reason } => panic!("unexpected block: {}", reason),
    }

    let events = sink.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].category, AuditCategory::Authentication);
}

#[test]
fn test_blocked_for_unauthorized_domain() {
    let sink = Arc::new(MemoryAuditSink::new());
    let gate = OnboardingGate::new(seeded_registry(), sink.clone());

    let decision = gate.evaluate("DEMO-PD", "officer@other.example");
    match decision {
        GateDecision::Blocked { reason } => {
            assert_eq!(
                reason,
                "This email domain is not authorized for Demo Police Department. \
                 Use your organization email or contact support to be provisioned."
            );
        }
        GateDecision::Allowed { .. } => panic!("expected block"),
    }

    let events = sink.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].category, AuditCategory::Onboarding);
    assert_eq!(events[0].tenant_id.as_deref(), Some("demo-pd"));
}

#[test]
fn test_blocked_for_pending_tenant_with_correct_domain() {
    let sink = Arc::new(MemoryAuditSink::new());
    let gate = OnboardingGate::new(seeded_registry(), sink);

    let decision = gate.evaluate("ALPHA-SO", "deputy@alphaso.example");
    match decision {
        GateDecision::Blocked { reason } => {
            assert_eq!(
                reason,
                "Alpha County Sheriff's Office is still onboarding (Pending Owner Bootstrap). \
                 Please try again later or contact support."
            );
        }
        GateDecision::Allowed { .. } => panic!("expected block"),
    }
}

#[test]
fn test_missing_inputs_block_before_lookup() {
    let sink = Arc::new(MemoryAuditSink::new());
    let gate = OnboardingGate::new(seeded_registry(), sink.clone());

    let decision = gate.evaluate("", "a@b.com");
    assert_eq!(
        decision,
        GateDecision::Blocked {
            reason: "Enter your organization key.".to_string()
        }
    );

    let decision = gate.evaluate("DEMO-PD", "");
    assert_eq!(
        decision,
        GateDecision::Blocked {
            reason: "Enter your organization email address.".to_string()
        }
    );

    let decision = gate.evaluate("NOPE-XYZ", "a@b.com");
    assert_eq!(
        decision,
        GateDecision::Blocked {
            reason: "That organization key is not registered. Contact support to be added."
                .to_string()
        }
    );

    assert_eq!(sink.len(), 3);
    for event in sink.events() {
        assert_eq!(event.category, AuditCategory::Onboarding);
        assert_eq!(event.tenant_id, None);
    }
}

#[tokio::test]
async fn test_gate_with_channel_sink_flushes_on_shutdown() {
    let received = Arc::new(Mutex::new(Vec::new()));
    let captured = received.clone();
    let (sink, audit_worker) = ChannelAuditSink::spawn_with_writer(16, move |event| {
        captured.lock().unwrap().push(event);
    });

    let gate = OnboardingGate::new(seeded_registry(), Arc::new(sink));

    assert!(gate.evaluate("DEMO-PD", "officer@demopd.example").is_allowed());
    assert!(!gate.evaluate("BETA-CAMPUS", "watch@publicsafety.beta.edu").is_allowed());

    // Dropping the gate drops the last sender; the worker drains and exits.
    drop(gate);
    audit_worker.await.unwrap();

    let events = received.lock().unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].category, AuditCategory::Authentication);
    assert_eq!(events[1].category, AuditCategory::Onboarding);
}

#[test]
fn test_concurrent_evaluations_share_one_registry() {
    let registry = seeded_registry();
    let sink = Arc::new(MemoryAuditSink::new());
    let gate = Arc::new(OnboardingGate::new(registry, sink.clone()));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let gate = gate.clone();
        handles.push(std::thread::spawn(move || {
            for _ in 0..50 {
                assert!(gate.evaluate("DEMO-PD", "officer@demopd.example").is_allowed());
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(sink.len(), 8 * 50);
}

#[test]
fn test_status_transition_via_upsert_unlocks_sign_in() {
    let registry = seeded_registry();
    let sink = Arc::new(MemoryAuditSink::new());
    let gate = OnboardingGate::new(registry.clone(), sink);

    assert!(!gate.evaluate("BETA-CAMPUS", "watch@publicsafety.beta.edu").is_allowed());

    // awaitingVerification -> pendingOwnerBootstrap -> ready
    let mut beta: Tenant = registry.by_internal_id("beta-campus").unwrap();
    beta.onboarding_status = OnboardingStatus::PendingOwnerBootstrap;
    registry.upsert(beta.clone()).unwrap();
    assert!(!gate.evaluate("BETA-CAMPUS", "watch@publicsafety.beta.edu").is_allowed());

    beta.onboarding_status = OnboardingStatus::Ready;
    registry.upsert(beta).unwrap();
    assert!(gate.evaluate("BETA-CAMPUS", "watch@publicsafety.beta.edu").is_allowed());
}
