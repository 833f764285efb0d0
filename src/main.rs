use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use dutywire_core::audit::ChannelAuditSink;
use dutywire_core::config::Config;
use dutywire_core::domain::Tenant;
use dutywire_core::registry::TenantRegistry;
use dutywire_core::repository::{sample_tenants, JsonFileSource, TenantSource};
use dutywire_core::service::{GateDecision, OnboardingGate};
use dutywire_core::telemetry;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "dutywire-core", about = "Tenant onboarding gate for DutyWire")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Evaluate a sign-in attempt against the onboarding gate
    Evaluate {
        /// Organization key as typed at sign-in
        #[arg(long)]
        organization_key: String,
        /// Email address as typed at sign-in
        #[arg(long)]
        email: String,
    },
    /// Resolve a tenant by organization key, internal id, or email domain
    Resolve {
        #[arg(long)]
        organization_key: Option<String>,
        #[arg(long)]
        internal_id: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    /// List the tenants loaded into the registry
    List,
    /// Insert or replace one tenant record from a JSON file
    Upsert {
        /// Path to a file holding a single tenant record
        #[arg(long)]
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    telemetry::init(&config.telemetry);

    let registry = Arc::new(TenantRegistry::new(config.registry.domain_claim_policy));
    let seed_source = config
        .registry
        .seed_path
        .as_ref()
        .map(|path| JsonFileSource::new(path.clone()));

    let records = match &seed_source {
        Some(source) => source
            .load_all()
            .await
            .context("Failed to load tenant seed file")?,
        None => sample_tenants(),
    };
    registry.load_initial(records)?;
    info!(tenants = registry.len(), "Tenant registry seeded");

    match cli.command {
        Command::Evaluate {
            organization_key,
            email,
        } => {
            let (sink, audit_worker) = ChannelAuditSink::new(config.audit.queue_capacity);
            let gate = OnboardingGate::new(registry, Arc::new(sink));

            let decision = gate.evaluate(&organization_key, &email);
            let blocked = !decision.is_allowed();
            match decision {
                GateDecision::Allowed { tenant } => {
                    println!("Allowed: {} ({})", tenant.display_name, tenant.id);
                }
                GateDecision::Blocked { reason } => {
                    println!("Blocked: {}", reason);
                }
            }

            // Drop the last sender so the worker drains and exits.
            drop(gate);
            audit_worker.await?;

            if blocked {
                std::process::exit(1);
            }
        }
        Command::Resolve {
            organization_key,
            internal_id,
            email,
        } => {
            let found = registry.resolve(
                organization_key.as_deref(),
                internal_id.as_deref(),
                email.as_deref(),
            );
            match found {
                Some(tenant) => println!(
                    "{} ({}) key={} status={}",
                    tenant.display_name, tenant.id, tenant.organization_key,
                    tenant.onboarding_status
                ),
                None => {
                    println!("No tenant matched");
                    std::process::exit(1);
                }
            }
        }
        Command::List => {
            for tenant in registry.tenants() {
                println!(
                    "{:<14} {:<12} {:<22} {}",
                    tenant.organization_key,
                    tenant.onboarding_status,
                    tenant.id,
                    tenant.verified_domains.join(",")
                );
            }
        }
        Command::Upsert { file } => {
            let Some(source) = seed_source else {
                bail!("DUTYWIRE_TENANT_SEED_PATH is required for upsert");
            };
            let raw = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let tenant: Tenant = serde_json::from_str(&raw)?;

            registry.upsert(tenant.clone())?;
            source.upsert_one(&tenant).await?;
            info!(tenant_id = %tenant.id, "Tenant upserted");
            println!("Upserted {} ({})", tenant.display_name, tenant.id);
        }
    }

    Ok(())
}
