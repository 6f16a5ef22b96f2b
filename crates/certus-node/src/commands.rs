//! CLI subcommands mapping 1:1 onto the registry's public operations.
//!
//! Each invocation is one call against the local data directory at the
//! height passed on the command line; responses are printed as JSON.

use anyhow::{anyhow, Context};
use clap::Subcommand;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

use certus_analytics::{AnalyticsEngine, AnalyticsError, BatchQuery};
use certus_core::{AccountId, ClockSource, DocumentHash, Height, KycLevel, ManualClock, RequestId};
use certus_registry::{KycRegistry, RegistryError};

use crate::config::CertusConfig;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write a default configuration file and exit.
    Init,

    /// Register the caller's identity at level 0.
    Register {
        #[arg(long)]
        caller: AccountId,
        /// 32-byte document digest, hex-encoded.
        #[arg(long)]
        document_hash: DocumentHash,
    },

    /// Submit a verification request for the caller.
    Submit {
        #[arg(long)]
        caller: AccountId,
        /// Requested tier (1..=3).
        #[arg(long)]
        level: u8,
        /// 32-byte document digest, hex-encoded.
        #[arg(long)]
        document_hash: DocumentHash,
        /// Free-form context, at most 256 bytes.
        #[arg(long, default_value = "")]
        metadata: String,
    },

    /// Approve a pending request as an authorized verifier.
    Approve {
        #[arg(long)]
        caller: AccountId,
        #[arg(long)]
        user: AccountId,
        #[arg(long)]
        request_id: RequestId,
    },

    /// Grant or refresh a verifier's authorization (owner only).
    AuthorizeVerifier {
        #[arg(long)]
        caller: AccountId,
        #[arg(long)]
        verifier: AccountId,
        /// Highest tier the verifier may approve (1..=3).
        #[arg(long)]
        max_level: u8,
    },

    /// Pause all mutating operations (owner only).
    Pause {
        #[arg(long)]
        caller: AccountId,
    },

    /// Resume mutating operations (owner only).
    Resume {
        #[arg(long)]
        caller: AccountId,
    },

    /// Show registry-wide state.
    Status,

    /// Look up an identity record.
    Identity {
        #[arg(long)]
        user: AccountId,
    },

    /// Look up a pending request.
    Request {
        #[arg(long)]
        user: AccountId,
        #[arg(long)]
        request_id: RequestId,
    },

    /// Check whether a user holds a valid verification at a minimum tier.
    HasValidKyc {
        #[arg(long)]
        user: AccountId,
        #[arg(long)]
        min_level: u8,
    },

    /// Check whether an account is an authorized verifier.
    IsVerifier {
        #[arg(long)]
        verifier: AccountId,
    },

    /// Run batch compliance analytics (owner or verifier only).
    Analytics {
        #[arg(long)]
        caller: AccountId,
        /// Comma-separated list of up to 10 users.
        #[arg(long, value_delimiter = ',')]
        users: Vec<AccountId>,
        /// Operation tag: RENEWAL_ALERT, COMPLIANCE_CHECK, or anything else
        /// for a plain summary.
        #[arg(long, default_value = "SUMMARY")]
        operation: String,
        #[arg(long, default_value_t = 1)]
        min_level: u8,
        #[arg(long)]
        include_expired: bool,
    },

    /// Compute the BLAKE3 digest of a local document.
    HashDocument {
        /// Path to the document file.
        path: PathBuf,
    },
}

#[derive(Debug, Serialize)]
struct SubmitResponse {
    user: AccountId,
    request_id: RequestId,
}

#[derive(Debug, Serialize)]
struct StatusResponse {
    owner: AccountId,
    active: bool,
    next_request_id: RequestId,
    height: Height,
}

#[derive(Debug, Serialize)]
struct ValidityResponse {
    user: AccountId,
    min_level: KycLevel,
    valid: bool,
}

#[derive(Debug, Serialize)]
struct VerifierResponse {
    verifier: AccountId,
    authorized: bool,
}

#[derive(Debug, Serialize)]
struct HashResponse {
    path: PathBuf,
    document_hash: String,
}

/// Execute a subcommand against the configured registry.
pub fn execute(command: Command, config: &CertusConfig, height: Height) -> anyhow::Result<()> {
    let registry = open_registry(config, height)?;

    match command {
        // handled in main before the registry is opened
        Command::Init => unreachable!("init is handled by the entry point"),

        Command::Register {
            caller,
            document_hash,
        } => {
            registry
                .register(&caller, document_hash)
                .map_err(registry_err)?;
            print_json(&registry.identity(&caller)?)
        }

        Command::Submit {
            caller,
            level,
            document_hash,
            metadata,
        } => {
            let level = KycLevel::from_u8(level).map_err(RegistryError::from).map_err(registry_err)?;
            let request_id = registry
                .submit_request(&caller, level, document_hash, &metadata)
                .map_err(registry_err)?;
            print_json(&SubmitResponse {
                user: caller,
                request_id,
            })
        }

        Command::Approve {
            caller,
            user,
            request_id,
        } => {
            registry
                .approve(&caller, &user, request_id)
                .map_err(registry_err)?;
            print_json(&registry.identity(&user)?)
        }

        Command::AuthorizeVerifier {
            caller,
            verifier,
            max_level,
        } => {
            let max_level =
                KycLevel::from_u8(max_level).map_err(RegistryError::from).map_err(registry_err)?;
            registry
                .authorize_verifier(&caller, &verifier, max_level)
                .map_err(registry_err)?;
            print_json(&registry.verifier_grant(&verifier)?)
        }

        Command::Pause { caller } => {
            registry.set_paused(&caller, true).map_err(registry_err)?;
            print_json(&serde_json::json!({ "active": false }))
        }

        Command::Resume { caller } => {
            registry.set_paused(&caller, false).map_err(registry_err)?;
            print_json(&serde_json::json!({ "active": true }))
        }

        Command::Status => print_json(&StatusResponse {
            owner: registry.owner().clone(),
            active: registry.is_active()?,
            next_request_id: registry.next_request_id()?,
            height: registry.current_height(),
        }),

        Command::Identity { user } => print_json(&registry.identity(&user)?),

        Command::Request { user, request_id } => {
            print_json(&registry.pending_request(&user, request_id)?)
        }

        Command::HasValidKyc { user, min_level } => {
            let min_level =
                KycLevel::from_u8(min_level).map_err(RegistryError::from).map_err(registry_err)?;
            let valid = registry.has_valid_kyc(&user, min_level)?;
            print_json(&ValidityResponse {
                user,
                min_level,
                valid,
            })
        }

        Command::IsVerifier { verifier } => {
            let authorized = registry.is_authorized_verifier(&verifier)?;
            print_json(&VerifierResponse {
                verifier,
                authorized,
            })
        }

        Command::Analytics {
            caller,
            users,
            operation,
            min_level,
            include_expired,
        } => {
            let engine = AnalyticsEngine::new(registry);
            let query = BatchQuery {
                users,
                operation,
                min_level,
                include_expired,
            };
            let report = engine.run(&caller, &query).map_err(analytics_err)?;
            print_json(&report)
        }

        Command::HashDocument { path } => {
            let contents = std::fs::read(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let hash = DocumentHash::digest(&contents);
            print_json(&HashResponse {
                path,
                document_hash: hash.to_hex(),
            })
        }
    }
}

fn open_registry(config: &CertusConfig, height: Height) -> anyhow::Result<Arc<KycRegistry>> {
    let owner = AccountId::new(config.registry.owner.clone())
        .context("invalid owner account in configuration")?;
    let clock = Arc::new(ManualClock::new(height)) as Arc<dyn ClockSource>;
    let registry = KycRegistry::open(&config.registry.data_dir, owner, clock)?;
    Ok(Arc::new(registry))
}

/// Prefix domain failures with their stable numeric code.
fn registry_err(err: RegistryError) -> anyhow::Error {
    match err.code() {
        Some(code) => anyhow!("[{code}] {err}"),
        None => err.into(),
    }
}

fn analytics_err(err: AnalyticsError) -> anyhow::Error {
    match err.code() {
        Some(code) => anyhow!("[{code}] {err}"),
        None => err.into(),
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
