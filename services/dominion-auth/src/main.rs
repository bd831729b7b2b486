//! dominion-auth - mint and inspect Codex Dominion tokens
//!
//! Uses the same environment configuration as the services, so a token
//! issued here verifies wherever the same key pair is deployed.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dominion_auth::guard::require_any_role;
use dominion_auth::observability::init_tracing;
use dominion_auth::{AuthError, Config, IssueRequest, TokenIssuer, TokenVerifier};
use tracing::info;

/// dominion-auth - token issuance and verification
#[derive(Parser, Debug)]
#[command(name = "dominion-auth")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Issue a token signed with the primary key
    Issue {
        /// Principal identifier
        #[arg(long)]
        subject: String,

        /// Role to grant (repeatable)
        #[arg(long = "role", required = true)]
        roles: Vec<String>,

        /// Email claim
        #[arg(long)]
        email: Option<String>,

        /// Display name claim
        #[arg(long)]
        display_name: Option<String>,

        /// Lifetime in minutes (defaults to DOMINION_TOKEN_EXPIRY_MINUTES)
        #[arg(long)]
        expiry_minutes: Option<u32>,
    },

    /// Verify a token and print the identity as JSON
    Verify {
        /// Token to verify
        token: String,
    },

    /// Verify a token and require one of the given roles
    Check {
        /// Token to verify
        token: String,

        /// Accepted role (repeatable)
        #[arg(long = "role", required = true)]
        roles: Vec<String>,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = Config::from_env().context("failed to load configuration")?;
    init_tracing(&config.tracing);

    let keys = Arc::new(config.signing_keys());
    if keys.is_single_key() {
        info!("Primary and secondary keys are identical; no rotation in progress");
    }

    match cli.command {
        Commands::Issue {
            subject,
            roles,
            email,
            display_name,
            expiry_minutes,
        } => {
            let mut request = IssueRequest::new(subject, roles);
            if let Some(email) = email {
                request = request.email(email);
            }
            if let Some(display_name) = display_name {
                request = request.display_name(display_name);
            }
            if let Some(minutes) = expiry_minutes {
                request = request.expiry_minutes(minutes);
            }

            let issuer = TokenIssuer::from_config(&config, keys);
            match issuer.issue_token(request) {
                Ok(token) => {
                    println!("{token}");
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => Ok(report(&e)),
            }
        }
        Commands::Verify { token } => {
            let verifier = TokenVerifier::new(keys);
            match verifier.verify_token(token.trim()) {
                Ok(identity) => {
                    println!("{}", serde_json::to_string_pretty(&identity)?);
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => Ok(report(&e)),
            }
        }
        Commands::Check { token, roles } => {
            let verifier = TokenVerifier::new(keys);
            let outcome = verifier.verify_token(token.trim()).and_then(|identity| {
                require_any_role(&identity, &roles)?;
                Ok(identity)
            });
            match outcome {
                Ok(identity) => {
                    println!("allowed: {}", identity.subject());
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => Ok(report(&e)),
            }
        }
    }
}

fn report(error: &AuthError) -> ExitCode {
    let code = error.code();
    eprintln!("{}: {}", code.as_str(), error.client_message());
    if code.http_status() == 403 {
        ExitCode::from(3)
    } else if code.http_status() == 401 {
        ExitCode::from(2)
    } else {
        ExitCode::FAILURE
    }
}
