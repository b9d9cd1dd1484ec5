//! `introcheck validate`: check the single-episode intro endpoint against the
//! version 1 response schema.

use std::time::Instant;

use chrono::Utc;
use introcheck_client::ServerClient;
use introcheck_report::format::{format_elapsed, format_timestamp};
use introcheck_report::validate_payload;

use crate::exit_codes::EXIT_SCHEMA_VIOLATION;
use crate::CliError;

/// API versions every episode is checked with: implicit, then explicit.
const VERSIONS: [(&str, &str); 2] = [("implicitly versioned", ""), ("explicitly versioned", "v1")];

pub struct ValidateArgs {
    pub address: String,
    pub api_key: String,
    pub ids: Vec<String>,
}

/// Trim ids and drop empty entries left by stray commas.
pub fn clean_ids(ids: Vec<String>) -> Vec<String> {
    ids.into_iter()
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .collect()
}

pub fn run(args: ValidateArgs) -> Result<usize, CliError> {
    let ids = clean_ids(args.ids);
    if ids.is_empty() {
        return Err(CliError::usage("no episode ids to validate")
            .with_hint("introcheck validate --address http://127.0.0.1:8096 --key KEY id1,id2"));
    }

    let started = Instant::now();
    println!("Started at:  {}", format_timestamp(&Utc::now()));
    println!("Address:     {}", args.address);
    println!();

    let client = ServerClient::new(&args.address, &args.api_key).map_err(CliError::client)?;
    let info = client.server_info().map_err(CliError::client)?;
    println!();

    println!("Jellyfin OS:      {}", info.operating_system);
    println!("Jellyfin version: {}", info.version);
    println!();

    for id in &ids {
        log::info!("[+] Validating item {}", id);
        for (label, version) in VERSIONS {
            log::info!("  [+] Validating API v1 ({})", label);
            let body = client.intro_timestamps(id, version).map_err(CliError::client)?;
            validate_payload(id, &body).map_err(|e| CliError {
                code: EXIT_SCHEMA_VIOLATION,
                message: e.to_string(),
                hint: Some(format!(
                    "response from /Episode/{}/IntroTimestamps/{} ({})",
                    id, version, label
                )),
            })?;
        }
    }

    println!("Validated {} items in {}", ids.len(), format_elapsed(started.elapsed()));
    Ok(ids.len())
}
