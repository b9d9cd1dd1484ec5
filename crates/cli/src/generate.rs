//! `introcheck generate`: capture every intro from a live server into a report file.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use introcheck_client::{PollSchedule, ServerClient, Spinner};
use introcheck_report::format::format_timestamp;
use introcheck_report::ReportCollection;

use crate::settings::Settings;
use crate::CliError;

pub struct GenerateArgs {
    pub address: String,
    pub api_key: String,
    pub keep: bool,
    pub poll: Duration,
    pub output: Option<PathBuf>,
}

/// `intros-<host>-<unix>.json`, with the scheme dropped and path separators
/// made filesystem safe.
pub fn default_report_name(address: &str, unix: i64) -> String {
    let host = address
        .trim_end_matches('/')
        .replace("http://", "")
        .replace("https://", "")
        .replace('/', "_");
    format!("intros-{}-{}.json", host, unix)
}

pub fn run(args: GenerateArgs, settings: &Settings) -> Result<PathBuf, CliError> {
    let started_at = Utc::now();

    let destination = args.output.unwrap_or_else(|| {
        settings.output_path(&default_report_name(&args.address, started_at.timestamp()))
    });

    // Fail before touching the server if the report cannot be written.
    write_private(&destination, b"")?;

    println!("Started at:  {}", format_timestamp(&started_at));
    println!("Address:     {}", args.address);
    println!("Destination: {}", destination.display());
    println!();

    let client = ServerClient::new(&args.address, &args.api_key).map_err(CliError::client)?;
    let info = client.server_info().map_err(CliError::client)?;
    let config = client.plugin_configuration().map_err(CliError::client)?;
    println!();

    println!("Jellyfin OS:       {}", info.operating_system);
    println!("Jellyfin version:  {}", info.version);
    println!("Analysis settings: {}", config.analysis_settings());
    println!("Introduction reqs: {}", config.introduction_requirements());
    println!("Erase timestamps:  {}", !args.keep);
    println!();

    if args.keep {
        log::info!("[+] Using previously discovered intros");
    } else {
        analyze(&client, args.poll)?;
    }

    log::info!("[+] Saving intros");
    let intros = client.all_intros().map_err(CliError::client)?;

    log::info!("[+] Saving report");
    let report = ReportCollection::new(
        client.address(),
        started_at,
        Utc::now(),
        info,
        config,
        intros,
    );
    write_report(&destination, &report)?;

    log::info!("[+] Done");
    println!("Episodes saved:    {}", report.intros.len());
    Ok(destination)
}

fn analyze(client: &ServerClient, poll: Duration) -> Result<(), CliError> {
    client.erase_timestamps().map_err(CliError::client)?;
    let task_id = client.start_analysis_task().map_err(CliError::client)?;

    let mut spinner = Spinner::new();
    let stderr = io::stderr();
    let mut out = stderr.lock();
    client
        .wait_for_task(task_id, PollSchedule::every(poll), &mut spinner, &mut out)
        .map_err(CliError::client)?;
    Ok(())
}

/// Serialize and write the report with owner-only permissions.
pub fn write_report(path: &Path, report: &ReportCollection) -> Result<(), CliError> {
    let json = report
        .to_json()
        .map_err(|e| CliError::general(format!("cannot serialize report: {}", e)))?;
    write_private(path, json.as_bytes())
}

/// Create or truncate `path` and write `contents`, mode `0600` on Unix.
pub fn write_private(path: &Path, contents: &[u8]) -> Result<(), CliError> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let io_err = |e: io::Error| {
        CliError::general(format!("cannot write {}: {}", path.display(), e))
            .with_hint("check that the destination directory exists and is writable")
    };
    let mut file = options.open(path).map_err(io_err)?;
    file.write_all(contents).map_err(io_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_name_strips_scheme() {
        assert_eq!(
            default_report_name("http://127.0.0.1:8096", 1654387267),
            "intros-127.0.0.1:8096-1654387267.json"
        );
        assert_eq!(
            default_report_name("https://media.example.com/jellyfin/", 7),
            "intros-media.example.com_jellyfin-7.json"
        );
    }

    #[test]
    fn written_file_is_private() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("r.json");
        write_private(&path, b"{}").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"{}");

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[test]
    fn unwritable_destination_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = write_private(&dir.path().join("missing/r.json"), b"").unwrap_err();
        assert!(err.message.starts_with("cannot write"));
        assert!(err.hint.is_some());
    }
}
