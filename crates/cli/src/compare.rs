//! `introcheck compare`: reconcile two saved reports into an HTML (or JSON) page.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::Utc;
use introcheck_report::format::{format_elapsed, format_timestamp};
use introcheck_report::{compare, CollectionIndex, CollectionSummary, ReportCollection};

use crate::exit_codes::EXIT_REGRESSION;
use crate::generate::write_private;
use crate::html;
use crate::settings::Settings;
use crate::CliError;

pub struct CompareArgs {
    pub old: PathBuf,
    pub new: PathBuf,
    pub output: Option<PathBuf>,
    pub json: bool,
    pub fail_on_regression: bool,
}

pub fn default_page_name(unix: i64, json: bool) -> String {
    let ext = if json { "json" } else { "html" };
    format!("report-{}.{}", unix, ext)
}

pub fn load_report(path: &Path) -> Result<ReportCollection, CliError> {
    let label = path.display().to_string();
    let bytes = fs::read(path).map_err(|e| {
        CliError::report_input(format!("cannot read report {}: {}", label, e))
    })?;
    ReportCollection::from_json(&label, &bytes).map_err(CliError::report)
}

pub fn run(args: CompareArgs, settings: &Settings) -> Result<PathBuf, CliError> {
    let started = Instant::now();
    let started_at = Utc::now();

    let destination = args.output.unwrap_or_else(|| {
        settings.output_path(&default_page_name(started_at.timestamp(), args.json))
    });

    println!("Started at:    {}", format_timestamp(&started_at));
    println!("First report:  {}", args.old.display());
    println!("Second report: {}", args.new.display());
    println!("Destination:   {}", destination.display());
    println!();

    let old = load_report(&args.old)?;
    let new = load_report(&args.new)?;
    let old_index = CollectionIndex::build(&old);
    let new_index = CollectionIndex::build(&new);

    for index in [&old_index, &new_index] {
        let duplicates: Vec<&str> = index.duplicates().collect();
        if !duplicates.is_empty() {
            log::warn!(
                "{} repeats episode ids {}; the last record of each is compared",
                index.collection().source,
                duplicates.join(", ")
            );
        }
        println!("{}", CollectionSummary::from_index(index));
        println!();
    }

    log::info!("[+] Comparing reports");
    let report = compare(&old_index, &new_index);

    let page = if args.json {
        serde_json::to_string_pretty(&report)
            .map_err(|e| CliError::general(format!("cannot serialize comparison: {}", e)))?
    } else {
        html::render(&report)
            .map_err(|e| CliError::general(format!("cannot render comparison: {}", e)))?
    };
    write_private(&destination, page.as_bytes())?;

    println!("{}", report.counts);
    log::info!(
        "[+] Reports successfully compared in {}",
        format_elapsed(started.elapsed())
    );

    let regressions = report.counts.regressions();
    if args.fail_on_regression && regressions > 0 {
        return Err(CliError {
            code: EXIT_REGRESSION,
            message: format!(
                "{} regressions ({} only previous, {} different)",
                regressions, report.counts.only_previous, report.counts.different
            ),
            hint: Some(format!("see {}", destination.display())),
        });
    }

    Ok(destination)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exit_codes::EXIT_REPORT_INPUT;

    #[test]
    fn page_names() {
        assert_eq!(default_page_name(1654387267, false), "report-1654387267.html");
        assert_eq!(default_page_name(5, true), "report-5.json");
    }

    #[test]
    fn missing_report_is_input_error() {
        let err = load_report(Path::new("/nonexistent/report.json")).unwrap_err();
        assert_eq!(err.code, EXIT_REPORT_INPUT);
    }

    #[test]
    fn malformed_report_is_input_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{\"Intros\": [").unwrap();
        let err = load_report(&path).unwrap_err();
        assert_eq!(err.code, EXIT_REPORT_INPUT);
        assert!(err.message.contains("bad.json"));
    }
}
