//! Self-contained HTML rendering of a comparison.

use std::fmt::{self, Write};

use introcheck_report::engine::{ComparisonReport, SeasonSection};
use introcheck_report::summary::CollectionSummary;
use introcheck_report::{Classification, IntroRecord, ReconciliationPair};

const STYLE: &str = "\
body { font-family: sans-serif; margin: 2em; color: #222; }
table { border-collapse: collapse; margin-bottom: 1.5em; }
th, td { border: 1px solid #ccc; padding: 0.3em 0.6em; text-align: left; }
th { background: #f2f2f2; }
.summary { display: flex; gap: 3em; }
.okay { background: #e6f4e6; }
.improvement { background: #dff0ff; }
.missing { background: #f4f4f4; color: #777; }
.different { background: #fff3d6; }
.only_previous { background: #fde2e2; }
details > summary { cursor: pointer; font-weight: bold; margin: 0.5em 0; }";

/// Escape text for use in element content and double-quoted attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn render(report: &ComparisonReport<'_>) -> Result<String, fmt::Error> {
    let mut html = String::new();
    write_document(&mut html, report)?;
    Ok(html)
}

fn write_document(html: &mut String, report: &ComparisonReport<'_>) -> fmt::Result {
    writeln!(html, "<!DOCTYPE html>")?;
    writeln!(html, "<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">")?;
    writeln!(
        html,
        "<title>Intro comparison: {} vs {}</title>",
        escape(&report.old.source),
        escape(&report.new.source)
    )?;
    writeln!(html, "<style>\n{}\n</style>\n</head>\n<body>", STYLE)?;

    writeln!(html, "<h1>Intro detection comparison</h1>")?;
    writeln!(html, "<div class=\"summary\">")?;
    write_summary(html, "Previous report", &report.old)?;
    write_summary(html, "Current report", &report.new)?;
    writeln!(html, "</div>")?;

    writeln!(html, "<h2>Statistics</h2>\n<table>")?;
    writeln!(html, "<tr><th>Status</th><th>Episodes</th></tr>")?;
    for classification in Classification::ALL {
        writeln!(
            html,
            "<tr class=\"{tag}\"><td>{tag}</td><td>{}</td></tr>",
            report.counts.get(classification),
            tag = classification.tag()
        )?;
    }
    writeln!(html, "<tr><th>total</th><th>{}</th></tr>\n</table>", report.counts.total)?;

    for show in &report.shows {
        writeln!(html, "<details open>\n<summary>{}</summary>", escape(&show.name))?;
        for season in &show.seasons {
            write_season(html, season)?;
        }
        writeln!(html, "</details>")?;
    }

    if !report.removed.is_empty() {
        writeln!(html, "<h2>Only in previous report</h2>")?;
        write_table(html, &report.removed, true)?;
    }

    writeln!(
        html,
        "<footer><small>introcheck {} &middot; generated {}</small></footer>",
        escape(&report.meta.engine_version),
        escape(&report.meta.generated_at)
    )?;
    writeln!(html, "</body>\n</html>")
}

fn write_summary(html: &mut String, heading: &str, summary: &CollectionSummary) -> fmt::Result {
    writeln!(html, "<section>\n<h2>{}</h2>\n<table>", heading)?;
    let rows = [
        ("Path", summary.source.clone()),
        ("Started", summary.started_at.clone()),
        ("Finished", summary.finished_at.clone()),
        ("Runtime", summary.runtime.clone()),
        ("Server", summary.server_name.clone()),
        ("Jellyfin", summary.server_version.clone()),
        ("OS", summary.operating_system.clone()),
        ("Analysis settings", summary.analysis_settings.clone()),
        ("Introduction reqs", summary.introduction_requirements.clone()),
        ("Episodes analyzed", summary.episodes.to_string()),
    ];
    for (label, value) in rows {
        writeln!(html, "<tr><th>{}</th><td>{}</td></tr>", label, escape(&value))?;
    }
    if !summary.duplicate_ids.is_empty() {
        writeln!(
            html,
            "<tr><th>Duplicate ids</th><td>{}</td></tr>",
            escape(&summary.duplicate_ids.join(", "))
        )?;
    }
    writeln!(html, "</table>\n</section>")
}

fn write_season(html: &mut String, season: &SeasonSection<'_>) -> fmt::Result {
    writeln!(html, "<h3>Season {}</h3>", season.number)?;
    write_table(html, &season.episodes, false)
}

fn write_table(
    html: &mut String,
    pairs: &[ReconciliationPair<'_>],
    with_show: bool,
) -> fmt::Result {
    writeln!(html, "<table>")?;
    write!(html, "<tr>")?;
    if with_show {
        write!(html, "<th>Show</th><th>Season</th>")?;
    }
    writeln!(html, "<th>Episode</th><th>Previous</th><th>Current</th><th>Status</th></tr>")?;

    for pair in pairs {
        let tag = pair.classification.tag();
        write!(html, "<tr class=\"{}\" id=\"{}\">", tag, escape(&pair.episode_id))?;
        if with_show {
            let record = pair.old.or(pair.new);
            write!(
                html,
                "<td>{}</td><td>{}</td>",
                escape(record.map(|r| r.series.as_str()).unwrap_or("")),
                record.map(|r| r.season).unwrap_or_default()
            )?;
        }
        let title = pair.new.or(pair.old).map(|r| r.title.as_str()).unwrap_or("");
        writeln!(
            html,
            "<td>{}</td><td>{}</td><td>{}</td><td title=\"{}\">{}</td></tr>",
            escape(title),
            timing(pair.old),
            timing(pair.new),
            escape(&pair.message),
            tag
        )?;
    }
    writeln!(html, "</table>")
}

fn timing(record: Option<&IntroRecord>) -> String {
    match record {
        None => "absent".to_string(),
        Some(r) if !r.valid => "none".to_string(),
        Some(r) => format!(
            "{} &ndash; {} ({}s)",
            r.formatted_start(),
            r.formatted_end(),
            r.display_duration()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use introcheck_report::{compare, CollectionIndex, ReportCollection};

    fn intro(id: &str, title: &str, start: f64, valid: bool) -> IntroRecord {
        IntroRecord {
            episode_id: id.into(),
            series: "Tom & Jerry".into(),
            season: 1,
            title: title.into(),
            intro_start: start,
            intro_end: start + 25.0,
            valid,
            ..Default::default()
        }
    }

    fn collection(source: &str, intros: Vec<IntroRecord>) -> ReportCollection {
        ReportCollection::new(
            source,
            Default::default(),
            Default::default(),
            Default::default(),
            Default::default(),
            intros,
        )
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn renders_sections_and_tags() {
        let old = collection(
            "old.json",
            vec![intro("e1", "Pilot", 30.0, true), intro("gone", "Lost", 0.0, true)],
        );
        let new = collection(
            "new.json",
            vec![intro("e1", "<Pilot>", 45.0, true), intro("e2", "Second", 10.0, true)],
        );
        let (old_idx, new_idx) = (CollectionIndex::build(&old), CollectionIndex::build(&new));
        let html = render(&compare(&old_idx, &new_idx)).unwrap();

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<summary>Tom &amp; Jerry</summary>"));
        assert!(html.contains("&lt;Pilot&gt;"));
        assert!(!html.contains("<Pilot>"));
        assert!(html.contains("<tr class=\"different\" id=\"e1\">"));
        assert!(html.contains("<tr class=\"improvement\" id=\"e2\">"));
        assert!(html.contains("Only in previous report"));
        assert!(html.contains("<tr class=\"only_previous\" id=\"gone\">"));
        assert!(html.contains("30s &ndash; 55s (25s)"));
        assert!(html.ends_with("</html>\n"));
    }

    #[test]
    fn absent_and_invalid_render_differently() {
        assert_eq!(timing(None), "absent");
        assert_eq!(timing(Some(&intro("x", "", 0.0, false))), "none");
    }
}
