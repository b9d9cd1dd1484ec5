use std::collections::HashSet;

use serde::Serialize;

use crate::classify::reconcile;
use crate::index::CollectionIndex;
use crate::model::ReconciliationPair;
use crate::summary::{count_pairs, CollectionSummary, ComparisonCounts};

// ---------------------------------------------------------------------------
// Presentation structure
// ---------------------------------------------------------------------------

/// Everything the HTML page (or `--json` output) needs, in display order.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonReport<'a> {
    pub meta: ComparisonMeta,
    pub old: CollectionSummary,
    pub new: CollectionSummary,
    /// Shows of the current report, sorted by name.
    pub shows: Vec<ShowSection<'a>>,
    /// Episodes only present in the previous report, sorted by id.
    pub removed: Vec<ReconciliationPair<'a>>,
    pub counts: ComparisonCounts,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonMeta {
    pub engine_version: String,
    pub generated_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShowSection<'a> {
    pub name: String,
    /// Ascending season number.
    pub seasons: Vec<SeasonSection<'a>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeasonSection<'a> {
    pub number: i32,
    /// Source order of the current report.
    pub episodes: Vec<ReconciliationPair<'a>>,
}

impl<'a> ComparisonReport<'a> {
    /// Every pair in display order, including removed episodes last.
    pub fn pairs(&self) -> impl Iterator<Item = &ReconciliationPair<'a>> + '_ {
        self.shows
            .iter()
            .flat_map(|show| show.seasons.iter())
            .flat_map(|season| season.episodes.iter())
            .chain(self.removed.iter())
    }
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

/// Compare the previous report against the current one.
///
/// Enumeration is driven by the current report's grouping index; episodes that
/// only exist in the previous report are collected into `removed`. A repeated
/// id is listed once, at the position of its first record. Ordering never
/// influences classification.
pub fn compare<'a>(old: &CollectionIndex<'a>, new: &CollectionIndex<'a>) -> ComparisonReport<'a> {
    let mut shows = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();

    for show in new.show_names() {
        let Some(seasons) = new.seasons(show) else {
            continue;
        };

        let mut sections = Vec::with_capacity(seasons.len());
        for (number, records) in seasons {
            let episodes: Vec<ReconciliationPair<'a>> = records
                .iter()
                .filter(|record| seen.insert(record.episode_id.as_str()))
                .map(|record| reconcile(old, new, &record.episode_id))
                .collect();
            if !episodes.is_empty() {
                sections.push(SeasonSection { number: *number, episodes });
            }
        }

        if !sections.is_empty() {
            shows.push(ShowSection {
                name: show.to_string(),
                seasons: sections,
            });
        }
    }

    let mut removed_ids: Vec<&str> = old.episode_ids().filter(|id| !new.contains(id)).collect();
    removed_ids.sort_unstable();
    let removed: Vec<ReconciliationPair<'a>> = removed_ids
        .into_iter()
        .map(|id| reconcile(old, new, id))
        .collect();

    let mut report = ComparisonReport {
        meta: ComparisonMeta {
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            generated_at: chrono::Utc::now().to_rfc3339(),
        },
        old: CollectionSummary::from_index(old),
        new: CollectionSummary::from_index(new),
        shows,
        removed,
        counts: ComparisonCounts::default(),
    };
    report.counts = count_pairs(report.pairs());
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Classification;
    use crate::model::{IntroRecord, ReportCollection};

    fn intro(id: &str, series: &str, season: i32, start: f64, valid: bool) -> IntroRecord {
        IntroRecord {
            episode_id: id.into(),
            series: series.into(),
            season,
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
    fn shows_and_seasons_are_ordered() {
        let old = collection("old", Vec::new());
        let new = collection(
            "new",
            vec![
                intro("b2", "Bravo", 2, 0.0, true),
                intro("a10", "Alpha", 10, 0.0, true),
                intro("b1", "Bravo", 1, 0.0, true),
                intro("a2", "Alpha", 2, 0.0, true),
            ],
        );
        let (old_idx, new_idx) = (CollectionIndex::build(&old), CollectionIndex::build(&new));
        let report = compare(&old_idx, &new_idx);

        let names: Vec<&str> = report.shows.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Bravo"]);
        let alpha: Vec<i32> = report.shows[0].seasons.iter().map(|s| s.number).collect();
        assert_eq!(alpha, vec![2, 10]);
        assert_eq!(report.counts.improvement, 4);
    }

    #[test]
    fn episodes_follow_current_source_order() {
        let old = collection(
            "old",
            vec![intro("e1", "Show", 1, 0.0, true), intro("e2", "Show", 1, 0.0, true)],
        );
        let new = collection(
            "new",
            vec![intro("e2", "Show", 1, 0.0, true), intro("e1", "Show", 1, 20.0, true)],
        );
        let (old_idx, new_idx) = (CollectionIndex::build(&old), CollectionIndex::build(&new));
        let report = compare(&old_idx, &new_idx);

        let season = &report.shows[0].seasons[0];
        let ids: Vec<&str> = season.episodes.iter().map(|p| p.episode_id.as_str()).collect();
        assert_eq!(ids, vec!["e2", "e1"]);
        assert_eq!(season.episodes[0].classification, Classification::Okay);
        assert_eq!(season.episodes[1].classification, Classification::Different);
    }

    #[test]
    fn episodes_missing_from_current_are_listed_separately() {
        let old = collection(
            "old",
            vec![
                intro("gone-b", "Show", 1, 0.0, true),
                intro("kept", "Show", 1, 0.0, true),
                intro("gone-a", "Show", 1, 0.0, false),
            ],
        );
        let new = collection("new", vec![intro("kept", "Show", 1, 0.0, true)]);
        let (old_idx, new_idx) = (CollectionIndex::build(&old), CollectionIndex::build(&new));
        let report = compare(&old_idx, &new_idx);

        let removed: Vec<(&str, Classification)> = report
            .removed
            .iter()
            .map(|p| (p.episode_id.as_str(), p.classification))
            .collect();
        assert_eq!(
            removed,
            vec![("gone-a", Classification::Missing), ("gone-b", Classification::OnlyPrevious)]
        );
        assert_eq!(report.shows[0].seasons[0].episodes.len(), 1);
        assert_eq!(report.counts.total, 3);
        assert_eq!(report.counts.regressions(), 1);
    }

    #[test]
    fn repeated_id_is_listed_once() {
        let old = collection("old", vec![intro("a", "Show", 1, 10.0, true)]);
        let new = collection(
            "new",
            vec![
                intro("a", "Show", 1, 10.0, true),
                intro("b", "Show", 1, 0.0, true),
                intro("a", "Show", 1, 60.0, true),
            ],
        );
        let (old_idx, new_idx) = (CollectionIndex::build(&old), CollectionIndex::build(&new));
        let report = compare(&old_idx, &new_idx);

        let episodes = &report.shows[0].seasons[0].episodes;
        let ids: Vec<&str> = episodes.iter().map(|p| p.episode_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        // The last record wins, so `a` is compared at 60s.
        assert_eq!(episodes[0].new.map(|r| r.intro_start), Some(60.0));
        assert_eq!(episodes[0].classification, Classification::Different);
        assert_eq!(report.counts.total, 2);
        assert_eq!(report.counts.different, 1);
        assert_eq!(report.counts.regressions(), 1);
    }

    #[test]
    fn summaries_describe_both_inputs() {
        let old = collection("v1.json", vec![intro("a", "Show", 1, 0.0, true)]);
        let new = collection("v2.json", Vec::new());
        let (old_idx, new_idx) = (CollectionIndex::build(&old), CollectionIndex::build(&new));
        let report = compare(&old_idx, &new_idx);
        assert_eq!(report.old.source, "v1.json");
        assert_eq!(report.old.episodes, 1);
        assert_eq!(report.new.episodes, 0);
        assert!(report.shows.is_empty());
    }
}
