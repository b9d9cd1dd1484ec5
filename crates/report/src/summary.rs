use std::fmt;

use serde::Serialize;

use crate::classify::Classification;
use crate::format::{format_seconds, format_timestamp};
use crate::index::CollectionIndex;
use crate::model::ReconciliationPair;

/// Statistics printed for each input report before it is compared.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionSummary {
    pub source: String,
    pub started_at: String,
    pub finished_at: String,
    pub runtime: String,
    pub server_name: String,
    pub server_version: String,
    pub operating_system: String,
    pub analysis_settings: String,
    pub introduction_requirements: String,
    pub episodes: usize,
    pub duplicate_ids: Vec<String>,
}

impl CollectionSummary {
    pub fn from_index(index: &CollectionIndex<'_>) -> Self {
        let collection = index.collection();
        Self {
            source: collection.source.clone(),
            started_at: format_timestamp(&collection.started_at),
            finished_at: format_timestamp(&collection.finished_at),
            runtime: format_seconds(collection.runtime().as_secs_f64()),
            server_name: collection.server_info.server_name.clone(),
            server_version: collection.server_info.version.clone(),
            operating_system: collection.server_info.operating_system.clone(),
            analysis_settings: collection.plugin_config.analysis_settings(),
            introduction_requirements: collection.plugin_config.introduction_requirements(),
            episodes: collection.intros.len(),
            duplicate_ids: index.duplicates().map(str::to_string).collect(),
        }
    }
}

impl fmt::Display for CollectionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Report {}:", self.source)?;
        writeln!(
            f,
            "Generated with Jellyfin {} running on {}",
            self.server_version, self.operating_system
        )?;
        writeln!(f, "Analysis settings: {}", self.analysis_settings)?;
        writeln!(f, "Introduction reqs: {}", self.introduction_requirements)?;
        write!(f, "Episodes analyzed: {}", self.episodes)?;
        if !self.duplicate_ids.is_empty() {
            write!(f, "\nDuplicate ids:     {}", self.duplicate_ids.join(", "))?;
        }
        Ok(())
    }
}

/// Pair counts per classification tag.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ComparisonCounts {
    pub total: usize,
    pub okay: usize,
    pub different: usize,
    pub only_previous: usize,
    pub improvement: usize,
    pub missing: usize,
}

impl ComparisonCounts {
    pub fn record(&mut self, classification: Classification) {
        self.total += 1;
        match classification {
            Classification::Okay => self.okay += 1,
            Classification::Different => self.different += 1,
            Classification::OnlyPrevious => self.only_previous += 1,
            Classification::Improvement => self.improvement += 1,
            Classification::Missing => self.missing += 1,
        }
    }

    /// Episodes whose classification counts as a regression.
    pub fn regressions(&self) -> usize {
        Classification::ALL
            .iter()
            .filter(|c| c.is_regression())
            .map(|c| self.get(*c))
            .sum()
    }

    pub fn get(&self, classification: Classification) -> usize {
        match classification {
            Classification::Okay => self.okay,
            Classification::Different => self.different,
            Classification::OnlyPrevious => self.only_previous,
            Classification::Improvement => self.improvement,
            Classification::Missing => self.missing,
        }
    }
}

/// Count an arbitrary set of pairs.
pub fn count_pairs<'p, 'a: 'p>(
    pairs: impl IntoIterator<Item = &'p ReconciliationPair<'a>>,
) -> ComparisonCounts {
    let mut counts = ComparisonCounts::default();
    for pair in pairs {
        counts.record(pair.classification);
    }
    counts
}

impl fmt::Display for ComparisonCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} episodes: {} okay, {} different, {} only previous, {} improvements, {} missing",
            self.total,
            self.okay,
            self.different,
            self.only_previous,
            self.improvement,
            self.missing,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{IntroRecord, ReportCollection};

    #[test]
    fn counts_per_tag() {
        let mut counts = ComparisonCounts::default();
        for c in [
            Classification::Okay,
            Classification::Okay,
            Classification::Different,
            Classification::OnlyPrevious,
            Classification::Missing,
        ] {
            counts.record(c);
        }
        assert_eq!(counts.total, 5);
        assert_eq!(counts.okay, 2);
        assert_eq!(counts.regressions(), 2);
        assert_eq!(counts.get(Classification::Improvement), 0);
        assert_eq!(counts.get(Classification::Okay), 2);
    }

    #[test]
    fn summary_lists_configuration_and_duplicates() {
        let mut collection = ReportCollection::new(
            "v0.1.5.json",
            Default::default(),
            Default::default(),
            Default::default(),
            Default::default(),
            vec![
                IntroRecord { episode_id: "a".into(), ..Default::default() },
                IntroRecord { episode_id: "a".into(), ..Default::default() },
            ],
        );
        collection.server_info.version = "10.8.0".into();
        collection.server_info.operating_system = "Linux".into();

        let index = CollectionIndex::build(&collection);
        let summary = CollectionSummary::from_index(&index);
        assert_eq!(summary.episodes, 2);
        assert_eq!(summary.duplicate_ids, vec!["a"]);

        let text = summary.to_string();
        assert!(text.starts_with("Report v0.1.5.json:\n"));
        assert!(text.contains("Generated with Jellyfin 10.8.0 running on Linux"));
        assert!(text.contains("Analysis settings: cfp=false thr=0 lbs=[*]"));
        assert!(text.contains("Introduction reqs: per=0% max=0m min=0s"));
        assert!(text.contains("Episodes analyzed: 2"));
        assert!(text.contains("Duplicate ids:     a"));
    }
}
