use serde::Serialize;

use crate::index::CollectionIndex;
use crate::model::{IntroRecord, ReconciliationPair};

/// Maximum deviation, in seconds, for two timestamps to count as the same.
pub const TOLERANCE_SECS: f64 = 5.0;

/// Agreement between the previous and current detection for one episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// Detected previously, not anymore.
    OnlyPrevious,
    /// Newly detected.
    Improvement,
    /// Never detected.
    Missing,
    /// Detected in both, timestamps outside tolerance.
    Different,
    Okay,
}

impl Classification {
    pub const ALL: [Classification; 5] = [
        Self::OnlyPrevious,
        Self::Improvement,
        Self::Missing,
        Self::Different,
        Self::Okay,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            Self::OnlyPrevious => "only_previous",
            Self::Improvement => "improvement",
            Self::Missing => "missing",
            Self::Different => "different",
            Self::Okay => "okay",
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::OnlyPrevious => {
                "introduction found in previous report, but not the current one".to_string()
            }
            Self::Improvement => "new introduction discovered".to_string(),
            Self::Missing => "no introduction has ever been found for this episode".to_string(),
            Self::Different => {
                format!("timestamps differ by more than {TOLERANCE_SECS} seconds")
            }
            Self::Okay => "okay".to_string(),
        }
    }

    /// True for outcomes that indicate the current report got worse.
    pub fn is_regression(&self) -> bool {
        matches!(self, Self::OnlyPrevious | Self::Different)
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

fn detected(record: Option<&IntroRecord>) -> Option<&IntroRecord> {
    record.filter(|r| r.valid)
}

fn similar(old: f64, new: f64) -> bool {
    (new - old).abs() <= TOLERANCE_SECS
}

/// Classify one episode. An absent record counts as "no intro detected".
pub fn classify(old: Option<&IntroRecord>, new: Option<&IntroRecord>) -> Classification {
    match (detected(old), detected(new)) {
        (Some(_), None) => Classification::OnlyPrevious,
        (None, Some(_)) => Classification::Improvement,
        (None, None) => Classification::Missing,
        (Some(old), Some(new)) => {
            if similar(old.intro_start, new.intro_start) && similar(old.intro_end, new.intro_end) {
                Classification::Okay
            } else {
                Classification::Different
            }
        }
    }
}

/// Pair the previous and current record for `episode_id` and classify them.
///
/// Neither index is modified; calls are independent of each other.
pub fn reconcile<'a>(
    old: &CollectionIndex<'a>,
    new: &CollectionIndex<'a>,
    episode_id: &str,
) -> ReconciliationPair<'a> {
    let old_record = old.get(episode_id);
    let new_record = new.get(episode_id);
    let classification = classify(old_record, new_record);

    ReconciliationPair {
        episode_id: episode_id.to_string(),
        old: old_record,
        new: new_record,
        classification,
        message: classification.message(),
    }
}
