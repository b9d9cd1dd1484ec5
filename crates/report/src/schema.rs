//! API schema validation for single-episode intro responses.
//!
//! A payload is decoded twice from the same bytes: once into [`IntroRecord`]
//! for the semantic checks, and once into an ordered JSON object so that keys
//! the strict decode would silently drop are still caught.

use serde_json::{Map, Value};

use crate::error::{Prompt, ReportError};
use crate::model::IntroRecord;

/// Shortest intro, in seconds, the API may report.
pub const MIN_INTRO_DURATION_SECS: f64 = 15.0;

/// Keys a version 1 intro response may contain.
pub const ALLOWED_FIELDS: [&str; 6] = [
    "EpisodeId",
    "Valid",
    "IntroStart",
    "IntroEnd",
    "ShowSkipPromptAt",
    "HideSkipPromptAt",
];

/// Decode `payload` both ways and validate it against `expected_id`.
pub fn validate_payload(expected_id: &str, payload: &[u8]) -> Result<IntroRecord, ReportError> {
    let decode_err = |e: serde_json::Error| ReportError::DecodeFailure {
        source: format!("intro response for '{expected_id}'"),
        message: e.to_string(),
    };

    let record: IntroRecord = serde_json::from_slice(payload).map_err(decode_err)?;
    let raw: Map<String, Value> = serde_json::from_slice(payload).map_err(decode_err)?;

    validate_record(expected_id, &record, &raw)?;
    Ok(record)
}

/// Validate an already decoded record and its raw key set. Stops at the first
/// violation found.
pub fn validate_record(
    expected_id: &str,
    record: &IntroRecord,
    raw: &Map<String, Value>,
) -> Result<(), ReportError> {
    if record.episode_id != expected_id {
        return Err(ReportError::IdentityMismatch {
            expected: expected_id.to_string(),
            found: record.episode_id.clone(),
        });
    }

    if record.intro_start < 0.0 || record.intro_end < 0.0 {
        return Err(ReportError::NegativeTimestamp {
            episode_id: expected_id.to_string(),
            start: record.intro_start,
            end: record.intro_end,
        });
    }

    if record.show_skip_prompt_at > record.intro_start {
        return Err(ReportError::PromptOrderingViolation {
            episode_id: expected_id.to_string(),
            prompt: Prompt::Show,
            prompt_at: record.show_skip_prompt_at,
            boundary: record.intro_start,
        });
    }

    if record.hide_skip_prompt_at > record.intro_end {
        return Err(ReportError::PromptOrderingViolation {
            episode_id: expected_id.to_string(),
            prompt: Prompt::Hide,
            prompt_at: record.hide_skip_prompt_at,
            boundary: record.intro_end,
        });
    }

    let duration = record.duration();
    if duration < MIN_INTRO_DURATION_SECS {
        return Err(ReportError::DurationTooShort {
            episode_id: expected_id.to_string(),
            duration,
            minimum: MIN_INTRO_DURATION_SECS,
        });
    }

    if !record.valid {
        return Err(ReportError::MarkedInvalid {
            episode_id: expected_id.to_string(),
        });
    }

    if let Some(key) = raw.keys().find(|key| !ALLOWED_FIELDS.contains(&key.as_str())) {
        return Err(ReportError::UnknownField {
            episode_id: expected_id.to_string(),
            key: key.clone(),
        });
    }

    Ok(())
}
