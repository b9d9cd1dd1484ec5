use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::classify::Classification;
use crate::config::{PluginConfiguration, ServerInfo};
use crate::error::ReportError;
use crate::format::format_seconds;

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// One episode's intro detection result.
///
/// Decoding is lenient: missing keys take zero values and unknown keys
/// (including a stale `Duration`) are ignored. The duration is always derived
/// from start and end.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct IntroRecord {
    pub episode_id: String,

    pub series: String,
    pub season: i32,
    pub title: String,

    pub intro_start: f64,
    pub intro_end: f64,
    pub valid: bool,

    pub show_skip_prompt_at: f64,
    pub hide_skip_prompt_at: f64,
}

impl IntroRecord {
    pub fn duration(&self) -> f64 {
        self.intro_end - self.intro_start
    }

    /// Duration rounded to the nearest second, for display only.
    pub fn display_duration(&self) -> f64 {
        self.duration().round()
    }

    pub fn formatted_start(&self) -> String {
        format_seconds(self.intro_start)
    }

    pub fn formatted_end(&self) -> String {
        format_seconds(self.intro_end)
    }
}

impl Serialize for IntroRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        #[serde(rename_all = "PascalCase")]
        struct Wire<'a> {
            episode_id: &'a str,
            series: &'a str,
            season: i32,
            title: &'a str,
            intro_start: f64,
            intro_end: f64,
            duration: f64,
            valid: bool,
            show_skip_prompt_at: f64,
            hide_skip_prompt_at: f64,
        }

        Wire {
            episode_id: &self.episode_id,
            series: &self.series,
            season: self.season,
            title: &self.title,
            intro_start: self.intro_start,
            intro_end: self.intro_end,
            duration: self.duration(),
            valid: self.valid,
            show_skip_prompt_at: self.show_skip_prompt_at,
            hide_skip_prompt_at: self.hide_skip_prompt_at,
        }
        .serialize(serializer)
    }
}

// ---------------------------------------------------------------------------
// Collection
// ---------------------------------------------------------------------------

/// Every intro captured from one server run, plus capture metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReportCollection {
    /// Where this report was loaded from (file path or server address).
    #[serde(skip)]
    pub source: String,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Elapsed capture time in nanoseconds.
    #[serde(rename = "Runtime")]
    pub runtime_nanos: i64,

    pub server_info: ServerInfo,
    pub plugin_config: PluginConfiguration,

    pub intros: Vec<IntroRecord>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ReportDocument {
    #[serde(default)]
    started_at: DateTime<Utc>,
    #[serde(default)]
    finished_at: DateTime<Utc>,
    #[serde(rename = "Runtime", default)]
    runtime_nanos: i64,
    #[serde(default)]
    server_info: ServerInfo,
    #[serde(default)]
    plugin_config: PluginConfiguration,
    /// `None` only when the key is absent; an explicit `null` is an empty list.
    #[serde(default, deserialize_with = "null_as_empty")]
    intros: Option<Vec<IntroRecord>>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Option<Vec<IntroRecord>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Vec<IntroRecord>>::deserialize(deserializer).map(|v| Some(v.unwrap_or_default()))
}

impl ReportCollection {
    /// Assemble a freshly captured collection; runtime is derived from the bounds.
    pub fn new(
        source: impl Into<String>,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
        server_info: ServerInfo,
        plugin_config: PluginConfiguration,
        intros: Vec<IntroRecord>,
    ) -> Self {
        let runtime_nanos = (finished_at - started_at).num_nanoseconds().unwrap_or(i64::MAX);
        Self {
            source: source.into(),
            started_at,
            finished_at,
            runtime_nanos,
            server_info,
            plugin_config,
            intros,
        }
    }

    /// Decode a report document previously written by `generate`.
    pub fn from_json(source: &str, bytes: &[u8]) -> Result<Self, ReportError> {
        let doc: ReportDocument =
            serde_json::from_slice(bytes).map_err(|e| ReportError::DecodeFailure {
                source: source.to_string(),
                message: e.to_string(),
            })?;

        let intros = doc
            .intros
            .ok_or_else(|| ReportError::MissingInput(format!("{source}: no \"Intros\" field")))?;

        Ok(Self {
            source: source.to_string(),
            started_at: doc.started_at,
            finished_at: doc.finished_at,
            runtime_nanos: doc.runtime_nanos,
            server_info: doc.server_info,
            plugin_config: doc.plugin_config,
            intros,
        })
    }

    /// Decode the bare intro array returned by the server's "all intros" endpoint.
    pub fn intros_from_json(source: &str, bytes: &[u8]) -> Result<Vec<IntroRecord>, ReportError> {
        let intros: Option<Vec<IntroRecord>> =
            serde_json::from_slice(bytes).map_err(|e| ReportError::DecodeFailure {
                source: source.to_string(),
                message: e.to_string(),
            })?;
        Ok(intros.unwrap_or_default())
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn runtime(&self) -> std::time::Duration {
        std::time::Duration::from_nanos(self.runtime_nanos.max(0) as u64)
    }
}

// ---------------------------------------------------------------------------
// Reconciliation
// ---------------------------------------------------------------------------

/// Outcome of comparing one episode across the previous and current reports.
///
/// `None` means the episode is absent from that report, which is distinct
/// from a record that is present but not valid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciliationPair<'a> {
    pub episode_id: String,
    pub old: Option<&'a IntroRecord>,
    pub new: Option<&'a IntroRecord>,
    pub classification: Classification,
    pub message: String,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
