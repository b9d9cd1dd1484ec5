use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Server identity
// ---------------------------------------------------------------------------

/// Public server information captured alongside a report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ServerInfo {
    pub server_name: String,
    pub version: String,
    pub operating_system: String,
    pub id: String,
}

// ---------------------------------------------------------------------------
// Plugin configuration snapshot
// ---------------------------------------------------------------------------

/// Plugin configuration at capture time.
///
/// Only the keys that influence analysis results are kept; anything else the
/// server returns is ignored on decode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PluginConfiguration {
    pub cache_fingerprints: bool,
    pub max_parallelism: i64,
    /// Comma separated library names. Empty means every library.
    pub selected_libraries: String,

    pub analysis_percent: i64,
    /// Minutes.
    pub analysis_length_limit: i64,
    /// Seconds.
    pub minimum_intro_duration: i64,
}

impl PluginConfiguration {
    /// Selected library names, trimmed. Empty when all libraries are analyzed.
    pub fn libraries(&self) -> Vec<String> {
        if self.selected_libraries.trim().is_empty() {
            return Vec::new();
        }
        self.selected_libraries
            .split(',')
            .map(|lib| lib.trim().to_string())
            .collect()
    }

    /// `cfp=<bool> thr=<n> lbs=[...]`. Libraries are quoted, `*` when unrestricted.
    pub fn analysis_settings(&self) -> String {
        let libs = self.libraries();
        let libs = if libs.is_empty() {
            "*".to_string()
        } else {
            libs.iter()
                .map(|lib| format!("\"{lib}\""))
                .collect::<Vec<_>>()
                .join(" ")
        };

        format!(
            "cfp={} thr={} lbs=[{}]",
            self.cache_fingerprints, self.max_parallelism, libs
        )
    }

    /// `per=<n>% max=<n>m min=<n>s`.
    pub fn introduction_requirements(&self) -> String {
        format!(
            "per={}% max={}m min={}s",
            self.analysis_percent, self.analysis_length_limit, self.minimum_intro_duration
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
