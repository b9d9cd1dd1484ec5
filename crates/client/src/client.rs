//! Media server HTTP client.
//!
//! Blocking reqwest client (no Tokio runtime required). Covers everything the
//! tool needs from the server: identity, plugin configuration, the intro
//! catalogue, the analysis task lifecycle and the single-episode endpoint.

use std::io::Write;
use std::thread;
use std::time::{Duration, Instant};

use introcheck_report::{IntroRecord, PluginConfiguration, ReportCollection, ServerInfo};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::progress::{PollSchedule, Spinner};

/// Intro Skipper plugin id.
pub const PLUGIN_ID: &str = "c83d86bb-a1e0-4c35-a113-e2101cf4ee6b";

/// Analysis scheduled task ids, newest plugin release first.
pub const ANALYSIS_TASK_IDS: [&str; 3] = [
    "f64d8ad58e3d7b98548e1a07697eb100",
    "8863329048cc357f7dfebf080f2fe204",
    "6adda26c5261c40e8fa4a7e7df568be2",
];

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Media server API client (blocking).
#[derive(Clone)]
pub struct ServerClient {
    http: reqwest::blocking::Client,
    address: String,
    authorization: String,
}

/// Error type for server operations.
#[derive(Debug)]
pub enum ClientError {
    /// Server rejected the API key
    Unauthorized,
    /// Connection, timeout or transfer failure
    Network(String),
    /// Non-success HTTP status with the response body
    Http(u16, String),
    /// Response body did not decode
    Parse(String),
    /// None of the known analysis task ids exist on the server
    TaskNotFound,
    /// Progress output could not be written
    Io(String),
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::Unauthorized => write!(f, "server returned 401 (Unauthorized)"),
            ClientError::Network(msg) => write!(f, "network error: {}", msg),
            ClientError::Http(code, body) if body.is_empty() => write!(f, "HTTP {}", code),
            ClientError::Http(code, body) => write!(f, "HTTP {}: {}", code, body.trim()),
            ClientError::Parse(msg) => write!(f, "parse error: {}", msg),
            ClientError::TaskNotFound => write!(f, "unable to find the analysis scheduled task"),
            ClientError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for ClientError {}

/// Scheduled task status from `/ScheduledTasks/<id>`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct TaskInfo {
    pub state: String,
    pub current_progress_percentage: Option<f64>,
}

impl TaskInfo {
    /// Progress in whole percent. An idle task counts as finished.
    pub fn percent(&self) -> u8 {
        if self.state == "Idle" {
            return 100;
        }
        self.current_progress_percentage
            .unwrap_or(0.0)
            .clamp(0.0, 100.0) as u8
    }

    pub fn is_complete(&self) -> bool {
        self.percent() == 100
    }
}

impl ServerClient {
    /// Create a client for `address` (scheme included) authenticating with `api_key`.
    pub fn new(address: &str, api_key: &str) -> Result<Self, ClientError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(format!("introcheck/{}", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ClientError::Network(format!("cannot create HTTP client: {e}")))?;

        Ok(Self {
            http,
            address: address.trim_end_matches('/').to_string(),
            authorization: format!("MediaBrowser Token=\"{}\"", api_key),
        })
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn server_info(&self) -> Result<ServerInfo, ClientError> {
        log::info!("[+] Getting server information");
        self.get_json("/System/Info/Public")
    }

    pub fn plugin_configuration(&self) -> Result<PluginConfiguration, ClientError> {
        log::info!("[+] Getting plugin configuration");
        self.get_json(&format!("/Plugins/{}/Configuration", PLUGIN_ID))
    }

    /// Every intro the server knows about. Durations are derived, never trusted.
    pub fn all_intros(&self) -> Result<Vec<IntroRecord>, ClientError> {
        let path = "/Intros/All";
        let body = self.send(Method::GET, path)?;
        ReportCollection::intros_from_json(path, &body)
            .map_err(|e| ClientError::Parse(e.to_string()))
    }

    pub fn erase_timestamps(&self) -> Result<(), ClientError> {
        log::info!("[+] Erasing previously discovered intros");
        self.send(Method::POST, "/Intros/EraseTimestamps").map(|_| ())
    }

    /// Start the analysis task, trying each known task id in turn.
    /// Returns the id that was accepted.
    pub fn start_analysis_task(&self) -> Result<&'static str, ClientError> {
        log::info!("[+] Starting analysis task");
        for id in ANALYSIS_TASK_IDS {
            match self.send(Method::POST, &format!("/ScheduledTasks/Running/{}", id)) {
                Ok(body) if !String::from_utf8_lossy(&body).contains("Not Found") => return Ok(id),
                Ok(_) => {}
                Err(ClientError::Http(404, _)) => {}
                Err(ClientError::Http(_, body)) if body.contains("Not Found") => {}
                Err(e) => return Err(e),
            }
            log::debug!("task {} not present on server", id);
        }
        Err(ClientError::TaskNotFound)
    }

    pub fn task_info(&self, task_id: &str) -> Result<TaskInfo, ClientError> {
        self.get_json(&format!("/ScheduledTasks/{}?hideUrl=1", task_id))
    }

    /// Block until the task reports completion, redrawing `spinner` on `out`
    /// every tick and querying the server at most once per poll interval.
    ///
    /// An undecodable status response is logged and retried on the next
    /// interval; any other failure aborts the wait.
    pub fn wait_for_task<W: Write>(
        &self,
        task_id: &str,
        schedule: PollSchedule,
        spinner: &mut Spinner,
        out: &mut W,
    ) -> Result<TaskInfo, ClientError> {
        log::info!("[+] Waiting for analysis task to complete");
        let io_err = |e: std::io::Error| ClientError::Io(e.to_string());

        write!(out, "[+] Episodes analyzed: 0%").map_err(io_err)?;
        out.flush().map_err(io_err)?;

        let mut info = TaskInfo::default();
        let mut last_query: Option<Instant> = None;

        loop {
            thread::sleep(schedule.tick);

            write!(out, "{}", spinner.render(info.percent())).map_err(io_err)?;
            out.flush().map_err(io_err)?;

            if info.is_complete() {
                writeln!(out, "\r[+]").map_err(io_err)?;
                return Ok(info);
            }

            if last_query.is_some_and(|at| at.elapsed() <= schedule.interval) {
                continue;
            }
            last_query = Some(Instant::now());

            match self.task_info(task_id) {
                Ok(latest) => info = latest,
                Err(ClientError::Parse(msg)) => {
                    log::warn!("[!] Unable to decode task status: {}", msg);
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Raw single-episode intro response. `version` may be empty for the
    /// implicitly versioned endpoint.
    pub fn intro_timestamps(
        &self,
        episode_id: &str,
        version: &str,
    ) -> Result<Vec<u8>, ClientError> {
        self.send(
            Method::GET,
            &format!("/Episode/{}/IntroTimestamps/{}?hideUrl=1", episode_id, version),
        )
    }

    // ── Request helpers ──────────────────────────────────────────────

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let body = self.send(Method::GET, path)?;
        serde_json::from_slice(&body).map_err(|e| ClientError::Parse(format!("{}: {}", path, e)))
    }

    fn send(&self, method: Method, path: &str) -> Result<Vec<u8>, ClientError> {
        let url = format!("{}{}", self.address, path);
        let response = self
            .http
            .request(method.clone(), &url)
            .header(reqwest::header::AUTHORIZATION, &self.authorization)
            .send()
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let status = response.status();
        if url.contains("hideUrl") {
            log::debug!("{} {}: {}", method, url, status.as_u16());
        } else {
            log::info!("[+] {} {}: {}", method, url, status.as_u16());
        }

        if status == StatusCode::UNAUTHORIZED {
            return Err(ClientError::Unauthorized);
        }

        let body = response
            .bytes()
            .map_err(|e| ClientError::Network(e.to_string()))?
            .to_vec();

        if !status.is_success() {
            return Err(ClientError::Http(
                status.as_u16(),
                String::from_utf8_lossy(&body).into_owned(),
            ));
        }

        Ok(body)
    }
}
