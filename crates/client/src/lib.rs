//! Media server API client for intro detection runs.
//!
//! Single source of truth for the server wire contract: server identity,
//! plugin configuration, intro catalogue, analysis task lifecycle and the
//! single-episode timestamp endpoint.
//!
//! Blocking only. No retries.

mod client;
mod progress;

pub use client::{ClientError, ServerClient, TaskInfo, ANALYSIS_TASK_IDS, PLUGIN_ID};
pub use progress::{PollSchedule, Spinner};
