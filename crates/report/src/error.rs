use std::fmt;

/// Which skip prompt a [`ReportError::PromptOrderingViolation`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    Show,
    Hide,
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Show => write!(f, "show"),
            Self::Hide => write!(f, "hide"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReportError {
    /// Input is not valid JSON or does not have the expected shape.
    DecodeFailure { source: String, message: String },
    /// Record identifier does not match the requested identifier.
    IdentityMismatch { expected: String, found: String },
    /// Intro start or end is below zero.
    NegativeTimestamp { episode_id: String, start: f64, end: f64 },
    /// A skip prompt is scheduled after the boundary it belongs to.
    PromptOrderingViolation {
        episode_id: String,
        prompt: Prompt,
        prompt_at: f64,
        boundary: f64,
    },
    /// Intro is shorter than the minimum allowed duration.
    DurationTooShort { episode_id: String, duration: f64, minimum: f64 },
    /// Record is not flagged as a valid detection.
    MarkedInvalid { episode_id: String },
    /// Raw payload carries a key outside the allowed field set.
    UnknownField { episode_id: String, key: String },
    /// A referenced report file or required field is absent.
    MissingInput(String),
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DecodeFailure { source, message } => {
                write!(f, "cannot decode {source}: {message}")
            }
            Self::IdentityMismatch { expected, found } => {
                write!(f, "intro has incorrect episode id: expected '{expected}', found '{found}'")
            }
            Self::NegativeTimestamp { episode_id, start, end } => {
                write!(f, "episode '{episode_id}': negative intro start or end ({start}, {end})")
            }
            Self::PromptOrderingViolation { episode_id, prompt, prompt_at, boundary } => {
                let which = match prompt {
                    Prompt::Show => "start",
                    Prompt::Hide => "end",
                };
                write!(
                    f,
                    "episode '{episode_id}': {prompt} prompt time {prompt_at} \
                     is after intro {which} {boundary}"
                )
            }
            Self::DurationTooShort { episode_id, duration, minimum } => {
                write!(
                    f,
                    "episode '{episode_id}': intro duration {duration:.2} \
                     is below the minimum of {minimum}"
                )
            }
            Self::MarkedInvalid { episode_id } => {
                write!(f, "episode '{episode_id}': intro is not marked as valid")
            }
            Self::UnknownField { episode_id, key } => {
                write!(f, "episode '{episode_id}': intro object contains unknown key '{key}'")
            }
            Self::MissingInput(what) => write!(f, "missing input: {what}"),
        }
    }
}

impl std::error::Error for ReportError {}
