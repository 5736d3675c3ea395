use thiserror::Error;

use crate::domain::Language;

/// Process-boundary error: a message plus the exit code `mb` should return.
#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// Failures of the geocoding lookup itself (as opposed to "no match").
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("geocoding request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("geocoding service returned status {0}")]
    Status(u16),

    #[error("unreadable geocoding response: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Failures while fetching or normalizing one indicator series.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("statistics request for {dataset} failed: {source}")]
    Transport {
        dataset: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("statistics API returned status {status} for {dataset}")]
    Status { dataset: String, status: u16 },

    #[error("unreadable statistics response for {dataset}: {message}")]
    Malformed { dataset: String, message: String },

    #[error("period label '{label}' in {dataset} is not a valid {granularity} period")]
    PeriodLabel {
        dataset: String,
        label: String,
        granularity: &'static str,
    },
}

/// Failures of the text-generation call.
#[derive(Debug, Error)]
pub enum NarrativeError {
    #[error("text-generation request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("text-generation service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("text-generation response had no content")]
    EmptyResponse,

    #[error("missing OPENAI_API_KEY in environment (.env)")]
    MissingApiKey,
}

/// Everything that can stop one "generate" action.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Could not detect the country.")]
    GeocodeNotFound,

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    NarrativeService(#[from] NarrativeError),

    #[error("{} summary has {found} paragraphs, expected at least {expected}", .language.display_name())]
    ParagraphCountMismatch {
        language: Language,
        expected: usize,
        found: usize,
    },

    #[error("{0}")]
    InvalidRequest(String),
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        let code = match &err {
            PipelineError::InvalidRequest(_) => 2,
            PipelineError::NarrativeService(NarrativeError::MissingApiKey) => 2,
            PipelineError::GeocodeNotFound => 3,
            _ => 4,
        };
        AppError::new(code, err.to_string())
    }
}
