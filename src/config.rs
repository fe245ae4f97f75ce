//! Runtime configuration for the pipeline.
//!
//! One explicit config object built at startup, validated in one place.
//! Stages that never call the answer service (cleaning) work without a
//! credential; everything else fails fast here.

use crate::error::PipelineError;

/// Environment variable holding the answer-service credential.
pub const API_KEY_ENV: &str = "ANSWER_API_KEY";

/// Default endpoint for the answer service.
pub const DEFAULT_BASE_URL: &str = "https://api.exa.ai";

/// Records per batched lookup.
pub const DEFAULT_BATCH_SIZE: usize = 5;

/// Bounded wait per external call, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Pipeline configuration, passed into the driver at construction.
#[derive(Debug, Clone)]
pub struct Config {
    /// Answer-service credential.
    pub api_key: String,
    /// Answer-service endpoint root (no trailing slash).
    pub base_url: String,
    /// Records per batched lookup.
    pub batch_size: usize,
    /// Courtesy pause between batched lookups, in milliseconds.
    pub batch_delay_ms: u64,
    /// Courtesy pause between single-record lookups, in milliseconds.
    pub record_delay_ms: u64,
    /// Courtesy pause between verification lookups, in milliseconds.
    pub verify_delay_ms: u64,
    /// Bounded wait per external call, in seconds.
    pub timeout_secs: u64,
    /// Process only the first N records when set.
    pub limit: Option<usize>,
}

impl Config {
    /// Build a config with the given credential and default knobs.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
            batch_delay_ms: 1_000,
            record_delay_ms: 750,
            verify_delay_ms: 500,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            limit: None,
        }
    }

    /// Build a config from the environment.
    ///
    /// A missing or empty credential is fatal for every stage that talks to
    /// the answer service.
    pub fn from_env() -> Result<Self, PipelineError> {
        let api_key = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                PipelineError::Configuration(format!(
                    "{} environment variable not set",
                    API_KEY_ENV
                ))
            })?;
        Ok(Self::new(api_key))
    }
}
