//! Error types for interlude-core.
//!
//! Almost nothing here escapes the engine boundary: config sync failures are
//! retried then absorbed, and show-path failures degrade to "no ad this
//! cycle". The variants exist so the operations that callers explicitly
//! invoke (`refresh_config`, `set_preferences`) can report what went wrong.

use thiserror::Error;

/// Top-level error type for the engine.
#[derive(Error, Debug)]
pub enum SdkError {
    /// Engine used before `start()` completed its setup.
    #[error("ad engine not started; call start() first")]
    NotInitialized,

    /// Configuration fetch/push failure.
    #[error("config sync failed: {0}")]
    ConfigSync(#[from] ConfigSyncError),

    /// Ad fetch or presentation handoff failure.
    #[error("show attempt failed: {0}")]
    Show(#[from] ShowError),

    /// Placement rejected before handoff (e.g. blank video URL).
    #[error("invalid ad placement: {0}")]
    InvalidPlacement(String),
}

/// Failures while talking to the remote config endpoint.
#[derive(Error, Debug)]
pub enum ConfigSyncError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(reqwest::StatusCode),

    #[error("invalid base url: {0}")]
    BaseUrl(#[from] url::ParseError),

    /// All retry attempts exhausted; carries the last failure.
    #[error("gave up after {attempts} attempts: {last}")]
    Exhausted {
        attempts: u32,
        #[source]
        last: Box<ConfigSyncError>,
    },
}

/// Failures inside one show attempt. No-fill is *not* one of these -- an
/// empty serve response is a normal outcome.
#[derive(Error, Debug)]
pub enum ShowError {
    #[error("ad request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(reqwest::StatusCode),

    #[error("presentation handoff failed: {0}")]
    Presentation(String),
}

/// Result type alias for SdkError.
pub type Result<T, E = SdkError> = std::result::Result<T, E>;
