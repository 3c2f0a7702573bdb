use thiserror::Error;

/// Failures surfaced to the presentation layer. None of them end the session.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("asset `{0}` could not be loaded")]
    MissingResource(String),

    #[error("invalid engine configuration: {0}")]
    InvalidConfig(#[from] serde_json::Error),

    #[error("invalid engine setting: {0}")]
    InvalidSetting(String),

    #[error("tracking session failed: {0}")]
    TrackingFailed(String),

    #[error("world tracking is not supported on this device")]
    Unsupported,

    #[error("camera access was denied")]
    PermissionDenied,

    #[error("engine has been stopped")]
    Stopped,
}
