use thiserror::Error;

#[derive(Error, Debug)]
pub enum AutomationError {
    #[error("No usable platform backend: {0}")]
    BackendNotAvailable(String),

    #[error("Permission denied for {feature}. {hint}")]
    PermissionDenied { feature: String, hint: String },

    #[error("Feature '{feature}' is not supported on {backend} backend")]
    Capability { feature: String, backend: String },

    #[error("Window not found: {0}")]
    WindowNotFound(String),

    #[error("Display not found: {0}")]
    DisplayNotFound(String),

    #[error("Cannot synthesize input: {0}")]
    Unsynthesizable(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Invalid mouse button: {0}")]
    InvalidButton(String),

    #[error("Invalid window pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AutomationError {
    /// Shorthand for a feature the named backend does not implement.
    pub fn capability(feature: impl Into<String>, backend: impl Into<String>) -> Self {
        AutomationError::Capability {
            feature: feature.into(),
            backend: backend.into(),
        }
    }

    pub fn permission_denied(feature: impl Into<String>, hint: impl Into<String>) -> Self {
        AutomationError::PermissionDenied {
            feature: feature.into(),
            hint: hint.into(),
        }
    }

    /// True for errors that mean "this backend can't do that" rather than "it tried and failed".
    pub fn is_unsupported(&self) -> bool {
        matches!(
            self,
            AutomationError::Capability { .. } | AutomationError::Unsynthesizable(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, AutomationError>;
