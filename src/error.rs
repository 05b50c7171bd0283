use std::fmt;

#[derive(Debug)]
pub enum NexoraError {
    ApiError {
        status: u16,
        message: String,
    },
    NetworkError(reqwest::Error),
    Timeout,
    MalformedResponse(String),
    AllModelsFailed {
        primary: Box<NexoraError>,
        backup: Box<NexoraError>,
    },
    PersistenceError(String),
    AuthError(String),
    ConfigError(String),
    EmptyPrompt,
    FeatureUnavailable(String),
    IoError(std::io::Error),
    JsonError(serde_json::Error),
    YamlError(serde_yaml::Error),
    Other(String),
}

impl NexoraError {
    /// Whether this failure belongs to a single model call, i.e. the kind
    /// of error that moves a completion over to the backup model.
    pub fn is_model_failure(&self) -> bool {
        matches!(
            self,
            NexoraError::ApiError { .. }
                | NexoraError::NetworkError(_)
                | NexoraError::Timeout
                | NexoraError::MalformedResponse(_)
        )
    }
}

impl fmt::Display for NexoraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NexoraError::ApiError { status, message } => {
                write!(f, "API error (status {}): {}", status, message)
            }
            NexoraError::NetworkError(e) => write!(f, "Network error: {}", e),
            NexoraError::Timeout => write!(f, "Request timeout"),
            NexoraError::MalformedResponse(msg) => write!(f, "Malformed response: {}", msg),
            NexoraError::AllModelsFailed { primary, backup } => write!(
                f,
                "Both models failed to respond (primary: {}; backup: {})",
                primary, backup
            ),
            NexoraError::PersistenceError(msg) => write!(f, "Persistence error: {}", msg),
            NexoraError::AuthError(msg) => write!(f, "Authentication error: {}", msg),
            NexoraError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            NexoraError::EmptyPrompt => write!(f, "Prompt must not be empty"),
            NexoraError::FeatureUnavailable(msg) => write!(f, "Feature unavailable: {}", msg),
            NexoraError::IoError(e) => write!(f, "IO error: {}", e),
            NexoraError::JsonError(e) => write!(f, "JSON error: {}", e),
            NexoraError::YamlError(e) => write!(f, "YAML error: {}", e),
            NexoraError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for NexoraError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            NexoraError::NetworkError(e) => Some(e),
            NexoraError::IoError(e) => Some(e),
            NexoraError::JsonError(e) => Some(e),
            NexoraError::YamlError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for NexoraError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            NexoraError::Timeout
        } else {
            NexoraError::NetworkError(err)
        }
    }
}

impl From<std::io::Error> for NexoraError {
    fn from(err: std::io::Error) -> Self {
        NexoraError::IoError(err)
    }
}

impl From<serde_json::Error> for NexoraError {
    fn from(err: serde_json::Error) -> Self {
        NexoraError::JsonError(err)
    }
}

impl From<serde_yaml::Error> for NexoraError {
    fn from(err: serde_yaml::Error) -> Self {
        NexoraError::YamlError(err)
    }
}

impl From<anyhow::Error> for NexoraError {
    fn from(err: anyhow::Error) -> Self {
        NexoraError::Other(format!("{:#}", err))
    }
}

impl From<String> for NexoraError {
    fn from(msg: String) -> Self {
        NexoraError::Other(msg)
    }
}

impl From<&str> for NexoraError {
    fn from(msg: &str) -> Self {
        NexoraError::Other(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, NexoraError>;
