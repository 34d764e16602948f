//! Error types and handling for the current-conditions aggregator

use thiserror::Error;

/// Main error type for `noaa-current`
#[derive(Error, Debug)]
pub enum NoaaCurrentError {
    /// Network or DNS level failure, no HTTP status was received
    #[error("Transport error calling {url}: {source}")]
    TransportFailure {
        url: String,
        #[source]
        source: reqwest_middleware::Error,
    },

    /// Upstream answered with a non-2xx status
    #[error("HTTP {status} {status_text} from {url}")]
    HttpFailure {
        url: String,
        status: u16,
        status_text: String,
    },

    /// Derivation was attempted before all three payload slots were filled
    #[error("Incomplete data: {missing} not yet received")]
    IncompleteData { missing: &'static str },

    /// A payload lacked a field the derivation needs, or failed to parse
    #[error("Malformed payload: {message}")]
    MalformedPayload { message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl NoaaCurrentError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new malformed payload error
    pub fn malformed<S: Into<String>>(message: S) -> Self {
        Self::MalformedPayload {
            message: message.into(),
        }
    }

    /// HTTP status attached to the error, if the server answered at all
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpFailure { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::TransportFailure { .. } => {
                "Unable to reach the weather service. Please check your internet connection."
                    .to_string()
            }
            Self::HttpFailure { status, .. } => {
                format!("The weather service answered with HTTP {status}. Retrying shortly.")
            }
            Self::IncompleteData { .. } => "Weather data is still loading.".to_string(),
            Self::MalformedPayload { .. } => {
                "The weather service returned unexpected data. Showing the last known conditions."
                    .to_string()
            }
            Self::Config { message } => format!("Configuration error: {message}"),
        }
    }
}
