use std::time::Duration;
use thiserror::Error;

/// Why an estimator call did not produce a price.
///
/// Stored in the requester's result slot, so it must stay `Clone`; transport
/// errors are flattened to their message.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EstimatorFailure {
    #[error("Network error: {message}")]
    Network { message: String },

    #[error("Estimator returned HTTP {code}")]
    Status { code: u16 },

    #[error("Malformed estimator response: {message}")]
    MalformedResponse { message: String },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidQuery { field: String, reason: String },

    #[error("Estimator did not respond within {after:?}")]
    Timeout { after: Duration },
}

impl EstimatorFailure {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }

    pub fn invalid_query(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidQuery {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

impl From<reqwest::Error> for EstimatorFailure {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::malformed(err.to_string())
        } else if let Some(status) = err.status() {
            Self::Status {
                code: status.as_u16(),
            }
        } else {
            Self::network(err.to_string())
        }
    }
}

#[derive(Error, Debug)]
pub enum CarPredictError {
    #[error("Unknown form field: {name}")]
    InvalidField { name: String },

    #[error("A prediction is already in progress")]
    Busy,

    #[error("Estimation failed: {0}")]
    Estimator(#[from] EstimatorFailure),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid configuration value for '{field}': {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

impl CarPredictError {
    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::InvalidField { name } => format!("'{}' is not a vehicle field", name),
            Self::Busy => "Please wait for the current prediction to finish".to_string(),
            Self::Estimator(EstimatorFailure::Timeout { .. }) => {
                "The price service took too long to answer".to_string()
            }
            Self::Estimator(EstimatorFailure::InvalidQuery { field, reason }) => {
                format!("Check the {} field: {}", field, reason)
            }
            Self::Estimator(_) => "We could not estimate a price right now".to_string(),
            Self::IoError(e) => format!("Could not read a file: {}", e),
            Self::TomlError(_) | Self::ConfigError { .. } | Self::InvalidConfigValueError { .. } => {
                format!("Configuration problem: {}", self)
            }
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::InvalidField { .. } => {
                "Use one of: make, model, year, mileage, fuelType, transmission, bodyType, engineSize, horsepower"
            }
            Self::Busy => "Retry once the running prediction has settled",
            Self::Estimator(EstimatorFailure::Network { .. }) => {
                "Check that the estimator endpoint is reachable"
            }
            Self::Estimator(EstimatorFailure::Status { .. }) => {
                "Check the estimator service logs and the request payload"
            }
            Self::Estimator(EstimatorFailure::MalformedResponse { .. }) => {
                "Make sure the endpoint returns JSON with a non-negative 'price'"
            }
            Self::Estimator(EstimatorFailure::InvalidQuery { .. }) => {
                "Correct the highlighted vehicle field and try again"
            }
            Self::Estimator(EstimatorFailure::Timeout { .. }) => {
                "Raise --timeout-secs or try again later"
            }
            Self::IoError(_) => "Check the file path and permissions",
            Self::TomlError(_) | Self::ConfigError { .. } | Self::InvalidConfigValueError { .. } => {
                "Fix the configuration file or command line flags"
            }
        }
    }

    /// Process exit code used by the CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Estimator(EstimatorFailure::InvalidQuery { .. }) | Self::InvalidField { .. } => 2,
            Self::Estimator(_) | Self::Busy => 1,
            _ => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, CarPredictError>;

/// Outcome of one settled estimation.
pub type EstimationResult = std::result::Result<crate::domain::model::Estimate, EstimatorFailure>;
