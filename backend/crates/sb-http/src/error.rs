use std::panic::Location;

use error_location::ErrorLocation;
use sb_core::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HttpError {
    #[error("Failed to bind {address}: {source} {location}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
        location: ErrorLocation,
    },

    #[error("Invalid http instance config: {source} {location}")]
    Config {
        #[source]
        source: sb_config::ConfigError,
        location: ErrorLocation,
    },

    #[error("Server error: {source} {location}")]
    Serve {
        #[source]
        source: std::io::Error,
        location: ErrorLocation,
    },

    #[error("{message} {location}")]
    State {
        message: String,
        location: ErrorLocation,
    },
}

impl HttpError {
    #[track_caller]
    pub fn bind(address: impl Into<String>, source: std::io::Error) -> Self {
        Self::Bind {
            address: address.into(),
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn serve(source: std::io::Error) -> Self {
        Self::Serve {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn state(message: impl Into<String>) -> Self {
        Self::State {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<sb_config::ConfigError> for HttpError {
    #[track_caller]
    fn from(source: sb_config::ConfigError) -> Self {
        Self::Config {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

/// Instances report through the core's error type
impl From<HttpError> for CoreError {
    #[track_caller]
    fn from(error: HttpError) -> Self {
        CoreError::instance(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, HttpError>;
