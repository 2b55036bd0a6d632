use crate::Registry;

use std::fmt;
use std::panic::Location;
use std::result::Result as StdResult;

use error_location::ErrorLocation;
use thiserror::Error;

/// Why a configured server type could not be turned into an instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigErrorKind {
    /// The type string names no known server type
    InvalidType,
    /// The type is known but no constructor is registered for it
    UnknownType,
}

impl fmt::Display for ConfigErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidType => f.write_str("invalid type"),
            Self::UnknownType => f.write_str("unknown type"),
        }
    }
}

/// Distinguishes "could not reach the collector" from "collector said no"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationErrorKind {
    Transport,
    Rejected,
    Unsupported,
}

impl fmt::Display for RegistrationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport => f.write_str("transport"),
            Self::Rejected => f.write_str("rejected"),
            Self::Unsupported => f.write_str("unsupported"),
        }
    }
}

/// Registry-wide operation whose per-server failures were collected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOperation {
    Shutdown,
    Abort,
    Register,
    ReportState,
}

impl fmt::Display for BatchOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shutdown => f.write_str("shutdown"),
            Self::Abort => f.write_str("abort"),
            Self::Register => f.write_str("register"),
            Self::ReportState => f.write_str("report state"),
        }
    }
}

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Config error ({kind}): {value} {location}")]
    Config {
        kind: ConfigErrorKind,
        value: String,
        location: ErrorLocation,
    },

    #[error("Connection to collector at {address} failed: {message} {location}")]
    Connection {
        address: String,
        message: String,
        location: ErrorLocation,
    },

    #[error("Registration error ({kind}) for {uuid}: {message} {location}")]
    Registration {
        kind: RegistrationErrorKind,
        uuid: String,
        message: String,
        location: ErrorLocation,
    },

    #[error("Instance error: {message} {location}")]
    Instance {
        message: String,
        location: ErrorLocation,
    },

    #[error("Route error: {message} {location}")]
    Route {
        message: String,
        location: ErrorLocation,
    },

    #[error("{operation} failed on {} server(s)", .failures.len())]
    Batch {
        operation: BatchOperation,
        failures: Vec<ServerFailure>,
    },
}

/// One server's failure inside a registry-wide operation
#[derive(Debug)]
pub struct ServerFailure {
    pub server: String,
    pub error: CoreError,
}

impl CoreError {
    #[track_caller]
    pub fn invalid_type<S: Into<String>>(value: S) -> Self {
        Self::Config {
            kind: ConfigErrorKind::InvalidType,
            value: value.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn unknown_type<S: Into<String>>(value: S) -> Self {
        Self::Config {
            kind: ConfigErrorKind::UnknownType,
            value: value.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn connection<A: Into<String>, M: Into<String>>(address: A, message: M) -> Self {
        Self::Connection {
            address: address.into(),
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn registration<U: Into<String>, M: Into<String>>(
        kind: RegistrationErrorKind,
        uuid: U,
        message: M,
    ) -> Self {
        Self::Registration {
            kind,
            uuid: uuid.into(),
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn instance<S: Into<String>>(message: S) -> Self {
        Self::Instance {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn route<S: Into<String>>(message: S) -> Self {
        Self::Route {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Ok when nothing failed, otherwise a Batch error listing every failure
    pub fn batch(operation: BatchOperation, failures: Vec<ServerFailure>) -> Result<()> {
        if failures.is_empty() {
            Ok(())
        } else {
            Err(Self::Batch {
                operation,
                failures,
            })
        }
    }

    pub fn config_kind(&self) -> Option<ConfigErrorKind> {
        match self {
            Self::Config { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    pub fn registration_kind(&self) -> Option<RegistrationErrorKind> {
        match self {
            Self::Registration { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Only collector dials are worth retrying
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }
}

/// Bring-up stopped at the first failing server.
///
/// Servers brought up before the failure stay live in `registry`; the
/// caller owns them and decides whether to keep or tear them down.
#[derive(Error, Debug)]
#[error("Bring-up stopped at server '{server}': {source}")]
pub struct BringUpError {
    pub server: String,
    pub registry: Registry,
    #[source]
    pub source: CoreError,
}

impl BringUpError {
    pub fn into_parts(self) -> (Registry, CoreError) {
        (self.registry, self.source)
    }
}

pub type Result<T> = StdResult<T, CoreError>;
