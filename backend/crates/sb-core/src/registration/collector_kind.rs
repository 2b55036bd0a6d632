use std::fmt;

use sb_proto::{register_req, report_req};

/// Which collector a registration client talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectorKind {
    Statistics,
    State,
}

impl CollectorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Statistics => "statistics",
            Self::State => "state",
        }
    }
}

impl fmt::Display for CollectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a uuid enrolls as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationType {
    Server,
    State,
}

impl RegistrationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Server => "server",
            Self::State => "state",
        }
    }
}

impl From<RegistrationType> for register_req::Type {
    fn from(value: RegistrationType) -> Self {
        match value {
            RegistrationType::Server => register_req::Type::Server,
            RegistrationType::State => register_req::Type::State,
        }
    }
}

impl fmt::Display for RegistrationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Health state carried by a state report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportedState {
    Up,
    Down,
    Maintenance,
}

impl From<ReportedState> for report_req::State {
    fn from(value: ReportedState) -> Self {
        match value {
            ReportedState::Up => report_req::State::Up,
            ReportedState::Down => report_req::State::Down,
            ReportedState::Maintenance => report_req::State::Maintenance,
        }
    }
}

impl fmt::Display for ReportedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(report_req::State::from(*self).as_str_name())
    }
}
