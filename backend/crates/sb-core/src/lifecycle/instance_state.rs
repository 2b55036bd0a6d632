use crate::{CoreError, Result as CoreResult};

use std::fmt;

/// Lifecycle of one instance.
///
/// `Uninitialized -> Initialized -> Running -> {Stopped | Aborted}`, with
/// `Initialized -> {Stopped | Aborted}` for instances that never ran.
/// Neither terminal state can run again. `Stopped -> Aborted` escalates a
/// graceful stop that is still draining into a forced one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InstanceState {
    #[default]
    Uninitialized,
    Initialized,
    Running,
    Stopped,
    Aborted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleOp {
    Initialize,
    Run,
    Shutdown,
    Abort,
}

impl InstanceState {
    /// State reached by applying `op`, or None when the transition is illegal.
    ///
    /// A repeated shutdown or abort leaves the state where it is, and so does
    /// a shutdown after an abort.
    pub fn next(self, op: LifecycleOp) -> Option<Self> {
        use InstanceState::*;
        use LifecycleOp::*;

        match (self, op) {
            (Uninitialized, Initialize) => Some(Initialized),
            (Initialized, Run) => Some(Running),
            (Initialized | Running, Shutdown) => Some(Stopped),
            (Initialized | Running | Stopped, Abort) => Some(Aborted),
            (Stopped, Shutdown) | (Aborted, Shutdown | Abort) => Some(self),
            _ => None,
        }
    }

    /// Like `next`, but an illegal transition is an instance error
    #[track_caller]
    pub fn transition(self, op: LifecycleOp) -> CoreResult<Self> {
        self.next(op)
            .ok_or_else(|| CoreError::instance(format!("cannot {op} while {self}")))
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Stopped | Self::Aborted)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Initialized => "initialized",
            Self::Running => "running",
            Self::Stopped => "stopped",
            Self::Aborted => "aborted",
        }
    }
}

impl fmt::Display for InstanceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for LifecycleOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initialize => f.write_str("initialize"),
            Self::Run => f.write_str("run"),
            Self::Shutdown => f.write_str("shut down"),
            Self::Abort => f.write_str("abort"),
        }
    }
}
