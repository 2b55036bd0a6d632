use crate::{CoreError, Result as CoreResult};

use std::fmt;
use std::str::FromStr;

/// Server technology tag selecting the instance variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ServerType {
    Http,
}

impl ServerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Http => "http",
        }
    }
}

impl FromStr for ServerType {
    type Err = CoreError;

    #[track_caller]
    fn from_str(s: &str) -> CoreResult<Self> {
        match s {
            "http" => Ok(Self::Http),
            _ => Err(CoreError::invalid_type(s)),
        }
    }
}

impl fmt::Display for ServerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
