use std::any::Any;
use std::sync::Arc;

use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode};

pub type UserData = Arc<dyn Any + Send + Sync>;

pub(crate) type Handler = Arc<dyn Fn(HandlerArgs) -> HandlerResponse + Send + Sync>;

/// Everything a handler sees about one request
pub struct HandlerArgs {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Bytes,
    pub user_data: Option<UserData>,
}

impl HandlerArgs {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: None,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            user_data: None,
        }
    }

    /// User data registered with the route, if it has type `T`
    pub fn user_data<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.user_data.as_deref()?.downcast_ref::<T>()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerResponse {
    pub status: StatusCode,
    pub content_type: &'static str,
    pub body: Bytes,
}

impl HandlerResponse {
    pub fn text(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: "text/plain; charset=utf-8",
            body: Bytes::from(body.into()),
        }
    }

    pub fn json(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: "application/json",
            body: Bytes::from(body.into()),
        }
    }

    pub fn empty(status: StatusCode) -> Self {
        Self {
            status,
            content_type: "text/plain; charset=utf-8",
            body: Bytes::new(),
        }
    }
}
