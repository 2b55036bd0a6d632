use crate::router::handler::Handler;
use crate::{HandlerArgs, HandlerResponse, UserData};

use std::fmt;

use http::Method;

/// One `(path, method)` binding
#[derive(Clone)]
pub struct Route {
    path: String,
    method: Method,
    handler: Handler,
    user_data: Option<UserData>,
}

/// Introspection view of a route
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteInfo {
    pub path: String,
    pub method: Method,
}

impl Route {
    pub(crate) fn new(
        path: &str,
        method: Method,
        handler: Handler,
        user_data: Option<UserData>,
    ) -> Self {
        Self {
            path: path.to_string(),
            method,
            handler,
            user_data,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn info(&self) -> RouteInfo {
        RouteInfo {
            path: self.path.clone(),
            method: self.method.clone(),
        }
    }

    /// Invoke the handler, attaching this route's user data
    pub fn call(&self, mut args: HandlerArgs) -> HandlerResponse {
        args.user_data = self.user_data.clone();
        (self.handler)(args)
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("path", &self.path)
            .field("method", &self.method)
            .field("user_data", &self.user_data.is_some())
            .finish_non_exhaustive()
    }
}
