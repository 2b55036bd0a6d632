pub mod handler;
pub mod route;

use crate::{CoreError, Result as CoreResult};

pub use handler::{HandlerArgs, HandlerResponse, UserData};
pub use route::{Route, RouteInfo};

use std::any::Any;
use std::collections::BTreeMap;
use std::sync::Arc;

use http::Method;

const SUPPORTED_METHODS: [Method; 7] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::PATCH,
    Method::HEAD,
    Method::OPTIONS,
];

/// Route table forwarded into an instance.
///
/// Binds `(path, method)` to a handler. Instances turn the table into
/// whatever their transport needs when they start serving.
#[derive(Clone, Default)]
pub struct Router {
    routes: BTreeMap<(String, String), Route>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `handler` to `method` (case-insensitive) on `path`
    #[track_caller]
    pub fn register_route<F>(&mut self, path: &str, method: &str, handler: F) -> CoreResult<()>
    where
        F: Fn(HandlerArgs) -> HandlerResponse + Send + Sync + 'static,
    {
        self.insert(path, method, Arc::new(handler), None)
    }

    /// Bind a handler that receives `user_data` on every call
    #[track_caller]
    pub fn register_route_with_data<F, D>(
        &mut self,
        path: &str,
        method: &str,
        handler: F,
        user_data: D,
    ) -> CoreResult<()>
    where
        F: Fn(HandlerArgs) -> HandlerResponse + Send + Sync + 'static,
        D: Any + Send + Sync,
    {
        self.insert(path, method, Arc::new(handler), Some(Arc::new(user_data)))
    }

    #[track_caller]
    fn insert(
        &mut self,
        path: &str,
        method: &str,
        handler: handler::Handler,
        user_data: Option<UserData>,
    ) -> CoreResult<()> {
        if !path.starts_with('/') {
            return Err(CoreError::route(format!(
                "path must start with '/', got '{path}'"
            )));
        }

        let method = parse_method(method)?;
        let key = (path.to_string(), method.as_str().to_string());

        if self.routes.contains_key(&key) {
            return Err(CoreError::route(format!(
                "route {} {path} already registered",
                method
            )));
        }

        self.routes
            .insert(key, Route::new(path, method, handler, user_data));
        Ok(())
    }

    /// Registered bindings, ordered by path then method
    pub fn routes(&self) -> Vec<RouteInfo> {
        self.routes.values().map(Route::info).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Route> {
        self.routes.values()
    }

    pub fn find(&self, path: &str, method: &Method) -> Option<&Route> {
        self.routes
            .get(&(path.to_string(), method.as_str().to_string()))
    }

    /// Methods bound on `path`; empty when the path is unknown
    pub fn methods_for(&self, path: &str) -> Vec<Method> {
        self.routes
            .values()
            .filter(|route| route.path() == path)
            .map(|route| route.method().clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.routes())
            .finish()
    }
}

#[track_caller]
fn parse_method(method: &str) -> CoreResult<Method> {
    let upper = method.to_ascii_uppercase();
    SUPPORTED_METHODS
        .iter()
        .find(|supported| supported.as_str() == upper)
        .cloned()
        .ok_or_else(|| CoreError::route(format!("unsupported method '{method}'")))
}
