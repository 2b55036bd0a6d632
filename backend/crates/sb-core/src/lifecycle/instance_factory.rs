use crate::{CoreError, Instance, InstanceContext, Result as CoreResult, ServerType};

use std::collections::HashMap;
use std::sync::Arc;

pub type InstanceConstructor = Arc<dyn Fn(InstanceContext) -> Arc<dyn Instance> + Send + Sync>;

/// Constructor table keyed by server type.
///
/// Variants register themselves here; adding one never touches the
/// orchestration code.
#[derive(Clone, Default)]
pub struct InstanceFactory {
    constructors: HashMap<ServerType, InstanceConstructor>,
}

impl InstanceFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the constructor for `server_type`
    pub fn register<F>(&mut self, server_type: ServerType, constructor: F) -> &mut Self
    where
        F: Fn(InstanceContext) -> Arc<dyn Instance> + Send + Sync + 'static,
    {
        self.constructors.insert(server_type, Arc::new(constructor));
        self
    }

    pub fn with<F>(mut self, server_type: ServerType, constructor: F) -> Self
    where
        F: Fn(InstanceContext) -> Arc<dyn Instance> + Send + Sync + 'static,
    {
        self.register(server_type, constructor);
        self
    }

    pub fn supports(&self, server_type: ServerType) -> bool {
        self.constructors.contains_key(&server_type)
    }

    #[track_caller]
    pub fn create(
        &self,
        server_type: ServerType,
        context: InstanceContext,
    ) -> CoreResult<Arc<dyn Instance>> {
        match self.constructors.get(&server_type) {
            Some(constructor) => Ok(constructor(context)),
            None => Err(CoreError::unknown_type(server_type.as_str())),
        }
    }
}
