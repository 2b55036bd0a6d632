//! Orchestration core for serverbox.
//!
//! A [`RegistryBuilder`] turns configured servers into a [`Registry`] of
//! [`Server`]s, each owning one [`Instance`] and optional collector
//! clients. The [`Orchestrator`] drives run, shutdown and abort across
//! that registry.

pub mod error;
pub mod identity;
pub mod lifecycle;
pub mod metrics;
pub mod models;
pub mod orchestrator;
pub mod registration;
pub mod registry;
pub mod router;
pub mod server;

pub use error::{
    BatchOperation, BringUpError, ConfigErrorKind, CoreError, RegistrationErrorKind, Result,
    ServerFailure,
};
pub use identity::derive_uuid;
pub use lifecycle::instance::{Instance, InstanceContext};
pub use lifecycle::instance_factory::{InstanceConstructor, InstanceFactory};
pub use lifecycle::instance_state::{InstanceState, LifecycleOp};
pub use metrics::Metrics;
pub use models::server_type::ServerType;
pub use orchestrator::Orchestrator;
pub use registration::collector_kind::{CollectorKind, RegistrationType, ReportedState};
pub use registration::grpc_transport::{GrpcConnector, GrpcTransport};
pub use registration::registration_client::RegistrationClient;
pub use registration::retry::RetryPolicy;
pub use registration::transport::{CollectorConnector, CollectorTransport};
pub use registry::{Registry, RegistryBuilder};
pub use router::handler::{HandlerArgs, HandlerResponse, UserData};
pub use router::route::{Route, RouteInfo};
pub use router::Router;
pub use server::{Server, ServerIdentity, server_span};

#[cfg(test)]
mod tests;
