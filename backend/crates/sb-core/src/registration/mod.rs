pub mod collector_kind;
pub mod grpc_transport;
pub mod registration_client;
pub mod retry;
pub mod transport;
