pub mod instance;
pub mod instance_factory;
pub mod instance_state;
