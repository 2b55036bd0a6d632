use std::collections::BTreeMap;

use sb_config::ServerConfig;
use sb_core::{InstanceFactory, RegistryBuilder};
use sb_http::HttpInstance;

/// Reserve a loopback port, release it, and hand back its number
pub fn free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

pub fn http_server(port: u16) -> ServerConfig {
    ServerConfig {
        server_type: "http".to_string(),
        bind_ip: "127.0.0.1".to_string(),
        bind_port: port,
        ..ServerConfig::default()
    }
}

pub fn servers(entries: &[(&str, ServerConfig)]) -> BTreeMap<String, ServerConfig> {
    entries
        .iter()
        .map(|(name, config)| (name.to_string(), config.clone()))
        .collect()
}

pub fn http_builder() -> RegistryBuilder {
    let mut factory = InstanceFactory::new();
    HttpInstance::register(&mut factory);
    RegistryBuilder::new(factory)
}
