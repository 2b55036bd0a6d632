mod app;

use sb_core::InstanceContext;

/// Context binding loopback on an OS-assigned port
pub(crate) fn loopback_context(name: &str) -> InstanceContext {
    InstanceContext {
        name: name.to_string(),
        uuid: format!("{name}@127.0.0.1:0"),
        bind_ip: "127.0.0.1".to_string(),
        bind_port: 0,
    }
}
