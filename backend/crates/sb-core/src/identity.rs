/// Derive a server's external identity: `"<name>@<ip>:<port>"`.
///
/// The ip is embedded verbatim; nothing here validates it.
pub fn derive_uuid(name: &str, ip: &str, port: u16) -> String {
    format!("{name}@{ip}:{port}")
}
