use metrics::{counter, gauge};

/// Metrics for bring-up and registry-wide lifecycle operations
#[derive(Clone)]
pub struct Metrics {
    prefix: &'static str,
}

impl Metrics {
    pub fn new() -> Self {
        Self { prefix: "sb_core" }
    }

    /// Record a server that completed bring-up
    pub fn server_brought_up(&self, server_type: &str) {
        counter!(format!("{}.servers.brought_up", self.prefix)).increment(1);
        counter!(format!("{}.servers.brought_up.{}", self.prefix, server_type)).increment(1);
    }

    /// Record a bring-up that stopped at a failing server
    pub fn bring_up_failed(&self, reason: &str) {
        counter!(format!("{}.bring_up.failed", self.prefix)).increment(1);
        counter!(format!("{}.bring_up.failed.{}", self.prefix, reason)).increment(1);
    }

    pub fn servers_enabled(&self, count: usize) {
        gauge!(format!("{}.servers.enabled", self.prefix)).set(count as f64);
    }

    pub fn server_started(&self) {
        counter!(format!("{}.servers.started", self.prefix)).increment(1);
        gauge!(format!("{}.servers.running", self.prefix)).increment(1.0);
    }

    /// Record a run task that returned, `outcome` is "ok" or "error"
    pub fn server_finished(&self, outcome: &str) {
        counter!(format!("{}.servers.finished.{}", self.prefix, outcome)).increment(1);
        gauge!(format!("{}.servers.running", self.prefix)).decrement(1.0);
    }

    /// Record one server's teardown under `operation` ("shutdown" or "abort")
    pub fn teardown(&self, operation: &str, ok: bool) {
        let outcome = if ok { "ok" } else { "error" };
        counter!(format!("{}.teardown.{}.{}", self.prefix, operation, outcome)).increment(1);
    }

    pub fn registration(&self, kind: &str, ok: bool) {
        let outcome = if ok { "ok" } else { "error" };
        counter!(format!("{}.registrations.{}.{}", self.prefix, kind, outcome)).increment(1);
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
