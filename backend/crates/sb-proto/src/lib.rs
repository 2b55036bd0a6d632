//! Wire contract for the statistics and state collector services.
//!
//! Both collectors accept the same enrollment message; the state collector
//! additionally accepts health reports.

mod clients;
mod messages;


pub use clients::{StateClient, StatisticsClient};
pub use messages::{RegisterReq, RegisterRes, ReportReq, ReportRes, register_req, report_req};

/// Fully-qualified service names as registered on the collectors
pub const STATISTICS_SERVICE: &str = "sb_stats_proto.Statistics";
pub const STATE_SERVICE: &str = "sb_state_proto.State";
