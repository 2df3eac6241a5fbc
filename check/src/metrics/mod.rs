//! # Metrics Module
//!
//! The metric vocabulary of the check and the sinks that ship it.
//!
//! - **`MetricSink`**: capability interface the collector emits through
//! - **`StatsdSink`**: DogStatsD datagrams over UDP
//! - **`LogSink`**: structured `tracing` events, for dry runs
//! - **`CycleData`**: everything one collection cycle observed

pub mod cycle_data;
pub mod log_sink;
#[cfg(test)]
pub(crate) mod recording;
pub mod statsd;

use crate::health::HealthStatus;
pub use cycle_data::*;
pub use log_sink::LogSink;
pub use statsd::StatsdSink;

// Metric names, relative to the configured namespace
pub const CAN_CONNECT: &str = "rpc.can_connect";
pub const REGISTRATION_TOTAL: &str = "registration.total";
pub const REGISTRATION: &str = "registration";
pub const SESSIONS: &str = "sessions";
pub const CALLS: &str = "calls";
pub const SOFIA_PROFILE: &str = "sofia.profile";

/// Where gauges and service checks go
pub trait MetricSink {
    fn gauge(&mut self, name: &str, value: f64, tags: &[String]);

    fn service_check(&mut self, name: &str, status: HealthStatus, tags: &[String]);
}

impl<S: MetricSink + ?Sized> MetricSink for Box<S> {
    fn gauge(&mut self, name: &str, value: f64, tags: &[String]) {
        (**self).gauge(name, value, tags)
    }

    fn service_check(&mut self, name: &str, status: HealthStatus, tags: &[String]) {
        (**self).service_check(name, status, tags)
    }
}
