use super::MetricSink;
use crate::health::HealthStatus;

/// Logs every emission instead of shipping it
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl MetricSink for LogSink {
    fn gauge(&mut self, name: &str, value: f64, tags: &[String]) {
        info!(target: "metrics", metric = name, value, tags = ?tags, "gauge");
    }

    fn service_check(&mut self, name: &str, status: HealthStatus, tags: &[String]) {
        info!(target: "metrics", check = name, %status, code = status.code(), tags = ?tags, "service check");
    }
}
