use super::MetricSink;
use crate::health::HealthStatus;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Gauge {
    pub(crate) name: String,
    pub(crate) value: f64,
    pub(crate) tags: Vec<String>,
}

/// Keeps every emission in memory
#[derive(Debug, Default)]
pub(crate) struct RecordingSink {
    pub(crate) gauges: Vec<Gauge>,
    pub(crate) service_checks: Vec<(String, HealthStatus, Vec<String>)>,
}

impl RecordingSink {
    pub(crate) fn gauges_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Gauge> + 'a {
        self.gauges.iter().filter(move |gauge| gauge.name == name)
    }
}

impl MetricSink for RecordingSink {
    fn gauge(&mut self, name: &str, value: f64, tags: &[String]) {
        self.gauges.push(Gauge {
            name: name.to_string(),
            value,
            tags: tags.to_vec(),
        });
    }

    fn service_check(&mut self, name: &str, status: HealthStatus, tags: &[String]) {
        self.service_checks.push((name.to_string(), status, tags.to_vec()));
    }
}
