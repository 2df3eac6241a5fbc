use crate::metrics::MetricSink;
use eyre::Result;

/// Trait for collecting, emitting and formatting data
pub trait Collector {
    /// Run one collection cycle, emitting everything observed into `sink`
    fn collect(&mut self, sink: &mut dyn MetricSink) -> Result<()>;

    /// Format the last cycle for display
    fn format(&self) -> String;

    /// Get the last cycle as JSON
    fn summary(&self) -> serde_json::Value;

    /// Get the name of this collector
    fn name(&self) -> &'static str;
}
