use eyre::{
    Context as _,
    Result,
};
use freeswitch_collector_check::{
    Collector,
    MetricSink,
};
use signal_hook::consts::TERM_SIGNALS;
use std::{
    sync::{
        atomic::{
            AtomicBool,
            Ordering,
        },
        Arc,
    },
    thread,
    time::{
        Duration,
        Instant,
    },
};

/// Longest stretch the runner sleeps before looking at the shutdown flag again
const SLEEP_SLICE: Duration = Duration::from_millis(250);

/// Drives a collector on a fixed interval until SIGINT/SIGTERM.
///
/// Cycles run back to back on the calling thread and never overlap. A failed cycle is
/// logged and the next one starts on schedule.
pub struct Runner<C> {
    collector: C,
    sink: Box<dyn MetricSink>,
    interval: Duration,
    shutdown: Arc<AtomicBool>,
}

impl<C: Collector> Runner<C> {
    /// Create a runner that stops on the usual termination signals. A second signal while
    /// shutting down exits immediately.
    pub fn new(collector: C, sink: Box<dyn MetricSink>, interval: Duration) -> Result<Self> {
        let shutdown = Arc::new(AtomicBool::new(false));
        for signal in TERM_SIGNALS {
            signal_hook::flag::register_conditional_shutdown(*signal, 1, Arc::clone(&shutdown))
                .context("Failed to register signal handler")?;
            signal_hook::flag::register(*signal, Arc::clone(&shutdown)).context("Failed to register signal handler")?;
        }
        Ok(Self::with_shutdown(collector, sink, interval, shutdown))
    }

    /// Create a runner that stops once `shutdown` is set
    pub fn with_shutdown(
        collector: C,
        sink: Box<dyn MetricSink>,
        interval: Duration,
        shutdown: Arc<AtomicBool>,
    ) -> Self {
        Self {
            collector,
            sink,
            interval,
            shutdown,
        }
    }

    pub fn collector(&self) -> &C {
        &self.collector
    }

    pub fn run_once(&mut self) -> Result<()> {
        self.collector.collect(self.sink.as_mut())
    }

    pub fn run(&mut self) -> Result<()> {
        info!(interval = ?self.interval, collector = self.collector.name(), "Starting collection loop");

        while !self.shutdown.load(Ordering::Relaxed) {
            let started = Instant::now();
            if let Err(err) = self.run_once() {
                error!(error = %format!("{err:#}"), "Collection cycle failed");
            }
            debug!(elapsed = ?started.elapsed(), "Cycle done");
            self.sleep_until(started.checked_add(self.interval));
        }

        info!("Shutdown requested, stopping collection loop");
        Ok(())
    }

    /// Sleep until `deadline` or shutdown. A deadline past what `Instant` can represent waits
    /// for shutdown only.
    fn sleep_until(&self, deadline: Option<Instant>) {
        while !self.shutdown.load(Ordering::Relaxed) {
            let now = Instant::now();
            let nap = match deadline {
                Some(deadline) if now >= deadline => break,
                Some(deadline) => (deadline - now).min(SLEEP_SLICE),
                None => SLEEP_SLICE,
            };
            thread::sleep(nap);
        }
    }
}
