//! # FreeSWITCH Collector
//!
//! Polls a FreeSWITCH switch over XML-RPC on a fixed interval and ships registrations,
//! sessions, calls and sofia profile states as metrics.
//!
//! ```bash
//! # Ship to the local DogStatsD agent every 15s
//! freeswitch-collector --host pbx.internal --port 8080 --tag env:prod
//!
//! # One cycle, printed as a report
//! freeswitch-collector --host pbx.internal --sink log --once
//! ```

#[macro_use]
extern crate tracing;

mod app;
mod errors;
pub mod logging;
pub mod runner;

pub use app::App;
pub use errors::init_errors;
pub use freeswitch_collector_config::Args;
pub use logging::init_logging;
pub use runner::Runner;
