//! # Collectors Module
//!
//! - **`Collector` trait**: the interface the runner drives once per interval
//! - **`FreeswitchCheck`**: probes RPC health, then queries registrations, sessions, calls
//!   and sofia profiles, emitting each as gauges

pub mod collector;
pub mod freeswitch_check;

pub use collector::Collector;
pub use freeswitch_check::FreeswitchCheck;
