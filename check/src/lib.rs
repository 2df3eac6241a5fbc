//! # FreeSWITCH Check
//!
//! Periodic telemetry for a FreeSWITCH switch, gathered over its XML-RPC API console.
//!
//! ## Architecture
//!
//! - **`rpc`**: XML-RPC transport and its error classification
//! - **`parsers`**: turn console output into typed records
//!   - `show registrations` → [`RegistrationRecord`]s
//!   - `show status` → current session count
//!   - `show calls` → [`CallBuckets`] per call state and direction
//!   - `sofia status` → [`ProfileEntry`]s
//! - **`health`**: the `rpc.can_connect` service check
//! - **`metrics`**: metric names, the [`MetricSink`] interface and its implementations
//! - **`collectors`**: [`FreeswitchCheck`], which runs one collection cycle at a time
//!
//! ## Emitted metrics
//!
//! | name                  | kind          | tags                  |
//! |-----------------------|---------------|-----------------------|
//! | `rpc.can_connect`     | service check |                       |
//! | `registration.total`  | gauge         |                       |
//! | `registration`        | gauge         | `user`                |
//! | `sessions`            | gauge         |                       |
//! | `calls`               | gauge         | `direction`, `state`  |
//! | `sofia.profile`       | gauge         | `profile`, `status`   |
//!
//! All names are prefixed with the configured namespace.

#[macro_use]
extern crate tracing;

pub mod collectors;
pub mod health;
pub mod metrics;
pub mod parsers;
pub mod rpc;

pub use collectors::{
    Collector,
    FreeswitchCheck,
};
pub use health::HealthStatus;
pub use metrics::{
    CycleData,
    LogSink,
    MetricSink,
    StatsdSink,
};
pub use parsers::{
    CallBuckets,
    ParseError,
    ProfileEntry,
    RegistrationRecord,
};
pub use rpc::{
    Command,
    RpcError,
    RpcTransport,
    XmlRpcClient,
};
