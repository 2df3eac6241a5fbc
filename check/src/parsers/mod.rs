//! # Parsers
//!
//! Stateless parsers for the console output of the four commands the check issues. The
//! output is meant for humans, so rows are untrusted: anything that does not have the
//! expected shape is dropped rather than reported. The one exception is the session count,
//! which the collection cycle cannot do without.

pub mod calls;
pub mod profiles;
pub mod registrations;
pub mod sessions;

pub use calls::{
    parse_calls,
    BucketKey,
    CallBucket,
    CallBuckets,
    CallDirection,
    CallState,
};
pub use profiles::{
    parse_profiles,
    ProfileEntry,
};
pub use registrations::{
    parse_registrations,
    RegistrationRecord,
};
pub use sessions::parse_session_count;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("No \"<N> session(s) - peak\" line found in the status output")]
    SessionCountNotFound,
    #[error("Session count {0:?} is not a valid number")]
    InvalidSessionCount(String),
}

/// Comma separated rows of a tabular response, header line skipped.
///
/// No quoting is supported; the console emits plain `,` joined values.
pub(crate) fn data_rows(raw: &str) -> impl Iterator<Item = Vec<&str>> {
    raw.lines().skip(1).map(|line| line.split(',').collect())
}
