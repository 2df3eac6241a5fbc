use crate::{
    health::HealthStatus,
    parsers::{
        CallBuckets,
        ProfileEntry,
        RegistrationRecord,
    },
};
use chrono::{
    DateTime,
    Utc,
};
use serde::Serialize;
use strum::Display;

/// The data-fetching steps of a collection cycle, in execution order
#[derive(Debug, Clone, Copy, Display, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Step {
    Registrations,
    Sessions,
    Calls,
    Profiles,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StepFailure {
    pub step: Step,
    pub error: String,
}

/// What one collection cycle observed. Steps that failed or never ran stay `None`.
#[derive(Debug, Clone, Serialize)]
pub struct CycleData {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub health: HealthStatus,
    pub registrations: Option<Vec<RegistrationRecord>>,
    pub sessions: Option<u64>,
    pub calls: Option<CallBuckets>,
    pub profiles: Option<Vec<ProfileEntry>>,
    pub failures: Vec<StepFailure>,
    pub aborted: bool,
}

impl CycleData {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            finished_at: started_at,
            health: HealthStatus::Unknown,
            registrations: None,
            sessions: None,
            calls: None,
            profiles: None,
            failures: Vec::new(),
            aborted: false,
        }
    }

    pub fn record_failure(&mut self, step: Step, error: &eyre::Report) {
        self.failures.push(StepFailure {
            step,
            error: format!("{error:#}"),
        });
    }

    pub fn finalize(&mut self) {
        self.finished_at = Utc::now();
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && !self.aborted
    }
}
