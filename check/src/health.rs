use crate::rpc::{
    Command,
    RpcError,
    RpcTransport,
};
use serde_repr::{
    Deserialize_repr,
    Serialize_repr,
};
use strum::Display;

/// Service check severity, numbered the way check receivers expect it
#[derive(Debug, Clone, Copy, Display, Serialize_repr, Deserialize_repr, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
#[strum(serialize_all = "UPPERCASE")]
pub enum HealthStatus {
    Ok = 0,
    Warning = 1,
    Critical = 2,
    Unknown = 3,
}

impl HealthStatus {
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Classify a failed probe. Failures we know to come from the network or from the RPC
    /// endpoint itself degrade to a warning; anything else is unknown.
    pub fn from_error(err: &RpcError) -> Self {
        match err {
            RpcError::Dns { .. } | RpcError::ConnectionRefused { .. } | RpcError::Protocol { .. } => {
                HealthStatus::Warning
            }
            RpcError::Fault { .. } | RpcError::MalformedResponse(_) | RpcError::Transport(_) => HealthStatus::Unknown,
        }
    }
}

/// Probe connectivity with a cheap `show status`
pub fn probe(transport: &dyn RpcTransport) -> HealthStatus {
    match transport.run(Command::STATUS) {
        Ok(_) => HealthStatus::Ok,
        Err(err) => {
            let status = HealthStatus::from_error(&err);
            warn!(%status, error = %err, "RPC health probe failed");
            status
        }
    }
}
