//! Error types for lifecycle control

use crate::control::ControlOutcome;
use crate::state::InstanceState;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    /// The process table could not be queried
    #[error("process query failed: {0}")]
    Query(String),

    /// Every stop step failed; carries the outcome of the last one
    #[error("stop failed: {}", .0.message())]
    StopFailed(ControlOutcome),

    #[error("instance did not reach {desired:?} within {waited:?} (last seen {last:?})")]
    Timeout {
        desired: InstanceState,
        last: InstanceState,
        waited: Duration,
    },
}

pub type LifecycleResult<T> = Result<T, LifecycleError>;
