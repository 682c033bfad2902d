//! Control outcomes and the stop escalation ladder

use crate::error::{LifecycleError, LifecycleResult};
use crate::state::InstanceState;

/// Result code of a control operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlOutcome {
    Success,
    Failure,
    MultipleProcesses,
    ProcessNotFound,
}

impl ControlOutcome {
    /// User-facing message for this outcome
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Success => "operation completed successfully",
            Self::Failure => "operation failed",
            Self::MultipleProcesses => "more than one server process matches this instance",
            Self::ProcessNotFound => "no server process was found for this instance",
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }

    /// Outcome to report when an operation cannot proceed from `state`
    #[must_use]
    pub const fn from_state(state: InstanceState) -> Option<Self> {
        match state {
            InstanceState::ErrorMultipleProcess => Some(Self::MultipleProcesses),
            InstanceState::ErrorFindingProcess => Some(Self::ProcessNotFound),
            InstanceState::Started | InstanceState::Stopped => None,
        }
    }
}

/// Rungs of the stop ladder, mildest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StopStep {
    /// The instance's own stop command
    Command,
    /// Graceful termination signal
    Terminate,
    /// Forced kill
    Kill,
}

/// Executes the individual stop steps against one instance
#[cfg_attr(test, mockall::automock)]
pub trait ControlRunner {
    fn stop_command(&mut self) -> ControlOutcome;
    fn terminate(&mut self) -> ControlOutcome;
    fn kill(&mut self) -> ControlOutcome;
}

/// Stop an instance, escalating only while steps fail
///
/// A [`ControlOutcome::Failure`] moves on to the next step. Any other
/// non-success outcome means escalating cannot help and is returned at once.
///
/// # Errors
/// Returns [`LifecycleError::StopFailed`] with the last outcome when no
/// step succeeds.
pub fn stop_with_escalation<R: ControlRunner + ?Sized>(runner: &mut R) -> LifecycleResult<StopStep> {
    let mut last = ControlOutcome::Failure;
    for step in [StopStep::Command, StopStep::Terminate, StopStep::Kill] {
        last = match step {
            StopStep::Command => runner.stop_command(),
            StopStep::Terminate => runner.terminate(),
            StopStep::Kill => runner.kill(),
        };
        match last {
            ControlOutcome::Success => {
                tracing::info!(?step, "instance stopped");
                return Ok(step);
            }
            ControlOutcome::Failure => {
                tracing::warn!(?step, "stop step failed, escalating");
            }
            other => {
                tracing::warn!(?step, outcome = other.message(), "stop aborted");
                return Err(LifecycleError::StopFailed(other));
            }
        }
    }
    Err(LifecycleError::StopFailed(last))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::Sequence;
    use pretty_assertions::assert_eq;

    #[test]
    fn successful_stop_command_does_not_escalate() {
        let mut runner = MockControlRunner::new();
        runner.expect_stop_command().times(1).return_const(ControlOutcome::Success);
        runner.expect_terminate().never();
        runner.expect_kill().never();
        assert_eq!(stop_with_escalation(&mut runner).unwrap(), StopStep::Command);
    }

    #[test]
    fn failures_escalate_in_order() {
        let mut seq = Sequence::new();
        let mut runner = MockControlRunner::new();
        runner
            .expect_stop_command()
            .times(1)
            .in_sequence(&mut seq)
            .return_const(ControlOutcome::Failure);
        runner
            .expect_terminate()
            .times(1)
            .in_sequence(&mut seq)
            .return_const(ControlOutcome::Failure);
        runner
            .expect_kill()
            .times(1)
            .in_sequence(&mut seq)
            .return_const(ControlOutcome::Success);
        assert_eq!(stop_with_escalation(&mut runner).unwrap(), StopStep::Kill);
    }

    #[test]
    fn exhausted_ladder_reports_last_failure() {
        let mut runner = MockControlRunner::new();
        runner.expect_stop_command().return_const(ControlOutcome::Failure);
        runner.expect_terminate().return_const(ControlOutcome::Failure);
        runner.expect_kill().return_const(ControlOutcome::Failure);
        let err = stop_with_escalation(&mut runner).unwrap_err();
        assert!(matches!(err, LifecycleError::StopFailed(ControlOutcome::Failure)));
        assert_eq!(err.to_string(), "stop failed: operation failed");
    }

    #[test]
    fn missing_process_stops_the_ladder() {
        let mut runner = MockControlRunner::new();
        runner.expect_stop_command().return_const(ControlOutcome::ProcessNotFound);
        runner.expect_terminate().never();
        runner.expect_kill().never();
        assert!(matches!(
            stop_with_escalation(&mut runner),
            Err(LifecycleError::StopFailed(ControlOutcome::ProcessNotFound))
        ));
    }

    #[test]
    fn error_states_map_to_outcomes() {
        assert_eq!(
            ControlOutcome::from_state(InstanceState::ErrorMultipleProcess),
            Some(ControlOutcome::MultipleProcesses)
        );
        assert_eq!(ControlOutcome::from_state(InstanceState::Started), None);
        assert!(ControlOutcome::Success.is_success());
    }
}
