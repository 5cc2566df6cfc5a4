//! Pipeline step trait definition.

use super::errors::StepResult;
use super::types::{Context, RunPhase, RunState, StepOutcome};

/// Trait for pipeline steps.
///
/// The pipeline runner calls these methods in order:
///
/// 1. `validate_input` - Check preconditions before execution
/// 2. `execute` - Perform the step's work
/// 3. `validate_output` - Verify the step produced valid output
///
/// Per-item failures (a missing thumbnail, a rejected upload) are recorded
/// in the run summary and do not make `execute` fail.
pub trait PipelineStep: Send + Sync {
    /// Step name (for logging and error context).
    fn name(&self) -> &str;

    /// Run phase this step belongs to.
    fn phase(&self) -> RunPhase;

    fn validate_input(&self, ctx: &Context) -> StepResult<()>;

    /// Do the work and record results in `state`.
    fn execute(&self, ctx: &Context, state: &mut RunState) -> StepResult<StepOutcome>;

    /// Called only after `execute` returned `Success`.
    fn validate_output(&self, ctx: &Context, state: &RunState) -> StepResult<()>;

    fn is_optional(&self) -> bool {
        false
    }

    fn description(&self) -> &str {
        self.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockStep;

    impl PipelineStep for MockStep {
        fn name(&self) -> &str {
            "Mock"
        }

        fn phase(&self) -> RunPhase {
            RunPhase::Planning
        }

        fn validate_input(&self, _ctx: &Context) -> StepResult<()> {
            Ok(())
        }

        fn execute(&self, _ctx: &Context, _state: &mut RunState) -> StepResult<StepOutcome> {
            Ok(StepOutcome::Success)
        }

        fn validate_output(&self, _ctx: &Context, _state: &RunState) -> StepResult<()> {
            Ok(())
        }
    }

    #[test]
    fn step_trait_object_works() {
        let step: Box<dyn PipelineStep> = Box::new(MockStep);
        assert_eq!(step.name(), "Mock");
        assert_eq!(step.description(), "Mock");
        assert_eq!(step.phase(), RunPhase::Planning);
        assert!(!step.is_optional());
    }
}
