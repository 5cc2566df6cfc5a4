//! Pipeline runner that executes steps in sequence.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::errors::{PipelineError, PipelineResult, StepError};
use super::step::PipelineStep;
use super::types::{Context, RunPhase, RunState, StepOutcome};

/// Pipeline that runs a sequence of steps.
///
/// Validation runs before and after each step. The run phase in
/// [`RunState`] follows the step being executed and ends in `Done` or
/// `Failed`.
pub struct Pipeline {
    steps: Vec<Box<dyn PipelineStep>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    pub fn add_step<S: PipelineStep + 'static>(&mut self, step: S) -> &mut Self {
        self.steps.push(Box::new(step));
        self
    }

    /// Add a step (builder pattern).
    pub fn with_step<S: PipelineStep + 'static>(mut self, step: S) -> Self {
        self.add_step(step);
        self
    }

    /// Run every step against `ctx`, accumulating results in `state`.
    ///
    /// An optional step whose input validation fails is skipped with a
    /// warning instead of failing the run.
    pub fn run(&self, ctx: &Context, state: &mut RunState) -> PipelineResult<PipelineRunResult> {
        let mut result = PipelineRunResult {
            steps_completed: Vec::new(),
            steps_skipped: Vec::new(),
        };

        let total_steps = self.steps.len().max(1);

        for (i, step) in self.steps.iter().enumerate() {
            let step_name = step.name();

            if ctx.is_cancelled() {
                ctx.logger
                    .warn(&format!("Run cancelled before step '{}'", step_name));
                return Err(Self::fail(ctx, state, step_name, StepError::Cancelled));
            }

            state.phase = step.phase();
            ctx.logger.phase(step_name);
            ctx.logger.clear_tail();

            let percent = ((i as f64 / total_steps as f64) * 100.0) as u32;
            ctx.report_progress(step_name, percent, step.description());

            ctx.logger
                .debug(&format!("Validating input for '{}'", step_name));
            if let Err(e) = step.validate_input(ctx) {
                if step.is_optional() {
                    ctx.logger.warn(&format!("{} skipped: {}", step_name, e));
                    result.steps_skipped.push(step_name.to_string());
                    continue;
                }
                return Err(Self::fail(ctx, state, step_name, e));
            }

            let outcome = match step.execute(ctx, state) {
                Ok(outcome) => outcome,
                Err(e) => return Err(Self::fail(ctx, state, step_name, e)),
            };

            match outcome {
                StepOutcome::Success => {
                    if let Err(e) = step.validate_output(ctx, state) {
                        return Err(Self::fail(ctx, state, step_name, e));
                    }
                    ctx.logger.success(&format!("{} completed", step_name));
                    result.steps_completed.push(step_name.to_string());
                }
                StepOutcome::Skipped(reason) => {
                    ctx.logger
                        .info(&format!("{} skipped: {}", step_name, reason));
                    result.steps_skipped.push(step_name.to_string());
                }
            }
        }

        state.phase = RunPhase::Done;
        ctx.report_progress("Complete", 100, "Run finished");
        ctx.logger.success("Run completed");

        Ok(result)
    }

    /// Move the run to its failed phase and wrap the step error.
    fn fail(
        ctx: &Context,
        state: &mut RunState,
        step_name: &str,
        err: StepError,
    ) -> PipelineError {
        if matches!(err, StepError::Cancelled) {
            state.summary.cancelled = true;
            state.phase = RunPhase::Failed("cancelled".to_string());
            return PipelineError::cancelled(&ctx.run_name);
        }

        ctx.logger.error(&format!("{} failed: {}", step_name, err));
        ctx.logger.show_tail(step_name);
        state.phase = RunPhase::Failed(err.to_string());
        PipelineError::step_failed(&ctx.run_name, step_name, err)
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle for cancelling a running pipeline.
///
/// Steps check it between plans; an in-flight tool call finishes but its
/// result is discarded.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Result of a pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineRunResult {
    pub steps_completed: Vec<String>,
    pub steps_skipped: Vec<String>,
}

impl PipelineRunResult {
    /// Check if all steps completed (none skipped).
    pub fn all_completed(&self) -> bool {
        self.steps_skipped.is_empty()
    }

    pub fn total_steps(&self) -> usize {
        self.steps_completed.len() + self.steps_skipped.len()
    }
}
