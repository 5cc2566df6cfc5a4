//! Plan step - resolves timing, labels and output names for every range.

use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, RunPhase, RunState, StepOutcome};
use crate::planning::{plan, OutputNames};

/// Turns every (location, range) pair into an extraction plan.
///
/// Output stems are made unique here, before any rendering starts, so
/// names never depend on which worker finishes first.
pub struct PlanStep;

impl PlanStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PlanStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for PlanStep {
    fn name(&self) -> &str {
        "Plan"
    }

    fn phase(&self) -> RunPhase {
        RunPhase::Planning
    }

    fn description(&self) -> &str {
        "Plan thumbnails and segments"
    }

    fn validate_input(&self, ctx: &Context) -> StepResult<()> {
        let fps = ctx.media.fps;
        if !(fps.is_finite() && fps > 0.0) {
            return Err(StepError::invalid_input(format!(
                "Media frame rate {} is not usable",
                ctx.media.frame_rate
            )));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut RunState) -> StepResult<StepOutcome> {
        let pairs = state
            .pairs
            .as_ref()
            .ok_or_else(|| StepError::precondition_failed("Consolidate step has not run"))?;

        let names = OutputNames::new();
        let mut plans = Vec::new();

        for pair in pairs {
            for range in &pair.ranges {
                let mut extraction = plan(&pair.location, *range, ctx.media.fps)
                    .map_err(|e| StepError::plan(&pair.location, e))?;
                extraction.output_stem = names.claim(&extraction.output_stem);
                plans.push(extraction);
            }
        }

        ctx.logger.info(&format!(
            "Planned {} ranges at {:.3} fps",
            plans.len(),
            ctx.media.fps
        ));

        let empty = plans.is_empty();
        state.plans = Some(plans);

        if empty {
            return Ok(StepOutcome::Skipped("No ranges to review".to_string()));
        }
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
        let plans = state
            .plans
            .as_ref()
            .ok_or_else(|| StepError::invalid_output("No plans recorded"))?;

        if let Some(bad) = plans.iter().find(|p| p.end_seconds < p.start_seconds) {
            return Err(StepError::invalid_output(format!(
                "Plan {} ends before it starts",
                bad.output_stem
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FrameRange, ScanRecord};
    use crate::orchestrator::steps::{ConsolidateStep, MatchStep};
    use crate::orchestrator::testing::test_context;

    fn planned(ctx: &Context) -> RunState {
        let mut state = RunState::new("t");
        MatchStep::new().execute(ctx, &mut state).unwrap();
        ConsolidateStep::new().execute(ctx, &mut state).unwrap();
        PlanStep::new().execute(ctx, &mut state).unwrap();
        state
    }

    #[test]
    fn plans_every_range_in_order() {
        let (ctx, _dir) = test_context(
            vec!["/mnt/show/file1.dpx"],
            vec![ScanRecord::new("/scan/file1.dpx", vec![10, 1, 2, 3])],
        );
        let state = planned(&ctx);
        PlanStep::new().validate_output(&ctx, &state).unwrap();

        let plans = state.plans.unwrap();
        assert_eq!(plans.len(), 2);
        assert_eq!(plans[0].range, FrameRange::new(1, 3));
        assert_eq!(plans[0].representative_frame, 2);
        assert_eq!(plans[0].output_stem, "file1_1-3");
        assert_eq!(plans[1].label, "10");
    }

    #[test]
    fn colliding_stems_get_suffixes() {
        let (ctx, _dir) = test_context(
            vec!["/mnt/a/file1.dpx", "/mnt/b/file1.mov"],
            vec![
                ScanRecord::new("/scan/file1.dpx", vec![4]),
                ScanRecord::new("/scan/file1.mov", vec![4]),
            ],
        );
        let plans = planned(&ctx).plans.unwrap();

        assert_eq!(plans[0].output_stem, "file1_4");
        assert_eq!(plans[1].output_stem, "file1_4_2");
    }

    #[test]
    fn nothing_to_plan_is_skipped() {
        let (ctx, _dir) = test_context(vec!["/mnt/L1"], Vec::new());
        let mut state = RunState::new("t");
        MatchStep::new().execute(&ctx, &mut state).unwrap();
        ConsolidateStep::new().execute(&ctx, &mut state).unwrap();

        let outcome = PlanStep::new().execute(&ctx, &mut state).unwrap();
        assert!(matches!(outcome, StepOutcome::Skipped(_)));
        assert_eq!(state.plan_count(), 0);
    }
}
