//! Thumbnail step - renders one still per planned range and builds the report.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, RunPhase, RunState, StepOutcome};
use crate::orchestrator::workers::run_ordered;
use crate::report::{ItemFailure, Report, ReportHeader, ReportRow, Thumbnail};

use super::record_tool_output;

/// Renders thumbnails on the worker pool and assembles the report rows.
///
/// A failed render still yields a row, without a thumbnail.
pub struct ThumbnailStep;

impl ThumbnailStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ThumbnailStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for ThumbnailStep {
    fn name(&self) -> &str {
        "Thumbnails"
    }

    fn phase(&self) -> RunPhase {
        RunPhase::Rendering
    }

    fn description(&self) -> &str {
        "Render a thumbnail for every range"
    }

    fn validate_input(&self, _ctx: &Context) -> StepResult<()> {
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut RunState) -> StepResult<StepOutcome> {
        let plans = state
            .plans
            .as_ref()
            .ok_or_else(|| StepError::precondition_failed("Plan step has not run"))?;

        ctx.logger.section("Thumbnail Rendering");
        ctx.logger.info(&format!(
            "Rendering {} thumbnails with {} workers",
            plans.len(),
            ctx.options.workers.max(1)
        ));

        let cancel = ctx.cancel_handle();
        let total = plans.len();
        let done = AtomicUsize::new(0);
        let results = run_ordered(plans, ctx.options.workers, &cancel, |_, plan| {
            let rendered = ctx.renderer.thumbnail(
                &ctx.media.path,
                plan.representative_frame,
                ctx.options.tool_timeout,
            );
            let finished = done.fetch_add(1, Ordering::SeqCst) + 1;
            let percent = (finished * 100 / total.max(1)) as u32;
            ctx.report_progress(self.name(), percent, &plan.output_stem);
            rendered
        });

        if cancel.is_cancelled() {
            return Err(StepError::Cancelled);
        }

        let mut report = Report::new(ReportHeader::from(&ctx.locations));
        for (plan, result) in plans.iter().zip(results) {
            let thumbnail = match result {
                Some(Ok(png)) => Some(Thumbnail::new(
                    plan.representative_frame,
                    &plan.output_stem,
                    png,
                )),
                Some(Err(e)) => {
                    record_tool_output(ctx, &e);
                    ctx.logger.warn(&format!(
                        "Thumbnail for {} frame {} failed: {}",
                        plan.location, plan.representative_frame, e
                    ));
                    state
                        .summary
                        .thumbnail_failures
                        .push(ItemFailure::new(&plan.output_stem, e.to_string()));
                    None
                }
                None => return Err(StepError::Cancelled),
            };
            report.rows.push(ReportRow::from_plan(plan, thumbnail));
        }

        ctx.logger.success(&format!(
            "{} rows, {} without thumbnail",
            report.rows.len(),
            state.summary.thumbnail_failures.len()
        ));

        state.report = Some(report);
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
        let rows = state.report.as_ref().map_or(0, |r| r.rows.len());
        if rows != state.plan_count() {
            return Err(StepError::invalid_output(format!(
                "{} report rows for {} plans",
                rows,
                state.plan_count()
            )));
        }
        Ok(())
    }
}
