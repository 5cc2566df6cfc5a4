//! Segment upload step - extracts each reported range and uploads it.

use crate::media::MediaError;
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, RunPhase, RunState, SegmentOutput, StepOutcome};
use crate::orchestrator::workers::run_ordered;
use crate::report::ItemFailure;
use crate::upload::{UploadError, UploadResponse};

use super::record_tool_output;

/// Outcome of one extract-then-upload attempt.
enum SegmentResult {
    Answered(UploadResponse),
    ExtractFailed(MediaError),
    UploadFailed(UploadError),
}

/// Extracts a segment per report row and sends it to the upload service.
///
/// Optional: skipped when no uploader or credentials are configured. Every
/// failure is recorded per item and never stops the remaining uploads.
pub struct SegmentUploadStep;

impl SegmentUploadStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SegmentUploadStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for SegmentUploadStep {
    fn name(&self) -> &str {
        "Upload"
    }

    fn phase(&self) -> RunPhase {
        RunPhase::Rendering
    }

    fn description(&self) -> &str {
        "Extract and upload a segment for every range"
    }

    fn is_optional(&self) -> bool {
        true
    }

    fn validate_input(&self, ctx: &Context) -> StepResult<()> {
        if ctx.uploader.is_none() {
            return Err(StepError::precondition_failed("No upload service configured"));
        }
        if ctx.credentials.is_none() {
            return Err(StepError::precondition_failed("No upload credentials"));
        }
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut RunState) -> StepResult<StepOutcome> {
        let (Some(uploader), Some(credentials)) = (&ctx.uploader, &ctx.credentials) else {
            return Err(StepError::precondition_failed("Upload is not configured"));
        };
        let report = state
            .report
            .as_ref()
            .ok_or_else(|| StepError::precondition_failed("Thumbnail step has not run"))?;

        let plans = report.upload_plans();
        if plans.is_empty() {
            state.segments = Some(SegmentOutput::default());
            return Ok(StepOutcome::Skipped("No segments to upload".to_string()));
        }

        ctx.logger.section("Segment Upload");
        ctx.logger.info(&format!("Uploading {} segments", plans.len()));

        let cancel = ctx.cancel_handle();
        let results = run_ordered(&plans, ctx.options.workers, &cancel, |_, plan| {
            ctx.logger.command(&format!(
                "extract {} {:.3}-{:.3}",
                plan.output_stem, plan.start_seconds, plan.end_seconds
            ));
            let segment = match ctx.renderer.extract_segment(
                &ctx.media.path,
                plan.start_seconds,
                plan.end_seconds,
                &plan.output_stem,
                ctx.options.tool_timeout,
            ) {
                Ok(path) => path,
                Err(e) => return SegmentResult::ExtractFailed(e),
            };

            match uploader.upload(&segment, credentials, ctx.options.upload_timeout) {
                Ok(response) => SegmentResult::Answered(response),
                Err(e) => SegmentResult::UploadFailed(e),
            }
        });

        if cancel.is_cancelled() {
            return Err(StepError::Cancelled);
        }

        let mut output = SegmentOutput {
            attempted: plans.len(),
            uploaded: 0,
        };

        for (plan, result) in plans.iter().zip(results) {
            let entry = plan.entry();
            match result {
                Some(SegmentResult::Answered(response)) if response.is_success() => {
                    ctx.logger.info(&format!(
                        "{} uploaded ({}): {}",
                        entry, response.status, response.body
                    ));
                    output.uploaded += 1;
                    state.summary.uploaded.push(plan.output_stem.clone());
                }
                Some(SegmentResult::Answered(response)) => {
                    ctx.logger.warn(&format!(
                        "{} rejected ({}): {}",
                        entry, response.status, response.body
                    ));
                    state.summary.upload_failures.push(
                        ItemFailure::new(&plan.output_stem, response.body)
                            .with_status(response.status),
                    );
                }
                Some(SegmentResult::UploadFailed(e)) => {
                    ctx.logger.warn(&format!("{} upload failed: {}", entry, e));
                    state
                        .summary
                        .upload_failures
                        .push(ItemFailure::new(&plan.output_stem, e.to_string()));
                }
                Some(SegmentResult::ExtractFailed(e)) => {
                    record_tool_output(ctx, &e);
                    ctx.logger.warn(&format!("{} extraction failed: {}", entry, e));
                    state
                        .summary
                        .segment_failures
                        .push(ItemFailure::new(&plan.output_stem, e.to_string()));
                }
                None => return Err(StepError::Cancelled),
            }
        }

        ctx.logger.success(&format!(
            "{} of {} segments uploaded",
            output.uploaded, output.attempted
        ));
        state.segments = Some(output);
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
        match &state.segments {
            Some(segments) if segments.uploaded <= segments.attempted => Ok(()),
            Some(_) => Err(StepError::invalid_output("More uploads than segments")),
            None => Err(StepError::invalid_output("No segment results recorded")),
        }
    }
}
