//! Review pipeline for reconciling scan records with canonical locations.
//!
//! A run is a sequence of steps sharing a read-only [`Context`] and a
//! mutable [`RunState`]. Thumbnail rendering and segment upload fan out over
//! a bounded worker pool and keep results in plan order.
//!
//! # Architecture
//!
//! ```text
//! Pipeline
//!     ├── Step: Match        scan records -> canonical locations
//!     ├── Step: Consolidate  frames -> contiguous ranges
//!     ├── Step: Plan         ranges -> timing, labels, output names
//!     ├── Step: Thumbnails   one still per range, report rows
//!     └── Step: Upload       optional, one segment per row
//! ```
//!
//! # Example
//!
//! ```ignore
//! use reelcheck_core::orchestrator::{run_review, Context};
//!
//! let ctx = Context::new("reel1", locations, scans, media, renderer, logger);
//! let report = run_review(&ctx, false)?;
//! println!("{}", report.summary.render_text());
//! ```

mod errors;
mod pipeline;
mod step;
pub mod steps;
mod types;
mod workers;

#[cfg(test)]
mod testing;

pub use errors::{PipelineError, PipelineResult, StepError, StepResult};
pub use pipeline::{CancelHandle, Pipeline, PipelineRunResult};
pub use step::PipelineStep;
pub use steps::{ConsolidateStep, MatchStep, PlanStep, SegmentUploadStep, ThumbnailStep};
pub use types::{
    Context, MatchedRanges, ProgressCallback, RunOptions, RunPhase, RunState, SegmentOutput,
    StepOutcome,
};
pub use workers::run_ordered;

use crate::report::Report;

/// Create the review pipeline with all steps in order.
///
/// 1. Match - pair scan records with canonical locations
/// 2. Consolidate - collapse frames into ranges
/// 3. Plan - resolve timing and unique output names
/// 4. Thumbnails - render stills and build the report
/// 5. Upload - extract and upload segments (only with `with_upload`)
pub fn create_review_pipeline(with_upload: bool) -> Pipeline {
    let pipeline = Pipeline::new()
        .with_step(MatchStep::new())
        .with_step(ConsolidateStep::new())
        .with_step(PlanStep::new())
        .with_step(ThumbnailStep::new());

    if with_upload {
        pipeline.with_step(SegmentUploadStep::new())
    } else {
        pipeline
    }
}

/// Run a whole review and return the report with its summary.
pub fn run_review(ctx: &Context, with_upload: bool) -> PipelineResult<Report> {
    let pipeline = create_review_pipeline(with_upload);
    let mut state = RunState::new(&ctx.run_name);

    let result = pipeline.run(ctx, &mut state)?;
    ctx.logger.info(&format!(
        "Steps completed: {}; skipped: {}",
        result.steps_completed.join(", "),
        result.steps_skipped.join(", ")
    ));

    Ok(state.into_report())
}
