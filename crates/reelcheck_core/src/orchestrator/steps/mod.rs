//! Pipeline steps of a review run, in execution order.

mod consolidate;
mod matching;
mod plan;
mod segment_upload;
mod thumbnail;

pub use consolidate::ConsolidateStep;
pub use matching::MatchStep;
pub use plan::PlanStep;
pub use segment_upload::SegmentUploadStep;
pub use thumbnail::ThumbnailStep;

use crate::media::MediaError;
use crate::orchestrator::types::Context;

/// Keep a failed tool's stderr in the run log tail.
fn record_tool_output(ctx: &Context, err: &MediaError) {
    if let MediaError::CommandFailed { message, .. } = err {
        for line in message.lines() {
            ctx.logger.output_line(line, true);
        }
    }
}
