//! Consolidate step - collapses each matched record's frames into ranges.

use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, MatchedRanges, RunPhase, RunState, StepOutcome};
use crate::ranges::consolidate_bounded;
use crate::report::ExcludedRange;

/// Builds the (location, ranges) pairs in report order.
///
/// Pairs follow canonical-location order. Several records matching one
/// location each keep their own pair, in record order.
pub struct ConsolidateStep;

impl ConsolidateStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConsolidateStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for ConsolidateStep {
    fn name(&self) -> &str {
        "Consolidate"
    }

    fn phase(&self) -> RunPhase {
        RunPhase::Consolidating
    }

    fn description(&self) -> &str {
        "Consolidate frame numbers into contiguous ranges"
    }

    fn validate_input(&self, _ctx: &Context) -> StepResult<()> {
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut RunState) -> StepResult<StepOutcome> {
        let matches = state
            .matches
            .as_ref()
            .ok_or_else(|| StepError::precondition_failed("Match step has not run"))?;

        let ceiling = ctx.frame_ceiling();
        if let Some(limit) = ceiling {
            ctx.logger
                .debug(&format!("Ranges starting after frame {} are excluded", limit));
        }

        let mut pairs = Vec::new();
        let mut excluded = Vec::new();

        for location in &ctx.locations.locations {
            for outcome in matches
                .iter()
                .filter(|o| o.location.as_deref() == Some(location.as_str()))
            {
                let record = &ctx.scans[outcome.record_index];
                let bounded = consolidate_bounded(&record.frames, ceiling);

                for range in &bounded.excluded {
                    ctx.logger.warn(&format!(
                        "{} frames {} start past the end of the media",
                        location,
                        range.label()
                    ));
                    excluded.push(ExcludedRange {
                        location: location.clone(),
                        label: range.label(),
                    });
                }

                if bounded.kept.is_empty() {
                    ctx.logger
                        .warn(&format!("{} has no frames to review", record.path));
                }

                ctx.logger.debug(&format!(
                    "{}: {} frames -> {} ranges",
                    location,
                    record.frames.len(),
                    bounded.kept.len()
                ));

                pairs.push(MatchedRanges {
                    location: location.clone(),
                    record_index: outcome.record_index,
                    scan_path: record.path.clone(),
                    ranges: bounded.kept,
                });
            }
        }

        state.summary.excluded_ranges.extend(excluded);
        state.pairs = Some(pairs);
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &RunState) -> StepResult<()> {
        let pairs = state
            .pairs
            .as_ref()
            .ok_or_else(|| StepError::invalid_output("No ranges recorded"))?;

        for pair in pairs {
            let ordered = pair.ranges.windows(2).all(|w| w[0].end + 1 < w[1].start);
            if !ordered {
                return Err(StepError::invalid_output(format!(
                    "Ranges for {} overlap or are out of order",
                    pair.location
                )));
            }
        }
        Ok(())
    }
}
