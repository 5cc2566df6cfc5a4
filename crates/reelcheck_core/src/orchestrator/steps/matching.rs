//! Match step - pairs scan records with canonical locations.

use std::collections::HashSet;

use crate::matching::match_records;
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, RunPhase, RunState, StepOutcome};
use crate::report::AmbiguousMatch;

/// Matches every scan record to a canonical location by file name.
///
/// Unmatched records and locations without any record are logged and
/// listed in the summary; neither stops the run.
pub struct MatchStep;

impl MatchStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MatchStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for MatchStep {
    fn name(&self) -> &str {
        "Match"
    }

    fn phase(&self) -> RunPhase {
        RunPhase::Matching
    }

    fn description(&self) -> &str {
        "Match scan records to canonical locations"
    }

    fn validate_input(&self, _ctx: &Context) -> StepResult<()> {
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut RunState) -> StepResult<StepOutcome> {
        ctx.logger.info(&format!(
            "Matching {} scan records against {} locations",
            ctx.scans.len(),
            ctx.locations.len()
        ));

        let outcomes = match_records(&ctx.scans, &ctx.locations.locations);

        let mut matched_locations = HashSet::new();
        for outcome in &outcomes {
            match &outcome.location {
                Some(location) => {
                    matched_locations.insert(location.as_str());
                    if outcome.is_ambiguous() {
                        ctx.logger.warn(&format!(
                            "{} matches several locations, using {}",
                            outcome.scan_path, location
                        ));
                        state.summary.ambiguous_matches.push(AmbiguousMatch {
                            scan_path: outcome.scan_path.clone(),
                            chosen: location.clone(),
                            also_matched: outcome.also_matched.clone(),
                        });
                    }
                }
                None => {
                    ctx.logger
                        .warn(&format!("No location matches {}, skipping", outcome.scan_path));
                    state.summary.unmatched_scans.push(outcome.scan_path.clone());
                }
            }
        }

        for location in &ctx.locations.locations {
            if !matched_locations.contains(location.as_str()) {
                ctx.logger
                    .warn(&format!("No scan record for {}", location));
                state
                    .summary
                    .locations_without_scans
                    .push(location.clone());
            }
        }

        ctx.logger.info(&format!(
            "{} of {} scan records matched",
            outcomes.iter().filter(|o| o.is_matched()).count(),
            outcomes.len()
        ));

        state.matches = Some(outcomes);
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, ctx: &Context, state: &RunState) -> StepResult<()> {
        match &state.matches {
            Some(matches) if matches.len() == ctx.scans.len() => Ok(()),
            Some(matches) => Err(StepError::invalid_output(format!(
                "{} outcomes for {} scan records",
                matches.len(),
                ctx.scans.len()
            ))),
            None => Err(StepError::invalid_output("No match outcomes recorded")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use tracing::field::{Field, Visit};
    use tracing_subscriber::layer::{Context as LayerContext, SubscriberExt};
    use tracing_subscriber::{Layer, Registry};

    use crate::models::ScanRecord;
    use crate::orchestrator::testing::test_context;

    /// Collects the message of every WARN event.
    #[derive(Clone, Default)]
    struct WarnLines(Arc<Mutex<Vec<String>>>);

    struct MessageVisitor<'a>(&'a mut String);

    impl Visit for MessageVisitor<'_> {
        fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
            if field.name() == "message" {
                *self.0 = format!("{:?}", value);
            }
        }
    }

    impl<S: tracing::Subscriber> Layer<S> for WarnLines {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: LayerContext<'_, S>) {
            if *event.metadata().level() == tracing::Level::WARN {
                let mut message = String::new();
                event.record(&mut MessageVisitor(&mut message));
                self.0.lock().unwrap().push(message);
            }
        }
    }

    #[test]
    fn records_unmatched_and_empty_locations() {
        let (ctx, _dir) = test_context(
            vec!["/mnt/show/seg1/file1.dpx", "/mnt/show/seg1/file2.dpx"],
            vec![
                ScanRecord::new("/a/b/show/seg1/file1.dpx", vec![1, 2]),
                ScanRecord::new("/a/b/show/seg1/file9.dpx", vec![5]),
            ],
        );
        let mut state = RunState::new("t");

        let step = MatchStep::new();
        assert_eq!(step.execute(&ctx, &mut state).unwrap(), StepOutcome::Success);
        step.validate_output(&ctx, &state).unwrap();

        let matches = state.matches.as_ref().unwrap();
        assert_eq!(matches[0].location.as_deref(), Some("/mnt/show/seg1/file1.dpx"));
        assert_eq!(state.summary.unmatched_scans, vec!["/a/b/show/seg1/file9.dpx"]);
        assert_eq!(
            state.summary.locations_without_scans,
            vec!["/mnt/show/seg1/file2.dpx"]
        );
    }

    #[test]
    fn ambiguity_is_summarised() {
        let (ctx, _dir) = test_context(
            vec!["/mnt/b/file1", "/mnt/a/file1"],
            vec![ScanRecord::new("/scan/file1", vec![1])],
        );
        let mut state = RunState::new("t");
        MatchStep::new().execute(&ctx, &mut state).unwrap();

        let ambiguous = &state.summary.ambiguous_matches;
        assert_eq!(ambiguous.len(), 1);
        assert_eq!(ambiguous[0].chosen, "/mnt/a/file1");
        assert_eq!(ambiguous[0].also_matched, vec!["/mnt/b/file1"]);
        assert!(state.summary.locations_without_scans.contains(&"/mnt/b/file1".to_string()));
    }

    #[test]
    fn ambiguity_is_warned_once() {
        let (ctx, _dir) = test_context(
            vec!["/mnt/b/file1", "/mnt/a/file1"],
            vec![ScanRecord::new("/scan/file1", vec![1])],
        );
        let mut state = RunState::new("t");
        let warnings = WarnLines::default();
        let subscriber = Registry::default().with(warnings.clone());

        tracing::subscriber::with_default(subscriber, || {
            MatchStep::new().execute(&ctx, &mut state).unwrap();
        });

        let lines = warnings.0.lock().unwrap();
        let ambiguous: Vec<_> = lines.iter().filter(|l| l.contains("/scan/file1")).collect();
        assert_eq!(ambiguous.len(), 1, "{:?}", lines);
    }
}
