//! Error types for the review pipeline.
//!
//! Errors carry context that chains through layers:
//! Run → Step → Operation → Detail

use thiserror::Error;

use crate::media::MediaError;
use crate::planning::PlanError;

/// Top-level pipeline error with run context.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A step failed during execution.
    #[error("Run '{run_name}' failed at step '{step_name}': {source}")]
    StepFailed {
        run_name: String,
        step_name: String,
        #[source]
        source: StepError,
    },

    /// The run was cancelled; partial results were discarded.
    #[error("Run '{run_name}' was cancelled")]
    Cancelled { run_name: String },
}

impl PipelineError {
    pub fn step_failed(
        run_name: impl Into<String>,
        step_name: impl Into<String>,
        source: StepError,
    ) -> Self {
        Self::StepFailed {
            run_name: run_name.into(),
            step_name: step_name.into(),
            source,
        }
    }

    pub fn cancelled(run_name: impl Into<String>) -> Self {
        Self::Cancelled {
            run_name: run_name.into(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, PipelineError::Cancelled { .. })
    }
}

/// Error from a pipeline step with operation context.
#[derive(Error, Debug)]
pub enum StepError {
    #[error("Input validation failed: {0}")]
    InvalidInput(String),

    #[error("Output validation failed: {0}")]
    InvalidOutput(String),

    /// A previous step did not leave what this one needs.
    #[error("Precondition not met: {0}")]
    PreconditionFailed(String),

    #[error("Planning failed for {location}: {source}")]
    Plan {
        location: String,
        #[source]
        source: PlanError,
    },

    #[error(transparent)]
    Media(#[from] MediaError),

    /// Cancellation observed inside the step.
    #[error("Cancelled")]
    Cancelled,
}

impl StepError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn invalid_output(message: impl Into<String>) -> Self {
        Self::InvalidOutput(message.into())
    }

    pub fn precondition_failed(message: impl Into<String>) -> Self {
        Self::PreconditionFailed(message.into())
    }

    pub fn plan(location: impl Into<String>, source: PlanError) -> Self {
        Self::Plan {
            location: location.into(),
            source,
        }
    }
}

/// Result type for step operations.
pub type StepResult<T> = Result<T, StepError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
