//! Task entries and status collected for the run summary.
use crate::processor::StepResult;

/// Step result for summary reporting.
#[derive(Debug, Clone)]
pub struct TaskEntry {
    /// Human-readable step name.
    pub name: String,
    /// Final status of the step.
    pub status: TaskStatus,
    /// Optional detail (skip reason or error description).
    pub message: Option<String>,
}

/// Status of a completed step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// Step completed successfully.
    Ok,
    /// Step had nothing to do (e.g., git missing, no aliases).
    Skipped,
    /// Step ran in dry-run mode; no changes were applied.
    DryRun,
    /// Step encountered an error and could not complete.
    Failed,
}

impl TaskStatus {
    /// Status and optional detail for a processor step outcome.
    #[must_use]
    pub fn from_step(result: &anyhow::Result<StepResult>) -> (Self, Option<String>) {
        match result {
            Ok(StepResult::Ok) => (Self::Ok, None),
            Ok(StepResult::DryRun) => (Self::DryRun, None),
            Ok(StepResult::Skipped(reason)) => (Self::Skipped, Some(reason.clone())),
            Err(e) => (Self::Failed, Some(format!("{e:#}"))),
        }
    }
}
