//! Per-step outcome reporting.
//!
//! Most steps of the workflow keep going after a failure; the report is how
//! a caller tells a fully successful run apart from one that completed in a
//! degraded state, instead of inferring it from absent files.

use tracing::{error, info, warn};

/// Outcome of one workflow step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepStatus {
    Succeeded,
    /// The step completed but skipped work or tolerated errors.
    Degraded(String),
    /// The step failed outright; later steps may still have run.
    Failed(String),
}

/// A named step outcome.
#[derive(Clone, Debug)]
pub struct StepReport {
    pub step: &'static str,
    pub status: StepStatus,
}

/// Ordered collection of step outcomes for one workflow invocation.
#[derive(Clone, Debug, Default)]
pub struct WorkflowReport {
    steps: Vec<StepReport>,
}

impl WorkflowReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a step outcome, logging it at the matching level.
    pub fn record(&mut self, step: &'static str, status: StepStatus) {
        match &status {
            StepStatus::Succeeded => info!("step '{}' succeeded", step),
            StepStatus::Degraded(reason) => warn!("step '{}' degraded: {}", step, reason),
            StepStatus::Failed(reason) => error!("step '{}' failed: {}", step, reason),
        }
        self.steps.push(StepReport { step, status });
    }

    pub fn steps(&self) -> &[StepReport] {
        &self.steps
    }

    /// Whether any recorded step failed outright. Degraded steps do not
    /// count; they completed, just not cleanly.
    pub fn has_failures(&self) -> bool {
        self.steps
            .iter()
            .any(|s| matches!(s.status, StepStatus::Failed(_)))
    }

    /// Steps that degraded or failed, in recording order.
    pub fn shortfalls(&self) -> impl Iterator<Item = &StepReport> {
        self.steps
            .iter()
            .filter(|s| s.status != StepStatus::Succeeded)
    }

    /// One-line summary for the end-of-run log.
    pub fn summary(&self) -> String {
        let shortfalls: Vec<&str> = self.shortfalls().map(|s| s.step).collect();
        if shortfalls.is_empty() {
            format!("all {} steps succeeded", self.steps.len())
        } else {
            format!(
                "{} of {} steps did not fully succeed: {}",
                shortfalls.len(),
                self.steps.len(),
                shortfalls.join(", ")
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_report_has_no_failures() {
        let mut report = WorkflowReport::new();
        report.record("board-config", StepStatus::Succeeded);
        report.record("build", StepStatus::Succeeded);

        assert!(!report.has_failures());
        assert_eq!(report.summary(), "all 2 steps succeeded");
    }

    #[test]
    fn degraded_step_is_a_shortfall_but_not_a_failure() {
        let mut report = WorkflowReport::new();
        report.record("build", StepStatus::Succeeded);
        report.record("rename", StepStatus::Degraded("version unresolved".into()));

        assert!(!report.has_failures());
        assert_eq!(report.shortfalls().count(), 1);
        assert_eq!(
            report.summary(),
            "1 of 2 steps did not fully succeed: rename"
        );
    }

    #[test]
    fn failed_and_degraded_are_both_shortfalls() {
        let mut report = WorkflowReport::new();
        report.record("build", StepStatus::Failed("engine gave up".into()));
        report.record("rename", StepStatus::Degraded("skipped".into()));

        assert!(report.has_failures());
        let names: Vec<&str> = report.shortfalls().map(|s| s.step).collect();
        assert_eq!(names, vec!["build", "rename"]);
    }
}
