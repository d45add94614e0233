//! Tagged step outcomes for the lifecycle controllers
//!
//! Each controller step yields a [`StepOutcome`]. Recording a `Fatal`
//! outcome ends the flow by handing its error back to the caller; `Ok` and
//! `Warning` outcomes accumulate in [`Outcomes`] for reporting.

use serde::Serialize;

use crate::{Error, Result};

/// Result of a single controller step.
#[derive(Debug)]
pub enum StepOutcome {
    Ok(String),
    Warning(String),
    Fatal(Error),
}

impl StepOutcome {
    pub fn ok(message: impl Into<String>) -> Self {
        Self::Ok(message.into())
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::Warning(message.into())
    }

    /// `Ok` with the message, or `Fatal` with the error.
    pub fn from_result(result: Result<String>) -> Self {
        match result {
            Ok(message) => Self::Ok(message),
            Err(error) => Self::Fatal(error),
        }
    }

    /// `Ok` with the message, or `Warning` with the error text.
    pub fn tolerate(result: Result<String>) -> Self {
        match result {
            Ok(message) => Self::Ok(message),
            Err(error) => Self::Warning(error.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeLevel {
    Ok,
    Warning,
}

/// A recorded non-fatal outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepRecord {
    pub step: &'static str,
    pub level: OutcomeLevel,
    pub message: String,
}

/// Ordered record of every step a controller completed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Outcomes {
    records: Vec<StepRecord>,
}

impl Outcomes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an outcome; a `Fatal` one is returned as `Err`.
    pub fn record(&mut self, step: &'static str, outcome: StepOutcome) -> Result<()> {
        let (level, message) = match outcome {
            StepOutcome::Ok(message) => {
                tracing::info!(step, %message);
                (OutcomeLevel::Ok, message)
            }
            StepOutcome::Warning(message) => {
                tracing::warn!(step, %message);
                (OutcomeLevel::Warning, message)
            }
            StepOutcome::Fatal(error) => {
                tracing::error!(step, %error, "step failed");
                return Err(error);
            }
        };
        self.records.push(StepRecord {
            step,
            level,
            message,
        });
        Ok(())
    }

    pub fn ok(&mut self, step: &'static str, message: impl Into<String>) {
        // Non-fatal outcomes never produce an error
        let _ = self.record(step, StepOutcome::ok(message));
    }

    pub fn warn(&mut self, step: &'static str, message: impl Into<String>) {
        let _ = self.record(step, StepOutcome::warning(message));
    }

    pub fn iter(&self) -> impl Iterator<Item = &StepRecord> {
        self.records.iter()
    }

    pub fn warnings(&self) -> impl Iterator<Item = &StepRecord> {
        self.records
            .iter()
            .filter(|r| r.level == OutcomeLevel::Warning)
    }

    pub fn has_warnings(&self) -> bool {
        self.warnings().next().is_some()
    }

    /// Records for one step.
    pub fn for_step(&self, step: &str) -> Vec<&StepRecord> {
        self.records.iter().filter(|r| r.step == step).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_is_returned_not_recorded() {
        let mut outcomes = Outcomes::new();
        outcomes.ok("purge", "clean");
        let err = outcomes
            .record("attach", StepOutcome::Fatal(Error::Cancelled))
            .unwrap_err();

        assert!(matches!(err, Error::Cancelled));
        assert_eq!(outcomes.len(), 1);
    }

    #[test]
    fn warnings_are_filtered() {
        let mut outcomes = Outcomes::new();
        outcomes.ok("a", "fine");
        outcomes.warn("b", "careful");
        outcomes.warn("b", "again");

        assert!(outcomes.has_warnings());
        assert_eq!(outcomes.warnings().count(), 2);
        assert_eq!(outcomes.for_step("b").len(), 2);
    }

    #[test]
    fn tolerate_downgrades_errors() {
        let mut outcomes = Outcomes::new();
        let outcome = StepOutcome::tolerate(Err(Error::invalid_input("bad")));
        outcomes.record("ignore", outcome).unwrap();

        let records = outcomes.for_step("ignore");
        assert_eq!(records[0].level, OutcomeLevel::Warning);
        assert_eq!(records[0].message, "Invalid input: bad");
    }
}
