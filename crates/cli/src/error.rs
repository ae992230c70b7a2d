// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! User-friendly error display with context and suggestions.
//!
//! Every failure the binary reports goes through [`CliError`]:
//! - What went wrong (message)
//! - Why it might have happened (context)
//! - How to fix it (suggestions)

use dt_core::{EngineError, Phase, PhaseState};
use dt_storage::StoreError;
use std::fmt;

/// Error with context and recovery suggestions for user-friendly display.
#[derive(Debug)]
pub struct CliError {
    /// What went wrong
    pub message: String,
    /// Why it might have happened
    pub context: Vec<String>,
    /// How to fix it
    pub suggestions: Vec<String>,
    /// Original error if any
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl CliError {
    /// Create a new error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: Vec::new(),
            suggestions: Vec::new(),
            source: None,
        }
    }

    /// Add context about why this error might have happened.
    pub fn with_context(mut self, ctx: impl Into<String>) -> Self {
        self.context.push(ctx.into());
        self
    }

    /// Add a suggestion for how to fix this error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Set the source error that caused this error.
    pub fn with_source<E: std::error::Error + Send + Sync + 'static>(mut self, source: E) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "error: {}", self.message)?;

        if !self.context.is_empty() {
            writeln!(f)?;
            for ctx in &self.context {
                writeln!(f, "  -> {}", ctx)?;
            }
        }

        if !self.suggestions.is_empty() {
            writeln!(f)?;
            writeln!(f, "suggestions:")?;
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                writeln!(f, "  {}. {}", i + 1, suggestion)?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

fn accepted<T: fmt::Display>(values: impl IntoIterator<Item = T>) -> String {
    values
        .into_iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Common error builders for typical failure scenarios.
impl CliError {
    /// A phase was moved before its prerequisite completed.
    pub fn sequence_violation(phase: Phase, prerequisite: Phase) -> Self {
        CliError::new(format!(
            "Cannot move {} before {} is completed",
            phase.label().to_lowercase(),
            prerequisite.label().to_lowercase()
        ))
        .with_context("Phases run in order: preparation, then execution, then validation")
        .with_suggestion(format!("Complete {} first", prerequisite.label().to_lowercase()))
        .with_suggestion(format!(
            "Mark it done with: dt phase set <ID> {} completed",
            prerequisite
        ))
    }

    /// A phase name did not match any known phase.
    pub fn invalid_phase(name: &str) -> Self {
        CliError::new(format!("Unknown phase '{}'", name))
            .with_context(format!("Accepted phases: {}", accepted(Phase::ALL)))
            .with_suggestion("Phase names are lowercase, e.g. 'preparation'")
    }

    /// A phase state name did not match any known state.
    pub fn invalid_state(name: &str) -> Self {
        CliError::new(format!("Unknown phase state '{}'", name))
            .with_context(format!("Accepted states: {}", accepted(PhaseState::ALL)))
            .with_suggestion("State names are snake_case, e.g. 'in_progress'")
    }

    /// A project could not be found by ID, number, or prefix.
    pub fn project_not_found(key: &str) -> Self {
        CliError::new(format!("Project '{}' not found", key))
            .with_context("Projects are matched by ID, project number, or a unique ID prefix")
            .with_suggestion("List projects: dt project list")
    }

    /// The acting user may not change this project.
    pub fn not_permitted(actor: &str, project_number: &str) -> Self {
        CliError::new(format!(
            "{} is not allowed to modify project {}",
            actor, project_number
        ))
        .with_context("Only the assigned technician, the creator, or a manager may change a project")
        .with_suggestion("Ask a manager to make the change")
    }

    /// The store could not durably record the change.
    pub fn persistence(err: StoreError) -> Self {
        CliError::new("Failed to save changes")
            .with_context(err.to_string())
            .with_context("Nothing was written; the project is unchanged")
            .with_suggestion("Check that the data directory is writable")
            .with_suggestion("Retry once any other dt process has finished")
            .with_source(err)
    }
}

impl From<StoreError> for CliError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Engine(EngineError::SequenceViolation {
                phase,
                prerequisite,
            }) => CliError::sequence_violation(phase, prerequisite),
            StoreError::Engine(EngineError::InvalidPhaseName(name)) => {
                CliError::invalid_phase(&name)
            }
            StoreError::Engine(EngineError::InvalidStateName(name)) => {
                CliError::invalid_state(&name)
            }
            StoreError::NotFound { kind: "project", id } => CliError::project_not_found(&id),
            StoreError::DuplicateNumber(number) => {
                CliError::new(format!("Project number '{}' is already in use", number))
                    .with_suggestion(format!("Look at the existing project: dt project show {}", number))
            }
            err @ StoreError::Persistence(_) => CliError::persistence(err),
            other => CliError::new(other.to_string()).with_source(other),
        }
    }
}

/// Turn any error surfaced by a command into its display form
pub fn report(err: anyhow::Error) -> CliError {
    let err = match err.downcast::<CliError>() {
        Ok(e) => return e,
        Err(err) => err,
    };
    match err.downcast::<StoreError>() {
        Ok(e) => CliError::from(e),
        Err(err) => CliError::new(format!("{:#}", err)),
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
