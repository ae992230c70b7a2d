// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Phase commands

use super::Context;
use crate::output;
use anyhow::Result;
use clap::Subcommand;
use dt_core::{EngineError, Phase, PhaseChange, PhaseState, ProjectStatus};
use dt_storage::StoreError;
use serde::Serialize;
use std::fmt;
use tracing::error;

#[derive(Subcommand)]
pub enum PhaseCommand {
    /// Move a phase to a new state
    Set {
        /// Project ID, number, or ID prefix
        id: String,
        /// preparation, execution, or validation
        phase: String,
        /// not_started, in_progress, or completed
        state: String,
    },
}

#[derive(Serialize)]
struct TransitionReport {
    project: String,
    phase: Phase,
    from: PhaseState,
    to: PhaseState,
    status: ProjectStatus,
    at: String,
}

impl TransitionReport {
    fn new(number: &str, status: ProjectStatus, change: &PhaseChange) -> Self {
        Self {
            project: number.to_string(),
            phase: change.phase,
            from: change.from,
            to: change.to,
            status,
            at: change.at.to_rfc3339(),
        }
    }
}

impl fmt::Display for TransitionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} {} → {} (status: {})",
            self.project,
            self.phase.label(),
            self.from.display_name(),
            self.to.display_name(),
            self.status.display_name()
        )
    }
}

pub fn handle(command: PhaseCommand, ctx: &Context) -> Result<()> {
    match command {
        PhaseCommand::Set { id, phase, state } => {
            let project = ctx.project_for_update(&id)?;
            let result =
                ctx.store
                    .request_phase_transition_str(project.id.as_str(), &phase, &state);

            let (project, change) = match result {
                Ok(ok) => ok,
                Err(e) => {
                    if let StoreError::Engine(
                        err @ (EngineError::InvalidPhaseName(_) | EngineError::InvalidStateName(_)),
                    ) = &e
                    {
                        error!(
                            project = %project.id,
                            phase = %phase,
                            state = %state,
                            error = %err,
                            "rejected phase input"
                        );
                    }
                    return Err(e.into());
                }
            };

            let report = TransitionReport::new(&project.number, project.status, &change);
            output::print(&report, ctx.format);
        }
    }
    Ok(())
}
