// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Administrative status commands

use super::Context;
use crate::output;
use anyhow::Result;
use clap::Subcommand;
use dt_core::{ProjectStatus, StatusAction};
use serde::Serialize;
use std::fmt;

#[derive(Subcommand)]
pub enum StatusCommand {
    /// Put a project on hold
    Hold {
        /// Project ID, number, or ID prefix
        id: String,
    },
    /// Cancel a project
    Cancel {
        /// Project ID, number, or ID prefix
        id: String,
    },
    /// Return to the status derived from the phases
    Resume {
        /// Project ID, number, or ID prefix
        id: String,
    },
}

#[derive(Serialize)]
struct StatusReport {
    project: String,
    from: ProjectStatus,
    to: ProjectStatus,
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} → {}",
            self.project,
            self.from.display_name(),
            self.to.display_name()
        )
    }
}

pub fn handle(command: StatusCommand, ctx: &Context) -> Result<()> {
    let (id, action) = match command {
        StatusCommand::Hold { id } => (id, StatusAction::Hold),
        StatusCommand::Cancel { id } => (id, StatusAction::Cancel),
        StatusCommand::Resume { id } => (id, StatusAction::Resume),
    };

    let project = ctx.project_for_update(&id)?;
    let (project, change) = ctx.store.set_status(project.id.as_str(), action)?;
    let report = StatusReport {
        project: project.number,
        from: change.from,
        to: change.to,
    };
    output::print(&report, ctx.format);
    Ok(())
}
