// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Timeline commands

use super::Context;
use crate::output::{self, timestamp};
use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use dt_core::TimelineEntry;
use serde::Serialize;
use std::fmt;

#[derive(Args)]
#[command(args_conflicts_with_subcommands = true)]
pub struct TimelineArgs {
    #[command(subcommand)]
    pub command: Option<TimelineCommand>,

    /// Project ID, number, or ID prefix
    pub id: Option<String>,
}

#[derive(Subcommand)]
pub enum TimelineCommand {
    /// Record an operational event
    Log {
        /// Project ID, number, or ID prefix
        id: String,
        /// What happened
        label: String,
    },
}

#[derive(Serialize)]
struct TimelineRow<'a> {
    #[serde(flatten)]
    entry: &'a TimelineEntry,
    label: String,
}

impl<'a> From<&'a TimelineEntry> for TimelineRow<'a> {
    fn from(entry: &'a TimelineEntry) -> Self {
        Self {
            entry,
            label: entry.label(),
        }
    }
}

impl fmt::Display for TimelineRow<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}  {}", timestamp(&self.entry.at), self.label)
    }
}

pub fn handle(args: TimelineArgs, ctx: &Context) -> Result<()> {
    match (args.command, args.id) {
        (Some(TimelineCommand::Log { id, label }), _) => {
            let project = ctx.project_for_update(&id)?;
            let entry = ctx.store.log_event(project.id.as_str(), &label)?;
            output::print(&TimelineRow::from(&entry), ctx.format);
        }
        (None, Some(id)) => {
            let entries = ctx.store.timeline(&id)?;
            let rows: Vec<TimelineRow<'_>> = entries.iter().map(TimelineRow::from).collect();
            output::print_list(&rows, "WHEN              EVENT", "No events", ctx.format);
        }
        (None, None) => bail!("a project ID is required"),
    }
    Ok(())
}
