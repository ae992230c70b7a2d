// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dashboard statistics

use super::Context;
use crate::output;
use anyhow::Result;
use clap::Args;
use dt_core::directory::normalize_email;
use dt_core::stats::technician_loads;
use dt_core::{StatusCounts, TechnicianLoad};
use serde::Serialize;
use std::fmt;

#[derive(Args)]
pub struct StatsArgs {
    /// Only count projects assigned to this technician
    #[arg(long)]
    pub technician: Option<String>,
}

#[derive(Serialize)]
struct Dashboard {
    #[serde(skip_serializing_if = "Option::is_none")]
    technician: Option<String>,
    counts: StatusCounts,
    technicians: Vec<TechnicianLoad>,
}

impl fmt::Display for Dashboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.technician {
            Some(t) => write!(f, "Projects for {}: {}", t, self.counts)?,
            None => write!(f, "Projects: {}", self.counts)?,
        }
        if self.technician.is_none() && !self.technicians.is_empty() {
            write!(f, "\n\nBy technician:")?;
            for load in &self.technicians {
                write!(f, "\n  {}", load)?;
            }
        }
        Ok(())
    }
}

pub fn handle(args: StatsArgs, ctx: &Context) -> Result<()> {
    let technician = args.technician.map(|t| normalize_email(&t));
    let projects = ctx.store.projects()?;
    let mine: Vec<_> = projects
        .iter()
        .filter(|p| match &technician {
            Some(t) => p.technician.as_deref().map(normalize_email).as_ref() == Some(t),
            None => true,
        })
        .collect();

    let dashboard = Dashboard {
        counts: StatusCounts::from_projects(mine.iter().copied()),
        technicians: technician_loads(mine.iter().copied()),
        technician,
    };
    output::print(&dashboard, ctx.format);
    Ok(())
}
