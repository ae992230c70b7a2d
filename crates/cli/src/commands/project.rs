// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Project commands

use super::Context;
use crate::output::{self, opt_timestamp, timestamp, truncate};
use anyhow::{Context as _, Result};
use clap::Subcommand;
use dt_core::checklist::{build_items, completion_percentage, parse_import};
use dt_core::directory::normalize_email;
use dt_core::{Environment, NewProject, Phase, Project, ProjectId, ProjectStatus, WorkType};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum ProjectCommand {
    /// Create a project
    Create {
        /// Project number, e.g. PRJ0034
        #[arg(long)]
        number: String,
        /// Client (usually a hospital)
        #[arg(long)]
        client: String,
        /// Product being deployed
        #[arg(long)]
        product: String,
        /// Target environment (test, prod)
        #[arg(long, default_value = "test")]
        env: Environment,
        /// Kind of work
        #[arg(long, default_value = "migration")]
        work_type: WorkType,
        /// Assigned technician email
        #[arg(long)]
        technician: Option<String>,
        /// Title; generated from the other fields when omitted
        #[arg(long)]
        title: Option<String>,
        /// JSON checklist to use instead of the default one
        #[arg(long)]
        checklist: Option<PathBuf>,
    },
    /// List projects, newest first
    List {
        /// Only projects with this status
        #[arg(long)]
        status: Option<ProjectStatus>,
        /// Only projects assigned to this technician
        #[arg(long)]
        technician: Option<String>,
    },
    /// Show a project
    Show {
        /// Project ID, number, or ID prefix
        id: String,
    },
}

#[derive(Serialize)]
pub struct ProjectRow {
    id: ProjectId,
    number: String,
    title: String,
    status: ProjectStatus,
    technician: Option<String>,
    phases_completed: usize,
    checklist_percent: u8,
}

impl From<&Project> for ProjectRow {
    fn from(p: &Project) -> Self {
        Self {
            id: p.id.clone(),
            number: p.number.clone(),
            title: p.title.clone(),
            status: p.status,
            technician: p.technician.clone(),
            phases_completed: p.phases_completed(),
            checklist_percent: completion_percentage(&p.checklist),
        }
    }
}

impl fmt::Display for ProjectRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<10} {:<12} {:<12} {:>6} {:>5}%  {}",
            self.id.short(),
            truncate(&self.number, 12),
            self.status,
            format!("{}/3", self.phases_completed),
            self.checklist_percent,
            truncate(&self.title, 50),
        )
    }
}

const LIST_HEADER: &str = "ID         NUMBER       STATUS       PHASES CHECK  TITLE";

/// Full view of one project
#[derive(Serialize)]
pub struct ProjectDetail<'a> {
    #[serde(flatten)]
    project: &'a Project,
    checklist_percent: u8,
}

impl<'a> ProjectDetail<'a> {
    pub fn new(project: &'a Project) -> Self {
        Self {
            project,
            checklist_percent: completion_percentage(&project.checklist),
        }
    }
}

impl fmt::Display for ProjectDetail<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = self.project;
        writeln!(f, "Project: {} ({})", p.number, p.id)?;
        writeln!(f, "  Title: {}", p.title)?;
        writeln!(f, "  Client: {}", p.client_name)?;
        writeln!(f, "  Product: {}", p.product)?;
        writeln!(f, "  Environment: {}", p.environment.label())?;
        writeln!(f, "  Work type: {}", p.work_type)?;
        writeln!(f, "  Technician: {}", p.technician.as_deref().unwrap_or("-"))?;
        writeln!(f, "  Status: {}", p.status.display_name())?;
        writeln!(f, "  Phases:")?;
        for phase in Phase::ALL {
            writeln!(
                f,
                "    {:<12} {:<12} started {:<16} completed {}",
                phase.label(),
                p.phase(phase).display_name(),
                opt_timestamp(p.started_at(phase).as_ref()),
                opt_timestamp(p.completed_at(phase).as_ref()),
            )?;
        }
        writeln!(
            f,
            "  Checklist: {}% of {} items",
            self.checklist_percent,
            p.checklist.len()
        )?;
        write!(f, "  Created: {}", timestamp(&p.created_at))
    }
}

pub fn handle(command: ProjectCommand, ctx: &Context) -> Result<()> {
    match command {
        ProjectCommand::Create {
            number,
            client,
            product,
            env,
            work_type,
            technician,
            title,
            checklist,
        } => {
            let checklist = match checklist {
                Some(path) => {
                    let json = std::fs::read_to_string(&path)
                        .with_context(|| format!("cannot read {}", path.display()))?;
                    Some(build_items(&parse_import(&json)?))
                }
                None => None,
            };
            let actor = ctx.actor()?;
            let technician = match technician {
                Some(email) => Some(
                    ctx.store
                        .reconcile_technician(&email, &ctx.directory)?
                        .email,
                ),
                None => None,
            };

            let project = ctx.store.create_project(
                NewProject {
                    number,
                    title,
                    client_name: client,
                    product,
                    environment: env,
                    work_type,
                    technician,
                    created_by: actor.map(|a| a.email),
                },
                checklist,
            )?;
            output::print(&ProjectDetail::new(&project), ctx.format);
        }

        ProjectCommand::List { status, technician } => {
            let technician = technician.map(|t| normalize_email(&t));
            let rows: Vec<ProjectRow> = ctx
                .store
                .projects()?
                .iter()
                .filter(|p| status.is_none_or(|s| p.status == s))
                .filter(|p| match &technician {
                    Some(t) => p.technician.as_deref().map(normalize_email).as_ref() == Some(t),
                    None => true,
                })
                .map(ProjectRow::from)
                .collect();
            output::print_list(&rows, LIST_HEADER, "No projects", ctx.format);
        }

        ProjectCommand::Show { id } => {
            let project = ctx.store.project(&id)?;
            output::print(&ProjectDetail::new(&project), ctx.format);
        }
    }
    Ok(())
}
