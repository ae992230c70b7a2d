// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command implementations

pub mod checklist;
pub mod phase;
pub mod project;
pub mod seed;
pub mod stats;
pub mod status;
pub mod timeline;

use crate::error::CliError;
use crate::output::OutputFormat;
use anyhow::Result;
use dt_core::{Project, StaticDirectory, Technician};
use dt_storage::ProjectStore;
use tracing::warn;

/// Everything a command needs to run
pub struct Context {
    pub store: ProjectStore,
    pub directory: StaticDirectory,
    pub actor: Option<String>,
    pub format: OutputFormat,
}

impl Context {
    /// Reconcile the acting user with the directory, if one was given
    pub fn actor(&self) -> Result<Option<Technician>> {
        match &self.actor {
            Some(email) => Ok(Some(
                self.store.reconcile_technician(email, &self.directory)?,
            )),
            None => Ok(None),
        }
    }

    pub fn directory_emails(&self) -> Vec<String> {
        self.directory.emails().map(str::to_string).collect()
    }

    /// Load a project and check the actor may change it
    pub fn project_for_update(&self, key: &str) -> Result<Project> {
        let project = self.store.project(key)?;
        if let Some(actor) = self.actor()? {
            if !actor.may_modify(&project) {
                warn!(actor = %actor.email, project = %project.id, "modification refused");
                return Err(CliError::not_permitted(&actor.email, &project.number).into());
            }
        }
        Ok(project)
    }
}
