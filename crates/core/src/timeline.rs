// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only project timeline

use crate::id::ProjectId;
use crate::phase::{Phase, PhaseState, ProjectStatus};
use crate::project::{Environment, PhaseChange, Project, StatusChange};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What a timeline entry records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TimelineKind {
    Created,
    Phase {
        phase: Phase,
        from: PhaseState,
        to: PhaseState,
    },
    Status {
        from: ProjectStatus,
        to: ProjectStatus,
    },
    /// Operational event logged by hand
    Note { label: String },
}

/// One event in a project's history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub id: String,
    pub project_id: ProjectId,
    pub environment: Environment,
    pub at: DateTime<Utc>,
    pub kind: TimelineKind,
}

impl TimelineEntry {
    fn for_project(id: String, project: &Project, at: DateTime<Utc>, kind: TimelineKind) -> Self {
        Self {
            id,
            project_id: project.id.clone(),
            environment: project.environment,
            at,
            kind,
        }
    }

    pub fn created(id: String, project: &Project) -> Self {
        Self::for_project(id, project, project.created_at, TimelineKind::Created)
    }

    pub fn phase(id: String, project: &Project, change: &PhaseChange) -> Self {
        Self::for_project(
            id,
            project,
            change.at,
            TimelineKind::Phase {
                phase: change.phase,
                from: change.from,
                to: change.to,
            },
        )
    }

    pub fn status(id: String, project: &Project, change: &StatusChange) -> Self {
        Self::for_project(
            id,
            project,
            change.at,
            TimelineKind::Status {
                from: change.from,
                to: change.to,
            },
        )
    }

    pub fn note(id: String, project: &Project, label: &str, at: DateTime<Utc>) -> Self {
        Self::for_project(
            id,
            project,
            at,
            TimelineKind::Note {
                label: label.trim().to_string(),
            },
        )
    }

    /// Display label, e.g. `Preparation → Completed`
    pub fn label(&self) -> String {
        match &self.kind {
            TimelineKind::Created => "Project created".to_string(),
            TimelineKind::Phase { phase, to, .. } => {
                format!("{} → {}", phase.label(), to.display_name())
            }
            TimelineKind::Status { from, to } => {
                format!("Status: {} → {}", from.display_name(), to.display_name())
            }
            TimelineKind::Note { label } => label.clone(),
        }
    }
}
