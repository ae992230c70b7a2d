// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operations for the write-ahead log
//!
//! Every operation carries its own timestamps so that replaying the log
//! rebuilds exactly the state that was committed.

use chrono::{DateTime, Utc};
use dt_core::{
    ChecklistItem, ItemImage, ItemNote, Phase, PhaseState, Project, ProjectId, ProjectStatus,
    Technician, TimelineEntry,
};
use serde::{Deserialize, Serialize};

/// Operations that can be persisted to the WAL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    /// Create a new project
    ProjectCreate { project: Project },

    /// Set one phase of a project (already gated by the engine)
    PhaseSet {
        project_id: ProjectId,
        phase: Phase,
        state: PhaseState,
        at: DateTime<Utc>,
    },

    /// Set the status of a project
    StatusSet {
        project_id: ProjectId,
        status: ProjectStatus,
        at: DateTime<Utc>,
    },

    /// Overwrite a project record wholesale
    ProjectSave { project: Project },

    /// Append a timeline entry
    TimelineAppend { entry: TimelineEntry },

    /// Replace a project's checklist
    ChecklistReplace {
        project_id: ProjectId,
        items: Vec<ChecklistItem>,
        at: DateTime<Utc>,
    },

    /// Mark a checklist item done or not done
    ChecklistToggle {
        project_id: ProjectId,
        item_id: u32,
        completed: bool,
        at: DateTime<Utc>,
    },

    /// Add a note to a checklist item
    ChecklistNote {
        project_id: ProjectId,
        item_id: u32,
        note: ItemNote,
    },

    /// Attach an image reference to a checklist item
    ChecklistImage {
        project_id: ProjectId,
        item_id: u32,
        image: ItemImage,
    },

    /// Create or update a technician profile
    TechnicianUpsert { technician: Technician },
}

impl Operation {
    /// Project touched by this operation, if any
    pub fn project_id(&self) -> Option<&ProjectId> {
        match self {
            Operation::ProjectCreate { project } | Operation::ProjectSave { project } => {
                Some(&project.id)
            }
            Operation::PhaseSet { project_id, .. }
            | Operation::StatusSet { project_id, .. }
            | Operation::ChecklistReplace { project_id, .. }
            | Operation::ChecklistToggle { project_id, .. }
            | Operation::ChecklistNote { project_id, .. }
            | Operation::ChecklistImage { project_id, .. } => Some(project_id),
            Operation::TimelineAppend { entry } => Some(&entry.project_id),
            Operation::TechnicianUpsert { .. } => None,
        }
    }
}

#[cfg(test)]
#[path = "operation_tests.rs"]
mod tests;
