// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Materialized state from WAL replay

use crate::operation::Operation;
use dt_core::{EngineError, Project, ProjectId, Technician, TimelineEntry};
use std::collections::BTreeMap;
use thiserror::Error;

/// Error applying an operation to state
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApplyError {
    #[error("entity not found: {kind} {id}")]
    NotFound { kind: &'static str, id: String },
    #[error("entity already exists: {kind} {id}")]
    AlreadyExists { kind: &'static str, id: String },
    #[error("project number already in use: {0}")]
    DuplicateNumber(String),
    #[error("checklist item {item_id} not found in project {project_id}")]
    ItemNotFound { project_id: String, item_id: u32 },
    #[error(transparent)]
    Invalid(#[from] EngineError),
}

/// Materialized state built from WAL operations
#[derive(Debug, Clone, Default)]
pub struct MaterializedState {
    pub projects: BTreeMap<ProjectId, Project>,
    pub timeline: Vec<TimelineEntry>,
    pub technicians: BTreeMap<String, Technician>,
}

impl MaterializedState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a project by ID, project number, or unique ID prefix
    pub fn get_project(&self, key: &str) -> Option<&Project> {
        let key = key.trim();
        if key.is_empty() {
            return None;
        }

        if let Some(project) = self.projects.get(&ProjectId::from(key)) {
            return Some(project);
        }

        if let Some(project) = self.projects.values().find(|p| p.number == key) {
            return Some(project);
        }

        let matches: Vec<_> = self
            .projects
            .iter()
            .filter(|(k, _)| k.as_str().starts_with(key))
            .collect();

        // Only return if exactly one match (unambiguous)
        if matches.len() == 1 {
            Some(matches[0].1)
        } else {
            None
        }
    }

    /// Timeline of one project, oldest first
    pub fn timeline_for(&self, project_id: &ProjectId) -> Vec<&TimelineEntry> {
        let mut entries: Vec<_> = self
            .timeline
            .iter()
            .filter(|e| &e.project_id == project_id)
            .collect();
        entries.sort_by_key(|e| e.at);
        entries
    }

    fn project_mut(&mut self, id: &ProjectId) -> Result<&mut Project, ApplyError> {
        self.projects.get_mut(id).ok_or_else(|| ApplyError::NotFound {
            kind: "project",
            id: id.to_string(),
        })
    }

    fn number_taken(&self, number: &str, except: &ProjectId) -> bool {
        self.projects
            .values()
            .any(|p| p.number == number && &p.id != except)
    }

    /// Validate every project touched by the given operations
    pub fn validate_touched(&self, ops: &[Operation]) -> Result<(), ApplyError> {
        for id in ops.iter().filter_map(Operation::project_id) {
            let project = self.projects.get(id).ok_or_else(|| ApplyError::NotFound {
                kind: "project",
                id: id.to_string(),
            })?;
            project.validate()?;
        }
        Ok(())
    }

    /// Apply an operation to update the state
    pub fn apply(&mut self, op: &Operation) -> Result<(), ApplyError> {
        match op {
            Operation::ProjectCreate { project } => {
                if self.projects.contains_key(&project.id) {
                    return Err(ApplyError::AlreadyExists {
                        kind: "project",
                        id: project.id.to_string(),
                    });
                }
                if self.number_taken(&project.number, &project.id) {
                    return Err(ApplyError::DuplicateNumber(project.number.clone()));
                }
                self.projects.insert(project.id.clone(), project.clone());
            }

            Operation::PhaseSet {
                project_id,
                phase,
                state,
                at,
            } => {
                self.project_mut(project_id)?.apply_phase(*phase, *state, *at);
            }

            Operation::StatusSet {
                project_id,
                status,
                at,
            } => {
                self.project_mut(project_id)?.apply_status(*status, *at);
            }

            Operation::ProjectSave { project } => {
                if self.number_taken(&project.number, &project.id) {
                    return Err(ApplyError::DuplicateNumber(project.number.clone()));
                }
                *self.project_mut(&project.id)? = project.clone();
            }

            Operation::TimelineAppend { entry } => {
                self.project_mut(&entry.project_id)?;
                self.timeline.push(entry.clone());
            }

            Operation::ChecklistReplace {
                project_id,
                items,
                at,
            } => {
                let project = self.project_mut(project_id)?;
                project.checklist = items.clone();
                project.updated_at = *at;
            }

            Operation::ChecklistToggle {
                project_id,
                item_id,
                completed,
                at,
            } => {
                let project = self.project_mut(project_id)?;
                let item = project
                    .checklist_item_mut(*item_id)
                    .ok_or_else(|| item_not_found(project_id, *item_id))?;
                item.set_completed(*completed, *at);
                project.updated_at = *at;
            }

            Operation::ChecklistNote {
                project_id,
                item_id,
                note,
            } => {
                let project = self.project_mut(project_id)?;
                let item = project
                    .checklist_item_mut(*item_id)
                    .ok_or_else(|| item_not_found(project_id, *item_id))?;
                item.notes.push(note.clone());
            }

            Operation::ChecklistImage {
                project_id,
                item_id,
                image,
            } => {
                let project = self.project_mut(project_id)?;
                let item = project
                    .checklist_item_mut(*item_id)
                    .ok_or_else(|| item_not_found(project_id, *item_id))?;
                item.images.push(image.clone());
            }

            Operation::TechnicianUpsert { technician } => {
                self.technicians
                    .insert(technician.email.clone(), technician.clone());
            }
        }
        Ok(())
    }
}

fn item_not_found(project_id: &ProjectId, item_id: u32) -> ApplyError {
    ApplyError::ItemNotFound {
        project_id: project_id.to_string(),
        item_id,
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
