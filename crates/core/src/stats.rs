// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dashboard counts for managers and technicians

use crate::directory::normalize_email;
use crate::phase::ProjectStatus;
use crate::project::Project;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Number of projects in each status
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub on_hold: usize,
    pub cancelled: usize,
}

impl StatusCounts {
    pub fn from_projects<'a>(projects: impl IntoIterator<Item = &'a Project>) -> Self {
        let mut counts = Self::default();
        for p in projects {
            counts.add(p.status);
        }
        counts
    }

    fn add(&mut self, status: ProjectStatus) {
        match status {
            ProjectStatus::Pending => self.pending += 1,
            ProjectStatus::InProgress => self.in_progress += 1,
            ProjectStatus::Completed => self.completed += 1,
            ProjectStatus::OnHold => self.on_hold += 1,
            ProjectStatus::Cancelled => self.cancelled += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.pending + self.in_progress + self.completed + self.on_hold + self.cancelled
    }
}

impl fmt::Display for StatusCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "total {}  pending {}  in progress {}  completed {}  on hold {}  cancelled {}",
            self.total(),
            self.pending,
            self.in_progress,
            self.completed,
            self.on_hold,
            self.cancelled
        )
    }
}

/// Workload of one technician
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TechnicianLoad {
    pub technician: String,
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
}

impl fmt::Display for TechnicianLoad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<32} pending {:<4} in progress {:<4} completed {}",
            self.technician, self.pending, self.in_progress, self.completed
        )
    }
}

/// Per-technician workload, sorted by email. Unassigned projects are skipped.
pub fn technician_loads<'a>(projects: impl IntoIterator<Item = &'a Project>) -> Vec<TechnicianLoad> {
    let mut loads: BTreeMap<String, TechnicianLoad> = BTreeMap::new();
    for p in projects {
        let Some(email) = p.technician.as_deref() else {
            continue;
        };
        let email = normalize_email(email);
        let load = loads.entry(email.clone()).or_insert_with(|| TechnicianLoad {
            technician: email,
            ..TechnicianLoad::default()
        });
        match p.status {
            ProjectStatus::Pending => load.pending += 1,
            ProjectStatus::InProgress => load.in_progress += 1,
            ProjectStatus::Completed => load.completed += 1,
            ProjectStatus::OnHold | ProjectStatus::Cancelled => {}
        }
    }
    loads.into_values().collect()
}

/// Number of completed phases, 0 through 3
pub fn phase_progress(project: &Project) -> usize {
    project.phases_completed()
}
