// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Project entity and the phase/status engine
//!
//! A project moves through three gated phases. Each phase records when it
//! first started and first completed; the overall status is derived from
//! the phases unless an administrative override (`on_hold`, `cancelled`)
//! is in place.

use crate::checklist::ChecklistItem;
use crate::clock::Clock;
use crate::error::EngineError;
use crate::id::ProjectId;
use crate::phase::{derived_status, Phase, PhaseState, ProjectStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Deployment target of a project
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    #[default]
    Test,
    Prod,
}

impl Environment {
    pub fn label(self) -> &'static str {
        match self {
            Environment::Test => "Test",
            Environment::Prod => "Production",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Environment::Test => "test",
            Environment::Prod => "prod",
        })
    }
}

impl FromStr for Environment {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "test" => Ok(Environment::Test),
            "prod" | "production" => Ok(Environment::Prod),
            other => Err(EngineError::InvalidEnvironment(other.to_string())),
        }
    }
}

/// Kind of deployment work
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkType {
    #[default]
    Migration,
    Upgrade,
    Enhancement,
    Relocation,
    DatabaseCopy,
    SupportWorkstation,
}

impl WorkType {
    pub const ALL: [WorkType; 6] = [
        WorkType::Migration,
        WorkType::Upgrade,
        WorkType::Enhancement,
        WorkType::Relocation,
        WorkType::DatabaseCopy,
        WorkType::SupportWorkstation,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            WorkType::Migration => "migration",
            WorkType::Upgrade => "upgrade",
            WorkType::Enhancement => "enhancement",
            WorkType::Relocation => "relocation",
            WorkType::DatabaseCopy => "database_copy",
            WorkType::SupportWorkstation => "support_workstation",
        }
    }
}

impl fmt::Display for WorkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkType {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WorkType::ALL
            .into_iter()
            .find(|w| w.as_str() == s)
            .ok_or_else(|| EngineError::InvalidWorkType(s.to_string()))
    }
}

/// Fields supplied when a project is created
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProject {
    pub number: String,
    pub title: Option<String>,
    pub client_name: String,
    pub product: String,
    pub environment: Environment,
    pub work_type: WorkType,
    pub technician: Option<String>,
    pub created_by: Option<String>,
}

/// Audit record of one accepted phase transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseChange {
    pub phase: Phase,
    pub from: PhaseState,
    pub to: PhaseState,
    pub at: DateTime<Utc>,
}

impl PhaseChange {
    /// Timeline label, e.g. `Execution → In progress`
    pub fn label(&self) -> String {
        format!("{} → {}", self.phase.label(), self.to.display_name())
    }
}

/// Administrative action on a project's status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusAction {
    Hold,
    Cancel,
    /// Drop any override and return to the derived status
    Resume,
}

impl StatusAction {
    /// Map a requested status to the action that produces it
    pub fn for_status(status: ProjectStatus) -> Result<Self, EngineError> {
        match status {
            ProjectStatus::OnHold => Ok(StatusAction::Hold),
            ProjectStatus::Cancelled => Ok(StatusAction::Cancel),
            other => Err(EngineError::DerivedStatus(other.to_string())),
        }
    }
}

impl FromStr for StatusAction {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hold" => Ok(StatusAction::Hold),
            "cancel" => Ok(StatusAction::Cancel),
            "resume" => Ok(StatusAction::Resume),
            other => StatusAction::for_status(other.parse()?),
        }
    }
}

/// Audit record of a status change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    pub from: ProjectStatus,
    pub to: ProjectStatus,
    pub at: DateTime<Utc>,
}

impl StatusChange {
    pub fn label(&self) -> String {
        format!(
            "Status: {} → {}",
            self.from.display_name(),
            self.to.display_name()
        )
    }
}

/// A deployment project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub number: String,
    pub title: String,
    pub client_name: String,
    pub product: String,
    pub environment: Environment,
    pub work_type: WorkType,
    pub technician: Option<String>,
    pub created_by: Option<String>,
    pub status: ProjectStatus,

    pub preparation_phase: PhaseState,
    pub execution_phase: PhaseState,
    pub validation_phase: PhaseState,
    pub preparation_started_at: Option<DateTime<Utc>>,
    pub preparation_completed_at: Option<DateTime<Utc>>,
    pub execution_started_at: Option<DateTime<Utc>>,
    pub execution_completed_at: Option<DateTime<Utc>>,
    pub validation_started_at: Option<DateTime<Utc>>,
    pub validation_completed_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub checklist: Vec<ChecklistItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Mutable view over the fields belonging to one phase
struct PhaseSlot<'a> {
    state: &'a mut PhaseState,
    started_at: &'a mut Option<DateTime<Utc>>,
    completed_at: &'a mut Option<DateTime<Utc>>,
}

impl Project {
    /// Create a project with all phases `not_started` and status `pending`
    pub fn new(
        id: ProjectId,
        spec: NewProject,
        checklist: Vec<ChecklistItem>,
        clock: &impl Clock,
    ) -> Self {
        let now = clock.now();
        let title = spec.title.filter(|t| !t.trim().is_empty()).unwrap_or_else(|| {
            format!(
                "{} - {} - {} - {}",
                spec.environment.label(),
                spec.client_name,
                spec.product,
                spec.number
            )
        });
        Self {
            id,
            number: spec.number,
            title,
            client_name: spec.client_name,
            product: spec.product,
            environment: spec.environment,
            work_type: spec.work_type,
            technician: spec.technician,
            created_by: spec.created_by,
            status: ProjectStatus::Pending,
            preparation_phase: PhaseState::NotStarted,
            execution_phase: PhaseState::NotStarted,
            validation_phase: PhaseState::NotStarted,
            preparation_started_at: None,
            preparation_completed_at: None,
            execution_started_at: None,
            execution_completed_at: None,
            validation_started_at: None,
            validation_completed_at: None,
            checklist,
            created_at: now,
            updated_at: now,
        }
    }

    /// Current state of a phase
    pub fn phase(&self, phase: Phase) -> PhaseState {
        match phase {
            Phase::Preparation => self.preparation_phase,
            Phase::Execution => self.execution_phase,
            Phase::Validation => self.validation_phase,
        }
    }

    pub fn started_at(&self, phase: Phase) -> Option<DateTime<Utc>> {
        match phase {
            Phase::Preparation => self.preparation_started_at,
            Phase::Execution => self.execution_started_at,
            Phase::Validation => self.validation_started_at,
        }
    }

    pub fn completed_at(&self, phase: Phase) -> Option<DateTime<Utc>> {
        match phase {
            Phase::Preparation => self.preparation_completed_at,
            Phase::Execution => self.execution_completed_at,
            Phase::Validation => self.validation_completed_at,
        }
    }

    fn slot(&mut self, phase: Phase) -> PhaseSlot<'_> {
        match phase {
            Phase::Preparation => PhaseSlot {
                state: &mut self.preparation_phase,
                started_at: &mut self.preparation_started_at,
                completed_at: &mut self.preparation_completed_at,
            },
            Phase::Execution => PhaseSlot {
                state: &mut self.execution_phase,
                started_at: &mut self.execution_started_at,
                completed_at: &mut self.execution_completed_at,
            },
            Phase::Validation => PhaseSlot {
                state: &mut self.validation_phase,
                started_at: &mut self.validation_started_at,
                completed_at: &mut self.validation_completed_at,
            },
        }
    }

    /// Check the sequencing gate for a requested transition
    pub fn check_transition(&self, phase: Phase, new_state: PhaseState) -> Result<(), EngineError> {
        if !new_state.is_active() {
            return Ok(());
        }
        match phase.prerequisite() {
            Some(prerequisite) if self.phase(prerequisite) != PhaseState::Completed => {
                Err(EngineError::SequenceViolation {
                    phase,
                    prerequisite,
                })
            }
            _ => Ok(()),
        }
    }

    /// Validate and apply a phase transition.
    ///
    /// Returns the updated project and the audit record; `self` is never
    /// modified, so a failed request leaves every field untouched.
    pub fn request_phase_transition(
        &self,
        phase: Phase,
        new_state: PhaseState,
        clock: &impl Clock,
    ) -> Result<(Project, PhaseChange), EngineError> {
        self.check_transition(phase, new_state)?;

        let mut next = self.clone();
        let at = clock.now();
        let from = next.apply_phase(phase, new_state, at);
        next.validate()?;

        Ok((
            next,
            PhaseChange {
                phase,
                from,
                to: new_state,
                at,
            },
        ))
    }

    /// Parse string inputs and request a transition
    pub fn request_phase_transition_str(
        &self,
        phase: &str,
        new_state: &str,
        clock: &impl Clock,
    ) -> Result<(Project, PhaseChange), EngineError> {
        let phase: Phase = phase.parse()?;
        let new_state: PhaseState = new_state.parse()?;
        self.request_phase_transition(phase, new_state, clock)
    }

    /// Set a phase, maintain its timestamps, and re-derive the status.
    ///
    /// No gating happens here: this is the replay path for transitions
    /// that were already accepted. Returns the previous state.
    pub fn apply_phase(&mut self, phase: Phase, new_state: PhaseState, at: DateTime<Utc>) -> PhaseState {
        let slot = self.slot(phase);
        let old = *slot.state;
        *slot.state = new_state;

        if old != new_state {
            match new_state {
                PhaseState::InProgress => {
                    slot.started_at.get_or_insert(at);
                }
                PhaseState::Completed => {
                    slot.started_at.get_or_insert(at);
                    slot.completed_at.get_or_insert(at);
                }
                PhaseState::NotStarted => {}
            }
        }

        self.derive_status();
        self.updated_at = at;
        old
    }

    /// Recompute `status` from the phases, leaving overrides alone
    pub fn derive_status(&mut self) {
        if self.status.is_administrative() {
            return;
        }
        self.status = derived_status(
            self.preparation_phase,
            self.execution_phase,
            self.validation_phase,
        );
    }

    /// Re-check the sequencing invariants against the current field values
    pub fn validate(&self) -> Result<(), EngineError> {
        for phase in [Phase::Execution, Phase::Validation] {
            self.check_transition(phase, self.phase(phase))?;
        }
        Ok(())
    }

    /// Apply an administrative status action
    pub fn change_status(&self, action: StatusAction, clock: &impl Clock) -> (Project, StatusChange) {
        let at = clock.now();
        let to = match action {
            StatusAction::Hold => ProjectStatus::OnHold,
            StatusAction::Cancel => ProjectStatus::Cancelled,
            StatusAction::Resume => derived_status(
                self.preparation_phase,
                self.execution_phase,
                self.validation_phase,
            ),
        };
        let mut next = self.clone();
        let from = next.apply_status(to, at);
        (next, StatusChange { from, to, at })
    }

    /// Store a status computed by [`Project::change_status`]. Returns the previous one.
    pub fn apply_status(&mut self, status: ProjectStatus, at: DateTime<Utc>) -> ProjectStatus {
        let old = self.status;
        self.status = status;
        self.updated_at = at;
        old
    }

    /// Rebase an edited copy of a record onto the stored one.
    ///
    /// Phase history comes from `stored`; every phase whose requested state
    /// differs goes through [`Project::apply_phase`] at `at`, so timestamps
    /// follow the same rules as a transition. Returns one change per moved
    /// phase, in phase order.
    pub fn rebase_phases(&mut self, stored: &Project, at: DateTime<Utc>) -> Vec<PhaseChange> {
        let mut changes = Vec::new();
        for phase in Phase::ALL {
            let to = self.phase(phase);
            let slot = self.slot(phase);
            *slot.state = stored.phase(phase);
            *slot.started_at = stored.started_at(phase);
            *slot.completed_at = stored.completed_at(phase);

            if to != stored.phase(phase) {
                let from = self.apply_phase(phase, to, at);
                changes.push(PhaseChange { phase, from, to, at });
            }
        }
        self.derive_status();
        changes
    }

    /// Number of phases that reached `completed`
    pub fn phases_completed(&self) -> usize {
        Phase::ALL
            .iter()
            .filter(|p| self.phase(**p) == PhaseState::Completed)
            .count()
    }

    pub fn checklist_item_mut(&mut self, item_id: u32) -> Option<&mut ChecklistItem> {
        self.checklist.iter_mut().find(|i| i.id == item_id)
    }
}

#[cfg(test)]
#[path = "project_tests.rs"]
mod tests;
