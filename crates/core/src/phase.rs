// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Phase, phase state, and project status definitions

use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the three sequential stages of a deployment project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Preparation,
    Execution,
    Validation,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::Preparation, Phase::Execution, Phase::Validation];

    /// The phase that must be completed before this one may start
    pub fn prerequisite(self) -> Option<Phase> {
        match self {
            Phase::Preparation => None,
            Phase::Execution => Some(Phase::Preparation),
            Phase::Validation => Some(Phase::Execution),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Preparation => "preparation",
            Phase::Execution => "execution",
            Phase::Validation => "validation",
        }
    }

    /// Human-readable label used in timeline entries
    pub fn label(self) -> &'static str {
        match self {
            Phase::Preparation => "Preparation",
            Phase::Execution => "Execution",
            Phase::Validation => "Validation",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "preparation" => Ok(Phase::Preparation),
            "execution" => Ok(Phase::Execution),
            "validation" => Ok(Phase::Validation),
            other => Err(EngineError::InvalidPhaseName(other.to_string())),
        }
    }
}

/// Progress of a single phase
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseState {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

impl PhaseState {
    pub const ALL: [PhaseState; 3] = [
        PhaseState::NotStarted,
        PhaseState::InProgress,
        PhaseState::Completed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PhaseState::NotStarted => "not_started",
            PhaseState::InProgress => "in_progress",
            PhaseState::Completed => "completed",
        }
    }

    /// Display form recorded in the timeline
    pub fn display_name(self) -> &'static str {
        match self {
            PhaseState::NotStarted => "Not started",
            PhaseState::InProgress => "In progress",
            PhaseState::Completed => "Completed",
        }
    }

    /// Whether the phase has left `not_started`
    pub fn is_active(self) -> bool {
        self != PhaseState::NotStarted
    }
}

impl fmt::Display for PhaseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PhaseState {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_started" => Ok(PhaseState::NotStarted),
            "in_progress" => Ok(PhaseState::InProgress),
            "completed" => Ok(PhaseState::Completed),
            other => Err(EngineError::InvalidStateName(other.to_string())),
        }
    }
}

/// Coarse-grained project status shown on dashboards
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    OnHold,
    Cancelled,
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 5] = [
        ProjectStatus::Pending,
        ProjectStatus::InProgress,
        ProjectStatus::Completed,
        ProjectStatus::OnHold,
        ProjectStatus::Cancelled,
    ];

    /// Administrative states are only changed by explicit action
    pub fn is_administrative(self) -> bool {
        matches!(self, ProjectStatus::OnHold | ProjectStatus::Cancelled)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProjectStatus::Pending => "pending",
            ProjectStatus::InProgress => "in_progress",
            ProjectStatus::Completed => "completed",
            ProjectStatus::OnHold => "on_hold",
            ProjectStatus::Cancelled => "cancelled",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ProjectStatus::Pending => "Pending",
            ProjectStatus::InProgress => "In progress",
            ProjectStatus::Completed => "Completed",
            ProjectStatus::OnHold => "On hold",
            ProjectStatus::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectStatus {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProjectStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| EngineError::InvalidStatusName(s.to_string()))
    }
}

/// Status implied by the three phase values alone
pub fn derived_status(
    preparation: PhaseState,
    execution: PhaseState,
    validation: PhaseState,
) -> ProjectStatus {
    let phases = [preparation, execution, validation];
    if phases.iter().all(|s| *s == PhaseState::Completed) {
        ProjectStatus::Completed
    } else if phases.iter().any(|s| s.is_active()) {
        ProjectStatus::InProgress
    } else {
        ProjectStatus::Pending
    }
}

#[cfg(test)]
#[path = "phase_tests.rs"]
mod tests;
