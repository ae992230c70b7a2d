// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the phase/status engine

use crate::phase::Phase;
use thiserror::Error;

/// Errors raised when validating or applying a change to a project
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// A phase was advanced before its prerequisite reached `completed`
    #[error("{prerequisite} must be completed before {phase} can start")]
    SequenceViolation { phase: Phase, prerequisite: Phase },
    #[error("invalid phase name: {0:?}")]
    InvalidPhaseName(String),
    #[error("invalid phase state name: {0:?}")]
    InvalidStateName(String),
    #[error("invalid status name: {0:?}")]
    InvalidStatusName(String),
    /// `pending`, `in_progress` and `completed` belong to the engine
    #[error("status {0:?} is derived from the phases and cannot be set directly")]
    DerivedStatus(String),
    #[error("invalid environment: {0:?}")]
    InvalidEnvironment(String),
    #[error("invalid work type: {0:?}")]
    InvalidWorkType(String),
}

impl EngineError {
    /// True for errors the actor can fix by completing earlier work
    pub fn is_user_recoverable(&self) -> bool {
        matches!(self, EngineError::SequenceViolation { .. })
    }
}
