// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the project store

use crate::state::ApplyError;
use crate::wal::WalError;
use dt_core::{ChecklistError, EngineError};
use thiserror::Error;

/// Errors returned by [`crate::ProjectStore`]
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Checklist(#[from] ChecklistError),
    /// The write did not reach durable storage; state is unchanged
    #[error("persistence failure: {0}")]
    Persistence(#[from] WalError),
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
    #[error("project number already in use: {0}")]
    DuplicateNumber(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("inconsistent state: {0}")]
    Apply(ApplyError),
}

impl From<ApplyError> for StoreError {
    fn from(e: ApplyError) -> Self {
        match e {
            ApplyError::NotFound { kind, id } => StoreError::NotFound { kind, id },
            ApplyError::DuplicateNumber(number) => StoreError::DuplicateNumber(number),
            ApplyError::ItemNotFound {
                project_id,
                item_id,
            } => StoreError::NotFound {
                kind: "checklist item",
                id: format!("{project_id}#{item_id}"),
            },
            ApplyError::Invalid(e) => StoreError::Engine(e),
            other @ ApplyError::AlreadyExists { .. } => StoreError::Apply(other),
        }
    }
}

impl StoreError {
    /// The engine error behind this failure, if any
    pub fn engine(&self) -> Option<&EngineError> {
        match self {
            StoreError::Engine(e) => Some(e),
            _ => None,
        }
    }
}
