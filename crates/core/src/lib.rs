// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! dt-core: domain library for deploytrack
//!
//! This crate provides:
//! - The phase/status engine for deployment projects
//! - Checklists, timeline entries, and dashboard counts
//! - The team directory and technician reconciliation
//! - Clock and ID abstractions for deterministic tests

pub mod clock;
pub mod id;

pub mod error;
pub mod phase;

// Entities (order matters for dependencies)
pub mod checklist;
pub mod project;
pub mod timeline;

pub mod directory;
pub mod stats;

// Re-exports
pub use checklist::{ChecklistError, ChecklistItem, ItemImage, ItemNote};
pub use clock::{Clock, FakeClock, SystemClock};
pub use directory::{DirectoryEntry, DirectoryProvider, Reconciled, StaticDirectory, Technician};
pub use error::EngineError;
pub use id::{IdGen, ProjectId, SequentialIdGen, UuidIdGen};
pub use phase::{derived_status, Phase, PhaseState, ProjectStatus};
pub use project::{
    Environment, NewProject, PhaseChange, Project, StatusAction, StatusChange, WorkType,
};
pub use stats::{StatusCounts, TechnicianLoad};
pub use timeline::{TimelineEntry, TimelineKind};
