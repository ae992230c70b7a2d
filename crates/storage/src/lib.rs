// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! dt-storage: durable project store for deploytrack
//!
//! Projects, timelines, and technicians live in a materialized state
//! rebuilt from a write-ahead log. Mutations go through
//! [`ProjectStore`], which commits each one as a single WAL line.

mod error;
mod operation;
mod state;
mod store;
mod wal;

pub use error::StoreError;
pub use operation::Operation;
pub use state::{ApplyError, MaterializedState};
pub use store::{ProjectStore, LOCK_FILE, WAL_FILE};
pub use wal::{Journal, Wal, WalEntry, WalError, WalScan};
