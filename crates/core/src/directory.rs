// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Team directory and technician reconciliation
//!
//! The directory is the authority on names, roles, and manager flags.
//! [`reconcile`] is called once per request context to bring the stored
//! technician record in line with it.

use crate::project::Project;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_ROLE: &str = "Technician";

/// Directory data for one team member
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub is_manager: bool,
}

/// Source of directory entries, keyed by email
pub trait DirectoryProvider {
    fn lookup(&self, email: &str) -> Option<DirectoryEntry>;
}

/// In-memory directory, usually loaded from configuration
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    entries: BTreeMap<String, DirectoryEntry>,
}

impl StaticDirectory {
    pub fn new(entries: impl IntoIterator<Item = (String, DirectoryEntry)>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|(email, entry)| (normalize_email(&email), entry))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Normalized emails of every entry, sorted
    pub fn emails(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl DirectoryProvider for StaticDirectory {
    fn lookup(&self, email: &str) -> Option<DirectoryEntry> {
        self.entries.get(&normalize_email(email)).cloned()
    }
}

/// Stored profile of a team member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Technician {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub is_manager: bool,
    #[serde(default)]
    pub phone: String,
}

impl Technician {
    pub fn new(email: &str) -> Self {
        Self {
            email: normalize_email(email),
            first_name: String::new(),
            last_name: String::new(),
            role: DEFAULT_ROLE.to_string(),
            is_manager: false,
            phone: String::new(),
        }
    }

    /// Full name, falling back to the email
    pub fn display_name(&self) -> String {
        let name = format!("{} {}", self.first_name, self.last_name);
        let name = name.trim();
        if name.is_empty() {
            self.email.clone()
        } else {
            name.to_string()
        }
    }

    /// Whether this technician may change the given project
    pub fn may_modify(&self, project: &Project) -> bool {
        if self.is_manager {
            return true;
        }
        let is_self = |who: &Option<String>| {
            who.as_deref()
                .is_some_and(|e| normalize_email(e) == self.email)
        };
        is_self(&project.technician) || is_self(&project.created_by)
    }
}

/// Outcome of reconciling a technician with the directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    pub technician: Technician,
    /// True when the record must be written back
    pub changed: bool,
}

/// Bring a stored technician in line with the directory.
///
/// Without a directory entry an existing record is kept as is; a missing
/// record is created with the default role.
pub fn reconcile(
    existing: Option<Technician>,
    email: &str,
    directory: &impl DirectoryProvider,
) -> Reconciled {
    let entry = directory.lookup(email);
    let (mut technician, mut changed) = match existing {
        Some(t) => (t, false),
        None => {
            let mut t = Technician::new(email);
            if let Some(role) = entry.as_ref().and_then(|e| e.role.clone()) {
                t.role = role;
            }
            (t, true)
        }
    };

    if let Some(entry) = entry {
        let mut update = |field: &mut String, value: Option<String>| {
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                if *field != value {
                    *field = value;
                    changed = true;
                }
            }
        };
        update(&mut technician.first_name, entry.first_name);
        update(&mut technician.last_name, entry.last_name);
        update(&mut technician.role, entry.role);

        if technician.is_manager != entry.is_manager {
            technician.is_manager = entry.is_manager;
            changed = true;
        }
    }

    Reconciled {
        technician,
        changed,
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
#[path = "directory_tests.rs"]
mod tests;
