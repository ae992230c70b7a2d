// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Transactional project store
//!
//! Every mutation runs as one serialized transaction:
//!
//! ```text
//! lock → catch up on WAL → read → engine → apply to scratch → validate
//!      → append to journal → publish scratch state → unlock
//! ```
//!
//! A failure at any step leaves both the log and the in-memory state as
//! they were. The file lock serializes writers across processes; the
//! mutex serializes threads within one.

use crate::error::StoreError;
use crate::operation::Operation;
use crate::state::MaterializedState;
use crate::wal::{Journal, Wal, WalError};
use dt_core::checklist::{self, build_items, default_items};
use dt_core::directory::{normalize_email, reconcile};
use dt_core::{
    ChecklistItem, Clock, DirectoryProvider, IdGen, ItemImage, ItemNote, NewProject, Phase,
    PhaseChange, PhaseState, Project, ProjectId, StatusAction, StatusChange, SystemClock,
    Technician, TimelineEntry, UuidIdGen,
};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

pub const WAL_FILE: &str = "wal.jsonl";
pub const LOCK_FILE: &str = "store.lock";

/// Advisory lock on the store directory, released on drop
struct StoreLock {
    file: File,
}

impl StoreLock {
    fn open(path: &Path) -> Result<File, WalError> {
        Ok(OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(path)?)
    }

    fn exclusive(path: &Path) -> Result<Self, WalError> {
        let file = Self::open(path)?;
        FileExt::lock_exclusive(&file).map_err(WalError::Lock)?;
        Ok(Self { file })
    }

    fn shared(path: &Path) -> Result<Self, WalError> {
        let file = Self::open(path)?;
        FileExt::lock_shared(&file).map_err(WalError::Lock)?;
        Ok(Self { file })
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            warn!(error = %e, "failed to release store lock");
        }
    }
}

struct Inner<J> {
    journal: J,
    state: MaterializedState,
    /// Sequence of the last transaction reflected in `state`
    applied: u64,
}

impl<J: Journal> Inner<J> {
    /// Apply transactions other writers committed since we last looked
    fn catch_up(&mut self) -> Result<(), WalError> {
        let entries = self.journal.read_after(self.applied)?;
        if !entries.is_empty() {
            debug!(from = self.applied, count = entries.len(), "catching up on WAL");
        }
        for entry in entries {
            for op in &entry.ops {
                // Committed transactions were validated before append, so a
                // failure here means the log itself is inconsistent
                if let Err(e) = self.state.apply(op) {
                    warn!(seq = entry.seq, error = %e, "skipping operation during replay");
                }
            }
            self.applied = entry.seq;
        }
        Ok(())
    }
}

/// Durable store of projects, timelines, and technicians
pub struct ProjectStore<J: Journal = Wal, C: Clock = SystemClock, G: IdGen = UuidIdGen> {
    lock_path: PathBuf,
    inner: Mutex<Inner<J>>,
    clock: C,
    ids: G,
}

impl ProjectStore {
    /// Open or create a store in the given directory
    pub fn open(dir: &Path) -> Result<Self, StoreError> {
        Self::open_with(dir, SystemClock, UuidIdGen)
    }
}

impl<C: Clock, G: IdGen> ProjectStore<Wal, C, G> {
    /// Open a store with explicit clock and ID generator
    pub fn open_with(dir: &Path, clock: C, ids: G) -> Result<Self, StoreError> {
        std::fs::create_dir_all(dir).map_err(WalError::from)?;
        let wal_path = dir.join(WAL_FILE);

        let journal = {
            let _lock = StoreLock::exclusive(&dir.join(LOCK_FILE))?;
            let removed = Wal::repair(&wal_path)?;
            if removed > 0 {
                warn!(removed, "discarded incomplete transaction from WAL");
            }
            Wal::open(&wal_path)?
        };

        Self::with_journal(dir, journal, clock, ids)
    }
}

impl<J: Journal, C: Clock, G: IdGen> ProjectStore<J, C, G> {
    /// Build a store over any journal; `dir` holds the lock file
    pub fn with_journal(dir: &Path, journal: J, clock: C, ids: G) -> Result<Self, StoreError> {
        std::fs::create_dir_all(dir).map_err(WalError::from)?;
        let store = Self {
            lock_path: dir.join(LOCK_FILE),
            inner: Mutex::new(Inner {
                journal,
                state: MaterializedState::new(),
                applied: 0,
            }),
            clock,
            ids,
        };
        store.refresh()?;
        Ok(store)
    }

    fn lock_inner(&self) -> MutexGuard<'_, Inner<J>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Pick up transactions written by other processes
    pub fn refresh(&self) -> Result<(), StoreError> {
        self.read(|_| Ok(()))
    }

    fn read<T>(
        &self,
        f: impl FnOnce(&MaterializedState) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let _lock = StoreLock::shared(&self.lock_path)?;
        let mut inner = self.lock_inner();
        inner.catch_up()?;
        f(&inner.state)
    }

    /// Run one read-modify-write transaction.
    ///
    /// `build` sees the current state and returns the operations to commit
    /// along with the caller's result. An empty operation list commits
    /// nothing.
    fn transact<T>(
        &self,
        build: impl FnOnce(&MaterializedState, &C, &G) -> Result<(Vec<Operation>, T), StoreError>,
    ) -> Result<T, StoreError> {
        let _lock = StoreLock::exclusive(&self.lock_path)?;
        let mut inner = self.lock_inner();
        inner.catch_up()?;

        let (ops, out) = build(&inner.state, &self.clock, &self.ids)?;
        if ops.is_empty() {
            return Ok(out);
        }

        let mut next = inner.state.clone();
        for op in &ops {
            next.apply(op)?;
        }
        next.validate_touched(&ops)?;

        let removed = inner.journal.repair_tail()?;
        if removed > 0 {
            warn!(removed, "discarded incomplete transaction before append");
        }
        let seq = inner.journal.append(&ops)?;
        inner.state = next;
        inner.applied = seq;
        debug!(seq, ops = ops.len(), "transaction committed");
        Ok(out)
    }

    /// Create a project. Without an explicit checklist the default one is used.
    pub fn create_project(
        &self,
        spec: NewProject,
        checklist: Option<Vec<ChecklistItem>>,
    ) -> Result<Project, StoreError> {
        let number = spec.number.trim().to_string();
        if number.is_empty() {
            return Err(StoreError::InvalidInput(
                "project number is required".to_string(),
            ));
        }
        let spec = NewProject { number, ..spec };

        let project = self.transact(|_, clock, ids| {
            let project = Project::new(
                ProjectId::from(ids.next()),
                spec,
                checklist.unwrap_or_else(default_items),
                clock,
            );
            let entry = TimelineEntry::created(ids.next(), &project);
            let ops = vec![
                Operation::ProjectCreate {
                    project: project.clone(),
                },
                Operation::TimelineAppend { entry },
            ];
            Ok((ops, project))
        })?;

        info!(project = %project.id, number = %project.number, "project created");
        Ok(project)
    }

    /// Validate and apply a phase transition, recording it on the timeline
    pub fn request_phase_transition(
        &self,
        key: &str,
        phase: Phase,
        new_state: PhaseState,
    ) -> Result<(Project, PhaseChange), StoreError> {
        let (project, change) = self.transact(|state, clock, ids| {
            let current = resolve(state, key)?;
            let (next, change) = current.request_phase_transition(phase, new_state, clock)?;
            let entry = TimelineEntry::phase(ids.next(), &next, &change);
            let ops = vec![
                Operation::PhaseSet {
                    project_id: next.id.clone(),
                    phase,
                    state: new_state,
                    at: change.at,
                },
                Operation::TimelineAppend { entry },
            ];
            Ok((ops, (next, change)))
        })?;

        info!(
            project = %project.id,
            phase = %change.phase,
            from = %change.from,
            to = %change.to,
            status = %project.status,
            "phase transition committed"
        );
        Ok((project, change))
    }

    /// String form of [`ProjectStore::request_phase_transition`]
    pub fn request_phase_transition_str(
        &self,
        key: &str,
        phase: &str,
        new_state: &str,
    ) -> Result<(Project, PhaseChange), StoreError> {
        let phase: Phase = phase.parse()?;
        let new_state: PhaseState = new_state.parse()?;
        self.request_phase_transition(key, phase, new_state)
    }

    /// Put a project on hold, cancel it, or resume it
    pub fn set_status(
        &self,
        key: &str,
        action: StatusAction,
    ) -> Result<(Project, StatusChange), StoreError> {
        let (project, change) = self.transact(|state, clock, ids| {
            let current = resolve(state, key)?;
            let (next, change) = current.change_status(action, clock);
            let entry = TimelineEntry::status(ids.next(), &next, &change);
            let ops = vec![
                Operation::StatusSet {
                    project_id: next.id.clone(),
                    status: change.to,
                    at: change.at,
                },
                Operation::TimelineAppend { entry },
            ];
            Ok((ops, (next, change)))
        })?;

        info!(project = %project.id, from = %change.from, to = %change.to, "status changed");
        Ok((project, change))
    }

    /// Write back a whole project record.
    ///
    /// Identity, creation time, and recorded phase timestamps are kept
    /// from the stored record. Phases whose state changed get their
    /// timestamps and a timeline entry exactly as a transition would; the
    /// status is re-derived and the result must pass validation.
    pub fn save_project(&self, project: Project) -> Result<Project, StoreError> {
        let (project, changes) = self.transact(|state, clock, ids| {
            let existing = state
                .projects
                .get(&project.id)
                .ok_or_else(|| StoreError::NotFound {
                    kind: "project",
                    id: project.id.to_string(),
                })?;

            let at = clock.now();
            let mut next = project;
            next.created_at = existing.created_at;
            let changes = next.rebase_phases(existing, at);
            next.updated_at = at;
            next.validate()?;

            let mut ops = vec![Operation::ProjectSave {
                project: next.clone(),
            }];
            ops.extend(changes.iter().map(|change| Operation::TimelineAppend {
                entry: TimelineEntry::phase(ids.next(), &next, change),
            }));
            Ok((ops, (next, changes.len())))
        })?;

        debug!(project = %project.id, phase_changes = changes, "project saved");
        Ok(project)
    }

    /// Record a free-form operational event
    pub fn log_event(&self, key: &str, label: &str) -> Result<TimelineEntry, StoreError> {
        if label.trim().is_empty() {
            return Err(StoreError::InvalidInput("event label is empty".to_string()));
        }
        self.transact(|state, clock, ids| {
            let project = resolve(state, key)?;
            let entry = TimelineEntry::note(ids.next(), project, label, clock.now());
            let ops = vec![Operation::TimelineAppend {
                entry: entry.clone(),
            }];
            Ok((ops, entry))
        })
    }

    /// Replace a project's checklist
    pub fn replace_checklist(
        &self,
        key: &str,
        items: Vec<ChecklistItem>,
    ) -> Result<Project, StoreError> {
        self.transact(|state, clock, _| {
            let mut project = resolve(state, key)?.clone();
            let at = clock.now();
            project.checklist = items;
            project.updated_at = at;
            let ops = vec![Operation::ChecklistReplace {
                project_id: project.id.clone(),
                items: project.checklist.clone(),
                at,
            }];
            Ok((ops, project))
        })
    }

    /// Replace a project's checklist from an imported JSON document
    pub fn import_checklist_json(&self, key: &str, json: &str) -> Result<Project, StoreError> {
        let labels = checklist::parse_import(json)?;
        let project = self.replace_checklist(key, build_items(&labels))?;
        info!(project = %project.id, items = project.checklist.len(), "checklist imported");
        Ok(project)
    }

    /// Mark a checklist item done or not done
    pub fn toggle_checklist_item(
        &self,
        key: &str,
        item_id: u32,
        completed: bool,
    ) -> Result<ChecklistItem, StoreError> {
        self.transact(|state, clock, _| {
            let project = resolve(state, key)?;
            let mut item = find_item(project, item_id)?.clone();
            let at = clock.now();
            item.set_completed(completed, at);
            let ops = vec![Operation::ChecklistToggle {
                project_id: project.id.clone(),
                item_id,
                completed,
                at,
            }];
            Ok((ops, item))
        })
    }

    /// Add a note to a checklist item
    pub fn add_item_note(
        &self,
        key: &str,
        item_id: u32,
        author: Option<String>,
        text: &str,
    ) -> Result<ItemNote, StoreError> {
        self.transact(|state, clock, _| {
            let project = resolve(state, key)?;
            find_item(project, item_id)?;
            let note = ItemNote::new(author, text, clock.now())?;
            let ops = vec![Operation::ChecklistNote {
                project_id: project.id.clone(),
                item_id,
                note: note.clone(),
            }];
            Ok((ops, note))
        })
    }

    /// Attach an image reference to a checklist item
    pub fn attach_item_image(
        &self,
        key: &str,
        item_id: u32,
        reference: &str,
    ) -> Result<ItemImage, StoreError> {
        self.transact(|state, clock, _| {
            let project = resolve(state, key)?;
            find_item(project, item_id)?;
            let image = ItemImage::new(reference, clock.now())?;
            let ops = vec![Operation::ChecklistImage {
                project_id: project.id.clone(),
                item_id,
                image: image.clone(),
            }];
            Ok((ops, image))
        })
    }

    /// Create or replace a technician profile
    pub fn upsert_technician(&self, mut technician: Technician) -> Result<Technician, StoreError> {
        technician.email = normalize_email(&technician.email);
        if technician.email.is_empty() {
            return Err(StoreError::InvalidInput("email is empty".to_string()));
        }
        self.transact(|_, _, _| {
            let ops = vec![Operation::TechnicianUpsert {
                technician: technician.clone(),
            }];
            Ok((ops, technician))
        })
    }

    /// Reconcile a technician with the directory, writing only on change
    pub fn reconcile_technician(
        &self,
        email: &str,
        directory: &impl DirectoryProvider,
    ) -> Result<Technician, StoreError> {
        let email = normalize_email(email);
        if email.is_empty() {
            return Err(StoreError::InvalidInput("email is empty".to_string()));
        }
        self.transact(|state, _, _| {
            let existing = state.technicians.get(&email).cloned();
            let result = reconcile(existing, &email, directory);
            let ops = if result.changed {
                debug!(technician = %email, "technician updated from directory");
                vec![Operation::TechnicianUpsert {
                    technician: result.technician.clone(),
                }]
            } else {
                Vec::new()
            };
            Ok((ops, result.technician))
        })
    }

    /// Look up a project by ID, number, or unique ID prefix
    pub fn project(&self, key: &str) -> Result<Project, StoreError> {
        self.read(|state| resolve(state, key).cloned())
    }

    /// All projects, newest first
    pub fn projects(&self) -> Result<Vec<Project>, StoreError> {
        self.read(|state| {
            let mut projects: Vec<Project> = state.projects.values().cloned().collect();
            projects.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.number.cmp(&b.number)));
            Ok(projects)
        })
    }

    /// Timeline of a project, oldest first
    pub fn timeline(&self, key: &str) -> Result<Vec<TimelineEntry>, StoreError> {
        self.read(|state| {
            let project = resolve(state, key)?;
            Ok(state
                .timeline_for(&project.id)
                .into_iter()
                .cloned()
                .collect())
        })
    }

    pub fn technician(&self, email: &str) -> Result<Option<Technician>, StoreError> {
        let email = normalize_email(email);
        self.read(|state| Ok(state.technicians.get(&email).cloned()))
    }
}

fn resolve<'a>(state: &'a MaterializedState, key: &str) -> Result<&'a Project, StoreError> {
    state.get_project(key).ok_or_else(|| StoreError::NotFound {
        kind: "project",
        id: key.to_string(),
    })
}

fn find_item(project: &Project, item_id: u32) -> Result<&ChecklistItem, StoreError> {
    project
        .checklist
        .iter()
        .find(|i| i.id == item_id)
        .ok_or_else(|| StoreError::NotFound {
            kind: "checklist item",
            id: format!("{}#{}", project.id, item_id),
        })
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
