// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-project deployment checklists
//!
//! Items carry notes and image attachments. Attachments are opaque
//! references; storing the bytes is the caller's concern.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Steps every new deployment project starts with
const DEFAULT_ITEMS: [&str; 10] = [
    "Request access to all servers",
    "Test the application (functional check)",
    "Validate application version, database name, and site",
    "Validate backup start and end times",
    "Validate prerequisites for the work type",
    "Follow the procedure for the product and work type",
    "Validate FUSE",
    "Validate certificates",
    "Rollback agreement with DBA and lead",
    "Confirm correct operation with the client",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChecklistError {
    #[error("checklist contains no items")]
    EmptyChecklist,
    #[error("invalid checklist document: {0}")]
    InvalidChecklist(String),
    #[error("checklist item not found: {0}")]
    ItemNotFound(u32),
    #[error("note text is empty")]
    EmptyNote,
    #[error("image reference is empty")]
    EmptyImage,
}

/// A note left on a checklist item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemNote {
    pub author: Option<String>,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl ItemNote {
    pub fn new(
        author: Option<String>,
        text: &str,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ChecklistError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ChecklistError::EmptyNote);
        }
        Ok(Self {
            author,
            text: text.to_string(),
            created_at,
        })
    }
}

/// An image attached to a checklist item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemImage {
    pub reference: String,
    pub uploaded_at: DateTime<Utc>,
}

impl ItemImage {
    pub fn new(reference: &str, uploaded_at: DateTime<Utc>) -> Result<Self, ChecklistError> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(ChecklistError::EmptyImage);
        }
        Ok(Self {
            reference: reference.to_string(),
            uploaded_at,
        })
    }
}

/// One step of a project checklist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub id: u32,
    pub label: String,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub order: u32,
    #[serde(default)]
    pub notes: Vec<ItemNote>,
    #[serde(default)]
    pub images: Vec<ItemImage>,
}

impl ChecklistItem {
    pub fn new(id: u32, label: impl Into<String>, order: u32) -> Self {
        Self {
            id,
            label: label.into(),
            completed: false,
            completed_at: None,
            order,
            notes: Vec::new(),
            images: Vec::new(),
        }
    }

    /// Mark the item done or not done.
    ///
    /// Completing keeps an earlier `completed_at`; un-completing clears it.
    pub fn set_completed(&mut self, completed: bool, at: DateTime<Utc>) {
        self.completed = completed;
        if completed {
            self.completed_at.get_or_insert(at);
        } else {
            self.completed_at = None;
        }
    }
}

/// Build numbered items from labels, filling blanks with "Step N"
pub fn build_items<S: AsRef<str>>(labels: &[S]) -> Vec<ChecklistItem> {
    labels
        .iter()
        .enumerate()
        .map(|(i, label)| {
            let label = label.as_ref().trim();
            let label = if label.is_empty() {
                format!("Step {}", i + 1)
            } else {
                label.to_string()
            };
            ChecklistItem::new(i as u32 + 1, label, i as u32)
        })
        .collect()
}

/// The standard checklist used when a project is created without one
pub fn default_items() -> Vec<ChecklistItem> {
    build_items(&DEFAULT_ITEMS)
}

/// Parse an imported checklist document.
///
/// Accepts `{"items": [...]}` where each element is either a string or an
/// object with a `label` field.
pub fn parse_import(json: &str) -> Result<Vec<String>, ChecklistError> {
    let doc: serde_json::Value =
        serde_json::from_str(json).map_err(|e| ChecklistError::InvalidChecklist(e.to_string()))?;

    let items = match doc.get("items") {
        Some(serde_json::Value::Array(items)) => items,
        Some(_) => {
            return Err(ChecklistError::InvalidChecklist(
                "\"items\" must be an array".to_string(),
            ))
        }
        None => return Err(ChecklistError::EmptyChecklist),
    };
    if items.is_empty() {
        return Err(ChecklistError::EmptyChecklist);
    }

    Ok(items
        .iter()
        .map(|item| match item {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Object(map) => map
                .get("label")
                .and_then(|l| l.as_str())
                .unwrap_or_default()
                .to_string(),
            other => other.to_string(),
        })
        .collect())
}

/// Share of completed items, rounded down, 0 for an empty checklist
pub fn completion_percentage(items: &[ChecklistItem]) -> u8 {
    if items.is_empty() {
        return 0;
    }
    let done = items.iter().filter(|i| i.completed).count();
    ((done * 100) / items.len()) as u8
}

#[cfg(test)]
#[path = "checklist_tests.rs"]
mod tests;
