// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Checklist commands

use super::Context;
use crate::output::{self, opt_timestamp};
use anyhow::{Context as _, Result};
use clap::Subcommand;
use dt_core::checklist::completion_percentage;
use dt_core::{ChecklistItem, ItemImage, ItemNote};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum ChecklistCommand {
    /// Show a project's checklist
    Show {
        /// Project ID, number, or ID prefix
        id: String,
    },
    /// Mark an item done, or not done with --undo
    Toggle {
        id: String,
        item: u32,
        #[arg(long)]
        undo: bool,
    },
    /// Add a note to an item
    Note { id: String, item: u32, text: String },
    /// Attach an image reference to an item
    Attach {
        id: String,
        item: u32,
        /// Path or URL of the uploaded image
        reference: String,
    },
    /// Replace the checklist from a JSON file
    Import {
        id: String,
        /// File containing {"items": [...]}
        file: PathBuf,
    },
}

#[derive(Serialize)]
struct ItemRow<'a> {
    #[serde(flatten)]
    item: &'a ChecklistItem,
}

impl fmt::Display for ItemRow<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let item = self.item;
        let mark = if item.completed { "x" } else { " " };
        write!(f, "{:>3}. [{}] {}", item.id, mark, item.label)?;
        if item.completed {
            write!(f, " ({})", opt_timestamp(item.completed_at.as_ref()))?;
        }
        for note in &item.notes {
            write!(
                f,
                "\n       note: {}{}",
                note.text,
                note.author
                    .as_deref()
                    .map(|a| format!(" ({})", a))
                    .unwrap_or_default()
            )?;
        }
        for image in &item.images {
            write!(f, "\n       image: {}", image.reference)?;
        }
        Ok(())
    }
}

pub fn handle(command: ChecklistCommand, ctx: &Context) -> Result<()> {
    match command {
        ChecklistCommand::Show { id } => {
            let project = ctx.store.project(&id)?;
            let rows: Vec<ItemRow<'_>> = project
                .checklist
                .iter()
                .map(|item| ItemRow { item })
                .collect();
            let header = format!(
                "{}: {}% complete",
                project.number,
                completion_percentage(&project.checklist)
            );
            output::print_list(&rows, &header, "Checklist is empty", ctx.format);
        }

        ChecklistCommand::Toggle { id, item, undo } => {
            let project = ctx.project_for_update(&id)?;
            let item = ctx
                .store
                .toggle_checklist_item(project.id.as_str(), item, !undo)?;
            output::print(&ItemRow { item: &item }, ctx.format);
        }

        ChecklistCommand::Note { id, item, text } => {
            let project = ctx.project_for_update(&id)?;
            let author = ctx.actor()?.map(|a| a.email);
            let note = ctx
                .store
                .add_item_note(project.id.as_str(), item, author, &text)?;
            output::print(&NoteAdded { item, note }, ctx.format);
        }

        ChecklistCommand::Attach {
            id,
            item,
            reference,
        } => {
            let project = ctx.project_for_update(&id)?;
            let image = ctx
                .store
                .attach_item_image(project.id.as_str(), item, &reference)?;
            output::print(&ImageAttached { item, image }, ctx.format);
        }

        ChecklistCommand::Import { id, file } => {
            let project = ctx.project_for_update(&id)?;
            let json = std::fs::read_to_string(&file)
                .with_context(|| format!("cannot read {}", file.display()))?;
            let project = ctx.store.import_checklist_json(project.id.as_str(), &json)?;
            let report = ChecklistImported {
                number: project.number,
                items: project.checklist.len(),
            };
            output::print(&report, ctx.format);
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct NoteAdded {
    item: u32,
    note: ItemNote,
}

impl fmt::Display for NoteAdded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Note added to item {}", self.item)
    }
}

#[derive(Serialize)]
struct ImageAttached {
    item: u32,
    image: ItemImage,
}

impl fmt::Display for ImageAttached {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Attached {} to item {}", self.image.reference, self.item)
    }
}

#[derive(Serialize)]
struct ChecklistImported {
    number: String,
    items: usize,
}

impl fmt::Display for ChecklistImported {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Imported {} items into {}", self.items, self.number)
    }
}
