// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Demo data

use super::Context;
use crate::output;
use anyhow::{bail, Result};
use clap::Args;
use dt_core::{Environment, NewProject, Phase, PhaseState, StatusAction, WorkType};
use dt_storage::StoreError;
use serde::Serialize;
use std::fmt;
use tracing::info;

const CLIENTS: &[&str] = &[
    "CHU Sainte-Justine",
    "Hôpital Maisonneuve-Rosemont",
    "Hôpital du Sacré-Cœur de Montréal",
    "Hôpital de Verdun",
    "Cité-de-la-Santé de Laval",
    "CHUS – Hôpital Fleurimont",
    "CISSS de Lanaudière – Joliette",
];

const PRODUCTS: &[&str] = &[
    "Dossier patient",
    "RIS/PACS",
    "Gestion des lits",
    "Portail patients",
    "Facturation",
    "Pharmacie",
];

#[derive(Args)]
pub struct SeedArgs {
    /// How many projects to create
    #[arg(long, default_value_t = 25)]
    pub count: u32,
    /// First project number, e.g. 34 gives PRJ0034
    #[arg(long, default_value_t = 34)]
    pub start: u32,
}

/// Phase steps applied to the n-th seeded project
fn progression(n: u32) -> &'static [(Phase, PhaseState)] {
    static STEPS: [(Phase, PhaseState); 4] = [
        (Phase::Preparation, PhaseState::Completed),
        (Phase::Execution, PhaseState::InProgress),
        (Phase::Execution, PhaseState::Completed),
        (Phase::Validation, PhaseState::Completed),
    ];
    match n % 5 {
        0 => &[],
        1 => &STEPS[..1],
        2 => &STEPS[..2],
        _ => &STEPS,
    }
}

pub fn handle(args: SeedArgs, ctx: &Context) -> Result<()> {
    let technicians = ctx.directory_emails();
    let created_by = ctx.actor()?.map(|a| a.email);

    let mut created = 0;
    let mut next = Some(args.start);
    while created < args.count {
        let Some(n) = next else {
            bail!(
                "ran out of project numbers after seeding {} of {} projects",
                created,
                args.count
            );
        };
        next = n.checked_add(1);

        let spec = NewProject {
            number: format!("PRJ{:04}", n),
            title: None,
            client_name: CLIENTS[n as usize % CLIENTS.len()].to_string(),
            product: PRODUCTS[n as usize % PRODUCTS.len()].to_string(),
            environment: if n % 3 == 0 {
                Environment::Prod
            } else {
                Environment::Test
            },
            work_type: WorkType::ALL[n as usize % WorkType::ALL.len()],
            technician: technicians
                .get(n as usize % technicians.len().max(1))
                .cloned(),
            created_by: created_by.clone(),
        };

        let project = match ctx.store.create_project(spec, None) {
            Ok(p) => p,
            Err(StoreError::DuplicateNumber(taken)) => {
                info!(number = %taken, "skipping number already in use");
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        for (phase, state) in progression(n) {
            ctx.store
                .request_phase_transition(project.id.as_str(), *phase, *state)?;
        }
        if n % 11 == 0 {
            ctx.store.set_status(project.id.as_str(), StatusAction::Hold)?;
        }
        created += 1;
    }

    output::print(&SeedReport { created }, ctx.format);
    Ok(())
}

#[derive(Serialize)]
struct SeedReport {
    created: u32,
}

impl fmt::Display for SeedReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Seeded {} projects", self.created)
    }
}
