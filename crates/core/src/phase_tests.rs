// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    all_not_started = { PhaseState::NotStarted, PhaseState::NotStarted, PhaseState::NotStarted, ProjectStatus::Pending },
    prep_in_progress = { PhaseState::InProgress, PhaseState::NotStarted, PhaseState::NotStarted, ProjectStatus::InProgress },
    prep_completed = { PhaseState::Completed, PhaseState::NotStarted, PhaseState::NotStarted, ProjectStatus::InProgress },
    exec_in_progress = { PhaseState::Completed, PhaseState::InProgress, PhaseState::NotStarted, ProjectStatus::InProgress },
    exec_completed = { PhaseState::Completed, PhaseState::Completed, PhaseState::NotStarted, ProjectStatus::InProgress },
    validation_in_progress = { PhaseState::Completed, PhaseState::Completed, PhaseState::InProgress, ProjectStatus::InProgress },
    all_completed = { PhaseState::Completed, PhaseState::Completed, PhaseState::Completed, ProjectStatus::Completed },
    prep_reset_after_exec = { PhaseState::NotStarted, PhaseState::Completed, PhaseState::NotStarted, ProjectStatus::InProgress },
    only_validation_active = { PhaseState::NotStarted, PhaseState::NotStarted, PhaseState::InProgress, ProjectStatus::InProgress },
)]
fn derivation_table(
    preparation: PhaseState,
    execution: PhaseState,
    validation: PhaseState,
    expected: ProjectStatus,
) {
    assert_eq!(derived_status(preparation, execution, validation), expected);
}

#[test]
fn derivation_covers_every_combination() {
    for p in PhaseState::ALL {
        for e in PhaseState::ALL {
            for v in PhaseState::ALL {
                let status = derived_status(p, e, v);
                let all_done = [p, e, v].iter().all(|s| *s == PhaseState::Completed);
                let any_active = [p, e, v].iter().any(|s| s.is_active());
                let expected = if all_done {
                    ProjectStatus::Completed
                } else if any_active {
                    ProjectStatus::InProgress
                } else {
                    ProjectStatus::Pending
                };
                assert_eq!(status, expected, "{p} {e} {v}");
                assert!(!status.is_administrative());
            }
        }
    }
}

#[parameterized(
    preparation = { "preparation", Phase::Preparation },
    execution = { "execution", Phase::Execution },
    validation = { "validation", Phase::Validation },
)]
fn phase_parses(input: &str, expected: Phase) {
    assert_eq!(input.parse::<Phase>().unwrap(), expected);
    assert_eq!(expected.to_string(), input);
}

#[test]
fn unknown_phase_is_rejected() {
    assert_eq!(
        "production".parse::<Phase>(),
        Err(EngineError::InvalidPhaseName("production".to_string()))
    );
    assert_eq!(
        "Preparation".parse::<Phase>(),
        Err(EngineError::InvalidPhaseName("Preparation".to_string()))
    );
}

#[test]
fn unknown_state_is_rejected() {
    assert_eq!(
        "done".parse::<PhaseState>(),
        Err(EngineError::InvalidStateName("done".to_string()))
    );
}

#[test]
fn status_round_trips_through_str() {
    for status in ProjectStatus::ALL {
        assert_eq!(status.as_str().parse::<ProjectStatus>().unwrap(), status);
    }
    assert!(matches!(
        "assigned".parse::<ProjectStatus>(),
        Err(EngineError::InvalidStatusName(_))
    ));
}

#[test]
fn prerequisites_chain_in_order() {
    assert_eq!(Phase::Preparation.prerequisite(), None);
    assert_eq!(Phase::Execution.prerequisite(), Some(Phase::Preparation));
    assert_eq!(Phase::Validation.prerequisite(), Some(Phase::Execution));
}

#[test]
fn enums_serialize_as_snake_case() {
    assert_eq!(
        serde_json::to_string(&PhaseState::NotStarted).unwrap(),
        "\"not_started\""
    );
    assert_eq!(
        serde_json::to_string(&ProjectStatus::OnHold).unwrap(),
        "\"on_hold\""
    );
    // Out-of-domain values are rejected at the storage boundary
    assert!(serde_json::from_str::<PhaseState>("\"paused\"").is_err());
}
