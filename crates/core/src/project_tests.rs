// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::checklist::default_items;
use crate::clock::FakeClock;
use chrono::Duration;
use yare::parameterized;

fn make_test_project(clock: &FakeClock) -> Project {
    Project::new(
        ProjectId::from("prj-1"),
        NewProject {
            number: "PRJ00346".to_string(),
            client_name: "Hopital Sud".to_string(),
            product: "Pharmacy".to_string(),
            technician: Some("tech@example.com".to_string()),
            ..NewProject::default()
        },
        default_items(),
        clock,
    )
}

/// Move a project forward through the engine, panicking on rejection
fn advance(project: Project, phase: Phase, state: PhaseState, clock: &FakeClock) -> Project {
    let (next, _) = project.request_phase_transition(phase, state, clock).unwrap();
    next
}

fn all_completed(clock: &FakeClock) -> Project {
    let mut p = make_test_project(clock);
    for phase in Phase::ALL {
        p = advance(p, phase, PhaseState::Completed, clock);
    }
    p
}

#[test]
fn new_project_is_pending_with_no_timestamps() {
    let clock = FakeClock::new();
    let p = make_test_project(&clock);

    assert_eq!(p.status, ProjectStatus::Pending);
    for phase in Phase::ALL {
        assert_eq!(p.phase(phase), PhaseState::NotStarted);
        assert!(p.started_at(phase).is_none());
        assert!(p.completed_at(phase).is_none());
    }
    assert_eq!(p.title, "Test - Hopital Sud - Pharmacy - PRJ00346");
    assert_eq!(p.created_at, clock.now());
    assert!(p.validate().is_ok());
}

#[test]
fn explicit_title_is_kept() {
    let clock = FakeClock::new();
    let p = Project::new(
        ProjectId::from("prj-2"),
        NewProject {
            number: "PRJ1".to_string(),
            title: Some("Lab upgrade".to_string()),
            ..NewProject::default()
        },
        Vec::new(),
        &clock,
    );
    assert_eq!(p.title, "Lab upgrade");
}

#[test]
fn starting_preparation_sets_started_at_and_status() {
    let clock = FakeClock::new();
    let p = make_test_project(&clock);
    clock.advance(Duration::minutes(10));

    let (p, change) = p
        .request_phase_transition(Phase::Preparation, PhaseState::InProgress, &clock)
        .unwrap();

    assert_eq!(p.preparation_phase, PhaseState::InProgress);
    assert_eq!(p.preparation_started_at, Some(clock.now()));
    assert!(p.preparation_completed_at.is_none());
    assert_eq!(p.status, ProjectStatus::InProgress);
    assert_eq!(p.updated_at, clock.now());
    assert_eq!(change.from, PhaseState::NotStarted);
    assert_eq!(change.to, PhaseState::InProgress);
    assert_eq!(change.label(), "Preparation → In progress");
}

#[parameterized(
    exec_in_progress = { Phase::Execution, PhaseState::InProgress, Phase::Preparation },
    exec_completed = { Phase::Execution, PhaseState::Completed, Phase::Preparation },
    validation_in_progress = { Phase::Validation, PhaseState::InProgress, Phase::Execution },
    validation_completed = { Phase::Validation, PhaseState::Completed, Phase::Execution },
)]
fn gated_phases_need_their_prerequisite(phase: Phase, state: PhaseState, prerequisite: Phase) {
    let clock = FakeClock::new();
    let p = advance(
        make_test_project(&clock),
        Phase::Preparation,
        PhaseState::InProgress,
        &clock,
    );
    let before = p.clone();

    let err = p.request_phase_transition(phase, state, &clock).unwrap_err();

    assert_eq!(
        err,
        EngineError::SequenceViolation {
            phase,
            prerequisite
        }
    );
    assert!(err.is_user_recoverable());
    assert_eq!(p, before);
}

#[test]
fn validation_gate_checks_execution_not_preparation() {
    let clock = FakeClock::new();
    let p = advance(
        make_test_project(&clock),
        Phase::Preparation,
        PhaseState::Completed,
        &clock,
    );
    let p = advance(p, Phase::Execution, PhaseState::InProgress, &clock);

    let err = p
        .request_phase_transition(Phase::Validation, PhaseState::InProgress, &clock)
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::SequenceViolation {
            phase: Phase::Validation,
            prerequisite: Phase::Execution
        }
    );
}

#[parameterized(
    execution = { Phase::Execution },
    validation = { Phase::Validation },
)]
fn resetting_to_not_started_is_never_gated(phase: Phase) {
    let clock = FakeClock::new();
    let p = make_test_project(&clock);
    let (p, change) = p
        .request_phase_transition(phase, PhaseState::NotStarted, &clock)
        .unwrap();
    assert_eq!(p.phase(phase), PhaseState::NotStarted);
    assert_eq!(change.from, change.to);
    assert_eq!(p.status, ProjectStatus::Pending);
}

#[test]
fn full_workflow_reaches_completed() {
    let clock = FakeClock::new();
    let mut p = make_test_project(&clock);

    p = advance(p, Phase::Preparation, PhaseState::InProgress, &clock);
    assert_eq!(
        p.request_phase_transition(Phase::Execution, PhaseState::InProgress, &clock)
            .unwrap_err(),
        EngineError::SequenceViolation {
            phase: Phase::Execution,
            prerequisite: Phase::Preparation
        }
    );

    clock.advance(Duration::hours(1));
    p = advance(p, Phase::Preparation, PhaseState::Completed, &clock);
    assert_eq!(p.preparation_completed_at, Some(clock.now()));
    assert_eq!(p.status, ProjectStatus::InProgress);

    p = advance(p, Phase::Execution, PhaseState::InProgress, &clock);
    p = advance(p, Phase::Execution, PhaseState::Completed, &clock);
    p = advance(p, Phase::Validation, PhaseState::InProgress, &clock);
    assert_eq!(p.status, ProjectStatus::InProgress);

    p = advance(p, Phase::Validation, PhaseState::Completed, &clock);
    assert_eq!(p.status, ProjectStatus::Completed);
    assert_eq!(p.phases_completed(), 3);
}

#[test]
fn jumping_straight_to_completed_also_starts() {
    let clock = FakeClock::new();
    let p = make_test_project(&clock);
    let (p, _) = p
        .request_phase_transition(Phase::Preparation, PhaseState::Completed, &clock)
        .unwrap();

    assert_eq!(p.preparation_started_at, Some(clock.now()));
    assert_eq!(p.preparation_completed_at, Some(clock.now()));
}

#[test]
fn timestamps_survive_reset_and_restart() {
    let clock = FakeClock::new();
    let p = advance(
        make_test_project(&clock),
        Phase::Preparation,
        PhaseState::InProgress,
        &clock,
    );
    let started = p.preparation_started_at;

    clock.advance(Duration::minutes(30));
    let p = advance(p, Phase::Preparation, PhaseState::NotStarted, &clock);
    assert_eq!(p.preparation_started_at, started);
    assert_eq!(p.status, ProjectStatus::Pending);

    clock.advance(Duration::minutes(30));
    let p = advance(p, Phase::Preparation, PhaseState::Completed, &clock);
    assert_eq!(p.preparation_started_at, started);
    assert_eq!(p.preparation_completed_at, Some(clock.now()));
}

#[test]
fn same_state_transition_changes_no_timestamps() {
    let clock = FakeClock::new();
    let p = advance(
        make_test_project(&clock),
        Phase::Preparation,
        PhaseState::InProgress,
        &clock,
    );
    let started = p.preparation_started_at;

    clock.advance(Duration::minutes(5));
    let (p, change) = p
        .request_phase_transition(Phase::Preparation, PhaseState::InProgress, &clock)
        .unwrap();
    assert_eq!(p.preparation_started_at, started);
    assert_eq!(change.from, PhaseState::InProgress);
    assert_eq!(change.to, PhaseState::InProgress);
}

#[parameterized(
    on_hold = { StatusAction::Hold, ProjectStatus::OnHold },
    cancelled = { StatusAction::Cancel, ProjectStatus::Cancelled },
)]
fn administrative_status_is_sticky(action: StatusAction, expected: ProjectStatus) {
    let clock = FakeClock::new();
    let (p, change) = make_test_project(&clock).change_status(action, &clock);
    assert_eq!(change.from, ProjectStatus::Pending);
    assert_eq!(p.status, expected);

    let mut p = p;
    for phase in Phase::ALL {
        p = advance(p, phase, PhaseState::InProgress, &clock);
        assert_eq!(p.status, expected);
        p = advance(p, phase, PhaseState::Completed, &clock);
        assert_eq!(p.status, expected);
    }
    assert_eq!(p.validation_phase, PhaseState::Completed);
}

#[test]
fn resume_returns_to_derived_status() {
    let clock = FakeClock::new();
    let p = advance(
        make_test_project(&clock),
        Phase::Preparation,
        PhaseState::InProgress,
        &clock,
    );
    let (p, _) = p.change_status(StatusAction::Hold, &clock);
    let (p, change) = p.change_status(StatusAction::Resume, &clock);

    assert_eq!(change.from, ProjectStatus::OnHold);
    assert_eq!(change.to, ProjectStatus::InProgress);
    assert_eq!(p.status, ProjectStatus::InProgress);
    assert_eq!(change.label(), "Status: On hold → In progress");
}

#[test]
fn resume_after_completion_is_completed() {
    let clock = FakeClock::new();
    let (p, _) = all_completed(&clock).change_status(StatusAction::Cancel, &clock);
    let (p, _) = p.change_status(StatusAction::Resume, &clock);
    assert_eq!(p.status, ProjectStatus::Completed);
}

#[parameterized(
    hold = { "hold", Ok(StatusAction::Hold) },
    cancel = { "cancel", Ok(StatusAction::Cancel) },
    resume = { "resume", Ok(StatusAction::Resume) },
    on_hold = { "on_hold", Ok(StatusAction::Hold) },
    cancelled = { "cancelled", Ok(StatusAction::Cancel) },
    pending = { "pending", Err(EngineError::DerivedStatus("pending".to_string())) },
    completed = { "completed", Err(EngineError::DerivedStatus("completed".to_string())) },
    bogus = { "paused", Err(EngineError::InvalidStatusName("paused".to_string())) },
)]
fn status_action_parsing(input: &str, expected: Result<StatusAction, EngineError>) {
    assert_eq!(input.parse::<StatusAction>(), expected);
}

#[test]
fn validate_catches_direct_field_writes() {
    let clock = FakeClock::new();
    let mut p = make_test_project(&clock);
    p.execution_phase = PhaseState::InProgress;

    let expected = Err(EngineError::SequenceViolation {
        phase: Phase::Execution,
        prerequisite: Phase::Preparation,
    });
    assert_eq!(p.validate(), expected);
    // No side effects: a second call sees the same project and answers the same
    let snapshot = p.clone();
    assert_eq!(p.validate(), expected);
    assert_eq!(p, snapshot);

    p.execution_phase = PhaseState::NotStarted;
    p.validation_phase = PhaseState::Completed;
    assert_eq!(
        p.validate(),
        Err(EngineError::SequenceViolation {
            phase: Phase::Validation,
            prerequisite: Phase::Execution,
        })
    );
}

#[test]
fn regressing_a_prerequisite_under_active_work_is_rejected() {
    let clock = FakeClock::new();
    let p = advance(
        make_test_project(&clock),
        Phase::Preparation,
        PhaseState::Completed,
        &clock,
    );
    let p = advance(p, Phase::Execution, PhaseState::Completed, &clock);
    let before = p.clone();

    let err = p
        .request_phase_transition(Phase::Preparation, PhaseState::InProgress, &clock)
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::SequenceViolation {
            phase: Phase::Execution,
            prerequisite: Phase::Preparation
        }
    );
    assert_eq!(p, before);
}

#[test]
fn regressing_the_last_active_phase_is_allowed() {
    let clock = FakeClock::new();
    let p = all_completed(&clock);
    let completed_at = p.validation_completed_at;

    let p = advance(p, Phase::Validation, PhaseState::InProgress, &clock);
    assert_eq!(p.status, ProjectStatus::InProgress);
    assert_eq!(p.validation_completed_at, completed_at);
}

#[parameterized(
    bad_phase = { "production", "in_progress", EngineError::InvalidPhaseName("production".to_string()) },
    bad_state = { "preparation", "done", EngineError::InvalidStateName("done".to_string()) },
)]
fn string_inputs_are_checked(phase: &str, state: &str, expected: EngineError) {
    let clock = FakeClock::new();
    let p = make_test_project(&clock);
    assert_eq!(
        p.request_phase_transition_str(phase, state, &clock)
            .unwrap_err(),
        expected
    );
}

#[test]
fn environment_and_work_type_parse() {
    assert_eq!("prod".parse::<Environment>().unwrap(), Environment::Prod);
    assert_eq!("production".parse::<Environment>().unwrap(), Environment::Prod);
    assert!("staging".parse::<Environment>().is_err());
    assert_eq!(
        "database_copy".parse::<WorkType>().unwrap(),
        WorkType::DatabaseCopy
    );
    assert!(matches!(
        "copy".parse::<WorkType>(),
        Err(EngineError::InvalidWorkType(_))
    ));
}

// Property-based tests
use proptest::prelude::*;

fn any_phase() -> impl Strategy<Value = Phase> {
    prop_oneof![
        Just(Phase::Preparation),
        Just(Phase::Execution),
        Just(Phase::Validation)
    ]
}

fn any_state() -> impl Strategy<Value = PhaseState> {
    prop_oneof![
        Just(PhaseState::NotStarted),
        Just(PhaseState::InProgress),
        Just(PhaseState::Completed)
    ]
}

proptest! {
    #[test]
    fn timestamps_never_move_or_clear(
        steps in proptest::collection::vec((any_phase(), any_state(), 1..120i64), 1..40)
    ) {
        let clock = FakeClock::new();
        let mut p = make_test_project(&clock);

        for (phase, state, minutes) in steps {
            clock.advance(Duration::minutes(minutes));
            let before = p.clone();
            match p.request_phase_transition(phase, state, &clock) {
                Ok((next, _)) => {
                    for ph in Phase::ALL {
                        if let Some(t) = before.started_at(ph) {
                            prop_assert_eq!(next.started_at(ph), Some(t));
                        }
                        if let Some(t) = before.completed_at(ph) {
                            prop_assert_eq!(next.completed_at(ph), Some(t));
                        }
                        if next.completed_at(ph).is_some() {
                            prop_assert!(next.started_at(ph).is_some());
                        }
                    }
                    prop_assert!(next.validate().is_ok());
                    p = next;
                }
                Err(e) => {
                    let is_sequence_violation = matches!(e, EngineError::SequenceViolation { .. });
                    prop_assert!(is_sequence_violation);
                }
            }
        }
    }

    #[test]
    fn status_matches_phases_without_override(
        steps in proptest::collection::vec((any_phase(), any_state()), 1..30)
    ) {
        let clock = FakeClock::new();
        let mut p = make_test_project(&clock);
        for (phase, state) in steps {
            if let Ok((next, _)) = p.request_phase_transition(phase, state, &clock) {
                p = next;
            }
            prop_assert_eq!(
                p.status,
                derived_status(p.preparation_phase, p.execution_phase, p.validation_phase)
            );
        }
    }
}

#[test]
fn rebase_phases_keeps_history_and_stamps_moved_phases() {
    let clock = FakeClock::new();
    let stored = advance(
        make_test_project(&clock),
        Phase::Preparation,
        PhaseState::Completed,
        &clock,
    );

    clock.advance(Duration::hours(1));
    let mut edited = stored.clone();
    edited.preparation_started_at = None;
    edited.preparation_completed_at = None;
    edited.execution_phase = PhaseState::Completed;
    edited.validation_started_at = Some(clock.now() + Duration::hours(5));
    let changes = edited.rebase_phases(&stored, clock.now());

    assert_eq!(edited.preparation_started_at, stored.preparation_started_at);
    assert_eq!(edited.preparation_completed_at, stored.preparation_completed_at);
    assert_eq!(edited.execution_started_at, Some(clock.now()));
    assert_eq!(edited.execution_completed_at, Some(clock.now()));
    assert_eq!(edited.validation_started_at, None);
    assert_eq!(edited.status, ProjectStatus::InProgress);
    assert_eq!(
        changes,
        vec![PhaseChange {
            phase: Phase::Execution,
            from: PhaseState::NotStarted,
            to: PhaseState::Completed,
            at: clock.now(),
        }]
    );
}
