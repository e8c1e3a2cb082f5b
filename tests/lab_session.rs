use momentum_lab::lab::{
    Axis, EntryField, FieldStatus, LabError, LabSession, NotificationLevel, Phase, Puck, Section,
    SectionStatus,
};
use momentum_lab::LabSettings;
use momentum_lab::settings::MassPreset;
use momentum_lab::persistence::MemoryStore;
use momentum_lab::sim::{
    CollisionMode, Command, FixedRandom, SimPhase, SimulationState, advance,
    apply_command,
};

/// Session with mid-range noise draws (no jitter, restitution 0.9)
fn quiet_session() -> LabSession {
    LabSession::with_random(LabSettings::default(), Box::new(FixedRandom(0.5)))
}

fn run_until_collided(session: &mut LabSession) {
    assert!(session.start());
    for _ in 0..1000 {
        if session.state().has_collided() {
            return;
        }
        session.tick();
    }
    panic!("no collision within 1000 ticks");
}

fn run_until_settled(session: &mut LabSession) {
    for _ in 0..10_000 {
        if session.state().phase == SimPhase::Settled {
            return;
        }
        session.tick();
    }
    panic!("run never settled");
}

#[test]
fn second_commit_of_same_collision_fails_and_keeps_data() {
    let mut session = quiet_session();
    run_until_collided(&mut session);
    session.commit_to_trial(1).unwrap();
    let first = session.trial(CollisionMode::OneD, 1).cloned().unwrap();

    assert_eq!(session.commit_to_trial(1), Err(LabError::NoCollisionData));
    assert_eq!(session.commit_to_trial(2), Err(LabError::NoCollisionData));
    assert_eq!(session.trial(CollisionMode::OneD, 1), Some(&first));
    assert!(!session.trial(CollisionMode::OneD, 2).unwrap().is_committed());

    let notes = session.take_notifications();
    assert_eq!(notes.len(), 2);
    assert!(notes.iter().all(|n| n.level == NotificationLevel::Warning));
}

#[test]
fn commit_survives_until_reset_and_new_run() {
    let mut session = quiet_session();
    run_until_collided(&mut session);
    run_until_settled(&mut session);
    // Settling does not consume the capture
    session.commit_to_trial(3).unwrap();

    session.reset();
    assert_eq!(session.commit_to_trial(3), Err(LabError::NoCollisionData));
    run_until_collided(&mut session);
    assert!(session.commit_to_trial(3).is_ok());
}

#[test]
fn only_first_collision_is_captured() {
    // A heavy launcher at full speed catches the light target again after
    // the target rebounds off the right wall
    let settings = LabSettings {
        launch_speed: 6.0,
        ..LabSettings::from_preset(MassPreset::LightTarget)
    };
    let mut rng = FixedRandom(0.5);
    let mut state = SimulationState::new(settings.layout(), settings.launch());
    assert!(apply_command(&mut state, Command::Start, &mut rng));

    let mut first = None;
    let mut bounced_after_first = false;
    let mut second_contact = false;
    for _ in 0..3000 {
        let before = (state.body_a.vel, state.body_b.vel);
        let report = advance(&mut state, &mut rng);
        if report.first_collision {
            assert!(first.is_none(), "first collision reported twice");
            first = state.capture;
            continue;
        }
        let Some(captured) = first else {
            continue;
        };
        if report.wall_bounce {
            bounced_after_first = true;
        }
        if report.contact && bounced_after_first && !second_contact {
            second_contact = true;
            assert!(state.body_a.vel.x < before.0.x, "second collision slows the launcher");
            assert!(state.body_b.vel.x > 0.0, "target rebounds off the launcher");
            assert_eq!(state.capture, Some(captured));
            assert_eq!(state.before_collision(), Some(&captured.before));
            assert_eq!(state.after_collision(), Some(&captured.after));
        }
        if state.phase == SimPhase::Settled {
            break;
        }
    }

    assert!(first.is_some(), "no first collision");
    assert!(second_contact, "pucks never met again after the wall bounce");
    assert_eq!(state.capture, first);
    assert_eq!(state.phase, SimPhase::Settled);
}

#[test]
fn failed_save_reports_without_rollback() {
    let mut store = MemoryStore::new();
    store.set_offline(true);
    let mut session = quiet_session();
    session.connect_store(Box::new(store));

    run_until_collided(&mut session);
    session.commit_to_trial(1).unwrap();
    let field = EntryField::Momentum {
        puck: Puck::A,
        phase: Phase::Before,
        axis: Axis::X,
    };
    assert!(session.enter_value(CollisionMode::OneD, 1, field, "12.5"));
    session.flush_persistence();

    let notes = session.take_notifications();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].level, NotificationLevel::Error);
    let trial = session.trial(CollisionMode::OneD, 1).unwrap();
    assert!(trial.is_committed());
    assert_eq!(trial.entries.get(field), Some(12.5));

    // Nothing new queued, nothing new reported
    session.flush_persistence();
    assert!(session.take_notifications().is_empty());
}

#[test]
fn successful_saves_reach_other_subscribers() {
    let mut session = quiet_session();
    session.connect_store(Box::new(MemoryStore::new()));
    run_until_collided(&mut session);
    session.commit_to_trial(2).unwrap();
    session.flush_persistence();

    // A second session attached to the same document sees the trial
    let store = session.disconnect_store().unwrap();
    let mut other = quiet_session();
    other.connect_store(store);
    other.flush_persistence();
    assert!(other.trial(CollisionMode::OneD, 2).unwrap().is_committed());
    assert_eq!(other.section_status(), session.section_status());
}

#[test]
fn section_progress_follows_entries() {
    let mut session = quiet_session();
    assert!(
        session
            .section_status()
            .values()
            .all(|p| p.status == SectionStatus::NotStarted)
    );

    run_until_collided(&mut session);
    session.commit_to_trial(1).unwrap();
    let readings = session.trial(CollisionMode::OneD, 1).unwrap().readings.unwrap();

    let field = EntryField::Momentum {
        puck: Puck::B,
        phase: Phase::After,
        axis: Axis::X,
    };
    let correct = readings.body(Phase::After, Puck::B).momentum_x;
    session.enter_value(CollisionMode::OneD, 1, field, &format!("{correct:.3}"));
    assert_eq!(
        session.field_status(CollisionMode::OneD, 1, field),
        FieldStatus::Correct
    );
    assert_eq!(
        session.section_status()[&Section::OneDimensional].status,
        SectionStatus::InProgress
    );

    // A wrong answer is filled but not correct
    session.enter_value(CollisionMode::OneD, 1, field, &format!("{:.3}", correct * 2.0 + 1.0));
    assert_eq!(
        session.field_status(CollisionMode::OneD, 1, field),
        FieldStatus::Incorrect
    );

    // Clearing the only entry moves the section back
    session.clear_value(CollisionMode::OneD, 1, field);
    assert_eq!(
        session.field_status(CollisionMode::OneD, 1, field),
        FieldStatus::Empty
    );
    assert_eq!(
        session.section_status()[&Section::OneDimensional].status,
        SectionStatus::NotStarted
    );
}

#[test]
fn equal_mass_head_on_run_conserves_momentum_closely() {
    let mut session = quiet_session();
    run_until_collided(&mut session);
    session.commit_to_trial(1).unwrap();
    let readings = session.trial(CollisionMode::OneD, 1).unwrap().readings.unwrap();

    let before = readings.total(Phase::Before, Axis::X).unwrap();
    let after = readings.total(Phase::After, Axis::X).unwrap();
    assert!(before > 0.0);
    assert!((before - after).abs() < 1e-9 * before.abs());
    assert!(readings.percent_difference(Axis::X).unwrap() < 1e-6);
}
