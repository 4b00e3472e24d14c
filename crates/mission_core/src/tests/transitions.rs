use super::*;

#[test]
fn test_new_engine_is_ready_with_catalog() {
    let engine = make_engine(base_params());
    assert_eq!(engine.phase(), MissionPhase::Ready);
    assert_eq!(engine.stage(), MissionStage::Setup);
    assert_eq!(engine.current_period(), 0);
    assert_eq!(engine.catalog().len(), 15);
    assert!(engine.collected().is_empty());
    assert!(engine.period_log().is_empty());
    assert!(engine.scheduled_tick().is_none());
}

#[test]
fn test_start_moves_to_running_and_arms_timer() {
    let mut engine = make_engine(base_params());
    engine.start().unwrap();
    assert_eq!(engine.phase(), MissionPhase::Running);
    assert_eq!(engine.stage(), MissionStage::Identification);
    assert_eq!(engine.current_period(), 0);
    assert!(engine.scheduled_tick().is_some());
}

#[test]
fn test_start_twice_is_rejected() {
    let mut engine = make_engine(base_params());
    engine.start().unwrap();
    assert_eq!(
        engine.start().unwrap_err(),
        MissionError::InvalidTransition {
            action: "start",
            phase: MissionPhase::Running
        }
    );
}

#[test]
fn test_pause_only_while_running() {
    let mut engine = make_engine(base_params());
    assert!(matches!(
        engine.pause(),
        Err(MissionError::InvalidTransition { action: "pause", .. })
    ));

    engine.start().unwrap();
    engine.pause().unwrap();
    assert_eq!(engine.phase(), MissionPhase::Paused);
    assert!(engine.scheduled_tick().is_none());

    assert!(engine.pause().is_err(), "second pause is rejected");
    assert_eq!(engine.phase(), MissionPhase::Paused);
}

#[test]
fn test_resume_only_while_paused() {
    let mut engine = make_engine(base_params());
    assert!(engine.resume().is_err());

    engine.start().unwrap();
    assert!(engine.resume().is_err());

    engine.pause().unwrap();
    engine.resume().unwrap();
    assert_eq!(engine.phase(), MissionPhase::Running);
    assert!(engine.scheduled_tick().is_some());
}

#[test]
fn test_step_advances_one_period_and_stays_paused() {
    let mut engine = started_paused(even_params());
    engine.step().unwrap();
    assert_eq!(engine.current_period(), 1);
    assert_eq!(engine.phase(), MissionPhase::Paused);
    assert_eq!(engine.collected().len(), 2);
    assert_eq!(engine.period_log().len(), 1);
    assert!(engine.scheduled_tick().is_none());
}

#[test]
fn test_step_rejected_unless_paused() {
    let mut engine = make_engine(even_params());
    assert!(matches!(
        engine.step(),
        Err(MissionError::InvalidTransition {
            action: "step",
            phase: MissionPhase::Ready
        })
    ));

    engine.start().unwrap();
    assert!(matches!(
        engine.step(),
        Err(MissionError::InvalidTransition {
            action: "step",
            phase: MissionPhase::Running
        })
    ));
    assert_eq!(engine.current_period(), 0);
}

#[test]
fn test_stepping_to_final_period_completes() {
    let mut engine = started_paused(even_params());
    step_to(&mut engine, 5);

    assert_eq!(engine.phase(), MissionPhase::Complete);
    assert_eq!(engine.stage(), MissionStage::Complete);
    assert!(engine.current_target().is_none());
    assert!(engine.scheduled_tick().is_none());
    assert!(!engine.can_step());
    assert!(matches!(
        engine.step(),
        Err(MissionError::InvalidTransition {
            action: "step",
            phase: MissionPhase::Complete
        })
    ));
    assert_eq!(engine.current_period(), 5, "period never exceeds duration");
}

#[test]
fn test_rejected_transition_leaves_state_untouched() {
    let mut engine = started_paused(even_params());
    engine.step().unwrap();
    let before = engine.snapshot();

    assert!(engine.start().is_err());
    assert!(engine.pause().is_err());

    let after = engine.snapshot();
    assert_eq!(before.phase, after.phase);
    assert_eq!(before.current_period, after.current_period);
    assert_eq!(before.period_log, after.period_log);
    assert_eq!(before.results, after.results);
}

#[test]
fn test_stage_moves_forward_with_progress() {
    let params = MissionParameters {
        num_debris: 8,
        mission_duration: 8,
        ..MissionParameters::default()
    };
    let mut engine = started_paused(params);
    let mut stages = vec![engine.stage()];
    for _ in 0..8 {
        engine.step().unwrap();
        stages.push(engine.stage());
    }
    assert_eq!(
        stages,
        vec![
            MissionStage::Identification,
            MissionStage::Identification,
            MissionStage::Collection,
            MissionStage::Collection,
            MissionStage::Processing,
            MissionStage::Processing,
            MissionStage::EconomicAnalysis,
            MissionStage::EconomicAnalysis,
            MissionStage::Complete,
        ]
    );
    assert_eq!(MissionStage::Complete.title(), "Mission Complete");
    let indices: Vec<u8> = stages.iter().copied().map(MissionStage::index).collect();
    assert_eq!(indices, vec![1, 1, 2, 2, 3, 3, 4, 4, 5]);
}

#[test]
fn test_current_target_is_last_collected() {
    let mut engine = started_paused(even_params());
    step_to(&mut engine, 2);
    let target = engine.current_target().unwrap();
    assert_eq!(target.id, engine.catalog()[3].id);
}

#[test]
fn test_reset_from_any_phase_returns_to_ready() {
    for advance in [false, true] {
        let mut engine = started_paused(even_params());
        if advance {
            step_to(&mut engine, 5);
        }
        let old_catalog = engine.catalog().to_vec();
        engine.reset();

        assert_eq!(engine.phase(), MissionPhase::Ready);
        assert_eq!(engine.stage(), MissionStage::Setup);
        assert_eq!(engine.current_period(), 0);
        assert!(engine.period_log().is_empty());
        assert!(engine.collected().is_empty());
        assert_eq!(engine.results(), &MissionResults::default());
        assert_eq!(engine.catalog().len(), 10);
        assert_ne!(engine.catalog(), old_catalog.as_slice(), "catalog is redrawn");
        assert_eq!(engine.params(), &even_params());
    }
}

#[test]
fn test_restart_after_reset_begins_at_period_zero() {
    let mut engine = started_paused(even_params());
    step_to(&mut engine, 3);
    engine.reset();
    engine.start().unwrap();
    assert_eq!(engine.current_period(), 0);
    assert!(engine.period_log().is_empty());
}

#[test]
fn test_configure_rejects_invalid_and_keeps_previous() {
    let mut engine = make_engine(even_params());
    let catalog = engine.catalog().to_vec();

    let bad = [
        MissionParameters {
            mission_duration: 0,
            ..even_params()
        },
        MissionParameters {
            collection_efficiency: 1.5,
            ..even_params()
        },
        MissionParameters {
            collection_efficiency: f64::NAN,
            ..even_params()
        },
        MissionParameters {
            cost_per_mission: -1.0,
            ..even_params()
        },
        MissionParameters {
            num_debris: MAX_DEBRIS + 1,
            ..even_params()
        },
        MissionParameters {
            num_debris: u32::MAX,
            ..even_params()
        },
    ];
    for params in bad {
        assert!(matches!(
            engine.configure(params),
            Err(MissionError::InvalidConfiguration { .. })
        ));
    }
    assert_eq!(engine.params(), &even_params());
    assert_eq!(engine.catalog(), catalog.as_slice());
}

#[test]
fn test_configure_accepts_largest_catalog() {
    let mut engine = make_engine(even_params());
    engine
        .configure(MissionParameters {
            num_debris: MAX_DEBRIS,
            ..even_params()
        })
        .unwrap();
    assert_eq!(engine.catalog().len(), MAX_DEBRIS as usize);
}

#[test]
fn test_configure_mid_run_discards_mission() {
    let mut engine = started_paused(even_params());
    step_to(&mut engine, 2);
    engine.configure(base_params()).unwrap();

    assert_eq!(engine.phase(), MissionPhase::Ready);
    assert_eq!(engine.current_period(), 0);
    assert_eq!(engine.catalog().len(), 15);
    assert!(engine.period_log().is_empty());
    assert!(engine.scheduled_tick().is_none());
}

#[test]
fn test_new_rejects_invalid_params() {
    let params = MissionParameters {
        mission_duration: 0,
        ..base_params()
    };
    assert!(MissionEngine::new(params, 1).is_err());
}

#[test]
fn test_monotonic_projection_across_periods() {
    let mut engine = started_paused(base_params());
    let mut previous_ids: Vec<DebrisId> = Vec::new();
    let mut previous = MissionResults::default();
    while engine.can_step() {
        engine.step().unwrap();
        let ids = collected_ids(&engine);
        assert!(previous_ids.iter().all(|id| ids.contains(id)));
        let results = engine.results();
        assert!(results.total_collected >= previous.total_collected);
        assert!(results.total_mass >= previous.total_mass);
        assert!(results.total_value >= previous.total_value);
        previous_ids = ids;
        previous = results.clone();
    }
    assert_eq!(engine.phase(), MissionPhase::Complete);
}
