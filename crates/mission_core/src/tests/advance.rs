use super::*;

#[test]
fn test_even_rate_period_three() {
    let params = even_params();
    let catalog = generate(&params, &mut make_rng());
    let advance = advance_to(&catalog, &params, 3).unwrap();

    assert_eq!(advance.target_count, 6);
    assert_eq!(advance.prev_count, 4);
    let entry = advance.log_entry.expect("two objects collected in period 3");
    assert_eq!(entry.period, 3);
    assert_eq!(entry.debris_collected.len(), 2);
    assert_eq!(entry.debris_collected[0].id, catalog[4].id);
    assert_eq!(entry.debris_collected[1].id, catalog[5].id);
    assert_eq!(entry.cumulative_debris, 6);
    assert!((advance.target_count as f64 - 3.0 * params.collection_rate()).abs() < 1e-9);
}

#[test]
fn test_fractional_rate_skips_some_periods() {
    // 15 objects over 30 periods: one object every other period.
    let params = base_params();
    let catalog = generate(&params, &mut make_rng());

    let first = advance_to(&catalog, &params, 1).unwrap();
    assert_eq!((first.prev_count, first.target_count), (0, 1));
    assert!(first.log_entry.is_some());

    let second = advance_to(&catalog, &params, 2).unwrap();
    assert_eq!((second.prev_count, second.target_count), (1, 1));
    assert!(second.log_entry.is_none(), "no new collections in period 2");

    let third = advance_to(&catalog, &params, 3).unwrap();
    assert_eq!((third.prev_count, third.target_count), (1, 2));
    assert!(third.log_entry.is_some());
}

#[test]
fn test_out_of_range_periods_rejected() {
    let params = even_params();
    let catalog = generate(&params, &mut make_rng());
    assert_eq!(
        advance_to(&catalog, &params, 0),
        Err(MissionError::OutOfRangeAdvance {
            period: 0,
            duration: 5
        })
    );
    assert_eq!(
        advance_to(&catalog, &params, 6),
        Err(MissionError::OutOfRangeAdvance {
            period: 6,
            duration: 5
        })
    );
}

#[test]
fn test_advance_is_deterministic() {
    let params = base_params();
    let catalog = generate(&params, &mut make_rng());
    for period in 1..=params.mission_duration {
        let a = advance_to(&catalog, &params, period).unwrap();
        let b = advance_to(&catalog, &params, period).unwrap();
        assert_eq!(a, b, "period {period} differs between calls");
    }
}

#[test]
fn test_collection_period_annotation() {
    let params = even_params();
    let catalog = generate(&params, &mut make_rng());
    let advance = advance_to(&catalog, &params, 5).unwrap();
    let periods: Vec<u32> = advance
        .collected
        .iter()
        .map(|c| c.collection_period)
        .collect();
    assert_eq!(periods, vec![1, 1, 2, 2, 3, 3, 4, 4, 5, 5]);

    // Rate 0.5: entry i is annotated with ceil((i + 1) / 0.5).
    let params = base_params();
    assert_eq!(collection_period(0, &params), 2);
    assert_eq!(collection_period(1, &params), 4);
    assert_eq!(collection_period(14, &params), 30);
}

#[test]
fn test_collected_by_uses_exact_ceiling() {
    // 7 / 3 = 2.333.. per period: 3, 5, 7.
    let params = MissionParameters {
        num_debris: 7,
        mission_duration: 3,
        ..MissionParameters::default()
    };
    assert_eq!(collected_by(0, &params), 0);
    assert_eq!(collected_by(1, &params), 3);
    assert_eq!(collected_by(2, &params), 5);
    assert_eq!(collected_by(3, &params), 7);
}

#[test]
fn test_recovered_mass_applies_efficiency() {
    let params = even_params();
    let catalog = generate(&params, &mut make_rng());
    let advance = advance_to(&catalog, &params, 1).unwrap();
    for collected in &advance.collected {
        assert!((collected.recovered_mass - collected.debris.mass * 0.8).abs() < 1e-9);
    }
}

#[test]
fn test_log_entry_totals_match_projection() {
    let params = even_params();
    let catalog = generate(&params, &mut make_rng());
    let advance = advance_to(&catalog, &params, 4).unwrap();
    let entry = advance.log_entry.unwrap();

    let period_mass: f64 = entry.debris_collected.iter().map(|d| d.recovered_mass).sum();
    assert!((entry.total_mass - period_mass).abs() < 1e-9);
    assert!((entry.cumulative_mass - advance.results.total_mass).abs() < 1e-9);
    assert!((entry.cumulative_value - advance.results.total_value).abs() < 1e-6);
}

#[test]
fn test_final_period_completes_and_conserves_mass() {
    let params = base_params();
    let catalog = generate(&params, &mut make_rng());
    let advance = advance_to(&catalog, &params, params.mission_duration).unwrap();

    assert!(advance.completes_mission);
    assert_eq!(advance.results.total_collected, params.num_debris);
    let expected: f64 = catalog
        .iter()
        .map(|d| d.mass * params.collection_efficiency)
        .sum();
    assert!((advance.results.total_mass - expected).abs() < 1e-6);
    assert!((advance.results.total_cost - params.cost_per_mission).abs() < 1e-6);
}

#[test]
fn test_empty_catalog_advances_with_zero_results() {
    let params = MissionParameters {
        num_debris: 0,
        ..even_params()
    };
    let advance = advance_to(&[], &params, 2).unwrap();
    assert_eq!(advance.target_count, 0);
    assert!(advance.log_entry.is_none());
    assert_eq!(advance.results.total_collected, 0);
    assert!(advance.results.risk_reduced.abs() < f64::EPSILON);
}
