//! Period advancer.
//!
//! Pure function of catalog + parameters + target period. Counts use exact
//! integer ceiling division so that `ceil(period × numDebris / duration)`
//! never drifts on float rounding.

use crate::{
    aggregate, CollectedDebris, DebrisObject, LoggedDebris, MissionError, MissionParameters,
    MissionResults, PeriodLogEntry,
};

/// Outcome of advancing to a period, before it is committed to mission state.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodAdvance {
    pub period: u32,
    pub target_count: usize,
    pub prev_count: usize,
    pub collected: Vec<CollectedDebris>,
    /// `None` when nothing new was collected this period.
    pub log_entry: Option<PeriodLogEntry>,
    pub results: MissionResults,
    pub completes_mission: bool,
}

fn ceil_div(numerator: u64, denominator: u64) -> u64 {
    numerator.div_ceil(denominator)
}

/// Number of catalog entries collected once `period` has elapsed.
pub fn collected_by(period: u32, params: &MissionParameters) -> usize {
    if params.mission_duration == 0 || period == 0 {
        return 0;
    }
    let n = u64::from(params.num_debris);
    let count = ceil_div(u64::from(period) * n, u64::from(params.mission_duration)).min(n);
    usize::try_from(count).unwrap_or(usize::MAX)
}

/// Period in which the catalog entry at `index` is collected.
pub fn collection_period(index: usize, params: &MissionParameters) -> u32 {
    if params.num_debris == 0 {
        return 0;
    }
    let ordinal = index as u64 + 1;
    let period = ceil_div(
        ordinal * u64::from(params.mission_duration),
        u64::from(params.num_debris),
    );
    u32::try_from(period).unwrap_or(u32::MAX)
}

pub fn recovered_mass(debris: &DebrisObject, params: &MissionParameters) -> f64 {
    debris.mass * params.collection_efficiency
}

/// Compute the collected projection, log entry and results for `period`.
pub fn advance_to(
    catalog: &[DebrisObject],
    params: &MissionParameters,
    period: u32,
) -> Result<PeriodAdvance, MissionError> {
    if period == 0 || period > params.mission_duration {
        return Err(MissionError::OutOfRangeAdvance {
            period,
            duration: params.mission_duration,
        });
    }

    let target_count = collected_by(period, params).min(catalog.len());
    let prev_count = collected_by(period - 1, params).min(target_count);

    let collected: Vec<CollectedDebris> = catalog[..target_count]
        .iter()
        .enumerate()
        .map(|(index, debris)| CollectedDebris {
            debris: debris.clone(),
            collection_period: collection_period(index, params),
            recovered_mass: recovered_mass(debris, params),
        })
        .collect();

    let log_entry = (prev_count < target_count).then(|| {
        build_log_entry(period, &catalog[prev_count..target_count], &collected, params)
    });

    let results = aggregate(&collected, params, period);

    Ok(PeriodAdvance {
        period,
        target_count,
        prev_count,
        collected,
        log_entry,
        results,
        completes_mission: period >= params.mission_duration,
    })
}

fn build_log_entry(
    period: u32,
    todays: &[DebrisObject],
    collected: &[CollectedDebris],
    params: &MissionParameters,
) -> PeriodLogEntry {
    let debris_collected: Vec<LoggedDebris> = todays
        .iter()
        .map(|d| LoggedDebris {
            id: d.id.clone(),
            mass: d.mass,
            recovered_mass: recovered_mass(d, params),
            material: d.material,
            value: d.value,
            altitude: d.altitude,
            threat_level: d.threat_level,
        })
        .collect();

    PeriodLogEntry {
        period,
        total_mass: debris_collected.iter().map(|d| d.recovered_mass).sum(),
        total_value: debris_collected.iter().map(|d| d.value).sum(),
        debris_collected,
        cumulative_debris: u32::try_from(collected.len()).unwrap_or(u32::MAX),
        cumulative_mass: collected.iter().map(|c| c.recovered_mass).sum(),
        cumulative_value: collected.iter().map(|c| c.debris.value).sum(),
    }
}
