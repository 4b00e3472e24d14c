use std::time::Duration;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::advance::{advance_to, PeriodAdvance};
use crate::{
    aggregate, catalog, CollectedDebris, Counters, DebrisObject, Event, EventEnvelope,
    MissionError, MissionParameters, MissionPhase, MissionResults, MissionSnapshot, MissionStage,
    PeriodLogEntry,
};

/// Default pacing of automatic advancement.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Largest catalog a mission may be configured with.
pub const MAX_DEBRIS: u32 = 10_000;

/// Identifies one arming of the auto-advance timer. A tick carrying any other
/// token is stale and ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerToken(u64);

/// Cancellable scheduled-task handle for timer-driven advancement.
///
/// The engine holds at most one. Whoever drives real time sleeps for
/// `interval` and then calls [`MissionEngine::tick`] with `token`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledTick {
    pub token: TimerToken,
    pub interval: Duration,
}

#[derive(Debug, Clone)]
pub enum TickOutcome {
    Advanced(Vec<EventEnvelope>),
    /// The advance reached the final period; the timer is disarmed.
    Completed(Vec<EventEnvelope>),
    /// Token was not the armed one (paused, reset, reconfigured or re-armed).
    Cancelled,
}

/// Mutable per-run state. Replaced wholesale on reset or reconfiguration.
#[derive(Debug, Clone, Default)]
struct MissionState {
    phase: MissionPhase,
    stage: MissionStage,
    current_period: u32,
    current_target: Option<DebrisObject>,
    collected_projection: Vec<CollectedDebris>,
    period_log: Vec<PeriodLogEntry>,
    results: MissionResults,
}

/// Single owner of the catalog, the mission state and the timer handle.
pub struct MissionEngine {
    params: MissionParameters,
    seed: u64,
    rng: ChaCha8Rng,
    catalog: Vec<DebrisObject>,
    state: MissionState,
    timer: Option<ScheduledTick>,
    tick_interval: Duration,
    counters: Counters,
}

impl MissionEngine {
    pub fn new(params: MissionParameters, seed: u64) -> Result<Self, MissionError> {
        validate_params(&params)?;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let catalog = catalog::generate(&params, &mut rng);
        Ok(Self {
            params,
            seed,
            rng,
            catalog,
            state: MissionState::default(),
            timer: None,
            tick_interval: DEFAULT_TICK_INTERVAL,
            counters: Counters {
                next_event_id: 0,
                next_timer_token: 0,
            },
        })
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn params(&self) -> &MissionParameters {
        &self.params
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn phase(&self) -> MissionPhase {
        self.state.phase
    }

    pub fn stage(&self) -> MissionStage {
        self.state.stage
    }

    pub fn current_period(&self) -> u32 {
        self.state.current_period
    }

    pub fn current_target(&self) -> Option<&DebrisObject> {
        self.state.current_target.as_ref()
    }

    pub fn catalog(&self) -> &[DebrisObject] {
        &self.catalog
    }

    pub fn collected(&self) -> &[CollectedDebris] {
        &self.state.collected_projection
    }

    pub fn period_log(&self) -> &[PeriodLogEntry] {
        &self.state.period_log
    }

    pub fn results(&self) -> &MissionResults {
        &self.state.results
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// The armed auto-advance handle, if the mission is running.
    pub fn scheduled_tick(&self) -> Option<ScheduledTick> {
        self.timer
    }

    /// Whether `step()` would be accepted right now.
    pub fn can_step(&self) -> bool {
        self.state.phase == MissionPhase::Paused
            && self.state.current_period < self.params.mission_duration
    }

    pub fn snapshot(&self) -> MissionSnapshot {
        MissionSnapshot {
            phase: self.state.phase,
            stage: self.state.stage,
            current_period: self.state.current_period,
            current_target: self.state.current_target.clone(),
            params: self.params.clone(),
            seed: self.seed,
            tick_interval_ms: u64::try_from(self.tick_interval.as_millis()).unwrap_or(u64::MAX),
            catalog: self.catalog.clone(),
            collected_projection: self.state.collected_projection.clone(),
            period_log: self.state.period_log.clone(),
            results: self.state.results.clone(),
        }
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    /// Validate and store new parameters, then regenerate the catalog.
    ///
    /// Allowed from any phase; the running mission (if any) is discarded.
    pub fn configure(
        &mut self,
        params: MissionParameters,
    ) -> Result<Vec<EventEnvelope>, MissionError> {
        validate_params(&params)?;
        self.cancel_timer();
        self.params = params;
        self.state = MissionState::default();

        let mut events = vec![self.emit(Event::Configured {
            num_debris: self.params.num_debris,
            mission_duration: self.params.mission_duration,
        })];
        self.regenerate(&mut events);
        tracing::info!(
            num_debris = self.params.num_debris,
            duration = self.params.mission_duration,
            "mission configured"
        );
        Ok(events)
    }

    pub fn start(&mut self) -> Result<Vec<EventEnvelope>, MissionError> {
        self.require_phase("start", MissionPhase::Ready)?;
        self.state = MissionState {
            phase: MissionPhase::Running,
            stage: MissionStage::Identification,
            current_period: 0,
            current_target: None,
            collected_projection: Vec::new(),
            period_log: Vec::new(),
            results: aggregate(&[], &self.params, 0),
        };
        self.arm_timer();
        tracing::info!(seed = self.seed, "mission started");
        Ok(vec![self.emit(Event::MissionStarted)])
    }

    pub fn pause(&mut self) -> Result<Vec<EventEnvelope>, MissionError> {
        self.require_phase("pause", MissionPhase::Running)?;
        self.cancel_timer();
        self.state.phase = MissionPhase::Paused;
        tracing::info!(period = self.state.current_period, "mission paused");
        Ok(vec![self.emit(Event::MissionPaused)])
    }

    pub fn resume(&mut self) -> Result<Vec<EventEnvelope>, MissionError> {
        self.require_phase("resume", MissionPhase::Paused)?;
        self.state.phase = MissionPhase::Running;
        self.arm_timer();
        tracing::info!(period = self.state.current_period, "mission resumed");
        Ok(vec![self.emit(Event::MissionResumed)])
    }

    /// Advance exactly one period while paused.
    pub fn step(&mut self) -> Result<Vec<EventEnvelope>, MissionError> {
        if !self.can_step() {
            return Err(MissionError::InvalidTransition {
                action: "step",
                phase: self.state.phase,
            });
        }
        self.cancel_timer();
        self.apply_advance(self.state.current_period + 1)
    }

    /// Timer-driven advance. Only the currently armed token advances.
    pub fn tick(&mut self, token: TimerToken) -> TickOutcome {
        let armed = self.timer.is_some_and(|t| t.token == token);
        if !armed || self.state.phase != MissionPhase::Running {
            return TickOutcome::Cancelled;
        }
        match self.apply_advance(self.state.current_period + 1) {
            Ok(events) if self.state.phase == MissionPhase::Complete => {
                TickOutcome::Completed(events)
            }
            Ok(events) => TickOutcome::Advanced(events),
            Err(err) => {
                // Running with the final period already applied is not reachable
                // through the public transitions; stop the timer regardless.
                tracing::warn!(%err, "tick rejected");
                self.cancel_timer();
                TickOutcome::Cancelled
            }
        }
    }

    /// Back to `Ready` with a freshly drawn catalog and the same parameters.
    pub fn reset(&mut self) -> Vec<EventEnvelope> {
        self.cancel_timer();
        let mut events = vec![self.emit(Event::MissionReset)];
        self.regenerate(&mut events);
        tracing::info!("mission reset");
        events
    }

    /// Change the pacing of automatic advancement. Never affects results.
    ///
    /// While running the timer is re-armed with a new token so that a driver
    /// picks up the new interval; the old token goes stale.
    pub fn set_tick_interval(
        &mut self,
        interval: Duration,
    ) -> Result<Option<ScheduledTick>, MissionError> {
        if interval.is_zero() {
            return Err(MissionError::invalid_config("tick interval must be > 0"));
        }
        self.tick_interval = interval;
        if self.timer.is_some() {
            self.arm_timer();
        }
        Ok(self.timer)
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn require_phase(
        &self,
        action: &'static str,
        expected: MissionPhase,
    ) -> Result<(), MissionError> {
        if self.state.phase == expected {
            Ok(())
        } else {
            Err(MissionError::InvalidTransition {
                action,
                phase: self.state.phase,
            })
        }
    }

    fn arm_timer(&mut self) {
        let token = TimerToken(self.counters.next_timer_token);
        self.counters.next_timer_token += 1;
        self.timer = Some(ScheduledTick {
            token,
            interval: self.tick_interval,
        });
    }

    /// Synchronous and idempotent.
    fn cancel_timer(&mut self) {
        self.timer = None;
    }

    fn regenerate(&mut self, events: &mut Vec<EventEnvelope>) {
        self.catalog = catalog::generate(&self.params, &mut self.rng);
        self.state = MissionState {
            results: aggregate(&[], &self.params, 0),
            ..MissionState::default()
        };
        let count = u32::try_from(self.catalog.len()).unwrap_or(u32::MAX);
        events.push(self.emit(Event::CatalogGenerated { count }));
    }

    fn apply_advance(&mut self, period: u32) -> Result<Vec<EventEnvelope>, MissionError> {
        let PeriodAdvance {
            period,
            target_count,
            prev_count,
            collected,
            log_entry,
            results,
            completes_mission,
        } = advance_to(&self.catalog, &self.params, period)?;

        let mut events = Vec::new();

        self.state.current_period = period;
        self.state.collected_projection = collected;
        self.state.results = results;
        self.state.current_target = target_count
            .checked_sub(1)
            .and_then(|index| self.catalog.get(index))
            .cloned();

        let progress = f64::from(period) / f64::from(self.params.mission_duration);
        self.state.stage = self.state.stage.max(MissionStage::for_progress(progress));

        events.push(self.emit(Event::PeriodAdvanced {
            period,
            collected_this_period: u32::try_from(target_count - prev_count).unwrap_or(u32::MAX),
            total_collected: self.state.results.total_collected,
        }));

        if let Some(entry) = log_entry {
            for logged in &entry.debris_collected {
                let event = Event::DebrisCollected {
                    debris_id: logged.id.clone(),
                    material: logged.material,
                    recovered_mass: logged.recovered_mass,
                    value: logged.value,
                };
                events.push(self.emit(event));
            }
            tracing::debug!(
                period,
                collected = entry.debris_collected.len(),
                cumulative = entry.cumulative_debris,
                "period logged"
            );
            self.state.period_log.push(entry);
        }

        if completes_mission {
            self.cancel_timer();
            self.state.phase = MissionPhase::Complete;
            self.state.stage = MissionStage::Complete;
            self.state.current_target = None;
            events.push(self.emit(Event::MissionCompleted {
                total_collected: self.state.results.total_collected,
                profit: self.state.results.profit,
            }));
            tracing::info!(
                period,
                collected = self.state.results.total_collected,
                profit = self.state.results.profit,
                "mission complete"
            );
        }

        Ok(events)
    }

    fn emit(&mut self, event: Event) -> EventEnvelope {
        crate::emit(&mut self.counters, self.state.current_period, event)
    }
}

/// Reject parameters the engine cannot run with.
pub fn validate_params(params: &MissionParameters) -> Result<(), MissionError> {
    if params.mission_duration == 0 {
        return Err(MissionError::invalid_config("missionDuration must be >= 1"));
    }
    if params.num_debris > MAX_DEBRIS {
        return Err(MissionError::invalid_config(format!(
            "numDebris must be <= {MAX_DEBRIS}, got {}",
            params.num_debris
        )));
    }
    if !params.collection_efficiency.is_finite()
        || !(0.0..=1.0).contains(&params.collection_efficiency)
    {
        return Err(MissionError::invalid_config(format!(
            "collectionEfficiency must be within [0, 1], got {}",
            params.collection_efficiency
        )));
    }
    if !params.cost_per_mission.is_finite() || params.cost_per_mission < 0.0 {
        return Err(MissionError::invalid_config(format!(
            "costPerMission must be a non-negative number, got {}",
            params.cost_per_mission
        )));
    }
    let scoring = &params.scoring;
    let weights = [
        scoring.threat_weight,
        scoring.value_weight,
        scoring.accessibility_weight,
    ];
    if weights.iter().any(|w| !w.is_finite()) {
        return Err(MissionError::invalid_config("scoring weights must be finite"));
    }
    if !scoring.value_normalization.is_finite() || scoring.value_normalization <= 0.0 {
        return Err(MissionError::invalid_config(
            "valueNormalization must be a positive number",
        ));
    }
    Ok(())
}
