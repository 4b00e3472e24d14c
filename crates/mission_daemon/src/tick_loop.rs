use crate::state::{AppState, EventTx, MissionState, SharedMission};
use mission_core::{ScheduledTick, TickOutcome};
use tokio::time::MissedTickBehavior;

/// Bring the driver task in line with the engine's timer.
///
/// Any previous driver is aborted; a new one is spawned when the engine has a
/// tick armed. Call with the mission lock held after every transition.
pub fn sync_timer(app: &AppState, state: &mut MissionState) {
    if let Some(task) = state.timer_task.take() {
        task.abort();
    }
    if let Some(scheduled) = state.engine.scheduled_tick() {
        let handle = tokio::spawn(run_tick_loop(
            app.mission.clone(),
            app.event_tx.clone(),
            scheduled,
        ));
        state.timer_task = Some(handle.abort_handle());
    }
}

/// Advance the mission once per `scheduled.interval` until the engine reports
/// the token stale or the mission complete.
pub async fn run_tick_loop(mission: SharedMission, event_tx: EventTx, scheduled: ScheduledTick) {
    let mut interval = tokio::time::interval(scheduled.interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval.tick().await; // discard the immediate first tick

    loop {
        interval.tick().await;
        let mut guard = mission.lock();
        match guard.engine.tick(scheduled.token) {
            TickOutcome::Advanced(events) => {
                let _ = event_tx.send(events);
            }
            TickOutcome::Completed(events) => {
                let _ = event_tx.send(events);
                guard.timer_task = None;
                break;
            }
            TickOutcome::Cancelled => break,
        }
    }
}
