use mission_core::{EventEnvelope, MissionEngine};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::AbortHandle;

pub struct MissionState {
    pub engine: MissionEngine,
    pub content_version: String,
    /// Driver task for the engine's armed timer, if one was spawned.
    pub timer_task: Option<AbortHandle>,
}

pub type SharedMission = Arc<Mutex<MissionState>>;
pub type EventTx = broadcast::Sender<Vec<EventEnvelope>>;

#[derive(Clone)]
pub struct AppState {
    pub mission: SharedMission,
    pub event_tx: EventTx,
}

impl AppState {
    pub fn new(engine: MissionEngine, content_version: String) -> Self {
        let (event_tx, _) = broadcast::channel(256);
        Self {
            mission: Arc::new(Mutex::new(MissionState {
                engine,
                content_version,
                timer_task: None,
            })),
            event_tx,
        }
    }
}
