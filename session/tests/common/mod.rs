use std::{
    collections::VecDeque,
    sync::{Mutex, MutexGuard},
    time::Duration,
};

use async_trait::async_trait;
use dungeon_defence_core::{
    AdvanceOutcome, Affordances, Cell, CellKind, DungeonSnapshot, EntityKind, Grid, Hero, Notice,
    Placement, SaveRequest, SidebarMetrics, StartOutcome, StatusMessage,
};
use dungeon_defence_remote::{DungeonService, RemoteError};
use dungeon_defence_rendering::{SceneBackend, SceneRole, SurfaceSize, Visual};
use dungeon_defence_session::Hud;
use tokio::time::Instant;

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    FetchSnapshot,
    FetchMetrics,
    PlaceEntity(Placement),
    StartSimulation,
    AdvanceSimulation,
    ResetSimulation,
    NextLevel,
    ImportDungeon,
    SaveDungeon(String),
}

#[derive(Debug, Default)]
struct ServiceState {
    snapshot: DungeonSnapshot,
    metrics: SidebarMetrics,
    start: Option<StartOutcome>,
    advances: VecDeque<AdvanceOutcome>,
    placement_rejection: Option<String>,
    snapshot_unavailable: bool,
    metrics_delay: Option<Duration>,
    calls: Vec<Call>,
}

/// Scripted dungeon service that mimics the server's state changes.
#[derive(Debug, Default)]
pub struct FakeService {
    state: Mutex<ServiceState>,
}

impl FakeService {
    pub fn with_snapshot(snapshot: DungeonSnapshot) -> Self {
        let service = Self::default();
        service.state().snapshot = snapshot;
        service.state().metrics = SidebarMetrics {
            money: 100.0,
            level: 1,
            ..SidebarMetrics::default()
        };
        service
    }

    fn state(&self) -> MutexGuard<'_, ServiceState> {
        self.state.lock().expect("service state poisoned")
    }

    pub fn set_snapshot(&self, snapshot: DungeonSnapshot) {
        self.state().snapshot = snapshot;
    }

    pub fn set_heroes(&self, heroes: Vec<Hero>) {
        self.state().snapshot.heroes = heroes;
    }

    pub fn set_start(&self, outcome: StartOutcome) {
        self.state().start = Some(outcome);
    }

    pub fn queue_advance(&self, outcome: AdvanceOutcome) {
        self.state().advances.push_back(outcome);
    }

    pub fn reject_placements(&self, body: &str) {
        self.state().placement_rejection = Some(body.to_owned());
    }

    pub fn set_snapshot_unavailable(&self, unavailable: bool) {
        self.state().snapshot_unavailable = unavailable;
    }

    pub fn set_metrics_delay(&self, delay: Duration) {
        self.state().metrics_delay = Some(delay);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    pub fn count(&self, call: &Call) -> usize {
        self.state().calls.iter().filter(|made| *made == call).count()
    }

    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    fn record(&self, call: Call) -> MutexGuard<'_, ServiceState> {
        let mut state = self.state();
        state.calls.push(call);
        state
    }
}

fn unreachable_service() -> RemoteError {
    RemoteError::InvalidUrl("connection refused".to_owned())
}

#[async_trait]
impl DungeonService for FakeService {
    async fn fetch_snapshot(&self) -> Result<DungeonSnapshot, RemoteError> {
        let state = self.record(Call::FetchSnapshot);
        if state.snapshot_unavailable {
            return Err(unreachable_service());
        }
        Ok(state.snapshot.clone())
    }

    async fn fetch_metrics(&self) -> Result<SidebarMetrics, RemoteError> {
        let delay = self.state().metrics_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.record(Call::FetchMetrics).metrics.clone())
    }

    async fn place_entity(&self, placement: Placement) -> Result<(), RemoteError> {
        let state = self.record(Call::PlaceEntity(placement));
        if let Some(body) = state.placement_rejection.clone() {
            return Err(RemoteError::Rejected { status: 400, body });
        }

        Ok(())
    }

    async fn start_simulation(&self) -> Result<StartOutcome, RemoteError> {
        let state = self.record(Call::StartSimulation);
        Ok(state.start.clone().unwrap_or(StartOutcome::Started))
    }

    async fn advance_simulation(&self) -> Result<AdvanceOutcome, RemoteError> {
        let mut state = self.record(Call::AdvanceSimulation);
        let outcome = state
            .advances
            .pop_front()
            .unwrap_or(AdvanceOutcome::Continued);
        if let AdvanceOutcome::Finished(flags) = outcome {
            state.snapshot.treasure_reached = flags.treasure_reached;
            state.snapshot.all_heroes_dead = flags.all_heroes_dead;
        }
        Ok(outcome)
    }

    async fn reset_simulation(&self) -> Result<(), RemoteError> {
        let mut state = self.record(Call::ResetSimulation);
        state.snapshot.treasure_reached = false;
        state.snapshot.all_heroes_dead = false;
        Ok(())
    }

    async fn next_level(&self) -> Result<(), RemoteError> {
        let mut state = self.record(Call::NextLevel);
        state.snapshot.treasure_reached = false;
        state.snapshot.all_heroes_dead = false;
        state.metrics.level += 1;
        Ok(())
    }

    async fn import_dungeon(&self, _definition: &serde_json::Value) -> Result<(), RemoteError> {
        let _state = self.record(Call::ImportDungeon);
        Ok(())
    }

    async fn save_dungeon(&self, request: &SaveRequest) -> Result<(), RemoteError> {
        let _state = self.record(Call::SaveDungeon(request.filename.clone()));
        Ok(())
    }
}

/// Scene backend keeping every live visual in memory.
#[derive(Debug)]
pub struct RecordingBackend {
    surface: SurfaceSize,
    next_handle: u64,
    pub live: Vec<(u64, Visual)>,
    pub interactive: Vec<(u64, Cell)>,
    pub spawned: usize,
    pub last_spawn_at: Option<Instant>,
}

impl RecordingBackend {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            surface: SurfaceSize::new(width, height).expect("valid surface"),
            next_handle: 0,
            live: Vec::new(),
            interactive: Vec::new(),
            spawned: 0,
            last_spawn_at: None,
        }
    }

    pub fn count(&self, role: SceneRole) -> usize {
        self.live
            .iter()
            .filter(|(_, visual)| visual.role == role)
            .count()
    }
}

impl SceneBackend for RecordingBackend {
    type Handle = u64;

    fn surface_size(&self) -> SurfaceSize {
        self.surface
    }

    fn spawn(&mut self, visual: &Visual) -> u64 {
        self.next_handle += 1;
        self.spawned += 1;
        self.last_spawn_at = Some(Instant::now());
        self.live.push((self.next_handle, *visual));
        self.next_handle
    }

    fn destroy(&mut self, handle: u64) {
        self.live.retain(|(live, _)| *live != handle);
        self.interactive.retain(|(live, _)| *live != handle);
    }

    fn attach_tile_interaction(&mut self, handle: &u64, cell: Cell) {
        self.interactive.push((*handle, cell));
    }
}

/// HUD remembering everything it was asked to show.
#[derive(Debug, Default)]
pub struct RecordingHud {
    pub metrics: Vec<SidebarMetrics>,
    pub metrics_at: Vec<Instant>,
    pub affordances: Vec<Affordances>,
    pub statuses: Vec<StatusMessage>,
    pub selections: Vec<EntityKind>,
    pub notices: Vec<Notice>,
}

impl RecordingHud {
    pub fn last_affordances(&self) -> Option<Affordances> {
        self.affordances.last().copied()
    }

    pub fn last_status(&self) -> Option<StatusMessage> {
        self.statuses.last().copied()
    }
}

impl Hud for RecordingHud {
    fn show_metrics(&mut self, metrics: &SidebarMetrics) {
        self.metrics.push(metrics.clone());
        self.metrics_at.push(Instant::now());
    }

    fn set_affordances(&mut self, affordances: Affordances) {
        self.affordances.push(affordances);
    }

    fn set_status(&mut self, status: StatusMessage) {
        self.statuses.push(status);
    }

    fn highlight_selection(&mut self, kind: EntityKind) {
        self.selections.push(kind);
    }

    fn notify(&mut self, notice: &Notice) {
        self.notices.push(notice.clone());
    }
}

/// 3x3 dungeon with a start in one corner and an exit in the opposite one.
pub fn small_dungeon(heroes: Vec<Hero>) -> DungeonSnapshot {
    let rows = (0..3)
        .map(|y| {
            (0..3)
                .map(|x| {
                    let kind = match (x, y) {
                        (0, 0) => CellKind::Start,
                        (2, 2) => CellKind::Exit,
                        _ => CellKind::Floor,
                    };
                    Cell::new(x, y, kind)
                })
                .collect()
        })
        .collect();

    DungeonSnapshot {
        grid: Grid::from_rows(rows),
        heroes,
        treasure_reached: false,
        all_heroes_dead: false,
    }
}
