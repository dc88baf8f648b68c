#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Session runtime for the Dungeon Defence client.
//!
//! A [`Session`] owns every piece of mutable client state: the scene registry,
//! the lifecycle, the interaction controller, the timers and the sync queue.
//! Update sources never call into it directly; they send [`Event`]s through a
//! [`SessionHandle`] and the session processes them one batch at a time on a
//! single task.

mod hud;
mod timers;

use std::collections::VecDeque;

use dungeon_defence_core::{
    Affordances, Command, EntityKind, Event, LifecycleMode, Operation, StartOutcome,
    StatusMessage, SyncReason, ADVANCE_PERIOD,
};
use dungeon_defence_remote::{DungeonService, RemoteError};
use dungeon_defence_rendering::{SceneBackend, SceneRegistry};
use dungeon_defence_system_interaction::Interaction;
use dungeon_defence_system_lifecycle::Lifecycle;
use dungeon_defence_system_synchronizer::{SyncQueue, SyncRequest, SyncTriggers, Synchronizer};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

pub use hud::Hud;
pub use timers::{AdvanceTimer, LevelAdvanceTimer};

/// Cloneable entry point used by update sources to reach a session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    events: UnboundedSender<Event>,
}

impl SessionHandle {
    /// Queues an event. Returns `false` once the session is gone.
    pub fn send(&self, event: Event) -> bool {
        self.events.send(event).is_ok()
    }

    /// Raw channel sender, for tasks that only need to emit events.
    #[must_use]
    pub fn event_sender(&self) -> UnboundedSender<Event> {
        self.events.clone()
    }
}

/// Owner of the scene, the lifecycle and every I/O collaborator.
pub struct Session<S, B, H>
where
    B: SceneBackend,
{
    service: S,
    backend: B,
    hud: H,
    registry: SceneRegistry<B::Handle>,
    synchronizer: Synchronizer,
    sync_queue: SyncQueue,
    triggers: SyncTriggers,
    lifecycle: Lifecycle,
    interaction: Interaction,
    advance_timer: AdvanceTimer,
    level_advance: LevelAdvanceTimer,
    events: UnboundedSender<Event>,
}

impl<S, B, H> Session<S, B, H>
where
    S: DungeonService,
    B: SceneBackend,
    H: Hud,
{
    /// Creates a session in editing mode together with the receiving end of
    /// its event channel.
    pub fn new(service: S, backend: B, hud: H) -> (Self, UnboundedReceiver<Event>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let session = Self {
            service,
            backend,
            hud,
            registry: SceneRegistry::new(),
            synchronizer: Synchronizer::new(),
            sync_queue: SyncQueue::new(),
            triggers: SyncTriggers,
            lifecycle: Lifecycle::new(),
            interaction: Interaction::new(),
            advance_timer: AdvanceTimer::new(ADVANCE_PERIOD),
            level_advance: LevelAdvanceTimer::new(),
            events,
        };
        (session, receiver)
    }

    /// Hands out a handle feeding this session's channel.
    #[must_use]
    pub fn sender(&self) -> SessionHandle {
        SessionHandle {
            events: self.events.clone(),
        }
    }

    /// Current lifecycle mode.
    #[must_use]
    pub fn mode(&self) -> LifecycleMode {
        self.lifecycle.mode()
    }

    /// Objects currently on screen.
    #[must_use]
    pub fn registry(&self) -> &SceneRegistry<B::Handle> {
        &self.registry
    }

    /// Dungeon service collaborator.
    #[must_use]
    pub fn service(&self) -> &S {
        &self.service
    }

    /// Scene backend collaborator.
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Mutable access to the scene backend, e.g. to report a new surface size.
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// HUD collaborator.
    #[must_use]
    pub fn hud(&self) -> &H {
        &self.hud
    }

    /// Reports whether the advance timer is ticking.
    #[must_use]
    pub fn advance_timer_active(&self) -> bool {
        self.advance_timer.is_active()
    }

    /// Reports whether a level advance is scheduled.
    #[must_use]
    pub fn level_advance_pending(&self) -> bool {
        self.level_advance.is_pending()
    }

    /// Presents the editing affordances and performs the initial sync.
    pub async fn start(&mut self) {
        let mode = self.lifecycle.mode();
        self.hud.set_affordances(Affordances::for_mode(mode));
        self.hud.set_status(StatusMessage::Blank);
        self.hud.highlight_selection(self.interaction.selected());

        tracing::info!("session started");
        self.sync_queue.request(SyncReason::Initial, true);
        self.dispatch(Vec::new()).await;
    }

    /// Processes events from the channel until it closes.
    ///
    /// Every event already queued when a batch begins joins that batch, so a
    /// burst of push notifications costs a single sync pass. The session keeps
    /// a sender of its own; callers stop the loop by dropping the future.
    pub async fn run(&mut self, mut receiver: UnboundedReceiver<Event>) {
        while let Some(event) = receiver.recv().await {
            let mut batch = vec![event];
            while let Ok(event) = receiver.try_recv() {
                batch.push(event);
            }
            self.dispatch(batch).await;
        }
        tracing::info!("session channel closed");
    }

    /// Handles a batch of events and everything that follows from them.
    ///
    /// Each event is settled before the next one is looked at: the replies to
    /// the requests it caused, and whatever those replies cause in turn, are
    /// handled first. Once the batch drains, at most one coalesced sync pass
    /// runs and the events it produced are settled the same way.
    pub async fn dispatch(&mut self, events: Vec<Event>) {
        let mut batch: VecDeque<Event> = events.into();
        loop {
            while let Some(event) = batch.pop_front() {
                self.settle(event).await;
            }

            match self.sync_queue.take() {
                Some(request) => self.sync(request, &mut batch).await,
                None => break,
            }
        }
    }

    async fn settle(&mut self, event: Event) {
        let mut work = VecDeque::from([event]);
        while let Some(event) = work.pop_front() {
            self.handle_event(event, &mut work).await;
        }
    }

    async fn handle_event(&mut self, event: Event, pending: &mut VecDeque<Event>) {
        tracing::trace!(?event, "handling event");
        let events = [event];
        let mut commands = Vec::new();

        self.triggers.handle(&events, &mut commands);
        self.interaction
            .handle(self.lifecycle.mode(), &events, &mut commands);
        self.lifecycle.handle(&events, &mut commands);

        for command in commands {
            self.execute(command, pending).await;
        }
    }

    async fn execute(&mut self, command: Command, pending: &mut VecDeque<Event>) {
        match command {
            Command::RequestSync {
                reason,
                force_full_rebuild,
            } => self.sync_queue.request(reason, force_full_rebuild),
            Command::ClearScene => self.registry.clear_all(&mut self.backend),
            Command::StartSimulation => {
                let event = match self.service.start_simulation().await {
                    Ok(StartOutcome::Started) => Event::SimulationStarted,
                    Ok(StartOutcome::Blocked { reason }) => Event::SimulationBlocked { reason },
                    Err(error) => failure(Operation::StartSimulation, &error),
                };
                pending.push_back(event);
            }
            Command::AdvanceSimulation => {
                let event = match self.service.advance_simulation().await {
                    Ok(outcome) => Event::SimulationAdvanced { outcome },
                    Err(error) => failure(Operation::AdvanceSimulation, &error),
                };
                pending.push_back(event);
            }
            Command::ResetSimulation => {
                let event = match self.service.reset_simulation().await {
                    Ok(()) => Event::ResetCompleted,
                    Err(error) => failure(Operation::ResetSimulation, &error),
                };
                pending.push_back(event);
            }
            Command::NextLevel => {
                let event = match self.service.next_level().await {
                    Ok(()) => Event::LevelAdvanced,
                    Err(error) => failure(Operation::NextLevel, &error),
                };
                pending.push_back(event);
            }
            Command::PlaceEntity { placement } => {
                let event = match self.service.place_entity(placement).await {
                    Ok(()) => Event::PlacementAccepted { placement },
                    Err(error) => failure(Operation::PlaceEntity, &error),
                };
                pending.push_back(event);
            }
            Command::ImportDungeon { definition } => {
                let event = match self.service.import_dungeon(&definition).await {
                    Ok(()) => Event::DungeonImported,
                    Err(error) => failure(Operation::ImportDungeon, &error),
                };
                pending.push_back(event);
            }
            Command::SaveDungeon { request } => {
                let event = match self.service.save_dungeon(&request).await {
                    Ok(()) => Event::DungeonSaved {
                        filename: request.filename,
                    },
                    Err(error) => failure(Operation::SaveDungeon, &error),
                };
                pending.push_back(event);
            }
            Command::StartAdvanceTimer => self.advance_timer.start(self.events.clone()),
            Command::StopAdvanceTimer => self.advance_timer.stop(),
            Command::ScheduleLevelAdvance { delay } => {
                self.level_advance.schedule(delay, self.events.clone());
            }
            Command::CancelLevelAdvance => self.level_advance.cancel(),
            Command::PresentAffordances(affordances) => self.hud.set_affordances(affordances),
            Command::PresentStatus(status) => self.hud.set_status(status),
            Command::HighlightSelection(kind) => self.highlight(kind),
            Command::Notify(notice) => self.hud.notify(&notice),
        }
    }

    fn highlight(&mut self, kind: EntityKind) {
        tracing::debug!(?kind, "entity kind armed");
        self.hud.highlight_selection(kind);
    }

    async fn sync(&mut self, request: SyncRequest, pending: &mut VecDeque<Event>) {
        let snapshot_fetch = self.service.fetch_snapshot();
        let metrics_fetch = self.service.fetch_metrics();
        tokio::pin!(snapshot_fetch, metrics_fetch);

        let mut snapshot_done = false;
        let mut metrics_done = false;
        while !(snapshot_done && metrics_done) {
            tokio::select! {
                result = &mut snapshot_fetch, if !snapshot_done => {
                    snapshot_done = true;
                    let snapshot = match result {
                        Ok(snapshot) => snapshot,
                        Err(error) => {
                            pending.push_back(failure(Operation::FetchSnapshot, &error));
                            continue;
                        }
                    };

                    let plan = self.synchronizer.apply(
                        &snapshot,
                        request.force_full_rebuild,
                        &mut self.registry,
                        &mut self.backend,
                    );
                    tracing::debug!(
                        reason = ?request.reason,
                        coalesced = request.coalesced,
                        ?plan,
                        objects = self.registry.len(),
                        "sync pass applied"
                    );
                    pending.push_back(Event::SnapshotReceived {
                        terminal: snapshot.terminal(),
                    });
                }
                result = &mut metrics_fetch, if !metrics_done => {
                    metrics_done = true;
                    match result {
                        Ok(metrics) => self.hud.show_metrics(&metrics),
                        Err(error) => pending.push_back(failure(Operation::FetchMetrics, &error)),
                    }
                }
            }
        }
    }
}

/// Classifies a failed request into the event the systems react to.
fn failure(operation: Operation, error: &RemoteError) -> Event {
    match error.rejection() {
        Some(body) => {
            tracing::warn!(%operation, %error, "service rejected request");
            Event::CommandRejected {
                operation,
                reason: body.to_owned(),
            }
        }
        None => {
            tracing::error!(%operation, %error, "request failed");
            Event::TransportFailed {
                operation,
                message: error.to_string(),
            }
        }
    }
}
