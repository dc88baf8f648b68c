#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Snapshot synchronization: reconciles a fetched dungeon snapshot with the
//! visual objects tracked by the scene registry.
//!
//! Editing changes cell contents and therefore needs a full rebuild, while a
//! simulation step only moves heroes. Rebuilding everything on every step
//! would re-attach tile interactions and flicker, so passes that are neither
//! forced nor starting from an empty registry only touch hero objects.

use dungeon_defence_core::{Command, DungeonSnapshot, Event, SyncReason, TerminalFlags};
use dungeon_defence_rendering::{IsoProjector, SceneBackend, SceneRegistry, SceneRole, Visual};

/// Work selected for a single synchronization pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncPlan {
    /// The snapshot ends the simulation; the lifecycle decides what happens and
    /// nothing is rendered.
    Defer(TerminalFlags),
    /// Destroy and recreate every visual object.
    FullRebuild,
    /// Replace hero objects only.
    HeroOnly,
}

impl SyncPlan {
    /// Chooses the work for a snapshot given the registry state and the request.
    #[must_use]
    pub fn select(terminal: TerminalFlags, registry_empty: bool, force_full_rebuild: bool) -> Self {
        if terminal.is_terminal() {
            Self::Defer(terminal)
        } else if registry_empty || force_full_rebuild {
            Self::FullRebuild
        } else {
            Self::HeroOnly
        }
    }
}

/// Applies snapshots to the scene registry.
///
/// The projector captured by the last full rebuild is reused by hero-only
/// updates so heroes stay aligned with the floor they walk on.
#[derive(Debug, Default)]
pub struct Synchronizer {
    projector: IsoProjector,
}

impl Synchronizer {
    /// Creates a synchronizer with a default projector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Projector used for the current scene.
    #[must_use]
    pub const fn projector(&self) -> &IsoProjector {
        &self.projector
    }

    /// Reconciles the registry with the snapshot and reports the work performed.
    pub fn apply<B>(
        &mut self,
        snapshot: &DungeonSnapshot,
        force_full_rebuild: bool,
        registry: &mut SceneRegistry<B::Handle>,
        backend: &mut B,
    ) -> SyncPlan
    where
        B: SceneBackend,
    {
        let plan = SyncPlan::select(snapshot.terminal(), registry.is_empty(), force_full_rebuild);
        match plan {
            SyncPlan::Defer(flags) => {
                tracing::debug!(?flags, "terminal snapshot, scene left untouched");
            }
            SyncPlan::FullRebuild => self.rebuild(snapshot, registry, backend),
            SyncPlan::HeroOnly => self.refresh_heroes(snapshot, registry, backend),
        }
        plan
    }

    fn rebuild<B>(
        &mut self,
        snapshot: &DungeonSnapshot,
        registry: &mut SceneRegistry<B::Handle>,
        backend: &mut B,
    ) where
        B: SceneBackend,
    {
        registry.clear_all(backend);

        let grid = &snapshot.grid;
        if grid.is_empty() {
            tracing::warn!("snapshot carried an empty grid, nothing to draw");
            return;
        }

        self.projector = IsoProjector::fit(backend.surface_size(), grid.width(), grid.height());

        for cell in grid.cells() {
            let floor = backend.spawn(&Visual::floor(&self.projector, cell));
            backend.attach_tile_interaction(&floor, *cell);
            registry.insert(SceneRole::Floor, cell.position(), floor);

            if let Some(visual) = Visual::entity(&self.projector, cell) {
                let entity = backend.spawn(&visual);
                registry.insert(SceneRole::Entity, cell.position(), entity);
            }
        }

        self.insert_heroes(snapshot, registry, backend);

        tracing::debug!(
            objects = registry.len(),
            heroes = snapshot.heroes.len(),
            "scene rebuilt"
        );
    }

    fn refresh_heroes<B>(
        &self,
        snapshot: &DungeonSnapshot,
        registry: &mut SceneRegistry<B::Handle>,
        backend: &mut B,
    ) where
        B: SceneBackend,
    {
        registry.clear_by_role(SceneRole::Hero, backend);
        self.insert_heroes(snapshot, registry, backend);
        tracing::trace!(heroes = snapshot.heroes.len(), "heroes refreshed");
    }

    fn insert_heroes<B>(
        &self,
        snapshot: &DungeonSnapshot,
        registry: &mut SceneRegistry<B::Handle>,
        backend: &mut B,
    ) where
        B: SceneBackend,
    {
        for hero in &snapshot.heroes {
            let handle = backend.spawn(&Visual::hero(&self.projector, hero));
            registry.insert(SceneRole::Hero, hero.position(), handle);
        }
    }
}

/// Synchronization pass waiting to run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SyncRequest {
    /// Reason of the first request folded into this pass.
    pub reason: SyncReason,
    /// Whether any folded request demanded a full rebuild.
    pub force_full_rebuild: bool,
    /// Number of requests folded into this pass.
    pub coalesced: u32,
}

/// Coalesces sync requests so at most one pass is pending at a time.
#[derive(Debug, Default)]
pub struct SyncQueue {
    pending: Option<SyncRequest>,
}

impl SyncQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a request, folding it into the pending pass if there is one.
    pub fn request(&mut self, reason: SyncReason, force_full_rebuild: bool) {
        match self.pending.as_mut() {
            Some(pending) => {
                pending.force_full_rebuild |= force_full_rebuild;
                pending.coalesced = pending.coalesced.saturating_add(1);
            }
            None => {
                self.pending = Some(SyncRequest {
                    reason,
                    force_full_rebuild,
                    coalesced: 1,
                });
            }
        }
    }

    /// Takes the pending pass, leaving the queue empty.
    pub fn take(&mut self) -> Option<SyncRequest> {
        self.pending.take()
    }

    /// Reports whether a pass is pending.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// Translates external update sources into sync requests.
#[derive(Debug, Default, Clone, Copy)]
pub struct SyncTriggers;

impl SyncTriggers {
    /// Emits a forced sync for every push notification and surface resize.
    pub fn handle(&self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            let reason = match event {
                Event::PushNotified => SyncReason::Push,
                Event::SurfaceResized => SyncReason::Resize,
                _ => continue,
            };
            out.push(Command::RequestSync {
                reason,
                force_full_rebuild: true,
            });
        }
    }
}
