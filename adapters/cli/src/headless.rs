//! Scene backend and HUD that draw nothing and log everything.

use dungeon_defence_core::{Affordances, Cell, EntityKind, Notice, SidebarMetrics, StatusMessage};
use dungeon_defence_rendering::{SceneBackend, SurfaceSize, Visual};
use dungeon_defence_session::Hud;

/// Scene backend that hands out sequential handles and traces every mutation.
#[derive(Debug)]
pub(crate) struct TracingBackend {
    surface: SurfaceSize,
    next_handle: u64,
    live: usize,
}

impl TracingBackend {
    pub(crate) fn new(surface: SurfaceSize) -> Self {
        Self {
            surface,
            next_handle: 0,
            live: 0,
        }
    }
}

impl SceneBackend for TracingBackend {
    type Handle = u64;

    fn surface_size(&self) -> SurfaceSize {
        self.surface
    }

    fn spawn(&mut self, visual: &Visual) -> u64 {
        self.next_handle += 1;
        self.live += 1;
        tracing::trace!(
            handle = self.next_handle,
            sprite = visual.sprite.asset_name(),
            x = visual.position.x,
            y = visual.position.y,
            screen_x = visual.screen.x,
            screen_y = visual.screen.y,
            depth = visual.depth,
            "spawn"
        );
        self.next_handle
    }

    fn destroy(&mut self, handle: u64) {
        self.live = self.live.saturating_sub(1);
        tracing::trace!(handle, live = self.live, "destroy");
    }

    fn attach_tile_interaction(&mut self, handle: &u64, cell: Cell) {
        tracing::trace!(
            handle = *handle,
            x = cell.x,
            y = cell.y,
            kind = ?cell.kind,
            "tile interactive"
        );
    }
}

/// HUD reporting through the log.
#[derive(Debug, Default)]
pub(crate) struct TracingHud;

impl Hud for TracingHud {
    fn show_metrics(&mut self, metrics: &SidebarMetrics) {
        tracing::info!(
            money = metrics.money,
            level = metrics.level,
            score = metrics.score,
            "sidebar"
        );
    }

    fn set_affordances(&mut self, affordances: Affordances) {
        tracing::debug!(
            launch = affordances.launch_enabled,
            reset = affordances.reset_enabled,
            selection = affordances.selection_enabled,
            "affordances"
        );
    }

    fn set_status(&mut self, status: StatusMessage) {
        match status {
            StatusMessage::Blank => tracing::debug!("status cleared"),
            StatusMessage::Won => tracing::info!("you won, next level incoming"),
            StatusMessage::Lost => tracing::info!("you lost, the treasure was taken"),
        }
    }

    fn highlight_selection(&mut self, kind: EntityKind) {
        tracing::info!(kind = kind.wire_name(), "entity selected");
    }

    fn notify(&mut self, notice: &Notice) {
        match notice {
            Notice::SimulationBlocked { reason } => {
                tracing::warn!(%reason, "simulation could not start");
            }
            Notice::SimulationStalled => tracing::warn!("simulation stopped, no hero can move"),
            Notice::Rejected { operation, reason } => {
                tracing::warn!(%operation, %reason, "request rejected");
            }
            Notice::Saved { filename } => tracing::info!(%filename, "dungeon saved"),
            Notice::Imported => tracing::info!("dungeon imported"),
        }
    }
}
