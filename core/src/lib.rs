#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Dungeon Defence client.
//!
//! This crate defines the message surface that connects the session, the
//! remote dungeon service and the pure systems. Update sources and the
//! operator produce [`Event`] values; systems consume event streams and respond
//! exclusively with [`Command`] batches; the session executes those commands
//! and feeds their outcomes back in as new events.

mod model;
mod wire;

use std::{fmt, time::Duration};

pub use model::{
    Cell, CellKind, DungeonSnapshot, EntityKind, Grid, GridPosition, Hero, SidebarMetrics,
    TerminalFlags,
};
pub use wire::{
    AdvanceOutcome, AdvanceReply, Placement, SaveRequest, SimulationFlag, StartOutcome,
    StartSimulationReply,
};

/// Period between two simulation advances while running.
pub const ADVANCE_PERIOD: Duration = Duration::from_millis(500);

/// Pause between a won wave and the automatic level advance.
pub const LEVEL_ADVANCE_DELAY: Duration = Duration::from_millis(2000);

/// Coarse session state gating interaction and timers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LifecycleMode {
    /// The operator may place entities.
    #[default]
    Editing,
    /// Heroes are advancing; interaction is locked.
    Running,
    /// Every hero fell before reaching the treasure.
    Won,
    /// A hero reached the treasure.
    Lost,
}

impl LifecycleMode {
    /// Reports whether the mode ends the current wave.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// Why a synchronization pass was requested.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SyncReason {
    /// First pass after process start.
    Initial,
    /// The push channel reported a change.
    Push,
    /// A simulation step completed.
    Timer,
    /// An operator command succeeded.
    PostCommand,
    /// The rendering surface changed size.
    Resize,
    /// The simulation was reset.
    Reset,
    /// The service moved on to the next level.
    LevelAdvanced,
    /// An external dungeon definition was imported.
    Import,
}

/// Remote operations, used to label failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `GET /api/dungeon`.
    FetchSnapshot,
    /// `GET /api/dungeon_data`.
    FetchMetrics,
    /// `POST /api/place_entity/`.
    PlaceEntity,
    /// `GET /api/start_simulation/`.
    StartSimulation,
    /// `POST /api/move_hero`.
    AdvanceSimulation,
    /// `POST /api/reset_simulation`.
    ResetSimulation,
    /// `GET /api/next_level/`.
    NextLevel,
    /// `POST /api/import_dungeon`.
    ImportDungeon,
    /// `POST /api/save_dungeon`.
    SaveDungeon,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::FetchSnapshot => "fetch dungeon",
            Self::FetchMetrics => "fetch sidebar data",
            Self::PlaceEntity => "place entity",
            Self::StartSimulation => "start simulation",
            Self::AdvanceSimulation => "advance simulation",
            Self::ResetSimulation => "reset simulation",
            Self::NextLevel => "next level",
            Self::ImportDungeon => "import dungeon",
            Self::SaveDungeon => "save dungeon",
        };
        f.write_str(label)
    }
}

/// Which operator affordances are currently usable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Affordances {
    /// The launch button accepts presses.
    pub launch_enabled: bool,
    /// The reset button accepts presses.
    pub reset_enabled: bool,
    /// The entity-selection panel accepts clicks.
    pub selection_enabled: bool,
}

impl Affordances {
    /// Derives the affordances exposed while in the provided mode.
    #[must_use]
    pub const fn for_mode(mode: LifecycleMode) -> Self {
        match mode {
            LifecycleMode::Editing => Self {
                launch_enabled: true,
                reset_enabled: true,
                selection_enabled: true,
            },
            LifecycleMode::Running | LifecycleMode::Won | LifecycleMode::Lost => Self {
                launch_enabled: false,
                reset_enabled: true,
                selection_enabled: false,
            },
        }
    }
}

/// Outcome banner displayed to the operator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum StatusMessage {
    /// Nothing to announce.
    #[default]
    Blank,
    /// The defence held.
    Won,
    /// The treasure was taken.
    Lost,
}

/// Operator-facing notification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notice {
    /// The launch was refused because the heroes have no path.
    SimulationBlocked {
        /// Explanation reported by the service.
        reason: String,
    },
    /// The simulation stopped because no hero could move.
    SimulationStalled,
    /// The service refused a command.
    Rejected {
        /// Operation that was refused.
        operation: Operation,
        /// Text body returned by the service.
        reason: String,
    },
    /// The dungeon was saved under the provided file name.
    Saved {
        /// File name used by the service.
        filename: String,
    },
    /// An external dungeon definition replaced the current one.
    Imported,
}

/// Everything the session may be asked to do by a system.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Schedules a synchronization pass.
    RequestSync {
        /// Why the pass is needed.
        reason: SyncReason,
        /// Rebuild every visual object instead of only the heroes.
        force_full_rebuild: bool,
    },
    /// Destroys every visual object currently tracked.
    ClearScene,
    /// Asks the service to start the simulation.
    StartSimulation,
    /// Asks the service to move the heroes one step.
    AdvanceSimulation,
    /// Asks the service to reset the simulation.
    ResetSimulation,
    /// Asks the service to load the next level.
    NextLevel,
    /// Asks the service to place an entity.
    PlaceEntity {
        /// Placement to perform.
        placement: Placement,
    },
    /// Sends an external dungeon definition to the service.
    ImportDungeon {
        /// Definition forwarded verbatim.
        definition: serde_json::Value,
    },
    /// Asks the service to persist the dungeon.
    SaveDungeon {
        /// Save parameters.
        request: SaveRequest,
    },
    /// Starts the periodic advance timer.
    StartAdvanceTimer,
    /// Stops the periodic advance timer. Safe when it is not running.
    StopAdvanceTimer,
    /// Arms the one-shot level advance.
    ScheduleLevelAdvance {
        /// Delay before [`Event::LevelAdvanceDue`] is delivered.
        delay: Duration,
    },
    /// Disarms a pending level advance. Safe when none is pending.
    CancelLevelAdvance,
    /// Updates which affordances the operator may use.
    PresentAffordances(Affordances),
    /// Updates the outcome banner.
    PresentStatus(StatusMessage),
    /// Marks the provided kind as selected in the panel.
    HighlightSelection(EntityKind),
    /// Shows a notification to the operator.
    Notify(Notice),
}

/// Everything that may happen to the session.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// The operator pressed launch.
    LaunchRequested,
    /// The operator pressed reset.
    ResetRequested,
    /// The operator picked an entity kind in the panel.
    EntityKindSelected {
        /// Kind that was picked.
        kind: EntityKind,
    },
    /// The operator clicked a floor tile.
    TileActivated {
        /// Cell under the pointer.
        cell: Cell,
    },
    /// The operator supplied an external dungeon definition.
    ImportRequested {
        /// Definition to forward to the service.
        definition: serde_json::Value,
    },
    /// The operator asked for the dungeon to be saved.
    SaveRequested {
        /// Save parameters.
        request: SaveRequest,
    },
    /// The rendering surface changed size.
    SurfaceResized,
    /// The push channel reported a dungeon change.
    PushNotified,
    /// The periodic advance timer fired.
    AdvanceTimerFired,
    /// The post-victory delay elapsed.
    LevelAdvanceDue,
    /// The service accepted the launch.
    SimulationStarted,
    /// The service refused the launch because the path is blocked.
    SimulationBlocked {
        /// Explanation reported by the service.
        reason: String,
    },
    /// The service performed one simulation step.
    SimulationAdvanced {
        /// Interpreted step result.
        outcome: AdvanceOutcome,
    },
    /// A synchronization pass fetched a snapshot.
    SnapshotReceived {
        /// Terminal flags carried by the snapshot.
        terminal: TerminalFlags,
    },
    /// The service accepted a placement.
    PlacementAccepted {
        /// Placement that succeeded.
        placement: Placement,
    },
    /// The service reset the simulation.
    ResetCompleted,
    /// The service loaded the next level.
    LevelAdvanced,
    /// The service accepted an imported dungeon.
    DungeonImported,
    /// The service saved the dungeon.
    DungeonSaved {
        /// File name used by the service.
        filename: String,
    },
    /// The service answered a command with a non-2xx status.
    CommandRejected {
        /// Operation that was refused.
        operation: Operation,
        /// Text body returned by the service.
        reason: String,
    },
    /// A request never produced a usable answer.
    TransportFailed {
        /// Operation that failed.
        operation: Operation,
        /// Rendered error.
        message: String,
    },
}
