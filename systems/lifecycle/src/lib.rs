#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure lifecycle system owning the coarse game mode.
//!
//! The system consumes session events and emits the commands that drive the
//! editing, running, won and lost phases: launching and advancing the
//! simulation, stopping the advance timer, scheduling the level advance and
//! resetting. Leaving [`LifecycleMode::Running`] always emits
//! [`Command::StopAdvanceTimer`] before any other command of the transition.

use dungeon_defence_core::{
    AdvanceOutcome, Affordances, Command, Event, LifecycleMode, Notice, Operation, StatusMessage,
    SyncReason, TerminalFlags, LEVEL_ADVANCE_DELAY,
};

/// Lifecycle state machine.
#[derive(Debug, Clone)]
pub struct Lifecycle {
    mode: LifecycleMode,
    launch_pending: bool,
    awaiting_first_snapshot: bool,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self {
            mode: LifecycleMode::Editing,
            launch_pending: false,
            awaiting_first_snapshot: true,
        }
    }
}

impl Lifecycle {
    /// Creates a lifecycle in editing mode that has not seen a snapshot yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current mode.
    #[must_use]
    pub const fn mode(&self) -> LifecycleMode {
        self.mode
    }

    /// Reports whether a launch request awaits the service's answer.
    #[must_use]
    pub const fn launch_pending(&self) -> bool {
        self.launch_pending
    }

    /// Consumes session events and emits the resulting commands.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            self.handle_event(event, out);
        }
    }

    fn handle_event(&mut self, event: &Event, out: &mut Vec<Command>) {
        match event {
            Event::LaunchRequested => self.launch(out),
            Event::SimulationStarted => self.on_started(out),
            Event::SimulationBlocked { reason } => {
                self.launch_pending = false;
                tracing::info!(%reason, "launch refused, path is blocked");
                out.push(Command::Notify(Notice::SimulationBlocked {
                    reason: reason.clone(),
                }));
            }
            Event::AdvanceTimerFired => {
                if self.mode == LifecycleMode::Running {
                    out.push(Command::AdvanceSimulation);
                }
            }
            Event::SimulationAdvanced { outcome } => self.on_advanced(*outcome, out),
            Event::SnapshotReceived { terminal } => self.on_snapshot(*terminal, out),
            Event::LevelAdvanceDue => {
                if self.mode == LifecycleMode::Won {
                    tracing::info!("requesting next level");
                    out.push(Command::NextLevel);
                }
            }
            Event::LevelAdvanced => {
                tracing::info!("next level loaded");
                self.enter_editing(out);
                out.push(Command::ClearScene);
                out.push(Command::RequestSync {
                    reason: SyncReason::LevelAdvanced,
                    force_full_rebuild: true,
                });
            }
            Event::ResetRequested => self.reset(out),
            Event::ResetCompleted => {
                out.push(Command::ClearScene);
                out.push(Command::RequestSync {
                    reason: SyncReason::Reset,
                    force_full_rebuild: true,
                });
            }
            Event::ImportRequested { definition } => {
                out.push(Command::ImportDungeon {
                    definition: definition.clone(),
                });
            }
            Event::DungeonImported => {
                tracing::info!("dungeon imported, returning to editing");
                self.enter_editing(out);
                out.push(Command::ClearScene);
                out.push(Command::Notify(Notice::Imported));
                out.push(Command::RequestSync {
                    reason: SyncReason::Import,
                    force_full_rebuild: true,
                });
            }
            Event::SaveRequested { request } => {
                out.push(Command::SaveDungeon {
                    request: request.clone(),
                });
            }
            Event::DungeonSaved { filename } => {
                out.push(Command::Notify(Notice::Saved {
                    filename: filename.clone(),
                }));
            }
            Event::CommandRejected { operation, reason } => {
                self.on_rejected(*operation, reason, out);
            }
            Event::TransportFailed { operation, .. } => {
                if *operation == Operation::StartSimulation {
                    self.launch_pending = false;
                }
            }
            Event::EntityKindSelected { .. }
            | Event::TileActivated { .. }
            | Event::SurfaceResized
            | Event::PushNotified
            | Event::PlacementAccepted { .. } => {}
        }
    }

    fn launch(&mut self, out: &mut Vec<Command>) {
        if self.mode != LifecycleMode::Editing || self.launch_pending {
            tracing::debug!(mode = ?self.mode, "launch ignored");
            return;
        }

        self.launch_pending = true;
        out.push(Command::StartSimulation);
    }

    fn on_started(&mut self, out: &mut Vec<Command>) {
        if !self.launch_pending || self.mode != LifecycleMode::Editing {
            tracing::debug!(mode = ?self.mode, "unexpected simulation start ignored");
            return;
        }

        self.launch_pending = false;
        self.mode = LifecycleMode::Running;
        tracing::info!("simulation running");
        out.push(Command::PresentAffordances(Affordances::for_mode(self.mode)));
        out.push(Command::PresentStatus(StatusMessage::Blank));
        out.push(Command::StartAdvanceTimer);
    }

    fn on_advanced(&mut self, outcome: AdvanceOutcome, out: &mut Vec<Command>) {
        if self.mode != LifecycleMode::Running {
            tracing::debug!(mode = ?self.mode, "late advance result dropped");
            return;
        }

        match outcome {
            AdvanceOutcome::Continued => out.push(Command::RequestSync {
                reason: SyncReason::Timer,
                force_full_rebuild: false,
            }),
            AdvanceOutcome::Finished(flags) => self.finish(flags, out),
            AdvanceOutcome::Stalled => {
                tracing::info!("no hero could move, aborting simulation");
                self.enter_editing(out);
                out.push(Command::Notify(Notice::SimulationStalled));
            }
        }
    }

    fn on_snapshot(&mut self, terminal: TerminalFlags, out: &mut Vec<Command>) {
        let first = std::mem::replace(&mut self.awaiting_first_snapshot, false);
        if !terminal.is_terminal() {
            return;
        }

        if first {
            tracing::info!(?terminal, "service resumed into a finished wave, resetting");
            self.reset(out);
        } else if self.mode == LifecycleMode::Running {
            self.finish(terminal, out);
        } else {
            tracing::debug!(mode = ?self.mode, ?terminal, "terminal snapshot outside a run");
        }
    }

    fn finish(&mut self, flags: TerminalFlags, out: &mut Vec<Command>) {
        out.push(Command::StopAdvanceTimer);

        if flags.treasure_reached {
            self.mode = LifecycleMode::Lost;
            tracing::info!("treasure reached, wave lost");
            out.push(Command::PresentAffordances(Affordances::for_mode(self.mode)));
            out.push(Command::PresentStatus(StatusMessage::Lost));
        } else {
            self.mode = LifecycleMode::Won;
            tracing::info!("all heroes dead, wave won");
            out.push(Command::PresentAffordances(Affordances::for_mode(self.mode)));
            out.push(Command::PresentStatus(StatusMessage::Won));
            out.push(Command::ScheduleLevelAdvance {
                delay: LEVEL_ADVANCE_DELAY,
            });
        }
    }

    fn reset(&mut self, out: &mut Vec<Command>) {
        tracing::info!(mode = ?self.mode, "resetting simulation");
        self.enter_editing(out);
        out.push(Command::ResetSimulation);
    }

    fn enter_editing(&mut self, out: &mut Vec<Command>) {
        out.push(Command::StopAdvanceTimer);
        out.push(Command::CancelLevelAdvance);
        self.launch_pending = false;
        self.mode = LifecycleMode::Editing;
        out.push(Command::PresentAffordances(Affordances::for_mode(self.mode)));
        out.push(Command::PresentStatus(StatusMessage::Blank));
    }

    fn on_rejected(&mut self, operation: Operation, reason: &str, out: &mut Vec<Command>) {
        match operation {
            Operation::StartSimulation => self.launch_pending = false,
            Operation::PlaceEntity => return,
            _ => {}
        }

        out.push(Command::Notify(Notice::Rejected {
            operation,
            reason: reason.to_owned(),
        }));
    }
}
