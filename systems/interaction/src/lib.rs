#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure editing-mode system responsible for emitting entity placement commands.

use dungeon_defence_core::{
    Cell, Command, EntityKind, Event, LifecycleMode, Notice, Operation, Placement, SyncReason,
};

/// Editing-mode system that translates selection and tile activations into placements.
#[derive(Debug, Clone, Default)]
pub struct Interaction {
    selected: EntityKind,
}

impl Interaction {
    /// Creates a new interaction system with the default kind armed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Entity kind placed by the next tile activation.
    #[must_use]
    pub const fn selected(&self) -> EntityKind {
        self.selected
    }

    /// Consumes session events and emits placement and follow-up commands.
    ///
    /// `mode` is the lifecycle mode at the time the events are handled; input
    /// arriving outside [`LifecycleMode::Editing`] is dropped.
    pub fn handle(&mut self, mode: LifecycleMode, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::EntityKindSelected { kind } => self.select_entity_kind(mode, *kind, out),
                Event::TileActivated { cell } => self.on_tile_activated(mode, cell, out),
                Event::PlacementAccepted { placement } => {
                    tracing::debug!(?placement, "placement accepted");
                    out.push(Command::RequestSync {
                        reason: SyncReason::PostCommand,
                        force_full_rebuild: true,
                    });
                }
                Event::CommandRejected {
                    operation: Operation::PlaceEntity,
                    reason,
                } => {
                    tracing::info!(%reason, "placement rejected");
                    out.push(Command::Notify(Notice::Rejected {
                        operation: Operation::PlaceEntity,
                        reason: reason.clone(),
                    }));
                }
                _ => {}
            }
        }
    }

    /// Arms the provided kind for placement.
    pub fn select_entity_kind(
        &mut self,
        mode: LifecycleMode,
        kind: EntityKind,
        out: &mut Vec<Command>,
    ) {
        if mode != LifecycleMode::Editing {
            tracing::debug!(?mode, ?kind, "selection ignored outside editing");
            return;
        }

        self.selected = kind;
        out.push(Command::HighlightSelection(kind));
    }

    /// Emits a placement for the activated cell when the cell accepts one.
    pub fn on_tile_activated(&self, mode: LifecycleMode, cell: &Cell, out: &mut Vec<Command>) {
        if mode != LifecycleMode::Editing {
            return;
        }

        if cell.kind.is_protected() {
            tracing::debug!(position = ?cell.position(), "cannot place on start or exit");
            return;
        }

        out.push(Command::PlaceEntity {
            placement: Placement::new(self.selected, cell.position()),
        });
    }
}
