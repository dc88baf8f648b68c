use dungeon_defence_core::{
    Cell, CellKind, Command, EntityKind, Event, GridPosition, LifecycleMode, Notice, Operation,
    Placement, SyncReason,
};
use dungeon_defence_system_interaction::Interaction;

fn placements(commands: &[Command]) -> Vec<Placement> {
    commands
        .iter()
        .filter_map(|command| match command {
            Command::PlaceEntity { placement } => Some(*placement),
            _ => None,
        })
        .collect()
}

#[test]
fn selected_kind_is_placed_on_activated_floor() {
    let mut interaction = Interaction::default();
    let mut commands = Vec::new();

    interaction.handle(
        LifecycleMode::Editing,
        &[
            Event::EntityKindSelected {
                kind: EntityKind::Trap,
            },
            Event::TileActivated {
                cell: Cell::new(1, 0, CellKind::Floor),
            },
        ],
        &mut commands,
    );

    assert_eq!(
        commands,
        vec![
            Command::HighlightSelection(EntityKind::Trap),
            Command::PlaceEntity {
                placement: Placement::new(EntityKind::Trap, GridPosition::new(1, 0)),
            },
        ],
        "exactly one placement should follow a single activation",
    );
}

#[test]
fn accepted_placement_forces_full_rebuild() {
    let mut interaction = Interaction::default();
    let mut commands = Vec::new();

    interaction.handle(
        LifecycleMode::Editing,
        &[Event::PlacementAccepted {
            placement: Placement::new(EntityKind::Wall, GridPosition::new(2, 2)),
        }],
        &mut commands,
    );

    assert_eq!(
        commands,
        vec![Command::RequestSync {
            reason: SyncReason::PostCommand,
            force_full_rebuild: true,
        }]
    );
}

#[test]
fn start_and_exit_never_emit_placements_in_any_mode() {
    let modes = [
        LifecycleMode::Editing,
        LifecycleMode::Running,
        LifecycleMode::Won,
        LifecycleMode::Lost,
    ];

    for mode in modes {
        let mut interaction = Interaction::default();
        let mut commands = Vec::new();
        interaction.handle(
            mode,
            &[
                Event::TileActivated {
                    cell: Cell::new(0, 0, CellKind::Start),
                },
                Event::TileActivated {
                    cell: Cell::new(3, 3, CellKind::Exit),
                },
            ],
            &mut commands,
        );

        assert!(
            placements(&commands).is_empty(),
            "protected cells must not emit placements in {mode:?}"
        );
    }
}

#[test]
fn activations_outside_editing_are_ignored() {
    for mode in [
        LifecycleMode::Running,
        LifecycleMode::Won,
        LifecycleMode::Lost,
    ] {
        let mut interaction = Interaction::default();
        let mut commands = Vec::new();
        interaction.handle(
            mode,
            &[Event::TileActivated {
                cell: Cell::new(2, 1, CellKind::Floor),
            }],
            &mut commands,
        );

        assert!(commands.is_empty(), "no request may leave in {mode:?}");
    }
}

#[test]
fn selection_is_locked_outside_editing() {
    let mut interaction = Interaction::default();
    let mut commands = Vec::new();

    interaction.handle(
        LifecycleMode::Running,
        &[Event::EntityKindSelected {
            kind: EntityKind::Dragon,
        }],
        &mut commands,
    );

    assert!(commands.is_empty());
    assert_eq!(interaction.selected(), EntityKind::Trap);
}

#[test]
fn rejected_placement_is_surfaced() {
    let mut interaction = Interaction::default();
    let mut commands = Vec::new();

    interaction.handle(
        LifecycleMode::Editing,
        &[Event::CommandRejected {
            operation: Operation::PlaceEntity,
            reason: "cell occupied".to_owned(),
        }],
        &mut commands,
    );

    assert_eq!(
        commands,
        vec![Command::Notify(Notice::Rejected {
            operation: Operation::PlaceEntity,
            reason: "cell occupied".to_owned(),
        })]
    );
}

#[test]
fn entities_may_be_placed_over_existing_ones() {
    let interaction = Interaction::default();
    let mut commands = Vec::new();

    interaction.on_tile_activated(
        LifecycleMode::Editing,
        &Cell::new(4, 2, CellKind::Wall),
        &mut commands,
    );

    assert_eq!(placements(&commands).len(), 1);
}
