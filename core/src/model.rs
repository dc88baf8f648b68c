//! Read models received from the dungeon service.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Location of a single grid cell as assigned by the dungeon service.
///
/// Coordinates are signed because the service owns them; the client never
/// derives them from array indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPosition {
    /// Column component of the position.
    pub x: i32,
    /// Row component of the position.
    pub y: i32,
}

impl GridPosition {
    /// Creates a new grid position.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Authoritative content type of a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CellKind {
    /// Bare floor with nothing placed on it.
    Floor,
    /// Wall segment blocking hero movement.
    Wall,
    /// Damaging trap.
    Trap,
    /// Hero entry point.
    Start,
    /// Treasure exit the heroes try to reach.
    Exit,
    /// Dragon guarding the cell.
    Dragon,
    /// Bomb waiting for a hero.
    #[serde(alias = "BOMBE")]
    Bomb,
}

impl CellKind {
    /// Reports whether the cell carries something drawn above the floor tile.
    #[must_use]
    pub const fn has_entity(self) -> bool {
        !matches!(self, Self::Floor)
    }

    /// Reports whether the operator is forbidden from placing onto this cell.
    #[must_use]
    pub const fn is_protected(self) -> bool {
        matches!(self, Self::Start | Self::Exit)
    }
}

/// Immutable description of one grid position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    /// Column assigned by the service.
    pub x: i32,
    /// Row assigned by the service.
    pub y: i32,
    /// Content of the cell.
    #[serde(rename = "type")]
    pub kind: CellKind,
}

impl Cell {
    /// Creates a new cell.
    #[must_use]
    pub const fn new(x: i32, y: i32, kind: CellKind) -> Self {
        Self { x, y, kind }
    }

    /// Position of the cell.
    #[must_use]
    pub const fn position(&self) -> GridPosition {
        GridPosition::new(self.x, self.y)
    }
}

/// Rows of cells describing the dungeon layout. Rows may be ragged.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Grid {
    rows: Vec<Vec<Cell>>,
}

impl Grid {
    /// Creates a grid from the provided rows.
    #[must_use]
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }

    /// Effective width: the length of the longest row.
    #[must_use]
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Number of rows.
    #[must_use]
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Reports whether the grid holds no cells at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(Vec::is_empty)
    }

    /// Iterates every cell row by row.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.rows.iter().flatten()
    }

    /// Looks up the cell carrying the provided coordinates.
    #[must_use]
    pub fn cell_at(&self, position: GridPosition) -> Option<&Cell> {
        self.cells().find(|cell| cell.position() == position)
    }
}

/// Hero still walking the dungeon.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Hero {
    /// Column currently occupied.
    pub x: i32,
    /// Row currently occupied.
    pub y: i32,
}

impl Hero {
    /// Creates a new hero marker.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Position currently occupied by the hero.
    #[must_use]
    pub const fn position(&self) -> GridPosition {
        GridPosition::new(self.x, self.y)
    }
}

/// Terminal flags reported alongside every snapshot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TerminalFlags {
    /// A hero carried the treasure out.
    pub treasure_reached: bool,
    /// Every hero fell before reaching the treasure.
    pub all_heroes_dead: bool,
}

impl TerminalFlags {
    /// Flags describing a simulation that is still going.
    pub const NONE: Self = Self {
        treasure_reached: false,
        all_heroes_dead: false,
    };

    /// Reports whether either flag ends the simulation.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.treasure_reached || self.all_heroes_dead
    }
}

/// Complete authoritative picture of the dungeon at one point in time.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DungeonSnapshot {
    /// Cell layout.
    #[serde(default)]
    pub grid: Grid,
    /// Heroes still inside the dungeon.
    #[serde(default, alias = "heros")]
    pub heroes: Vec<Hero>,
    /// Set once a hero reached the treasure.
    #[serde(default, rename = "treasureReached")]
    pub treasure_reached: bool,
    /// Set once every hero has been eliminated.
    #[serde(default, rename = "allHeroesDead")]
    pub all_heroes_dead: bool,
}

impl DungeonSnapshot {
    /// Extracts the terminal flags carried by the snapshot.
    #[must_use]
    pub const fn terminal(&self) -> TerminalFlags {
        TerminalFlags {
            treasure_reached: self.treasure_reached,
            all_heroes_dead: self.all_heroes_dead,
        }
    }
}

/// Kinds of entity the operator may place.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// Damaging trap.
    #[default]
    Trap,
    /// Wall segment.
    Wall,
    /// Dragon.
    Dragon,
    /// Bomb, spelled the way the service expects it.
    Bombe,
}

impl EntityKind {
    /// Every placeable kind in sidebar order.
    pub const ALL: [Self; 4] = [Self::Trap, Self::Wall, Self::Dragon, Self::Bombe];

    /// Name used by the service for `type_entity` values and price keys.
    #[must_use]
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::Trap => "trap",
            Self::Wall => "wall",
            Self::Dragon => "dragon",
            Self::Bombe => "bombe",
        }
    }
}

/// Sidebar read model fetched independently from the dungeon snapshot.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SidebarMetrics {
    /// Budget left for placements.
    #[serde(default)]
    pub money: f64,
    /// Current campaign level.
    #[serde(default)]
    pub level: u32,
    /// Accumulated score.
    #[serde(default)]
    pub score: f64,
    /// Price of each entity keyed by wire name.
    #[serde(default)]
    pub prices: BTreeMap<String, f64>,
}

impl SidebarMetrics {
    /// Price advertised for the provided entity kind, if any.
    #[must_use]
    pub fn price_of(&self, kind: EntityKind) -> Option<f64> {
        self.prices.get(kind.wire_name()).copied()
    }
}
