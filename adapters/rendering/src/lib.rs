#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Dungeon Defence adapters.
//!
//! Image creation, tinting and hit-testing belong to the concrete backend.
//! This crate owns what sits above them: the isometric projection, the
//! description of each visual object and the registry that tracks which
//! objects are alive.

mod projection;
mod registry;

use dungeon_defence_core::{Cell, CellKind, GridPosition, Hero};
use glam::Vec2;
use thiserror::Error;

pub use projection::{IsoProjector, TILE_HEIGHT, TILE_WIDTH};
pub use registry::SceneRegistry;

/// Dimensions of the rendering surface in screen pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceSize {
    width: f32,
    height: f32,
}

impl SurfaceSize {
    /// Creates a surface descriptor.
    ///
    /// Returns an error when either dimension is negative or not finite.
    pub fn new(width: f32, height: f32) -> Result<Self, RenderingError> {
        if !width.is_finite() || !height.is_finite() || width < 0.0 || height < 0.0 {
            return Err(RenderingError::InvalidSurface { width, height });
        }

        Ok(Self { width, height })
    }

    /// Surface width in pixels.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Surface height in pixels.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }
}

/// Role a visual object plays in the scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SceneRole {
    /// Floor tile drawn under every cell.
    Floor,
    /// Static entity standing on a cell.
    Entity,
    /// Hero walking through the dungeon.
    Hero,
}

impl SceneRole {
    /// Offset added to the screen Y to form the draw-order key.
    #[must_use]
    pub const fn depth_offset(self) -> f32 {
        match self {
            Self::Floor => 0.0,
            Self::Entity => 1.0,
            Self::Hero => 2.0,
        }
    }
}

/// Image drawn for a visual object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpriteKey {
    /// Floor tile.
    Floor,
    /// Wall block.
    Wall,
    /// Trap.
    Trap,
    /// Entry marker.
    Start,
    /// Exit marker.
    Exit,
    /// Dragon.
    Dragon,
    /// Bomb.
    Bomb,
    /// Hero.
    Hero,
}

impl SpriteKey {
    /// Sprite drawn above the floor for a cell kind, if any.
    #[must_use]
    pub const fn for_cell(kind: CellKind) -> Option<Self> {
        match kind {
            CellKind::Floor => None,
            CellKind::Wall => Some(Self::Wall),
            CellKind::Trap => Some(Self::Trap),
            CellKind::Start => Some(Self::Start),
            CellKind::Exit => Some(Self::Exit),
            CellKind::Dragon => Some(Self::Dragon),
            CellKind::Bomb => Some(Self::Bomb),
        }
    }

    /// Asset name conventionally used for the sprite.
    #[must_use]
    pub const fn asset_name(self) -> &'static str {
        match self {
            Self::Floor => "floor",
            Self::Wall => "wall",
            Self::Trap => "trap",
            Self::Start => "start",
            Self::Exit => "exit",
            Self::Dragon => "dragon",
            Self::Bomb => "bomb",
            Self::Hero => "hero",
        }
    }
}

/// Fully placed description of one object the backend should draw.
///
/// Backends anchor the image at its bottom centre on `screen`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Visual {
    /// Image to draw.
    pub sprite: SpriteKey,
    /// Role of the object.
    pub role: SceneRole,
    /// Grid position the object originates from.
    pub position: GridPosition,
    /// Projected screen position.
    pub screen: Vec2,
    /// Draw-order key; larger values draw on top.
    pub depth: f32,
}

impl Visual {
    fn placed(
        projector: &IsoProjector,
        sprite: SpriteKey,
        role: SceneRole,
        position: GridPosition,
    ) -> Self {
        Self {
            sprite,
            role,
            position,
            screen: projector.project(position),
            depth: projector.depth(role, position),
        }
    }

    /// Floor tile for the provided cell.
    #[must_use]
    pub fn floor(projector: &IsoProjector, cell: &Cell) -> Self {
        Self::placed(
            projector,
            SpriteKey::Floor,
            SceneRole::Floor,
            cell.position(),
        )
    }

    /// Entity standing on the provided cell, if the cell carries one.
    #[must_use]
    pub fn entity(projector: &IsoProjector, cell: &Cell) -> Option<Self> {
        SpriteKey::for_cell(cell.kind).map(|sprite| {
            Self::placed(projector, sprite, SceneRole::Entity, cell.position())
        })
    }

    /// Hero marker.
    #[must_use]
    pub fn hero(projector: &IsoProjector, hero: &Hero) -> Self {
        Self::placed(projector, SpriteKey::Hero, SceneRole::Hero, hero.position())
    }
}

/// Scene-graph backend capable of presenting Dungeon Defence visuals.
pub trait SceneBackend {
    /// Opaque handle identifying a spawned object.
    type Handle;

    /// Current size of the rendering surface.
    fn surface_size(&self) -> SurfaceSize;

    /// Creates an object for the provided visual and returns its handle.
    fn spawn(&mut self, visual: &Visual) -> Self::Handle;

    /// Destroys an object. The handle is invalid afterwards.
    fn destroy(&mut self, handle: Self::Handle);

    /// Makes a floor object report activations of the provided cell.
    fn attach_tile_interaction(&mut self, handle: &Self::Handle, cell: Cell);
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, Error, PartialEq)]
pub enum RenderingError {
    /// Surface dimensions must be finite and non-negative.
    #[error("surface size must be finite and non-negative (received {width}x{height})")]
    InvalidSurface {
        /// Provided width.
        width: f32,
        /// Provided height.
        height: f32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_rejects_negative_dimensions_without_panicking() {
        let error = SurfaceSize::new(-1.0, 10.0).expect_err("negative width must be rejected");

        assert!(matches!(error, RenderingError::InvalidSurface { .. }));
        assert!(SurfaceSize::new(f32::NAN, 10.0).is_err());
    }

    #[test]
    fn floor_cells_carry_no_entity() {
        let projector = IsoProjector::default();
        let floor = Cell::new(1, 1, CellKind::Floor);
        let trap = Cell::new(1, 1, CellKind::Trap);

        assert!(Visual::entity(&projector, &floor).is_none());
        let visual = Visual::entity(&projector, &trap).expect("trap has an entity");
        assert_eq!(visual.sprite, SpriteKey::Trap);
        assert_eq!(visual.depth, Visual::floor(&projector, &trap).depth + 1.0);
    }

    #[test]
    fn hero_visual_sits_on_projected_cell() {
        let projector = IsoProjector::with_origin(Vec2::new(320.0, 40.0));
        let visual = Visual::hero(&projector, &Hero::new(2, 1));

        assert_eq!(visual.screen, Vec2::new(352.0, 88.0));
        assert_eq!(visual.depth, 90.0);
        assert_eq!(visual.role, SceneRole::Hero);
    }
}
