//! Cartesian to isometric projection and depth ordering.

use dungeon_defence_core::GridPosition;
use glam::Vec2;

use crate::{SceneRole, SurfaceSize};

/// Width of a floor tile sprite in screen pixels.
pub const TILE_WIDTH: f32 = 64.0;

/// Height of a floor tile sprite in screen pixels.
pub const TILE_HEIGHT: f32 = 32.0;

/// Maps grid coordinates onto the rendering surface.
///
/// The projection depends only on the grid position and the origin captured
/// by the most recent [`IsoProjector::fit`], never on call order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IsoProjector {
    origin: Vec2,
}

impl Default for IsoProjector {
    fn default() -> Self {
        Self { origin: Vec2::ZERO }
    }
}

impl IsoProjector {
    /// Creates a projector anchored at an explicit origin.
    #[must_use]
    pub const fn with_origin(origin: Vec2) -> Self {
        Self { origin }
    }

    /// Creates a projector that centres a grid of the provided dimensions on the surface.
    #[must_use]
    pub fn fit(surface: SurfaceSize, grid_width: usize, grid_height: usize) -> Self {
        let span = (grid_width + grid_height) as f32;
        let total_width = span * (TILE_WIDTH / 2.0);
        let total_height = span * (TILE_HEIGHT / 2.0);

        let origin = Vec2::new(
            (surface.width() - total_width) / 2.0 + total_width / 2.0,
            (surface.height() - total_height) / 2.0,
        );

        Self { origin }
    }

    /// Screen position of the tile origin used by the projector.
    #[must_use]
    pub const fn origin(&self) -> Vec2 {
        self.origin
    }

    /// Projects a grid position onto the surface.
    #[must_use]
    pub fn project(&self, position: GridPosition) -> Vec2 {
        let x = position.x as f32;
        let y = position.y as f32;
        Vec2::new(
            (x - y) * (TILE_WIDTH / 2.0) + self.origin.x,
            (x + y) * (TILE_HEIGHT / 2.0) + self.origin.y,
        )
    }

    /// Draw-order key for an object of the given role at the projected position.
    ///
    /// Floors sort at their screen Y, entities one above and heroes two above,
    /// so equal-depth ties never fall back to insertion order.
    #[must_use]
    pub fn depth(&self, role: SceneRole, position: GridPosition) -> f32 {
        self.project(position).y + role.depth_offset()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface(width: f32, height: f32) -> SurfaceSize {
        SurfaceSize::new(width, height).expect("valid surface")
    }

    #[test]
    fn fit_centres_the_grid_bounding_box() {
        let projector = IsoProjector::fit(surface(800.0, 600.0), 10, 6);

        // total width = 16 * 32 = 512, total height = 16 * 16 = 256
        assert_eq!(projector.origin(), Vec2::new(400.0, 172.0));
    }

    #[test]
    fn project_applies_isometric_transform() {
        let projector = IsoProjector::with_origin(Vec2::new(100.0, 50.0));

        assert_eq!(
            projector.project(GridPosition::new(0, 0)),
            Vec2::new(100.0, 50.0)
        );
        assert_eq!(
            projector.project(GridPosition::new(3, 1)),
            Vec2::new(164.0, 114.0)
        );
        assert_eq!(
            projector.project(GridPosition::new(1, 3)),
            Vec2::new(36.0, 114.0)
        );
    }

    #[test]
    fn projection_is_independent_of_call_order() {
        let projector = IsoProjector::fit(surface(1024.0, 768.0), 7, 5);
        let positions = [
            GridPosition::new(4, 2),
            GridPosition::new(0, 0),
            GridPosition::new(6, 4),
        ];

        let forward: Vec<Vec2> = positions.iter().map(|p| projector.project(*p)).collect();
        let backward: Vec<Vec2> = positions
            .iter()
            .rev()
            .map(|p| projector.project(*p))
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();

        assert_eq!(forward, backward);
    }

    #[test]
    fn depth_orders_hero_above_entity_above_floor() {
        let projector = IsoProjector::with_origin(Vec2::new(0.0, 10.0));
        let cell = GridPosition::new(2, 2);

        let floor = projector.depth(SceneRole::Floor, cell);
        let entity = projector.depth(SceneRole::Entity, cell);
        let hero = projector.depth(SceneRole::Hero, cell);

        assert_eq!(floor, 74.0);
        assert_eq!(entity, floor + 1.0);
        assert_eq!(hero, floor + 2.0);
    }

    #[test]
    fn cells_further_down_draw_later() {
        let projector = IsoProjector::default();

        assert!(
            projector.depth(SceneRole::Floor, GridPosition::new(1, 1))
                > projector.depth(SceneRole::Hero, GridPosition::new(0, 1))
        );
    }
}
