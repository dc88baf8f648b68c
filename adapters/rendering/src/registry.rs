//! Ownership of the visual objects currently alive in the scene.

use dungeon_defence_core::GridPosition;

use crate::{SceneBackend, SceneRole};

/// Visual object tracked by the registry.
#[derive(Debug)]
struct TrackedObject<H> {
    role: SceneRole,
    position: GridPosition,
    handle: H,
}

/// Owns every visual object spawned for the current scene.
///
/// Handles never leave the registry. Destroying an object first removes it
/// from the tracked set and then hands the handle to the backend, so a
/// destroyed handle can never be observed again.
#[derive(Debug)]
pub struct SceneRegistry<H> {
    objects: Vec<TrackedObject<H>>,
}

impl<H> Default for SceneRegistry<H> {
    fn default() -> Self {
        Self {
            objects: Vec::new(),
        }
    }
}

impl<H> SceneRegistry<H> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts tracking an object spawned by the backend.
    pub fn insert(&mut self, role: SceneRole, position: GridPosition, handle: H) {
        self.objects.push(TrackedObject {
            role,
            position,
            handle,
        });
    }

    /// Destroys every tracked object.
    pub fn clear_all<B>(&mut self, backend: &mut B)
    where
        B: SceneBackend<Handle = H>,
    {
        for object in self.objects.drain(..) {
            backend.destroy(object.handle);
        }
    }

    /// Destroys only the objects tagged with the provided role.
    pub fn clear_by_role<B>(&mut self, role: SceneRole, backend: &mut B)
    where
        B: SceneBackend<Handle = H>,
    {
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.objects)
            .into_iter()
            .partition(|object| object.role == role);
        self.objects = kept;

        for object in removed {
            backend.destroy(object.handle);
        }
    }

    /// Reports whether no object is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Number of tracked objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Number of tracked objects with the provided role.
    #[must_use]
    pub fn count(&self, role: SceneRole) -> usize {
        self.objects.iter().filter(|object| object.role == role).count()
    }

    /// Role and position of every tracked object in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (SceneRole, GridPosition)> + '_ {
        self.objects
            .iter()
            .map(|object| (object.role, object.position))
    }

    /// Positions of the tracked objects with the provided role.
    pub fn positions(&self, role: SceneRole) -> impl Iterator<Item = GridPosition> + '_ {
        self.objects
            .iter()
            .filter(move |object| object.role == role)
            .map(|object| object.position)
    }
}
