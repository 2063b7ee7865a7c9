//! Tiny ECS: World, Entity, components: Transform + Renderable.

use crate::material::MaterialOverride;
use crate::transform::Transform;

/// Entity id (dense, index into component arrays).
pub type Entity = u32;

/// Handle to geometry uploaded by the renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MeshId(pub u32);

/// A mesh drawn at the entity's transform.
#[derive(Clone, Debug, PartialEq)]
pub struct Renderable {
    pub mesh: MeshId,
    /// Mesh-local transform applied inside the entity transform.
    pub local: Transform,
    pub material: MaterialOverride,
}

/// Very small ECS world with dense parallel arrays.
/// No allocations per-frame; spawn may allocate to grow capacity.
#[derive(Default)]
pub struct World {
    transforms: Vec<Transform>,
    renderables: Vec<Option<Renderable>>,
    alive: Vec<bool>,
    len: u32,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn entity with Transform and optional Renderable.
    pub fn spawn(&mut self, t: Transform, r: Option<Renderable>) -> Entity {
        let id = self.len;
        let idx = id as usize;
        self.len += 1;

        if idx >= self.transforms.len() {
            let new_len = (idx + 1).next_power_of_two().max(8);
            self.transforms.resize(new_len, Transform::identity());
            self.renderables.resize(new_len, None);
            self.alive.resize(new_len, false);
        }

        self.transforms[idx] = t;
        self.renderables[idx] = r;
        self.alive[idx] = true;
        id
    }

    #[inline]
    pub fn is_alive(&self, e: Entity) -> bool {
        let i = e as usize;
        i < self.alive.len() && self.alive[i]
    }

    #[inline]
    pub fn transform(&self, e: Entity) -> Option<&Transform> {
        self.is_alive(e).then(|| &self.transforms[e as usize])
    }

    /// Mutable access to a transform (for animation).
    #[inline]
    pub fn transform_mut(&mut self, e: Entity) -> Option<&mut Transform> {
        if self.is_alive(e) {
            Some(&mut self.transforms[e as usize])
        } else {
            None
        }
    }

    pub fn renderable(&self, e: Entity) -> Option<&Renderable> {
        if self.is_alive(e) {
            self.renderables[e as usize].as_ref()
        } else {
            None
        }
    }

    pub fn renderable_mut(&mut self, e: Entity) -> Option<&mut Renderable> {
        if self.is_alive(e) {
            self.renderables[e as usize].as_mut()
        } else {
            None
        }
    }

    /// Attach (or replace) the renderable of a live entity.
    /// Returns `false` if the entity does not exist.
    pub fn set_renderable(&mut self, e: Entity, r: Renderable) -> bool {
        if !self.is_alive(e) {
            return false;
        }
        self.renderables[e as usize] = Some(r);
        true
    }

    /// Iterate over (Transform, Renderable) pairs.
    pub fn iter_renderables(&self) -> impl Iterator<Item = (&Transform, &Renderable)> {
        (0..self.len as usize).filter_map(move |i| {
            if self.alive.get(i).copied().unwrap_or(false) {
                if let Some(r) = self.renderables[i].as_ref() {
                    return Some((&self.transforms[i], r));
                }
            }
            None
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderable() -> Renderable {
        Renderable {
            mesh: MeshId(0),
            local: Transform::identity(),
            material: MaterialOverride::default(),
        }
    }

    #[test]
    fn entity_without_renderable_is_not_drawn() {
        let mut world = World::new();
        let e = world.spawn(Transform::identity(), None);
        assert!(world.is_alive(e));
        assert_eq!(world.iter_renderables().count(), 0);

        assert!(world.set_renderable(e, renderable()));
        assert_eq!(world.iter_renderables().count(), 1);
    }

    #[test]
    fn unknown_entity_is_rejected() {
        let mut world = World::new();
        assert!(!world.set_renderable(3, renderable()));
        assert!(world.transform_mut(3).is_none());
    }

    #[test]
    fn spawn_grows_storage() {
        let mut world = World::new();
        let ids: Vec<Entity> = (0..20).map(|_| world.spawn(Transform::identity(), None)).collect();
        assert_eq!(ids.last(), Some(&19));
        assert!(ids.iter().all(|&e| world.is_alive(e)));
    }
}
