//! Axis-aligned overlap tests and minimum-translation push-out.
//!
//! Algorithm for a single solid:
//! 1. No non-zero-area overlap → the moving rect is returned unchanged
//! 2. Measure penetration depth on X and on Y
//! 3. Push out along the axis with the SMALLER depth (ties push on Y)
//! 4. Direction comes from comparing rect centres on that axis
//!
//! `CollisionRegistry::resolve_all` folds step 1–4 over every registered
//! solid in registration order. Each push only looks at one solid, so a
//! rect wedged between two solids can be pushed out of the first and into
//! the second (or back into the first). That is an accepted approximation
//! for per-frame character movement, not a general contact solver.

use crate::building::BuildingId;
use crate::furniture::FurnitureId;
use crate::geometry::Rect;

/// Penetration of `moving` into `solid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionInfo {
    pub overlap_x: i32,
    pub overlap_y: i32,
    /// `moving` sits left of the solid's centre.
    pub from_left: bool,
    /// `moving` sits above the solid's centre.
    pub from_top: bool,
}

/// True iff the rects overlap with non-zero area. Symmetric.
pub fn collides(a: &Rect, b: &Rect) -> bool {
    a.intersects(b)
}

pub fn collision_info(solid: &Rect, moving: &Rect) -> Option<CollisionInfo> {
    if !collides(solid, moving) {
        return None;
    }
    let overlap_x = (moving.right() - solid.left()).min(solid.right() - moving.left());
    let overlap_y = (moving.bottom() - solid.top()).min(solid.bottom() - moving.top());
    Some(CollisionInfo {
        overlap_x,
        overlap_y,
        from_left: moving.center_x() < solid.center_x(),
        from_top: moving.center_y() < solid.center_y(),
    })
}

/// Push `moving` out of `solid` along the axis of least penetration.
pub fn resolve(solid: &Rect, moving: &Rect) -> Rect {
    let Some(info) = collision_info(solid, moving) else {
        return *moving;
    };

    if info.overlap_x < info.overlap_y {
        let x = if info.from_left {
            solid.left() - moving.width
        } else {
            solid.right()
        };
        moving.with_top_left(x, moving.y)
    } else {
        let y = if info.from_top {
            solid.top() - moving.height
        } else {
            solid.bottom()
        };
        moving.with_top_left(moving.x, y)
    }
}

/// What a registered solid belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColliderKey {
    /// Exterior hitbox of a building.
    Building(BuildingId),
    /// Interior wall segment, by index into the layout's wall list.
    Wall(usize),
    /// Interior furniture hitbox.
    Furniture(FurnitureId),
}

/// Ordered set of solids answering "what does this rect touch".
#[derive(Debug, Clone, Default)]
pub struct CollisionRegistry {
    objects: Vec<(ColliderKey, Rect)>,
}

impl CollisionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a solid. Registering an existing key is a no-op that
    /// returns `false`; use [`CollisionRegistry::update`] to move it.
    pub fn register(&mut self, key: ColliderKey, hitbox: Rect) -> bool {
        if self.objects.iter().any(|(k, _)| *k == key) {
            return false;
        }
        self.objects.push((key, hitbox));
        true
    }

    pub fn unregister(&mut self, key: ColliderKey) -> bool {
        let before = self.objects.len();
        self.objects.retain(|(k, _)| *k != key);
        self.objects.len() != before
    }

    /// Replace the hitbox of a registered solid, keeping its order slot.
    pub fn update(&mut self, key: ColliderKey, hitbox: Rect) -> bool {
        match self.objects.iter_mut().find(|(k, _)| *k == key) {
            Some((_, rect)) => {
                *rect = hitbox;
                true
            }
            None => false,
        }
    }

    pub fn hitbox(&self, key: ColliderKey) -> Option<Rect> {
        self.objects
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, r)| *r)
    }

    /// Keys of every solid overlapping `rect`, in registration order.
    pub fn touching(&self, rect: &Rect) -> Vec<ColliderKey> {
        self.objects
            .iter()
            .filter(|(_, hitbox)| collides(hitbox, rect))
            .map(|(k, _)| *k)
            .collect()
    }

    pub fn any_collision(&self, rect: &Rect) -> bool {
        self.objects.iter().any(|(_, hitbox)| collides(hitbox, rect))
    }

    /// Sequentially resolve `moving` against each solid it currently
    /// intersects. Order-dependent by construction.
    pub fn resolve_all(&self, moving: &Rect) -> Rect {
        self.objects.iter().fold(*moving, |current, (_, solid)| {
            if collides(solid, &current) {
                resolve(solid, &current)
            } else {
                current
            }
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &(ColliderKey, Rect)> {
        self.objects.iter()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn clear(&mut self) {
        self.objects.clear();
    }
}

impl FromIterator<(ColliderKey, Rect)> for CollisionRegistry {
    fn from_iter<I: IntoIterator<Item = (ColliderKey, Rect)>>(iter: I) -> Self {
        let mut registry = Self::new();
        for (key, rect) in iter {
            registry.register(key, rect);
        }
        registry
    }
}
