//! Interior spaces: layout geometry, NPC occupancy and furniture.
//!
//! An interior is its own coordinate space with the origin at its top-left
//! corner. The layout is derived purely from the building policy:
//!
//! ```text
//!   0                 door gap                  w
//!   +-----------------+      +-----------------+   ← top wall (split)
//!   |                  exit_pos                |
//!   |                                          |
//!   |L                                        R|   ← side walls between
//!   |                                          |     top and bottom
//!   |                entrance_pos              |
//!   +------------------------------------------+   ← bottom wall
//! ```
//!
//! The wall list plus the door gap tile the perimeter ring of depth
//! `wall_thickness` exactly once.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::assets::{FloorPalette, TileId};
use crate::config::BuildingTypeConfig;
use crate::constants::interior::{
    ENTRANCE_OFFSET_FROM_BOTTOM, EXIT_OFFSET_FROM_TOP, EXIT_ZONE_HEIGHT, EXIT_ZONE_WIDTH,
};
use crate::constants::world::TILE_SIZE;
use crate::furniture::{FurnitureEntity, FurnitureId, FurnitureKind};
use crate::geometry::{Point, Rect, Size};

/// Identity of an NPC tracked by occupancy sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NpcId(pub u32);

/// Handle to a surface owned by a [`BackgroundRenderer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SurfaceId(pub u64);

/// Produces the floor background of an interior.
pub trait BackgroundRenderer {
    fn render_background(&mut self, interior_size: Size, palette: &FloorPalette) -> SurfaceId;
}

/// Static geometry of one interior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteriorLayout {
    pub interior_size: Size,
    pub wall_thickness: i32,
    pub door_width: i32,
    /// Where an NPC walking in through the front spawns.
    pub entrance_pos: Point,
    /// Exit door anchor; the player lands here on entry.
    pub exit_pos: Point,
    pub exit_zone: Rect,
    /// Filled by [`InteriorManager::initialize`].
    pub walls: Vec<Rect>,
}

impl InteriorLayout {
    pub fn new(interior_size: Size, wall_thickness: i32, door_width: i32) -> Self {
        let entrance_pos = Point::new(
            interior_size.width / 2,
            interior_size.height - ENTRANCE_OFFSET_FROM_BOTTOM,
        );
        let exit_pos = Point::new(interior_size.width / 2, EXIT_OFFSET_FROM_TOP);
        let exit_zone = Rect::from_center(exit_pos.x, exit_pos.y, EXIT_ZONE_WIDTH, EXIT_ZONE_HEIGHT);
        Self {
            interior_size,
            wall_thickness,
            door_width,
            entrance_pos,
            exit_pos,
            exit_zone,
            walls: Vec::new(),
        }
    }

    pub fn from_config(config: &BuildingTypeConfig) -> Self {
        Self::new(config.interior_size, config.wall_thickness, config.door_width)
    }

    /// Wall depth clamped so opposite walls never overlap.
    fn effective_thickness(&self) -> i32 {
        let w = self.interior_size.width.max(0);
        let h = self.interior_size.height.max(0);
        self.wall_thickness.clamp(0, w.min(h) / 2)
    }

    /// Half-open column range `[start, end)` of the door opening in the
    /// top wall, clipped to the interior width.
    pub fn door_gap(&self) -> (i32, i32) {
        let w = self.interior_size.width.max(0);
        let door = self.door_width.max(0);
        if door >= w {
            return (0, w);
        }
        let start = self.exit_pos.x - door / 2;
        let end = start + door;
        (start.clamp(0, w), end.clamp(0, w))
    }

    /// Collision walls for this layout. Pure: same inputs, same output.
    pub fn generate_walls(&self) -> Vec<Rect> {
        let w = self.interior_size.width.max(0);
        let h = self.interior_size.height.max(0);
        let t = self.effective_thickness();
        let (gap_start, gap_end) = self.door_gap();

        let candidates = [
            // Top wall, left of the door
            Rect::new(0, 0, gap_start, t),
            // Top wall, right of the door
            Rect::new(gap_end, 0, w - gap_end, t),
            // Bottom
            Rect::new(0, h - t, w, t),
            // Left and right, between top and bottom
            Rect::new(0, t, t, h - 2 * t),
            Rect::new(w - t, t, t, h - 2 * t),
        ];
        candidates.into_iter().filter(|r| !r.is_empty()).collect()
    }

    pub fn check_exit_range(&self, rect: &Rect) -> bool {
        self.exit_zone.intersects(rect)
    }

    /// Translation that centres the interior on a screen of the given size.
    pub fn get_interior_offset(&self, screen_width: i32, screen_height: i32) -> (i32, i32) {
        (
            (screen_width - self.interior_size.width).div_euclid(2),
            (screen_height - self.interior_size.height).div_euclid(2),
        )
    }

    /// Whole interior space.
    pub fn bounds(&self) -> Rect {
        Rect::from_size(0, 0, self.interior_size)
    }
}

/// One building's interior: layout, occupants and furniture.
#[derive(Debug, Clone)]
pub struct InteriorManager {
    layout: InteriorLayout,
    occupants: Vec<NpcId>,
    max_npcs: usize,
    furniture: Vec<FurnitureEntity>,
    next_furniture_id: u32,
    background: Option<SurfaceId>,
}

impl InteriorManager {
    pub fn new(config: &BuildingTypeConfig) -> Self {
        Self {
            layout: InteriorLayout::from_config(config),
            occupants: Vec::new(),
            max_npcs: config.max_npcs,
            furniture: Vec::new(),
            next_furniture_id: 0,
            background: None,
        }
    }

    /// Derive walls and request the background. Runs once; later calls are
    /// ignored and return `false`.
    pub fn initialize(
        &mut self,
        renderer: &mut dyn BackgroundRenderer,
        palette: &FloorPalette,
    ) -> bool {
        if self.background.is_some() {
            debug_assert!(false, "InteriorManager initialized twice");
            log::warn!("Interior already initialized, ignoring");
            return false;
        }
        self.layout.walls = self.layout.generate_walls();
        self.background = Some(renderer.render_background(self.layout.interior_size, palette));
        true
    }

    pub fn is_initialized(&self) -> bool {
        self.background.is_some()
    }

    pub fn background(&self) -> Option<SurfaceId> {
        self.background
    }

    pub fn layout(&self) -> &InteriorLayout {
        &self.layout
    }

    pub fn walls(&self) -> &[Rect] {
        debug_assert!(self.is_initialized(), "walls queried before initialize");
        &self.layout.walls
    }

    // ── Occupancy ──────────────────────────────────────────────────────

    pub fn max_npcs(&self) -> usize {
        self.max_npcs
    }

    pub fn can_add_npc(&self) -> bool {
        self.occupants.len() < self.max_npcs
    }

    /// Admit an NPC. Fails without mutation if already inside or full.
    pub fn add_npc(&mut self, npc: NpcId) -> bool {
        if self.occupants.contains(&npc) || !self.can_add_npc() {
            return false;
        }
        self.occupants.push(npc);
        true
    }

    pub fn remove_npc(&mut self, npc: NpcId) -> bool {
        match self.occupants.iter().position(|&n| n == npc) {
            Some(idx) => {
                self.occupants.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn contains_npc(&self, npc: NpcId) -> bool {
        self.occupants.contains(&npc)
    }

    pub fn npc_count(&self) -> usize {
        self.occupants.len()
    }

    pub fn is_at_capacity(&self) -> bool {
        self.occupants.len() >= self.max_npcs
    }

    pub fn occupants(&self) -> &[NpcId] {
        &self.occupants
    }

    pub fn clear_occupants(&mut self) {
        self.occupants.clear();
    }

    // ── Anchors ────────────────────────────────────────────────────────

    pub fn entrance_pos(&self) -> Point {
        self.layout.entrance_pos
    }

    pub fn exit_pos(&self) -> Point {
        self.layout.exit_pos
    }

    pub fn exit_zone(&self) -> Rect {
        self.layout.exit_zone
    }

    pub fn check_exit_range(&self, rect: &Rect) -> bool {
        self.layout.check_exit_range(rect)
    }

    pub fn get_interior_offset(&self, screen_width: i32, screen_height: i32) -> (i32, i32) {
        self.layout.get_interior_offset(screen_width, screen_height)
    }

    // ── Furniture ──────────────────────────────────────────────────────

    pub fn place_furniture(&mut self, kind: FurnitureKind, x: i32, y: i32, sprite: Size) -> FurnitureId {
        let id = FurnitureId(self.next_furniture_id);
        self.next_furniture_id += 1;
        self.furniture.push(FurnitureEntity::new(id, kind, x, y, sprite));
        id
    }

    /// Mark every piece unoccupied.
    pub fn release_furniture(&mut self) {
        for furniture in &mut self.furniture {
            furniture.is_occupied = false;
        }
    }

    pub fn furniture(&self) -> &[FurnitureEntity] {
        &self.furniture
    }

    pub fn furniture_by_id(&self, id: FurnitureId) -> Option<&FurnitureEntity> {
        self.furniture.iter().find(|f| f.id == id)
    }

    pub fn furniture_mut(&mut self, id: FurnitureId) -> Option<&mut FurnitureEntity> {
        self.furniture.iter_mut().find(|f| f.id == id)
    }

    /// Hitboxes of solid furniture, in placement order.
    pub fn furniture_collisions(&self) -> Vec<(FurnitureId, Rect)> {
        self.furniture
            .iter()
            .filter(|f| f.is_solid)
            .map(|f| (f.id, f.hitbox))
            .collect()
    }

    /// Furniture whose interaction zone overlaps `rect`.
    pub fn get_interactable_furniture(&self, rect: &Rect) -> Vec<&FurnitureEntity> {
        self.furniture
            .iter()
            .filter(|f| f.check_interaction_range(rect))
            .collect()
    }

    pub fn check_furniture_interaction(&self, rect: &Rect) -> Option<&FurnitureEntity> {
        self.furniture.iter().find(|f| f.check_interaction_range(rect))
    }

    /// First unoccupied chair, for NPCs looking for a seat.
    pub fn find_free_chair(&self) -> Option<FurnitureId> {
        self.furniture
            .iter()
            .find(|f| f.kind == FurnitureKind::Chair && !f.is_occupied)
            .map(|f| f.id)
    }
}

/// Grid of floor tile ids produced by [`TilePaletteRenderer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileGrid {
    pub columns: usize,
    pub rows: usize,
    /// Row-major; empty when the palette was empty.
    pub tiles: Vec<TileId>,
}

impl TileGrid {
    pub fn tile_at(&self, column: usize, row: usize) -> Option<TileId> {
        if column >= self.columns {
            return None;
        }
        self.tiles.get(row * self.columns + column).copied()
    }
}

/// Headless renderer: fills the floor with tiles drawn uniformly from the
/// palette using a seeded RNG, and keeps the grids it produced.
pub struct TilePaletteRenderer {
    rng: StdRng,
    tile_size: i32,
    surfaces: Vec<TileGrid>,
}

impl TilePaletteRenderer {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            tile_size: TILE_SIZE,
            surfaces: Vec::new(),
        }
    }

    pub fn surface(&self, id: SurfaceId) -> Option<&TileGrid> {
        self.surfaces.get(id.0 as usize)
    }

    pub fn surface_count(&self) -> usize {
        self.surfaces.len()
    }
}

impl BackgroundRenderer for TilePaletteRenderer {
    fn render_background(&mut self, interior_size: Size, palette: &FloorPalette) -> SurfaceId {
        let tile = self.tile_size.max(1);
        // Partial tiles at the far edges still get drawn
        let columns = (interior_size.width.max(0) + tile - 1) / tile;
        let rows = (interior_size.height.max(0) + tile - 1) / tile;
        let (columns, rows) = (columns as usize, rows as usize);

        let tiles = if palette.is_empty() {
            log::warn!("Empty floor palette, interior background left blank");
            Vec::new()
        } else {
            (0..columns * rows)
                .map(|_| palette.tiles[self.rng.gen_range(0..palette.tiles.len())])
                .collect()
        };

        let id = SurfaceId(self.surfaces.len() as u64);
        self.surfaces.push(TileGrid {
            columns,
            rows,
            tiles,
        });
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(w: i32, h: i32, t: i32, door: i32) -> InteriorLayout {
        InteriorLayout::new(Size::new(w, h), t, door)
    }

    fn palette() -> FloorPalette {
        FloorPalette::new(vec![TileId(0), TileId(1), TileId(2)])
    }

    fn manager(max: usize) -> InteriorManager {
        let mut config = BuildingTypeConfig::house();
        config.max_npcs = max;
        let mut m = InteriorManager::new(&config);
        m.initialize(&mut TilePaletteRenderer::new(7), &palette());
        m
    }

    /// Top-wall segments plus the door gap cover `[0, w)` exactly once.
    fn assert_top_wall_tiles(l: &InteriorLayout) {
        let w = l.interior_size.width;
        let mut coverage = vec![0u32; w as usize];
        // Side walls start below the top wall, so y == 0 picks the top row
        for wall in l.generate_walls().iter().filter(|r| r.y == 0) {
            for col in wall.left()..wall.right() {
                coverage[col as usize] += 1;
            }
        }
        let (gs, ge) = l.door_gap();
        for col in gs..ge {
            coverage[col as usize] += 1;
        }
        for (col, count) in coverage.iter().enumerate() {
            assert_eq!(*count, 1, "column {col} covered {count} times in {l:?}");
        }
    }

    #[test]
    fn anchors_derive_from_size() {
        let l = layout(800, 600, 20, 100);
        assert_eq!(l.entrance_pos, Point::new(400, 550));
        assert_eq!(l.exit_pos, Point::new(400, 50));
        assert_eq!(l.exit_zone, Rect::new(350, 20, 100, 60));
    }

    #[test]
    fn house_walls_leave_door_gap() {
        let l = layout(800, 600, 20, 100);
        let walls = l.generate_walls();
        assert_eq!(
            walls,
            vec![
                Rect::new(0, 0, 350, 20),
                Rect::new(450, 0, 350, 20),
                Rect::new(0, 580, 800, 20),
                Rect::new(0, 20, 20, 560),
                Rect::new(780, 20, 20, 560),
            ]
        );
        assert_eq!(l.door_gap(), (350, 450));
    }

    #[test]
    fn generate_walls_is_idempotent() {
        let l = layout(900, 700, 25, 120);
        assert_eq!(l.generate_walls(), l.generate_walls());
    }

    #[test]
    fn top_wall_and_gap_tile_width() {
        for (w, h, t, door) in [
            (800, 600, 20, 100),
            (900, 700, 25, 120),
            (601, 400, 20, 150),
            (120, 100, 10, 117),
            (300, 200, 15, 1),
        ] {
            assert_top_wall_tiles(&layout(w, h, t, door));
        }
    }

    #[test]
    fn walls_and_gap_tile_perimeter_ring() {
        for (w, h, t, door) in [(800, 600, 20, 100), (1200, 900, 25, 150), (61, 47, 9, 13)] {
            let l = layout(w, h, t, door);
            let walls = l.generate_walls();
            for (i, a) in walls.iter().enumerate() {
                for b in &walls[i + 1..] {
                    assert!(!a.intersects(b), "{a:?} overlaps {b:?}");
                }
            }
            let (gs, ge) = l.door_gap();
            let wall_area: i64 = walls.iter().map(Rect::area).sum();
            let gap_area = (ge - gs) as i64 * t as i64;
            let ring = (w as i64 * h as i64) - ((w - 2 * t) as i64 * (h - 2 * t) as i64);
            assert_eq!(wall_area + gap_area, ring);
        }
    }

    #[test]
    fn door_wider_than_interior_removes_top_wall() {
        let l = layout(200, 300, 20, 250);
        let walls = l.generate_walls();
        assert_eq!(l.door_gap(), (0, 200));
        assert!(walls.iter().all(|r| r.y != 0));
        assert_eq!(walls.len(), 3);
    }

    #[test]
    fn oversized_wall_thickness_is_clamped() {
        let l = layout(100, 40, 50, 10);
        let walls = l.generate_walls();
        assert!(walls.iter().all(|r| !r.is_empty()));
        for (i, a) in walls.iter().enumerate() {
            for b in &walls[i + 1..] {
                assert!(!a.intersects(b));
            }
        }
    }

    #[test]
    fn exit_range_and_offset() {
        let l = layout(800, 600, 20, 100);
        assert!(l.check_exit_range(&Rect::from_center(400, 50, 32, 32)));
        assert!(!l.check_exit_range(&Rect::from_center(400, 300, 32, 32)));
        assert_eq!(l.get_interior_offset(1024, 768), (112, 84));
        assert_eq!(l.get_interior_offset(700, 500), (-50, -50));
        assert_eq!(l.get_interior_offset(801, 600), (0, 0));
    }

    #[test]
    fn initialize_runs_once() {
        let mut config = BuildingTypeConfig::house();
        config.max_npcs = 1;
        let mut m = InteriorManager::new(&config);
        assert!(!m.is_initialized());
        let mut renderer = TilePaletteRenderer::new(1);
        assert!(m.initialize(&mut renderer, &palette()));
        assert!(m.is_initialized());
        assert_eq!(m.walls().len(), 5);
        assert_eq!(renderer.surface_count(), 1);
    }

    #[test]
    fn occupancy_never_exceeds_capacity() {
        let mut m = manager(3);
        let ops: [(bool, u32); 12] = [
            (true, 1),
            (true, 2),
            (true, 2),
            (true, 3),
            (true, 4),
            (false, 9),
            (false, 2),
            (true, 4),
            (true, 5),
            (false, 1),
            (true, 5),
            (true, 6),
        ];
        for (add, id) in ops {
            let before = m.npc_count();
            let was_full = m.is_at_capacity();
            let was_inside = m.contains_npc(NpcId(id));
            let ok = if add {
                m.add_npc(NpcId(id))
            } else {
                m.remove_npc(NpcId(id))
            };
            assert!(m.npc_count() <= 3);
            if add {
                assert_eq!(ok, !was_full && !was_inside);
            } else {
                assert_eq!(ok, was_inside);
            }
            if !ok {
                assert_eq!(m.npc_count(), before);
            }
        }
        assert_eq!(m.occupants(), &[NpcId(3), NpcId(4), NpcId(5)]);
    }

    #[test]
    fn full_interior_rejects_new_npc() {
        let mut m = manager(2);
        assert!(m.add_npc(NpcId(1)));
        assert!(m.add_npc(NpcId(2)));
        assert!(m.is_at_capacity());
        assert!(!m.add_npc(NpcId(3)));
        assert_eq!(m.npc_count(), 2);
    }

    #[test]
    fn furniture_queries() {
        let mut m = manager(3);
        let chair = m.place_furniture(FurnitureKind::Chair, 100, 100, Size::new(64, 64));
        let table = m.place_furniture(FurnitureKind::Table, 300, 100, Size::new(96, 64));
        assert_ne!(chair, table);

        let near_chair = Rect::from_center(132, 180, 32, 32);
        let hits: Vec<_> = m.get_interactable_furniture(&near_chair).iter().map(|f| f.id).collect();
        assert_eq!(hits, vec![chair]);
        assert_eq!(m.find_free_chair(), Some(chair));
        m.furniture_mut(chair).unwrap().is_occupied = true;
        assert_eq!(m.find_free_chair(), None);
        assert_eq!(m.furniture_collisions().len(), 2);
    }

    #[test]
    fn tile_renderer_is_deterministic_per_seed() {
        let size = Size::new(100, 64);
        let mut a = TilePaletteRenderer::new(42);
        let mut b = TilePaletteRenderer::new(42);
        let ia = a.render_background(size, &palette());
        let ib = b.render_background(size, &palette());
        let ga = a.surface(ia).unwrap();
        assert_eq!(ga, b.surface(ib).unwrap());
        assert_eq!((ga.columns, ga.rows), (4, 2));
        assert_eq!(ga.tiles.len(), 8);
        assert!(ga.tiles.iter().all(|t| t.0 < 3));
        assert!(ga.tile_at(4, 0).is_none());
    }

    #[test]
    fn empty_palette_yields_blank_grid() {
        let mut r = TilePaletteRenderer::new(0);
        let id = r.render_background(Size::new(64, 64), &FloorPalette::default());
        let grid = r.surface(id).unwrap();
        assert!(grid.tiles.is_empty());
        assert_eq!(grid.tile_at(0, 0), None);
    }
}
