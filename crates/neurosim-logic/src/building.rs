//! Buildings: position, type policy, derived rectangles and the optional
//! interior.
//!
//! A building's `rect`, `hitbox` and interaction zone are only ever
//! recomputed together in [`Building::update_position`]. Interior queries
//! are safe on every building: without an interior they answer "closed".

use serde::{Deserialize, Serialize};

use crate::assets::{AssetCatalog, FloorPalette};
use crate::config::{
    BuildingCatalog, BuildingKind, BuildingTypeConfig, ConfigOverrides, HouseVariant, ShopType,
};
use crate::error::LayoutError;
use crate::furniture::FurnitureKind;
use crate::geometry::{Point, Rect, Size};
use crate::interaction::InteractionZone;
use crate::interior::{BackgroundRenderer, InteriorManager, NpcId, TilePaletteRenderer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BuildingId(pub u32);

/// Whether a building has an inside.
#[derive(Debug, Clone)]
pub enum Interior {
    NoInterior,
    HasInterior(Box<InteriorManager>),
}

impl Interior {
    pub fn manager(&self) -> Option<&InteriorManager> {
        match self {
            Interior::NoInterior => None,
            Interior::HasInterior(manager) => Some(manager),
        }
    }

    pub fn manager_mut(&mut self) -> Option<&mut InteriorManager> {
        match self {
            Interior::NoInterior => None,
            Interior::HasInterior(manager) => Some(manager),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Building {
    id: BuildingId,
    kind: BuildingKind,
    config: BuildingTypeConfig,
    position: Point,
    rect: Rect,
    hitbox: Rect,
    zone: Option<InteractionZone>,
    interior: Interior,
}

impl Building {
    /// `sprite` is the unscaled first-frame size; the config scale applies.
    pub fn new(
        id: BuildingId,
        kind: BuildingKind,
        config: BuildingTypeConfig,
        x: i32,
        y: i32,
        sprite: Size,
    ) -> Self {
        let rect = Rect::from_size(x, y, sprite.scaled(config.scale_factor()));
        let hitbox = config.hitbox_padding.apply(&rect);
        let zone = config
            .flags
            .interactive
            .then(|| InteractionZone::around(&rect, config.interaction_padding));
        let interior = if config.flags.has_interior {
            Interior::HasInterior(Box::new(InteriorManager::new(&config)))
        } else {
            Interior::NoInterior
        };
        Self {
            id,
            kind,
            config,
            position: Point::new(x, y),
            rect,
            hitbox,
            zone,
            interior,
        }
    }

    /// Build walls and background. No-op for interior-less buildings.
    pub fn initialize_interior(
        &mut self,
        renderer: &mut dyn BackgroundRenderer,
        palette: &FloorPalette,
    ) -> bool {
        match self.interior.manager_mut() {
            Some(interior) => interior.initialize(renderer, palette),
            None => false,
        }
    }

    pub fn id(&self) -> BuildingId {
        self.id
    }

    pub fn kind(&self) -> &BuildingKind {
        &self.kind
    }

    pub fn config(&self) -> &BuildingTypeConfig {
        &self.config
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn hitbox(&self) -> Rect {
        self.hitbox
    }

    pub fn interaction_zone(&self) -> Option<&InteractionZone> {
        self.zone.as_ref()
    }

    pub fn interior(&self) -> Option<&InteriorManager> {
        self.interior.manager()
    }

    pub fn interior_mut(&mut self) -> Option<&mut InteriorManager> {
        self.interior.manager_mut()
    }

    pub fn has_interior(&self) -> bool {
        matches!(self.interior, Interior::HasInterior(_))
    }

    /// The player may walk in: policy allows it and there is somewhere to go.
    pub fn can_enter(&self) -> bool {
        self.config.flags.can_enter && self.has_interior()
    }

    pub fn is_solid(&self) -> bool {
        self.config.flags.is_solid
    }

    pub fn is_interactive(&self) -> bool {
        self.config.flags.interactive
    }

    /// Move the building; rect, hitbox and zone change together.
    pub fn update_position(&mut self, x: i32, y: i32) {
        self.position = Point::new(x, y);
        self.rect = self.rect.with_top_left(x, y);
        self.hitbox = self.config.hitbox_padding.apply(&self.rect);
        if let Some(zone) = self.zone.as_mut() {
            zone.update(&self.rect);
        }
    }

    pub fn check_collision(&self, other: &Rect) -> bool {
        self.hitbox.intersects(other)
    }

    pub fn check_interaction(&self, other: &Rect) -> bool {
        self.zone.as_ref().is_some_and(|zone| zone.contains(other))
    }

    // ── Occupancy, safe on every building ──────────────────────────────

    pub fn can_npc_enter(&self) -> bool {
        self.interior().is_some_and(InteriorManager::can_add_npc)
    }

    pub fn add_npc(&mut self, npc: NpcId) -> bool {
        self.interior_mut().is_some_and(|i| i.add_npc(npc))
    }

    pub fn remove_npc(&mut self, npc: NpcId) -> bool {
        self.interior_mut().is_some_and(|i| i.remove_npc(npc))
    }

    pub fn get_npc_count(&self) -> usize {
        self.interior().map_or(0, InteriorManager::npc_count)
    }

    pub fn max_npcs(&self) -> usize {
        self.interior().map_or(0, InteriorManager::max_npcs)
    }

    pub fn is_at_capacity(&self) -> bool {
        self.interior().map_or(true, InteriorManager::is_at_capacity)
    }

    pub fn contains_npc(&self, npc: NpcId) -> bool {
        self.interior().is_some_and(|i| i.contains_npc(npc))
    }
}

/// One piece of furniture in a declarative building entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FurnitureSpec {
    pub x: i32,
    pub y: i32,
    pub furniture_type: String,
}

/// Declarative building entry, as found in layout JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingSpec {
    pub x: i32,
    pub y: i32,
    pub building_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shop_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_config: Option<ConfigOverrides>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub furniture: Vec<FurnitureSpec>,
}

impl BuildingSpec {
    pub fn new(x: i32, y: i32, building_type: &str) -> Self {
        Self {
            x,
            y,
            building_type: building_type.to_string(),
            variant: None,
            shop_type: None,
            custom_config: None,
            furniture: Vec::new(),
        }
    }

    pub fn with_variant(mut self, variant: &str) -> Self {
        self.variant = Some(variant.to_string());
        self
    }

    pub fn with_shop_type(mut self, shop_type: &str) -> Self {
        self.shop_type = Some(shop_type.to_string());
        self
    }

    pub fn with_custom_config(mut self, overrides: ConfigOverrides) -> Self {
        self.custom_config = Some(overrides);
        self
    }

    pub fn with_furniture(mut self, x: i32, y: i32, furniture_type: &str) -> Self {
        self.furniture.push(FurnitureSpec {
            x,
            y,
            furniture_type: furniture_type.to_string(),
        });
        self
    }
}

/// Parse a JSON array of building entries.
pub fn load_layout_json(json: &str) -> Result<Vec<BuildingSpec>, LayoutError> {
    let specs: Vec<BuildingSpec> = serde_json::from_str(json)?;
    if let Some(index) = specs.iter().position(|s| s.building_type.trim().is_empty()) {
        return Err(LayoutError::MissingBuildingType { index });
    }
    Ok(specs)
}

/// Turns [`BuildingSpec`]s into initialised [`Building`]s.
pub struct BuildingFactory {
    catalog: BuildingCatalog,
    assets: AssetCatalog,
    renderer: Box<dyn BackgroundRenderer>,
}

impl BuildingFactory {
    pub fn new(
        catalog: BuildingCatalog,
        assets: AssetCatalog,
        renderer: Box<dyn BackgroundRenderer>,
    ) -> Self {
        Self {
            catalog,
            assets,
            renderer,
        }
    }

    /// Built-in catalog, standard sprite sizes, seeded tile renderer.
    pub fn headless(seed: u64) -> Self {
        Self::new(
            BuildingCatalog::new(),
            AssetCatalog::standard(),
            Box::new(TilePaletteRenderer::new(seed)),
        )
    }

    pub fn catalog(&self) -> &BuildingCatalog {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut BuildingCatalog {
        &mut self.catalog
    }

    pub fn assets(&self) -> &AssetCatalog {
        &self.assets
    }

    /// Kind and policy for an entry. First match wins: house variant, shop
    /// type, custom overrides on the house base, then the plain type policy.
    pub fn resolve(&self, spec: &BuildingSpec) -> (BuildingKind, BuildingTypeConfig) {
        let kind = self.catalog.kind_for(&spec.building_type);
        let config = match (&kind, &spec.variant, &spec.shop_type, &spec.custom_config) {
            (BuildingKind::House, Some(variant), _, _) => {
                let mut config = BuildingTypeConfig::house();
                HouseVariant::parse(variant).apply(&mut config);
                config
            }
            (BuildingKind::Shop, _, Some(shop_type), _) => {
                let mut config = BuildingTypeConfig::shop();
                ShopType::parse(shop_type).apply(&mut config);
                config
            }
            (_, _, _, Some(overrides)) => {
                let mut config = BuildingTypeConfig::house();
                overrides.apply(&mut config);
                config
            }
            _ => self.catalog.config_for(&kind),
        };
        (kind, config)
    }

    pub fn build(&mut self, id: BuildingId, spec: &BuildingSpec) -> Building {
        let (kind, config) = self.resolve(spec);
        let sprite = self.assets.sprite_size(kind.key());
        let mut building = Building::new(id, kind, config, spec.x, spec.y, sprite);
        building.initialize_interior(self.renderer.as_mut(), &self.assets.floor_tiles);

        match building.interior_mut() {
            Some(interior) => {
                for item in &spec.furniture {
                    let size = self.assets.sprite_size(&item.furniture_type);
                    interior.place_furniture(FurnitureKind::parse(&item.furniture_type), item.x, item.y, size);
                }
            }
            None if !spec.furniture.is_empty() => {
                log::warn!(
                    "{} at ({}, {}) has no interior, dropping {} furniture entries",
                    spec.building_type,
                    spec.x,
                    spec.y,
                    spec.furniture.len()
                );
            }
            None => {}
        }
        building
    }
}
