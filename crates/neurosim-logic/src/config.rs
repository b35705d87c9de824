//! Building type policies.
//!
//! Every building carries a [`BuildingTypeConfig`] resolved from its
//! [`BuildingKind`]. Resolution never fails: an unrecognised key becomes
//! [`BuildingKind::Unknown`] and gets the default policy.
//!
//! # Built-in policies
//!
//! | Kind | Hitbox padding (w,h,x,y) | Max NPCs | Interior | Wall | Door | Flags |
//! |------|--------------------------|----------|----------|------|------|-------|
//! | house | 20,10,10,5 | 3 | 800×600 | 20 | 100 | enter, interior, solid, interactive |
//! | shop | 30,15,15,10 | 4 | 900×700 | 25 | 120 | enter, interior, solid, interactive |
//! | fountain | 0,0,0,0 | 0 | — | — | — | solid only, sprite ×2 |
//! | default | 0,0,0,0 | 3 | 800×600 | 20 | 100 | enter, interior, solid, interactive |
//!
//! ```
//! use neurosim_logic::config::{BuildingCatalog, BuildingKind};
//!
//! let catalog = BuildingCatalog::new();
//! let kind = catalog.kind_for("windmill");
//! assert_eq!(kind, BuildingKind::Unknown("windmill".into()));
//! assert!(catalog.config_for(&kind).flags.can_enter);
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::LayoutError;
use crate::geometry::{Padding, Size};

/// Closed set of building kinds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildingKind {
    House,
    Shop,
    /// Decorative: solid but never enterable.
    Fountain,
    /// A named type registered in a [`BuildingCatalog`].
    Custom(String),
    /// Anything else. Resolves to the default policy.
    Unknown(String),
}

impl BuildingKind {
    /// Map a key to a built-in kind, or `Unknown`. Catalog-registered
    /// names are resolved by [`BuildingCatalog::kind_for`] instead.
    pub fn parse(key: &str) -> Self {
        match key.trim().to_ascii_lowercase().as_str() {
            "house" => BuildingKind::House,
            "shop" => BuildingKind::Shop,
            "fountain" => BuildingKind::Fountain,
            _ => BuildingKind::Unknown(key.to_string()),
        }
    }

    /// The asset/type key this kind was created from.
    pub fn key(&self) -> &str {
        match self {
            BuildingKind::House => "house",
            BuildingKind::Shop => "shop",
            BuildingKind::Fountain => "fountain",
            BuildingKind::Custom(name) | BuildingKind::Unknown(name) => name,
        }
    }

    pub fn is_builtin(&self) -> bool {
        matches!(
            self,
            BuildingKind::House | BuildingKind::Shop | BuildingKind::Fountain
        )
    }
}

impl fmt::Display for BuildingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Behaviour switches of a building type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingFlags {
    /// The player may walk in through the interaction zone.
    pub can_enter: bool,
    /// The building owns an interior space.
    pub has_interior: bool,
    /// The exterior hitbox blocks movement.
    pub is_solid: bool,
    /// Takes part in entry/exit proximity checks.
    pub interactive: bool,
}

impl BuildingFlags {
    pub const ENTERABLE: Self = Self {
        can_enter: true,
        has_interior: true,
        is_solid: true,
        interactive: true,
    };

    pub const DECORATIVE: Self = Self {
        can_enter: false,
        has_interior: false,
        is_solid: true,
        interactive: false,
    };
}

impl Default for BuildingFlags {
    fn default() -> Self {
        Self::ENTERABLE
    }
}

/// Policy record for one building type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildingTypeConfig {
    /// Inset applied to the sprite rect to get the solid hitbox.
    pub hitbox_padding: Padding,
    /// Margin around the sprite rect for the entry trigger.
    pub interaction_padding: i32,
    /// NPC capacity of the interior.
    pub max_npcs: usize,
    pub interior_size: Size,
    pub wall_thickness: i32,
    pub door_width: i32,
    pub flags: BuildingFlags,
    /// Sprite scale factor; `None` means 1.
    pub scale: Option<f32>,
}

impl BuildingTypeConfig {
    /// Policy for unknown kinds.
    pub fn default_policy() -> Self {
        Self {
            hitbox_padding: Padding::ZERO,
            interaction_padding: 40,
            max_npcs: 3,
            interior_size: Size::new(800, 600),
            wall_thickness: 20,
            door_width: 100,
            flags: BuildingFlags::ENTERABLE,
            scale: None,
        }
    }

    pub fn house() -> Self {
        Self {
            hitbox_padding: Padding::new(20, 10, 10, 5),
            ..Self::default_policy()
        }
    }

    pub fn shop() -> Self {
        Self {
            hitbox_padding: Padding::new(30, 15, 15, 10),
            max_npcs: 4,
            interior_size: Size::new(900, 700),
            wall_thickness: 25,
            door_width: 120,
            ..Self::default_policy()
        }
    }

    pub fn fountain() -> Self {
        Self {
            max_npcs: 0,
            interior_size: Size::new(0, 0),
            wall_thickness: 0,
            door_width: 0,
            flags: BuildingFlags::DECORATIVE,
            scale: Some(2.0),
            ..Self::default_policy()
        }
    }

    pub fn scale_factor(&self) -> f32 {
        self.scale.unwrap_or(1.0)
    }
}

impl Default for BuildingTypeConfig {
    fn default() -> Self {
        Self::default_policy()
    }
}

/// Partial policy: every `Some` field replaces the base value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigOverrides {
    pub hitbox_padding: Option<Padding>,
    pub interaction_padding: Option<i32>,
    pub max_npcs: Option<usize>,
    pub interior_size: Option<Size>,
    pub wall_thickness: Option<i32>,
    pub door_width: Option<i32>,
    pub can_enter: Option<bool>,
    pub has_interior: Option<bool>,
    pub is_solid: Option<bool>,
    pub interactive: Option<bool>,
    pub scale: Option<f32>,
}

impl ConfigOverrides {
    pub fn apply(&self, config: &mut BuildingTypeConfig) {
        if let Some(v) = self.hitbox_padding {
            config.hitbox_padding = v;
        }
        if let Some(v) = self.interaction_padding {
            config.interaction_padding = v;
        }
        if let Some(v) = self.max_npcs {
            config.max_npcs = v;
        }
        if let Some(v) = self.interior_size {
            config.interior_size = v;
        }
        if let Some(v) = self.wall_thickness {
            config.wall_thickness = v;
        }
        if let Some(v) = self.door_width {
            config.door_width = v;
        }
        if let Some(v) = self.can_enter {
            config.flags.can_enter = v;
        }
        if let Some(v) = self.has_interior {
            config.flags.has_interior = v;
        }
        if let Some(v) = self.is_solid {
            config.flags.is_solid = v;
        }
        if let Some(v) = self.interactive {
            config.flags.interactive = v;
        }
        if self.scale.is_some() {
            config.scale = self.scale;
        }
    }
}

/// House size variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HouseVariant {
    Default,
    Large,
    Small,
}

impl HouseVariant {
    pub fn parse(key: &str) -> Self {
        match key.trim().to_ascii_lowercase().as_str() {
            "large" => HouseVariant::Large,
            "small" => HouseVariant::Small,
            _ => HouseVariant::Default,
        }
    }

    pub fn apply(self, config: &mut BuildingTypeConfig) {
        match self {
            HouseVariant::Default => {}
            HouseVariant::Large => {
                config.max_npcs = 5;
                config.interior_size = Size::new(1000, 800);
            }
            HouseVariant::Small => {
                config.max_npcs = 2;
                config.interior_size = Size::new(600, 400);
            }
        }
    }
}

/// Shop specialisations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShopType {
    General,
    Tavern,
    Blacksmith,
}

impl ShopType {
    pub fn parse(key: &str) -> Self {
        match key.trim().to_ascii_lowercase().as_str() {
            "tavern" => ShopType::Tavern,
            "blacksmith" => ShopType::Blacksmith,
            _ => ShopType::General,
        }
    }

    pub fn apply(self, config: &mut BuildingTypeConfig) {
        match self {
            ShopType::General => {}
            ShopType::Tavern => {
                config.max_npcs = 8;
                config.interior_size = Size::new(1200, 900);
            }
            ShopType::Blacksmith => {
                config.max_npcs = 2;
                // Wider door for hauling equipment
                config.door_width = 150;
            }
        }
    }
}

/// Built-in policies plus named custom building types.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildingCatalog {
    custom: BTreeMap<String, BuildingTypeConfig>,
}

impl BuildingCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON object of `name → policy`. Missing fields inherit the
    /// default policy.
    pub fn from_json(json: &str) -> Result<Self, LayoutError> {
        let custom: BTreeMap<String, BuildingTypeConfig> = serde_json::from_str(json)?;
        let mut catalog = Self::new();
        for (name, config) in custom {
            let size = config.interior_size;
            if config.flags.has_interior && (size.width <= 0 || size.height <= 0) {
                return Err(LayoutError::NonPositiveSize {
                    kind: name,
                    width: size.width,
                    height: size.height,
                });
            }
            catalog.register_custom(&name, config);
        }
        Ok(catalog)
    }

    /// Register a custom type. Built-in names cannot be shadowed.
    pub fn register_custom(&mut self, name: &str, config: BuildingTypeConfig) -> bool {
        if BuildingKind::parse(name).is_builtin() {
            log::warn!("Refusing to shadow built-in building type '{}'", name);
            return false;
        }
        self.custom.insert(name.to_string(), config);
        true
    }

    pub fn custom_names(&self) -> impl Iterator<Item = &str> {
        self.custom.keys().map(String::as_str)
    }

    /// Resolve a type key: built-in, then registered custom, then unknown.
    pub fn kind_for(&self, key: &str) -> BuildingKind {
        match BuildingKind::parse(key) {
            BuildingKind::Unknown(name) if self.custom.contains_key(&name) => {
                BuildingKind::Custom(name)
            }
            kind => kind,
        }
    }

    /// Policy for `kind`. Never fails.
    pub fn config_for(&self, kind: &BuildingKind) -> BuildingTypeConfig {
        match kind {
            BuildingKind::House => BuildingTypeConfig::house(),
            BuildingKind::Shop => BuildingTypeConfig::shop(),
            BuildingKind::Fountain => BuildingTypeConfig::fountain(),
            BuildingKind::Custom(name) => match self.custom.get(name) {
                Some(config) => config.clone(),
                None => {
                    log::debug!("Custom building type '{}' not registered, using default", name);
                    BuildingTypeConfig::default_policy()
                }
            },
            BuildingKind::Unknown(_) => BuildingTypeConfig::default_policy(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_keys_parse() {
        assert_eq!(BuildingKind::parse("house"), BuildingKind::House);
        assert_eq!(BuildingKind::parse("Shop"), BuildingKind::Shop);
        assert_eq!(BuildingKind::parse("fountain"), BuildingKind::Fountain);
        assert_eq!(
            BuildingKind::parse("town_hall"),
            BuildingKind::Unknown("town_hall".into())
        );
    }

    #[test]
    fn unknown_kind_gets_default_policy() {
        let catalog = BuildingCatalog::new();
        let config = catalog.config_for(&BuildingKind::Unknown("castle".into()));
        assert_eq!(config, BuildingTypeConfig::default_policy());
        assert_eq!(config.max_npcs, 3);
        assert_eq!(config.hitbox_padding, Padding::ZERO);
    }

    #[test]
    fn fountain_is_decorative() {
        let config = BuildingTypeConfig::fountain();
        assert!(config.flags.is_solid);
        assert!(!config.flags.interactive);
        assert!(!config.flags.has_interior);
        assert!(!config.flags.can_enter);
        assert_eq!(config.scale_factor(), 2.0);
    }

    #[test]
    fn custom_types_resolve_through_catalog() {
        let mut catalog = BuildingCatalog::new();
        let mut hall = BuildingTypeConfig::default_policy();
        hall.max_npcs = 12;
        assert!(catalog.register_custom("town_hall", hall));

        let kind = catalog.kind_for("town_hall");
        assert_eq!(kind, BuildingKind::Custom("town_hall".into()));
        assert_eq!(catalog.config_for(&kind).max_npcs, 12);
        assert_eq!(catalog.kind_for("house"), BuildingKind::House);
    }

    #[test]
    fn catalog_cannot_shadow_builtins() {
        let mut catalog = BuildingCatalog::new();
        assert!(!catalog.register_custom("house", BuildingTypeConfig::shop()));
        assert_eq!(catalog.config_for(&BuildingKind::House), BuildingTypeConfig::house());
    }

    #[test]
    fn catalog_from_json_fills_defaults() {
        let json = r#"{
            "food_shop": { "max_npcs": 6, "door_width": 90 },
            "statue": { "flags": { "can_enter": false, "has_interior": false,
                                   "is_solid": true, "interactive": false } }
        }"#;
        let catalog = BuildingCatalog::from_json(json).unwrap();
        let food = catalog.config_for(&catalog.kind_for("food_shop"));
        assert_eq!(food.max_npcs, 6);
        assert_eq!(food.door_width, 90);
        assert_eq!(food.interior_size, Size::new(800, 600));

        let statue = catalog.config_for(&catalog.kind_for("statue"));
        assert!(!statue.flags.interactive);
    }

    #[test]
    fn catalog_from_json_rejects_empty_interior() {
        let json = r#"{ "shed": { "interior_size": { "width": 0, "height": 300 } } }"#;
        match BuildingCatalog::from_json(json) {
            Err(LayoutError::NonPositiveSize { kind, width, .. }) => {
                assert_eq!(kind, "shed");
                assert_eq!(width, 0);
            }
            other => panic!("Expected NonPositiveSize, got {:?}", other),
        }
    }

    #[test]
    fn variants_override_base_policy() {
        let mut large = BuildingTypeConfig::house();
        HouseVariant::parse("large").apply(&mut large);
        assert_eq!(large.max_npcs, 5);
        assert_eq!(large.interior_size, Size::new(1000, 800));

        let mut smith = BuildingTypeConfig::shop();
        ShopType::parse("blacksmith").apply(&mut smith);
        assert_eq!(smith.max_npcs, 2);
        assert_eq!(smith.door_width, 150);
        assert_eq!(smith.interior_size, Size::new(900, 700));

        let mut plain = BuildingTypeConfig::house();
        HouseVariant::parse("gothic").apply(&mut plain);
        assert_eq!(plain, BuildingTypeConfig::house());
    }

    #[test]
    fn overrides_only_touch_set_fields() {
        let mut config = BuildingTypeConfig::house();
        let overrides = ConfigOverrides {
            max_npcs: Some(9),
            interactive: Some(false),
            ..Default::default()
        };
        overrides.apply(&mut config);
        assert_eq!(config.max_npcs, 9);
        assert!(!config.flags.interactive);
        assert!(config.flags.can_enter);
        assert_eq!(config.hitbox_padding, Padding::new(20, 10, 10, 5));
    }
}
