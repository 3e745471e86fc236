use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::constants::{LIQUID_WATER, NO_LIQUID};
use crate::error::CatalogError;
use crate::types::{LiquidCategory, LiquidTypeId};

/// A single liquid type definition loaded from RON data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiquidTypeDef {
    /// Stable liquid type ID as referenced by tile data. 0 is reserved.
    pub id: LiquidTypeId,
    /// Human-readable name for debug display.
    pub name: String,
    /// Behavioral class; selects vertex format and legacy encoding.
    pub category: LiquidCategory,
    /// Surface texture path handed to the renderer.
    #[serde(default)]
    pub texture: String,
    /// RGB tint (0.0–1.0 per channel).
    #[serde(default = "default_color")]
    pub color: (f32, f32, f32),
    /// Scroll speed of the surface animation.
    #[serde(default)]
    pub flow_speed: f32,
}

fn default_color() -> (f32, f32, f32) {
    (1.0, 1.0, 1.0)
}

/// Read-only liquid type table, constructed once and passed to every
/// operation that needs liquid categories.
#[derive(Debug, Clone, Default)]
pub struct LiquidTypeCatalog {
    types: HashMap<LiquidTypeId, LiquidTypeDef>,
}

impl LiquidTypeCatalog {
    /// Build a catalog, rejecting duplicate or reserved IDs.
    pub fn from_defs(defs: Vec<LiquidTypeDef>) -> Result<Self, CatalogError> {
        let mut types = HashMap::with_capacity(defs.len());
        for def in defs {
            if def.id == NO_LIQUID {
                return Err(CatalogError::ReservedLiquidId(def.name));
            }
            let id = def.id;
            if types.insert(id, def).is_some() {
                return Err(CatalogError::DuplicateLiquidId(id));
            }
        }
        Ok(Self { types })
    }

    /// Parse a RON list of liquid type definitions.
    pub fn from_ron_str(ron_str: &str) -> Result<Self, CatalogError> {
        let options = ron::Options::default();
        let defs: Vec<LiquidTypeDef> = options
            .from_str(ron_str)
            .map_err(|e| CatalogError::LiquidTypeParseError(e.to_string()))?;
        Self::from_defs(defs)
    }

    /// The four base liquids plus the slow magma palette.
    pub fn builtin() -> Self {
        let def = |id, name: &str, category, color| LiquidTypeDef {
            id,
            name: name.into(),
            category,
            texture: String::new(),
            color,
            flow_speed: 0.0,
        };
        let mut types = HashMap::new();
        for d in [
            def(1, "Water", LiquidCategory::Water, (0.2, 0.4, 0.8)),
            def(2, "Ocean", LiquidCategory::Ocean, (0.1, 0.25, 0.5)),
            def(3, "Magma", LiquidCategory::Magma, (1.0, 0.35, 0.05)),
            def(4, "Slime", LiquidCategory::Slime, (0.3, 0.8, 0.2)),
            def(7, "Slow Magma", LiquidCategory::Magma, (0.9, 0.25, 0.05)),
        ] {
            types.insert(d.id, d);
        }
        Self { types }
    }

    pub fn lookup(&self, id: LiquidTypeId) -> Option<&LiquidTypeDef> {
        self.types.get(&id)
    }

    pub fn exists(&self, id: LiquidTypeId) -> bool {
        self.types.contains_key(&id)
    }

    /// Category for `id`. Unknown IDs behave as water.
    pub fn category(&self, id: LiquidTypeId) -> LiquidCategory {
        self.lookup(id)
            .map_or(LiquidCategory::Water, |def| def.category)
    }

    /// `id` if known, otherwise the default water ID.
    pub fn sanitize(&self, id: LiquidTypeId) -> LiquidTypeId {
        if self.exists(id) {
            id
        } else {
            LIQUID_WATER
        }
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
        (id: 1, name: "Water", category: Water, texture: "water.blp"),
        (id: 2, name: "Ocean", category: Ocean, color: (0.1, 0.2, 0.5)),
        (id: 19, name: "Lava Fall", category: Magma, flow_speed: 2.5),
    ]"#;

    #[test]
    fn test_load_from_ron() {
        let catalog = LiquidTypeCatalog::from_ron_str(SAMPLE).expect("should parse");
        assert_eq!(catalog.len(), 3);
        let lava = catalog.lookup(19).expect("lava present");
        assert_eq!(lava.category, LiquidCategory::Magma);
        assert_eq!(lava.flow_speed, 2.5);
        assert_eq!(lava.color, (1.0, 1.0, 1.0));
        assert_eq!(catalog.lookup(1).map(|d| d.texture.as_str()), Some("water.blp"));
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let ron = r#"[(id: 5, name: "A", category: Water), (id: 5, name: "B", category: Ocean)]"#;
        let result = LiquidTypeCatalog::from_ron_str(ron);
        assert!(matches!(result, Err(CatalogError::DuplicateLiquidId(5))));
    }

    #[test]
    fn test_reserved_id_rejected() {
        let ron = r#"[(id: 0, name: "Nothing", category: Water)]"#;
        let result = LiquidTypeCatalog::from_ron_str(ron);
        assert!(matches!(result, Err(CatalogError::ReservedLiquidId(_))));
    }

    #[test]
    fn test_parse_error_reported() {
        let result = LiquidTypeCatalog::from_ron_str("[(id: ]");
        assert!(matches!(result, Err(CatalogError::LiquidTypeParseError(_))));
    }

    #[test]
    fn test_unknown_ids_fall_back_to_water() {
        let catalog = LiquidTypeCatalog::builtin();
        assert_eq!(catalog.sanitize(999), LIQUID_WATER);
        assert_eq!(catalog.sanitize(2), 2);
        assert_eq!(catalog.category(999), LiquidCategory::Water);
        assert_eq!(catalog.category(2), LiquidCategory::Ocean);
    }

    #[test]
    fn test_bundled_data_matches_builtin() {
        let data = include_str!("../../../data/liquid_types.ron");
        let catalog = LiquidTypeCatalog::from_ron_str(data).expect("bundled data parses");
        let builtin = LiquidTypeCatalog::builtin();
        for id in [1, 2, 3, 4, 7] {
            assert_eq!(
                catalog.lookup(id).map(|d| d.category),
                builtin.lookup(id).map(|d| d.category),
                "category mismatch for liquid {id}"
            );
        }
    }
}
