use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// Tunables for liquid editing and import, loaded from RON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiquidConfig {
    /// Recompute fishable/fatigue masks from layers instead of keeping the
    /// bytes read from disk.
    #[serde(default = "default_true")]
    pub auto_update_attributes: bool,
    /// Import legacy magma tiles with the slow magma palette.
    #[serde(default)]
    pub alternate_magma: bool,
    /// Scale applied to liquid-over-terrain distance when generating opacity.
    #[serde(default = "default_opacity_factor")]
    pub opacity_factor: f32,
    /// Distance beyond which liquid is not drawn.
    #[serde(default = "default_cull_distance")]
    pub cull_distance: f32,
}

fn default_true() -> bool {
    true
}

fn default_opacity_factor() -> f32 {
    0.0337
}

fn default_cull_distance() -> f32 {
    1000.0
}

impl Default for LiquidConfig {
    fn default() -> Self {
        Self {
            auto_update_attributes: true,
            alternate_magma: false,
            opacity_factor: default_opacity_factor(),
            cull_distance: default_cull_distance(),
        }
    }
}

impl LiquidConfig {
    pub fn from_ron_str(ron_str: &str) -> Result<Self, CatalogError> {
        let options = ron::Options::default();
        options
            .from_str(ron_str)
            .map_err(|e| CatalogError::ConfigParseError(e.to_string()))
    }
}
