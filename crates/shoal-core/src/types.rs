use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Liquid type identifier as stored on disk and in the catalog.
pub type LiquidTypeId = u32;

/// One liquid grid vertex.
///
/// `depth` doubles as render opacity: 0.0 = transparent shallows,
/// 1.0 = fully opaque deep liquid.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vertex {
    pub position: Vec3,
    pub depth: f32,
    pub uv: Vec2,
}

/// Behavioral class of a liquid type. Selects the vertex format and the
/// legacy encoding path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LiquidCategory {
    Water,
    Ocean,
    Magma,
    Slime,
}

impl LiquidCategory {
    /// Vertex format a layer of this category is stored with.
    pub fn vertex_format(self) -> VertexFormat {
        match self {
            LiquidCategory::Water => VertexFormat::HeightDepth,
            LiquidCategory::Ocean => VertexFormat::DepthOnly,
            LiquidCategory::Magma | LiquidCategory::Slime => VertexFormat::HeightUv,
        }
    }

    /// Ordering key for legacy emission: magma first, river/water last.
    pub fn legacy_priority(self) -> u8 {
        match self {
            LiquidCategory::Magma => 0,
            LiquidCategory::Slime => 1,
            LiquidCategory::Ocean => 2,
            LiquidCategory::Water => 3,
        }
    }
}

/// Which optional per-vertex arrays a layer carries on disk.
///
/// Stored as u16: 0 = HeightDepth, 1 = HeightUv, 2 = DepthOnly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u16)]
pub enum VertexFormat {
    #[default]
    HeightDepth = 0,
    HeightUv = 1,
    DepthOnly = 2,
}

impl VertexFormat {
    /// Decode the on-disk value. Unknown values fall back to HeightDepth.
    pub fn from_raw(raw: u16) -> Self {
        match raw {
            1 => VertexFormat::HeightUv,
            2 => VertexFormat::DepthOnly,
            _ => VertexFormat::HeightDepth,
        }
    }

    pub fn as_raw(self) -> u16 {
        self as u16
    }

    /// Which arrays follow the heightmap offset for this format.
    ///
    /// A fatigue ocean implies depth 1.0 everywhere and omits the depth
    /// array; a depth-only fatigue layer omits heights as well.
    pub fn blocks(self, fatigue: bool) -> VertexBlocks {
        VertexBlocks {
            heights: matches!(self, VertexFormat::HeightDepth | VertexFormat::HeightUv) || !fatigue,
            uv: self == VertexFormat::HeightUv,
            depth: matches!(self, VertexFormat::HeightDepth | VertexFormat::DepthOnly) && !fatigue,
        }
    }
}

/// Presence flags for the per-vertex arrays of one layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexBlocks {
    pub heights: bool,
    pub uv: bool,
    pub depth: bool,
}

impl VertexBlocks {
    pub fn any(self) -> bool {
        self.heights || self.uv || self.depth
    }
}

/// Per-subchunk gameplay attribute masks (bit z*8+x).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiquidAttributes {
    pub fishable: u64,
    pub fatigue: u64,
}

impl LiquidAttributes {
    /// All bits set. Used when a tile carries no attribute block.
    pub const ALL: Self = Self {
        fishable: u64::MAX,
        fatigue: u64::MAX,
    };

    pub const NONE: Self = Self {
        fishable: 0,
        fatigue: 0,
    };
}

impl Default for LiquidAttributes {
    fn default() -> Self {
        Self::ALL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_formats() {
        assert_eq!(LiquidCategory::Water.vertex_format(), VertexFormat::HeightDepth);
        assert_eq!(LiquidCategory::Ocean.vertex_format(), VertexFormat::DepthOnly);
        assert_eq!(LiquidCategory::Magma.vertex_format(), VertexFormat::HeightUv);
        assert_eq!(LiquidCategory::Slime.vertex_format(), VertexFormat::HeightUv);
    }

    #[test]
    fn test_vertex_format_raw() {
        for format in [
            VertexFormat::HeightDepth,
            VertexFormat::HeightUv,
            VertexFormat::DepthOnly,
        ] {
            assert_eq!(VertexFormat::from_raw(format.as_raw()), format);
        }
        assert_eq!(VertexFormat::from_raw(42), VertexFormat::HeightDepth);
    }

    #[test]
    fn test_blocks_without_fatigue() {
        let hd = VertexFormat::HeightDepth.blocks(false);
        assert!(hd.heights && hd.depth && !hd.uv);

        let huv = VertexFormat::HeightUv.blocks(false);
        assert!(huv.heights && huv.uv && !huv.depth);

        let depth_only = VertexFormat::DepthOnly.blocks(false);
        assert!(depth_only.heights && depth_only.depth && !depth_only.uv);
    }

    #[test]
    fn test_fatigue_suppresses_blocks() {
        let depth_only = VertexFormat::DepthOnly.blocks(true);
        assert!(!depth_only.any());

        let hd = VertexFormat::HeightDepth.blocks(true);
        assert!(hd.heights);
        assert!(!hd.depth);
    }

    #[test]
    fn test_legacy_priority_order() {
        let mut cats = [
            LiquidCategory::Water,
            LiquidCategory::Ocean,
            LiquidCategory::Slime,
            LiquidCategory::Magma,
        ];
        cats.sort_by_key(|c| c.legacy_priority());
        assert_eq!(
            cats,
            [
                LiquidCategory::Magma,
                LiquidCategory::Slime,
                LiquidCategory::Ocean,
                LiquidCategory::Water,
            ]
        );
    }
}
