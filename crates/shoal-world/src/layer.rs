use glam::{Vec2, Vec3};
use shoal_core::catalog::LiquidTypeCatalog;
use shoal_core::constants::{DEPTH_EPSILON, UNIT_SIZE, VERTEX_COUNT, VERTICES_PER_SIDE};
use shoal_core::grid::{subchunk_bit, subchunk_corners, subchunks, vertex_touches_mask};
use shoal_core::math::clamp01;
use shoal_core::types::{LiquidAttributes, LiquidCategory, LiquidTypeId, Vertex, VertexFormat};

use crate::brush::PaintBrush;
use crate::change::LiquidChange;
use crate::terrain::TerrainHeightProvider;

/// Raw layer contents as reconstructed by a decoder.
#[derive(Debug, Clone)]
pub struct LayerData {
    pub liquid_id: LiquidTypeId,
    pub min_height: f32,
    pub max_height: f32,
    pub occupancy: u64,
    pub vertices: [Vertex; VERTEX_COUNT],
}

/// One contiguous liquid surface of a single liquid type over a chunk.
///
/// Occupancy bit `z * 8 + x` is set iff liquid is visible in subchunk
/// (x, z). Vertex positions are in world space.
#[derive(Debug, Clone, PartialEq)]
pub struct LiquidLayer {
    liquid_id: LiquidTypeId,
    category: LiquidCategory,
    vertex_format: VertexFormat,
    min_height: f32,
    max_height: f32,
    occupancy: u64,
    vertices: [Vertex; VERTEX_COUNT],
    origin: Vec3,
    fatigue_enabled: bool,
}

impl LiquidLayer {
    /// Empty layer with every vertex at `height`.
    pub fn new(
        origin: Vec3,
        height: f32,
        liquid_id: LiquidTypeId,
        catalog: &LiquidTypeCatalog,
    ) -> Self {
        let liquid_id = catalog.sanitize(liquid_id);
        let category = catalog.category(liquid_id);
        let mut layer = Self {
            liquid_id,
            category,
            vertex_format: category.vertex_format(),
            min_height: height,
            max_height: height,
            occupancy: 0,
            vertices: Self::grid_vertices(origin, height),
            origin,
            fatigue_enabled: false,
        };
        layer.update_fatigue();
        layer
    }

    /// Build a layer from decoded data. Unknown liquid IDs become water and
    /// the vertex format follows the catalog category.
    pub fn from_data(origin: Vec3, data: LayerData, catalog: &LiquidTypeCatalog) -> Self {
        if !catalog.exists(data.liquid_id) {
            log::warn!(
                "Unknown liquid type {} replaced with water",
                data.liquid_id
            );
        }
        let liquid_id = catalog.sanitize(data.liquid_id);
        let category = catalog.category(liquid_id);
        let mut layer = Self {
            liquid_id,
            category,
            vertex_format: category.vertex_format(),
            min_height: data.min_height,
            max_height: data.max_height,
            occupancy: data.occupancy,
            vertices: data.vertices,
            origin,
            fatigue_enabled: false,
        };
        layer.update_fatigue();
        layer
    }

    /// Flat 9×9 vertex grid at `height` with depth 1.0 and per-vertex UVs.
    pub fn grid_vertices(origin: Vec3, height: f32) -> [Vertex; VERTEX_COUNT] {
        std::array::from_fn(|i| {
            let x = (i % VERTICES_PER_SIDE) as f32;
            let z = (i / VERTICES_PER_SIDE) as f32;
            Vertex {
                position: Vec3::new(origin.x + x * UNIT_SIZE, height, origin.z + z * UNIT_SIZE),
                depth: 1.0,
                uv: Vec2::new(x, z),
            }
        })
    }

    pub fn liquid_id(&self) -> LiquidTypeId {
        self.liquid_id
    }

    pub fn category(&self) -> LiquidCategory {
        self.category
    }

    pub fn vertex_format(&self) -> VertexFormat {
        self.vertex_format
    }

    pub fn min_height(&self) -> f32 {
        self.min_height
    }

    pub fn max_height(&self) -> f32 {
        self.max_height
    }

    pub fn occupancy(&self) -> u64 {
        self.occupancy
    }

    pub fn vertices(&self) -> &[Vertex; VERTEX_COUNT] {
        &self.vertices
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn fatigue_enabled(&self) -> bool {
        self.fatigue_enabled
    }

    pub fn is_empty(&self) -> bool {
        self.occupancy == 0
    }

    pub fn has_subchunk(&self, x: usize, z: usize) -> bool {
        self.occupancy & subchunk_bit(x, z) != 0
    }

    pub fn set_subchunk(&mut self, x: usize, z: usize, enabled: bool) {
        if enabled {
            self.occupancy |= subchunk_bit(x, z);
        } else {
            self.occupancy &= !subchunk_bit(x, z);
        }
    }

    /// Remove all occupancy. Vertex data stays as a seed for later painting.
    pub fn clear(&mut self) {
        self.occupancy = 0;
    }

    /// Toggle occupancy under the brush and, when adding, raise the covered
    /// corners to the brush surface.
    ///
    /// Corners already touching wet subchunks keep their height unless
    /// `override_height` is set.
    pub fn paint(
        &mut self,
        brush: &PaintBrush,
        add: bool,
        override_height: bool,
        terrain: &dyn TerrainHeightProvider,
        opacity_factor: f32,
    ) -> LiquidChange {
        let wet = self.occupancy;
        let mut touched = false;

        for (x, z) in subchunks() {
            if !brush.covers(self.origin, x, z) {
                continue;
            }
            touched = true;

            if add {
                for index in subchunk_corners(x, z) {
                    let (vx, vz) = (index % VERTICES_PER_SIDE, index / VERTICES_PER_SIDE);
                    if override_height || !vertex_touches_mask(wet, vx, vz) {
                        let vertex = &mut self.vertices[index];
                        vertex.position.y = brush.surface_height(vertex.position);
                    }
                }
            }
            self.set_subchunk(x, z, add);
        }

        if !touched {
            return LiquidChange::NONE;
        }

        let bounds_changed = self.update_min_max();
        let _ = self.update_opacity(terrain, opacity_factor);
        LiquidChange {
            extents_changed: bounds_changed || wet != self.occupancy,
            needs_reupload: true,
        }
    }

    /// Hide subchunks that lie completely under the terrain.
    pub fn crop(&mut self, terrain: &dyn TerrainHeightProvider) -> LiquidChange {
        let before = self.occupancy;

        if self.max_height < terrain.min_height() {
            self.occupancy = 0;
        } else {
            for (x, z) in subchunks() {
                if !self.has_subchunk(x, z) {
                    continue;
                }
                let submerged = subchunk_corners(x, z).iter().all(|&index| {
                    let (vx, vz) = (index % VERTICES_PER_SIDE, index / VERTICES_PER_SIDE);
                    self.vertices[index].position.y < terrain.height_at(vx, vz)
                });
                if submerged {
                    self.set_subchunk(x, z, false);
                }
            }
        }

        if before == self.occupancy {
            return LiquidChange::NONE;
        }
        log::debug!(
            "Cropped liquid {}: {} -> {} subchunks",
            self.liquid_id,
            before.count_ones(),
            self.occupancy.count_ones()
        );
        self.update_min_max();
        self.update_fatigue();
        LiquidChange::ALL
    }

    /// Recompute per-vertex opacity from the liquid's height above terrain.
    pub fn update_opacity(
        &mut self,
        terrain: &dyn TerrainHeightProvider,
        factor: f32,
    ) -> LiquidChange {
        let mut changed = false;
        for (index, vertex) in self.vertices.iter_mut().enumerate() {
            let (x, z) = (index % VERTICES_PER_SIDE, index / VERTICES_PER_SIDE);
            let diff = vertex.position.y - terrain.height_at(x, z);
            let depth = if diff < 0.0 {
                0.0
            } else {
                clamp01((diff + 1.0) * factor)
            };
            changed |= depth != vertex.depth;
            vertex.depth = depth;
        }
        self.update_fatigue();
        if changed {
            LiquidChange::REUPLOAD
        } else {
            LiquidChange::NONE
        }
    }

    /// Copy the four corner heights of subchunk (x, z) from `source` and mark
    /// the subchunk occupied, so a following paint keeps them.
    pub fn copy_subchunk_height(&mut self, x: usize, z: usize, source: &LiquidLayer) {
        for index in subchunk_corners(x, z) {
            self.vertices[index].position.y = source.vertices[index].position.y;
        }
        self.set_subchunk(x, z, true);
    }

    /// Retype the layer. Vertex data is untouched; callers recompute opacity
    /// and bounds afterwards.
    pub fn change_liquid_id(
        &mut self,
        liquid_id: LiquidTypeId,
        catalog: &LiquidTypeCatalog,
    ) -> LiquidChange {
        let liquid_id = catalog.sanitize(liquid_id);
        if liquid_id == self.liquid_id {
            return LiquidChange::NONE;
        }
        self.liquid_id = liquid_id;
        self.category = catalog.category(liquid_id);
        self.vertex_format = self.category.vertex_format();
        self.update_fatigue();
        LiquidChange::REUPLOAD
    }

    /// True iff this is ocean and every occupied corner is at full depth.
    pub fn check_fatigue(&self) -> bool {
        self.category == LiquidCategory::Ocean
            && subchunks()
                .filter(|&(x, z)| self.has_subchunk(x, z))
                .all(|(x, z)| self.subchunk_is_deep(x, z))
    }

    /// Fishable and fatigue bits this layer contributes to its stack.
    pub fn attribute_bits(&self) -> LiquidAttributes {
        let mut fatigue = 0u64;
        if self.category == LiquidCategory::Ocean {
            for (x, z) in subchunks() {
                if self.has_subchunk(x, z) && self.subchunk_is_deep(x, z) {
                    fatigue |= subchunk_bit(x, z);
                }
            }
        }
        LiquidAttributes {
            fishable: self.occupancy,
            fatigue,
        }
    }

    /// Recompute min/max over the corners of occupied subchunks.
    /// Returns true when either bound moved.
    pub fn update_min_max(&mut self) -> bool {
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        for (x, z) in subchunks() {
            if !self.has_subchunk(x, z) {
                continue;
            }
            for index in subchunk_corners(x, z) {
                let y = self.vertices[index].position.y;
                min = min.min(y);
                max = max.max(y);
            }
        }
        if min > max {
            return false;
        }
        let changed = min != self.min_height || max != self.max_height;
        self.min_height = min;
        self.max_height = max;
        changed
    }

    fn update_fatigue(&mut self) {
        self.fatigue_enabled = self.check_fatigue();
    }

    fn subchunk_is_deep(&self, x: usize, z: usize) -> bool {
        subchunk_corners(x, z)
            .iter()
            .all(|&index| self.vertices[index].depth >= 1.0 - DEPTH_EPSILON)
    }
}
