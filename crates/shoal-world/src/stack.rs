use glam::Vec3;
use shoal_core::catalog::LiquidTypeCatalog;
use shoal_core::config::LiquidConfig;
use shoal_core::constants::{CHUNK_SIZE, NO_LIQUID};
use shoal_core::grid::subchunks;
use shoal_core::math::{Aabb, Frustum};
use shoal_core::types::{LiquidAttributes, LiquidTypeId};

use crate::brush::PaintBrush;
use crate::change::LiquidChange;
use crate::layer::LiquidLayer;
use crate::terrain::TerrainHeightProvider;

/// Mode flags for [`LiquidLayerStack::paint_liquid`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaintOptions {
    /// Add liquid (true) or erase it (false).
    pub add: bool,
    /// Overwrite heights of vertices that are already wet.
    pub override_height: bool,
    /// Restrict the edit to the layer of the painted liquid type.
    pub override_liquid_id: bool,
    pub opacity_factor: f32,
}

impl PaintOptions {
    pub fn add(opacity_factor: f32) -> Self {
        Self {
            add: true,
            override_height: false,
            override_liquid_id: false,
            opacity_factor,
        }
    }

    pub fn erase() -> Self {
        Self {
            add: false,
            override_height: false,
            override_liquid_id: false,
            opacity_factor: 0.0,
        }
    }

    pub fn with_override_height(mut self, enabled: bool) -> Self {
        self.override_height = enabled;
        self
    }

    pub fn with_override_liquid_id(mut self, enabled: bool) -> Self {
        self.override_liquid_id = enabled;
        self
    }
}

/// All liquid layers of one chunk plus their aggregate bounds and
/// gameplay attribute masks. Owned exclusively by its chunk.
#[derive(Debug, Clone)]
pub struct LiquidLayerStack {
    layers: Vec<LiquidLayer>,
    attributes: LiquidAttributes,
    auto_update_attributes: bool,
    min_height: f32,
    max_height: f32,
    origin: Vec3,
}

impl LiquidLayerStack {
    /// Empty stack for the chunk whose minimum corner is `origin`.
    pub fn new(origin: Vec3) -> Self {
        Self {
            layers: Vec::new(),
            attributes: LiquidAttributes::ALL,
            auto_update_attributes: true,
            min_height: 0.0,
            max_height: 0.0,
            origin,
        }
    }

    pub fn from_config(origin: Vec3, config: &LiquidConfig) -> Self {
        let mut stack = Self::new(origin);
        stack.auto_update_attributes = config.auto_update_attributes;
        stack
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn layers(&self) -> &[LiquidLayer] {
        &self.layers
    }

    pub fn layer(&self, index: usize) -> Option<&LiquidLayer> {
        self.layers.get(index)
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn min_height(&self) -> f32 {
        self.min_height
    }

    pub fn max_height(&self) -> f32 {
        self.max_height
    }

    pub fn attributes(&self) -> LiquidAttributes {
        self.attributes
    }

    /// Overwrite the attribute masks, e.g. with bytes read from disk.
    /// They survive `update_layers` only while auto-update is off.
    pub fn set_attributes(&mut self, attributes: LiquidAttributes) {
        self.attributes = attributes;
    }

    pub fn auto_update_attributes(&self) -> bool {
        self.auto_update_attributes
    }

    pub fn set_auto_update_attributes(&mut self, enabled: bool) {
        self.auto_update_attributes = enabled;
    }

    /// Append a decoded layer. Call `update_layers` once all are in.
    pub fn push_layer(&mut self, layer: LiquidLayer) {
        self.layers.push(layer);
    }

    pub fn clear_layers(&mut self) -> LiquidChange {
        if self.layers.is_empty() {
            return LiquidChange::NONE;
        }
        self.layers.clear();
        self.update_layers() | LiquidChange::ALL
    }

    pub fn has_data(&self, layer: usize) -> bool {
        layer < self.layers.len()
    }

    /// Liquid type of `layer`, or [`NO_LIQUID`] when the chunk has none.
    pub fn get_type(&self, layer: usize) -> LiquidTypeId {
        if self.layers.is_empty() {
            return NO_LIQUID;
        }
        debug_assert!(
            layer < self.layers.len(),
            "layer index {layer} out of range ({} layers)",
            self.layers.len()
        );
        self.layers.get(layer).map_or(NO_LIQUID, |l| l.liquid_id())
    }

    pub fn set_type(
        &mut self,
        layer: usize,
        liquid_id: LiquidTypeId,
        catalog: &LiquidTypeCatalog,
    ) -> LiquidChange {
        debug_assert!(
            layer < self.layers.len(),
            "layer index {layer} out of range ({} layers)",
            self.layers.len()
        );
        let Some(target) = self.layers.get_mut(layer) else {
            return LiquidChange::NONE;
        };
        let change = target.change_liquid_id(liquid_id, catalog);
        change | self.update_layers()
    }

    /// Drop layers without any occupied subchunk, then re-aggregate.
    pub fn cleanup(&mut self) -> LiquidChange {
        let before = self.layers.len();
        self.layers.retain(|layer| !layer.is_empty());
        let removed = before - self.layers.len();

        let mut change = self.update_layers();
        if removed > 0 {
            log::debug!("Removed {removed} empty liquid layer(s)");
            change |= LiquidChange::ALL;
        }
        change
    }

    /// Recompute aggregate height bounds and, unless disabled, the attribute
    /// masks from the layers.
    pub fn update_layers(&mut self) -> LiquidChange {
        let (min, max) = if self.layers.is_empty() {
            (0.0, 0.0)
        } else {
            self.layers.iter().fold(
                (f32::INFINITY, f32::NEG_INFINITY),
                |(min, max), layer| (min.min(layer.min_height()), max.max(layer.max_height())),
            )
        };
        let extents_changed = min != self.min_height || max != self.max_height;
        self.min_height = min;
        self.max_height = max;

        if self.auto_update_attributes {
            let mut attributes = LiquidAttributes::NONE;
            for layer in &self.layers {
                let bits = layer.attribute_bits();
                attributes.fishable |= bits.fishable;
                attributes.fatigue |= bits.fatigue;
            }
            self.attributes = attributes;
        }

        LiquidChange {
            extents_changed,
            needs_reupload: false,
        }
    }

    /// Paint or erase liquid under the brush, creating and removing layers
    /// as occupancy changes.
    pub fn paint_liquid(
        &mut self,
        brush: &PaintBrush,
        liquid_id: LiquidTypeId,
        options: PaintOptions,
        terrain: &dyn TerrainHeightProvider,
        catalog: &LiquidTypeCatalog,
    ) -> LiquidChange {
        let liquid_id = catalog.sanitize(liquid_id);
        let mut change = LiquidChange::NONE;

        if options.add && options.override_liquid_id && !options.override_height {
            match self.layers.iter().position(|l| l.liquid_id() == liquid_id) {
                Some(index) => {
                    let (before, rest) = self.layers.split_at_mut(index);
                    if let Some((target, after)) = rest.split_first_mut() {
                        let sources = before.iter().chain(after.iter());
                        inherit_heights(target, sources, self.origin, brush);
                    }
                }
                None => {
                    let mut layer =
                        LiquidLayer::new(self.origin, brush.center.y, liquid_id, catalog);
                    inherit_heights(&mut layer, &self.layers, self.origin, brush);
                    log::debug!("Created liquid layer {liquid_id} with inherited heights");
                    self.layers.push(layer);
                    change |= LiquidChange::ALL;
                }
            }
        }

        let mut painted = false;
        for layer in &mut self.layers {
            let matches = layer.liquid_id() == liquid_id;
            if options.add {
                // Painting one liquid with id override replaces the others.
                let add_here = matches || !options.override_liquid_id;
                change |= layer.paint(
                    brush,
                    add_here,
                    options.override_height,
                    terrain,
                    options.opacity_factor,
                );
                painted |= add_here;
            } else if matches || !options.override_liquid_id {
                change |= layer.paint(brush, false, false, terrain, options.opacity_factor);
            }
        }

        change |= self.cleanup();

        if !options.add || painted {
            return change;
        }

        let mut layer = if self.layers.len() == 1 {
            let mut seed = self.layers[0].clone();
            seed.clear();
            let _ = seed.change_liquid_id(liquid_id, catalog);
            seed
        } else {
            LiquidLayer::new(self.origin, brush.center.y, liquid_id, catalog)
        };
        let _ = layer.paint(
            brush,
            true,
            options.override_height,
            terrain,
            options.opacity_factor,
        );
        if !layer.is_empty() {
            log::debug!("Created liquid layer {}", layer.liquid_id());
            self.layers.push(layer);
            change |= LiquidChange::ALL;
        }

        change | self.update_layers()
    }

    /// Hide liquid that lies under the terrain and drop emptied layers.
    pub fn crop(&mut self, terrain: &dyn TerrainHeightProvider) -> LiquidChange {
        let mut change = LiquidChange::NONE;
        for layer in &mut self.layers {
            change |= layer.crop(terrain);
        }
        change | self.cleanup()
    }

    /// Regenerate opacity on every layer from terrain depth.
    pub fn auto_gen_opacity(
        &mut self,
        terrain: &dyn TerrainHeightProvider,
        factor: f32,
    ) -> LiquidChange {
        let mut change = LiquidChange::NONE;
        for layer in &mut self.layers {
            change |= layer.update_opacity(terrain, factor);
        }
        change | self.update_layers()
    }

    /// Bounds of the liquid in this chunk, None when there is no liquid.
    pub fn aabb(&self) -> Option<Aabb> {
        if self.layers.is_empty() {
            return None;
        }
        Some(Aabb::new(
            Vec3::new(self.origin.x, self.min_height, self.origin.z),
            Vec3::new(
                self.origin.x + CHUNK_SIZE,
                self.max_height,
                self.origin.z + CHUNK_SIZE,
            ),
        ))
    }

    pub fn is_visible(&self, frustum: &Frustum, camera: Vec3, cull_distance: f32) -> bool {
        let Some(aabb) = self.aabb() else {
            return false;
        };
        let chunk_radius = (CHUNK_SIZE * CHUNK_SIZE / 2.0).sqrt();
        let distance = (camera - aabb.center()).length() - chunk_radius;
        distance < cull_distance && frustum.intersects(&aabb)
    }
}

/// Copy heights from every other liquid under the brush into `target`.
fn inherit_heights<'a>(
    target: &mut LiquidLayer,
    sources: impl IntoIterator<Item = &'a LiquidLayer>,
    origin: Vec3,
    brush: &PaintBrush,
) {
    for source in sources {
        if source.liquid_id() == target.liquid_id() {
            continue;
        }
        for (x, z) in subchunks() {
            if brush.covers(origin, x, z) && source.has_subchunk(x, z) {
                target.copy_subchunk_height(x, z, source);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::HeightGrid;
    use glam::Mat4;
    use shoal_core::constants::{LIQUID_MAGMA, LIQUID_OCEAN, LIQUID_WATER, UNIT_SIZE};
    use shoal_core::grid::{subchunk_bit, subchunk_corners};

    fn catalog() -> LiquidTypeCatalog {
        LiquidTypeCatalog::builtin()
    }

    fn cell_brush(x: usize, z: usize, y: f32) -> PaintBrush {
        PaintBrush::new(
            Vec3::new((x as f32 + 0.5) * UNIT_SIZE, y, (z as f32 + 0.5) * UNIT_SIZE),
            0.1,
        )
    }

    fn direct() -> PaintOptions {
        PaintOptions::add(0.05)
            .with_override_liquid_id(true)
            .with_override_height(true)
    }

    /// Water at (1, 1) and magma at (5, 5).
    fn two_layer_stack(terrain: &HeightGrid) -> LiquidLayerStack {
        let mut stack = LiquidLayerStack::new(Vec3::ZERO);
        let _ = stack.paint_liquid(&cell_brush(1, 1, 10.0), LIQUID_WATER, direct(), terrain, &catalog());
        let _ = stack.paint_liquid(&cell_brush(5, 5, 20.0), LIQUID_MAGMA, direct(), terrain, &catalog());
        assert_eq!(stack.layer_count(), 2);
        stack
    }

    #[test]
    fn test_paint_on_empty_stack_creates_single_layer() {
        let terrain = HeightGrid::flat(-10.0);
        let mut stack = LiquidLayerStack::new(Vec3::ZERO);

        let change = stack.paint_liquid(
            &PaintBrush::new(Vec3::ZERO, 5.0),
            LIQUID_WATER,
            direct(),
            &terrain,
            &catalog(),
        );

        assert!(change.needs_reupload);
        assert_eq!(stack.layer_count(), 1);
        assert_eq!(stack.get_type(0), LIQUID_WATER);
        let expected = subchunk_bit(0, 0) | subchunk_bit(1, 0) | subchunk_bit(0, 1);
        assert_eq!(stack.layers()[0].occupancy(), expected);
    }

    #[test]
    fn test_erased_layer_removed_by_cleanup() {
        let terrain = HeightGrid::flat(0.0);
        let mut stack = two_layer_stack(&terrain);

        let change = stack.paint_liquid(
            &cell_brush(5, 5, 0.0),
            LIQUID_MAGMA,
            PaintOptions::erase(),
            &terrain,
            &catalog(),
        );
        assert!(change.extents_changed);
        assert_eq!(stack.layer_count(), 1);
        assert_eq!(stack.get_type(0), LIQUID_WATER);
    }

    #[test]
    fn test_cleanup_removes_emptied_layer_once() {
        let terrain = HeightGrid::flat(0.0);
        let mut stack = two_layer_stack(&terrain);
        stack.layers[1].clear();

        let _ = stack.cleanup();
        assert_eq!(stack.layer_count(), 1);
        let ids: Vec<_> = stack.layers().iter().map(|l| l.liquid_id()).collect();

        let second = stack.cleanup();
        assert!(!second.needs_reupload);
        assert_eq!(stack.layer_count(), 1);
        let again: Vec<_> = stack.layers().iter().map(|l| l.liquid_id()).collect();
        assert_eq!(ids, again);
    }

    #[test]
    fn test_erase_on_empty_stack_is_noop() {
        let terrain = HeightGrid::flat(0.0);
        let mut stack = LiquidLayerStack::new(Vec3::ZERO);
        let change = stack.paint_liquid(
            &PaintBrush::new(Vec3::ZERO, 50.0),
            LIQUID_WATER,
            PaintOptions::erase(),
            &terrain,
            &catalog(),
        );
        assert!(!change.any());
        assert!(stack.is_empty());
        assert_eq!(stack.get_type(0), NO_LIQUID);
    }

    #[test]
    fn test_add_without_id_override_paints_every_layer() {
        let terrain = HeightGrid::flat(0.0);
        let mut stack = two_layer_stack(&terrain);

        let _ = stack.paint_liquid(
            &cell_brush(3, 3, 15.0),
            LIQUID_WATER,
            PaintOptions::add(0.05),
            &terrain,
            &catalog(),
        );

        assert_eq!(stack.layer_count(), 2);
        for layer in stack.layers() {
            assert!(layer.has_subchunk(3, 3), "layer {} not painted", layer.liquid_id());
            for index in subchunk_corners(3, 3) {
                assert_eq!(layer.vertices()[index].position.y, 15.0);
            }
        }
    }

    #[test]
    fn test_id_override_replaces_other_liquid() {
        let terrain = HeightGrid::flat(0.0);
        let mut stack = two_layer_stack(&terrain);

        // Paint water over the magma cell: magma erased there, water added.
        let _ = stack.paint_liquid(&cell_brush(5, 5, 10.0), LIQUID_WATER, direct(), &terrain, &catalog());

        assert_eq!(stack.layer_count(), 1);
        let water = &stack.layers()[0];
        assert_eq!(water.liquid_id(), LIQUID_WATER);
        assert!(water.has_subchunk(1, 1));
        assert!(water.has_subchunk(5, 5));
    }

    #[test]
    fn test_new_liquid_inherits_heights() {
        let terrain = HeightGrid::flat(0.0);
        let mut stack = LiquidLayerStack::new(Vec3::ZERO);
        let _ = stack.paint_liquid(&cell_brush(2, 2, 10.0), LIQUID_WATER, direct(), &terrain, &catalog());

        let options = PaintOptions::add(0.05).with_override_liquid_id(true);
        let _ = stack.paint_liquid(&cell_brush(2, 2, 3.0), LIQUID_OCEAN, options, &terrain, &catalog());

        assert_eq!(stack.layer_count(), 1);
        let ocean = &stack.layers()[0];
        assert_eq!(ocean.liquid_id(), LIQUID_OCEAN);
        assert!(ocean.has_subchunk(2, 2));
        for index in subchunk_corners(2, 2) {
            assert_eq!(ocean.vertices()[index].position.y, 10.0);
        }
    }

    #[test]
    fn test_existing_layer_inherits_heights() {
        let terrain = HeightGrid::flat(0.0);
        let mut stack = two_layer_stack(&terrain);

        // Water under the brush at (5, 5) takes the magma heights.
        let options = PaintOptions::add(0.05).with_override_liquid_id(true);
        let _ = stack.paint_liquid(&cell_brush(5, 5, 1.0), LIQUID_WATER, options, &terrain, &catalog());

        assert_eq!(stack.layer_count(), 1);
        let water = &stack.layers()[0];
        for index in subchunk_corners(5, 5) {
            assert_eq!(water.vertices()[index].position.y, 20.0);
        }
    }

    #[test]
    fn test_fallback_clones_single_layer() {
        let terrain = HeightGrid::flat(0.0);
        let mut stack = LiquidLayerStack::new(Vec3::ZERO);
        let _ = stack.paint_liquid(&cell_brush(0, 0, 4.0), LIQUID_WATER, direct(), &terrain, &catalog());

        let _ = stack.paint_liquid(&cell_brush(7, 7, 6.0), LIQUID_MAGMA, direct(), &terrain, &catalog());

        assert_eq!(stack.layer_count(), 2);
        let magma = &stack.layers()[1];
        assert_eq!(magma.liquid_id(), LIQUID_MAGMA);
        assert_eq!(magma.occupancy(), subchunk_bit(7, 7));
        assert_eq!(stack.layers()[0].occupancy(), subchunk_bit(0, 0));
    }

    #[test]
    fn test_update_layers_aggregates_bounds() {
        let terrain = HeightGrid::flat(0.0);
        let stack = two_layer_stack(&terrain);
        let min = stack.layers().iter().map(|l| l.min_height()).fold(f32::INFINITY, f32::min);
        let max = stack
            .layers()
            .iter()
            .map(|l| l.max_height())
            .fold(f32::NEG_INFINITY, f32::max);
        assert_eq!(stack.min_height(), min);
        assert_eq!(stack.max_height(), max);
        assert_eq!(stack.min_height(), 10.0);
        assert_eq!(stack.max_height(), 20.0);
    }

    #[test]
    fn test_attributes_follow_layers() {
        let terrain = HeightGrid::flat(0.0);
        let stack = two_layer_stack(&terrain);
        let attrs = stack.attributes();
        assert_eq!(attrs.fishable, subchunk_bit(1, 1) | subchunk_bit(5, 5));
        assert_eq!(attrs.fatigue, 0);
    }

    #[test]
    fn test_attributes_preserved_without_auto_update() {
        let terrain = HeightGrid::flat(0.0);
        let mut stack = two_layer_stack(&terrain);
        stack.set_auto_update_attributes(false);
        stack.set_attributes(LiquidAttributes {
            fishable: 0xF0,
            fatigue: 0x0F,
        });
        let _ = stack.update_layers();
        assert_eq!(stack.attributes().fishable, 0xF0);
        assert_eq!(stack.attributes().fatigue, 0x0F);
    }

    #[test]
    fn test_set_type() {
        let terrain = HeightGrid::flat(0.0);
        let mut stack = two_layer_stack(&terrain);
        let change = stack.set_type(1, LIQUID_OCEAN, &catalog());
        assert!(change.needs_reupload);
        assert_eq!(stack.get_type(1), LIQUID_OCEAN);
        assert!(stack.has_data(1));
        assert!(!stack.has_data(2));
    }

    #[test]
    fn test_crop_drops_submerged_layer() {
        let mut stack = LiquidLayerStack::new(Vec3::ZERO);
        let low = HeightGrid::flat(0.0);
        let _ = stack.paint_liquid(&cell_brush(3, 3, 5.0), LIQUID_WATER, direct(), &low, &catalog());

        let high = HeightGrid::flat(50.0);
        let change = stack.crop(&high);
        assert!(change.extents_changed);
        assert!(stack.is_empty());
    }

    #[test]
    fn test_auto_gen_opacity_enables_fatigue() {
        let terrain = HeightGrid::flat(0.0);
        let mut stack = LiquidLayerStack::new(Vec3::ZERO);
        let shallow = PaintOptions {
            opacity_factor: 0.001,
            ..direct()
        };
        let _ = stack.paint_liquid(&cell_brush(4, 4, 50.0), LIQUID_OCEAN, shallow, &terrain, &catalog());
        assert_eq!(stack.attributes().fatigue, 0);

        let _ = stack.auto_gen_opacity(&terrain, 1.0);
        assert!(stack.layers()[0].fatigue_enabled());
        assert_eq!(stack.attributes().fatigue, subchunk_bit(4, 4));
    }

    #[test]
    fn test_visibility() {
        let terrain = HeightGrid::flat(0.0);
        let mut stack = LiquidLayerStack::new(Vec3::ZERO);
        let camera = Vec3::new(16.0, 40.0, 80.0);
        let proj = Mat4::perspective_rh(std::f32::consts::FRAC_PI_2, 1.0, 0.1, 2000.0);
        let view = Mat4::look_at_rh(camera, Vec3::new(16.0, 10.0, 16.0), Vec3::Y);
        let frustum = Frustum::from_view_proj(&(proj * view));

        assert!(!stack.is_visible(&frustum, camera, 1000.0));

        let _ = stack.paint_liquid(&cell_brush(4, 4, 10.0), LIQUID_WATER, direct(), &terrain, &catalog());
        assert!(stack.is_visible(&frustum, camera, 1000.0));
        assert!(!stack.is_visible(&frustum, camera, 10.0));

        let away = Mat4::look_at_rh(camera, Vec3::new(16.0, 40.0, 500.0), Vec3::Y);
        let behind = Frustum::from_view_proj(&(proj * away));
        assert!(!stack.is_visible(&behind, camera, 1000.0));
    }

    #[test]
    fn test_clear_layers() {
        let terrain = HeightGrid::flat(0.0);
        let mut stack = two_layer_stack(&terrain);
        assert!(stack.clear_layers().needs_reupload);
        assert!(stack.is_empty());
        assert_eq!(stack.min_height(), 0.0);
        assert_eq!(stack.clear_layers(), LiquidChange::NONE);
    }
}
