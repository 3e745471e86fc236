use glam::Vec3;
use shoal_core::catalog::LiquidTypeCatalog;
use shoal_core::config::LiquidConfig;
use shoal_core::constants::{CHUNK_SIZE, LIQUID_MAGMA, LIQUID_OCEAN, LIQUID_WATER};
use shoal_world::brush::PaintBrush;
use shoal_world::stack::{LiquidLayerStack, PaintOptions};
use shoal_world::terrain::{HeightGrid, NoiseTerrain};

/// Which liquid operation a scene times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Workload {
    /// Brush strokes across every chunk.
    Paint,
    /// Crop plus opacity regeneration against the terrain.
    Crop,
    /// Modern multi-layer encode.
    Encode,
    /// Modern multi-layer decode.
    Decode,
    /// Legacy encode followed by legacy decode.
    Legacy,
}

/// Configuration for a single benchmark scene.
pub struct SceneConfig {
    pub name: &'static str,
    pub workload: Workload,
    /// The scene covers a square of `chunks_per_side`² chunks.
    pub chunks_per_side: u32,
    pub sea_level: f32,
    pub brush_radius: f32,
}

/// Return the standard suite of benchmark scenes.
pub fn standard_scenes() -> Vec<SceneConfig> {
    let scene = |name, workload, chunks_per_side| SceneConfig {
        name,
        workload,
        chunks_per_side,
        sea_level: 0.0,
        brush_radius: CHUNK_SIZE * 0.3,
    };
    vec![
        scene("paint-16x16", Workload::Paint, 16),
        scene("crop-16x16", Workload::Crop, 16),
        scene("encode-16x16", Workload::Encode, 16),
        scene("decode-16x16", Workload::Decode, 16),
        scene("legacy-16x16", Workload::Legacy, 16),
        scene("encode-64x64", Workload::Encode, 64),
        scene("decode-64x64", Workload::Decode, 64),
    ]
}

/// Minimum corner of chunk `index` in a square of `chunks_per_side` chunks.
pub fn chunk_origin(index: u32, chunks_per_side: u32) -> Vec3 {
    let x = index % chunks_per_side;
    let z = index / chunks_per_side;
    Vec3::new(x as f32 * CHUNK_SIZE, 0.0, z as f32 * CHUNK_SIZE)
}

/// One chunk of scene data: its liquid and the terrain under it.
pub struct SceneChunk {
    pub stack: LiquidLayerStack,
    pub terrain: HeightGrid,
}

/// Flood every chunk to sea level, crop at the shoreline, and drop a magma
/// pool into every third chunk so some stacks carry two layers.
pub fn build_scene(
    config: &SceneConfig,
    terrain: &NoiseTerrain,
    catalog: &LiquidTypeCatalog,
    liquid_config: &LiquidConfig,
) -> Vec<SceneChunk> {
    let count = config.chunks_per_side * config.chunks_per_side;
    let mut chunks = Vec::with_capacity(count as usize);

    for index in 0..count {
        let origin = chunk_origin(index, config.chunks_per_side);
        let grid = terrain.sample_chunk(origin);
        let mut stack = LiquidLayerStack::from_config(origin, liquid_config);
        let center = origin + Vec3::new(CHUNK_SIZE * 0.5, config.sea_level, CHUNK_SIZE * 0.5);

        let flood = PaintBrush::new(center, CHUNK_SIZE);
        let _ = stack.paint_liquid(
            &flood,
            LIQUID_OCEAN,
            PaintOptions::add(liquid_config.opacity_factor),
            &grid,
            catalog,
        );
        let _ = stack.crop(&grid);

        if index % 3 == 0 {
            let pool = PaintBrush::new(center + Vec3::Y * 2.0, config.brush_radius);
            let options = PaintOptions::add(liquid_config.opacity_factor)
                .with_override_liquid_id(true)
                .with_override_height(true);
            let _ = stack.paint_liquid(&pool, LIQUID_MAGMA, options, &grid, catalog);
        }

        chunks.push(SceneChunk {
            stack,
            terrain: grid,
        });
    }

    chunks
}

/// Brush stamps along the chunk diagonal used by the paint workload.
pub fn stroke(origin: Vec3, height: f32, radius: f32) -> Vec<PaintBrush> {
    (0..8)
        .map(|step| {
            let t = (step as f32 + 0.5) / 8.0;
            let pos = origin + Vec3::new(t * CHUNK_SIZE, height, t * CHUNK_SIZE);
            PaintBrush::new(pos, radius)
        })
        .collect()
}

/// Liquid painted by the paint workload on stroke `index`.
pub fn stroke_liquid(index: usize) -> u32 {
    if index % 2 == 0 {
        LIQUID_WATER
    } else {
        LIQUID_OCEAN
    }
}
