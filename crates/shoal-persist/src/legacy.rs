use glam::Vec2;
use shoal_core::catalog::LiquidTypeCatalog;
use shoal_core::config::LiquidConfig;
use shoal_core::constants::{
    FIXED_POINT_SCALE, LIQUID_MAGMA, LIQUID_MAGMA_SLOW, LIQUID_OCEAN, LIQUID_SLIME, LIQUID_WATER,
    SUBCHUNKS_PER_SIDE, SUBCHUNK_COUNT, VERTEX_COUNT,
};
use shoal_core::grid::{subchunk_bit, subchunks};
use shoal_core::math::clamp01;
use shoal_core::types::{LiquidAttributes, LiquidCategory, LiquidTypeId};
use shoal_world::layer::{LayerData, LiquidLayer};
use shoal_world::stack::LiquidLayerStack;

use crate::cursor::{ByteReader, ByteWriter};
use crate::error::PersistError;
use crate::format::*;

/// One fixed-size legacy liquid record as stored.
#[derive(Debug, Clone)]
struct LegacyRecord {
    min_height: f32,
    max_height: f32,
    tiles: [u8; SUBCHUNK_COUNT],
    /// First four bytes of each vertex: depth + flow, or u16 UV.
    vertex_prefix: [[u8; 4]; VERTEX_COUNT],
    heights: [f32; VERTEX_COUNT],
}

impl LegacyRecord {
    fn read(reader: &mut ByteReader<'_>) -> Result<Self, PersistError> {
        let raw = reader.read_bytes(LEGACY_RECORD_SIZE)?;
        let mut fields = ByteReader::new(raw);
        let min_height = fields.read_f32()?;
        let max_height = fields.read_f32()?;

        let mut tiles = [0u8; SUBCHUNK_COUNT];
        tiles.copy_from_slice(fields.read_bytes(SUBCHUNK_COUNT)?);

        let mut vertex_prefix = [[0u8; 4]; VERTEX_COUNT];
        let mut heights = [0.0f32; VERTEX_COUNT];
        for (prefix, height) in vertex_prefix.iter_mut().zip(heights.iter_mut()) {
            prefix.copy_from_slice(fields.read_bytes(4)?);
            *height = fields.read_f32()?;
        }

        Ok(Self {
            min_height,
            max_height,
            tiles,
            vertex_prefix,
            heights,
        })
    }

    /// Category of the record from the tile types that are rendered.
    fn category(&self) -> LiquidCategory {
        let rendered = |tile_type: u8| {
            self.tiles
                .iter()
                .any(|&t| t & TILE_DONT_RENDER == 0 && t & TILE_TYPE_MASK == tile_type)
        };
        if rendered(TILE_OCEAN) {
            LiquidCategory::Ocean
        } else if rendered(TILE_SLIME) {
            LiquidCategory::Slime
        } else if rendered(TILE_RIVER) {
            LiquidCategory::Water
        } else if rendered(TILE_MAGMA) {
            LiquidCategory::Magma
        } else {
            LiquidCategory::Water
        }
    }
}

fn legacy_liquid_id(category: LiquidCategory, alternate_magma: bool) -> LiquidTypeId {
    match category {
        LiquidCategory::Water => LIQUID_WATER,
        LiquidCategory::Ocean => LIQUID_OCEAN,
        LiquidCategory::Magma if alternate_magma => LIQUID_MAGMA_SLOW,
        LiquidCategory::Magma => LIQUID_MAGMA,
        LiquidCategory::Slime => LIQUID_SLIME,
    }
}

/// Replace the stack's contents with `records` consecutive legacy records.
///
/// Each record with at least one rendered tile becomes one layer. A
/// truncated record ends the import with a warning. Returns the number of
/// records read.
pub fn decode_legacy(
    stack: &mut LiquidLayerStack,
    reader: &mut ByteReader<'_>,
    records: usize,
    catalog: &LiquidTypeCatalog,
    config: &LiquidConfig,
) -> usize {
    let _ = stack.clear_layers();
    let origin = stack.origin();
    let mut attributes = LiquidAttributes::NONE;
    let mut decoded = 0;

    for index in 0..records {
        let record = match LegacyRecord::read(reader) {
            Ok(record) => record,
            Err(e) => {
                log::warn!("Legacy liquid record {index} of {records} unreadable: {e}");
                break;
            }
        };

        let category = record.category();
        let mut vertices = LiquidLayer::grid_vertices(origin, record.max_height);
        for (i, vertex) in vertices.iter_mut().enumerate() {
            let prefix = record.vertex_prefix[i];
            vertex.position.y = record.heights[i];
            match category {
                LiquidCategory::Water | LiquidCategory::Ocean => {
                    vertex.depth = prefix[0] as f32 / FIXED_POINT_SCALE;
                }
                LiquidCategory::Magma | LiquidCategory::Slime => {
                    let u = u16::from_le_bytes([prefix[0], prefix[1]]);
                    let v = u16::from_le_bytes([prefix[2], prefix[3]]);
                    vertex.uv = Vec2::new(u as f32, v as f32) / FIXED_POINT_SCALE;
                }
            }
        }

        let mut occupancy = 0u64;
        for (x, z) in subchunks() {
            let bit = subchunk_bit(x, z);
            let tile = record.tiles[z * SUBCHUNKS_PER_SIDE + x];
            if tile & TILE_DONT_RENDER == 0 {
                occupancy |= bit;
            }
            if tile & TILE_FISHABLE != 0 {
                attributes.fishable |= bit;
            }
            if tile & TILE_FATIGUE != 0 {
                attributes.fatigue |= bit;
            }
        }

        let layer = LiquidLayer::from_data(
            origin,
            LayerData {
                liquid_id: legacy_liquid_id(category, config.alternate_magma),
                min_height: record.min_height,
                max_height: record.max_height,
                occupancy,
                vertices,
            },
            catalog,
        );
        decoded += 1;
        if layer.is_empty() {
            log::debug!("Legacy liquid record {index} has no rendered tiles");
            continue;
        }
        stack.push_layer(layer);
    }

    stack.set_attributes(attributes);
    let _ = stack.update_layers();
    log::debug!("Decoded {decoded} legacy liquid records");
    decoded
}

/// Append one legacy record per layer, magma first and river last, and set
/// the matching presence bits in `chunk_flags`. Returns the record count.
pub fn encode_legacy(
    stack: &mut LiquidLayerStack,
    writer: &mut ByteWriter,
    chunk_flags: &mut u32,
) -> usize {
    let _ = stack.cleanup();

    let mut ordered: Vec<&LiquidLayer> = stack.layers().iter().collect();
    ordered.sort_by_key(|layer| layer.category().legacy_priority());

    let attributes = stack.attributes();
    for layer in &ordered {
        let category = layer.category();
        *chunk_flags |= legacy_chunk_flag(category);

        writer.write_f32(layer.min_height());
        writer.write_f32(layer.max_height());

        let tile_type = legacy_tile_type(category);
        for (x, z) in subchunks() {
            let bit = subchunk_bit(x, z);
            let mut tile = tile_type;
            if !layer.has_subchunk(x, z) {
                tile |= TILE_DONT_RENDER;
            }
            if attributes.fishable & bit != 0 {
                tile |= TILE_FISHABLE;
            }
            if attributes.fatigue & bit != 0 {
                tile |= TILE_FATIGUE;
            }
            writer.write_u8(tile);
        }

        for vertex in layer.vertices() {
            match category {
                LiquidCategory::Water | LiquidCategory::Ocean => {
                    let depth = (clamp01(vertex.depth) * FIXED_POINT_SCALE).round() as u8;
                    writer.write_bytes(&[depth, 0, 0, 0]);
                }
                LiquidCategory::Magma | LiquidCategory::Slime => {
                    writer.write_u16((vertex.uv.x * FIXED_POINT_SCALE).round() as u16);
                    writer.write_u16((vertex.uv.y * FIXED_POINT_SCALE).round() as u16);
                }
            }
            writer.write_f32(vertex.position.y);
        }
    }

    ordered.len()
}
