use shoal_core::constants::{SUBCHUNK_COUNT, VERTEX_COUNT};
use shoal_core::grid::SubchunkRect;
use shoal_core::types::{LiquidAttributes, LiquidCategory, LiquidTypeId};

use crate::cursor::{ByteReader, ByteWriter};
use crate::error::PersistError;

/// Size of the per-chunk liquid header in bytes.
pub const HEADER_SIZE: usize = 12;

/// Size of the fishable/fatigue attribute block in bytes.
pub const ATTRIBUTES_SIZE: usize = 16;

/// Size of one layer table entry in bytes.
pub const DESCRIPTOR_SIZE: usize = 26;

/// Bytes per legacy vertex: 4 bytes of depth/flow or UV, then f32 height.
pub const LEGACY_VERTEX_SIZE: usize = 8;

/// Size of one legacy liquid record in bytes.
pub const LEGACY_RECORD_SIZE: usize = 8 + SUBCHUNK_COUNT + VERTEX_COUNT * LEGACY_VERTEX_SIZE;

// Legacy tile byte layout
pub const TILE_TYPE_MASK: u8 = 0x07;
pub const TILE_RIVER: u8 = 0;
pub const TILE_OCEAN: u8 = 1;
pub const TILE_MAGMA: u8 = 2;
pub const TILE_SLIME: u8 = 3;
pub const TILE_DONT_RENDER: u8 = 0x08;
pub const TILE_FISHABLE: u8 = 0x40;
pub const TILE_FATIGUE: u8 = 0x80;

// Chunk flag bits announcing which legacy liquids a chunk carries
pub const CHUNK_FLAG_RIVER: u32 = 0x04;
pub const CHUNK_FLAG_OCEAN: u32 = 0x08;
pub const CHUNK_FLAG_MAGMA: u32 = 0x10;
pub const CHUNK_FLAG_SLIME: u32 = 0x20;

/// Liquid header. 12 bytes, repr(C) for byte-level serialization.
///
/// Offsets are relative to the container's base offset; a zero
/// `attributes_offset` means no attribute block was stored.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LiquidHeader {
    pub layer_count: u32,
    pub attributes_offset: u32,
    pub layer_table_offset: u32,
}

impl LiquidHeader {
    pub fn le_to_native(self) -> Self {
        Self {
            layer_count: u32::from_le(self.layer_count),
            attributes_offset: u32::from_le(self.attributes_offset),
            layer_table_offset: u32::from_le(self.layer_table_offset),
        }
    }

    pub fn native_to_le(self) -> Self {
        Self {
            layer_count: self.layer_count.to_le(),
            attributes_offset: self.attributes_offset.to_le(),
            layer_table_offset: self.layer_table_offset.to_le(),
        }
    }
}

/// Fishable and fatigue masks, bit `z * 8 + x`. 16 bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct AttributeBlock {
    pub fishable: u64,
    pub fatigue: u64,
}

impl AttributeBlock {
    pub fn le_to_native(self) -> Self {
        Self {
            fishable: u64::from_le(self.fishable),
            fatigue: u64::from_le(self.fatigue),
        }
    }

    pub fn native_to_le(self) -> Self {
        Self {
            fishable: self.fishable.to_le(),
            fatigue: self.fatigue.to_le(),
        }
    }
}

impl From<AttributeBlock> for LiquidAttributes {
    fn from(block: AttributeBlock) -> Self {
        Self {
            fishable: block.fishable,
            fatigue: block.fatigue,
        }
    }
}

impl From<LiquidAttributes> for AttributeBlock {
    fn from(attributes: LiquidAttributes) -> Self {
        Self {
            fishable: attributes.fishable,
            fatigue: attributes.fatigue,
        }
    }
}

/// One layer table entry.
///
/// The on-disk record is 26 bytes with an f32 at offset 6, so it is read
/// field by field rather than as a Pod struct.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerDescriptor {
    pub liquid_id: LiquidTypeId,
    /// Raw vertex format value as stored.
    pub vertex_format: u16,
    pub min_height: f32,
    pub max_height: f32,
    pub rect: SubchunkRect,
    /// 0 when the rectangle is fully occupied.
    pub info_mask_offset: u32,
    /// 0 when no vertex arrays are stored.
    pub heightmap_offset: u32,
}

impl LayerDescriptor {
    pub fn read(reader: &mut ByteReader<'_>) -> Result<Self, PersistError> {
        let raw = reader.read_bytes(DESCRIPTOR_SIZE)?;
        let mut fields = ByteReader::new(raw);
        Ok(Self {
            liquid_id: fields.read_u32()?,
            vertex_format: fields.read_u16()?,
            min_height: fields.read_f32()?,
            max_height: fields.read_f32()?,
            rect: SubchunkRect {
                x: fields.read_u8()?,
                z: fields.read_u8()?,
                width: fields.read_u8()?,
                height: fields.read_u8()?,
            },
            info_mask_offset: fields.read_u32()?,
            heightmap_offset: fields.read_u32()?,
        })
    }

    pub fn to_bytes(&self) -> [u8; DESCRIPTOR_SIZE] {
        let mut writer = ByteWriter::new();
        writer.write_u32(self.liquid_id);
        writer.write_u16(self.vertex_format);
        writer.write_f32(self.min_height);
        writer.write_f32(self.max_height);
        writer.write_u8(self.rect.x);
        writer.write_u8(self.rect.z);
        writer.write_u8(self.rect.width);
        writer.write_u8(self.rect.height);
        writer.write_u32(self.info_mask_offset);
        writer.write_u32(self.heightmap_offset);

        let mut out = [0u8; DESCRIPTOR_SIZE];
        out.copy_from_slice(writer.as_slice());
        out
    }
}

/// Legacy tile type for a liquid category.
pub fn legacy_tile_type(category: LiquidCategory) -> u8 {
    match category {
        LiquidCategory::Water => TILE_RIVER,
        LiquidCategory::Ocean => TILE_OCEAN,
        LiquidCategory::Magma => TILE_MAGMA,
        LiquidCategory::Slime => TILE_SLIME,
    }
}

/// Chunk flag bit announcing a legacy layer of `category`.
pub fn legacy_chunk_flag(category: LiquidCategory) -> u32 {
    match category {
        LiquidCategory::Water => CHUNK_FLAG_RIVER,
        LiquidCategory::Ocean => CHUNK_FLAG_OCEAN,
        LiquidCategory::Magma => CHUNK_FLAG_MAGMA,
        LiquidCategory::Slime => CHUNK_FLAG_SLIME,
    }
}
