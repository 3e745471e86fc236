use glam::{Vec2, Vec3};
use shoal_core::catalog::LiquidTypeCatalog;
use shoal_core::constants::FIXED_POINT_SCALE;
use shoal_core::grid::{mask_from_bytes, mask_to_bytes, SubchunkRect};
use shoal_core::math::clamp01;
use shoal_core::types::{LiquidAttributes, LiquidCategory, VertexFormat};
use shoal_world::layer::{LayerData, LiquidLayer};
use shoal_world::stack::LiquidLayerStack;

use crate::cursor::{ByteReader, ByteWriter};
use crate::error::PersistError;
use crate::format::*;

/// Offset of the writer's end relative to `base_offset`, as stored on disk.
fn relative_offset(writer: &ByteWriter, base_offset: usize) -> Result<u32, PersistError> {
    let relative = writer.len().saturating_sub(base_offset);
    u32::try_from(relative).map_err(|_| PersistError::OffsetOverflow(relative))
}

fn sanitize_bounds(min: f32, max: f32) -> (f32, f32) {
    let min = if min.is_finite() { min } else { 0.0 };
    let max = if max.is_finite() { max } else { min };
    if min <= max {
        (min, max)
    } else {
        (max, min)
    }
}

fn to_fixed_u16(value: f32) -> u16 {
    (value * FIXED_POINT_SCALE).round() as u16
}

fn to_fixed_u8(value: f32) -> u8 {
    (clamp01(value) * FIXED_POINT_SCALE).round() as u8
}

/// Rebuild one layer from its table entry.
///
/// `bytes` is the whole tile buffer; the descriptor's offsets are resolved
/// against `base_offset`.
pub fn decode_layer(
    bytes: &[u8],
    base_offset: usize,
    descriptor: &LayerDescriptor,
    origin: Vec3,
    catalog: &LiquidTypeCatalog,
) -> Result<LiquidLayer, PersistError> {
    let liquid_id = catalog.sanitize(descriptor.liquid_id);
    let category = catalog.category(liquid_id);
    let disk_format = VertexFormat::from_raw(descriptor.vertex_format);

    let raw = descriptor.rect;
    let rect = SubchunkRect::clamped(raw.x, raw.z, raw.width, raw.height);
    if rect != raw {
        log::warn!("Liquid layer rectangle {raw:?} clamped to {rect:?}");
    }

    let occupancy = if descriptor.info_mask_offset == 0 {
        rect.full_mask()
    } else {
        let offset = base_offset + descriptor.info_mask_offset as usize;
        let mut reader = ByteReader::at(bytes, offset)?;
        rect.expand(mask_from_bytes(reader.read_bytes(rect.mask_byte_len())?))
    };

    let (min_height, max_height) = sanitize_bounds(descriptor.min_height, descriptor.max_height);
    let mut vertices = LiquidLayer::grid_vertices(origin, max_height);

    // Without vertex arrays an ocean is treated as fatigue: flat at its
    // maximum height and fully deep.
    let fatigue = category == LiquidCategory::Ocean && descriptor.heightmap_offset == 0;
    if descriptor.heightmap_offset != 0 {
        let blocks = disk_format.blocks(fatigue);
        let offset = base_offset + descriptor.heightmap_offset as usize;
        let mut reader = ByteReader::at(bytes, offset)?;

        if blocks.heights {
            for index in rect.vertex_indices() {
                let height = reader.read_f32()?;
                let height = if height.is_nan() { max_height } else { height };
                vertices[index].position.y = height.clamp(min_height, max_height);
            }
        }
        if blocks.uv {
            for index in rect.vertex_indices() {
                let u = reader.read_u16()? as f32 / FIXED_POINT_SCALE;
                let v = reader.read_u16()? as f32 / FIXED_POINT_SCALE;
                vertices[index].uv = Vec2::new(u, v);
            }
        }
        if blocks.depth {
            for index in rect.vertex_indices() {
                vertices[index].depth = reader.read_u8()? as f32 / FIXED_POINT_SCALE;
            }
        }
    }

    Ok(LiquidLayer::from_data(
        origin,
        LayerData {
            liquid_id: descriptor.liquid_id,
            min_height,
            max_height,
            occupancy,
            vertices,
        },
        catalog,
    ))
}

/// Append one layer's mask and vertex arrays and return its table entry.
/// Returns None and writes nothing for a layer without occupied subchunks.
pub fn encode_layer(
    layer: &LiquidLayer,
    writer: &mut ByteWriter,
    base_offset: usize,
) -> Result<Option<LayerDescriptor>, PersistError> {
    let Some(rect) = SubchunkRect::bounding(layer.occupancy()) else {
        return Ok(None);
    };

    let local = rect.extract(layer.occupancy());
    let info_mask_offset = if local == rect.extract(rect.full_mask()) {
        0
    } else {
        let offset = relative_offset(writer, base_offset)?;
        writer.write_bytes(&mask_to_bytes(local, rect.mask_byte_len()));
        offset
    };

    let blocks = layer.vertex_format().blocks(layer.fatigue_enabled());
    let heightmap_offset = if blocks.any() {
        relative_offset(writer, base_offset)?
    } else {
        0
    };

    let vertices = layer.vertices();
    if blocks.heights {
        for index in rect.vertex_indices() {
            writer.write_f32(vertices[index].position.y);
        }
    }
    if blocks.uv {
        for index in rect.vertex_indices() {
            writer.write_u16(to_fixed_u16(vertices[index].uv.x));
            writer.write_u16(to_fixed_u16(vertices[index].uv.y));
        }
    }
    if blocks.depth {
        for index in rect.vertex_indices() {
            writer.write_u8(to_fixed_u8(vertices[index].depth));
        }
    }

    Ok(Some(LayerDescriptor {
        liquid_id: layer.liquid_id(),
        vertex_format: layer.vertex_format().as_raw(),
        min_height: layer.min_height(),
        max_height: layer.max_height(),
        rect,
        info_mask_offset,
        heightmap_offset,
    }))
}

/// Replace the stack's contents with the liquid stored at the reader.
///
/// Only a truncated header is an error. Damaged layers are dropped with a
/// warning and layers without occupied subchunks are skipped. The reader is
/// left just past the header.
pub fn decode_stack(
    stack: &mut LiquidLayerStack,
    reader: &mut ByteReader<'_>,
    base_offset: usize,
    catalog: &LiquidTypeCatalog,
) -> Result<(), PersistError> {
    let header = reader.read_pod::<LiquidHeader>()?.le_to_native();
    let _ = stack.clear_layers();

    if header.layer_count == 0 {
        stack.set_attributes(LiquidAttributes::ALL);
        let _ = stack.update_layers();
        return Ok(());
    }

    let bytes = reader.bytes();
    let attributes = if header.attributes_offset == 0 {
        LiquidAttributes::ALL
    } else {
        let offset = base_offset + header.attributes_offset as usize;
        match ByteReader::at(bytes, offset).and_then(|mut r| r.read_pod::<AttributeBlock>()) {
            Ok(block) => block.le_to_native().into(),
            Err(e) => {
                log::warn!("Liquid attribute block unreadable, assuming all set: {e}");
                LiquidAttributes::ALL
            }
        }
    };

    let table_offset = base_offset + header.layer_table_offset as usize;
    let mut table = match ByteReader::at(bytes, table_offset) {
        Ok(table) => table,
        Err(e) => {
            log::warn!("Liquid layer table unreadable, chunk has no liquid: {e}");
            stack.set_attributes(attributes);
            let _ = stack.update_layers();
            return Ok(());
        }
    };
    for index in 0..header.layer_count {
        let descriptor = match LayerDescriptor::read(&mut table) {
            Ok(descriptor) => descriptor,
            Err(e) => {
                log::warn!(
                    "Liquid layer table ends after {index} of {} entries: {e}",
                    header.layer_count
                );
                break;
            }
        };
        match decode_layer(bytes, base_offset, &descriptor, stack.origin(), catalog) {
            Ok(layer) if layer.is_empty() => {
                log::debug!("Skipped liquid layer {index} without occupied subchunks")
            }
            Ok(layer) => stack.push_layer(layer),
            Err(e) => log::warn!("Dropped liquid layer {index}: {e}"),
        }
    }

    stack.set_attributes(attributes);
    let _ = stack.update_layers();
    log::debug!(
        "Decoded {} of {} liquid layers",
        stack.layer_count(),
        header.layer_count
    );
    Ok(())
}

/// Write the stack at the writer's end, with its header at `header_pos`.
///
/// Empty layers are removed first. Returns the number of layers written.
pub fn encode_stack(
    stack: &mut LiquidLayerStack,
    writer: &mut ByteWriter,
    base_offset: usize,
    header_pos: usize,
) -> Result<usize, PersistError> {
    let _ = stack.cleanup();
    writer.patch(header_pos, &[0u8; HEADER_SIZE]);

    if stack.is_empty() {
        return Ok(0);
    }

    let attributes_offset = relative_offset(writer, base_offset)?;
    writer.write_pod(&AttributeBlock::from(stack.attributes()).native_to_le());

    let layer_table_offset = relative_offset(writer, base_offset)?;
    let table_pos = writer.reserve_zeroed(stack.layer_count() * DESCRIPTOR_SIZE);

    let mut written = 0;
    for (index, layer) in stack.layers().iter().enumerate() {
        match encode_layer(layer, writer, base_offset)? {
            Some(descriptor) => {
                writer.patch(table_pos + written * DESCRIPTOR_SIZE, &descriptor.to_bytes());
                written += 1;
            }
            None => log::warn!("Skipped empty liquid layer {index}"),
        }
    }

    let header = LiquidHeader {
        layer_count: written as u32,
        attributes_offset,
        layer_table_offset,
    };
    writer.patch(header_pos, bytemuck::bytes_of(&header.native_to_le()));
    Ok(written)
}
