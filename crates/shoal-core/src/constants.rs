//! Chunk grid sizes, liquid type ids and fixed-point scales.
//! Grid dimensions are fixed by the on-disk formats and must not change.

/// Side length of a terrain chunk in world units.
pub const CHUNK_SIZE: f32 = 533.333_3 / 16.0;

/// Subchunks along one side of a chunk.
pub const SUBCHUNKS_PER_SIDE: usize = 8;

/// Total subchunks per chunk (8×8). One occupancy bit each.
pub const SUBCHUNK_COUNT: usize = SUBCHUNKS_PER_SIDE * SUBCHUNKS_PER_SIDE;

/// Side length of one subchunk in world units.
pub const UNIT_SIZE: f32 = CHUNK_SIZE / SUBCHUNKS_PER_SIDE as f32;

/// Liquid vertices along one side of a chunk.
pub const VERTICES_PER_SIDE: usize = SUBCHUNKS_PER_SIDE + 1;

/// Total liquid vertices per layer (9×9).
pub const VERTEX_COUNT: usize = VERTICES_PER_SIDE * VERTICES_PER_SIDE;

/// Occupancy mask with every subchunk set.
pub const FULL_MASK: u64 = u64::MAX;

/// Sentinel returned when a chunk carries no liquid.
pub const NO_LIQUID: u32 = 0;

/// Built-in liquid type IDs.
pub const LIQUID_WATER: u32 = 1;
pub const LIQUID_OCEAN: u32 = 2;
pub const LIQUID_MAGMA: u32 = 3;
pub const LIQUID_SLIME: u32 = 4;

/// Alternate magma palette used when legacy tiles are imported with
/// `alternate_magma` enabled.
pub const LIQUID_MAGMA_SLOW: u32 = 7;

/// Fixed-point scale for UV coordinates and depth bytes (value / 255).
pub const FIXED_POINT_SCALE: f32 = 255.0;

/// Tolerance used when comparing depths against 1.0.
pub const DEPTH_EPSILON: f32 = 1.0e-4;
