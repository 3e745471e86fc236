//! Subchunk grid addressing and occupancy mask helpers.
//!
//! Chunk masks are u64 with bit `z * 8 + x`. Rectangle-local masks (the
//! on-disk form) are row-major inside the rectangle with bit `z * width + x`,
//! serialized LSB-first.

use crate::constants::{SUBCHUNKS_PER_SIDE, VERTICES_PER_SIDE};

/// Bit for subchunk (x, z) in a chunk occupancy mask.
#[inline]
pub fn subchunk_bit(x: usize, z: usize) -> u64 {
    debug_assert!(x < SUBCHUNKS_PER_SIDE && z < SUBCHUNKS_PER_SIDE);
    1u64 << (z * SUBCHUNKS_PER_SIDE + x)
}

/// Index into the 9×9 vertex array.
#[inline]
pub fn vertex_index(x: usize, z: usize) -> usize {
    debug_assert!(x < VERTICES_PER_SIDE && z < VERTICES_PER_SIDE);
    z * VERTICES_PER_SIDE + x
}

/// Vertex indices of the four corners of subchunk (x, z).
#[inline]
pub fn subchunk_corners(x: usize, z: usize) -> [usize; 4] {
    let id = vertex_index(x, z);
    [
        id,
        id + 1,
        id + VERTICES_PER_SIDE,
        id + VERTICES_PER_SIDE + 1,
    ]
}

/// Iterate all (x, z) subchunk coordinates in row-major order.
pub fn subchunks() -> impl Iterator<Item = (usize, usize)> {
    (0..SUBCHUNKS_PER_SIDE).flat_map(|z| (0..SUBCHUNKS_PER_SIDE).map(move |x| (x, z)))
}

/// Whether vertex (x, z) is a corner of any subchunk set in `mask`.
pub fn vertex_touches_mask(mask: u64, x: usize, z: usize) -> bool {
    let max = SUBCHUNKS_PER_SIDE - 1;
    for sz in z.saturating_sub(1)..=z.min(max) {
        for sx in x.saturating_sub(1)..=x.min(max) {
            if mask & subchunk_bit(sx, sz) != 0 {
                return true;
            }
        }
    }
    false
}

/// A rectangle of subchunks inside the 8×8 grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubchunkRect {
    pub x: u8,
    pub z: u8,
    pub width: u8,
    pub height: u8,
}

impl SubchunkRect {
    pub const FULL: Self = Self {
        x: 0,
        z: 0,
        width: SUBCHUNKS_PER_SIDE as u8,
        height: SUBCHUNKS_PER_SIDE as u8,
    };

    /// Build a rectangle, clamping it into the 8×8 grid.
    pub fn clamped(x: u8, z: u8, width: u8, height: u8) -> Self {
        let side = SUBCHUNKS_PER_SIDE as u8;
        let x = x.min(side);
        let z = z.min(side);
        Self {
            x,
            z,
            width: width.min(side - x),
            height: height.min(side - z),
        }
    }

    /// Tight bounding rectangle of the set bits. None for an empty mask.
    pub fn bounding(mask: u64) -> Option<Self> {
        if mask == 0 {
            return None;
        }
        let (mut min_x, mut min_z) = (SUBCHUNKS_PER_SIDE, SUBCHUNKS_PER_SIDE);
        let (mut max_x, mut max_z) = (0, 0);
        for (x, z) in subchunks() {
            if mask & subchunk_bit(x, z) != 0 {
                min_x = min_x.min(x);
                min_z = min_z.min(z);
                max_x = max_x.max(x);
                max_z = max_z.max(z);
            }
        }
        Some(Self {
            x: min_x as u8,
            z: min_z as u8,
            width: (max_x - min_x + 1) as u8,
            height: (max_z - min_z + 1) as u8,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Bytes needed for the rectangle-local occupancy mask.
    pub fn mask_byte_len(&self) -> usize {
        self.cell_count().div_ceil(8)
    }

    /// Vertices covered by the rectangle: (w + 1) × (h + 1).
    pub fn vertex_count(&self) -> usize {
        if self.is_empty() {
            return 0;
        }
        (self.width as usize + 1) * (self.height as usize + 1)
    }

    /// Global vertex indices covered by the rectangle, row-major.
    pub fn vertex_indices(&self) -> impl Iterator<Item = usize> + '_ {
        let (x0, z0) = (self.x as usize, self.z as usize);
        let (w, h) = (self.width as usize, self.height as usize);
        let count = if self.is_empty() { 0 } else { h + 1 };
        (0..count).flat_map(move |z| (0..=w).map(move |x| vertex_index(x0 + x, z0 + z)))
    }

    /// Chunk mask with every cell of the rectangle set.
    pub fn full_mask(&self) -> u64 {
        self.expand(u64::MAX)
    }

    /// Convert a rectangle-local mask into a chunk mask.
    pub fn expand(&self, local: u64) -> u64 {
        let mut mask = 0u64;
        let w = self.width as usize;
        for z in 0..self.height as usize {
            for x in 0..w {
                if (local >> (z * w + x)) & 1 != 0 {
                    mask |= subchunk_bit(self.x as usize + x, self.z as usize + z);
                }
            }
        }
        mask
    }

    /// Convert a chunk mask into the rectangle-local form.
    pub fn extract(&self, mask: u64) -> u64 {
        let mut local = 0u64;
        let w = self.width as usize;
        for z in 0..self.height as usize {
            for x in 0..w {
                if mask & subchunk_bit(self.x as usize + x, self.z as usize + z) != 0 {
                    local |= 1u64 << (z * w + x);
                }
            }
        }
        local
    }
}

/// Pack the low bits of a rectangle-local mask into LSB-first bytes.
pub fn mask_to_bytes(local: u64, byte_len: usize) -> Vec<u8> {
    (0..byte_len).map(|i| (local >> (i * 8)) as u8).collect()
}

/// Inverse of [`mask_to_bytes`]. Extra bytes beyond 8 are ignored.
pub fn mask_from_bytes(bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .take(8)
        .enumerate()
        .fold(0u64, |acc, (i, b)| acc | (u64::from(*b) << (i * 8)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subchunk_bit_layout() {
        assert_eq!(subchunk_bit(0, 0), 1);
        assert_eq!(subchunk_bit(7, 0), 1 << 7);
        assert_eq!(subchunk_bit(0, 1), 1 << 8);
        assert_eq!(subchunk_bit(7, 7), 1 << 63);
    }

    #[test]
    fn test_subchunk_corners() {
        assert_eq!(subchunk_corners(0, 0), [0, 1, 9, 10]);
        assert_eq!(subchunk_corners(7, 7), [70, 71, 79, 80]);
    }

    #[test]
    fn test_vertex_touches_mask() {
        let mask = subchunk_bit(3, 3);
        assert!(vertex_touches_mask(mask, 3, 3));
        assert!(vertex_touches_mask(mask, 4, 4));
        assert!(!vertex_touches_mask(mask, 5, 3));
        assert!(!vertex_touches_mask(mask, 0, 0));
        assert!(vertex_touches_mask(subchunk_bit(7, 7), 8, 8));
    }

    #[test]
    fn test_bounding_rect() {
        assert_eq!(SubchunkRect::bounding(0), None);

        let mask = subchunk_bit(2, 1) | subchunk_bit(4, 5);
        let rect = SubchunkRect::bounding(mask).expect("non-empty");
        assert_eq!(
            rect,
            SubchunkRect {
                x: 2,
                z: 1,
                width: 3,
                height: 5
            }
        );
        assert_eq!(rect.cell_count(), 15);
        assert_eq!(rect.mask_byte_len(), 2);
        assert_eq!(rect.vertex_count(), 24);

        assert_eq!(SubchunkRect::bounding(u64::MAX), Some(SubchunkRect::FULL));
    }

    #[test]
    fn test_extract_expand_preserves_mask() {
        let mask = subchunk_bit(1, 1) | subchunk_bit(3, 2) | subchunk_bit(2, 4);
        let rect = SubchunkRect::bounding(mask).expect("non-empty");
        let local = rect.extract(mask);
        assert_eq!(local.count_ones(), 3);
        assert_eq!(rect.expand(local), mask);
    }

    #[test]
    fn test_rect_local_bit_order() {
        let rect = SubchunkRect {
            x: 2,
            z: 3,
            width: 3,
            height: 2,
        };
        // local bit 4 = row 1, column 1 = subchunk (3, 4)
        assert_eq!(rect.expand(1 << 4), subchunk_bit(3, 4));
    }

    #[test]
    fn test_clamped_rect() {
        let rect = SubchunkRect::clamped(6, 7, 5, 5);
        assert_eq!(rect.width, 2);
        assert_eq!(rect.height, 1);
        let rect = SubchunkRect::clamped(9, 0, 1, 1);
        assert!(rect.is_empty());
        assert_eq!(rect.vertex_count(), 0);
        assert_eq!(rect.vertex_indices().count(), 0);
    }

    #[test]
    fn test_vertex_indices_cover_rect() {
        let rect = SubchunkRect {
            x: 7,
            z: 7,
            width: 1,
            height: 1,
        };
        let indices: Vec<_> = rect.vertex_indices().collect();
        assert_eq!(indices, vec![70, 71, 79, 80]);
    }

    #[test]
    fn test_mask_bytes_lsb_first() {
        let bytes = mask_to_bytes(0b1_0000_0001, 2);
        assert_eq!(bytes, vec![0b0000_0001, 0b0000_0001]);
        assert_eq!(mask_from_bytes(&bytes), 0b1_0000_0001);
    }
}
