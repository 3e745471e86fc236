use glam::Vec3;
use shoal_core::constants::{UNIT_SIZE, VERTEX_COUNT, VERTICES_PER_SIDE};
use shoal_core::grid::vertex_index;

/// Terrain heights sampled at the liquid vertex corners of one chunk.
///
/// Must be fully loaded before any crop or paint call that consults it.
pub trait TerrainHeightProvider {
    /// Terrain height at liquid vertex (x, z), both in 0..=8.
    fn height_at(&self, x: usize, z: usize) -> f32;

    /// Lowest terrain height in the chunk.
    fn min_height(&self) -> f32;
}

/// 9×9 terrain height samples aligned with the liquid vertex grid.
#[derive(Debug, Clone, PartialEq)]
pub struct HeightGrid {
    heights: [f32; VERTEX_COUNT],
}

impl HeightGrid {
    pub fn flat(height: f32) -> Self {
        Self {
            heights: [height; VERTEX_COUNT],
        }
    }

    pub fn from_fn(mut f: impl FnMut(usize, usize) -> f32) -> Self {
        let mut heights = [0.0; VERTEX_COUNT];
        for z in 0..VERTICES_PER_SIDE {
            for x in 0..VERTICES_PER_SIDE {
                heights[vertex_index(x, z)] = f(x, z);
            }
        }
        Self { heights }
    }

    pub fn set(&mut self, x: usize, z: usize, height: f32) {
        self.heights[vertex_index(x, z)] = height;
    }
}

impl TerrainHeightProvider for HeightGrid {
    fn height_at(&self, x: usize, z: usize) -> f32 {
        self.heights[vertex_index(x, z)]
    }

    fn min_height(&self) -> f32 {
        self.heights.iter().copied().fold(f32::INFINITY, f32::min)
    }
}

/// Procedural terrain using 2D simplex noise, for benches and tools that
/// need plausible shorelines without a real tile.
pub struct NoiseTerrain {
    /// Permutation table for simplex noise (doubled for wrapping).
    perm: [u8; 512],
    /// Height the noise is centered on.
    pub base_height: f32,
    /// Peak deviation from `base_height`.
    pub amplitude: f32,
}

impl NoiseTerrain {
    pub fn new(seed: u64, base_height: f32, amplitude: f32) -> Self {
        Self {
            perm: Self::build_permutation(seed),
            base_height,
            amplitude,
        }
    }

    /// Sample the chunk whose minimum corner is `origin`.
    pub fn sample_chunk(&self, origin: Vec3) -> HeightGrid {
        HeightGrid::from_fn(|x, z| {
            self.height(origin.x + x as f32 * UNIT_SIZE, origin.z + z as f32 * UNIT_SIZE)
        })
    }

    /// Terrain height at a world-space (x, z) position using 3-octave simplex noise.
    pub fn height(&self, wx: f32, wz: f32) -> f32 {
        let x = wx as f64;
        let z = wz as f64;

        let scale = 0.01;
        let mut h = 0.0f64;
        h += self.simplex2d(x * scale, z * scale) * 0.6;
        h += self.simplex2d(x * scale * 2.0 + 100.0, z * scale * 2.0 + 100.0) * 0.3;
        h += self.simplex2d(x * scale * 4.0 + 200.0, z * scale * 4.0 + 200.0) * 0.1;

        self.base_height + (h as f32) * self.amplitude
    }

    /// 2D simplex noise. Returns value in [-1, 1].
    fn simplex2d(&self, x: f64, z: f64) -> f64 {
        const F2: f64 = 0.5 * (1.732_050_807_568_877_2 - 1.0);
        const G2: f64 = (3.0 - 1.732_050_807_568_877_2) / 6.0;

        let s = (x + z) * F2;
        let i = (x + s).floor();
        let j = (z + s).floor();

        let t = (i + j) * G2;
        let x0 = x - (i - t);
        let y0 = z - (j - t);

        let (i1, j1) = if x0 > y0 { (1, 0) } else { (0, 1) };

        let x1 = x0 - i1 as f64 + G2;
        let y1 = y0 - j1 as f64 + G2;
        let x2 = x0 - 1.0 + 2.0 * G2;
        let y2 = y0 - 1.0 + 2.0 * G2;

        let ii = (i as i64 & 255) as usize;
        let jj = (j as i64 & 255) as usize;

        let gi0 = self.perm[ii + self.perm[jj] as usize] as usize;
        let gi1 = self.perm[ii + i1 + self.perm[jj + j1] as usize] as usize;
        let gi2 = self.perm[ii + 1 + self.perm[jj + 1] as usize] as usize;

        70.0 * (Self::corner(gi0, x0, y0) + Self::corner(gi1, x1, y1) + Self::corner(gi2, x2, y2))
    }

    fn corner(gi: usize, x: f64, y: f64) -> f64 {
        const GRAD: [[f64; 2]; 8] = [
            [1.0, 1.0],
            [-1.0, 1.0],
            [1.0, -1.0],
            [-1.0, -1.0],
            [1.0, 0.0],
            [-1.0, 0.0],
            [0.0, 1.0],
            [0.0, -1.0],
        ];
        let t = 0.5 - x * x - y * y;
        if t < 0.0 {
            return 0.0;
        }
        let g = GRAD[gi % GRAD.len()];
        let t = t * t;
        t * t * (g[0] * x + g[1] * y)
    }

    fn build_permutation(seed: u64) -> [u8; 512] {
        let mut p: [u8; 256] = [0; 256];
        for (i, val) in p.iter_mut().enumerate() {
            *val = i as u8;
        }

        // Fisher-Yates shuffle with an LCG seeded stream
        let mut rng = seed;
        for i in (1..256).rev() {
            rng = rng
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            let j = (rng >> 33) as usize % (i + 1);
            p.swap(i, j);
        }

        let mut perm = [0u8; 512];
        for (i, val) in perm.iter_mut().enumerate() {
            *val = p[i & 255];
        }
        perm
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_grid() {
        let grid = HeightGrid::flat(12.5);
        assert_eq!(grid.height_at(0, 0), 12.5);
        assert_eq!(grid.height_at(8, 8), 12.5);
        assert_eq!(grid.min_height(), 12.5);
    }

    #[test]
    fn test_grid_min_height() {
        let mut grid = HeightGrid::from_fn(|x, z| (x + z) as f32);
        assert_eq!(grid.min_height(), 0.0);
        grid.set(4, 4, -3.0);
        assert_eq!(grid.height_at(4, 4), -3.0);
        assert_eq!(grid.min_height(), -3.0);
    }

    #[test]
    fn test_noise_terrain_deterministic() {
        let a = NoiseTerrain::new(42, 10.0, 8.0);
        let b = NoiseTerrain::new(42, 10.0, 8.0);
        let origin = Vec3::new(100.0, 0.0, -250.0);
        assert_eq!(a.sample_chunk(origin), b.sample_chunk(origin));
    }

    #[test]
    fn test_noise_terrain_within_amplitude() {
        let terrain = NoiseTerrain::new(7, 20.0, 5.0);
        for i in 0..50 {
            let h = terrain.height(i as f32 * 13.7, i as f32 * -9.1);
            assert!((14.0..=26.0).contains(&h), "height {h} out of range");
        }
    }
}
