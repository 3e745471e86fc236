use glam::{Vec2, Vec3};
use shoal_core::constants::UNIT_SIZE;
use shoal_core::math::{angled_height, shortest_distance_to_square};

/// World-space brush parameters forwarded from the editor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaintBrush {
    /// Cursor position. Its Y is the surface height when not locked.
    pub center: Vec3,
    pub radius: f32,
    /// Slope of the tilt plane, radians.
    pub tilt_angle: f32,
    /// Direction of the slope around Y, radians.
    pub tilt_orientation: f32,
    /// Use the tilt plane through `reference` instead of the cursor height.
    pub locked: bool,
    pub reference: Vec3,
}

impl PaintBrush {
    /// Untilted, unlocked brush at `center`.
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self {
            center,
            radius,
            tilt_angle: 0.0,
            tilt_orientation: 0.0,
            locked: false,
            reference: center,
        }
    }

    /// Lock heights to the plane through `reference`.
    pub fn locked_to(mut self, reference: Vec3, tilt_angle: f32, tilt_orientation: f32) -> Self {
        self.locked = true;
        self.reference = reference;
        self.tilt_angle = tilt_angle;
        self.tilt_orientation = tilt_orientation;
        self
    }

    /// Whether subchunk (x, z) of the chunk at `origin` lies within the radius.
    pub fn covers(&self, origin: Vec3, x: usize, z: usize) -> bool {
        let corner = Vec2::new(
            origin.x + x as f32 * UNIT_SIZE,
            origin.z + z as f32 * UNIT_SIZE,
        );
        shortest_distance_to_square(Vec2::new(self.center.x, self.center.z), corner, UNIT_SIZE)
            <= self.radius
    }

    /// Surface height this brush paints at `pos`.
    pub fn surface_height(&self, pos: Vec3) -> f32 {
        if self.locked {
            angled_height(self.reference, pos, self.tilt_angle, self.tilt_orientation)
        } else {
            self.center.y
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_covers_nearest_subchunks() {
        let brush = PaintBrush::new(Vec3::ZERO, 5.0);
        assert!(brush.covers(Vec3::ZERO, 0, 0));
        assert!(brush.covers(Vec3::ZERO, 1, 0));
        assert!(brush.covers(Vec3::ZERO, 0, 1));
        assert!(!brush.covers(Vec3::ZERO, 1, 1));
        assert!(!brush.covers(Vec3::ZERO, 2, 0));
    }

    #[test]
    fn test_covers_respects_origin() {
        let origin = Vec3::new(100.0, 0.0, 100.0);
        let brush = PaintBrush::new(Vec3::new(100.0 + UNIT_SIZE * 4.5, 0.0, 100.0 + UNIT_SIZE * 4.5), 0.1);
        assert!(brush.covers(origin, 4, 4));
        assert!(!brush.covers(origin, 3, 4));
    }

    #[test]
    fn test_surface_height() {
        let brush = PaintBrush::new(Vec3::new(0.0, 7.0, 0.0), 1.0);
        assert_eq!(brush.surface_height(Vec3::new(50.0, 0.0, 50.0)), 7.0);

        let tilted = brush.locked_to(Vec3::new(0.0, 2.0, 0.0), std::f32::consts::FRAC_PI_4, 0.0);
        let h = tilted.surface_height(Vec3::new(3.0, 0.0, 0.0));
        assert!((h - 5.0).abs() < 1e-4);
    }
}
