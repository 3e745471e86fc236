use glam::{Mat4, Vec2, Vec3, Vec4};

/// Height of the tilted brush plane through `origin` at `pos`.
///
/// `orientation` rotates the slope direction around Y; `angle` is the slope.
pub fn angled_height(origin: Vec3, pos: Vec3, angle: f32, orientation: f32) -> f32 {
    origin.y
        + ((pos.x - origin.x) * orientation.cos() + (pos.z - origin.z) * orientation.sin())
            * angle.tan()
}

/// Shortest XZ distance from `point` to the axis-aligned square whose minimum
/// corner is `corner`. Zero when the point lies inside.
pub fn shortest_distance_to_square(point: Vec2, corner: Vec2, size: f32) -> f32 {
    let dx = (corner.x - point.x).max(0.0).max(point.x - (corner.x + size));
    let dz = (corner.y - point.y).max(0.0).max(point.y - (corner.y + size));
    Vec2::new(dx, dz).length()
}

/// Clamp into [0, 1]. NaN maps to 0.
pub fn clamp01(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }
}

/// View frustum as six inward-facing planes (xyz = normal, w = distance).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    planes: [Vec4; 6],
}

impl Frustum {
    /// Extract planes from a combined view-projection matrix with a
    /// 0..1 depth range.
    pub fn from_view_proj(view_proj: &Mat4) -> Self {
        let r0 = view_proj.row(0);
        let r1 = view_proj.row(1);
        let r2 = view_proj.row(2);
        let r3 = view_proj.row(3);

        let planes = [r3 + r0, r3 - r0, r3 + r1, r3 - r1, r2, r3 - r2].map(|p| {
            let len = p.truncate().length();
            if len > 0.0 {
                p / len
            } else {
                p
            }
        });
        Self { planes }
    }

    /// Conservative box test: false only when the box lies fully outside
    /// one plane.
    pub fn intersects(&self, aabb: &Aabb) -> bool {
        self.planes.iter().all(|plane| {
            let normal = plane.truncate();
            let positive = Vec3::new(
                if normal.x >= 0.0 { aabb.max.x } else { aabb.min.x },
                if normal.y >= 0.0 { aabb.max.y } else { aabb.min.y },
                if normal.z >= 0.0 { aabb.max.z } else { aabb.min.z },
            );
            normal.dot(positive) + plane.w >= 0.0
        })
    }
}
