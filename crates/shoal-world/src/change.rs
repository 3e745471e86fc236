use std::ops::{BitOr, BitOrAssign};

/// What a mutating operation did, so the owning tile can decide whether to
/// recompute bounds or re-upload liquid geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LiquidChange {
    /// Height bounds or occupancy footprint changed.
    pub extents_changed: bool,
    /// Vertex data, occupancy or layer set changed.
    pub needs_reupload: bool,
}

impl LiquidChange {
    pub const NONE: Self = Self {
        extents_changed: false,
        needs_reupload: false,
    };

    pub const REUPLOAD: Self = Self {
        extents_changed: false,
        needs_reupload: true,
    };

    pub const ALL: Self = Self {
        extents_changed: true,
        needs_reupload: true,
    };

    pub fn any(&self) -> bool {
        self.extents_changed || self.needs_reupload
    }
}

impl BitOr for LiquidChange {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self {
            extents_changed: self.extents_changed || rhs.extents_changed,
            needs_reupload: self.needs_reupload || rhs.needs_reupload,
        }
    }
}

impl BitOrAssign for LiquidChange {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = *self | rhs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge() {
        let mut change = LiquidChange::NONE;
        assert!(!change.any());
        change |= LiquidChange::REUPLOAD;
        assert_eq!(change, LiquidChange::REUPLOAD);
        assert_eq!(change | LiquidChange::ALL, LiquidChange::ALL);
    }
}
