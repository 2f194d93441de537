use crate::math::Point2;

/// Relation of one grid point to the contour threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i8)]
pub enum Classification {
    Below = -1,
    At = 0,
    Above = 1,
}

impl Classification {
    /// Parses a raw `{-1, 0, 1}` value.
    #[must_use]
    pub const fn from_raw(value: i8) -> Option<Self> {
        match value {
            -1 => Some(Self::Below),
            0 => Some(Self::At),
            1 => Some(Self::Above),
            _ => None,
        }
    }

    /// The raw `{-1, 0, 1}` value.
    #[must_use]
    pub const fn raw(self) -> i8 {
        self as i8
    }

    /// Whether the point counts as inside the band. Ties lean inside.
    #[must_use]
    pub const fn is_inside(self) -> bool {
        !matches!(self, Self::Below)
    }
}

/// A side of a grid cell, numbered clockwise from the top.
///
/// Side `s` joins corners `s` and `s + 1` (mod 4) with corners numbered
/// NW = 0, NE = 1, SE = 2, SW = 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Top = 0,
    Right = 1,
    Bottom = 2,
    Left = 3,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Top, Side::Right, Side::Bottom, Side::Left];

    #[must_use]
    pub const fn from_index(index: usize) -> Self {
        match index % 4 {
            0 => Self::Top,
            1 => Self::Right,
            2 => Self::Bottom,
            _ => Self::Left,
        }
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The side a neighbouring cell shares with this one.
    #[must_use]
    pub const fn opposite(self) -> Self {
        Self::from_index(self.index() + 2)
    }

    /// Next side clockwise.
    #[must_use]
    pub const fn rotated(self) -> Self {
        Self::from_index(self.index() + 1)
    }

    /// Midpoint of this side for the unit cell whose NW corner is `(x0, y0)`.
    #[must_use]
    pub fn midpoint(self, x0: f64, y0: f64) -> Point2 {
        match self {
            Self::Top => Point2::new(x0 + 0.5, y0),
            Self::Right => Point2::new(x0 + 1.0, y0 + 0.5),
            Self::Bottom => Point2::new(x0 + 0.5, y0 + 1.0),
            Self::Left => Point2::new(x0, y0 + 0.5),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_values_round_trip() {
        for raw in -1..=1 {
            let class = Classification::from_raw(raw);
            assert_eq!(class.map(Classification::raw), Some(raw));
        }
        assert_eq!(Classification::from_raw(2), None);
        assert_eq!(Classification::from_raw(-2), None);
    }

    #[test]
    fn ties_lean_inside() {
        assert!(Classification::At.is_inside());
        assert!(Classification::Above.is_inside());
        assert!(!Classification::Below.is_inside());
    }

    #[test]
    fn opposite_sides_face_each_other() {
        assert_eq!(Side::Top.opposite(), Side::Bottom);
        assert_eq!(Side::Right.opposite(), Side::Left);
        for side in Side::ALL {
            assert_eq!(side.opposite().opposite(), side);
            assert_eq!(side.rotated().rotated(), side.opposite());
        }
    }

    #[test]
    fn shared_sides_have_the_same_midpoint() {
        // Right side of cell (0, 0) is the left side of cell (1, 0).
        assert_eq!(Side::Right.midpoint(0.0, 0.0), Side::Left.midpoint(1.0, 0.0));
        // Bottom side of cell (0, 0) is the top side of cell (0, 1).
        assert_eq!(Side::Bottom.midpoint(0.0, 0.0), Side::Top.midpoint(0.0, 1.0));
    }
}
