use super::classification::{Classification, Side};
use crate::error::{Result, ValidationError};

/// Upper bound on segments a single cell can produce.
pub const MAX_SEGMENTS: usize = 4;

/// Number of distinct corner configurations.
pub const TABLE_SIZE: usize = 81;

/// A directed contour piece crossing one cell from `start` to `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Segment {
    pub start: Side,
    pub end: Side,
}

impl Segment {
    #[must_use]
    pub const fn new(start: Side, end: Side) -> Self {
        Self { start, end }
    }

    /// Whether either end lies on `side`.
    #[must_use]
    pub fn touches(&self, side: Side) -> bool {
        self.start == side || self.end == side
    }
}

/// The ordered segments of one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellSegments {
    segments: [Segment; MAX_SEGMENTS],
    len: u8,
}

impl CellSegments {
    pub const EMPTY: Self = Self {
        segments: [Segment::new(Side::Top, Side::Top); MAX_SEGMENTS],
        len: 0,
    };

    const fn push(mut self, segment: Segment) -> Self {
        self.segments[self.len as usize] = segment;
        self.len += 1;
        self
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Segment] {
        &self.segments[..self.len as usize]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &Segment> {
        self.as_slice().iter()
    }
}

static TABLE: [CellSegments; TABLE_SIZE] = build_table();

/// Pure lookup from corner classifications to cell segments.
///
/// The table is a flat 81-entry array keyed by the base-3 encoding of the
/// corners (`digit = classification + 1`, NW most significant), built by a
/// `const fn` from a few rules:
///
/// - `At` counts as inside, so a contour never runs through a grid point.
/// - A saddle (inside corners on one diagonal only) connects its inside
///   corners when the four raw values sum to zero or more.
///
/// Segments are directed so that the inside lies to the same hand of every
/// segment. Rings around inside regions come out with positive shoelace area
/// and rings around holes with negative area.
pub struct ContourTable;

impl ContourTable {
    /// Segments for a cell with the given corners, in NW, NE, SE, SW order.
    #[must_use]
    pub fn lookup(corners: [Classification; 4]) -> &'static CellSegments {
        &TABLE[Self::encode(corners)]
    }

    /// Like [`ContourTable::lookup`], for raw `{-1, 0, 1}` corner values.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::CornerOutOfRange` for any other value.
    pub fn lookup_raw(corners: [i8; 4]) -> Result<&'static CellSegments> {
        let mut classes = [Classification::Below; 4];
        for (class, raw) in classes.iter_mut().zip(corners) {
            *class = Classification::from_raw(raw).ok_or(ValidationError::CornerOutOfRange(raw))?;
        }
        Ok(Self::lookup(classes))
    }

    /// Base-3 table index of a corner configuration.
    #[must_use]
    pub fn encode(corners: [Classification; 4]) -> usize {
        corners
            .iter()
            .fold(0, |code, c| code * 3 + (c.raw() + 1).unsigned_abs() as usize)
    }

    /// All 81 entries, indexed by [`ContourTable::encode`].
    #[must_use]
    pub fn entries() -> &'static [CellSegments; TABLE_SIZE] {
        &TABLE
    }
}

const fn build_table() -> [CellSegments; TABLE_SIZE] {
    let mut table = [CellSegments::EMPTY; TABLE_SIZE];
    let mut code = 0;
    while code < TABLE_SIZE {
        table[code] = derive_cell(decode(code));
        code += 1;
    }
    table
}

#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
const fn decode(code: usize) -> [i8; 4] {
    [
        (code / 27 % 3) as i8 - 1,
        (code / 9 % 3) as i8 - 1,
        (code / 3 % 3) as i8 - 1,
        (code % 3) as i8 - 1,
    ]
}

const fn derive_cell(corners: [i8; 4]) -> CellSegments {
    let inside = [corners[0] >= 0, corners[1] >= 0, corners[2] >= 0, corners[3] >= 0];

    let mut exits = [0usize; 2];
    let mut exit_count = 0;
    let mut entry = 0usize;
    let mut s = 0;
    while s < 4 {
        let here = inside[s];
        let next = inside[(s + 1) % 4];
        if here && !next {
            exits[exit_count] = s;
            exit_count += 1;
        } else if !here && next {
            entry = s;
        }
        s += 1;
    }

    let cell = CellSegments::EMPTY;
    if exit_count == 1 {
        return cell.push(Segment::new(Side::from_index(exits[0]), Side::from_index(entry)));
    }
    if exit_count == 2 {
        let sum = corners[0] + corners[1] + corners[2] + corners[3];
        // Inside centre bridges the diagonal; outside centre isolates corners.
        let step = if sum >= 0 { 1 } else { 3 };
        return cell
            .push(Segment::new(
                Side::from_index(exits[0]),
                Side::from_index(exits[0] + step),
            ))
            .push(Segment::new(
                Side::from_index(exits[1]),
                Side::from_index(exits[1] + step),
            ));
    }
    cell
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::isoband::Classification::{Above, At, Below};

    fn sorted(segments: impl IntoIterator<Item = Segment>) -> Vec<(usize, usize)> {
        let mut v: Vec<_> = segments
            .into_iter()
            .map(|s| (s.start.index(), s.end.index()))
            .collect();
        v.sort_unstable();
        v
    }

    fn all_configurations() -> impl Iterator<Item = [Classification; 4]> {
        let classes = [Below, At, Above];
        (0..TABLE_SIZE).map(move |code| {
            [
                classes[code / 27 % 3],
                classes[code / 9 % 3],
                classes[code / 3 % 3],
                classes[code % 3],
            ]
        })
    }

    #[test]
    fn encoding_matches_table_order() {
        for (code, corners) in all_configurations().enumerate() {
            assert_eq!(ContourTable::encode(corners), code);
        }
    }

    #[test]
    fn uniform_cells_have_no_segments() {
        for class in [Below, At, Above] {
            assert!(ContourTable::lookup([class; 4]).is_empty());
        }
        // Mixed At/Above is still uniformly inside.
        assert!(ContourTable::lookup([At, Above, At, Above]).is_empty());
    }

    #[test]
    fn single_inside_corner_cuts_it_off() {
        let cell = ContourTable::lookup([Below, Below, Above, Below]);
        assert_eq!(cell.as_slice(), &[Segment::new(Side::Bottom, Side::Right)]);

        let cell = ContourTable::lookup([Above, Below, Below, Below]);
        assert_eq!(cell.as_slice(), &[Segment::new(Side::Top, Side::Left)]);
    }

    #[test]
    fn single_outside_corner_reverses_direction() {
        let cell = ContourTable::lookup([Above, Above, Below, Above]);
        assert_eq!(cell.as_slice(), &[Segment::new(Side::Right, Side::Bottom)]);
    }

    #[test]
    fn half_split_runs_across_the_cell() {
        // Top half inside: the line enters on the right and leaves on the left.
        let cell = ContourTable::lookup([Above, Above, Below, Below]);
        assert_eq!(cell.as_slice(), &[Segment::new(Side::Right, Side::Left)]);
    }

    #[test]
    fn saddle_with_strong_corners_connects() {
        let cell = ContourTable::lookup([Above, Below, Above, Below]);
        assert_eq!(
            sorted(cell.iter().copied()),
            vec![(0, 1), (2, 3)],
            "inside centre keeps the NW-SE band joined"
        );
    }

    #[test]
    fn saddle_with_weak_corners_separates() {
        let cell = ContourTable::lookup([At, Below, At, Below]);
        assert_eq!(sorted(cell.iter().copied()), vec![(0, 3), (2, 1)]);

        let cell = ContourTable::lookup([Above, Below, At, Below]);
        assert_eq!(sorted(cell.iter().copied()), vec![(0, 3), (2, 1)]);
    }

    #[test]
    fn every_crossed_side_is_used_once() {
        for corners in all_configurations() {
            let cell = ContourTable::lookup(corners);
            for side in Side::ALL {
                let a = corners[side.index()].is_inside();
                let b = corners[(side.index() + 1) % 4].is_inside();
                let uses = cell.iter().filter(|s| s.touches(side)).count();
                assert_eq!(uses, usize::from(a != b), "{corners:?} {side:?}");
            }
            assert!(cell.len() <= MAX_SEGMENTS);
        }
    }

    #[test]
    fn rotation_symmetry() {
        for corners in all_configurations() {
            // Rotate the cell a quarter turn clockwise: corner c moves to c + 1.
            let rotated = [corners[3], corners[0], corners[1], corners[2]];
            let expected = sorted(
                ContourTable::lookup(corners)
                    .iter()
                    .map(|s| Segment::new(s.start.rotated(), s.end.rotated())),
            );
            let actual = sorted(ContourTable::lookup(rotated).iter().copied());
            assert_eq!(actual, expected, "rotation of {corners:?}");
        }
    }

    #[test]
    fn reflection_symmetry() {
        let mirror = |side: Side| match side {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
            other => other,
        };
        for corners in all_configurations() {
            // Mirror left to right: NW <-> NE, SW <-> SE.
            let reflected = [corners[1], corners[0], corners[3], corners[2]];
            // Reflection flips orientation, so segments also reverse.
            let expected = sorted(
                ContourTable::lookup(corners)
                    .iter()
                    .map(|s| Segment::new(mirror(s.end), mirror(s.start))),
            );
            let actual = sorted(ContourTable::lookup(reflected).iter().copied());
            assert_eq!(actual, expected, "reflection of {corners:?}");
        }
    }

    #[test]
    fn raw_lookup_rejects_out_of_range_corners() {
        assert!(ContourTable::lookup_raw([-1, 0, 1, 0]).is_ok());
        assert!(ContourTable::lookup_raw([-1, 0, 2, 0]).is_err());
        assert!(ContourTable::lookup_raw([-3, 0, 1, 0]).is_err());
    }
}
