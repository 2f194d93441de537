use super::{Point2, Vector2, TOLERANCE};

/// Rotational direction of a closed ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winding {
    /// Positive shoelace area. Rings around inside regions.
    CounterClockwise,
    /// Negative shoelace area. Rings around holes.
    Clockwise,
    /// Zero area.
    Degenerate,
}

impl Winding {
    /// Classifies a signed area.
    #[must_use]
    pub fn of_area(area: f64) -> Self {
        if area > TOLERANCE {
            Self::CounterClockwise
        } else if area < -TOLERANCE {
            Self::Clockwise
        } else {
            Self::Degenerate
        }
    }
}

/// Computes the signed area of a ring (shoelace formula).
///
/// Positive for counter-clockwise, negative for clockwise. A repeated
/// closing point contributes nothing, so open and closed rings agree.
#[must_use]
pub fn signed_area(points: &[Point2]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += points[i].x * points[j].y - points[j].x * points[i].y;
    }
    sum * 0.5
}

/// Rotates an open ring so it starts at the leftmost vertex (smallest x),
/// breaking ties by smallest y. Ensures deterministic output for tests.
#[must_use]
pub fn rotate_to_canonical_start(points: &[Point2]) -> Vec<Point2> {
    if points.len() < 2 {
        return points.to_vec();
    }
    let mut best = 0;
    for (i, pt) in points.iter().enumerate().skip(1) {
        let b = &points[best];
        if pt.x < b.x - TOLERANCE || (pt.x - b.x).abs() < TOLERANCE && pt.y < b.y {
            best = i;
        }
    }
    if best == 0 {
        return points.to_vec();
    }
    let mut rotated = Vec::with_capacity(points.len());
    rotated.extend_from_slice(&points[best..]);
    rotated.extend_from_slice(&points[..best]);
    rotated
}

/// Point-in-ring test using the winding number.
///
/// `ring` may or may not repeat its first point at the end. Returns `true`
/// for a non-zero winding number.
#[must_use]
pub fn point_in_ring(point: &Point2, ring: &[Point2]) -> bool {
    if ring.len() < 3 {
        return false;
    }
    winding_number(point.x, point.y, ring) != 0
}

/// Winding number of point `(px, py)` with respect to polygon `verts`.
///
/// Non-zero => inside, zero => outside.
fn winding_number(px: f64, py: f64, verts: &[Point2]) -> i32 {
    let n = verts.len();
    let mut winding = 0i32;
    for i in 0..n {
        let (x0, y0) = (verts[i].x, verts[i].y);
        let (x1, y1) = (verts[(i + 1) % n].x, verts[(i + 1) % n].y);

        if y0 <= py {
            if y1 > py && cross_2d(x1 - x0, y1 - y0, px - x0, py - y0) > 0.0 {
                winding += 1;
            }
        } else if y1 <= py && cross_2d(x1 - x0, y1 - y0, px - x0, py - y0) < 0.0 {
            winding -= 1;
        }
    }
    winding
}

/// 2D cross product: `(ax * by - ay * bx)`.
#[inline]
fn cross_2d(ax: f64, ay: f64, bx: f64, by: f64) -> f64 {
    ax * by - ay * bx
}

/// Removes vertices that lie on the straight line through their neighbours.
///
/// `points` is an open ring (no repeated closing point). Runs of collinear
/// vertices collapse in one pass. A ring that would drop below three
/// vertices is returned unchanged.
#[must_use]
pub fn drop_collinear(points: &[Point2]) -> Vec<Point2> {
    let n = points.len();
    if n <= 3 {
        return points.to_vec();
    }
    let kept: Vec<Point2> = (0..n)
        .filter(|&i| {
            let a = points[(i + n - 1) % n];
            let b = points[i];
            let c = points[(i + 1) % n];
            let ab: Vector2 = b - a;
            let bc: Vector2 = c - b;
            cross_2d(ab.x, ab.y, bc.x, bc.y).abs() > TOLERANCE
        })
        .map(|i| points[i])
        .collect();
    if kept.len() < 3 {
        points.to_vec()
    } else {
        kept
    }
}

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box.
    pub min: Point2,
    /// Maximum corner of the bounding box.
    pub max: Point2,
}

impl Aabb {
    /// Bounding box of a point set, or `None` when it is empty.
    #[must_use]
    pub fn from_points(points: &[Point2]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut min = *first;
        let mut max = *first;
        for p in rest {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Some(Self { min, max })
    }

    /// Returns `true` if `other` lies entirely within `self` (borders included).
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        self.min.x <= other.min.x
            && self.min.y <= other.min.y
            && self.max.x >= other.max.x
            && self.max.y >= other.max.y
    }

    #[must_use]
    pub fn area(&self) -> f64 {
        (self.max.x - self.min.x) * (self.max.y - self.min.y)
    }
}
