use crate::*;

/// A plan polygon, stored as an _open_ ring (the closing point is implied).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Polygon2(Vec<Point2>);

impl Polygon2 {
    /// Build a polygon from a ring of points.
    ///
    /// A closing point equal to the first is dropped, as are consecutive duplicates.
    pub fn new<I, P>(points: I) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: ToPoint2,
    {
        let mut points = points.into_iter().map(ToPoint2::to_p2).collect::<Vec<_>>();
        points.dedup();
        if points.len() > 1 && points.first() == points.last() {
            points.pop();
        }

        if points.len() < 3 {
            Err(Error::InvalidGeometry(
                "polygon requires 3 or more distinct points to be valid".into(),
            ))
        } else if points.iter().any(|p| p.has_nan()) {
            Err(Error::InvalidGeometry("polygon has NaN coordinates".into()))
        } else {
            Ok(Polygon2(points))
        }
    }

    /// An axis aligned rectangle.
    pub fn rect(min: Point2, max: Point2) -> Result<Self> {
        let [x0, y0] = min;
        let [x1, y1] = max;
        Self::new([[x0, y0], [x1, y0], [x1, y1], [x0, y1]])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn pts(&self) -> &[Point2] {
        &self.0
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = Point2> + '_ {
        self.0.iter().copied()
    }

    /// The ring edges, including the closing edge.
    pub fn edges(&self) -> impl Iterator<Item = (Point2, Point2)> + '_ {
        ring_edges(&self.0)
    }

    /// Test if a point is inside **or on the boundary** of the polygon.
    pub fn covers(&self, p: impl ToPoint2) -> bool {
        let p = p.to_p2();
        point_inside(&self.0, p) || on_boundary(&self.0, p)
    }
}

impl Aabb for Polygon2 {
    type Space = Point2;
    fn aabb(&self) -> Extents2 {
        self.iter().collect()
    }
}

/// Test if point is _inside_ the polygon.
impl<O: ToPoint2> Envelops<O> for Polygon2 {
    fn envelops(&self, p: O) -> bool {
        point_inside(&self.0, p)
    }
}

fn ring_edges<P: ToPoint2 + Copy>(ps: &[P]) -> impl Iterator<Item = (Point2, Point2)> + '_ {
    let n = ps.len();
    (0..n).map(move |i| (ps[i].to_p2(), ps[(i + 1) % n].to_p2()))
}

/// Twice-halved shoelace sum of a ring. Positive for counter-clockwise rings.
///
/// A closing point equal to the first contributes nothing.
pub fn signed_area<P: ToPoint2 + Copy>(ps: &[P]) -> f64 {
    // https://stackoverflow.com/questions/451426/how-do-i-calculate-the-area-of-a-2d-polygon
    ring_edges(ps)
        .map(|([ax, ay], [bx, by])| ax * by - ay * bx)
        .sum::<f64>()
        * 0.5
}

pub fn is_ccw<P: ToPoint2 + Copy>(ps: &[P]) -> bool {
    signed_area(ps) > 0.0
}

/// Test if a point lays on one of the ring's edges, with a small absolute tolerance.
pub fn on_boundary<P: ToPoint2 + Copy>(ps: &[P], point: impl ToPoint2) -> bool {
    const T: f64 = 1e-9;
    let point = point.to_p2();
    ring_edges(ps).any(|(a, b)| Segment::flat(a, b).dist_xy(point) <= T)
}

/// Test if a point is _inside_ a polygon, represented by a vector of points.
///
/// Uses a winding counting number test.
/// Fewer than 3 points never contain anything.
pub fn point_inside<P, O>(ps: &[P], point: O) -> bool
where
    O: ToPoint2,
    for<'a> &'a P: ToPoint2,
{
    if ps.len() < 3 {
        return false;
    }

    use std::iter::*;
    // uses the counting winding number test!

    /// Test if a point is on a line.
    /// > 0 : p is left of line
    /// = 0 : p is on line
    /// < 0 : p is right of line
    fn on((from, to): (Point2, Point2), p: Point2) -> f64 {
        xprod2(to.sub(from), p.sub(from))
    }

    let point = point.to_p2();
    let one_off = ps.len() - 1;
    let froms = &ps[..one_off];
    let tos = &ps[1..];

    let segments = froms
        .iter()
        .zip(tos.iter())
        .chain(once((&ps[one_off], &ps[0])))
        .map(|(a, b)| (a.to_p2(), b.to_p2()));

    let mut winding = 0;

    let pointy = point[1];
    for (from, to) in segments {
        let fromy = from[1];
        let toy = to[1];
        if fromy <= pointy {
            if toy > pointy && on((from, to), point) > 0.0 {
                winding += 1;
            }
        } else if toy <= pointy && on((from, to), point) < 0.0 {
            winding -= 1;
        }
    }

    winding != 0
}

/// Barycentric point-in-triangle test.
///
/// Returns whether `p` is inside (or on) the triangle `abc`, along with an _error_ metric: the
/// magnitude of the negative barycentric coordinates. Points inside score 0; the further
/// outside, the larger the error. Degenerate triangles never contain anything.
pub fn dot_in_tri(p: Point2, a: Point2, b: Point2, c: Point2) -> (bool, f64) {
    let v0 = c.sub(a);
    let v1 = b.sub(a);
    let v2 = p.sub(a);

    let dot = |x: Point2, y: Point2| x[0] * y[0] + x[1] * y[1];
    let dot00 = dot(v0, v0);
    let dot01 = dot(v0, v1);
    let dot02 = dot(v0, v2);
    let dot11 = dot(v1, v1);
    let dot12 = dot(v1, v2);

    let denom = dot00 * dot11 - dot01 * dot01;
    if denom == 0.0 {
        return (false, f64::INFINITY);
    }
    let inv = denom.recip();
    let u = (dot11 * dot02 - dot01 * dot12) * inv;
    let v = (dot00 * dot12 - dot01 * dot02) * inv;
    let w = 1.0 - u - v;

    let err = [u, v, w].into_iter().filter(|&x| x < 0.0).map(f64::abs).sum();

    (u >= 0.0 && v >= 0.0 && w >= 0.0, err)
}
