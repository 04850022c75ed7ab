use crate::*;

/// A 3D line segment `p0 -> p1`.
///
/// Intersection and proximity tests work in _plan_ (x,y); the z values are carried along and
/// can be interpolated with [`Segment::z_at`].
#[derive(Copy, Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Segment {
    pub p0: Point3,
    pub p1: Point3,
}

impl Segment {
    pub fn new(p0: Point3, p1: Point3) -> Self {
        Self { p0, p1 }
    }

    /// Segment with both ends at z = NaN.
    pub fn flat(p0: Point2, p1: Point2) -> Self {
        Self::new(p0.with_z(f64::NAN), p1.with_z(f64::NAN))
    }

    /// The plan direction vector `p1 - p0`.
    pub fn dir(&self) -> Point2 {
        self.p1.to_p2().sub(self.p0.to_p2())
    }

    pub fn len_xy(&self) -> f64 {
        dist_xy(self.p0, self.p1)
    }

    pub fn len(&self) -> f64 {
        self.p1.sub(self.p0).mag()
    }

    /// The point at parameter `t`, where `t = 0` is `p0` and `t = 1` is `p1`.
    pub fn point_at(&self, t: f64) -> Point3 {
        lerp(self.p0, self.p1, t)
    }

    /// The (unclamped) parameter of the projection of `p` onto the segment's line.
    ///
    /// Returns 0 for a degenerate segment.
    pub fn project(&self, p: impl ToPoint2) -> f64 {
        let d = self.dir();
        let l2 = d[0] * d[0] + d[1] * d[1];
        if l2 == 0.0 {
            return 0.0;
        }
        let [vx, vy] = p.to_p2().sub(self.p0.to_p2());
        (vx * d[0] + vy * d[1]) / l2
    }

    /// The point on the segment nearest to `p`, in plan.
    pub fn nearest(&self, p: impl ToPoint2) -> Point3 {
        let t = self.project(p).clamp(0.0, 1.0);
        self.point_at(t)
    }

    /// Plan distance from `p` to the segment.
    pub fn dist_xy(&self, p: impl ToPoint2) -> f64 {
        let p = p.to_p2();
        dist_xy(self.nearest(p), p)
    }

    /// Distance from `p` to the segment, in 3D.
    pub fn dist_3d(&self, p: Point3) -> f64 {
        let d = self.p1.sub(self.p0);
        let l2 = dot_prod(d, d);
        let t = if l2 == 0.0 {
            0.0
        } else {
            (dot_prod(p.sub(self.p0), d) / l2).clamp(0.0, 1.0)
        };
        self.point_at(t).sub(p).mag()
    }

    /// Interpolate the z value of the segment at `p` (projected onto the segment).
    ///
    /// Ends with equal z return that z without interpolating.
    #[allow(clippy::float_cmp)]
    pub fn z_at(&self, p: impl ToPoint2) -> f64 {
        let (z0, z1) = (self.p0[2], self.p1[2]);
        if z0 == z1 {
            return z0;
        }
        let l = self.len_xy();
        if l == 0.0 {
            return z0;
        }
        let d = dist_xy(self.p0, p.to_p2());
        z0 + (z1 - z0) * d / l
    }

    /// The plan intersection of two segments, endpoints inclusive.
    ///
    /// Collinear, overlapping segments return the first point of the overlap along `self`.
    /// The returned z is interpolated along `self`.
    pub fn intersect(&self, other: &Segment) -> Option<Point3> {
        let p = self.p0.to_p2();
        let r = self.dir();
        let q = other.p0.to_p2();
        let s = other.dir();

        let qp = q.sub(p);
        let denom = xprod2(r, s);

        if denom == 0.0 {
            if xprod2(qp, r) != 0.0 {
                return None; // parallel
            }
            let rr = r[0] * r[0] + r[1] * r[1];
            if rr == 0.0 {
                return (other.dist_xy(p) == 0.0).then_some(self.p0);
            }
            let t0 = self.project(other.p0);
            let t1 = self.project(other.p1);
            let (lo, hi) = (t0.min(t1), t0.max(t1));
            if hi < 0.0 || lo > 1.0 {
                return None;
            }
            return Some(self.point_at(lo.max(0.0)));
        }

        let t = xprod2(qp, s) / denom;
        let u = xprod2(qp, r) / denom;

        ((0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u)).then(|| self.point_at(t))
    }

    /// The closest pair of points between two segments, in plan: `(on self, on other)`.
    ///
    /// Crossing segments return the crossing twice.
    pub fn closest_points(&self, other: &Segment) -> (Point3, Point3) {
        if let Some(x) = self.intersect(other) {
            return (x, other.nearest(x));
        }

        // no crossing means the closest pair involves at least one endpoint
        let candidates = [
            (self.p0, other.nearest(self.p0)),
            (self.p1, other.nearest(self.p1)),
            (self.nearest(other.p0), other.p0),
            (self.nearest(other.p1), other.p1),
        ];

        candidates
            .into_iter()
            .min_by(|a, b| dist_xy(a.0, a.1).total_cmp(&dist_xy(b.0, b.1)))
            .unwrap_or((self.p0, other.p0))
    }
}

impl Aabb for Segment {
    type Space = Point2;
    fn aabb(&self) -> Extents2 {
        Extents2::from_iter([self.p0.to_p2(), self.p1.to_p2()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::TestResult;

    fn seg(a: Point2, b: Point2) -> Segment {
        Segment::new(a.with_z(0.0), b.with_z(10.0))
    }

    #[test]
    fn crossing_segments() {
        let a = seg([0.0, 0.0], [10.0, 0.0]);
        let b = seg([5.0, -5.0], [5.0, 5.0]);
        assert_eq!(a.intersect(&b), Some([5.0, 0.0, 5.0]));
        assert_eq!(b.intersect(&a), Some([5.0, 0.0, 5.0]));

        // touching at an end
        let b = seg([10.0, 0.0], [10.0, 5.0]);
        assert_eq!(a.intersect(&b), Some([10.0, 0.0, 10.0]));

        // missing
        let b = seg([11.0, -5.0], [11.0, 5.0]);
        assert_eq!(a.intersect(&b), None);

        // parallel
        let b = seg([0.0, 1.0], [10.0, 1.0]);
        assert_eq!(a.intersect(&b), None);
    }

    #[test]
    fn collinear_overlap() {
        let a = seg([0.0, 0.0], [10.0, 0.0]);
        let b = seg([12.0, 0.0], [4.0, 0.0]);
        assert_eq!(a.intersect(&b), Some([4.0, 0.0, 4.0]));

        let b = seg([-2.0, 0.0], [4.0, 0.0]);
        assert_eq!(a.intersect(&b), Some([0.0, 0.0, 0.0]));

        let b = seg([12.0, 0.0], [14.0, 0.0]);
        assert_eq!(a.intersect(&b), None);
    }

    #[test]
    fn nearest_and_projection() {
        let a = seg([0.0, 0.0], [10.0, 0.0]);
        assert_eq!(a.project([5.0, 3.0]), 0.5);
        assert_eq!(a.project([-5.0, 3.0]), -0.5);
        assert_eq!(a.nearest([-5.0, 3.0]), [0.0, 0.0, 0.0]);
        assert_eq!(a.nearest([5.0, 3.0]), [5.0, 0.0, 5.0]);
        assert_eq!(a.dist_xy([5.0, 3.0]), 3.0);
    }

    #[test]
    fn z_interpolation() {
        let a = Segment::new([0.0, 0.0, 2.0], [0.0, 10.0, 12.0]);
        assert_eq!(a.z_at([0.0, 5.0]), 7.0);

        let flat = Segment::new([0.0, 0.0, 2.0], [0.0, 10.0, 2.0]);
        assert_eq!(flat.z_at([100.0, 5.0]), 2.0);

        assert!(Segment::flat([0.0, 0.0], [1.0, 1.0]).z_at([0.5, 0.5]).is_nan());
    }

    #[test]
    fn distance_in_3d() {
        let a = Segment::new([0.0, 0.0, 0.0], [10.0, 0.0, 10.0]);
        assert_eq!(a.dist_3d([5.0, 0.0, 5.0]), 0.0);
        assert_eq!(a.dist_3d([5.0, 3.0, 5.0]), 3.0);
        assert_eq!(a.dist_3d([-3.0, 0.0, -4.0]), 5.0);
        assert!(a.dist_3d([5.0, 0.0, f64::NAN]).is_nan());
    }

    #[test]
    fn closest_points_between_segments() {
        let a = seg([0.0, 0.0], [10.0, 0.0]);
        let b = seg([5.0, 1.0], [5.0, 5.0]);
        let (x, y) = a.closest_points(&b);
        assert_eq!(x.to_p2(), [5.0, 0.0]);
        assert_eq!(y.to_p2(), [5.0, 1.0]);

        let b = seg([5.0, -1.0], [5.0, 5.0]);
        let (x, y) = a.closest_points(&b);
        assert_eq!(x.to_p2(), [5.0, 0.0]);
        assert_eq!(y.to_p2(), [5.0, 0.0]);
    }

    #[test]
    fn segment_aabb() {
        let a = seg([3.0, 0.0], [1.0, 10.0]);
        assert_eq!(
            a.aabb(),
            Extents2 {
                origin: [1.0, 0.0],
                size: [2.0, 10.0]
            }
        );
    }

    #[quickcheck]
    fn intersection_symmetric(a: (i8, i8, i8, i8), b: (i8, i8, i8, i8)) -> TestResult {
        let f = |(x0, y0, x1, y1): (i8, i8, i8, i8)| {
            Segment::flat([x0 as f64, y0 as f64], [x1 as f64, y1 as f64])
        };
        let (a, b) = (f(a), f(b));
        if a.len_xy() == 0.0 || b.len_xy() == 0.0 || xprod2(a.dir(), b.dir()) == 0.0 {
            return TestResult::discard();
        }

        let x = a.intersect(&b).map(|p| p.to_p2());
        let y = b.intersect(&a).map(|p| p.to_p2());
        let same = match (x, y) {
            (Some(x), Some(y)) => dist_xy(x, y) < 1e-9,
            (None, None) => true,
            _ => false,
        };
        TestResult::from_bool(same)
    }
}
