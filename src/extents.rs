use crate::*;
use rstar::AABB;

pub type Extents2 = Extents<Point2>;
pub type Extents3 = Extents<Point3>;

#[derive(Copy, Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Extents<P> {
    pub origin: P,
    pub size: P,
}

impl<P> Extents<P>
where
    P: Copy + Point + Add,
{
    pub fn zero() -> Self {
        Self {
            origin: P::zero(),
            size: P::zero(),
        }
    }

    /// A zero-sized extents sitting on `p`.
    pub fn point(p: P) -> Self {
        Self {
            origin: p,
            size: P::zero(),
        }
    }

    pub fn from_min_max(min: P, max: P) -> Self {
        let size = max.sub(min);

        Self { origin: min, size }
    }

    pub fn max(&self) -> P {
        self.origin.add(self.size)
    }

    pub fn intersects(self, other: Self) -> bool {
        let outside = self.max().into_iter().zip(other.origin).any(|(m, c)| m < c)
            || self.origin.into_iter().zip(other.max()).any(|(o, c)| o > c);

        !outside
    }

    /// Expand the extents by a value.
    ///
    /// A negative value can be used to _shrink_ the extents.
    /// Note that shrinking beyond `size / 2` will result in a [`Self::zero`].
    /// `by` values that are non-finite are ignored and the original self is returned.
    ///
    /// # Example
    /// ```rust
    /// # use cutprofile::*;
    /// let e = Extents2::from_min_max(Point2::zero(), Point2::one());
    ///
    /// assert_eq!(e.expand(0.5), Extents2 {
    ///     origin: [-0.5, -0.5],
    ///     size: [2.0, 2.0]
    /// });
    /// ```
    pub fn expand(self, by: f64) -> Self {
        if !by.is_finite() {
            return self;
        }

        let x = P::all(by);

        let size = self.size.add(x.scale(2.0));
        if size.into_iter().any(|x| x < 0.0) {
            return Self::zero();
        }

        let origin = self.origin.sub(x);

        Self { origin, size }
    }

    /// Expand the extents by `by` if _any_ dimension is thinner than `min`.
    ///
    /// Used to give degenerate (flat or zero-sized) boxes some body before querying an index.
    pub fn thicken(self, min: f64, by: f64) -> Self {
        if self.size.into_iter().any(|s| s < min) {
            self.expand(by)
        } else {
            self
        }
    }
}

impl Extents2 {
    /// The [`rstar`] envelope of these extents.
    pub fn to_aabb(self) -> AABB<Point2> {
        AABB::from_corners(self.origin, self.max())
    }
}

impl From<Extents3> for Extents2 {
    /// Convert a 3D AABB to 2D AABB by dropping Z value.
    fn from(value: Extents3) -> Self {
        let Extents { origin, size } = value;
        Self {
            origin: origin.to_p2(),
            size: size.to_p2(),
        }
    }
}

impl FromIterator<Point3> for Extents3 {
    fn from_iter<T>(iter: T) -> Self
    where
        T: IntoIterator<Item = Point3>,
    {
        let mut iter = iter.into_iter();
        let Some(init) = iter.next() else { return Self::zero(); };

        let (min, max) = iter.fold((init, init), |(min, max), p| {
            (min.min_all(p), max.max_all(p))
        });

        Self::from_min_max(min, max)
    }
}

impl FromIterator<Point2> for Extents2 {
    fn from_iter<T>(iter: T) -> Self
    where
        T: IntoIterator<Item = Point2>,
    {
        let mut iter = iter.into_iter();
        let Some(init) = iter.next() else { return Self::zero(); };

        let (min, max) = iter.fold((init, init), |(min, max), p| {
            (min.min_all(p), max.max_all(p))
        });

        Self::from_min_max(min, max)
    }
}

impl Envelops<Point2> for Extents2 {
    fn envelops(&self, p: Point2) -> bool {
        let [x, y] = p;

        let [mx, my] = self.origin;

        if x < mx || y < my {
            return false;
        }

        let [mx, my] = self.max();

        x <= mx && y <= my
    }
}

pub trait Aabb {
    type Space;

    fn aabb(&self) -> Extents<Self::Space>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::TestResult;

    type P2 = (f64, f64);
    type E = (P2, P2);

    fn to_e((a, b): E) -> Option<Extents2> {
        let a = [a.0, a.1];
        let b = [b.0, b.1];

        // keep clear of magnitudes where `origin + size` drifts from the max corner
        a.iter()
            .chain(&b)
            .all(|x| x.is_finite() && x.abs() < 1e12)
            .then(|| Extents2::from_iter([a, b]))
            .filter(|x| x.size.iter().all(|&x| x > 0.0))
    }

    #[quickcheck]
    fn intersects_commutative(a: E, b: E) -> TestResult {
        let Some(a) = to_e(a) else {
            return TestResult::discard();
        };
        let Some(b) = to_e(b) else {
            return TestResult::discard();
        };

        TestResult::from_bool(a.intersects(b) == b.intersects(a))
    }

    #[quickcheck]
    fn thickened_envelops_corners(a: E, by: u8) -> TestResult {
        let Some(a) = to_e(a) else {
            return TestResult::discard();
        };

        let t = a.thicken(f64::INFINITY, by as f64 + 1.0);
        TestResult::from_bool(t.envelops(a.origin) && t.envelops(a.max()))
    }

    #[test]
    fn distant_boxes_stay_apart() {
        let near = ((0.0, 1.0), (1.0, 2.0));
        let far = ((0.0, 0.0), (1.0, -1.8014398509481984e16));
        assert!(to_e(near).is_some());
        assert!(to_e(far).is_none());

        let a = Extents2::from_iter([[0.0, 1.0], [1.0, 2.0]]);
        let b = Extents2::from_iter([[0.0, 0.0], [1.0, -1.8014398509481984e16]]);
        assert!(!a.intersects(b));
        assert!(!b.intersects(a));
        assert!(!b.envelops([0.5, 1.0]));
    }

    #[test]
    fn intersection_tests() {
        let a = Extents2::from_min_max([0.0; 2], [1.0; 2]);
        let b = Extents2 {
            origin: [0., 2.],
            size: Point2::one(),
        };
        assert!(!a.intersects(b));

        let a = Extents2 {
            origin: [0., -1.0],
            size: Point2::one(),
        };
        let b = Extents2 {
            origin: Point2::zero(),
            size: Point2::one(),
        };
        assert!(a.intersects(b));
    }

    #[test]
    fn expand_test() {
        let e = Extents2::from_min_max(Point2::zero(), Point2::one());

        assert_eq!(
            e.expand(-0.2),
            Extents2 {
                origin: [0.2, 0.2],
                size: [0.6, 0.6],
            }
        );

        assert_eq!(e.expand(-0.8), Extents2::zero());
        assert_eq!(e.expand(f64::NAN), e);
    }

    #[test]
    fn thicken_degenerate_boxes() {
        // a horizontal segment has no height
        let e = Extents2::from_iter([[0.0, 5.0], [10.0, 5.0]]);
        assert_eq!(
            e.thicken(1.0, 1.0),
            Extents2 {
                origin: [-1.0, 4.0],
                size: [12.0, 2.0],
            }
        );

        let e = Extents2::from_iter([[0.0, 0.0], [10.0, 10.0]]);
        assert_eq!(e.thicken(1.0, 1.0), e);
    }

    #[test]
    fn aabb_conversion() {
        let e = Extents2::from_iter([[3.0, -1.0], [1.0, 4.0]]);
        let aabb = e.to_aabb();
        assert_eq!(aabb.lower(), [1.0, -1.0]);
        assert_eq!(aabb.upper(), [3.0, 4.0]);
    }
}
