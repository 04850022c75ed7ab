use std::ops;

pub trait Point: Copy + Sized + IntoIterator<Item = f64> {
    /// Set all the values to this value.
    fn all(v: f64) -> Self;

    /// Set all values to zero.
    fn zero() -> Self {
        Self::all(0.)
    }

    /// Set all values to one.
    fn one() -> Self {
        Self::all(1.)
    }

    /// Scale point by multiplying all dimensions by `scalar`.
    fn scale(self, scalar: f64) -> Self;

    /// Calculate the magnitude of the vector.
    fn mag(self) -> f64 {
        self.into_iter().map(|a| a * a).sum::<f64>().sqrt()
    }

    /// Return the minimum of each dimension.
    fn min_all(self, b: Self) -> Self {
        xfm(self, b, f64::min)
    }

    /// Return the maximum of each dimension.
    fn max_all(self, b: Self) -> Self {
        xfm(self, b, f64::max)
    }

    /// Returns true if any dimension is NaN.
    fn has_nan(self) -> bool {
        self.into_iter().any(f64::is_nan)
    }

    /// Perform a transformation on each pair of dimensions.
    fn xfm<F: Fn(f64, f64) -> f64>(self, b: Self, f: F) -> Self;
}

pub trait Add<Rhs = Self> {
    fn add(self, rhs: Rhs) -> Self;
    fn sub(self, rhs: Rhs) -> Self
    where
        Self: Sized + Copy,
        Rhs: Point,
    {
        self.add(rhs.scale(-1.0))
    }
}

/// 2D Point (X,Y).
pub type Point2 = [f64; 2];

/// 3D Point (X,Y,Z).
pub type Point3 = [f64; 3];

impl Add for Point2 {
    fn add(self, rhs: Self) -> Self {
        xfm(self, rhs, ops::Add::add)
    }

    fn sub(self, rhs: Self) -> Self {
        xfm(self, rhs, ops::Sub::sub)
    }
}
impl Point for Point2 {
    fn all(v: f64) -> Self {
        [v; 2]
    }
    fn scale(self, scalar: f64) -> Self {
        self.map(|f| f * scalar)
    }
    fn xfm<F: Fn(f64, f64) -> f64>(self, b: Self, f: F) -> Self {
        let [x0, y0] = self;
        let [x1, y1] = b;
        [f(x0, x1), f(y0, y1)]
    }
}

impl Add for Point3 {
    fn add(self, rhs: Self) -> Self {
        Self::xfm(self, rhs, ops::Add::add)
    }

    fn sub(self, rhs: Self) -> Self {
        Self::xfm(self, rhs, ops::Sub::sub)
    }
}
impl Point for Point3 {
    fn all(v: f64) -> Self {
        [v; 3]
    }
    fn scale(self, scalar: f64) -> Self {
        self.map(|f| f * scalar)
    }
    fn xfm<F: Fn(f64, f64) -> f64>(self, b: Self, f: F) -> Self {
        let [x0, y0, z0] = self;
        let [x1, y1, z1] = b;
        [f(x0, x1), f(y0, y1), f(z0, z1)]
    }
}

pub trait ToPoint2 {
    fn to_p2(self) -> Point2;
}

impl ToPoint2 for Point2 {
    fn to_p2(self) -> Point2 {
        self
    }
}
impl ToPoint2 for &Point2 {
    fn to_p2(self) -> Point2 {
        *self
    }
}
impl ToPoint2 for Point3 {
    fn to_p2(self) -> Point2 {
        let [x, y, _] = self;
        [x, y]
    }
}
impl ToPoint2 for &Point3 {
    fn to_p2(self) -> Point2 {
        (*self).to_p2()
    }
}

pub trait WithZ: ToPoint2 + Sized {
    fn with_z(self, z: f64) -> Point3 {
        let [x, y] = self.to_p2();
        [x, y, z]
    }
}

impl WithZ for Point2 {}
impl WithZ for Point3 {}

pub fn dot_prod(a: Point3, b: Point3) -> f64 {
    a.into_iter().zip(b).map(|(a, b)| a * b).sum()
}

#[allow(clippy::many_single_char_names)]
pub fn xprod(a: Point3, b: Point3) -> Point3 {
    let [ax, ay, az] = a;
    let [bx, by, bz] = b;
    let x = ay * bz - az * by;
    let y = az * bx - ax * bz;
    let z = ax * by - ay * bx;
    [x, y, z]
}

/// The z component of the cross product of two plan vectors.
///
/// Positive when `b` is counter-clockwise of `a`.
pub fn xprod2(a: impl ToPoint2, b: impl ToPoint2) -> f64 {
    let [ax, ay] = a.to_p2();
    let [bx, by] = b.to_p2();
    ax * by - ay * bx
}

pub fn len_xy(p: impl ToPoint2) -> f64 {
    p.to_p2().mag()
}

/// Plan distance between two points.
pub fn dist_xy(a: impl ToPoint2, b: impl ToPoint2) -> f64 {
    len_xy(a.to_p2().sub(b.to_p2()))
}

/// Equality on the plan coordinates only.
#[allow(clippy::float_cmp)]
pub fn same_xy(a: impl ToPoint2, b: impl ToPoint2) -> bool {
    a.to_p2() == b.to_p2()
}

/// Linear interpolation `a + (b - a) * t`.
pub fn lerp<P: Point + Add>(a: P, b: P, t: f64) -> P {
    a.add(b.sub(a).scale(t))
}

/// The angle of the vector `from -> to`, from the positive x-axis, in `(-π, π]`.
pub fn angle(from: impl ToPoint2, to: impl ToPoint2) -> f64 {
    let [dx, dy] = to.to_p2().sub(from.to_p2());
    dy.atan2(dx)
}

/// The oriented angle from `tail -> tip1` to `tail -> tip2`, in `(-π, π]`.
///
/// Positive values are counter-clockwise rotations.
pub fn angle_between_oriented(tip1: Point2, tail: Point2, tip2: Point2) -> f64 {
    use std::f64::consts::PI;

    let d = angle(tail, tip2) - angle(tail, tip1);
    if d <= -PI {
        d + 2.0 * PI
    } else if d > PI {
        d - 2.0 * PI
    } else {
        d
    }
}

/// Apply an ordering to points by testing each x,y,z.
pub fn ordpt<P: Point>(a: P, b: P) -> std::cmp::Ordering {
    use std::cmp::Ordering::Equal;

    a.into_iter().zip(b).fold(
        Equal,
        |o, (a, b)| {
            if o == Equal {
                a.total_cmp(&b)
            } else {
                o
            }
        },
    )
}

/// Helper function which effectively transforms to [`Point::xfm`].
#[inline(always)]
pub fn xfm<P: Point, F: Fn(f64, f64) -> f64>(a: P, b: P, f: F) -> P {
    P::xfm(a, b, f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn point_adding() {
        let p = [0.0, 1.0].add([3.0, 1.0]);
        assert_eq!(p, [3.0, 2.0]);

        let p = [0.0, 1.0, 5.0].add([3.0, 1.0, 5.0]);
        assert_eq!(p, [3.0, 2.0, 10.0]);

        let p = [0.0, 1.0, 5.0].sub([3.0, 1.0, 5.0]);
        assert_eq!(p, [-3.0, 0.0, 0.0]);
    }

    #[test]
    fn to_point_testing() {
        assert_eq!([0.0, 1.0].to_p2(), [0.0, 1.0]);
        assert_eq!([0.0, 1.0, 2.0].to_p2(), [0.0, 1.0]);
        assert_eq!([4.0, 1.0].with_z(3.0), [4.0, 1.0, 3.0]);
    }

    #[test]
    fn xproduct_test() {
        let v = xprod([1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
        assert_eq!(v, [0.0, 0.0, 1.0]);

        assert_eq!(xprod2([1.0, 0.0], [0.0, 1.0]), 1.0);
        assert_eq!(xprod2([0.0, 1.0], [1.0, 0.0]), -1.0);
    }

    #[test]
    fn distances() {
        let x = dist_xy([0.0, 0.0, 10.0], [3.0, 4.0, -2.0]) - 5.0;
        assert!(x.abs() < 1e-11);

        let m = [2.0, -3.0, 6.0].mag() - 7.0;
        assert!(m.abs() < 1e-11);

        assert!(same_xy([1.0, 2.0, 3.0], [1.0, 2.0, 99.0]));
        assert!(!same_xy([1.0, 2.0, 3.0], [1.0, 2.5, 3.0]));
    }

    #[test]
    fn lerp_test() {
        assert_eq!(lerp([0.0, 0.0, 0.0], [10.0, 20.0, 4.0], 0.5), [5.0, 10.0, 2.0]);
        assert_eq!(lerp([1.0, 1.0], [3.0, 1.0], 0.0), [1.0, 1.0]);
        assert_eq!(lerp([1.0, 1.0], [3.0, 1.0], 1.0), [3.0, 1.0]);
    }

    #[test]
    fn oriented_angles() {
        let a = angle_between_oriented([1.0, 0.0], [0.0, 0.0], [0.0, 1.0]);
        assert!((a - FRAC_PI_2).abs() < 1e-11);

        let a = angle_between_oriented([0.0, 1.0], [0.0, 0.0], [1.0, 0.0]);
        assert!((a + FRAC_PI_2).abs() < 1e-11);

        // straight through is +π, never -π
        let a = angle_between_oriented([-1.0, 0.0], [0.0, 0.0], [1.0, 0.0]);
        assert!((a - PI).abs() < 1e-11);
    }

    #[test]
    fn ordering_points() {
        use std::cmp::Ordering::*;
        assert_eq!(ordpt([0.0, 1.0], [0.0, 2.0]), Less);
        assert_eq!(ordpt([1.0, 0.0], [0.0, 2.0]), Greater);
        assert_eq!(ordpt([1.0, 2.0, 3.0], [1.0, 2.0, 3.0]), Equal);
    }

    #[quickcheck]
    fn nan_detection(x: f64, y: f64, z: f64) -> bool {
        [x, y, z].has_nan() == (x.is_nan() || y.is_nan() || z.is_nan())
    }
}
