use crate::*;

/// Ax + By + Cz = D
#[derive(Debug, Clone)]
pub struct Plane {
    d: f64,
    normal: Point3,
}

impl Plane {
    /// The plane through `p` with the given normal.
    pub fn new(p: Point3, normal: Point3) -> Self {
        let d = dot_prod(normal, p);
        Self { d, normal }
    }

    pub fn a(&self) -> f64 {
        self.normal[0]
    }

    pub fn b(&self) -> f64 {
        self.normal[1]
    }

    pub fn c(&self) -> f64 {
        self.normal[2]
    }

    pub fn d(&self) -> f64 {
        self.d
    }

    pub fn is_vertical(&self) -> bool {
        self.c() == 0.0
    }

    /// The z value of the plane at the plan point `p`.
    ///
    /// A vertical plane has no single z, NaN is returned.
    pub fn register_z(&self, p: impl ToPoint2) -> f64 {
        if self.is_vertical() {
            return f64::NAN;
        }

        let [px, py] = p.to_p2();

        let i = self.d() - self.a() * px - self.b() * py;
        i / self.c()
    }
}

impl From<&Tri> for Plane {
    fn from(tri: &Tri) -> Self {
        let n = tri[0].scale(-1.0);
        let a = tri[1].add(n); // p1 - p0
        let b = tri[2].add(n); // p2 - p0
        Plane::new(tri[0], xprod(a, b))
    }
}
