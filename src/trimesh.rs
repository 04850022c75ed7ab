use crate::*;
use spade::{ConstrainedDelaunayTriangulation, Point2 as SPoint, Triangulation};

/// Triangle represented by 3 points (A, B, C).
pub type Tri = [Point3; 3];

impl Aabb for Tri {
    type Space = Point3;
    fn aabb(&self) -> Extents<Self::Space> {
        Extents::from_iter(*self)
    }
}

/// A triangle mesh with neighbour links.
///
/// Triangles are stored counter-clockwise. `neighbours[i]` holds the triangle across the edges
/// (A,B), (B,C), and (C,A) of triangle `i`, in that order, or `None` on the mesh boundary.
/// Everything is addressed by index.
#[derive(Debug, PartialEq, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct TriMesh {
    /// The _distinct_ points.
    points: Vec<Point3>,
    /// Each _triangle_ is a triplet of points.
    ///
    /// Each tuple entry is the _index_ back into the `points`.
    triangles: Vec<(u32, u32, u32)>,
    neighbours: Vec<[Option<u32>; 3]>,
}

impl TriMesh {
    /// Build a mesh from raw points and triangles, resolving the neighbour links.
    pub fn from_raw(points: Vec<Point3>, triangles: Vec<(u32, u32, u32)>) -> Self {
        let neighbours = edges::neighbours(&triangles);
        Self {
            points,
            triangles,
            neighbours,
        }
    }

    /// Constrained Delaunay triangulation of `points`, honouring `lines` as break-lines.
    ///
    /// Points sharing a plan location are merged, the last z wins.
    /// Break-lines that would cross an existing break-line are skipped with a warning.
    pub fn triangulate(points: &[Point3], lines: &[(Point3, Point3)]) -> Result<Self> {
        let mut cdt = ConstrainedDelaunayTriangulation::<SPoint<f64>>::new();
        let mut zs: Vec<f64> = Vec::with_capacity(points.len() + lines.len() * 2);

        let mut insert = |cdt: &mut ConstrainedDelaunayTriangulation<SPoint<f64>>,
                          [x, y, z]: Point3| {
            let h = cdt
                .insert(SPoint::new(x, y))
                .map_err(|e| Error::Triangulation(format!("{e:?} at ({x}, {y})")))?;
            let i = h.index();
            if i >= zs.len() {
                zs.resize(i + 1, f64::NAN);
            }
            zs[i] = z;
            Ok::<_, Error>(h)
        };

        for p in points {
            insert(&mut cdt, *p)?;
        }

        for (a, b) in lines {
            let a = insert(&mut cdt, *a)?;
            let b = insert(&mut cdt, *b)?;
            if a == b {
                continue;
            }
            if cdt.can_add_constraint(a, b) {
                cdt.add_constraint(a, b);
            } else {
                log::warn!("break-line crosses another break-line and is skipped");
            }
        }

        if cdt.num_inner_faces() == 0 {
            return Err(Error::Triangulation(format!(
                "{} vertices do not form a triangle",
                cdt.num_vertices()
            )));
        }

        let points = cdt
            .vertices()
            .map(|v| {
                let p = v.position();
                let z = zs.get(v.fix().index()).copied().unwrap_or(f64::NAN);
                [p.x, p.y, z]
            })
            .collect::<Vec<_>>();

        let triangles = cdt
            .inner_faces()
            .map(|f| {
                let [a, b, c] = f.vertices().map(|v| v.fix().index() as u32);
                (a, b, c)
            })
            .collect::<Vec<_>>();

        log::debug!(
            "triangulated {} vertices into {} triangles",
            points.len(),
            triangles.len()
        );

        Ok(Self::from_raw(points, triangles))
    }

    pub fn point_len(&self) -> usize {
        self.points.len()
    }

    pub fn tri_len(&self) -> usize {
        self.triangles.len()
    }

    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    /// The triangle at `idx`.
    ///
    /// # Panics
    /// Panics if `idx` is out of bounds.
    pub fn tri(&self, idx: u32) -> Tri {
        let (a, b, c) = self.triangles[idx as usize];
        [
            self.points[a as usize],
            self.points[b as usize],
            self.points[c as usize],
        ]
    }

    /// The neighbours of triangle `idx`, across (A,B), (B,C), (C,A).
    pub fn neighbours(&self, idx: u32) -> [Option<u32>; 3] {
        self.neighbours
            .get(idx as usize)
            .copied()
            .unwrap_or([None; 3])
    }

    pub fn tris(&self) -> impl ExactSizeIterator<Item = Tri> + '_ {
        (0..self.triangles.len() as u32).map(move |i| self.tri(i))
    }

    /// Every undirected edge once, along with the lowest triangle index using it.
    pub fn edges(&self) -> impl Iterator<Item = (Point3, Point3, u32)> + '_ {
        (0..self.triangles.len() as u32).flat_map(move |t| {
            let [a, b, c] = self.tri(t);
            let ns = self.neighbours(t);
            [(a, b), (b, c), (c, a)]
                .into_iter()
                .zip(ns)
                .filter(move |(_, n)| n.map_or(true, |n| n > t))
                .map(move |((p, q), _)| (p, q, t))
        })
    }
}

/// Test if a point lays **on** a [`TriMesh`].
///
/// Note this solely tests for 2D intersection.
impl Envelops<Point2> for TriMesh {
    fn envelops(&self, p: Point2) -> bool {
        if Extents2::from(self.aabb()).envelops(p) {
            self.tris()
                .any(|[a, b, c]| dot_in_tri(p, a.to_p2(), b.to_p2(), c.to_p2()).0)
        } else {
            false
        }
    }
}

impl Aabb for TriMesh {
    type Space = Point3;
    fn aabb(&self) -> Extents3 {
        self.points().iter().copied().collect()
    }
}

mod edges {
    use super::*;
    use std::hash::*;

    /// An undirected edge between two point indices.
    #[derive(PartialEq, Eq, Copy, Clone, Debug, PartialOrd, Ord)]
    pub struct Edge(pub u32, pub u32);

    impl Edge {
        #[inline(always)]
        pub fn ord(self) -> Self {
            if self.0 <= self.1 {
                self
            } else {
                Edge(self.1, self.0)
            }
        }

        #[inline(always)]
        fn as_u64(&self) -> u64 {
            ((self.0 as u64) << 32) | self.1 as u64
        }
    }

    #[allow(clippy::derive_hash_xor_eq)]
    impl Hash for Edge {
        #[inline(always)]
        fn hash<H: Hasher>(&self, hasher: &mut H) {
            hasher.write_u64(self.as_u64())
        }
    }

    /// Match each triangle side with the other triangle sharing its points.
    pub fn neighbours(triangles: &[(u32, u32, u32)]) -> Vec<[Option<u32>; 3]> {
        let mut ns = vec![[None; 3]; triangles.len()];
        let mut open: HashMap<Edge, (u32, usize)> =
            HashMap::with_capacity_and_hasher(triangles.len() * 2, Default::default());

        for (t, &(a, b, c)) in triangles.iter().enumerate() {
            let t = t as u32;
            for (side, e) in [Edge(a, b), Edge(b, c), Edge(c, a)].into_iter().enumerate() {
                match open.remove(&e.ord()) {
                    Some((other, oside)) => {
                        ns[t as usize][side] = Some(other);
                        ns[other as usize][oside] = Some(t);
                    }
                    None => {
                        open.insert(e.ord(), (t, side));
                    }
                }
            }
        }

        ns
    }
}
