use crate::*;

/// Points closer than this to a triangle (in barycentric error) are taken as inside it.
const LOCATE_TOLERANCE: f64 = 1e-9;

/// A triangulated terrain along with an index over its triangle envelopes.
#[derive(Debug, Clone)]
pub struct Terrain {
    pub(crate) mesh: TriMesh,
    pub(crate) index: Index<u32>,
}

impl Terrain {
    pub fn new(mesh: TriMesh) -> Self {
        let index = Index::new(
            mesh.tris()
                .enumerate()
                .map(|(i, tri)| (Extents2::from(tri.aabb()), i as u32)),
        );

        Self { mesh, index }
    }

    pub fn mesh(&self) -> &TriMesh {
        &self.mesh
    }

    /// The barycentric test of `p` against triangle `t`.
    pub(crate) fn tri_contains(&self, t: u32, p: Point2) -> (bool, f64) {
        let [a, b, c] = self.mesh.tri(t);
        let (inside, err) = dot_in_tri(p, a.to_p2(), b.to_p2(), c.to_p2());
        (inside || err <= LOCATE_TOLERANCE, err)
    }

    /// The triangle containing `p`.
    ///
    /// Where `p` lays on a shared edge or vertex, the triangle with the lowest error wins, then
    /// the lowest index.
    pub fn locate(&self, p: impl ToPoint2) -> Option<u32> {
        let p = p.to_p2();
        self.index
            .query(Extents2::point(p))
            .filter_map(|&t| {
                let (inside, err) = self.tri_contains(t, p);
                inside.then_some((err, t))
            })
            .min_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)))
            .map(|(_, t)| t)
    }

    /// The elevation of the terrain at `p` interpolated over the triangle plane
    /// containing it, or `None` outside the mesh.
    pub fn z_at(&self, p: impl ToPoint2) -> Option<f64> {
        let p = p.to_p2();
        let t = self.locate(p)?;
        Some(Plane::from(&self.mesh.tri(t)).register_z(p))
    }

    /// The elevation of the terrain at `p`; NaN outside the mesh.
    pub fn z_ground(&self, p: impl ToPoint2) -> f64 {
        self.z_at(p).unwrap_or(f64::NAN)
    }
}
