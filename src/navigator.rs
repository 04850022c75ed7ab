//! Walking the terrain mesh along a plan line.
use crate::*;

impl Terrain {
    /// Walk the mesh triangle by triangle from `p1` towards `p2`, returning elevation samples
    /// in order along the line.
    ///
    /// The first sample is `p1` when it lays on the mesh, otherwise the nearest point where
    /// the line enters the mesh. Each edge crossing follows, then `p2` if the walk reaches the
    /// triangle containing it. A line that never meets the mesh returns no samples.
    ///
    /// `eps` is the tolerance between the line and a triangle edge for a crossing.
    pub fn walk(&self, p1: impl ToPoint2, p2: impl ToPoint2, eps: f64) -> Vec<Point3> {
        let (p1, p2) = (p1.to_p2(), p2.to_p2());
        let line = Segment::flat(p1, p2);

        let mut samples = Vec::new();

        let start = match self.locate(p1) {
            Some(t) => Some((t, p1.with_z(self.plane_z(t, p1)))),
            None => self.entry(&line),
        };
        let Some((mut cur, first)) = start else {
            return samples;
        };
        samples.push(first);

        let mut visited: HashSet<u32> = HashSet::default();

        // each triangle is entered at most once
        for _ in 0..=self.mesh.tri_len() {
            visited.insert(cur);

            if self.tri_contains(cur, p2).0 {
                push_distinct(&mut samples, p2.with_z(self.plane_z(cur, p2)));
                break;
            }

            let Some((x, next)) = self.next_tri(cur, &line, &visited, eps) else {
                break;
            };
            push_distinct(&mut samples, x);

            match next {
                Some(n) => cur = n,
                None => break, // left the mesh
            }
        }

        samples
    }

    fn plane_z(&self, t: u32, p: Point2) -> f64 {
        Plane::from(&self.mesh.tri(t)).register_z(p)
    }

    /// The point nearest `line.p0` where the line meets a triangle, with that triangle.
    fn entry(&self, line: &Segment) -> Option<(u32, Point3)> {
        let query = line.aabb().thicken(1.0, 1.0);

        self.index
            .query(query)
            .flat_map(|&t| {
                let [a, b, c] = self.mesh.tri(t);
                [(a, b), (b, c), (c, a)]
                    .into_iter()
                    .filter_map(move |(p, q)| {
                        let edge = Segment::new(p, q);
                        line.intersect(&edge)
                            .map(|x| (line.project(x), t, x.to_p2().with_z(edge.z_at(x))))
                    })
            })
            .min_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)))
            .map(|(_, t, x)| (t, x))
    }

    /// Find the edge of triangle `t` crossed by `line` nearest to its end, skipping edges
    /// leading back into visited triangles.
    ///
    /// Returns the crossing and the triangle across it (`None` at the mesh boundary).
    fn next_tri(
        &self,
        t: u32,
        line: &Segment,
        visited: &HashSet<u32>,
        eps: f64,
    ) -> Option<(Point3, Option<u32>)> {
        let [a, b, c] = self.mesh.tri(t);
        let ns = self.mesh.neighbours(t);
        let end = line.p1.to_p2();

        let mut nearest: Option<(f64, Point3, Option<u32>)> = None;

        for ((p, q), n) in [(a, b), (b, c), (c, a)].into_iter().zip(ns) {
            if n.map_or(false, |n| visited.contains(&n)) {
                continue;
            }

            let edge = Segment::new(p, q);
            let (on_line, on_edge) = line.closest_points(&edge);
            if dist_xy(on_line, on_edge) >= eps {
                continue;
            }

            let x = on_line.to_p2().with_z(edge.z_at(on_line));
            let d = dist_xy(x, end);
            if nearest.map_or(true, |(nd, _, _)| d < nd) {
                nearest = Some((d, x, n));
            }
        }

        nearest.map(|(_, x, n)| (x, n))
    }
}

fn push_distinct(samples: &mut Vec<Point3>, p: Point3) {
    if samples.last().map_or(true, |l| !same_xy(l, p)) {
        samples.push(p);
    }
}

/// Drop interior samples laying within `tol` of the segment joining the previously retained
/// sample and the next sample. The first and last samples are always kept, as are samples
/// where the distance cannot be computed (NaN elevations).
pub fn simplify(samples: &[Point3], tol: f64) -> Vec<Point3> {
    let n = samples.len();
    if n <= 2 {
        return samples.to_vec();
    }

    let mut kept = Vec::with_capacity(n);
    kept.push(samples[0]);

    for i in 1..n - 1 {
        let prev = kept[kept.len() - 1];
        let d = Segment::new(prev, samples[i + 1]).dist_3d(samples[i]);
        if !(d < tol) {
            kept.push(samples[i]);
        }
    }

    kept.push(samples[n - 1]);
    kept
}
