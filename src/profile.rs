//! Cutting profiles through a sealed [`Scene`].
use crate::*;
use IntersectionType::{Building, GroundEffect, Receiver, Source, Topography, Wall};

/// Distance past a ground boundary crossing at which the ground in effect is sampled.
const GROUND_STEP: f64 = 1e-6;

/// Split `c0 -> c1` into consecutive segments no longer than `max_len` in plan.
///
/// A line shorter than `max_len` (or a non-positive `max_len`) comes back whole.
///
/// # Example
/// ```rust
/// use cutprofile::*;
/// let s = split_segment([0.0, 0.0, 0.0], [150.0, 0.0, 15.0], 60.0);
/// assert_eq!(s.len(), 3);
/// assert_eq!(s[1].p0, [60.0, 0.0, 6.0]);
/// assert_eq!(s[2].p1, [150.0, 0.0, 15.0]);
/// ```
pub fn split_segment(c0: Point3, c1: Point3, max_len: f64) -> Vec<Segment> {
    let l = dist_xy(c0, c1);
    if !(max_len > 0.0) || !(l >= max_len) {
        return vec![Segment::new(c0, c1)];
    }

    let frac = max_len / l;
    let n = (l / max_len).ceil() as usize;
    (0..n)
        .map(|i| {
            let t0 = i as f64 * frac;
            let t1 = ((i + 1) as f64 * frac).min(1.0);
            Segment::new(lerp(c0, c1, t0), lerp(c0, c1, t1))
        })
        .collect()
}

impl Scene {
    /// The cut profile from `source` to `receiver`, using the configured default ground
    /// coefficient.
    pub fn profile(&self, source: Point3, receiver: Point3) -> CutProfile {
        self.profile_with_ground(source, receiver, self.config.ground_coefficient)
    }

    /// As [`Scene::profile`] but keeping the identifier, ground coefficient, and wall
    /// absorption of the given source and receiver points.
    pub fn profile_between(&self, source: &CutPoint, receiver: &CutPoint, g: f64) -> CutProfile {
        let mut profile = self.profile_with_ground(source.coordinate, receiver.coordinate, g);
        if let Some(end) = profile.source_mut() {
            end.id = source.id;
            end.ground_coef = source.ground_coef;
            end.wall_alpha = source.wall_alpha.clone();
        }
        if let Some(end) = profile.receiver_mut() {
            end.id = receiver.id;
            end.ground_coef = receiver.ground_coef;
            end.wall_alpha = receiver.wall_alpha.clone();
        }
        profile
    }

    /// The cut profile from `source` to `receiver`, where `g` is the ground coefficient
    /// outside every ground region.
    ///
    /// Points come back ordered along the line: the source first, then terrain samples and
    /// boundary crossings, then the receiver. Each run of building crossings is framed by a
    /// ground level point on entry and exit.
    pub fn profile_with_ground(&self, source: Point3, receiver: Point3, g: f64) -> CutProfile {
        let line = Segment::new(source, receiver);

        let mut pts = Vec::new();
        self.add_topography(&line, g, &mut pts);
        self.add_crossings(&line, g, &mut pts);
        sort_along(&line, &mut pts);

        let mut pts = self.add_building_bases(pts);
        pts.insert(
            0,
            CutPoint::source(source).with_ground(self.ground_coefficient(source, g)),
        );
        pts.push(CutPoint::receiver(receiver).with_ground(self.ground_coefficient(receiver, g)));

        anchor_ends(&mut pts);
        collapse_runs(&mut pts);
        resolve_ground_duplicates(&mut pts, self.config.duplicate_ground_policy, |p| {
            self.ground_after(p, &line, g)
        });

        log::debug!(
            "profile ({}, {}) -> ({}, {}): {} points",
            source[0],
            source[1],
            receiver[0],
            receiver[1],
            pts.len()
        );

        CutProfile::from_points(pts)
    }

    fn add_topography(&self, line: &Segment, g: f64, pts: &mut Vec<CutPoint>) {
        let Some(terrain) = self.terrain() else {
            return;
        };
        let samples = terrain.walk(line.p0, line.p1, self.config.triangle_intersection_epsilon);
        for p in simplify(&samples, self.config.topography_tolerance) {
            pts.push(CutPoint::new(p, Topography).with_ground(self.ground_coefficient(p, g)));
        }
    }

    /// Crossings of the line with building sides, free walls, and ground region boundaries.
    fn add_crossings(&self, line: &Segment, g: f64, pts: &mut Vec<CutPoint>) {
        let mut ids = split_segment(line.p0, line.p1, self.config.max_line_length)
            .iter()
            .flat_map(|s| self.processed_index.query(s.aabb()).copied())
            .collect::<Vec<_>>();
        ids.sort_unstable();
        ids.dedup();

        for id in ids {
            let wall = &self.processed_walls()[id];
            let seg = wall.segment();
            let Some(x) = line.intersect(&seg) else {
                continue;
            };
            let xy = x.to_p2();
            let z = if wall.p0[2].is_finite() && wall.p1[2].is_finite() {
                seg.z_at(xy)
            } else {
                self.z_ground(xy)
            };
            let at = xy.with_z(z);

            match &wall.kind {
                WallKind::Building { building, alphas } => {
                    let mut c = CutPoint::new(at, Building)
                        .with_id(*building)
                        .with_ground(self.ground_coefficient(xy, g));
                    c.wall_alpha = Some(alphas.clone());
                    c.on_wall_end = same_xy(xy, wall.p0) || same_xy(xy, wall.p1);
                    pts.push(c);
                }
                WallKind::Free { wall: w, alphas, .. } => {
                    let coef = match self.region_at(xy) {
                        Some(r) => self.ground_regions()[r].coefficient(),
                        None => self
                            .ground_regions()
                            .get(*w)
                            .map_or(g, GroundAbsorption::coefficient),
                    };
                    let mut c = CutPoint::new(at, Wall).with_id(*w).with_ground(coef);
                    c.wall_alpha = Some(alphas.clone());
                    c.on_wall_end = same_xy(xy, wall.p0) || same_xy(xy, wall.p1);
                    pts.push(c);
                }
                WallKind::Ground { region } => {
                    // passing through a boundary vertex is not a crossing
                    if same_xy(xy, wall.p0) || same_xy(xy, wall.p1) {
                        continue;
                    }
                    let c = CutPoint::new(at, GroundEffect)
                        .with_id(*region)
                        .with_ground(self.ground_after(xy, line, g));
                    pts.push(c);
                }
                WallKind::Topography { .. } => (),
            }
        }
    }

    /// The ground coefficient just past `p`, heading along `line`.
    fn ground_after(&self, p: Point2, line: &Segment, g: f64) -> f64 {
        let d = line.dir();
        let l = len_xy(d);
        if l == 0.0 {
            return self.ground_coefficient(p, g);
        }
        let ahead = p.add(d.scale(GROUND_STEP / l));
        self.ground_coefficient(ahead, g)
    }

    /// Frame each run of same building crossings with ground level points.
    fn add_building_bases(&self, pts: Vec<CutPoint>) -> Vec<CutPoint> {
        let mut out: Vec<CutPoint> = Vec::with_capacity(pts.len() + 4);
        // (building, index in `out` of the run's last point)
        let mut run: Option<(Option<usize>, usize)> = None;

        for c in pts {
            if c.kind != Building {
                out.push(c);
                continue;
            }

            match run {
                Some((id, _)) if id == c.id => (),
                Some((_, last)) => {
                    let base = self.base_of(&out[last]);
                    out.insert(last + 1, base);
                    out.push(self.base_of(&c));
                }
                None => out.push(self.base_of(&c)),
            }
            run = Some((c.id, out.len()));
            out.push(c);
        }

        if let Some((_, last)) = run {
            let base = self.base_of(&out[last]);
            out.insert(last + 1, base);
        }

        out
    }

    fn base_of(&self, c: &CutPoint) -> CutPoint {
        let z = self.z_ground(c.coordinate);
        let mut base = c.clone();
        base.coordinate[2] = if z.is_nan() { 0.0 } else { z };
        base.on_wall_end = false;
        base
    }
}

/// Order points along `line`, ties broken by plan coordinate.
fn sort_along(line: &Segment, pts: &mut [CutPoint]) {
    pts.sort_by(|a, b| {
        line.project(a.coordinate)
            .total_cmp(&line.project(b.coordinate))
            .then_with(|| ordpt(a.coordinate.to_p2(), b.coordinate.to_p2()))
    });
}

/// Make sure the source comes first and the receiver last.
fn anchor_ends(pts: &mut Vec<CutPoint>) {
    let first = pts.first().map(|c| c.kind);
    let last = pts.last().map(|c| c.kind);
    match (first, last) {
        (Some(Source), Some(Receiver)) => (),
        (Some(Receiver), Some(Source)) => {
            log::error!("profile is reversed, the source must come first");
            pts.reverse();
        }
        _ => {
            log::error!("profile source and receiver are not at its ends");
            let src = pts.iter().position(|c| c.kind == Source).map(|i| pts.remove(i));
            let rcv = pts.iter().position(|c| c.kind == Receiver).map(|i| pts.remove(i));
            if let Some(src) = src {
                pts.insert(0, src);
            }
            if let Some(rcv) = rcv {
                pts.push(rcv);
            }
        }
    }
}

/// Collapse runs of three or more identical non building events down to two.
fn collapse_runs(pts: &mut Vec<CutPoint>) {
    let mut out: Vec<CutPoint> = Vec::with_capacity(pts.len());
    for c in pts.drain(..) {
        let n = out.len();
        if c.kind != Building
            && n >= 2
            && out[n - 1].same_event(&c)
            && out[n - 2].same_event(&c)
        {
            continue;
        }
        out.push(c);
    }
    *pts = out;
}

#[allow(clippy::float_cmp)]
fn ground_conflict(a: &CutPoint, b: &CutPoint) -> bool {
    a.kind != Building && a.same_place(b) && a.ground_coef != b.ground_coef
}

/// Reduce adjacent non building points at the same place but with different ground
/// coefficients to one.
///
/// `ground_after` gives the ground in effect just past a coordinate.
#[allow(clippy::float_cmp)]
fn resolve_ground_duplicates<F>(
    pts: &mut Vec<CutPoint>,
    policy: DuplicateGroundPolicy,
    ground_after: F,
) where
    F: Fn(Point2) -> f64,
{
    match policy {
        DuplicateGroundPolicy::LastRegistered => {
            let mut i = 0;
            while i + 1 < pts.len() {
                if !ground_conflict(&pts[i], &pts[i + 1]) {
                    i += 1;
                    continue;
                }
                let after = ground_after(pts[i].coordinate.to_p2());
                if pts[i].ground_coef == after && pts[i + 1].ground_coef != after {
                    pts.remove(i + 1);
                } else {
                    pts.remove(i);
                }
                // the survivor may conflict with the next point
            }
        }
        DuplicateGroundPolicy::Parity => {
            let mut k = 0usize;
            let mut i = 0;
            while i + 2 < pts.len() {
                if !ground_conflict(&pts[i], &pts[i + 1]) {
                    i += 1;
                    continue;
                }
                k += 1;
                let zero = pts[i].ground_coef == 0.0;
                if (k % 2 == 1) == zero {
                    pts.remove(i + 1);
                } else {
                    pts.remove(i);
                    i += 1;
                }
            }
        }
    }
}
