//! Diffraction corners of building footprints.
use crate::*;
use std::f64::consts::PI;

impl Building {
    /// Points offset outwards from each footprint corner whose open field angle lays strictly
    /// between `min` and `max` (radians).
    ///
    /// Points are offset by `eps` along the corner bisector, at `eps` above the roof. The list
    /// runs counter-clockwise and is closed by repeating the first point. No corner within the
    /// range returns an empty list.
    pub fn wide_angle_points(&self, min: f64, max: f64, eps: f64) -> Vec<Point3> {
        let mut ring = self.footprint().to_vec();
        if !polygon::is_ccw(&ring) {
            ring.reverse();
        }

        let n = ring.len();
        let z = self.roof_z() + eps;
        let mut pts = Vec::with_capacity(n);

        for i in 0..n - 1 {
            let prev = ring[if i > 0 { i - 1 } else { n - 2 }].to_p2();
            let cur = ring[i].to_p2();
            let next = ring[i + 1].to_p2();

            let a = angle_between_oriented(prev, cur, next);
            let open = if a >= 0.0 { a } else { 2.0 * PI + a };

            if open > min && open < max {
                let mid = angle(cur, prev) + open / 2.0;
                let [x, y] = cur;
                pts.push([x + mid.cos() * eps, y + mid.sin() * eps, z]);
            }
        }

        if let Some(&first) = pts.first() {
            pts.push(first);
        }

        pts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 0.01;

    fn building(pts: &[Point2]) -> Building {
        let mut b = Building::new(pts.iter().map(|p| p.with_z(0.0)), 10.0, vec![], -1).unwrap();
        b.resolve_z(0.0, false);
        b
    }

    #[test]
    fn square_corners() {
        let corners = [[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0]];
        let b = building(&corners);
        let pts = b.wide_angle_points(0.0, 2.0 * PI, EPS);

        assert_eq!(pts.len(), 5);
        assert_eq!(pts[0], pts[4]);
        for (p, c) in pts.iter().zip(corners) {
            assert!((dist_xy(*p, c) - EPS).abs() < 1e-12);
            assert!(!b.polygon().covers(*p));
            assert!((p[2] - (10.0 + EPS)).abs() < 1e-12);
        }
    }

    #[test]
    fn winding_does_not_matter() {
        let ccw = building(&[[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0]]);
        let cw = building(&[[0.0, 0.0], [0.0, 10.0], [10.0, 10.0], [10.0, 0.0]]);

        let mut a = ccw.wide_angle_points(0.0, 2.0 * PI, EPS);
        let mut b = cw.wide_angle_points(0.0, 2.0 * PI, EPS);
        a.pop();
        b.pop();
        for p in a {
            assert!(b.iter().any(|q| q.sub(p).mag() < 1e-12));
        }
    }

    #[test]
    fn reflex_corners_filtered() {
        // L shape, the inner corner at (5, 5) opens a quarter turn to the free field
        let b = building(&[
            [0.0, 0.0],
            [10.0, 0.0],
            [10.0, 5.0],
            [5.0, 5.0],
            [5.0, 10.0],
            [0.0, 10.0],
        ]);

        let all = b.wide_angle_points(0.0, 2.0 * PI, EPS);
        assert_eq!(all.len(), 7);

        let outer = b.wide_angle_points(PI, 2.0 * PI, EPS);
        assert_eq!(outer.len(), 6);
        assert!(outer.iter().all(|p| dist_xy(*p, [5.0, 5.0]) > 1.0));

        let inner = b.wide_angle_points(0.0, PI, EPS);
        assert_eq!(inner.len(), 2);
        assert!((dist_xy(inner[0], [5.0, 5.0]) - EPS).abs() < 1e-12);
        // offset into the free field, away from the footprint
        assert!(!b.polygon().covers(inner[0]));
    }

    #[test]
    fn empty_range() {
        let b = building(&[[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0]]);
        assert!(b.wide_angle_points(0.0, PI, EPS).is_empty());
    }
}
