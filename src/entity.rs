use crate::*;
use std::sync::Arc;

/// A building footprint with a height.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Building {
    /// Closed ring, the first point is repeated last.
    footprint: Vec<Point3>,
    plan: Polygon2,
    height: f64,
    alphas: Arc<[f64]>,
    origin_id: i64,
    ground_z: f64,
}

impl Building {
    /// A building from a footprint ring, which is closed if open.
    ///
    /// A NaN `height` defers to the footprint's z as the absolute roof elevation.
    pub fn new<I>(footprint: I, height: f64, alphas: Vec<f64>, origin_id: i64) -> Result<Self>
    where
        I: IntoIterator<Item = Point3>,
    {
        let mut footprint = footprint.into_iter().collect::<Vec<_>>();
        footprint.dedup_by(|a, b| same_xy(*a, *b));
        let plan = Polygon2::new(footprint.iter())?;

        if footprint.first().map(ToPoint2::to_p2) != footprint.last().map(ToPoint2::to_p2) {
            footprint.push(footprint[0]);
        }

        if height < 0.0 {
            return Err(Error::InvalidGeometry(format!(
                "building height {height} is negative"
            )));
        }

        Ok(Self {
            footprint,
            plan,
            height,
            alphas: alphas.into(),
            origin_id,
            ground_z: f64::NAN,
        })
    }

    pub fn footprint(&self) -> &[Point3] {
        &self.footprint
    }

    pub fn polygon(&self) -> &Polygon2 {
        &self.plan
    }

    /// Height above ground. NaN until resolved when the height was not supplied.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// The roof elevation, carried on every footprint point.
    pub fn roof_z(&self) -> f64 {
        self.footprint[0][2]
    }

    /// The mean ground elevation under the footprint, resolved when sealed.
    pub fn ground_z(&self) -> f64 {
        self.ground_z
    }

    pub fn alphas(&self) -> &Arc<[f64]> {
        &self.alphas
    }

    pub fn origin_id(&self) -> i64 {
        self.origin_id
    }

    /// Fix the roof elevation from the ground under the building.
    ///
    /// With `absolute` set, or no height given, a usable footprint z is the roof and the height
    /// follows from it. Otherwise the roof sits `height` above the ground.
    pub(crate) fn resolve_z(&mut self, ground: f64, absolute: bool) {
        let z = self.roof_z();
        let has_z = z.is_finite() && z != 0.0;

        let roof = if has_z && (absolute || self.height.is_nan()) {
            z
        } else if self.height.is_nan() {
            ground
        } else {
            self.height + ground
        };

        if self.height.is_nan() || (absolute && has_z) {
            self.height = (roof - ground).max(0.0);
        }

        self.ground_z = ground;
        for p in &mut self.footprint {
            p[2] = roof;
        }
    }

    /// The boundary walls of the building, `building` being its index.
    pub fn walls(&self, building: usize) -> impl Iterator<Item = Wall> + '_ {
        self.footprint.windows(2).map(move |w| Wall {
            p0: w[0],
            p1: w[1],
            p0_shared: true,
            p1_shared: true,
            kind: WallKind::Building {
                building,
                alphas: self.alphas.clone(),
            },
        })
    }
}

impl Aabb for Building {
    type Space = Point2;
    fn aabb(&self) -> Extents2 {
        self.plan.aabb()
    }
}

/// An oriented segment bounding a building, a free standing wall, a ground region, or a
/// terrain triangle.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Wall {
    pub p0: Point3,
    pub p1: Point3,
    /// `p0` is shared with the previous segment of the same ring or polyline.
    pub p0_shared: bool,
    /// `p1` is shared with the next segment of the same ring or polyline.
    pub p1_shared: bool,
    pub kind: WallKind,
}

/// What a [`Wall`] bounds, carrying only what matters for that role.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum WallKind {
    /// A side of the building at index `building`.
    Building { building: usize, alphas: Arc<[f64]> },
    /// A segment of a free standing wall, `wall` indexes the scene's walls.
    Free {
        wall: usize,
        height: f64,
        alphas: Arc<[f64]>,
        origin_id: i64,
    },
    /// A boundary segment of the ground region at index `region`.
    Ground { region: usize },
    /// A terrain mesh edge.
    Topography { triangle: u32 },
}

impl Wall {
    pub fn segment(&self) -> Segment {
        Segment::new(self.p0, self.p1)
    }

    pub fn intersection_type(&self) -> IntersectionType {
        match &self.kind {
            WallKind::Building { .. } => IntersectionType::Building,
            WallKind::Free { .. } => IntersectionType::Wall,
            WallKind::Ground { .. } => IntersectionType::GroundEffect,
            WallKind::Topography { .. } => IntersectionType::Topography,
        }
    }

    /// The index of the building, wall, region, or triangle this wall belongs to.
    pub fn origin(&self) -> usize {
        match &self.kind {
            WallKind::Building { building, .. } => *building,
            WallKind::Free { wall, .. } => *wall,
            WallKind::Ground { region } => *region,
            WallKind::Topography { triangle } => *triangle as usize,
        }
    }

    pub fn alphas(&self) -> Option<&Arc<[f64]>> {
        match &self.kind {
            WallKind::Building { alphas, .. } | WallKind::Free { alphas, .. } => Some(alphas),
            _ => None,
        }
    }

    pub fn height(&self) -> Option<f64> {
        match &self.kind {
            WallKind::Free { height, .. } => Some(*height),
            _ => None,
        }
    }
}

impl Aabb for Wall {
    type Space = Point2;
    fn aabb(&self) -> Extents2 {
        self.segment().aabb()
    }
}

/// One or more polygons sharing a ground absorption coefficient.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GroundAbsorption {
    polygons: Vec<Polygon2>,
    coefficient: f64,
}

impl GroundAbsorption {
    pub fn new(polygons: Vec<Polygon2>, coefficient: f64) -> Result<Self> {
        if polygons.is_empty() {
            return Err(Error::InvalidGeometry("ground region has no polygon".into()));
        }
        if !coefficient.is_finite() {
            return Err(Error::InvalidGeometry(format!(
                "ground coefficient {coefficient} is not finite"
            )));
        }

        Ok(Self {
            polygons,
            coefficient,
        })
    }

    pub fn polygons(&self) -> &[Polygon2] {
        &self.polygons
    }

    pub fn coefficient(&self) -> f64 {
        self.coefficient
    }

    /// The boundary segments of every polygon, `region` being this region's index.
    pub fn walls(&self, region: usize) -> impl Iterator<Item = Wall> + '_ {
        self.polygons.iter().flat_map(move |poly| {
            poly.edges().map(move |(a, b)| Wall {
                p0: a.with_z(f64::NAN),
                p1: b.with_z(f64::NAN),
                p0_shared: true,
                p1_shared: true,
                kind: WallKind::Ground { region },
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(z: f64) -> Vec<Point3> {
        vec![[0.0, 0.0, z], [10.0, 0.0, z], [10.0, 10.0, z], [0.0, 10.0, z]]
    }

    #[test]
    fn footprints_are_closed() {
        let b = Building::new(square(0.0), 5.0, vec![], -1).unwrap();
        assert_eq!(b.footprint().len(), 5);
        assert_eq!(b.footprint()[0], b.footprint()[4]);
        assert_eq!(b.walls(3).count(), 4);
        assert!(b.walls(3).all(|w| w.origin() == 3));

        let mut closed = square(0.0);
        closed.push(closed[0]);
        let b = Building::new(closed, 5.0, vec![], -1).unwrap();
        assert_eq!(b.footprint().len(), 5);
    }

    #[test]
    fn invalid_footprints() {
        let r = Building::new([[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 0.0]], 5.0, vec![], 1);
        assert!(matches!(r, Err(Error::InvalidGeometry(_))));

        assert!(Building::new(Vec::new(), 5.0, vec![], 1).is_err());
        assert!(Building::new(square(0.0), -1.0, vec![], 1).is_err());
    }

    #[test]
    fn resolving_roofs() {
        let mut b = Building::new(square(0.0), 5.0, vec![], -1).unwrap();
        b.resolve_z(2.0, false);
        assert_eq!(b.roof_z(), 7.0);
        assert_eq!(b.height(), 5.0);
        assert_eq!(b.ground_z(), 2.0);

        // no height: the footprint z is the roof
        let mut b = Building::new(square(12.0), f64::NAN, vec![], -1).unwrap();
        b.resolve_z(2.0, false);
        assert_eq!(b.roof_z(), 12.0);
        assert_eq!(b.height(), 10.0);

        // absolute footprint z wins over the height
        let mut b = Building::new(square(12.0), 5.0, vec![], -1).unwrap();
        b.resolve_z(2.0, true);
        assert_eq!(b.roof_z(), 12.0);
        assert_eq!(b.height(), 10.0);

        // a zero footprint z is not absolute
        let mut b = Building::new(square(0.0), 5.0, vec![], -1).unwrap();
        b.resolve_z(2.0, true);
        assert_eq!(b.roof_z(), 7.0);

        // roofs below ground clamp the height
        let mut b = Building::new(square(1.0), f64::NAN, vec![], -1).unwrap();
        b.resolve_z(2.0, false);
        assert_eq!(b.height(), 0.0);
    }

    #[test]
    fn wall_roles() {
        let alphas: Arc<[f64]> = vec![0.1, 0.2].into();
        let w = Wall {
            p0: [0.0, 0.0, 1.0],
            p1: [1.0, 0.0, 1.0],
            p0_shared: false,
            p1_shared: true,
            kind: WallKind::Free {
                wall: 4,
                height: 3.0,
                alphas: alphas.clone(),
                origin_id: 99,
            },
        };
        assert_eq!(w.intersection_type(), IntersectionType::Wall);
        assert_eq!(w.origin(), 4);
        assert_eq!(w.alphas(), Some(&alphas));
        assert_eq!(w.height(), Some(3.0));

        let g = GroundAbsorption::new(vec![Polygon2::rect([0.0, 0.0], [1.0, 1.0]).unwrap()], 0.5)
            .unwrap();
        let ws = g.walls(2).collect::<Vec<_>>();
        assert_eq!(ws.len(), 4);
        assert!(ws
            .iter()
            .all(|w| w.intersection_type() == IntersectionType::GroundEffect && w.origin() == 2));
        assert_eq!(ws[0].alphas(), None);

        assert!(GroundAbsorption::new(vec![], 0.5).is_err());
    }
}
