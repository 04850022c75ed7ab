use crate::*;
use rayon::prelude::*;
use std::f64::consts::PI;

/// Collects the scene geometry, then [seals](SceneBuilder::seal) it into a [`Scene`].
#[derive(Debug, Clone, Default)]
pub struct SceneBuilder {
    config: ProfileConfig,
    buildings: Vec<Building>,
    walls: Vec<Wall>,
    ground_regions: Vec<GroundAbsorption>,
    topo_points: Vec<Point3>,
    topo_lines: Vec<(Point3, Point3)>,
}

impl SceneBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ProfileConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &ProfileConfig {
        &self.config
    }

    /// Add a building with a footprint and a height above ground.
    ///
    /// Returns the index of the building.
    pub fn add_building<I>(&mut self, footprint: I, height: f64) -> Result<usize>
    where
        I: IntoIterator<Item = Point3>,
    {
        self.add_building_with(footprint, height, Vec::new(), -1)
    }

    /// Add a building with per side absorption coefficients and an external identifier.
    pub fn add_building_with<I>(
        &mut self,
        footprint: I,
        height: f64,
        alphas: Vec<f64>,
        origin_id: i64,
    ) -> Result<usize>
    where
        I: IntoIterator<Item = Point3>,
    {
        let b = Building::new(footprint, height, alphas, origin_id).map_err(|e| {
            log::error!("building {origin_id} rejected: {e}");
            e
        })?;

        if let Some(coef) = self.config.building_ground_coefficient {
            self.add_ground_region(vec![b.polygon().clone()], coef)?;
        }

        self.buildings.push(b);
        Ok(self.buildings.len() - 1)
    }

    /// Add a free standing wall along a polyline, one wall per segment.
    ///
    /// Returns the index of the first segment's wall.
    pub fn add_wall<I>(
        &mut self,
        polyline: I,
        height: f64,
        alphas: Vec<f64>,
        origin_id: i64,
    ) -> Result<usize>
    where
        I: IntoIterator<Item = Point3>,
    {
        let pts = polyline.into_iter().collect::<Vec<_>>();
        let reject = |msg: &str| {
            log::error!("wall {origin_id} rejected: {msg}");
            Err(Error::InvalidGeometry(msg.to_string()))
        };

        if pts.len() < 2 {
            return reject("a wall requires 2 or more points");
        }
        if pts.iter().any(|p| p.to_p2().has_nan()) {
            return reject("wall has NaN coordinates");
        }
        if height.is_nan() || height < 0.0 {
            return reject("wall height must be a non-negative number");
        }

        let first = self.walls.len();
        let alphas: std::sync::Arc<[f64]> = alphas.into();
        let last = pts.len() - 2;
        for (i, w) in pts.windows(2).enumerate() {
            let wall = self.walls.len();
            self.walls.push(Wall {
                p0: w[0],
                p1: w[1],
                p0_shared: i != 0,
                p1_shared: i != last,
                kind: WallKind::Free {
                    wall,
                    height,
                    alphas: alphas.clone(),
                    origin_id,
                },
            });
        }

        Ok(first)
    }

    /// Add a ground region made of one or more polygons.
    ///
    /// Regions registered later take priority where they overlap.
    pub fn add_ground_region(&mut self, polygons: Vec<Polygon2>, coefficient: f64) -> Result<usize> {
        let g = GroundAbsorption::new(polygons, coefficient).map_err(|e| {
            log::error!("ground region rejected: {e}");
            e
        })?;
        self.ground_regions.push(g);
        Ok(self.ground_regions.len() - 1)
    }

    /// Add an axis aligned ground region.
    pub fn add_ground_rect(&mut self, min: Point2, max: Point2, coefficient: f64) -> Result<usize> {
        let rect = Polygon2::rect(min.min_all(max), min.max_all(max)).map_err(|e| {
            log::error!("ground rectangle rejected: {e}");
            e
        })?;
        self.add_ground_region(vec![rect], coefficient)
    }

    /// Add a terrain elevation point. A NaN z takes the configured default.
    pub fn add_topographic_point(&mut self, p: Point3) -> Result<usize> {
        let p = self.topo_point(p)?;
        self.topo_points.push(p);
        Ok(self.topo_points.len() - 1)
    }

    /// Add a terrain break-line, kept as an edge of the triangulation.
    pub fn add_topographic_line(&mut self, a: Point3, b: Point3) -> Result<usize> {
        let a = self.topo_point(a)?;
        let b = self.topo_point(b)?;
        self.topo_lines.push((a, b));
        Ok(self.topo_lines.len() - 1)
    }

    fn topo_point(&self, [x, y, z]: Point3) -> Result<Point3> {
        if !(x.is_finite() && y.is_finite()) {
            log::error!("topographic point ({x}, {y}) rejected");
            return Err(Error::InvalidGeometry(format!(
                "topographic point ({x}, {y}) is not finite"
            )));
        }
        let z = if z.is_nan() {
            self.config.default_topography_z
        } else {
            z
        };
        Ok([x, y, z])
    }

    /// Seal the scene, failing if the terrain cannot be triangulated.
    pub fn try_seal(self) -> Result<Scene> {
        self.build(true)
    }

    /// Seal the scene. A terrain that fails to triangulate is dropped with a warning, leaving
    /// the scene without terrain.
    pub fn seal(self) -> Scene {
        match self.build(false) {
            Ok(scene) => scene,
            // unreachable, a lax build only fails on triangulation
            Err(e) => {
                log::error!("sealing failed: {e}");
                Scene::empty()
            }
        }
    }

    fn build(self, strict: bool) -> Result<Scene> {
        let Self {
            config,
            mut buildings,
            mut walls,
            ground_regions,
            topo_points,
            topo_lines,
        } = self;

        let terrain = if topo_points.len() + topo_lines.len() < 2 {
            log::debug!("no terrain: fewer than 2 topographic features");
            None
        } else {
            match TriMesh::triangulate(&topo_points, &topo_lines) {
                Ok(mesh) => Some(Terrain::new(mesh)),
                Err(e) if strict => return Err(e),
                Err(e) => {
                    log::warn!("continuing without terrain: {e}");
                    None
                }
            }
        };

        let ground = |p: Point3| -> f64 {
            terrain
                .as_ref()
                .and_then(|t| t.z_at(p))
                .filter(|z| z.is_finite())
                .unwrap_or(0.0)
        };

        buildings.par_iter_mut().for_each(|b| {
            let zs = b.footprint()[1..]
                .iter()
                .filter_map(|&p| terrain.as_ref().and_then(|t| t.z_at(p)))
                .filter(|z| z.is_finite())
                .collect::<Vec<_>>();
            let g = if zs.is_empty() {
                0.0
            } else {
                zs.iter().sum::<f64>() / zs.len() as f64
            };
            b.resolve_z(g, config.absolute_building_z);
        });

        for w in &mut walls {
            let h = w.height().unwrap_or(0.0);
            for p in [&mut w.p0, &mut w.p1] {
                if p[2].is_nan() || p[2] == 0.0 {
                    p[2] = h + ground(*p);
                }
            }
        }

        let processed_walls = buildings
            .iter()
            .enumerate()
            .flat_map(|(i, b)| b.walls(i))
            .chain(walls.iter().cloned())
            .chain(
                ground_regions
                    .iter()
                    .enumerate()
                    .flat_map(|(i, g)| g.walls(i)),
            )
            .collect::<Vec<_>>();

        let building_index = Index::new(buildings.iter().map(Aabb::aabb).zip(0..));
        let wall_index = Index::new(walls.iter().map(Aabb::aabb).zip(0..));
        let processed_index = Index::new(processed_walls.iter().map(Aabb::aabb).zip(0..));
        let ground_index = Index::new(ground_regions.iter().enumerate().flat_map(|(r, g)| {
            g.polygons()
                .iter()
                .enumerate()
                .map(move |(i, poly)| (poly.aabb(), (r, i)))
        }));

        let eps = config.wide_angle_epsilon;
        let wide_angles = buildings
            .par_iter()
            .map(|b| b.wide_angle_points(0.0, 2.0 * PI, eps))
            .collect::<Vec<_>>();

        log::debug!(
            "sealed scene: {} buildings, {} walls, {} ground regions, {} processed walls, {} terrain triangles",
            buildings.len(),
            walls.len(),
            ground_regions.len(),
            processed_walls.len(),
            terrain.as_ref().map_or(0, |t| t.mesh().tri_len())
        );

        Ok(Scene {
            config,
            buildings,
            walls,
            ground_regions,
            processed_walls,
            terrain,
            building_index,
            wall_index,
            processed_index,
            ground_index,
            wide_angles,
        })
    }
}

/// An immutable, indexed scene ready to cut profiles.
///
/// A `Scene` is `Sync`; profiles for different point pairs may be cut concurrently.
#[derive(Debug, Clone)]
pub struct Scene {
    pub(crate) config: ProfileConfig,
    buildings: Vec<Building>,
    walls: Vec<Wall>,
    ground_regions: Vec<GroundAbsorption>,
    processed_walls: Vec<Wall>,
    terrain: Option<Terrain>,
    building_index: Index<usize>,
    wall_index: Index<usize>,
    pub(crate) processed_index: Index<usize>,
    ground_index: Index<(usize, usize)>,
    wide_angles: Vec<Vec<Point3>>,
}

impl Scene {
    fn empty() -> Self {
        Self {
            config: ProfileConfig::default(),
            buildings: Vec::new(),
            walls: Vec::new(),
            ground_regions: Vec::new(),
            processed_walls: Vec::new(),
            terrain: None,
            building_index: Index::default(),
            wall_index: Index::default(),
            processed_index: Index::default(),
            ground_index: Index::default(),
            wide_angles: Vec::new(),
        }
    }

    pub fn config(&self) -> &ProfileConfig {
        &self.config
    }

    pub fn buildings(&self) -> &[Building] {
        &self.buildings
    }

    pub fn building(&self, idx: usize) -> Option<&Building> {
        self.buildings.get(idx)
    }

    /// The free standing walls, one per polyline segment.
    pub fn walls(&self) -> &[Wall] {
        &self.walls
    }

    pub fn ground_regions(&self) -> &[GroundAbsorption] {
        &self.ground_regions
    }

    /// Building sides, then free walls, then ground region boundaries.
    pub fn processed_walls(&self) -> &[Wall] {
        &self.processed_walls
    }

    pub fn terrain(&self) -> Option<&Terrain> {
        self.terrain.as_ref()
    }

    pub fn mesh(&self) -> Option<&TriMesh> {
        self.terrain.as_ref().map(Terrain::mesh)
    }

    /// The scene has a terrain model.
    pub fn has_dem(&self) -> bool {
        self.mesh().map_or(false, |m| m.tri_len() > 0)
    }

    /// The terrain elevation at `p`; NaN outside the terrain or without one.
    pub fn z_ground(&self, p: impl ToPoint2) -> f64 {
        self.terrain
            .as_ref()
            .map_or(f64::NAN, |t| t.z_ground(p))
    }

    /// The roof elevation if `p` falls within a building footprint, otherwise the ground.
    pub fn z(&self, p: impl ToPoint2) -> f64 {
        let p = p.to_p2();
        let mut ids = self
            .building_index
            .query(Extents2::point(p))
            .copied()
            .collect::<Vec<_>>();
        ids.sort_unstable();

        ids.into_iter()
            .map(|i| &self.buildings[i])
            .find(|b| b.polygon().covers(p))
            .map_or_else(|| self.z_ground(p), Building::roof_z)
    }

    /// Building sides and free walls whose extents intersect `e`.
    pub fn walls_in(&self, e: Extents2) -> Vec<&Wall> {
        let mut ids = self.processed_index.query(e).copied().collect::<Vec<_>>();
        ids.sort_unstable();
        ids.into_iter()
            .map(|i| &self.processed_walls[i])
            .filter(|w| {
                matches!(
                    w.intersection_type(),
                    IntersectionType::Building | IntersectionType::Wall
                )
            })
            .collect()
    }

    /// Visit each building whose extents meet the extents of the path `p1 -> p2`, in pieces
    /// no longer than the configured maximum line length.
    pub fn buildings_on_path<F>(&self, p1: Point3, p2: Point3, mut visitor: F)
    where
        F: FnMut(usize, &Building),
    {
        let mut ids = split_segment(p1, p2, self.config.max_line_length)
            .into_iter()
            .flat_map(|s| self.building_index.query(s.aabb()).copied())
            .collect::<Vec<_>>();
        ids.sort_unstable();
        ids.dedup();

        for i in ids {
            visitor(i, &self.buildings[i]);
        }
    }

    /// Visit each free wall whose extents meet the extents of `p1 -> p2`.
    pub fn walls_on_path<F>(&self, p1: Point3, p2: Point3, mut visitor: F)
    where
        F: FnMut(usize, &Wall),
    {
        let mut ids = self
            .wall_index
            .query(Segment::new(p1, p2).aabb())
            .copied()
            .collect::<Vec<_>>();
        ids.sort_unstable();

        for i in ids {
            visitor(i, &self.walls[i]);
        }
    }

    /// The wide angle points of a building computed over the full circle when sealed.
    pub fn precomputed_wide_angle_points(&self, building: usize) -> Option<&[Point3]> {
        self.wide_angles.get(building).map(Vec::as_slice)
    }

    /// The wide angle points of a building for open angles strictly within `(min, max)`.
    pub fn wide_angle_points(&self, building: usize, min: f64, max: f64) -> Option<Vec<Point3>> {
        self.buildings
            .get(building)
            .map(|b| b.wide_angle_points(min, max, self.config.wide_angle_epsilon))
    }

    /// The terrain mesh edges, once each.
    pub fn terrain_walls(&self) -> Vec<Wall> {
        self.mesh()
            .map(|m| {
                m.edges()
                    .map(|(p0, p1, triangle)| Wall {
                        p0,
                        p1,
                        p0_shared: true,
                        p1_shared: true,
                        kind: WallKind::Topography { triangle },
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The raw terrain samples along `p1 -> p2`.
    pub fn topographic_profile(&self, p1: impl ToPoint2, p2: impl ToPoint2) -> Vec<Point3> {
        self.terrain.as_ref().map_or_else(Vec::new, |t| {
            t.walk(p1, p2, self.config.triangle_intersection_epsilon)
        })
    }

    /// The highest priority ground region covering `p`, borders inclusive.
    pub fn region_at(&self, p: impl ToPoint2) -> Option<usize> {
        let p = p.to_p2();
        self.ground_index
            .query(Extents2::point(p))
            .filter(|(r, i)| self.ground_regions[*r].polygons()[*i].covers(p))
            .map(|(r, _)| *r)
            .max()
    }

    /// The ground coefficient in effect at `p`, `default` where no region covers it.
    pub fn ground_coefficient(&self, p: impl ToPoint2, default: f64) -> f64 {
        self.region_at(p)
            .map_or(default, |r| self.ground_regions[r].coefficient())
    }
}
