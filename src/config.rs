/// Tuning of a [`Scene`](crate::Scene) and the profiles it cuts.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    /// The source to receiver line is queried against the boundary index in pieces no longer
    /// than this.
    pub max_line_length: f64,
    /// Ground coefficient used by [`Scene::profile`](crate::Scene::profile) where no ground
    /// region applies.
    pub ground_coefficient: f64,
    /// Outward offset of wide angle points, in plan and above the roof.
    pub wide_angle_epsilon: f64,
    /// Terrain samples closer than this to the line through their neighbours are dropped.
    pub topography_tolerance: f64,
    /// Tolerance of a terrain edge crossing while walking the mesh.
    pub triangle_intersection_epsilon: f64,
    /// Elevation given to topographic points supplied without one.
    pub default_topography_z: f64,
    /// Keep a finite, non-zero footprint z as the absolute roof elevation.
    pub absolute_building_z: bool,
    /// Register each building footprint as a ground region with this coefficient.
    pub building_ground_coefficient: Option<f64>,
    pub duplicate_ground_policy: DuplicateGroundPolicy,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            max_line_length: 60.0,
            ground_coefficient: 0.0,
            wide_angle_epsilon: 0.01,
            topography_tolerance: 1e-3,
            triangle_intersection_epsilon: 1e-5,
            default_topography_z: 0.0,
            absolute_building_z: false,
            building_ground_coefficient: None,
            duplicate_ground_policy: DuplicateGroundPolicy::LastRegistered,
        }
    }
}

/// How two adjacent profile points sharing a type and coordinate, but carrying different
/// ground coefficients, are collapsed into one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum DuplicateGroundPolicy {
    /// Keep the point carrying the ground in effect past the coordinate.
    #[default]
    LastRegistered,
    /// Alternate the survivor on each occurrence, keyed on whether the first coefficient is 0.
    Parity,
}
