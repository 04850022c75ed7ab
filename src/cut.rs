use crate::*;
use std::sync::Arc;

/// What a [`CutPoint`] marks along a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum IntersectionType {
    Building,
    Wall,
    Topography,
    GroundEffect,
    Source,
    Receiver,
}

/// A typed event along a source to receiver line.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CutPoint {
    pub coordinate: Point3,
    pub kind: IntersectionType,
    /// Index of the building, wall, or ground region the point came from.
    pub id: Option<usize>,
    /// Ground absorption in effect at the point.
    pub ground_coef: f64,
    /// Absorption spectrum of the wall or building side crossed.
    pub wall_alpha: Option<Arc<[f64]>>,
    /// The point is exactly an end of the crossed wall.
    pub on_wall_end: bool,
}

impl CutPoint {
    pub fn new(coordinate: Point3, kind: IntersectionType) -> Self {
        Self {
            coordinate,
            kind,
            id: None,
            ground_coef: 0.0,
            wall_alpha: None,
            on_wall_end: false,
        }
    }

    pub fn source(coordinate: Point3) -> Self {
        Self::new(coordinate, IntersectionType::Source)
    }

    pub fn receiver(coordinate: Point3) -> Self {
        Self::new(coordinate, IntersectionType::Receiver)
    }

    pub fn with_id(mut self, id: usize) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_ground(mut self, coef: f64) -> Self {
        self.ground_coef = coef;
        self
    }

    /// Same type at the same plan location.
    pub(crate) fn same_place(&self, other: &Self) -> bool {
        self.kind == other.kind && same_xy(self.coordinate, other.coordinate)
    }

    /// Same type, same plan location, and the same ground coefficient.
    #[allow(clippy::float_cmp)]
    pub(crate) fn same_event(&self, other: &Self) -> bool {
        self.same_place(other) && self.ground_coef == other.ground_coef
    }
}

/// The ordered cut points between a source and a receiver.
///
/// The source is always first and the receiver last.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct CutProfile {
    pts: Vec<CutPoint>,
}

impl CutProfile {
    pub(crate) fn from_points(pts: Vec<CutPoint>) -> Self {
        Self { pts }
    }

    pub fn points(&self) -> &[CutPoint] {
        &self.pts
    }

    pub fn into_points(self) -> Vec<CutPoint> {
        self.pts
    }

    pub fn len(&self) -> usize {
        self.pts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pts.is_empty()
    }

    pub fn source(&self) -> Option<&CutPoint> {
        self.pts
            .first()
            .filter(|p| p.kind == IntersectionType::Source)
    }

    pub fn receiver(&self) -> Option<&CutPoint> {
        self.pts
            .last()
            .filter(|p| p.kind == IntersectionType::Receiver)
    }

    pub(crate) fn source_mut(&mut self) -> Option<&mut CutPoint> {
        self.pts
            .first_mut()
            .filter(|p| p.kind == IntersectionType::Source)
    }

    pub(crate) fn receiver_mut(&mut self) -> Option<&mut CutPoint> {
        self.pts
            .last_mut()
            .filter(|p| p.kind == IntersectionType::Receiver)
    }

    /// No building or wall stands between source and receiver.
    pub fn is_free_field(&self) -> bool {
        !self.pts.iter().any(|p| {
            matches!(
                p.kind,
                IntersectionType::Building | IntersectionType::Wall
            )
        })
    }

    /// Plan distance from source to receiver.
    pub fn distance_2d(&self) -> f64 {
        match (self.source(), self.receiver()) {
            (Some(s), Some(r)) => dist_xy(s.coordinate, r.coordinate),
            _ => 0.0,
        }
    }

    /// Cut points of a given type.
    pub fn of_type(&self, kind: IntersectionType) -> impl Iterator<Item = &CutPoint> + '_ {
        self.pts.iter().filter(move |p| p.kind == kind)
    }
}
