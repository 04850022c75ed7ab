//! Cut profiles between two points through a scene of buildings, walls, ground regions, and a
//! triangulated terrain.
//!
//! Feed a [`SceneBuilder`], [`seal`](SceneBuilder::seal) it into an immutable [`Scene`], then
//! ask the scene for the [`CutProfile`] between a source and a receiver.
use rustc_hash::FxHashMap as HashMap;
use rustc_hash::FxHashSet as HashSet;
use std::iter::FromIterator;

#[cfg(test)]
extern crate quickcheck;
#[cfg(test)]
#[macro_use(quickcheck)]
extern crate quickcheck_macros;

mod config;
mod cut;
mod entity;
mod error;
mod extents;
mod index;
mod line;
mod navigator;
mod plane;
mod point;
pub mod polygon;
mod profile;
mod scene;
mod terrain;
mod trimesh;
mod wide_angle;

pub use config::*;
pub use cut::*;
pub use entity::*;
pub use error::*;
pub use extents::*;
pub use index::*;
pub use line::*;
pub use navigator::simplify;
pub use plane::*;
pub use point::*;
pub use polygon::*;
pub use profile::split_segment;
pub use scene::*;
pub use terrain::*;
pub use trimesh::*;

pub trait Envelops<O> {
    fn envelops(&self, object: O) -> bool;
}

/// A flat, square terrain of `size` with a single elevation `z`, made of two triangles.
#[cfg(test)]
fn flat_terrain(size: f64, z: f64) -> SceneBuilder {
    let mut b = SceneBuilder::new();
    for p in [[0.0, 0.0], [size, 0.0], [size, size], [0.0, size]] {
        b.add_topographic_point(p.with_z(z)).unwrap();
    }
    b
}

#[cfg(test)]
#[derive(Clone, Debug)]
struct ExactFloatsGen<const D: usize> {
    pub floats: Vec<f64>,
}

#[cfg(test)]
impl<const D: usize> quickcheck::Arbitrary for ExactFloatsGen<D> {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        let floats = std::iter::repeat_with(|| f64::arbitrary(g))
            .take(D)
            .collect();
        Self { floats }
    }
}
