use thiserror::Error;

/// Result type for scene building.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while feeding or sealing a scene.
///
/// Expected negatives, such as a line missing every triangle, are not errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("triangulation failed: {0}")]
    Triangulation(String),
}
