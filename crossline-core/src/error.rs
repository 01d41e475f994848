use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid region: {0}")]
    InvalidRegion(String),
    #[error("invalid tile coordinate {z}/{x}/{y}")]
    InvalidTileCoordinate { z: i32, x: i64, y: i64 },
    #[error("no analysis snapshot has been published")]
    SnapshotUnavailable,
    #[error("invalid data: {0}")]
    InvalidData(String),
    #[error("GeoJSON error: {0}")]
    GeoJsonError(String),
    #[error("tile encoding error: {0}")]
    TileEncodeError(String),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("{0}")]
    UnrecoverableError(&'static str),
}
