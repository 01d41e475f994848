//! Mapbox vector tile rendering of the annotated street segments.

use geo::{BooleanOps, Coord, MultiLineString, Rect};
use mvt::{GeomEncoder, GeomType, Tile};

use crate::model::AnalysisSnapshot;
use crate::{Error, MAX_REPORTED_DISTANCE_M, proj};

/// Tile-local integer grid resolution.
pub const TILE_EXTENT: u32 = 4096;

/// Query padding around the tile, in tile-local units, so geometry
/// just outside the edge still renders across it.
pub const TILE_BUFFER: u32 = 256;

/// Deepest zoom level served.
pub const MAX_ZOOM: u8 = 22;

/// Name of the single layer every tile carries.
pub const STREETS_LAYER: &str = "streets";

/// A validated tile address in the Web Mercator pyramid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileCoord {
    pub z: u8,
    pub x: u32,
    pub y: u32,
}

impl TileCoord {
    /// Validates untrusted path parameters into a tile address.
    ///
    /// # Errors
    ///
    /// Rejects zoom outside `0..=22` and row or column outside
    /// `0..2^z`.
    pub fn new(z: i32, x: i64, y: i64) -> Result<Self, Error> {
        let invalid = Error::InvalidTileCoordinate { z, x, y };
        if !(0..=i32::from(MAX_ZOOM)).contains(&z) {
            return Err(invalid);
        }
        let side = 1i64 << z;
        if !(0..side).contains(&x) || !(0..side).contains(&y) {
            return Err(invalid);
        }
        Ok(Self {
            z: z as u8,
            x: x as u32,
            y: y as u32,
        })
    }

    /// Projected envelope of the tile itself, without padding.
    pub fn envelope(&self) -> Rect<f64> {
        proj::tile_envelope(self.z, self.x, self.y)
    }
}

/// Renders the `streets` layer for one tile from a snapshot.
///
/// Segments are fetched from the snapshot's envelope index with a
/// 256/4096 pad, clipped to the padded envelope, and written with
/// their annotation attributes. Reported distances are capped at
/// [`MAX_REPORTED_DISTANCE_M`]. A tile with no clipped geometry
/// encodes with zero layers.
///
/// # Errors
///
/// Fails only if protobuf encoding fails.
pub fn render_tile(snapshot: &AnalysisSnapshot, coord: TileCoord) -> Result<Vec<u8>, Error> {
    let envelope = coord.envelope();
    let span = envelope.width();
    let pad = span * f64::from(TILE_BUFFER) / f64::from(TILE_EXTENT);
    let padded = Rect::new(
        Coord {
            x: envelope.min().x - pad,
            y: envelope.min().y - pad,
        },
        Coord {
            x: envelope.max().x + pad,
            y: envelope.max().y + pad,
        },
    );
    let clip_poly = padded.to_polygon();

    let mut tile = Tile::new(TILE_EXTENT);
    let mut layer = tile.create_layer(STREETS_LAYER);
    let mut features = 0usize;

    for segment in snapshot.segments_intersecting(padded) {
        let clipped = clip_poly.clip(
            &MultiLineString::new(vec![segment.geometry.clone()]),
            false,
        );
        let mut encoder = GeomEncoder::new(GeomType::Linestring);
        let mut parts = 0usize;
        for part in &clipped {
            if part.0.len() < 2 {
                continue;
            }
            for c in part.coords() {
                let (tx, ty) = to_tile_coords(*c, &envelope);
                encoder = encoder.point(tx, ty).map_err(tile_err)?;
            }
            encoder = encoder.complete().map_err(tile_err)?;
            parts += 1;
        }
        if parts == 0 {
            continue;
        }

        let geometry = encoder.encode().map_err(tile_err)?;
        let mut feature = layer.into_feature(geometry);
        feature.set_id(segment.id);
        feature.add_tag_sint("way_id", segment.way_id);
        if let Some(name) = &segment.name {
            feature.add_tag_string("name", name);
        }
        feature.add_tag_string("road_class", segment.road_class.as_str());
        if let Some(distance) = segment.distance_to_crossing_m {
            feature.add_tag_double(
                "distance_to_crossing_m",
                distance.min(MAX_REPORTED_DISTANCE_M),
            );
        }
        if let Some(marked) = segment.nearest_crossing_marked {
            feature.add_tag_bool("nearest_crossing_marked", marked);
        }
        layer = feature.into_layer();
        features += 1;
    }

    if features > 0 {
        tile.add_layer(layer).map_err(tile_err)?;
    }
    tile.to_bytes().map_err(tile_err)
}

/// Projected meters to the tile's local integer grid; tile rows grow
/// southward, so y flips.
fn to_tile_coords(c: Coord<f64>, envelope: &Rect<f64>) -> (f64, f64) {
    let extent = f64::from(TILE_EXTENT);
    let tx = (c.x - envelope.min().x) / envelope.width() * extent;
    let ty = (envelope.max().y - c.y) / envelope.height() * extent;
    (tx.round(), ty.round())
}

fn tile_err(e: mvt::Error) -> Error {
    Error::TileEncodeError(e.to_string())
}

#[cfg(test)]
mod tests {
    use geo::line_string;

    use super::*;
    use crate::model::{AnalysisParams, AnalysisSnapshot, RegionParams, RoadClass, StreetSegment};

    fn snapshot_with_segment() -> AnalysisSnapshot {
        let region = RegionParams::default().build().unwrap();
        // A segment near the projected origin, annotated.
        let geometry = line_string![(x: 0.0, y: 0.0), (x: 45.0, y: 0.0)];
        let length_m = 45.0;
        let segments = vec![StreetSegment {
            id: 0,
            way_id: 11,
            name: Some("High Street".to_string()),
            road_class: RoadClass::Residential,
            geometry,
            length_m,
            distance_to_crossing_m: Some(700.0),
            nearest_crossing_marked: Some(true),
        }];
        AnalysisSnapshot::new(AnalysisParams::default(), region, Vec::new(), segments)
    }

    #[test]
    fn rejects_out_of_pyramid_coordinates() {
        assert!(TileCoord::new(-1, 0, 0).is_err());
        assert!(TileCoord::new(23, 0, 0).is_err());
        assert!(TileCoord::new(3, -1, 0).is_err());
        assert!(TileCoord::new(3, 0, -1).is_err());
        assert!(TileCoord::new(3, 8, 0).is_err());
        assert!(TileCoord::new(3, 0, 8).is_err());
        assert!(TileCoord::new(3, 7, 7).is_ok());
        assert!(TileCoord::new(0, 0, 0).is_ok());
    }

    #[test]
    fn world_tile_contains_the_segment() {
        let snapshot = snapshot_with_segment();
        let coord = TileCoord::new(0, 0, 0).unwrap();
        let bytes = render_tile(&snapshot, coord).unwrap();
        assert!(!bytes.is_empty());
    }

    #[test]
    fn empty_tile_encodes_without_layers() {
        let snapshot = snapshot_with_segment();
        // Deep zoom far from the origin sees no segments.
        let coord = TileCoord::new(10, 0, 0).unwrap();
        let bytes = render_tile(&snapshot, coord).unwrap();
        assert!(bytes.is_empty());
    }

    #[test]
    fn same_tile_renders_identically() {
        let snapshot = snapshot_with_segment();
        let coord = TileCoord::new(14, 8192, 8192).unwrap();
        let first = render_tile(&snapshot, coord).unwrap();
        let second = render_tile(&snapshot, coord).unwrap();
        assert_eq!(first, second);
    }
}
