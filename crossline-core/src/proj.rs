//! Spherical Web Mercator projection and tile-pyramid envelopes.
//!
//! All analysis geometry lives in projected coordinates, which are
//! approximately meter-scale away from the poles; planar Euclidean
//! distances in this space are what the pipeline reports.

use std::f64::consts::PI;

use geo::{Coord, LineString, Rect};

/// WGS84 equatorial radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Latitudes are clamped here so the projection stays finite.
pub const MAX_LATITUDE: f64 = 85.06;

/// Width of the projected world in meters.
pub const WORLD_EXTENT_M: f64 = 2.0 * PI * EARTH_RADIUS_M;

const HALF_WORLD_M: f64 = PI * EARTH_RADIUS_M;

/// Project geographic (lon, lat) degrees to Web Mercator meters.
pub fn project(lon: f64, lat: f64) -> Coord<f64> {
    let lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);
    Coord {
        x: EARTH_RADIUS_M * lon.to_radians(),
        y: EARTH_RADIUS_M * (PI / 4.0 + lat.to_radians() / 2.0).tan().ln(),
    }
}

/// Inverse of [`project`]: Web Mercator meters back to (lon, lat).
pub fn unproject(coord: Coord<f64>) -> (f64, f64) {
    let lon = (coord.x / EARTH_RADIUS_M).to_degrees();
    let lat = (2.0 * (coord.y / EARTH_RADIUS_M).exp().atan() - PI / 2.0).to_degrees();
    (lon, lat)
}

/// Project every vertex of a geographic line string.
pub fn project_line(line: &LineString<f64>) -> LineString<f64> {
    line.coords().map(|c| project(c.x, c.y)).collect()
}

/// Unproject every vertex of a projected line string.
pub fn unproject_line(line: &LineString<f64>) -> LineString<f64> {
    line.coords()
        .map(|c| {
            let (lon, lat) = unproject(*c);
            Coord { x: lon, y: lat }
        })
        .collect()
}

/// Web Mercator envelope of the tile `(z, x, y)`.
///
/// Row 0 is the northernmost row, matching the standard tile pyramid.
pub fn tile_envelope(z: u8, x: u32, y: u32) -> Rect<f64> {
    let size = WORLD_EXTENT_M / f64::from(1u32 << z);
    let min_x = f64::from(x) * size - HALF_WORLD_M;
    let max_y = HALF_WORLD_M - f64::from(y) * size;
    Rect::new(
        Coord { x: min_x, y: max_y - size },
        Coord {
            x: min_x + size,
            y: max_y,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_projects_to_origin() {
        let c = project(0.0, 0.0);
        assert!(c.x.abs() < 1e-9);
        assert!(c.y.abs() < 1e-9);
    }

    #[test]
    fn antimeridian_is_half_world() {
        let c = project(180.0, 0.0);
        assert!((c.x - HALF_WORLD_M).abs() < 1e-6);
    }

    #[test]
    fn roundtrip() {
        let c = project(12.4964, 41.9028);
        let (lon, lat) = unproject(c);
        assert!((lon - 12.4964).abs() < 1e-9);
        assert!((lat - 41.9028).abs() < 1e-9);
    }

    #[test]
    fn poles_are_clamped() {
        let c = project(0.0, 90.0);
        assert!(c.y.is_finite());
        assert_eq!(c.y, project(0.0, MAX_LATITUDE).y);
    }

    #[test]
    fn zoom_zero_covers_the_world() {
        let env = tile_envelope(0, 0, 0);
        assert!((env.min().x + HALF_WORLD_M).abs() < 1e-6);
        assert!((env.max().x - HALF_WORLD_M).abs() < 1e-6);
        assert!((env.min().y + HALF_WORLD_M).abs() < 1e-6);
        assert!((env.max().y - HALF_WORLD_M).abs() < 1e-6);
    }

    #[test]
    fn zoom_one_southeast_quadrant() {
        let env = tile_envelope(1, 1, 1);
        assert!(env.min().x.abs() < 1e-6);
        assert!((env.max().x - HALF_WORLD_M).abs() < 1e-6);
        assert!((env.min().y + HALF_WORLD_M).abs() < 1e-6);
        assert!(env.max().y.abs() < 1e-6);
    }
}
