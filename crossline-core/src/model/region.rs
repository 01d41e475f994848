//! Analysis region: a buffered lon/lat rectangle in projected space.

use geo::{Coord, Polygon, Rect};
use serde::{Deserialize, Serialize};

use crate::{Error, proj};

/// Geographic bounding rectangle plus a buffer distance in meters.
///
/// The defaults cover the whole world with no buffer, so an empty
/// configuration analyzes every feature the store returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionParams {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
    pub buffer_meters: f64,
}

impl Default for RegionParams {
    fn default() -> Self {
        Self {
            min_lon: -180.0,
            min_lat: -90.0,
            max_lon: 180.0,
            max_lat: 90.0,
            buffer_meters: 0.0,
        }
    }
}

impl RegionParams {
    /// Builds the buffered region polygon.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRegion`] for non-finite values, an empty
    /// rectangle, or a negative buffer. This is the only fatal
    /// validation in the pipeline and runs before any stage.
    pub fn build(&self) -> Result<Region, Error> {
        self.validate()?;

        let min = proj::project(self.min_lon, self.min_lat);
        let max = proj::project(self.max_lon, self.max_lat);
        // A rectangle dilated by `buffer_meters` with square joins is
        // simply the expanded rectangle.
        let envelope = Rect::new(
            Coord {
                x: min.x - self.buffer_meters,
                y: min.y - self.buffer_meters,
            },
            Coord {
                x: max.x + self.buffer_meters,
                y: max.y + self.buffer_meters,
            },
        );

        let (min_lon, min_lat) = proj::unproject(envelope.min());
        let (max_lon, max_lat) = proj::unproject(envelope.max());
        let geo_envelope = Rect::new(
            Coord {
                x: min_lon.clamp(-180.0, 180.0),
                y: min_lat.clamp(-90.0, 90.0),
            },
            Coord {
                x: max_lon.clamp(-180.0, 180.0),
                y: max_lat.clamp(-90.0, 90.0),
            },
        );

        Ok(Region {
            polygon: envelope.to_polygon(),
            envelope,
            geo_envelope,
        })
    }

    fn validate(&self) -> Result<(), Error> {
        let values = [
            self.min_lon,
            self.min_lat,
            self.max_lon,
            self.max_lat,
            self.buffer_meters,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(Error::InvalidRegion(
                "all region parameters must be finite".to_string(),
            ));
        }
        if self.min_lon >= self.max_lon {
            return Err(Error::InvalidRegion(format!(
                "min_lon ({}) must be less than max_lon ({})",
                self.min_lon, self.max_lon
            )));
        }
        if self.min_lat >= self.max_lat {
            return Err(Error::InvalidRegion(format!(
                "min_lat ({}) must be less than max_lat ({})",
                self.min_lat, self.max_lat
            )));
        }
        if self.buffer_meters < 0.0 {
            return Err(Error::InvalidRegion(format!(
                "buffer_meters must be non-negative, got {}",
                self.buffer_meters
            )));
        }
        Ok(())
    }
}

/// The buffered analysis area. Immutable once built; later stages hold
/// it by reference.
#[derive(Debug, Clone)]
pub struct Region {
    polygon: Polygon<f64>,
    envelope: Rect<f64>,
    geo_envelope: Rect<f64>,
}

impl Region {
    /// Buffered region polygon in projected coordinates.
    pub fn polygon(&self) -> &Polygon<f64> {
        &self.polygon
    }

    /// Projected bounding envelope (identical to the polygon's extent).
    pub fn envelope(&self) -> Rect<f64> {
        self.envelope
    }

    /// Geographic envelope of the buffered region, used to query the
    /// feature store.
    pub fn geo_envelope(&self) -> Rect<f64> {
        self.geo_envelope
    }
}
