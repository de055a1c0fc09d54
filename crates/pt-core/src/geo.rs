//! Geographic coordinate type.
//!
//! `GeoPoint` uses `f32` latitude/longitude: ~1 m precision at the equator,
//! more than sufficient for placing vehicles on a city map while halving
//! memory vs. `f64`. Coordinates only feed position reporting for the
//! renderer; routing runs on edge travel times.

/// A WGS-84 geographic coordinate stored as single-precision floats.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GeoPoint {
    pub lat: f32,
    pub lon: f32,
}

impl GeoPoint {
    #[inline]
    pub fn new(lat: f32, lon: f32) -> Self {
        Self { lat, lon }
    }

    /// Straight-line interpolation towards `other`.
    ///
    /// `frac` is clamped to [0, 1]; a vehicle mid-edge reports
    /// `from.lerp(to, move_timer / edge_len)`.
    pub fn lerp(self, other: GeoPoint, frac: f32) -> GeoPoint {
        let f = frac.clamp(0.0, 1.0);
        GeoPoint {
            lat: self.lat + (other.lat - self.lat) * f,
            lon: self.lon + (other.lon - self.lon) * f,
        }
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}
