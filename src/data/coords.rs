//! Celestial coordinates and the equatorial-to-Galactic rotation needed to
//! query the dust map in its native frame.

use std::fmt;

/// J2000 right ascension of the north Galactic pole, degrees.
const RA_NGP: f64 = 192.85948;
/// J2000 declination of the north Galactic pole, degrees.
const DEC_NGP: f64 = 27.12825;
/// Galactic longitude of the north celestial pole, degrees.
const L_NCP: f64 = 122.93192;

/// A J2000 equatorial sky position in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkyCoord {
    pub ra: f64,
    pub dec: f64,
}

impl SkyCoord {
    pub fn new(ra: f64, dec: f64) -> Self {
        SkyCoord { ra, dec }
    }

    /// Galactic longitude and latitude `(l, b)` in radians.
    ///
    /// Standard spherical rotation about the J2000 Galactic pole; accuracy is
    /// far below the dust map's 6.1 arcmin pixel scale.
    pub fn galactic(&self) -> (f64, f64) {
        let ra = self.ra.to_radians();
        let dec = self.dec.to_radians();
        let ra_ngp = RA_NGP.to_radians();
        let dec_ngp = DEC_NGP.to_radians();

        let sin_b =
            dec.sin() * dec_ngp.sin() + dec.cos() * dec_ngp.cos() * (ra - ra_ngp).cos();
        let b = sin_b.asin();

        let y = dec.cos() * (ra - ra_ngp).sin();
        let x = dec.sin() * dec_ngp.cos() - dec.cos() * dec_ngp.sin() * (ra - ra_ngp).cos();
        let mut l = L_NCP.to_radians() - y.atan2(x);
        if l < 0.0 {
            l += std::f64::consts::TAU;
        }
        l %= std::f64::consts::TAU;

        (l, b)
    }
}

impl fmt::Display for SkyCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.5}, {:+.5})", self.ra, self.dec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn north_galactic_pole_maps_to_b_90() {
        let (_, b) = SkyCoord::new(RA_NGP, DEC_NGP).galactic();
        assert_relative_eq!(b.to_degrees(), 90.0, epsilon = 1e-6);
    }

    #[test]
    fn galactic_center_direction() {
        // Sgr A* neighbourhood: (l, b) within a few millidegrees of (0, 0).
        let (l, b) = SkyCoord::new(266.405, -28.936).galactic();
        let l_deg = l.to_degrees();
        let l_wrapped = if l_deg > 180.0 { l_deg - 360.0 } else { l_deg };
        assert!(l_wrapped.abs() < 0.01, "l = {l_wrapped}");
        assert!(b.to_degrees().abs() < 0.01, "b = {}", b.to_degrees());
    }

    #[test]
    fn equatorial_origin() {
        // (ra, dec) = (0, 0) has the well-known Galactic position below.
        let (l, b) = SkyCoord::new(0.0, 0.0).galactic();
        assert_relative_eq!(l.to_degrees(), 96.33728, epsilon = 1e-3);
        assert_relative_eq!(b.to_degrees(), -60.18861, epsilon = 1e-3);
    }
}
