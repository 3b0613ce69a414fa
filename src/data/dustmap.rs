//! Galactic dust map: SFD (Schlegel, Finkbeiner & Davis 1998) reddening
//! lookup from the pre-downloaded all-sky FITS pair.
//!
//! Each hemisphere is a Lambert ZEA projection about a Galactic pole; the
//! projection constants come from the `LAM_NSGP` / `LAM_SCAL` header
//! keywords, so clipped or rebinned variants of the maps work unchanged.

use std::path::Path;

use fitsio::hdu::{FitsHdu, HduInfo};
use fitsio::FitsFile;
use ndarray::Array2;
use thiserror::Error;

use super::coords::SkyCoord;

/// The canonical SFD file names inside the configured map directory.
const NGP_FILE: &str = "SFD_dust_4096_ngp.fits";
const SGP_FILE: &str = "SFD_dust_4096_sgp.fits";

#[derive(Debug, Error)]
pub enum DustMapError {
    /// The queried position falls outside the map grids. Never reported as a
    /// zero reddening: callers must handle this explicitly.
    #[error("sky position {coord} is outside dust-map coverage")]
    OutOfCoverage { coord: SkyCoord },

    #[error("malformed dust map: {0}")]
    Format(String),

    #[error("FITS error: {0}")]
    Fits(#[from] fitsio::errors::Error),
}

/// One polar-cap grid of the map with its projection constants.
pub struct Hemisphere {
    /// E(B-V) values, indexed `[y, x]`.
    data: Array2<f32>,
    /// +1 for the northern cap, -1 for the southern.
    nsgp: f64,
    /// Pixels per unit of `sqrt(1 - nsgp * sin b)`.
    scale: f64,
    /// FITS reference pixel (1-based, as stored in the header).
    crpix1: f64,
    crpix2: f64,
}

impl Hemisphere {
    /// Build a hemisphere around the grid centre. Primarily for synthetic
    /// maps; real SFD files go through [`Hemisphere::from_fits`].
    pub fn new(data: Array2<f32>, nsgp: f64, scale: f64) -> Result<Self, DustMapError> {
        let (ny, nx) = data.dim();
        if nx < 2 || ny < 2 {
            return Err(DustMapError::Format(format!(
                "grid too small for interpolation: {nx} x {ny}"
            )));
        }
        Ok(Hemisphere {
            data,
            nsgp,
            scale,
            crpix1: nx as f64 / 2.0 + 0.5,
            crpix2: ny as f64 / 2.0 + 0.5,
        })
    }

    fn from_fits(path: &Path) -> Result<Self, DustMapError> {
        let mut f = FitsFile::open(path)
            .map_err(|e| DustMapError::Format(format!("opening {}: {e}", path.display())))?;
        let hdu = f.hdu(0)?;

        let (ny, nx) = match &hdu.info {
            HduInfo::ImageInfo { shape, .. } if shape.len() == 2 => (shape[0], shape[1]),
            _ => {
                return Err(DustMapError::Format(format!(
                    "{}: primary HDU is not a 2-D image",
                    path.display()
                )))
            }
        };

        let pixels: Vec<f32> = hdu.read_image(&mut f)?;
        let data = Array2::from_shape_vec((ny, nx), pixels)
            .map_err(|e| DustMapError::Format(format!("{}: {e}", path.display())))?;

        let nsgp = read_f64_key(&mut f, &hdu, path, "LAM_NSGP")?;
        let scale = read_f64_key(&mut f, &hdu, path, "LAM_SCAL")?;
        let crpix1 = hdu
            .read_key::<f64>(&mut f, "CRPIX1")
            .unwrap_or(nx as f64 / 2.0 + 0.5);
        let crpix2 = hdu
            .read_key::<f64>(&mut f, "CRPIX2")
            .unwrap_or(ny as f64 / 2.0 + 0.5);

        let mut hemi = Hemisphere::new(data, nsgp, scale)?;
        hemi.crpix1 = crpix1;
        hemi.crpix2 = crpix2;
        Ok(hemi)
    }

    /// Sample at Galactic `(l, b)` in radians. `None` when the bilinear
    /// window leaves the grid.
    fn sample(&self, l: f64, b: f64) -> Option<f64> {
        // Lambert zenithal equal-area projection about the cap's pole.
        let r = self.scale * (1.0 - self.nsgp * b.sin()).sqrt();
        let x = self.crpix1 - 1.0 + r * l.cos();
        let y = self.crpix2 - 1.0 - self.nsgp * r * l.sin();
        bilinear(&self.data, x, y)
    }
}

/// Bilinear interpolation at fractional pixel `(x, y)`; `None` out of bounds.
fn bilinear(data: &Array2<f32>, x: f64, y: f64) -> Option<f64> {
    let (ny, nx) = data.dim();
    if !x.is_finite() || !y.is_finite() {
        return None;
    }
    if x < 0.0 || y < 0.0 || x > (nx - 1) as f64 || y > (ny - 1) as f64 {
        return None;
    }

    let x0 = (x.floor() as usize).min(nx - 2);
    let y0 = (y.floor() as usize).min(ny - 2);
    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let v00 = data[[y0, x0]] as f64;
    let v01 = data[[y0, x0 + 1]] as f64;
    let v10 = data[[y0 + 1, x0]] as f64;
    let v11 = data[[y0 + 1, x0 + 1]] as f64;

    Some(
        v00 * (1.0 - fx) * (1.0 - fy)
            + v01 * fx * (1.0 - fy)
            + v10 * (1.0 - fx) * fy
            + v11 * fx * fy,
    )
}

/// The loaded all-sky map: both hemisphere grids, read once and passed
/// around as an immutable handle.
pub struct DustMap {
    north: Hemisphere,
    south: Hemisphere,
}

impl DustMap {
    /// Load the SFD pair from a directory holding the two standard files.
    pub fn open(dir: &Path) -> Result<Self, DustMapError> {
        let north = Hemisphere::from_fits(&dir.join(NGP_FILE))?;
        let south = Hemisphere::from_fits(&dir.join(SGP_FILE))?;
        if north.nsgp <= 0.0 || south.nsgp >= 0.0 {
            return Err(DustMapError::Format(
                "LAM_NSGP signs do not match the ngp/sgp file pair".into(),
            ));
        }
        Ok(DustMap { north, south })
    }

    /// Assemble a map from pre-built hemispheres (synthetic data, tests).
    pub fn from_hemispheres(north: Hemisphere, south: Hemisphere) -> Self {
        DustMap { north, south }
    }

    /// Color excess E(B-V) in magnitudes along the line of sight.
    ///
    /// The equatorial coordinate is rotated to Galactic `(l, b)` and the
    /// matching polar cap is interpolated.
    pub fn ebv(&self, coord: SkyCoord) -> Result<f64, DustMapError> {
        let (l, b) = coord.galactic();
        let hemi = if b >= 0.0 { &self.north } else { &self.south };
        hemi.sample(l, b)
            .ok_or(DustMapError::OutOfCoverage { coord })
    }
}

fn read_f64_key(
    f: &mut FitsFile,
    hdu: &FitsHdu,
    path: &Path,
    name: &str,
) -> Result<f64, DustMapError> {
    hdu.read_key::<f64>(f, name)
        .map_err(|e| DustMapError::Format(format!("{}: keyword {name}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::Array2;

    /// Cap pair with constant reddening; `scale` larger than the half-grid
    /// leaves low Galactic latitudes uncovered.
    fn constant_map(value: f32, scale: f64) -> DustMap {
        let grid = Array2::from_elem((32, 32), value);
        DustMap::from_hemispheres(
            Hemisphere::new(grid.clone(), 1.0, scale).unwrap(),
            Hemisphere::new(grid, -1.0, scale).unwrap(),
        )
    }

    #[test]
    fn polar_lookup_returns_the_map_value() {
        let map = constant_map(0.05, 10.0);
        // Close to the north Galactic pole: well inside the cap.
        let ebv = map.ebv(SkyCoord::new(192.86, 27.13)).unwrap();
        assert_relative_eq!(ebv, 0.05, epsilon = 1e-6);
        // And the southern cap.
        let ebv = map.ebv(SkyCoord::new(12.86, -27.13)).unwrap();
        assert_relative_eq!(ebv, 0.05, epsilon = 1e-6);
    }

    #[test]
    fn uncovered_position_is_an_error_not_zero() {
        // scale 30 pushes the b ~ 0 ring off the 32 x 32 grid.
        let map = constant_map(0.05, 30.0);
        let err = map.ebv(SkyCoord::new(266.405, -28.936)).unwrap_err();
        assert!(matches!(err, DustMapError::OutOfCoverage { .. }));
    }

    #[test]
    fn bilinear_midpoint_of_a_gradient() {
        let mut grid = Array2::zeros((2, 2));
        grid[[0, 1]] = 1.0;
        grid[[1, 0]] = 2.0;
        grid[[1, 1]] = 3.0;
        assert_relative_eq!(bilinear(&grid, 0.5, 0.5).unwrap(), 1.5, epsilon = 1e-12);
        assert_relative_eq!(bilinear(&grid, 1.0, 1.0).unwrap(), 3.0, epsilon = 1e-12);
        assert!(bilinear(&grid, 1.01, 0.5).is_none());
        assert!(bilinear(&grid, -0.01, 0.5).is_none());
    }
}
