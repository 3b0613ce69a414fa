use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use super::coords::SkyCoord;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failures raised by the spectrum core (loading and transforms).
#[derive(Debug, Error)]
pub enum SpectrumError {
    /// Malformed or incomplete spectrum file.
    #[error("malformed spectrum file: {0}")]
    Format(String),

    /// Co-indexed arrays of unequal length.
    #[error(
        "co-indexed arrays differ in length: wavelength {wavelength}, flux {flux}, \
         flux error {flux_error}"
    )]
    LengthMismatch {
        wavelength: usize,
        flux: usize,
        flux_error: usize,
    },

    /// Redshift at or below -1; the rest-frame scaling 1/(1+z) is undefined.
    #[error("redshift {0} is <= -1, rest-frame transform undefined")]
    UndefinedRedshift(f64),

    #[error("FITS error: {0}")]
    Fits(#[from] fitsio::errors::Error),
}

// ---------------------------------------------------------------------------
// HeaderValue – a single FITS header card, kept for inspection only
// ---------------------------------------------------------------------------

/// A loosely-typed header card value.
#[derive(Debug, Clone, PartialEq)]
pub enum HeaderValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for HeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderValue::String(s) => write!(f, "{s}"),
            HeaderValue::Integer(i) => write!(f, "{i}"),
            HeaderValue::Float(v) => write!(f, "{v:.4}"),
            HeaderValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Spectrum – one observed spectrum with its survey metadata
// ---------------------------------------------------------------------------

/// A single spectrum. Arrays are co-indexed and share one length; the
/// wavelength axis is in Angstroms, ascending, in the observed frame unless
/// produced by [`Spectrum::to_rest_frame`]. Values are never mutated in
/// place: every correction stage returns a new `Spectrum`.
#[derive(Debug, Clone)]
pub struct Spectrum {
    /// Wavelength axis (Angstrom).
    pub wavelength: Vec<f64>,
    /// Flux density, SDSS convention (1e-17 erg/s/cm^2/Angstrom).
    pub flux: Vec<f64>,
    /// 1-sigma flux uncertainty; infinite where the pipeline flagged the pixel.
    pub flux_error: Vec<f64>,
    /// Pipeline redshift estimate. May be unreliable; the UI lets the user
    /// override it without touching this field.
    pub redshift: f64,
    /// J2000 equatorial position of the fiber.
    pub coord: SkyCoord,
    /// Header cards kept for display, not used by any computation.
    pub header: BTreeMap<String, HeaderValue>,
}

impl Spectrum {
    /// Build a spectrum, validating that the three arrays are co-indexed.
    pub fn new(
        wavelength: Vec<f64>,
        flux: Vec<f64>,
        flux_error: Vec<f64>,
        redshift: f64,
        coord: SkyCoord,
        header: BTreeMap<String, HeaderValue>,
    ) -> Result<Self, SpectrumError> {
        if wavelength.len() != flux.len() || wavelength.len() != flux_error.len() {
            return Err(SpectrumError::LengthMismatch {
                wavelength: wavelength.len(),
                flux: flux.len(),
                flux_error: flux_error.len(),
            });
        }
        Ok(Spectrum {
            wavelength,
            flux,
            flux_error,
            redshift,
            coord,
            header,
        })
    }

    /// Number of pixels.
    pub fn len(&self) -> usize {
        self.wavelength.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wavelength.is_empty()
    }

    /// Copy of this spectrum with the flux and uncertainty arrays replaced.
    /// Used by the extinction corrector; wavelength and metadata carry over.
    pub fn with_flux(
        &self,
        flux: Vec<f64>,
        flux_error: Vec<f64>,
    ) -> Result<Spectrum, SpectrumError> {
        Spectrum::new(
            self.wavelength.clone(),
            flux,
            flux_error,
            self.redshift,
            self.coord,
            self.header.clone(),
        )
    }

    /// Shift the wavelength axis to the rest frame: `lambda / (1 + z)`.
    ///
    /// Flux and uncertainty are untouched; no flux-density Jacobian is
    /// applied, so the flux stays in observed-frame density units.
    pub fn to_rest_frame(&self, redshift: f64) -> Result<Spectrum, SpectrumError> {
        if redshift <= -1.0 {
            return Err(SpectrumError::UndefinedRedshift(redshift));
        }
        let scale = 1.0 + redshift;
        let wavelength = self.wavelength.iter().map(|&w| w / scale).collect();
        Spectrum::new(
            wavelength,
            self.flux.clone(),
            self.flux_error.clone(),
            self.redshift,
            self.coord,
            self.header.clone(),
        )
    }
}
