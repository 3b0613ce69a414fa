//! Milky Way dust-extinction laws and the dereddening correction.
//!
//! Each law gives the curve shape `A(lambda)/A_V` for a grain population
//! described by `R_V = A_V / E(B-V)`; the corrector scales it by
//! `A_V = R_V * E(B-V)` and multiplies flux and uncertainty by
//! `10^(0.4 * A(lambda))`. Wavelengths are in Angstroms throughout; the
//! laws are parametrised in inverse microns `x = 1e4 / lambda`.

use std::fmt;

use super::model::Spectrum;
use super::spline::CubicSpline;

/// Milky Way average ratio of total-to-selective extinction.
pub const R_V_MW: f64 = 3.1;

// ---------------------------------------------------------------------------
// Law selection
// ---------------------------------------------------------------------------

/// Published extinction laws the corrector can apply. A closed set chosen by
/// configuration; all take the same `(wavelength, R_V)` inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DustLaw {
    /// Fitzpatrick (1999): UV parametrisation plus a cubic spline through
    /// nine optical/IR anchors. The default.
    Fitzpatrick99,
    /// Cardelli, Clayton & Mathis (1989) polynomial law.
    Ccm89,
    /// O'Donnell (1994): CCM with updated optical coefficients.
    Odonnell94,
}

impl DustLaw {
    pub const ALL: [DustLaw; 3] = [DustLaw::Fitzpatrick99, DustLaw::Ccm89, DustLaw::Odonnell94];

    pub fn label(&self) -> &'static str {
        match self {
            DustLaw::Fitzpatrick99 => "Fitzpatrick (1999)",
            DustLaw::Ccm89 => "Cardelli et al. (1989)",
            DustLaw::Odonnell94 => "O'Donnell (1994)",
        }
    }

    /// Curve shape `A(lambda)/A_V` sampled at each wavelength (Angstrom).
    pub fn shape(&self, wavelength: &[f64], r_v: f64) -> Vec<f64> {
        match self {
            DustLaw::Fitzpatrick99 => f99_shape(wavelength, r_v),
            DustLaw::Ccm89 => ccm_shape(wavelength, r_v, ccm89_optical),
            DustLaw::Odonnell94 => ccm_shape(wavelength, r_v, odonnell94_optical),
        }
    }
}

impl fmt::Display for DustLaw {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Corrector
// ---------------------------------------------------------------------------

/// Per-wavelength extinction `A(lambda)` in magnitudes:
/// `shape(lambda) * R_V * E(B-V)`.
pub fn extinction_curve(law: DustLaw, wavelength: &[f64], ebv: f64, r_v: f64) -> Vec<f64> {
    let a_v = r_v * ebv;
    law.shape(wavelength, r_v)
        .into_iter()
        .map(|s| s * a_v)
        .collect()
}

/// Remove the foreground dust attenuation from a spectrum.
///
/// Flux and uncertainty are both multiplied by `10^(0.4 * A(lambda_i))`,
/// the uncertainty propagating unchanged through the per-pixel scalar.
/// With `E(B-V) = 0` the output arrays equal the input exactly.
pub fn deredden(spectrum: &Spectrum, law: DustLaw, ebv: f64, r_v: f64) -> Spectrum {
    let a_lambda = extinction_curve(law, &spectrum.wavelength, ebv, r_v);
    let factors: Vec<f64> = a_lambda.iter().map(|a| 10f64.powf(0.4 * a)).collect();

    let flux = spectrum
        .flux
        .iter()
        .zip(&factors)
        .map(|(f, k)| f * k)
        .collect();
    let flux_error = spectrum
        .flux_error
        .iter()
        .zip(&factors)
        .map(|(e, k)| e * k)
        .collect();

    // Lengths are preserved by construction, so this cannot fail.
    spectrum
        .with_flux(flux, flux_error)
        .expect("dereddening preserves array lengths")
}

// ---------------------------------------------------------------------------
// Cardelli / O'Donnell family
// ---------------------------------------------------------------------------

/// CCM-style evaluation: per-range `(a, b)` coefficients combined as
/// `A/A_V = a(x) + b(x) / R_V`. The optical polynomial is the only piece
/// that differs between CCM89 and O'Donnell 94.
fn ccm_shape(wavelength: &[f64], r_v: f64, optical: fn(f64) -> (f64, f64)) -> Vec<f64> {
    wavelength
        .iter()
        .map(|&w| {
            let x = 1e4 / w;
            let (a, b) = if x < 1.1 {
                ccm89_infrared(x)
            } else if x < 3.3 {
                optical(x)
            } else if x < 8.0 {
                ccm89_ultraviolet(x)
            } else {
                ccm89_far_ultraviolet(x)
            };
            a + b / r_v
        })
        .collect()
}

fn ccm89_infrared(x: f64) -> (f64, f64) {
    let p = x.powf(1.61);
    (0.574 * p, -0.527 * p)
}

fn ccm89_optical(x: f64) -> (f64, f64) {
    let y = x - 1.82;
    let a = 1.0
        + y * (0.17699
            + y * (-0.50447
                + y * (-0.02427
                    + y * (0.72085 + y * (0.01979 + y * (-0.77530 + y * 0.32999))))));
    let b = y
        * (1.41338
            + y * (2.28305
                + y * (1.07233
                    + y * (-5.38434 + y * (-0.62251 + y * (5.30260 + y * -2.09002))))));
    (a, b)
}

fn odonnell94_optical(x: f64) -> (f64, f64) {
    let y = x - 1.82;
    let a = 1.0
        + y * (0.104
            + y * (-0.609
                + y * (0.701
                    + y * (1.137
                        + y * (-1.718 + y * (-0.827 + y * (1.647 + y * -0.505)))))));
    let b = y
        * (1.952
            + y * (2.908
                + y * (-3.989
                    + y * (-7.985
                        + y * (11.102 + y * (5.491 + y * (-10.805 + y * 5.755)))))));
    (a, b)
}

fn ccm89_ultraviolet(x: f64) -> (f64, f64) {
    let (mut fa, mut fb) = (0.0, 0.0);
    if x >= 5.9 {
        let y = x - 5.9;
        fa = y * y * (-0.04473 - 0.009779 * y);
        fb = y * y * (0.2130 + 0.1207 * y);
    }
    let a = 1.752 - 0.316 * x - 0.104 / ((x - 4.67).powi(2) + 0.341) + fa;
    let b = -3.090 + 1.825 * x + 1.206 / ((x - 4.62).powi(2) + 0.263) + fb;
    (a, b)
}

fn ccm89_far_ultraviolet(x: f64) -> (f64, f64) {
    let y = x - 8.0;
    let a = -1.073 + y * (-0.628 + y * (0.137 + y * -0.070));
    let b = 13.670 + y * (4.257 + y * (-0.420 + y * 0.374));
    (a, b)
}

// ---------------------------------------------------------------------------
// Fitzpatrick 1999
// ---------------------------------------------------------------------------

/// Spline anchor wavelengths, inverse microns (infinity, 26500 A .. 2600 A).
const F99_ANCHOR_X: [f64; 9] = [
    0.0,
    1e4 / 26500.0,
    1e4 / 12200.0,
    1e4 / 6000.0,
    1e4 / 5470.0,
    1e4 / 4670.0,
    1e4 / 4110.0,
    1e4 / 2700.0,
    1e4 / 2600.0,
];

/// `A/E(B-V)` at the anchors for the given `R_V` (Fitzpatrick 1999, as
/// tabulated for the R-dependent optical/IR spline).
fn f99_anchor_values(r_v: f64, uv: &impl Fn(f64) -> f64) -> [f64; 9] {
    [
        0.0,
        0.26469 * r_v / 3.1,
        0.82925 * r_v / 3.1,
        -0.422809 + 1.00270 * r_v + 2.13572e-4 * r_v * r_v,
        -5.13540e-2 + 1.00216 * r_v - 7.35778e-5 * r_v * r_v,
        0.700127 + 1.00184 * r_v - 3.32598e-5 * r_v * r_v,
        1.19456 + 1.01707 * r_v - 5.46959e-3 * r_v.powi(2) + 7.97809e-4 * r_v.powi(3)
            - 4.45636e-5 * r_v.powi(4),
        uv(F99_ANCHOR_X[7]),
        uv(F99_ANCHOR_X[8]),
    ]
}

fn f99_shape(wavelength: &[f64], r_v: f64) -> Vec<f64> {
    // UV segment: Fitzpatrick & Massa parametrisation with the F99 Milky Way
    // coefficients; returns A/E(B-V).
    let x0 = 4.596;
    let gamma = 0.99;
    let c3 = 3.23;
    let c4 = 0.41;
    let c2 = -0.824 + 4.717 / r_v;
    let c1 = 2.030 - 3.007 * c2;

    let uv = move |x: f64| -> f64 {
        let x2 = x * x;
        let d = x2 / ((x2 - x0 * x0).powi(2) + x2 * gamma * gamma);
        let mut k = c1 + c2 * x + c3 * d;
        if x >= 5.9 {
            let y = x - 5.9;
            k += c4 * (0.5392 * y * y + 0.05644 * y * y * y);
        }
        k + r_v
    };

    let anchors = f99_anchor_values(r_v, &uv);
    let spline = CubicSpline::new(F99_ANCHOR_X.to_vec(), anchors.to_vec());
    let x_spline_max = F99_ANCHOR_X[8];

    wavelength
        .iter()
        .map(|&w| {
            let x = 1e4 / w;
            let a_over_ebv = if x <= x_spline_max {
                spline.evaluate(x)
            } else {
                uv(x)
            };
            a_over_ebv / r_v
        })
        .collect()
}
