/// Data layer: the spectrum pipeline core, independent of the UI.
///
/// Architecture:
/// ```text
///  spec-*.fits                    SFD_dust_4096_{n,s}gp.fits
///        │                                  │
///        ▼                                  ▼
///   ┌──────────┐                      ┌──────────┐
///   │  loader   │  FITS → Spectrum    │ dustmap  │  (ra, dec) → E(B-V)
///   └──────────┘                      └──────────┘
///        │                                  │
///        └────────────┬─────────────────────┘
///                     ▼
///              ┌────────────┐
///              │ extinction  │  A(λ) = shape·R_V·E(B-V); flux × 10^(0.4·A)
///              └────────────┘
///                     │
///                     ▼
///              Spectrum::to_rest_frame  λ / (1 + z)
/// ```
pub mod coords;
pub mod dustmap;
pub mod export;
pub mod extinction;
pub mod loader;
pub mod model;
pub mod spline;
