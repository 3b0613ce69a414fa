//! Writes a demo dataset: a synthetic SDSS-style quasar spectrum and a pair
//! of small SFD-style dust-map hemispheres, so the viewer can be exercised
//! without downloading anything from an archive.

use std::path::Path;

use anyhow::{Context, Result};
use fitsio::images::{ImageDescription, ImageType};
use fitsio::tables::{ColumnDataType, ColumnDescription};
use fitsio::FitsFile;

const REDSHIFT: f64 = 0.35;
const RA: f64 = 185.0;
const DEC: f64 = 35.2;

fn gaussian(x: f64, mu: f64, sigma: f64, amplitude: f64) -> f64 {
    amplitude * (-(x - mu).powi(2) / (2.0 * sigma.powi(2))).exp()
}

/// Power-law continuum with broad emission lines shifted to the observed
/// frame. Rest wavelengths are the usual quasar lines landing in the SDSS
/// band at this redshift.
fn quasar_flux(wavelength: f64) -> f64 {
    let lines: [(f64, f64, f64); 5] = [
        (4102.9, 25.0, 0.8),  // H-delta
        (4341.7, 28.0, 1.0),  // H-gamma
        (4862.7, 35.0, 2.2),  // H-beta
        (5008.2, 12.0, 1.4),  // [O III]
        (6564.6, 45.0, 4.0),  // H-alpha
    ];

    let continuum = 5.0 * (wavelength / 4000.0).powf(-1.5);
    let emission: f64 = lines
        .iter()
        .map(|&(rest, sigma, amp)| {
            gaussian(wavelength, rest * (1.0 + REDSHIFT), sigma * (1.0 + REDSHIFT), amp)
        })
        .sum();
    continuum + emission
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

fn f64_column(name: &str) -> Result<fitsio::tables::ConcreteColumnDescription> {
    ColumnDescription::new(name)
        .with_type(ColumnDataType::Double)
        .create()
        .with_context(|| format!("describing column {name}"))
}

fn write_spectrum(path: &Path, rng: &mut SimpleRng) -> Result<usize> {
    // SDSS convention: uniform grid in log10 wavelength, 1e-4 dex pixels.
    let loglam_start = 3800f64.log10();
    let n_pixels = 3840;
    let loglam: Vec<f64> = (0..n_pixels)
        .map(|i| loglam_start + 1e-4 * i as f64)
        .collect();

    let mut flux = Vec::with_capacity(n_pixels);
    let mut ivar = Vec::with_capacity(n_pixels);
    for &ll in &loglam {
        let w = 10f64.powf(ll);
        let signal = quasar_flux(w);
        let sigma = 0.02 * signal + 0.05;
        flux.push(signal + rng.gauss(0.0, sigma));
        ivar.push(1.0 / (sigma * sigma));
    }

    let mut f = FitsFile::create(path)
        .overwrite()
        .open()
        .with_context(|| format!("creating {}", path.display()))?;

    let coadd_cols = [f64_column("loglam")?, f64_column("flux")?, f64_column("ivar")?];
    let coadd = f.create_table("COADD".to_string(), &coadd_cols)?;
    coadd.write_col(&mut f, "loglam", &loglam)?;
    coadd.write_col(&mut f, "flux", &flux)?;
    coadd.write_col(&mut f, "ivar", &ivar)?;

    let spall_cols = [
        f64_column("Z")?,
        f64_column("PLUG_RA")?,
        f64_column("PLUG_DEC")?,
    ];
    let spall = f.create_table("SPALL".to_string(), &spall_cols)?;
    spall.write_col(&mut f, "Z", &[REDSHIFT])?;
    spall.write_col(&mut f, "PLUG_RA", &[RA])?;
    spall.write_col(&mut f, "PLUG_DEC", &[DEC])?;

    Ok(n_pixels)
}

fn write_hemisphere(path: &Path, nsgp: f64) -> Result<()> {
    // Small Lambert cap: 128 px, scale 50 covers the full hemisphere.
    let size = 128usize;
    let scale = 50.0;
    let center = size as f64 / 2.0 - 0.5;

    let mut pixels = Vec::with_capacity(size * size);
    for y in 0..size {
        for x in 0..size {
            // Reddening grows toward the Galactic plane (grid edge).
            let r = ((x as f64 - center).powi(2) + (y as f64 - center).powi(2)).sqrt();
            pixels.push((0.015 + 5e-4 * r) as f32);
        }
    }

    let description = ImageDescription {
        data_type: ImageType::Float,
        dimensions: &[size, size],
    };
    let mut f = FitsFile::create(path)
        .overwrite()
        .with_custom_primary(&description)
        .open()
        .with_context(|| format!("creating {}", path.display()))?;

    let hdu = f.hdu(0)?;
    hdu.write_image(&mut f, &pixels)?;
    hdu.write_key(&mut f, "LAM_NSGP", nsgp)?;
    hdu.write_key(&mut f, "LAM_SCAL", scale)?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let mut rng = SimpleRng::new(42);

    let out_dir = Path::new("sample_data");
    std::fs::create_dir_all(out_dir).context("creating sample_data/")?;

    let spec_path = out_dir.join("spec-0266-51602-0003.fits");
    let n = write_spectrum(&spec_path, &mut rng)?;
    println!(
        "Wrote {n}-pixel quasar spectrum (z = {REDSHIFT}) to {}",
        spec_path.display()
    );

    write_hemisphere(&out_dir.join("SFD_dust_4096_ngp.fits"), 1.0)?;
    write_hemisphere(&out_dir.join("SFD_dust_4096_sgp.fits"), -1.0)?;
    println!("Wrote SFD-style dust map pair to {}", out_dir.display());
    println!("Point the viewer at both from the File menu.");

    Ok(())
}
