use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Serialize;

use super::model::Spectrum;

/// One exported pixel. Non-finite uncertainties (flagged pixels) serialise
/// as nulls in JSON and empty fields in CSV via `Option`.
#[derive(Serialize)]
struct PixelRecord {
    wavelength: f64,
    flux: f64,
    flux_error: Option<f64>,
}

fn records(spectrum: &Spectrum) -> Vec<PixelRecord> {
    spectrum
        .wavelength
        .iter()
        .zip(&spectrum.flux)
        .zip(&spectrum.flux_error)
        .map(|((&wavelength, &flux), &err)| PixelRecord {
            wavelength,
            flux,
            flux_error: err.is_finite().then_some(err),
        })
        .collect()
}

/// Write a spectrum to a file. Dispatch by extension (`.csv` or `.json`).
pub fn save_file(path: &Path, spectrum: &Spectrum) -> Result<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => save_csv(path, spectrum),
        "json" => save_json(path, spectrum),
        other => bail!("Unsupported export extension: .{other}"),
    }
}

fn save_csv(path: &Path, spectrum: &Spectrum) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV file")?;
    for record in records(spectrum) {
        writer.serialize(record).context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV file")?;
    Ok(())
}

fn save_json(path: &Path, spectrum: &Spectrum) -> Result<()> {
    let file = std::fs::File::create(path).context("creating JSON file")?;
    serde_json::to_writer_pretty(file, &records(spectrum)).context("writing JSON records")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::coords::SkyCoord;
    use std::collections::BTreeMap;

    fn spectrum() -> Spectrum {
        Spectrum::new(
            vec![3800.0, 3801.0, 3802.0],
            vec![1.5, 2.5, 3.5],
            vec![0.1, f64::INFINITY, 0.3],
            0.2,
            SkyCoord::new(150.0, 2.0),
            BTreeMap::new(),
        )
        .unwrap()
    }

    #[test]
    fn csv_round_trip_preserves_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        save_file(&path, &spectrum()).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(
            headers.iter().collect::<Vec<_>>(),
            ["wavelength", "flux", "flux_error"]
        );
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 3);
        // flagged pixel exported with an empty uncertainty field
        assert_eq!(rows[1].get(2), Some(""));
    }

    #[test]
    fn json_is_a_record_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        save_file(&path, &spectrum()).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        let rows = value.as_array().unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0]["wavelength"], 3800.0);
        assert!(rows[1]["flux_error"].is_null());
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");
        assert!(save_file(&path, &spectrum()).is_err());
    }
}
