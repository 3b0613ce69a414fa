use std::path::PathBuf;

use crate::data::dustmap::DustMap;
use crate::data::extinction::{self, DustLaw, R_V_MW};
use crate::data::model::Spectrum;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering. The loaded spectrum and dust
/// map are the inputs; every derived value is recomputed whenever an input or
/// a setting changes, keeping the stages pure functions of the state.
pub struct AppState {
    /// Loaded spectrum (None until the user opens a file).
    pub spectrum: Option<Spectrum>,

    /// Loaded dust map handle, passed explicitly to the lookup.
    pub dust_map: Option<DustMap>,

    /// Directory the dust map was loaded from (shown in the UI).
    pub dust_dir: Option<PathBuf>,

    /// Line-of-sight color excess from the last successful lookup.
    pub ebv: Option<f64>,

    /// Selected extinction law.
    pub law: DustLaw,

    /// Redshift used for the rest-frame stage. Starts as the pipeline value
    /// from the file; editable because pipeline estimates can be unreliable.
    pub redshift: f64,

    /// Extinction-corrected spectrum (requires a dust map).
    pub dereddened: Option<Spectrum>,

    /// Rest-frame spectrum, built from the dereddened stage when available.
    pub rest_frame: Option<Spectrum>,

    // Per-stage visibility toggles.
    pub show_observed: bool,
    pub show_dereddened: bool,
    pub show_rest_frame: bool,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            spectrum: None,
            dust_map: None,
            dust_dir: None,
            ebv: None,
            law: DustLaw::Fitzpatrick99,
            redshift: 0.0,
            dereddened: None,
            rest_frame: None,
            show_observed: true,
            show_dereddened: true,
            show_rest_frame: true,
            status_message: None,
        }
    }
}

impl AppState {
    /// Ingest a newly loaded spectrum and rebuild the derived stages.
    pub fn set_spectrum(&mut self, spectrum: Spectrum) {
        self.redshift = spectrum.redshift;
        self.spectrum = Some(spectrum);
        self.status_message = None;
        self.recompute();
    }

    /// Ingest a newly loaded dust map.
    pub fn set_dust_map(&mut self, map: DustMap, dir: PathBuf) {
        self.dust_map = Some(map);
        self.dust_dir = Some(dir);
        self.status_message = None;
        self.recompute();
    }

    /// Switch the extinction law.
    pub fn set_law(&mut self, law: DustLaw) {
        self.law = law;
        self.recompute();
    }

    /// Override the rest-frame redshift.
    pub fn set_redshift(&mut self, redshift: f64) {
        self.redshift = redshift;
        self.recompute();
    }

    /// Rebuild every derived stage from the current inputs.
    ///
    /// Lookup and rest-frame failures surface as status messages and leave
    /// the corresponding stage empty; nothing falls back to a silent zero.
    pub fn recompute(&mut self) {
        self.ebv = None;
        self.dereddened = None;
        self.rest_frame = None;

        let Some(spectrum) = &self.spectrum else {
            return;
        };

        if let Some(map) = &self.dust_map {
            match map.ebv(spectrum.coord) {
                Ok(ebv) => {
                    log::info!("E(B-V) = {ebv:.4} at {}", spectrum.coord);
                    self.ebv = Some(ebv);
                    self.dereddened =
                        Some(extinction::deredden(spectrum, self.law, ebv, R_V_MW));
                }
                Err(e) => {
                    log::warn!("dust lookup failed: {e}");
                    self.status_message = Some(format!("Dust lookup: {e}"));
                }
            }
        }

        let base = self.dereddened.as_ref().unwrap_or(spectrum);
        match base.to_rest_frame(self.redshift) {
            Ok(rest) => self.rest_frame = Some(rest),
            Err(e) => {
                log::warn!("rest-frame transform failed: {e}");
                self.status_message = Some(format!("Rest frame: {e}"));
            }
        }
    }

    /// The most corrected spectrum available, used as the export target.
    pub fn best_corrected(&self) -> Option<&Spectrum> {
        self.rest_frame
            .as_ref()
            .or(self.dereddened.as_ref())
            .or(self.spectrum.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::coords::SkyCoord;
    use crate::data::dustmap::Hemisphere;
    use approx::assert_relative_eq;
    use ndarray::Array2;
    use std::collections::BTreeMap;

    fn test_spectrum() -> Spectrum {
        let wavelength: Vec<f64> = (0..50).map(|i| 4000.0 + 100.0 * i as f64).collect();
        let n = wavelength.len();
        Spectrum::new(
            wavelength,
            vec![2.0; n],
            vec![0.2; n],
            0.25,
            // High Galactic latitude, inside the synthetic caps below.
            SkyCoord::new(185.0, 35.2),
            BTreeMap::new(),
        )
        .unwrap()
    }

    fn test_map(value: f32) -> DustMap {
        let grid = Array2::from_elem((64, 64), value);
        DustMap::from_hemispheres(
            Hemisphere::new(grid.clone(), 1.0, 20.0).unwrap(),
            Hemisphere::new(grid, -1.0, 20.0).unwrap(),
        )
    }

    #[test]
    fn stages_rebuild_after_inputs_arrive() {
        let mut state = AppState::default();
        state.set_spectrum(test_spectrum());
        // No dust map yet: rest frame exists, dereddened does not.
        assert!(state.dereddened.is_none());
        assert!(state.rest_frame.is_some());
        assert_relative_eq!(state.redshift, 0.25, epsilon = 1e-12);

        state.set_dust_map(test_map(0.04), PathBuf::from("maps"));
        assert_relative_eq!(state.ebv.unwrap(), 0.04, epsilon = 1e-6);
        let dered = state.dereddened.as_ref().unwrap();
        let obs = state.spectrum.as_ref().unwrap();
        assert!(dered.flux[0] > obs.flux[0]);

        // Rest frame chains off the dereddened stage.
        let rest = state.rest_frame.as_ref().unwrap();
        assert_relative_eq!(rest.flux[0], dered.flux[0], epsilon = 1e-12);
        assert_relative_eq!(
            rest.wavelength[0],
            obs.wavelength[0] / 1.25,
            epsilon = 1e-9
        );
    }

    #[test]
    fn invalid_redshift_reports_and_clears_the_stage() {
        let mut state = AppState::default();
        state.set_spectrum(test_spectrum());
        state.set_redshift(-1.5);
        assert!(state.rest_frame.is_none());
        assert!(state.status_message.is_some());
    }

    #[test]
    fn law_switch_changes_the_correction() {
        let mut state = AppState::default();
        state.set_spectrum(test_spectrum());
        state.set_dust_map(test_map(0.1), PathBuf::from("maps"));
        let f99 = state.dereddened.as_ref().unwrap().flux[10];
        state.set_law(DustLaw::Ccm89);
        let ccm = state.dereddened.as_ref().unwrap().flux[10];
        assert!((f99 - ccm).abs() > 0.0);
    }
}
