use eframe::egui::Ui;
use egui_plot::{Line, Plot, PlotPoints};

use crate::color::Stage;
use crate::data::model::Spectrum;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Spectrum plot (central panel)
// ---------------------------------------------------------------------------

/// Render the stacked spectrum stages in the central panel.
pub fn spectrum_plot(ui: &mut Ui, state: &AppState) {
    if state.spectrum.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a spectrum to begin  (File → Open spectrum…)");
        });
        return;
    }

    Plot::new("spectrum_plot")
        .legend(egui_plot::Legend::default())
        .x_axis_label("Wavelength [Å]")
        .y_axis_label("Flux [10⁻¹⁷ erg s⁻¹ cm⁻² Å⁻¹]")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for (stage, spectrum) in stage_spectra(state) {
                let points: PlotPoints = spectrum
                    .wavelength
                    .iter()
                    .zip(&spectrum.flux)
                    .filter(|(_, &f)| f.is_finite())
                    .map(|(&w, &f)| [w, f])
                    .collect();

                let line = Line::new(points)
                    .name(stage.label())
                    .color(stage.color())
                    .width(1.2);

                plot_ui.line(line);
            }
        });
}

/// The enabled stages paired with their spectra, in draw order.
fn stage_spectra(state: &AppState) -> Vec<(Stage, &Spectrum)> {
    let mut out = Vec::new();
    if state.show_observed {
        if let Some(sp) = &state.spectrum {
            out.push((Stage::Observed, sp));
        }
    }
    if state.show_dereddened {
        if let Some(sp) = &state.dereddened {
            out.push((Stage::Dereddened, sp));
        }
    }
    if state.show_rest_frame {
        if let Some(sp) = &state.rest_frame {
            out.push((Stage::RestFrame, sp));
        }
    }
    out
}
