use eframe::egui::{self, Color32, DragValue, RichText, ScrollArea, Ui};

use crate::color::Stage;
use crate::data::dustmap::DustMap;
use crate::data::extinction::{DustLaw, R_V_MW};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – target, correction, and display controls
// ---------------------------------------------------------------------------

/// Render the left control panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Correction");
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            target_section(ui, state);
            ui.separator();
            correction_section(ui, state);
            ui.separator();
            display_section(ui, state);
            ui.separator();
            header_section(ui, state);
        });
}

fn target_section(ui: &mut Ui, state: &mut AppState) {
    ui.strong("Target");
    let Some(sp) = &state.spectrum else {
        ui.label("No spectrum loaded.");
        return;
    };

    egui::Grid::new("target_grid").num_columns(2).show(ui, |ui: &mut Ui| {
        ui.label("RA");
        ui.label(format!("{:.5}°", sp.coord.ra));
        ui.end_row();
        ui.label("Dec");
        ui.label(format!("{:+.5}°", sp.coord.dec));
        ui.end_row();
        ui.label("Pipeline z");
        ui.label(format!("{:.4}", sp.redshift));
        ui.end_row();
        ui.label("Pixels");
        ui.label(format!("{}", sp.len()));
        ui.end_row();
    });

    // The pipeline estimate can be unreliable; let the user drag it.
    let mut z = state.redshift;
    ui.horizontal(|ui: &mut Ui| {
        ui.label("Rest-frame z");
        if ui
            .add(DragValue::new(&mut z).speed(0.001).range(-0.99..=8.0))
            .changed()
        {
            state.set_redshift(z);
        }
    });
}

fn correction_section(ui: &mut Ui, state: &mut AppState) {
    ui.strong("Extinction");

    let current = state.law;
    egui::ComboBox::from_id_salt("dust_law")
        .selected_text(current.label())
        .show_ui(ui, |ui: &mut Ui| {
            for law in DustLaw::ALL {
                if ui.selectable_label(current == law, law.label()).clicked() {
                    state.set_law(law);
                }
            }
        });

    match &state.dust_dir {
        Some(dir) => {
            ui.label(format!("Map: {}", dir.display()));
        }
        None => {
            ui.label("No dust map loaded (File → Dust map folder…).");
        }
    }

    if let Some(ebv) = state.ebv {
        let a_v = R_V_MW * ebv;
        egui::Grid::new("ebv_grid").num_columns(2).show(ui, |ui: &mut Ui| {
            ui.label("E(B-V)");
            ui.label(format!("{ebv:.4} mag"));
            ui.end_row();
            ui.label("R_V");
            ui.label(format!("{R_V_MW:.1}"));
            ui.end_row();
            ui.label("A_V");
            ui.label(format!("{a_v:.4} mag"));
            ui.end_row();
        });
    }
}

fn display_section(ui: &mut Ui, state: &mut AppState) {
    ui.strong("Stages");
    for stage in Stage::ALL {
        let (flag, available) = match stage {
            Stage::Observed => (&mut state.show_observed, state.spectrum.is_some()),
            Stage::Dereddened => (&mut state.show_dereddened, state.dereddened.is_some()),
            Stage::RestFrame => (&mut state.show_rest_frame, state.rest_frame.is_some()),
        };
        let mut text = RichText::new(stage.label()).color(stage.color());
        if !available {
            text = RichText::new(stage.label()).weak();
        }
        ui.checkbox(flag, text);
    }
}

fn header_section(ui: &mut Ui, state: &AppState) {
    let Some(sp) = &state.spectrum else {
        return;
    };
    if sp.header.is_empty() {
        return;
    }

    egui::CollapsingHeader::new(RichText::new("Header").strong())
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            egui::Grid::new("header_grid")
                .num_columns(2)
                .striped(true)
                .show(ui, |ui: &mut Ui| {
                    for (card, value) in &sp.header {
                        ui.label(card);
                        ui.label(value.to_string());
                        ui.end_row();
                    }
                });
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open spectrum…").clicked() {
                open_spectrum_dialog(state);
                ui.close_menu();
            }
            if ui.button("Dust map folder…").clicked() {
                open_dust_map_dialog(state);
                ui.close_menu();
            }
            ui.separator();
            let exportable = state.best_corrected().is_some();
            if ui
                .add_enabled(exportable, egui::Button::new("Export corrected…"))
                .clicked()
            {
                export_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(sp) = &state.spectrum {
            ui.label(format!("J2000 {}  ·  z = {:.4}", sp.coord, state.redshift));
        }

        ui.separator();

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_spectrum_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open spectrum")
        .add_filter("FITS spectra", &["fits", "fit"])
        .pick_file();

    if let Some(path) = file {
        match crate::data::loader::load_file(&path) {
            Ok(spectrum) => {
                state.set_spectrum(spectrum);
            }
            Err(e) => {
                log::error!("failed to load spectrum: {e}");
                state.status_message = Some(format!("Error: {e}"));
            }
        }
    }
}

pub fn open_dust_map_dialog(state: &mut AppState) {
    let dir = rfd::FileDialog::new()
        .set_title("Select the SFD dust map folder")
        .pick_folder();

    if let Some(dir) = dir {
        match DustMap::open(&dir) {
            Ok(map) => {
                log::info!("loaded dust map from {}", dir.display());
                state.set_dust_map(map, dir);
            }
            Err(e) => {
                log::error!("failed to load dust map: {e}");
                state.status_message = Some(format!("Error: {e}"));
            }
        }
    }
}

pub fn export_dialog(state: &mut AppState) {
    let Some(spectrum) = state.best_corrected() else {
        return;
    };
    let file = rfd::FileDialog::new()
        .set_title("Export corrected spectrum")
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .set_file_name("spectrum_corrected.csv")
        .save_file();

    if let Some(path) = file {
        match crate::data::export::save_file(&path, spectrum) {
            Ok(()) => {
                log::info!("exported corrected spectrum to {}", path.display());
                state.status_message = None;
            }
            Err(e) => {
                log::error!("export failed: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
