use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Pipeline stages and their plot colours
// ---------------------------------------------------------------------------

/// The three plotted views of a spectrum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Observed,
    Dereddened,
    RestFrame,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Observed, Stage::Dereddened, Stage::RestFrame];

    pub fn label(&self) -> &'static str {
        match self {
            Stage::Observed => "Observed",
            Stage::Dereddened => "Dereddened",
            Stage::RestFrame => "Rest frame",
        }
    }

    pub fn color(&self) -> Color32 {
        let palette = generate_palette(Stage::ALL.len());
        palette[*self as usize]
    }
}

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = 210.0 + (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue % 360.0, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}
