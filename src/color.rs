use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            to_color32(hsl.into_color())
        })
        .collect()
}

fn to_color32(rgb: Srgb) -> Color32 {
    Color32::from_rgb(
        (rgb.red.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0) as u8,
    )
}

fn linear(hex: u32) -> LinSrgb {
    let [_, r, g, b] = hex.to_be_bytes();
    Srgb::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0).into_linear()
}

/// Three-stop ramp, `t` in [0, 1].
fn ramp(stops: [u32; 3], t: f64) -> Color32 {
    let t = t.clamp(0.0, 1.0) as f32;
    let (from, to, local) = if t < 0.5 {
        (stops[0], stops[1], t * 2.0)
    } else {
        (stops[1], stops[2], (t - 0.5) * 2.0)
    };
    let mixed = linear(from).mix(linear(to), local);
    to_color32(Srgb::from_linear(mixed))
}

// ---------------------------------------------------------------------------
// Scales for summary values
// ---------------------------------------------------------------------------

/// Blue (-1) → near white (0) → red (+1). Missing values are gray.
pub fn diverging(value: Option<f64>) -> Color32 {
    match value {
        Some(v) if v.is_finite() => ramp([0x2166ac, 0xf7f7f7, 0xb2182b], (v + 1.0) / 2.0),
        _ => Color32::GRAY,
    }
}

/// Yellow → orange → red for a normalised share in [0, 1].
pub fn heat(t: f64) -> Color32 {
    ramp([0xffffcc, 0xfd8d3c, 0xbd0026], t)
}

/// Black or white, whichever reads better on `background`.
pub fn text_on(background: Color32) -> Color32 {
    let [r, g, b, _] = background.to_array();
    let luma = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
    if luma > 140.0 {
        Color32::BLACK
    } else {
        Color32::WHITE
    }
}

/// Min-max scale `values` to [0, 1]; a constant series maps to 0.
pub fn normalise(values: &[f64]) -> Vec<f64> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    if range.is_nan() || range <= f64::EPSILON {
        return vec![0.0; values.len()];
    }
    values.iter().map(|v| (v - min) / range).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_requested_length() {
        assert!(generate_palette(0).is_empty());
        assert_eq!(generate_palette(7).len(), 7);
    }

    #[test]
    fn diverging_ends_are_blue_and_red() {
        let [r, _, b, _] = diverging(Some(-1.0)).to_array();
        assert!(b > r);
        let [r, _, b, _] = diverging(Some(1.0)).to_array();
        assert!(r > b);
        assert_eq!(diverging(None), Color32::GRAY);
        assert_eq!(diverging(Some(f64::NAN)), Color32::GRAY);
    }

    #[test]
    fn normalise_spans_unit_interval() {
        assert_eq!(normalise(&[2.0, 4.0, 3.0]), vec![0.0, 1.0, 0.5]);
        assert_eq!(normalise(&[5.0, 5.0]), vec![0.0, 0.0]);
        assert!(normalise(&[]).is_empty());
    }

    #[test]
    fn text_contrasts_with_background() {
        assert_eq!(text_on(heat(0.0)), Color32::BLACK);
        assert_eq!(text_on(heat(1.0)), Color32::WHITE);
    }
}
