//! Colors: categorical schemes, the diverging heatmap scale and the blue gradient.

use crate::ColorScheme;
use plotters::style::RGBColor;

/// Red-to-blue diverging stops, blue at -1 and red at +1.
const DIVERGING_STOPS: [(f64, RGBColor); 5] = [
    (-1.0, RGBColor(5, 48, 97)),
    (-0.5, RGBColor(67, 147, 195)),
    (0.0, RGBColor(247, 247, 247)),
    (0.5, RGBColor(214, 96, 77)),
    (1.0, RGBColor(103, 0, 31)),
];

/// Sequential blues from pale to dark over [0, 1].
const BLUES_STOPS: [(f64, RGBColor); 5] = [
    (0.0, RGBColor(247, 251, 255)),
    (0.25, RGBColor(198, 219, 239)),
    (0.5, RGBColor(107, 174, 214)),
    (0.75, RGBColor(33, 113, 181)),
    (1.0, RGBColor(8, 48, 107)),
];

/// Get colors from color scheme
pub fn get_colors(scheme: &ColorScheme) -> Vec<RGBColor> {
    match scheme {
        ColorScheme::Default => vec![
            RGBColor(31, 119, 180),  // Blue
            RGBColor(255, 127, 14),  // Orange
            RGBColor(44, 160, 44),   // Green
            RGBColor(214, 39, 40),   // Red
            RGBColor(148, 103, 189), // Purple
            RGBColor(140, 86, 75),   // Brown
            RGBColor(227, 119, 194), // Pink
            RGBColor(127, 127, 127), // Gray
            RGBColor(188, 189, 34),  // Olive
            RGBColor(23, 190, 207),  // Cyan
        ],
        ColorScheme::Vibrant => vec![
            RGBColor(230, 25, 75),
            RGBColor(60, 180, 75),
            RGBColor(255, 225, 25),
            RGBColor(0, 130, 200),
            RGBColor(245, 130, 48),
            RGBColor(145, 30, 180),
            RGBColor(70, 240, 240),
            RGBColor(240, 50, 230),
        ],
        ColorScheme::Custom(colors) if !colors.is_empty() => {
            colors.iter().map(|color| parse_color(color)).collect()
        }
        ColorScheme::Custom(_) => get_colors(&ColorScheme::Default),
    }
}

/// Parse a color string (hex format) to `RGBColor`; black when malformed.
pub fn parse_color(color_str: &str) -> RGBColor {
    if let Some(hex) = color_str.strip_prefix('#') {
        if hex.len() == 6 && hex.is_ascii() {
            if let (Ok(r), Ok(g), Ok(b)) = (
                u8::from_str_radix(&hex[0..2], 16),
                u8::from_str_radix(&hex[2..4], 16),
                u8::from_str_radix(&hex[4..6], 16),
            ) {
                return RGBColor(r, g, b);
            }
        }
    }
    RGBColor(0, 0, 0)
}

/// Formats a color as `#rrggbb`.
pub fn to_hex(color: RGBColor) -> String {
    format!("#{:02x}{:02x}{:02x}", color.0, color.1, color.2)
}

/// Color for a correlation coefficient on the diverging scale, centred at 0.
///
/// Values outside [-1, 1] are clamped; `NaN` maps to the neutral middle.
pub fn diverging_color(value: f64) -> RGBColor {
    let value = if value.is_nan() { 0.0 } else { value.clamp(-1.0, 1.0) };
    interpolate(&DIVERGING_STOPS, value)
}

/// `count` blues evenly spaced between 40% and 90% of the sequential scale.
#[allow(clippy::cast_precision_loss)]
pub fn blues_gradient(count: usize) -> Vec<RGBColor> {
    match count {
        0 => Vec::new(),
        1 => vec![interpolate(&BLUES_STOPS, 0.4)],
        _ => (0..count)
            .map(|i| {
                let t = 0.4 + 0.5 * i as f64 / (count - 1) as f64;
                interpolate(&BLUES_STOPS, t)
            })
            .collect(),
    }
}

/// Whether annotation text drawn on `background` should be white.
pub fn needs_light_text(background: RGBColor) -> bool {
    let RGBColor(r, g, b) = background;
    let luminance = 0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b);
    luminance < 128.0
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn interpolate(stops: &[(f64, RGBColor)], t: f64) -> RGBColor {
    let upper = stops
        .iter()
        .position(|(at, _)| t <= *at)
        .unwrap_or(stops.len() - 1)
        .max(1);
    let (lo_at, lo) = stops[upper - 1];
    let (hi_at, hi) = stops[upper];
    let f = ((t - lo_at) / (hi_at - lo_at)).clamp(0.0, 1.0);

    let channel = |a: u8, b: u8| (f64::from(b) - f64::from(a)).mul_add(f, f64::from(a)).round() as u8;
    RGBColor(channel(lo.0, hi.0), channel(lo.1, hi.1), channel(lo.2, hi.2))
}
