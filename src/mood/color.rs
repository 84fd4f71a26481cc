//! Deterministic mood + title → color synthesis.

use serde::Serialize;
use std::fmt;

/// A color in hue/saturation/lightness form.
///
/// Hue is in degrees `[0, 360)`, saturation and lightness in percent `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct HslColor {
    pub hue: u16,
    pub saturation: u8,
    pub lightness: u8,
}

/// Blue-grey used for unknown moods and as the empty-playlist placeholder.
pub const NEUTRAL_COLOR: HslColor = HslColor::new(200, 30, 40);

impl HslColor {
    pub const fn new(hue: u16, saturation: u8, lightness: u8) -> Self {
        Self {
            hue,
            saturation,
            lightness,
        }
    }

    /// Convert to 8-bit sRGB channels.
    pub fn to_rgb(&self) -> (u8, u8, u8) {
        let h = (self.hue % 360) as f64 / 60.0;
        let s = self.saturation.min(100) as f64 / 100.0;
        let l = self.lightness.min(100) as f64 / 100.0;

        let chroma = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let x = chroma * (1.0 - (h % 2.0 - 1.0).abs());
        let (r, g, b) = match h as u32 {
            0 => (chroma, x, 0.0),
            1 => (x, chroma, 0.0),
            2 => (0.0, chroma, x),
            3 => (0.0, x, chroma),
            4 => (x, 0.0, chroma),
            _ => (chroma, 0.0, x),
        };
        let m = l - chroma / 2.0;
        let channel = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        (channel(r), channel(g), channel(b))
    }
}

impl fmt::Display for HslColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hsl({}, {}%, {}%)",
            self.hue, self.saturation, self.lightness
        )
    }
}

/// Lower bounds and widths of the HSL window a mood maps into. Each window
/// is centred on the reference color of the mood.
struct MoodPalette {
    labels: &'static [&'static str],
    hue: u16,
    hue_spread: u16,
    saturation: u8,
    saturation_spread: u8,
    lightness: u8,
    lightness_spread: u8,
}

const fn palette(
    labels: &'static [&'static str],
    hue: u16,
    hue_spread: u16,
    saturation: u8,
    lightness: u8,
) -> MoodPalette {
    MoodPalette {
        labels,
        hue,
        hue_spread,
        saturation,
        saturation_spread: 10,
        lightness,
        lightness_spread: 10,
    }
}

const PALETTES: &[MoodPalette] = &[
    // Dark blue-violet
    palette(&["triste", "scuro"], 230, 20, 35, 15),
    palette(&["malinconico"], 270, 20, 25, 20),
    palette(&["drammatico"], 250, 20, 30, 18),
    // Teal-green midtones
    palette(&["calmo"], 170, 20, 35, 35),
    palette(&["rilassante"], 130, 20, 35, 45),
    palette(&["ambient"], 180, 20, 30, 40),
    // Bright
    palette(&["allegro"], 50, 20, 65, 55),
    palette(&["vivace"], 0, 360, 75, 50),
    // Warm, saturated
    palette(&["energetico"], 350, 20, 75, 45),
    palette(&["aggressivo"], 350, 20, 65, 35),
    // Genre names the model sometimes returns as a mood
    palette(&["pop"], 310, 20, 65, 55),
    palette(&["rock"], 350, 20, 60, 40),
    palette(&["jazz"], 20, 20, 55, 40),
    palette(&["classica"], 200, 20, 35, 40),
    palette(&["elettronica"], 270, 20, 55, 50),
];

static NEUTRAL_PALETTE: MoodPalette = palette(&["neutro"], 190, 20, 25, 35);

fn palette_for(mood: &str) -> &'static MoodPalette {
    PALETTES
        .iter()
        .find(|p| p.labels.iter().any(|label| *label == mood))
        .unwrap_or(&NEUTRAL_PALETTE)
}

fn normalize_mood(mood: &str) -> String {
    mood.trim().to_lowercase()
}

/// Polynomial rolling hash `Σ code(c_i) · 31^i` over the UTF-16 code units
/// of `title` followed by `mood`, accumulated with wrapping arithmetic.
pub fn title_hash(title: &str, mood: &str) -> u64 {
    let mut hash: i64 = 0;
    let mut power: i64 = 1;
    for unit in title.encode_utf16().chain(mood.encode_utf16()) {
        hash = hash.wrapping_add((unit as i64).wrapping_mul(power));
        power = power.wrapping_mul(31);
    }
    hash.unsigned_abs()
}

/// Color for a song with the given mood label.
///
/// Pure and deterministic: the mood picks an HSL window (case-insensitive,
/// unknown labels get the neutral window) and the title/mood hash picks the
/// point inside it.
pub fn synthesize(mood: &str, title: &str) -> HslColor {
    let mood = normalize_mood(mood);
    let palette = palette_for(&mood);
    let hash = title_hash(title, &mood);

    let offset = |spread: u64| if spread == 0 { 0 } else { hash % spread };

    let hue = (palette.hue as u64 + offset(palette.hue_spread as u64)) % 360;
    let saturation =
        (palette.saturation as u64 + offset(palette.saturation_spread as u64)).min(100);
    let lightness = (palette.lightness as u64 + offset(palette.lightness_spread as u64)).min(100);

    HslColor::new(hue as u16, saturation as u8, lightness as u8)
}
