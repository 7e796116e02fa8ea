//! Layer styling - colors, heat gradients, rectangle fills
//!
//! Gradients are checked once, when built or deserialized. Everything
//! downstream (the layer factory, the backends) takes them as given.

use crate::error::MapError;
use serde::{Deserialize, Serialize};

/// 8-bit RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// CSS names used by the dashboard palettes
const NAMED_COLORS: &[(&str, [u8; 3])] = &[
    ("black", [0, 0, 0]),
    ("white", [255, 255, 255]),
    ("red", [255, 0, 0]),
    ("lime", [0, 255, 0]),
    ("green", [0, 128, 0]),
    ("blue", [0, 0, 255]),
    ("cyan", [0, 255, 255]),
    ("yellow", [255, 255, 0]),
    ("orange", [255, 165, 0]),
    ("lightblue", [173, 216, 230]),
    ("violet", [238, 130, 238]),
    ("purple", [128, 0, 128]),
    ("brown", [165, 42, 42]),
    ("gray", [128, 128, 128]),
];

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parse a CSS color name or `#rgb` / `#rrggbb` hex literal
    pub fn parse(s: &str) -> Result<Self, MapError> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            return Self::parse_hex(hex).ok_or_else(|| MapError::UnknownColor(s.to_string()));
        }
        let lower = s.to_ascii_lowercase();
        NAMED_COLORS
            .iter()
            .find(|(name, _)| *name == lower)
            .map(|(_, [r, g, b])| Color::rgb(*r, *g, *b))
            .ok_or_else(|| MapError::UnknownColor(s.to_string()))
    }

    fn parse_hex(hex: &str) -> Option<Self> {
        let digit = |i: usize, len: usize| u8::from_str_radix(hex.get(i..i + len)?, 16).ok();
        match hex.len() {
            3 => {
                let r = digit(0, 1)?;
                let g = digit(1, 1)?;
                let b = digit(2, 1)?;
                Some(Color::rgb(r * 17, g * 17, b * 17))
            }
            6 => Some(Color::rgb(digit(0, 2)?, digit(2, 2)?, digit(4, 2)?)),
            _ => None,
        }
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Linear blend, `t` = 0 gives `self`
    pub fn lerp(&self, other: &Color, t: f64) -> Color {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Color {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: mix(self.a, other.a),
        }
    }
}

impl TryFrom<String> for Color {
    type Error = MapError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Color::parse(&s)
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.to_hex()
    }
}

/// One gradient stop: normalized weight -> color
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    pub stop: f64,
    pub color: Color,
}

/// Weight-to-color ramp with strictly increasing stops in [0, 1]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<GradientStop>", into = "Vec<GradientStop>")]
pub struct Gradient {
    stops: Vec<GradientStop>,
}

impl Gradient {
    pub fn new(stops: Vec<GradientStop>) -> Result<Self, MapError> {
        if stops.is_empty() {
            return Err(MapError::InvalidGradient("no stops".to_string()));
        }
        for s in &stops {
            if !(0.0..=1.0).contains(&s.stop) {
                return Err(MapError::InvalidGradient(format!(
                    "stop {} outside [0, 1]",
                    s.stop
                )));
            }
        }
        for pair in stops.windows(2) {
            if pair[1].stop <= pair[0].stop {
                return Err(MapError::InvalidGradient(format!(
                    "stops not strictly increasing: {} then {}",
                    pair[0].stop, pair[1].stop
                )));
            }
        }
        Ok(Self { stops })
    }

    /// Build from `(stop, color name)` pairs
    pub fn from_pairs(pairs: &[(f64, &str)]) -> Result<Self, MapError> {
        let stops = pairs
            .iter()
            .map(|&(stop, name)| Ok(GradientStop { stop, color: Color::parse(name)? }))
            .collect::<Result<Vec<_>, MapError>>()?;
        Self::new(stops)
    }

    pub fn stops(&self) -> &[GradientStop] {
        &self.stops
    }

    /// Color at weight `t`; flat below the first stop and above the last
    pub fn sample(&self, t: f64) -> Color {
        let first = self.stops[0];
        if t <= first.stop {
            return first.color;
        }
        for pair in self.stops.windows(2) {
            let (lo, hi) = (pair[0], pair[1]);
            if t <= hi.stop {
                let f = (t - lo.stop) / (hi.stop - lo.stop);
                return lo.color.lerp(&hi.color, f);
            }
        }
        self.stops[self.stops.len() - 1].color
    }
}

impl TryFrom<Vec<GradientStop>> for Gradient {
    type Error = MapError;

    fn try_from(stops: Vec<GradientStop>) -> Result<Self, Self::Error> {
        Gradient::new(stops)
    }
}

impl From<Gradient> for Vec<GradientStop> {
    fn from(g: Gradient) -> Self {
        g.stops
    }
}

/// Heat overlay parameters: influence radius and blur in pixels, plus gradient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatStyle {
    pub radius: f32,
    pub blur: f32,
    pub gradient: Gradient,
}

/// Rectangle overlay parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RectStyle {
    pub color: Color,
    pub weight: f32,
    pub fill_opacity: f32,
}

impl HeatStyle {
    pub fn validate(&self) -> Result<(), MapError> {
        if !(self.radius > 0.0) || !(self.blur >= 0.0) {
            return Err(MapError::InvalidStyle(format!(
                "heat radius {} / blur {}",
                self.radius, self.blur
            )));
        }
        Ok(())
    }
}

impl RectStyle {
    pub fn validate(&self) -> Result<(), MapError> {
        if !(0.0..=1.0).contains(&self.fill_opacity) || !(self.weight >= 0.0) {
            return Err(MapError::InvalidStyle(format!(
                "rectangle weight {} / fill opacity {}",
                self.weight, self.fill_opacity
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_named_and_hex() {
        assert_eq!(Color::parse("lime").unwrap(), Color::rgb(0, 255, 0));
        assert_eq!(Color::parse("#a52a2a").unwrap(), Color::rgb(165, 42, 42));
        assert_eq!(Color::parse("#fff").unwrap(), Color::rgb(255, 255, 255));
        assert!(matches!(Color::parse("chartreuse-ish"), Err(MapError::UnknownColor(_))));
        assert!(Color::parse("#12345").is_err());
    }

    #[test]
    fn test_gradient_rejects_unsorted_stops() {
        let err = Gradient::from_pairs(&[(0.6, "lime"), (0.4, "blue")]).unwrap_err();
        assert!(matches!(err, MapError::InvalidGradient(_)));
        assert!(Gradient::from_pairs(&[(0.4, "blue"), (0.4, "red")]).is_err());
        assert!(Gradient::from_pairs(&[(0.4, "blue"), (1.2, "red")]).is_err());
        assert!(Gradient::new(vec![]).is_err());
    }

    #[test]
    fn test_gradient_keeps_stops_verbatim() {
        let g = Gradient::from_pairs(&[(0.4, "cyan"), (0.65, "yellow"), (1.0, "red")]).unwrap();
        let stops: Vec<f64> = g.stops().iter().map(|s| s.stop).collect();
        assert_eq!(stops, vec![0.4, 0.65, 1.0]);
    }

    #[test]
    fn test_gradient_sample() {
        let g = Gradient::from_pairs(&[(0.0, "black"), (1.0, "white")]).unwrap();
        assert_eq!(g.sample(-1.0), Color::rgb(0, 0, 0));
        assert_eq!(g.sample(0.5), Color::rgb(128, 128, 128));
        assert_eq!(g.sample(2.0), Color::rgb(255, 255, 255));
    }

    #[test]
    fn test_gradient_deserialize_validates() {
        let ok: Gradient = serde_yaml::from_str("- {stop: 0.2, color: lightblue}\n- {stop: 1.0, color: purple}\n").unwrap();
        assert_eq!(ok.stops().len(), 2);
        let bad: Result<Gradient, _> = serde_yaml::from_str("- {stop: 0.9, color: red}\n- {stop: 0.1, color: blue}\n");
        assert!(bad.is_err());
    }
}
