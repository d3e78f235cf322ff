use crate::foundation::error::{StoryError, StoryResult};
use serde::{Deserialize, Serialize};

pub use kurbo::{Affine, Point};

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Instagram Story export size (9:16).
    pub const STORY: Canvas = Canvas {
        width: 2790,
        height: 4960,
    };

    /// Placeholder geometry used by photo mode when no image is loaded.
    pub const PHOTO_PLACEHOLDER: Canvas = Canvas {
        width: 1080,
        height: 1080,
    };

    pub fn new(width: u32, height: u32) -> StoryResult<Self> {
        if width == 0 || height == 0 {
            return Err(StoryError::validation("canvas dimensions must be > 0"));
        }
        Ok(Self { width, height })
    }

    pub fn aspect(self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }

    pub fn pixel_count(self) -> usize {
        (self.width as usize) * (self.height as usize)
    }
}

/// Opaque 8-bit sRGB color. Serializes as `"#rrggbb"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    pub const WHITE: Rgb8 = Rgb8::new(255, 255, 255);
    pub const BLACK: Rgb8 = Rgb8::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn parse_hex(s: &str) -> StoryResult<Self> {
        let s = s.trim();
        let s = s.strip_prefix('#').unwrap_or(s);

        fn hex_byte(pair: &str) -> StoryResult<u8> {
            u8::from_str_radix(pair, 16)
                .map_err(|_| StoryError::validation(format!("invalid hex byte \"{pair}\"")))
        }

        match s.len() {
            3 => {
                let mut out = [0u8; 3];
                for (i, c) in s.chars().enumerate() {
                    let v = hex_byte(&c.to_string())?;
                    out[i] = v * 17;
                }
                Ok(Self::new(out[0], out[1], out[2]))
            }
            6 if s.is_ascii() => Ok(Self::new(
                hex_byte(&s[0..2])?,
                hex_byte(&s[2..4])?,
                hex_byte(&s[4..6])?,
            )),
            _ => Err(StoryError::validation(
                "hex color must be #RGB or #RRGGBB (case-insensitive)",
            )),
        }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn to_rgba8(self) -> [u8; 4] {
        [self.r, self.g, self.b, 255]
    }
}

impl Default for Rgb8 {
    fn default() -> Self {
        Self::WHITE
    }
}

impl std::str::FromStr for Rgb8 {
    type Err = StoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_hex(s)
    }
}

impl std::fmt::Display for Rgb8 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Rgb8 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Rgb8 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Hex(String),
            Arr([u8; 3]),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Hex(s) => Rgb8::parse_hex(&s).map_err(serde::de::Error::custom),
            Repr::Arr([r, g, b]) => Ok(Rgb8::new(r, g, b)),
        }
    }
}

/// Straight (non-premultiplied) color with normalized `0..1` channels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Canvas-style `rgba(r, g, b, a)` with 8-bit channels and `0..1` alpha.
    pub fn rgba8(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self::new(
            f32::from(r) / 255.0,
            f32::from(g) / 255.0,
            f32::from(b) / 255.0,
            a.clamp(0.0, 1.0),
        )
    }

    /// Canvas-style `hsla(h, s%, l%, a)`: hue in degrees, saturation and
    /// lightness in percent.
    pub fn hsla(h: f64, s_pct: f64, l_pct: f64, a: f32) -> Self {
        let h = (h % 360.0 + 360.0) % 360.0 / 360.0;
        let s = (s_pct / 100.0).clamp(0.0, 1.0);
        let l = (l_pct / 100.0).clamp(0.0, 1.0);
        let a = a.clamp(0.0, 1.0);

        if s == 0.0 {
            let v = l as f32;
            return Self::new(v, v, v, a);
        }

        fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
            if t < 0.0 {
                t += 1.0;
            }
            if t > 1.0 {
                t -= 1.0;
            }
            if t < 1.0 / 6.0 {
                return p + (q - p) * 6.0 * t;
            }
            if t < 1.0 / 2.0 {
                return q;
            }
            if t < 2.0 / 3.0 {
                return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
            }
            p
        }

        let q = if l < 0.5 {
            l * (1.0 + s)
        } else {
            l + s - l * s
        };
        let p = 2.0 * l - q;

        Self::new(
            hue_to_rgb(p, q, h + 1.0 / 3.0) as f32,
            hue_to_rgb(p, q, h) as f32,
            hue_to_rgb(p, q, h - 1.0 / 3.0) as f32,
            a,
        )
    }

    pub fn is_achromatic(self) -> bool {
        (self.r - self.g).abs() < 1e-6 && (self.g - self.b).abs() < 1e-6
    }

    pub fn lerp(self, other: Rgba, t: f32) -> Rgba {
        let t = t.clamp(0.0, 1.0);
        Rgba::new(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
            self.a + (other.a - self.a) * t,
        )
    }
}

impl From<Rgb8> for Rgba {
    fn from(c: Rgb8) -> Self {
        Rgba::rgba8(c.r, c.g, c.b, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_hex_long_and_short() {
        assert_eq!(Rgb8::parse_hex("#ff8000").unwrap(), Rgb8::new(255, 128, 0));
        assert_eq!(Rgb8::parse_hex("FFF").unwrap(), Rgb8::WHITE);
        assert!(Rgb8::parse_hex("#12345").is_err());
        assert!(Rgb8::parse_hex("#gg0000").is_err());
    }

    #[test]
    fn rgb8_serde_uses_hex_strings() {
        let c: Rgb8 = serde_json::from_value(json!("#1a1a1a")).unwrap();
        assert_eq!(c, Rgb8::new(0x1a, 0x1a, 0x1a));
        assert_eq!(serde_json::to_value(c).unwrap(), json!("#1a1a1a"));

        let c: Rgb8 = serde_json::from_value(json!([1, 2, 3])).unwrap();
        assert_eq!(c, Rgb8::new(1, 2, 3));
    }

    #[test]
    fn hsla_primaries_and_grays() {
        let red = Rgba::hsla(0.0, 100.0, 50.0, 1.0);
        assert!((red.r - 1.0).abs() < 1e-6);
        assert!(red.g.abs() < 1e-6);
        assert!(red.b.abs() < 1e-6);

        let gray = Rgba::hsla(210.0, 0.0, 70.0, 0.5);
        assert!(gray.is_achromatic());
        assert!((gray.r - 0.7).abs() < 1e-6);
        assert_eq!(gray.a, 0.5);
    }

    #[test]
    fn canvas_rejects_zero_dimensions() {
        assert!(Canvas::new(0, 10).is_err());
        assert_eq!(Canvas::new(9, 16).unwrap().pixel_count(), 144);
    }
}
