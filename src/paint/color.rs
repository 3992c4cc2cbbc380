use crate::foundation::core::Rgba8Premul;

/// Straight-alpha color with normalized components.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Color {
    /// Red, 0..1.
    pub r: f64,
    /// Green, 0..1.
    pub g: f64,
    /// Blue, 0..1.
    pub b: f64,
    /// Alpha, 0..1.
    pub a: f64,
}

impl Color {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::rgba(0.0, 0.0, 0.0, 0.0);
    /// Opaque black.
    pub const BLACK: Self = Self::rgba(0.0, 0.0, 0.0, 1.0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgba(1.0, 1.0, 1.0, 1.0);

    /// Build from normalized components.
    pub const fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Build from 8-bit channels and a normalized alpha.
    pub fn from_rgb8(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self::rgba(
            f64::from(r) / 255.0,
            f64::from(g) / 255.0,
            f64::from(b) / 255.0,
            a,
        )
    }

    /// Parse a CSS color string.
    pub fn parse(s: &str) -> Option<Self> {
        parse_css_color(s)
    }

    /// Premultiplied 8-bit form.
    pub fn to_rgba8_premul(self) -> Rgba8Premul {
        fn to_u8(x: f64) -> u8 {
            (x.clamp(0.0, 1.0) * 255.0).round() as u8
        }

        let a = self.a.clamp(0.0, 1.0);
        let r = (self.r.clamp(0.0, 1.0) * a).clamp(0.0, 1.0);
        let g = (self.g.clamp(0.0, 1.0) * a).clamp(0.0, 1.0);
        let b = (self.b.clamp(0.0, 1.0) * a).clamp(0.0, 1.0);

        Rgba8Premul {
            r: to_u8(r),
            g: to_u8(g),
            b: to_u8(b),
            a: to_u8(a),
        }
    }

    /// Premultiplied components as `[r, g, b, a]` in 0..1.
    pub fn premul_f32(self) -> [f32; 4] {
        let a = self.a.clamp(0.0, 1.0);
        [
            (self.r.clamp(0.0, 1.0) * a) as f32,
            (self.g.clamp(0.0, 1.0) * a) as f32,
            (self.b.clamp(0.0, 1.0) * a) as f32,
            a as f32,
        ]
    }

    /// Whether the color paints nothing.
    pub fn is_transparent(self) -> bool {
        self.a <= 0.0
    }

    /// Serialized form as a canvas reports it: `#rrggbb` when opaque, `rgba(..)` otherwise.
    pub fn to_css(self) -> String {
        let c = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        let (r, g, b) = (c(self.r), c(self.g), c(self.b));
        if self.a >= 1.0 {
            format!("#{r:02x}{g:02x}{b:02x}")
        } else {
            format!("rgba({r}, {g}, {b}, {})", self.a.clamp(0.0, 1.0))
        }
    }
}

/// Parse `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`, `rgb[a](..)`, `hsl[a](..)` or a named color.
pub fn parse_css_color(s: &str) -> Option<Color> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex);
    }
    let lower = s.to_ascii_lowercase();
    if let Some(args) = functional_args(&lower, "rgba").or_else(|| functional_args(&lower, "rgb"))
    {
        return parse_rgb_args(&args);
    }
    if let Some(args) = functional_args(&lower, "hsla").or_else(|| functional_args(&lower, "hsl"))
    {
        return parse_hsl_args(&args);
    }
    named_color(&lower)
}

fn functional_args(s: &str, name: &str) -> Option<Vec<String>> {
    let body = s.strip_prefix(name)?.trim_start();
    let body = body.strip_prefix('(')?.strip_suffix(')')?;
    let parts: Vec<String> = body
        .split([',', '/', ' '])
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_owned)
        .collect();
    Some(parts)
}

fn channel(part: &str) -> Option<f64> {
    if let Some(p) = part.strip_suffix('%') {
        return p.parse::<f64>().ok().map(|v| (v / 100.0).clamp(0.0, 1.0));
    }
    part.parse::<f64>()
        .ok()
        .map(|v| (v / 255.0).clamp(0.0, 1.0))
}

fn alpha(part: Option<&String>) -> Option<f64> {
    let Some(part) = part else {
        return Some(1.0);
    };
    if let Some(p) = part.strip_suffix('%') {
        return p.parse::<f64>().ok().map(|v| (v / 100.0).clamp(0.0, 1.0));
    }
    part.parse::<f64>().ok().map(|v| v.clamp(0.0, 1.0))
}

fn parse_rgb_args(args: &[String]) -> Option<Color> {
    if args.len() != 3 && args.len() != 4 {
        return None;
    }
    Some(Color::rgba(
        channel(&args[0])?,
        channel(&args[1])?,
        channel(&args[2])?,
        alpha(args.get(3))?,
    ))
}

fn parse_hsl_args(args: &[String]) -> Option<Color> {
    if args.len() != 3 && args.len() != 4 {
        return None;
    }
    let h = args[0].trim_end_matches("deg").parse::<f64>().ok()?;
    let pct = |p: &str| -> Option<f64> {
        p.strip_suffix('%')
            .unwrap_or(p)
            .parse::<f64>()
            .ok()
            .map(|v| v / 100.0)
    };
    let s = pct(&args[1])?;
    let l = pct(&args[2])?;
    Some(hsla_to_rgba(h, s, l, alpha(args.get(3))?))
}

fn parse_hex(s: &str) -> Option<Color> {
    fn nibble(c: u8) -> Option<u8> {
        (c as char).to_digit(16).map(|d| d as u8)
    }

    let b = s.as_bytes();
    let (r, g, bl, a) = match b.len() {
        3 | 4 => {
            let r = nibble(b[0])? * 17;
            let g = nibble(b[1])? * 17;
            let bl = nibble(b[2])? * 17;
            let a = if b.len() == 4 { nibble(b[3])? * 17 } else { 255 };
            (r, g, bl, a)
        }
        6 | 8 => {
            let byte = |i: usize| -> Option<u8> { Some(nibble(b[i])? * 16 + nibble(b[i + 1])?) };
            let a = if b.len() == 8 { byte(6)? } else { 255 };
            (byte(0)?, byte(2)?, byte(4)?, a)
        }
        _ => return None,
    };
    Some(Color::from_rgb8(r, g, bl, f64::from(a) / 255.0))
}

fn hsla_to_rgba(h: f64, s: f64, l: f64, a: f64) -> Color {
    let h = (h % 360.0 + 360.0) % 360.0 / 360.0;
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);

    if s == 0.0 {
        return Color::rgba(l, l, l, a);
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

    let r = hue_to_rgb(p, q, h + 1.0 / 3.0);
    let g = hue_to_rgb(p, q, h);
    let b = hue_to_rgb(p, q, h - 1.0 / 3.0);
    Color::rgba(r, g, b, a)
}

fn named_color(name: &str) -> Option<Color> {
    let (r, g, b) = match name {
        "transparent" => return Some(Color::TRANSPARENT),
        "black" => (0, 0, 0),
        "white" => (255, 255, 255),
        "red" => (255, 0, 0),
        "lime" => (0, 255, 0),
        "green" => (0, 128, 0),
        "blue" => (0, 0, 255),
        "yellow" => (255, 255, 0),
        "cyan" | "aqua" => (0, 255, 255),
        "magenta" | "fuchsia" => (255, 0, 255),
        "gray" | "grey" => (128, 128, 128),
        "silver" => (192, 192, 192),
        "lightgray" | "lightgrey" => (211, 211, 211),
        "darkgray" | "darkgrey" => (169, 169, 169),
        "maroon" => (128, 0, 0),
        "olive" => (128, 128, 0),
        "navy" => (0, 0, 128),
        "purple" => (128, 0, 128),
        "teal" => (0, 128, 128),
        "orange" => (255, 165, 0),
        "pink" => (255, 192, 203),
        "brown" => (165, 42, 42),
        "gold" => (255, 215, 0),
        "indigo" => (75, 0, 130),
        "violet" => (238, 130, 238),
        "coral" => (255, 127, 80),
        "salmon" => (250, 128, 114),
        "crimson" => (220, 20, 60),
        "darkred" => (139, 0, 0),
        "darkgreen" => (0, 100, 0),
        "darkblue" => (0, 0, 139),
        "lightblue" => (173, 216, 230),
        "skyblue" => (135, 206, 235),
        "steelblue" => (70, 130, 180),
        "royalblue" => (65, 105, 225),
        "tomato" => (255, 99, 71),
        "khaki" => (240, 230, 140),
        "beige" => (245, 245, 220),
        "ivory" => (255, 255, 240),
        "tan" => (210, 180, 140),
        "chocolate" => (210, 105, 30),
        "turquoise" => (64, 224, 208),
        "plum" => (221, 160, 221),
        "orchid" => (218, 112, 214),
        "lavender" => (230, 230, 250),
        _ => return None,
    };
    Some(Color::from_rgb8(r, g, b, 1.0))
}

#[cfg(test)]
#[path = "../../tests/unit/paint/color.rs"]
mod tests;
