use crate::foundation::error::{ScrawlError, ScrawlResult};

pub use kurbo::{Affine, BezPath, Point, Rect, Vec2};

/// Symbolic position keywords accepted wherever a [`Length`] is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Keyword {
    /// Leading horizontal edge.
    Left,
    /// Trailing horizontal edge.
    Right,
    /// Leading vertical edge.
    Top,
    /// Trailing vertical edge.
    Bottom,
    /// Midpoint on either axis.
    Center,
}

impl Keyword {
    /// Parse a keyword, returning `None` for anything else.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            "top" => Some(Self::Top),
            "bottom" => Some(Self::Bottom),
            "center" => Some(Self::Center),
            _ => None,
        }
    }

    /// Keyword spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Center => "center",
        }
    }

    /// Fraction of the reference dimension this keyword denotes.
    pub fn fraction(self) -> f64 {
        match self {
            Self::Left | Self::Top => 0.0,
            Self::Center => 0.5,
            Self::Right | Self::Bottom => 1.0,
        }
    }
}

/// A coordinate or size that is absolute, relative to a reference dimension, or symbolic.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Length {
    /// Absolute pixels.
    Pixels(f64),
    /// Percentage of the reference dimension.
    Percent(f64),
    /// Edge or center keyword.
    Keyword(Keyword),
}

impl Default for Length {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<f64> for Length {
    fn from(v: f64) -> Self {
        Self::Pixels(v)
    }
}

impl Length {
    /// Zero pixels.
    pub const ZERO: Self = Self::Pixels(0.0);

    /// Parse a string form. Keywords map to [`Length::Keyword`], anything with a leading
    /// number (`"50%"`, `"12.5"`) is a percentage, and everything else is zero pixels.
    pub fn parse(s: &str) -> Self {
        if let Some(k) = Keyword::parse(s) {
            return Self::Keyword(k);
        }
        match parse_float_prefix(s) {
            Some(v) => Self::Percent(v),
            None => Self::ZERO,
        }
    }

    /// Resolve against a reference dimension. Non-finite results coerce to 0.
    pub fn resolve(self, dimension: f64) -> f64 {
        let v = match self {
            Self::Pixels(v) => v,
            Self::Percent(p) => p / 100.0 * dimension,
            Self::Keyword(k) => k.fraction() * dimension,
        };
        if v.is_finite() { v } else { 0.0 }
    }

    /// `true` for percentages and keywords.
    pub fn is_relative(self) -> bool {
        !matches!(self, Self::Pixels(_))
    }

    /// `true` for keywords only.
    pub fn is_keyword(self) -> bool {
        matches!(self, Self::Keyword(_))
    }

    /// Pixel value, if absolute.
    pub fn as_pixels(self) -> Option<f64> {
        match self {
            Self::Pixels(v) => Some(v),
            _ => None,
        }
    }

    /// The number a percent-string parse would yield: keywords count as 0, 50 or 100.
    fn numeric_part(self) -> f64 {
        match self {
            Self::Pixels(v) | Self::Percent(v) => v,
            Self::Keyword(k) => k.fraction() * 100.0,
        }
    }

    /// Additive update. Two absolute values sum; if either side is relative the numeric
    /// parts sum into a percentage.
    pub fn add_delta(self, delta: Length) -> Length {
        match (self, delta) {
            (Self::Pixels(a), Self::Pixels(b)) => Self::Pixels(a + b),
            (a, b) => Self::Percent(a.numeric_part() + b.numeric_part()),
        }
    }

    /// JSON form: numbers for pixels, strings otherwise.
    pub fn to_value(self) -> serde_json::Value {
        match self {
            Self::Pixels(v) => serde_json::json!(v),
            Self::Percent(p) => serde_json::Value::String(format!("{p}%")),
            Self::Keyword(k) => serde_json::Value::String(k.as_str().to_owned()),
        }
    }

    /// Read the JSON form. Returns `None` for non-number, non-string values.
    pub fn from_value(v: &serde_json::Value) -> Option<Self> {
        match v {
            serde_json::Value::Number(n) => n.as_f64().map(Self::Pixels),
            serde_json::Value::String(s) => Some(Self::parse(s)),
            _ => None,
        }
    }
}

impl serde::Serialize for Length {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> serde::Deserialize<'de> for Length {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let v = serde_json::Value::deserialize(deserializer)?;
        Self::from_value(&v)
            .ok_or_else(|| serde::de::Error::custom("length must be a number or a string"))
    }
}

/// Convert a percentage or keyword string into pixels against `dimension`.
///
/// `"50%"` of 200 is 100, `"right"`/`"bottom"` give the full dimension, `"center"` half of it,
/// and any other non-numeric string gives 0.
pub fn number_convert(value: &str, dimension: f64) -> f64 {
    Length::parse(value).resolve(dimension)
}

/// Leading-number parse in the manner of a lenient float reader: `"12.5%"` is 12.5,
/// `"abc"` is `None`.
pub fn parse_float_prefix(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0usize;
    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut has_digits = end > digits_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut e = frac_start;
        while e < bytes.len() && bytes[e].is_ascii_digit() {
            e += 1;
        }
        if e > frac_start || has_digits {
            has_digits = has_digits || e > frac_start;
            end = e;
        }
    }
    if !has_digits {
        return None;
    }
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut e = end + 1;
        if e < bytes.len() && (bytes[e] == b'+' || bytes[e] == b'-') {
            e += 1;
        }
        let exp_start = e;
        while e < bytes.len() && bytes[e].is_ascii_digit() {
            e += 1;
        }
        if e > exp_start {
            end = e;
        }
    }
    s[..end].parse::<f64>().ok()
}

/// A symbolic 2D coordinate pair (`start`, `handle`, `copy`).
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Coord {
    /// Horizontal component.
    pub x: Length,
    /// Vertical component.
    pub y: Length,
}

impl Coord {
    /// Build from two lengths.
    pub fn new(x: Length, y: Length) -> Self {
        Self { x, y }
    }

    /// Absolute pixel coordinate.
    pub fn px(x: f64, y: f64) -> Self {
        Self {
            x: Length::Pixels(x),
            y: Length::Pixels(y),
        }
    }

    /// JSON object form `{x, y}`.
    pub fn to_value(self) -> serde_json::Value {
        serde_json::json!({ "x": self.x.to_value(), "y": self.y.to_value() })
    }
}

/// Absolute-pixel cache guarded by a validity flag.
///
/// A stale cache never hands out its value through [`CachedVector::get`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CachedVector {
    x: f64,
    y: f64,
    fresh: bool,
}

impl CachedVector {
    /// A stale cache at the origin.
    pub fn stale() -> Self {
        Self::default()
    }

    /// Whether the cached value reflects current inputs.
    pub fn is_fresh(&self) -> bool {
        self.fresh
    }

    /// The cached value, or `None` while stale.
    pub fn get(&self) -> Option<Vec2> {
        self.fresh.then_some(Vec2::new(self.x, self.y))
    }

    /// Store a recomputed value and mark the cache fresh.
    pub fn store(&mut self, v: Vec2) {
        self.x = v.x;
        self.y = v.y;
        self.fresh = true;
    }

    /// Mark stale.
    pub fn invalidate(&mut self) {
        self.fresh = false;
    }

    /// Last written value regardless of the flag.
    pub(crate) fn raw(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Overwrite the value without touching the flag.
    pub(crate) fn write_raw(&mut self, v: Vec2) {
        self.x = v.x;
        self.y = v.y;
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha.
    pub a: u8,
}

impl Rgba8Premul {
    /// Channels in memory order.
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Snapshot of a surface region, premultiplied RGBA8.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageData {
    /// Label, `<cell>_imageData` for cell captures.
    pub name: String,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major premultiplied RGBA8 bytes.
    pub data: Vec<u8>,
}

impl ImageData {
    /// Pixel at `(x, y)`, or `None` out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.data.get(idx..idx + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Convert to a straight-alpha [`image::RgbaImage`].
    pub fn to_rgba_image(&self) -> ScrawlResult<image::RgbaImage> {
        let mut straight = self.data.clone();
        for px in straight.chunks_exact_mut(4) {
            let a = u16::from(px[3]);
            if a == 0 || a == 255 {
                continue;
            }
            for c in &mut px[..3] {
                *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
            }
        }
        image::RgbaImage::from_raw(self.width, self.height, straight)
            .ok_or_else(|| ScrawlError::render("image data length does not match dimensions"))
    }

    /// Encode as PNG at `path`.
    pub fn save_png(&self, path: impl AsRef<std::path::Path>) -> ScrawlResult<()> {
        self.to_rgba_image()?
            .save_with_format(path, image::ImageFormat::Png)
            .map_err(|e| ScrawlError::Other(anyhow::Error::new(e)))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
