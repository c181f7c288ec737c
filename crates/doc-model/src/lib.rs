use serde::{Deserialize, Serialize};

/// Stable identifier for an annotation, persisted in the sidecar file.
pub type AnnotationId = uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocumentId(pub u64);

/// Intrinsic page size in document units, fixed for the document's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

impl PageSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn aspect_ratio(&self) -> f32 {
        if self.width <= 0.0 {
            return 0.0;
        }
        self.height / self.width
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self { width: 612.0, height: 792.0 }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ColorParseError {
    #[error("color must be 6 or 8 hex digits, got {0:?}")]
    BadLength(String),
    #[error("invalid hex digit in {0:?}")]
    BadDigit(String),
}

/// RGBA color, serialized as a `#RRGGBB` / `#RRGGBBAA` hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const HIGHLIGHT_YELLOW: Color = Color { r: 255, g: 224, b: 0, a: 128 };
    pub const NOTE_AMBER: Color = Color { r: 255, g: 179, b: 0, a: 255 };
    pub const BOOKMARK_RED: Color = Color { r: 229, g: 57, b: 53, a: 255 };

    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn from_hex(hex: &str) -> Result<Self, ColorParseError> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if !digits.is_ascii() {
            return Err(ColorParseError::BadDigit(hex.to_owned()));
        }

        let parse_pair = |pair: &str| {
            u8::from_str_radix(pair, 16).map_err(|_| ColorParseError::BadDigit(hex.to_owned()))
        };

        match digits.len() {
            6 => Ok(Self {
                r: parse_pair(&digits[0..2])?,
                g: parse_pair(&digits[2..4])?,
                b: parse_pair(&digits[4..6])?,
                a: 255,
            }),
            8 => Ok(Self {
                r: parse_pair(&digits[0..2])?,
                g: parse_pair(&digits[2..4])?,
                b: parse_pair(&digits[4..6])?,
                a: parse_pair(&digits[6..8])?,
            }),
            _ => Err(ColorParseError::BadLength(hex.to_owned())),
        }
    }

    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }
}

impl Serialize for Color {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Color::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}

/// Clamp a fractional coordinate into [0, 1].
pub fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

fn default_highlight_color() -> Color {
    Color::HIGHLIGHT_YELLOW
}

fn default_note_color() -> Color {
    Color::NOTE_AMBER
}

fn default_bookmark_color() -> Color {
    Color::BOOKMARK_RED
}

fn default_note_width() -> f32 {
    Note::DEFAULT_EDITOR_WIDTH
}

fn default_note_height() -> f32 {
    Note::DEFAULT_EDITOR_HEIGHT
}

/// A vertical band anchored between two (page, fraction) positions.
///
/// The model does not reject `end_page < start_page`; the store normalizes
/// ordering when a highlight is committed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Highlight {
    pub id: AnnotationId,
    pub start_page: u32,
    pub start_fraction: f32,
    pub end_page: u32,
    pub end_fraction: f32,
    #[serde(default = "default_highlight_color")]
    pub color: Color,
}

impl Highlight {
    pub fn new(start_page: u32, start_fraction: f32, end_page: u32, end_fraction: f32) -> Self {
        let mut highlight = Self {
            id: AnnotationId::new_v4(),
            start_page,
            start_fraction,
            end_page,
            end_fraction,
            color: Color::HIGHLIGHT_YELLOW,
        };
        highlight.clamp_fractions();
        highlight
    }

    pub fn clamp_fractions(&mut self) {
        self.start_fraction = clamp_unit(self.start_fraction);
        self.end_fraction = clamp_unit(self.end_fraction);
    }

    /// True when the (page, fraction) endpoints are in document order.
    pub fn is_ordered(&self) -> bool {
        self.start_page < self.end_page
            || (self.start_page == self.end_page && self.start_fraction <= self.end_fraction)
    }
}

/// A movable sticky note with an attached free-floating text editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: AnnotationId,
    pub page: u32,
    pub x_fraction: f32,
    pub y_fraction: f32,
    pub text: String,
    pub is_open: bool,
    #[serde(default = "default_note_width")]
    pub width: f32,
    #[serde(default = "default_note_height")]
    pub height: f32,
    #[serde(default = "default_note_color")]
    pub color: Color,
}

impl Note {
    pub const DEFAULT_EDITOR_WIDTH: f32 = 220.0;
    pub const DEFAULT_EDITOR_HEIGHT: f32 = 140.0;

    pub fn new(page: u32, x_fraction: f32, y_fraction: f32) -> Self {
        Self {
            id: AnnotationId::new_v4(),
            page,
            x_fraction: clamp_unit(x_fraction),
            y_fraction: clamp_unit(y_fraction),
            text: String::new(),
            is_open: false,
            width: Self::DEFAULT_EDITOR_WIDTH,
            height: Self::DEFAULT_EDITOR_HEIGHT,
            color: Color::NOTE_AMBER,
        }
    }

    pub fn clamp_fractions(&mut self) {
        self.x_fraction = clamp_unit(self.x_fraction);
        self.y_fraction = clamp_unit(self.y_fraction);
    }
}

/// A movable bookmark marker, anchored like a note but with no editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: AnnotationId,
    pub page: u32,
    pub x_fraction: f32,
    pub y_fraction: f32,
    pub name: String,
    #[serde(default = "default_bookmark_color")]
    pub color: Color,
}

impl Bookmark {
    pub fn new(page: u32, x_fraction: f32, y_fraction: f32, name: impl Into<String>) -> Self {
        Self {
            id: AnnotationId::new_v4(),
            page,
            x_fraction: clamp_unit(x_fraction),
            y_fraction: clamp_unit(y_fraction),
            name: name.into(),
            color: Color::BOOKMARK_RED,
        }
    }

    pub fn clamp_fractions(&mut self) {
        self.x_fraction = clamp_unit(self.x_fraction);
        self.y_fraction = clamp_unit(self.y_fraction);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_hex_round_trip() {
        let opaque = Color::rgb(255, 128, 3);
        assert_eq!(opaque.to_hex(), "#FF8003");
        assert_eq!(Color::from_hex("#FF8003").expect("parse expected"), opaque);

        let translucent = Color { r: 255, g: 224, b: 0, a: 128 };
        assert_eq!(translucent.to_hex(), "#FFE00080");
        assert_eq!(Color::from_hex("FFE00080").expect("parse expected"), translucent);
    }

    #[test]
    fn color_rejects_malformed_hex() {
        assert!(matches!(Color::from_hex("#FFF"), Err(ColorParseError::BadLength(_))));
        assert!(matches!(Color::from_hex("#GGGGGG"), Err(ColorParseError::BadDigit(_))));
    }

    #[test]
    fn color_serializes_as_hex_string() {
        let json = serde_json::to_string(&Color::BOOKMARK_RED).expect("serialize expected");
        assert_eq!(json, "\"#E53935\"");

        let parsed: Color = serde_json::from_str("\"#E53935\"").expect("deserialize expected");
        assert_eq!(parsed, Color::BOOKMARK_RED);
    }

    #[test]
    fn clamp_unit_handles_out_of_range_and_nan() {
        assert_eq!(clamp_unit(-0.5), 0.0);
        assert_eq!(clamp_unit(1.5), 1.0);
        assert_eq!(clamp_unit(f32::NAN), 0.0);
        assert_eq!(clamp_unit(0.25), 0.25);
    }

    #[test]
    fn new_annotations_clamp_fractions() {
        let highlight = Highlight::new(0, -0.2, 0, 1.8);
        assert_eq!(highlight.start_fraction, 0.0);
        assert_eq!(highlight.end_fraction, 1.0);

        let note = Note::new(2, 1.4, -3.0);
        assert_eq!(note.x_fraction, 1.0);
        assert_eq!(note.y_fraction, 0.0);

        let bookmark = Bookmark::new(1, 0.5, 2.0, "chapter");
        assert_eq!(bookmark.y_fraction, 1.0);
    }

    #[test]
    fn highlight_ordering_predicate() {
        let ordered = Highlight::new(1, 0.2, 1, 0.4);
        assert!(ordered.is_ordered());

        let inverted = Highlight::new(3, 0.1, 1, 0.9);
        assert!(!inverted.is_ordered());

        let same_page_inverted = Highlight::new(1, 0.9, 1, 0.1);
        assert!(!same_page_inverted.is_ordered());
    }

    #[test]
    fn note_deserializes_with_defaulted_size_and_color() {
        let json = format!(
            "{{\"id\":\"{}\",\"page\":0,\"x_fraction\":0.5,\"y_fraction\":0.5,\
             \"text\":\"todo\",\"is_open\":false}}",
            uuid::Uuid::new_v4()
        );
        let note: Note = serde_json::from_str(&json).expect("deserialize expected");
        assert_eq!(note.width, Note::DEFAULT_EDITOR_WIDTH);
        assert_eq!(note.height, Note::DEFAULT_EDITOR_HEIGHT);
        assert_eq!(note.color, Color::NOTE_AMBER);
    }

    #[test]
    fn page_size_aspect_ratio() {
        let page = PageSize::new(600.0, 800.0);
        assert!((page.aspect_ratio() - 4.0 / 3.0).abs() < 1e-6);
        assert_eq!(PageSize::new(0.0, 800.0).aspect_ratio(), 0.0);
    }
}
