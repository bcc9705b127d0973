//! Embedded raster image element.

use super::{ElementId, ElementStyle, ElementTrait, GroupId, TextMeasure, point_is_finite};
use base64::{Engine, engine::general_purpose::STANDARD};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Image format for stored image data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageFormat {
    /// PNG format.
    Png,
    /// JPEG format.
    Jpeg,
    /// WebP format.
    WebP,
}

impl ImageFormat {
    /// Get MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::WebP => "image/webp",
        }
    }

    /// Detect format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 4 {
            return None;
        }

        // PNG: 89 50 4E 47
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Some(ImageFormat::Png);
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(ImageFormat::Jpeg);
        }

        // WebP: RIFF....WEBP
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Some(ImageFormat::WebP);
        }

        None
    }
}

/// Build a `data:<mime>;base64,<payload>` URI.
pub fn data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// Split a base64 data URI into its MIME type and decoded bytes.
pub fn decode_data_uri(uri: &str) -> Option<(String, Vec<u8>)> {
    let rest = uri.strip_prefix("data:")?;
    let (header, payload) = rest.split_once(',')?;
    let mime = header.strip_suffix(";base64")?;
    let bytes = STANDARD.decode(payload.trim()).ok()?;
    Some((mime.to_string(), bytes))
}

/// An image placed on the surface, shown at `width` x `height`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub(crate) id: ElementId,
    /// Top-left corner position.
    pub start: Point,
    /// Display width.
    pub width: f64,
    /// Display height.
    pub height: f64,
    /// Encoded pixels as a data URI, so snapshots are self-contained.
    pub data: String,
    /// Style properties (stroke used for the selection outline only).
    pub style: ElementStyle,
    /// Rigid group membership.
    #[serde(default)]
    pub group_id: Option<GroupId>,
}

impl Image {
    /// Create a new image element from an already encoded data URI.
    pub fn new(start: Point, width: f64, height: f64, data: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            start,
            width,
            height,
            data,
            style: ElementStyle::default(),
            group_id: None,
        }
    }

    /// Get the raw encoded bytes (decoded from the data URI).
    pub fn bytes(&self) -> Option<Vec<u8>> {
        decode_data_uri(&self.data).map(|(_, bytes)| bytes)
    }

    /// Get the bounding rectangle.
    pub fn as_rect(&self) -> Rect {
        Rect::new(
            self.start.x,
            self.start.y,
            self.start.x + self.width,
            self.start.y + self.height,
        )
    }
}

impl ElementTrait for Image {
    fn id(&self) -> ElementId {
        self.id
    }

    fn style(&self) -> &ElementStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ElementStyle {
        &mut self.style
    }

    fn group_id(&self) -> Option<GroupId> {
        self.group_id
    }

    fn set_group_id(&mut self, group_id: Option<GroupId>) {
        self.group_id = group_id;
    }

    fn translate(&mut self, delta: Vec2) {
        self.start += delta;
    }

    fn scale_y(&mut self, factor: f64) {
        self.start.y *= factor;
        self.height *= factor;
    }

    fn bounds(&self, _measure: &dyn TextMeasure) -> Rect {
        self.as_rect()
    }

    fn is_finite(&self) -> bool {
        point_is_finite(self.start) && self.width.is_finite() && self.height.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::ApproxTextMeasure;

    #[test]
    fn test_format_detection() {
        let png_data = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        assert_eq!(ImageFormat::from_magic_bytes(&png_data), Some(ImageFormat::Png));
        assert_eq!(
            ImageFormat::from_magic_bytes(&[0xFF, 0xD8, 0xFF, 0xE0]),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(ImageFormat::from_magic_bytes(b"GIF89a"), None);
        assert_eq!(ImageFormat::from_magic_bytes(&[0x89]), None);
    }

    #[test]
    fn test_data_uri() {
        let uri = data_uri("image/png", &[1, 2, 3]);
        assert!(uri.starts_with("data:image/png;base64,"));
        let (mime, bytes) = decode_data_uri(&uri).unwrap();
        assert_eq!(mime, "image/png");
        assert_eq!(bytes, vec![1, 2, 3]);

        assert!(decode_data_uri("https://example.com/a.png").is_none());
        assert!(decode_data_uri("data:image/png,plain").is_none());
    }

    #[test]
    fn test_bounds() {
        let img = Image::new(Point::new(10.0, 20.0), 100.0, 50.0, String::new());
        let bounds = img.bounds(&ApproxTextMeasure);
        assert!((bounds.x0 - 10.0).abs() < f64::EPSILON);
        assert!((bounds.y0 - 20.0).abs() < f64::EPSILON);
        assert!((bounds.x1 - 110.0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 70.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_scale_y_scales_height() {
        let mut img = Image::new(Point::new(5.0, 20.0), 40.0, 30.0, String::new());
        img.scale_y(2.0);
        assert_eq!(img.start, Point::new(5.0, 40.0));
        assert!((img.height - 60.0).abs() < f64::EPSILON);
        assert!((img.width - 40.0).abs() < f64::EPSILON);
    }
}
