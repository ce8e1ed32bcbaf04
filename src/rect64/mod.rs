// rect64 face rectangle codec
// Picasa stores face rectangles as 4 x 16-bit fixed-point fractions of the image
// file as stored on disk. digiKam stores pixel rectangles of the upright image.

use crate::constants::{RECT64_DIGITS, RECT64_PREFIX, RECT64_SUFFIX};
use crate::error::{MigrateError, Result};

/// Unit-interval face rectangle in the orientation-independent space of the file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceRectangle {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

/// Pixel rectangle in digiKam's (upright) image space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRectangle {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

/// Stored pixel size of an image plus its EXIF orientation code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageDimensions {
    pub width: i64,
    pub height: i64,
    pub orientation: i64,
}

impl PixelRectangle {
    /// The value digiKam keeps in ImageTagProperties for the tagRegion property.
    pub fn to_region_value(&self) -> String {
        format!(
            "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\"/>",
            self.x, self.y, self.width, self.height
        )
    }
}

/// Parse a `rect64(...)` literal into (left, top, right, bottom).
/// Picasa drops leading zeros, so 1 to 16 hex digits are accepted.
pub fn parse_rect64(literal: &str) -> Result<FaceRectangle> {
    let digits = literal
        .strip_prefix(RECT64_PREFIX)
        .and_then(|rest| rest.strip_suffix(RECT64_SUFFIX))
        .ok_or_else(|| MigrateError::MalformedRectangle(literal.to_string()))?;

    if digits.is_empty()
        || digits.len() > RECT64_DIGITS
        || !digits.chars().all(|c| c.is_ascii_hexdigit())
    {
        return Err(MigrateError::MalformedRectangle(literal.to_string()));
    }

    let padded = format!("{:0>width$}", digits, width = RECT64_DIGITS);
    let mut coords = [0f64; 4];
    for (i, coord) in coords.iter_mut().enumerate() {
        *coord = parse_hexfloat(&padded[i * 4..i * 4 + 4])?;
    }

    Ok(FaceRectangle {
        left: coords[0],
        top: coords[1],
        right: coords[2],
        bottom: coords[3],
    })
}

/// Decode a 4-digit hex group as a 16-bit fraction of 65536.
pub fn parse_hexfloat(group: &str) -> Result<f64> {
    let value = u16::from_str_radix(group, 16)
        .map_err(|_| MigrateError::MalformedRectangle(group.to_string()))?;
    Ok(f64::from(value) / 65536.0)
}

/// Project a face rectangle onto the upright image in pixels.
/// Orientation codes follow EXIF (see digiKam's MetaEngine::ImageOrientation).
pub fn to_pixel_rect(dims: ImageDimensions, rect: FaceRectangle) -> Result<PixelRectangle> {
    let FaceRectangle { left, top, right, bottom } = rect;
    let (mut width, mut height) = (dims.width as f64, dims.height as f64);

    let (x1, x2, y1, y2) = match dims.orientation {
        0 | 1 => (left, right, top, bottom),
        3 => (1.0 - right, 1.0 - left, 1.0 - bottom, 1.0 - top),
        6 => {
            std::mem::swap(&mut width, &mut height);
            (1.0 - bottom, 1.0 - top, left, right)
        }
        8 => {
            std::mem::swap(&mut width, &mut height);
            (top, bottom, 1.0 - right, 1.0 - left)
        }
        other => return Err(MigrateError::UnsupportedOrientation(other)),
    };

    Ok(PixelRectangle {
        x: (width * x1).floor() as i64,
        y: (height * y1).floor() as i64,
        width: (width * (x2 - x1)).floor() as i64,
        height: (height * (y2 - y1)).floor() as i64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims(width: i64, height: i64, orientation: i64) -> ImageDimensions {
        ImageDimensions { width, height, orientation }
    }

    fn assert_close(expected: f64, actual: f64) {
        assert!((expected - actual).abs() < 1e-9, "expected {}, got {}", expected, actual);
    }

    #[test]
    fn test_parse_hexfloat() {
        assert_close(0.24810791015625, parse_hexfloat("3f84").unwrap());
        assert_close(0.3585662841796875, parse_hexfloat("5bcb").unwrap());
        assert_close(0.3486480712890625, parse_hexfloat("5941").unwrap());
        assert_close(0.5196380615234375, parse_hexfloat("8507").unwrap());
    }

    #[test]
    fn test_parse_rect64() {
        let rect = parse_rect64("rect64(3f845bcb59418507)").unwrap();
        assert_close(0.24810791015625, rect.left);
        assert_close(0.3585662841796875, rect.top);
        assert_close(0.3486480712890625, rect.right);
        assert_close(0.5196380615234375, rect.bottom);
    }

    #[test]
    fn test_parse_rect64_pads_short_literal() {
        let rect = parse_rect64("rect64(4a8e8e6b)").unwrap();
        assert_eq!(0.0, rect.left);
        assert_eq!(0.0, rect.top);
        assert_close(0.291229248046875, rect.right);
        assert_close(0.5563201904296875, rect.bottom);
    }

    #[test]
    fn test_parse_rect64_values_in_unit_interval() {
        for literal in ["rect64(0)", "rect64(ffffffffffffffff)", "rect64(1)", "rect64(8000ffff00017fff)"] {
            let r = parse_rect64(literal).unwrap();
            for v in [r.left, r.top, r.right, r.bottom] {
                assert!((0.0..1.0).contains(&v), "{} out of range for {}", v, literal);
            }
        }
    }

    #[test]
    fn test_parse_rect64_rejects_malformed() {
        for literal in [
            "",
            "rect64()",
            "rect64(3f84",
            "3f845bcb59418507",
            "rect64(3f845bcb594185070)",
            "rect64(xyz)",
            "RECT64(3f84)",
            " rect64(3f84)",
        ] {
            assert!(
                matches!(parse_rect64(literal), Err(MigrateError::MalformedRectangle(_))),
                "{:?} should be rejected",
                literal
            );
        }
    }

    #[test]
    fn test_no_rotation() {
        // 3024x4032, orientation 0
        let rect = parse_rect64("rect64(166f5c0036db7924)").unwrap();
        assert_eq!(
            "<rect x=\"264\" y=\"1449\" width=\"382\" height=\"458\"/>",
            to_pixel_rect(dims(3024, 4032, 0), rect).unwrap().to_region_value()
        );
    }

    #[test]
    fn test_180_rotation() {
        let rect = parse_rect64("rect64(59c75b558ae3a9c6)").unwrap();
        assert_eq!(
            PixelRectangle { x: 2108, y: 1164, width: 883, height: 1058 },
            to_pixel_rect(dims(4608, 3456, 3), rect).unwrap()
        );
    }

    #[test]
    fn test_90_rotation() {
        let rect = parse_rect64("rect64(34009caa6232b668)").unwrap();
        assert_eq!(
            PixelRectangle { x: 1412, y: 663, width: 493, height: 588 },
            to_pixel_rect(dims(3264, 4912, 6), rect).unwrap()
        );
    }

    #[test]
    fn test_270_rotation() {
        let rect = parse_rect64("rect64(8d22b337991ec231)").unwrap();
        assert_eq!(
            PixelRectangle { x: 2284, y: 1974, width: 190, height: 229 },
            to_pixel_rect(dims(4912, 3264, 8), rect).unwrap()
        );
    }

    #[test]
    fn test_short_hex() {
        assert_eq!(
            "<rect x=\"0\" y=\"0\" width=\"670\" height=\"720\"/>",
            to_pixel_rect(dims(2304, 1296, 1), parse_rect64("rect64(4a8e8e6b)").unwrap())
                .unwrap()
                .to_region_value()
        );
    }

    #[test]
    fn test_rotation_swaps_dimensions() {
        // Quarter-size box in the middle-right of a 100x50 file, turned upright
        let rect = parse_rect64("rect64(4000400080008000)").unwrap();
        assert_eq!(
            PixelRectangle { x: 25, y: 25, width: 12, height: 25 },
            to_pixel_rect(dims(100, 50, 6), rect).unwrap()
        );
    }

    #[test]
    fn test_unsupported_orientation() {
        let rect = parse_rect64("rect64(166f5c0036db7924)").unwrap();
        for orientation in [2, 4, 5, 7, 9, -1] {
            assert!(matches!(
                to_pixel_rect(dims(100, 100, orientation), rect),
                Err(MigrateError::UnsupportedOrientation(o)) if o == orientation
            ));
        }
    }
}
