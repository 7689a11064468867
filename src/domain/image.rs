//! Images submitted inline in JSON bodies as base64 or `data:` URIs.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

use crate::errors::{AppError, AppResult};

/// Image formats accepted for upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Webp,
}

impl ImageFormat {
    /// Detect the format from magic bytes.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, ..] => Some(ImageFormat::Png),
            [0xFF, 0xD8, 0xFF, ..] => Some(ImageFormat::Jpeg),
            [b'G', b'I', b'F', b'8', b'7' | b'9', b'a', ..] => Some(ImageFormat::Gif),
            [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => {
                Some(ImageFormat::Webp)
            }
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Gif => "gif",
            ImageFormat::Webp => "webp",
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Gif => "image/gif",
            ImageFormat::Webp => "image/webp",
        }
    }
}

/// Image as it arrived: multipart bytes or an inline string
#[derive(Debug, Clone)]
pub enum ImageSource {
    Bytes(Vec<u8>),
    Inline(String),
}

/// Decoded image bytes with their detected format
#[derive(Debug, Clone)]
pub struct InlineImage {
    pub format: ImageFormat,
    pub bytes: Vec<u8>,
}

impl InlineImage {
    /// Decode a `data:image/...;base64,` URI or a bare base64 string.
    ///
    /// The declared MIME type of a data URI is ignored; the bytes decide.
    pub fn decode(input: &str, max_bytes: usize) -> AppResult<Self> {
        let payload = match input.strip_prefix("data:") {
            Some(rest) => rest
                .split_once(";base64,")
                .map(|(_, data)| data)
                .ok_or_else(|| AppError::validation("Image data URI must be base64 encoded"))?,
            None => input,
        };

        let cleaned: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
        // Reject before decoding so oversized input never gets allocated twice
        if cleaned.len() / 4 * 3 > max_bytes + 2 {
            return Err(AppError::validation(format!(
                "Image exceeds the {} byte limit",
                max_bytes
            )));
        }

        let bytes = BASE64
            .decode(cleaned.as_bytes())
            .map_err(|_| AppError::validation("Image is not valid base64"))?;

        Self::from_bytes(bytes, max_bytes)
    }

    /// Wrap raw bytes (multipart uploads) after the same checks.
    pub fn from_bytes(bytes: Vec<u8>, max_bytes: usize) -> AppResult<Self> {
        if bytes.is_empty() {
            return Err(AppError::validation("Image is empty"));
        }
        if bytes.len() > max_bytes {
            return Err(AppError::validation(format!(
                "Image exceeds the {} byte limit",
                max_bytes
            )));
        }
        let format = ImageFormat::sniff(&bytes)
            .ok_or_else(|| AppError::validation("Image must be PNG, JPEG, GIF or WEBP"))?;

        Ok(Self { format, bytes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 13];
    const WEBP: &[u8] = b"RIFF\x10\x00\x00\x00WEBPVP8 ";

    #[test]
    fn test_decode_data_uri() {
        let uri = format!("data:image/png;base64,{}", BASE64.encode(PNG));
        let image = InlineImage::decode(&uri, 1024).unwrap();
        assert_eq!(image.format, ImageFormat::Png);
        assert_eq!(image.bytes, PNG);
    }

    #[test]
    fn test_decode_bare_base64() {
        let image = InlineImage::decode(&BASE64.encode(WEBP), 1024).unwrap();
        assert_eq!(image.format, ImageFormat::Webp);
        assert_eq!(image.format.extension(), "webp");
    }

    #[test]
    fn test_sniff_jpeg_and_gif() {
        assert_eq!(ImageFormat::sniff(&[0xFF, 0xD8, 0xFF, 0xE0]), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::sniff(b"GIF89a...."), Some(ImageFormat::Gif));
    }

    #[test]
    fn test_rejects_unknown_bytes() {
        let encoded = BASE64.encode(b"plain text, not an image");
        assert!(matches!(
            InlineImage::decode(&encoded, 1024),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_rejects_invalid_base64() {
        assert!(InlineImage::decode("data:image/png;base64,@@@", 1024).is_err());
        assert!(InlineImage::decode("data:image/png,rawdata", 1024).is_err());
    }

    #[test]
    fn test_rejects_oversize() {
        let mut big = PNG.to_vec();
        big.resize(2048, 0);
        assert!(InlineImage::decode(&BASE64.encode(&big), 1024).is_err());
        assert!(InlineImage::from_bytes(big, 1024).is_err());
    }
}
