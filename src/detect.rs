//! Page raster format detection and decoding.

use crate::error::{Error, Result};
use image::{DynamicImage, ImageFormat};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Supported page raster formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterFormat {
    Png,
    Jpeg,
    Tiff,
    Bmp,
}

impl RasterFormat {
    /// Conventional file extension.
    pub fn extension(&self) -> &'static str {
        match self {
            RasterFormat::Png => "png",
            RasterFormat::Jpeg => "jpg",
            RasterFormat::Tiff => "tiff",
            RasterFormat::Bmp => "bmp",
        }
    }

    fn image_format(&self) -> ImageFormat {
        match self {
            RasterFormat::Png => ImageFormat::Png,
            RasterFormat::Jpeg => ImageFormat::Jpeg,
            RasterFormat::Tiff => ImageFormat::Tiff,
            RasterFormat::Bmp => ImageFormat::Bmp,
        }
    }

    fn from_image_format(format: ImageFormat) -> Option<Self> {
        match format {
            ImageFormat::Png => Some(RasterFormat::Png),
            ImageFormat::Jpeg => Some(RasterFormat::Jpeg),
            ImageFormat::Tiff => Some(RasterFormat::Tiff),
            ImageFormat::Bmp => Some(RasterFormat::Bmp),
            _ => None,
        }
    }
}

impl std::fmt::Display for RasterFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RasterFormat::Png => "PNG",
            RasterFormat::Jpeg => "JPEG",
            RasterFormat::Tiff => "TIFF",
            RasterFormat::Bmp => "BMP",
        };
        f.write_str(name)
    }
}

/// Bytes of header read when sniffing a file.
const HEADER_LEN: u64 = 16;

/// Detect the raster format of a file from its header.
///
/// # Example
/// ```no_run
/// use unscan::detect::detect_format_from_path;
///
/// let format = detect_format_from_path("scan-001.png").unwrap();
/// println!("{}", format);
/// ```
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<RasterFormat> {
    let mut header = Vec::with_capacity(HEADER_LEN as usize);
    File::open(path)?.take(HEADER_LEN).read_to_end(&mut header)?;
    detect_format_from_bytes(&header)
}

/// Detect the raster format from the leading bytes of an image.
///
/// # Returns
/// * `Ok(RasterFormat)` for PNG, JPEG, TIFF and BMP data
/// * `Err(Error::UnknownFormat)` otherwise
pub fn detect_format_from_bytes(data: &[u8]) -> Result<RasterFormat> {
    image::guess_format(data)
        .ok()
        .and_then(RasterFormat::from_image_format)
        .ok_or(Error::UnknownFormat)
}

/// Check if a file is a supported page raster.
pub fn is_supported<P: AsRef<Path>>(path: P) -> bool {
    detect_format_from_path(path).is_ok()
}

/// Check if bytes start like a supported page raster.
pub fn is_supported_bytes(data: &[u8]) -> bool {
    detect_format_from_bytes(data).is_ok()
}

/// Decode a page raster held in memory.
pub fn decode_bytes(data: &[u8]) -> Result<DynamicImage> {
    let format = detect_format_from_bytes(data)?;
    Ok(image::load_from_memory_with_format(
        data,
        format.image_format(),
    )?)
}

/// Read and decode a page raster file.
pub fn decode_file<P: AsRef<Path>>(path: P) -> Result<DynamicImage> {
    let data = std::fs::read(path)?;
    decode_bytes(&data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};
    use std::io::Cursor;

    fn png_bytes() -> Vec<u8> {
        let img = GrayImage::from_pixel(5, 4, Luma([200]));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn test_detect_png() {
        assert_eq!(
            detect_format_from_bytes(&png_bytes()).unwrap(),
            RasterFormat::Png
        );
    }

    #[test]
    fn test_detect_jpeg_and_bmp_magic() {
        assert_eq!(
            detect_format_from_bytes(&[0xFF, 0xD8, 0xFF, 0xE0, 0, 0x10]).unwrap(),
            RasterFormat::Jpeg
        );
        assert_eq!(
            detect_format_from_bytes(b"BM\0\0\0\0\0\0").unwrap(),
            RasterFormat::Bmp
        );
    }

    #[test]
    fn test_detect_invalid_format() {
        let result = detect_format_from_bytes(b"%PDF-1.7\n");
        assert!(matches!(result, Err(Error::UnknownFormat)));
        assert!(!is_supported_bytes(b""));
    }

    #[test]
    fn test_decode_bytes() {
        let img = decode_bytes(&png_bytes()).unwrap();
        assert_eq!((img.width(), img.height()), (5, 4));
    }

    #[test]
    fn test_decode_truncated_png() {
        let bytes = png_bytes();
        assert!(decode_bytes(&bytes[..20]).is_err());
    }

    #[test]
    fn test_detect_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.png");
        std::fs::write(&path, png_bytes()).unwrap();

        assert!(is_supported(&path));
        assert_eq!(detect_format_from_path(&path).unwrap().extension(), "png");
        assert!(!is_supported(dir.path().join("missing.png")));
    }
}
