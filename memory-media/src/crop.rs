use crate::models::MediaFile;
use image::{codecs::jpeg::JpegEncoder, imageops::FilterType, DynamicImage, GenericImageView};

/// Edge length of every cropped tile image
pub const CROP_OUTPUT_SIZE: u32 = 800;
const JPEG_QUALITY: u8 = 90;

/// Error type for the crop step
#[derive(Debug)]
pub enum CropError {
    Decode(String),
    Encode(String),
    InvalidRegion(String),
}

impl std::fmt::Display for CropError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CropError::Decode(msg) => write!(f, "Image decode error: {}", msg),
            CropError::Encode(msg) => write!(f, "Image encode error: {}", msg),
            CropError::InvalidRegion(msg) => write!(f, "Invalid crop region: {}", msg),
        }
    }
}

impl std::error::Error for CropError {}

/// Square region in source pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CropRegion {
    x: u32,
    y: u32,
    size: u32,
}

impl CropRegion {
    /// Square shrunk by `zoom` (>= 1.0) and shifted by offsets in -1.0..=1.0,
    /// where ±1.0 pushes the square against the matching edge.
    fn zoomed(width: u32, height: u32, zoom: f32, offset_x: f32, offset_y: f32) -> Self {
        let zoom = if zoom.is_finite() { zoom.max(1.0) } else { 1.0 };
        let side = width.min(height);
        let size = ((side as f32 / zoom).round() as u32).clamp(1, side.max(1));

        let slack_x = width.saturating_sub(size) as f32;
        let slack_y = height.saturating_sub(size) as f32;
        let x = (slack_x / 2.0 * (1.0 + offset_x.clamp(-1.0, 1.0))).round() as u32;
        let y = (slack_y / 2.0 * (1.0 + offset_y.clamp(-1.0, 1.0))).round() as u32;

        Self {
            x: x.min(width.saturating_sub(size)),
            y: y.min(height.saturating_sub(size)),
            size,
        }
    }

    fn fits(&self, width: u32, height: u32) -> bool {
        self.size > 0
            && self.x.saturating_add(self.size) <= width
            && self.y.saturating_add(self.size) <= height
    }
}

/// Decodes `file`, crops the square picked by the cropper's zoom and pan
/// controls, scales it to 800×800 and re-encodes
/// it as JPEG. The original file name is kept. Zoom 1.0 without offsets is
/// the default centred crop.
pub fn crop_zoomed(
    file: &MediaFile,
    zoom: f32,
    offset_x: f32,
    offset_y: f32,
) -> Result<MediaFile, CropError> {
    let img = decode(file)?;
    let (width, height) = img.dimensions();
    let region = CropRegion::zoomed(width, height, zoom, offset_x, offset_y);
    crop_decoded(file, &img, region)
}

fn decode(file: &MediaFile) -> Result<DynamicImage, CropError> {
    image::load_from_memory(&file.bytes)
        .map_err(|e| CropError::Decode(format!("Failed to load image: {}", e)))
}

fn crop_decoded(
    file: &MediaFile,
    img: &DynamicImage,
    region: CropRegion,
) -> Result<MediaFile, CropError> {
    let (width, height) = img.dimensions();
    if !region.fits(width, height) {
        return Err(CropError::InvalidRegion(format!(
            "{:?} outside {}x{}",
            region, width, height
        )));
    }

    log::debug!(
        "Cropping {} ({}x{}) at {:?}",
        file.name,
        width,
        height,
        region
    );

    let cropped = img
        .crop_imm(region.x, region.y, region.size, region.size)
        .resize_exact(CROP_OUTPUT_SIZE, CROP_OUTPUT_SIZE, FilterType::Lanczos3);

    let name = if file.name.trim().is_empty() {
        "memory.jpg".to_string()
    } else {
        file.name.clone()
    };

    Ok(MediaFile::new(name, "image/jpeg", encode_jpeg(&cropped)?))
}

pub(crate) fn encode_jpeg(img: &DynamicImage) -> Result<Vec<u8>, CropError> {
    let rgb = img.to_rgb8();
    let mut buffer = Vec::new();
    JpegEncoder::new_with_quality(&mut buffer, JPEG_QUALITY)
        .encode_image(&rgb)
        .map_err(|e| CropError::Encode(format!("Failed to write JPEG: {}", e)))?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn png_file(width: u32, height: u32) -> MediaFile {
        let img = RgbImage::from_pixel(width, height, Rgb([200, 40, 90]));
        let mut buffer = Cursor::new(Vec::new());
        img.write_to(&mut buffer, ImageFormat::Png).unwrap();
        MediaFile::new("holiday.png", "image/png", buffer.into_inner())
    }

    #[test]
    fn test_unzoomed_region_is_centered() {
        assert_eq!(
            CropRegion::zoomed(2000, 1000, 1.0, 0.0, 0.0),
            CropRegion { x: 500, y: 0, size: 1000 }
        );
        assert_eq!(
            CropRegion::zoomed(600, 900, 1.0, 0.0, 0.0),
            CropRegion { x: 0, y: 150, size: 600 }
        );
    }

    #[test]
    fn test_zoomed_region_stays_inside() {
        let region = CropRegion::zoomed(1000, 1000, 2.0, 1.0, -1.0);
        assert_eq!(region.size, 500);
        assert_eq!(region.x, 500);
        assert_eq!(region.y, 0);

        // Zoom below 1.0 is treated as no zoom
        assert_eq!(CropRegion::zoomed(400, 300, 0.2, 0.0, 0.0).size, 300);
    }

    #[test]
    fn test_default_crop_outputs_800_jpeg() {
        let cropped = crop_zoomed(&png_file(1200, 900), 1.0, 0.0, 0.0).unwrap();
        assert_eq!(cropped.mime, "image/jpeg");
        assert_eq!(cropped.name, "holiday.png");

        let decoded = image::load_from_memory(&cropped.bytes).unwrap();
        assert_eq!(decoded.dimensions(), (CROP_OUTPUT_SIZE, CROP_OUTPUT_SIZE));
    }

    #[test]
    fn test_crop_zoomed_keeps_output_size() {
        let cropped = crop_zoomed(&png_file(640, 480), 3.0, -1.0, 1.0).unwrap();
        let decoded = image::load_from_memory(&cropped.bytes).unwrap();
        assert_eq!(decoded.dimensions(), (CROP_OUTPUT_SIZE, CROP_OUTPUT_SIZE));
    }

    #[test]
    fn test_crop_rejects_region_outside_image() {
        let region = CropRegion { x: 50, y: 0, size: 100 };
        let file = png_file(120, 100);
        let img = decode(&file).unwrap();
        let err = crop_decoded(&file, &img, region).unwrap_err();
        assert!(matches!(err, CropError::InvalidRegion(_)));
    }

    #[test]
    fn test_crop_rejects_non_image() {
        let file = MediaFile::new("notes.txt", "text/plain", b"hello".to_vec());
        assert!(matches!(
            crop_zoomed(&file, 1.0, 0.0, 0.0),
            Err(CropError::Decode(_))
        ));
    }
}
