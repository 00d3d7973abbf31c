use crate::crop::{encode_jpeg, CropError};
use crate::models::MediaFile;
use image::{imageops::FilterType, DynamicImage, Rgb, RgbImage};

const CELL_SIZE: u32 = 200;
const COLUMNS: u32 = 4;

/// Error type for snapshot composition
#[derive(Debug)]
pub enum SnapshotError {
    NoImages,
    Image(String),
}

impl std::fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SnapshotError::NoImages => write!(f, "No images to compose"),
            SnapshotError::Image(msg) => write!(f, "Snapshot image error: {}", msg),
        }
    }
}

impl std::error::Error for SnapshotError {}

impl From<CropError> for SnapshotError {
    fn from(err: CropError) -> Self {
        SnapshotError::Image(err.to_string())
    }
}

/// Lays the tile images out in a four-column grid (slot order, left to right)
/// and returns it as a JPEG named `snapshot.jpg`.
pub fn compose_snapshot(images: &[MediaFile]) -> Result<MediaFile, SnapshotError> {
    if images.is_empty() {
        return Err(SnapshotError::NoImages);
    }

    let count = images.len() as u32;
    let columns = count.min(COLUMNS);
    let rows = count.div_ceil(COLUMNS);
    let mut canvas = RgbImage::from_pixel(columns * CELL_SIZE, rows * CELL_SIZE, Rgb([255, 255, 255]));

    for (index, file) in images.iter().enumerate() {
        let cell = image::load_from_memory(&file.bytes)
            .map_err(|e| SnapshotError::Image(format!("{}: {}", file.name, e)))?
            .resize_to_fill(CELL_SIZE, CELL_SIZE, FilterType::Triangle)
            .to_rgb8();

        let index = index as u32;
        let x = (index % COLUMNS) * CELL_SIZE;
        let y = (index / COLUMNS) * CELL_SIZE;
        image::imageops::replace(&mut canvas, &cell, x as i64, y as i64);
    }

    log::debug!(
        "Composed snapshot {}x{} from {} images",
        canvas.width(),
        canvas.height(),
        count
    );

    let bytes = encode_jpeg(&DynamicImage::ImageRgb8(canvas))?;
    Ok(MediaFile::new("snapshot.jpg", "image/jpeg", bytes))
}
