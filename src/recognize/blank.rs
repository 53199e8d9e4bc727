use super::{Recognition, Recognizer};
use crate::error::Result;
use image::GrayImage;

/// Backend that recognizes nothing. Used for layout-only runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlankRecognizer;

impl Recognizer for BlankRecognizer {
    fn name(&self) -> &str {
        "blank"
    }

    fn recognize(&self, _image: &GrayImage) -> Result<Recognition> {
        Ok(Recognition::default())
    }
}
