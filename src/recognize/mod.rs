//! Text recognition backends and the per-page dispatcher.
//!
//! Recognition is pluggable: a backend implements [`Recognizer`] and is
//! looked up by name in a [`RecognizerRegistry`]. The analyzer binds one
//! backend per run and hands every cell and paragraph crop to it through
//! the [`Dispatcher`].
//!
//! # Example
//!
//! ```no_run
//! use unscan::recognize::RecognizerRegistry;
//!
//! let registry = RecognizerRegistry::with_defaults();
//! let backend = registry.get("tesseract").unwrap();
//! println!("bound {}", backend.name());
//! ```

mod blank;
mod dispatcher;
mod normalize;
mod tesseract;

pub use blank::BlankRecognizer;
pub use dispatcher::{Dispatcher, RegionId};
pub use normalize::TextNormalizer;
pub use tesseract::TesseractRecognizer;

use crate::analysis::RecognitionConfig;
use crate::error::{Error, Result};
use crate::model::BBox;
use image::GrayImage;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// A box in the local frame of the crop handed to a recognizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl LocalBox {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Page-pixel box for a crop whose top-left corner sits at `(origin_x, origin_y)`.
    pub fn to_page(&self, origin_x: i32, origin_y: i32) -> BBox {
        BBox::from_xywh(self.x + origin_x, self.y + origin_y, self.width, self.height)
    }
}

/// Output of one recognition call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recognition {
    /// Recognized text, lines separated by `\n`
    pub text: String,

    /// Sub-element boxes (words or lines) in the crop's frame
    pub boxes: Vec<LocalBox>,
}

impl Recognition {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            boxes: Vec::new(),
        }
    }

    /// Add a sub-element box.
    pub fn with_box(mut self, b: LocalBox) -> Self {
        self.boxes.push(b);
        self
    }
}

/// An OCR backend.
///
/// Implementations are shared across worker threads and must be safe to
/// call concurrently.
pub trait Recognizer: Send + Sync {
    /// Registry name of this backend.
    fn name(&self) -> &str;

    /// Recognize the text in a grayscale crop.
    fn recognize(&self, image: &GrayImage) -> Result<Recognition>;
}

/// Registry of recognition backends keyed by name.
pub struct RecognizerRegistry {
    backends: HashMap<String, Arc<dyn Recognizer>>,
}

impl RecognizerRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            backends: HashMap::new(),
        }
    }

    /// Create a registry with the built-in backends (`tesseract`, `blank`).
    pub fn with_defaults() -> Self {
        Self::with_config(&RecognitionConfig::default())
    }

    /// Create a registry with the built-in backends, `tesseract` set up
    /// with the language and segmentation mode of `config`.
    pub fn with_config(config: &RecognitionConfig) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(TesseractRecognizer::from_config(config)));
        registry.register(Arc::new(BlankRecognizer));
        registry
    }

    /// Register a backend under its own name, replacing any previous one.
    pub fn register(&mut self, recognizer: Arc<dyn Recognizer>) {
        self.backends
            .insert(recognizer.name().to_lowercase(), recognizer);
    }

    /// Get a backend by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Recognizer>> {
        self.backends.get(&name.to_lowercase()).cloned()
    }

    /// Get a backend by name or fail with [`Error::BackendUnavailable`].
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn Recognizer>> {
        self.get(name)
            .ok_or_else(|| Error::BackendUnavailable(name.to_string()))
    }

    /// Names of all registered backends, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.backends.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}

impl Default for RecognizerRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
