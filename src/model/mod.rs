//! Document model types for recovered page layout.
//!
//! This module defines the structures produced by page analysis: tables made
//! of grid cells, text paragraphs, pages and documents. Coordinates are
//! integer page pixels of the rendered raster.

mod bbox;
mod document;
mod page;
mod paragraph;
mod table;

pub use bbox::BBox;
pub use document::{Document, Metadata};
pub use page::Page;
pub use paragraph::{Paragraph, ParagraphType};
pub use table::{Cell, Table};
