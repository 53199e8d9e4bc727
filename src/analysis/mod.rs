//! Page layout analysis.
//!
//! The stages run in this order on each page raster:
//!
//! 1. [`line_mask`] extracts long horizontal and vertical strokes.
//! 2. [`region`] finds table regions in the combined stroke mask.
//! 3. [`grid`] rebuilds each table's cells, including merged cells.
//! 4. [`paragraph`] finds text blocks outside the tables.
//!
//! [`Analyzer`] drives the stages, then hands every region to the
//! recognition dispatcher and assembles pages into a [`Document`].
//!
//! [`Document`]: crate::model::Document

mod analyzer;
pub mod grid;
pub mod line_mask;
pub mod morphology;
mod options;
pub mod paragraph;
pub mod region;

pub use analyzer::Analyzer;
pub use line_mask::LineMasks;
pub use options::{
    AnalysisOptions, GridConfig, LineMaskConfig, PageSelection, ParagraphConfig,
    RecognitionConfig, RegionConfig,
};
