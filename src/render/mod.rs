//! Rendering module for converting analysed documents to output formats.

mod html;
mod json;
mod text;

pub use html::{table_to_html, tables_to_html};
pub use json::{tables_to_json, to_json, JsonFormat};
pub use text::to_text;
