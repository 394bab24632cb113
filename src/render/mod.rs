//! Rendering module for writing documents out.

mod json;
mod text;

pub use json::{from_json, from_json_bytes, to_json, write_json, JsonFormat};
pub use text::to_text;
