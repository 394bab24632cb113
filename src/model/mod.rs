//! Document model types for analyzed-document block trees.
//!
//! A [`Document`] is a flat arena of [`Block`]s. Blocks point at each other by
//! id through [`Relationship`] groups rather than by nesting, so a block can be
//! listed under several parents (a word under its line and under a table
//! cell) without being duplicated.

mod block;
mod document;
mod geometry;

pub use block::{
    Block, BlockType, Custom, Relationship, RelationshipType, NEXT_TABLE_KEY, ORIENTATION_KEY,
    PREVIOUS_TABLE_KEY,
};
pub use document::{BlockIndex, Document, DocumentMetadata};
pub use geometry::{normalize_degrees, BoundingBox, Geometry, Point, Polygon, Rotation};
