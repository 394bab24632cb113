//! Block-level types.

use serde::{Deserialize, Serialize};

use super::Geometry;

/// Open-ended annotations attached to a block or document.
///
/// Keys are caller-owned except for the few reserved keys written by this
/// crate (see [`ORIENTATION_KEY`], [`NEXT_TABLE_KEY`], [`PREVIOUS_TABLE_KEY`]).
pub type Custom = serde_json::Map<String, serde_json::Value>;

/// Page annotation holding the estimated rotation in degrees.
pub const ORIENTATION_KEY: &str = "Orientation";

/// Table annotation naming the table that continues this one on a later page.
pub const NEXT_TABLE_KEY: &str = "NextTable";

/// Table annotation naming the table this one continues from an earlier page.
pub const PREVIOUS_TABLE_KEY: &str = "PreviousTable";

/// Kind of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlockType {
    Page,
    Line,
    Word,
    Table,
    Cell,
    MergedCell,
    KeyValueSet,
    SelectionElement,
    Title,
    Query,
    QueryResult,
    Signature,
    TableTitle,
    TableFooter,
    LayoutText,
    LayoutTitle,
    LayoutHeader,
    LayoutFooter,
    LayoutSectionHeader,
    LayoutPageNumber,
    LayoutList,
    LayoutFigure,
    LayoutTable,
    LayoutKeyValue,
    /// Any kind this crate does not know about
    #[serde(other)]
    Unknown,
}

/// Kind of a relationship edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationshipType {
    Child,
    Value,
    ComplexFeatures,
    MergedCell,
    Title,
    Answer,
    Table,
    TableTitle,
    TableFooter,
    #[serde(other)]
    Unknown,
}

/// A group of edges of one kind from a block to other blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Relationship {
    /// Edge kind
    #[serde(rename = "Type")]
    pub relationship_type: RelationshipType,

    /// Target block ids, in stored order
    #[serde(default)]
    pub ids: Vec<String>,
}

impl Relationship {
    /// Create a relationship group.
    pub fn new(relationship_type: RelationshipType, ids: Vec<String>) -> Self {
        Self {
            relationship_type,
            ids,
        }
    }

    /// Shorthand for a CHILD group.
    pub fn child(ids: Vec<String>) -> Self {
        Self::new(RelationshipType::Child, ids)
    }
}

/// A node of the document tree.
///
/// Blocks reference each other by id through [`Relationship`] groups; the
/// owning [`Document`](super::Document) resolves the ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Block {
    /// Block kind
    pub block_type: BlockType,

    /// Unique id within the document
    pub id: String,

    /// Spatial footprint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Geometry>,

    /// Outgoing edges grouped by kind
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relationships: Vec<Relationship>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_type: Option<String>,

    /// Row of a cell (1-indexed)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_index: Option<u32>,

    /// Column of a cell (1-indexed)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_index: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_span: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_span: Option<u32>,

    /// Entity markers such as `KEY`, `VALUE`, `COLUMN_HEADER`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entity_types: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection_status: Option<String>,

    /// Page number (1-indexed) reported upstream
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,

    /// Caller and derived annotations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<Custom>,
}

impl Block {
    /// Create a block with only a kind and an id.
    pub fn new(block_type: BlockType, id: impl Into<String>) -> Self {
        Self {
            block_type,
            id: id.into(),
            geometry: None,
            relationships: Vec::new(),
            confidence: None,
            text: None,
            text_type: None,
            row_index: None,
            column_index: None,
            row_span: None,
            column_span: None,
            entity_types: Vec::new(),
            selection_status: None,
            page: None,
            custom: None,
        }
    }

    /// Set geometry and return self.
    pub fn with_geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = Some(geometry);
        self
    }

    /// Set text and return self.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Append a CHILD edge group and return self.
    pub fn with_children<S: Into<String>>(self, ids: impl IntoIterator<Item = S>) -> Self {
        self.with_relationship(RelationshipType::Child, ids)
    }

    /// Append an edge group of any kind and return self.
    pub fn with_relationship<S: Into<String>>(
        mut self,
        relationship_type: RelationshipType,
        ids: impl IntoIterator<Item = S>,
    ) -> Self {
        self.relationships.push(Relationship::new(
            relationship_type,
            ids.into_iter().map(Into::into).collect(),
        ));
        self
    }

    /// Set cell position and return self.
    pub fn with_cell_index(mut self, row: u32, column: u32) -> Self {
        self.row_index = Some(row);
        self.column_index = Some(column);
        self
    }

    /// Add an entity type and return self.
    pub fn with_entity_type(mut self, entity_type: impl Into<String>) -> Self {
        self.entity_types.push(entity_type.into());
        self
    }

    /// Set the upstream page number and return self.
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Ids of all edges of the given kind, in stored order.
    pub fn related_ids(&self, relationship_type: RelationshipType) -> impl Iterator<Item = &str> {
        self.relationships
            .iter()
            .filter(move |r| r.relationship_type == relationship_type)
            .flat_map(|r| r.ids.iter().map(String::as_str))
    }

    /// Ids of CHILD edges, in stored order.
    pub fn child_ids(&self) -> impl Iterator<Item = &str> {
        self.related_ids(RelationshipType::Child)
    }

    /// Ids of every edge regardless of kind, in stored order.
    pub fn all_related_ids(&self) -> impl Iterator<Item = &str> {
        self.relationships
            .iter()
            .flat_map(|r| r.ids.iter().map(String::as_str))
    }

    /// Bounding box of the block, if it has one with every field present.
    pub fn placed_box(&self) -> Option<&super::BoundingBox> {
        self.geometry
            .as_ref()
            .map(|g| &g.bounding_box)
            .filter(|b| b.is_complete())
    }

    /// Read a custom annotation.
    pub fn custom_value(&self, key: &str) -> Option<&serde_json::Value> {
        self.custom.as_ref()?.get(key)
    }

    /// Write a custom annotation, creating the map when needed.
    pub fn set_custom(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.custom
            .get_or_insert_with(Custom::new)
            .insert(key.into(), value);
    }

    /// Remove a custom annotation, dropping the map when it becomes empty.
    pub fn remove_custom(&mut self, key: &str) -> Option<serde_json::Value> {
        let custom = self.custom.as_mut()?;
        let removed = custom.remove(key);
        if custom.is_empty() {
            self.custom = None;
        }
        removed
    }

    /// Check if this block is a page.
    pub fn is_page(&self) -> bool {
        self.block_type == BlockType::Page
    }

    /// Check if this block is a table.
    pub fn is_table(&self) -> bool {
        self.block_type == BlockType::Table
    }

    /// Check if this block is a table cell (merged cells excluded).
    pub fn is_cell(&self) -> bool {
        self.block_type == BlockType::Cell
    }

    /// Check if this block is the key of a key/value pair.
    pub fn is_key(&self) -> bool {
        self.block_type == BlockType::KeyValueSet && self.entity_types.iter().any(|e| e == "KEY")
    }

    /// Check if this block is the value of a key/value pair.
    pub fn is_value(&self) -> bool {
        self.block_type == BlockType::KeyValueSet && self.entity_types.iter().any(|e| e == "VALUE")
    }
}
