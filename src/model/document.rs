//! Document-level types.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{
    Block, BlockType, Custom, Geometry, RelationshipType, Rotation, NEXT_TABLE_KEY,
    PREVIOUS_TABLE_KEY,
};
use crate::error::{Error, Result};

/// An analyzed document: a flat arena of blocks linked by id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Document {
    /// Document-level metadata
    #[serde(default)]
    pub document_metadata: DocumentMetadata,

    /// Every block of every page
    #[serde(default)]
    pub blocks: Vec<Block>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_status: Option<String>,

    /// Pagination token of the upstream response
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warnings: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_text_detection_model_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analyze_document_model_version: Option<String>,

    /// Caller annotations for the whole document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<Custom>,
}

/// Document metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DocumentMetadata {
    /// Number of pages
    #[serde(default)]
    pub pages: u32,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a document from blocks, counting its pages.
    pub fn with_blocks(blocks: Vec<Block>) -> Self {
        let pages = blocks.iter().filter(|b| b.is_page()).count() as u32;
        Self {
            document_metadata: DocumentMetadata { pages },
            blocks,
            ..Self::default()
        }
    }

    /// Add a block to the arena.
    pub fn add_block(&mut self, block: Block) {
        if block.is_page() {
            self.document_metadata.pages += 1;
        }
        self.blocks.push(block);
    }

    /// Build an id lookup over the current blocks.
    pub fn index(&self) -> BlockIndex<'_> {
        BlockIndex::new(&self.blocks)
    }

    /// Get a block by id.
    pub fn block(&self, id: &str) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id == id)
    }

    /// Get a mutable block by id.
    pub fn block_mut(&mut self, id: &str) -> Option<&mut Block> {
        self.blocks.iter_mut().find(|b| b.id == id)
    }

    /// Page blocks in document order.
    pub fn pages(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter().filter(|b| b.is_page())
    }

    /// Ids of page blocks in document order.
    pub fn page_ids(&self) -> Vec<String> {
        self.pages().map(|p| p.id.clone()).collect()
    }

    /// Number of page blocks.
    pub fn page_count(&self) -> u32 {
        self.pages().count() as u32
    }

    /// Get a page by number (1-indexed, document order).
    pub fn get_page(&self, page_num: u32) -> Option<&Block> {
        if page_num == 0 {
            return None;
        }
        self.pages().nth((page_num - 1) as usize)
    }

    /// Page number of a page block: its upstream number, else its position.
    pub fn page_number(&self, page_id: &str) -> Option<u32> {
        self.pages()
            .enumerate()
            .find(|(_, p)| p.id == page_id)
            .map(|(i, p)| p.page.unwrap_or(i as u32 + 1))
    }

    /// Check if the document has no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Keep the blocks whose kind is in `types`, preserving order.
    pub fn filter_blocks_by_type<'b>(
        blocks: impl IntoIterator<Item = &'b Block>,
        types: &[BlockType],
    ) -> Vec<&'b Block> {
        blocks
            .into_iter()
            .filter(|b| types.contains(&b.block_type))
            .collect()
    }

    /// All blocks of a kind, in arena order.
    pub fn blocks_by_type(&self, block_type: BlockType) -> Vec<&Block> {
        Self::filter_blocks_by_type(&self.blocks, &[block_type])
    }

    /// Look up a page block, checking its kind.
    pub fn checked_page(&self, page_id: &str) -> Result<&Block> {
        let page = self
            .block(page_id)
            .ok_or_else(|| Error::BlockNotFound(page_id.to_string()))?;
        if !page.is_page() {
            return Err(Error::NotAPage(page_id.to_string()));
        }
        Ok(page)
    }

    /// Every block reachable from `block_id` over any relationship, each once.
    pub fn relationships_recursive(&self, block_id: &str) -> Result<Vec<&Block>> {
        let index = self.index();
        let root = index
            .get(block_id)
            .ok_or_else(|| Error::BlockNotFound(block_id.to_string()))?;
        index.descendants(root)
    }

    /// Blocks of a given kind reachable from a page.
    pub fn page_blocks_by_type(&self, page_id: &str, block_type: BlockType) -> Result<Vec<&Block>> {
        self.checked_page(page_id)?;
        let content = self.relationships_recursive(page_id)?;
        Ok(Self::filter_blocks_by_type(content, &[block_type]))
    }

    /// Words of a page.
    pub fn words(&self, page_id: &str) -> Result<Vec<&Block>> {
        self.page_blocks_by_type(page_id, BlockType::Word)
    }

    /// Lines of a page.
    pub fn lines(&self, page_id: &str) -> Result<Vec<&Block>> {
        self.page_blocks_by_type(page_id, BlockType::Line)
    }

    /// Tables of a page.
    pub fn tables(&self, page_id: &str) -> Result<Vec<&Block>> {
        self.page_blocks_by_type(page_id, BlockType::Table)
    }

    /// Rotate a page and every block reachable from it over CHILD edges.
    ///
    /// Each block is rotated once even when several parents list it. All new
    /// geometries are computed before any is written, so an error leaves the
    /// document untouched. Returns the number of blocks rotated.
    pub fn rotate_page(&mut self, page_id: &str, rotation: &Rotation) -> Result<usize> {
        self.checked_page(page_id)?;

        let updates: Vec<(usize, Geometry)> = {
            let index = self.index();
            let page = index
                .get(page_id)
                .ok_or_else(|| Error::BlockNotFound(page_id.to_string()))?;
            let mut targets = vec![page];
            targets.extend(index.walk(page, |t| t == RelationshipType::Child)?);

            let mut updates = Vec::with_capacity(targets.len());
            for block in targets {
                if let (Some(pos), Some(geometry)) = (index.position(&block.id), &block.geometry) {
                    updates.push((pos, geometry.rotated(rotation)?));
                }
            }
            updates
        };

        let count = updates.len();
        for (pos, geometry) in updates {
            self.blocks[pos].geometry = Some(geometry);
        }

        log::debug!(
            "rotated {} blocks of page {} by {} degrees",
            count,
            page_id,
            rotation.degrees
        );
        Ok(count)
    }

    /// Rotate every page.
    pub fn rotate(&mut self, rotation: &Rotation) -> Result<usize> {
        let mut total = 0;
        for page_id in self.page_ids() {
            total += self.rotate_page(&page_id, rotation)?;
        }
        Ok(total)
    }

    /// Mark tables as one logical table continuing across pages.
    ///
    /// `table_ids` must be in page order. Each table gets `NextTable` and/or
    /// `PreviousTable` annotations naming its neighbours.
    pub fn link_tables(&mut self, table_ids: &[&str]) -> Result<()> {
        for id in table_ids {
            let block = self
                .block(id)
                .ok_or_else(|| Error::BlockNotFound(id.to_string()))?;
            if !block.is_table() {
                return Err(Error::Other(format!("block {} is not a table", id)));
            }
        }

        for pair in table_ids.windows(2) {
            let (prev, next) = (pair[0], pair[1]);
            if let Some(block) = self.block_mut(prev) {
                block.set_custom(NEXT_TABLE_KEY, Value::String(next.to_string()));
            }
            if let Some(block) = self.block_mut(next) {
                block.set_custom(PREVIOUS_TABLE_KEY, Value::String(prev.to_string()));
            }
        }
        Ok(())
    }
}

/// Id lookup over a block arena.
pub struct BlockIndex<'a> {
    blocks: &'a [Block],
    positions: HashMap<&'a str, usize>,
}

impl<'a> BlockIndex<'a> {
    /// Index the given blocks. The first block wins when ids repeat.
    pub fn new(blocks: &'a [Block]) -> Self {
        let mut positions = HashMap::with_capacity(blocks.len());
        for (pos, block) in blocks.iter().enumerate() {
            if positions.contains_key(block.id.as_str()) {
                log::warn!("duplicate block id {}; keeping the first", block.id);
                continue;
            }
            positions.insert(block.id.as_str(), pos);
        }
        Self { blocks, positions }
    }

    /// Get a block by id.
    pub fn get(&self, id: &str) -> Option<&'a Block> {
        self.positions.get(id).map(|&pos| &self.blocks[pos])
    }

    /// Arena position of a block id.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.positions.get(id).copied()
    }

    /// Resolve an edge of `from`, failing on dangling ids.
    pub fn resolve(&self, from: &Block, to: &str) -> Result<&'a Block> {
        self.get(to).ok_or_else(|| Error::DanglingRelationship {
            from: from.id.clone(),
            to: to.to_string(),
        })
    }

    /// Direct targets of one relationship kind, in stored order.
    pub fn related(&self, block: &Block, kind: RelationshipType) -> Result<Vec<&'a Block>> {
        block
            .related_ids(kind)
            .map(|id| self.resolve(block, id))
            .collect()
    }

    /// Direct CHILD targets, in stored order.
    pub fn children(&self, block: &Block) -> Result<Vec<&'a Block>> {
        self.related(block, RelationshipType::Child)
    }

    /// Every block reachable from `root` over any relationship, depth-first
    /// in stored edge order, each once, `root` excluded.
    pub fn descendants(&self, root: &Block) -> Result<Vec<&'a Block>> {
        self.walk(root, |_| true)
    }

    /// Depth-first walk following only edges accepted by `follow`.
    pub fn walk(
        &self,
        root: &Block,
        follow: impl Fn(RelationshipType) -> bool,
    ) -> Result<Vec<&'a Block>> {
        let mut seen: HashSet<&str> = HashSet::new();
        seen.insert(root.id.as_str());
        let mut out = Vec::new();
        self.walk_into(root, &follow, &mut seen, &mut out)?;
        Ok(out)
    }

    fn walk_into<'s>(
        &self,
        block: &Block,
        follow: &impl Fn(RelationshipType) -> bool,
        seen: &mut HashSet<&'s str>,
        out: &mut Vec<&'a Block>,
    ) -> Result<()>
    where
        'a: 's,
    {
        for rel in block
            .relationships
            .iter()
            .filter(|r| follow(r.relationship_type))
        {
            for id in &rel.ids {
                let target = self.resolve(block, id)?;
                if seen.insert(target.id.as_str()) {
                    out.push(target);
                    self.walk_into(target, follow, seen, out)?;
                }
            }
        }
        Ok(())
    }
}
