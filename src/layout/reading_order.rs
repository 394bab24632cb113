//! Geometric reading order.
//!
//! Each page's top-level blocks are grouped into row bands by vertical
//! overlap, bands are read top to bottom and blocks inside a band left to
//! right. Every unit is then flattened into itself followed by the blocks it
//! contains, so a line is followed by its words, a key by its value, and a
//! table by its cells in row-major order.

use std::collections::{HashMap, HashSet};
use std::ops::Range;

use serde::Serialize;

use super::options::OrderOptions;
use super::table::{logical_tables, row_major_cells, row_major_merged_cells, LogicalTable};
use crate::error::{Error, Result};
use crate::model::{Block, BlockIndex, BlockType, Document, RelationshipType};

/// A top-level block of a page and where it landed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderedUnit {
    /// Block id
    pub id: String,

    /// Block kind
    pub block_type: BlockType,

    /// Row band, or `None` for blocks without usable geometry
    pub band: Option<usize>,

    /// First table of the logical table this table continues
    #[serde(skip_serializing_if = "Option::is_none")]
    pub continued_from: Option<String>,

    /// Positions of the unit and its contents in the page sequence
    pub span: Range<usize>,
}

impl OrderedUnit {
    /// Check if the unit had a usable bounding box.
    pub fn is_placed(&self) -> bool {
        self.band.is_some()
    }
}

/// Reading order of one page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageOrder {
    pub page_id: String,

    /// Page number (1-indexed)
    pub page_number: u32,

    /// Top-level blocks in reading order
    pub units: Vec<OrderedUnit>,

    /// Every block emitted for the page, page block excluded
    pub sequence: Vec<String>,
}

impl PageOrder {
    /// Ids of the top-level blocks in reading order.
    pub fn unit_ids(&self) -> Vec<&str> {
        self.units.iter().map(|u| u.id.as_str()).collect()
    }

    /// The unit and its contents.
    pub fn unit_sequence(&self, unit: &OrderedUnit) -> &[String] {
        self.sequence.get(unit.span.clone()).unwrap_or_default()
    }

    /// Number of row bands on the page.
    pub fn band_count(&self) -> usize {
        self.units
            .iter()
            .filter_map(|u| u.band)
            .max()
            .map_or(0, |b| b + 1)
    }
}

/// Reading order of a whole document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadingOrder {
    pub pages: Vec<PageOrder>,

    /// Every table, grouped into tables continuing across pages
    pub logical_tables: Vec<LogicalTable>,
}

impl ReadingOrder {
    /// Get the order of a page by id.
    pub fn page(&self, page_id: &str) -> Option<&PageOrder> {
        self.pages.iter().find(|p| p.page_id == page_id)
    }

    /// Logical table that includes the given table block.
    pub fn logical_table_of(&self, table_id: &str) -> Option<&LogicalTable> {
        self.logical_tables
            .iter()
            .find(|t| t.contains_table(table_id))
    }

    /// Block ids of the whole document in reading order.
    ///
    /// Pages come in document order, each page id followed by its sequence,
    /// except that a table continuing across pages is read in full where it
    /// starts.
    pub fn document_sequence(&self) -> Vec<String> {
        let mut located: HashMap<&str, (&PageOrder, &OrderedUnit)> = HashMap::new();
        for page in &self.pages {
            for unit in &page.units {
                located.insert(unit.id.as_str(), (page, unit));
            }
        }

        let mut out = Vec::new();
        let mut emitted: HashSet<&str> = HashSet::new();
        for page in &self.pages {
            out.push(page.page_id.clone());
            for unit in &page.units {
                if emitted.contains(unit.id.as_str()) {
                    continue;
                }
                match self
                    .logical_table_of(&unit.id)
                    .filter(|t| t.is_multi_page())
                {
                    Some(table) => {
                        for table_id in &table.table_ids {
                            if let Some((owner, part)) = located.get(table_id.as_str()) {
                                if emitted.insert(part.id.as_str()) {
                                    out.extend_from_slice(owner.unit_sequence(part));
                                }
                            }
                        }
                    }
                    None => {
                        emitted.insert(unit.id.as_str());
                        out.extend_from_slice(page.unit_sequence(unit));
                    }
                }
            }
        }
        out
    }

    /// Copy of `doc` with its blocks rearranged into this order.
    ///
    /// Each page block is followed by its sequence; blocks not reached from
    /// any page follow in their original order. Relationships are kept as
    /// they are.
    pub fn reorder(&self, doc: &Document) -> Document {
        let index = doc.index();
        let mut taken = vec![false; doc.blocks.len()];
        let mut blocks = Vec::with_capacity(doc.blocks.len());

        let mut take = |id: &str| {
            if let Some(pos) = index.position(id) {
                if !taken[pos] {
                    taken[pos] = true;
                    blocks.push(doc.blocks[pos].clone());
                }
            }
        };
        for page in &self.pages {
            take(&page.page_id);
            for id in &page.sequence {
                take(id);
            }
        }

        let leftover = taken.iter().filter(|t| !**t).count();
        if leftover > 0 {
            log::debug!("{} blocks not reached from any page kept at the end", leftover);
        }
        for (block, taken) in doc.blocks.iter().zip(&taken) {
            if !taken {
                blocks.push(block.clone());
            }
        }

        Document {
            document_metadata: doc.document_metadata.clone(),
            blocks,
            job_status: doc.job_status.clone(),
            next_token: doc.next_token.clone(),
            status_message: doc.status_message.clone(),
            warnings: doc.warnings.clone(),
            document_text_detection_model_version: doc
                .document_text_detection_model_version
                .clone(),
            analyze_document_model_version: doc.analyze_document_model_version.clone(),
            custom: doc.custom.clone(),
        }
    }
}

/// A unit with a usable bounding box.
struct Placed<'a> {
    block: &'a Block,
    position: usize,
    top: f64,
    left: f64,
    bottom: f64,
    height: f64,
}

impl<'a> Placed<'a> {
    fn new(block: &'a Block, position: usize) -> Option<Self> {
        let bbox = block.placed_box()?;
        let (top, left, height) = (bbox.top?, bbox.left?, bbox.height?);
        if !(top.is_finite() && left.is_finite() && height.is_finite()) {
            return None;
        }
        let height = height.max(0.0);
        Some(Self {
            block,
            position,
            top,
            left,
            bottom: top + height,
            height,
        })
    }
}

/// Resolves the reading order of a document.
#[derive(Debug, Clone, Default)]
pub struct ReadingOrderResolver {
    options: OrderOptions,
}

impl ReadingOrderResolver {
    /// Create a resolver with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a resolver with custom options.
    pub fn with_options(options: OrderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &OrderOptions {
        &self.options
    }

    /// Resolve the reading order of every page.
    ///
    /// The document is only read. Fails on a relationship naming a missing
    /// block.
    pub fn resolve(&self, doc: &Document) -> Result<ReadingOrder> {
        let index = doc.index();
        let logical_tables = logical_tables(doc, self.options.merge_multi_page_tables)?;

        let mut pages = Vec::new();
        {
            let mut continued_from: HashMap<&str, &str> = HashMap::new();
            for table in logical_tables.iter().filter(|t| t.is_multi_page()) {
                for id in &table.table_ids[1..] {
                    continued_from.insert(id.as_str(), table.first_table_id());
                }
            }

            // Pages are never read as content of another page
            let mut seen: HashSet<&str> = doc.pages().map(|p| p.id.as_str()).collect();

            for (pos, page) in doc.pages().enumerate() {
                let page_number = page.page.unwrap_or(pos as u32 + 1);
                pages.push(self.resolve_page(
                    &index,
                    page,
                    page_number,
                    &continued_from,
                    &mut seen,
                )?);
            }
        }

        Ok(ReadingOrder {
            pages,
            logical_tables,
        })
    }

    fn resolve_page<'a>(
        &self,
        index: &BlockIndex<'a>,
        page: &'a Block,
        page_number: u32,
        continued_from: &HashMap<&str, &str>,
        seen: &mut HashSet<&'a str>,
    ) -> Result<PageOrder> {
        let mut direct: Vec<&'a Block> = Vec::new();
        let mut listed: HashSet<&str> = HashSet::new();
        for id in page.all_related_ids() {
            let block = index.resolve(page, id)?;
            if listed.insert(block.id.as_str()) {
                direct.push(block);
            }
        }

        let mut nested: HashSet<&str> = HashSet::new();
        for block in &direct {
            nested.extend(index.descendants(block)?.into_iter().map(|b| b.id.as_str()));
        }
        let candidates: Vec<&'a Block> = direct
            .iter()
            .copied()
            .filter(|b| !nested.contains(b.id.as_str()))
            .collect();

        let (bands, unplaced) = self.band(&candidates);

        let mut order = PageOrder {
            page_id: page.id.clone(),
            page_number,
            units: Vec::new(),
            sequence: Vec::new(),
        };
        for (band_no, band) in bands.iter().enumerate() {
            for &block in band {
                self.push_unit(index, block, Some(band_no), continued_from, seen, &mut order)?;
            }
        }
        for block in unplaced {
            log::debug!(
                "{}; placing it after positioned blocks",
                Error::MissingGeometry(block.id.clone())
            );
            self.push_unit(index, block, None, continued_from, seen, &mut order)?;
        }
        // Blocks that only reach each other in a cycle
        for block in direct {
            self.push_unit(index, block, None, continued_from, seen, &mut order)?;
        }

        log::debug!(
            "page {}: {} units in {} bands, {} blocks",
            order.page_id,
            order.units.len(),
            bands.len(),
            order.sequence.len()
        );
        Ok(order)
    }

    /// Group placed units into row bands; return them with the unplaced units.
    fn band<'a>(&self, units: &[&'a Block]) -> (Vec<Vec<&'a Block>>, Vec<&'a Block>) {
        let mut placed = Vec::with_capacity(units.len());
        let mut unplaced = Vec::new();
        for (position, &block) in units.iter().enumerate() {
            match Placed::new(block, position) {
                Some(p) => placed.push(p),
                None => unplaced.push(block),
            }
        }

        placed.sort_by(|a, b| {
            a.top
                .total_cmp(&b.top)
                .then(a.left.total_cmp(&b.left))
                .then(a.position.cmp(&b.position))
        });

        // A unit joins the open band only if it shares the row with every
        // member, so two stacked lines never meet through a tall neighbour
        let mut bands: Vec<Vec<Placed<'a>>> = Vec::new();
        for unit in placed {
            match bands.last_mut() {
                Some(band) if band.iter().all(|m| self.same_band(m, &unit)) => band.push(unit),
                _ => bands.push(vec![unit]),
            }
        }

        let bands = bands
            .into_iter()
            .map(|mut band| {
                band.sort_by(|a, b| {
                    a.left
                        .total_cmp(&b.left)
                        .then(a.top.total_cmp(&b.top))
                        .then(a.position.cmp(&b.position))
                });
                band.into_iter().map(|p| p.block).collect()
            })
            .collect();
        (bands, unplaced)
    }

    fn same_band(&self, member: &Placed<'_>, unit: &Placed<'_>) -> bool {
        if (unit.top - member.top).abs() <= self.options.top_tolerance {
            return true;
        }
        let overlap = member.bottom.min(unit.bottom) - member.top.max(unit.top);
        let shorter = member.height.min(unit.height);
        overlap > 0.0 && overlap >= self.options.row_overlap_ratio * shorter
    }

    fn push_unit<'a>(
        &self,
        index: &BlockIndex<'a>,
        block: &'a Block,
        band: Option<usize>,
        continued_from: &HashMap<&str, &str>,
        seen: &mut HashSet<&'a str>,
        order: &mut PageOrder,
    ) -> Result<()> {
        let start = order.sequence.len();
        self.flatten(index, block, seen, &mut order.sequence)?;
        if order.sequence.len() == start {
            return Ok(());
        }
        order.units.push(OrderedUnit {
            id: block.id.clone(),
            block_type: block.block_type,
            band,
            continued_from: continued_from.get(block.id.as_str()).map(|s| s.to_string()),
            span: start..order.sequence.len(),
        });
        Ok(())
    }

    /// Emit a block and everything it contains, each block once.
    fn flatten<'a>(
        &self,
        index: &BlockIndex<'a>,
        block: &'a Block,
        seen: &mut HashSet<&'a str>,
        out: &mut Vec<String>,
    ) -> Result<()> {
        if !seen.insert(block.id.as_str()) {
            return Ok(());
        }
        out.push(block.id.clone());

        if block.is_table() {
            for title in index.related(block, RelationshipType::TableTitle)? {
                self.flatten(index, title, seen, out)?;
            }
            for cell in row_major_cells(index, block)? {
                self.flatten(index, cell, seen, out)?;
            }
            for merged in row_major_merged_cells(index, block)? {
                self.flatten(index, merged, seen, out)?;
            }
            for footer in index.related(block, RelationshipType::TableFooter)? {
                self.flatten(index, footer, seen, out)?;
            }
        }

        for id in block.all_related_ids() {
            let target = index.resolve(block, id)?;
            self.flatten(index, target, seen, out)?;
        }
        Ok(())
    }
}

/// Resolve the reading order with the given options.
pub fn resolve(doc: &Document, options: &OrderOptions) -> Result<ReadingOrder> {
    ReadingOrderResolver::with_options(options.clone()).resolve(doc)
}

/// Reading sequence of one page.
pub fn page_sequence(doc: &Document, page_id: &str, options: &OrderOptions) -> Result<Vec<String>> {
    doc.checked_page(page_id)?;
    let order = resolve(doc, options)?;
    Ok(order
        .page(page_id)
        .map(|p| p.sequence.clone())
        .unwrap_or_default())
}

/// Copy of the document with blocks rearranged into reading order.
pub fn order_blocks_by_geo(doc: &Document, options: &OrderOptions) -> Result<Document> {
    Ok(resolve(doc, options)?.reorder(doc))
}
