//! Table cell ordering and multi-page table chains.
//!
//! Cell order inside a table comes from the stored row and column indices,
//! never from cell geometry. Tables that continue on a later page are linked
//! through `NextTable` / `PreviousTable` annotations and read as one logical
//! table.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::error::Result;
use crate::model::{
    Block, BlockIndex, Document, RelationshipType, NEXT_TABLE_KEY, PREVIOUS_TABLE_KEY,
};

/// A table as read by a person: one or more table blocks in page order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogicalTable {
    /// Table blocks in page order
    pub table_ids: Vec<String>,

    /// Cells of every table, table by table, each table row-major
    pub cell_ids: Vec<String>,
}

impl LogicalTable {
    /// Id of the table where the logical table starts.
    pub fn first_table_id(&self) -> &str {
        self.table_ids.first().map(String::as_str).unwrap_or_default()
    }

    /// Check if the table continues across pages.
    pub fn is_multi_page(&self) -> bool {
        self.table_ids.len() > 1
    }

    /// Check if the logical table includes the given table block.
    pub fn contains_table(&self, table_id: &str) -> bool {
        self.table_ids.iter().any(|t| t == table_id)
    }
}

fn row_major(mut cells: Vec<&Block>) -> Vec<&Block> {
    // Stable: cells lacking indices keep their stored order at the end
    cells.sort_by_key(|c| {
        (
            c.row_index.unwrap_or(u32::MAX),
            c.column_index.unwrap_or(u32::MAX),
        )
    });
    cells
}

/// CELL children of a table in row-major order.
pub fn row_major_cells<'a>(index: &BlockIndex<'a>, table: &Block) -> Result<Vec<&'a Block>> {
    let cells = index
        .children(table)?
        .into_iter()
        .filter(|b| b.is_cell())
        .collect();
    Ok(row_major(cells))
}

/// MERGED_CELL targets of a table in row-major order.
pub fn row_major_merged_cells<'a>(
    index: &BlockIndex<'a>,
    table: &Block,
) -> Result<Vec<&'a Block>> {
    Ok(row_major(index.related(table, RelationshipType::MergedCell)?))
}

fn marker<'a>(table: &'a Block, key: &str) -> Option<&'a str> {
    table.custom_value(key)?.as_str()
}

struct Links<'a> {
    next: HashMap<&'a str, &'a str>,
    has_prev: HashSet<&'a str>,
}

impl<'a> Links<'a> {
    fn link(&mut self, prev: &'a str, next: &'a str) {
        if prev == next || self.next.get(prev) == Some(&next) {
            return;
        }
        if self.next.contains_key(prev) || self.has_prev.contains(next) {
            log::warn!(
                "table link {} -> {} conflicts with an earlier link; ignored",
                prev,
                next
            );
            return;
        }
        self.next.insert(prev, next);
        self.has_prev.insert(next);
    }
}

/// Group every table reachable from a page into logical tables.
///
/// With `follow_markers` off, each table is its own logical table. Markers
/// naming unknown tables are ignored with a warning.
pub fn logical_tables(doc: &Document, follow_markers: bool) -> Result<Vec<LogicalTable>> {
    let index = doc.index();

    let mut order: Vec<&str> = Vec::new();
    let mut page_of: HashMap<&str, usize> = HashMap::new();
    for (page_idx, page) in doc.pages().enumerate() {
        for block in index.descendants(page)? {
            if block.is_table() && !page_of.contains_key(block.id.as_str()) {
                page_of.insert(block.id.as_str(), page_idx);
                order.push(block.id.as_str());
            }
        }
    }

    let mut links = Links {
        next: HashMap::new(),
        has_prev: HashSet::new(),
    };
    if follow_markers {
        for &id in &order {
            let Some(table) = index.get(id) else { continue };
            for (key, forward) in [(NEXT_TABLE_KEY, true), (PREVIOUS_TABLE_KEY, false)] {
                let Some(other) = marker(table, key) else {
                    continue;
                };
                let Some(&other) = page_of.get_key_value(other).map(|(k, _)| k) else {
                    log::warn!("table {} names unknown table {} as {}", id, other, key);
                    continue;
                };
                if forward {
                    links.link(table.id.as_str(), other);
                } else {
                    links.link(other, table.id.as_str());
                }
            }
        }
    }

    let mut visited: HashSet<&str> = HashSet::new();
    let mut chains: Vec<Vec<&str>> = Vec::new();
    let heads = order
        .iter()
        .filter(|id| !links.has_prev.contains(*id))
        // A cycle has no head; start it wherever it is first seen
        .chain(order.iter());
    for &head in heads {
        if visited.contains(head) {
            continue;
        }
        let mut chain = Vec::new();
        let mut current = Some(head);
        while let Some(id) = current {
            if !visited.insert(id) {
                break;
            }
            chain.push(id);
            current = links.next.get(id).copied();
        }
        chain.sort_by_key(|id| page_of.get(id).copied().unwrap_or(usize::MAX));
        chains.push(chain);
    }

    chains
        .into_iter()
        .map(|chain| -> Result<LogicalTable> {
            let mut cell_ids = Vec::new();
            for id in &chain {
                if let Some(table) = index.get(id) {
                    cell_ids.extend(
                        row_major_cells(&index, table)?
                            .into_iter()
                            .map(|c| c.id.clone()),
                    );
                }
            }
            Ok(LogicalTable {
                table_ids: chain.into_iter().map(String::from).collect(),
                cell_ids,
            })
        })
        .collect()
}
