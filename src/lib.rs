//! # docorder
//!
//! Geometry, orientation and reading-order tools for analyzed documents.
//!
//! Documents arrive as a flat list of blocks (pages, lines, words, tables,
//! cells, key/value sets) linked by id, the shape produced by OCR and
//! document-analysis services. This library rotates their geometry, estimates
//! how far each page is turned, and puts the blocks into the order a person
//! would read them.
//!
//! ## Quick Start
//!
//! ```no_run
//! use docorder::{load_file, order_blocks_by_geo, OrderOptions};
//!
//! fn main() -> docorder::Result<()> {
//!     let doc = load_file("analysis.json")?;
//!     let ordered = order_blocks_by_geo(&doc, &OrderOptions::default())?;
//!     println!("{} blocks", ordered.blocks.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Rotation**: points, boxes and polygons around any origin, page-wide
//! - **Orientation**: circular mean of per-word skew, with quadrant fallback
//! - **Reading order**: row bands, row-major tables, multi-page tables
//! - **Round-trip JSON**: unknown annotations preserved, no `null` written
//! - **Parallel processing**: Uses Rayon for batches of documents

pub mod error;
pub mod layout;
pub mod model;
pub mod render;

// Re-export commonly used types
pub use error::{Error, Result};
pub use layout::{
    add_page_orientation, correct_rotation, estimate_page_orientation, order_blocks_by_geo,
    page_orientation, LogicalTable, OrderOptions, OrientationMethod, OrientationOptions,
    PageOrder, ReadingOrder, ReadingOrderResolver,
};
pub use model::{
    Block, BlockType, BoundingBox, Document, Geometry, Point, Polygon, Relationship,
    RelationshipType, Rotation,
};
pub use render::{from_json, to_json, JsonFormat};

use std::fs;
use std::path::Path;

use rayon::prelude::*;

/// Load an analyzed document from a JSON file.
///
/// # Example
///
/// ```no_run
/// use docorder::load_file;
///
/// let doc = load_file("analysis.json").unwrap();
/// println!("Pages: {}", doc.page_count());
/// ```
pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    let data = fs::read(path)?;
    render::from_json_bytes(&data)
}

/// Load a document and return it with blocks in reading order.
pub fn order_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    let doc = load_file(path)?;
    order_blocks_by_geo(&doc, &OrderOptions::default())
}

/// Load a document and return its lines as text in reading order.
///
/// # Example
///
/// ```no_run
/// use docorder::extract_text;
///
/// let text = extract_text("analysis.json").unwrap();
/// println!("{}", text);
/// ```
pub fn extract_text<P: AsRef<Path>>(path: P) -> Result<String> {
    let doc = load_file(path)?;
    render::to_text(&doc, &OrderOptions::default())
}

/// Builder for the full pipeline: orientation, optional correction, ordering.
///
/// # Example
///
/// ```no_run
/// use docorder::Docorder;
///
/// let json = Docorder::new()
///     .correct_rotation()
///     .process_file("analysis.json")?
///     .to_json(docorder::JsonFormat::Pretty)?;
/// # Ok::<(), docorder::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Docorder {
    orientation_options: OrientationOptions,
    order_options: OrderOptions,
    annotate_orientation: bool,
    correct_rotation: bool,
    parallel: bool,
}

impl Docorder {
    /// Create a new Docorder builder.
    pub fn new() -> Self {
        Self {
            orientation_options: OrientationOptions::default(),
            order_options: OrderOptions::default(),
            annotate_orientation: true,
            correct_rotation: false,
            parallel: true,
        }
    }

    /// Set the orientation options.
    pub fn with_orientation_options(mut self, options: OrientationOptions) -> Self {
        self.orientation_options = options;
        self
    }

    /// Set how word angles are combined.
    pub fn with_orientation_method(mut self, method: OrientationMethod) -> Self {
        self.orientation_options = self.orientation_options.with_method(method);
        self
    }

    /// Set the reading order options.
    pub fn with_order_options(mut self, options: OrderOptions) -> Self {
        self.order_options = options;
        self
    }

    /// Rotate each page upright before ordering.
    pub fn correct_rotation(mut self) -> Self {
        self.correct_rotation = true;
        self
    }

    /// Skip writing the page orientation annotation.
    pub fn without_orientation(mut self) -> Self {
        self.annotate_orientation = false;
        self
    }

    /// Disable parallel processing of batches.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Run the pipeline over one document.
    pub fn process(&self, mut document: Document) -> Result<ProcessResult> {
        if self.correct_rotation {
            layout::correct_rotation(&mut document, &self.orientation_options)?;
        } else if self.annotate_orientation {
            layout::add_page_orientation(&mut document, &self.orientation_options)?;
        }

        let reading_order =
            ReadingOrderResolver::with_options(self.order_options.clone()).resolve(&document)?;
        let document = reading_order.reorder(&document);

        Ok(ProcessResult {
            document,
            reading_order,
            order_options: self.order_options.clone(),
        })
    }

    /// Load a JSON file and run the pipeline over it.
    pub fn process_file<P: AsRef<Path>>(&self, path: P) -> Result<ProcessResult> {
        self.process(load_file(path)?)
    }

    /// Run the pipeline over many documents, keeping input order.
    pub fn process_batch(&self, documents: Vec<Document>) -> Vec<Result<ProcessResult>> {
        if self.parallel {
            documents
                .into_par_iter()
                .map(|doc| self.process(doc))
                .collect()
        } else {
            documents.into_iter().map(|doc| self.process(doc)).collect()
        }
    }

    /// Load and process many JSON files, keeping input order.
    pub fn process_files<P: AsRef<Path> + Sync>(&self, paths: &[P]) -> Vec<Result<ProcessResult>> {
        self.process_files_with(paths, |_| {})
    }

    /// Like [`process_files`](Self::process_files), calling `on_done` as each
    /// file finishes. With parallel processing the calls come from worker
    /// threads in completion order.
    pub fn process_files_with<P, F>(&self, paths: &[P], on_done: F) -> Vec<Result<ProcessResult>>
    where
        P: AsRef<Path> + Sync,
        F: Fn(&Path) + Sync,
    {
        let run = |p: &P| {
            let result = self.process_file(p);
            on_done(p.as_ref());
            result
        };
        if self.parallel {
            paths.par_iter().map(run).collect()
        } else {
            paths.iter().map(run).collect()
        }
    }
}

impl Default for Docorder {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of running the pipeline over a document.
#[derive(Debug, Clone)]
pub struct ProcessResult {
    /// The document with blocks in reading order
    pub document: Document,
    /// The resolved reading order
    pub reading_order: ReadingOrder,
    order_options: OrderOptions,
}

impl ProcessResult {
    /// Convert to JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        render::to_json(&self.document, format)
    }

    /// Lines as text in reading order.
    pub fn to_text(&self) -> Result<String> {
        render::to_text(&self.document, &self.order_options)
    }

    /// Orientation annotation of every page, in page order.
    pub fn orientations(&self) -> Vec<(String, Option<f64>)> {
        self.document
            .pages()
            .map(|p| (p.id.clone(), page_orientation(p)))
            .collect()
    }

    /// Get the document.
    pub fn document(&self) -> &Document {
        &self.document
    }
}
