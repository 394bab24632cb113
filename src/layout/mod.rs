//! Layout analysis: page orientation and reading order.

mod options;
pub mod orientation;
pub mod reading_order;
pub mod table;

pub use options::{OrderOptions, OrientationMethod, OrientationOptions};
pub use orientation::{
    add_page_orientation, correct_page_rotation, correct_rotation, estimate_page_orientation,
    page_orientation,
};
pub use reading_order::{
    order_blocks_by_geo, page_sequence, OrderedUnit, PageOrder, ReadingOrder,
    ReadingOrderResolver,
};
pub use table::{logical_tables, LogicalTable};
