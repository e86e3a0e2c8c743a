//! # gridshift-core
//!
//! Core data structures for the gridshift spreadsheet editing library.
//!
//! This crate provides the fundamental types used throughout gridshift:
//! - [`GridAddress`] and [`GridRange`] - 1-based cell addressing and ranges
//! - [`Cell`] and [`CellValue`] - sparse cell contents
//! - [`InternTable`] - deduplicating style/shared-string tables
//! - [`Workbook`], [`Worksheet`] - the mutable document state
//!
//! ## Example
//!
//! ```rust
//! use gridshift_core::{GridAddress, Workbook};
//!
//! let mut workbook = Workbook::new();
//! let sheet = workbook.worksheet_mut(0).unwrap();
//!
//! sheet.set_cell_value("A1", 42.0).unwrap();
//! sheet.set_cell_formula("B1", "=A1*2").unwrap();
//!
//! let b1 = sheet.cell_at(GridAddress::new(1, 2)).unwrap();
//! assert_eq!(b1.formula.as_deref(), Some("=A1*2"));
//! ```

pub mod cell;
pub mod error;
pub mod hyperlink;
pub mod intern;
pub mod marker;
pub mod named_range;
pub mod table;
pub mod workbook;
pub mod worksheet;

// Re-exports for convenience
pub use cell::{
    Cell, CellError, CellStorage, CellStore, CellValue, GridAddress, GridRange, GridRangeIterator,
    RemapSummary,
};
pub use error::{Error, Result};
pub use hyperlink::{Hyperlink, HyperlinkTarget};
pub use intern::{content_hash, InternTable};
pub use marker::CalculationMarker;
pub use named_range::{DefinedName, DefinedNames, NameScope};
pub use table::TableRegion;
pub use workbook::Workbook;
pub use worksheet::Worksheet;

/// Maximum number of rows in a worksheet (Excel limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet (Excel limit)
pub const MAX_COLS: u32 = 16_384;

/// Maximum length of a sheet name
pub const MAX_SHEET_NAME_LEN: usize = 31;
