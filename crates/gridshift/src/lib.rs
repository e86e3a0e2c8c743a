//! # gridshift
//!
//! Structural edits and block transforms for spreadsheet workbooks.
//!
//! Gridshift keeps the references inside formulas and defined names in step
//! with the grid they point at:
//!
//! - Insert and delete rows or columns ([`WorkbookStructureExt`])
//! - Copy, cut, paste and transpose blocks of cells ([`WorkbookTransformExt`])
//! - Merged regions, hyperlinks, tables, the autofilter and calculation
//!   markers move with the cells they cover
//! - References that lose their target become `#REF!`
//!
//! ## Example
//!
//! ```rust
//! use gridshift::prelude::*;
//!
//! let mut workbook = Workbook::new();
//! let sheet = workbook.worksheet_mut(0).unwrap();
//! sheet.set_cell_value("A1", 10.0).unwrap();
//! sheet.set_cell_value("A2", 20.0).unwrap();
//! sheet.set_cell_formula("A3", "=SUM(A1:A2)").unwrap();
//!
//! // Delete row 1; the range shrinks
//! workbook.delete_rows(0, 1, 1).unwrap();
//! let sheet = workbook.worksheet(0).unwrap();
//! assert_eq!(sheet.get_formula_at(GridAddress::new(2, 1)), Some("=SUM(A1:A1)"));
//! ```

pub mod prelude;
pub mod structure;
pub mod transform;

pub use structure::{EditOptions, EditStats, WorkbookStructureExt};
pub use transform::{PasteOption, TransformMode, WorkbookTransformExt};

// Re-export core types
pub use gridshift_core::{
    content_hash,
    // Cell types
    Cell,
    CellError,
    CellStorage,
    CellStore,
    CellValue,
    // Annotations
    CalculationMarker,
    DefinedName,
    DefinedNames,
    // Error types
    Error,
    GridAddress,
    GridRange,
    Hyperlink,
    HyperlinkTarget,
    InternTable,
    NameScope,
    Result,
    TableRegion,
    // Main types
    Workbook,
    Worksheet,
    // Constants
    MAX_COLS,
    MAX_ROWS,
    MAX_SHEET_NAME_LEN,
};

// Re-export reference rewriting
pub use gridshift_refs::{
    move_block_references, offset_formula, references, shift_formula, RefError, ReferenceToken,
    Rewritten, ShiftOperation,
};
