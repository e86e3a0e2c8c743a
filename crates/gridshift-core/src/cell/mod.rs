//! Cell-related types and utilities
//!
//! This module contains:
//! - [`GridAddress`] - A cell's location (e.g., "A1")
//! - [`GridRange`] - A rectangular block of cells (e.g., "A1:B10")
//! - [`CellValue`] - The value stored in a cell
//! - [`Cell`] - Complete cell data including formula, style and metadata
//! - [`CellStorage`] - The sparse per-worksheet cell store

mod address;
mod storage;
mod value;

pub use address::{GridAddress, GridRange, GridRangeIterator};
pub use storage::{Cell, CellStorage, CellStore, RemapSummary};
pub use value::{CellError, CellValue};
