//! # gridshift-refs
//!
//! Reference scanning and rewriting for formula text.
//!
//! This crate provides:
//! - Reference tokens (`Sheet1!$A$1:B2` ↔ [`ReferenceToken`])
//! - A matcher that finds references in formula text, skipping string
//!   literals and function names
//! - Delta adjustment for inserted/deleted rows and columns
//! - Translation of formulas in copied or moved blocks
//!
//! ## Example
//!
//! ```rust
//! use gridshift_refs::{shift_formula, ShiftOperation};
//!
//! let op = ShiftOperation::delete_rows(2, 1);
//! let out = shift_formula("=A1+A2+SUM(A1:A5)", "Sheet1", "Sheet1", &op);
//! assert_eq!(out.text, "=A1+#REF!+SUM(A1:A4)");
//! ```

pub mod delta;
pub mod error;
pub mod matcher;
pub mod token;
pub mod translate;

pub use delta::{adjust_token, shift_formula, AxisShift, Rewritten, ShiftOperation};
pub use error::{RefError, RefResult};
pub use matcher::{references, rewrite, scan, Span};
pub use token::{CellPart, RefCells, ReferenceToken, SheetQualifier};
pub use translate::{move_block_references, offset_formula};
