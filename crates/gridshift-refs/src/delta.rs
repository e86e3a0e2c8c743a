//! Reference adjustment for row/column insertion and deletion
//!
//! An edit on one axis is a pivot plus a signed delta. A positive delta
//! inserts `delta` rows (or columns) before `pivot`; a negative delta deletes
//! `-delta` of them starting at `pivot`.
//!
//! Single cells inside a deleted band are invalidated. Range endpoints clamp
//! to the surviving side of the band instead, so a range only disappears
//! when its whole extent was deleted.

use gridshift_core::{GridRange, MAX_COLS, MAX_ROWS};

use crate::matcher;
use crate::token::{CellPart, RefCells, ReferenceToken};

/// Which end of a range an index belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// Top or left edge
    Start,
    /// Bottom or right edge
    End,
}

fn in_bounds(value: i64, limit: u32) -> Option<u32> {
    if value >= 1 && value <= i64::from(limit) {
        Some(value as u32)
    } else {
        None
    }
}

/// Last index of the band removed by a delete
fn band_end(pivot: i64, delta: i64) -> i64 {
    pivot - delta - 1
}

/// Adjust a single index; `None` means the reference is invalidated
///
/// ```
/// use gridshift_refs::delta::shift_index;
///
/// // Insert 2 rows at row 3
/// assert_eq!(shift_index(3, 2, 10, 1_048_576), Some(12));
/// // Delete rows 3..=4
/// assert_eq!(shift_index(3, -2, 4, 1_048_576), None);
/// assert_eq!(shift_index(3, -2, 5, 1_048_576), Some(3));
/// ```
pub fn shift_index(pivot: i64, delta: i64, index: u32, limit: u32) -> Option<u32> {
    if pivot <= 0 || delta == 0 {
        return Some(index);
    }

    let idx = i64::from(index);
    let shifted = if delta > 0 {
        if idx >= pivot {
            idx + delta
        } else {
            idx
        }
    } else if idx < pivot {
        idx
    } else if idx <= band_end(pivot, delta) {
        return None;
    } else {
        idx + delta
    };

    in_bounds(shifted, limit)
}

/// Adjust one endpoint of a range
///
/// Inside a deleted band, a start endpoint clamps to `pivot` and an end
/// endpoint clamps to `pivot - 1`.
pub fn shift_endpoint(pivot: i64, delta: i64, index: u32, limit: u32, role: Endpoint) -> Option<u32> {
    if pivot > 0 && delta < 0 {
        let idx = i64::from(index);
        if idx >= pivot && idx <= band_end(pivot, delta) {
            let clamped = match role {
                Endpoint::Start => pivot,
                Endpoint::End => pivot - 1,
            };
            return in_bounds(clamped, limit);
        }
    }
    shift_index(pivot, delta, index, limit)
}

/// Adjust an inclusive span `start..=end` (with `start <= end`)
///
/// Returns `None` when nothing of the span survives.
pub fn shift_span(pivot: i64, delta: i64, start: u32, end: u32, limit: u32) -> Option<(u32, u32)> {
    let new_start = shift_endpoint(pivot, delta, start, limit, Endpoint::Start)?;
    let new_end = shift_endpoint(pivot, delta, end, limit, Endpoint::End)?;
    (new_start <= new_end).then_some((new_start, new_end))
}

/// Plain signed offset with a bounds check
pub fn translate_index(index: u32, delta: i64, limit: u32) -> Option<u32> {
    in_bounds(i64::from(index) + delta, limit)
}

/// Edit on one axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AxisShift {
    /// First affected index; `<= 0` disables the shift
    pub pivot: i64,
    /// Inserted (positive) or deleted (negative) count
    pub delta: i64,
}

impl AxisShift {
    /// Create an axis shift
    pub fn new(pivot: i64, delta: i64) -> Self {
        Self { pivot, delta }
    }

    /// Whether this shift changes anything
    pub fn is_active(&self) -> bool {
        self.pivot > 0 && self.delta != 0
    }

    /// Adjust a single index
    pub fn index(&self, index: u32, limit: u32) -> Option<u32> {
        shift_index(self.pivot, self.delta, index, limit)
    }

    /// Adjust an inclusive span
    pub fn span(&self, start: u32, end: u32, limit: u32) -> Option<(u32, u32)> {
        shift_span(self.pivot, self.delta, start, end, limit)
    }

    /// Adjust the span of a grid region such as a merge or table
    ///
    /// Unlike formula text, an inserted band only truncates a region at the
    /// grid limit. The region is lost only when its start leaves the grid.
    pub fn region(&self, start: u32, end: u32, limit: u32) -> Option<(u32, u32)> {
        if self.pivot > 0 && self.delta > 0 {
            let new_start = self.index(start, limit)?;
            let new_end = self.index(end, limit).unwrap_or(limit);
            return Some((new_start, new_end));
        }
        self.span(start, end, limit)
    }
}

/// A structural edit, possibly touching both axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShiftOperation {
    /// Row axis
    pub rows: AxisShift,
    /// Column axis
    pub columns: AxisShift,
}

impl ShiftOperation {
    /// Insert `count` rows before row `at`
    pub fn insert_rows(at: u32, count: u32) -> Self {
        Self {
            rows: AxisShift::new(i64::from(at), i64::from(count)),
            ..Self::default()
        }
    }

    /// Delete `count` rows starting at row `at`
    pub fn delete_rows(at: u32, count: u32) -> Self {
        Self {
            rows: AxisShift::new(i64::from(at), -i64::from(count)),
            ..Self::default()
        }
    }

    /// Insert `count` columns before column `at`
    pub fn insert_columns(at: u32, count: u32) -> Self {
        Self {
            columns: AxisShift::new(i64::from(at), i64::from(count)),
            ..Self::default()
        }
    }

    /// Delete `count` columns starting at column `at`
    pub fn delete_columns(at: u32, count: u32) -> Self {
        Self {
            columns: AxisShift::new(i64::from(at), -i64::from(count)),
            ..Self::default()
        }
    }

    /// Whether this operation changes anything
    pub fn is_active(&self) -> bool {
        self.rows.is_active() || self.columns.is_active()
    }

    /// Adjust a single cell position
    pub fn cell(&self, row: u32, column: u32) -> Option<(u32, u32)> {
        Some((
            self.rows.index(row, MAX_ROWS)?,
            self.columns.index(column, MAX_COLS)?,
        ))
    }

    /// Adjust a rectangular region with the range rules
    ///
    /// Used for merged regions, tables and filters; `None` when the region
    /// was deleted entirely or pushed off the grid. A region end pushed past
    /// the grid limit stays at the limit.
    pub fn range(&self, range: &GridRange) -> Option<GridRange> {
        let (start_row, end_row) = self.rows.region(range.start.row, range.end.row, MAX_ROWS)?;
        let (start_col, end_col) = self
            .columns
            .region(range.start.column, range.end.column, MAX_COLS)?;
        Some(GridRange::from_indices(start_row, start_col, end_row, end_col))
    }
}

/// Adjust one reference; `None` means it was invalidated
///
/// `$` markers never influence structural adjustment.
pub fn adjust_token(token: &ReferenceToken, op: &ShiftOperation) -> Option<ReferenceToken> {
    let cells = match token.cells {
        RefCells::Single(p) => {
            let (row, column) = op.cell(p.row, p.column)?;
            RefCells::Single(CellPart { row, column, ..p })
        }
        RefCells::Range(a, b) => {
            let (a_row, b_row) = adjust_pair(&op.rows, a.row, b.row, MAX_ROWS)?;
            let (a_col, b_col) = adjust_pair(&op.columns, a.column, b.column, MAX_COLS)?;
            RefCells::Range(
                CellPart {
                    row: a_row,
                    column: a_col,
                    ..a
                },
                CellPart {
                    row: b_row,
                    column: b_col,
                    ..b
                },
            )
        }
    };

    Some(ReferenceToken {
        cells,
        ..token.clone()
    })
}

/// Span adjustment for endpoints written in either order
fn adjust_pair(axis: &AxisShift, a: u32, b: u32, limit: u32) -> Option<(u32, u32)> {
    if a <= b {
        axis.span(a, b, limit)
    } else {
        axis.span(b, a, limit).map(|(lo, hi)| (hi, lo))
    }
}

/// A formula after reference rewriting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewritten {
    /// New formula text
    pub text: String,
    /// References that moved
    pub adjusted: usize,
    /// References replaced by `#REF!`
    pub invalidated: usize,
}

impl Rewritten {
    /// Whether any reference changed
    pub fn changed(&self) -> bool {
        self.adjusted > 0 || self.invalidated > 0
    }
}

/// Rewrite the references in `formula` for an edit on `edited_sheet`
///
/// `current_sheet` is the sheet owning the formula; unqualified references
/// point into it. References into other sheets are left as written.
///
/// ```
/// use gridshift_refs::delta::{shift_formula, ShiftOperation};
///
/// let out = shift_formula("=SUM(A1:A10)", "Sheet1", "Sheet1", &ShiftOperation::insert_rows(3, 2));
/// assert_eq!(out.text, "=SUM(A1:A12)");
/// ```
pub fn shift_formula(
    formula: &str,
    current_sheet: &str,
    edited_sheet: &str,
    op: &ShiftOperation,
) -> Rewritten {
    let mut adjusted = 0;
    let mut invalidated = 0;

    let text = matcher::rewrite(formula, |token| {
        if !op.is_active() || !token.belongs_to(current_sheet, edited_sheet) {
            return None;
        }
        match adjust_token(token, op) {
            Some(new_token) if new_token == *token => None,
            Some(new_token) => {
                adjusted += 1;
                Some(new_token.to_string())
            }
            None => {
                invalidated += 1;
                Some(token.invalidated_text())
            }
        }
    });

    Rewritten {
        text,
        adjusted,
        invalidated,
    }
}
