//! Formula translation for copied and moved blocks
//!
//! Copying a formula shifts its relative references by the distance the
//! cell travelled. Cutting a block instead leaves moved formulas alone and
//! re-targets every reference that pointed into the block.

use gridshift_core::{GridAddress, GridRange, MAX_COLS, MAX_ROWS};

use crate::delta::{translate_index, Rewritten};
use crate::matcher;
use crate::token::{CellPart, RefCells, ReferenceToken};

fn offset_part(part: CellPart, row_delta: i64, column_delta: i64) -> Option<CellPart> {
    let row = if part.row_absolute {
        part.row
    } else {
        translate_index(part.row, row_delta, MAX_ROWS)?
    };
    let column = if part.column_absolute {
        part.column
    } else {
        translate_index(part.column, column_delta, MAX_COLS)?
    };
    Some(CellPart { row, column, ..part })
}

/// Offset the relative parts of every reference (copy semantics)
///
/// Absolute parts stay fixed. A reference pushed off the grid becomes
/// `#REF!`. Qualified references move too, as they do when a formula is
/// copied.
///
/// ```
/// use gridshift_refs::translate::offset_formula;
///
/// assert_eq!(offset_formula("=A1+$B$2+C$3", 2, 1).text, "=B3+$B$2+D$3");
/// assert_eq!(offset_formula("=A1", -1, 0).text, "=#REF!");
/// ```
pub fn offset_formula(formula: &str, row_delta: i64, column_delta: i64) -> Rewritten {
    let mut adjusted = 0;
    let mut invalidated = 0;

    let text = matcher::rewrite(formula, |token| {
        if row_delta == 0 && column_delta == 0 {
            return None;
        }

        let cells = match token.cells {
            RefCells::Single(p) => offset_part(p, row_delta, column_delta).map(RefCells::Single),
            RefCells::Range(a, b) => offset_part(a, row_delta, column_delta)
                .zip(offset_part(b, row_delta, column_delta))
                .map(|(a, b)| RefCells::Range(a, b)),
        };

        match cells {
            Some(cells) if cells == token.cells => None,
            Some(cells) => {
                adjusted += 1;
                Some(
                    ReferenceToken {
                        cells,
                        ..token.clone()
                    }
                    .to_string(),
                )
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

/// Re-target references into a moved block (cut semantics)
///
/// References on `moved_sheet` whose whole extent lies inside `block` are
/// sent through `map`, keeping their `$` markers. Ranges are re-normalized
/// afterwards so a transposed block still reads top-left to bottom-right.
/// A corner that `map` drops invalidates the reference. Everything else is
/// left as written.
///
/// ```
/// use gridshift_core::{GridAddress, GridRange};
/// use gridshift_refs::translate::move_block_references;
///
/// let block = GridRange::parse("B2:C3").unwrap();
/// let out = move_block_references("=SUM(B2:C3)+B4", "Sheet1", "Sheet1", &block, |a| {
///     a.offset(3, 3)
/// });
/// assert_eq!(out.text, "=SUM(E5:F6)+B4");
/// ```
pub fn move_block_references<F>(
    formula: &str,
    current_sheet: &str,
    moved_sheet: &str,
    block: &GridRange,
    map: F,
) -> Rewritten
where
    F: Fn(GridAddress) -> Option<GridAddress>,
{
    let mut adjusted = 0;
    let mut invalidated = 0;

    let text = matcher::rewrite(formula, |token| {
        if !token.belongs_to(current_sheet, moved_sheet) || !block.contains_range(&token.extent()) {
            return None;
        }

        let cells = match token.cells {
            RefCells::Single(p) => map(p.address()).map(|addr| RefCells::Single(p.with_address(addr))),
            RefCells::Range(a, b) => map(a.address())
                .zip(map(b.address()))
                .map(|(new_a, new_b)| {
                    let extent = GridRange::new(new_a, new_b);
                    RefCells::Range(a.with_address(extent.start), b.with_address(extent.end))
                }),
        };

        match cells {
            Some(cells) if cells == token.cells => None,
            Some(cells) => {
                adjusted += 1;
                Some(
                    ReferenceToken {
                        cells,
                        ..token.clone()
                    }
                    .to_string(),
                )
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
