//! Row and column insertion/deletion
//!
//! Structural edits move cells, shift everything anchored to the grid
//! (merged regions, hyperlinks, tables, the autofilter, calculation markers)
//! and rewrite formula references across the workbook.
//!
//! # Example
//!
//! ```rust
//! use gridshift::prelude::*;
//!
//! let mut workbook = Workbook::new();
//! let sheet = workbook.worksheet_mut(0).unwrap();
//! sheet.set_cell_formula("A15", "=SUM(A1:A10)").unwrap();
//!
//! let stats = workbook.insert_rows(0, 3, 2).unwrap();
//! assert_eq!(stats.formulas_rewritten, 1);
//!
//! let sheet = workbook.worksheet(0).unwrap();
//! assert_eq!(sheet.get_formula_at(GridAddress::new(17, 1)), Some("=SUM(A1:A12)"));
//! ```

use gridshift_core::{GridAddress, Worksheet, MAX_COLS, MAX_ROWS};
use gridshift_refs::{shift_formula, ShiftOperation};

use crate::{Error, HyperlinkTarget, NameScope, Result, Workbook};

/// Options for structural edits
#[derive(Debug, Clone)]
pub struct EditOptions {
    /// Rewrite `refers_to` of defined names
    pub update_defined_names: bool,
    /// Rewrite formulas on sheets other than the edited one
    pub update_other_sheets: bool,
}

impl Default for EditOptions {
    fn default() -> Self {
        Self {
            update_defined_names: true,
            update_other_sheets: true,
        }
    }
}

/// Statistics from a structural edit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditStats {
    /// Cells that changed position
    pub cells_moved: usize,
    /// Cells dropped (deleted band or pushed off the grid)
    pub cells_removed: usize,
    /// Formulas and defined names whose text changed
    pub formulas_rewritten: usize,
    /// References replaced by `#REF!`
    pub references_invalidated: usize,
}

/// Extension trait for Workbook to add structural edits
pub trait WorkbookStructureExt {
    /// Insert `count` rows before row `at` on the sheet at `sheet`
    fn insert_rows(&mut self, sheet: usize, at: u32, count: u32) -> Result<EditStats>;

    /// Delete `count` rows starting at row `at`
    fn delete_rows(&mut self, sheet: usize, at: u32, count: u32) -> Result<EditStats>;

    /// Insert `count` columns before column `at`
    fn insert_columns(&mut self, sheet: usize, at: u32, count: u32) -> Result<EditStats>;

    /// Delete `count` columns starting at column `at`
    fn delete_columns(&mut self, sheet: usize, at: u32, count: u32) -> Result<EditStats>;

    /// Insert rows with custom options
    fn insert_rows_with_options(
        &mut self,
        sheet: usize,
        at: u32,
        count: u32,
        options: &EditOptions,
    ) -> Result<EditStats>;

    /// Delete rows with custom options
    fn delete_rows_with_options(
        &mut self,
        sheet: usize,
        at: u32,
        count: u32,
        options: &EditOptions,
    ) -> Result<EditStats>;

    /// Insert columns with custom options
    fn insert_columns_with_options(
        &mut self,
        sheet: usize,
        at: u32,
        count: u32,
        options: &EditOptions,
    ) -> Result<EditStats>;

    /// Delete columns with custom options
    fn delete_columns_with_options(
        &mut self,
        sheet: usize,
        at: u32,
        count: u32,
        options: &EditOptions,
    ) -> Result<EditStats>;
}

impl WorkbookStructureExt for Workbook {
    fn insert_rows(&mut self, sheet: usize, at: u32, count: u32) -> Result<EditStats> {
        self.insert_rows_with_options(sheet, at, count, &EditOptions::default())
    }

    fn delete_rows(&mut self, sheet: usize, at: u32, count: u32) -> Result<EditStats> {
        self.delete_rows_with_options(sheet, at, count, &EditOptions::default())
    }

    fn insert_columns(&mut self, sheet: usize, at: u32, count: u32) -> Result<EditStats> {
        self.insert_columns_with_options(sheet, at, count, &EditOptions::default())
    }

    fn delete_columns(&mut self, sheet: usize, at: u32, count: u32) -> Result<EditStats> {
        self.delete_columns_with_options(sheet, at, count, &EditOptions::default())
    }

    fn insert_rows_with_options(
        &mut self,
        sheet: usize,
        at: u32,
        count: u32,
        options: &EditOptions,
    ) -> Result<EditStats> {
        validate_band(Axis::Row, at, count, false)?;
        apply_shift(self, sheet, ShiftOperation::insert_rows(at, count), options)
    }

    fn delete_rows_with_options(
        &mut self,
        sheet: usize,
        at: u32,
        count: u32,
        options: &EditOptions,
    ) -> Result<EditStats> {
        validate_band(Axis::Row, at, count, true)?;
        apply_shift(self, sheet, ShiftOperation::delete_rows(at, count), options)
    }

    fn insert_columns_with_options(
        &mut self,
        sheet: usize,
        at: u32,
        count: u32,
        options: &EditOptions,
    ) -> Result<EditStats> {
        validate_band(Axis::Column, at, count, false)?;
        apply_shift(self, sheet, ShiftOperation::insert_columns(at, count), options)
    }

    fn delete_columns_with_options(
        &mut self,
        sheet: usize,
        at: u32,
        count: u32,
        options: &EditOptions,
    ) -> Result<EditStats> {
        validate_band(Axis::Column, at, count, true)?;
        apply_shift(self, sheet, ShiftOperation::delete_columns(at, count), options)
    }
}

#[derive(Debug, Clone, Copy)]
enum Axis {
    Row,
    Column,
}

fn validate_band(axis: Axis, at: u32, count: u32, delete: bool) -> Result<()> {
    let (limit, out_of_bounds): (u32, fn(u32, u32) -> Error) = match axis {
        Axis::Row => (MAX_ROWS, Error::RowOutOfBounds),
        Axis::Column => (MAX_COLS, Error::ColumnOutOfBounds),
    };

    if at == 0 || at > limit {
        return Err(out_of_bounds(at, limit));
    }
    if count == 0 || count > limit {
        return Err(out_of_bounds(count, limit));
    }
    if delete {
        let last = u64::from(at) + u64::from(count) - 1;
        if last > u64::from(limit) {
            return Err(out_of_bounds(last.min(u64::from(u32::MAX)) as u32, limit));
        }
    }
    Ok(())
}

fn apply_shift(
    workbook: &mut Workbook,
    sheet: usize,
    op: ShiftOperation,
    options: &EditOptions,
) -> Result<EditStats> {
    let count = workbook.sheet_count();
    let edited = workbook
        .worksheet(sheet)
        .ok_or(Error::SheetOutOfBounds(sheet, count))?
        .name()
        .to_string();

    log::debug!("shifting '{}' by {:?}", edited, op);

    let mut stats = EditStats::default();

    if let Some(ws) = workbook.worksheet_mut(sheet) {
        shift_sheet_contents(ws, &op, &mut stats);
    }

    // Formulas everywhere (or only on the edited sheet)
    for (index, ws) in workbook.worksheets_mut().enumerate() {
        if index != sheet && !options.update_other_sheets {
            continue;
        }
        rewrite_sheet_formulas(ws, &edited, &op, &mut stats);
        shift_hyperlink_targets(ws, &edited, &op);
    }

    if options.update_defined_names {
        let sheet_names: Vec<(u32, String)> = workbook
            .worksheets()
            .map(|ws| (ws.sheet_id(), ws.name().to_string()))
            .collect();
        let active = workbook
            .active_sheet_name()
            .unwrap_or(edited.as_str())
            .to_string();

        for name in workbook.defined_names_mut().iter_mut() {
            let current = match name.scope {
                NameScope::Workbook => active.as_str(),
                NameScope::Sheet(id) => match sheet_names.iter().find(|(sid, _)| *sid == id) {
                    Some((_, n)) => n.as_str(),
                    None => continue,
                },
            };
            let out = shift_formula(&name.refers_to, current, &edited, &op);
            if out.changed() {
                stats.formulas_rewritten += 1;
                stats.references_invalidated += out.invalidated;
                name.refers_to = out.text;
            }
        }
    }

    log::debug!(
        "shift done: {} moved, {} removed, {} rewritten, {} invalidated",
        stats.cells_moved,
        stats.cells_removed,
        stats.formulas_rewritten,
        stats.references_invalidated
    );

    Ok(stats)
}

/// Move cells, default styles and everything anchored to the grid
fn shift_sheet_contents(ws: &mut Worksheet, op: &ShiftOperation, stats: &mut EditStats) {
    let inserting = op.rows.delta > 0 || op.columns.delta > 0;

    if op.rows.is_active() {
        let rows = op.rows;
        let summary = ws.cells_mut().remap_rows(|r| rows.index(r, MAX_ROWS));
        stats.cells_moved += summary.moved;
        stats.cells_removed += summary.removed;
    }
    if op.columns.is_active() {
        let columns = op.columns;
        let summary = ws.cells_mut().remap_columns(|c| columns.index(c, MAX_COLS));
        stats.cells_moved += summary.moved;
        stats.cells_removed += summary.removed;
    }

    if inserting && stats.cells_removed > 0 {
        log::warn!(
            "{} cell(s) on '{}' pushed past the grid limit and dropped",
            stats.cells_removed,
            ws.name()
        );
    }

    ws.merged_regions_mut().retain_mut(|r| match op.range(r) {
        Some(moved) => {
            *r = moved;
            true
        }
        None => false,
    });

    ws.hyperlinks_mut().retain_mut(|h| match op.range(&h.range) {
        Some(moved) => {
            h.range = moved;
            true
        }
        None => false,
    });

    ws.tables_mut().retain_mut(|t| match op.range(&t.range) {
        Some(moved) => {
            t.range = moved;
            true
        }
        None => {
            log::debug!("table '{}' deleted with its rows/columns", t.name);
            false
        }
    });

    let filter = ws.auto_filter_mut();
    *filter = filter.and_then(|r| op.range(&r));

    let markers = std::mem::take(ws.calculation_markers_mut());
    *ws.calculation_markers_mut() = markers
        .into_iter()
        .filter_map(|a| {
            op.cell(a.row, a.column)
                .map(|(row, column)| GridAddress::new(row, column))
        })
        .collect();
}

/// Internal hyperlink targets are references too
fn shift_hyperlink_targets(ws: &mut Worksheet, edited: &str, op: &ShiftOperation) {
    let current = ws.name().to_string();
    for link in ws.hyperlinks_mut() {
        if let HyperlinkTarget::Internal(location) = &mut link.target {
            let out = shift_formula(location, &current, edited, op);
            if out.changed() {
                *location = out.text;
            }
        }
    }
}

fn rewrite_sheet_formulas(
    ws: &mut Worksheet,
    edited: &str,
    op: &ShiftOperation,
    stats: &mut EditStats,
) {
    let current = ws.name().to_string();
    let updates: Vec<(GridAddress, String, usize)> = ws
        .formula_cells()
        .filter_map(|(addr, formula)| {
            let out = shift_formula(formula, &current, edited, op);
            out.changed().then(|| (addr, out.text, out.invalidated))
        })
        .collect();

    for (addr, text, invalidated) in updates {
        log::trace!("{}!{} -> {}", current, addr, text);
        stats.formulas_rewritten += 1;
        stats.references_invalidated += invalidated;
        ws.cells_mut().set_formula_text(addr, text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CellValue, GridRange, Hyperlink, TableRegion};
    use pretty_assertions::assert_eq;

    fn range(s: &str) -> GridRange {
        GridRange::parse(s).unwrap()
    }

    #[test]
    fn test_validate_band() {
        assert!(validate_band(Axis::Row, 0, 1, false).is_err());
        assert!(validate_band(Axis::Row, 1, 0, false).is_err());
        assert!(validate_band(Axis::Row, MAX_ROWS, 1, true).is_ok());
        assert!(validate_band(Axis::Row, MAX_ROWS, 2, true).is_err());
        assert!(matches!(
            validate_band(Axis::Column, MAX_COLS + 1, 1, false),
            Err(Error::ColumnOutOfBounds(..))
        ));
    }

    #[test]
    fn test_unknown_sheet() {
        let mut wb = Workbook::new();
        assert!(matches!(
            wb.insert_rows(3, 1, 1),
            Err(Error::SheetOutOfBounds(3, 1))
        ));
    }

    #[test]
    fn test_delete_rows_moves_cells() {
        let mut wb = Workbook::new();
        let ws = wb.worksheet_mut(0).unwrap();
        ws.set_cell_value("A1", 1.0).unwrap();
        ws.set_cell_value("A2", 2.0).unwrap();
        ws.set_cell_value("A3", 3.0).unwrap();
        ws.set_row_style(3, Some(4)).unwrap();

        let stats = wb.delete_rows(0, 2, 1).unwrap();
        assert_eq!(stats.cells_moved, 1);
        assert_eq!(stats.cells_removed, 1);

        let ws = wb.worksheet(0).unwrap();
        assert_eq!(ws.get_value("A2").unwrap(), CellValue::Number(3.0));
        assert_eq!(ws.get_value("A3").unwrap(), CellValue::Empty);
        assert_eq!(ws.row_style(2), Some(4));
    }

    #[test]
    fn test_regions_follow_edit() {
        let mut wb = Workbook::new();
        let ws = wb.worksheet_mut(0).unwrap();
        ws.merge_cells(&range("B2:C3")).unwrap();
        ws.merge_cells(&range("E5:F5")).unwrap();
        ws.add_table(TableRegion::new("T", range("H1:I10"))).unwrap();
        ws.set_auto_filter(&range("A20:D30")).unwrap();
        ws.add_hyperlink(Hyperlink::internal(range("A40"), "Sheet1!A50"))
            .unwrap();

        wb.delete_rows(0, 5, 1).unwrap();

        let ws = wb.worksheet(0).unwrap();
        // E5:F5 was wholly inside the deleted row
        assert_eq!(ws.merged_regions(), &[range("B2:C3")]);
        assert_eq!(ws.tables()[0].range, range("H1:I9"));
        assert_eq!(ws.auto_filter(), Some(range("A19:D29")));
        assert_eq!(ws.hyperlinks()[0].range, range("A39"));
        assert_eq!(
            ws.hyperlinks()[0].target,
            HyperlinkTarget::Internal("Sheet1!A49".to_string())
        );
    }

    #[test]
    fn test_markers_follow_cells() {
        let mut wb = Workbook::new();
        let ws = wb.worksheet_mut(0).unwrap();
        ws.set_cell_formula("B5", "=SUBTOTAL(9,B1:B4)").unwrap();
        ws.set_cell_formula("C5", "=AGGREGATE(9,4,C1:C4)").unwrap();

        wb.insert_columns(0, 3, 2).unwrap();
        let ws = wb.worksheet(0).unwrap();
        let markers: Vec<_> = ws.calculation_markers().map(|m| m.address).collect();
        assert_eq!(markers, vec![GridAddress::new(5, 2), GridAddress::new(5, 5)]);

        wb.delete_columns(0, 2, 1).unwrap();
        let ws = wb.worksheet(0).unwrap();
        let markers: Vec<_> = ws.calculation_markers().map(|m| m.address).collect();
        assert_eq!(markers, vec![GridAddress::new(5, 4)]);
    }

    #[test]
    fn test_other_sheets_and_names() {
        let mut wb = Workbook::new();
        wb.add_worksheet_with_name("Summary").unwrap();
        wb.worksheet_mut(1)
            .unwrap()
            .set_cell_formula("A1", "=Sheet1!A5+A5")
            .unwrap();
        wb.define_name("Total", "Sheet1!$A$5").unwrap();
        wb.define_name_for_sheet("Local", "$A$5", 1).unwrap();

        let stats = wb.insert_rows(0, 1, 1).unwrap();
        assert_eq!(stats.formulas_rewritten, 2);

        let summary = wb.worksheet(1).unwrap();
        assert_eq!(summary.get_formula_at(GridAddress::new(1, 1)), Some("=Sheet1!A6+A5"));
        assert_eq!(wb.defined_name("Total", 0).unwrap().refers_to, "Sheet1!$A$6");
        // Scoped to Summary, so unqualified references point there
        assert_eq!(wb.defined_name("Local", 1).unwrap().refers_to, "$A$5");
    }

    #[test]
    fn test_options_limit_rewrite() {
        let mut wb = Workbook::new();
        wb.add_worksheet_with_name("Summary").unwrap();
        wb.worksheet_mut(1)
            .unwrap()
            .set_cell_formula("A1", "=Sheet1!A5")
            .unwrap();
        wb.define_name("Total", "Sheet1!A5").unwrap();

        let options = EditOptions {
            update_defined_names: false,
            update_other_sheets: false,
        };
        let stats = wb.insert_rows_with_options(0, 1, 1, &options).unwrap();
        assert_eq!(stats.formulas_rewritten, 0);

        let summary = wb.worksheet(1).unwrap();
        assert_eq!(summary.get_formula_at(GridAddress::new(1, 1)), Some("=Sheet1!A5"));
        assert_eq!(wb.defined_name("Total", 0).unwrap().refers_to, "Sheet1!A5");
    }

    #[test]
    fn test_insert_pushes_cells_off_grid() {
        let mut wb = Workbook::new();
        let ws = wb.worksheet_mut(0).unwrap();
        ws.set_cell_value_at(GridAddress::new(MAX_ROWS, 1), 1.0).unwrap();

        let stats = wb.insert_rows(0, 10, 1).unwrap();
        assert_eq!(stats.cells_removed, 1);
        assert!(wb.worksheet(0).unwrap().is_empty());
    }
}
