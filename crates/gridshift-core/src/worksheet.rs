//! Worksheet type

use std::collections::BTreeSet;

use crate::cell::{Cell, CellStorage, CellValue, GridAddress, GridRange};
use crate::error::{Error, Result};
use crate::hyperlink::Hyperlink;
use crate::marker::{needs_marker, CalculationMarker};
use crate::table::TableRegion;

/// A worksheet (single sheet in a workbook)
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Worksheet {
    /// Sheet name
    name: String,
    /// Stable id, unaffected by sheet reordering
    sheet_id: u32,
    /// Cell storage
    cells: CellStorage,
    /// Merged regions; pairwise disjoint
    merged_regions: Vec<GridRange>,
    /// Hyperlink anchors
    hyperlinks: Vec<Hyperlink>,
    /// Table regions
    tables: Vec<TableRegion>,
    /// Sheet-level autofilter range
    auto_filter: Option<GridRange>,
    /// Cells holding table-aggregate formulas
    calc_markers: BTreeSet<GridAddress>,
}

impl Worksheet {
    /// Create a new worksheet with the given name and id
    pub fn new<S: Into<String>>(name: S, sheet_id: u32) -> Self {
        Self {
            name: name.into(),
            sheet_id,
            cells: CellStorage::new(),
            merged_regions: Vec::new(),
            hyperlinks: Vec::new(),
            tables: Vec::new(),
            auto_filter: None,
            calc_markers: BTreeSet::new(),
        }
    }

    /// Get the sheet name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the sheet name (validation happens at the workbook level)
    pub(crate) fn set_name<S: Into<String>>(&mut self, name: S) {
        self.name = name.into();
    }

    /// Get the stable sheet id
    pub fn sheet_id(&self) -> u32 {
        self.sheet_id
    }

    // === Cell Access ===

    /// Get a cell by address string (e.g., "A1")
    pub fn cell(&self, address: &str) -> Result<Option<&Cell>> {
        let addr = GridAddress::parse(address)?;
        Ok(self.cells.get(addr))
    }

    /// Get a cell by address
    pub fn cell_at(&self, addr: GridAddress) -> Option<&Cell> {
        self.cells.get(addr)
    }

    /// Get a cell value (Empty for absent cells)
    pub fn get_value(&self, address: &str) -> Result<CellValue> {
        let addr = GridAddress::parse(address)?;
        Ok(self.get_value_at(addr))
    }

    /// Get a cell value by address
    pub fn get_value_at(&self, addr: GridAddress) -> CellValue {
        self.cells
            .get(addr)
            .map(|c| c.value.clone())
            .unwrap_or_default()
    }

    /// Get the formula text at a cell, if any
    pub fn get_formula_at(&self, addr: GridAddress) -> Option<&str> {
        self.cells.get(addr).and_then(|c| c.formula.as_deref())
    }

    /// Get a cell's style index (0 when absent or default)
    pub fn cell_style_index_at(&self, addr: GridAddress) -> u32 {
        self.cells.get(addr).map(|c| c.style_index).unwrap_or(0)
    }

    // === Cell Modification ===

    /// Set a cell value by address string
    pub fn set_cell_value<V: Into<CellValue>>(&mut self, address: &str, value: V) -> Result<()> {
        let addr = GridAddress::parse(address)?;
        self.set_cell_value_at(addr, value)
    }

    /// Set a cell value, replacing any formula and keeping the style
    pub fn set_cell_value_at<V: Into<CellValue>>(&mut self, addr: GridAddress, value: V) -> Result<()> {
        addr.validate()?;
        let value = value.into();
        self.cells.update(addr, |cell| {
            cell.value = value;
            cell.formula = None;
        });
        self.calc_markers.remove(&addr);
        Ok(())
    }

    /// Set a cell formula by address string
    pub fn set_cell_formula(&mut self, address: &str, formula: &str) -> Result<()> {
        let addr = GridAddress::parse(address)?;
        self.set_cell_formula_at(addr, formula)
    }

    /// Set a cell formula, clearing the cached value
    ///
    /// Table-aggregate formulas record a calculation marker for the cell.
    pub fn set_cell_formula_at(&mut self, addr: GridAddress, formula: &str) -> Result<()> {
        addr.validate()?;

        let formula = if formula.starts_with('=') {
            formula.to_string()
        } else {
            format!("={}", formula)
        };

        if needs_marker(&formula) {
            self.calc_markers.insert(addr);
        } else {
            self.calc_markers.remove(&addr);
        }

        self.cells.update(addr, |cell| {
            cell.formula = Some(formula);
            cell.value = CellValue::Empty;
        });
        Ok(())
    }

    /// Store the cached result of a formula cell
    pub fn set_formula_result(&mut self, addr: GridAddress, value: CellValue) -> Result<()> {
        match self.cells.get(addr) {
            Some(cell) if cell.has_formula() => {
                self.cells.update(addr, |cell| cell.value = value);
                Ok(())
            }
            _ => Err(Error::InvalidAddress(format!(
                "{} does not hold a formula",
                addr
            ))),
        }
    }

    /// Set a cell style index by address string
    pub fn set_cell_style(&mut self, address: &str, style_index: u32) -> Result<()> {
        let addr = GridAddress::parse(address)?;
        self.set_cell_style_at(addr, style_index)
    }

    /// Set a cell style index
    pub fn set_cell_style_at(&mut self, addr: GridAddress, style_index: u32) -> Result<()> {
        addr.validate()?;
        self.cells.update(addr, |cell| cell.style_index = style_index);
        Ok(())
    }

    /// Clear a cell
    pub fn clear_cell(&mut self, address: &str) -> Result<()> {
        let addr = GridAddress::parse(address)?;
        self.clear_cell_at(addr);
        Ok(())
    }

    /// Clear a cell by address
    pub fn clear_cell_at(&mut self, addr: GridAddress) {
        self.cells.remove(addr);
        self.calc_markers.remove(&addr);
    }

    // === Row/Column default styles ===

    /// Get the default style of a row
    pub fn row_style(&self, row: u32) -> Option<u32> {
        self.cells.row_style(row)
    }

    /// Set or clear the default style of a row
    pub fn set_row_style(&mut self, row: u32, style_index: Option<u32>) -> Result<()> {
        GridAddress::try_new(row, 1)?;
        self.cells.set_row_style(row, style_index);
        Ok(())
    }

    /// Get the default style of a column
    pub fn column_style(&self, column: u32) -> Option<u32> {
        self.cells.column_style(column)
    }

    /// Set or clear the default style of a column
    pub fn set_column_style(&mut self, column: u32, style_index: Option<u32>) -> Result<()> {
        GridAddress::try_new(1, column)?;
        self.cells.set_column_style(column, style_index);
        Ok(())
    }

    // === Range Operations ===

    /// Get the used range (bounds of all stored cells)
    pub fn used_range(&self) -> Option<GridRange> {
        self.cells.used_bounds()
    }

    /// Clear all cells in a range
    pub fn clear_range(&mut self, range: &GridRange) {
        self.cells.clear_range(range);
        self.calc_markers.retain(|addr| !range.contains(addr));
    }

    // === Merged Cells ===

    /// Get merged regions
    pub fn merged_regions(&self) -> &[GridRange] {
        &self.merged_regions
    }

    /// Merge cells
    ///
    /// Fails with [`Error::Overlap`] when the range touches an existing
    /// merged region or a table.
    pub fn merge_cells(&mut self, range: &GridRange) -> Result<()> {
        range.validate()?;
        check_overlap("Merged region", range, self.merged_regions.iter())?;
        check_overlap("Merged region", range, self.tables.iter().map(|t| &t.range))?;
        self.merged_regions.push(*range);
        Ok(())
    }

    /// Unmerge cells; returns whether the region existed
    pub fn unmerge_cells(&mut self, range: &GridRange) -> bool {
        let before = self.merged_regions.len();
        self.merged_regions.retain(|r| r != range);
        self.merged_regions.len() != before
    }

    /// The merged region containing an address, if any
    pub fn merged_region_at(&self, addr: GridAddress) -> Option<&GridRange> {
        self.merged_regions.iter().find(|r| r.contains(&addr))
    }

    /// Mutable access for structural edits
    pub fn merged_regions_mut(&mut self) -> &mut Vec<GridRange> {
        &mut self.merged_regions
    }

    // === Tables and autofilter ===

    /// Get table regions
    pub fn tables(&self) -> &[TableRegion] {
        &self.tables
    }

    /// Add a table
    ///
    /// Fails when the name is taken on this sheet or the range overlaps
    /// another table, a merged region or the sheet autofilter.
    pub fn add_table(&mut self, table: TableRegion) -> Result<()> {
        table.range.validate()?;
        if self
            .tables
            .iter()
            .any(|t| t.name.eq_ignore_ascii_case(&table.name))
        {
            return Err(Error::DuplicateTable(table.name));
        }
        check_overlap("Table", &table.range, self.tables.iter().map(|t| &t.range))?;
        check_overlap("Table", &table.range, self.merged_regions.iter())?;
        check_overlap("Table", &table.range, self.auto_filter.iter())?;
        self.tables.push(table);
        Ok(())
    }

    /// Remove a table by name (case-insensitive)
    pub fn remove_table(&mut self, name: &str) -> Option<TableRegion> {
        let pos = self
            .tables
            .iter()
            .position(|t| t.name.eq_ignore_ascii_case(name))?;
        Some(self.tables.remove(pos))
    }

    /// Mutable access for structural edits
    pub fn tables_mut(&mut self) -> &mut Vec<TableRegion> {
        &mut self.tables
    }

    /// Get the autofilter range
    pub fn auto_filter(&self) -> Option<GridRange> {
        self.auto_filter
    }

    /// Set the autofilter range; it may not overlap a table
    pub fn set_auto_filter(&mut self, range: &GridRange) -> Result<()> {
        range.validate()?;
        check_overlap("Autofilter", range, self.tables.iter().map(|t| &t.range))?;
        self.auto_filter = Some(*range);
        Ok(())
    }

    /// Remove the autofilter
    pub fn clear_auto_filter(&mut self) -> Option<GridRange> {
        self.auto_filter.take()
    }

    /// Mutable access for structural edits
    pub fn auto_filter_mut(&mut self) -> &mut Option<GridRange> {
        &mut self.auto_filter
    }

    // === Hyperlinks ===

    /// Get hyperlinks
    pub fn hyperlinks(&self) -> &[Hyperlink] {
        &self.hyperlinks
    }

    /// Add a hyperlink
    pub fn add_hyperlink(&mut self, hyperlink: Hyperlink) -> Result<()> {
        hyperlink.range.validate()?;
        self.hyperlinks.push(hyperlink);
        Ok(())
    }

    /// Mutable access for structural edits
    pub fn hyperlinks_mut(&mut self) -> &mut Vec<Hyperlink> {
        &mut self.hyperlinks
    }

    // === Calculation markers ===

    /// Iterate over calculation markers in address order
    pub fn calculation_markers(&self) -> impl Iterator<Item = CalculationMarker> + '_ {
        let sheet_id = self.sheet_id;
        self.calc_markers
            .iter()
            .map(move |&addr| CalculationMarker::new(sheet_id, addr))
    }

    /// Check whether a cell carries a marker
    pub fn has_calculation_marker(&self, addr: GridAddress) -> bool {
        self.calc_markers.contains(&addr)
    }

    /// Mutable access for moves and structural edits
    pub fn calculation_markers_mut(&mut self) -> &mut BTreeSet<GridAddress> {
        &mut self.calc_markers
    }

    // === Iteration ===

    /// Get the number of stored cells
    pub fn cell_count(&self) -> usize {
        self.cells.cell_count()
    }

    /// Check if the worksheet has no cells
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Iterate over all stored cells in row order
    pub fn iter_cells(&self) -> impl Iterator<Item = (GridAddress, &Cell)> {
        self.cells.iter()
    }

    /// Iterate over all formula cells: (address, formula_text)
    pub fn formula_cells(&self) -> impl Iterator<Item = (GridAddress, &str)> {
        self.cells.formula_cells()
    }

    /// The underlying cell store
    pub fn cells(&self) -> &CellStorage {
        &self.cells
    }

    /// Mutable access to the underlying cell store
    pub fn cells_mut(&mut self) -> &mut CellStorage {
        &mut self.cells
    }
}

fn check_overlap<'a, I>(kind: &'static str, range: &GridRange, existing: I) -> Result<()>
where
    I: IntoIterator<Item = &'a GridRange>,
{
    match existing.into_iter().find(|r| r.overlaps(range)) {
        Some(hit) => Err(Error::Overlap {
            kind,
            range: range.to_string(),
            existing: hit.to_string(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(s: &str) -> GridRange {
        GridRange::parse(s).unwrap()
    }

    #[test]
    fn test_set_and_get_values() {
        let mut sheet = Worksheet::new("Sheet1", 1);
        sheet.set_cell_value("A1", 42.0).unwrap();
        sheet.set_cell_value("B2", true).unwrap();

        assert_eq!(sheet.get_value("A1").unwrap(), CellValue::Number(42.0));
        assert_eq!(sheet.get_value("B2").unwrap(), CellValue::Boolean(true));
        assert_eq!(sheet.get_value("C3").unwrap(), CellValue::Empty);
        assert_eq!(sheet.cell_count(), 2);
    }

    #[test]
    fn test_formula_prefix_and_cached_value() {
        let mut sheet = Worksheet::new("Sheet1", 1);
        sheet.set_cell_formula("C1", "A1+B1").unwrap();

        let c1 = GridAddress::new(1, 3);
        assert_eq!(sheet.get_formula_at(c1), Some("=A1+B1"));

        sheet.set_formula_result(c1, CellValue::Number(3.0)).unwrap();
        assert_eq!(sheet.get_value_at(c1), CellValue::Number(3.0));

        // Plain values have no formula to cache for
        sheet.set_cell_value("D1", 1.0).unwrap();
        assert!(sheet
            .set_formula_result(GridAddress::new(1, 4), CellValue::Number(2.0))
            .is_err());
    }

    #[test]
    fn test_value_replaces_formula_keeps_style() {
        let mut sheet = Worksheet::new("Sheet1", 1);
        sheet.set_cell_style("A1", 4).unwrap();
        sheet.set_cell_formula("A1", "=B1").unwrap();
        sheet.set_cell_value("A1", 7.0).unwrap();

        let cell = sheet.cell("A1").unwrap().unwrap();
        assert_eq!(cell.formula, None);
        assert_eq!(cell.style_index, 4);
    }

    #[test]
    fn test_aggregate_formula_records_marker() {
        let mut sheet = Worksheet::new("Data", 7);
        sheet.set_cell_formula("A10", "=subtotal(9,A1:A9)").unwrap();
        sheet.set_cell_formula("B10", "=SUM(B1:B9)").unwrap();

        let markers: Vec<_> = sheet.calculation_markers().collect();
        assert_eq!(markers, vec![CalculationMarker::new(7, GridAddress::new(10, 1))]);

        // Overwriting with a plain formula drops the marker
        sheet.set_cell_formula("A10", "=SUM(A1:A9)").unwrap();
        assert_eq!(sheet.calculation_markers().count(), 0);
    }

    #[test]
    fn test_merge_overlap_rejected() {
        let mut sheet = Worksheet::new("Sheet1", 1);
        sheet.merge_cells(&range("A1:B2")).unwrap();

        let err = sheet.merge_cells(&range("B2:C3")).unwrap_err();
        assert!(matches!(err, Error::Overlap { kind: "Merged region", .. }));

        // Touching edges do not overlap
        sheet.merge_cells(&range("C1:D2")).unwrap();
        assert_eq!(sheet.merged_regions().len(), 2);
        assert_eq!(sheet.merged_region_at(GridAddress::new(2, 4)), Some(&range("C1:D2")));

        assert!(sheet.unmerge_cells(&range("A1:B2")));
        assert!(!sheet.unmerge_cells(&range("A1:B2")));
    }

    #[test]
    fn test_table_and_filter_overlap() {
        let mut sheet = Worksheet::new("Sheet1", 1);
        sheet
            .add_table(TableRegion::new("Sales", range("A1:D10")))
            .unwrap();

        assert!(matches!(
            sheet.add_table(TableRegion::new("sales", range("F1:G2"))),
            Err(Error::DuplicateTable(_))
        ));
        assert!(sheet
            .add_table(TableRegion::new("Other", range("D10:E12")))
            .is_err());
        assert!(sheet.merge_cells(&range("B2:C2")).is_err());
        assert!(sheet.set_auto_filter(&range("C5:H5")).is_err());

        sheet.set_auto_filter(&range("F1:H20")).unwrap();
        assert!(sheet
            .add_table(TableRegion::new("Late", range("G3:G4")))
            .is_err());

        assert!(sheet.remove_table("SALES").is_some());
        assert!(sheet.tables().is_empty());
    }

    #[test]
    fn test_row_and_column_styles() {
        let mut sheet = Worksheet::new("Sheet1", 1);
        sheet.set_row_style(3, Some(2)).unwrap();
        sheet.set_column_style(5, Some(6)).unwrap();

        assert_eq!(sheet.row_style(3), Some(2));
        assert_eq!(sheet.column_style(5), Some(6));
        assert!(sheet.set_row_style(0, Some(1)).is_err());
        assert!(sheet.set_column_style(16_385, Some(1)).is_err());
    }

    #[test]
    fn test_used_range_and_clear() {
        let mut sheet = Worksheet::new("Sheet1", 1);
        assert!(sheet.used_range().is_none());

        sheet.set_cell_value("B2", 1.0).unwrap();
        sheet.set_cell_formula("D5", "=SUBTOTAL(9,B2)").unwrap();
        assert_eq!(sheet.used_range(), Some(range("B2:D5")));

        sheet.clear_range(&range("A1:D5"));
        assert!(sheet.is_empty());
        assert_eq!(sheet.calculation_markers().count(), 0);
    }
}
