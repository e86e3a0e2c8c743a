//! Cell storage implementation
//!
//! This module provides sparse storage for spreadsheet cells. Only cells that
//! carry something (a value, a formula, a non-default style or metadata) are
//! stored, using a row-based BTreeMap structure.

use std::collections::BTreeMap;

use super::{CellValue, GridAddress, GridRange};

/// Complete data for a single cell
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    /// The cell's value (cached result for formula cells)
    pub value: CellValue,
    /// Formula text including the leading `=`
    pub formula: Option<String>,
    /// Index into the workbook style table (0 = default style)
    pub style_index: u32,
    /// Cell metadata index (`cm`)
    pub cell_metadata: Option<u32>,
    /// Value metadata index (`vm`)
    pub value_metadata: Option<u32>,
}

impl Cell {
    /// Create a new cell with a value and default style
    pub fn new(value: CellValue) -> Self {
        Self {
            value,
            ..Self::default()
        }
    }

    /// Create a new cell with a value and style
    pub fn with_style(value: CellValue, style_index: u32) -> Self {
        Self {
            value,
            style_index,
            ..Self::default()
        }
    }

    /// Create a formula cell with no cached value
    pub fn formula<S: Into<String>>(text: S) -> Self {
        Self {
            formula: Some(text.into()),
            ..Self::default()
        }
    }

    /// Create a cell that only carries a style
    pub fn style_only(style_index: u32) -> Self {
        Self {
            style_index,
            ..Self::default()
        }
    }

    /// Check if the cell contains a formula
    pub fn has_formula(&self) -> bool {
        self.formula.is_some()
    }

    /// True when nothing distinguishes this cell from an absent one
    pub fn is_default(&self) -> bool {
        self.value.is_empty()
            && self.formula.is_none()
            && self.style_index == 0
            && self.cell_metadata.is_none()
            && self.value_metadata.is_none()
    }
}

/// Cell and default-style access used by the block transform engine
///
/// The engine only needs these five operations, so alternative stores (for
/// example a store backed by a streaming reader) can plug in here.
pub trait CellStore {
    /// Get the cell at an address, `None` when the cell is empty
    fn cell(&self, addr: GridAddress) -> Option<&Cell>;

    /// Write a cell; writing a default cell removes the entry
    fn set_cell(&mut self, addr: GridAddress, cell: Cell);

    /// Remove a cell, returning what was there
    fn remove_cell(&mut self, addr: GridAddress) -> Option<Cell>;

    /// Default style of a whole row
    fn row_style(&self, row: u32) -> Option<u32>;

    /// Default style of a whole column
    fn column_style(&self, column: u32) -> Option<u32>;
}

/// Counts reported by a row/column remap
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RemapSummary {
    /// Cells that changed position
    pub moved: usize,
    /// Cells dropped because their row/column ceased to exist
    pub removed: usize,
}

/// Sparse row-based storage for worksheet cells
///
/// Structure: `BTreeMap<row, BTreeMap<column, Cell>>`, plus sparse row and
/// column default styles.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellStorage {
    /// Row index → column map
    rows: BTreeMap<u32, BTreeMap<u32, Cell>>,
    /// Row default styles
    row_styles: BTreeMap<u32, u32>,
    /// Column default styles
    column_styles: BTreeMap<u32, u32>,
}

impl CellStorage {
    /// Create a new empty cell storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a cell
    pub fn get(&self, addr: GridAddress) -> Option<&Cell> {
        self.rows.get(&addr.row).and_then(|r| r.get(&addr.column))
    }

    /// Set a cell
    ///
    /// If the cell is default (no value, formula, style or metadata), the
    /// entry is removed instead.
    pub fn set(&mut self, addr: GridAddress, cell: Cell) {
        if cell.is_default() {
            self.remove(addr);
        } else {
            self.rows
                .entry(addr.row)
                .or_default()
                .insert(addr.column, cell);
        }
    }

    /// Modify a cell in place, creating it if needed
    ///
    /// The entry is removed afterwards if the closure left it default.
    pub fn update<F: FnOnce(&mut Cell)>(&mut self, addr: GridAddress, f: F) {
        let mut cell = self.remove(addr).unwrap_or_default();
        f(&mut cell);
        self.set(addr, cell);
    }

    /// Remove a cell
    pub fn remove(&mut self, addr: GridAddress) -> Option<Cell> {
        let row_map = self.rows.get_mut(&addr.row)?;
        let result = row_map.remove(&addr.column);
        if row_map.is_empty() {
            self.rows.remove(&addr.row);
        }
        result
    }

    /// Remove every cell inside a range
    pub fn clear_range(&mut self, range: &GridRange) -> usize {
        let mut removed = 0;
        let rows: Vec<u32> = self
            .rows
            .range(range.start.row..=range.end.row)
            .map(|(&row, _)| row)
            .collect();

        for row in rows {
            if let Some(row_map) = self.rows.get_mut(&row) {
                let cols: Vec<u32> = row_map
                    .range(range.start.column..=range.end.column)
                    .map(|(&col, _)| col)
                    .collect();
                removed += cols.len();
                for col in cols {
                    row_map.remove(&col);
                }
                if row_map.is_empty() {
                    self.rows.remove(&row);
                }
            }
        }

        removed
    }

    /// Clear all cells and default styles
    pub fn clear(&mut self) {
        self.rows.clear();
        self.row_styles.clear();
        self.column_styles.clear();
    }

    /// Get the number of stored cells
    pub fn cell_count(&self) -> usize {
        self.rows.values().map(|r| r.len()).sum()
    }

    /// Check if storage is empty
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Get the bounding range of stored cells
    pub fn used_bounds(&self) -> Option<GridRange> {
        let min_row = *self.rows.keys().next()?;
        let max_row = *self.rows.keys().next_back()?;

        let mut min_col = u32::MAX;
        let mut max_col = 0u32;

        for row_data in self.rows.values() {
            if let Some(&col) = row_data.keys().next() {
                min_col = min_col.min(col);
            }
            if let Some(&col) = row_data.keys().next_back() {
                max_col = max_col.max(col);
            }
        }

        Some(GridRange::from_indices(min_row, min_col, max_row, max_col))
    }

    /// Iterate over all cells in row order
    pub fn iter(&self) -> impl Iterator<Item = (GridAddress, &Cell)> {
        self.rows.iter().flat_map(|(&row, cols)| {
            cols.iter()
                .map(move |(&col, cell)| (GridAddress::new(row, col), cell))
        })
    }

    /// Iterate over the stored cells inside a range, in row order
    pub fn iter_range(&self, range: GridRange) -> impl Iterator<Item = (GridAddress, &Cell)> {
        self.rows
            .range(range.start.row..=range.end.row)
            .flat_map(move |(&row, cols)| {
                cols.range(range.start.column..=range.end.column)
                    .map(move |(&col, cell)| (GridAddress::new(row, col), cell))
            })
    }

    /// Iterate over all formula cells: (address, formula text)
    pub fn formula_cells(&self) -> impl Iterator<Item = (GridAddress, &str)> {
        self.iter()
            .filter_map(|(addr, cell)| cell.formula.as_deref().map(|f| (addr, f)))
    }

    /// Replace formula texts in bulk, leaving everything else untouched
    pub fn set_formula_text(&mut self, addr: GridAddress, text: String) {
        if let Some(cell) = self.rows.get_mut(&addr.row).and_then(|r| r.get_mut(&addr.column)) {
            cell.formula = Some(text);
        }
    }

    // === Default styles ===

    /// Get the default style of a row
    pub fn row_style(&self, row: u32) -> Option<u32> {
        self.row_styles.get(&row).copied()
    }

    /// Set or clear the default style of a row
    pub fn set_row_style(&mut self, row: u32, style_index: Option<u32>) {
        match style_index {
            Some(idx) if idx != 0 => {
                self.row_styles.insert(row, idx);
            }
            _ => {
                self.row_styles.remove(&row);
            }
        }
    }

    /// Get the default style of a column
    pub fn column_style(&self, column: u32) -> Option<u32> {
        self.column_styles.get(&column).copied()
    }

    /// Set or clear the default style of a column
    pub fn set_column_style(&mut self, column: u32, style_index: Option<u32>) {
        match style_index {
            Some(idx) if idx != 0 => {
                self.column_styles.insert(column, idx);
            }
            _ => {
                self.column_styles.remove(&column);
            }
        }
    }

    /// All row default styles (row → style index)
    pub fn row_styles(&self) -> &BTreeMap<u32, u32> {
        &self.row_styles
    }

    /// All column default styles (column → style index)
    pub fn column_styles(&self) -> &BTreeMap<u32, u32> {
        &self.column_styles
    }

    /// Style a cell would render with: cell style, then row style, then
    /// column style, then `None`
    pub fn effective_style(&self, addr: GridAddress) -> Option<u32> {
        self.get(addr)
            .map(|c| c.style_index)
            .filter(|&idx| idx != 0)
            .or_else(|| self.row_style(addr.row))
            .or_else(|| self.column_style(addr.column))
    }

    // === Structural remapping ===

    /// Move every row through `f`; rows mapped to `None` are dropped
    ///
    /// `f` must be strictly increasing over the rows it keeps.
    pub fn remap_rows<F: Fn(u32) -> Option<u32>>(&mut self, f: F) -> RemapSummary {
        let mut summary = RemapSummary::default();
        let rows = std::mem::take(&mut self.rows);

        for (row, cols) in rows {
            match f(row) {
                Some(new_row) => {
                    if new_row != row {
                        summary.moved += cols.len();
                    }
                    self.rows.insert(new_row, cols);
                }
                None => summary.removed += cols.len(),
            }
        }

        self.row_styles = remap_keys(std::mem::take(&mut self.row_styles), &f);
        summary
    }

    /// Move every column through `f`; columns mapped to `None` are dropped
    ///
    /// `f` must be strictly increasing over the columns it keeps.
    pub fn remap_columns<F: Fn(u32) -> Option<u32>>(&mut self, f: F) -> RemapSummary {
        let mut summary = RemapSummary::default();
        let rows = std::mem::take(&mut self.rows);

        for (row, cols) in rows {
            let mut remapped = BTreeMap::new();
            for (col, cell) in cols {
                match f(col) {
                    Some(new_col) => {
                        if new_col != col {
                            summary.moved += 1;
                        }
                        remapped.insert(new_col, cell);
                    }
                    None => summary.removed += 1,
                }
            }
            if !remapped.is_empty() {
                self.rows.insert(row, remapped);
            }
        }

        self.column_styles = remap_keys(std::mem::take(&mut self.column_styles), &f);
        summary
    }
}

fn remap_keys<F: Fn(u32) -> Option<u32>>(map: BTreeMap<u32, u32>, f: &F) -> BTreeMap<u32, u32> {
    map.into_iter()
        .filter_map(|(key, value)| f(key).map(|k| (k, value)))
        .collect()
}

impl CellStore for CellStorage {
    fn cell(&self, addr: GridAddress) -> Option<&Cell> {
        self.get(addr)
    }

    fn set_cell(&mut self, addr: GridAddress, cell: Cell) {
        self.set(addr, cell);
    }

    fn remove_cell(&mut self, addr: GridAddress) -> Option<Cell> {
        self.remove(addr)
    }

    fn row_style(&self, row: u32) -> Option<u32> {
        CellStorage::row_style(self, row)
    }

    fn column_style(&self, column: u32) -> Option<u32> {
        CellStorage::column_style(self, column)
    }
}
