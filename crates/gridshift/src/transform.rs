//! Copy, cut and paste of rectangular blocks
//!
//! A transform takes a source block on one sheet and writes it at a
//! destination anchor on the same sheet, optionally transposed. Cells,
//! merged regions, hyperlinks and calculation markers travel with the block.
//! Copied formulas are offset by the distance each cell travelled; cut
//! formulas keep their text, and every reference into the cut block is
//! re-targeted afterwards.
//!
//! # Example
//!
//! ```rust
//! use gridshift::prelude::*;
//!
//! let mut workbook = Workbook::new();
//! let sheet = workbook.worksheet_mut(0).unwrap();
//! sheet.set_cell_value("A1", 1.0).unwrap();
//! sheet.set_cell_formula("A2", "=A1*2").unwrap();
//!
//! let source = GridRange::parse("A1:A2").unwrap();
//! let destination = GridAddress::new(1, 3);
//! assert!(workbook.transform(0, source, destination, TransformMode::Copy, PasteOption::Paste));
//!
//! let sheet = workbook.worksheet(0).unwrap();
//! assert_eq!(sheet.get_formula_at(GridAddress::new(2, 3)), Some("=C1*2"));
//! ```

use std::collections::BTreeMap;

use gridshift_core::{
    Cell, CellStore, CellValue, GridAddress, GridRange, InternTable, Worksheet, MAX_COLS,
    MAX_ROWS,
};
use gridshift_refs::{move_block_references, offset_formula};

use crate::{Hyperlink, HyperlinkTarget, NameScope, Workbook};

/// Whether the source survives the transform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformMode {
    /// Move the block; the source is vacated
    Cut,
    /// Duplicate the block
    Copy,
}

/// What part of each cell is written at the destination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasteOption {
    /// Whole cell
    Paste,
    /// Values only; formulas are dropped
    Values,
    /// Formulas (or constants) without formatting
    Formulas,
    /// Style only
    Formatting,
    /// Whole cell, rows and columns swapped
    Transpose,
}

impl PasteOption {
    fn replaces_footprint(self) -> bool {
        matches!(self, PasteOption::Paste | PasteOption::Transpose)
    }

    fn moves_merges(self) -> bool {
        matches!(
            self,
            PasteOption::Paste | PasteOption::Transpose | PasteOption::Formatting
        )
    }

    fn moves_hyperlinks(self) -> bool {
        self.replaces_footprint()
    }

    fn moves_markers(self) -> bool {
        matches!(
            self,
            PasteOption::Paste | PasteOption::Transpose | PasteOption::Formulas
        )
    }

    fn writes_placeholders(self) -> bool {
        matches!(
            self,
            PasteOption::Paste | PasteOption::Transpose | PasteOption::Formatting
        )
    }
}

/// Extension trait for Workbook to add block transforms
pub trait WorkbookTransformExt {
    /// Copy or move `source` on the sheet at `sheet` to `destination`
    ///
    /// Returns `false`, leaving the workbook untouched, when the sheet does
    /// not exist, an address lies off the grid, the destination equals the
    /// source anchor, a non-transposed block would leave the grid, or a
    /// merged region straddles the source or destination footprint.
    fn transform(
        &mut self,
        sheet: usize,
        source: GridRange,
        destination: GridAddress,
        mode: TransformMode,
        option: PasteOption,
    ) -> bool;
}

/// Source-to-destination address mapping
#[derive(Debug, Clone, Copy)]
struct BlockMapping {
    source: GridRange,
    destination: GridAddress,
    transpose: bool,
}

impl BlockMapping {
    fn map(&self, addr: GridAddress) -> Option<GridAddress> {
        let dr = addr.row.checked_sub(self.source.start.row)?;
        let dc = addr.column.checked_sub(self.source.start.column)?;
        let (dr, dc) = if self.transpose { (dc, dr) } else { (dr, dc) };
        let mapped = GridAddress::new(
            self.destination.row.checked_add(dr)?,
            self.destination.column.checked_add(dc)?,
        );
        mapped.is_valid().then_some(mapped)
    }

    fn map_range(&self, range: &GridRange) -> Option<GridRange> {
        Some(GridRange::new(self.map(range.start)?, self.map(range.end)?))
    }

    /// Destination extent; `None` when an untransposed block leaves the grid
    fn footprint(&self) -> Option<GridRange> {
        let (rows, columns) = if self.transpose {
            (self.source.column_count(), self.source.row_count())
        } else {
            (self.source.row_count(), self.source.column_count())
        };
        let end_row = u64::from(self.destination.row) + u64::from(rows) - 1;
        let end_col = u64::from(self.destination.column) + u64::from(columns) - 1;

        if self.transpose {
            Some(GridRange::from_indices(
                self.destination.row,
                self.destination.column,
                end_row.min(u64::from(MAX_ROWS)) as u32,
                end_col.min(u64::from(MAX_COLS)) as u32,
            ))
        } else if end_row > u64::from(MAX_ROWS) || end_col > u64::from(MAX_COLS) {
            None
        } else {
            Some(GridRange::from_indices(
                self.destination.row,
                self.destination.column,
                end_row as u32,
                end_col as u32,
            ))
        }
    }
}

/// What is read from the source before anything is written
struct Snapshot {
    cells: Vec<(GridAddress, Cell)>,
    placeholders: BTreeMap<GridAddress, u32>,
    merges: Vec<GridRange>,
    hyperlinks: Vec<Hyperlink>,
    markers: Vec<GridAddress>,
}

impl Snapshot {
    fn take(ws: &Worksheet, source: &GridRange) -> Self {
        let cells: Vec<(GridAddress, Cell)> = ws
            .cells()
            .iter_range(*source)
            .map(|(addr, cell)| (addr, cell.clone()))
            .collect();

        Self {
            placeholders: style_placeholders(ws, source, &cells),
            merges: ws
                .merged_regions()
                .iter()
                .filter(|m| source.contains_range(m))
                .copied()
                .collect(),
            hyperlinks: ws
                .hyperlinks()
                .iter()
                .filter(|h| source.contains_range(&h.range))
                .cloned()
                .collect(),
            markers: ws
                .calculation_markers()
                .map(|m| m.address)
                .filter(|a| source.contains(a))
                .collect(),
            cells,
        }
    }
}

/// Styles that empty source cells inherit from their row, then column
fn style_placeholders(
    ws: &Worksheet,
    source: &GridRange,
    cells: &[(GridAddress, Cell)],
) -> BTreeMap<GridAddress, u32> {
    let store = ws.cells();
    let mut placeholders = BTreeMap::new();

    for (&row, &style) in store.row_styles().range(source.start.row..=source.end.row) {
        for column in source.start.column..=source.end.column {
            placeholders.insert(GridAddress::new(row, column), style);
        }
    }
    for (&column, &style) in store
        .column_styles()
        .range(source.start.column..=source.end.column)
    {
        for row in source.start.row..=source.end.row {
            placeholders
                .entry(GridAddress::new(row, column))
                .or_insert(style);
        }
    }

    for (addr, _) in cells {
        placeholders.remove(addr);
    }
    placeholders
}

fn intern_shared(strings: &mut InternTable<String>, text: &str) -> u32 {
    match strings.index_of_str(text) {
        Some(idx) => idx,
        None => strings.intern(text.to_string()),
    }
}

/// Write one source cell at its destination according to `option`
fn place_cell<S: CellStore>(
    store: &mut S,
    dest: GridAddress,
    source: &Cell,
    formula: Option<String>,
    option: PasteOption,
    strings: &mut InternTable<String>,
) {
    let mut cell = store.cell(dest).cloned().unwrap_or_default();

    match option {
        PasteOption::Paste | PasteOption::Transpose => {
            cell = Cell {
                formula,
                ..source.clone()
            };
        }
        PasteOption::Values => {
            cell.value = match &source.value {
                CellValue::InlineString(text) => {
                    CellValue::SharedString(intern_shared(strings, text))
                }
                other => other.clone(),
            };
            cell.formula = None;
        }
        PasteOption::Formulas => match formula {
            Some(text) => {
                cell.formula = Some(text);
                cell.value = CellValue::Empty;
            }
            None => {
                cell.formula = None;
                cell.value = source.value.clone();
            }
        },
        PasteOption::Formatting => {
            cell.style_index = source.style_index;
        }
    }

    store.set_cell(dest, cell);
}

/// Write a style-only placeholder for an empty source cell
fn place_placeholder<S: CellStore>(store: &mut S, dest: GridAddress, style: u32) {
    let mut cell = store.cell(dest).cloned().unwrap_or_default();
    cell.style_index = style;
    store.set_cell(dest, cell);
}

/// Clear the destination footprint ahead of writing
fn prepare_footprint(ws: &mut Worksheet, footprint: &GridRange, option: PasteOption) {
    if option.moves_merges() {
        ws.merged_regions_mut()
            .retain(|m| !footprint.contains_range(m));
    }

    match option {
        PasteOption::Paste | PasteOption::Transpose => {
            ws.clear_range(footprint);
            ws.hyperlinks_mut()
                .retain(|h| !footprint.contains_range(&h.range));
        }
        PasteOption::Values | PasteOption::Formulas => {
            let styles: Vec<(GridAddress, u32)> = ws
                .cells()
                .iter_range(*footprint)
                .map(|(addr, cell)| (addr, cell.style_index))
                .collect();
            for (addr, style) in styles {
                ws.cells_mut().set_cell(addr, Cell::style_only(style));
            }
            ws.calculation_markers_mut()
                .retain(|a| !footprint.contains(a));
        }
        PasteOption::Formatting => {
            let styled: Vec<GridAddress> = ws
                .cells()
                .iter_range(*footprint)
                .filter(|(_, cell)| cell.style_index != 0)
                .map(|(addr, _)| addr)
                .collect();
            for addr in styled {
                ws.cells_mut().update(addr, |cell| cell.style_index = 0);
            }
        }
    }
}

impl WorkbookTransformExt for Workbook {
    fn transform(
        &mut self,
        sheet: usize,
        source: GridRange,
        destination: GridAddress,
        mode: TransformMode,
        option: PasteOption,
    ) -> bool {
        let source = GridRange::new(source.start, source.end);
        if source.validate().is_err() || destination.validate().is_err() {
            log::debug!("transform rejected: address off the grid");
            return false;
        }
        if source.start == destination {
            log::debug!("transform rejected: destination equals source anchor");
            return false;
        }

        let mapping = BlockMapping {
            source,
            destination,
            transpose: option == PasteOption::Transpose,
        };
        let Some(footprint) = mapping.footprint() else {
            log::debug!("transform rejected: {} at {} leaves the grid", source, destination);
            return false;
        };

        let active = self.active_sheet_name().map(str::to_string);
        let (sheets, names, strings) = self.parts_mut();
        let Some(ws) = sheets.get_mut(sheet) else {
            log::debug!("transform rejected: no sheet at index {}", sheet);
            return false;
        };

        let cut = mode == TransformMode::Cut;
        let vacated_merge = |m: &GridRange| cut && option.moves_merges() && source.contains_range(m);
        let straddles = ws.merged_regions().iter().any(|m| {
            (m.overlaps(&source) && !source.contains_range(m))
                || (m.overlaps(&footprint) && !footprint.contains_range(m) && !vacated_merge(m))
        });
        if straddles {
            log::debug!("transform rejected: merged region straddles {} or {}", source, footprint);
            return false;
        }

        log::debug!(
            "{:?}/{:?} {}!{} -> {}",
            mode,
            option,
            ws.name(),
            source,
            footprint
        );

        let snapshot = Snapshot::take(ws, &source);

        if cut {
            ws.clear_range(&source);
            if option.moves_merges() {
                ws.merged_regions_mut()
                    .retain(|m| !source.contains_range(m));
            }
            if option.moves_hyperlinks() {
                ws.hyperlinks_mut()
                    .retain(|h| !source.contains_range(&h.range));
            }
        }

        prepare_footprint(ws, &footprint, option);

        for (src, cell) in &snapshot.cells {
            let Some(dest) = mapping.map(*src) else {
                log::trace!("{} transposed off the grid", src);
                continue;
            };
            let formula = match (&cell.formula, mode) {
                (Some(text), TransformMode::Copy) => {
                    let dr = i64::from(dest.row) - i64::from(src.row);
                    let dc = i64::from(dest.column) - i64::from(src.column);
                    Some(offset_formula(text, dr, dc).text)
                }
                (formula, _) => formula.clone(),
            };
            place_cell(ws.cells_mut(), dest, cell, formula, option, strings);
        }

        if option.writes_placeholders() {
            for (&src, &style) in &snapshot.placeholders {
                if let Some(dest) = mapping.map(src) {
                    place_placeholder(ws.cells_mut(), dest, style);
                }
            }
        }

        if option.moves_merges() {
            for merge in &snapshot.merges {
                let Some(moved) = mapping.map_range(merge) else {
                    continue;
                };
                if ws.merged_regions().iter().any(|m| m.overlaps(&moved)) {
                    log::warn!("merged region {} collides at {}; skipped", merge, moved);
                    continue;
                }
                ws.merged_regions_mut().push(moved);
            }
        }

        if option.moves_hyperlinks() {
            for link in &snapshot.hyperlinks {
                if let Some(range) = mapping.map_range(&link.range) {
                    ws.hyperlinks_mut().push(Hyperlink {
                        range,
                        ..link.clone()
                    });
                }
            }
        }

        if option.moves_markers() {
            for src in &snapshot.markers {
                if let Some(dest) = mapping.map(*src) {
                    if ws.get_formula_at(dest).is_some() {
                        ws.calculation_markers_mut().insert(dest);
                    }
                }
            }
        }

        if cut {
            let moved_sheet = ws.name().to_string();
            let map = |a: GridAddress| mapping.map(a);

            for ws in sheets.iter_mut() {
                retarget_sheet(ws, &moved_sheet, &source, &map);
            }

            for name in names.iter_mut() {
                let current = match name.scope {
                    NameScope::Workbook => active.as_deref(),
                    NameScope::Sheet(id) => sheets
                        .iter()
                        .find(|ws| ws.sheet_id() == id)
                        .map(|ws| ws.name()),
                };
                let Some(current) = current else {
                    continue;
                };
                let out = move_block_references(&name.refers_to, current, &moved_sheet, &source, map);
                if out.changed() {
                    name.refers_to = out.text;
                }
            }
        }

        true
    }
}

/// Point references into a cut block at its new position
fn retarget_sheet<F>(ws: &mut Worksheet, moved_sheet: &str, block: &GridRange, map: &F)
where
    F: Fn(GridAddress) -> Option<GridAddress>,
{
    let current = ws.name().to_string();
    let updates: Vec<(GridAddress, String)> = ws
        .formula_cells()
        .filter_map(|(addr, formula)| {
            let out = move_block_references(formula, &current, moved_sheet, block, map);
            out.changed().then_some((addr, out.text))
        })
        .collect();

    for (addr, text) in updates {
        ws.cells_mut().set_formula_text(addr, text);
    }

    for link in ws.hyperlinks_mut() {
        if let HyperlinkTarget::Internal(location) = &mut link.target {
            let out = move_block_references(location, &current, moved_sheet, block, map);
            if out.changed() {
                *location = out.text;
            }
        }
    }
}
