//! Tests for copy, cut, paste and transpose of cell blocks

use gridshift::prelude::*;
use gridshift::{Cell, HyperlinkTarget, MAX_COLS};
use pretty_assertions::assert_eq;

fn addr(s: &str) -> GridAddress {
    GridAddress::parse(s).unwrap()
}

fn range(s: &str) -> GridRange {
    GridRange::parse(s).unwrap()
}

/// Cutting a block moves values and relocates its merged region
#[test]
fn test_cut_moves_values_and_merge() {
    let mut wb = Workbook::new();
    let sheet = wb.worksheet_mut(0).unwrap();
    sheet.set_cell_value("B2", 1.0).unwrap();
    sheet.set_cell_value("C2", 2.0).unwrap();
    sheet.set_cell_value("B3", 3.0).unwrap();
    sheet.set_cell_value("C3", 4.0).unwrap();
    sheet.merge_cells(&range("B2:C2")).unwrap();

    assert!(wb.transform(
        0,
        range("B2:C3"),
        addr("E5"),
        TransformMode::Cut,
        PasteOption::Paste
    ));

    let sheet = wb.worksheet(0).unwrap();
    assert_eq!(sheet.get_value("E5").unwrap(), CellValue::Number(1.0));
    assert_eq!(sheet.get_value("F5").unwrap(), CellValue::Number(2.0));
    assert_eq!(sheet.get_value("E6").unwrap(), CellValue::Number(3.0));
    assert_eq!(sheet.get_value("F6").unwrap(), CellValue::Number(4.0));
    assert_eq!(sheet.cell_count(), 4);
    assert_eq!(sheet.merged_regions(), &[range("E5:F5")]);
}

#[test]
fn test_copy_keeps_source() {
    let mut wb = Workbook::new();
    let sheet = wb.worksheet_mut(0).unwrap();
    sheet.set_cell_value("A1", "north").unwrap();
    sheet.merge_cells(&range("A1:B1")).unwrap();
    sheet
        .add_hyperlink(Hyperlink::external(range("A1"), "https://example.com"))
        .unwrap();

    assert!(wb.transform(
        0,
        range("A1:B1"),
        addr("A4"),
        TransformMode::Copy,
        PasteOption::Paste
    ));

    let sheet = wb.worksheet(0).unwrap();
    assert_eq!(sheet.get_value("A1").unwrap(), sheet.get_value("A4").unwrap());
    assert_eq!(sheet.merged_regions(), &[range("A1:B1"), range("A4:B4")]);
    let anchors: Vec<_> = sheet.hyperlinks().iter().map(|h| h.range).collect();
    assert_eq!(anchors, vec![range("A1"), range("A4")]);
}

/// A full paste leaves nothing of the old destination content behind
#[test]
fn test_paste_clears_footprint() {
    let mut wb = Workbook::new();
    let sheet = wb.worksheet_mut(0).unwrap();
    sheet.set_cell_value("A1", 1.0).unwrap();
    sheet.set_cell_value("D1", 10.0).unwrap();
    sheet.set_cell_value("D2", 20.0).unwrap();
    sheet.set_cell_style("E2", 3).unwrap();
    sheet.set_cell_formula("E1", "=SUBTOTAL(9,D1:D2)").unwrap();
    sheet.merge_cells(&range("D3:E3")).unwrap();
    sheet
        .add_hyperlink(Hyperlink::internal(range("D2"), "Sheet1!A1"))
        .unwrap();

    assert!(wb.transform(
        0,
        range("A1:B3"),
        addr("D1"),
        TransformMode::Copy,
        PasteOption::Paste
    ));

    let sheet = wb.worksheet(0).unwrap();
    assert_eq!(sheet.get_value("D1").unwrap(), CellValue::Number(1.0));
    for a in ["D2", "E1", "E2", "D3", "E3"] {
        assert!(sheet.cell(a).unwrap().is_none(), "{} should be cleared", a);
    }
    assert!(sheet.merged_regions().is_empty());
    assert!(sheet.hyperlinks().is_empty());
    assert_eq!(sheet.calculation_markers().count(), 0);
}

#[test]
fn test_copy_offsets_relative_references() {
    let mut wb = Workbook::new();
    let sheet = wb.worksheet_mut(0).unwrap();
    sheet.set_cell_formula("B2", "=A1+$A$1+A$1+$A1").unwrap();
    sheet.set_cell_formula("B3", "=SUM(A1:A2)").unwrap();

    assert!(wb.transform(
        0,
        range("B2:B3"),
        addr("D5"),
        TransformMode::Copy,
        PasteOption::Paste
    ));

    let sheet = wb.worksheet(0).unwrap();
    assert_eq!(sheet.get_formula_at(addr("D5")), Some("=C4+$A$1+C$1+$A4"));
    assert_eq!(sheet.get_formula_at(addr("D6")), Some("=SUM(C4:C5)"));

    // Copying up and left pushes A1 off the grid
    assert!(wb.transform(
        0,
        range("B2"),
        addr("A1"),
        TransformMode::Copy,
        PasteOption::Paste
    ));
    let sheet = wb.worksheet(0).unwrap();
    assert_eq!(sheet.get_formula_at(addr("A1")), Some("=#REF!+$A$1+#REF!+#REF!"));
}

#[test]
fn test_cut_retargets_references() {
    let mut wb = Workbook::new();
    wb.add_worksheet_with_name("Totals").unwrap();
    let sheet = wb.worksheet_mut(0).unwrap();
    sheet.set_cell_value("A1", 1.0).unwrap();
    sheet.set_cell_value("A2", 2.0).unwrap();
    sheet.set_cell_formula("A3", "=A1+A2").unwrap();
    sheet.set_cell_formula("C1", "=SUM(A1:A2)+SUM(A1:A5)").unwrap();
    wb.worksheet_mut(1)
        .unwrap()
        .set_cell_formula("A1", "=Sheet1!$A$2*2")
        .unwrap();

    assert!(wb.transform(
        0,
        range("A1:A3"),
        addr("B10"),
        TransformMode::Cut,
        PasteOption::Paste
    ));

    let sheet = wb.worksheet(0).unwrap();
    // The moved formula keeps pointing at the moved cells
    assert_eq!(sheet.get_formula_at(addr("B12")), Some("=B10+B11"));
    // Only ranges wholly inside the block follow it
    assert_eq!(
        sheet.get_formula_at(addr("C1")),
        Some("=SUM(B10:B11)+SUM(A1:A5)")
    );
    assert_eq!(
        wb.worksheet(1).unwrap().get_formula_at(addr("A1")),
        Some("=Sheet1!$B$11*2")
    );
}

#[test]
fn test_transpose_swaps_and_skips_off_grid() {
    let mut wb = Workbook::new();
    let sheet = wb.worksheet_mut(0).unwrap();
    sheet.set_cell_value("A1", 1.0).unwrap();
    sheet.set_cell_value("A2", 2.0).unwrap();
    sheet.set_cell_value("A3", 3.0).unwrap();
    sheet.set_cell_value("B1", 4.0).unwrap();

    assert!(wb.transform(
        0,
        range("A1:B3"),
        addr("D1"),
        TransformMode::Copy,
        PasteOption::Transpose
    ));
    let sheet = wb.worksheet(0).unwrap();
    assert_eq!(sheet.get_value("D1").unwrap(), CellValue::Number(1.0));
    assert_eq!(sheet.get_value("E1").unwrap(), CellValue::Number(2.0));
    assert_eq!(sheet.get_value("F1").unwrap(), CellValue::Number(3.0));
    assert_eq!(sheet.get_value("D2").unwrap(), CellValue::Number(4.0));

    // Near the right edge only the first column of the result fits
    let edge = GridAddress::new(1, MAX_COLS);
    assert!(wb.transform(
        0,
        range("A1:A3"),
        edge,
        TransformMode::Copy,
        PasteOption::Transpose
    ));
    let sheet = wb.worksheet(0).unwrap();
    assert_eq!(sheet.get_value_at(edge), CellValue::Number(1.0));
    assert_eq!(sheet.cell_count(), 9);
}

#[test]
fn test_transpose_merge() {
    let mut wb = Workbook::new();
    let sheet = wb.worksheet_mut(0).unwrap();
    sheet.merge_cells(&range("A1:A3")).unwrap();
    sheet.set_cell_value("A1", "label").unwrap();

    assert!(wb.transform(
        0,
        range("A1:A3"),
        addr("C1"),
        TransformMode::Cut,
        PasteOption::Transpose
    ));

    let sheet = wb.worksheet(0).unwrap();
    assert_eq!(sheet.merged_regions(), &[range("C1:E1")]);
    assert!(sheet.cell("A1").unwrap().is_none());
}

#[test]
fn test_values_and_formatting_options() {
    let mut wb = Workbook::new();
    let bold = wb.intern_style(b"font:bold");
    let sheet = wb.worksheet_mut(0).unwrap();
    sheet.set_cell_formula("A1", "=1+1").unwrap();
    sheet
        .set_formula_result(addr("A1"), CellValue::Number(2.0))
        .unwrap();
    sheet.set_cell_style("A1", bold).unwrap();

    assert!(wb.transform(
        0,
        range("A1"),
        addr("B1"),
        TransformMode::Copy,
        PasteOption::Values
    ));
    assert!(wb.transform(
        0,
        range("A1"),
        addr("C1"),
        TransformMode::Copy,
        PasteOption::Formatting
    ));

    let sheet = wb.worksheet(0).unwrap();
    assert_eq!(
        sheet.cell("B1").unwrap(),
        Some(&Cell::new(CellValue::Number(2.0)))
    );
    assert_eq!(sheet.cell("C1").unwrap(), Some(&Cell::style_only(bold)));
}

/// Formatting paste replaces the merge layout inside the footprint
#[test]
fn test_formatting_replaces_destination_merges() {
    let mut wb = Workbook::new();
    let sheet = wb.worksheet_mut(0).unwrap();
    sheet.merge_cells(&range("A1:B1")).unwrap();
    sheet.merge_cells(&range("E1:F1")).unwrap();
    sheet.set_cell_value("E1", 7.0).unwrap();

    assert!(wb.transform(
        0,
        range("A1:C1"),
        addr("D1"),
        TransformMode::Copy,
        PasteOption::Formatting
    ));

    let sheet = wb.worksheet(0).unwrap();
    assert_eq!(sheet.merged_regions(), &[range("A1:B1"), range("D1:E1")]);
    // Values stay where they were
    assert_eq!(sheet.get_value("E1").unwrap(), CellValue::Number(7.0));
}

#[test]
fn test_cut_with_internal_hyperlink() {
    let mut wb = Workbook::new();
    let sheet = wb.worksheet_mut(0).unwrap();
    sheet.set_cell_value("B2", 1.0).unwrap();
    sheet
        .add_hyperlink(Hyperlink::internal(range("H1"), "B2"))
        .unwrap();

    assert!(wb.transform(
        0,
        range("B2"),
        addr("B4"),
        TransformMode::Cut,
        PasteOption::Paste
    ));
    let sheet = wb.worksheet(0).unwrap();
    assert_eq!(
        sheet.hyperlinks()[0].target,
        HyperlinkTarget::Internal("B4".to_string())
    );
}
