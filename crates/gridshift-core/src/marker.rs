//! Calculation markers
//!
//! A marker flags a cell holding a table-aggregate formula (`SUBTOTAL`,
//! `AGGREGATE`). Writers emit these so consumers know to recalculate the
//! cell; markers follow the cell through moves and structural edits.

use crate::cell::GridAddress;

/// Marker for a cell that needs recalculation on load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CalculationMarker {
    /// Id of the owning sheet
    pub sheet_id: u32,
    /// Cell holding the formula
    pub address: GridAddress,
}

impl CalculationMarker {
    /// Create a new marker
    pub fn new(sheet_id: u32, address: GridAddress) -> Self {
        Self { sheet_id, address }
    }
}

/// True when a formula calls a table-aggregate function
pub fn needs_marker(formula: &str) -> bool {
    let upper = formula.to_ascii_uppercase();
    upper.contains("SUBTOTAL(") || upper.contains("AGGREGATE(")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_needs_marker() {
        assert!(needs_marker("=SUBTOTAL(9,A1:A10)"));
        assert!(needs_marker("=1+aggregate(4,6,B:B)"));
        assert!(!needs_marker("=SUM(A1:A10)"));
        assert!(!needs_marker("=SUBTOTAL"));
    }
}
