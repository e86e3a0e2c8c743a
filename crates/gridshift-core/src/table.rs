//! Table regions

use crate::cell::GridRange;

/// A structured table occupying a block of cells
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TableRegion {
    /// Table name, unique within the workbook (case-insensitive)
    pub name: String,
    /// Full extent including header and totals rows
    pub range: GridRange,
    /// Whether the last row is a totals row
    pub totals_row: bool,
}

impl TableRegion {
    /// Create a table without a totals row
    pub fn new(name: impl Into<String>, range: GridRange) -> Self {
        Self {
            name: name.into(),
            range,
            totals_row: false,
        }
    }

    /// Enable the totals row
    pub fn with_totals_row(mut self) -> Self {
        self.totals_row = true;
        self
    }
}
