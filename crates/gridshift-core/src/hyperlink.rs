//! Hyperlink anchors

use crate::cell::GridRange;

/// Where a hyperlink points
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HyperlinkTarget {
    /// External URL (`https://...`, `mailto:...`)
    External(String),
    /// Location inside the workbook (`Sheet2!A1`, a defined name)
    Internal(String),
}

/// A hyperlink anchored on a range of cells
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Hyperlink {
    /// Anchor range
    pub range: GridRange,
    /// Link target
    pub target: HyperlinkTarget,
    /// Optional tooltip text
    pub tooltip: Option<String>,
}

impl Hyperlink {
    /// Create a hyperlink to an external URL
    pub fn external(range: GridRange, url: impl Into<String>) -> Self {
        Self {
            range,
            target: HyperlinkTarget::External(url.into()),
            tooltip: None,
        }
    }

    /// Create a hyperlink to a location in the workbook
    pub fn internal(range: GridRange, location: impl Into<String>) -> Self {
        Self {
            range,
            target: HyperlinkTarget::Internal(location.into()),
            tooltip: None,
        }
    }

    /// Set the tooltip
    pub fn with_tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = Some(tooltip.into());
        self
    }
}
