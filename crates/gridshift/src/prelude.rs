//! Prelude module - common imports for gridshift users
//!
//! ```rust
//! use gridshift::prelude::*;
//! ```

pub use crate::{
    // Cell types
    CellValue,
    // Structural edits
    EditOptions,
    EditStats,
    // Error types
    Error,
    GridAddress,
    GridRange,
    Hyperlink,
    // Transforms
    PasteOption,
    Result,
    TableRegion,
    TransformMode,
    // Main types
    Workbook,
    // Extension traits
    WorkbookStructureExt,
    WorkbookTransformExt,
    Worksheet,
};
