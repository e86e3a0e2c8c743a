//! Workbook type - the main document structure

use crate::error::{Error, Result};
use crate::intern::{content_hash, InternTable};
use crate::named_range::{DefinedName, DefinedNames, NameScope};
use crate::table::TableRegion;
use crate::worksheet::Worksheet;
use crate::MAX_SHEET_NAME_LEN;

/// Canonical bytes of the default style (style index 0)
const DEFAULT_STYLE_KEY: &[u8] = b"";

/// A workbook (spreadsheet document)
///
/// A workbook contains one or more worksheets, the shared string and style
/// tables, and defined names.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Workbook {
    /// Worksheets in tab order
    worksheets: Vec<Worksheet>,
    /// Next sheet id to hand out
    next_sheet_id: u32,
    /// Active sheet index
    active_sheet: usize,
    /// Shared string table
    shared_strings: InternTable<String>,
    /// Style table keyed by canonical style hash
    styles: InternTable<u64>,
    /// Defined names
    defined_names: DefinedNames,
}

impl Workbook {
    /// Create a new workbook with one worksheet named "Sheet1"
    pub fn new() -> Self {
        let mut wb = Self::empty();
        wb.worksheets.push(Worksheet::new("Sheet1", 1));
        wb.next_sheet_id = 2;
        wb
    }

    /// Create an empty workbook with no worksheets
    pub fn empty() -> Self {
        let mut styles = InternTable::new();
        styles.intern(content_hash(DEFAULT_STYLE_KEY));
        Self {
            worksheets: Vec::new(),
            next_sheet_id: 1,
            active_sheet: 0,
            shared_strings: InternTable::new(),
            styles,
            defined_names: DefinedNames::new(),
        }
    }

    /// Get the number of worksheets
    pub fn sheet_count(&self) -> usize {
        self.worksheets.len()
    }

    /// Check if the workbook has no worksheets
    pub fn is_empty(&self) -> bool {
        self.worksheets.is_empty()
    }

    /// Get a worksheet by index
    pub fn worksheet(&self, index: usize) -> Option<&Worksheet> {
        self.worksheets.get(index)
    }

    /// Get a mutable worksheet by index
    pub fn worksheet_mut(&mut self, index: usize) -> Option<&mut Worksheet> {
        self.worksheets.get_mut(index)
    }

    /// Get a worksheet by name (case-insensitive)
    pub fn worksheet_by_name(&self, name: &str) -> Option<&Worksheet> {
        self.worksheets
            .iter()
            .find(|ws| ws.name().eq_ignore_ascii_case(name))
    }

    /// Get a mutable worksheet by name (case-insensitive)
    pub fn worksheet_by_name_mut(&mut self, name: &str) -> Option<&mut Worksheet> {
        self.worksheets
            .iter_mut()
            .find(|ws| ws.name().eq_ignore_ascii_case(name))
    }

    /// Get a sheet's index by name (case-insensitive)
    pub fn sheet_index(&self, name: &str) -> Option<usize> {
        self.worksheets
            .iter()
            .position(|ws| ws.name().eq_ignore_ascii_case(name))
    }

    /// Get a sheet's index by its stable id
    pub fn sheet_index_by_id(&self, sheet_id: u32) -> Option<usize> {
        self.worksheets
            .iter()
            .position(|ws| ws.sheet_id() == sheet_id)
    }

    /// Iterate over worksheets
    pub fn worksheets(&self) -> impl Iterator<Item = &Worksheet> {
        self.worksheets.iter()
    }

    /// Iterate mutably over worksheets
    pub fn worksheets_mut(&mut self) -> impl Iterator<Item = &mut Worksheet> {
        self.worksheets.iter_mut()
    }

    /// Borrow worksheets, defined names and shared strings at once
    pub fn parts_mut(
        &mut self,
    ) -> (
        &mut [Worksheet],
        &mut DefinedNames,
        &mut InternTable<String>,
    ) {
        (
            &mut self.worksheets,
            &mut self.defined_names,
            &mut self.shared_strings,
        )
    }

    /// Add a worksheet with a generated name
    pub fn add_worksheet(&mut self) -> Result<usize> {
        let name = self.generate_sheet_name();
        self.add_worksheet_with_name(&name)
    }

    /// Add a worksheet with a specific name
    pub fn add_worksheet_with_name(&mut self, name: &str) -> Result<usize> {
        self.validate_sheet_name(name, None)?;

        let index = self.worksheets.len();
        let sheet_id = self.allocate_sheet_id();
        self.worksheets.push(Worksheet::new(name, sheet_id));
        Ok(index)
    }

    /// Insert a worksheet at a specific position
    pub fn insert_worksheet(&mut self, index: usize, name: &str) -> Result<()> {
        if index > self.worksheets.len() {
            return Err(Error::SheetOutOfBounds(index, self.worksheets.len()));
        }
        self.validate_sheet_name(name, None)?;

        let sheet_id = self.allocate_sheet_id();
        self.worksheets.insert(index, Worksheet::new(name, sheet_id));

        if self.active_sheet >= index && self.worksheets.len() > 1 {
            self.active_sheet += 1;
        }
        Ok(())
    }

    /// Remove a worksheet, along with the names scoped to it
    pub fn remove_worksheet(&mut self, index: usize) -> Result<Worksheet> {
        if index >= self.worksheets.len() {
            return Err(Error::SheetOutOfBounds(index, self.worksheets.len()));
        }

        let removed = self.worksheets.remove(index);
        self.defined_names.remove_sheet_scope(removed.sheet_id());

        if self.active_sheet >= self.worksheets.len() && self.active_sheet > 0 {
            self.active_sheet = self.worksheets.len().saturating_sub(1);
        } else if self.active_sheet > index {
            self.active_sheet -= 1;
        }

        Ok(removed)
    }

    /// Rename a worksheet
    pub fn rename_worksheet(&mut self, index: usize, new_name: &str) -> Result<()> {
        if index >= self.worksheets.len() {
            return Err(Error::SheetOutOfBounds(index, self.worksheets.len()));
        }
        self.validate_sheet_name(new_name, Some(index))?;
        self.worksheets[index].set_name(new_name);
        Ok(())
    }

    /// Get the active sheet index
    pub fn active_sheet(&self) -> usize {
        self.active_sheet
    }

    /// Set the active sheet index
    pub fn set_active_sheet(&mut self, index: usize) -> Result<()> {
        if index >= self.worksheets.len() {
            return Err(Error::SheetOutOfBounds(index, self.worksheets.len()));
        }
        self.active_sheet = index;
        Ok(())
    }

    /// Name of the active sheet, if the workbook has any sheets
    pub fn active_sheet_name(&self) -> Option<&str> {
        self.worksheets.get(self.active_sheet).map(|ws| ws.name())
    }

    // === Shared strings and styles ===

    /// Shared string table
    pub fn shared_strings(&self) -> &InternTable<String> {
        &self.shared_strings
    }

    /// Intern a string, returning its shared string index
    pub fn intern_string(&mut self, text: &str) -> u32 {
        match self.shared_strings.index_of_str(text) {
            Some(idx) => idx,
            None => self.shared_strings.intern(text.to_string()),
        }
    }

    /// Look up a shared string
    pub fn shared_string(&self, index: u32) -> Option<&str> {
        self.shared_strings.get(index).map(String::as_str)
    }

    /// Style table (canonical style hashes)
    pub fn styles(&self) -> &InternTable<u64> {
        &self.styles
    }

    /// Intern a style given its canonical byte form, returning the style index
    pub fn intern_style(&mut self, canonical: &[u8]) -> u32 {
        self.styles.intern(content_hash(canonical))
    }

    // === Defined names ===

    /// Define a workbook-scoped name
    pub fn define_name(&mut self, name: &str, refers_to: &str) -> Result<()> {
        self.defined_names
            .define(DefinedName::workbook_scope(name, refers_to))
    }

    /// Define a name scoped to the sheet at `sheet_index`
    pub fn define_name_for_sheet(
        &mut self,
        name: &str,
        refers_to: &str,
        sheet_index: usize,
    ) -> Result<()> {
        let sheet_id = self
            .worksheets
            .get(sheet_index)
            .map(|ws| ws.sheet_id())
            .ok_or(Error::SheetOutOfBounds(sheet_index, self.worksheets.len()))?;
        self.defined_names
            .define(DefinedName::sheet_scope(name, refers_to, sheet_id))
    }

    /// Look up a name as seen from the sheet at `sheet_index`
    pub fn defined_name(&self, name: &str, sheet_index: usize) -> Option<&DefinedName> {
        match self.worksheets.get(sheet_index) {
            Some(ws) => self.defined_names.get(name, ws.sheet_id()),
            None => self.defined_names.get_exact(name, NameScope::Workbook),
        }
    }

    /// Defined names
    pub fn defined_names(&self) -> &DefinedNames {
        &self.defined_names
    }

    /// Defined names (mutable)
    pub fn defined_names_mut(&mut self) -> &mut DefinedNames {
        &mut self.defined_names
    }

    // === Tables ===

    /// Add a table to a sheet; table names are unique across the workbook
    pub fn add_table(&mut self, sheet_index: usize, table: TableRegion) -> Result<()> {
        let count = self.worksheets.len();
        if self
            .worksheets
            .iter()
            .flat_map(|ws| ws.tables())
            .any(|t| t.name.eq_ignore_ascii_case(&table.name))
        {
            return Err(Error::DuplicateTable(table.name));
        }
        self.worksheets
            .get_mut(sheet_index)
            .ok_or(Error::SheetOutOfBounds(sheet_index, count))?
            .add_table(table)
    }

    fn allocate_sheet_id(&mut self) -> u32 {
        let id = self.next_sheet_id;
        self.next_sheet_id += 1;
        id
    }

    /// Validate a sheet name, optionally excluding a sheet from duplicate check
    fn validate_sheet_name(&self, name: &str, exclude_index: Option<usize>) -> Result<()> {
        if name.is_empty() {
            return Err(Error::InvalidSheetName("Sheet name cannot be empty".into()));
        }
        if name.chars().count() > MAX_SHEET_NAME_LEN {
            return Err(Error::InvalidSheetName(format!(
                "Sheet name too long (max {} characters)",
                MAX_SHEET_NAME_LEN
            )));
        }

        const INVALID_CHARS: &[char] = &[':', '\\', '/', '?', '*', '[', ']'];
        if let Some(c) = name.chars().find(|c| INVALID_CHARS.contains(c)) {
            return Err(Error::InvalidSheetName(format!(
                "Sheet name cannot contain '{}'",
                c
            )));
        }

        let name_lower = name.to_lowercase();
        for (i, ws) in self.worksheets.iter().enumerate() {
            if Some(i) != exclude_index && ws.name().to_lowercase() == name_lower {
                return Err(Error::DuplicateSheetName(name.into()));
            }
        }

        Ok(())
    }

    /// Generate a unique sheet name
    fn generate_sheet_name(&self) -> String {
        let mut n = self.worksheets.len() + 1;
        loop {
            let name = format!("Sheet{}", n);
            if self.validate_sheet_name(&name, None).is_ok() {
                return name;
            }
            n += 1;
        }
    }
}

impl Default for Workbook {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GridRange;

    #[test]
    fn test_new_workbook() {
        let wb = Workbook::new();
        assert_eq!(wb.sheet_count(), 1);
        assert_eq!(wb.worksheet(0).unwrap().name(), "Sheet1");
        assert_eq!(wb.active_sheet_name(), Some("Sheet1"));
    }

    #[test]
    fn test_sheet_ids_are_stable() {
        let mut wb = Workbook::new();
        wb.add_worksheet_with_name("Data").unwrap();
        wb.insert_worksheet(0, "Front").unwrap();

        assert_eq!(wb.worksheet(0).unwrap().sheet_id(), 3);
        assert_eq!(wb.worksheet(1).unwrap().sheet_id(), 1);
        assert_eq!(wb.sheet_index_by_id(2), Some(2));

        wb.remove_worksheet(0).unwrap();
        assert_eq!(wb.sheet_index_by_id(2), Some(1));
    }

    #[test]
    fn test_duplicate_name() {
        let mut wb = Workbook::new();
        assert!(wb.add_worksheet_with_name("SHEET1").is_err());
        assert!(wb.add_worksheet_with_name("sheet1").is_err());
        assert_eq!(wb.add_worksheet().unwrap(), 1);
        assert_eq!(wb.worksheet(1).unwrap().name(), "Sheet2");
    }

    #[test]
    fn test_invalid_sheet_name() {
        let mut wb = Workbook::new();

        assert!(wb.add_worksheet_with_name("").is_err());
        assert!(wb.add_worksheet_with_name("Sheet/1").is_err());
        assert!(wb.add_worksheet_with_name("Sheet:1").is_err());
        assert!(wb.add_worksheet_with_name("Sheet[1]").is_err());

        let long_name = "A".repeat(MAX_SHEET_NAME_LEN + 1);
        assert!(wb.add_worksheet_with_name(&long_name).is_err());
    }

    #[test]
    fn test_rename_allows_same_sheet() {
        let mut wb = Workbook::new();
        wb.rename_worksheet(0, "SHEET1").unwrap();
        assert_eq!(wb.worksheet(0).unwrap().name(), "SHEET1");
        assert!(wb.worksheet_by_name("sheet1").is_some());
    }

    #[test]
    fn test_intern_tables() {
        let mut wb = Workbook::new();
        assert_eq!(wb.intern_string("hello"), 0);
        assert_eq!(wb.intern_string("world"), 1);
        assert_eq!(wb.intern_string("hello"), 0);
        assert_eq!(wb.shared_string(1), Some("world"));

        // Index 0 is the default style
        assert_eq!(wb.intern_style(b""), 0);
        assert_eq!(wb.intern_style(b"bold"), 1);
        assert_eq!(wb.styles().len(), 2);
    }

    #[test]
    fn test_defined_names_follow_sheet_scope() {
        let mut wb = Workbook::new();
        wb.add_worksheet_with_name("Data").unwrap();
        wb.define_name("Rate", "Sheet1!$B$1").unwrap();
        wb.define_name_for_sheet("Rate", "Data!$C$1", 1).unwrap();

        assert_eq!(wb.defined_name("Rate", 0).unwrap().refers_to, "Sheet1!$B$1");
        assert_eq!(wb.defined_name("rate", 1).unwrap().refers_to, "Data!$C$1");

        wb.remove_worksheet(1).unwrap();
        assert_eq!(wb.defined_names().len(), 1);
    }

    #[test]
    fn test_table_names_unique_across_sheets() {
        let mut wb = Workbook::new();
        wb.add_worksheet_with_name("Data").unwrap();
        let range = GridRange::parse("A1:B5").unwrap();

        wb.add_table(0, TableRegion::new("Sales", range)).unwrap();
        assert!(matches!(
            wb.add_table(1, TableRegion::new("SALES", range)),
            Err(Error::DuplicateTable(_))
        ));
        assert!(wb.add_table(5, TableRegion::new("Other", range)).is_err());
    }
}
