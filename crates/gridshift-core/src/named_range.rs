//! Defined names
//!
//! Defined names assign meaningful names to cells, ranges or constants.
//! Their `refers_to` text contains references just like a formula does and is
//! rewritten by structural edits and cut moves.
//!
//! # Example
//!
//! ```text
//! // Define a name "TaxRate" that refers to cell B1
//! workbook.defined_names_mut().define(DefinedName::workbook_scope("TaxRate", "Sheet1!$B$1"))?;
//!
//! // Use it in a formula
//! =Price * TaxRate
//! ```

use crate::cell::GridAddress;
use crate::error::{Error, Result};

/// Scope of a defined name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NameScope {
    /// Available throughout the workbook (global)
    Workbook,
    /// Scoped to the sheet with this id (local)
    Sheet(u32),
}

/// A defined name
///
/// Names can refer to:
/// - A single cell: `Sheet1!$A$1`
/// - A range of cells: `Sheet1!$A$1:$D$10`
/// - A constant value: `0.0725`
/// - A formula expression: `=SUM(Sales)`
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DefinedName {
    /// The name (case-insensitive)
    pub name: String,
    /// Scope of this name
    pub scope: NameScope,
    /// What the name refers to
    pub refers_to: String,
    /// Optional comment
    pub comment: Option<String>,
    /// Whether this name is hidden from the UI
    pub hidden: bool,
}

impl DefinedName {
    /// Create a new defined name
    pub fn new(name: impl Into<String>, refers_to: impl Into<String>, scope: NameScope) -> Self {
        Self {
            name: name.into(),
            scope,
            refers_to: refers_to.into(),
            comment: None,
            hidden: false,
        }
    }

    /// Create a workbook-scoped name
    pub fn workbook_scope(name: impl Into<String>, refers_to: impl Into<String>) -> Self {
        Self::new(name, refers_to, NameScope::Workbook)
    }

    /// Create a sheet-scoped name
    pub fn sheet_scope(name: impl Into<String>, refers_to: impl Into<String>, sheet_id: u32) -> Self {
        Self::new(name, refers_to, NameScope::Sheet(sheet_id))
    }

    /// Set a comment
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Mark this name as hidden
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Check if the refers_to is a formula (starts with =)
    pub fn is_formula(&self) -> bool {
        self.refers_to.starts_with('=')
    }

    fn matches(&self, name: &str, scope: NameScope) -> bool {
        self.scope == scope && self.name.eq_ignore_ascii_case(name)
    }
}

/// Validate the text of a defined name
///
/// Names start with a letter, `_` or `\`, continue with letters, digits,
/// `_` or `.`, and must not read as a cell address.
pub fn validate_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid_first = matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_' || c == '\\');
    let valid_rest = chars.all(|c| c.is_alphanumeric() || c == '_' || c == '.');

    if !valid_first || !valid_rest || GridAddress::parse(name).is_ok() {
        return Err(Error::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Collection of defined names, kept in definition order
#[derive(Debug, Default, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DefinedNames {
    names: Vec<DefinedName>,
}

impl DefinedNames {
    /// Create a new empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a new name
    ///
    /// Returns an error if the name is invalid or already exists in the same
    /// scope.
    pub fn define(&mut self, name: DefinedName) -> Result<()> {
        validate_name(&name.name)?;
        if self.get_exact(&name.name, name.scope).is_some() {
            return Err(Error::DuplicateName(name.name));
        }
        self.names.push(name);
        Ok(())
    }

    /// Look up a name as seen from a sheet
    ///
    /// A sheet-scoped name shadows a workbook-scoped name of the same text.
    pub fn get(&self, name: &str, sheet_id: u32) -> Option<&DefinedName> {
        self.get_exact(name, NameScope::Sheet(sheet_id))
            .or_else(|| self.get_exact(name, NameScope::Workbook))
    }

    /// Look up a name in exactly one scope
    pub fn get_exact(&self, name: &str, scope: NameScope) -> Option<&DefinedName> {
        self.names.iter().find(|n| n.matches(name, scope))
    }

    /// Remove a name
    pub fn remove(&mut self, name: &str, scope: NameScope) -> Option<DefinedName> {
        let pos = self.names.iter().position(|n| n.matches(name, scope))?;
        Some(self.names.remove(pos))
    }

    /// Drop every name scoped to a sheet
    pub fn remove_sheet_scope(&mut self, sheet_id: u32) {
        self.names.retain(|n| n.scope != NameScope::Sheet(sheet_id));
    }

    /// Iterate over all names
    pub fn iter(&self) -> impl Iterator<Item = &DefinedName> {
        self.names.iter()
    }

    /// Iterate mutably over all names
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut DefinedName> {
        self.names.iter_mut()
    }

    /// Get the number of names
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Check if the collection is empty
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_lookup() {
        let mut names = DefinedNames::new();
        names
            .define(DefinedName::workbook_scope("Rate", "0.05"))
            .unwrap();
        names
            .define(DefinedName::sheet_scope("Rate", "0.08", 1))
            .unwrap();

        assert_eq!(names.get("Rate", 1).unwrap().refers_to, "0.08");
        assert_eq!(names.get("Rate", 2).unwrap().refers_to, "0.05");
    }

    #[test]
    fn test_case_insensitive_duplicate() {
        let mut names = DefinedNames::new();
        names
            .define(DefinedName::workbook_scope("TaxRate", "Sheet1!$B$1"))
            .unwrap();

        assert!(names.get("TAXRATE", 1).is_some());
        assert_eq!(
            names.define(DefinedName::workbook_scope("taxrate", "0.1")),
            Err(Error::DuplicateName("taxrate".to_string()))
        );
    }

    #[test]
    fn test_name_validation() {
        assert!(validate_name("Sales_2024").is_ok());
        assert!(validate_name("_hidden.total").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("1st").is_err());
        assert!(validate_name("has space").is_err());
        // Reads as a cell address
        assert!(validate_name("AB12").is_err());
    }

    #[test]
    fn test_remove_sheet_scope() {
        let mut names = DefinedNames::new();
        names.define(DefinedName::sheet_scope("A", "1", 1)).unwrap();
        names.define(DefinedName::workbook_scope("B", "2")).unwrap();

        names.remove_sheet_scope(1);
        assert_eq!(names.len(), 1);
        assert!(names.remove("b", NameScope::Workbook).is_some());
        assert!(names.is_empty());
    }
}
