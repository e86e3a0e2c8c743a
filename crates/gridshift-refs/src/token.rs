//! Reference tokens
//!
//! A [`ReferenceToken`] is the parsed form of one reference found in formula
//! text: an optional sheet qualifier plus a single cell or a range. Tokens
//! render back to text with [`Display`](fmt::Display), preserving `$`
//! markers and qualifier quoting.

use std::fmt;

use gridshift_core::{GridAddress, GridRange};

use crate::error::{RefError, RefResult};

/// One endpoint of a reference, with its absolute markers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellPart {
    /// Row index (1-based)
    pub row: u32,
    /// Column index (1-based)
    pub column: u32,
    /// `$` before the row digits
    pub row_absolute: bool,
    /// `$` before the column letters
    pub column_absolute: bool,
}

impl CellPart {
    /// Create a relative part
    pub fn relative(addr: GridAddress) -> Self {
        Self {
            row: addr.row,
            column: addr.column,
            row_absolute: false,
            column_absolute: false,
        }
    }

    /// Parse `A1`, `$A1`, `A$1` or `$A$1`
    pub fn parse(text: &str) -> RefResult<Self> {
        let (addr, column_absolute, row_absolute) = GridAddress::parse_marked(text)?;
        Ok(Self {
            row: addr.row,
            column: addr.column,
            row_absolute,
            column_absolute,
        })
    }

    /// The plain address of this part
    pub fn address(&self) -> GridAddress {
        GridAddress::new(self.row, self.column)
    }

    /// Same markers, different position
    pub fn with_address(self, addr: GridAddress) -> Self {
        Self {
            row: addr.row,
            column: addr.column,
            ..self
        }
    }
}

impl fmt::Display for CellPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.column_absolute {
            f.write_str("$")?;
        }
        f.write_str(&GridAddress::index_to_column_letters(self.column))?;
        if self.row_absolute {
            f.write_str("$")?;
        }
        write!(f, "{}", self.row)
    }
}

/// Sheet name prefix of a reference (`Data!` or `'My Sheet'!`)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SheetQualifier {
    /// Unescaped sheet name
    pub name: String,
    /// Whether the source text quoted the name
    pub quoted: bool,
}

impl SheetQualifier {
    /// Create a qualifier, quoting the name when it needs it
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let quoted = !name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '.');
        Self { name, quoted }
    }

    /// Parse qualifier text without the trailing `!`
    pub fn parse(text: &str) -> RefResult<Self> {
        if let Some(inner) = text.strip_prefix('\'').and_then(|t| t.strip_suffix('\'')) {
            if inner.is_empty() {
                return Err(RefError::InvalidQualifier(text.to_string()));
            }
            return Ok(Self {
                name: inner.replace("''", "'"),
                quoted: true,
            });
        }

        if text.is_empty() || text.contains('\'') {
            return Err(RefError::InvalidQualifier(text.to_string()));
        }
        Ok(Self {
            name: text.to_string(),
            quoted: false,
        })
    }

    /// Case-insensitive comparison with a sheet name
    pub fn refers_to(&self, sheet: &str) -> bool {
        same_sheet(&self.name, sheet)
    }
}

/// Sheet names compare case-insensitively, the way the workbook dedups them
fn same_sheet(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b) || a.to_lowercase() == b.to_lowercase()
}

impl fmt::Display for SheetQualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.quoted {
            write!(f, "'{}'!", self.name.replace('\'', "''"))
        } else {
            write!(f, "{}!", self.name)
        }
    }
}

/// Cell part(s) of a reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RefCells {
    /// `A1`
    Single(CellPart),
    /// `A1:B2`, endpoints in source order
    Range(CellPart, CellPart),
}

/// A parsed reference
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReferenceToken {
    /// Qualifier in front of the reference
    pub sheet: Option<SheetQualifier>,
    /// Qualifier repeated on the range end (`Data!A1:Data!B2`)
    pub end_sheet: Option<SheetQualifier>,
    /// Cell or range
    pub cells: RefCells,
}

impl ReferenceToken {
    /// Parse reference text such as `A1`, `$A$1:B2` or `'My Sheet'!C3`
    pub fn parse(text: &str) -> RefResult<Self> {
        let (start_text, end_text) = match text.split_once(':') {
            Some((s, e)) => (s, Some(e)),
            None => (text, None),
        };

        let (sheet, start) = parse_side(start_text)?;
        let (end_sheet, cells) = match end_text {
            Some(e) => {
                let (end_sheet, end) = parse_side(e)?;
                (end_sheet, RefCells::Range(start, end))
            }
            None => (None, RefCells::Single(start)),
        };

        Ok(Self {
            sheet,
            end_sheet,
            cells,
        })
    }

    /// An unqualified single-cell reference
    pub fn single(part: CellPart) -> Self {
        Self {
            sheet: None,
            end_sheet: None,
            cells: RefCells::Single(part),
        }
    }

    /// Whether this is a range reference
    pub fn is_range(&self) -> bool {
        matches!(self.cells, RefCells::Range(..))
    }

    /// Normalized rectangle covered by the reference
    pub fn extent(&self) -> GridRange {
        match self.cells {
            RefCells::Single(p) => GridRange::single(p.address()),
            RefCells::Range(a, b) => GridRange::new(a.address(), b.address()),
        }
    }

    /// Name of the sheet the reference points into
    ///
    /// Unqualified references point into `current_sheet`, the sheet owning
    /// the formula.
    pub fn sheet_name<'a>(&'a self, current_sheet: &'a str) -> &'a str {
        self.sheet.as_ref().map_or(current_sheet, |q| q.name.as_str())
    }

    /// True when the reference points into `target_sheet`
    ///
    /// A range whose end qualifier names a different sheet is a 3-D
    /// reference and never belongs to a single sheet.
    pub fn belongs_to(&self, current_sheet: &str, target_sheet: &str) -> bool {
        if !same_sheet(self.sheet_name(current_sheet), target_sheet) {
            return false;
        }
        match &self.end_sheet {
            Some(q) => q.refers_to(target_sheet),
            None => true,
        }
    }

    /// Text that replaces this reference once it no longer exists
    pub fn invalidated_text(&self) -> String {
        match &self.sheet {
            Some(q) => format!("{}#REF!", q),
            None => "#REF!".to_string(),
        }
    }
}

impl fmt::Display for ReferenceToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(q) = &self.sheet {
            write!(f, "{}", q)?;
        }
        match &self.cells {
            RefCells::Single(p) => write!(f, "{}", p),
            RefCells::Range(a, b) => {
                write!(f, "{}:", a)?;
                if let Some(q) = &self.end_sheet {
                    write!(f, "{}", q)?;
                }
                write!(f, "{}", b)
            }
        }
    }
}

fn parse_side(text: &str) -> RefResult<(Option<SheetQualifier>, CellPart)> {
    match text.rfind('!') {
        Some(pos) => {
            let qualifier = SheetQualifier::parse(&text[..pos])?;
            let part = CellPart::parse(&text[pos + 1..])?;
            Ok((Some(qualifier), part))
        }
        None => Ok((None, CellPart::parse(text)?)),
    }
}
