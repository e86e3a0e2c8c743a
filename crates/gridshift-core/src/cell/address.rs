//! Grid address and range types
//!
//! Addresses are 1-based: `A1` is row 1, column 1. Column letters form a
//! bijective base-26 numbering with no zero digit (A=1 … Z=26, AA=27 …).

use crate::error::{Error, Result};
use crate::{MAX_COLS, MAX_ROWS};
use std::fmt;
use std::str::FromStr;

/// Maximum number of column letters in an address (`XFD`)
const MAX_COLUMN_LETTERS: usize = 3;

/// Maximum number of row digits in an address (`1048576`)
const MAX_ROW_DIGITS: usize = 7;

/// A cell position on the grid (e.g., "B12" is row 12, column 2)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridAddress {
    /// Row index (1-based)
    pub row: u32,
    /// Column index (1-based, A=1, XFD=16384)
    pub column: u32,
}

impl GridAddress {
    /// Create an address without bounds checking
    pub const fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }

    /// Create an address, rejecting indices outside the grid
    pub fn try_new(row: u32, column: u32) -> Result<Self> {
        let addr = Self { row, column };
        addr.validate()?;
        Ok(addr)
    }

    /// Check the address against the grid limits
    pub fn validate(&self) -> Result<()> {
        if self.row == 0 || self.row > MAX_ROWS {
            return Err(Error::RowOutOfBounds(self.row, MAX_ROWS));
        }
        if self.column == 0 || self.column > MAX_COLS {
            return Err(Error::ColumnOutOfBounds(self.column, MAX_COLS));
        }
        Ok(())
    }

    /// True if the address lies inside the grid
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Parse a plain A1-style address (no `$` markers)
    ///
    /// # Examples
    /// ```
    /// use gridshift_core::GridAddress;
    ///
    /// let addr = GridAddress::parse("b12").unwrap();
    /// assert_eq!(addr, GridAddress::new(12, 2));
    /// assert!(GridAddress::parse("$B$12").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let (addr, col_absolute, row_absolute) = Self::parse_marked(s)?;
        if col_absolute || row_absolute {
            return Err(Error::InvalidAddress(format!(
                "unexpected '$' marker in '{}'",
                s
            )));
        }
        Ok(addr)
    }

    /// Parse an address that may carry `$` absolute markers
    ///
    /// Returns `(address, column_absolute, row_absolute)`.
    ///
    /// ```
    /// use gridshift_core::GridAddress;
    ///
    /// let (addr, col_abs, row_abs) = GridAddress::parse_marked("$C7").unwrap();
    /// assert_eq!(addr, GridAddress::new(7, 3));
    /// assert!(col_abs);
    /// assert!(!row_abs);
    /// ```
    pub fn parse_marked(s: &str) -> Result<(Self, bool, bool)> {
        if s.is_empty() {
            return Err(Error::InvalidAddress("empty address".into()));
        }

        let bytes = s.as_bytes();
        let mut pos = 0;

        let col_absolute = bytes.first() == Some(&b'$');
        if col_absolute {
            pos += 1;
        }

        let col_start = pos;
        while pos < bytes.len() && bytes[pos].is_ascii_alphabetic() {
            pos += 1;
        }
        let letters = &s[col_start..pos];
        if letters.is_empty() || letters.len() > MAX_COLUMN_LETTERS {
            return Err(Error::InvalidAddress(format!(
                "expected 1 to {} column letters in '{}'",
                MAX_COLUMN_LETTERS, s
            )));
        }

        let row_absolute = bytes.get(pos) == Some(&b'$');
        if row_absolute {
            pos += 1;
        }

        let digits = &s[pos..];
        if digits.is_empty()
            || digits.len() > MAX_ROW_DIGITS
            || !digits.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(Error::InvalidAddress(format!(
                "expected 1 to {} row digits in '{}'",
                MAX_ROW_DIGITS, s
            )));
        }

        let column = Self::column_letters_to_index(letters)?;
        let row: u32 = digits
            .parse()
            .map_err(|_| Error::InvalidAddress(format!("invalid row number in '{}'", s)))?;

        let addr = Self { row, column };
        addr.validate()?;
        Ok((addr, col_absolute, row_absolute))
    }

    /// Convert column letters to a 1-based index (A = 1, Z = 26, AA = 27)
    pub fn column_letters_to_index(letters: &str) -> Result<u32> {
        if letters.is_empty() {
            return Err(Error::InvalidAddress("empty column letters".into()));
        }
        if letters.len() > MAX_COLUMN_LETTERS {
            return Err(Error::InvalidAddress(format!(
                "too many column letters in '{}'",
                letters
            )));
        }

        let mut col: u32 = 0;
        for c in letters.chars() {
            if !c.is_ascii_alphabetic() {
                return Err(Error::InvalidAddress(format!(
                    "invalid column letter '{}'",
                    c
                )));
            }
            col = col * 26 + (c.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
        }

        if col > MAX_COLS {
            return Err(Error::ColumnOutOfBounds(col, MAX_COLS));
        }

        Ok(col)
    }

    /// Convert a 1-based column index to letters (1 = A, 26 = Z, 27 = AA)
    ///
    /// Index 0 has no letter form and yields an empty string.
    pub fn index_to_column_letters(column: u32) -> String {
        let mut letters = Vec::with_capacity(MAX_COLUMN_LETTERS);
        let mut n = column;

        while n > 0 {
            n -= 1;
            letters.push((n % 26) as u8 + b'A');
            n /= 26;
        }

        letters.iter().rev().map(|&b| b as char).collect()
    }

    /// Format as canonical A1-style text (uppercase, no `$`)
    pub fn to_a1_string(&self) -> String {
        format!("{}{}", Self::index_to_column_letters(self.column), self.row)
    }

    /// Move the address by a signed offset, `None` if it leaves the grid
    pub fn offset(&self, row_delta: i64, column_delta: i64) -> Option<Self> {
        let row = i64::from(self.row) + row_delta;
        let column = i64::from(self.column) + column_delta;
        if row < 1 || row > i64::from(MAX_ROWS) || column < 1 || column > i64::from(MAX_COLS) {
            return None;
        }
        Some(Self::new(row as u32, column as u32))
    }

    /// Create a range from this address to another
    pub fn to(&self, other: GridAddress) -> GridRange {
        GridRange::new(*self, other)
    }
}

impl fmt::Display for GridAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            Self::index_to_column_letters(self.column),
            self.row
        )
    }
}

impl FromStr for GridAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// A rectangular block of cells (e.g., "A1:B10")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridRange {
    /// Top-left corner
    pub start: GridAddress,
    /// Bottom-right corner
    pub end: GridAddress,
}

impl GridRange {
    /// Create a range from any two opposite corners
    pub fn new(a: GridAddress, b: GridAddress) -> Self {
        Self {
            start: GridAddress::new(a.row.min(b.row), a.column.min(b.column)),
            end: GridAddress::new(a.row.max(b.row), a.column.max(b.column)),
        }
    }

    /// Create a range from row/column indices
    pub fn from_indices(start_row: u32, start_col: u32, end_row: u32, end_col: u32) -> Self {
        Self::new(
            GridAddress::new(start_row, start_col),
            GridAddress::new(end_row, end_col),
        )
    }

    /// Create a single-cell range
    pub fn single(addr: GridAddress) -> Self {
        Self {
            start: addr,
            end: addr,
        }
    }

    /// Parse a range from `A1:B10` notation (or a single `A1`)
    pub fn parse(s: &str) -> Result<Self> {
        match s.split_once(':') {
            Some((a, b)) => {
                let start = GridAddress::parse(a)
                    .map_err(|e| Error::InvalidRange(format!("'{}': {}", s, e)))?;
                let end = GridAddress::parse(b)
                    .map_err(|e| Error::InvalidRange(format!("'{}': {}", s, e)))?;
                Ok(Self::new(start, end))
            }
            None => Ok(Self::single(GridAddress::parse(s)?)),
        }
    }

    /// Check both corners against the grid limits
    pub fn validate(&self) -> Result<()> {
        self.start.validate()?;
        self.end.validate()
    }

    /// Check if a cell is within this range
    pub fn contains(&self, addr: &GridAddress) -> bool {
        addr.row >= self.start.row
            && addr.row <= self.end.row
            && addr.column >= self.start.column
            && addr.column <= self.end.column
    }

    /// Check if another range lies completely inside this one
    pub fn contains_range(&self, other: &GridRange) -> bool {
        self.contains(&other.start) && self.contains(&other.end)
    }

    /// Get the number of rows in the range
    pub fn row_count(&self) -> u32 {
        self.end.row - self.start.row + 1
    }

    /// Get the number of columns in the range
    pub fn column_count(&self) -> u32 {
        self.end.column - self.start.column + 1
    }

    /// Get the total number of cells in the range
    pub fn cell_count(&self) -> u64 {
        u64::from(self.row_count()) * u64::from(self.column_count())
    }

    /// Separating-axis overlap test
    ///
    /// Two rectangles are disjoint iff one lies entirely above, below, left
    /// or right of the other.
    pub fn overlaps(&self, other: &GridRange) -> bool {
        let disjoint = self.end.row < other.start.row
            || self.start.row > other.end.row
            || self.end.column < other.start.column
            || self.start.column > other.end.column;
        !disjoint
    }

    /// Get the intersection of two ranges, if any
    pub fn intersect(&self, other: &GridRange) -> Option<GridRange> {
        if !self.overlaps(other) {
            return None;
        }

        Some(GridRange::from_indices(
            self.start.row.max(other.start.row),
            self.start.column.max(other.start.column),
            self.end.row.min(other.end.row),
            self.end.column.min(other.end.column),
        ))
    }

    /// Move the whole range, `None` if any corner leaves the grid
    pub fn offset(&self, row_delta: i64, column_delta: i64) -> Option<GridRange> {
        Some(GridRange {
            start: self.start.offset(row_delta, column_delta)?,
            end: self.end.offset(row_delta, column_delta)?,
        })
    }

    /// Iterate over all cell addresses in the range (row by row)
    pub fn cells(&self) -> GridRangeIterator {
        GridRangeIterator {
            range: *self,
            current_row: self.start.row,
            current_col: self.start.column,
            remaining: self.cell_count(),
        }
    }

    /// Format as `A1:B10` (or `A1` for a single cell)
    pub fn to_a1_string(&self) -> String {
        if self.start == self.end {
            self.start.to_a1_string()
        } else {
            format!("{}:{}", self.start, self.end)
        }
    }
}

impl fmt::Display for GridRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for GridRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Iterator over cells in a range
pub struct GridRangeIterator {
    range: GridRange,
    current_row: u32,
    current_col: u32,
    remaining: u64,
}

impl Iterator for GridRangeIterator {
    type Item = GridAddress;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let addr = GridAddress::new(self.current_row, self.current_col);
        self.remaining -= 1;

        self.current_col += 1;
        if self.current_col > self.range.end.column {
            self.current_col = self.range.start.column;
            self.current_row += 1;
        }

        Some(addr)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for GridRangeIterator {}
