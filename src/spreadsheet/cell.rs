use std::fmt;

/// Spreadsheet column letters for a 0-based column index (0 -> `A`, 26 -> `AA`).
pub fn column_name(col: u16) -> String {
    let mut name = Vec::new();
    let mut n = u32::from(col) + 1;
    while n > 0 {
        let rem = ((n - 1) % 26) as u8;
        name.push(b'A' + rem);
        n = (n - 1) / 26;
    }
    name.reverse();
    String::from_utf8_lossy(&name).into_owned()
}

/// A 0-based cell position, rendered in A1 notation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRef {
    pub row: u32,
    pub col: u16,
    pub absolute: bool,
}

impl CellRef {
    pub fn new(row: u32, col: u16) -> Self {
        CellRef {
            row,
            col,
            absolute: false,
        }
    }

    pub fn absolute(row: u32, col: u16) -> Self {
        CellRef {
            row,
            col,
            absolute: true,
        }
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let col = column_name(self.col);
        let row = self.row + 1;
        if self.absolute {
            write!(f, "${col}${row}")
        } else {
            write!(f, "{col}{row}")
        }
    }
}

/// A rectangular block of cells, optionally on another sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    pub sheet: Option<&'static str>,
    pub first: CellRef,
    pub last: CellRef,
}

impl CellRange {
    pub fn new(sheet: Option<&'static str>, first: CellRef, last: CellRef) -> Self {
        CellRange { sheet, first, last }
    }

    /// A range covering one cell
    pub fn single(sheet: Option<&'static str>, cell: CellRef) -> Self {
        CellRange::new(sheet, cell, cell)
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(sheet) = self.sheet {
            write!(f, "{sheet}!")?;
        }
        if self.first == self.last {
            write!(f, "{}", self.first)
        } else {
            write!(f, "{}:{}", self.first, self.last)
        }
    }
}

/// The formulas the report uses, kept structured so they can be inspected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Formula {
    /// `SUMPRODUCT(left, right)`, with `right` wrapped in `TRANSPOSE` when
    /// it runs the other way from `left`
    SumProduct {
        left: CellRange,
        right: CellRange,
        transpose_right: bool,
    },
    /// The value of another cell
    Reference(CellRange),
    /// `minuend - subtrahend` on the same sheet
    Difference { minuend: CellRef, subtrahend: CellRef },
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Formula::SumProduct {
                left,
                right,
                transpose_right: true,
            } => write!(f, "=SUMPRODUCT({left}, TRANSPOSE({right}))"),
            Formula::SumProduct { left, right, .. } => write!(f, "=SUMPRODUCT({left}, {right})"),
            Formula::Reference(cell) => write!(f, "={cell}"),
            Formula::Difference {
                minuend,
                subtrahend,
            } => write!(f, "={minuend} - {subtrahend}"),
        }
    }
}
