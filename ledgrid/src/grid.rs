use crate::error::FrameError;
use crate::geometry::{CellRef, MAX_CELLS};

/// On/off state of every LED, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridState {
    rows: usize,
    cols: usize,
    cells: Vec<bool>,
}

impl GridState {
    /// Create a grid with every cell off.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![false; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    fn index(&self, row: usize, col: usize) -> Result<usize, FrameError> {
        if row >= self.rows || col >= self.cols {
            return Err(FrameError::OutOfRange {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(row * self.cols + col)
    }

    pub fn get(&self, row: usize, col: usize) -> Result<bool, FrameError> {
        Ok(self.cells[self.index(row, col)?])
    }

    /// Set one cell, returning whether its value changed.
    pub fn set(&mut self, row: usize, col: usize, on: bool) -> Result<bool, FrameError> {
        let idx = self.index(row, col)?;
        let changed = self.cells[idx] != on;
        self.cells[idx] = on;
        Ok(changed)
    }

    pub fn set_cell(&mut self, cell: CellRef, on: bool) -> Result<bool, FrameError> {
        self.set(cell.row, cell.col, on)
    }

    /// Turn every cell off.
    pub fn reset(&mut self) {
        self.cells.fill(false);
    }

    /// One row of cell values.
    ///
    /// Panics if `row >= rows`.
    pub fn row(&self, row: usize) -> &[bool] {
        &self.cells[row * self.cols..(row + 1) * self.cols]
    }

    pub fn count_on(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// Parse a text grid: one line per row, `#`, `1`, `X` or `x` for on and
    /// `.`, `0`, `-` or space for off. The final newline is optional; any
    /// other empty line is an all-off row. Short lines are padded with off
    /// cells.
    pub fn from_ascii(text: &str, rows: usize, cols: usize) -> Result<Self, FrameError> {
        let body = text
            .strip_suffix('\n')
            .map_or(text, |t| t.strip_suffix('\r').unwrap_or(t));
        let lines: Vec<&str> = if text.is_empty() {
            Vec::new()
        } else {
            body.split('\n').collect()
        };
        if lines.len() != rows {
            return Err(FrameError::Parse(format!(
                "expected {rows} rows, found {}",
                lines.len()
            )));
        }

        if rows.checked_mul(cols).map_or(true, |cells| cells > MAX_CELLS) {
            return Err(FrameError::Parse(format!(
                "{rows}x{cols} grid exceeds the {MAX_CELLS} cell limit"
            )));
        }

        let mut grid = Self::new(rows, cols);
        for (row, line) in lines.iter().enumerate() {
            let line = line.trim_end_matches('\r');
            let width = line.chars().count();
            if width > cols {
                return Err(FrameError::Parse(format!(
                    "row {row} has {width} cells, grid has {cols} columns"
                )));
            }
            for (col, ch) in line.chars().enumerate() {
                let on = match ch {
                    '#' | '1' | 'X' | 'x' => true,
                    '.' | '0' | '-' | ' ' => false,
                    other => {
                        return Err(FrameError::Parse(format!(
                            "invalid cell character '{other}' at row {row}, column {col}"
                        )))
                    }
                };
                grid.cells[row * cols + col] = on;
            }
        }
        Ok(grid)
    }

    /// Render as `#`/`.` lines, the inverse of [`GridState::from_ascii`].
    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity(self.rows * (self.cols + 1));
        for row in 0..self.rows {
            out.extend(self.row(row).iter().map(|&on| if on { '#' } else { '.' }));
            out.push('\n');
        }
        out
    }
}
