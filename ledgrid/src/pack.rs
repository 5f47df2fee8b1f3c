//! Shift-register bit packing.
//!
//! Each row of the grid is split into 8-cell registers. Within a register the
//! leftmost cell is the most significant bit, so column `s * 8 + b` lands in
//! bit `7 - b` of register `s`. Bits past the last column stay zero.

use crate::error::FrameError;
use crate::geometry::BITS_PER_REGISTER;
use crate::grid::GridState;

/// Packed register bytes, one entry per (row, register).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteMatrix {
    rows: usize,
    registers: usize,
    bytes: Vec<u8>,
}

impl ByteMatrix {
    /// Create an all-zero matrix.
    pub fn zeros(rows: usize, registers: usize) -> Self {
        Self {
            rows,
            registers,
            bytes: vec![0; rows * registers],
        }
    }

    /// Build from row-major bytes.
    pub fn from_bytes(rows: usize, registers: usize, bytes: Vec<u8>) -> Result<Self, FrameError> {
        let expected = rows.checked_mul(registers).ok_or_else(|| {
            FrameError::Parse(format!("{rows}x{registers} matrix is too large"))
        })?;
        if bytes.len() != expected {
            return Err(FrameError::Parse(format!(
                "{} bytes do not fill a {rows}x{registers} matrix",
                bytes.len()
            )));
        }
        Ok(Self {
            rows,
            registers,
            bytes,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn registers(&self) -> usize {
        self.registers
    }

    #[inline]
    pub fn get(&self, row: usize, register: usize) -> u8 {
        self.bytes[row * self.registers + register]
    }

    pub fn row(&self, row: usize) -> &[u8] {
        &self.bytes[row * self.registers..(row + 1) * self.registers]
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[u8]> {
        // chunks_exact panics on a zero chunk size
        self.bytes.chunks_exact(self.registers.max(1))
    }

    /// Row-major bytes, the layout shifted out to the hardware.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn is_zero(&self) -> bool {
        self.bytes.iter().all(|&b| b == 0)
    }

    /// Decode back into a grid with `cols` columns.
    pub fn unpack(&self, cols: usize) -> Result<GridState, FrameError> {
        if cols.div_ceil(BITS_PER_REGISTER) != self.registers {
            return Err(FrameError::InvalidConfiguration(format!(
                "{cols} columns need {} registers, matrix has {}",
                cols.div_ceil(BITS_PER_REGISTER),
                self.registers
            )));
        }
        let mut grid = GridState::new(self.rows, cols);
        for row in 0..self.rows {
            for col in 0..cols {
                let byte = self.get(row, col / BITS_PER_REGISTER);
                let bit = 7 - col % BITS_PER_REGISTER;
                if (byte >> bit) & 1 == 1 {
                    grid.set(row, col, true)?;
                }
            }
        }
        Ok(grid)
    }
}

/// Pack a grid into register bytes.
pub fn pack(grid: &GridState) -> ByteMatrix {
    let registers = grid.cols().div_ceil(BITS_PER_REGISTER);
    let mut bytes = Vec::with_capacity(grid.rows() * registers);

    for row in 0..grid.rows() {
        let cells = grid.row(row);
        for chunk in cells.chunks(BITS_PER_REGISTER) {
            let mut byte = 0u8;
            for (b, &on) in chunk.iter().enumerate() {
                if on {
                    byte |= 1 << (7 - b);
                }
            }
            bytes.push(byte);
        }
    }

    ByteMatrix {
        rows: grid.rows(),
        registers,
        bytes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic pseudo-random grid for property-style checks.
    fn scrambled(rows: usize, cols: usize, seed: u64) -> GridState {
        let mut state = seed;
        let mut grid = GridState::new(rows, cols);
        for row in 0..rows {
            for col in 0..cols {
                state = state
                    .wrapping_mul(6_364_136_223_846_793_005)
                    .wrapping_add(1_442_695_040_888_963_407);
                grid.set(row, col, (state >> 33) & 1 == 1).unwrap();
            }
        }
        grid
    }

    #[test]
    fn empty_grid_packs_to_zeros() {
        let bytes = pack(&GridState::new(18, 54));
        assert_eq!(bytes, ByteMatrix::zeros(18, 7));
        assert!(bytes.is_zero());
    }

    #[test]
    fn column_seven_is_lsb_of_first_register() {
        let mut grid = GridState::new(18, 54);
        grid.set(0, 7, true).unwrap();
        let bytes = pack(&grid);
        assert_eq!(bytes.row(0), &[1, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn first_two_columns_are_msbs() {
        let mut grid = GridState::new(18, 54);
        grid.set(0, 0, true).unwrap();
        grid.set(0, 1, true).unwrap();
        let bytes = pack(&grid);
        assert_eq!(bytes.get(0, 0), 0b1100_0000);
        assert_eq!(bytes.get(0, 0), 192);
        assert!(bytes.row(1).iter().all(|&b| b == 0));
    }

    #[test]
    fn final_register_is_zero_padded() {
        // 54 columns: the last register holds columns 48..54 in bits 7..2.
        let mut grid = GridState::new(1, 54);
        for col in 0..54 {
            grid.set(0, col, true).unwrap();
        }
        let bytes = pack(&grid);
        assert_eq!(bytes.row(0), &[255, 255, 255, 255, 255, 255, 0b1111_1100]);
    }

    #[test]
    fn register_boundaries() {
        let mut grid = GridState::new(2, 20);
        grid.set(0, 8, true).unwrap();
        grid.set(1, 19, true).unwrap();
        let bytes = pack(&grid);
        assert_eq!(bytes.registers(), 3);
        assert_eq!(bytes.row(0), &[0, 0b1000_0000, 0]);
        assert_eq!(bytes.row(1), &[0, 0, 0b0001_0000]);
    }

    #[test]
    fn pack_is_deterministic() {
        let grid = scrambled(18, 54, 7);
        assert_eq!(pack(&grid), pack(&grid.clone()));
    }

    #[test]
    fn unpack_restores_grid() {
        for (rows, cols, seed) in [(18, 54, 1), (4, 8, 2), (3, 13, 3), (1, 1, 4), (5, 64, 5)] {
            let grid = scrambled(rows, cols, seed);
            let bytes = pack(&grid);
            assert_eq!(bytes.rows(), rows);
            assert_eq!(bytes.registers(), cols.div_ceil(8));
            assert_eq!(bytes.unpack(cols).unwrap(), grid, "{rows}x{cols}");
        }
    }

    #[test]
    fn unpack_rejects_wrong_width() {
        let bytes = ByteMatrix::zeros(2, 2);
        assert!(bytes.unpack(8).is_err());
        assert!(bytes.unpack(17).is_err());
        assert!(bytes.unpack(9).is_ok());
    }

    #[test]
    fn from_bytes_checks_length() {
        assert!(ByteMatrix::from_bytes(2, 3, vec![0; 5]).is_err());
        assert!(ByteMatrix::from_bytes(usize::MAX, 2, vec![0; 4]).is_err());
        let m = ByteMatrix::from_bytes(2, 3, vec![1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(m.get(1, 0), 4);
        assert_eq!(m.iter_rows().count(), 2);
    }
}
