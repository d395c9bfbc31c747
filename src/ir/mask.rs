//! Binary per-class mask matrices.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A row-major binary matrix with the same extent as its owning image.
///
/// Cells are strictly 0 or 1; a 1 marks a pixel belonging to the mask's
/// class. Construction goes through [`BinaryMask::from_fn`] or
/// [`BinaryMask::from_rows`], both of which normalize truthy input to 0/1.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinaryMask {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl BinaryMask {
    /// Builds a mask by evaluating `f(x, y)` for every cell in row-major order.
    pub fn from_fn(width: usize, height: usize, f: impl Fn(usize, usize) -> bool) -> Self {
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push(u8::from(f(x, y)));
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Builds a mask from explicit rows. Any non-zero cell becomes 1.
    ///
    /// Panics if the rows are ragged; this is a test/fixture constructor.
    pub fn from_rows(rows: &[&[u8]]) -> Self {
        let height = rows.len();
        let width = rows.first().map_or(0, |row| row.len());
        assert!(
            rows.iter().all(|row| row.len() == width),
            "ragged rows in BinaryMask::from_rows"
        );

        let data = rows
            .iter()
            .flat_map(|row| row.iter().map(|&cell| u8::from(cell != 0)))
            .collect();

        Self {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the cell at (x, y), always 0 or 1.
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }

    /// Number of set cells.
    pub fn count_ones(&self) -> usize {
        self.data.iter().filter(|&&cell| cell == 1).count()
    }

    /// Row-major cell slice.
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }
}

impl fmt::Debug for BinaryMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BinaryMask({}x{}, {} set)", self.width, self.height, self.count_ones())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rows_normalizes_cells() {
        let mask = BinaryMask::from_rows(&[&[0, 2, 1], &[5, 0, 0]]);
        assert_eq!(mask.width(), 3);
        assert_eq!(mask.height(), 2);
        assert_eq!(mask.as_slice(), &[0, 1, 1, 1, 0, 0]);
        assert_eq!(mask.count_ones(), 3);
    }

    #[test]
    fn from_fn_is_row_major() {
        let mask = BinaryMask::from_fn(2, 2, |x, y| x == 1 && y == 0);
        assert_eq!(mask.as_slice(), &[0, 1, 0, 0]);
        assert_eq!(mask.get(1, 0), 1);
        assert_eq!(mask.get(0, 1), 0);
    }
}
