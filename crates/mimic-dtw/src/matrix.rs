//! Dense row-major matrix for local and accumulated DTW costs.

use std::ops::{Index, IndexMut};

/// Dense `rows x cols` matrix of `f64` stored row-major in one owned buffer.
///
/// Used for the local cost matrix `C` (`len_a x len_b`) and the accumulated
/// cost matrix (`(len_a + 1) x (len_b + 1)`). Unreachable cells hold `+inf`.
#[derive(Debug, Clone, PartialEq)]
pub struct CostMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl CostMatrix {
    /// Create a matrix with every cell set to `fill`.
    pub(crate) fn filled(rows: usize, cols: usize, fill: f64) -> Self {
        Self {
            rows,
            cols,
            data: vec![fill; rows * cols],
        }
    }

    /// Return the number of rows.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Return the number of columns.
    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Return the `(rows, cols)` shape.
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Return the value at `(i, j)`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= rows` or `j >= cols`.
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        assert!(i < self.rows, "row index {i} out of bounds for {} rows", self.rows);
        assert!(j < self.cols, "column index {j} out of bounds for {} columns", self.cols);
        self.data[i * self.cols + j]
    }

    /// Return row `i` as a slice.
    #[must_use]
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    /// Iterate over rows.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        self.data.chunks(self.cols.max(1)).take(self.rows)
    }

    /// Mutable access to the raw row-major buffer.
    pub(crate) fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Return the last cell `(rows - 1, cols - 1)`.
    #[must_use]
    pub fn last(&self) -> f64 {
        self.get(self.rows - 1, self.cols - 1)
    }
}

impl Index<(usize, usize)> for CostMatrix {
    type Output = f64;

    fn index(&self, (i, j): (usize, usize)) -> &Self::Output {
        debug_assert!(i < self.rows && j < self.cols);
        &self.data[i * self.cols + j]
    }
}

impl IndexMut<(usize, usize)> for CostMatrix {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut Self::Output {
        debug_assert!(i < self.rows && j < self.cols);
        &mut self.data[i * self.cols + j]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_matrix() -> CostMatrix {
        let mut m = CostMatrix::filled(2, 3, 0.0);
        for i in 0..2 {
            for j in 0..3 {
                m[(i, j)] = (i * 3 + j) as f64;
            }
        }
        m
    }

    #[test]
    fn shape_and_access() {
        let m = make_matrix();
        assert_eq!(m.shape(), (2, 3));
        assert_eq!(m.get(1, 2), 5.0);
        assert_eq!(m[(0, 1)], 1.0);
        assert_eq!(m.last(), 5.0);
    }

    #[test]
    fn rows_are_contiguous() {
        let m = make_matrix();
        assert_eq!(m.row(1), &[3.0, 4.0, 5.0]);
        let rows: Vec<&[f64]> = m.iter_rows().collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], &[0.0, 1.0, 2.0]);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn get_out_of_bounds_panics() {
        let m = make_matrix();
        let _ = m.get(2, 0);
    }
}
