//! Minimal row-major 2D container used for encoded feature matrices.
//!
//! Deliberately small and dependency-free; only the operations the
//! preprocessing and model code actually need.
use std::error::Error;
use std::fmt;
use std::ops::Index;

#[derive(Clone, Debug, PartialEq)]
pub struct Array2<T> {
    data: Vec<T>,
    rows: usize,
    cols: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeError {
    pub rows: usize,
    pub cols: usize,
    pub len: usize,
}

impl fmt::Display for ShapeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "cannot shape {} elements into {}x{}",
            self.len, self.rows, self.cols
        )
    }
}

impl Error for ShapeError {}

impl<T> Array2<T> {
    pub fn from_shape_vec(shape: (usize, usize), data: Vec<T>) -> Result<Self, ShapeError> {
        let (rows, cols) = shape;
        if data.len() != rows * cols {
            return Err(ShapeError {
                rows,
                cols,
                len: data.len(),
            });
        }
        Ok(Self { data, rows, cols })
    }

    pub fn nrows(&self) -> usize {
        self.rows
    }

    pub fn ncols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn row_slice(&self, row: usize) -> &[T] {
        let start = row * self.cols;
        &self.data[start..start + self.cols]
    }

    /// Copy out the rows at `indices`, in the given order.
    pub fn select_rows(&self, indices: &[usize]) -> Array2<T>
    where
        T: Clone,
    {
        let mut data = Vec::with_capacity(indices.len() * self.cols);
        for &row in indices {
            data.extend_from_slice(self.row_slice(row));
        }
        Array2 {
            data,
            rows: indices.len(),
            cols: self.cols,
        }
    }
}

impl<T> Index<(usize, usize)> for Array2<T> {
    type Output = T;

    fn index(&self, (row, col): (usize, usize)) -> &T {
        assert!(row < self.rows && col < self.cols, "index out of bounds");
        &self.data[row * self.cols + col]
    }
}
