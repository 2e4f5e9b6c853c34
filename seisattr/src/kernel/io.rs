use super::ConfigError;

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, ArrayViewMut1};

/// Adapter trait for reading contiguous 1D input.
pub trait Read1D<T> {
    /// Borrow the underlying input as a contiguous slice.
    fn read_slice(&self) -> Result<&[T], ConfigError>;
}

/// Adapter trait for writing contiguous 1D output.
pub trait Write1D<T> {
    /// Borrow the underlying output as a mutable contiguous slice.
    fn write_slice_mut(&mut self) -> Result<&mut [T], ConfigError>;
}

/// Adapter trait for reading a trace x sample grid row by row.
///
/// Implementations do not promise rectangularity; kernels validate row
/// lengths before computing anything.
pub trait ReadGrid<T> {
    /// Number of traces (rows).
    fn n_rows(&self) -> usize;

    /// Borrow trace `row` as a contiguous slice.
    fn read_row(&self, row: usize) -> Result<&[T], ConfigError>;

    /// Samples per trace when the container knows it without a row.
    ///
    /// Row lists return `None`; a `(0, n)` array still reports `n`.
    fn n_cols(&self) -> Option<usize> {
        None
    }
}

impl<T> Read1D<T> for [T] {
    fn read_slice(&self) -> Result<&[T], ConfigError> {
        Ok(self)
    }
}

impl<T> Write1D<T> for [T] {
    fn write_slice_mut(&mut self) -> Result<&mut [T], ConfigError> {
        Ok(self)
    }
}

impl<T, const N: usize> Read1D<T> for [T; N] {
    fn read_slice(&self) -> Result<&[T], ConfigError> {
        Ok(self)
    }
}

impl<T, const N: usize> Write1D<T> for [T; N] {
    fn write_slice_mut(&mut self) -> Result<&mut [T], ConfigError> {
        Ok(self)
    }
}

impl<T> Read1D<T> for Vec<T> {
    fn read_slice(&self) -> Result<&[T], ConfigError> {
        Ok(self.as_slice())
    }
}

impl<T> Write1D<T> for Vec<T> {
    fn write_slice_mut(&mut self) -> Result<&mut [T], ConfigError> {
        Ok(self.as_mut_slice())
    }
}

impl<T> Read1D<T> for Array1<T> {
    fn read_slice(&self) -> Result<&[T], ConfigError> {
        self.as_slice()
            .ok_or(ConfigError::NonContiguous { arg: "array" })
    }
}

impl<T> Write1D<T> for Array1<T> {
    fn write_slice_mut(&mut self) -> Result<&mut [T], ConfigError> {
        self.as_slice_mut()
            .ok_or(ConfigError::NonContiguous { arg: "array" })
    }
}

impl<'a, T> Read1D<T> for ArrayView1<'a, T> {
    fn read_slice(&self) -> Result<&[T], ConfigError> {
        self.as_slice()
            .ok_or(ConfigError::NonContiguous { arg: "array_view" })
    }
}

impl<'a, T> Write1D<T> for ArrayViewMut1<'a, T> {
    fn write_slice_mut(&mut self) -> Result<&mut [T], ConfigError> {
        self.as_slice_mut().ok_or(ConfigError::NonContiguous {
            arg: "array_view_mut",
        })
    }
}

fn row_out_of_bounds() -> ConfigError {
    ConfigError::InvalidArgument {
        arg: "row",
        reason: "row index out of bounds",
    }
}

impl<T> ReadGrid<T> for [Vec<T>] {
    fn n_rows(&self) -> usize {
        self.len()
    }

    fn read_row(&self, row: usize) -> Result<&[T], ConfigError> {
        self.get(row).map(Vec::as_slice).ok_or_else(row_out_of_bounds)
    }
}

impl<T> ReadGrid<T> for Vec<Vec<T>> {
    fn n_rows(&self) -> usize {
        self.len()
    }

    fn read_row(&self, row: usize) -> Result<&[T], ConfigError> {
        self.as_slice().read_row(row)
    }
}

impl<'r, T> ReadGrid<T> for [&'r [T]] {
    fn n_rows(&self) -> usize {
        self.len()
    }

    fn read_row(&self, row: usize) -> Result<&[T], ConfigError> {
        self.get(row).copied().ok_or_else(row_out_of_bounds)
    }
}

impl<'r, T> ReadGrid<T> for Vec<&'r [T]> {
    fn n_rows(&self) -> usize {
        self.len()
    }

    fn read_row(&self, row: usize) -> Result<&[T], ConfigError> {
        self.as_slice().read_row(row)
    }
}

impl<T> ReadGrid<T> for Array2<T> {
    fn n_rows(&self) -> usize {
        self.nrows()
    }

    fn n_cols(&self) -> Option<usize> {
        Some(self.ncols())
    }

    fn read_row(&self, row: usize) -> Result<&[T], ConfigError> {
        if row >= self.nrows() {
            return Err(row_out_of_bounds());
        }
        self.row(row)
            .to_slice()
            .ok_or(ConfigError::NonContiguous { arg: "grid" })
    }
}

impl<'a, T> ReadGrid<T> for ArrayView2<'a, T> {
    fn n_rows(&self) -> usize {
        self.nrows()
    }

    fn n_cols(&self) -> Option<usize> {
        Some(self.ncols())
    }

    fn read_row(&self, row: usize) -> Result<&[T], ConfigError> {
        if row >= self.nrows() {
            return Err(row_out_of_bounds());
        }
        self.row(row)
            .to_slice()
            .ok_or(ConfigError::NonContiguous { arg: "grid_view" })
    }
}
