//! Owned row-major 2-D array, one row per control point.

use crate::error::{StateError, StateResult};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Series {
    rows: usize,
    cols: usize,
    #[serde(with = "crate::nonfinite::seq")]
    data: Vec<f64>,
}

impl Series {
    pub fn new(rows: usize, cols: usize, data: Vec<f64>) -> StateResult<Self> {
        if rows == 0 {
            return Err(StateError::ZeroRows);
        }
        if data.len() != rows * cols {
            return Err(StateError::Shape {
                what: "series data".into(),
                expected: rows * cols,
                found: data.len(),
            });
        }
        Ok(Self { rows, cols, data })
    }

    pub fn filled(rows: usize, cols: usize, value: f64) -> Self {
        let rows = rows.max(1);
        Self {
            rows,
            cols,
            data: vec![value; rows * cols],
        }
    }

    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self::filled(rows, cols, 0.0)
    }

    /// 1×1 series.
    pub fn scalar(value: f64) -> Self {
        Self::filled(1, 1, value)
    }

    /// n×1 series from one value per control point.
    pub fn column(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::zeros(1, 1);
        }
        Self {
            rows: values.len(),
            cols: 1,
            data: values.to_vec(),
        }
    }

    /// n×k series from k equally long columns.
    pub fn from_columns(columns: &[&[f64]]) -> StateResult<Self> {
        let cols = columns.len();
        let rows = columns.first().map_or(0, |c| c.len());
        if rows == 0 {
            return Err(StateError::ZeroRows);
        }
        let mut data = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            for c in columns {
                if c.len() != rows {
                    return Err(StateError::Shape {
                        what: "series column".into(),
                        expected: rows,
                        found: c.len(),
                    });
                }
                data.push(c[r]);
            }
        }
        Ok(Self { rows, cols, data })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.rows && col < self.cols {
            Some(self.data[row * self.cols + col])
        } else {
            None
        }
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) -> StateResult<()> {
        if row >= self.rows || col >= self.cols {
            return Err(StateError::Shape {
                what: format!("series index ({row}, {col})"),
                expected: self.rows * self.cols,
                found: row * self.cols + col,
            });
        }
        self.data[row * self.cols + col] = value;
        Ok(())
    }

    /// Row `row`, clamped to the last row.
    pub fn row(&self, row: usize) -> &[f64] {
        if self.rows == 0 {
            return &[];
        }
        let start = row.min(self.rows - 1) * self.cols;
        self.data.get(start..start + self.cols).unwrap_or(&[])
    }

    pub fn first_row(&self) -> &[f64] {
        self.row(0)
    }

    pub fn last_row(&self) -> &[f64] {
        self.row(self.rows.saturating_sub(1))
    }

    /// Values of one column, top to bottom.
    pub fn column_values(&self, col: usize) -> Vec<f64> {
        if col >= self.cols {
            return Vec::new();
        }
        (0..self.rows).map(|r| self.data[r * self.cols + col]).collect()
    }

    /// First column; the common case for per-point scalars.
    pub fn values(&self) -> Vec<f64> {
        self.column_values(0)
    }

    /// Value in column 0 of row 0.
    pub fn first(&self) -> f64 {
        self.data.first().copied().unwrap_or(0.0)
    }

    /// Value in column 0 of the last row.
    pub fn last(&self) -> f64 {
        self.last_row().first().copied().unwrap_or(0.0)
    }

    pub fn set_column(&mut self, col: usize, values: &[f64]) -> StateResult<()> {
        if col >= self.cols {
            return Err(StateError::Shape {
                what: "column index".into(),
                expected: self.cols,
                found: col,
            });
        }
        if values.len() != self.rows {
            return Err(StateError::Shape {
                what: "column values".into(),
                expected: self.rows,
                found: values.len(),
            });
        }
        for (r, v) in values.iter().enumerate() {
            self.data[r * self.cols + col] = *v;
        }
        Ok(())
    }

    /// `n` copies of row `row`.
    pub fn broadcast_row(&self, row: usize, n: usize) -> Self {
        let src = self.row(row);
        let n = n.max(1);
        let mut data = Vec::with_capacity(n * self.cols);
        for _ in 0..n {
            data.extend_from_slice(src);
        }
        Self {
            rows: n,
            cols: self.cols,
            data,
        }
    }

    /// 1-row series holding the last row.
    pub fn last_row_series(&self) -> Self {
        self.broadcast_row(self.rows.saturating_sub(1), 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_columns_is_row_major() {
        let s = Series::from_columns(&[&[1.0, 2.0], &[10.0, 20.0]]).unwrap();
        assert_eq!(s.as_slice(), &[1.0, 10.0, 2.0, 20.0]);
        assert_eq!(s.row(1), &[2.0, 20.0]);
        assert_eq!(s.column_values(1), vec![10.0, 20.0]);
    }

    #[test]
    fn ragged_columns_rejected() {
        assert!(Series::from_columns(&[&[1.0, 2.0], &[3.0]]).is_err());
    }

    #[test]
    fn broadcast_copies_requested_row() {
        let s = Series::column(&[4.0, 5.0, 6.0]);
        let b = s.broadcast_row(2, 4);
        assert_eq!(b.values(), vec![6.0; 4]);
    }

    #[test]
    fn new_checks_length() {
        assert!(Series::new(2, 2, vec![0.0; 3]).is_err());
        assert!(Series::new(0, 2, vec![]).is_err());
    }
}
