use std::fmt;

use serde::Serialize;

/// Small single-channel integer activation map, row-major.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct VizGrid {
    rows: usize,
    cols: usize,
    data: Vec<i64>,
}

impl VizGrid {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        // A grid with no columns has no rows either
        let rows = if cols == 0 { 0 } else { rows };
        Self {
            rows,
            cols: if rows == 0 { 0 } else { cols },
            data: vec![0; rows * cols],
        }
    }

    /// Cells numbered `0..rows*cols` in row-major order, so every value names its own position.
    pub fn identity(rows: usize, cols: usize) -> Self {
        let mut grid = Self::zeros(rows, cols);
        for (i, v) in grid.data.iter_mut().enumerate() {
            *v = i as i64;
        }
        grid
    }

    pub fn from_rows(rows: Vec<Vec<i64>>) -> Self {
        let cols = rows.first().map_or(0, |r| r.len());
        let mut grid = Self::zeros(rows.len(), cols);
        for (r, row) in rows.iter().enumerate().take(grid.rows) {
            for (c, &v) in row.iter().enumerate().take(cols) {
                grid.set(r, c, v);
            }
        }
        grid
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn get(&self, row: usize, col: usize) -> Option<i64> {
        if row < self.rows && col < self.cols {
            Some(self.data[row * self.cols + col])
        } else {
            None
        }
    }

    pub fn set(&mut self, row: usize, col: usize, value: i64) {
        if row < self.rows && col < self.cols {
            self.data[row * self.cols + col] = value;
        }
    }

    pub fn as_slice(&self) -> &[i64] {
        &self.data
    }

    pub fn to_rows(&self) -> Vec<Vec<i64>> {
        if self.cols == 0 {
            return Vec::new();
        }
        self.data.chunks(self.cols).map(|r| r.to_vec()).collect()
    }

    pub fn max_value(&self) -> Option<i64> {
        self.data.iter().copied().max()
    }
}

impl fmt::Display for VizGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .data
            .iter()
            .map(|v| v.to_string().len())
            .max()
            .unwrap_or(1);
        for row in self.data.chunks(self.cols.max(1)) {
            let line = row
                .iter()
                .map(|v| format!("{:>width$}", v, width = width))
                .collect::<Vec<_>>()
                .join(" ");
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_is_row_major() {
        let grid = VizGrid::identity(2, 3);
        assert_eq!(grid.to_rows(), vec![vec![0, 1, 2], vec![3, 4, 5]]);
        assert_eq!(grid.get(1, 0), Some(3));
        assert_eq!(grid.get(2, 0), None);
    }

    #[test]
    fn zero_sized_grids_have_no_rows() {
        assert!(VizGrid::zeros(0, 5).is_empty());
        assert!(VizGrid::zeros(5, 0).is_empty());
        assert_eq!(VizGrid::zeros(5, 0).cols(), 0);
        assert!(VizGrid::identity(0, 0).to_rows().is_empty());
    }

    #[test]
    fn display_right_aligns_columns() {
        let grid = VizGrid::from_rows(vec![vec![1, 10], vec![100, 2]]);
        assert_eq!(grid.to_string(), "  1  10\n100   2\n");
    }
}
