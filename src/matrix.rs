//! Row-grouped sparse transition matrices.
//!
//! Rows are choices, columns are states. Consecutive rows belonging to the
//! same state form a *row group*:
//!
//! ```text
//! group 0 | row 0: (1, 0.5) (2, 0.5)
//!         | row 1: (0, 1.0)
//! group 1 | row 2: (1, 1.0)
//! group 2 | row 3: (0, 0.3) (2, 0.7)
//! ```
//!
//! The storage is compressed-row: one flat array of columns and values, plus
//! start offsets for rows and for row groups. A [`SparseMatrixBuilder`]
//! accumulates rows in expansion order; [`SparseMatrixBuilder::build`] freezes
//! them into an immutable [`SparseMatrix`] with rows sorted by column.

use std::fmt;
use std::ops::Range;

/// Immutable row-grouped sparse matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseMatrix {
    row_indications: Vec<usize>,
    columns: Vec<usize>,
    values: Vec<f64>,
    row_group_indices: Vec<usize>,
    column_count: usize,
}

impl SparseMatrix {
    pub fn row_count(&self) -> usize {
        self.row_indications.len() - 1
    }

    pub fn column_count(&self) -> usize {
        self.column_count
    }

    pub fn entry_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_group_count(&self) -> usize {
        self.row_group_indices.len() - 1
    }

    /// Returns the rows of a row group.
    pub fn row_group(&self, group: usize) -> Range<usize> {
        self.row_group_indices[group]..self.row_group_indices[group + 1]
    }

    pub fn row_group_size(&self, group: usize) -> usize {
        self.row_group(group).len()
    }

    /// Returns the start offsets of all row groups, plus the total row count.
    pub fn row_group_indices(&self) -> &[usize] {
        &self.row_group_indices
    }

    /// Returns true if every row group consists of exactly one row.
    pub fn has_trivial_row_grouping(&self) -> bool {
        self.row_group_count() == self.row_count()
    }

    /// Iterates over the `(column, value)` entries of a row, by ascending column.
    pub fn row(&self, row: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let range = self.row_indications[row]..self.row_indications[row + 1];
        self.columns[range.clone()]
            .iter()
            .copied()
            .zip(self.values[range].iter().copied())
    }

    /// Returns the number of entries of a row.
    pub fn row_len(&self, row: usize) -> usize {
        self.row_indications[row + 1] - self.row_indications[row]
    }

    /// Returns the value at `(row, column)`, if the entry is present.
    pub fn get(&self, row: usize, column: usize) -> Option<f64> {
        let range = self.row_indications[row]..self.row_indications[row + 1];
        self.columns[range.clone()]
            .binary_search(&column)
            .ok()
            .map(|i| self.values[range.start + i])
    }

    /// Returns the sum of the values of a row.
    pub fn row_sum(&self, row: usize) -> f64 {
        self.row(row).map(|(_, v)| v).sum()
    }
}

impl fmt::Display for SparseMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} x {} matrix ({} row groups, {} entries)",
            self.row_count(),
            self.column_count,
            self.row_group_count(),
            self.entry_count()
        )?;
        for group in 0..self.row_group_count() {
            for (i, row) in self.row_group(group).enumerate() {
                if i == 0 {
                    write!(f, "{:>6} |", group)?;
                } else {
                    write!(f, "{:>6} |", "")?;
                }
                for (column, value) in self.row(row) {
                    write!(f, " ({}, {})", column, value)?;
                }
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

/// Incremental builder for a [`SparseMatrix`].
#[derive(Debug, Clone)]
pub struct SparseMatrixBuilder {
    row_indications: Vec<usize>,
    columns: Vec<usize>,
    values: Vec<f64>,
    row_group_indices: Vec<usize>,
}

impl Default for SparseMatrixBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SparseMatrixBuilder {
    pub fn new() -> Self {
        Self {
            row_indications: vec![0],
            columns: Vec::new(),
            values: Vec::new(),
            row_group_indices: Vec::new(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.row_indications.len() - 1
    }

    pub fn entry_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_group_count(&self) -> usize {
        self.row_group_indices.len()
    }

    /// Starts a new row group at the current row.
    pub fn new_row_group(&mut self) {
        self.row_group_indices.push(self.row_count());
    }

    /// Appends a row to the current row group.
    ///
    /// Entries may come in any order; duplicate columns are summed on [`build`][Self::build].
    ///
    /// # Panics
    ///
    /// Panics if no row group was started.
    pub fn add_row(&mut self, entries: impl IntoIterator<Item = (usize, f64)>) {
        assert!(!self.row_group_indices.is_empty(), "Row added before the first row group");
        for (column, value) in entries {
            self.columns.push(column);
            self.values.push(value);
        }
        self.row_indications.push(self.columns.len());
    }

    /// Rewrites every column `c` to `mapping[c]`.
    ///
    /// # Panics
    ///
    /// Panics if a column has no image in `mapping`.
    pub fn replace_columns(&mut self, mapping: &[usize]) {
        for column in self.columns.iter_mut() {
            *column = mapping[*column];
        }
    }

    /// Freezes the builder.
    ///
    /// Each row is sorted by column with duplicate columns summed. The column
    /// count defaults to one past the largest column used.
    ///
    /// # Panics
    ///
    /// Panics if a column is not below an explicitly given `column_count`.
    pub fn build(self, column_count: Option<usize>) -> SparseMatrix {
        let max_column = self.columns.iter().max().map_or(0, |&c| c + 1);
        let column_count = match column_count {
            Some(count) => {
                assert!(
                    max_column <= count,
                    "Column {} out of bounds for {} columns",
                    max_column - 1,
                    count
                );
                count
            }
            None => max_column,
        };

        let mut row_indications = Vec::with_capacity(self.row_indications.len());
        let mut columns = Vec::with_capacity(self.columns.len());
        let mut values = Vec::with_capacity(self.values.len());
        let mut scratch: Vec<(usize, f64)> = Vec::new();

        row_indications.push(0);
        for bounds in self.row_indications.windows(2) {
            scratch.clear();
            scratch.extend(
                self.columns[bounds[0]..bounds[1]]
                    .iter()
                    .copied()
                    .zip(self.values[bounds[0]..bounds[1]].iter().copied()),
            );
            scratch.sort_by_key(|&(c, _)| c);
            for &(column, value) in scratch.iter() {
                if columns.len() > *row_indications.last().unwrap_or(&0) && columns.last() == Some(&column) {
                    if let Some(last) = values.last_mut() {
                        *last += value;
                    }
                } else {
                    columns.push(column);
                    values.push(value);
                }
            }
            row_indications.push(columns.len());
        }

        let mut row_group_indices = self.row_group_indices;
        row_group_indices.push(row_indications.len() - 1);

        SparseMatrix {
            row_indications,
            columns,
            values,
            row_group_indices,
            column_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example() -> SparseMatrix {
        let mut builder = SparseMatrixBuilder::new();
        builder.new_row_group();
        builder.add_row([(2, 0.5), (1, 0.5)]);
        builder.add_row([(0, 1.0)]);
        builder.new_row_group();
        builder.add_row([(1, 1.0)]);
        builder.new_row_group();
        builder.add_row([(0, 0.3), (2, 0.7)]);
        builder.build(Some(3))
    }

    #[test]
    fn test_dimensions() {
        let m = example();
        assert_eq!(m.row_count(), 4);
        assert_eq!(m.column_count(), 3);
        assert_eq!(m.entry_count(), 5);
        assert_eq!(m.row_group_count(), 3);
        assert_eq!(m.row_group(0), 0..2);
        assert_eq!(m.row_group(2), 3..4);
        assert_eq!(m.row_group_indices(), &[0, 2, 3, 4]);
        assert!(!m.has_trivial_row_grouping());
    }

    #[test]
    fn test_rows_are_sorted() {
        let m = example();
        assert_eq!(m.row(0).collect::<Vec<_>>(), vec![(1, 0.5), (2, 0.5)]);
        assert_eq!(m.get(0, 2), Some(0.5));
        assert_eq!(m.get(0, 0), None);
        assert_eq!(m.row_sum(3), 1.0);
    }

    #[test]
    fn test_duplicate_columns_are_summed() {
        let mut builder = SparseMatrixBuilder::new();
        builder.new_row_group();
        builder.add_row([(1, 0.25), (0, 0.5), (1, 0.25)]);
        builder.new_row_group();
        builder.add_row([(1, 1.0)]);
        let m = builder.build(None);
        assert_eq!(m.row(0).collect::<Vec<_>>(), vec![(0, 0.5), (1, 0.5)]);
        assert_eq!(m.row(1).collect::<Vec<_>>(), vec![(1, 1.0)]);
        assert_eq!(m.column_count(), 2);
    }

    #[test]
    fn test_replace_columns() {
        let mut builder = SparseMatrixBuilder::new();
        builder.new_row_group();
        builder.add_row([(0, 0.5), (2, 0.5)]);
        builder.replace_columns(&[2, 0, 1]);
        let m = builder.build(Some(3));
        assert_eq!(m.row(0).collect::<Vec<_>>(), vec![(1, 0.5), (2, 0.5)]);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_column_out_of_bounds() {
        let mut builder = SparseMatrixBuilder::new();
        builder.new_row_group();
        builder.add_row([(5, 1.0)]);
        builder.build(Some(3));
    }

    #[test]
    #[should_panic(expected = "before the first row group")]
    fn test_row_without_group() {
        let mut builder = SparseMatrixBuilder::new();
        builder.add_row([(0, 1.0)]);
    }

    #[test]
    fn test_display() {
        let text = example().to_string();
        assert!(text.starts_with("4 x 3 matrix (3 row groups, 5 entries)"));
        assert!(text.contains("     0 | (1, 0.5) (2, 0.5)"));
    }
}
