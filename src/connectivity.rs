//! Ragged index tables mapping element-local nodes to global node or DOF indices.
use crate::MeshError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Debug;
use std::ops::{Index, Range};

/// A table with one row of indices per element.
///
/// Rows are stored back to back in a single array. Tables are built in bulk when an entity
/// group or a space is created and are not mutated per lookup afterwards.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connectivity {
    indices: Vec<usize>,
    offsets: Vec<usize>,
}

impl Debug for Connectivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.rows()).finish()
    }
}

impl Default for Connectivity {
    fn default() -> Self {
        Self::new()
    }
}

impl Connectivity {
    pub fn new() -> Self {
        Self {
            indices: Vec::new(),
            offsets: vec![0],
        }
    }

    /// Builds a table in which every row has the same length.
    ///
    /// # Panics
    ///
    /// Panics if `row_len` is zero while `indices` is not empty, or if the number of indices
    /// is not a multiple of `row_len`.
    pub fn from_uniform_rows(indices: Vec<usize>, row_len: usize) -> Self {
        if row_len == 0 {
            assert!(indices.is_empty(), "Rows of length zero can not hold indices.");
            return Self::new();
        }
        assert_eq!(indices.len() % row_len, 0, "Index count must be a multiple of the row length.");
        let offsets = (0..=indices.len() / row_len).map(|i| i * row_len).collect();
        Self { indices, offsets }
    }

    pub fn from_rows<R: AsRef<[usize]>>(rows: impl IntoIterator<Item = R>) -> Self {
        let mut connectivity = Self::new();
        for row in rows {
            connectivity.push_row(row.as_ref());
        }
        connectivity
    }

    pub fn push_row(&mut self, row: &[usize]) {
        self.indices.extend_from_slice(row);
        self.offsets.push(self.indices.len());
    }

    /// Number of rows, i.e. the number of elements described by the table.
    pub fn size(&self) -> usize {
        self.offsets.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Returns the indices of element `e`.
    ///
    /// # Panics
    ///
    /// Panics if `e` is out of range.
    pub fn row(&self, e: usize) -> &[usize] {
        match self.try_row(e) {
            Ok(row) => row,
            Err(err) => panic!("{err}"),
        }
    }

    pub fn try_row(&self, e: usize) -> Result<&[usize], MeshError> {
        let range = self.row_range(e).ok_or(MeshError::OutOfRange {
            index: e,
            size: self.size(),
        })?;
        Ok(&self.indices[range])
    }

    pub fn row_len(&self, e: usize) -> Option<usize> {
        self.row_range(e).map(|range| range.len())
    }

    fn row_range(&self, e: usize) -> Option<Range<usize>> {
        let begin = *self.offsets.get(e)?;
        let end = *self.offsets.get(e + 1)?;
        Some(begin..end)
    }

    pub fn rows(&self) -> impl '_ + ExactSizeIterator<Item = &[usize]> {
        self.offsets
            .windows(2)
            .map(move |window| &self.indices[window[0]..window[1]])
    }

    /// All indices of all rows, in row order.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Total number of stored indices across all rows.
    pub fn total_num_indices(&self) -> usize {
        self.indices.len()
    }

    pub fn max_index(&self) -> Option<usize> {
        self.indices.iter().copied().max()
    }

    /// Appends all rows of `other`, shifting each of its indices by `offset`.
    pub fn extend_shifted(&mut self, other: &Connectivity, offset: usize) {
        for row in other.rows() {
            self.indices.extend(row.iter().map(|i| i + offset));
            self.offsets.push(self.indices.len());
        }
    }
}

impl Index<usize> for Connectivity {
    type Output = [usize];

    fn index(&self, e: usize) -> &[usize] {
        self.row(e)
    }
}

impl<'a> From<&'a Vec<Vec<usize>>> for Connectivity {
    fn from(rows: &'a Vec<Vec<usize>>) -> Self {
        Self::from_rows(rows)
    }
}

impl From<Vec<Vec<usize>>> for Connectivity {
    fn from(rows: Vec<Vec<usize>>) -> Self {
        Self::from(&rows)
    }
}

impl<'a> From<&'a Connectivity> for Vec<Vec<usize>> {
    fn from(connectivity: &Connectivity) -> Self {
        connectivity.rows().map(|row| row.to_vec()).collect()
    }
}
