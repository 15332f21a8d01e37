//! Element coloring for race-free parallel scatter.
use crate::connectivity::Connectivity;
use rustc_hash::FxHashSet;

/// Partitions the rows of `connectivity` into colors such that no two rows of the same color
/// share an index.
///
/// Rows are visited in order and put into the first color they do not conflict with.
pub fn sequential_greedy_coloring(connectivity: &Connectivity) -> Vec<Vec<usize>> {
    let mut colors: Vec<(Vec<usize>, FxHashSet<usize>)> = Vec::new();

    'row_loop: for (e, row) in connectivity.rows().enumerate() {
        for (elements, indices) in &mut colors {
            if row.iter().all(|index| !indices.contains(index)) {
                elements.push(e);
                indices.extend(row);
                continue 'row_loop;
            }
        }

        // The row conflicts with every existing color
        colors.push((vec![e], row.iter().copied().collect()));
    }

    colors
        .into_iter()
        .map(|(elements, _)| elements)
        .collect()
}
