use coolfluid::connectivity::Connectivity;
use coolfluid::MeshError;
use proptest::collection::vec;
use proptest::prelude::*;
use util::assert_panics;

#[test]
fn uniform_rows_are_split_by_row_length() {
    let connectivity = Connectivity::from_uniform_rows(vec![0, 1, 2, 3, 4, 5], 3);
    assert_eq!(connectivity.size(), 2);
    assert_eq!(connectivity.row(0), &[0, 1, 2]);
    assert_eq!(&connectivity[1], &[3, 4, 5]);
    assert_eq!(connectivity.row_len(1), Some(3));
    assert_eq!(connectivity.max_index(), Some(5));
}

#[test]
fn mixed_row_lengths() {
    let connectivity = Connectivity::from_rows([vec![0, 1], vec![], vec![4, 2, 7]]);
    assert_eq!(connectivity.size(), 3);
    assert_eq!(connectivity.total_num_indices(), 5);
    assert_eq!(connectivity.row(1), &[] as &[usize]);
    assert_eq!(connectivity.indices(), &[0, 1, 4, 2, 7]);
    assert_eq!(Vec::<Vec<usize>>::from(&connectivity), vec![vec![0, 1], vec![], vec![4, 2, 7]]);
}

#[test]
fn empty_connectivity() {
    let connectivity = Connectivity::new();
    assert!(connectivity.is_empty());
    assert_eq!(connectivity.rows().len(), 0);
    assert_eq!(connectivity.max_index(), None);
    assert_eq!(Connectivity::from_uniform_rows(vec![], 0), connectivity);
}

#[test]
fn out_of_range_rows() {
    let connectivity = Connectivity::from_rows([[0, 1], [1, 2]]);
    assert_eq!(connectivity.try_row(2), Err(MeshError::OutOfRange { index: 2, size: 2 }));
    assert_eq!(connectivity.row_len(2), None);
    assert_panics!(connectivity.row(2));
}

#[test]
fn extend_shifted_appends_offset_rows() {
    let mut connectivity = Connectivity::from_rows([[0, 1]]);
    connectivity.extend_shifted(&Connectivity::from_rows([[0], [1]]), 10);
    assert_eq!(Vec::<Vec<usize>>::from(&connectivity), vec![vec![0, 1], vec![10], vec![11]]);
}

proptest! {
    #[test]
    fn rows_round_trip_through_push_row(rows in vec(vec(0 .. 100usize, 0 .. 5), 0 .. 10)) {
        let mut connectivity = Connectivity::new();
        for row in &rows {
            connectivity.push_row(row);
        }
        prop_assert_eq!(connectivity.size(), rows.len());
        prop_assert_eq!(connectivity.total_num_indices(), rows.iter().map(Vec::len).sum::<usize>());
        for (e, row) in rows.iter().enumerate() {
            prop_assert_eq!(connectivity.row(e), row.as_slice());
        }
    }
}
