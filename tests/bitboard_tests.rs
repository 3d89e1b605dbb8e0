use sinkships::{BitBoard, BitBoardError, CellSet, Coordinate};

type Small = BitBoard<u16, 4>;

#[test]
fn insert_contains_remove() {
    let mut set = CellSet::new();
    let c = Coordinate::new(3, 7);
    assert!(!set.contains(c));
    assert_eq!(set.insert(c), Ok(true));
    assert_eq!(set.insert(c), Ok(false));
    assert!(set.contains(c));
    assert_eq!(set.len(), 1);
    assert!(set.remove(c));
    assert!(!set.remove(c));
    assert!(set.is_empty());
}

#[test]
fn out_of_bounds_rejected() {
    let mut set = CellSet::new();
    let off = Coordinate::new(10, 0);
    assert_eq!(set.insert(off), Err(BitBoardError::OutOfBounds(off)));
    assert!(!set.contains(off));
    assert!(CellSet::from_cells([Coordinate::new(0, 0), off]).is_err());
}

#[test]
fn iter_is_row_major() {
    let set: CellSet = [Coordinate::new(5, 1), Coordinate::new(0, 9), Coordinate::new(5, 0)]
        .into_iter()
        .collect();
    let cells: Vec<_> = set.iter().collect();
    assert_eq!(
        cells,
        vec![Coordinate::new(0, 9), Coordinate::new(5, 0), Coordinate::new(5, 1)]
    );
}

#[test]
fn complement_stays_on_board() {
    let full = !Small::new();
    assert_eq!(full.len(), 16);
    let empty = !full;
    assert!(empty.is_empty());
}

#[test]
fn dilation_covers_eight_neighbours_and_clips() {
    let centre = Small::from_cells([Coordinate::new(1, 1)]).unwrap();
    assert_eq!(centre.dilated().len(), 9);

    let corner = Small::from_cells([Coordinate::new(0, 0)]).unwrap();
    let grown = corner.dilated();
    assert_eq!(grown.len(), 4);
    assert!(grown.contains(Coordinate::new(1, 1)));
    assert!(!grown.contains(Coordinate::new(2, 2)));
}

#[test]
fn set_relations() {
    let a = CellSet::from_cells([Coordinate::new(0, 0), Coordinate::new(0, 1)]).unwrap();
    let b = CellSet::from_cells([Coordinate::new(0, 1)]).unwrap();
    let c = CellSet::from_cells([Coordinate::new(9, 9)]).unwrap();
    assert!(b.is_subset(&a));
    assert!(!a.is_subset(&b));
    assert!(a.is_disjoint(&c));
    assert_eq!((a & b), b);
    assert_eq!((a | c).len(), 3);
}

#[test]
fn raw_round_trip_masks_extra_bits() {
    let set = Small::from_raw(u16::MAX);
    assert_eq!(set.len(), 16);
    let raw = Small::from_cells([Coordinate::new(0, 2)]).unwrap().into_raw();
    assert_eq!(raw, 1 << 2);
}
