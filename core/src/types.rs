use smallvec::SmallVec;

/// Single coordinate axis used for board height, width, and positions.
pub type Coord = u8;

/// Count type used for mine counts and total-cell counts.
pub type CellCount = u16;

/// Two-dimensional coordinates `(row, column)`.
pub type Coord2 = (Coord, Coord);

/// The in-bounds neighbors of a single cell, never more than eight.
pub type Neighborhood = SmallVec<[Coord2; 8]>;

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for Coord2 {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.0.into(), self.1.into()]
    }
}

pub const fn mult(a: Coord, b: Coord) -> CellCount {
    let a = a as CellCount;
    let b = b as CellCount;
    a.saturating_mul(b)
}

/// Whether `coords` lies inside a board of the given `(height, width)`.
pub const fn in_bounds(coords: Coord2, size: Coord2) -> bool {
    coords.0 < size.0 && coords.1 < size.1
}

/// Iterates every cell of a `(height, width)` board in row-major order.
pub fn iter_cells(size: Coord2) -> impl Iterator<Item = Coord2> {
    let (rows, cols) = size;
    (0..rows).flat_map(move |row| (0..cols).map(move |col| (row, col)))
}

/// Collects the 8-neighborhood of `center`, clipped to `size` and excluding `center` itself.
pub fn neighborhood(center: Coord2, size: Coord2) -> Neighborhood {
    NeighborIter::new(center, size).collect()
}

static DISPLACEMENTS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Applies `delta` to `coords`, returning a value only when it remains in bounds.
fn apply_delta(
    (row, col): Coord2,
    (d_row, d_col): (i8, i8),
    (rows, cols): Coord2,
) -> Option<Coord2> {
    let row = row.checked_add_signed(d_row).filter(|&row| row < rows)?;
    let col = col.checked_add_signed(d_col).filter(|&col| col < cols)?;
    Some((row, col))
}

/// Walks the in-bounds neighbors of `center` in row-major order.
#[derive(Clone, Debug)]
pub struct NeighborIter {
    center: Coord2,
    bounds: Coord2,
    deltas: core::slice::Iter<'static, (i8, i8)>,
}

impl NeighborIter {
    pub fn new(center: Coord2, bounds: Coord2) -> Self {
        Self {
            center,
            bounds,
            deltas: DISPLACEMENTS.iter(),
        }
    }
}

impl Iterator for NeighborIter {
    type Item = Coord2;

    fn next(&mut self) -> Option<Self::Item> {
        let (center, bounds) = (self.center, self.bounds);
        self.deltas.find_map(|&delta| apply_delta(center, delta, bounds))
    }
}
