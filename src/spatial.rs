//! Uniform spatial grid for bounded neighbor search.
//!
//! The grid partitions the surface into square cells whose edge equals the link distance, so
//! any two particles close enough to be linked sit in the same or adjacent cells.
//!
//! Storage is a fixed-capacity arena rebuilt every frame with a counting sort:
//!
//! 1. [`SpatialGrid::begin`] zeroes the per-cell counts
//! 2. [`SpatialGrid::insert`] records each particle's cell and bumps its count
//! 3. [`SpatialGrid::finish`] prefix-sums the counts into cell offsets and scatters particle
//!    indices into one flat array
//!
//! After `finish`, [`SpatialGrid::cell`] returns the members of a cell as a slice in ascending
//! particle order. Memory is only reallocated when the grid dimensions change on resize.
//!
//! The total cell count is capped at [`MAX_CELLS`]. When the requested cell size would need
//! more cells, the grid falls back to larger cells; close pairs still share a cell or sit in
//! adjacent ones.

use glam::Vec2;

/// Upper bound on `cols * rows`.
pub const MAX_CELLS: usize = 1 << 18;

/// A `cols × rows` partition of the surface, indexed row-major.
#[derive(Clone, Debug)]
pub struct SpatialGrid {
    /// Requested edge length, the lower bound for `cell_size`.
    min_cell_size: f32,
    /// Edge length of each cell in surface pixels.
    cell_size: f32,
    cols: usize,
    rows: usize,
    /// Start offset of each cell in `entries`, plus a trailing end offset (`cols * rows + 1`).
    cell_start: Vec<usize>,
    /// Write cursor per cell, only used while scattering.
    cursor: Vec<usize>,
    /// Particle indices grouped by cell.
    entries: Vec<usize>,
    /// Cell assigned to each particle this frame.
    particle_cell: Vec<usize>,
}

impl SpatialGrid {
    /// Create a grid covering `bounds` with room for `capacity` particles.
    pub fn new(bounds: Vec2, cell_size: f32, capacity: usize) -> Self {
        let mut grid = Self {
            min_cell_size: cell_size,
            cell_size,
            cols: 1,
            rows: 1,
            cell_start: Vec::new(),
            cursor: Vec::new(),
            entries: vec![0; capacity],
            particle_cell: vec![0; capacity],
        };
        grid.resize(bounds);
        grid
    }

    /// Recompute the grid dimensions for new surface bounds.
    ///
    /// Cell membership is emptied; it is rebuilt on the next frame. Cells grow beyond the
    /// requested size when the surface would otherwise need more than [`MAX_CELLS`].
    pub fn resize(&mut self, bounds: Vec2) {
        let mut edge = self.min_cell_size;
        let cells = loop {
            self.cols = cells_along(bounds.x, edge);
            self.rows = cells_along(bounds.y, edge);
            match self.cols.checked_mul(self.rows) {
                Some(cells) if cells <= MAX_CELLS => break cells,
                _ => edge = (edge * 2.0).max(bounds.max_element() / MAX_CELLS as f32),
            }
        };
        if edge > self.min_cell_size {
            log::debug!(
                "Grid capped at {}x{} cells of {} px (requested {} px)",
                self.cols,
                self.rows,
                edge,
                self.min_cell_size
            );
        }
        self.cell_size = edge;

        self.cell_start.clear();
        self.cell_start.resize(cells + 1, 0);
        self.cursor.clear();
        self.cursor.resize(cells, 0);
    }

    /// Grid dimensions as `(cols, rows)`.
    #[inline]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.cols, self.rows)
    }

    /// Edge length of a cell. At least the requested size; larger when the grid is capped.
    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Total number of cells.
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cols * self.rows
    }

    /// Number of particles the grid was sized for.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.particle_cell.len()
    }

    /// Cell containing `position`. Coordinates outside the grid clamp to the border cells.
    pub fn cell_index(&self, position: Vec2) -> usize {
        let col = clamp_cell(position.x / self.cell_size, self.cols);
        let row = clamp_cell(position.y / self.cell_size, self.rows);
        row * self.cols + col
    }

    /// Start a new frame: every cell becomes empty.
    pub fn begin(&mut self) {
        self.cell_start.fill(0);
    }

    /// Place particle `index` at `position` for this frame.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not below [`capacity`](Self::capacity).
    pub fn insert(&mut self, index: usize, position: Vec2) {
        let cell = self.cell_index(position);
        self.particle_cell[index] = cell;
        self.cell_start[cell + 1] += 1;
    }

    /// Turn this frame's counts into offsets and group particle indices by cell.
    ///
    /// Every particle index below [`capacity`](Self::capacity) must have been inserted since
    /// [`begin`](Self::begin).
    pub fn finish(&mut self) {
        for cell in 0..self.cell_count() {
            self.cell_start[cell + 1] += self.cell_start[cell];
        }

        let cells = self.cell_count();
        self.cursor.copy_from_slice(&self.cell_start[..cells]);
        for (index, &cell) in self.particle_cell.iter().enumerate() {
            self.entries[self.cursor[cell]] = index;
            self.cursor[cell] += 1;
        }
    }

    /// Particle indices in `cell`, ascending.
    #[inline]
    pub fn cell(&self, cell: usize) -> &[usize] {
        &self.entries[self.cell_start[cell]..self.cell_start[cell + 1]]
    }

    /// Cell each particle was assigned to this frame.
    #[inline]
    pub fn particle_cells(&self) -> &[usize] {
        &self.particle_cell
    }

    /// Forward half of the 8-neighborhood of `cell`: right, down-left, down and down-right.
    ///
    /// Walking every cell together with these four neighbors visits each unordered pair of
    /// adjacent cells exactly once. Neighbors outside the grid are `None`.
    pub fn forward_neighbors(&self, cell: usize) -> [Option<usize>; 4] {
        let col = cell % self.cols;
        let row = cell / self.cols;
        let has_right = col + 1 < self.cols;
        let has_left = col > 0;
        let has_down = row + 1 < self.rows;

        [
            has_right.then(|| cell + 1),
            (has_down && has_left).then(|| cell + self.cols - 1),
            has_down.then(|| cell + self.cols),
            (has_down && has_right).then(|| cell + self.cols + 1),
        ]
    }
}

/// Number of cells needed to span `extent`, at least one.
fn cells_along(extent: f32, cell_size: f32) -> usize {
    let cells = (extent / cell_size).ceil();
    if cells.is_finite() && cells >= 1.0 {
        cells as usize
    } else {
        1
    }
}

/// Truncate a fractional cell coordinate into `0..count`. NaN and negatives map to 0.
#[inline]
fn clamp_cell(coordinate: f32, count: usize) -> usize {
    (coordinate as usize).min(count - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn populated(bounds: Vec2, cell_size: f32, positions: &[Vec2]) -> SpatialGrid {
        let mut grid = SpatialGrid::new(bounds, cell_size, positions.len());
        grid.begin();
        for (i, &p) in positions.iter().enumerate() {
            grid.insert(i, p);
        }
        grid.finish();
        grid
    }

    #[test]
    fn test_dimensions_round_up() {
        let grid = SpatialGrid::new(Vec2::new(1000.0, 500.0), 110.0, 0);
        assert_eq!(grid.dimensions(), (10, 5));
        assert_eq!(grid.cell_count(), 50);
    }

    #[test]
    fn test_exact_multiple() {
        let grid = SpatialGrid::new(Vec2::new(220.0, 110.0), 110.0, 0);
        assert_eq!(grid.dimensions(), (2, 1));
    }

    #[test]
    fn test_zero_size_clamps_to_one_cell() {
        let grid = SpatialGrid::new(Vec2::ZERO, 110.0, 4);
        assert_eq!(grid.dimensions(), (1, 1));
    }

    #[test]
    fn test_degenerate_cell_size_clamps_to_one_cell() {
        assert_eq!(SpatialGrid::new(Vec2::splat(100.0), 0.0, 0).dimensions(), (1, 1));
        assert_eq!(SpatialGrid::new(Vec2::splat(100.0), f32::NAN, 0).dimensions(), (1, 1));
        assert_eq!(SpatialGrid::new(Vec2::splat(100.0), -5.0, 0).dimensions(), (1, 1));
    }

    #[test]
    fn test_tiny_cell_size_caps_cell_count() {
        let positions = [Vec2::new(0.0, 0.0), Vec2::new(320.0, 240.0), Vec2::new(639.0, 479.0)];
        let grid = populated(Vec2::new(640.0, 480.0), 1e-30, &positions);

        assert!(grid.cell_count() <= MAX_CELLS);
        assert!(grid.cell_size() >= 1e-30);
        let (cols, rows) = grid.dimensions();
        assert!(cols as f32 * grid.cell_size() >= 640.0);
        assert!(rows as f32 * grid.cell_size() >= 480.0);

        let mut seen: Vec<usize> = (0..grid.cell_count())
            .flat_map(|c| grid.cell(c).iter().copied())
            .collect();
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2]);
    }

    #[test]
    fn test_cap_keeps_requested_size_when_it_fits() {
        let grid = SpatialGrid::new(Vec2::new(1920.0, 1080.0), 4.0, 0);
        assert_eq!(grid.dimensions(), (480, 270));
        assert_eq!(grid.cell_size(), 4.0);

        let grid = SpatialGrid::new(Vec2::new(1920.0, 1080.0), 1.0, 0);
        assert!(grid.cell_count() <= MAX_CELLS);
        assert!(grid.cell_size() > 1.0);
    }

    #[test]
    fn test_cap_on_thin_surface() {
        let grid = SpatialGrid::new(Vec2::new(1.0e9, 1.0), 1.0, 0);
        assert!(grid.cell_count() <= MAX_CELLS);
        assert_eq!(grid.dimensions().1, 1);
    }

    #[test]
    fn test_resize_recomputes_dimensions() {
        let mut grid = SpatialGrid::new(Vec2::new(1000.0, 500.0), 100.0, 0);
        grid.resize(Vec2::new(250.0, 801.0));
        assert_eq!(grid.dimensions(), (3, 9));
    }

    #[test]
    fn test_cell_index_row_major() {
        let grid = SpatialGrid::new(Vec2::new(300.0, 200.0), 100.0, 0);
        assert_eq!(grid.cell_index(Vec2::new(0.0, 0.0)), 0);
        assert_eq!(grid.cell_index(Vec2::new(150.0, 50.0)), 1);
        assert_eq!(grid.cell_index(Vec2::new(250.0, 150.0)), 5);
    }

    #[test]
    fn test_cell_index_clamps_outside_points() {
        let grid = SpatialGrid::new(Vec2::new(300.0, 200.0), 100.0, 0);
        assert_eq!(grid.cell_index(Vec2::new(-20.0, -20.0)), 0);
        assert_eq!(grid.cell_index(Vec2::new(5000.0, 5000.0)), 5);
        assert_eq!(grid.cell_index(Vec2::new(f32::NAN, 150.0)), 3);
    }

    #[test]
    fn test_partition_covers_every_index_once() {
        let positions: Vec<Vec2> = (0..97)
            .map(|i| Vec2::new((i * 37 % 640) as f32, (i * 53 % 480) as f32))
            .collect();
        let grid = populated(Vec2::new(640.0, 480.0), 110.0, &positions);

        let mut seen: Vec<usize> = (0..grid.cell_count())
            .flat_map(|c| grid.cell(c).iter().copied())
            .collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..97).collect::<Vec<_>>());
    }

    #[test]
    fn test_members_ascending_within_cell() {
        let positions = [
            Vec2::new(10.0, 10.0),
            Vec2::new(150.0, 10.0),
            Vec2::new(20.0, 20.0),
            Vec2::new(30.0, 30.0),
        ];
        let grid = populated(Vec2::new(200.0, 100.0), 100.0, &positions);
        assert_eq!(grid.cell(0), &[0, 2, 3]);
        assert_eq!(grid.cell(1), &[1]);
        assert_eq!(grid.particle_cells(), &[0, 1, 0, 0]);
    }

    #[test]
    fn test_begin_clears_previous_frame() {
        let positions = [Vec2::new(10.0, 10.0), Vec2::new(150.0, 10.0)];
        let mut grid = populated(Vec2::new(200.0, 100.0), 100.0, &positions);

        grid.begin();
        grid.insert(0, Vec2::new(150.0, 50.0));
        grid.insert(1, Vec2::new(160.0, 50.0));
        grid.finish();

        assert!(grid.cell(0).is_empty());
        assert_eq!(grid.cell(1), &[0, 1]);
    }

    #[test]
    fn test_forward_neighbors_interior() {
        // 3x3 grid, center cell 4
        let grid = SpatialGrid::new(Vec2::splat(300.0), 100.0, 0);
        assert_eq!(grid.forward_neighbors(4), [Some(5), Some(6), Some(7), Some(8)]);
    }

    #[test]
    fn test_forward_neighbors_edges() {
        let grid = SpatialGrid::new(Vec2::splat(300.0), 100.0, 0);
        // top-left
        assert_eq!(grid.forward_neighbors(0), [Some(1), None, Some(3), Some(4)]);
        // right column
        assert_eq!(grid.forward_neighbors(5), [None, Some(7), Some(8), None]);
        // bottom row
        assert_eq!(grid.forward_neighbors(7), [Some(8), None, None, None]);
    }

    #[test]
    fn test_forward_neighbors_visit_each_adjacent_pair_once() {
        let grid = SpatialGrid::new(Vec2::new(500.0, 400.0), 100.0, 0);
        let (cols, rows) = grid.dimensions();
        let mut visited = std::collections::HashSet::new();

        for cell in 0..grid.cell_count() {
            for neighbor in grid.forward_neighbors(cell).into_iter().flatten() {
                let pair = (cell.min(neighbor), cell.max(neighbor));
                assert!(visited.insert(pair), "pair {:?} visited twice", pair);
            }
        }

        // every 8-adjacent pair: horizontal + vertical + two diagonals
        let expected = rows * (cols - 1) + cols * (rows - 1) + 2 * (cols - 1) * (rows - 1);
        assert_eq!(visited.len(), expected);
    }

    #[test]
    fn test_single_column_has_no_sideways_neighbors() {
        let grid = SpatialGrid::new(Vec2::new(50.0, 300.0), 100.0, 0);
        assert_eq!(grid.dimensions(), (1, 3));
        assert_eq!(grid.forward_neighbors(0), [None, None, Some(1), None]);
    }
}
