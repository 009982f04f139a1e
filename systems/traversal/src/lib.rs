#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure planner that fixes the order in which grid cells are composited.
//!
//! Cells are enumerated anti-diagonal by anti-diagonal. Every diagonal holds
//! the cells sharing one depth key (`x + y`), and diagonals are visited from
//! the far corner toward the viewer, so drawing in this order is a valid
//! painter's-algorithm sequence without sorting the grid each frame.

use mipsman_core::CellCoord;

/// Computes the anti-diagonal visitation order for a `rows x columns` grid.
///
/// Within a diagonal cells are ordered by decreasing `x`. Zero-sized grids
/// produce an empty order.
#[must_use]
pub fn compute_order(rows: u32, columns: u32) -> Vec<CellCoord> {
    if rows == 0 || columns == 0 {
        return Vec::new();
    }

    let capacity = usize::try_from(u64::from(rows) * u64::from(columns)).unwrap_or(0);
    let mut order = Vec::with_capacity(capacity);

    for diagonal in 1..=(rows + columns - 1) {
        let start_column = diagonal.saturating_sub(rows);
        let count = diagonal.min(columns - start_column).min(rows);
        let first_x = rows.min(diagonal);

        for step in 0..count {
            order.push(CellCoord::new(first_x - step - 1, start_column + step));
        }
    }

    order
}

/// Cached traversal order tied to the grid dimensions it was planned for.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TraversalOrder {
    rows: u32,
    columns: u32,
    cells: Vec<CellCoord>,
}

impl TraversalOrder {
    /// Plans the order for the provided grid dimensions.
    #[must_use]
    pub fn plan(rows: u32, columns: u32) -> Self {
        Self {
            rows,
            columns,
            cells: compute_order(rows, columns),
        }
    }

    /// Replans only when the dimensions differ from the cached ones.
    ///
    /// Returns `true` when the order was recomputed.
    pub fn replan_if_needed(&mut self, rows: u32, columns: u32) -> bool {
        if self.matches(rows, columns) {
            return false;
        }

        *self = Self::plan(rows, columns);
        true
    }

    /// Whether the cached order was planned for the provided dimensions.
    #[must_use]
    pub const fn matches(&self, rows: u32, columns: u32) -> bool {
        self.rows == rows && self.columns == columns
    }

    /// Rows and columns the order was planned for.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.rows, self.columns)
    }

    /// Cells in visitation order.
    #[must_use]
    pub fn cells(&self) -> &[CellCoord] {
        &self.cells
    }

    /// Iterates over the cells in visitation order.
    pub fn iter(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.cells.iter().copied()
    }

    /// Number of cells in the order.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the order contains no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(pairs: &[(u32, u32)]) -> Vec<CellCoord> {
        pairs.iter().map(|&(x, y)| CellCoord::new(x, y)).collect()
    }

    #[test]
    fn two_by_two_matches_diagonal_formula() {
        assert_eq!(
            compute_order(2, 2),
            cells(&[(0, 0), (1, 0), (0, 1), (1, 1)])
        );
    }

    #[test]
    fn tall_grid_clamps_diagonal_length_to_columns() {
        assert_eq!(
            compute_order(3, 2),
            cells(&[(0, 0), (1, 0), (0, 1), (2, 0), (1, 1), (2, 1)])
        );
    }

    #[test]
    fn wide_grid_starts_later_diagonals_at_offset_column() {
        assert_eq!(
            compute_order(2, 3),
            cells(&[(0, 0), (1, 0), (0, 1), (1, 1), (0, 2), (1, 2)])
        );
    }

    #[test]
    fn zero_dimensions_produce_empty_order() {
        assert!(compute_order(0, 5).is_empty());
        assert!(compute_order(5, 0).is_empty());
    }

    #[test]
    fn replan_only_when_dimensions_change() {
        let mut order = TraversalOrder::plan(3, 3);

        assert!(!order.replan_if_needed(3, 3));
        assert_eq!(order.len(), 9);

        assert!(order.replan_if_needed(4, 2));
        assert_eq!(order.dimensions(), (4, 2));
        assert_eq!(order.len(), 8);
    }
}
