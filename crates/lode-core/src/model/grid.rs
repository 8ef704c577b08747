use crate::model::cell::{Cell, DigBelief, OreBelief};
use crate::model::coord::Coord;
use crate::model::observation::CellReport;

/// Fixed-size board of belief cells, allocated once from the handshake
/// dimensions and never resized.
#[derive(Debug, Clone)]
pub struct Grid {
    width: i32,
    height: i32,
    cells: Vec<Cell>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridError {
    RowCountMismatch { expected: usize, actual: usize },
    ColumnCountMismatch { row: usize, expected: usize, actual: usize },
}

impl Grid {
    pub fn new(width: u32, height: u32) -> Self {
        let width = width as i32;
        let height = height as i32;
        let mut cells = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            for x in 0..width {
                cells.push(Cell::new(Coord::new(x, y)));
            }
        }
        Self {
            width,
            height,
            cells,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn in_bounds(&self, coord: Coord) -> bool {
        coord.x >= 0 && coord.x < self.width && coord.y >= 0 && coord.y < self.height
    }

    fn index(&self, coord: Coord) -> usize {
        (coord.y * self.width + coord.x) as usize
    }

    pub fn cell(&self, coord: Coord) -> Option<&Cell> {
        self.in_bounds(coord).then(|| &self.cells[self.index(coord)])
    }

    pub fn cell_mut(&mut self, coord: Coord) -> Option<&mut Cell> {
        if self.in_bounds(coord) {
            let index = self.index(coord);
            Some(&mut self.cells[index])
        } else {
            None
        }
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// The up-to-4 orthogonally adjacent coordinates (fewer at edges).
    pub fn neighbors(&self, coord: Coord) -> Vec<Coord> {
        let candidates = [
            Coord::new(coord.x - 1, coord.y),
            Coord::new(coord.x + 1, coord.y),
            Coord::new(coord.x, coord.y - 1),
            Coord::new(coord.x, coord.y + 1),
        ];
        candidates
            .into_iter()
            .filter(|c| self.in_bounds(*c))
            .collect()
    }

    /// Merges one full-board observation and runs the per-turn recompute:
    /// transient cell state is reset, every ore/dig token is folded in under
    /// the monotone rules, and stale marks are dropped. Board dimensions are
    /// fixed for the match, so a shape mismatch is a fatal input error.
    pub fn apply_observation(
        &mut self,
        rows: &[Vec<CellReport>],
        turn: u32,
        mark_ttl: u32,
    ) -> Result<(), GridError> {
        if rows.len() != self.height as usize {
            return Err(GridError::RowCountMismatch {
                expected: self.height as usize,
                actual: rows.len(),
            });
        }
        for (y, row) in rows.iter().enumerate() {
            if row.len() != self.width as usize {
                return Err(GridError::ColumnCountMismatch {
                    row: y,
                    expected: self.width as usize,
                    actual: row.len(),
                });
            }
        }

        for (y, row) in rows.iter().enumerate() {
            for (x, report) in row.iter().enumerate() {
                let index = (y * self.width as usize) + x;
                let cell = &mut self.cells[index];
                cell.begin_turn();
                cell.merge_ore(report.ore);
                cell.merge_dig(report.hole, turn);
                cell.expire_mark(turn, mark_ttl);
            }
        }
        Ok(())
    }

    pub fn mark(&mut self, coord: Coord, turn: u32) {
        if let Some(cell) = self.cell_mut(coord) {
            cell.mark(turn);
        }
    }

    /// Applies the inference that a dig at `at` yielded a resource: the cell
    /// itself gains (or depletes) a known amount and every neighbor becomes a
    /// potential follow-up site.
    pub fn register_yield(&mut self, at: Coord, turn: u32, default_yield: u16) {
        let Some(cell) = self.cell_mut(at) else {
            return;
        };
        cell.record_yield(default_yield);
        for neighbor in self.neighbors(at) {
            self.mark(neighbor, turn);
        }
    }

    /// Cells believed to still hold ore, with their amounts.
    pub fn known_ore_cells(&self) -> Vec<(Coord, u16)> {
        self.cells
            .iter()
            .filter_map(|cell| match cell.ore() {
                OreBelief::Known(amount) if amount > 0 => Some((cell.coord(), amount)),
                _ => None,
            })
            .collect()
    }

    /// Cells carrying a live POTENTIAL mark.
    pub fn marked_cells(&self) -> Vec<Coord> {
        self.cells
            .iter()
            .filter(|cell| cell.ore().is_potential())
            .map(Cell::coord)
            .collect()
    }

    /// Cells known to have been dug, with the turn the hole was first seen.
    pub fn dug_cells(&self) -> Vec<(Coord, u32)> {
        self.cells
            .iter()
            .filter_map(|cell| match cell.dig() {
                DigBelief::Dug { turn } => Some((cell.coord(), turn)),
                DigBelief::Undug => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{Grid, GridError};
    use crate::model::cell::{DigBelief, OreBelief};
    use crate::model::coord::Coord;
    use crate::model::observation::{CellReport, OreToken, TurnObservation};

    fn observed(grid: &mut Grid, obs: &TurnObservation, turn: u32) {
        grid.apply_observation(&obs.cells, turn, 10).expect("shape");
    }

    #[test]
    fn corner_and_interior_neighbor_counts() {
        let grid = Grid::new(4, 3);
        assert_eq!(grid.neighbors(Coord::new(0, 0)).len(), 2);
        assert_eq!(grid.neighbors(Coord::new(1, 0)).len(), 3);
        assert_eq!(grid.neighbors(Coord::new(1, 1)).len(), 4);
    }

    #[test]
    fn rejects_row_count_mismatch() {
        let mut grid = Grid::new(4, 3);
        let obs = TurnObservation::unknown_board(4, 2);
        assert_eq!(
            grid.apply_observation(&obs.cells, 1, 10),
            Err(GridError::RowCountMismatch {
                expected: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn rejects_column_count_mismatch() {
        let mut grid = Grid::new(4, 3);
        let mut obs = TurnObservation::unknown_board(4, 3);
        obs.cells[1].pop();
        assert_eq!(
            grid.apply_observation(&obs.cells, 1, 10),
            Err(GridError::ColumnCountMismatch {
                row: 1,
                expected: 4,
                actual: 3
            })
        );
    }

    #[test]
    fn repeated_identical_observation_is_idempotent() {
        let mut grid = Grid::new(4, 3);
        let mut obs = TurnObservation::unknown_board(4, 3);
        obs.set_cell(
            Coord::new(2, 1),
            CellReport {
                ore: OreToken::Amount(3),
                hole: false,
            },
        );

        observed(&mut grid, &obs, 1);
        observed(&mut grid, &obs, 2);

        assert_eq!(grid.known_ore_cells(), vec![(Coord::new(2, 1), 3)]);
    }

    #[test]
    fn dig_belief_is_monotone_across_turns() {
        let mut grid = Grid::new(4, 3);
        let mut dug = TurnObservation::unknown_board(4, 3);
        dug.set_cell(
            Coord::new(1, 1),
            CellReport {
                ore: OreToken::Unknown,
                hole: true,
            },
        );

        observed(&mut grid, &dug, 1);
        let blank = TurnObservation::unknown_board(4, 3);
        observed(&mut grid, &blank, 2);

        assert_eq!(
            grid.cell(Coord::new(1, 1)).unwrap().dig(),
            DigBelief::Dug { turn: 1 }
        );
    }

    #[test]
    fn marks_survive_until_the_ttl_then_expire() {
        let mut grid = Grid::new(4, 3);
        let blank = TurnObservation::unknown_board(4, 3);
        observed(&mut grid, &blank, 1);
        grid.mark(Coord::new(2, 1), 1);

        for turn in 2..=11 {
            grid.apply_observation(&blank.cells, turn, 10).unwrap();
            assert_eq!(grid.marked_cells(), vec![Coord::new(2, 1)], "turn {turn}");
        }

        grid.apply_observation(&blank.cells, 12, 10).unwrap();
        assert!(grid.marked_cells().is_empty());
    }

    #[test]
    fn register_yield_sets_default_and_marks_neighbors() {
        let mut grid = Grid::new(7, 7);
        let blank = TurnObservation::unknown_board(7, 7);
        observed(&mut grid, &blank, 1);

        grid.register_yield(Coord::new(3, 3), 1, 2);

        assert_eq!(
            grid.cell(Coord::new(3, 3)).unwrap().ore(),
            OreBelief::Known(2)
        );
        let mut marked = grid.marked_cells();
        marked.sort();
        assert_eq!(
            marked,
            vec![
                Coord::new(2, 3),
                Coord::new(3, 2),
                Coord::new(3, 4),
                Coord::new(4, 3),
            ]
        );
    }

    #[test]
    fn register_yield_depletes_known_cells() {
        let mut grid = Grid::new(4, 3);
        let mut obs = TurnObservation::unknown_board(4, 3);
        obs.set_cell(
            Coord::new(2, 1),
            CellReport {
                ore: OreToken::Amount(3),
                hole: false,
            },
        );
        observed(&mut grid, &obs, 1);

        grid.register_yield(Coord::new(2, 1), 1, 2);

        assert_eq!(
            grid.cell(Coord::new(2, 1)).unwrap().ore(),
            OreBelief::Known(2)
        );
    }

    #[test]
    fn known_zero_is_not_an_ore_candidate() {
        let mut grid = Grid::new(4, 3);
        let mut obs = TurnObservation::unknown_board(4, 3);
        obs.set_cell(
            Coord::new(2, 1),
            CellReport {
                ore: OreToken::Amount(0),
                hole: false,
            },
        );
        observed(&mut grid, &obs, 1);

        assert!(grid.known_ore_cells().is_empty());
        assert!(grid.cell(Coord::new(2, 1)).unwrap().ore().is_known());
    }
}
