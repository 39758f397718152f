use std::collections::HashMap;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::error::{GameError, Result};
use crate::game::cell::Cell;
use crate::model::{BoardView, CellState, CellView, Settings};

/// Cell grid with deferred mine placement. Mines are only placed on the
/// first reveal, after the triggering cell has been opened, so the first
/// click can never hit one.
#[derive(Debug)]
pub struct Board {
    settings: Settings,
    cells: HashMap<(usize, usize), Cell>,
    mines_placed: bool,
}

impl Board {
    pub fn new(settings: Settings) -> Result<Self> {
        if settings.mines >= settings.rows * settings.cols {
            return Err(GameError::InvalidConfiguration {
                rows: settings.rows,
                cols: settings.cols,
                mines: settings.mines,
            });
        }

        let mut cells = HashMap::with_capacity(settings.rows * settings.cols);
        for x in 0..settings.cols {
            for y in 0..settings.rows {
                cells.insert((x, y), Cell::new(x, y));
            }
        }

        Ok(Self {
            settings,
            cells,
            mines_placed: false,
        })
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    fn in_bounds(&self, x: usize, y: usize) -> bool {
        x < self.settings.cols && y < self.settings.rows
    }

    pub fn cell_at(&self, x: usize, y: usize) -> Result<&Cell> {
        if !self.in_bounds(x, y) {
            return Err(GameError::OutOfBounds {
                x,
                y,
                x_max: self.settings.cols - 1,
                y_max: self.settings.rows - 1,
            });
        }

        self.cells
            .get(&(x, y))
            .ok_or(GameError::CellNotFound { x, y })
    }

    pub fn cell_at_mut(&mut self, x: usize, y: usize) -> Result<&mut Cell> {
        if !self.in_bounds(x, y) {
            return Err(GameError::OutOfBounds {
                x,
                y,
                x_max: self.settings.cols - 1,
                y_max: self.settings.rows - 1,
            });
        }

        self.cells
            .get_mut(&(x, y))
            .ok_or(GameError::CellNotFound { x, y })
    }

    /// In-bounds neighbors of `(x, y)`, up to 8 of them. Neighbors outside
    /// the grid are skipped, not reported as errors.
    pub fn adjacent_coords(&self, x: usize, y: usize) -> Vec<(usize, usize)> {
        let mut coords = Vec::with_capacity(8);

        for dx in -1isize..=1 {
            for dy in -1isize..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }

                let (Some(nx), Some(ny)) = (x.checked_add_signed(dx), y.checked_add_signed(dy))
                else {
                    continue;
                };

                if self.in_bounds(nx, ny) {
                    coords.push((nx, ny));
                }
            }
        }

        coords
    }

    pub fn count_adjacent_mines(&self, x: usize, y: usize) -> u8 {
        self.adjacent_coords(x, y)
            .into_iter()
            .filter(|coord| self.cells.get(coord).is_some_and(Cell::is_mine))
            .count() as u8
    }

    pub fn count_adjacent_flags(&self, x: usize, y: usize) -> u8 {
        self.adjacent_coords(x, y)
            .into_iter()
            .filter(|coord| self.cells.get(coord).is_some_and(Cell::is_flagged))
            .count() as u8
    }

    /// Shuffle-and-take placement over the eligible coordinates: exactly
    /// `settings.mines` cells get a mine and the loop always terminates,
    /// unlike rejection sampling.
    fn place_mines_with<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let mut eligible: Vec<(usize, usize)> = self
            .cells
            .values()
            .filter(|cell| !cell.is_mine() && !cell.is_opened())
            .map(|cell| (cell.x(), cell.y()))
            .collect();

        // HashMap iteration order is arbitrary; sort first so a seeded rng
        // reproduces the same layout.
        eligible.sort_unstable();
        eligible.shuffle(rng);

        for &(x, y) in eligible.iter().take(self.settings.mines) {
            if let Some(cell) = self.cells.get_mut(&(x, y)) {
                cell.set_mine(true);
            }
        }

        self.mines_placed = true;
    }

    pub fn mines_placed(&self) -> bool {
        self.mines_placed
    }

    /// Fixed layout for tests; marks placement as done so a later reveal
    /// does not add more mines on top.
    #[cfg(test)]
    pub(crate) fn place_mines_at(&mut self, coords: &[(usize, usize)]) {
        for &(x, y) in coords {
            if let Some(cell) = self.cells.get_mut(&(x, y)) {
                cell.set_mine(true);
            }
        }
        self.mines_placed = true;
    }

    pub fn reveal(&mut self, x: usize, y: usize) -> Result<Vec<(usize, usize)>> {
        self.reveal_with(x, y, &mut rand::rng())
    }

    /// Opens the cell at `(x, y)` and flood-fills outward from cells with no
    /// adjacent mines. Returns every coordinate opened by this one action.
    ///
    /// Flagged cells are protected: revealing one is a no-op, and the
    /// cascade steps around them. Expansion only continues from
    /// zero-adjacent-mine cells, so the cascade itself can never open a
    /// mine.
    pub fn reveal_with<R: Rng + ?Sized>(
        &mut self,
        x: usize,
        y: usize,
        rng: &mut R,
    ) -> Result<Vec<(usize, usize)>> {
        let cell = self.cell_at(x, y)?;
        if cell.is_opened() || cell.is_flagged() {
            return Ok(Vec::new());
        }

        let mut opened = Vec::new();
        self.open_cell(x, y, &mut opened)?;

        // First reveal of the game. The cell above is already opened, which
        // keeps it out of the eligible set.
        if !self.mines_placed {
            self.place_mines_with(rng);
        }

        // Iterative worklist instead of recursion; the opened state doubles
        // as the visited set, so each coordinate is processed at most once.
        let mut worklist = Vec::new();
        if self.count_adjacent_mines(x, y) == 0 {
            worklist.push((x, y));
        }

        while let Some((cx, cy)) = worklist.pop() {
            for (nx, ny) in self.adjacent_coords(cx, cy) {
                let neighbor = self.cell_at(nx, ny)?;
                if neighbor.is_opened() || neighbor.is_flagged() {
                    continue;
                }

                self.open_cell(nx, ny, &mut opened)?;
                if self.count_adjacent_mines(nx, ny) == 0 {
                    worklist.push((nx, ny));
                }
            }
        }

        Ok(opened)
    }

    fn open_cell(&mut self, x: usize, y: usize, opened: &mut Vec<(usize, usize)>) -> Result<()> {
        self.cell_at_mut(x, y)?.set_state(CellState::Opened)?;
        opened.push((x, y));
        Ok(())
    }

    pub fn closed_count(&self) -> usize {
        self.cells.values().filter(|cell| !cell.is_opened()).count()
    }

    pub fn opened_count(&self) -> usize {
        self.cells.values().filter(|cell| cell.is_opened()).count()
    }

    pub fn any_mine_opened(&self) -> bool {
        self.cells
            .values()
            .any(|cell| cell.is_opened() && cell.is_mine())
    }

    /// Won iff only the mines remain unopened.
    pub fn check_win(&self) -> bool {
        self.closed_count() == self.settings.mines
    }

    pub fn mine_count(&self) -> usize {
        self.cells.values().filter(|cell| cell.is_mine()).count()
    }

    pub fn cell_view(&self, x: usize, y: usize, with_mine: bool) -> Result<CellView> {
        let cell = self.cell_at(x, y)?;
        Ok(cell.view(self.count_adjacent_mines(x, y), with_mine))
    }

    pub fn views_for(&self, coords: &[(usize, usize)]) -> Result<Vec<CellView>> {
        coords
            .iter()
            .map(|&(x, y)| self.cell_view(x, y, false))
            .collect()
    }

    pub fn serialize(&self, with_mines: bool) -> BoardView {
        let mut cells = Vec::with_capacity(self.settings.rows * self.settings.cols);

        for y in 0..self.settings.rows {
            for x in 0..self.settings.cols {
                if let Some(cell) = self.cells.get(&(x, y)) {
                    cells.push(cell.view(self.count_adjacent_mines(x, y), with_mines));
                }
            }
        }

        BoardView {
            settings: self.settings,
            cells,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn board(rows: usize, cols: usize, mines: usize) -> Board {
        Board::new(Settings { rows, cols, mines }).unwrap()
    }

    #[test]
    fn rejects_too_many_mines() {
        let err = Board::new(Settings {
            rows: 3,
            cols: 3,
            mines: 9,
        })
        .unwrap_err();
        assert!(matches!(err, GameError::InvalidConfiguration { mines: 9, .. }));
    }

    #[test]
    fn cell_at_reports_bounds() {
        let board = board(4, 6, 3);
        assert!(board.cell_at(5, 3).is_ok());
        assert_eq!(
            board.cell_at(6, 0).unwrap_err(),
            GameError::OutOfBounds {
                x: 6,
                y: 0,
                x_max: 5,
                y_max: 3,
            }
        );
        assert!(board.cell_at(0, 4).is_err());
    }

    #[test]
    fn adjacent_coords_excludes_out_of_bounds() {
        let board = board(3, 3, 1);
        assert_eq!(board.adjacent_coords(0, 0).len(), 3);
        assert_eq!(board.adjacent_coords(1, 0).len(), 5);
        assert_eq!(board.adjacent_coords(1, 1).len(), 8);
        assert_eq!(board.adjacent_coords(2, 2).len(), 3);
    }

    #[test]
    fn first_reveal_places_exact_mine_count_and_spares_trigger() {
        for seed in 0..20 {
            let mut board = board(10, 10, 10);
            let mut rng = StdRng::seed_from_u64(seed);

            assert!(!board.mines_placed());
            let opened = board.reveal_with(5, 5, &mut rng).unwrap();

            assert!(board.mines_placed());
            assert_eq!(board.mine_count(), 10);
            assert!(opened.contains(&(5, 5)));
            assert!(!board.cell_at(5, 5).unwrap().is_mine());
        }
    }

    #[test]
    fn reveal_on_flagged_cell_is_a_noop() {
        let mut board = board(5, 5, 3);
        board
            .cell_at_mut(2, 2)
            .unwrap()
            .set_state(CellState::Flagged)
            .unwrap();

        let opened = board.reveal_with(2, 2, &mut StdRng::seed_from_u64(1)).unwrap();
        assert!(opened.is_empty());
        assert!(!board.mines_placed());
        assert!(board.cell_at(2, 2).unwrap().is_flagged());
    }

    #[test]
    fn flood_fill_opens_whole_board_when_mine_free_region_connects() {
        // 0 mines: the very first reveal cascades across the entire grid.
        let mut board = board(4, 4, 0);
        let opened = board.reveal_with(0, 0, &mut StdRng::seed_from_u64(7)).unwrap();

        assert_eq!(opened.len(), 16);
        assert_eq!(board.closed_count(), 0);
        assert!(board.check_win());
    }

    #[test]
    fn flood_fill_is_idempotent_on_opened_region() {
        let mut board = board(4, 4, 0);
        let mut rng = StdRng::seed_from_u64(7);
        board.reveal_with(1, 1, &mut rng).unwrap();

        for x in 0..4 {
            for y in 0..4 {
                assert!(board.reveal_with(x, y, &mut rng).unwrap().is_empty());
            }
        }
    }

    #[test]
    fn flood_fill_never_opens_a_mine() {
        for seed in 0..50 {
            let mut board = board(8, 8, 12);
            let mut rng = StdRng::seed_from_u64(seed);
            board.reveal_with(4, 4, &mut rng).unwrap();
            assert!(!board.any_mine_opened());
        }
    }

    #[test]
    fn flood_fill_stops_at_flagged_cells() {
        let mut board = board(3, 3, 0);
        board
            .cell_at_mut(2, 2)
            .unwrap()
            .set_state(CellState::Flagged)
            .unwrap();

        let opened = board.reveal_with(0, 0, &mut StdRng::seed_from_u64(3)).unwrap();
        assert_eq!(opened.len(), 8);
        assert!(board.cell_at(2, 2).unwrap().is_flagged());
    }

    #[test]
    fn win_requires_every_safe_cell_opened() {
        let mut board = board(2, 2, 1);
        let mut rng = StdRng::seed_from_u64(11);
        board.reveal_with(0, 0, &mut rng).unwrap();
        assert!(!board.check_win());

        for x in 0..2 {
            for y in 0..2 {
                if !board.cell_at(x, y).unwrap().is_mine() {
                    board.reveal_with(x, y, &mut rng).unwrap();
                }
            }
        }

        assert_eq!(board.closed_count(), 1);
        assert!(board.check_win());
    }

    #[test]
    fn serialize_discloses_mines_only_on_request() {
        let mut board = board(4, 4, 5);
        board.reveal_with(0, 0, &mut StdRng::seed_from_u64(2)).unwrap();

        let hidden = board.serialize(false);
        assert_eq!(hidden.cells.len(), 16);
        assert!(hidden.cells.iter().all(|cell| cell.mine.is_none()));

        let disclosed = board.serialize(true);
        let mined = disclosed
            .cells
            .iter()
            .filter(|cell| cell.mine == Some(true))
            .count();
        assert_eq!(mined, 5);
    }

    #[test]
    fn count_adjacent_mines_matches_placed_layout() {
        let mut board = board(3, 3, 0);
        board.cell_at_mut(0, 0).unwrap().set_mine(true);
        board.cell_at_mut(2, 2).unwrap().set_mine(true);

        assert_eq!(board.count_adjacent_mines(1, 1), 2);
        assert_eq!(board.count_adjacent_mines(0, 1), 1);
        assert_eq!(board.count_adjacent_mines(2, 0), 0);
    }
}
