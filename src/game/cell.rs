use crate::error::{GameError, Result};
use crate::model::{CellState, CellView};

/// One grid position. Owned exclusively by its board; the mine flag is only
/// written during lazy placement, before the cell can have been opened.
#[derive(Debug)]
pub struct Cell {
    x: usize,
    y: usize,
    mine: bool,
    state: CellState,
}

impl Cell {
    pub fn new(x: usize, y: usize) -> Self {
        Self {
            x,
            y,
            mine: false,
            state: CellState::Closed,
        }
    }

    pub fn x(&self) -> usize {
        self.x
    }

    pub fn y(&self) -> usize {
        self.y
    }

    pub fn set_mine(&mut self, mine: bool) {
        self.mine = mine;
    }

    /// Opened cells are immutable: any further transition is rejected.
    pub fn set_state(&mut self, state: CellState) -> Result<()> {
        if self.state == CellState::Opened {
            return Err(GameError::CellAlreadyOpened);
        }

        self.state = state;
        Ok(())
    }

    pub fn state(&self) -> CellState {
        self.state
    }

    pub fn is_mine(&self) -> bool {
        self.mine
    }

    pub fn is_opened(&self) -> bool {
        self.state == CellState::Opened
    }

    pub fn is_flagged(&self) -> bool {
        self.state == CellState::Flagged
    }

    pub fn view(&self, adjacent_mines: u8, with_mine: bool) -> CellView {
        CellView {
            x: self.x,
            y: self.y,
            state: self.state,
            adjacent_mines,
            mine: with_mine.then_some(self.mine),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_cell_is_closed_and_unmined() {
        let cell = Cell::new(3, 7);
        assert_eq!(cell.state(), CellState::Closed);
        assert!(!cell.is_mine());
        assert_eq!((cell.x(), cell.y()), (3, 7));
    }

    #[test]
    fn opened_cell_rejects_further_transitions() {
        let mut cell = Cell::new(0, 0);
        cell.set_state(CellState::Opened).unwrap();

        for state in [CellState::Flagged, CellState::Marked, CellState::Closed] {
            assert_eq!(cell.set_state(state), Err(GameError::CellAlreadyOpened));
        }
        assert!(cell.is_opened());
    }

    #[test]
    fn flagged_cell_can_be_cleared() {
        let mut cell = Cell::new(0, 0);
        cell.set_state(CellState::Flagged).unwrap();
        assert!(cell.is_flagged());
        cell.set_state(CellState::Closed).unwrap();
        assert_eq!(cell.state(), CellState::Closed);
    }

    #[test]
    fn view_discloses_mine_only_on_request() {
        let mut cell = Cell::new(1, 1);
        cell.set_mine(true);

        assert_eq!(cell.view(2, false).mine, None);
        assert_eq!(cell.view(2, true).mine, Some(true));
        assert_eq!(cell.view(2, true).adjacent_mines, 2);
    }
}
