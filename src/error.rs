use thiserror::Error;

/// Every failure the engine can produce. All of these are synchronous
/// validation failures; the API layer maps them to response codes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("{mines} mines do not fit into a {rows}x{cols} board")]
    InvalidConfiguration {
        rows: usize,
        cols: usize,
        mines: usize,
    },
    #[error(
        "({x}, {y}) is out of bounds, allowed: 0 <= x <= {x_max} and 0 <= y <= {y_max}"
    )]
    OutOfBounds {
        x: usize,
        y: usize,
        x_max: usize,
        y_max: usize,
    },
    #[error("no cell at ({x}, {y})")]
    CellNotFound { x: usize, y: usize },
    #[error("no game with id {id}")]
    GameNotFound { id: String },
    #[error("cell is already opened")]
    CellAlreadyOpened,
    #[error("adjacent flag count {flags} does not match adjacent mine count {mines}")]
    FlagCountMismatch { flags: usize, mines: usize },
    #[error("cannot open adjacent cells of an unopened cell")]
    CellNotOpened,
}

pub type Result<T> = core::result::Result<T, GameError>;
