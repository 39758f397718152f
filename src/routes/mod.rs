use std::sync::Arc;

use rocket::{State, delete, get, http::Status, patch, post, put, serde::json::Json};
use tracing::{error, warn};

use crate::error::GameError;
use crate::model::{
    ActionResult, ApiResponse, BoardView, CellView, CreateGame, Difficulty, GameView, GetCell,
    RankingsView, UpdateCell,
};
use crate::ranking::RankingStore;
use crate::store::SessionStore;

/// The engine only produces typed error kinds; this is where they become
/// transport codes. `CellNotFound` signals an internal consistency fault and
/// is the one kind that surfaces as a server error.
fn error_status(error: &GameError) -> Status {
    match error {
        GameError::GameNotFound { .. } => Status::NotFound,
        GameError::CellNotFound { .. } => Status::InternalServerError,
        GameError::InvalidConfiguration { .. }
        | GameError::OutOfBounds { .. }
        | GameError::CellAlreadyOpened
        | GameError::FlagCountMismatch { .. }
        | GameError::CellNotOpened => Status::BadRequest,
    }
}

fn fail(error: GameError) -> Status {
    let status = error_status(&error);
    if status == Status::InternalServerError {
        error!("{error}");
    } else {
        warn!("{error}");
    }
    status
}

#[put("/games", data = "<request>")]
pub fn create_game(
    request: Json<CreateGame>,
    store: &State<SessionStore>,
) -> Result<Json<ApiResponse<GameView>>, Status> {
    store
        .create(request.0)
        .map(|view| Json(ApiResponse::success(view)))
        .map_err(fail)
}

#[get("/games/<id>")]
pub async fn get_game(
    id: &str,
    store: &State<SessionStore>,
) -> Result<Json<ApiResponse<GameView>>, Status> {
    store
        .get(id)
        .await
        .map(|view| Json(ApiResponse::success(view)))
        .map_err(fail)
}

#[delete("/games/<id>")]
pub fn delete_game(
    id: &str,
    store: &State<SessionStore>,
) -> Result<Json<ApiResponse<()>>, Status> {
    if store.delete(id) {
        Ok(Json(ApiResponse::success(())))
    } else {
        Err(fail(GameError::GameNotFound { id: id.to_string() }))
    }
}

#[get("/games/<id>/board")]
pub async fn get_board(
    id: &str,
    store: &State<SessionStore>,
) -> Result<Json<ApiResponse<BoardView>>, Status> {
    store
        .get_board(id)
        .await
        .map(|view| Json(ApiResponse::success(view)))
        .map_err(fail)
}

#[post("/games/<id>/cells", data = "<request>")]
pub async fn get_cell(
    id: &str,
    request: Json<GetCell>,
    store: &State<SessionStore>,
) -> Result<Json<ApiResponse<CellView>>, Status> {
    store
        .get_cell(id, request.x, request.y)
        .await
        .map(|view| Json(ApiResponse::success(view)))
        .map_err(fail)
}

#[patch("/games/<id>/cells", data = "<request>")]
pub async fn update_cell(
    id: &str,
    request: Json<UpdateCell>,
    store: &State<SessionStore>,
) -> Result<Json<ApiResponse<ActionResult>>, Status> {
    store
        .apply_cell_action(id, request.x, request.y, request.action)
        .await
        .map(|result| Json(ApiResponse::success(result)))
        .map_err(fail)
}

#[get("/ranking")]
pub fn get_rankings(rankings: &State<Arc<RankingStore>>) -> Json<ApiResponse<RankingsView>> {
    Json(ApiResponse::success(RankingsView {
        beginner: rankings.rankings_for(Difficulty::Beginner),
        intermediate: rankings.rankings_for(Difficulty::Intermediate),
        expert: rankings.rankings_for(Difficulty::Expert),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn game_not_found_maps_to_not_found() {
        let error = GameError::GameNotFound {
            id: "abc".to_string(),
        };
        assert_eq!(error_status(&error), Status::NotFound);
    }

    #[test]
    fn validation_errors_map_to_bad_request() {
        for error in [
            GameError::InvalidConfiguration {
                rows: 2,
                cols: 2,
                mines: 4,
            },
            GameError::OutOfBounds {
                x: 9,
                y: 9,
                x_max: 3,
                y_max: 3,
            },
            GameError::CellAlreadyOpened,
            GameError::FlagCountMismatch { flags: 1, mines: 2 },
            GameError::CellNotOpened,
        ] {
            assert_eq!(error_status(&error), Status::BadRequest);
        }
    }

    #[test]
    fn internal_faults_map_to_server_error() {
        let error = GameError::CellNotFound { x: 1, y: 1 };
        assert_eq!(error_status(&error), Status::InternalServerError);
    }
}
