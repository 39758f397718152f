use std::sync::Arc;

use minesweeper_api::{
    cleanup::start_sweep_task,
    cors::create_cors,
    ranking::RankingStore,
    routes::{
        create_game, delete_game, get_board, get_cell, get_game, get_rankings, update_cell,
    },
    store::SessionStore,
};
use rocket::{
    Build, Rocket,
    fairing::{Fairing, Info, Kind},
    routes,
};
use tracing::{info, warn};

struct SweepFairing;

#[rocket::async_trait]
impl Fairing for SweepFairing {
    fn info(&self) -> Info {
        Info {
            name: "Session Sweep Task",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, rocket: Rocket<Build>) -> rocket::fairing::Result {
        if let Some(store) = rocket.state::<SessionStore>() {
            let store = store.clone();
            tokio::spawn(async move {
                start_sweep_task(store).await;
            });
        } else {
            warn!("Failed to get session store for sweep task");
        }
        Ok(rocket)
    }
}

#[rocket::launch]
fn rocket() -> Rocket<Build> {
    tracing_subscriber::fmt::init();
    info!("Starting minesweeper API server");

    let rankings = Arc::new(RankingStore::new());
    let store = SessionStore::new(rankings.clone());

    rocket::build()
        .attach(create_cors())
        .attach(SweepFairing)
        .manage(store)
        .manage(rankings)
        .mount(
            "/",
            routes![
                create_game,
                get_game,
                delete_game,
                get_board,
                get_cell,
                update_cell,
                get_rankings
            ],
        )
}
