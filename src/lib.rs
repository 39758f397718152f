pub mod cleanup;
pub mod cors;
pub mod error;
pub mod game;
pub mod model;
pub mod ranking;
pub mod routes;
pub mod store;
