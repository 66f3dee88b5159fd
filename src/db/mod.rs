// src/db/mod.rs
pub mod guests;
pub mod models;
pub mod movies;
pub mod reservations;
pub mod sqlite;
pub mod tokens;

pub use models::{Guest, Movie, Reservation};
pub use sqlite::SqliteRepo;
