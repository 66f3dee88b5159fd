use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Guest {
    pub id: i64,
    pub name: String,
    pub mobile: String,
}

/// Una proyección en una sala concreta. No lleva fecha, así que sala + título
/// puede repetirse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Movie {
    pub id: i64,
    pub hall: String,
    pub movie: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Reservation {
    pub id: i64,
    pub guest_id: i64,
    pub movie_id: i64,
}
