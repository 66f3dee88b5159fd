//! Consultas sobre la tabla `reservations`.

use sqlx::SqliteExecutor;

use super::models::Reservation;

pub async fn fetch_all<'e, E>(executor: E) -> sqlx::Result<Vec<Reservation>>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Reservation>(
        "SELECT id, guest_id, movie_id FROM reservations ORDER BY id",
    )
        .fetch_all(executor)
        .await
}

pub async fn fetch_one<'e, E>(executor: E, id: i64) -> sqlx::Result<Option<Reservation>>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Reservation>(
        "SELECT id, guest_id, movie_id FROM reservations WHERE id = ?",
    )
        .bind(id)
        .fetch_optional(executor)
        .await
}

/// Ids de las reservas de un huésped, en orden de creación.
pub async fn ids_for_guest<'e, E>(executor: E, guest_id: i64) -> sqlx::Result<Vec<i64>>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_scalar::<_, i64>(
        "SELECT id FROM reservations WHERE guest_id = ? ORDER BY id",
    )
        .bind(guest_id)
        .fetch_all(executor)
        .await
}

/// Pares `(guest_id, id)` de todas las reservas, para serializar listados de
/// huéspedes con una sola consulta.
pub async fn guest_index<'e, E>(executor: E) -> sqlx::Result<Vec<(i64, i64)>>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, (i64, i64)>(
        "SELECT guest_id, id FROM reservations ORDER BY id",
    )
        .fetch_all(executor)
        .await
}

pub async fn insert<'e, E>(executor: E, guest_id: i64, movie_id: i64) -> sqlx::Result<Reservation>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Reservation>(
        r#"
        INSERT INTO reservations (guest_id, movie_id)
        VALUES (?, ?)
        RETURNING id, guest_id, movie_id
        "#,
    )
        .bind(guest_id)
        .bind(movie_id)
        .fetch_one(executor)
        .await
}

pub async fn update<'e, E>(
    executor: E,
    id: i64,
    guest_id: i64,
    movie_id: i64,
) -> sqlx::Result<Option<Reservation>>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Reservation>(
        r#"
        UPDATE reservations
        SET guest_id = ?, movie_id = ?
        WHERE id = ?
        RETURNING id, guest_id, movie_id
        "#,
    )
        .bind(guest_id)
        .bind(movie_id)
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub async fn delete<'e, E>(executor: E, id: i64) -> sqlx::Result<bool>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM reservations WHERE id = ?")
        .bind(id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}
