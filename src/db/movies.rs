//! Consultas sobre la tabla `movies`.

use sqlx::SqliteExecutor;

use super::models::Movie;

pub async fn fetch_all<'e, E>(executor: E) -> sqlx::Result<Vec<Movie>>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Movie>("SELECT id, hall, movie FROM movies ORDER BY id")
        .fetch_all(executor)
        .await
}

pub async fn fetch_one<'e, E>(executor: E, id: i64) -> sqlx::Result<Option<Movie>>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Movie>("SELECT id, hall, movie FROM movies WHERE id = ?")
        .bind(id)
        .fetch_optional(executor)
        .await
}

/// Coincidencia exacta en sala y título. Nunca falla por "no encontrado":
/// sin coincidencias devuelve un vector vacío.
pub async fn filter_by_hall_and_title<'e, E>(
    executor: E,
    hall: &str,
    title: &str,
) -> sqlx::Result<Vec<Movie>>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Movie>(
        r#"
        SELECT id, hall, movie
        FROM movies
        WHERE hall = ? AND movie = ?
        ORDER BY id
        "#,
    )
        .bind(hall)
        .bind(title)
        .fetch_all(executor)
        .await
}

/// Búsqueda por subcadena del título, sin distinguir mayúsculas.
pub async fn search_by_title<'e, E>(executor: E, term: &str) -> sqlx::Result<Vec<Movie>>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Movie>(
        r#"
        SELECT id, hall, movie
        FROM movies
        WHERE instr(lower(movie), lower(?)) > 0
        ORDER BY id
        "#,
    )
        .bind(term)
        .fetch_all(executor)
        .await
}

pub async fn insert<'e, E>(executor: E, hall: &str, title: &str) -> sqlx::Result<Movie>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Movie>(
        r#"
        INSERT INTO movies (hall, movie)
        VALUES (?, ?)
        RETURNING id, hall, movie
        "#,
    )
        .bind(hall)
        .bind(title)
        .fetch_one(executor)
        .await
}

pub async fn update<'e, E>(
    executor: E,
    id: i64,
    hall: &str,
    title: &str,
) -> sqlx::Result<Option<Movie>>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Movie>(
        r#"
        UPDATE movies
        SET hall = ?, movie = ?
        WHERE id = ?
        RETURNING id, hall, movie
        "#,
    )
        .bind(hall)
        .bind(title)
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub async fn delete<'e, E>(executor: E, id: i64) -> sqlx::Result<bool>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM movies WHERE id = ?")
        .bind(id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}
