//! Consultas sobre la tabla `guests`.
//!
//! Todas las funciones aceptan cualquier executor de SQLite, de modo que se
//! pueden usar tanto con el pool como dentro de una transacción.

use sqlx::SqliteExecutor;

use super::models::Guest;

pub async fn fetch_all<'e, E>(executor: E) -> sqlx::Result<Vec<Guest>>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Guest>("SELECT id, name, mobile FROM guests ORDER BY id")
        .fetch_all(executor)
        .await
}

pub async fn fetch_one<'e, E>(executor: E, id: i64) -> sqlx::Result<Option<Guest>>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Guest>("SELECT id, name, mobile FROM guests WHERE id = ?")
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub async fn insert<'e, E>(executor: E, name: &str, mobile: &str) -> sqlx::Result<Guest>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Guest>(
        r#"
        INSERT INTO guests (name, mobile)
        VALUES (?, ?)
        RETURNING id, name, mobile
        "#,
    )
        .bind(name)
        .bind(mobile)
        .fetch_one(executor)
        .await
}

/// Devuelve `None` si no existe ningún huésped con ese id.
pub async fn update<'e, E>(
    executor: E,
    id: i64,
    name: &str,
    mobile: &str,
) -> sqlx::Result<Option<Guest>>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Guest>(
        r#"
        UPDATE guests
        SET name = ?, mobile = ?
        WHERE id = ?
        RETURNING id, name, mobile
        "#,
    )
        .bind(name)
        .bind(mobile)
        .bind(id)
        .fetch_optional(executor)
        .await
}

/// Las reservas del huésped se eliminan en cascada por la clave foránea.
pub async fn delete<'e, E>(executor: E, id: i64) -> sqlx::Result<bool>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM guests WHERE id = ?")
        .bind(id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}
