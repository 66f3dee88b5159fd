use sqlx::SqliteExecutor;

/// Inserta el token si no existe todavía.
pub async fn insert_if_missing<'e, E>(executor: E, key: &str, created_at: i64) -> sqlx::Result<()>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query("INSERT OR IGNORE INTO api_tokens (key, created_at) VALUES (?, ?)")
        .bind(key)
        .bind(created_at)
        .execute(executor)
        .await?;

    Ok(())
}

pub async fn exists<'e, E>(executor: E, key: &str) -> sqlx::Result<bool>
where
    E: SqliteExecutor<'e>,
{
    let found = sqlx::query_scalar::<_, i64>("SELECT 1 FROM api_tokens WHERE key = ?")
        .bind(key)
        .fetch_optional(executor)
        .await?;

    Ok(found.is_some())
}
