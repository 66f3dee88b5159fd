use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::Duration;
use crate::api::AppError;
use crate::config::AppConfig;

use super::tokens;

pub type Result<T> = std::result::Result<T, AppError>;

fn is_in_memory(database_url: &str) -> bool {
    database_url.contains(":memory:")
        || database_url
            .split_once('?')
            .map(|(_, query)| query.split('&').any(|param| param == "mode=memory"))
            .unwrap_or(false)
}

/// Handle del almacenamiento. Se clona en cada worker de Actix y se pasa a los
/// handlers como `web::Data<SqliteRepo>`.
#[derive(Debug, Clone)]
pub struct SqliteRepo {
    pub pool: SqlitePool,
}

impl SqliteRepo {
    pub async fn init(config: &AppConfig) -> Result<SqliteRepo> {
        let repo = Self::connect(&config.database_url, config.max_connections).await?;

        // Test connection
        sqlx::query("SELECT 1")
            .execute(&repo.pool)
            .await
            .map_err(|e| AppError::Internal(format!("Error validando conexión SQLite: {}", e)))?;

        tracing::info!(url = %config.database_url, "Conexión a SQLite establecida exitosamente");

        Ok(repo)
    }

    /// Abre el pool con las claves foráneas activadas (necesarias para el
    /// borrado en cascada de reservas).
    ///
    /// Una base de datos en memoria (`:memory:` o `mode=memory`) vive dentro de
    /// su conexión, así que en ese caso el pool se limita a una única conexión
    /// que nunca se recicla.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<SqliteRepo> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| AppError::Internal(format!("URL de SQLite inválida: {}", e)))?
            .foreign_keys(true)
            .create_if_missing(true);

        let pool_options = if is_in_memory(database_url) {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(max_connections.max(1))
        };

        let pool = pool_options
            .acquire_timeout(Duration::from_secs(3))
            .connect_with(options)
            .await
            .map_err(|e| AppError::database("connect", e))?;

        Ok(SqliteRepo { pool })
    }

    /// Aplica las migraciones embebidas en `migrations/`.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("Error aplicando migraciones: {}", e)))?;

        tracing::info!("Migraciones SQLite aplicadas exitosamente");
        Ok(())
    }

    /// Registra los tokens de acceso configurados. Es idempotente.
    pub async fn seed_tokens(&self, keys: &[String]) -> Result<()> {
        let created_at = Self::current_timestamp();

        for key in keys {
            tokens::insert_if_missing(&self.pool, key, created_at)
                .await
                .map_err(|e| AppError::database("seed_tokens", e))?;
        }

        if !keys.is_empty() {
            tracing::info!(count = keys.len(), "Tokens de acceso registrados");
        }
        Ok(())
    }

    // Función auxiliar para obtener timestamp actual
    pub fn current_timestamp() -> i64 {
        chrono::Utc::now().timestamp()
    }

    #[cfg(test)]
    pub async fn in_memory() -> SqliteRepo {
        let repo = Self::connect("sqlite::memory:", 1)
            .await
            .expect("in-memory pool");
        repo.migrate().await.expect("migrations");
        repo
    }
}
