//! # Cinema Tickets Server
//!
//! API REST para reservas de cine construida con Rust, Actix Web y SQLite.
//!
//! ## Características principales
//!
//! - **Huéspedes**: Alta, consulta, modificación y baja
//! - **Películas**: CRUD, búsqueda por título y búsqueda exacta por sala + título
//! - **Reservas**: CRUD y alta combinada de huésped + reserva en una transacción
//! - **Autenticación opcional**: Token por grupo de rutas
//!
//! ## Configuración
//!
//! El servidor se configura mediante variables de entorno (archivo `.env`):
//!
//! ```env
//! # Base de datos SQLite
//! DATABASE_URL=sqlite://cinema_tickets.db?mode=rwc
//! DATABASE_MAX_CONNECTIONS=5
//!
//! # Servidor
//! BIND_ADDRESS=0.0.0.0:8080
//!
//! # Autenticación
//! API_TOKENS=token-uno,token-dos
//! PROTECTED_ROUTES=guests,new_reservation
//!
//! # Logging
//! RUST_LOG=debug,sqlx=warn
//! ```
//!
//! ## Arquitectura
//!
//! ```text
//! Cliente HTTP/JSON
//!     ↓
//! API REST (Actix Web)
//!     ↓ sqlx
//! SQLite
//! ```

use actix_web::{middleware::Logger, web, App, HttpServer};

mod api;
mod config;
mod db;

use config::AppConfig;

/// Función principal que inicia el servidor web
///
/// 1. Carga variables de entorno desde `.env`
/// 2. Configura el sistema de logging con tracing
/// 3. Lee la configuración
/// 4. Abre el pool de SQLite y aplica migraciones
/// 5. Registra los tokens de acceso configurados
/// 6. Inicia el servidor HTTP con logging y las rutas de la API
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();

    // Configurar sistema de logging con tracing
    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    for directive in ["cinema_tickets=debug", "sqlx=warn"] {
        match directive.parse() {
            Ok(directive) => filter = filter.add_directive(directive),
            Err(e) => eprintln!("Directiva de log inválida '{}': {}", directive, e),
        }
    }
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("Iniciando Cinema Tickets Server con SQLite...");

    let config = AppConfig::from_env().map_err(|e| {
        tracing::error!("Configuración inválida: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    let repo = match db::SqliteRepo::init(&config).await {
        Ok(repo) => repo,
        Err(e) => {
            tracing::error!("Error conectando a SQLite: {}", e);
            return Err(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Error de SQLite: {}", e)
            ));
        }
    };

    if let Err(e) = repo.migrate().await {
        tracing::error!("Error aplicando migraciones: {}", e);
        return Err(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()));
    }

    if let Err(e) = repo.seed_tokens(&config.api_tokens).await {
        tracing::error!("Error registrando tokens: {}", e);
        return Err(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()));
    }

    if !config.protected.is_empty() {
        let groups: Vec<&str> = config.protected.iter().map(|g| g.as_str()).collect();
        tracing::info!(groups = ?groups, "Rutas protegidas con token");
    }

    let bind_address = config.bind_address.clone();
    tracing::info!("Servidor iniciando en {}", bind_address);

    // Crear y configurar el servidor HTTP
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(repo.clone()))
            .app_data(web::Data::new(config.clone()))
            .wrap(Logger::default())
            .configure(api::init_routes)
    })
        .bind(&bind_address)?
        .run()
        .await
}
