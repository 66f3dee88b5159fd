//! # Módulo API
//!
//! Este módulo contiene todas las rutas y controladores de la API REST.
//!
//! ## Módulos principales
//!
//! - [`guest`] - CRUD de huéspedes
//! - [`movie`] - CRUD de películas y búsqueda por sala y título
//! - [`reservation`] - CRUD de reservas y alta combinada huésped + reserva
//! - [`schemas`] - Representación JSON y validación de entrada
//! - [`errors`] - Manejo de errores de la aplicación

pub mod auth;
pub mod errors;
pub mod guest;
pub mod movie;
pub mod reservation;
pub mod schemas;
mod middleware;

// Re-exportar tipos comunes para facilitar su uso
pub use errors::{AppError, AppResult, FieldErrors, ResultExt};

use actix_web::web;

/// Configura todas las rutas de la API
///
/// ## Rutas configuradas
///
/// - `/reservations/*` - Ver [`reservation::routes`]
/// - `/movies/*` - Ver [`movie::routes`]
/// - `/guests/*` - Ver [`guest::routes`]
///
/// Las rutas fijas (`/reservations/new`, `/movies/find`) se registran antes
/// que las de `{id}`. Los cuerpos se decodifican dentro de cada handler con
/// [`schemas::from_json`], después de la autorización.
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    reservation::routes(cfg);
    movie::routes(cfg);
    guest::routes(cfg);
}

#[cfg(test)]
pub(crate) mod testing {
    /// Monta la aplicación completa sobre un `SqliteRepo` y una `AppConfig`
    macro_rules! test_app {
        ($repo:expr, $config:expr) => {
            actix_web::test::init_service(
                actix_web::App::new()
                    .app_data(actix_web::web::Data::new($repo))
                    .app_data(actix_web::web::Data::new($config))
                    .configure($crate::api::init_routes),
            )
            .await
        };
    }

    pub(crate) use test_app;
}
