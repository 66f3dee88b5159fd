//! # API de Reservas
//!
//! Este módulo maneja todas las operaciones relacionadas con reservas:
//! - CRUD de reservas sobre huéspedes y películas existentes
//! - Alta combinada de huésped + reserva a partir de sala y título
//!
//! Cada reserva enlaza exactamente un huésped con una película; si se borra
//! cualquiera de los dos, la reserva desaparece en cascada.

use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse, Responder};

use super::auth::authorize;
use super::middleware::ErrorLogExt;
use super::schemas::{from_json, NewReservationInput, ReservationInput};
use super::{AppError, AppResult, FieldErrors};
use crate::config::{AppConfig, RouteGroup};
use crate::db::{guests, movies, reservations, SqliteRepo};

fn invalid_pk(id: i64) -> String {
    format!("Clave primaria inválida \"{}\": el objeto no existe.", id)
}

/// Comprueba que el huésped y la película referenciados existen
///
/// # Errores
/// - `Fields`: Con un mensaje por cada referencia rota
async fn check_references(repo: &SqliteRepo, guest_id: i64, movie_id: i64) -> AppResult<()> {
    let guest = guests::fetch_one(&repo.pool, guest_id)
        .await
        .map_err(|e| AppError::database("check_guest_reference", e))?;
    let movie = movies::fetch_one(&repo.pool, movie_id)
        .await
        .map_err(|e| AppError::database("check_movie_reference", e))?;

    let mut fields = FieldErrors::new();
    if guest.is_none() {
        fields.insert("guest_id".to_string(), vec![invalid_pk(guest_id)]);
    }
    if movie.is_none() {
        fields.insert("movie_id".to_string(), vec![invalid_pk(movie_id)]);
    }

    if fields.is_empty() {
        Ok(())
    } else {
        Err(AppError::Fields(fields))
    }
}

#[get("/reservations")]
async fn list_reservations(
    repo: web::Data<SqliteRepo>,
    config: web::Data<AppConfig>,
    req: HttpRequest,
) -> AppResult<impl Responder> {
    authorize(&req, repo.get_ref(), config.get_ref(), RouteGroup::Reservations).await?;

    let results = reservations::fetch_all(&repo.pool)
        .await
        .log_error_context("listing reservations")
        .map_err(|e| AppError::database("list_reservations", e))?;

    Ok(HttpResponse::Ok().json(results))
}

/// Crea una reserva para un huésped y una película existentes
///
/// # Errores
/// - `400 Bad Request`: Falta `guest_id`/`movie_id` o no existen
#[post("/reservations")]
async fn create_reservation(
    repo: web::Data<SqliteRepo>,
    config: web::Data<AppConfig>,
    req: HttpRequest,
    body: web::Bytes,
) -> AppResult<impl Responder> {
    authorize(&req, repo.get_ref(), config.get_ref(), RouteGroup::Reservations).await?;

    let (guest_id, movie_id) = from_json::<ReservationInput>(&req, &body)?.validated()?;
    check_references(repo.get_ref(), guest_id, movie_id).await?;

    let reservation = reservations::insert(&repo.pool, guest_id, movie_id)
        .await
        .log_error_context("inserting new reservation")
        .map_err(|e| AppError::database("create_reservation", e))?;

    Ok(HttpResponse::Created().json(reservation))
}

#[get("/reservations/{id}")]
async fn retrieve_reservation(
    repo: web::Data<SqliteRepo>,
    config: web::Data<AppConfig>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> AppResult<impl Responder> {
    authorize(&req, repo.get_ref(), config.get_ref(), RouteGroup::Reservations).await?;

    let id = path.into_inner();
    let reservation = reservations::fetch_one(&repo.pool, id)
        .await
        .map_err(|e| AppError::database("find_reservation", e))?
        .ok_or_else(|| AppError::not_found_id("Reservation", id))?;

    Ok(HttpResponse::Ok().json(reservation))
}

#[put("/reservations/{id}")]
async fn update_reservation(
    repo: web::Data<SqliteRepo>,
    config: web::Data<AppConfig>,
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Bytes,
) -> AppResult<impl Responder> {
    authorize(&req, repo.get_ref(), config.get_ref(), RouteGroup::Reservations).await?;

    let id = path.into_inner();
    reservations::fetch_one(&repo.pool, id)
        .await
        .map_err(|e| AppError::database("find_reservation", e))?
        .ok_or_else(|| AppError::not_found_id("Reservation", id))?;

    let (guest_id, movie_id) = from_json::<ReservationInput>(&req, &body)?.validated()?;
    check_references(repo.get_ref(), guest_id, movie_id).await?;

    let reservation = reservations::update(&repo.pool, id, guest_id, movie_id)
        .await
        .log_error_context("updating reservation")
        .map_err(|e| AppError::database("update_reservation", e))?
        .ok_or_else(|| AppError::not_found_id("Reservation", id))?;

    Ok(HttpResponse::Ok().json(reservation))
}

#[delete("/reservations/{id}")]
async fn delete_reservation(
    repo: web::Data<SqliteRepo>,
    config: web::Data<AppConfig>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> AppResult<impl Responder> {
    authorize(&req, repo.get_ref(), config.get_ref(), RouteGroup::Reservations).await?;

    let id = path.into_inner();
    let deleted = reservations::delete(&repo.pool, id)
        .await
        .log_error_context("deleting reservation")
        .map_err(|e| AppError::database("delete_reservation", e))?;

    if !deleted {
        return Err(AppError::not_found_id("Reservation", id));
    }

    Ok(HttpResponse::NoContent().finish())
}

/// Crea un huésped y su reserva en una sola transacción
///
/// # Flujo
///
/// 1. Valida `name`, `mobile`, `hall` y `movie`
/// 2. Inserta el huésped
/// 3. Busca la película por sala y título exactos
/// 4. Inserta la reserva y confirma la transacción
///
/// Si el paso 3 falla la transacción se descarta y no queda ningún huésped
/// huérfano.
///
/// # Respuesta
/// ```json
/// { "id": 1, "guest_id": 7, "movie_id": 3 }
/// ```
///
/// # Errores
/// - `400 Bad Request`: Algún campo ausente o inválido
/// - `404 Not Found`: No hay película con esa sala y título (cuerpo vacío)
/// - `409 Conflict`: Varias películas comparten sala y título
/// - `500 Internal Server Error`: Error de base de datos
#[post("/reservations/new")]
async fn new_reservation(
    repo: web::Data<SqliteRepo>,
    config: web::Data<AppConfig>,
    req: HttpRequest,
    body: web::Bytes,
) -> AppResult<impl Responder> {
    authorize(&req, repo.get_ref(), config.get_ref(), RouteGroup::NewReservation).await?;

    let input = from_json::<NewReservationInput>(&req, &body)?.validated()?;

    let mut tx = repo.pool
        .begin()
        .await
        .map_err(|e| AppError::database("begin_new_reservation", e))?;

    let guest = guests::insert(&mut *tx, &input.name, &input.mobile)
        .await
        .log_error_context("inserting guest for new reservation")
        .map_err(|e| AppError::database("new_reservation_guest", e))?;

    let matches = movies::filter_by_hall_and_title(&mut *tx, &input.hall, &input.movie)
        .await
        .map_err(|e| AppError::database("new_reservation_movie", e))?;

    // Al salir con error `tx` se descarta y SQLite deshace el huésped
    let movie = match matches.len() {
        0 => {
            return Err(AppError::NotFound(format!(
                "Película '{}' en sala '{}'",
                input.movie, input.hall
            )))
        }
        1 => &matches[0],
        n => {
            return Err(AppError::Conflict(format!(
                "Hay {} películas '{}' en la sala '{}'",
                n, input.movie, input.hall
            )))
        }
    };

    let reservation = reservations::insert(&mut *tx, guest.id, movie.id)
        .await
        .log_error_context("inserting new reservation")
        .map_err(|e| AppError::database("new_reservation", e))?;

    tx.commit()
        .await
        .map_err(|e| AppError::database("commit_new_reservation", e))?;

    tracing::info!(
        reservation_id = reservation.id,
        guest_id = guest.id,
        movie_id = movie.id,
        "Reserva creada"
    );

    Ok(HttpResponse::Created().json(reservation))
}

/// Configura las rutas relacionadas con reservas
///
/// # Rutas disponibles
/// - `POST /reservations/new` - Alta combinada de huésped y reserva
/// - `GET /reservations` - Listar reservas
/// - `POST /reservations` - Crear reserva
/// - `GET /reservations/{id}` - Obtener reserva
/// - `PUT /reservations/{id}` - Reemplazar huésped y película
/// - `DELETE /reservations/{id}` - Eliminar reserva
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(new_reservation);
    cfg.service(list_reservations);
    cfg.service(create_reservation);
    cfg.service(retrieve_reservation);
    cfg.service(update_reservation);
    cfg.service(delete_reservation);
}
