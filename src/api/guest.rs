//! # API de Huéspedes
//!
//! - `GET /guests` - Listar huéspedes en orden de creación
//! - `POST /guests` - Crear huésped
//! - `GET /guests/{id}` - Obtener huésped
//! - `PUT /guests/{id}` - Reemplazar nombre y móvil
//! - `DELETE /guests/{id}` - Eliminar huésped y, en cascada, sus reservas

use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse, Responder};
use std::collections::HashMap;

use super::auth::authorize;
use super::middleware::ErrorLogExt;
use super::schemas::{from_json, GuestInput, GuestResponse};
use super::{AppError, AppResult};
use crate::config::{AppConfig, RouteGroup};
use crate::db::{guests, reservations, Guest, SqliteRepo};

/// Serializa un huésped junto con los ids de sus reservas
async fn guest_response(repo: &SqliteRepo, guest: Guest) -> AppResult<GuestResponse> {
    let reservation_ids = reservations::ids_for_guest(&repo.pool, guest.id)
        .await
        .map_err(|e| AppError::database("guest_reservations", e))?;

    Ok(GuestResponse::new(guest, reservation_ids))
}

async fn find_guest(repo: &SqliteRepo, id: i64) -> AppResult<Guest> {
    guests::fetch_one(&repo.pool, id)
        .await
        .map_err(|e| AppError::database("find_guest", e))?
        .ok_or_else(|| AppError::not_found_id("Guest", id))
}

#[get("/guests")]
async fn list_guests(
    repo: web::Data<SqliteRepo>,
    config: web::Data<AppConfig>,
    req: HttpRequest,
) -> AppResult<impl Responder> {
    authorize(&req, repo.get_ref(), config.get_ref(), RouteGroup::Guests).await?;

    let all_guests = guests::fetch_all(&repo.pool)
        .await
        .log_error_context("listing all guests")
        .map_err(|e| AppError::database("list_guests", e))?;

    let index = reservations::guest_index(&repo.pool)
        .await
        .map_err(|e| AppError::database("list_guest_reservations", e))?;

    let mut by_guest: HashMap<i64, Vec<i64>> = HashMap::new();
    for (guest_id, reservation_id) in index {
        by_guest.entry(guest_id).or_default().push(reservation_id);
    }

    let results: Vec<GuestResponse> = all_guests
        .into_iter()
        .map(|guest| {
            let reservation_ids = by_guest.remove(&guest.id).unwrap_or_default();
            GuestResponse::new(guest, reservation_ids)
        })
        .collect();

    Ok(HttpResponse::Ok().json(results))
}

/// Crea un nuevo huésped
///
/// # Errores
/// - `400 Bad Request`: `name` (máx. 30) o `mobile` (máx. 15) ausentes o inválidos
#[post("/guests")]
async fn create_guest(
    repo: web::Data<SqliteRepo>,
    config: web::Data<AppConfig>,
    req: HttpRequest,
    body: web::Bytes,
) -> AppResult<impl Responder> {
    authorize(&req, repo.get_ref(), config.get_ref(), RouteGroup::Guests).await?;

    let (name, mobile) = from_json::<GuestInput>(&req, &body)?.validated()?;

    let guest = guests::insert(&repo.pool, &name, &mobile)
        .await
        .log_error_context("inserting new guest")
        .map_err(|e| AppError::database("create_guest", e))?;

    tracing::info!(guest_id = guest.id, "Huésped creado");

    Ok(HttpResponse::Created().json(GuestResponse::new(guest, Vec::new())))
}

#[get("/guests/{id}")]
async fn retrieve_guest(
    repo: web::Data<SqliteRepo>,
    config: web::Data<AppConfig>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> AppResult<impl Responder> {
    authorize(&req, repo.get_ref(), config.get_ref(), RouteGroup::Guests).await?;

    let guest = find_guest(repo.get_ref(), path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(guest_response(repo.get_ref(), guest).await?))
}

/// Actualiza un huésped existente
///
/// La existencia se comprueba antes de decodificar el cuerpo, así que un id
/// inexistente responde 404 aunque el cuerpo no sea JSON.
#[put("/guests/{id}")]
async fn update_guest(
    repo: web::Data<SqliteRepo>,
    config: web::Data<AppConfig>,
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Bytes,
) -> AppResult<impl Responder> {
    authorize(&req, repo.get_ref(), config.get_ref(), RouteGroup::Guests).await?;

    let id = path.into_inner();
    find_guest(repo.get_ref(), id).await?;

    let (name, mobile) = from_json::<GuestInput>(&req, &body)?.validated()?;

    let guest = guests::update(&repo.pool, id, &name, &mobile)
        .await
        .log_error_context("updating guest")
        .map_err(|e| AppError::database("update_guest", e))?
        .ok_or_else(|| AppError::not_found_id("Guest", id))?;

    Ok(HttpResponse::Ok().json(guest_response(repo.get_ref(), guest).await?))
}

#[delete("/guests/{id}")]
async fn delete_guest(
    repo: web::Data<SqliteRepo>,
    config: web::Data<AppConfig>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> AppResult<impl Responder> {
    authorize(&req, repo.get_ref(), config.get_ref(), RouteGroup::Guests).await?;

    let id = path.into_inner();
    let deleted = guests::delete(&repo.pool, id)
        .await
        .log_error_context("deleting guest")
        .map_err(|e| AppError::database("delete_guest", e))?;

    if !deleted {
        return Err(AppError::not_found_id("Guest", id));
    }

    tracing::info!(guest_id = id, "Huésped eliminado");
    Ok(HttpResponse::NoContent().finish())
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_guests);
    cfg.service(create_guest);
    cfg.service(retrieve_guest);
    cfg.service(update_guest);
    cfg.service(delete_guest);
}
