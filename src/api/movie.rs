//! # API de Películas
//!
//! CRUD de películas más la búsqueda exacta por sala y título.

use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse, Responder};
use serde::Deserialize;

use super::auth::authorize;
use super::middleware::ErrorLogExt;
use super::schemas::{from_json, MovieInput, MovieLookup};
use super::{AppError, AppResult, ResultExt};
use crate::config::{AppConfig, RouteGroup};
use crate::db::{movies, SqliteRepo};

/// Parámetros de consulta para listar películas
#[derive(Deserialize)]
struct MovieQuery {
    /// Filtrar por subcadena del título, sin distinguir mayúsculas
    search: Option<String>,
}

#[get("/movies")]
async fn list_movies(
    repo: web::Data<SqliteRepo>,
    config: web::Data<AppConfig>,
    req: HttpRequest,
    query: web::Query<MovieQuery>,
) -> AppResult<impl Responder> {
    authorize(&req, repo.get_ref(), config.get_ref(), RouteGroup::Movies).await?;

    let term = query.search.as_deref().map(str::trim).unwrap_or_default();
    let result = if term.is_empty() {
        movies::fetch_all(&repo.pool).await
    } else {
        movies::search_by_title(&repo.pool, term).await
    };

    let results = result
        .log_error_context("listing movies")
        .map_err(|e| AppError::database("list_movies", e))?;

    Ok(HttpResponse::Ok().json(results))
}

/// Busca películas por sala y título exactos
///
/// Los campos `hall` y `movie` se leen del cuerpo JSON aunque sea un `GET`;
/// si el cuerpo viene vacío se toman de la query string. Sin coincidencias
/// responde `200` con una lista vacía.
///
/// # Errores
/// - `400 Bad Request`: Falta `hall` o `movie`, o el cuerpo no es JSON
#[get("/movies/find")]
async fn find_movies(
    repo: web::Data<SqliteRepo>,
    config: web::Data<AppConfig>,
    req: HttpRequest,
    query: web::Query<MovieLookup>,
    body: web::Bytes,
) -> AppResult<impl Responder> {
    authorize(&req, repo.get_ref(), config.get_ref(), RouteGroup::FindMovie).await?;

    let from_body = if body.iter().all(u8::is_ascii_whitespace) {
        MovieLookup::default()
    } else {
        serde_json::from_slice::<MovieLookup>(&body).map_err_validation("Cuerpo JSON inválido")?
    };

    let (hall, title) = from_body.or(query.into_inner()).validated()?;

    let results = movies::filter_by_hall_and_title(&repo.pool, &hall, &title)
        .await
        .log_error_context("finding movies by hall and title")
        .map_err(|e| AppError::database("find_movies", e))?;

    tracing::debug!(hall = %hall, movie = %title, matches = results.len(), "Búsqueda de películas");

    Ok(HttpResponse::Ok().json(results))
}

#[post("/movies")]
async fn create_movie(
    repo: web::Data<SqliteRepo>,
    config: web::Data<AppConfig>,
    req: HttpRequest,
    body: web::Bytes,
) -> AppResult<impl Responder> {
    authorize(&req, repo.get_ref(), config.get_ref(), RouteGroup::Movies).await?;

    let (hall, title) = from_json::<MovieInput>(&req, &body)?.validated()?;

    let movie = movies::insert(&repo.pool, &hall, &title)
        .await
        .log_error_context("inserting new movie")
        .map_err(|e| AppError::database("create_movie", e))?;

    tracing::info!(movie_id = movie.id, "Película creada");

    Ok(HttpResponse::Created().json(movie))
}

#[get("/movies/{id}")]
async fn retrieve_movie(
    repo: web::Data<SqliteRepo>,
    config: web::Data<AppConfig>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> AppResult<impl Responder> {
    authorize(&req, repo.get_ref(), config.get_ref(), RouteGroup::Movies).await?;

    let id = path.into_inner();
    let movie = movies::fetch_one(&repo.pool, id)
        .await
        .map_err(|e| AppError::database("find_movie", e))?
        .ok_or_else(|| AppError::not_found_id("Movie", id))?;

    Ok(HttpResponse::Ok().json(movie))
}

#[put("/movies/{id}")]
async fn update_movie(
    repo: web::Data<SqliteRepo>,
    config: web::Data<AppConfig>,
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Bytes,
) -> AppResult<impl Responder> {
    authorize(&req, repo.get_ref(), config.get_ref(), RouteGroup::Movies).await?;

    let id = path.into_inner();
    movies::fetch_one(&repo.pool, id)
        .await
        .map_err(|e| AppError::database("find_movie", e))?
        .ok_or_else(|| AppError::not_found_id("Movie", id))?;

    let (hall, title) = from_json::<MovieInput>(&req, &body)?.validated()?;

    let movie = movies::update(&repo.pool, id, &hall, &title)
        .await
        .log_error_context("updating movie")
        .map_err(|e| AppError::database("update_movie", e))?
        .ok_or_else(|| AppError::not_found_id("Movie", id))?;

    Ok(HttpResponse::Ok().json(movie))
}

/// Elimina una película; sus reservas desaparecen en cascada
#[delete("/movies/{id}")]
async fn delete_movie(
    repo: web::Data<SqliteRepo>,
    config: web::Data<AppConfig>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> AppResult<impl Responder> {
    authorize(&req, repo.get_ref(), config.get_ref(), RouteGroup::Movies).await?;

    let id = path.into_inner();
    let deleted = movies::delete(&repo.pool, id)
        .await
        .log_error_context("deleting movie")
        .map_err(|e| AppError::database("delete_movie", e))?;

    if !deleted {
        return Err(AppError::not_found_id("Movie", id));
    }

    Ok(HttpResponse::NoContent().finish())
}

/// `find_movies` va antes que `/movies/{id}`
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(find_movies);
    cfg.service(list_movies);
    cfg.service(create_movie);
    cfg.service(retrieve_movie);
    cfg.service(update_movie);
    cfg.service(delete_movie);
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test::{call_service, read_body_json, TestRequest};
    use serde_json::json;

    use crate::api::testing::test_app;
    use crate::config::AppConfig;
    use crate::db::{movies, Movie, SqliteRepo};

    async fn seed(repo: &SqliteRepo) -> Vec<Movie> {
        let mut seeded = Vec::new();
        for (hall, title) in [("A1", "Dune"), ("B2", "Dune"), ("A1", "Arrival"), ("A1", "Dune")] {
            seeded.push(movies::insert(&repo.pool, hall, title).await.unwrap());
        }
        seeded
    }

    #[actix_web::test]
    async fn find_returns_exact_hall_and_title_matches() {
        let repo = SqliteRepo::in_memory().await;
        let seeded = seed(&repo).await;
        let app = test_app!(repo, AppConfig::default());

        let req = TestRequest::get()
            .uri("/movies/find")
            .set_json(json!({ "hall": "A1", "movie": "Dune" }))
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let found: Vec<Movie> = read_body_json(resp).await;

        assert_eq!(found, vec![seeded[0].clone(), seeded[3].clone()]);
    }

    #[actix_web::test]
    async fn find_without_matches_is_an_empty_list() {
        let repo = SqliteRepo::in_memory().await;
        seed(&repo).await;
        let app = test_app!(repo, AppConfig::default());

        let req = TestRequest::get()
            .uri("/movies/find")
            .set_json(json!({ "hall": "C3", "movie": "Dune" }))
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let found: Vec<Movie> = read_body_json(resp).await;
        assert!(found.is_empty());
    }

    #[actix_web::test]
    async fn find_falls_back_to_query_string() {
        let repo = SqliteRepo::in_memory().await;
        let seeded = seed(&repo).await;
        let app = test_app!(repo, AppConfig::default());

        let req = TestRequest::get()
            .uri("/movies/find?hall=B2&movie=Dune")
            .to_request();
        let found: Vec<Movie> = read_body_json(call_service(&app, req).await).await;
        assert_eq!(found, vec![seeded[1].clone()]);
    }

    #[actix_web::test]
    async fn find_requires_both_fields() {
        let repo = SqliteRepo::in_memory().await;
        let app = test_app!(repo, AppConfig::default());

        let req = TestRequest::get()
            .uri("/movies/find")
            .set_json(json!({ "hall": "A1" }))
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let errors: serde_json::Value = read_body_json(resp).await;
        assert!(errors["fields"]["movie"].is_array());
    }

    #[actix_web::test]
    async fn list_supports_title_search() {
        let repo = SqliteRepo::in_memory().await;
        seed(&repo).await;
        let app = test_app!(repo, AppConfig::default());

        let all: Vec<Movie> =
            read_body_json(call_service(&app, TestRequest::get().uri("/movies").to_request()).await)
                .await;
        assert_eq!(all.len(), 4);

        let req = TestRequest::get().uri("/movies?search=arr").to_request();
        let found: Vec<Movie> = read_body_json(call_service(&app, req).await).await;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].movie, "Arrival");
    }

    #[actix_web::test]
    async fn crud_round() {
        let repo = SqliteRepo::in_memory().await;
        let app = test_app!(repo, AppConfig::default());

        let req = TestRequest::post()
            .uri("/movies")
            .set_json(json!({ "hall": "A1", "movie": "Dune" }))
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created: Movie = read_body_json(resp).await;

        let req = TestRequest::put()
            .uri(&format!("/movies/{}", created.id))
            .set_json(json!({ "hall": "B2", "movie": "Dune" }))
            .to_request();
        let updated: Movie = read_body_json(call_service(&app, req).await).await;
        assert_eq!(updated.hall, "B2");

        let req = TestRequest::delete()
            .uri(&format!("/movies/{}", created.id))
            .to_request();
        assert_eq!(call_service(&app, req).await.status(), StatusCode::NO_CONTENT);

        let req = TestRequest::get()
            .uri(&format!("/movies/{}", created.id))
            .to_request();
        assert_eq!(call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn whitespace_only_title_is_rejected() {
        let repo = SqliteRepo::in_memory().await;
        let app = test_app!(repo, AppConfig::default());

        let req = TestRequest::post()
            .uri("/movies")
            .set_json(json!({ "hall": "A1", "movie": "   " }))
            .to_request();
        let resp = call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let errors: serde_json::Value = read_body_json(resp).await;
        assert_eq!(errors["fields"]["movie"], json!(["Este campo no puede estar vacío."]));
    }

    #[actix_web::test]
    async fn hall_longer_than_ten_characters_is_rejected() {
        let repo = SqliteRepo::in_memory().await;
        let app = test_app!(repo, AppConfig::default());

        let req = TestRequest::post()
            .uri("/movies")
            .set_json(json!({ "hall": "Sala grande 1", "movie": "Dune" }))
            .to_request();
        assert_eq!(call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }
}
