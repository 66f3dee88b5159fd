//! # Autenticación por token
//!
//! Cada grupo de rutas se protege por separado mediante `PROTECTED_ROUTES`.
//! Un grupo protegido exige `Authorization: Bearer <token>` (también se acepta
//! el prefijo `Token `) con un token registrado en `api_tokens`.

use actix_web::HttpRequest;

use super::middleware::ErrorLogExt;
use super::{AppError, AppResult};
use crate::config::{AppConfig, RouteGroup};
use crate::db::{tokens, SqliteRepo};

/// Extrae el token del header Authorization
///
/// # Errores
/// - `Unauthorized`: Si falta el header, es inválido o no tiene el formato correcto
fn extract_token(req: &HttpRequest) -> AppResult<String> {
    let auth_header = req.headers()
        .get("authorization")
        .ok_or(AppError::Unauthorized("Falta header Authorization".to_string()))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| AppError::Unauthorized("Header Authorization inválido".to_string()))?;

    let token = auth_str
        .strip_prefix("Bearer ")
        .or_else(|| auth_str.strip_prefix("Token "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AppError::Unauthorized("Formato de token inválido".to_string()))?;

    Ok(token.to_string())
}

async fn validate_access_token(repo: &SqliteRepo, token: &str) -> AppResult<bool> {
    tokens::exists(&repo.pool, token)
        .await
        .log_error_context("validating access token")
        .map_err(|e| AppError::database("validate_token", e))
}

/// Comprueba el token solo si el grupo está protegido en la configuración
pub async fn authorize(
    req: &HttpRequest,
    repo: &SqliteRepo,
    config: &AppConfig,
    group: RouteGroup,
) -> AppResult<()> {
    if !config.is_protected(group) {
        return Ok(());
    }

    let token = extract_token(req)?;
    if !validate_access_token(repo, &token).await? {
        return Err(AppError::unauthorized_operation(group.as_str(), "Token inválido"));
    }

    tracing::debug!(group = %group, "Acceso autorizado");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn accepts_bearer_and_token_prefixes() {
        let req = TestRequest::default()
            .insert_header(("Authorization", "Bearer abc"))
            .to_http_request();
        assert_eq!(extract_token(&req).unwrap(), "abc");

        let req = TestRequest::default()
            .insert_header(("Authorization", "Token xyz"))
            .to_http_request();
        assert_eq!(extract_token(&req).unwrap(), "xyz");
    }

    #[test]
    fn rejects_missing_or_malformed_header() {
        let req = TestRequest::default().to_http_request();
        assert!(matches!(extract_token(&req), Err(AppError::Unauthorized(_))));

        let req = TestRequest::default()
            .insert_header(("Authorization", "Basic dXNlcjpwYXNz"))
            .to_http_request();
        assert!(matches!(extract_token(&req), Err(AppError::Unauthorized(_))));

        let req = TestRequest::default()
            .insert_header(("Authorization", "Bearer "))
            .to_http_request();
        assert!(extract_token(&req).is_err());
    }

    #[actix_web::test]
    async fn unprotected_groups_skip_the_header() {
        let repo = SqliteRepo::in_memory().await;
        let config = AppConfig::default();
        let req = TestRequest::default().to_http_request();

        assert!(authorize(&req, &repo, &config, RouteGroup::Guests).await.is_ok());
    }

    #[actix_web::test]
    async fn protected_groups_need_a_registered_token() {
        let repo = SqliteRepo::in_memory().await;
        repo.seed_tokens(&["secreto".to_string()]).await.unwrap();
        let mut config = AppConfig::default();
        config.protected.insert(RouteGroup::Movies);

        let good = TestRequest::default()
            .insert_header(("Authorization", "Bearer secreto"))
            .to_http_request();
        assert!(authorize(&good, &repo, &config, RouteGroup::Movies).await.is_ok());

        let bad = TestRequest::default()
            .insert_header(("Authorization", "Bearer otro"))
            .to_http_request();
        let err = authorize(&bad, &repo, &config, RouteGroup::Movies).await.unwrap_err();
        assert!(matches!(err, AppError::UnauthorizedWithContext { .. }));
    }
}
