//! # Representación JSON de los registros
//!
//! Estructuras de entrada (validadas con `validator`) y de salida. Los campos
//! de entrada son `Option` para que un campo ausente llegue como error de
//! validación en lugar de como fallo de deserialización.

use actix_web::{HttpMessage, HttpRequest};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use validator::{Validate, ValidationError};

use super::{AppError, AppResult, ResultExt};
use crate::db::Guest;

const BLANK: &str = "Este campo no puede estar vacío.";

/// Decodifica un cuerpo JSON
///
/// Los handlers la llaman después de `authorize` y de localizar el registro,
/// de modo que un 401 o un 404 tienen prioridad sobre un cuerpo mal formado.
///
/// # Errores
/// - `Validation`: El `Content-Type` no es JSON o el cuerpo no se puede decodificar
pub fn from_json<T: DeserializeOwned>(req: &HttpRequest, body: &[u8]) -> AppResult<T> {
    let content_type = req.content_type();
    if content_type != "application/json" && !content_type.ends_with("+json") {
        return Err(AppError::Validation(format!(
            "Tipo de contenido no soportado: '{}'",
            content_type
        )));
    }

    serde_json::from_slice(body).map_err_validation("Cuerpo JSON inválido")
}

/// Huésped con la lista de ids de sus reservas
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct GuestResponse {
    pub id: i64,
    pub reservations: Vec<i64>,
    pub name: String,
    pub mobile: String,
}

impl GuestResponse {
    pub fn new(guest: Guest, reservations: Vec<i64>) -> Self {
        GuestResponse {
            id: guest.id,
            reservations,
            name: guest.name,
            mobile: guest.mobile,
        }
    }
}

/// Rechaza un campo de texto que queda vacío tras el recorte
fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::new("blank").with_message(Cow::Borrowed(BLANK)));
    }
    Ok(())
}

/// Quita los espacios de los extremos antes de validar y guardar
fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string())
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct GuestInput {
    #[validate(
        required(message = "Este campo es obligatorio."),
        custom(function = "not_blank"),
        length(max = 30, message = "Asegúrese de que este campo no tenga más de 30 caracteres.")
    )]
    pub name: Option<String>,
    #[validate(
        required(message = "Este campo es obligatorio."),
        custom(function = "not_blank"),
        length(max = 15, message = "Asegúrese de que este campo no tenga más de 15 caracteres.")
    )]
    pub mobile: Option<String>,
}

impl GuestInput {
    fn trimmed(self) -> Self {
        GuestInput {
            name: trimmed(self.name),
            mobile: trimmed(self.mobile),
        }
    }

    /// Devuelve `(name, mobile)` recortados si el cuerpo es válido
    pub fn validated(self) -> AppResult<(String, String)> {
        let input = self.trimmed();
        input.validate()?;
        Ok((input.name.unwrap_or_default(), input.mobile.unwrap_or_default()))
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct MovieInput {
    #[validate(
        required(message = "Este campo es obligatorio."),
        custom(function = "not_blank"),
        length(max = 10, message = "Asegúrese de que este campo no tenga más de 10 caracteres.")
    )]
    pub hall: Option<String>,
    #[validate(
        required(message = "Este campo es obligatorio."),
        custom(function = "not_blank"),
        length(max = 50, message = "Asegúrese de que este campo no tenga más de 50 caracteres.")
    )]
    pub movie: Option<String>,
}

impl MovieInput {
    fn trimmed(self) -> Self {
        MovieInput {
            hall: trimmed(self.hall),
            movie: trimmed(self.movie),
        }
    }

    /// Devuelve `(hall, movie)` recortados si el cuerpo es válido
    pub fn validated(self) -> AppResult<(String, String)> {
        let input = self.trimmed();
        input.validate()?;
        Ok((input.hall.unwrap_or_default(), input.movie.unwrap_or_default()))
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct ReservationInput {
    #[validate(required(message = "Este campo es obligatorio."))]
    pub guest_id: Option<i64>,
    #[validate(required(message = "Este campo es obligatorio."))]
    pub movie_id: Option<i64>,
}

impl ReservationInput {
    /// Devuelve `(guest_id, movie_id)`. La existencia de ambos registros la
    /// comprueba el handler.
    pub fn validated(self) -> AppResult<(i64, i64)> {
        self.validate()?;
        Ok((self.guest_id.unwrap_or_default(), self.movie_id.unwrap_or_default()))
    }
}

/// Sala y título para `/movies/find`. Solo se exige presencia: es un filtro,
/// no un registro nuevo.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct MovieLookup {
    #[validate(required(message = "Este campo es obligatorio."))]
    pub hall: Option<String>,
    #[validate(required(message = "Este campo es obligatorio."))]
    pub movie: Option<String>,
}

impl MovieLookup {
    /// Completa los campos ausentes con los de `fallback`
    pub fn or(self, fallback: MovieLookup) -> MovieLookup {
        MovieLookup {
            hall: self.hall.or(fallback.hall),
            movie: self.movie.or(fallback.movie),
        }
    }

    pub fn validated(self) -> AppResult<(String, String)> {
        self.validate()?;
        Ok((self.hall.unwrap_or_default(), self.movie.unwrap_or_default()))
    }
}

/// Cuerpo de `/reservations/new`: datos del huésped más la película
#[derive(Debug, Default, Deserialize)]
pub struct NewReservationInput {
    #[serde(flatten)]
    pub guest: GuestInput,
    #[serde(flatten)]
    pub movie: MovieInput,
}

/// Datos ya validados de una reserva combinada
#[derive(Debug, PartialEq, Eq)]
pub struct NewReservation {
    pub name: String,
    pub mobile: String,
    pub hall: String,
    pub movie: String,
}

impl NewReservationInput {
    /// Valida los cuatro campos a la vez y devuelve todos los errores juntos
    pub fn validated(self) -> AppResult<NewReservation> {
        let guest = self.guest.trimmed();
        let movie = self.movie.trimmed();
        let guest_errors = guest.validate().err();
        let movie_errors = movie.validate().err();

        match (guest_errors, movie_errors) {
            (None, None) => Ok(NewReservation {
                name: guest.name.unwrap_or_default(),
                mobile: guest.mobile.unwrap_or_default(),
                hall: movie.hall.unwrap_or_default(),
                movie: movie.movie.unwrap_or_default(),
            }),
            (guest_errors, movie_errors) => {
                let mut fields = super::FieldErrors::new();
                for errors in [guest_errors, movie_errors].into_iter().flatten() {
                    if let AppError::Fields(found) = AppError::from(errors) {
                        fields.extend(found);
                    }
                }
                Err(AppError::Fields(fields))
            }
        }
    }
}
