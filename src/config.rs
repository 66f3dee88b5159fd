//! # Configuración
//!
//! Lee la configuración del servidor desde variables de entorno (opcionalmente
//! cargadas desde `.env` con `dotenvy` en `main`).

use std::collections::HashSet;
use std::env;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const DEFAULT_DATABASE_URL: &str = "sqlite://cinema_tickets.db?mode=rwc";
const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Valor inválido para '{key}': '{value}'")]
    InvalidValue { key: String, value: String },

    #[error("Grupo de rutas desconocido: '{0}'")]
    UnknownRouteGroup(String),
}

/// Grupos de rutas que se pueden proteger con token de forma independiente.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteGroup {
    Guests,
    Movies,
    Reservations,
    FindMovie,
    NewReservation,
}

impl RouteGroup {
    pub const ALL: [RouteGroup; 5] = [
        RouteGroup::Guests,
        RouteGroup::Movies,
        RouteGroup::Reservations,
        RouteGroup::FindMovie,
        RouteGroup::NewReservation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RouteGroup::Guests => "guests",
            RouteGroup::Movies => "movies",
            RouteGroup::Reservations => "reservations",
            RouteGroup::FindMovie => "find_movie",
            RouteGroup::NewReservation => "new_reservation",
        }
    }
}

impl fmt::Display for RouteGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RouteGroup {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RouteGroup::ALL
            .into_iter()
            .find(|group| group.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownRouteGroup(s.to_string()))
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub bind_address: String,
    /// Tokens que se registran en `api_tokens` al arrancar
    pub api_tokens: Vec<String>,
    /// Grupos de rutas que exigen `Authorization`
    pub protected: HashSet<RouteGroup>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            api_tokens: Vec::new(),
            protected: HashSet::new(),
        }
    }
}

impl AppConfig {
    /// Configuración a partir del entorno del proceso
    ///
    /// # Variables de entorno
    ///
    /// - `DATABASE_URL`: URL de SQLite (default: sqlite://cinema_tickets.db?mode=rwc)
    /// - `DATABASE_MAX_CONNECTIONS`: Tamaño del pool (default: 5)
    /// - `BIND_ADDRESS`: Dirección y puerto del servidor (default: 0.0.0.0:8080)
    /// - `API_TOKENS`: Tokens separados por comas
    /// - `PROTECTED_ROUTES`: Grupos separados por comas (`guests`, `movies`,
    ///   `reservations`, `find_movie`, `new_reservation` o `all`)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = AppConfig::default();

        let max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => raw.trim().parse::<u32>().ok().filter(|n| *n > 0).ok_or(
                ConfigError::InvalidValue {
                    key: "DATABASE_MAX_CONNECTIONS".to_string(),
                    value: raw,
                },
            )?,
            None => defaults.max_connections,
        };

        let api_tokens = lookup("API_TOKENS")
            .map(|raw| split_list(&raw).map(str::to_string).collect())
            .unwrap_or_default();

        let protected = match lookup("PROTECTED_ROUTES") {
            Some(raw) => parse_route_groups(&raw)?,
            None => HashSet::new(),
        };

        Ok(AppConfig {
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            max_connections,
            bind_address: lookup("BIND_ADDRESS").unwrap_or(defaults.bind_address),
            api_tokens,
            protected,
        })
    }

    pub fn is_protected(&self, group: RouteGroup) -> bool {
        self.protected.contains(&group)
    }
}

fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|item| !item.is_empty())
}

fn parse_route_groups(raw: &str) -> Result<HashSet<RouteGroup>, ConfigError> {
    let mut groups = HashSet::new();
    for item in split_list(raw) {
        if item == "all" {
            groups.extend(RouteGroup::ALL);
        } else {
            groups.insert(item.parse::<RouteGroup>()?);
        }
    }
    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = AppConfig::from_lookup(lookup_from(&[])).unwrap();

        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.bind_address, DEFAULT_BIND_ADDRESS);
        assert_eq!(config.max_connections, 5);
        assert!(config.api_tokens.is_empty());
        assert!(config.protected.is_empty());
    }

    #[test]
    fn parses_tokens_and_protected_routes() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("API_TOKENS", "abc, def,,"),
            ("PROTECTED_ROUTES", "guests , new_reservation"),
            ("DATABASE_MAX_CONNECTIONS", "8"),
        ]))
        .unwrap();

        assert_eq!(config.api_tokens, vec!["abc", "def"]);
        assert_eq!(config.max_connections, 8);
        assert!(config.is_protected(RouteGroup::Guests));
        assert!(config.is_protected(RouteGroup::NewReservation));
        assert!(!config.is_protected(RouteGroup::Movies));
    }

    #[test]
    fn all_protects_every_group() {
        let config =
            AppConfig::from_lookup(lookup_from(&[("PROTECTED_ROUTES", "all")])).unwrap();

        for group in RouteGroup::ALL {
            assert!(config.is_protected(group), "{} no protegido", group);
        }
    }

    #[test]
    fn rejects_unknown_route_group() {
        let err = AppConfig::from_lookup(lookup_from(&[("PROTECTED_ROUTES", "halls")]))
            .unwrap_err();
        assert_eq!(err, ConfigError::UnknownRouteGroup("halls".to_string()));
    }

    #[test]
    fn rejects_invalid_pool_size() {
        for raw in ["cero", "0"] {
            let err = AppConfig::from_lookup(lookup_from(&[("DATABASE_MAX_CONNECTIONS", raw)]))
                .unwrap_err();
            assert!(matches!(err, ConfigError::InvalidValue { .. }));
        }
    }
}
