//! Application configuration loaded from environment variables.
//!
//! Built once in `main`; `.env` values are merged in by `dotenvy` beforehand
//! and never override variables already set in the process environment.

use std::env;
use std::str::FromStr;

use blog_infra::database::DatabaseConfig;
use thiserror::Error;

use crate::routing::Site;
use crate::telemetry::TelemetryConfig;

/// Invalid configuration. Aborts start-up.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} has invalid value {value:?} (expected {expected})")]
    Invalid {
        var: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Prod,
}

impl FromStr for Environment {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dev" | "development" => Ok(Environment::Dev),
            "prod" | "production" => Ok(Environment::Prod),
            _ => Err(()),
        }
    }
}

/// Inputs of the host routing table.
#[derive(Debug, Clone)]
pub struct HostConfig {
    /// Base domain, e.g. `example.com`.
    pub domain: String,
    /// Site served to allowed hosts that are not in the table.
    pub default_site: Site,
    pub allowed_hosts: Vec<String>,
    /// Reject hosts that are neither in the table nor allowed.
    pub strict: bool,
}

impl HostConfig {
    /// First label of the domain (`example` for `example.com`).
    pub fn site_name(&self) -> &str {
        self.domain.split('.').next().unwrap_or(&self.domain)
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub debug: bool,
    pub host: String,
    pub port: u16,
    pub hosts: HostConfig,
    pub database: Option<DatabaseConfig>,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let environment = match var("APP_ENV") {
            Some(value) => value.parse().map_err(|()| ConfigError::Invalid {
                var: "APP_ENV",
                value,
                expected: "dev or prod",
            })?,
            None => Environment::Prod,
        };

        let debug = match var("APP_DEBUG") {
            Some(value) => parse_bool("APP_DEBUG", value)?,
            None => environment == Environment::Dev,
        };

        let port = match var("PORT") {
            Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
                var: "PORT",
                value,
                expected: "a port number",
            })?,
            None => 8080,
        };

        let default_site = match var("DEFAULT_HOST") {
            Some(value) => value.parse().map_err(|()| ConfigError::Invalid {
                var: "DEFAULT_HOST",
                value,
                expected: "api, admin or www",
            })?,
            None => Site::Api,
        };

        let hosts = HostConfig {
            domain: var("SITE_DOMAIN")
                .map(|d| d.trim().to_ascii_lowercase())
                .unwrap_or_else(|| "example.com".to_string()),
            default_site,
            allowed_hosts: var("ALLOWED_HOSTS")
                .map(|list| split_list(&list))
                .unwrap_or_else(|| vec!["localhost".to_string(), "127.0.0.1".to_string()]),
            strict: match var("STRICT_HOSTS") {
                Some(value) => parse_bool("STRICT_HOSTS", value)?,
                None => true,
            },
        };

        let database = database_url(&var, hosts.site_name())
            .map(|url| -> Result<DatabaseConfig, ConfigError> {
                let mut config = DatabaseConfig::new(url);
                if let Some(value) = var("DB_MAX_CONNECTIONS") {
                    config.max_connections = parse_count("DB_MAX_CONNECTIONS", value)?;
                }
                if let Some(value) = var("DB_MIN_CONNECTIONS") {
                    config.min_connections = parse_count("DB_MIN_CONNECTIONS", value)?;
                }
                config.sql_logging = debug;
                Ok(config)
            })
            .transpose()?;

        let telemetry = TelemetryConfig {
            json_logs: var("LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
            service_name: format!("{}-api", hosts.site_name()),
            debug,
        };

        Ok(Self {
            environment,
            debug,
            host: var("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port,
            hosts,
            database,
            telemetry,
        })
    }
}

/// `DATABASE_URL` wins; otherwise the URL is assembled from `POSTGRES_*`
/// when a password is configured.
fn database_url(var: &impl Fn(&str) -> Option<String>, site_name: &str) -> Option<String> {
    if let Some(url) = var("DATABASE_URL") {
        return Some(url);
    }

    let password = var("POSTGRES_PASSWORD")?;
    let user = var("POSTGRES_USER").unwrap_or_else(|| site_name.to_string());
    let name = var("POSTGRES_DB").unwrap_or_else(|| site_name.to_string());
    let host = var("POSTGRES_HOST").unwrap_or_else(|| "localhost".to_string());
    let port = var("POSTGRES_PORT").unwrap_or_else(|| "5432".to_string());
    let sslmode = var("POSTGRES_SSLMODE").unwrap_or_else(|| "prefer".to_string());

    Some(format!(
        "postgres://{user}:{password}@{host}:{port}/{name}?sslmode={sslmode}"
    ))
}

fn parse_bool(var: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            var,
            value,
            expected: "a boolean",
        }),
    }
}

fn parse_count(var: &'static str, value: String) -> Result<u32, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        var,
        value,
        expected: "a non-negative integer",
    })
}

fn split_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(|h| h.trim().to_ascii_lowercase())
        .filter(|h| !h.is_empty())
        .collect()
}
