use crate::error::{Error, Result};
use crate::models::audit_log::SchemaVariant;
use dotenvy::dotenv;
use std::env;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub server: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    pub password: String,
    pub trust_cert: bool,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database: DatabaseConfig,
    pub jwt_public_key: Option<String>,
    pub schema_variant: SchemaVariant,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(&lookup);

        let database = DatabaseConfig {
            server: vars.required("DB_SERVER")?,
            port: vars.parse_or("DB_PORT", 1433)?,
            database: vars.required("DB_NAME")?,
            username: vars.required("DB_USER")?,
            password: vars.required("DB_PASSWORD")?,
            trust_cert: vars.parse_or("DB_TRUST_CERT", false)?,
        };

        let schema_variant = match vars.optional("AUDIT_SCHEMA").as_deref() {
            None | Some("A") | Some("a") => SchemaVariant::A,
            Some("B") | Some("b") => SchemaVariant::B,
            Some(other) => {
                return Err(Error::Config(format!(
                    "Invalid value for AUDIT_SCHEMA: {} (expected A or B)",
                    other
                )))
            }
        };

        let log_format = match vars.optional("LOG_FORMAT").as_deref() {
            None | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(Error::Config(format!(
                    "Invalid value for LOG_FORMAT: {}",
                    other
                )))
            }
        };

        Ok(Self {
            server_address: vars
                .optional("SERVER_ADDRESS")
                .unwrap_or_else(|| "0.0.0.0:5000".to_string()),
            database,
            jwt_public_key: vars.optional("JWT_PUBLIC_KEY"),
            schema_variant,
            log_format,
        })
    }
}

struct Vars<'a, F>(&'a F);

impl<'a, F> Vars<'a, F>
where
    F: Fn(&str) -> Option<String>,
{
    fn optional(&self, name: &str) -> Option<String> {
        (self.0)(name).filter(|v| !v.trim().is_empty())
    }

    fn required(&self, name: &str) -> Result<String> {
        self.optional(name)
            .ok_or_else(|| Error::Config(format!("Missing environment variable: {}", name)))
    }

    fn parse_or<T>(&self, name: &str, default: T) -> Result<T>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        match self.optional(name) {
            None => Ok(default),
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    const DB_VARS: [(&str, &str); 4] = [
        ("DB_SERVER", "sql.internal"),
        ("DB_NAME", "AUDIT"),
        ("DB_USER", "svc_audit"),
        ("DB_PASSWORD", "secret"),
    ];

    #[test]
    fn defaults_apply_when_optional_values_are_absent() {
        let config = Config::from_lookup(lookup(&DB_VARS)).unwrap();
        assert_eq!(config.server_address, "0.0.0.0:5000");
        assert_eq!(config.database.port, 1433);
        assert!(!config.database.trust_cert);
        assert!(config.jwt_public_key.is_none());
        assert_eq!(config.schema_variant, SchemaVariant::A);
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    fn missing_database_server_is_a_config_error() {
        let err = Config::from_lookup(lookup(&DB_VARS[1..])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error: Missing environment variable: DB_SERVER"
        );
    }

    #[test]
    fn explicit_values_are_parsed() {
        let mut vars = DB_VARS.to_vec();
        vars.extend([
            ("DB_PORT", "14330"),
            ("DB_TRUST_CERT", "true"),
            ("AUDIT_SCHEMA", "B"),
            ("LOG_FORMAT", "json"),
            ("JWT_PUBLIC_KEY", "-----BEGIN PUBLIC KEY-----"),
        ]);
        let config = Config::from_lookup(lookup(&vars)).unwrap();
        assert_eq!(config.database.port, 14330);
        assert!(config.database.trust_cert);
        assert_eq!(config.schema_variant, SchemaVariant::B);
        assert_eq!(config.log_format, LogFormat::Json);
        assert!(config.jwt_public_key.is_some());
    }

    #[test]
    fn bad_port_is_rejected() {
        let mut vars = DB_VARS.to_vec();
        vars.push(("DB_PORT", "sql"));
        let err = Config::from_lookup(lookup(&vars)).unwrap_err();
        assert!(err.to_string().contains("Invalid value for DB_PORT"));
    }
}
