// src/config.rs

//! Environment configuration loading.
//!
//! Credentials come from the process environment, optionally seeded from a
//! `.env` file in the working directory. They are read once at startup; a
//! missing required value aborts the run before any target is checked.
//!
//! ## Environment Variables
//!
//! - `DB_ADDR`: Redis address as `host:port`
//! - `DB_PASSWORD`: Redis password (optional)
//! - `EMAIL_USERNAME`: SMTP login, also the sender address
//! - `EMAIL_PASSWORD`: SMTP password
//! - `EMAIL_TO`: Comma-separated recipients (default: `EMAIL_USERNAME`)
//! - `SMTP_HOST`: SMTP relay (default: `smtp.gmail.com`)
//! - `SMTP_PORT`: SMTP STARTTLS port (default: `587`)

use std::env;

use crate::error::{AppError, Result};

const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
const DEFAULT_SMTP_PORT: u16 = 587;

/// Load a `.env` file if one is present.
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => log::debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => log::debug!("No .env file found"),
        Err(e) => log::warn!("Failed to read .env file: {}", e),
    }
}

/// Redis connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreEnv {
    pub addr: String,
    pub password: Option<String>,
}

impl StoreEnv {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            addr: required(&lookup, "DB_ADDR")?,
            password: optional(&lookup, "DB_PASSWORD"),
        })
    }
}

/// SMTP account and recipients.
#[derive(Clone, PartialEq, Eq)]
pub struct MailEnv {
    pub username: String,
    pub password: String,
    pub recipients: Vec<String>,
    pub smtp_host: String,
    pub smtp_port: u16,
}

impl std::fmt::Debug for MailEnv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailEnv")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("recipients", &self.recipients)
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .finish()
    }
}

impl MailEnv {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let username = required(&lookup, "EMAIL_USERNAME")?;
        let password = required(&lookup, "EMAIL_PASSWORD")?;

        let recipients = optional(&lookup, "EMAIL_TO")
            .map(|list| {
                list.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect::<Vec<_>>()
            })
            .filter(|list| !list.is_empty())
            .unwrap_or_else(|| vec![username.clone()]);

        let smtp_host =
            optional(&lookup, "SMTP_HOST").unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string());
        let smtp_port = match optional(&lookup, "SMTP_PORT") {
            Some(port) => port
                .parse()
                .map_err(|_| AppError::config(format!("SMTP_PORT '{port}' is not a valid port")))?,
            None => DEFAULT_SMTP_PORT,
        };

        Ok(Self {
            username,
            password,
            recipients,
            smtp_host,
            smtp_port,
        })
    }
}

fn required(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String> {
    optional(lookup, key).ok_or_else(|| AppError::config(format!("{key} must be set")))
}

fn optional(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn store_env_requires_addr() {
        let err = StoreEnv::from_lookup(lookup(&[("DB_PASSWORD", "secret")])).unwrap_err();
        assert!(matches!(err, AppError::Config(msg) if msg.contains("DB_ADDR")));
    }

    #[test]
    fn store_env_password_optional() {
        let store = StoreEnv::from_lookup(lookup(&[("DB_ADDR", "localhost:6379")])).unwrap();
        assert_eq!(store.addr, "localhost:6379");
        assert_eq!(store.password, None);

        let store = StoreEnv::from_lookup(lookup(&[
            ("DB_ADDR", "localhost:6379"),
            ("DB_PASSWORD", ""),
        ]))
        .unwrap();
        assert_eq!(store.password, None);
    }

    #[test]
    fn mail_env_defaults() {
        let mail = MailEnv::from_lookup(lookup(&[
            ("EMAIL_USERNAME", "me@example.com"),
            ("EMAIL_PASSWORD", "app-password"),
        ]))
        .unwrap();
        assert_eq!(mail.recipients, vec!["me@example.com"]);
        assert_eq!(mail.smtp_host, "smtp.gmail.com");
        assert_eq!(mail.smtp_port, 587);
        assert!(!format!("{mail:?}").contains("app-password"));
    }

    #[test]
    fn mail_env_overrides() {
        let mail = MailEnv::from_lookup(lookup(&[
            ("EMAIL_USERNAME", "me@example.com"),
            ("EMAIL_PASSWORD", "pw"),
            ("EMAIL_TO", "a@example.com, b@example.com,"),
            ("SMTP_HOST", "mail.example.com"),
            ("SMTP_PORT", "2525"),
        ]))
        .unwrap();
        assert_eq!(mail.recipients, vec!["a@example.com", "b@example.com"]);
        assert_eq!(mail.smtp_host, "mail.example.com");
        assert_eq!(mail.smtp_port, 2525);
    }

    #[test]
    fn mail_env_rejects_missing_or_bad_values() {
        assert!(MailEnv::from_lookup(lookup(&[("EMAIL_USERNAME", "me@example.com")])).is_err());
        assert!(
            MailEnv::from_lookup(lookup(&[
                ("EMAIL_USERNAME", "me@example.com"),
                ("EMAIL_PASSWORD", "pw"),
                ("SMTP_PORT", "smtp"),
            ]))
            .is_err()
        );
    }
}
