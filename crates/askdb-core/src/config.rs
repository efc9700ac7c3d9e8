use std::path::PathBuf;
use std::str::FromStr;

use crate::db::DbTarget;
use crate::error::ConfigError;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-pro";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_ACCOUNTS_FILE: &str = "accts.json";

/// How requests pick the database they run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// One database from `MYSQL_*`, schema read once at startup.
    Single,
    /// Registered accounts selected per request by token.
    Multi,
}

impl Mode {
    fn default_port(self) -> u16 {
        match self {
            Mode::Single => 8000,
            Mode::Multi => 10000,
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" => Ok(Mode::Single),
            "multi" => Ok(Mode::Multi),
            other => Err(format!("expected 'single' or 'multi', got '{other}'")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

/// Process configuration, built once in `main` and handed to every component.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub mode: Mode,
    pub gemini: GeminiConfig,
    /// Connection used in [`Mode::Single`]; ignored otherwise.
    pub database: DbTarget,
    pub accounts_path: PathBuf,
    pub server_host: String,
    pub server_port: u16,
    pub strict_sql: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("GOOGLE_API_KEY")
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::Missing("GOOGLE_API_KEY"))?;

        let mode = match lookup("ASKDB_MODE") {
            Some(raw) => raw.parse::<Mode>().map_err(|reason| ConfigError::Invalid {
                name: "ASKDB_MODE",
                value: raw,
                reason,
            })?,
            None => Mode::Multi,
        };

        let gemini = GeminiConfig {
            api_key,
            model: lookup("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            base_url: lookup("GEMINI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
        };

        let database = DbTarget {
            host: lookup("MYSQL_HOST").unwrap_or_else(|| "localhost".to_string()),
            port: parse_opt::<u16>(&lookup, "MYSQL_PORT")?,
            user: lookup("MYSQL_USER").unwrap_or_default(),
            password: lookup("MYSQL_PASSWORD").unwrap_or_default(),
            database: lookup("MYSQL_DATABASE").unwrap_or_default(),
        };

        let server_port = parse_opt::<u16>(&lookup, "SERVER_PORT")?.unwrap_or(mode.default_port());
        let strict_sql = parse_flag(&lookup, "ASKDB_STRICT_SQL")?;

        Ok(Self {
            mode,
            gemini,
            database,
            accounts_path: lookup("ACCOUNTS_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_ACCOUNTS_FILE)),
            server_host: lookup("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            server_port,
            strict_sql,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn parse_opt<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::Invalid {
                name,
                value: raw,
                reason: e.to_string(),
            }),
        None => Ok(None),
    }
}

fn parse_flag(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<bool, ConfigError> {
    let Some(raw) = lookup(name) else {
        return Ok(false);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" | "" => Ok(false),
        _ => Err(ConfigError::Invalid {
            name,
            value: raw,
            reason: "expected a boolean".to_string(),
        }),
    }
}
