use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct LeadsConfig {
    pub common: core_config::Config,
    /// `None` when `DATABASE_URL` or `DATABASE_NAME` is missing; the service
    /// still starts and reports the store as unavailable.
    pub database: Option<DatabaseConfig>,
    pub export: ExportConfig,
    pub otlp_endpoint: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub name: String,
    pub timeout_secs: u64,
}

impl DatabaseConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub root: PathBuf,
    pub prefix: String,
    pub extra_excludes: Vec<String>,
}

impl LeadsConfig {
    pub fn load() -> Result<Self, AppError> {
        // Load common config (handles .env, APP__ prefix and PORT)
        let common_config = core_config::Config::load()?;

        let timeout_secs = get_env("DATABASE_TIMEOUT_SECS", Some("5"))?
            .parse()
            .map_err(|e| {
                AppError::ConfigError(anyhow::anyhow!("Invalid DATABASE_TIMEOUT_SECS: {}", e))
            })?;

        let database = match (non_empty_var("DATABASE_URL"), non_empty_var("DATABASE_NAME")) {
            (Some(url), Some(name)) => Some(DatabaseConfig {
                url,
                name,
                timeout_secs,
            }),
            _ => None,
        };

        let prefix = get_env("EXPORT_PREFIX", Some("backend"))?;
        validate_prefix(&prefix)?;

        Ok(LeadsConfig {
            common: common_config,
            database,
            export: ExportConfig {
                root: PathBuf::from(get_env("EXPORT_ROOT", Some("."))?),
                prefix,
                extra_excludes: parse_list(&get_env("EXPORT_EXCLUDES", Some(""))?),
            },
            otlp_endpoint: non_empty_var("OTLP_ENDPOINT"),
        })
    }
}

/// Whether the two store variables are present, independent of whether a
/// client could be built from them.
pub fn database_url_set() -> bool {
    non_empty_var("DATABASE_URL").is_some()
}

pub fn database_name_set() -> bool {
    non_empty_var("DATABASE_NAME").is_some()
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

// The prefix becomes the first path segment of every archive entry.
fn validate_prefix(prefix: &str) -> Result<(), AppError> {
    let valid = !prefix.is_empty()
        && prefix != "."
        && prefix != ".."
        && !prefix.contains('/')
        && !prefix.contains('\\');
    if valid {
        Ok(())
    } else {
        Err(AppError::ConfigError(anyhow::anyhow!(
            "EXPORT_PREFIX must be a single relative path segment, got {:?}",
            prefix
        )))
    }
}

fn get_env(key: &str, default: Option<&str>) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => match default {
            Some(def) => Ok(def.to_string()),
            None => Err(AppError::ConfigError(anyhow::anyhow!(
                "{} is required but not set",
                key
            ))),
        },
    }
}
