//! Non-failing database probe behind `GET /test`.

use super::database::DocumentStore;
use serde::Serialize;

/// Collections listed in the diagnostics body.
pub const MAX_LISTED_COLLECTIONS: usize = 10;

const MAX_ERROR_CHARS: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseProbe {
    /// Connected and the collection listing worked.
    Ok { collections: Vec<String> },
    /// A client exists but the server could not be queried.
    Degraded { error: String },
    /// No client was configured.
    Unavailable { reason: String },
}

impl DatabaseProbe {
    pub async fn run(store: Option<&dyn DocumentStore>) -> Self {
        let Some(store) = store else {
            let reason = "Database not initialized".to_string();
            tracing::warn!(reason = %reason, "Database probe skipped");
            return DatabaseProbe::Unavailable { reason };
        };

        match store.list_collection_names().await {
            Ok(mut collections) => {
                collections.truncate(MAX_LISTED_COLLECTIONS);
                DatabaseProbe::Ok { collections }
            }
            Err(e) => {
                tracing::warn!(
                    database = %store.database_name(),
                    error = %e,
                    "Database probe could not list collections"
                );
                DatabaseProbe::Degraded {
                    error: e.detail(),
                }
            }
        }
    }

    fn database_status(&self) -> String {
        match self {
            DatabaseProbe::Ok { .. } => "✅ Connected & Working".to_string(),
            DatabaseProbe::Degraded { error } => {
                format!("⚠️  Connected but Error: {}", truncate_chars(error, MAX_ERROR_CHARS))
            }
            DatabaseProbe::Unavailable { .. } => "⚠️  Available but not initialized".to_string(),
        }
    }

    fn connection_status(&self) -> &'static str {
        match self {
            DatabaseProbe::Ok { .. } | DatabaseProbe::Degraded { .. } => "Connected",
            DatabaseProbe::Unavailable { .. } => "Not Connected",
        }
    }
}

/// Body of `GET /test`.
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticsResponse {
    pub backend: String,
    pub database: String,
    pub database_url: String,
    pub database_name: String,
    pub connection_status: String,
    pub collections: Vec<String>,
}

impl DiagnosticsResponse {
    pub fn render(probe: DatabaseProbe, database_url_set: bool, database_name_set: bool) -> Self {
        let database = probe.database_status();
        let connection_status = probe.connection_status().to_string();
        let collections = match probe {
            DatabaseProbe::Ok { collections } => collections,
            _ => Vec::new(),
        };

        Self {
            backend: "✅ Running".to_string(),
            database,
            database_url: env_status(database_url_set),
            database_name: env_status(database_name_set),
            connection_status,
            collections,
        }
    }
}

fn env_status(set: bool) -> String {
    let status = if set { "✅ Set" } else { "❌ Not Set" };
    status.to_string()
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_probe_renders_connected() {
        let probe = DatabaseProbe::Ok {
            collections: vec!["lead".to_string()],
        };
        let body = DiagnosticsResponse::render(probe, true, true);
        assert_eq!(body.database, "✅ Connected & Working");
        assert_eq!(body.connection_status, "Connected");
        assert_eq!(body.database_url, "✅ Set");
        assert_eq!(body.collections, vec!["lead"]);
    }

    #[test]
    fn degraded_error_is_cut_to_fifty_chars() {
        let probe = DatabaseProbe::Degraded {
            error: "é".repeat(80),
        };
        let body = DiagnosticsResponse::render(probe, true, false);
        let suffix = body
            .database
            .strip_prefix("⚠️  Connected but Error: ")
            .unwrap();
        assert_eq!(suffix.chars().count(), 50);
        assert_eq!(body.database_name, "❌ Not Set");
        assert!(body.collections.is_empty());
    }

    #[test]
    fn unavailable_probe_is_not_connected() {
        let probe = DatabaseProbe::Unavailable {
            reason: "Database not initialized".to_string(),
        };
        let body = DiagnosticsResponse::render(probe, false, false);
        assert_eq!(body.connection_status, "Not Connected");
        assert_eq!(body.database, "⚠️  Available but not initialized");
    }

    #[tokio::test]
    async fn missing_store_probes_unavailable() {
        assert_eq!(
            DatabaseProbe::run(None).await,
            DatabaseProbe::Unavailable {
                reason: "Database not initialized".to_string()
            }
        );
    }
}
