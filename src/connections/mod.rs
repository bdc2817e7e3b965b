//! Connection subsystem as seen by the gate: saved connection configs, the
//! provider catalog, and the session that reports whether a connection and a
//! config are currently bound.

pub mod catalog;
pub mod motherduck;
pub mod session;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use catalog::{
    get_provider, supported_db_types, ConnectionSchema, FieldType, ProviderMetadata, SchemaField,
};
pub use session::Session;

/// A saved connection, as stored under `[[connections]]` in the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Display name in the explorer
    pub name: String,
    /// Provider key, e.g. "duckdb" or "motherduck"
    pub db_type: String,
    /// Database name or file path, when the provider has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    /// Provider-specific options (tokens, flags, ...)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, String>,
}

impl ConnectionConfig {
    pub fn new(name: &str, db_type: &str) -> Self {
        Self {
            name: name.to_string(),
            db_type: db_type.to_string(),
            database: None,
            options: BTreeMap::new(),
        }
    }

    pub fn with_database(mut self, database: &str) -> Self {
        self.database = Some(database.to_string());
        self
    }

    pub fn with_option(mut self, key: &str, value: &str) -> Self {
        self.options.insert(key.to_string(), value.to_string());
        self
    }

    /// Option value, or `None` when unset or blank.
    pub fn get_option(&self, key: &str) -> Option<&str> {
        self.options
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Connection target for the configured provider, with secrets masked.
    pub fn display_target(&self) -> String {
        match self.db_type.as_str() {
            motherduck::DB_TYPE => motherduck::masked_connection_string(self),
            _ => self.database.clone().unwrap_or_else(|| ":memory:".into()),
        }
    }
}
