//! MotherDuck (cloud DuckDB) connection targets.
//!
//! Connection string format: `md:[database][?motherduck_token=TOKEN]`.
//! Without a token the driver falls back to browser-based authentication.

use crate::connections::catalog::{ConnectionSchema, FieldType, SchemaField};
use crate::connections::ConnectionConfig;

pub const DB_TYPE: &str = "motherduck";

const TOKEN_OPTION: &str = "motherduck_token";

pub static SCHEMA: ConnectionSchema = ConnectionSchema {
    db_type: DB_TYPE,
    display_name: "MotherDuck",
    fields: &[
        SchemaField {
            name: "database",
            label: "Database",
            field_type: FieldType::Text,
            placeholder: "my_database (optional)",
            required: false,
            description: "MotherDuck database name. Leave empty to use default.",
        },
        SchemaField {
            name: TOKEN_OPTION,
            label: "Access Token",
            field_type: FieldType::Password,
            placeholder: "(optional - uses browser auth if empty)",
            required: false,
            description: "MotherDuck access token for non-interactive authentication.",
        },
    ],
    supports_ssh: false,
    is_file_based: false,
    requires_auth: false,
};

/// Database name: the `database` option wins over the config's own field.
fn database(config: &ConnectionConfig) -> &str {
    config
        .get_option("database")
        .or(config.database.as_deref())
        .unwrap_or("")
}

fn build(config: &ConnectionConfig, token: Option<&str>) -> String {
    let mut target = format!("md:{}", database(config));
    if let Some(token) = token {
        target.push_str("?motherduck_token=");
        target.push_str(token);
    }
    target
}

/// The string handed to the DuckDB driver.
pub fn connection_string(config: &ConnectionConfig) -> String {
    build(config, config.get_option(TOKEN_OPTION))
}

/// Same as [`connection_string`], with the token replaced by `****`.
pub fn masked_connection_string(config: &ConnectionConfig) -> String {
    build(config, config.get_option(TOKEN_OPTION).map(|_| "****"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_fields() {
        let names: Vec<&str> = SCHEMA.fields.iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["database", "motherduck_token"]);
        assert!(SCHEMA.fields.iter().all(|f| !f.required));
        assert_eq!(SCHEMA.fields[1].field_type, FieldType::Password);
    }

    #[test]
    fn test_masked_without_token() {
        let config = ConnectionConfig::new("cloud", DB_TYPE).with_database("prod");
        assert_eq!(masked_connection_string(&config), "md:prod");
    }
}
