use crate::connections::motherduck;

/// Input widget kind for a connection form field.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    #[default]
    Text,
    Password,
    File,
}

/// One field of a provider's connection form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaField {
    pub name: &'static str,
    pub label: &'static str,
    pub field_type: FieldType,
    pub placeholder: &'static str,
    pub required: bool,
    pub description: &'static str,
}

/// Declarative description of a provider's connection form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSchema {
    pub db_type: &'static str,
    pub display_name: &'static str,
    pub fields: &'static [SchemaField],
    pub supports_ssh: bool,
    pub is_file_based: bool,
    pub requires_auth: bool,
}

/// What the rest of the application needs to know about a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderMetadata {
    pub db_type: &'static str,
    pub display_name: &'static str,
    pub is_file_based: bool,
    pub supports_ssh: bool,
    pub requires_auth: bool,
    pub url_schemes: &'static [&'static str],
    pub schema: &'static ConnectionSchema,
}

static DUCKDB_SCHEMA: ConnectionSchema = ConnectionSchema {
    db_type: "duckdb",
    display_name: "DuckDB",
    fields: &[SchemaField {
        name: "database",
        label: "Database File",
        field_type: FieldType::File,
        placeholder: "/path/to/database.duckdb",
        required: false,
        description: "DuckDB database file. Leave empty for an in-memory database.",
    }],
    supports_ssh: false,
    is_file_based: true,
    requires_auth: false,
};

static PROVIDERS: [ProviderMetadata; 2] = [
    ProviderMetadata {
        db_type: "duckdb",
        display_name: "DuckDB",
        is_file_based: true,
        supports_ssh: false,
        requires_auth: false,
        url_schemes: &["duckdb"],
        schema: &DUCKDB_SCHEMA,
    },
    ProviderMetadata {
        db_type: motherduck::DB_TYPE,
        display_name: "MotherDuck",
        is_file_based: false,
        supports_ssh: false,
        requires_auth: false,
        url_schemes: &["md", "motherduck"],
        schema: &motherduck::SCHEMA,
    },
];

/// Provider keys accepted in `db_type`.
pub fn supported_db_types() -> Vec<&'static str> {
    PROVIDERS.iter().map(|p| p.db_type).collect()
}

pub fn get_provider(db_type: &str) -> Option<&'static ProviderMetadata> {
    PROVIDERS
        .iter()
        .find(|p| p.db_type.eq_ignore_ascii_case(db_type.trim()))
}

/// Find the provider owning a URL scheme, e.g. `md` in `md:prod`.
pub fn provider_for_scheme(scheme: &str) -> Option<&'static ProviderMetadata> {
    PROVIDERS
        .iter()
        .find(|p| p.url_schemes.iter().any(|s| s.eq_ignore_ascii_case(scheme)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_db_types() {
        let types = supported_db_types();
        assert!(types.contains(&"duckdb"));
        assert!(types.contains(&"motherduck"));
    }

    #[test]
    fn test_get_provider_case_insensitive() {
        assert_eq!(
            get_provider("DuckDB").map(|p| p.display_name),
            Some("DuckDB")
        );
        assert!(get_provider("oracle").is_none());
    }

    #[test]
    fn test_schema_matches_metadata() {
        for db_type in supported_db_types() {
            let provider = get_provider(db_type).unwrap();
            assert_eq!(provider.schema.db_type, provider.db_type);
            assert_eq!(provider.schema.is_file_based, provider.is_file_based);
            assert_eq!(provider.schema.supports_ssh, provider.supports_ssh);
        }
    }

    #[test]
    fn test_provider_for_scheme() {
        assert_eq!(
            provider_for_scheme("md").map(|p| p.db_type),
            Some("motherduck")
        );
        assert_eq!(provider_for_scheme("postgres"), None);
    }
}
