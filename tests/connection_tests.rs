use actiongate::connections::motherduck::{connection_string, masked_connection_string};
use actiongate::connections::{get_provider, supported_db_types, ConnectionConfig};

fn motherduck() -> ConnectionConfig {
    ConnectionConfig::new("test", "motherduck")
}

#[test]
fn test_basic_connection_string() {
    assert_eq!(connection_string(&motherduck()), "md:");
}

#[test]
fn test_connection_string_with_database() {
    let config = motherduck().with_database("my_database");
    assert_eq!(connection_string(&config), "md:my_database");
}

#[test]
fn test_connection_string_with_database_in_options() {
    let config = motherduck().with_option("database", "options_database");
    assert_eq!(connection_string(&config), "md:options_database");
}

#[test]
fn test_option_database_wins_over_field() {
    let config = motherduck()
        .with_database("field_db")
        .with_option("database", "options_db");
    assert_eq!(connection_string(&config), "md:options_db");
}

#[test]
fn test_connection_string_with_token() {
    let config = motherduck().with_option("motherduck_token", "my_secret_token");
    assert_eq!(
        connection_string(&config),
        "md:?motherduck_token=my_secret_token"
    );
}

#[test]
fn test_connection_string_with_database_and_token() {
    let config = motherduck()
        .with_database("prod_db")
        .with_option("motherduck_token", "my_token");
    assert_eq!(
        connection_string(&config),
        "md:prod_db?motherduck_token=my_token"
    );
    assert_eq!(
        masked_connection_string(&config),
        "md:prod_db?motherduck_token=****"
    );
}

#[test]
fn test_empty_token_uses_browser_auth() {
    let config = motherduck().with_option("motherduck_token", "");
    assert_eq!(connection_string(&config), "md:");
}

#[test]
fn test_motherduck_provider_registered() {
    assert!(supported_db_types().contains(&"motherduck"));
}

#[test]
fn test_motherduck_provider_metadata() {
    let provider = get_provider("motherduck").unwrap();
    assert_eq!(provider.display_name, "MotherDuck");
    assert!(!provider.is_file_based);
    assert!(!provider.supports_ssh);
    assert!(!provider.requires_auth);
    assert!(provider.url_schemes.contains(&"md"));
    assert!(provider.url_schemes.contains(&"motherduck"));
}
