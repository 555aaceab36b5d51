use super::*;
use std::collections::HashMap;

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name| vars.get(name).cloned()
}

#[test]
fn defaults_match_selection_screen_widths() {
    let settings = Settings::from_sources(None, env_from(&[]));
    assert_eq!(settings.source_label_width, 35);
    assert_eq!(settings.destination_label_width, 45);
    assert!(settings.database_url.starts_with("sqlite://"));
    assert!(settings.database_url.ends_with("selections.sqlite3"));
}

#[test]
fn file_values_override_defaults() {
    let file = r#"
        database_url = "./state/selections.db"
        source_label_width = 20
    "#;
    let settings = Settings::from_sources(Some(file), env_from(&[]));
    assert_eq!(settings.database_url, "sqlite://./state/selections.db");
    assert_eq!(settings.source_label_width, 20);
    assert_eq!(settings.destination_label_width, 45);
}

#[test]
fn env_overrides_file_and_app_prefix_wins() {
    let file = r#"database_url = "sqlite://./from-file.db""#;
    let settings = Settings::from_sources(
        Some(file),
        env_from(&[
            ("SDSYNC_DATABASE_URL", "sqlite://./from-env.db"),
            ("APP__DATABASE_URL", "sqlite::memory:"),
            ("APP__DESTINATION_LABEL_WIDTH", "60"),
        ]),
    );
    assert_eq!(settings.database_url, "sqlite::memory:");
    assert_eq!(settings.destination_label_width, 60);
}

#[test]
fn unparseable_values_are_ignored() {
    let settings = Settings::from_sources(
        Some("source_label_width = \"wide\""),
        env_from(&[("APP__SOURCE_LABEL_WIDTH", "-3")]),
    );
    assert_eq!(settings.source_label_width, 35);
}

#[test]
fn normalizes_plain_file_path_to_sqlite_url() {
    assert_eq!(
        normalize_database_url("./data/test.db"),
        "sqlite://./data/test.db"
    );
    assert_eq!(
        normalize_database_url("sqlite:./data/test.db"),
        "sqlite://./data/test.db"
    );
    assert_eq!(normalize_database_url("sqlite::memory:"), "sqlite::memory:");
}

#[test]
fn foreign_urls_pass_through_and_backslashes_are_flipped() {
    assert_eq!(
        normalize_database_url("postgres://localhost/sdsync"),
        "postgres://localhost/sdsync"
    );
    assert_eq!(
        normalize_database_url(r"C:\Users\alice\sdsync.db"),
        "sqlite://C:/Users/alice/sdsync.db"
    );
    assert_eq!(
        normalize_database_url(r"sqlite:data\sdsync.db"),
        "sqlite://data/sdsync.db"
    );
}

#[test]
fn blank_database_url_falls_back_to_default() {
    assert_eq!(normalize_database_url("   "), Settings::default().database_url);
}
