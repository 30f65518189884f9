use std::{
    collections::HashMap,
    env,
    time::{SystemTime, UNIX_EPOCH},
};

use super::*;

fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn defaults_point_at_local_api() {
    let settings = Settings::default();
    assert_eq!(settings.api_base_url, "http://127.0.0.1:3000/api");
    assert_eq!(settings.access_token, None);
    assert_eq!(settings.page_size, 10);
    assert_eq!(settings.request_timeout(), Duration::from_secs(30));
}

#[test]
fn file_overrides_only_present_keys() {
    let mut settings = Settings::default();
    apply_file(
        &mut settings,
        "api_base_url = \"https://admin.example.com/api\"\npage_size = 25\n",
    )
    .expect("valid file");

    assert_eq!(settings.api_base_url, "https://admin.example.com/api");
    assert_eq!(settings.page_size, 25);
    assert_eq!(settings.request_timeout_secs, 30);
}

#[test]
fn file_rejects_unknown_keys() {
    let mut settings = Settings::default();
    assert!(apply_file(&mut settings, "bind_addr = \"0.0.0.0:1\"").is_err());
}

#[test]
fn app_prefixed_env_wins_over_console_alias() {
    let mut settings = Settings::default();
    apply_env(
        &mut settings,
        env_of(&[
            ("CONSOLE_API_URL", "http://alias/api"),
            ("APP__API_BASE_URL", "http://app/api"),
            ("CONSOLE_TOKEN", "alias-token"),
        ]),
    )
    .expect("env");

    assert_eq!(settings.api_base_url, "http://app/api");
    assert_eq!(settings.access_token.as_deref(), Some("alias-token"));
}

#[test]
fn malformed_numeric_env_is_an_error() {
    let mut settings = Settings::default();
    let err = apply_env(&mut settings, env_of(&[("APP__PAGE_SIZE", "lots")]))
        .expect_err("not a number");
    assert!(err.to_string().contains("APP__PAGE_SIZE"));
}

#[test]
fn zero_page_size_is_clamped() {
    let mut settings = Settings::default();
    apply_env(&mut settings, env_of(&[("APP__PAGE_SIZE", "0")])).expect("env");
    assert_eq!(settings.page_size, 1);
}

#[test]
fn flags_override_loaded_values() {
    let mut settings = Settings {
        access_token: Some("from-file".into()),
        ..Settings::default()
    };
    settings.apply_overrides(Overrides {
        access_token: Some("from-flag".into()),
        request_timeout_secs: Some(5),
        ..Overrides::default()
    });

    assert_eq!(settings.access_token.as_deref(), Some("from-flag"));
    assert_eq!(settings.request_timeout(), Duration::from_secs(5));
    assert_eq!(settings.page_size, 10);
}

#[test]
fn explicit_config_path_must_exist() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let missing = env::temp_dir().join(format!("console_missing_{suffix}.toml"));

    let err = load_settings(Some(&missing)).expect_err("missing file");
    assert!(err.to_string().contains("failed to read config file"));
}

#[test]
fn explicit_config_path_is_read() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let path = env::temp_dir().join(format!("console_settings_{suffix}.toml"));
    fs::write(&path, "request_timeout_secs = 7\n").expect("write config");

    let settings = load_settings(Some(&path)).expect("settings");
    fs::remove_file(&path).expect("cleanup");

    assert_eq!(settings.request_timeout_secs, 7);
}
