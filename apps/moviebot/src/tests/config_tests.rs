use super::*;

use std::{
    collections::HashMap,
    env,
    time::{SystemTime, UNIX_EPOCH},
};

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn defaults_point_at_local_backend() {
    let settings = Settings::default();
    assert_eq!(settings.api_base().expect("api base"), "http://127.0.0.1:8001/api");
    assert_eq!(settings.request_timeout(), Duration::from_secs(30));
    assert_eq!(settings.locale, Locale::Thai);
}

#[test]
fn partial_toml_keeps_remaining_defaults() {
    let settings = parse_settings(
        r#"
backend_url = "https://movies.example.com/"
locale = "en"
"#,
    )
    .expect("parse");

    assert_eq!(settings.backend_url, "https://movies.example.com/");
    assert_eq!(settings.locale, Locale::English);
    assert_eq!(settings.request_timeout_secs, 30);
    assert_eq!(
        settings.api_base().expect("api base"),
        "https://movies.example.com/api"
    );
}

#[test]
fn empty_prefix_uses_bare_backend_url() {
    let settings = Settings {
        backend_url: "http://localhost:9000".into(),
        api_prefix: "/".into(),
        ..Settings::default()
    };
    assert_eq!(settings.api_base().expect("api base"), "http://localhost:9000");
}

#[test]
fn rejects_non_http_backend_urls() {
    let settings = Settings {
        backend_url: "ftp://movies.example.com".into(),
        ..Settings::default()
    };
    assert!(settings.api_base().is_err());

    let settings = Settings {
        backend_url: "not a url".into(),
        ..Settings::default()
    };
    assert!(settings.api_base().is_err());
}

#[test]
fn prefixed_env_vars_win_over_plain_ones() {
    let mut settings = Settings::default();
    apply_env_overrides(
        &mut settings,
        env_from(&[
            ("BACKEND_URL", "http://plain:1"),
            ("APP__BACKEND_URL", "http://prefixed:2"),
            ("APP__REQUEST_TIMEOUT_SECS", " 5 "),
            ("APP__LOCALE", "english"),
        ]),
    )
    .expect("overrides");

    assert_eq!(settings.backend_url, "http://prefixed:2");
    assert_eq!(settings.request_timeout(), Duration::from_secs(5));
    assert_eq!(settings.locale, Locale::English);
}

#[test]
fn invalid_env_values_are_reported() {
    let mut settings = Settings::default();
    assert!(apply_env_overrides(
        &mut settings,
        env_from(&[("APP__REQUEST_TIMEOUT_SECS", "soon")])
    )
    .is_err());
    assert!(apply_env_overrides(&mut settings, env_from(&[("APP__LOCALE", "klingon")])).is_err());
}

#[test]
fn zero_timeout_is_clamped_to_one_second() {
    let settings = Settings {
        request_timeout_secs: 0,
        ..Settings::default()
    };
    assert_eq!(settings.request_timeout(), Duration::from_secs(1));
}

#[test]
fn reads_explicit_config_file() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let path = env::temp_dir().join(format!("moviebot_config_test_{suffix}.toml"));
    fs::write(&path, "request_timeout_secs = 12\napi_prefix = \"/v2\"\n").expect("write config");

    let settings = read_settings_file(&path).expect("read config");
    assert_eq!(settings.request_timeout_secs, 12);
    assert_eq!(settings.api_base().expect("api base"), "http://127.0.0.1:8001/v2");

    fs::remove_file(path).expect("cleanup");
}

#[test]
fn missing_explicit_config_file_is_an_error() {
    let err = load_settings(Some(Path::new("/definitely/not/here/moviebot.toml")))
        .expect_err("must fail");
    assert!(err.to_string().contains("failed to read config file"));
}
