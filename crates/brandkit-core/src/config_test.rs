use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

/// Returns a map with all required env vars populated with valid defaults.
fn full_env<'a>() -> HashMap<&'a str, &'a str> {
    let mut m = HashMap::new();
    m.insert("AUTOFILL_CLIENT_ID", "client-id");
    m.insert("AUTOFILL_CLIENT_SECRET", "client-secret");
    m.insert("OPENAI_API_KEY", "sk-test");
    m.insert("SCRAPER_BASE_URL", "http://scraper.local:9000/");
    m
}

#[test]
fn parse_environment_variants() {
    assert_eq!(parse_environment("development"), Environment::Development);
    assert_eq!(parse_environment("test"), Environment::Test);
    assert_eq!(parse_environment("production"), Environment::Production);
    assert_eq!(parse_environment("unknown"), Environment::Development);
}

#[test]
fn build_app_config_succeeds_with_required_vars() {
    let map = full_env();
    let cfg = build_app_config(lookup_from_map(&map)).expect("config");
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.listen_addr.to_string(), "0.0.0.0:8080");
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.templates_path, PathBuf::from("./config/templates.yaml"));
    assert!(cfg.api_keys.is_empty());
    assert_eq!(cfg.autofill_base_url, "https://api.canva.com/rest/v1");
    assert_eq!(
        cfg.autofill_token_path,
        PathBuf::from("./autofill-tokens.json")
    );
    assert_eq!(cfg.autofill_refresh_buffer_secs, 300);
    assert_eq!(cfg.openai_base_url, "https://api.openai.com/v1");
    assert_eq!(cfg.llm_primary_model, "gpt-4o");
    assert_eq!(cfg.llm_cheap_model, "gpt-4o-mini");
    assert_eq!(cfg.llm_embedding_model, "text-embedding-3-small");
    assert_eq!(cfg.scraper_base_url, "http://scraper.local:9000");
    assert_eq!(cfg.scraper_request_timeout_secs, 60);
    assert!(cfg.store.is_none());
    assert_eq!(cfg.keyword_weights, KeywordWeights::default());
}

#[test]
fn build_app_config_reports_each_missing_required_var() {
    for var in [
        "AUTOFILL_CLIENT_ID",
        "AUTOFILL_CLIENT_SECRET",
        "OPENAI_API_KEY",
        "SCRAPER_BASE_URL",
    ] {
        let mut map = full_env();
        map.remove(var);
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == var),
            "expected MissingEnvVar({var}), got: {result:?}"
        );
    }
}

#[test]
fn blank_required_var_counts_as_missing() {
    let mut map = full_env();
    map.insert("OPENAI_API_KEY", "   ");
    let result = build_app_config(lookup_from_map(&map));
    assert!(matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "OPENAI_API_KEY"));
}

#[test]
fn store_url_requires_service_key() {
    let mut map = full_env();
    map.insert("STORE_URL", "https://rows.example.com/");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "STORE_SERVICE_KEY"),
        "got: {result:?}"
    );

    map.insert("STORE_SERVICE_KEY", "service-key");
    let cfg = build_app_config(lookup_from_map(&map)).expect("config");
    let store = cfg.store.expect("store configured");
    assert_eq!(store.url, "https://rows.example.com");
    assert_eq!(store.service_key, "service-key");
}

#[test]
fn production_refuses_memory_store() {
    let mut map = full_env();
    map.insert("BRANDKIT_ENV", "production");
    map.insert("BRANDKIT_API_KEYS", "k1=owner-1");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "STORE_URL"),
        "got: {result:?}"
    );
}

#[test]
fn production_requires_api_keys() {
    let mut map = full_env();
    map.insert("BRANDKIT_ENV", "production");
    map.insert("STORE_URL", "https://rows.example.com");
    map.insert("STORE_SERVICE_KEY", "service-key");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "BRANDKIT_API_KEYS"),
        "got: {result:?}"
    );
}

#[test]
fn api_keys_parse_into_owner_pairs() {
    let mut map = full_env();
    map.insert("BRANDKIT_API_KEYS", "alpha=owner-a, beta = owner-b,");
    let cfg = build_app_config(lookup_from_map(&map)).expect("config");
    let pairs: Vec<(&str, &str)> = cfg
        .api_keys
        .iter()
        .map(|k| (k.key.as_str(), k.owner.as_str()))
        .collect();
    assert_eq!(pairs, vec![("alpha", "owner-a"), ("beta", "owner-b")]);
}

#[test]
fn malformed_api_keys_are_rejected() {
    let mut map = full_env();
    map.insert("BRANDKIT_API_KEYS", "alpha");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "BRANDKIT_API_KEYS"),
        "got: {result:?}"
    );
}

#[test]
fn keyword_weights_override_and_validation() {
    let mut map = full_env();
    map.insert("KEYWORD_WEIGHT_INVERTED_KD", "0.7");
    let cfg = build_app_config(lookup_from_map(&map)).expect("config");
    assert!((cfg.keyword_weights.inverted_kd - 0.7).abs() < f64::EPSILON);

    map.insert("KEYWORD_WEIGHT_COMPETITION", "-1");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "KEYWORD_WEIGHT_COMPETITION"),
        "got: {result:?}"
    );
}

#[test]
fn invalid_refresh_buffer_is_rejected() {
    let mut map = full_env();
    map.insert("AUTOFILL_REFRESH_BUFFER_SECS", "soon");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "AUTOFILL_REFRESH_BUFFER_SECS"),
        "got: {result:?}"
    );
}

#[test]
fn parse_listen_addr_accepts_port_only_and_full_forms() {
    assert_eq!(
        parse_listen_addr(":8080").unwrap().to_string(),
        "0.0.0.0:8080"
    );
    assert_eq!(
        parse_listen_addr("127.0.0.1:9000").unwrap().to_string(),
        "127.0.0.1:9000"
    );
    assert!(matches!(
        parse_listen_addr("localhost"),
        Err(ConfigError::InvalidEnvVar { .. })
    ));
    assert!(parse_listen_addr(":99999").is_err());
}

#[test]
fn debug_output_redacts_secrets() {
    let mut map = full_env();
    map.insert("BRANDKIT_API_KEYS", "topsecretkey=owner-a");
    map.insert("STORE_URL", "https://rows.example.com");
    map.insert("STORE_SERVICE_KEY", "service-key-value");
    let cfg = build_app_config(lookup_from_map(&map)).expect("config");
    let debug = format!("{cfg:?}");
    assert!(!debug.contains("client-secret"));
    assert!(!debug.contains("sk-test"));
    assert!(!debug.contains("topsecretkey"));
    assert!(!debug.contains("service-key-value"));
    assert!(debug.contains("owner-a"));
    assert!(debug.contains("https://rows.example.com"));
}
