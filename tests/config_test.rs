//! 設定とAPIキー解決のテスト

use std::collections::HashMap;
use vocab_crop::config::{ApiKey, Config, KeySource, DEFAULT_JPEG_QUALITY, DEFAULT_MODEL};
use vocab_crop::orchestrator::EmptyResultPolicy;
use vocab_crop_common::HeaderLanguage;

fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

#[test]
fn test_gemini_env_takes_priority() {
    let vars = env(&[("GEMINI_API_KEY", "from-gemini"), ("GOOGLE_API_KEY", "from-google")]);
    let config = Config {
        api_key: Some("from-file".into()),
        ..Default::default()
    };

    let key = config.resolve_api_key_with(|name| vars.get(name).cloned());
    assert_eq!(
        key,
        ApiKey::Present {
            value: "from-gemini".into(),
            source: KeySource::Env("GEMINI_API_KEY"),
        }
    );
}

#[test]
fn test_google_env_fallback() {
    let vars = env(&[("GEMINI_API_KEY", "   "), ("GOOGLE_API_KEY", "from-google")]);
    let key = Config::default().resolve_api_key_with(|name| vars.get(name).cloned());
    assert_eq!(
        key,
        ApiKey::Present {
            value: "from-google".into(),
            source: KeySource::Env("GOOGLE_API_KEY"),
        }
    );
}

#[test]
fn test_config_file_fallback() {
    let config = Config {
        api_key: Some("  from-file \n".into()),
        ..Default::default()
    };
    let key = config.resolve_api_key_with(|_| None);
    assert_eq!(key.into_value().unwrap(), "from-file");
}

#[test]
fn test_blank_config_key_is_absent() {
    let config = Config {
        api_key: Some(String::new()),
        ..Default::default()
    };
    let key = config.resolve_api_key_with(|_| None);
    assert!(!key.is_present());
}

#[test]
fn test_partial_config_uses_defaults() {
    let config: Config = serde_json::from_str(r#"{"model": "gemini-1.5-pro"}"#).unwrap();
    assert_eq!(config.model, "gemini-1.5-pro");
    assert_eq!(config.jpeg_quality, DEFAULT_JPEG_QUALITY);
    assert_eq!(config.empty_result_policy, EmptyResultPolicy::Error);
    assert_eq!(config.header_language, HeaderLanguage::Zh);
    assert!(config.api_key.is_none());
}

#[test]
fn test_config_roundtrip_keeps_choices() {
    let config = Config {
        empty_result_policy: EmptyResultPolicy::Complete,
        header_language: HeaderLanguage::En,
        archive_folder: Some("unit1".into()),
        ..Default::default()
    };

    let json = serde_json::to_string_pretty(&config).unwrap();
    assert!(json.contains("\"complete\""));
    assert!(json.contains("\"en\""));

    let loaded: Config = serde_json::from_str(&json).unwrap();
    assert_eq!(loaded.empty_result_policy, EmptyResultPolicy::Complete);
    assert_eq!(loaded.header_language, HeaderLanguage::En);
    assert_eq!(loaded.archive_folder.as_deref(), Some("unit1"));
    assert_eq!(loaded.model, DEFAULT_MODEL);
}
