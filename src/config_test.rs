use std::collections::HashMap;

use super::*;

fn from_pairs(pairs: &[(&str, &str)]) -> Result<DevServerConfig, ConfigError> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
    DevServerConfig::from_lookup(|key| map.get(key).cloned())
}

#[test]
fn defaults_match_dev_setup() {
    let config = from_pairs(&[]).unwrap();
    assert_eq!(config, DevServerConfig::default());
    assert_eq!(config.port, 8002);
    assert_eq!(config.target, "http://localhost:8001");
    assert_eq!(config.prefix, "/api");
    assert_eq!(config.static_dir, None);
}

#[test]
fn reads_overrides() {
    let config = from_pairs(&[
        ("PORT", "9000"),
        ("MEDIMEOW_PROXY_TARGET", "http://backend:8080/"),
        ("MEDIMEOW_PROXY_PREFIX", "backend/"),
        ("MEDIMEOW_STATIC_DIR", "dist"),
    ])
    .unwrap();
    assert_eq!(config.port, 9000);
    assert_eq!(config.target, "http://backend:8080");
    assert_eq!(config.prefix, "/backend");
    assert_eq!(config.static_dir, Some(PathBuf::from("dist")));
}

#[test]
fn blank_values_fall_back_to_defaults() {
    let config = from_pairs(&[("PORT", " "), ("MEDIMEOW_STATIC_DIR", "")]).unwrap();
    assert_eq!(config.port, DEFAULT_PORT);
    assert_eq!(config.static_dir, None);
}

#[test]
fn rejects_bad_port() {
    assert_eq!(
        from_pairs(&[("PORT", "eighty")]),
        Err(ConfigError::Invalid { key: "PORT", value: "eighty".to_owned() })
    );
}

#[test]
fn rejects_root_prefix() {
    assert!(matches!(
        from_pairs(&[("MEDIMEOW_PROXY_PREFIX", "/")]),
        Err(ConfigError::Invalid { key: "MEDIMEOW_PROXY_PREFIX", .. })
    ));
}
