//! Configuration loading tests

use iam_krn::config::{LogFormat, load_config_from_str};
use iam_krn::store::Effect;

const FULL_CONFIG: &str = r#"
[logging]
level = "warn"
format = "json"

[store]
effect = "allow"

[generator]
services = 4
statements_per_service = 25
resources_per_statement = 6
principals_per_statement = 2
wildcard_every = 5
seed = 1234
"#;

#[test]
fn test_empty_config_uses_defaults() {
    let config = load_config_from_str("").unwrap();

    assert_eq!(config.logging.level, "info");
    assert_eq!(config.logging.format, LogFormat::Pretty);
    assert!(config.store.statements_path.is_none());
    assert!(config.store.effect.is_none());
    assert_eq!(config.generator.services, 10);
    assert_eq!(config.generator.wildcard_every, 10);
}

#[test]
fn test_full_config() {
    let config = load_config_from_str(FULL_CONFIG).unwrap();

    // Logging
    assert_eq!(config.logging.level, "warn");
    assert_eq!(config.logging.format, LogFormat::Json);

    // Store
    assert_eq!(config.store.effect, Some(Effect::Allow));

    // Generator
    assert_eq!(config.generator.services, 4);
    assert_eq!(config.generator.statements_per_service, 25);
    assert_eq!(config.generator.resources_per_statement, 6);
    assert_eq!(config.generator.principals_per_statement, 2);
    assert_eq!(config.generator.wildcard_every, 5);
    assert_eq!(config.generator.seed, Some(1234));
}

#[test]
fn test_invalid_effect() {
    let result = load_config_from_str("[store]\neffect = \"maybe\"\n");
    assert!(result.is_err());
}

#[test]
fn test_invalid_format() {
    let result = load_config_from_str("[logging]\nformat = \"xml\"\n");
    assert!(result.is_err());
}

#[test]
fn test_missing_explicit_file() {
    let result = iam_krn::config::load_config(Some("/nonexistent/iam-krn.toml"));
    assert!(result.is_err());
}

#[test]
#[serial_test::serial]
fn test_file_with_statements_path() {
    use std::fs;
    use tempfile::tempdir;

    let dir = tempdir().unwrap();
    let statements_path = dir.path().join("statements.json");
    fs::write(&statements_path, "[]").unwrap();

    let config_path = dir.path().join("iam-krn.toml");
    let config_content = format!(
        "[store]\nstatements_path = {:?}\n",
        statements_path.to_str().unwrap()
    );
    fs::write(&config_path, config_content).unwrap();

    let config = iam_krn::config::load_config(Some(config_path.to_str().unwrap())).unwrap();
    assert_eq!(
        config.store.statements_path.as_deref(),
        statements_path.to_str()
    );
}

#[test]
#[serial_test::serial]
fn test_env_var_overrides_file() {
    use std::env;
    use std::fs;
    use tempfile::tempdir;

    let dir = tempdir().unwrap();
    let config_path = dir.path().join("iam-krn.toml");
    fs::write(&config_path, "[generator]\nseed = 1\nservices = 2\n").unwrap();

    unsafe {
        env::set_var("IAM_KRN_GENERATOR__SEED", "99");
    }

    let config = iam_krn::config::load_config(Some(config_path.to_str().unwrap()));

    // Cleanup
    unsafe {
        env::remove_var("IAM_KRN_GENERATOR__SEED");
    }

    let config = config.unwrap();
    assert_eq!(config.generator.seed, Some(99));
    assert_eq!(config.generator.services, 2);
}
