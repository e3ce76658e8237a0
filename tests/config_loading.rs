//! Integration tests for settings loading across all file formats.

use correlator::config::model::{Config, GeneratorKind, ValidatorKind};
use correlator::config::parse_config_str;
use correlator::config::validation::validate;
use correlator::error::CorrelatorError;

fn load_example(name: &str) -> String {
    let path = format!("example/{name}");
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("failed to read {path}: {e}"))
}

fn assert_full_example(config: &Config) {
    assert_eq!(config.header_name, "X-Correlation-ID");
    assert!(config.update_request_header);
    assert_eq!(config.validator, ValidatorKind::Uuid);
    assert_eq!(config.generator, GeneratorKind::Hyphenated);
    assert!(config.lowercase);
    assert_eq!(config.log_id_length, Some(12));
    assert_eq!(config.tasks.correlation_key, "CORRELATION_ID");
    assert_eq!(config.tasks.parent_key, "TASK_PARENT_ID");
}

#[test]
fn yaml_example_loads_and_validates() {
    let content = load_example("correlator.yaml");
    let config = parse_config_str("yaml", &content, "correlator.yaml").unwrap();
    validate(&config).unwrap();
    assert_full_example(&config);
}

#[test]
fn yaml_minimal_example_keeps_defaults() {
    let content = load_example("minimal.yaml");
    let config = parse_config_str("yaml", &content, "minimal.yaml").unwrap();
    validate(&config).unwrap();
    assert_eq!(config.validator, ValidatorKind::None);
    assert_eq!(
        config,
        Config {
            validator: ValidatorKind::None,
            ..Config::default()
        }
    );
}

#[cfg(feature = "json")]
#[test]
fn json_example_loads_and_validates() {
    let content = load_example("correlator.json");
    let config = parse_config_str("json", &content, "correlator.json").unwrap();
    validate(&config).unwrap();
    assert_full_example(&config);
}

#[cfg(feature = "toml")]
#[test]
fn toml_example_loads_and_validates() {
    let content = load_example("correlator.toml");
    let config = parse_config_str("toml", &content, "correlator.toml").unwrap();
    validate(&config).unwrap();
    assert_full_example(&config);
}

#[cfg(all(feature = "json", feature = "toml"))]
#[test]
fn all_formats_produce_equivalent_configs() {
    let yaml = parse_config_str("yaml", &load_example("correlator.yaml"), "yaml").unwrap();
    let json = parse_config_str("json", &load_example("correlator.json"), "json").unwrap();
    let toml = parse_config_str("toml", &load_example("correlator.toml"), "toml").unwrap();

    assert_eq!(yaml, json);
    assert_eq!(yaml, toml);
}

#[test]
fn example_builds_a_working_layer() {
    let content = load_example("correlator.yaml");
    let config = parse_config_str("yaml", &content, "correlator.yaml").unwrap();
    let layer = config.layer(Vec::new()).unwrap();
    assert_eq!(layer.header_name(), "X-Correlation-ID");
}

#[test]
fn invalid_header_name_fails_validation() {
    let config = parse_config_str("yaml", "header_name: X Request Id\n", "bad.yaml").unwrap();
    let errors = validate(&config).unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field, "header_name");
    assert!(errors[0]
        .suggestion
        .as_deref()
        .is_some_and(|s| s.contains("X-Request-Id")));
}

#[tokio::test]
async fn load_file_reports_missing_path() {
    let err = correlator::config::load_file(std::path::Path::new("example/missing.yaml"))
        .await
        .unwrap_err();
    assert!(matches!(err, CorrelatorError::ConfigFileNotFound { .. }));
}

#[tokio::test]
async fn load_file_reads_example() {
    let config = correlator::config::load_file(std::path::Path::new("example/correlator.yaml"))
        .await
        .unwrap();
    assert_full_example(&config);
}
