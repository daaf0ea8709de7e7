//! sagesim.toml 통합 설정 테스트
//!
//! - sagesim.toml.example 파싱 테스트
//! - 부분 설정 (일부 섹션만) 로딩 테스트
//! - 환경변수 우선순위 테스트
//! - 빈 파일 / 잘못된 형식 에러 테스트

use std::io::Write;

use sagesim_core::config::{DEFAULT_INSTANCE_TYPES, SimConfig};
use sagesim_core::error::{ConfigError, SimError};

// =============================================================================
// sagesim.toml.example 파싱 테스트
// =============================================================================

#[test]
fn example_config_parses_successfully() {
    let content = include_str!("../../../sagesim.toml.example");
    let config = SimConfig::parse(content).expect("example config should parse");

    assert_eq!(config.general.log_level, "info");
    assert_eq!(config.general.log_format, "json");
    assert_eq!(config.account.account_id, "123456789012");
    assert_eq!(config.account.region, "us-east-1");
}

#[test]
fn example_config_passes_validation() {
    let content = include_str!("../../../sagesim.toml.example");
    let config = SimConfig::parse(content).expect("should parse");
    config
        .validate()
        .expect("example config should pass validation");
}

#[test]
fn example_config_matches_code_defaults() {
    let content = include_str!("../../../sagesim.toml.example");
    let parsed = SimConfig::parse(content).expect("should parse");
    let defaults = SimConfig::default();

    assert_eq!(parsed.sagemaker.list_max_results, defaults.sagemaker.list_max_results);
    assert_eq!(parsed.sagemaker.tag_page_size, defaults.sagemaker.tag_page_size);
    assert_eq!(
        parsed.sagemaker.default_volume_size_gb,
        defaults.sagemaker.default_volume_size_gb
    );
    assert_eq!(parsed.sagemaker.instance_types, defaults.sagemaker.instance_types);
}

// =============================================================================
// 부분 설정 테스트
// =============================================================================

#[test]
fn partial_config_general_only() {
    let toml = r#"
[general]
log_level = "debug"
"#;
    let config = SimConfig::parse(toml).expect("should parse");
    config.validate().expect("should validate");

    assert_eq!(config.general.log_level, "debug");
    assert_eq!(config.general.log_format, "json");
    assert_eq!(config.account.region, "us-east-1");
    assert_eq!(config.sagemaker.list_max_results, 100);
}

#[test]
fn partial_config_sagemaker_only() {
    let toml = r#"
[sagemaker]
tag_page_size = 10
instance_types = ["ml.t3.medium"]
"#;
    let config = SimConfig::parse(toml).expect("should parse");
    config.validate().expect("should validate");

    assert_eq!(config.sagemaker.tag_page_size, 10);
    assert_eq!(config.sagemaker.instance_types, vec!["ml.t3.medium"]);
    assert_eq!(config.sagemaker.default_volume_size_gb, 5);
}

#[test]
fn default_instance_types_include_notebook_classics() {
    let config = SimConfig::default();
    for t in ["ml.t2.medium", "ml.t3.medium", "ml.p3.2xlarge"] {
        assert!(
            config.sagemaker.instance_types.iter().any(|x| x == t),
            "{t} should be allowed by default"
        );
    }
    assert_eq!(config.sagemaker.instance_types.len(), DEFAULT_INSTANCE_TYPES.len());
}

// =============================================================================
// 환경변수 우선순위 테스트
// =============================================================================

#[test]
#[serial_test::serial]
fn env_override_takes_precedence_over_toml() {
    let toml = r#"
[account]
region = "us-east-1"
"#;

    let original = std::env::var("SAGESIM_ACCOUNT_REGION").ok();
    // SAFETY: serial_test로 직렬화되어 환경변수 조작이 안전합니다.
    unsafe {
        std::env::set_var("SAGESIM_ACCOUNT_REGION", "eu-west-1");
    }

    let mut config = SimConfig::parse(toml).expect("should parse");
    config.apply_env_overrides();
    let result = config.account.region.clone();

    // SAFETY: 테스트 정리
    unsafe {
        match original {
            Some(val) => std::env::set_var("SAGESIM_ACCOUNT_REGION", val),
            None => std::env::remove_var("SAGESIM_ACCOUNT_REGION"),
        }
    }

    assert_eq!(result, "eu-west-1");
}

#[test]
#[serial_test::serial]
fn env_override_csv_for_instance_types() {
    let original = std::env::var("SAGESIM_SAGEMAKER_INSTANCE_TYPES").ok();
    // SAFETY: serial_test로 직렬화되어 환경변수 조작이 안전합니다.
    unsafe {
        std::env::set_var("SAGESIM_SAGEMAKER_INSTANCE_TYPES", "ml.t2.medium, ,ml.m5.xlarge");
    }

    let mut config = SimConfig::parse("").expect("should parse");
    config.apply_env_overrides();
    let result = config.sagemaker.instance_types.clone();

    // SAFETY: 테스트 정리
    unsafe {
        match original {
            Some(val) => std::env::set_var("SAGESIM_SAGEMAKER_INSTANCE_TYPES", val),
            None => std::env::remove_var("SAGESIM_SAGEMAKER_INSTANCE_TYPES"),
        }
    }

    assert_eq!(result, vec!["ml.t2.medium", "ml.m5.xlarge"]);
}

#[test]
#[serial_test::serial]
fn env_override_missing_var_keeps_toml_value() {
    let toml = r#"
[general]
log_level = "warn"
"#;

    // SAFETY: 존재하지 않는 변수를 명시적으로 제거
    unsafe {
        std::env::remove_var("SAGESIM_GENERAL_LOG_LEVEL");
    }

    let mut config = SimConfig::parse(toml).expect("should parse");
    config.apply_env_overrides();

    assert_eq!(config.general.log_level, "warn");
}

#[tokio::test]
#[serial_test::serial]
async fn load_applies_file_then_env() {
    let mut file = tempfile::NamedTempFile::new().expect("tempfile");
    writeln!(file, "[sagemaker]\nlist_max_results = 25").expect("write");

    let original = std::env::var("SAGESIM_SAGEMAKER_TAG_PAGE_SIZE").ok();
    // SAFETY: serial_test로 직렬화되어 환경변수 조작이 안전합니다.
    unsafe {
        std::env::set_var("SAGESIM_SAGEMAKER_TAG_PAGE_SIZE", "5");
    }

    let result = SimConfig::load(file.path()).await;

    // SAFETY: 테스트 정리
    unsafe {
        match original {
            Some(val) => std::env::set_var("SAGESIM_SAGEMAKER_TAG_PAGE_SIZE", val),
            None => std::env::remove_var("SAGESIM_SAGEMAKER_TAG_PAGE_SIZE"),
        }
    }

    let config = result.expect("should load");
    assert_eq!(config.sagemaker.list_max_results, 25);
    assert_eq!(config.sagemaker.tag_page_size, 5);
}

// =============================================================================
// 빈 파일 / 잘못된 형식 에러 테스트
// =============================================================================

#[test]
fn empty_string_parses_with_defaults() {
    let config = SimConfig::parse("").expect("empty string should parse");
    config.validate().expect("should validate");
    assert_eq!(config.general.log_level, "info");
    assert_eq!(config.account.account_id, "123456789012");
}

#[test]
fn comments_only_parses_with_defaults() {
    let toml = r#"
# 이것은 주석입니다
# 모든 줄이 주석입니다
"#;
    let config = SimConfig::parse(toml).expect("comments-only should parse");
    config.validate().expect("should validate");
}

#[test]
fn malformed_toml_returns_parse_error() {
    let err = SimConfig::parse("[invalid toml").unwrap_err();
    assert!(matches!(err, SimError::Config(ConfigError::ParseFailed { .. })));
}

#[test]
fn invalid_type_returns_parse_error() {
    let toml = r#"
[sagemaker]
list_max_results = "many"
"#;
    assert!(SimConfig::parse(toml).is_err());
}

#[test]
fn out_of_range_values_fail_validation() {
    let cases = [
        ("[sagemaker]\nlist_max_results = 0", "sagemaker.list_max_results"),
        ("[sagemaker]\nlist_max_results = 101", "sagemaker.list_max_results"),
        ("[sagemaker]\ntag_page_size = 51", "sagemaker.tag_page_size"),
        ("[sagemaker]\ndefault_volume_size_gb = 4", "sagemaker.default_volume_size_gb"),
        ("[sagemaker]\ninstance_types = []", "sagemaker.instance_types"),
        ("[account]\naccount_id = \"12345\"", "account.account_id"),
        ("[general]\nlog_format = \"xml\"", "general.log_format"),
    ];
    for (toml, expected_field) in cases {
        let config = SimConfig::parse(toml).expect("should parse");
        match config.validate() {
            Err(SimError::Config(ConfigError::InvalidValue { field, .. })) => {
                assert_eq!(field, expected_field, "case: {toml}");
            }
            other => panic!("expected InvalidValue for {toml}, got {other:?}"),
        }
    }
}
