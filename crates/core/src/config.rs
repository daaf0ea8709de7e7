//! 설정 관리 -- sagesim.toml 파싱 및 런타임 설정
//!
//! [`SimConfig`]는 시뮬레이터 전체 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`SAGESIM_ACCOUNT_REGION=eu-west-1` 형식)
//! 3. 설정 파일 (`sagesim.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), sagesim_core::error::SimError> {
//! use sagesim_core::config::SimConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = SimConfig::load("sagesim.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = SimConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, SimError};
use crate::types::is_valid_account_id;

/// 노트북 인스턴스가 허용하는 기본 인스턴스 타입 목록
pub const DEFAULT_INSTANCE_TYPES: &[&str] = &[
    "ml.p2.xlarge",
    "ml.m5.4xlarge",
    "ml.m4.16xlarge",
    "ml.t3.xlarge",
    "ml.p3.16xlarge",
    "ml.t2.xlarge",
    "ml.p2.16xlarge",
    "ml.c4.2xlarge",
    "ml.c5.2xlarge",
    "ml.c4.4xlarge",
    "ml.c5d.2xlarge",
    "ml.c5.4xlarge",
    "ml.c5d.4xlarge",
    "ml.c4.8xlarge",
    "ml.c5d.xlarge",
    "ml.c5.9xlarge",
    "ml.c5.xlarge",
    "ml.c5d.9xlarge",
    "ml.c4.xlarge",
    "ml.t2.2xlarge",
    "ml.c5d.18xlarge",
    "ml.t3.2xlarge",
    "ml.t3.medium",
    "ml.t2.medium",
    "ml.c5.18xlarge",
    "ml.p3.2xlarge",
    "ml.m5.xlarge",
    "ml.m4.10xlarge",
    "ml.t2.large",
    "ml.m5.12xlarge",
    "ml.m4.xlarge",
    "ml.t3.large",
    "ml.m5.24xlarge",
    "ml.m4.2xlarge",
    "ml.p2.8xlarge",
    "ml.m5.2xlarge",
    "ml.p3.8xlarge",
    "ml.m4.4xlarge",
];

/// 목록 API 한 페이지의 최대 크기 상한
pub const MAX_LIST_RESULTS: usize = 100;

/// 태그 목록 한 페이지의 최대 크기 상한
pub const MAX_TAG_PAGE_SIZE: usize = 50;

/// 노트북 볼륨 크기 상한 (GB)
pub const MAX_VOLUME_SIZE_GB: u32 = 16_384;

/// sagesim 통합 설정
///
/// `sagesim.toml` 파일의 최상위 구조를 나타냅니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 기본 계정/리전
    #[serde(default)]
    pub account: AccountConfig,
    /// SageMaker 시뮬레이터 설정
    #[serde(default)]
    pub sagemaker: SageMakerConfig,
}

impl SimConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SimError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                SimError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, SimError> {
        toml::from_str(toml_str).map_err(|e| {
            SimError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `SAGESIM_{SECTION}_{FIELD}`
    /// 예: `SAGESIM_ACCOUNT_REGION=eu-west-1`
    pub fn apply_env_overrides(&mut self) {
        override_string(&mut self.general.log_level, "SAGESIM_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "SAGESIM_GENERAL_LOG_FORMAT");

        override_string(&mut self.account.account_id, "SAGESIM_ACCOUNT_ACCOUNT_ID");
        override_string(&mut self.account.region, "SAGESIM_ACCOUNT_REGION");

        override_usize(
            &mut self.sagemaker.list_max_results,
            "SAGESIM_SAGEMAKER_LIST_MAX_RESULTS",
        );
        override_usize(
            &mut self.sagemaker.tag_page_size,
            "SAGESIM_SAGEMAKER_TAG_PAGE_SIZE",
        );
        override_u32(
            &mut self.sagemaker.default_volume_size_gb,
            "SAGESIM_SAGEMAKER_DEFAULT_VOLUME_SIZE_GB",
        );
        override_csv(
            &mut self.sagemaker.instance_types,
            "SAGESIM_SAGEMAKER_INSTANCE_TYPES",
        );
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), SimError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        if !is_valid_account_id(&self.account.account_id) {
            return Err(ConfigError::InvalidValue {
                field: "account.account_id".to_owned(),
                reason: "must be exactly 12 digits".to_owned(),
            }
            .into());
        }

        if self.account.region.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "account.region".to_owned(),
                reason: "region must not be empty".to_owned(),
            }
            .into());
        }

        if self.sagemaker.list_max_results == 0
            || self.sagemaker.list_max_results > MAX_LIST_RESULTS
        {
            return Err(ConfigError::InvalidValue {
                field: "sagemaker.list_max_results".to_owned(),
                reason: format!("must be 1-{MAX_LIST_RESULTS}"),
            }
            .into());
        }

        if self.sagemaker.tag_page_size == 0 || self.sagemaker.tag_page_size > MAX_TAG_PAGE_SIZE {
            return Err(ConfigError::InvalidValue {
                field: "sagemaker.tag_page_size".to_owned(),
                reason: format!("must be 1-{MAX_TAG_PAGE_SIZE}"),
            }
            .into());
        }

        if self.sagemaker.default_volume_size_gb < 5
            || self.sagemaker.default_volume_size_gb > MAX_VOLUME_SIZE_GB
        {
            return Err(ConfigError::InvalidValue {
                field: "sagemaker.default_volume_size_gb".to_owned(),
                reason: format!("must be 5-{MAX_VOLUME_SIZE_GB}"),
            }
            .into());
        }

        if self.sagemaker.instance_types.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "sagemaker.instance_types".to_owned(),
                reason: "allow-list must not be empty".to_owned(),
            }
            .into());
        }

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "json".to_owned(),
        }
    }
}

/// 요청에 계정/리전이 없을 때 사용할 기본 스코프
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountConfig {
    /// 12자리 계정 ID
    pub account_id: String,
    /// 리전 이름
    pub region: String,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            account_id: "123456789012".to_owned(),
            region: "us-east-1".to_owned(),
        }
    }
}

/// SageMaker 시뮬레이터 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SageMakerConfig {
    /// 목록 API의 기본 페이지 크기
    pub list_max_results: usize,
    /// `ListTags`의 기본 페이지 크기
    pub tag_page_size: usize,
    /// `VolumeSizeInGB` 미지정 시 기본값
    pub default_volume_size_gb: u32,
    /// 허용되는 노트북 인스턴스 타입
    pub instance_types: Vec<String>,
}

impl Default for SageMakerConfig {
    fn default() -> Self {
        Self {
            list_max_results: MAX_LIST_RESULTS,
            tag_page_size: MAX_TAG_PAGE_SIZE,
            default_volume_size_gb: 5,
            instance_types: DEFAULT_INSTANCE_TYPES
                .iter()
                .map(|t| (*t).to_owned())
                .collect(),
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_u32(target: &mut u32, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u32>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u32 from env var, ignoring"
            ),
        }
    }
}

fn override_csv(target: &mut Vec<String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val
            .split(',')
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect();
    }
}
