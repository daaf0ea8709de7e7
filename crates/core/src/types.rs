//! 도메인 타입 -- 시스템 전역에서 사용되는 공통 타입
//!
//! 계정/리전 스코프, 태그, 그리고 와이어 형식의 타임스탬프 직렬화를 정의합니다.

use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::ServiceError;
use crate::resource::ResourceKind;

/// ARN 파티션
pub const ARN_PARTITION: &str = "aws";

/// ARN 서비스 네임스페이스
pub const ARN_SERVICE: &str = "sagemaker";

/// 계정 ID 형식(숫자 12자리)인지 확인합니다.
pub fn is_valid_account_id(account_id: &str) -> bool {
    account_id.len() == 12 && account_id.bytes().all(|b| b.is_ascii_digit())
}

/// 시뮬레이션된 계정/리전 쌍
///
/// 모든 리소스는 정확히 하나의 스코프에 속하며, 스코프가 다르면
/// 같은 이름의 리소스가 서로 독립적으로 존재합니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Scope {
    /// 12자리 계정 ID
    pub account_id: String,
    /// 리전 이름 (예: `us-east-1`)
    pub region: String,
}

impl Scope {
    /// 새 스코프를 생성합니다.
    pub fn new(account_id: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            region: region.into(),
        }
    }

    /// 요청으로 들어온 스코프를 검증합니다.
    pub fn validate(&self) -> Result<(), ServiceError> {
        if !is_valid_account_id(&self.account_id) {
            return Err(ServiceError::validation(format!(
                "Value '{}' at 'accountId' failed to satisfy constraint: \
                 Member must be a 12-digit account ID",
                self.account_id
            )));
        }
        if self.region.is_empty() {
            return Err(ServiceError::validation(
                "Value '' at 'region' failed to satisfy constraint: Member must not be empty",
            ));
        }
        Ok(())
    }

    /// 이 스코프에서 리소스의 ARN을 계산합니다.
    ///
    /// 형식: `arn:aws:sagemaker:{region}:{account}:{resource-type}/{name}`
    pub fn arn(&self, kind: ResourceKind, name: &str) -> String {
        format!(
            "arn:{ARN_PARTITION}:{ARN_SERVICE}:{}:{}:{}/{}",
            self.region,
            self.account_id,
            kind.arn_resource_type(),
            name
        )
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.account_id, self.region)
    }
}

/// 리소스 태그
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Tag {
    /// 태그 키
    pub key: String,
    /// 태그 값
    pub value: String,
}

impl Tag {
    /// 새 태그를 생성합니다.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// `SystemTime`을 Unix epoch 기준 초(소수점 포함)로 변환합니다.
///
/// epoch 이전 시각은 0으로 고정됩니다.
pub fn to_epoch_seconds(time: SystemTime) -> f64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

/// Unix epoch 기준 초를 `SystemTime`으로 변환합니다.
///
/// 음수나 유한하지 않은 값은 epoch으로 처리합니다.
pub fn from_epoch_seconds(secs: f64) -> SystemTime {
    if secs.is_finite() && secs > 0.0 {
        UNIX_EPOCH + Duration::from_secs_f64(secs)
    } else {
        UNIX_EPOCH
    }
}

/// 타임스탬프를 epoch 초 숫자로 직렬화하는 serde 모듈
///
/// `#[serde(with = "sagesim_core::types::epoch_seconds")]`로 사용합니다.
pub mod epoch_seconds {
    use std::time::SystemTime;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &SystemTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(super::to_epoch_seconds(*time))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SystemTime, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Ok(super::from_epoch_seconds(secs))
    }
}

/// `Option<SystemTime>`용 epoch 초 serde 모듈
pub mod epoch_seconds_opt {
    use std::time::SystemTime;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        time: &Option<SystemTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match time {
            Some(t) => serializer.serialize_some(&super::to_epoch_seconds(*t)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<SystemTime>, D::Error> {
        let secs = Option::<f64>::deserialize(deserializer)?;
        Ok(secs.map(super::from_epoch_seconds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_formats_notebook_instance_arn() {
        let scope = Scope::new("123456789012", "us-east-1");
        assert_eq!(
            scope.arn(ResourceKind::NotebookInstance, "MyNotebookInstance"),
            "arn:aws:sagemaker:us-east-1:123456789012:notebook-instance/MyNotebookInstance"
        );
    }

    #[test]
    fn scope_formats_lifecycle_config_arn() {
        let scope = Scope::new("123456789012", "eu-west-1");
        assert_eq!(
            scope.arn(ResourceKind::NotebookInstanceLifecycleConfig, "cfg"),
            "arn:aws:sagemaker:eu-west-1:123456789012:notebook-instance-lifecycle-configuration/cfg"
        );
    }

    #[test]
    fn scope_validate_rejects_malformed_account_and_empty_region() {
        assert!(Scope::new("123456789012", "us-east-1").validate().is_ok());

        let err = Scope::new("", "us-east-1").validate().unwrap_err();
        assert!(err.message.contains("'accountId'"));
        assert!(Scope::new("12345678901a", "us-east-1").validate().is_err());
        assert!(Scope::new("1234567890123", "us-east-1").validate().is_err());

        let err = Scope::new("123456789012", "").validate().unwrap_err();
        assert!(err.message.contains("'region'"));
    }

    #[test]
    fn scope_display() {
        let scope = Scope::new("111122223333", "ap-northeast-2");
        assert_eq!(scope.to_string(), "111122223333/ap-northeast-2");
    }

    #[test]
    fn tag_serializes_pascal_case() {
        let tag = Tag::new("env", "prod");
        let json = serde_json::to_string(&tag).unwrap();
        assert_eq!(json, r#"{"Key":"env","Value":"prod"}"#);
    }

    #[test]
    fn epoch_seconds_conversion() {
        let t = UNIX_EPOCH + Duration::from_millis(1_500);
        assert!((to_epoch_seconds(t) - 1.5).abs() < f64::EPSILON);
        assert_eq!(from_epoch_seconds(1.5), t);
        assert_eq!(from_epoch_seconds(-3.0), UNIX_EPOCH);
        assert_eq!(from_epoch_seconds(f64::NAN), UNIX_EPOCH);
    }

    #[derive(Serialize, Deserialize)]
    struct Stamped {
        #[serde(with = "epoch_seconds")]
        at: SystemTime,
        #[serde(default, with = "epoch_seconds_opt")]
        maybe: Option<SystemTime>,
    }

    #[test]
    fn epoch_serde_modules() {
        let value = Stamped {
            at: UNIX_EPOCH + Duration::from_secs(10),
            maybe: None,
        };
        let json = serde_json::to_value(&value).unwrap();
        assert_eq!(json["at"], 10.0);
        assert!(json["maybe"].is_null());

        let parsed: Stamped = serde_json::from_str(r#"{"at": 20.0, "maybe": 30.0}"#).unwrap();
        assert_eq!(parsed.at, UNIX_EPOCH + Duration::from_secs(20));
        assert_eq!(parsed.maybe, Some(UNIX_EPOCH + Duration::from_secs(30)));

        let parsed: Stamped = serde_json::from_str(r#"{"at": 1.0}"#).unwrap();
        assert!(parsed.maybe.is_none());
    }
}
