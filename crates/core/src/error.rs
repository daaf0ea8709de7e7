//! 에러 타입 -- 도메인별 에러 정의
//!
//! [`ServiceError`]는 시뮬레이터가 호출자에게 돌려주는 구조화된 실패입니다.
//! 공급자 호환성을 위해 `code`와 `message`는 실제 API가 내보내는 문자열을
//! 그대로 유지해야 합니다.

use std::fmt;

use serde::{Deserialize, Serialize};

/// sagesim 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 시뮬레이션된 서비스가 거부한 요청
    #[error("service error: {0}")]
    Service(#[from] ServiceError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 공급자 에러 코드
///
/// 와이어 형식의 `Error.Code` 필드에 들어가는 값입니다. 노트북 API는 잘못된
/// 입력, 상태 전이 거부, 중복, 미존재를 모두 `ValidationException`으로 보고합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    /// 입력 값, 상태 전이, 리소스 존재 여부 검증 실패
    ValidationException,
}

impl ErrorCode {
    /// 와이어 형식 문자열을 반환합니다.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationException => "ValidationException",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 시뮬레이션된 API 호출의 실패
///
/// 실패한 호출은 상태를 변경하지 않습니다. 모든 검증은 변경 전에 수행됩니다.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
#[error("{code}: {message}")]
#[serde(rename_all = "PascalCase")]
pub struct ServiceError {
    /// 에러 코드
    pub code: ErrorCode,
    /// 공급자 메시지 (원문 그대로)
    pub message: String,
}

impl ServiceError {
    /// 임의의 코드로 에러를 생성합니다.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// `ValidationException` 에러를 생성합니다.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationException, message)
    }
}
