//! 시뮬레이터 내부 에러 타입
//!
//! [`StoreError`]는 리소스 종류와 무관한 저장소 실패입니다. 호출자에게
//! 나가기 전에 각 리소스 모듈이 공급자 원문 메시지를 가진
//! [`ServiceError`]로 바꿉니다. 종류마다 문구가 다르기 때문에 일반적인
//! `From` 변환은 제공하지 않습니다.

use sagesim_core::error::ServiceError;
use sagesim_core::resource::ResourceKind;

/// 저장소 에러
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// 같은 이름의 리소스가 이미 존재함
    #[error("{kind} '{name}' already exists")]
    AlreadyExists {
        /// 리소스 종류
        kind: ResourceKind,
        /// 충돌한 이름
        name: String,
    },

    /// 리소스를 찾을 수 없음
    #[error("{kind} '{name}' not found")]
    NotFound {
        /// 리소스 종류
        kind: ResourceKind,
        /// 찾은 이름
        name: String,
    },
}

/// 페이지네이션 커서 에러
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaginationError {
    /// 커서를 해석할 수 없음
    #[error("invalid pagination token: {0}")]
    InvalidToken(String),

    /// `MaxResults`가 허용 범위를 벗어남
    #[error("max results {value} out of range 1-{upper}")]
    MaxResultsOutOfRange {
        /// 요청된 값
        value: usize,
        /// 허용 상한
        upper: usize,
    },
}

impl From<PaginationError> for ServiceError {
    fn from(err: PaginationError) -> Self {
        match err {
            PaginationError::InvalidToken(_) => ServiceError::validation("Invalid pagination token"),
            PaginationError::MaxResultsOutOfRange { value: 0, .. } => ServiceError::validation(
                "Value '0' at 'maxResults' failed to satisfy constraint: \
                 Member must have value greater than or equal to 1",
            ),
            PaginationError::MaxResultsOutOfRange { value, upper } => {
                ServiceError::validation(format!(
                    "Value '{value}' at 'maxResults' failed to satisfy constraint: \
                     Member must have value less than or equal to {upper}"
                ))
            }
        }
    }
}
