//! 리소스 추상화 -- 리소스 종류와 공통 기능
//!
//! 모든 시뮬레이션 리소스는 [`Resource`] trait을 구현합니다.
//! 저장소와 목록 엔진은 이 trait만 보고 동작하므로, 새 리소스 종류를
//! 추가할 때 저장/조회/삭제/목록 로직을 다시 작성할 필요가 없습니다.

use std::fmt;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

/// 리소스 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    /// 노트북 인스턴스
    NotebookInstance,
    /// 노트북 인스턴스 라이프사이클 설정
    NotebookInstanceLifecycleConfig,
    /// 모델
    Model,
}

impl ResourceKind {
    /// ARN의 리소스 타입 세그먼트를 반환합니다.
    pub fn arn_resource_type(&self) -> &'static str {
        match self {
            Self::NotebookInstance => "notebook-instance",
            Self::NotebookInstanceLifecycleConfig => "notebook-instance-lifecycle-configuration",
            Self::Model => "model",
        }
    }

    /// 메트릭 레이블 등에 쓰이는 고정 이름
    pub fn label(&self) -> &'static str {
        match self {
            Self::NotebookInstance => "notebook_instance",
            Self::NotebookInstanceLifecycleConfig => "notebook_instance_lifecycle_config",
            Self::Model => "model",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotebookInstance => write!(f, "Notebook Instance"),
            Self::NotebookInstanceLifecycleConfig => {
                write!(f, "Notebook Instance Lifecycle Config")
            }
            Self::Model => write!(f, "Model"),
        }
    }
}

/// 저장소에 보관되는 리소스 레코드
///
/// 이름은 스코프 안에서 유일해야 합니다. 저장소는 `name`과 `KIND`를,
/// 목록 엔진은 이름과 두 시각을 사용합니다.
pub trait Resource {
    /// 이 레코드의 리소스 종류
    const KIND: ResourceKind;

    /// 스코프 내 고유 이름
    fn name(&self) -> &str;

    /// 생성 시각
    fn creation_time(&self) -> SystemTime;

    /// 마지막 수정 시각
    fn last_modified_time(&self) -> SystemTime;
}
