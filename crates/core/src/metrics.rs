//! 메트릭 상수 및 설명 등록
//!
//! 모든 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 시뮬레이터는 `metrics::counter!()` 매크로로 이 상수를 사용하며,
//! 레코더를 설치하는 것은 임베딩하는 쪽의 몫입니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `sagesim_`
//! - 접미어: `_total` (counter), 없음 (gauge)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//! use sagesim_core::metrics::{LABEL_OPERATION, SAGEMAKER_OPERATIONS_TOTAL};
//!
//! counter!(SAGEMAKER_OPERATIONS_TOTAL, LABEL_OPERATION => "DescribeNotebookInstance")
//!     .increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 오퍼레이션 이름 레이블 키 (CreateNotebookInstance 등)
pub const LABEL_OPERATION: &str = "operation";

/// 에러 코드 레이블 키 (ValidationException 등)
pub const LABEL_CODE: &str = "code";

/// 리소스 종류 레이블 키 (notebook_instance, model 등)
pub const LABEL_KIND: &str = "kind";

// ─── SageMaker 시뮬레이터 메트릭 ────────────────────────────────────

/// 처리된 오퍼레이션 수 (counter, label: operation)
pub const SAGEMAKER_OPERATIONS_TOTAL: &str = "sagesim_sagemaker_operations_total";

/// 실패한 오퍼레이션 수 (counter, labels: operation, code)
pub const SAGEMAKER_ERRORS_TOTAL: &str = "sagesim_sagemaker_errors_total";

/// 생성된 리소스 수 (counter, label: kind)
pub const SAGEMAKER_RESOURCES_CREATED_TOTAL: &str = "sagesim_sagemaker_resources_created_total";

/// 삭제된 리소스 수 (counter, label: kind)
pub const SAGEMAKER_RESOURCES_DELETED_TOTAL: &str = "sagesim_sagemaker_resources_deleted_total";

/// 노트북 인스턴스 상태 전이 수 (counter, label: operation)
pub const SAGEMAKER_STATUS_TRANSITIONS_TOTAL: &str = "sagesim_sagemaker_status_transitions_total";

/// 활성 백엔드(계정/리전) 수 (gauge)
pub const SAGEMAKER_BACKENDS_ACTIVE: &str = "sagesim_sagemaker_backends_active";

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// 레코더(전역 또는 `metrics::with_local_recorder` 범위) 설치 후 호출합니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_gauge};

    describe_counter!(
        SAGEMAKER_OPERATIONS_TOTAL,
        "Total number of simulated SageMaker operations handled"
    );
    describe_counter!(
        SAGEMAKER_ERRORS_TOTAL,
        "Total number of simulated operations rejected with a service error"
    );
    describe_counter!(
        SAGEMAKER_RESOURCES_CREATED_TOTAL,
        "Total number of resources created, per resource kind"
    );
    describe_counter!(
        SAGEMAKER_RESOURCES_DELETED_TOTAL,
        "Total number of resources deleted, per resource kind"
    );
    describe_counter!(
        SAGEMAKER_STATUS_TRANSITIONS_TOTAL,
        "Total number of notebook instance status transitions"
    );
    describe_gauge!(
        SAGEMAKER_BACKENDS_ACTIVE,
        "Number of account/region backends currently materialized"
    );
}
