//! 노트북 인스턴스 -- 상태 머신과 오퍼레이션
//!
//! # 상태 전이
//! ```text
//! Pending → InService ⇄ Stopped → Deleting → (제거)
//!              Failed    → Deleting → (제거)
//! ```
//!
//! 생성 즉시 `InService`가 됩니다. 프로비저닝 지연은 시뮬레이션하지 않으므로
//! `Pending`은 열거형에만 존재합니다. 삭제는 `Stopped` 또는 `Failed`에서만
//! 가능합니다.

use std::fmt;
use std::time::SystemTime;

use metrics::counter;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use sagesim_core::config::{MAX_LIST_RESULTS, MAX_VOLUME_SIZE_GB};
use sagesim_core::error::ServiceError;
use sagesim_core::metrics::{LABEL_OPERATION, SAGEMAKER_STATUS_TRANSITIONS_TOTAL};
use sagesim_core::resource::{Resource, ResourceKind};
use sagesim_core::types::{Tag, epoch_seconds, epoch_seconds_opt};

use crate::backend::SageMakerBackend;
use crate::error::StoreError;
use crate::query::{self, ListQuery, ResourceSortKey, SortOrder, TimeRange};
use crate::tagging::validate_tags;

/// 없는 노트북 인스턴스에 대한 공급자 메시지 (원문 그대로 유지)
pub const RECORD_NOT_FOUND: &str = "RecordNotFound";

/// 최소 볼륨 크기 (GB)
pub const MIN_VOLUME_SIZE_GB: u32 = 5;

/// 노트북 인스턴스 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NotebookInstanceStatus {
    /// 프로비저닝 중
    Pending,
    /// 사용 가능
    InService,
    /// 정지 중
    Stopping,
    /// 정지됨
    Stopped,
    /// 실패
    Failed,
    /// 삭제 중
    Deleting,
    /// 설정 변경 중
    Updating,
}

impl NotebookInstanceStatus {
    /// 와이어 형식 문자열
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InService => "InService",
            Self::Stopping => "Stopping",
            Self::Stopped => "Stopped",
            Self::Failed => "Failed",
            Self::Deleting => "Deleting",
            Self::Updating => "Updating",
        }
    }

    /// `next`로의 전이가 허용되는지 확인합니다.
    ///
    /// 오퍼레이션이 요청하는 전이만 다룹니다. start/stop(`InService`/`Stopped`)은
    /// `Deleting`이 아닌 모든 상태에서 허용되며 같은 상태로의 전이는 멱등입니다.
    /// `Deleting`은 `Stopped`/`Failed`에서만 시작할 수 있습니다.
    pub fn can_transition_to(&self, next: Self) -> bool {
        match (*self, next) {
            (Self::Deleting, _) => false,
            (_, Self::InService | Self::Stopped) => true,
            (from, Self::Deleting) => matches!(from, Self::Stopped | Self::Failed),
            _ => false,
        }
    }
}

impl fmt::Display for NotebookInstanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 인터넷 직접 접근 설정
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DirectInternetAccess {
    /// 허용 (기본값)
    #[default]
    Enabled,
    /// 차단
    Disabled,
}

/// 루트 접근 설정
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RootAccess {
    /// 허용 (기본값)
    #[default]
    Enabled,
    /// 차단
    Disabled,
}

/// 노트북 인스턴스 레코드
///
/// 직렬화 형식은 `DescribeNotebookInstance` 응답과 같습니다.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct NotebookInstance {
    #[serde(rename = "NotebookInstanceArn")]
    pub arn: String,
    #[serde(rename = "NotebookInstanceName")]
    pub name: String,
    #[serde(rename = "NotebookInstanceStatus")]
    pub status: NotebookInstanceStatus,
    pub url: String,
    pub instance_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subnet_id: Option<String>,
    #[serde(rename = "SecurityGroups", skip_serializing_if = "Vec::is_empty")]
    pub security_group_ids: Vec<String>,
    pub role_arn: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kms_key_id: Option<String>,
    #[serde(
        rename = "NotebookInstanceLifecycleConfigName",
        skip_serializing_if = "Option::is_none"
    )]
    pub lifecycle_config_name: Option<String>,
    pub direct_internet_access: DirectInternetAccess,
    #[serde(rename = "VolumeSizeInGB")]
    pub volume_size_gb: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub accelerator_types: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_code_repository: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub additional_code_repositories: Vec<String>,
    pub root_access: RootAccess,
    #[serde(with = "epoch_seconds")]
    pub creation_time: SystemTime,
    #[serde(with = "epoch_seconds")]
    pub last_modified_time: SystemTime,
}

impl Resource for NotebookInstance {
    const KIND: ResourceKind = ResourceKind::NotebookInstance;

    fn name(&self) -> &str {
        &self.name
    }

    fn creation_time(&self) -> SystemTime {
        self.creation_time
    }

    fn last_modified_time(&self) -> SystemTime {
        self.last_modified_time
    }
}

/// 노트북 인스턴스 접속 URL을 계산합니다.
pub fn notebook_url(name: &str, region: &str) -> String {
    format!("{name}.notebook.{region}.sagemaker.aws")
}

/// `CreateNotebookInstance` 입력
///
/// 선택 필드를 생략하면 `DirectInternetAccess=Enabled`,
/// `RootAccess=Enabled`, `VolumeSizeInGB`=설정 기본값(5)이 적용됩니다.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateNotebookInstanceParams {
    pub notebook_instance_name: String,
    pub instance_type: String,
    pub role_arn: String,
    pub subnet_id: Option<String>,
    #[serde(default)]
    pub security_group_ids: Vec<String>,
    pub kms_key_id: Option<String>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    pub lifecycle_config_name: Option<String>,
    pub direct_internet_access: Option<DirectInternetAccess>,
    #[serde(rename = "VolumeSizeInGB")]
    pub volume_size_in_gb: Option<u32>,
    #[serde(default)]
    pub accelerator_types: Vec<String>,
    pub default_code_repository: Option<String>,
    #[serde(default)]
    pub additional_code_repositories: Vec<String>,
    pub root_access: Option<RootAccess>,
}

impl CreateNotebookInstanceParams {
    /// 필수 필드만으로 입력을 생성합니다.
    pub fn new(
        name: impl Into<String>,
        instance_type: impl Into<String>,
        role_arn: impl Into<String>,
    ) -> Self {
        Self {
            notebook_instance_name: name.into(),
            instance_type: instance_type.into(),
            role_arn: role_arn.into(),
            ..Self::default()
        }
    }
}

/// `CreateNotebookInstance` 출력
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateNotebookInstanceOutput {
    pub notebook_instance_arn: String,
}

/// 이름 하나만 받는 노트북 오퍼레이션 입력
/// (Describe / Start / Stop / Delete)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NotebookInstanceNameParams {
    pub notebook_instance_name: String,
}

/// `ListNotebookInstances` 정렬 키
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum NotebookInstanceSortKey {
    /// 이름순
    Name,
    /// 생성 순서 (기본값)
    #[default]
    CreationTime,
    /// 상태 문자열순, 동점은 생성 순서
    Status,
}

/// `ListNotebookInstances` 입력
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ListNotebookInstancesParams {
    pub next_token: Option<String>,
    pub max_results: Option<usize>,
    pub sort_by: Option<NotebookInstanceSortKey>,
    pub sort_order: Option<SortOrder>,
    pub name_contains: Option<String>,
    #[serde(with = "epoch_seconds_opt")]
    pub creation_time_before: Option<SystemTime>,
    #[serde(with = "epoch_seconds_opt")]
    pub creation_time_after: Option<SystemTime>,
    #[serde(with = "epoch_seconds_opt")]
    pub last_modified_time_before: Option<SystemTime>,
    #[serde(with = "epoch_seconds_opt")]
    pub last_modified_time_after: Option<SystemTime>,
    pub status_equals: Option<NotebookInstanceStatus>,
    pub notebook_instance_lifecycle_config_name_contains: Option<String>,
    pub default_code_repository_contains: Option<String>,
    pub additional_code_repository_equals: Option<String>,
}

impl ListNotebookInstancesParams {
    fn list_query(&self, max_results: usize) -> ListQuery<'_> {
        ListQuery {
            name_contains: self.name_contains.as_deref(),
            created: TimeRange::new(self.creation_time_before, self.creation_time_after),
            modified: TimeRange::new(
                self.last_modified_time_before,
                self.last_modified_time_after,
            ),
            sort_order: self.sort_order.unwrap_or_default(),
            max_results,
            next_token: self.next_token.as_deref(),
        }
    }

    /// 노트북 인스턴스에만 있는 필터 (상태, 라이프사이클 설정, 코드 저장소)
    fn matches_instance(&self, instance: &NotebookInstance) -> bool {
        self.status_equals.is_none_or(|s| instance.status == s)
            && self
                .notebook_instance_lifecycle_config_name_contains
                .as_deref()
                .is_none_or(|needle| {
                    instance
                        .lifecycle_config_name
                        .as_deref()
                        .is_some_and(|n| n.contains(needle))
                })
            && self
                .default_code_repository_contains
                .as_deref()
                .is_none_or(|needle| {
                    instance
                        .default_code_repository
                        .as_deref()
                        .is_some_and(|r| r.contains(needle))
                })
            && self
                .additional_code_repository_equals
                .as_deref()
                .is_none_or(|repo| {
                    instance
                        .additional_code_repositories
                        .iter()
                        .any(|r| r == repo)
                })
    }
}

/// 목록 응답의 노트북 인스턴스 요약
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct NotebookInstanceSummary {
    pub notebook_instance_name: String,
    pub notebook_instance_arn: String,
    pub notebook_instance_status: NotebookInstanceStatus,
    pub url: String,
    pub instance_type: String,
    #[serde(with = "epoch_seconds")]
    pub creation_time: SystemTime,
    #[serde(with = "epoch_seconds")]
    pub last_modified_time: SystemTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notebook_instance_lifecycle_config_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_code_repository: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub additional_code_repositories: Vec<String>,
}

impl From<&NotebookInstance> for NotebookInstanceSummary {
    fn from(instance: &NotebookInstance) -> Self {
        Self {
            notebook_instance_name: instance.name.clone(),
            notebook_instance_arn: instance.arn.clone(),
            notebook_instance_status: instance.status,
            url: instance.url.clone(),
            instance_type: instance.instance_type.clone(),
            creation_time: instance.creation_time,
            last_modified_time: instance.last_modified_time,
            notebook_instance_lifecycle_config_name: instance.lifecycle_config_name.clone(),
            default_code_repository: instance.default_code_repository.clone(),
            additional_code_repositories: instance.additional_code_repositories.clone(),
        }
    }
}

/// `ListNotebookInstances` 출력
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListNotebookInstancesOutput {
    pub notebook_instances: Vec<NotebookInstanceSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

fn notebook_error(err: StoreError, arn: &str) -> ServiceError {
    match err {
        StoreError::AlreadyExists { .. } => ServiceError::validation(format!(
            "Cannot create a duplicate Notebook Instance ({arn})"
        )),
        StoreError::NotFound { .. } => ServiceError::validation(RECORD_NOT_FOUND),
    }
}

impl SageMakerBackend {
    /// 노트북 인스턴스를 생성합니다.
    ///
    /// 모든 검증(인스턴스 타입, 볼륨 크기, 태그, 이름 중복)이 끝난 뒤에만
    /// 저장소와 태그 인덱스를 변경합니다.
    pub fn create_notebook_instance(
        &mut self,
        params: CreateNotebookInstanceParams,
    ) -> Result<CreateNotebookInstanceOutput, ServiceError> {
        let name = params.notebook_instance_name;

        if !self.settings.is_allowed_instance_type(&params.instance_type) {
            warn!(
                notebook_instance = %name,
                instance_type = %params.instance_type,
                "rejected notebook instance with invalid instance type"
            );
            return Err(ServiceError::validation(format!(
                "Value '{}' at 'instanceType' failed to satisfy constraint: \
                 Member must satisfy enum value set: [{}]",
                params.instance_type,
                self.settings.instance_types.join(", ")
            )));
        }

        let volume_size_gb = params
            .volume_size_in_gb
            .unwrap_or(self.settings.default_volume_size_gb);
        if !(MIN_VOLUME_SIZE_GB..=MAX_VOLUME_SIZE_GB).contains(&volume_size_gb) {
            return Err(ServiceError::validation(format!(
                "Value '{volume_size_gb}' at 'volumeSizeInGB' failed to satisfy constraint: \
                 Member must have value between {MIN_VOLUME_SIZE_GB} and {MAX_VOLUME_SIZE_GB}"
            )));
        }

        validate_tags(&params.tags)?;

        let arn = self.arn(ResourceKind::NotebookInstance, &name);
        let now = SystemTime::now();
        let record = NotebookInstance {
            arn: arn.clone(),
            url: notebook_url(&name, &self.scope.region),
            name: name.clone(),
            status: NotebookInstanceStatus::InService,
            instance_type: params.instance_type,
            subnet_id: params.subnet_id,
            security_group_ids: params.security_group_ids,
            role_arn: params.role_arn,
            kms_key_id: params.kms_key_id,
            lifecycle_config_name: params.lifecycle_config_name,
            direct_internet_access: params.direct_internet_access.unwrap_or_default(),
            volume_size_gb,
            accelerator_types: params.accelerator_types,
            default_code_repository: params.default_code_repository,
            additional_code_repositories: params.additional_code_repositories,
            root_access: params.root_access.unwrap_or_default(),
            creation_time: now,
            last_modified_time: now,
        };

        self.notebooks
            .insert(record)
            .map_err(|e| notebook_error(e, &arn))?;
        if !params.tags.is_empty() {
            self.tags.add(&arn, &params.tags);
        }
        self.record_created(ResourceKind::NotebookInstance);

        info!(notebook_instance = %name, arn = %arn, "notebook instance created");
        Ok(CreateNotebookInstanceOutput {
            notebook_instance_arn: arn,
        })
    }

    /// 노트북 인스턴스를 조회합니다.
    ///
    /// 없으면 메시지가 정확히 `RecordNotFound`인 `ValidationException`입니다.
    pub fn describe_notebook_instance(&self, name: &str) -> Result<NotebookInstance, ServiceError> {
        debug!(notebook_instance = name, "describe notebook instance");
        self.notebooks
            .get(name)
            .cloned()
            .map_err(|e| notebook_error(e, &self.arn(ResourceKind::NotebookInstance, name)))
    }

    /// 노트북 인스턴스를 정지합니다. 이미 정지된 경우에도 성공합니다.
    pub fn stop_notebook_instance(&mut self, name: &str) -> Result<(), ServiceError> {
        self.transition_notebook(name, NotebookInstanceStatus::Stopped, "StopNotebookInstance")
    }

    /// 노트북 인스턴스를 시작합니다.
    pub fn start_notebook_instance(&mut self, name: &str) -> Result<(), ServiceError> {
        self.transition_notebook(
            name,
            NotebookInstanceStatus::InService,
            "StartNotebookInstance",
        )
    }

    /// 노트북 인스턴스를 삭제합니다.
    ///
    /// `Stopped`/`Failed`가 아니면 거부되며, 성공하면 레코드와 태그가 함께
    /// 제거됩니다.
    pub fn delete_notebook_instance(&mut self, name: &str) -> Result<(), ServiceError> {
        let arn = self.arn(ResourceKind::NotebookInstance, name);
        let instance = self
            .notebooks
            .get_mut(name)
            .map_err(|e| notebook_error(e, &arn))?;

        if !instance.status.can_transition_to(NotebookInstanceStatus::Deleting) {
            warn!(
                notebook_instance = name,
                status = %instance.status,
                "rejected delete of notebook instance"
            );
            return Err(ServiceError::validation(format!(
                "Status ({}) not in ([Stopped, Failed]). Unable to transition to (Deleting) \
                 for Notebook Instance ({})",
                instance.status, instance.arn
            )));
        }
        instance.status = NotebookInstanceStatus::Deleting;

        let removed = self
            .notebooks
            .remove(name)
            .map_err(|e| notebook_error(e, &arn))?;
        self.tags.remove_resource(&removed.arn);
        self.record_deleted(ResourceKind::NotebookInstance);

        info!(notebook_instance = name, arn = %removed.arn, "notebook instance deleted");
        Ok(())
    }

    /// 노트북 인스턴스 목록을 조회합니다.
    ///
    /// 필터 → `SortBy` → `SortOrder` → 페이지네이션 순서로 적용됩니다.
    pub fn list_notebook_instances(
        &self,
        params: &ListNotebookInstancesParams,
    ) -> Result<ListNotebookInstancesOutput, ServiceError> {
        let max_results = query::resolve_max_results(
            params.max_results,
            self.settings.list_max_results,
            MAX_LIST_RESULTS,
        )?;

        let sort_by = params.sort_by.unwrap_or_default();
        let page = query::list(
            self.notebooks.iter(),
            &params.list_query(max_results),
            |instance| params.matches_instance(instance),
            |items| match sort_by {
                NotebookInstanceSortKey::Name => {
                    query::sort_resources(items, ResourceSortKey::Name);
                }
                NotebookInstanceSortKey::CreationTime => {
                    query::sort_resources(items, ResourceSortKey::CreationTime);
                }
                NotebookInstanceSortKey::Status => {
                    items.sort_by(|a, b| a.status.as_str().cmp(b.status.as_str()));
                }
            },
        )?;
        debug!(
            returned = page.items.len(),
            has_more = page.next_token.is_some(),
            "list notebook instances"
        );

        Ok(ListNotebookInstancesOutput {
            notebook_instances: page
                .items
                .into_iter()
                .map(NotebookInstanceSummary::from)
                .collect(),
            next_token: page.next_token,
        })
    }

    fn transition_notebook(
        &mut self,
        name: &str,
        next: NotebookInstanceStatus,
        operation: &'static str,
    ) -> Result<(), ServiceError> {
        let arn = self.arn(ResourceKind::NotebookInstance, name);
        let instance = self
            .notebooks
            .get_mut(name)
            .map_err(|e| notebook_error(e, &arn))?;

        let previous = instance.status;
        if !previous.can_transition_to(next) {
            warn!(
                notebook_instance = name,
                from = %previous,
                to = %next,
                "rejected notebook instance transition"
            );
            return Err(ServiceError::validation(format!(
                "Status ({previous}) cannot transition to ({next}) for Notebook Instance ({arn})"
            )));
        }

        instance.status = next;
        instance.last_modified_time = SystemTime::now();
        counter!(SAGEMAKER_STATUS_TRANSITIONS_TOTAL, LABEL_OPERATION => operation).increment(1);

        info!(
            notebook_instance = name,
            from = %previous,
            to = %next,
            "notebook instance status changed"
        );
        Ok(())
    }
}
