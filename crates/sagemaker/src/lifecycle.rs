//! 노트북 인스턴스 라이프사이클 설정 레지스트리
//!
//! 라이프사이클 설정은 노트북 인스턴스가 이름으로 참조하는 생성/시작 스크립트
//! 묶음입니다. 노트북 인스턴스와의 참조 무결성은 검사하지 않으며, 삭제해도
//! 참조하는 노트북 인스턴스에는 영향이 없습니다.

use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use sagesim_core::config::MAX_LIST_RESULTS;
use sagesim_core::error::ServiceError;
use sagesim_core::resource::{Resource, ResourceKind};
use sagesim_core::types::{Tag, epoch_seconds, epoch_seconds_opt};

use crate::backend::SageMakerBackend;
use crate::error::StoreError;
use crate::query::{self, ListQuery, ResourceSortKey, SortOrder, TimeRange};
use crate::tagging::validate_tags;

/// 스크립트 한 개 (base64 인코딩된 셸 스크립트)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LifecycleHook {
    pub content: String,
}

impl LifecycleHook {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

/// 라이프사이클 설정 레코드
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LifecycleConfig {
    #[serde(rename = "NotebookInstanceLifecycleConfigArn")]
    pub arn: String,
    #[serde(rename = "NotebookInstanceLifecycleConfigName")]
    pub name: String,
    pub on_create: Vec<LifecycleHook>,
    pub on_start: Vec<LifecycleHook>,
    #[serde(with = "epoch_seconds")]
    pub creation_time: SystemTime,
    #[serde(with = "epoch_seconds")]
    pub last_modified_time: SystemTime,
}

impl Resource for LifecycleConfig {
    const KIND: ResourceKind = ResourceKind::NotebookInstanceLifecycleConfig;

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

/// `CreateNotebookInstanceLifecycleConfig` 입력
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateLifecycleConfigParams {
    pub notebook_instance_lifecycle_config_name: String,
    #[serde(default)]
    pub on_create: Vec<LifecycleHook>,
    #[serde(default)]
    pub on_start: Vec<LifecycleHook>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl CreateLifecycleConfigParams {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            notebook_instance_lifecycle_config_name: name.into(),
            ..Self::default()
        }
    }
}

/// `CreateNotebookInstanceLifecycleConfig` 출력
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateLifecycleConfigOutput {
    pub notebook_instance_lifecycle_config_arn: String,
}

/// 이름 하나만 받는 라이프사이클 설정 오퍼레이션 입력 (Describe / Delete)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LifecycleConfigNameParams {
    pub notebook_instance_lifecycle_config_name: String,
}

/// `UpdateNotebookInstanceLifecycleConfig` 입력
///
/// 지정한 스크립트 목록만 교체합니다. 생략한 쪽은 그대로 둡니다.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateLifecycleConfigParams {
    pub notebook_instance_lifecycle_config_name: String,
    pub on_create: Option<Vec<LifecycleHook>>,
    pub on_start: Option<Vec<LifecycleHook>>,
}

/// `ListNotebookInstanceLifecycleConfigs` 정렬 키
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum LifecycleConfigSortKey {
    Name,
    #[default]
    CreationTime,
    LastModifiedTime,
}

impl From<LifecycleConfigSortKey> for ResourceSortKey {
    fn from(key: LifecycleConfigSortKey) -> Self {
        match key {
            LifecycleConfigSortKey::Name => Self::Name,
            LifecycleConfigSortKey::CreationTime => Self::CreationTime,
            LifecycleConfigSortKey::LastModifiedTime => Self::LastModifiedTime,
        }
    }
}

/// `ListNotebookInstanceLifecycleConfigs` 입력
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ListLifecycleConfigsParams {
    pub next_token: Option<String>,
    pub max_results: Option<usize>,
    pub sort_by: Option<LifecycleConfigSortKey>,
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
}

/// 목록 응답의 라이프사이클 설정 요약
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LifecycleConfigSummary {
    pub notebook_instance_lifecycle_config_name: String,
    pub notebook_instance_lifecycle_config_arn: String,
    #[serde(with = "epoch_seconds")]
    pub creation_time: SystemTime,
    #[serde(with = "epoch_seconds")]
    pub last_modified_time: SystemTime,
}

impl From<&LifecycleConfig> for LifecycleConfigSummary {
    fn from(config: &LifecycleConfig) -> Self {
        Self {
            notebook_instance_lifecycle_config_name: config.name.clone(),
            notebook_instance_lifecycle_config_arn: config.arn.clone(),
            creation_time: config.creation_time,
            last_modified_time: config.last_modified_time,
        }
    }
}

/// `ListNotebookInstanceLifecycleConfigs` 출력
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListLifecycleConfigsOutput {
    pub notebook_instance_lifecycle_configs: Vec<LifecycleConfigSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

fn lifecycle_error(err: StoreError, verb: &str, arn: &str) -> ServiceError {
    match err {
        StoreError::AlreadyExists { .. } => ServiceError::validation(format!(
            "Unable to create Notebook Instance Lifecycle Config {arn}. \
             (Details: Notebook Instance Lifecycle Config already exists.)"
        )),
        StoreError::NotFound { .. } => ServiceError::validation(format!(
            "Unable to {verb} Notebook Instance Lifecycle Config '{arn}'. \
             (Details: Notebook Instance Lifecycle Config does not exist.)"
        )),
    }
}

impl SageMakerBackend {
    /// 라이프사이클 설정을 생성합니다.
    pub fn create_lifecycle_config(
        &mut self,
        params: CreateLifecycleConfigParams,
    ) -> Result<CreateLifecycleConfigOutput, ServiceError> {
        validate_tags(&params.tags)?;

        let name = params.notebook_instance_lifecycle_config_name;
        let arn = self.arn(ResourceKind::NotebookInstanceLifecycleConfig, &name);
        let now = SystemTime::now();
        let record = LifecycleConfig {
            arn: arn.clone(),
            name: name.clone(),
            on_create: params.on_create,
            on_start: params.on_start,
            creation_time: now,
            last_modified_time: now,
        };

        self.lifecycle_configs
            .insert(record)
            .map_err(|e| lifecycle_error(e, "create", &arn))?;
        if !params.tags.is_empty() {
            self.tags.add(&arn, &params.tags);
        }
        self.record_created(ResourceKind::NotebookInstanceLifecycleConfig);

        info!(lifecycle_config = %name, arn = %arn, "lifecycle config created");
        Ok(CreateLifecycleConfigOutput {
            notebook_instance_lifecycle_config_arn: arn,
        })
    }

    /// 라이프사이클 설정을 조회합니다.
    pub fn describe_lifecycle_config(&self, name: &str) -> Result<LifecycleConfig, ServiceError> {
        debug!(lifecycle_config = name, "describe lifecycle config");
        self.lifecycle_configs.get(name).cloned().map_err(|e| {
            lifecycle_error(
                e,
                "describe",
                &self.arn(ResourceKind::NotebookInstanceLifecycleConfig, name),
            )
        })
    }

    /// 라이프사이클 설정의 스크립트를 교체합니다.
    pub fn update_lifecycle_config(
        &mut self,
        params: UpdateLifecycleConfigParams,
    ) -> Result<(), ServiceError> {
        let name = params.notebook_instance_lifecycle_config_name;
        let arn = self.arn(ResourceKind::NotebookInstanceLifecycleConfig, &name);
        let config = self
            .lifecycle_configs
            .get_mut(&name)
            .map_err(|e| lifecycle_error(e, "update", &arn))?;

        if let Some(on_create) = params.on_create {
            config.on_create = on_create;
        }
        if let Some(on_start) = params.on_start {
            config.on_start = on_start;
        }
        config.last_modified_time = SystemTime::now();

        info!(lifecycle_config = %name, "lifecycle config updated");
        Ok(())
    }

    /// 라이프사이클 설정을 삭제하고 태그를 제거합니다.
    pub fn delete_lifecycle_config(&mut self, name: &str) -> Result<(), ServiceError> {
        let arn = self.arn(ResourceKind::NotebookInstanceLifecycleConfig, name);
        let removed = self
            .lifecycle_configs
            .remove(name)
            .map_err(|e| lifecycle_error(e, "delete", &arn))?;
        self.tags.remove_resource(&removed.arn);
        self.record_deleted(ResourceKind::NotebookInstanceLifecycleConfig);

        info!(lifecycle_config = name, "lifecycle config deleted");
        Ok(())
    }

    /// 라이프사이클 설정 목록을 조회합니다.
    pub fn list_lifecycle_configs(
        &self,
        params: &ListLifecycleConfigsParams,
    ) -> Result<ListLifecycleConfigsOutput, ServiceError> {
        let max_results = query::resolve_max_results(
            params.max_results,
            self.settings.list_max_results,
            MAX_LIST_RESULTS,
        )?;
        let list_query = ListQuery {
            name_contains: params.name_contains.as_deref(),
            created: TimeRange::new(params.creation_time_before, params.creation_time_after),
            modified: TimeRange::new(
                params.last_modified_time_before,
                params.last_modified_time_after,
            ),
            sort_order: params.sort_order.unwrap_or_default(),
            max_results,
            next_token: params.next_token.as_deref(),
        };
        let sort_key = ResourceSortKey::from(params.sort_by.unwrap_or_default());

        let page = query::list(
            self.lifecycle_configs.iter(),
            &list_query,
            |_| true,
            |items| query::sort_resources(items, sort_key),
        )?;
        debug!(returned = page.items.len(), "list lifecycle configs");

        Ok(ListLifecycleConfigsOutput {
            notebook_instance_lifecycle_configs: page
                .items
                .into_iter()
                .map(LifecycleConfigSummary::from)
                .collect(),
            next_token: page.next_token,
        })
    }
}
