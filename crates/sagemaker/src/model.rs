//! 모델 레지스트리
//!
//! 추론 컨테이너를 실제로 띄우지는 않습니다. 레코드는 조회/삭제/목록과
//! 태그 대상이 되기 위한 최소 속성만 가집니다.

use std::collections::BTreeMap;
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

/// 모델 컨테이너 정의
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_data_url: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, String>,
}

/// 모델 레코드
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Model {
    #[serde(rename = "ModelArn")]
    pub arn: String,
    #[serde(rename = "ModelName")]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_container: Option<ContainerDefinition>,
    pub execution_role_arn: String,
    pub enable_network_isolation: bool,
    #[serde(with = "epoch_seconds")]
    pub creation_time: SystemTime,
}

impl Resource for Model {
    const KIND: ResourceKind = ResourceKind::Model;

    fn name(&self) -> &str {
        &self.name
    }

    fn creation_time(&self) -> SystemTime {
        self.creation_time
    }

    // 모델은 생성 후 변경되지 않음
    fn last_modified_time(&self) -> SystemTime {
        self.creation_time
    }
}

/// `CreateModel` 입력
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateModelParams {
    pub model_name: String,
    pub execution_role_arn: String,
    pub primary_container: Option<ContainerDefinition>,
    #[serde(default)]
    pub enable_network_isolation: bool,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl CreateModelParams {
    pub fn new(name: impl Into<String>, execution_role_arn: impl Into<String>) -> Self {
        Self {
            model_name: name.into(),
            execution_role_arn: execution_role_arn.into(),
            ..Self::default()
        }
    }
}

/// `CreateModel` 출력
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateModelOutput {
    pub model_arn: String,
}

/// `DescribeModel` / `DeleteModel` 입력
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ModelNameParams {
    pub model_name: String,
}

/// `ListModels` 정렬 키
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum ModelSortKey {
    Name,
    #[default]
    CreationTime,
}

impl From<ModelSortKey> for ResourceSortKey {
    fn from(key: ModelSortKey) -> Self {
        match key {
            ModelSortKey::Name => Self::Name,
            ModelSortKey::CreationTime => Self::CreationTime,
        }
    }
}

/// `ListModels` 입력
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ListModelsParams {
    pub next_token: Option<String>,
    pub max_results: Option<usize>,
    pub sort_by: Option<ModelSortKey>,
    pub sort_order: Option<SortOrder>,
    pub name_contains: Option<String>,
    #[serde(with = "epoch_seconds_opt")]
    pub creation_time_before: Option<SystemTime>,
    #[serde(with = "epoch_seconds_opt")]
    pub creation_time_after: Option<SystemTime>,
}

/// 목록 응답의 모델 요약
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ModelSummary {
    pub model_name: String,
    pub model_arn: String,
    #[serde(with = "epoch_seconds")]
    pub creation_time: SystemTime,
}

/// `ListModels` 출력
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListModelsOutput {
    pub models: Vec<ModelSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

fn model_error(err: StoreError, arn: &str) -> ServiceError {
    match err {
        StoreError::AlreadyExists { .. } => {
            ServiceError::validation(format!("Cannot create already existing model \"{arn}\"."))
        }
        StoreError::NotFound { .. } => {
            ServiceError::validation(format!("Could not find model \"{arn}\"."))
        }
    }
}

impl SageMakerBackend {
    /// 모델을 생성합니다.
    pub fn create_model(&mut self, params: CreateModelParams) -> Result<CreateModelOutput, ServiceError> {
        validate_tags(&params.tags)?;

        let arn = self.arn(ResourceKind::Model, &params.model_name);
        let record = Model {
            arn: arn.clone(),
            name: params.model_name,
            primary_container: params.primary_container,
            execution_role_arn: params.execution_role_arn,
            enable_network_isolation: params.enable_network_isolation,
            creation_time: SystemTime::now(),
        };

        let name = self
            .models
            .insert(record)
            .map_err(|e| model_error(e, &arn))?
            .name
            .clone();
        if !params.tags.is_empty() {
            self.tags.add(&arn, &params.tags);
        }
        self.record_created(ResourceKind::Model);

        info!(model = %name, arn = %arn, "model created");
        Ok(CreateModelOutput { model_arn: arn })
    }

    /// 모델을 조회합니다.
    pub fn describe_model(&self, name: &str) -> Result<Model, ServiceError> {
        debug!(model = name, "describe model");
        self.models
            .get(name)
            .cloned()
            .map_err(|e| model_error(e, &self.arn(ResourceKind::Model, name)))
    }

    /// 모델을 삭제하고 태그를 제거합니다.
    pub fn delete_model(&mut self, name: &str) -> Result<(), ServiceError> {
        let arn = self.arn(ResourceKind::Model, name);
        let removed = self.models.remove(name).map_err(|e| model_error(e, &arn))?;
        self.tags.remove_resource(&removed.arn);
        self.record_deleted(ResourceKind::Model);

        info!(model = name, "model deleted");
        Ok(())
    }

    /// 모델 목록을 생성 순서로 조회합니다.
    pub fn list_models(&self, params: &ListModelsParams) -> Result<ListModelsOutput, ServiceError> {
        let max_results = query::resolve_max_results(
            params.max_results,
            self.settings.list_max_results,
            MAX_LIST_RESULTS,
        )?;

        let list_query = ListQuery {
            name_contains: params.name_contains.as_deref(),
            created: TimeRange::new(params.creation_time_before, params.creation_time_after),
            modified: TimeRange::default(),
            sort_order: params.sort_order.unwrap_or_default(),
            max_results,
            next_token: params.next_token.as_deref(),
        };
        let sort_key = ResourceSortKey::from(params.sort_by.unwrap_or_default());

        let page = query::list(
            self.models.iter(),
            &list_query,
            |_| true,
            |items| query::sort_resources(items, sort_key),
        )?;
        debug!(returned = page.items.len(), "list models");

        Ok(ListModelsOutput {
            models: page
                .items
                .into_iter()
                .map(|m| ModelSummary {
                    model_name: m.name.clone(),
                    model_arn: m.arn.clone(),
                    creation_time: m.creation_time,
                })
                .collect(),
            next_token: page.next_token,
        })
    }
}
