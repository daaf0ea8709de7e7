//! 백엔드 -- 계정/리전 스코프별 시뮬레이터 상태
//!
//! [`SageMakerBackend`]는 한 스코프의 모든 저장소와 태그 인덱스를 소유합니다.
//! 오퍼레이션은 리소스 모듈(`notebook`, `lifecycle`, `model`, `tagging`)에
//! `impl SageMakerBackend` 블록으로 나뉘어 있습니다.
//!
//! [`BackendRegistry`]는 스코프마다 백엔드를 하나씩 지연 생성하므로,
//! 서로 다른 시뮬레이션 계정은 상태를 공유하지 않습니다.
//!
//! ```text
//! BackendRegistry
//!   ├── (123456789012, us-east-1) → SageMakerBackend
//!   │       ├── notebooks:          ResourceStore<NotebookInstance>
//!   │       ├── lifecycle_configs:  ResourceStore<LifecycleConfig>
//!   │       ├── models:             ResourceStore<Model>
//!   │       └── tags:               TagIndex
//!   └── (123456789012, eu-west-1) → SageMakerBackend
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use metrics::{counter, gauge};
use tracing::debug;

use sagesim_core::config::{DEFAULT_INSTANCE_TYPES, SageMakerConfig, SimConfig};
use sagesim_core::metrics::{
    LABEL_KIND, SAGEMAKER_BACKENDS_ACTIVE, SAGEMAKER_RESOURCES_CREATED_TOTAL,
    SAGEMAKER_RESOURCES_DELETED_TOTAL,
};
use sagesim_core::resource::ResourceKind;
use sagesim_core::types::Scope;

use crate::lifecycle::LifecycleConfig;
use crate::model::Model;
use crate::notebook::NotebookInstance;
use crate::store::ResourceStore;
use crate::tags::TagIndex;

/// 백엔드 동작 설정
///
/// `SageMakerConfig`에서 파생되며 모든 스코프가 공유합니다.
#[derive(Debug, Clone)]
pub struct BackendSettings {
    /// 목록 API의 기본 페이지 크기
    pub list_max_results: usize,
    /// `ListTags`의 기본 페이지 크기
    pub tag_page_size: usize,
    /// `VolumeSizeInGB` 미지정 시 기본값
    pub default_volume_size_gb: u32,
    /// 허용되는 노트북 인스턴스 타입
    pub instance_types: Vec<String>,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self::from_config(&SageMakerConfig::default())
    }
}

impl BackendSettings {
    /// core 설정에서 백엔드 설정을 생성합니다.
    pub fn from_config(config: &SageMakerConfig) -> Self {
        Self {
            list_max_results: config.list_max_results,
            tag_page_size: config.tag_page_size,
            default_volume_size_gb: config.default_volume_size_gb,
            instance_types: if config.instance_types.is_empty() {
                DEFAULT_INSTANCE_TYPES
                    .iter()
                    .map(|t| (*t).to_owned())
                    .collect()
            } else {
                config.instance_types.clone()
            },
        }
    }

    /// 인스턴스 타입이 허용 목록에 있는지 확인합니다.
    pub fn is_allowed_instance_type(&self, instance_type: &str) -> bool {
        self.instance_types.iter().any(|t| t == instance_type)
    }
}

/// 한 계정/리전 스코프의 SageMaker 시뮬레이터
#[derive(Debug, Clone)]
pub struct SageMakerBackend {
    pub(crate) scope: Scope,
    pub(crate) settings: Arc<BackendSettings>,
    pub(crate) notebooks: ResourceStore<NotebookInstance>,
    pub(crate) lifecycle_configs: ResourceStore<LifecycleConfig>,
    pub(crate) models: ResourceStore<Model>,
    pub(crate) tags: TagIndex,
}

impl SageMakerBackend {
    /// 빈 백엔드를 생성합니다.
    pub fn new(scope: Scope, settings: Arc<BackendSettings>) -> Self {
        Self {
            scope,
            settings,
            notebooks: ResourceStore::new(),
            lifecycle_configs: ResourceStore::new(),
            models: ResourceStore::new(),
            tags: TagIndex::new(),
        }
    }

    /// 기본 설정으로 백엔드를 생성합니다.
    pub fn with_defaults(account_id: &str, region: &str) -> Self {
        Self::new(
            Scope::new(account_id, region),
            Arc::new(BackendSettings::default()),
        )
    }

    /// 이 백엔드의 스코프
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// 이 백엔드의 설정
    pub fn settings(&self) -> &BackendSettings {
        &self.settings
    }

    /// 이 스코프에서 리소스 ARN을 계산합니다.
    pub fn arn(&self, kind: ResourceKind, name: &str) -> String {
        self.scope.arn(kind, name)
    }

    pub(crate) fn record_created(&self, kind: ResourceKind) {
        counter!(SAGEMAKER_RESOURCES_CREATED_TOTAL, LABEL_KIND => kind.label()).increment(1);
    }

    pub(crate) fn record_deleted(&self, kind: ResourceKind) {
        counter!(SAGEMAKER_RESOURCES_DELETED_TOTAL, LABEL_KIND => kind.label()).increment(1);
    }
}

/// 스코프별 백엔드 레지스트리
#[derive(Debug, Clone, Default)]
pub struct BackendRegistry {
    settings: Arc<BackendSettings>,
    backends: BTreeMap<Scope, SageMakerBackend>,
}

impl BackendRegistry {
    /// 주어진 설정으로 빈 레지스트리를 생성합니다.
    pub fn new(settings: BackendSettings) -> Self {
        Self {
            settings: Arc::new(settings),
            backends: BTreeMap::new(),
        }
    }

    /// 전체 설정에서 레지스트리를 생성합니다.
    pub fn from_config(config: &SimConfig) -> Self {
        Self::new(BackendSettings::from_config(&config.sagemaker))
    }

    /// 스코프의 백엔드를 반환합니다. 없으면 새로 만듭니다.
    pub fn backend_mut(&mut self, scope: &Scope) -> &mut SageMakerBackend {
        let active = self.backends.len();
        let settings = &self.settings;
        self.backends.entry(scope.clone()).or_insert_with(|| {
            debug!(scope = %scope, "creating sagemaker backend");
            gauge!(SAGEMAKER_BACKENDS_ACTIVE).set((active + 1) as f64);
            SageMakerBackend::new(scope.clone(), Arc::clone(settings))
        })
    }

    /// 이미 생성된 스코프의 백엔드를 조회합니다.
    pub fn backend(&self, scope: &Scope) -> Option<&SageMakerBackend> {
        self.backends.get(scope)
    }

    /// 스코프의 상태를 모두 버립니다. 시뮬레이션 계정 수명 종료에 해당합니다.
    pub fn reset(&mut self, scope: &Scope) -> bool {
        let removed = self.backends.remove(scope).is_some();
        if removed {
            gauge!(SAGEMAKER_BACKENDS_ACTIVE).set(self.backends.len() as f64);
        }
        removed
    }

    /// 생성된 백엔드 수
    pub fn len(&self) -> usize {
        self.backends.len()
    }

    /// 생성된 백엔드가 없는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    /// 공유 설정
    pub fn settings(&self) -> &BackendSettings {
        &self.settings
    }
}
