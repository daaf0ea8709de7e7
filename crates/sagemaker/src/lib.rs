#![doc = include_str!("../README.md")]

pub mod backend;
pub mod dispatch;
pub mod error;
pub mod lifecycle;
pub mod model;
pub mod notebook;
pub mod query;
pub mod store;
pub mod tagging;
pub mod tags;

// --- 주요 타입 re-export ---

pub use backend::{BackendRegistry, BackendSettings, SageMakerBackend};
pub use dispatch::{Reply, Request, Response, dispatch, handle};
pub use error::{PaginationError, StoreError};
pub use query::{ListQuery, Page, ResourceSortKey, SortOrder};

// 리소스
pub use lifecycle::{
    CreateLifecycleConfigParams, LifecycleConfig, LifecycleHook, ListLifecycleConfigsParams,
    UpdateLifecycleConfigParams,
};
pub use model::{ContainerDefinition, CreateModelParams, ListModelsParams, Model, ModelSortKey};
pub use notebook::{
    CreateNotebookInstanceParams, DirectInternetAccess, ListNotebookInstancesParams,
    NotebookInstance, NotebookInstanceSortKey, NotebookInstanceStatus, RootAccess,
};
pub use tagging::{AddTagsParams, DeleteTagsParams, ListTagsParams};
