//! 요청 디스패처 -- JSON 요청을 백엔드 오퍼레이션으로 라우팅
//!
//! 요청은 `Action` 필드로 구분되는 JSON 객체입니다. 선택적으로
//! `AccountId`/`Region` 필드를 주면 해당 스코프의 백엔드로 라우팅되고,
//! 없으면 기본 스코프가 쓰입니다.
//!
//! ```text
//! {"Action": "DescribeNotebookInstance", "NotebookInstanceName": "nb"}
//!     → handle() → Request::DescribeNotebookInstance → backend
//!     → Reply { body: NotebookInstance | {"Error": {...}}, ResponseMetadata }
//! ```

use metrics::counter;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use sagesim_core::error::ServiceError;
use sagesim_core::metrics::{
    LABEL_CODE, LABEL_OPERATION, SAGEMAKER_ERRORS_TOTAL, SAGEMAKER_OPERATIONS_TOTAL,
};
use sagesim_core::types::Scope;

use crate::backend::{BackendRegistry, SageMakerBackend};
use crate::lifecycle::{
    CreateLifecycleConfigOutput, CreateLifecycleConfigParams, LifecycleConfig,
    LifecycleConfigNameParams, ListLifecycleConfigsOutput, ListLifecycleConfigsParams,
    UpdateLifecycleConfigParams,
};
use crate::model::{
    CreateModelOutput, CreateModelParams, ListModelsOutput, ListModelsParams, Model,
    ModelNameParams,
};
use crate::notebook::{
    CreateNotebookInstanceOutput, CreateNotebookInstanceParams, ListNotebookInstancesOutput,
    ListNotebookInstancesParams, NotebookInstance, NotebookInstanceNameParams,
};
use crate::tagging::{AddTagsOutput, AddTagsParams, DeleteTagsParams, ListTagsOutput, ListTagsParams};

/// 성공 응답의 HTTP 상태 코드
const HTTP_OK: u16 = 200;

/// `ValidationException` 응답의 HTTP 상태 코드
const HTTP_BAD_REQUEST: u16 = 400;

/// 디스패치 전에 거부된 요청의 `operation` 레이블
const REJECTED_OPERATION: &str = "Malformed";

/// 지원하는 모든 요청
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "Action")]
pub enum Request {
    CreateNotebookInstance(CreateNotebookInstanceParams),
    DescribeNotebookInstance(NotebookInstanceNameParams),
    StartNotebookInstance(NotebookInstanceNameParams),
    StopNotebookInstance(NotebookInstanceNameParams),
    DeleteNotebookInstance(NotebookInstanceNameParams),
    ListNotebookInstances(ListNotebookInstancesParams),
    CreateNotebookInstanceLifecycleConfig(CreateLifecycleConfigParams),
    DescribeNotebookInstanceLifecycleConfig(LifecycleConfigNameParams),
    UpdateNotebookInstanceLifecycleConfig(UpdateLifecycleConfigParams),
    DeleteNotebookInstanceLifecycleConfig(LifecycleConfigNameParams),
    ListNotebookInstanceLifecycleConfigs(ListLifecycleConfigsParams),
    AddTags(AddTagsParams),
    ListTags(ListTagsParams),
    DeleteTags(DeleteTagsParams),
    CreateModel(CreateModelParams),
    DescribeModel(ModelNameParams),
    DeleteModel(ModelNameParams),
    ListModels(ListModelsParams),
}

impl Request {
    /// `Action` 이름
    pub fn action_name(&self) -> &'static str {
        match self {
            Self::CreateNotebookInstance(_) => "CreateNotebookInstance",
            Self::DescribeNotebookInstance(_) => "DescribeNotebookInstance",
            Self::StartNotebookInstance(_) => "StartNotebookInstance",
            Self::StopNotebookInstance(_) => "StopNotebookInstance",
            Self::DeleteNotebookInstance(_) => "DeleteNotebookInstance",
            Self::ListNotebookInstances(_) => "ListNotebookInstances",
            Self::CreateNotebookInstanceLifecycleConfig(_) => {
                "CreateNotebookInstanceLifecycleConfig"
            }
            Self::DescribeNotebookInstanceLifecycleConfig(_) => {
                "DescribeNotebookInstanceLifecycleConfig"
            }
            Self::UpdateNotebookInstanceLifecycleConfig(_) => {
                "UpdateNotebookInstanceLifecycleConfig"
            }
            Self::DeleteNotebookInstanceLifecycleConfig(_) => {
                "DeleteNotebookInstanceLifecycleConfig"
            }
            Self::ListNotebookInstanceLifecycleConfigs(_) => "ListNotebookInstanceLifecycleConfigs",
            Self::AddTags(_) => "AddTags",
            Self::ListTags(_) => "ListTags",
            Self::DeleteTags(_) => "DeleteTags",
            Self::CreateModel(_) => "CreateModel",
            Self::DescribeModel(_) => "DescribeModel",
            Self::DeleteModel(_) => "DeleteModel",
            Self::ListModels(_) => "ListModels",
        }
    }
}

/// 출력이 없는 오퍼레이션의 응답 (`{}`)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EmptyOutput {}

/// 성공 응답 본문
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Response {
    CreateNotebookInstance(CreateNotebookInstanceOutput),
    NotebookInstance(NotebookInstance),
    ListNotebookInstances(ListNotebookInstancesOutput),
    CreateLifecycleConfig(CreateLifecycleConfigOutput),
    LifecycleConfig(LifecycleConfig),
    ListLifecycleConfigs(ListLifecycleConfigsOutput),
    AddTags(AddTagsOutput),
    ListTags(ListTagsOutput),
    CreateModel(CreateModelOutput),
    Model(Model),
    ListModels(ListModelsOutput),
    Empty(EmptyOutput),
}

/// 에러 응답 본문 (`{"Error": {"Code", "Message"}}`)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorEnvelope {
    #[serde(rename = "Error")]
    pub error: ServiceError,
}

/// 응답 메타데이터
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseMetadata {
    #[serde(rename = "RequestId")]
    pub request_id: String,
    #[serde(rename = "HTTPStatusCode")]
    pub http_status_code: u16,
}

/// 응답 본문
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReplyBody {
    Success(Response),
    Failure(ErrorEnvelope),
}

/// 요청 하나의 처리 결과
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reply {
    /// 처리한 `Action` 이름 (파싱 실패 시 요청에 적힌 그대로)
    #[serde(skip)]
    pub action: String,
    #[serde(flatten)]
    pub body: ReplyBody,
    #[serde(rename = "ResponseMetadata")]
    pub metadata: ResponseMetadata,
}

impl Reply {
    fn new(action: impl Into<String>, result: Result<Response, ServiceError>) -> Self {
        let (body, http_status_code) = match result {
            Ok(response) => (ReplyBody::Success(response), HTTP_OK),
            Err(error) => (ReplyBody::Failure(ErrorEnvelope { error }), HTTP_BAD_REQUEST),
        };
        Self {
            action: action.into(),
            body,
            metadata: ResponseMetadata {
                request_id: Uuid::new_v4().to_string(),
                http_status_code,
            },
        }
    }

    /// 에러 응답인지 확인합니다.
    pub fn is_error(&self) -> bool {
        matches!(self.body, ReplyBody::Failure(_))
    }

    /// 에러 응답이면 에러를 반환합니다.
    pub fn error(&self) -> Option<&ServiceError> {
        match &self.body {
            ReplyBody::Failure(envelope) => Some(&envelope.error),
            ReplyBody::Success(_) => None,
        }
    }
}

/// 요청 JSON에서 스코프를 결정합니다.
///
/// `AccountId`/`Region`이 있으면 기본 스코프 대신 쓰이며, 형식이 잘못되면
/// `ValidationException`입니다.
pub fn request_scope(request: &Value, default_scope: &Scope) -> Result<Scope, ServiceError> {
    let field = |name: &str| request.get(name).and_then(Value::as_str);
    let scope = Scope::new(
        field("AccountId").unwrap_or(&default_scope.account_id),
        field("Region").unwrap_or(&default_scope.region),
    );
    scope.validate()?;
    Ok(scope)
}

/// JSON 요청 하나를 처리합니다.
///
/// 파싱에 실패한 요청(알 수 없는 `Action`, 필수 필드 누락, 잘못된 스코프 등)은
/// `ValidationException` 응답이 되며 백엔드를 만들거나 상태를 변경하지 않습니다.
pub fn handle(registry: &mut BackendRegistry, default_scope: &Scope, request: Value) -> Reply {
    let action = request
        .get("Action")
        .and_then(Value::as_str)
        .unwrap_or("<missing>")
        .to_owned();

    let parsed = request_scope(&request, default_scope).and_then(|scope| {
        serde_json::from_value::<Request>(request)
            .map(|req| (scope, req))
            .map_err(|e| ServiceError::validation(e.to_string()))
    });

    match parsed {
        Ok((scope, req)) => dispatch(registry.backend_mut(&scope), req),
        Err(err) => {
            warn!(action = %action, error = %err.message, "rejected malformed request");
            counter!(
                SAGEMAKER_ERRORS_TOTAL,
                LABEL_OPERATION => REJECTED_OPERATION,
                LABEL_CODE => err.code.as_str()
            )
            .increment(1);
            Reply::new(action, Err(err))
        }
    }
}

/// 파싱된 요청을 백엔드에서 실행합니다.
pub fn dispatch(backend: &mut SageMakerBackend, request: Request) -> Reply {
    let action = request.action_name();
    counter!(SAGEMAKER_OPERATIONS_TOTAL, LABEL_OPERATION => action).increment(1);
    debug!(action, scope = %backend.scope(), "dispatching request");

    let empty = |()| Response::Empty(EmptyOutput {});
    let result = match request {
        Request::CreateNotebookInstance(p) => backend
            .create_notebook_instance(p)
            .map(Response::CreateNotebookInstance),
        Request::DescribeNotebookInstance(p) => backend
            .describe_notebook_instance(&p.notebook_instance_name)
            .map(Response::NotebookInstance),
        Request::StartNotebookInstance(p) => backend
            .start_notebook_instance(&p.notebook_instance_name)
            .map(empty),
        Request::StopNotebookInstance(p) => backend
            .stop_notebook_instance(&p.notebook_instance_name)
            .map(empty),
        Request::DeleteNotebookInstance(p) => backend
            .delete_notebook_instance(&p.notebook_instance_name)
            .map(empty),
        Request::ListNotebookInstances(p) => backend
            .list_notebook_instances(&p)
            .map(Response::ListNotebookInstances),
        Request::CreateNotebookInstanceLifecycleConfig(p) => backend
            .create_lifecycle_config(p)
            .map(Response::CreateLifecycleConfig),
        Request::DescribeNotebookInstanceLifecycleConfig(p) => backend
            .describe_lifecycle_config(&p.notebook_instance_lifecycle_config_name)
            .map(Response::LifecycleConfig),
        Request::UpdateNotebookInstanceLifecycleConfig(p) => {
            backend.update_lifecycle_config(p).map(empty)
        }
        Request::DeleteNotebookInstanceLifecycleConfig(p) => backend
            .delete_lifecycle_config(&p.notebook_instance_lifecycle_config_name)
            .map(empty),
        Request::ListNotebookInstanceLifecycleConfigs(p) => backend
            .list_lifecycle_configs(&p)
            .map(Response::ListLifecycleConfigs),
        Request::AddTags(p) => backend.add_tags(p).map(Response::AddTags),
        Request::ListTags(p) => backend.list_tags(&p).map(Response::ListTags),
        Request::DeleteTags(p) => backend.delete_tags(&p).map(empty),
        Request::CreateModel(p) => backend.create_model(p).map(Response::CreateModel),
        Request::DescribeModel(p) => backend.describe_model(&p.model_name).map(Response::Model),
        Request::DeleteModel(p) => backend.delete_model(&p.model_name).map(empty),
        Request::ListModels(p) => backend.list_models(&p).map(Response::ListModels),
    };

    if let Err(err) = &result {
        counter!(
            SAGEMAKER_ERRORS_TOTAL,
            LABEL_OPERATION => action,
            LABEL_CODE => err.code.as_str()
        )
        .increment(1);
        debug!(action, code = %err.code, message = %err.message, "request failed");
    }

    Reply::new(action, result)
}
