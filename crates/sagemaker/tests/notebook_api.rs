//! 통합 테스트 -- JSON 요청 단위의 노트북 API 시나리오
//!
//! 요청 JSON → handle() → 백엔드 → 응답 JSON 경로를 실제 호출자 관점에서
//! 검증합니다.

use sagesim_core::types::Scope;
use sagesim_sagemaker::{BackendRegistry, handle};
use serde_json::{Value, json};

const ACCOUNT_ID: &str = "123456789012";
const REGION: &str = "us-east-1";
const FAKE_ROLE_ARN: &str = "arn:aws:iam::123456789012:role/FakeRole";
const FAKE_NAME: &str = "MyNotebookInstance";
const FAKE_INSTANCE_TYPE: &str = "ml.t2.medium";

struct Client {
    registry: BackendRegistry,
    scope: Scope,
}

impl Client {
    fn new() -> Self {
        Self {
            registry: BackendRegistry::default(),
            scope: Scope::new(ACCOUNT_ID, REGION),
        }
    }

    fn call(&mut self, request: Value) -> Value {
        let reply = handle(&mut self.registry, &self.scope, request);
        serde_json::to_value(&reply).unwrap()
    }

    fn ok(&mut self, request: Value) -> Value {
        let body = self.call(request);
        assert!(body.get("Error").is_none(), "unexpected error: {body}");
        body
    }

    fn err(&mut self, request: Value) -> (String, String) {
        let body = self.call(request);
        let error = &body["Error"];
        assert!(error.is_object(), "expected error, got: {body}");
        (
            error["Code"].as_str().unwrap().to_owned(),
            error["Message"].as_str().unwrap().to_owned(),
        )
    }

    fn create_notebook(&mut self, name: &str) -> Value {
        self.ok(json!({
            "Action": "CreateNotebookInstance",
            "NotebookInstanceName": name,
            "InstanceType": FAKE_INSTANCE_TYPE,
            "RoleArn": FAKE_ROLE_ARN,
        }))
    }

    fn describe_notebook(&mut self, name: &str) -> Value {
        self.call(json!({"Action": "DescribeNotebookInstance", "NotebookInstanceName": name}))
    }

    fn notebook_action(&mut self, action: &str, name: &str) -> Value {
        self.call(json!({"Action": action, "NotebookInstanceName": name}))
    }

    fn list_names(&mut self, filter: Value) -> (Vec<String>, Option<String>) {
        let mut request = filter;
        request["Action"] = json!("ListNotebookInstances");
        let body = self.ok(request);
        let names = body["NotebookInstances"]
            .as_array()
            .unwrap()
            .iter()
            .map(|i| i["NotebookInstanceName"].as_str().unwrap().to_owned())
            .collect();
        let token = body
            .get("NextToken")
            .and_then(Value::as_str)
            .map(str::to_owned);
        (names, token)
    }
}

fn notebook_arn(name: &str) -> String {
    format!("arn:aws:sagemaker:{REGION}:{ACCOUNT_ID}:notebook-instance/{name}")
}

#[test]
fn create_with_minimal_params_applies_defaults() {
    let mut client = Client::new();
    let resp = client.create_notebook(FAKE_NAME);
    assert_eq!(resp["NotebookInstanceArn"], notebook_arn(FAKE_NAME));

    let resp = client.describe_notebook(FAKE_NAME);
    assert_eq!(resp["NotebookInstanceArn"], notebook_arn(FAKE_NAME));
    assert_eq!(resp["NotebookInstanceName"], FAKE_NAME);
    assert_eq!(resp["NotebookInstanceStatus"], "InService");
    assert_eq!(
        resp["Url"],
        format!("{FAKE_NAME}.notebook.{REGION}.sagemaker.aws")
    );
    assert_eq!(resp["InstanceType"], FAKE_INSTANCE_TYPE);
    assert_eq!(resp["RoleArn"], FAKE_ROLE_ARN);
    assert!(resp["LastModifiedTime"].is_number());
    assert!(resp["CreationTime"].is_number());
    assert_eq!(resp["DirectInternetAccess"], "Enabled");
    assert_eq!(resp["VolumeSizeInGB"], 5);
    assert_eq!(resp["RootAccess"], "Enabled");
}

#[test]
fn create_with_all_params_round_trips_through_describe() {
    let mut client = Client::new();
    let tags = json!([
        {"Key": "newkey1", "Value": "newval1"},
        {"Key": "newkey2", "Value": "newval2"}
    ]);
    let security_groups = json!(["sg-0123456789abcdef0", "sg-0123456789abcdef1"]);
    let additional_repos = json!([
        "https://github.com/user/repo2",
        "https://github.com/user/repo2"
    ]);

    client.ok(json!({
        "Action": "CreateNotebookInstance",
        "NotebookInstanceName": FAKE_NAME,
        "InstanceType": FAKE_INSTANCE_TYPE,
        "SubnetId": "subnet-012345678",
        "SecurityGroupIds": security_groups,
        "RoleArn": FAKE_ROLE_ARN,
        "KmsKeyId": "62d4509a-9f96-446c-a9ba-6b1c353c8c58",
        "Tags": tags,
        "LifecycleConfigName": "FakeLifecycleConfigName",
        "DirectInternetAccess": "Enabled",
        "VolumeSizeInGB": 7,
        "AcceleratorTypes": ["ml.eia1.medium", "ml.eia2.medium"],
        "DefaultCodeRepository": "https://github.com/user/repo1",
        "AdditionalCodeRepositories": additional_repos,
        "RootAccess": "Disabled"
    }));

    let resp = client.describe_notebook(FAKE_NAME);
    assert_eq!(resp["VolumeSizeInGB"], 7);
    assert_eq!(resp["SubnetId"], "subnet-012345678");
    assert_eq!(resp["SecurityGroups"], security_groups);
    assert_eq!(resp["KmsKeyId"], "62d4509a-9f96-446c-a9ba-6b1c353c8c58");
    assert_eq!(resp["NotebookInstanceLifecycleConfigName"], "FakeLifecycleConfigName");
    assert_eq!(resp["AcceleratorTypes"], json!(["ml.eia1.medium", "ml.eia2.medium"]));
    assert_eq!(resp["DefaultCodeRepository"], "https://github.com/user/repo1");
    assert_eq!(resp["AdditionalCodeRepositories"], additional_repos);
    assert_eq!(resp["RootAccess"], "Disabled");

    let listed = client.ok(json!({"Action": "ListTags", "ResourceArn": notebook_arn(FAKE_NAME)}));
    assert_eq!(listed["Tags"], tags);
}

#[test]
fn create_with_invalid_instance_type_is_rejected() {
    let mut client = Client::new();
    let (code, message) = client.err(json!({
        "Action": "CreateNotebookInstance",
        "NotebookInstanceName": FAKE_NAME,
        "InstanceType": "undefined_instance_type",
        "RoleArn": FAKE_ROLE_ARN,
    }));
    assert_eq!(code, "ValidationException");
    assert!(message.contains(
        "Value 'undefined_instance_type' at 'instanceType' failed to satisfy \
         constraint: Member must satisfy enum value set: ["
    ));
    assert!(message.contains("ml.t2.medium"));
}

#[test]
fn full_notebook_lifecycle() {
    let mut client = Client::new();
    client.create_notebook(FAKE_NAME);

    let (code, message) =
        client.err(json!({"Action": "DeleteNotebookInstance", "NotebookInstanceName": FAKE_NAME}));
    assert_eq!(code, "ValidationException");
    assert_eq!(
        message,
        format!(
            "Status (InService) not in ([Stopped, Failed]). Unable to transition to \
             (Deleting) for Notebook Instance ({})",
            notebook_arn(FAKE_NAME)
        )
    );

    client.notebook_action("StopNotebookInstance", FAKE_NAME);
    assert_eq!(client.describe_notebook(FAKE_NAME)["NotebookInstanceStatus"], "Stopped");

    client.notebook_action("StartNotebookInstance", FAKE_NAME);
    assert_eq!(client.describe_notebook(FAKE_NAME)["NotebookInstanceStatus"], "InService");

    client.notebook_action("StopNotebookInstance", FAKE_NAME);
    // 두 번 정지해도 성공
    let again = client.notebook_action("StopNotebookInstance", FAKE_NAME);
    assert_eq!(again["ResponseMetadata"]["HTTPStatusCode"], 200);

    let deleted = client.notebook_action("DeleteNotebookInstance", FAKE_NAME);
    assert_eq!(deleted["ResponseMetadata"]["HTTPStatusCode"], 200);

    let gone = client.describe_notebook(FAKE_NAME);
    assert_eq!(gone["Error"]["Message"], "RecordNotFound");
}

#[test]
fn delete_then_recreate_same_name() {
    let mut client = Client::new();
    client.create_notebook(FAKE_NAME);
    client.notebook_action("StopNotebookInstance", FAKE_NAME);
    client.notebook_action("DeleteNotebookInstance", FAKE_NAME);

    let resp = client.create_notebook(FAKE_NAME);
    assert_eq!(resp["NotebookInstanceArn"], notebook_arn(FAKE_NAME));
}

#[test]
fn list_notebook_instances_matches_provider_ordering() {
    let mut client = Client::new();
    for i in 0..3 {
        client.create_notebook(&format!("Name{i}"));
    }
    client.notebook_action("StopNotebookInstance", "Name1");

    assert_eq!(client.list_names(json!({})).0, ["Name0", "Name1", "Name2"]);
    assert_eq!(
        client.list_names(json!({"SortBy": "Status"})).0,
        ["Name0", "Name2", "Name1"]
    );
    assert_eq!(
        client.list_names(json!({"SortOrder": "Descending"})).0,
        ["Name2", "Name1", "Name0"]
    );
    assert_eq!(client.list_names(json!({"NameContains": "1"})).0, ["Name1"]);
    assert_eq!(
        client.list_names(json!({"StatusEquals": "InService"})).0,
        ["Name0", "Name2"]
    );
    assert!(client.list_names(json!({"StatusEquals": "Pending"})).0.is_empty());

    let (names, token) = client.list_names(json!({"MaxResults": 1}));
    assert_eq!(names, ["Name0"]);
    let token = token.expect("first page should be truncated");

    let (names, token) = client.list_names(json!({"NextToken": token}));
    assert_eq!(names, ["Name1", "Name2"]);
    assert!(token.is_none());
}

#[test]
fn list_with_malformed_token_is_rejected() {
    let mut client = Client::new();
    client.create_notebook("Name0");
    let (code, message) =
        client.err(json!({"Action": "ListNotebookInstances", "NextToken": "not-a-token!"}));
    assert_eq!(code, "ValidationException");
    assert_eq!(message, "Invalid pagination token");
}

#[test]
fn add_and_delete_tags_on_notebook() {
    let mut client = Client::new();
    let arn = client.create_notebook(FAKE_NAME)["NotebookInstanceArn"]
        .as_str()
        .unwrap()
        .to_owned();
    let tags = json!([{"Key": "myKey", "Value": "myValue"}]);

    let added = client.ok(json!({"Action": "AddTags", "ResourceArn": arn, "Tags": tags}));
    assert_eq!(added["ResponseMetadata"]["HTTPStatusCode"], 200);
    assert_eq!(
        client.ok(json!({"Action": "ListTags", "ResourceArn": arn}))["Tags"],
        tags
    );

    let deleted = client.ok(json!({"Action": "DeleteTags", "ResourceArn": arn, "TagKeys": ["myKey"]}));
    assert_eq!(deleted["ResponseMetadata"]["HTTPStatusCode"], 200);
    assert_eq!(
        client.ok(json!({"Action": "ListTags", "ResourceArn": arn}))["Tags"],
        json!([])
    );
}

#[test]
fn lifecycle_config_crud() {
    let mut client = Client::new();
    let name = "MyLifeCycleConfig";
    let on_create = json!([{"Content": "Create Script Line 1"}]);
    let on_start = json!([{"Content": "Start Script Line 1"}]);
    let create = json!({
        "Action": "CreateNotebookInstanceLifecycleConfig",
        "NotebookInstanceLifecycleConfigName": name,
        "OnCreate": on_create,
        "OnStart": on_start
    });

    let resp = client.ok(create.clone());
    let expected_arn = format!(
        "arn:aws:sagemaker:{REGION}:{ACCOUNT_ID}:notebook-instance-lifecycle-configuration/{name}"
    );
    assert_eq!(resp["NotebookInstanceLifecycleConfigArn"], expected_arn);

    let (_, message) = client.err(create);
    assert!(message.ends_with("Notebook Instance Lifecycle Config already exists.)"));

    let describe = json!({
        "Action": "DescribeNotebookInstanceLifecycleConfig",
        "NotebookInstanceLifecycleConfigName": name
    });
    let resp = client.ok(describe.clone());
    assert_eq!(resp["NotebookInstanceLifecycleConfigName"], name);
    assert_eq!(resp["NotebookInstanceLifecycleConfigArn"], expected_arn);
    assert_eq!(resp["OnStart"], on_start);
    assert_eq!(resp["OnCreate"], on_create);
    assert!(resp["LastModifiedTime"].is_number());
    assert!(resp["CreationTime"].is_number());

    let delete = json!({
        "Action": "DeleteNotebookInstanceLifecycleConfig",
        "NotebookInstanceLifecycleConfigName": name
    });
    client.ok(delete.clone());

    let (_, message) = client.err(describe);
    assert!(message.ends_with("Notebook Instance Lifecycle Config does not exist.)"));
    let (_, message) = client.err(delete);
    assert!(message.ends_with("Notebook Instance Lifecycle Config does not exist.)"));
}

#[test]
fn describe_nonexistent_model() {
    let mut client = Client::new();
    let (_, message) = client.err(json!({"Action": "DescribeModel", "ModelName": "Nonexistent"}));
    assert!(message.starts_with("Could not find model"));
}
