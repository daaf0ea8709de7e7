//! 태그 API -- AddTags / ListTags / DeleteTags
//!
//! 태그는 ARN 문자열에만 연결되며 리소스 존재 여부는 확인하지 않습니다.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use sagesim_core::config::MAX_TAG_PAGE_SIZE;
use sagesim_core::error::ServiceError;
use sagesim_core::types::Tag;

use crate::backend::SageMakerBackend;
use crate::query;

/// 태그 키 최대 길이
pub const MAX_TAG_KEY_LEN: usize = 128;

/// 태그 값 최대 길이
pub const MAX_TAG_VALUE_LEN: usize = 256;

/// 태그 목록을 검증합니다. 변경 전에 호출해야 합니다.
pub fn validate_tags(tags: &[Tag]) -> Result<(), ServiceError> {
    for (i, tag) in tags.iter().enumerate() {
        let position = i + 1;
        if tag.key.is_empty() || tag.key.chars().count() > MAX_TAG_KEY_LEN {
            return Err(ServiceError::validation(format!(
                "Value '{}' at 'tags.{position}.member.key' failed to satisfy constraint: \
                 Member must have length between 1 and {MAX_TAG_KEY_LEN}",
                tag.key
            )));
        }
        if tag.value.chars().count() > MAX_TAG_VALUE_LEN {
            return Err(ServiceError::validation(format!(
                "Value '{}' at 'tags.{position}.member.value' failed to satisfy constraint: \
                 Member must have length less than or equal to {MAX_TAG_VALUE_LEN}",
                tag.value
            )));
        }
    }
    Ok(())
}

/// `AddTags` 입력
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AddTagsParams {
    pub resource_arn: String,
    pub tags: Vec<Tag>,
}

/// `AddTags` 출력 -- 갱신 후 전체 태그
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AddTagsOutput {
    pub tags: Vec<Tag>,
}

/// `ListTags` 입력
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListTagsParams {
    pub resource_arn: String,
    pub max_results: Option<usize>,
    pub next_token: Option<String>,
}

impl ListTagsParams {
    pub fn new(resource_arn: impl Into<String>) -> Self {
        Self {
            resource_arn: resource_arn.into(),
            ..Self::default()
        }
    }
}

/// `ListTags` 출력
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListTagsOutput {
    pub tags: Vec<Tag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

/// `DeleteTags` 입력
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeleteTagsParams {
    pub resource_arn: String,
    pub tag_keys: Vec<String>,
}

impl SageMakerBackend {
    /// ARN에 태그를 추가하거나 갱신합니다.
    pub fn add_tags(&mut self, params: AddTagsParams) -> Result<AddTagsOutput, ServiceError> {
        validate_tags(&params.tags)?;
        let tags = self.tags.add(&params.resource_arn, &params.tags);
        info!(arn = %params.resource_arn, added = params.tags.len(), "tags added");
        Ok(AddTagsOutput { tags })
    }

    /// ARN의 태그를 페이지 단위로 조회합니다.
    pub fn list_tags(&self, params: &ListTagsParams) -> Result<ListTagsOutput, ServiceError> {
        let max_results = query::resolve_max_results(
            params.max_results,
            self.settings.tag_page_size,
            MAX_TAG_PAGE_SIZE,
        )?;
        let tags = self.tags.list(&params.resource_arn).to_vec();
        let page = query::paginate(tags, max_results, params.next_token.as_deref())?;
        debug!(arn = %params.resource_arn, returned = page.items.len(), "list tags");
        Ok(ListTagsOutput {
            tags: page.items,
            next_token: page.next_token,
        })
    }

    /// ARN에서 지정한 키의 태그를 제거합니다.
    pub fn delete_tags(&mut self, params: &DeleteTagsParams) -> Result<(), ServiceError> {
        if let Some(key) = params.tag_keys.iter().find(|k| k.is_empty()) {
            return Err(ServiceError::validation(format!(
                "Value '{key}' at 'tagKeys' failed to satisfy constraint: \
                 Member must have length greater than or equal to 1"
            )));
        }
        self.tags.delete(&params.resource_arn, &params.tag_keys);
        info!(arn = %params.resource_arn, removed = params.tag_keys.len(), "tags deleted");
        Ok(())
    }
}
