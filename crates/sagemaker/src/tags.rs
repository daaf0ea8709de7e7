//! 태그 인덱스 -- ARN 기준 키/값 태그 관리
//!
//! 태그는 리소스 종류와 무관하게 ARN 문자열에 연결됩니다. 키는 ARN마다
//! 유일하며, 처음 추가된 순서가 목록 순서가 됩니다.

use std::collections::HashMap;

use sagesim_core::types::Tag;

/// ARN → 태그 목록 인덱스
#[derive(Debug, Clone, Default)]
pub struct TagIndex {
    tags: HashMap<String, Vec<Tag>>,
}

impl TagIndex {
    /// 빈 인덱스를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 태그를 추가하거나 갱신합니다.
    ///
    /// 기존 키는 값만 덮어쓰고 위치를 유지하며, 새 키는 뒤에 붙습니다.
    /// 갱신 후의 전체 태그 목록을 반환합니다.
    pub fn add(&mut self, arn: &str, tags: &[Tag]) -> Vec<Tag> {
        let entry = self.tags.entry(arn.to_owned()).or_default();
        for tag in tags {
            match entry.iter_mut().find(|t| t.key == tag.key) {
                Some(existing) => existing.value.clone_from(&tag.value),
                None => entry.push(tag.clone()),
            }
        }
        entry.clone()
    }

    /// ARN의 현재 태그 목록을 반환합니다. 태그가 없으면 빈 슬라이스입니다.
    pub fn list(&self, arn: &str) -> &[Tag] {
        self.tags.get(arn).map(Vec::as_slice).unwrap_or_default()
    }

    /// 지정한 키를 제거합니다. 없는 키는 무시합니다.
    pub fn delete(&mut self, arn: &str, keys: &[String]) {
        if let Some(entry) = self.tags.get_mut(arn) {
            entry.retain(|t| !keys.contains(&t.key));
            if entry.is_empty() {
                self.tags.remove(arn);
            }
        }
    }

    /// 리소스 삭제 시 해당 ARN의 태그를 모두 제거합니다.
    pub fn remove_resource(&mut self, arn: &str) {
        self.tags.remove(arn);
    }

    /// 태그가 하나 이상 있는 ARN 수
    pub fn tagged_resource_count(&self) -> usize {
        self.tags.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARN: &str = "arn:aws:sagemaker:us-east-1:123456789012:notebook-instance/nb";

    #[test]
    fn list_unknown_arn_is_empty() {
        let index = TagIndex::new();
        assert!(index.list(ARN).is_empty());
    }

    #[test]
    fn add_preserves_first_seen_order() {
        let mut index = TagIndex::new();
        index.add(ARN, &[Tag::new("b", "1"), Tag::new("a", "2")]);
        index.add(ARN, &[Tag::new("c", "3")]);
        let keys: Vec<_> = index.list(ARN).iter().map(|t| t.key.as_str()).collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
    }

    #[test]
    fn add_overwrites_existing_key_in_place() {
        let mut index = TagIndex::new();
        index.add(ARN, &[Tag::new("k1", "v1"), Tag::new("k2", "v2")]);
        let result = index.add(ARN, &[Tag::new("k1", "changed")]);
        assert_eq!(result, vec![Tag::new("k1", "changed"), Tag::new("k2", "v2")]);
    }

    #[test]
    fn delete_removes_keys_and_ignores_missing() {
        let mut index = TagIndex::new();
        index.add(ARN, &[Tag::new("k1", "v1"), Tag::new("k2", "v2")]);
        index.delete(ARN, &["k1".to_owned(), "absent".to_owned()]);
        assert_eq!(index.list(ARN), &[Tag::new("k2", "v2")]);

        // 두 번 삭제해도 에러가 아님
        index.delete(ARN, &["k1".to_owned()]);
        assert_eq!(index.list(ARN).len(), 1);
    }

    #[test]
    fn delete_on_untagged_arn_is_noop() {
        let mut index = TagIndex::new();
        index.delete(ARN, &["k".to_owned()]);
        assert_eq!(index.tagged_resource_count(), 0);
    }

    #[test]
    fn remove_resource_drops_all_tags() {
        let mut index = TagIndex::new();
        index.add(ARN, &[Tag::new("k", "v")]);
        index.add("other", &[Tag::new("k", "v")]);
        index.remove_resource(ARN);
        assert!(index.list(ARN).is_empty());
        assert_eq!(index.tagged_resource_count(), 1);
    }

    #[test]
    fn tag_sets_are_isolated_per_arn() {
        let mut index = TagIndex::new();
        index.add("arn-a", &[Tag::new("k", "a")]);
        index.add("arn-b", &[Tag::new("k", "b")]);
        assert_eq!(index.list("arn-a")[0].value, "a");
        assert_eq!(index.list("arn-b")[0].value, "b");
    }
}
