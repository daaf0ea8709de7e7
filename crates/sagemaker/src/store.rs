//! 리소스 저장소 -- 스코프별 이름 → 레코드 매핑
//!
//! [`ResourceStore`]는 한 계정/리전 스코프 안에서 한 종류의 리소스를
//! 삽입 순서대로 보관합니다. 목록 API의 기본 정렬이 생성 순서이므로
//! 순서 보존이 저장소의 불변식입니다.

use sagesim_core::resource::Resource;

use crate::error::StoreError;

/// 삽입 순서를 보존하는 리소스 저장소
///
/// 스코프 하나에 들어가는 레코드 수는 작기 때문에 선형 탐색을 사용합니다.
#[derive(Debug, Clone)]
pub struct ResourceStore<R> {
    records: Vec<R>,
}

impl<R> Default for ResourceStore<R> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
        }
    }
}

impl<R: Resource> ResourceStore<R> {
    /// 빈 저장소를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 레코드를 추가합니다.
    ///
    /// 같은 이름이 이미 있으면 `StoreError::AlreadyExists`를 반환하고
    /// 저장소는 변경되지 않습니다.
    pub fn insert(&mut self, record: R) -> Result<&R, StoreError> {
        if self.contains(record.name()) {
            return Err(StoreError::AlreadyExists {
                kind: R::KIND,
                name: record.name().to_owned(),
            });
        }
        self.records.push(record);
        let last = self.records.len() - 1;
        Ok(&self.records[last])
    }

    /// 이름으로 레코드를 조회합니다.
    pub fn get(&self, name: &str) -> Result<&R, StoreError> {
        self.records
            .iter()
            .find(|r| r.name() == name)
            .ok_or_else(|| not_found::<R>(name))
    }

    /// 이름으로 레코드를 가변 조회합니다.
    pub fn get_mut(&mut self, name: &str) -> Result<&mut R, StoreError> {
        self.records
            .iter_mut()
            .find(|r| r.name() == name)
            .ok_or_else(|| not_found::<R>(name))
    }

    /// 레코드를 제거하고 반환합니다. 나머지 레코드의 순서는 유지됩니다.
    pub fn remove(&mut self, name: &str) -> Result<R, StoreError> {
        let index = self
            .records
            .iter()
            .position(|r| r.name() == name)
            .ok_or_else(|| not_found::<R>(name))?;
        Ok(self.records.remove(index))
    }

    /// 해당 이름의 레코드가 있는지 확인합니다.
    pub fn contains(&self, name: &str) -> bool {
        self.records.iter().any(|r| r.name() == name)
    }

    /// 삽입 순서대로 레코드를 순회합니다.
    pub fn iter(&self) -> impl Iterator<Item = &R> {
        self.records.iter()
    }

    /// 저장된 레코드 수
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// 저장소가 비어 있는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn not_found<R: Resource>(name: &str) -> StoreError {
    StoreError::NotFound {
        kind: R::KIND,
        name: name.to_owned(),
    }
}
