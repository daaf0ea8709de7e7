//! 목록 엔진 -- 정렬, 필터, 커서 기반 페이지네이션
//!
//! 모든 목록 API는 같은 순서로 동작합니다.
//!
//! ```text
//! 삽입 순서 → filter → sort_by (stable) → sort_order → paginate
//! ```
//!
//! 이름/시각 필터와 공통 정렬 키는 [`Resource`] trait만으로 처리하며
//! ([`list`]), 리소스 종류별 모듈은 고유 필터와 고유 정렬 키만 넘깁니다.
//!
//! `NextToken`은 다음 페이지 시작 오프셋을 담은 JSON 커서를 base64로
//! 인코딩한 불투명 문자열입니다.

use std::time::SystemTime;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};

use sagesim_core::resource::Resource;

use crate::error::PaginationError;

/// 정렬 방향
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    /// 오름차순 (기본값)
    #[default]
    Ascending,
    /// 내림차순 -- 최종 순서를 뒤집습니다
    Descending,
}

/// 한 페이지의 결과
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// 이번 페이지의 항목
    pub items: Vec<T>,
    /// 남은 항목이 있을 때만 설정되는 커서
    pub next_token: Option<String>,
}

#[derive(Deserialize)]
struct Cursor {
    offset: usize,
}

/// 오프셋을 `NextToken` 문자열로 인코딩합니다.
pub fn encode_token(offset: usize) -> String {
    let json = serde_json::json!({ "offset": offset }).to_string();
    URL_SAFE_NO_PAD.encode(json)
}

/// `NextToken` 문자열에서 오프셋을 복원합니다.
pub fn decode_token(token: &str) -> Result<usize, PaginationError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(token)
        .map_err(|e| PaginationError::InvalidToken(e.to_string()))?;
    let cursor: Cursor =
        serde_json::from_slice(&bytes).map_err(|e| PaginationError::InvalidToken(e.to_string()))?;
    Ok(cursor.offset)
}

/// 요청된 `MaxResults`를 검증하고, 없으면 기본값을 사용합니다.
pub fn resolve_max_results(
    requested: Option<usize>,
    default: usize,
    upper: usize,
) -> Result<usize, PaginationError> {
    match requested {
        None => Ok(default.clamp(1, upper)),
        Some(value) if value == 0 || value > upper => {
            Err(PaginationError::MaxResultsOutOfRange { value, upper })
        }
        Some(value) => Ok(value),
    }
}

/// 필터/정렬이 끝난 항목 목록을 잘라 한 페이지를 만듭니다.
///
/// 커서의 오프셋이 목록 길이를 넘으면 빈 페이지를 반환합니다.
pub fn paginate<T>(
    items: Vec<T>,
    max_results: usize,
    next_token: Option<&str>,
) -> Result<Page<T>, PaginationError> {
    let offset = next_token.map(decode_token).transpose()?.unwrap_or(0);
    let total = items.len();
    let end = offset.saturating_add(max_results).min(total);

    let page: Vec<T> = items
        .into_iter()
        .skip(offset)
        .take(max_results)
        .collect();

    let next_token = (end < total).then(|| encode_token(end));
    Ok(Page {
        items: page,
        next_token,
    })
}

/// 정렬이 끝난 목록에 정렬 방향을 적용합니다.
///
/// 내림차순은 정렬 결과 전체를 뒤집으므로 동점 항목의 순서도 뒤집힙니다.
/// 호출자는 그 전에 안정 정렬(`sort_by`)로 `SortBy`를 적용해야 합니다.
pub fn apply_sort_order<T>(items: &mut [T], order: SortOrder) {
    if order == SortOrder::Descending {
        items.reverse();
    }
}

/// 생성/수정 시각 범위 필터
///
/// `before`/`after`는 모두 배타적 경계입니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeRange {
    /// 이 시각 이전만 통과
    pub before: Option<SystemTime>,
    /// 이 시각 이후만 통과
    pub after: Option<SystemTime>,
}

impl TimeRange {
    /// 경계를 지정해 범위를 생성합니다.
    pub fn new(before: Option<SystemTime>, after: Option<SystemTime>) -> Self {
        Self { before, after }
    }

    /// 시각이 범위 안에 있는지 확인합니다.
    pub fn contains(&self, time: SystemTime) -> bool {
        self.before.is_none_or(|b| time < b) && self.after.is_none_or(|a| time > a)
    }
}

/// 모든 리소스 종류가 공유하는 정렬 키
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResourceSortKey {
    Name,
    /// 삽입 순서를 그대로 사용 (초 단위 동시 생성도 순서 보존)
    #[default]
    CreationTime,
    LastModifiedTime,
}

/// 공통 정렬 키로 안정 정렬합니다.
pub fn sort_resources<R: Resource>(items: &mut [&R], key: ResourceSortKey) {
    match key {
        ResourceSortKey::CreationTime => {}
        ResourceSortKey::Name => items.sort_by(|a, b| a.name().cmp(b.name())),
        ResourceSortKey::LastModifiedTime => items.sort_by_key(|r| r.last_modified_time()),
    }
}

/// 리소스 종류와 무관한 목록 조건
#[derive(Debug, Clone)]
pub struct ListQuery<'a> {
    pub name_contains: Option<&'a str>,
    pub created: TimeRange,
    pub modified: TimeRange,
    pub sort_order: SortOrder,
    /// [`resolve_max_results`]로 검증된 페이지 크기
    pub max_results: usize,
    pub next_token: Option<&'a str>,
}

impl ListQuery<'_> {
    /// 이름/생성 시각/수정 시각 조건을 모두 만족하는지 확인합니다.
    pub fn matches<R: Resource>(&self, record: &R) -> bool {
        self.name_contains
            .is_none_or(|needle| record.name().contains(needle))
            && self.created.contains(record.creation_time())
            && self.modified.contains(record.last_modified_time())
    }
}

/// 공통 목록 파이프라인을 실행합니다.
///
/// `filter`는 종류별 추가 조건, `sort`는 `SortBy` 적용입니다. 그 뒤에
/// `SortOrder`와 페이지네이션이 적용됩니다.
pub fn list<'r, R, F, S>(
    records: impl Iterator<Item = &'r R>,
    query: &ListQuery<'_>,
    filter: F,
    sort: S,
) -> Result<Page<&'r R>, PaginationError>
where
    R: Resource + 'r,
    F: Fn(&R) -> bool,
    S: FnOnce(&mut [&'r R]),
{
    let mut matched: Vec<&'r R> = records
        .filter(|record| query.matches(*record) && filter(*record))
        .collect();
    sort(&mut matched);
    apply_sort_order(&mut matched, query.sort_order);
    paginate(matched, query.max_results, query.next_token)
}
