#![doc = include_str!("../README.md")]

pub mod config;
pub mod error;
pub mod metrics;
pub mod resource;
pub mod types;

// --- 주요 타입 re-export ---

// 에러
pub use error::{ConfigError, ErrorCode, ServiceError, SimError};

// 설정
pub use config::SimConfig;

// 리소스 추상화
pub use resource::{Resource, ResourceKind};

// 도메인 타입
pub use types::{Scope, Tag};
