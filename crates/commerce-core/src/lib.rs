//! # Commerce Core
//!
//! 커머스 백엔드의 핵심 도메인 모델 및 공통 인프라를 제공합니다.
//!
//! 이 크레이트는 API 서버와 저장소 구현이 공유하는 타입을 담고 있습니다:
//! - 사용자 자격증명 및 역할 정의
//! - 상품/주문/평점 문서 타입
//! - 자격증명 저장소 및 문서 저장소 트레이트
//! - 설정 관리
//! - 로깅 인프라
//! - 에러 타입

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod store;

pub use self::config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
pub use store::*;
