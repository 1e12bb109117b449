//! 저장소 트레이트.
//!
//! 자격증명 저장소는 외부 협력자입니다. API 계층은 이 트레이트에만 의존하며
//! PostgreSQL 구현과 인메모리 구현은 `commerce-api::repository`에 있습니다.
//!
//! # 유일성 보장
//!
//! 이메일/사용자 이름 유일성은 반드시 저장소가 원자적으로 보장해야 합니다.
//! 조회 후 삽입(check-then-insert)만으로는 동시 요청에서 중복이 생길 수 있으므로,
//! 구현체는 삽입 시점에 [`StoreError::Duplicate`]를 반환해야 합니다.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Credential, CredentialChanges, NewCredential};
use crate::error::StoreResult;

/// 사용자 자격증명 저장소.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// 정규화된 이메일로 자격증명 조회.
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Credential>>;

    /// ID로 자격증명 조회.
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Credential>>;

    /// 새 자격증명 저장.
    ///
    /// 이메일 또는 사용자 이름이 이미 존재하면 `StoreError::Duplicate`.
    async fn insert(&self, new: NewCredential) -> StoreResult<Credential>;

    /// 모든 자격증명 조회 (생성 시각 순).
    async fn list(&self) -> StoreResult<Vec<Credential>>;

    /// 자격증명 부분 수정. 대상이 없으면 `None`.
    async fn update(&self, id: Uuid, changes: CredentialChanges)
        -> StoreResult<Option<Credential>>;

    /// 자격증명 삭제. 삭제되었으면 `true`.
    async fn delete(&self, id: Uuid) -> StoreResult<bool>;

    /// 저장소 상태 확인.
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

/// ID로 식별되는 문서 (상품, 주문, 평점).
pub trait Document: Clone + Send + Sync + 'static {
    /// 문서 종류 이름 (예: "product")
    const KIND: &'static str;

    /// 문서 ID.
    fn id(&self) -> Uuid;

    /// 수정 시각 갱신.
    fn touch(&mut self, now: DateTime<Utc>);
}
