//! 저장소 구현.
//!
//! 사용자 자격증명은 [`commerce_core::UserStore`] 구현체를 통해,
//! 상품/주문/평점은 [`DocumentRepository`]를 통해 접근합니다.

pub mod documents;
pub mod users;

pub use documents::DocumentRepository;
pub use users::{MemoryUserStore, PgUserStore};
