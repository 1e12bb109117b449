//! # Commerce API
//!
//! 사용자/상품/주문/평점 CRUD REST API 서버.
//!
//! JWT Access/Refresh 토큰 인증과 라우트별 역할 제어를 제공합니다.

pub mod auth;
pub mod error;
pub mod extract;
pub mod metrics;
pub mod repository;
pub mod routes;
pub mod services;
pub mod state;

pub use error::{ApiErrorResponse, ApiResult, AppError};
pub use extract::{AppJson, AppPath};
pub use routes::create_api_router;
pub use state::AppState;
