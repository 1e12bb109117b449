//! 요청 추출기.
//!
//! `Json`/`Path` 추출 실패를 [`AppError`] 응답 형식으로 반환합니다.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::AppError;

/// JSON 요청 본문 추출기.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// 경로 파라미터 추출기.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);
