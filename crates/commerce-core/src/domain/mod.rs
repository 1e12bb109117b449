//! 커머스 운영을 위한 도메인 모델.

mod catalog;
mod user;

pub use catalog::*;
pub use user::*;
