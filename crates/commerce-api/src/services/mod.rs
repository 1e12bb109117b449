//! 비즈니스 서비스.

pub mod users;

pub use users::{CreateUserRequest, UpdateUserRequest, UserService};
