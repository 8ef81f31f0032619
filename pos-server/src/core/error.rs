//! 启动期错误
//!
//! 请求期错误统一使用 [`AppError`](shared::error::AppError)，
//! 这里只描述让进程无法启动或继续运行的失败。

use thiserror::Error;

use crate::auth::JwtError;
use crate::storage::StorageError;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("配置错误: {0}")]
    Config(String),

    #[error("存储不可用: {0}")]
    Storage(#[from] StorageError),

    #[error("I/O 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("JWT 配置错误: {0}")]
    Jwt(#[from] JwtError),
}

pub type Result<T> = std::result::Result<T, ServerError>;
