// ==========================================
// 模具管理系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换Repository错误为调用方可识别的错误
// ==========================================

use crate::domain::types::{MoldAction, MoldStatus};
use crate::engine::TransitionRejection;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 业务规则错误
    // ==========================================
    #[error("模具编号已存在: {mold_id}")]
    DuplicateId { mold_id: String },

    #[error("模具不存在: {mold_id}")]
    MoldNotFound { mold_id: String },

    #[error("无效的状态转换: mold_id={mold_id}, from={from}, action={action}")]
    InvalidTransition {
        mold_id: String,
        from: MoldStatus,
        action: MoldAction,
    },

    #[error("数据验证失败: {0}")]
    ValidationError(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("持久化失败: {0}")]
    Persistence(String),
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
// 存储层的任何失败对调用方都是“未提交”
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        ApiError::Persistence(err.to_string())
    }
}

impl From<TransitionRejection> for ApiError {
    fn from(rejection: TransitionRejection) -> Self {
        ApiError::InvalidTransition {
            mold_id: rejection.mold_id,
            from: rejection.from,
            action: rejection.action,
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
