// ==========================================
// 教材管理系统 - API层错误类型
// ==========================================
// 职责: 统一工作流边界的错误,转换仓储/校验错误为可展示的消息
// 红线: 校验失败必须带出字段/班级与冲突数值
// ==========================================

use crate::engine::validation::ValidationError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 业务规则错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    /// 表单校验失败 (携带全部违规,便于逐项提示)
    #[error("校验失败: {reason}")]
    ValidationFailed {
        reason: String,
        violations: Vec<ValidationError>,
    },

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// 由违规列表构造校验错误; 第一条违规作为摘要
    pub fn from_violations(violations: Vec<ValidationError>) -> Self {
        let reason = violations
            .first()
            .map(|v| v.to_string())
            .unwrap_or_else(|| "未知校验错误".to_string());
        ApiError::ValidationFailed { reason, violations }
    }

    /// 校验违规列表 (非校验错误返回空)
    pub fn violations(&self) -> &[ValidationError] {
        match self {
            ApiError::ValidationFailed { violations, .. } => violations,
            _ => &[],
        }
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::DocumentFormatError { isbn, message } => {
                ApiError::DatabaseError(format!("文档格式错误 (isbn={}): {}", isbn, message))
            }
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::from_violations(vec![err])
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
