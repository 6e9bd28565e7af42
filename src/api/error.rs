// ==========================================
// 工位轮换预订系统 - API层错误类型
// ==========================================
// 职责: 定义业务操作的全部类型化结果, 转换 Repository 错误
// 约束: 校验失败一律以类型化 Result 返回, 不作为不可恢复故障抛出
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
/// 所有变体均为"预期内、调用方可恢复"的业务结果
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 预订校验错误
    // ==========================================
    /// 日期不在可订窗口内 (0 <= 距今天数 <= 14)
    #[error("预订日期超出可订窗口: 距今{days}天 (允许0~14天)")]
    OutOfWindow { days: i64 },

    #[error("周末不可预订")]
    WeekendNotBookable,

    #[error("座位不存在: seat_id={seat_id}")]
    SeatNotFound { seat_id: String },

    /// 占用之外的资格不满足 (批次不排班 / 浮动未解锁 / 轮换日浮动锁)
    #[error("当前不可预订该座位: {reason}")]
    NotEligible { reason: String },

    // ==========================================
    // 占用冲突错误 (并发落败方的正常结果)
    // ==========================================
    #[error("该座位当日已被预订")]
    AlreadyBooked,

    #[error("该用户当日已有预订")]
    DuplicateUserBooking,

    // ==========================================
    // 预订生命周期错误
    // ==========================================
    #[error("预订记录未找到: booking_id={booking_id}")]
    NotFound { booking_id: String },

    #[error("无权操作该预订")]
    Forbidden,

    #[error("预订不处于生效状态: status={status}")]
    NotActive { status: String },

    #[error("仅轮换指定座位可释放")]
    NotReleasable,

    // ==========================================
    // 输入校验
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    // ==========================================
    // 存储层错误 (调用方可重试)
    // ==========================================
    #[error("存储层错误: {0}")]
    StorageError(RepositoryError),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 RepositoryError 转换
// 目的: 将仓储层的技术错误转换为类型化业务结果;
// 唯一约束违反按索引列归类为对应的占用冲突 (并发兜底路径)
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::UniqueConstraintViolation(msg) if msg.contains("seat_id") => {
                ApiError::AlreadyBooked
            }
            RepositoryError::UniqueConstraintViolation(msg) if msg.contains("user_id") => {
                ApiError::DuplicateUserBooking
            }
            other => ApiError::StorageError(other),
        }
    }
}

impl ApiError {
    /// 是否为调用方可重试的瞬时错误
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::StorageError(_))
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_violation_maps_to_occupancy_conflict() {
        // 座位索引冲突
        let repo_err = RepositoryError::UniqueConstraintViolation(
            "UNIQUE constraint failed: booking.seat_id, booking.booking_date".to_string(),
        );
        let api_err: ApiError = repo_err.into();
        assert!(matches!(api_err, ApiError::AlreadyBooked));

        // 用户索引冲突
        let repo_err = RepositoryError::UniqueConstraintViolation(
            "UNIQUE constraint failed: booking.user_id, booking.booking_date".to_string(),
        );
        let api_err: ApiError = repo_err.into();
        assert!(matches!(api_err, ApiError::DuplicateUserBooking));
    }

    #[test]
    fn test_other_repo_errors_become_storage_error() {
        let repo_err = RepositoryError::DatabaseQueryError("disk I/O error".to_string());
        let api_err: ApiError = repo_err.into();
        assert!(api_err.is_retryable());
        assert!(matches!(api_err, ApiError::StorageError(_)));
    }

    #[test]
    fn test_business_errors_not_retryable() {
        assert!(!ApiError::AlreadyBooked.is_retryable());
        assert!(!ApiError::OutOfWindow { days: 20 }.is_retryable());
        assert!(!ApiError::Forbidden.is_retryable());
    }
}
