// ==========================================
// 工位轮换预订系统 - 预订领域模型
// ==========================================
// 不变量:
// - 同一座位同一天至多一条 ACTIVE 预订
// - 同一用户同一天至多一条 ACTIVE 预订
// - 预订日期不落在周末
// 唯一约束由 booking 表的部分唯一索引兜底
// ==========================================

use crate::domain::types::{Batch, BookingStatus, Role};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ==========================================
// Booking - 预订
// ==========================================
// 创建后仅 status (及 updated_at) 可变, 且只经由取消/释放操作
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub booking_id: String,        // 预订ID (UUID)
    pub seat_id: String,           // 座位引用
    pub user_id: String,           // 用户引用
    pub booking_date: NaiveDate,   // 预订日期 (天粒度)
    pub status: BookingStatus,     // 当前状态
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Booking {
    /// 创建新的 ACTIVE 预订
    pub fn new(seat_id: String, user_id: String, booking_date: NaiveDate) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            booking_id: uuid::Uuid::new_v4().to_string(),
            seat_id,
            user_id,
            booking_date,
            status: BookingStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    /// 是否生效中
    pub fn is_active(&self) -> bool {
        matches!(self.status, BookingStatus::Active)
    }
}

// ==========================================
// BookingRequest - 预订请求 (瞬态输入)
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRequest {
    pub user_id: String,
    pub batch: Batch,
    pub seat_id: String,
    pub date: NaiveDate,
}

// ==========================================
// Actor - 操作者 (取消/释放/管理操作的主体)
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: String,
    pub role: Role,
}

impl Actor {
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            role,
        }
    }

    /// 是否有权操作该预订 (本人或管理员)
    pub fn can_operate(&self, booking: &Booking) -> bool {
        self.role == Role::Admin || self.user_id == booking.user_id
    }

    /// 是否为管理员
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_booking_is_active() {
        let booking = Booking::new(
            "seat-1".to_string(),
            "user-1".to_string(),
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
        );
        assert!(booking.is_active());
        assert_eq!(booking.created_at, booking.updated_at);
    }

    #[test]
    fn test_actor_permissions() {
        let booking = Booking::new(
            "seat-1".to_string(),
            "user-1".to_string(),
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
        );

        let owner = Actor::new("user-1", Role::Employee);
        let stranger = Actor::new("user-2", Role::Employee);
        let admin = Actor::new("admin-1", Role::Admin);

        assert!(owner.can_operate(&booking));
        assert!(!stranger.can_operate(&booking));
        assert!(admin.can_operate(&booking));
    }
}
