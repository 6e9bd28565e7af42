// ==========================================
// 工位轮换预订系统 - 座位领域模型
// ==========================================
// 座位是只读参照数据: 创建后不变, 引擎不修改
// ==========================================

use crate::domain::types::SeatKind;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// Seat - 座位
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Seat {
    pub seat_id: String,         // 稳定ID (UUID)
    pub seat_number: String,     // 人类可读编号 (如 D01 / F01)
    pub kind: SeatKind,          // 座位类型
    pub created_at: NaiveDateTime,
}

impl Seat {
    /// 创建新座位
    pub fn new(seat_number: String, kind: SeatKind) -> Self {
        Self {
            seat_id: uuid::Uuid::new_v4().to_string(),
            seat_number,
            kind,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }

    /// 是否为轮换指定座位
    pub fn is_designated(&self) -> bool {
        matches!(self.kind, SeatKind::Designated)
    }
}
