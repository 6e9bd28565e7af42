// ==========================================
// 工位轮换预订系统 - 操作日志领域模型
// ==========================================
// 红线: 所有写入必须记录
// 用途: 审计追踪 (RELEASED 状态保留即服务于此)
// 对齐: action_log 表
// ==========================================

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

// ==========================================
// ActionLog - 操作日志
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionLog {
    pub action_id: String,                 // 日志ID (UUID)
    pub action_type: String,               // 操作类型 (存储为字符串)
    pub action_ts: NaiveDateTime,          // 操作时间戳
    pub actor: String,                     // 操作人

    // ===== 操作负载 =====
    pub payload_json: Option<JsonValue>,   // 操作参数 (JSON)

    // ===== 扩展字段 (业务用) =====
    pub booking_id: Option<String>,        // 关联预订
    pub booking_date: Option<NaiveDate>,   // 关联日期
    pub detail: Option<String>,            // 详细描述
}

// ==========================================
// ActionType - 操作类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionType {
    CreateBooking,     // 创建预订
    CancelBooking,     // 取消预订
    ReleaseBooking,    // 释放预订
    UpdateCycleConfig, // 更新周期锚点
    SeedData,          // 初始化数据
}

impl ActionType {
    /// 转换为字符串 (用于数据库存储)
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::CreateBooking => "CreateBooking",
            ActionType::CancelBooking => "CancelBooking",
            ActionType::ReleaseBooking => "ReleaseBooking",
            ActionType::UpdateCycleConfig => "UpdateCycleConfig",
            ActionType::SeedData => "SeedData",
        }
    }

    /// 从字符串解析
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "CreateBooking" => Some(ActionType::CreateBooking),
            "CancelBooking" => Some(ActionType::CancelBooking),
            "ReleaseBooking" => Some(ActionType::ReleaseBooking),
            "UpdateCycleConfig" => Some(ActionType::UpdateCycleConfig),
            "SeedData" => Some(ActionType::SeedData),
            _ => None,
        }
    }
}

// ==========================================
// ActionLog 辅助方法
// ==========================================
impl ActionLog {
    /// 创建新的操作日志
    pub fn new(action_type: ActionType, actor: impl Into<String>) -> Self {
        Self {
            action_id: uuid::Uuid::new_v4().to_string(),
            action_type: action_type.as_str().to_string(),
            action_ts: chrono::Utc::now().naive_utc(),
            actor: actor.into(),
            payload_json: None,
            booking_id: None,
            booking_date: None,
            detail: None,
        }
    }

    /// 设置操作负载 (转换为JSON)
    pub fn with_payload<T: Serialize>(mut self, payload: &T) -> Self {
        self.payload_json = serde_json::to_value(payload).ok();
        self
    }

    /// 设置关联预订
    pub fn with_booking(mut self, booking_id: &str, booking_date: NaiveDate) -> Self {
        self.booking_id = Some(booking_id.to_string());
        self.booking_date = Some(booking_date);
        self
    }

    /// 设置详细描述
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}
