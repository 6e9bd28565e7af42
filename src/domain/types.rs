// ==========================================
// 工位轮换预订系统 - 领域类型定义
// ==========================================
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
// ==========================================

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 批次 (Batch)
// ==========================================
// 员工所属轮换批次; NONE 表示不参与轮换 (如管理员)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Batch {
    A,
    B,
    None,
}

impl fmt::Display for Batch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Batch::A => write!(f, "A"),
            Batch::B => write!(f, "B"),
            Batch::None => write!(f, "NONE"),
        }
    }
}

impl Batch {
    /// 从字符串解析批次
    pub fn from_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "A" => Batch::A,
            "B" => Batch::B,
            _ => Batch::None, // 默认值
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            Batch::A => "A",
            Batch::B => "B",
            Batch::None => "NONE",
        }
    }
}

// ==========================================
// 座位类型 (Seat Kind)
// ==========================================
// DESIGNATED: 轮换指定座位, 仅当日排班批次可订
// FLOATING: 浮动座位, 解锁后任何人可订
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeatKind {
    Designated, // 轮换指定
    Floating,   // 浮动
}

impl fmt::Display for SeatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeatKind::Designated => write!(f, "DESIGNATED"),
            SeatKind::Floating => write!(f, "FLOATING"),
        }
    }
}

impl SeatKind {
    /// 从字符串解析座位类型
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "DESIGNATED" => Some(SeatKind::Designated),
            "FLOATING" => Some(SeatKind::Floating),
            _ => None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            SeatKind::Designated => "DESIGNATED",
            SeatKind::Floating => "FLOATING",
        }
    }
}

// ==========================================
// 预订状态 (Booking Status)
// ==========================================
// 状态机: ACTIVE -> CANCELLED (本人或管理员)
//         ACTIVE -> RELEASED  (本人, 仅轮换指定座位)
// CANCELLED / RELEASED 均为终态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Active,    // 生效中
    Cancelled, // 已取消
    Released,  // 已释放 (保留用于审计/报表)
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingStatus::Active => write!(f, "ACTIVE"),
            BookingStatus::Cancelled => write!(f, "CANCELLED"),
            BookingStatus::Released => write!(f, "RELEASED"),
        }
    }
}

impl BookingStatus {
    /// 从字符串解析状态
    pub fn from_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "ACTIVE" => BookingStatus::Active,
            "RELEASED" => BookingStatus::Released,
            _ => BookingStatus::Cancelled, // 默认值 (不可识别的状态不得复活为 ACTIVE)
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            BookingStatus::Active => "ACTIVE",
            BookingStatus::Cancelled => "CANCELLED",
            BookingStatus::Released => "RELEASED",
        }
    }

    /// 是否为终态
    pub fn is_terminal(&self) -> bool {
        !matches!(self, BookingStatus::Active)
    }
}

// ==========================================
// 角色 (Role)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Employee, // 员工
    Admin,    // 管理员
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Employee => write!(f, "EMPLOYEE"),
            Role::Admin => write!(f, "ADMIN"),
        }
    }
}

impl Role {
    /// 从字符串解析角色
    pub fn from_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "ADMIN" => Role::Admin,
            _ => Role::Employee, // 默认值
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            Role::Employee => "EMPLOYEE",
            Role::Admin => "ADMIN",
        }
    }
}

// ==========================================
// 周期周数 (Cycle Week)
// ==========================================
// 14天轮换周期内的第1周/第2周
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CycleWeek {
    Week1,
    Week2,
}

impl fmt::Display for CycleWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CycleWeek::Week1 => write!(f, "WEEK_1"),
            CycleWeek::Week2 => write!(f, "WEEK_2"),
        }
    }
}

impl CycleWeek {
    /// 转换为周数数字 (1/2)
    pub fn as_number(&self) -> u8 {
        match self {
            CycleWeek::Week1 => 1,
            CycleWeek::Week2 => 2,
        }
    }
}

// ==========================================
// 工作日分段 (Weekday Band)
// ==========================================
// 轮换表按"周一至周三 / 周四至周五"两段分配批次
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WeekdayBand {
    MonToWed, // 周一至周三
    ThuToFri, // 周四至周五
    Weekend,  // 周末 (不排班)
}

impl fmt::Display for WeekdayBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeekdayBand::MonToWed => write!(f, "MON_TO_WED"),
            WeekdayBand::ThuToFri => write!(f, "THU_TO_FRI"),
            WeekdayBand::Weekend => write!(f, "WEEKEND"),
        }
    }
}

impl WeekdayBand {
    /// 按日期分类工作日分段
    pub fn of(date: NaiveDate) -> Self {
        match date.weekday() {
            Weekday::Mon | Weekday::Tue | Weekday::Wed => WeekdayBand::MonToWed,
            Weekday::Thu | Weekday::Fri => WeekdayBand::ThuToFri,
            Weekday::Sat | Weekday::Sun => WeekdayBand::Weekend,
        }
    }
}
