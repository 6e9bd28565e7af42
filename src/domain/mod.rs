// ==========================================
// 工位轮换预订系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体与类型
// 红线: 不含数据访问逻辑, 不含引擎逻辑
// ==========================================

pub mod action_log;
pub mod booking;
pub mod seat;
pub mod types;

// 重导出核心类型
pub use action_log::{ActionLog, ActionType};
pub use booking::{Actor, Booking, BookingRequest};
pub use seat::Seat;
pub use types::{Batch, BookingStatus, CycleWeek, Role, SeatKind, WeekdayBand};
