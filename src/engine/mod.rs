// ==========================================
// 工位轮换预订系统 - 引擎层
// ==========================================
// 职责: 实现排期与资格业务规则, 不拼 SQL
// 红线: Engine 不拼 SQL, 不可订裁决必须输出 reason
// ==========================================

pub mod calendar;
pub mod eligibility;
pub mod rotation;
pub mod unlock;

// 重导出核心引擎
pub use calendar::{CalendarPolicy, BOOKING_WINDOW_DAYS};
pub use eligibility::{EligibilityEngine, SeatVerdict};
pub use rotation::RotationResolver;
pub use unlock::{UnlockPolicy, FLOATING_UNLOCK_HOUR};
