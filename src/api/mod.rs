// ==========================================
// 工位轮换预订系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口, 供上层传输层包装调用
// ==========================================

pub mod booking_api;
pub mod config_api;
pub mod error;
pub mod seat_api;

// 重导出核心类型
pub use booking_api::{BookingApi, MAX_BUSY_RETRIES};
pub use config_api::ConfigApi;
pub use error::{ApiError, ApiResult};
pub use seat_api::{AvailabilityMeta, SeatApi, SeatAvailability};
