// ==========================================
// 工位轮换预订系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 座位分配与预订核心引擎 (库级契约, 由上层传输层包装)
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 排期与资格规则
pub mod engine;

// 配置层 - 周期锚点配置
pub mod config;

// 身份协作方接口
pub mod auth;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{Batch, BookingStatus, CycleWeek, Role, SeatKind, WeekdayBand};

// 领域实体
pub use domain::{ActionLog, ActionType, Actor, Booking, BookingRequest, Seat};

// 引擎
pub use engine::{
    CalendarPolicy, EligibilityEngine, RotationResolver, SeatVerdict, UnlockPolicy,
};

// 身份
pub use auth::{AuthenticatedUser, IdentityResolver};

// API
pub use api::{BookingApi, ConfigApi, SeatApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "工位轮换预订系统";

// 数据库版本
pub const DB_VERSION: &str = "v0.1";

// ==========================================
// 预编译检查
// ==========================================
