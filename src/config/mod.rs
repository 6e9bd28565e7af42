// ==========================================
// 工位轮换预订系统 - 配置层
// ==========================================
// 职责: 周期锚点配置的读写
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod cycle_config_trait;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager, CycleConfig};
pub use cycle_config_trait::CycleConfigReader;
