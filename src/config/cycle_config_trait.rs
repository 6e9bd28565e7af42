// ==========================================
// 工位轮换预订系统 - 周期配置读取 Trait
// ==========================================
// 职责: 定义轮换引擎所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use async_trait::async_trait;
use chrono::NaiveDate;
use std::error::Error;

// ==========================================
// CycleConfigReader Trait
// ==========================================
// 用途: 轮换解析与资格评估所需的配置读取接口
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait CycleConfigReader: Send + Sync {
    /// 获取轮换周期锚点日期（14天周期第1周的周一）
    ///
    /// # 返回
    /// - Some(NaiveDate): 已配置的锚点
    /// - None: 未配置（所有日期按第1周处理, 这是策略默认值而非错误）
    ///
    /// # 说明
    /// 锚点应为周一; 本接口不做校验, 由管理端写入路径负责
    async fn get_cycle_start_date(&self) -> Result<Option<NaiveDate>, Box<dyn Error>>;
}
