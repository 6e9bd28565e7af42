// ==========================================
// 工位轮换预订系统 - 周期配置管理 API
// ==========================================
// 职责: 周期锚点的查询与更新 (仅管理员)
// 约束: 锚点必须为周一 —— 轮换解析器不校验, 由本写入路径把关
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::config_manager::{ConfigManager, CycleConfig};
use crate::domain::action_log::{ActionLog, ActionType};
use crate::domain::booking::Actor;
use crate::repository::action_log_repo::ActionLogRepository;
use chrono::{Datelike, NaiveDate, Weekday};
use std::sync::Arc;
use tracing::{info, instrument, warn};

// ==========================================
// ConfigApi - 周期配置管理 API
// ==========================================
pub struct ConfigApi {
    config_manager: Arc<ConfigManager>,
    action_log_repo: Arc<ActionLogRepository>,
}

impl ConfigApi {
    /// 创建新的 ConfigApi 实例
    pub fn new(
        config_manager: Arc<ConfigManager>,
        action_log_repo: Arc<ActionLogRepository>,
    ) -> Self {
        Self {
            config_manager,
            action_log_repo,
        }
    }

    /// 查询周期配置 (仅管理员)
    ///
    /// # 返回
    /// - Ok(Some(CycleConfig)): 已配置
    /// - Ok(None): 未配置 (轮换按第1周处理)
    /// - Err(Forbidden): 非管理员
    pub fn get_cycle_config(&self, actor: &Actor) -> ApiResult<Option<CycleConfig>> {
        if !actor.is_admin() {
            return Err(ApiError::Forbidden);
        }

        self.config_manager
            .get_cycle_config()
            .map_err(|e| ApiError::InternalError(e.to_string()))
    }

    /// 更新周期锚点日期 (仅管理员)
    ///
    /// # 参数
    /// - actor: 操作者
    /// - cycle_start_date: 新锚点 (必须为周一)
    /// - reason: 操作原因 (审计用, 不可为空)
    ///
    /// # 返回
    /// - Ok(CycleConfig): 更新后的配置
    /// - Err(Forbidden / InvalidInput)
    #[instrument(skip(self, actor), fields(actor_id = %actor.user_id, cycle_start_date = %cycle_start_date))]
    pub fn update_cycle_start_date(
        &self,
        actor: &Actor,
        cycle_start_date: NaiveDate,
        reason: &str,
    ) -> ApiResult<CycleConfig> {
        if !actor.is_admin() {
            return Err(ApiError::Forbidden);
        }

        // 参数验证
        if cycle_start_date.weekday() != Weekday::Mon {
            return Err(ApiError::InvalidInput(format!(
                "周期锚点必须是周一: {} 是 {}",
                cycle_start_date,
                cycle_start_date.weekday()
            )));
        }
        if reason.trim().is_empty() {
            return Err(ApiError::InvalidInput("操作原因不能为空".to_string()));
        }

        self.config_manager
            .set_cycle_start_date(cycle_start_date)
            .map_err(|e| ApiError::InternalError(e.to_string()))?;

        // 记录ActionLog; 审计失败不回滚配置写入, 仅告警
        let log = ActionLog::new(ActionType::UpdateCycleConfig, &actor.user_id)
            .with_payload(&serde_json::json!({
                "cycle_start_date": cycle_start_date.format("%Y-%m-%d").to_string(),
                "reason": reason,
            }))
            .with_detail(format!("更新周期锚点为 {}", cycle_start_date));
        if let Err(e) = self.action_log_repo.insert(&log) {
            warn!(error = %e, "审计日志写入失败");
        }

        info!(cycle_start_date = %cycle_start_date, "周期锚点已更新");

        let config = self
            .config_manager
            .get_cycle_config()
            .map_err(|e| ApiError::InternalError(e.to_string()))?
            .ok_or_else(|| ApiError::InternalError("周期配置写入后读取为空".to_string()))?;

        Ok(config)
    }
}
